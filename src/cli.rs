//! Command-line interface for handlercheck.

use clap::{Parser, Subcommand, ValueEnum};
use std::path::{Path, PathBuf};

use crate::config::{self, Config, Overrides};
use crate::detect::Runner;
use crate::report;

/// Exit codes.
pub const EXIT_SUCCESS: i32 = 0;
pub const EXIT_FAILED: i32 = 1;
pub const EXIT_ERROR: i32 = 2;

/// Route handler convention checker for AdonisJS backends.
///
/// Every handler referenced from the routing file must validate request
/// data, declare the type of its success responses, and build error
/// responses from the error catalog.
#[derive(Parser)]
#[command(name = "handlercheck")]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    /// Log debug diagnostics to stderr
    #[arg(short, long, global = true)]
    pub verbose: bool,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Check route handlers against the conventions
    #[command(visible_alias = "lint")]
    Check(CheckArgs),
    /// Write a config file with the default settings
    Init(InitArgs),
}

/// Output formats.
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum Format {
    Pretty,
    Json,
    Sarif,
}

/// Arguments for the check command.
#[derive(Parser)]
pub struct CheckArgs {
    /// Project root
    #[arg(default_value = ".")]
    pub path: PathBuf,

    /// Path to config JSON file (default: auto-discover in project root)
    #[arg(short, long)]
    pub config: Option<PathBuf>,

    /// Routing file, relative to the project root
    #[arg(long)]
    pub routes: Option<PathBuf>,

    /// Controllers directory, relative to the project root
    #[arg(long)]
    pub controllers: Option<PathBuf>,

    /// Exempt a handler ("Controller.method"); may be repeated
    #[arg(short, long = "whitelist", value_name = "CONTROLLER.METHOD")]
    pub whitelist: Vec<String>,

    /// Output format
    #[arg(short, long, value_enum, default_value_t = Format::Pretty)]
    pub format: Format,

    /// Shorthand for --format json
    #[arg(long, conflicts_with = "format")]
    pub json: bool,

    /// Always exit 0 (advisory run)
    #[arg(long)]
    pub no_fail: bool,

    /// Report errors only, without advisory warnings
    #[arg(long)]
    pub no_strict: bool,

    /// Analyze controllers one at a time
    #[arg(long)]
    pub sequential: bool,
}

impl CheckArgs {
    fn format(&self) -> Format {
        if self.json {
            Format::Json
        } else {
            self.format
        }
    }

    fn overrides(&self) -> Overrides {
        Overrides {
            routes_file: self.routes.clone(),
            controllers_dir: self.controllers.clone(),
            whitelist: self.whitelist.clone(),
            strict_mode: self.no_strict.then_some(false),
            fail_on_error: self.no_fail.then_some(false),
        }
    }
}

/// Arguments for the init command.
#[derive(Parser)]
pub struct InitArgs {
    /// Output file path
    #[arg(short, long, default_value = config::DEFAULT_CONFIG_NAMES[0])]
    pub output: PathBuf,

    /// Overwrite an existing file
    #[arg(long)]
    pub force: bool,
}

/// Exit code for a finished run.
pub fn exit_code(failed_methods: usize, fail_on_error: bool) -> i32 {
    if fail_on_error && failed_methods > 0 {
        EXIT_FAILED
    } else {
        EXIT_SUCCESS
    }
}

/// Run the check command.
pub fn run_check(args: &CheckArgs) -> anyhow::Result<i32> {
    let root = match args.path.canonicalize() {
        Ok(p) => p,
        Err(e) => {
            eprintln!("Error: cannot access path {:?}: {}", args.path, e);
            return Ok(EXIT_ERROR);
        }
    };
    if !root.is_dir() {
        eprintln!("Error: {} is not a directory", root.display());
        return Ok(EXIT_ERROR);
    }

    let config_path = match &args.config {
        Some(p) => Some(p.clone()),
        None => config::discover(&root),
    };

    let config = match Config::load(&root, config_path.as_deref()) {
        Ok(c) => c.with_overrides(args.overrides()),
        Err(e) => {
            eprintln!("Error: {}", e);
            return Ok(EXIT_ERROR);
        }
    };

    if let Err(e) = config::validate(&config) {
        eprintln!("Error: {}", e);
        return Ok(EXIT_ERROR);
    }

    let summary = match Runner::new(&root, &config)
        .parallel(!args.sequential)
        .run()
    {
        Ok(s) => s,
        Err(e) => {
            eprintln!("Error: {}", e);
            return Ok(EXIT_ERROR);
        }
    };

    match args.format() {
        Format::Json => report::write_json(&summary)?,
        Format::Sarif => report::write_sarif(&summary)?,
        Format::Pretty => {
            let config_str = config_path.as_deref().map(display_path);
            report::write_pretty(&display_path(&root), config_str.as_deref(), &summary);
        }
    }

    Ok(exit_code(summary.failed_methods, config.fail_on_error))
}

/// Run the init command.
pub fn run_init(args: &InitArgs) -> anyhow::Result<i32> {
    if args.output.exists() && !args.force {
        eprintln!("Error: file already exists: {}", args.output.display());
        eprintln!("Remove it or pass --force to overwrite");
        return Ok(EXIT_ERROR);
    }

    if let Some(parent) = args.output.parent() {
        if !parent.as_os_str().is_empty() && parent != Path::new(".") {
            if let Err(e) = std::fs::create_dir_all(parent) {
                eprintln!("Error: failed to create directory: {}", e);
                return Ok(EXIT_ERROR);
            }
        }
    }

    let content = Config::default().to_json_pretty()?;
    if let Err(e) = std::fs::write(&args.output, content + "\n") {
        eprintln!("Error: failed to write config: {}", e);
        return Ok(EXIT_ERROR);
    }

    println!("Created {}", args.output.display());
    println!();
    println!("Next steps:");
    println!(
        "  1. Edit {} to match your routes file and controllers directory",
        args.output.display()
    );
    println!("  2. Run: handlercheck check .");

    Ok(EXIT_SUCCESS)
}

fn display_path(path: &Path) -> String {
    path.to_string_lossy().to_string()
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;
    use tempfile::TempDir;

    #[test]
    fn test_cli_definition() {
        Cli::command().debug_assert();
    }

    #[test]
    fn test_exit_code() {
        assert_eq!(exit_code(0, true), EXIT_SUCCESS);
        assert_eq!(exit_code(2, true), EXIT_FAILED);
        assert_eq!(exit_code(2, false), EXIT_SUCCESS);
    }

    #[test]
    fn test_check_flags_become_overrides() {
        let cli = Cli::parse_from([
            "handlercheck",
            "check",
            "app",
            "--routes",
            "start/api.ts",
            "-w",
            "HealthController.ping",
            "--no-fail",
            "--json",
        ]);
        let Commands::Check(args) = cli.command else {
            panic!("expected check");
        };
        assert_eq!(args.format(), Format::Json);

        let config = Config::default().with_overrides(args.overrides());
        assert_eq!(config.routes_file, PathBuf::from("start/api.ts"));
        assert!(config.is_whitelisted("HealthController.ping"));
        assert!(!config.fail_on_error);
        assert!(config.strict_mode);
    }

    #[test]
    fn test_init_writes_default_config() {
        let temp = TempDir::new().unwrap();
        let output = temp.path().join("handlercheck.json");
        let args = InitArgs {
            output: output.clone(),
            force: false,
        };
        assert_eq!(run_init(&args).unwrap(), EXIT_SUCCESS);
        let config = Config::parse_file(&output).unwrap();
        assert_eq!(config, Config::default());

        // Refuses to overwrite without --force.
        assert_eq!(run_init(&args).unwrap(), EXIT_ERROR);
    }
}
