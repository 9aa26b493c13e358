//! Configuration for a handlercheck run.
//!
//! The configuration is a JSON document in the target project. Values are
//! resolved once, in order of precedence: CLI flag, config file, built-in
//! default. The resulting [`Config`] is immutable and passed explicitly to
//! the runner.

use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;
use std::fs;
use std::path::{Path, PathBuf};

use crate::error::CheckError;

/// Config file names searched for in the project root.
pub const DEFAULT_CONFIG_NAMES: &[&str] = &["handlercheck.json", ".handlercheckrc.json"];

/// Top-level configuration.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
#[serde(default, rename_all = "camelCase", deny_unknown_fields)]
pub struct Config {
    /// Routing declaration file, relative to the project root.
    pub routes_file: PathBuf,
    /// Directory holding controller files, relative to the project root.
    pub controllers_dir: PathBuf,
    /// `Controller.method` handlers exempt from every rule.
    pub whitelist: BTreeSet<String>,
    /// Emit advisory (warning) violations as well as errors.
    pub strict_mode: bool,
    /// Exit non-zero when any method fails.
    pub fail_on_error: bool,
    /// Module path the error catalog is imported from; shown in messages.
    pub error_catalog_import_path: String,
    pub conventions: Conventions,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            routes_file: PathBuf::from("start/routes.ts"),
            controllers_dir: PathBuf::from("app/controllers"),
            whitelist: BTreeSet::new(),
            strict_mode: true,
            fail_on_error: true,
            error_catalog_import_path: "#exceptions/error_catalog".to_string(),
            conventions: Conventions::default(),
        }
    }
}

/// Identifiers the textual matchers look for.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
#[serde(default, rename_all = "camelCase", deny_unknown_fields)]
pub struct Conventions {
    /// Context field holding request data.
    pub request_accessor: String,
    /// Context field holding route parameters.
    pub params_accessor: String,
    /// Callee fragment that marks a validation call.
    pub validation_call: String,
    /// Success response constructor.
    pub success_constructor: String,
    /// Error response constructor.
    pub error_constructor: String,
    /// Identifier the error catalog is bound to.
    pub error_catalog: String,
}

impl Default for Conventions {
    fn default() -> Self {
        Self {
            request_accessor: "request".to_string(),
            params_accessor: "params".to_string(),
            validation_call: "validateUsing".to_string(),
            success_constructor: "ok".to_string(),
            error_constructor: "fail".to_string(),
            error_catalog: "ErrorCatalog".to_string(),
        }
    }
}

/// Values given on the command line. `None` leaves the file/default value.
#[derive(Debug, Clone, Default)]
pub struct Overrides {
    pub routes_file: Option<PathBuf>,
    pub controllers_dir: Option<PathBuf>,
    /// Added to the configured whitelist.
    pub whitelist: Vec<String>,
    pub strict_mode: Option<bool>,
    pub fail_on_error: Option<bool>,
}

impl Config {
    /// Parse a config from a JSON file.
    pub fn parse_file<P: AsRef<Path>>(path: P) -> Result<Self, CheckError> {
        let path = path.as_ref();
        let content = fs::read_to_string(path).map_err(|source| CheckError::ConfigRead {
            path: path.to_path_buf(),
            source,
        })?;
        serde_json::from_str(&content).map_err(|source| CheckError::ConfigParse {
            path: path.to_path_buf(),
            source,
        })
    }

    /// Load the config for a project.
    ///
    /// An explicit path must exist. Without one, the project root is
    /// searched for [`DEFAULT_CONFIG_NAMES`]; if none is found the built-in
    /// defaults are used.
    pub fn load(project_root: &Path, explicit: Option<&Path>) -> Result<Self, CheckError> {
        let path = match explicit {
            Some(p) => Some(p.to_path_buf()),
            None => discover(project_root),
        };

        match path {
            Some(p) => {
                let config = Self::parse_file(&p)?;
                log::debug!("Loaded config from {}", p.display());
                Ok(config)
            }
            None => {
                log::debug!(
                    "No config file in {}. Using defaults.",
                    project_root.display()
                );
                Ok(Self::default())
            }
        }
    }

    /// Apply command-line overrides on top of this config.
    pub fn with_overrides(mut self, overrides: Overrides) -> Self {
        if let Some(routes_file) = overrides.routes_file {
            self.routes_file = routes_file;
        }
        if let Some(controllers_dir) = overrides.controllers_dir {
            self.controllers_dir = controllers_dir;
        }
        self.whitelist.extend(overrides.whitelist);
        if let Some(strict) = overrides.strict_mode {
            self.strict_mode = strict;
        }
        if let Some(fail) = overrides.fail_on_error {
            self.fail_on_error = fail;
        }
        self
    }

    /// Whether a `Controller.method` key is exempt from checking.
    pub fn is_whitelisted(&self, key: &str) -> bool {
        self.whitelist.contains(key)
    }

    /// Serialize as pretty JSON, for `init`.
    pub fn to_json_pretty(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string_pretty(self)
    }
}

/// Find a config file in the project root.
pub fn discover(project_root: &Path) -> Option<PathBuf> {
    DEFAULT_CONFIG_NAMES
        .iter()
        .map(|name| project_root.join(name))
        .find(|path| path.is_file())
}

/// Validate a config for correctness.
pub fn validate(config: &Config) -> Result<(), CheckError> {
    if config.routes_file.as_os_str().is_empty() {
        return Err(CheckError::InvalidConfig(
            "routesFile must not be empty".to_string(),
        ));
    }

    for entry in &config.whitelist {
        let valid = entry
            .split_once('.')
            .map(|(controller, method)| {
                is_identifier(controller) && is_identifier(method)
            })
            .unwrap_or(false);
        if !valid {
            return Err(CheckError::InvalidConfig(format!(
                "invalid whitelist entry {:?}, expected \"Controller.method\"",
                entry
            )));
        }
    }

    let c = &config.conventions;
    for (field, value) in [
        ("requestAccessor", &c.request_accessor),
        ("paramsAccessor", &c.params_accessor),
        ("validationCall", &c.validation_call),
        ("successConstructor", &c.success_constructor),
        ("errorConstructor", &c.error_constructor),
        ("errorCatalog", &c.error_catalog),
    ] {
        if !is_identifier(value) {
            return Err(CheckError::InvalidConfig(format!(
                "conventions.{} must be an identifier, got {:?}",
                field, value
            )));
        }
    }

    Ok(())
}

fn is_identifier(s: &str) -> bool {
    let mut chars = s.chars();
    match chars.next() {
        Some(c) if c.is_ascii_alphabetic() || c == '_' || c == '$' => {}
        _ => return false,
    }
    chars.all(|c| c.is_ascii_alphanumeric() || c == '_' || c == '$')
}
