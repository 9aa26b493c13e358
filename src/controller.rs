//! Per-controller method fact extraction.

use std::collections::HashMap;
use std::fs;
use std::path::Path;

use crate::analysis::{Matchers, MethodFacts, SourceAnalyzer};

/// Facts for each method of a controller file, keyed by method name.
///
/// `display_path` is the path recorded in the facts (usually relative to
/// the project root). A file without a default-exported class yields an
/// empty map.
pub fn analyze(
    analyzer: &dyn SourceAnalyzer,
    path: &Path,
    display_path: &str,
    controller: &str,
    matchers: &Matchers,
) -> anyhow::Result<HashMap<String, MethodFacts>> {
    let source = fs::read(path)?;
    analyze_source(analyzer, &source, display_path, controller, matchers)
}

/// Same as [`analyze`], on source already in memory.
pub fn analyze_source(
    analyzer: &dyn SourceAnalyzer,
    source: &[u8],
    display_path: &str,
    controller: &str,
    matchers: &Matchers,
) -> anyhow::Result<HashMap<String, MethodFacts>> {
    let parsed = analyzer.parse(Path::new(display_path), source)?;
    let methods = analyzer.extract_methods(&parsed, matchers)?;

    if methods.is_empty() {
        log::debug!("{}: no default-exported class methods", display_path);
    }

    let mut by_name: HashMap<String, MethodFacts> = HashMap::with_capacity(methods.len());
    for mut facts in methods {
        if let Some(first) = by_name.get(&facts.method) {
            // Accessor pairs share a name; the first definition wins.
            log::debug!(
                "{}: {} defined again on line {}, keeping line {}",
                display_path,
                facts.method,
                facts.line,
                first.line
            );
            continue;
        }
        // Name facts after the route's reference, which is what the
        // whitelist and the report use.
        facts.controller = controller.to_string();
        facts.file = display_path.to_string();
        by_name.insert(facts.method.clone(), facts);
    }
    Ok(by_name)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::analysis::TypeScriptAnalyzer;
    use crate::config::Conventions;
    use tempfile::TempDir;

    #[test]
    fn test_analyze_controller_file() {
        let temp = TempDir::new().unwrap();
        let path = temp.path().join("widgets_controller.ts");
        std::fs::write(
            &path,
            r#"
export default class WidgetsController {
  async show({ params }: HttpContext) {
    return this.ok<Widget>(await Widget.findOrFail(params.id))
  }

  async update({ request, params }: HttpContext) {
    const data = request.all()
    return this.ok(data)
  }
}
"#,
        )
        .unwrap();

        let analyzer = TypeScriptAnalyzer::new();
        let matchers = Matchers::new(&Conventions::default()).unwrap();
        let methods = analyze(
            &analyzer,
            &path,
            "app/controllers/widgets_controller.ts",
            "WidgetsController",
            &matchers,
        )
        .unwrap();

        assert_eq!(methods.len(), 2);
        let show = &methods["show"];
        assert_eq!(show.controller, "WidgetsController");
        assert_eq!(show.file, "app/controllers/widgets_controller.ts");
        assert_eq!(show.line, 3);
        assert!(show.consumes_params);

        let update = &methods["update"];
        assert!(update.consumes_request);
        assert!(update.consumes_params);
        assert!(!update.calls_validation);
    }

    #[test]
    fn test_file_without_default_class() {
        let analyzer = TypeScriptAnalyzer::new();
        let matchers = Matchers::new(&Conventions::default()).unwrap();
        let methods = analyze_source(
            &analyzer,
            b"export const helper = () => 1\n",
            "app/controllers/helpers_controller.ts",
            "HelpersController",
            &matchers,
        )
        .unwrap();
        assert!(methods.is_empty());
    }

    #[test]
    fn test_duplicate_method_names_keep_first() {
        let analyzer = TypeScriptAnalyzer::new();
        let matchers = Matchers::new(&Conventions::default()).unwrap();
        let source = br#"
export default class ProfilesController {
  get current() {
    return this.ok<Profile>(this.profile)
  }

  set current(value) {
    this.profile = value
  }
}
"#;
        let methods = analyze_source(
            &analyzer,
            source,
            "app/controllers/profiles_controller.ts",
            "ProfilesController",
            &matchers,
        )
        .unwrap();

        assert_eq!(methods.len(), 1);
        let current = &methods["current"];
        assert_eq!(current.line, 3);
        assert_eq!(current.returns.len(), 1);
        assert_eq!(current.file, "app/controllers/profiles_controller.ts");
    }

    #[test]
    fn test_missing_file_is_error() {
        let analyzer = TypeScriptAnalyzer::new();
        let matchers = Matchers::new(&Conventions::default()).unwrap();
        assert!(analyze(
            &analyzer,
            Path::new("/nonexistent/users_controller.ts"),
            "users_controller.ts",
            "UsersController",
            &matchers,
        )
        .is_err());
    }
}
