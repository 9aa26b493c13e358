//! Integration tests for the full check pipeline.
//!
//! These tests run the runner against the AdonisJS-shaped project under
//! testdata/adonis_app and against small projects built in temp dirs.

use std::path::{Path, PathBuf};

use handlercheck::config::{self, Config, Overrides};
use handlercheck::detect::{RunSummary, Runner, Severity, SkipReason, ViolationRule};
use handlercheck::CheckError;
use tempfile::TempDir;

fn testdata_path() -> PathBuf {
    PathBuf::from(env!("CARGO_MANIFEST_DIR")).join("testdata")
}

fn fixture_root() -> PathBuf {
    testdata_path().join("adonis_app")
}

fn fixture_config() -> Config {
    let root = fixture_root();
    let path = config::discover(&root).expect("fixture has a config file");
    Config::load(&root, Some(path.as_path())).expect("should load config")
}

/// Run the checker against the fixture project.
fn run_fixture(config: &Config) -> RunSummary {
    Runner::new(fixture_root(), config)
        .run()
        .expect("check should succeed")
}

fn verdict<'a>(
    summary: &'a RunSummary,
    name: &str,
) -> &'a handlercheck::detect::MethodVerdict {
    summary
        .all_verdicts
        .iter()
        .find(|v| v.qualified_name() == name)
        .unwrap_or_else(|| panic!("no verdict for {}", name))
}

fn project(routes: &str, controllers: &[(&str, &str)]) -> TempDir {
    let temp = TempDir::new().unwrap();
    let root = temp.path();
    std::fs::create_dir_all(root.join("start")).unwrap();
    std::fs::create_dir_all(root.join("app/controllers")).unwrap();
    std::fs::write(root.join("start/routes.ts"), routes).unwrap();
    for (file, source) in controllers {
        std::fs::write(root.join("app/controllers").join(file), source).unwrap();
    }
    temp
}

fn run_project(root: &Path) -> RunSummary {
    Runner::new(root, &Config::default()).run().unwrap()
}

#[test]
fn test_fixture_counts() {
    let summary = run_fixture(&fixture_config());

    assert_eq!(summary.total_methods, 6);
    assert_eq!(summary.passed_methods, 4);
    assert_eq!(summary.failed_methods, 2);
    assert_eq!(summary.whitelisted, 1);
    assert_eq!(summary.skipped.len(), 2);
    assert_eq!(
        summary.total_methods,
        summary.passed_methods + summary.failed_methods
    );
}

#[test]
fn test_fixture_verdict_order_follows_routes() {
    let summary = run_fixture(&fixture_config());
    let names: Vec<String> = summary
        .all_verdicts
        .iter()
        .map(|v| v.qualified_name())
        .collect();
    assert_eq!(
        names,
        vec![
            "UsersController.index",
            "UsersController.show",
            "UsersController.store",
            "UsersController.update",
            "PostsController.show",
            "PostsController.store",
        ]
    );
}

#[test]
fn test_fixture_failing_subset() {
    let summary = run_fixture(&fixture_config());
    let failing: Vec<String> = summary
        .failing_verdicts
        .iter()
        .map(|v| v.qualified_name())
        .collect();
    assert_eq!(
        failing,
        vec!["UsersController.store", "UsersController.update"]
    );
    assert!(summary.failing_verdicts.iter().all(|v| !v.passed));
}

#[test]
fn test_untyped_success_is_error() {
    let summary = run_fixture(&fixture_config());
    let store = verdict(&summary, "UsersController.store");

    assert_eq!(store.violations.len(), 1);
    assert_eq!(store.violations[0].rule, ViolationRule::TypedSuccessReturn);
    assert_eq!(store.violations[0].severity, Severity::Error);
    assert_eq!(store.file, "app/controllers/users_controller.ts");
}

#[test]
fn test_unvalidated_request_and_inline_error() {
    let summary = run_fixture(&fixture_config());
    let update = verdict(&summary, "UsersController.update");

    let rules: Vec<ViolationRule> = update.violations.iter().map(|v| v.rule).collect();
    assert_eq!(
        rules,
        vec![
            ViolationRule::RequestValidation,
            ViolationRule::CatalogErrorReturn
        ]
    );
    assert!(update.violations.iter().all(|v| v.is_error()));

    let catalog = &update.violations[1];
    assert!(catalog.message.contains("ErrorCatalog"));
    assert!(catalog.message.contains("#exceptions/error_catalog"));
    assert!(catalog.message.ends_with("..."));
}

#[test]
fn test_params_only_handlers_warn_but_pass() {
    let summary = run_fixture(&fixture_config());
    for name in ["UsersController.show", "PostsController.show"] {
        let v = verdict(&summary, name);
        assert!(v.passed, "{} should pass", name);
        assert_eq!(v.violations.len(), 1, "{}", name);
        assert_eq!(v.violations[0].severity, Severity::Warning);
        assert_eq!(v.violations[0].rule, ViolationRule::RequestValidation);
    }
}

#[test]
fn test_clean_handlers_have_no_violations() {
    let summary = run_fixture(&fixture_config());
    for name in ["UsersController.index", "PostsController.store"] {
        assert!(verdict(&summary, name).violations.is_empty(), "{}", name);
    }
}

#[test]
fn test_whitelisted_handler_is_absent() {
    let summary = run_fixture(&fixture_config());
    assert!(summary
        .all_verdicts
        .iter()
        .all(|v| v.controller != "HealthController"));
}

#[test]
fn test_without_whitelist_health_is_checked() {
    let mut config = fixture_config();
    config.whitelist.clear();
    let summary = run_fixture(&config);

    let ping = verdict(&summary, "HealthController.ping");
    assert!(!ping.passed);
    assert_eq!(summary.whitelisted, 0);
    assert_eq!(summary.total_methods, 7);
}

#[test]
fn test_drift_is_reported_as_skipped() {
    let summary = run_fixture(&fixture_config());

    let destroy = summary
        .skipped
        .iter()
        .find(|s| s.handler == "destroy")
        .expect("destroy is skipped");
    assert_eq!(destroy.reason, SkipReason::MissingHandler);
    assert_eq!(destroy.controller, "UsersController");

    let billing = summary
        .skipped
        .iter()
        .find(|s| s.controller == "BillingController")
        .expect("billing is skipped");
    assert_eq!(billing.reason, SkipReason::MissingControllerFile);
    assert_eq!(billing.file, "app/controllers/billing_controller.ts");
}

#[test]
fn test_non_strict_drops_warnings() {
    let config = fixture_config().with_overrides(Overrides {
        strict_mode: Some(false),
        ..Overrides::default()
    });
    let summary = run_fixture(&config);

    assert_eq!(summary.count_severity(Severity::Warning), 0);
    assert!(verdict(&summary, "UsersController.show")
        .violations
        .is_empty());
    assert_eq!(summary.failed_methods, 2);
}

#[test]
fn test_sequential_matches_parallel() {
    let config = fixture_config();
    let parallel = run_fixture(&config);
    let sequential = Runner::new(fixture_root(), &config)
        .parallel(false)
        .run()
        .unwrap();
    assert_eq!(parallel, sequential);
}

#[test]
fn test_typed_handler_with_params_passes_with_warning() {
    let temp = project(
        "register.get(\"/x/:id\", [Widget, \"show\"])\n",
        &[(
            "widget.ts",
            "export default class Widget {\n  async show({ params }) {\n    const w = await load(params.id)\n    return this.ok<Widget>(w)\n  }\n}\n",
        )],
    );
    let summary = run_project(temp.path());

    assert_eq!(summary.total_methods, 1);
    assert_eq!(summary.failed_methods, 0);
    let v = &summary.all_verdicts[0];
    assert!(v.passed);
    assert_eq!(v.violations.len(), 1);
    assert_eq!(v.violations[0].severity, Severity::Warning);
}

#[test]
fn test_untyped_handler_with_params_fails() {
    let temp = project(
        "register.get(\"/x/:id\", [Widget, \"show\"])\n",
        &[(
            "widget.ts",
            "export default class Widget {\n  async show({ params }) {\n    const w = await load(params.id)\n    return this.ok(w)\n  }\n}\n",
        )],
    );
    let summary = run_project(temp.path());

    assert_eq!(summary.failed_methods, 1);
    let v = &summary.failing_verdicts[0];
    assert!(!v.passed);
    assert_eq!(v.violations[0].severity, Severity::Warning);
    assert_eq!(v.violations[1].rule, ViolationRule::TypedSuccessReturn);
    assert_eq!(v.violations[1].line, 4);
}

#[test]
fn test_no_routes_means_empty_summary() {
    let temp = project("import router from '@adonisjs/core/services/router'\n", &[]);
    let summary = run_project(temp.path());

    assert_eq!(summary, RunSummary::default());
}

#[test]
fn test_missing_routes_file_is_fatal() {
    let temp = TempDir::new().unwrap();
    let err = Runner::new(temp.path(), &Config::default())
        .run()
        .unwrap_err();
    assert!(matches!(err, CheckError::RoutesFile { .. }));
}

#[test]
fn test_json_output_shape() {
    let summary = run_fixture(&fixture_config());
    let json = handlercheck::report::to_json(&summary).unwrap();
    let value: serde_json::Value = serde_json::from_str(&json).unwrap();

    assert_eq!(value["totalMethods"], 6);
    assert_eq!(value["failedMethods"], 2);
    assert_eq!(value["failingVerdicts"].as_array().unwrap().len(), 2);

    let first = &value["allVerdicts"][0];
    assert_eq!(first["controllerName"], "UsersController");
    assert_eq!(first["methodName"], "index");
    assert_eq!(first["filePath"], "app/controllers/users_controller.ts");
    assert_eq!(first["passed"], true);

    let store = &value["failingVerdicts"][0]["violations"][0];
    assert_eq!(store["ruleId"], "typed-success-return");
    assert_eq!(store["severity"], "error");

    let back: RunSummary = serde_json::from_str(&json).unwrap();
    assert_eq!(back, summary);
}

#[test]
fn test_sarif_output_covers_every_violation() {
    let summary = run_fixture(&fixture_config());
    let report = handlercheck::report::sarif_report(&summary);
    let violations: usize = summary.all_verdicts.iter().map(|v| v.violations.len()).sum();
    assert_eq!(report.runs[0].results.len(), violations);
}
