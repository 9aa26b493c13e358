//! Handler convention rules.
//!
//! Each rule is a pure function of a method's facts. [`evaluate`] runs all
//! three in a fixed order and builds the method's verdict.

use crate::analysis::{MethodFacts, ReturnKind};

use super::{MethodVerdict, Severity, Violation, ViolationRule};

/// Maximum characters of return text quoted in a message.
pub const EXCERPT_LEN: usize = 50;

/// Settings shared by the rules for one run.
#[derive(Debug, Clone)]
pub struct RuleOptions {
    /// Emit advisory warnings.
    pub strict: bool,
    /// Error catalog identifier, for messages.
    pub catalog: String,
    /// Module the catalog is imported from, for messages.
    pub catalog_import_path: String,
}

impl Default for RuleOptions {
    fn default() -> Self {
        Self {
            strict: true,
            catalog: "ErrorCatalog".to_string(),
            catalog_import_path: "#exceptions/error_catalog".to_string(),
        }
    }
}

/// Request data must be validated; route parameters should be.
///
/// At most one violation. The warning branch cannot fire when the error
/// branch's condition holds.
pub fn check_request_validation(facts: &MethodFacts) -> Option<Violation> {
    if facts.calls_validation {
        return None;
    }

    if facts.consumes_request {
        Some(Violation {
            rule: ViolationRule::RequestValidation,
            message: "uses request data without validating it".to_string(),
            line: facts.line,
            severity: Severity::Error,
        })
    } else if facts.consumes_params {
        Some(Violation {
            rule: ViolationRule::RequestValidation,
            message: "uses route parameters without validation; consider adding it".to_string(),
            line: facts.line,
            severity: Severity::Warning,
        })
    } else {
        None
    }
}

/// Every success construction must carry an explicit result type.
pub fn check_typed_success(facts: &MethodFacts) -> Vec<Violation> {
    facts
        .returns
        .iter()
        .filter(|r| {
            matches!(
                r.kind,
                ReturnKind::TypedSuccess {
                    explicit_type: false
                }
            )
        })
        .map(|r| Violation {
            rule: ViolationRule::TypedSuccessReturn,
            message: "success response has no explicit result type (e.g. ok<T>(...))"
                .to_string(),
            line: r.line,
            severity: Severity::Error,
        })
        .collect()
}

/// Every error construction must reference the error catalog.
pub fn check_catalog_errors(facts: &MethodFacts, options: &RuleOptions) -> Vec<Violation> {
    facts
        .returns
        .iter()
        .filter(|r| matches!(r.kind, ReturnKind::ErrorReport { uses_catalog: false }))
        .map(|r| Violation {
            rule: ViolationRule::CatalogErrorReturn,
            message: format!(
                "error response does not use {} from '{}': {}",
                options.catalog,
                options.catalog_import_path,
                excerpt(&r.raw_text, EXCERPT_LEN)
            ),
            line: r.line,
            severity: Severity::Error,
        })
        .collect()
}

/// Run all rules against a method.
pub fn evaluate(facts: &MethodFacts, options: &RuleOptions) -> MethodVerdict {
    let mut violations: Vec<Violation> = Vec::new();
    violations.extend(check_request_validation(facts));
    violations.extend(check_typed_success(facts));
    violations.extend(check_catalog_errors(facts, options));

    if !options.strict {
        violations.retain(Violation::is_error);
    }

    MethodVerdict::new(
        &facts.controller,
        &facts.method,
        &facts.file,
        facts.line,
        violations,
    )
}

/// First `max` characters of `text` on one line, with `...` when cut.
pub fn excerpt(text: &str, max: usize) -> String {
    let flat: String = text.split_whitespace().collect::<Vec<_>>().join(" ");
    if flat.chars().count() <= max {
        flat
    } else {
        let cut: String = flat.chars().take(max).collect();
        format!("{}...", cut)
    }
}
