//! Core types for detection results.

use serde::{Deserialize, Serialize};

/// Severity levels for violations.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Severity {
    Error,
    Warning,
}

impl std::fmt::Display for Severity {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Severity::Error => write!(f, "error"),
            Severity::Warning => write!(f, "warning"),
        }
    }
}

/// Rule identifiers.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ViolationRule {
    #[serde(rename = "request-validation")]
    RequestValidation,
    #[serde(rename = "typed-success-return")]
    TypedSuccessReturn,
    #[serde(rename = "catalog-error-return")]
    CatalogErrorReturn,
}

impl ViolationRule {
    pub const ALL: [ViolationRule; 3] = [
        ViolationRule::RequestValidation,
        ViolationRule::TypedSuccessReturn,
        ViolationRule::CatalogErrorReturn,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            ViolationRule::RequestValidation => "request-validation",
            ViolationRule::TypedSuccessReturn => "typed-success-return",
            ViolationRule::CatalogErrorReturn => "catalog-error-return",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|r| r.as_str() == s)
    }
}

impl std::fmt::Display for ViolationRule {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// A single detected issue.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Violation {
    #[serde(rename = "ruleId")]
    pub rule: ViolationRule,
    pub message: String,
    pub line: usize,
    pub severity: Severity,
}

impl Violation {
    pub fn is_error(&self) -> bool {
        self.severity == Severity::Error
    }
}

/// Outcome for one handler method.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MethodVerdict {
    #[serde(rename = "controllerName")]
    pub controller: String,
    #[serde(rename = "methodName")]
    pub method: String,
    #[serde(rename = "filePath")]
    pub file: String,
    pub line: usize,
    pub violations: Vec<Violation>,
    /// No error-severity violations. Warnings are advisory.
    pub passed: bool,
}

impl MethodVerdict {
    pub fn new(
        controller: &str,
        method: &str,
        file: &str,
        line: usize,
        violations: Vec<Violation>,
    ) -> Self {
        let passed = !violations.iter().any(Violation::is_error);
        Self {
            controller: controller.to_string(),
            method: method.to_string(),
            file: file.to_string(),
            line,
            violations,
            passed,
        }
    }

    pub fn qualified_name(&self) -> String {
        format!("{}.{}", self.controller, self.method)
    }

    pub fn warning_count(&self) -> usize {
        self.violations.iter().filter(|v| !v.is_error()).count()
    }
}

/// Why a route was not evaluated.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum SkipReason {
    /// The controller's resolved file does not exist or could not be analyzed.
    MissingControllerFile,
    /// The controller file has no method with the route's handler name.
    MissingHandler,
}

impl std::fmt::Display for SkipReason {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            SkipReason::MissingControllerFile => write!(f, "controller file not found"),
            SkipReason::MissingHandler => write!(f, "handler method not found"),
        }
    }
}

/// A route skipped for a recoverable reason.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SkippedRoute {
    #[serde(rename = "controllerName")]
    pub controller: String,
    #[serde(rename = "handlerName")]
    pub handler: String,
    /// Line of the route registration.
    pub line: usize,
    /// Path the controller was expected at.
    pub file: String,
    pub reason: SkipReason,
}

/// Results of a full run.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RunSummary {
    pub total_methods: usize,
    pub passed_methods: usize,
    pub failed_methods: usize,
    pub all_verdicts: Vec<MethodVerdict>,
    pub failing_verdicts: Vec<MethodVerdict>,
    /// Routes not evaluated because of drift between routes and controllers.
    #[serde(default)]
    pub skipped: Vec<SkippedRoute>,
    /// Routes exempted by the whitelist.
    #[serde(default)]
    pub whitelisted: usize,
}

impl RunSummary {
    /// Build counters and the failing subset from verdicts.
    pub fn from_verdicts(
        verdicts: Vec<MethodVerdict>,
        skipped: Vec<SkippedRoute>,
        whitelisted: usize,
    ) -> Self {
        let failing_verdicts: Vec<MethodVerdict> =
            verdicts.iter().filter(|v| !v.passed).cloned().collect();
        let failed_methods = failing_verdicts.len();
        Self {
            total_methods: verdicts.len(),
            passed_methods: verdicts.len() - failed_methods,
            failed_methods,
            all_verdicts: verdicts,
            failing_verdicts,
            skipped,
            whitelisted,
        }
    }

    /// Check if any method failed.
    pub fn has_failures(&self) -> bool {
        self.failed_methods > 0
    }

    /// Total violations of the given severity across all verdicts.
    pub fn count_severity(&self, severity: Severity) -> usize {
        self.all_verdicts
            .iter()
            .flat_map(|v| v.violations.iter())
            .filter(|v| v.severity == severity)
            .count()
    }
}
