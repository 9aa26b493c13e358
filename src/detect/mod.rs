//! Detection of handler convention violations.

pub mod rules;
mod runner;
mod types;

pub use rules::{evaluate, RuleOptions};
pub use runner::Runner;
pub use types::{
    MethodVerdict, RunSummary, Severity, SkipReason, SkippedRoute, Violation, ViolationRule,
};
