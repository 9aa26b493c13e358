//! handlercheck - route handler convention checker.
//!
//! handlercheck reads an AdonisJS project's routing file, finds the
//! controller method behind every route, and checks three conventions:
//! request data is validated before use, success responses carry an
//! explicit result type, and error responses come from the error catalog.
//!
//! # Architecture
//!
//! The pipeline runs leaf-first:
//!
//! - `analysis`: tree-sitter TypeScript analysis producing route and method facts
//! - `routes`: route extraction, grouping by controller, controller path resolution
//! - `controller`: per-controller method facts
//! - `detect`: the rules and the [`Runner`] that composes the pipeline
//! - `config`: JSON configuration with CLI overrides
//! - `report`: output formatting (pretty, JSON, SARIF)
//!
//! Detection is textual over parsed nodes. It does not resolve aliases or
//! types.

pub mod analysis;
pub mod cli;
pub mod config;
pub mod controller;
pub mod detect;
pub mod error;
pub mod report;
pub mod routes;

pub use analysis::{
    HttpVerb, Matchers, MethodFacts, ReturnFact, ReturnKind, RouteRecord, SourceAnalyzer,
    TypeScriptAnalyzer,
};
pub use config::Config;
pub use detect::{MethodVerdict, RunSummary, Runner, Severity, Violation, ViolationRule};
pub use error::CheckError;
