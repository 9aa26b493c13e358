//! AST-backed source analysis.
//!
//! This module turns TypeScript source into plain facts:
//! - [`RouteRecord`]s from the routing declaration file
//! - [`MethodFacts`] for each method of a controller's default-exported class
//!
//! # Architecture
//!
//! ```text
//! ┌─────────────────┐     ┌──────────────────┐     ┌───────────────┐
//! │ routes.ts       │────▶│ SourceAnalyzer   │────▶│ RouteRecord   │
//! │ *_controller.ts │     │ (TypeScript)     │     │ MethodFacts   │
//! └─────────────────┘     └──────────────────┘     └───────────────┘
//!                                                          │
//!                                                          ▼
//!                                                  ┌───────────────┐
//!                                                  │ Detection     │
//!                                                  │ Rules         │
//!                                                  └───────────────┘
//! ```
//!
//! Only implementations of [`SourceAnalyzer`] see tree-sitter nodes.

mod conventions;
mod facts;
mod traits;
mod typescript;

pub use conventions::{path_params, strip_quotes, Matchers};
pub use facts::{HttpVerb, MethodFacts, ReturnFact, ReturnKind, RouteRecord};
pub use traits::{ParsedFile, SourceAnalyzer};
pub use typescript::TypeScriptAnalyzer;
