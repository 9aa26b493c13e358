//! Core traits for source analysis.

use std::path::Path;

use super::{Matchers, MethodFacts, RouteRecord};

/// Holds a parsed tree-sitter tree and associated metadata.
///
/// Kept separate from the extracted facts so one tree can serve several
/// extraction passes without re-parsing.
pub struct ParsedFile {
    /// The tree-sitter parse tree.
    pub tree: tree_sitter::Tree,
    /// Raw source bytes (kept for node text extraction).
    pub source: Vec<u8>,
    /// The file path (for error reporting and facts).
    pub path: String,
}

impl ParsedFile {
    /// Get text for a tree-sitter node.
    pub fn node_text(&self, node: tree_sitter::Node) -> &str {
        node.utf8_text(&self.source).unwrap_or("")
    }

    /// 1-indexed start line of a node.
    pub fn node_line(&self, node: tree_sitter::Node) -> usize {
        node.start_position().row + 1
    }
}

/// Parser seam between the syntax tree and the rest of the pipeline.
///
/// Rules and the run summary only ever see [`RouteRecord`] and
/// [`MethodFacts`]; nothing outside an implementation of this trait
/// touches tree-sitter nodes.
///
/// # Thread Safety
///
/// `tree_sitter::Parser` is not Sync, so implementations create a parser
/// per call.
pub trait SourceAnalyzer: Send + Sync {
    /// Extension of source files this analyzer handles (without dot).
    ///
    /// Controller paths are resolved with it.
    fn file_extension(&self) -> &'static str;

    /// Parse a source file into a tree-sitter tree.
    ///
    /// Partial parse errors still yield a tree with ERROR nodes.
    fn parse(&self, path: &Path, source: &[u8]) -> anyhow::Result<ParsedFile>;

    /// Route registrations in a routing declaration file, in source order.
    fn extract_routes(&self, parsed: &ParsedFile) -> anyhow::Result<Vec<RouteRecord>>;

    /// Facts for every method of the file's default-exported class.
    ///
    /// Returns an empty list when the file has no such class.
    fn extract_methods(
        &self,
        parsed: &ParsedFile,
        matchers: &Matchers,
    ) -> anyhow::Result<Vec<MethodFacts>>;
}
