//! Fact structures extracted from AST analysis.

use std::fmt;

use serde::ser::SerializeStruct;
use serde::{Serialize, Serializer};

/// HTTP verbs a route registration can use.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum HttpVerb {
    Get,
    Post,
    Patch,
    Put,
    Delete,
    Any,
}

impl HttpVerb {
    pub const ALL: [HttpVerb; 6] = [
        HttpVerb::Get,
        HttpVerb::Post,
        HttpVerb::Patch,
        HttpVerb::Put,
        HttpVerb::Delete,
        HttpVerb::Any,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            HttpVerb::Get => "get",
            HttpVerb::Post => "post",
            HttpVerb::Patch => "patch",
            HttpVerb::Put => "put",
            HttpVerb::Delete => "delete",
            HttpVerb::Any => "any",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|v| v.as_str() == s)
    }
}

impl fmt::Display for HttpVerb {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// One route registration extracted from the routing file.
///
/// `has_path_params` is always derived from `path_params`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RouteRecord {
    pub verb: HttpVerb,
    pub path: String,
    /// Controller reference exactly as written in the route (e.g. `UsersController`).
    pub controller: String,
    pub handler: String,
    /// Line of the registration call (1-indexed).
    pub line: usize,
    /// `:name` segments of the path, in order, duplicates kept.
    pub path_params: Vec<String>,
}

impl RouteRecord {
    pub fn has_path_params(&self) -> bool {
        !self.path_params.is_empty()
    }

    /// Whitelist key for this route's handler.
    pub fn handler_key(&self) -> String {
        format!("{}.{}", self.controller, self.handler)
    }
}

impl Serialize for RouteRecord {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut s = serializer.serialize_struct("RouteRecord", 7)?;
        s.serialize_field("verb", &self.verb)?;
        s.serialize_field("path", &self.path)?;
        s.serialize_field("controller", &self.controller)?;
        s.serialize_field("handler", &self.handler)?;
        s.serialize_field("line", &self.line)?;
        s.serialize_field("pathParams", &self.path_params)?;
        s.serialize_field("hasPathParams", &self.has_path_params())?;
        s.end()
    }
}

/// Classification of a single `return` expression.
///
/// The sub-flags live inside the variant they belong to, so a flag that
/// does not apply is absent rather than `false`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", rename_all = "camelCase")]
pub enum ReturnKind {
    #[serde(rename_all = "camelCase")]
    TypedSuccess { explicit_type: bool },
    #[serde(rename_all = "camelCase")]
    ErrorReport { uses_catalog: bool },
    Other,
}

/// Facts about one `return` statement in a handler.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ReturnFact {
    pub line: usize,
    #[serde(flatten)]
    pub kind: ReturnKind,
    pub raw_text: String,
}

impl ReturnFact {
    /// `None` unless this is a success construction.
    pub fn has_explicit_type(&self) -> Option<bool> {
        match self.kind {
            ReturnKind::TypedSuccess { explicit_type } => Some(explicit_type),
            _ => None,
        }
    }

    /// `None` unless this is an error construction.
    pub fn uses_error_catalog(&self) -> Option<bool> {
        match self.kind {
            ReturnKind::ErrorReport { uses_catalog } => Some(uses_catalog),
            _ => None,
        }
    }
}

/// Syntactic facts about one controller method.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct MethodFacts {
    pub controller: String,
    pub method: String,
    /// Controller file path, relative to the project root when possible.
    pub file: String,
    /// Line of the method declaration (1-indexed).
    pub line: usize,
    pub consumes_request: bool,
    pub consumes_params: bool,
    pub calls_validation: bool,
    pub returns: Vec<ReturnFact>,
}

impl MethodFacts {
    /// Create facts for a method with no usage and no returns.
    pub fn empty(controller: &str, method: &str, file: &str, line: usize) -> Self {
        Self {
            controller: controller.to_string(),
            method: method.to_string(),
            file: file.to_string(),
            line,
            consumes_request: false,
            consumes_params: false,
            calls_validation: false,
            returns: Vec::new(),
        }
    }

    /// Get the qualified name (`Controller.method`).
    pub fn qualified_name(&self) -> String {
        format!("{}.{}", self.controller, self.method)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn route(path: &str, params: &[&str]) -> RouteRecord {
        RouteRecord {
            verb: HttpVerb::Get,
            path: path.to_string(),
            controller: "UsersController".to_string(),
            handler: "show".to_string(),
            line: 3,
            path_params: params.iter().map(|p| p.to_string()).collect(),
        }
    }

    #[test]
    fn test_has_path_params_follows_list() {
        assert!(route("/users/:id", &["id"]).has_path_params());
        assert!(!route("/users", &[]).has_path_params());
    }

    #[test]
    fn test_route_serializes_derived_flag() {
        let json = serde_json::to_value(route("/users/:id", &["id"])).unwrap();
        assert_eq!(json["hasPathParams"], true);
        assert_eq!(json["pathParams"][0], "id");
        assert_eq!(json["verb"], "get");
    }

    #[test]
    fn test_return_flags_absent_for_other_kinds() {
        let other = ReturnFact {
            line: 1,
            kind: ReturnKind::Other,
            raw_text: "user".to_string(),
        };
        assert_eq!(other.has_explicit_type(), None);
        assert_eq!(other.uses_error_catalog(), None);

        let untyped = ReturnFact {
            line: 2,
            kind: ReturnKind::TypedSuccess {
                explicit_type: false,
            },
            raw_text: "this.ok(user)".to_string(),
        };
        assert_eq!(untyped.has_explicit_type(), Some(false));
        assert_eq!(untyped.uses_error_catalog(), None);
    }

    #[test]
    fn test_verb_parse() {
        assert_eq!(HttpVerb::parse("delete"), Some(HttpVerb::Delete));
        assert_eq!(HttpVerb::parse("group"), None);
    }
}
