//! Textual matchers applied to node text.
//!
//! Detection is shallow: identifiers are matched as words in
//! the source text of already-parsed nodes. Aliased imports or wrapper
//! helpers are not resolved.

use once_cell::sync::Lazy;
use regex::Regex;

use crate::config::Conventions;

/// `:identifier` segments in a route path.
static PATH_PARAM: Lazy<Regex> =
    Lazy::new(|| Regex::new(r":([A-Za-z_][A-Za-z0-9_]*)").expect("valid path param regex"));

/// Extract route parameter names from a path, left to right, keeping duplicates.
pub fn path_params(path: &str) -> Vec<String> {
    PATH_PARAM
        .captures_iter(path)
        .map(|c| c[1].to_string())
        .collect()
}

/// Strip one matching pair of surrounding quote characters from a literal.
pub fn strip_quotes(text: &str) -> &str {
    ['"', '\'', '`']
        .into_iter()
        .find_map(|q| text.strip_prefix(q)?.strip_suffix(q))
        .unwrap_or(text)
}

/// Compiled form of [`Conventions`].
#[derive(Debug, Clone)]
pub struct Matchers {
    request: Regex,
    params: Regex,
    validation: String,
    success: Regex,
    error: Regex,
    catalog_access: Regex,
}

impl Matchers {
    /// Compile matchers for the configured identifiers.
    pub fn new(conventions: &Conventions) -> Result<Self, regex::Error> {
        Ok(Self {
            request: word(&conventions.request_accessor)?,
            params: word(&conventions.params_accessor)?,
            validation: conventions.validation_call.clone(),
            success: word(&conventions.success_constructor)?,
            error: word(&conventions.error_constructor)?,
            catalog_access: Regex::new(&format!(
                r"(^|[^\w$]){}\s*\.\s*[A-Za-z_$][\w$]*",
                regex::escape(&conventions.error_catalog)
            ))?,
        })
    }

    /// First-parameter text names the request-data accessor.
    pub fn mentions_request(&self, param_text: &str) -> bool {
        self.request.is_match(param_text)
    }

    /// First-parameter text names the route-parameters accessor.
    pub fn mentions_params(&self, param_text: &str) -> bool {
        self.params.is_match(param_text)
    }

    /// Callee text invokes validation.
    pub fn is_validation_callee(&self, callee_text: &str) -> bool {
        callee_text.contains(&self.validation)
    }

    pub fn is_success(&self, text: &str) -> bool {
        self.success.is_match(text)
    }

    pub fn is_error(&self, text: &str) -> bool {
        self.error.is_match(text)
    }

    /// The success constructor is immediately followed by a non-empty,
    /// balanced type-argument list somewhere in `text`.
    pub fn has_explicit_type(&self, text: &str) -> bool {
        self.success
            .find_iter(text)
            .any(|m| balanced_type_args(&text[m.end()..]))
    }

    /// `text` reads a property off the error catalog (`Catalog.NAME`).
    pub fn uses_catalog(&self, text: &str) -> bool {
        self.catalog_access.is_match(text)
    }
}

/// Regex matching `ident` as a standalone identifier.
fn word(ident: &str) -> Result<Regex, regex::Error> {
    Regex::new(&format!(r"\b{}\b", regex::escape(ident)))
}

/// `rest` starts with `<...>` whose brackets balance and whose content is
/// not blank.
fn balanced_type_args(rest: &str) -> bool {
    let mut chars = rest.char_indices();
    match chars.next() {
        Some((_, '<')) => {}
        _ => return false,
    }

    let mut depth = 1usize;
    for (idx, ch) in chars {
        match ch {
            '<' => depth += 1,
            '>' => {
                depth -= 1;
                if depth == 0 {
                    return !rest[1..idx].trim().is_empty();
                }
            }
            _ => {}
        }
    }
    false
}
