//! TypeScript analyzer using tree-sitter.
//!
//! Handles both sides of an AdonisJS project: the routing file
//! (`router.get('/users/:id', [UsersController, 'show'])`) and controller
//! classes (`export default class UsersController { ... }`).

use std::path::Path;

use streaming_iterator::StreamingIterator;
use tree_sitter::{Language, Node, Parser, Query, QueryCursor};

use crate::analysis::conventions::{path_params, strip_quotes};
use crate::analysis::{
    HttpVerb, Matchers, MethodFacts, ParsedFile, ReturnFact, ReturnKind, RouteRecord,
    SourceAnalyzer,
};

/// Member-call expressions: candidates for `<registrar>.<verb>(...)`.
const ROUTE_CALL_QUERY: &str = r#"
(call_expression
  function: (member_expression
    object: (_) @registrar
    property: (_) @verb)
  arguments: (arguments) @args
) @call
"#;

/// Every call inside a method body, at any depth.
const CALL_QUERY: &str = r#"
(call_expression
  function: (_) @callee
) @call
"#;

/// Every return inside a method body, at any depth.
const RETURN_QUERY: &str = r#"
(return_statement) @return
"#;

pub struct TypeScriptAnalyzer {
    language: Language,
}

impl TypeScriptAnalyzer {
    pub fn new() -> Self {
        Self {
            language: tree_sitter_typescript::LANGUAGE_TYPESCRIPT.into(),
        }
    }

    fn create_parser(&self) -> anyhow::Result<Parser> {
        let mut parser = Parser::new();
        parser.set_language(&self.language)?;
        Ok(parser)
    }

    /// Build a route from a matched call, or `None` when the call is not a
    /// route registration we can analyze.
    fn route_from_call(
        &self,
        parsed: &ParsedFile,
        call: Node,
        registrar: Node,
        verb: Node,
        args: Node,
    ) -> Option<RouteRecord> {
        if registrar.kind() != "identifier" {
            return None;
        }
        let verb = HttpVerb::parse(parsed.node_text(verb))?;

        let args = named_children(args);
        if args.len() < 2 {
            return None;
        }

        // Inline closures and other handler shapes are not analyzable.
        let target = args[1];
        if target.kind() != "array" {
            return None;
        }
        let elements = named_children(target);
        if elements.len() != 2 {
            return None;
        }

        let path = strip_quotes(parsed.node_text(args[0])).to_string();
        let controller = parsed.node_text(elements[0]).to_string();
        let handler = strip_quotes(parsed.node_text(elements[1])).to_string();
        if controller.is_empty() || handler.is_empty() {
            return None;
        }

        Some(RouteRecord {
            verb,
            path_params: path_params(&path),
            path,
            controller,
            handler,
            line: parsed.node_line(call),
        })
    }

    /// Find the class the module exports as default.
    ///
    /// Handles `export default class X {}` as well as a class declared on its
    /// own and exported later with `export default X`.
    fn default_export_class<'t>(&self, parsed: &'t ParsedFile) -> Option<Node<'t>> {
        let root = parsed.tree.root_node();
        let mut cursor = root.walk();
        let top_level: Vec<Node<'t>> = root.children(&mut cursor).collect();

        for export in top_level.iter().filter(|n| n.kind() == "export_statement") {
            let mut cursor = export.walk();
            let children: Vec<Node<'t>> = export.children(&mut cursor).collect();
            if !children.iter().any(|c| c.kind() == "default") {
                continue;
            }
            if let Some(class) = children.iter().copied().find(|c| is_class(*c)) {
                return Some(class);
            }
            if let Some(ident) = children.iter().find(|c| c.kind() == "identifier") {
                let name = parsed.node_text(*ident);
                return top_level
                    .iter()
                    .filter_map(|n| match n.kind() {
                        "export_statement" => n.child_by_field_name("declaration"),
                        _ => Some(*n),
                    })
                    .find(|n| {
                        is_class(*n)
                            && n.child_by_field_name("name")
                                .is_some_and(|id| parsed.node_text(id) == name)
                    });
            }
        }
        None
    }

    fn method_facts(
        &self,
        parsed: &ParsedFile,
        class_name: &str,
        method: Node,
        queries: &BodyQueries,
        matchers: &Matchers,
    ) -> Option<MethodFacts> {
        let name = parsed
            .node_text(method.child_by_field_name("name")?)
            .to_string();

        let mut facts = MethodFacts::empty(
            class_name,
            &name,
            &parsed.path,
            parsed.node_line(method),
        );

        if let Some(first) = method
            .child_by_field_name("parameters")
            .and_then(|p| named_children(p).into_iter().next())
        {
            let text = parsed.node_text(first);
            facts.consumes_request = matchers.mentions_request(text);
            facts.consumes_params = matchers.mentions_params(text);
        }

        if let Some(body) = method.child_by_field_name("body") {
            facts.calls_validation = calls_validation(parsed, body, &queries.calls, matchers);
            facts.returns = extract_returns(parsed, body, &queries.returns, matchers);
        }

        Some(facts)
    }
}

/// Queries run against every method body of a file.
struct BodyQueries {
    calls: Query,
    returns: Query,
}

impl BodyQueries {
    fn new(language: &Language) -> anyhow::Result<Self> {
        Ok(Self {
            calls: Query::new(language, CALL_QUERY)?,
            returns: Query::new(language, RETURN_QUERY)?,
        })
    }
}

fn calls_validation(
    parsed: &ParsedFile,
    body: Node,
    query: &Query,
    matchers: &Matchers,
) -> bool {
    let mut cursor = QueryCursor::new();
    let mut matches = cursor.matches(query, body, &parsed.source[..]);

    while let Some(m) = matches.next() {
        for capture in m.captures {
            if query.capture_names()[capture.index as usize] == "callee"
                && matchers.is_validation_callee(parsed.node_text(capture.node))
            {
                return true;
            }
        }
    }
    false
}

fn extract_returns(
    parsed: &ParsedFile,
    body: Node,
    query: &Query,
    matchers: &Matchers,
) -> Vec<ReturnFact> {
    let mut cursor = QueryCursor::new();
    let mut matches = cursor.matches(query, body, &parsed.source[..]);

    let mut returns = Vec::new();
    while let Some(m) = matches.next() {
        for capture in m.captures {
            let stmt = capture.node;
            // Bare `return;` carries nothing to classify.
            let Some(expr) = named_children(stmt).into_iter().next() else {
                continue;
            };
            let text = parsed.node_text(expr).to_string();
            returns.push(ReturnFact {
                line: parsed.node_line(stmt),
                kind: classify_return(&text, matchers),
                raw_text: text,
            });
        }
    }

    returns.sort_by_key(|r| r.line);
    returns
}

fn is_class(node: Node) -> bool {
    matches!(
        node.kind(),
        "class_declaration" | "abstract_class_declaration" | "class"
    )
}

/// Classify a returned expression by its text.
fn classify_return(text: &str, matchers: &Matchers) -> ReturnKind {
    if matchers.is_success(text) {
        ReturnKind::TypedSuccess {
            explicit_type: matchers.has_explicit_type(text),
        }
    } else if matchers.is_error(text) {
        ReturnKind::ErrorReport {
            uses_catalog: matchers.uses_catalog(text),
        }
    } else {
        ReturnKind::Other
    }
}

/// Named children of a node, skipping comments.
fn named_children(node: Node) -> Vec<Node> {
    let mut cursor = node.walk();
    let children = node
        .named_children(&mut cursor)
        .filter(|n| n.kind() != "comment")
        .collect();
    children
}

impl Default for TypeScriptAnalyzer {
    fn default() -> Self {
        Self::new()
    }
}

impl SourceAnalyzer for TypeScriptAnalyzer {
    fn file_extension(&self) -> &'static str {
        "ts"
    }

    fn parse(&self, path: &Path, source: &[u8]) -> anyhow::Result<ParsedFile> {
        let mut parser = self.create_parser()?;
        let tree = parser.parse(source, None).ok_or_else(|| {
            anyhow::anyhow!("failed to parse TypeScript source: {}", path.display())
        })?;

        Ok(ParsedFile {
            tree,
            source: source.to_vec(),
            path: path.to_string_lossy().to_string(),
        })
    }

    fn extract_routes(&self, parsed: &ParsedFile) -> anyhow::Result<Vec<RouteRecord>> {
        let query = Query::new(&self.language, ROUTE_CALL_QUERY)?;
        let mut cursor = QueryCursor::new();
        let mut matches = cursor.matches(&query, parsed.tree.root_node(), &parsed.source[..]);

        let mut routes = Vec::new();
        while let Some(m) = matches.next() {
            let mut call = None;
            let mut registrar = None;
            let mut verb = None;
            let mut args = None;

            for capture in m.captures {
                match query.capture_names()[capture.index as usize] {
                    "call" => call = Some(capture.node),
                    "registrar" => registrar = Some(capture.node),
                    "verb" => verb = Some(capture.node),
                    "args" => args = Some(capture.node),
                    _ => {}
                }
            }

            if let (Some(call), Some(registrar), Some(verb), Some(args)) =
                (call, registrar, verb, args)
            {
                if let Some(route) = self.route_from_call(parsed, call, registrar, verb, args) {
                    routes.push(route);
                }
            }
        }

        // Source order.
        routes.sort_by_key(|r| r.line);
        Ok(routes)
    }

    fn extract_methods(
        &self,
        parsed: &ParsedFile,
        matchers: &Matchers,
    ) -> anyhow::Result<Vec<MethodFacts>> {
        let class = match self.default_export_class(parsed) {
            Some(c) => c,
            None => return Ok(Vec::new()),
        };

        let class_name = class
            .child_by_field_name("name")
            .map(|n| parsed.node_text(n).to_string())
            .unwrap_or_default();

        let body = match class.child_by_field_name("body") {
            Some(b) => b,
            None => return Ok(Vec::new()),
        };

        let queries = BodyQueries::new(&self.language)?;
        let methods = named_children(body)
            .into_iter()
            .filter(|member| member.kind() == "method_definition")
            .filter_map(|member| {
                self.method_facts(parsed, &class_name, member, &queries, matchers)
            })
            .collect();
        Ok(methods)
    }
}
