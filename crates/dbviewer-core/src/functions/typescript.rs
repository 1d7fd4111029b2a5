//! TypeScript / JavaScript syntax trees via tree-sitter

use tree_sitter::{Node, Parser, Tree};

use crate::error::{Error, Result, Span};
use crate::functions::syntax::{FunctionNode, SourceTree, StringLiteral};
use crate::functions::Param;
use crate::language::SourceLanguage;

/// Node kinds recorded as function declarations
const DECLARATION_KINDS: [&str; 3] = [
    "function_declaration",
    "generator_function_declaration",
    "function_signature",
];

/// Node kinds whose contents belong to some other function's body
const FUNCTION_SCOPE_KINDS: [&str; 6] = [
    "arrow_function",
    "function_expression",
    "function",
    "generator_function",
    "method_definition",
    "class_body",
];

/// A TypeScript source file parsed with tree-sitter
pub struct TypeScriptTree {
    tree: Tree,
    source: String,
}

impl TypeScriptTree {
    pub fn parse(source: &str, language: SourceLanguage) -> Result<Self> {
        Self::parse_with_origin(source, language, "<source>")
    }

    /// Like [`TypeScriptTree::parse`], naming `origin` in a syntax error
    pub(crate) fn parse_with_origin(
        source: &str,
        language: SourceLanguage,
        origin: &str,
    ) -> Result<Self> {
        let mut parser = Parser::new();
        parser
            .set_language(&language.grammar())
            .map_err(|e| Error::Grammar(e.to_string()))?;

        let tree = parser.parse(source, None).ok_or_else(|| Error::Syntax {
            origin: origin.to_string(),
        })?;

        if tree.root_node().has_error() {
            tracing::debug!(origin, "syntax tree contains errors, continuing");
        }

        Ok(Self {
            tree,
            source: source.to_string(),
        })
    }
}

impl SourceTree for TypeScriptTree {
    fn declarations(&self) -> Vec<Box<dyn FunctionNode + '_>> {
        let mut found = Vec::new();
        collect_declarations(self.tree.root_node(), &self.source, &mut found);
        found
            .into_iter()
            .map(|f| Box::new(f) as Box<dyn FunctionNode + '_>)
            .collect()
    }
}

fn collect_declarations<'a>(node: Node<'a>, source: &'a str, out: &mut Vec<TsFunction<'a>>) {
    if DECLARATION_KINDS.contains(&node.kind()) {
        if node.child_by_field_name("name").is_some() {
            out.push(TsFunction { node, source });
        }
        return;
    }
    if FUNCTION_SCOPE_KINDS.contains(&node.kind()) {
        return;
    }

    let mut cursor = node.walk();
    for child in node.named_children(&mut cursor) {
        collect_declarations(child, source, out);
    }
}

struct TsFunction<'a> {
    node: Node<'a>,
    source: &'a str,
}

impl<'a> TsFunction<'a> {
    fn text(&self, node: Node<'_>) -> &'a str {
        &self.source[node.byte_range()]
    }

    /// `: T` annotation text without the colon
    fn annotation(&self, node: Node<'_>) -> String {
        self.text(node).trim_start_matches(':').trim().to_string()
    }

    /// The node a leading comment would precede: the export statement when exported
    fn anchor(&self) -> Node<'a> {
        match self.node.parent() {
            Some(parent) if parent.kind() == "export_statement" => parent,
            _ => self.node,
        }
    }
}

impl FunctionNode for TsFunction<'_> {
    fn name(&self) -> String {
        self.node
            .child_by_field_name("name")
            .map(|n| self.text(n).to_string())
            .unwrap_or_default()
    }

    fn params(&self) -> Vec<Param> {
        let Some(params) = self.node.child_by_field_name("parameters") else {
            return Vec::new();
        };

        let mut cursor = params.walk();
        params
            .named_children(&mut cursor)
            .filter(|child| {
                matches!(
                    child.kind(),
                    "required_parameter" | "optional_parameter" | "rest_parameter"
                )
            })
            .map(|param| {
                let name = param
                    .child_by_field_name("pattern")
                    .map(|p| self.text(p).trim_start_matches("...").to_string())
                    .unwrap_or_else(|| self.text(param).to_string());
                let type_name = param
                    .child_by_field_name("type")
                    .map(|t| self.annotation(t))
                    .unwrap_or_else(|| "unknown".to_string());
                Param::new(name, type_name)
            })
            .collect()
    }

    fn return_type(&self) -> Option<String> {
        self.node
            .child_by_field_name("return_type")
            .map(|t| self.annotation(t))
    }

    fn is_exported(&self) -> bool {
        self.anchor().kind() == "export_statement"
    }

    fn doc_comment(&self) -> Option<String> {
        let prev = self.anchor().prev_sibling()?;
        let text = self.text(prev);
        (prev.kind() == "comment" && text.starts_with("/**")).then(|| text.to_string())
    }

    fn line(&self) -> usize {
        self.node.start_position().row + 1
    }

    fn visit_literals(&self, visitor: &mut dyn FnMut(StringLiteral)) {
        if let Some(body) = self.node.child_by_field_name("body") {
            visit_literal_nodes(body, self.source, visitor);
        }
    }
}

fn visit_literal_nodes(node: Node<'_>, source: &str, visitor: &mut dyn FnMut(StringLiteral)) {
    let body = match node.kind() {
        "string" => Some(string_value(node, source)),
        // Placeholders and escapes stay as written
        "template_string" => {
            let range = node.byte_range();
            (range.len() >= 2).then(|| source[range.start + 1..range.end - 1].to_string())
        }
        _ => None,
    };
    if let Some(body) = body {
        visitor(StringLiteral {
            body,
            span: Span::from_node(&node),
        });
    }

    let mut cursor = node.walk();
    for child in node.named_children(&mut cursor) {
        visit_literal_nodes(child, source, visitor);
    }
}

/// Value of a quoted string: fragments as written, escape sequences decoded
fn string_value(node: Node<'_>, source: &str) -> String {
    let mut value = String::new();
    let mut cursor = node.walk();
    for child in node.named_children(&mut cursor) {
        let text = &source[child.byte_range()];
        if child.kind() == "escape_sequence" {
            value.push_str(&unescape(text));
        } else {
            value.push_str(text);
        }
    }
    value
}

/// Decode one escape sequence. Malformed numeric escapes are kept verbatim.
fn unescape(seq: &str) -> String {
    let body = seq.strip_prefix('\\').unwrap_or(seq);
    let mut chars = body.chars();
    let decoded = match chars.next() {
        Some('n') => Some('\n'),
        Some('t') => Some('\t'),
        Some('r') => Some('\r'),
        Some('b') => Some('\u{8}'),
        Some('f') => Some('\u{c}'),
        Some('v') => Some('\u{b}'),
        Some('0') if body.len() == 1 => Some('\0'),
        Some('x') => code_point(chars.as_str()),
        Some('u') => code_point(chars.as_str().trim_start_matches('{').trim_end_matches('}')),
        // Line continuation
        Some('\r' | '\n' | '\u{2028}' | '\u{2029}') => return String::new(),
        Some(c) => Some(c),
        None => None,
    };
    decoded.map_or_else(|| seq.to_string(), String::from)
}

fn code_point(hex: &str) -> Option<char> {
    u32::from_str_radix(hex, 16).ok().and_then(char::from_u32)
}
