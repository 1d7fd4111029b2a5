//! Function metadata extraction
//!
//! Walks the named function declarations of a parsed source file and records,
//! for each one, its signature and the SQL queries its body issues.

pub mod syntax;
pub mod typescript;

use serde::{Deserialize, Serialize};

use crate::extract::{looks_like_sql, SqlFragment};
use crate::query::{extract_tables, Query};
use syntax::{SourceTree, StringLiteral};

/// A declared function parameter
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Param {
    pub name: String,
    /// Annotation text, `"unknown"` when unannotated
    #[serde(rename = "type")]
    pub type_name: String,
}

impl Param {
    pub fn new(name: impl Into<String>, type_name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            type_name: type_name.into(),
        }
    }
}

/// Metadata for one named function declaration
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ParsedFunction {
    pub name: String,
    pub params: Vec<Param>,
    /// Return annotation text, `"void"` when absent
    pub return_type: String,
    /// Queries in body order
    pub sql_queries: Vec<Query>,
    /// Tables touched by any query, first-seen order
    pub tables_used: Vec<String>,
    pub is_exported: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    /// Line of the declaration (1-indexed)
    pub line: usize,
}

/// Every function found in one source file, in declaration order
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct FunctionCatalog {
    pub functions: Vec<ParsedFunction>,
}

impl FunctionCatalog {
    /// Functions carrying an `export` modifier
    pub fn exported(&self) -> impl Iterator<Item = &ParsedFunction> {
        self.functions.iter().filter(|f| f.is_exported)
    }

    /// Look up a function by name (first declaration wins)
    pub fn get(&self, name: &str) -> Option<&ParsedFunction> {
        self.functions.iter().find(|f| f.name == name)
    }

    pub fn len(&self) -> usize {
        self.functions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.functions.is_empty()
    }
}

/// Builds a [`FunctionCatalog`] from a syntax tree
pub struct FunctionExtractor;

impl FunctionExtractor {
    pub fn extract(tree: &dyn SourceTree) -> FunctionCatalog {
        let functions: Vec<ParsedFunction> = tree
            .declarations()
            .iter()
            .map(|decl| {
                let mut literals = Vec::new();
                decl.visit_literals(&mut |lit: StringLiteral| literals.push(lit));

                let mut sql_queries = Vec::new();
                let mut tables_used: Vec<String> = Vec::new();
                for lit in literals {
                    let body = lit.body.trim();
                    if !looks_like_sql(body) {
                        continue;
                    }
                    let fragment = SqlFragment::new(body, lit.span);
                    for table in extract_tables(&fragment.text) {
                        if !tables_used.contains(&table) {
                            tables_used.push(table);
                        }
                    }
                    sql_queries.push(Query::from_fragment(&fragment));
                }

                let name = decl.name();
                tracing::trace!(function = %name, queries = sql_queries.len(), "extracted function");

                ParsedFunction {
                    name,
                    params: decl.params(),
                    return_type: decl.return_type().unwrap_or_else(|| "void".to_string()),
                    sql_queries,
                    tables_used,
                    is_exported: decl.is_exported(),
                    description: decl.doc_comment().as_deref().and_then(description),
                    line: decl.line(),
                }
            })
            .collect();

        tracing::debug!(functions = functions.len(), "extracted functions");
        FunctionCatalog { functions }
    }
}

/// First description line of a `/** ... */` block.
///
/// Leading `*` gutters are stripped and blank lines skipped; the line is cut
/// at the first `@`. `None` when the block opens with a tag or has no text.
pub fn description(raw: &str) -> Option<String> {
    let inner = raw.trim().strip_prefix("/**")?;
    let inner = inner.strip_suffix("*/").unwrap_or(inner);

    let line = inner
        .lines()
        .map(|line| line.trim().trim_start_matches('*').trim())
        .find(|line| !line.is_empty())?;

    let text = line.split('@').next().unwrap_or_default().trim();
    (!text.is_empty()).then(|| text.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::Span;
    use crate::functions::syntax::FunctionNode;
    use crate::query::QueryKind;
    use pretty_assertions::assert_eq;

    struct FakeTree(Vec<FakeFunction>);

    struct FakeFunction {
        name: &'static str,
        exported: bool,
        doc: Option<&'static str>,
        literals: Vec<&'static str>,
    }

    impl SourceTree for FakeTree {
        fn declarations(&self) -> Vec<Box<dyn FunctionNode + '_>> {
            self.0
                .iter()
                .map(|f| Box::new(f) as Box<dyn FunctionNode + '_>)
                .collect()
        }
    }

    impl FunctionNode for &FakeFunction {
        fn name(&self) -> String {
            self.name.to_string()
        }

        fn params(&self) -> Vec<Param> {
            Vec::new()
        }

        fn return_type(&self) -> Option<String> {
            None
        }

        fn is_exported(&self) -> bool {
            self.exported
        }

        fn doc_comment(&self) -> Option<String> {
            self.doc.map(str::to_string)
        }

        fn line(&self) -> usize {
            1
        }

        fn visit_literals(&self, visitor: &mut dyn FnMut(StringLiteral)) {
            for (i, body) in self.literals.iter().enumerate() {
                visitor(StringLiteral {
                    body: body.to_string(),
                    span: Span {
                        offset: i * 10,
                        length: body.len(),
                        line: i + 2,
                        column: 1,
                    },
                });
            }
        }
    }

    #[test]
    fn test_extract_queries_and_tables() {
        let tree = FakeTree(vec![FakeFunction {
            name: "sync",
            exported: true,
            doc: None,
            literals: vec![
                "\n  SELECT * FROM posts p\n  JOIN users u ON u.id = p.user_id\n",
                "not sql",
                "UPDATE users SET seen = 1",
            ],
        }]);

        let catalog = FunctionExtractor::extract(&tree);
        let f = catalog.get("sync").unwrap();

        assert_eq!(f.return_type, "void");
        assert_eq!(f.tables_used, vec!["posts", "users"]);
        assert_eq!(
            f.sql_queries,
            vec![
                Query {
                    sql: "SELECT * FROM posts p JOIN users u ON u.id = p.user_id".to_string(),
                    kind: QueryKind::Select,
                    line: 2,
                },
                Query {
                    sql: "UPDATE users SET seen = 1".to_string(),
                    kind: QueryKind::Update,
                    line: 4,
                },
            ]
        );
    }

    #[test]
    fn test_exported_filter() {
        let tree = FakeTree(vec![
            FakeFunction {
                name: "public",
                exported: true,
                doc: Some("/** Public helper */"),
                literals: vec![],
            },
            FakeFunction {
                name: "private",
                exported: false,
                doc: None,
                literals: vec![],
            },
        ]);

        let catalog = FunctionExtractor::extract(&tree);
        assert_eq!(catalog.len(), 2);
        let exported: Vec<&str> = catalog.exported().map(|f| f.name.as_str()).collect();
        assert_eq!(exported, vec!["public"]);
        assert_eq!(
            catalog.get("public").unwrap().description.as_deref(),
            Some("Public helper")
        );
    }

    #[test]
    fn test_description_first_line() {
        let raw = "/**\n * Get posts with their authors using a JOIN\n * @param limit max rows\n */";
        assert_eq!(
            description(raw).as_deref(),
            Some("Get posts with their authors using a JOIN")
        );
    }

    #[test]
    fn test_description_skips_blank_gutter_lines() {
        let raw = "/**\n *\n * Second line wins\n */";
        assert_eq!(description(raw).as_deref(), Some("Second line wins"));
    }

    #[test]
    fn test_description_tag_only() {
        assert_eq!(description("/** @deprecated */"), None);
        assert_eq!(description("/**\n * @returns rows\n */"), None);
        assert_eq!(description("/** */"), None);
    }

    #[test]
    fn test_description_cut_at_tag() {
        assert_eq!(
            description("/** Fetch users @internal */").as_deref(),
            Some("Fetch users")
        );
    }

    #[test]
    fn test_description_omitted_from_json() {
        let f = ParsedFunction {
            name: "f".to_string(),
            params: vec![Param::new("id", "string")],
            return_type: "void".to_string(),
            sql_queries: vec![],
            tables_used: vec![],
            is_exported: false,
            description: None,
            line: 1,
        };
        let json = serde_json::to_value(&f).unwrap();
        assert!(json.get("description").is_none());
        assert_eq!(json["returnType"], "void");
        assert_eq!(json["isExported"], false);
        assert_eq!(json["params"][0]["type"], "string");
    }
}
