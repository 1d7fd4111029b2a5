//! Query classification - statement kind and referenced tables

use std::sync::LazyLock;

use regex::Regex;
use serde::{Deserialize, Serialize};
use sqlparser::dialect::GenericDialect;
use sqlparser::keywords::Keyword;
use sqlparser::tokenizer::{Token, Tokenizer};

use crate::extract::SqlFragment;

/// Keyword-anchored patterns, each matched independently over the whole statement
static TABLE_PATTERNS: LazyLock<[Regex; 5]> = LazyLock::new(|| {
    [
        r"(?i)FROM\s+(\w+)",
        r"(?i)JOIN\s+(\w+)",
        r"(?i)INSERT\s+(?:OR\s+\w+\s+)?INTO\s+(\w+)",
        r"(?i)UPDATE\s+(\w+)",
        r"(?i)DELETE\s+FROM\s+(\w+)",
    ]
    .map(|pattern| Regex::new(pattern).expect("table pattern is valid"))
});

/// Statement kind of an extracted query
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum QueryKind {
    Select,
    Insert,
    Update,
    Delete,
    Other,
}

impl QueryKind {
    /// Classify a statement by its first keyword
    pub fn classify(sql: &str) -> Self {
        match first_keyword(sql) {
            Some(Keyword::SELECT) => QueryKind::Select,
            Some(Keyword::INSERT) => QueryKind::Insert,
            Some(Keyword::UPDATE) => QueryKind::Update,
            Some(Keyword::DELETE) => QueryKind::Delete,
            Some(_) => QueryKind::Other,
            None => Self::classify_word(sql),
        }
    }

    /// Fallback for text the tokenizer rejects (template placeholders, stray quotes)
    fn classify_word(sql: &str) -> Self {
        let word = sql.split_whitespace().next().unwrap_or_default();
        match word.to_uppercase().as_str() {
            "SELECT" => QueryKind::Select,
            "INSERT" => QueryKind::Insert,
            "UPDATE" => QueryKind::Update,
            "DELETE" => QueryKind::Delete,
            _ => QueryKind::Other,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            QueryKind::Select => "SELECT",
            QueryKind::Insert => "INSERT",
            QueryKind::Update => "UPDATE",
            QueryKind::Delete => "DELETE",
            QueryKind::Other => "OTHER",
        }
    }
}

impl std::fmt::Display for QueryKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// First non-trivia token as a keyword. `None` if tokenizing fails or the
/// statement does not start with a word.
fn first_keyword(sql: &str) -> Option<Keyword> {
    let dialect = GenericDialect {};
    let tokens = Tokenizer::new(&dialect, sql).tokenize().ok()?;
    let first = tokens
        .into_iter()
        .find(|token| !matches!(token, Token::Whitespace(_)))?;
    match first {
        Token::Word(word) => Some(word.keyword),
        _ => None,
    }
}

/// A query found in a function body
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Query {
    /// Whitespace-collapsed SQL text
    pub sql: String,
    #[serde(rename = "type")]
    pub kind: QueryKind,
    /// Line of the literal in the source file (1-indexed)
    pub line: usize,
}

impl Query {
    pub fn from_fragment(fragment: &SqlFragment) -> Self {
        Self {
            sql: normalize_sql(&fragment.text),
            kind: QueryKind::classify(&fragment.text),
            line: fragment.span.line,
        }
    }
}

/// Collapse whitespace runs to a single space and trim
pub fn normalize_sql(sql: &str) -> String {
    sql.split_whitespace().collect::<Vec<_>>().join(" ")
}

/// Table names a statement touches. Whole-string scan: any word following
/// `FROM`, `JOIN`, `INSERT [OR x] INTO`, `UPDATE` or `DELETE FROM` counts.
pub fn extract_tables(sql: &str) -> Vec<String> {
    let mut tables: Vec<String> = Vec::new();

    for pattern in TABLE_PATTERNS.iter() {
        for captures in pattern.captures_iter(sql) {
            let name = &captures[1];
            if !tables.iter().any(|t| t == name) {
                tables.push(name.to_string());
            }
        }
    }

    tables
}
