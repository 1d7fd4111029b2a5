//! Error and source location types

use std::path::PathBuf;

use serde::{Deserialize, Serialize};

/// Source location span
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Span {
    /// Byte offset from start of source
    pub offset: usize,
    /// Length in bytes
    pub length: usize,
    /// Line number (1-indexed)
    pub line: usize,
    /// Column number (1-indexed)
    pub column: usize,
}

impl Span {
    /// Create a span for `offset..offset + length`, resolving line and column in `source`
    pub fn locate(source: &str, offset: usize, length: usize) -> Self {
        let (line, column) = offset_to_line_col(source, offset);
        Self {
            offset,
            length,
            line,
            column,
        }
    }

    /// Create a span from a tree-sitter node
    pub fn from_node(node: &tree_sitter::Node) -> Self {
        let start = node.start_position();
        Self {
            offset: node.start_byte(),
            length: node.end_byte() - node.start_byte(),
            line: start.row + 1,
            column: start.column + 1,
        }
    }
}

/// Convert byte offset to line and column (1-indexed)
fn offset_to_line_col(source: &str, offset: usize) -> (usize, usize) {
    let mut line = 1;
    let mut col = 1;

    for (i, ch) in source.char_indices() {
        if i >= offset {
            break;
        }
        if ch == '\n' {
            line += 1;
            col = 1;
        } else {
            col += 1;
        }
    }

    (line, col)
}

/// File-level failures. Fragment-level problems never surface here: a
/// literal that fails every pattern is dropped, not reported.
#[derive(Debug, thiserror::Error, miette::Diagnostic)]
pub enum Error {
    #[error("failed to read {}", path.display())]
    #[diagnostic(code(dbviewer::read))]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("unsupported source language for {}", path.display())]
    #[diagnostic(
        code(dbviewer::unsupported_language),
        help("supported extensions: .ts, .tsx, .mts, .cts, .js, .jsx, .mjs, .cjs")
    )]
    UnsupportedLanguage { path: PathBuf },

    #[error("failed to build a syntax tree for {origin}")]
    #[diagnostic(code(dbviewer::syntax))]
    Syntax { origin: String },

    #[error("failed to load grammar: {0}")]
    #[diagnostic(code(dbviewer::grammar))]
    Grammar(String),
}

pub type Result<T> = std::result::Result<T, Error>;
