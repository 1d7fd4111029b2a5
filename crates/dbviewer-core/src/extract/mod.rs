//! SQL fragment extraction - finds SQL-looking string literals in source text

use std::ops::Range;

use serde::{Deserialize, Serialize};

use crate::error::Span;

/// Statement keywords a literal must start with to count as SQL
const SQL_KEYWORDS: [&str; 8] = [
    "SELECT", "INSERT", "UPDATE", "DELETE", "CREATE", "ALTER", "DROP", "PRAGMA",
];

/// A candidate SQL string lifted out of a source file
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SqlFragment {
    /// Literal body, trimmed. Template placeholders are kept verbatim.
    pub text: String,
    /// Location of the whole literal, delimiters included
    pub span: Span,
}

impl SqlFragment {
    pub fn new(text: impl Into<String>, span: Span) -> Self {
        Self {
            text: text.into(),
            span,
        }
    }
}

/// Check if a string looks like SQL (starts with a statement keyword, ignoring case)
pub fn looks_like_sql(text: &str) -> bool {
    let text = text.trim_start().as_bytes();
    SQL_KEYWORDS.iter().any(|keyword| {
        text.len() >= keyword.len() && text[..keyword.len()].eq_ignore_ascii_case(keyword.as_bytes())
    })
}

/// Extract all SQL-looking string literals from raw source text, in source order.
///
/// Recognizes backtick template literals (with `${...}` substitutions),
/// triple-quoted strings, and ordinary single/double-quoted strings. Literals
/// nested inside a template substitution are reported on their own as well.
pub fn extract_fragments(source: &str) -> Vec<SqlFragment> {
    let mut scanner = LiteralScanner::new(source);
    scanner.scan_code(0, false);

    let mut literals = scanner.literals;
    literals.sort_by_key(|lit| lit.outer.start);

    literals
        .into_iter()
        .filter_map(|lit| {
            let body = source[lit.body].trim();
            if !looks_like_sql(body) {
                return None;
            }
            let span = Span::locate(source, lit.outer.start, lit.outer.len());
            Some(SqlFragment::new(body, span))
        })
        .collect()
}

#[derive(Debug)]
struct Literal {
    /// Delimiters included
    outer: Range<usize>,
    body: Range<usize>,
}

struct LiteralScanner<'a> {
    bytes: &'a [u8],
    literals: Vec<Literal>,
}

impl<'a> LiteralScanner<'a> {
    fn new(source: &'a str) -> Self {
        Self {
            bytes: source.as_bytes(),
            literals: Vec::new(),
        }
    }

    fn starts_with_at(&self, i: usize, pat: &[u8]) -> bool {
        self.bytes.get(i..i + pat.len()) == Some(pat)
    }

    /// Scan code (outside any literal) from `i`. With `in_substitution`, stop
    /// after the `}` that closes the enclosing `${` and return its end offset.
    fn scan_code(&mut self, mut i: usize, in_substitution: bool) -> usize {
        let len = self.bytes.len();
        let mut depth = 0usize;

        while i < len {
            match self.bytes[i] {
                b'`' => i = self.scan_template(i),
                b'"' if self.starts_with_at(i, b"\"\"\"") => i = self.scan_triple(i, b'"'),
                b'\'' if self.starts_with_at(i, b"'''") => i = self.scan_triple(i, b'\''),
                quote @ (b'"' | b'\'') => i = self.scan_quoted(i, quote),
                b'/' if self.starts_with_at(i, b"//") => {
                    while i < len && self.bytes[i] != b'\n' {
                        i += 1;
                    }
                }
                b'/' if self.starts_with_at(i, b"/*") => {
                    i += 2;
                    while i < len && !self.starts_with_at(i, b"*/") {
                        i += 1;
                    }
                    i = (i + 2).min(len);
                }
                b'{' if in_substitution => {
                    depth += 1;
                    i += 1;
                }
                b'}' if in_substitution => {
                    if depth == 0 {
                        return i + 1;
                    }
                    depth -= 1;
                    i += 1;
                }
                _ => i += 1,
            }
        }

        len
    }

    /// Backtick template literal. Unterminated templates are dropped.
    fn scan_template(&mut self, start: usize) -> usize {
        let len = self.bytes.len();
        let mut i = start + 1;

        while i < len {
            match self.bytes[i] {
                b'\\' => i += 2,
                b'`' => {
                    self.record(start, start + 1, i, i + 1);
                    return i + 1;
                }
                b'$' if self.starts_with_at(i, b"${") => i = self.scan_code(i + 2, true),
                _ => i += 1,
            }
        }

        len
    }

    /// `"""..."""` or `'''...'''`, may span lines
    fn scan_triple(&mut self, start: usize, quote: u8) -> usize {
        let len = self.bytes.len();
        let delim = [quote; 3];
        let mut i = start + 3;

        while i < len {
            if self.bytes[i] == b'\\' {
                i += 2;
            } else if self.starts_with_at(i, &delim) {
                self.record(start, start + 3, i, i + 3);
                return i + 3;
            } else {
                i += 1;
            }
        }

        len
    }

    /// Ordinary quoted string. An unescaped newline abandons the literal and
    /// scanning resumes at the newline.
    fn scan_quoted(&mut self, start: usize, quote: u8) -> usize {
        let len = self.bytes.len();
        let mut i = start + 1;

        while i < len {
            match self.bytes[i] {
                b'\\' => i += 2,
                b'\n' => return i,
                b if b == quote => {
                    self.record(start, start + 1, i, i + 1);
                    return i + 1;
                }
                _ => i += 1,
            }
        }

        len
    }

    fn record(&mut self, start: usize, body_start: usize, body_end: usize, end: usize) {
        self.literals.push(Literal {
            outer: start..end,
            body: body_start..body_end,
        });
    }
}
