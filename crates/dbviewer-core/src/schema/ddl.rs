//! DDL statement parsing - CREATE TABLE / CREATE INDEX by tolerant pattern matching
//!
//! Every function here is best-effort: a statement or item that does not fit
//! its pattern yields `None` and is skipped by the caller. Nothing panics or
//! errors on malformed SQL.

use std::sync::LazyLock;

use regex::Regex;

use crate::schema::{Column, ForeignKey, Index, Table};

/// Identifier, optionally wrapped in `"`, backticks or brackets
macro_rules! ident {
    () => {
        r#"["`\[]?(\w+)["`\]]?"#
    };
}

/// Referential action: multi-word actions first so `SET NULL` is not cut to `SET`
macro_rules! action {
    () => {
        r"(SET\s+NULL|SET\s+DEFAULT|NO\s+ACTION|\w+)"
    };
}

static CREATE_TABLE_SHAPE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?i)CREATE\s+TABLE").expect("valid regex"));

static CREATE_INDEX_SHAPE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?i)CREATE\s+(?:UNIQUE\s+)?INDEX").expect("valid regex"));

static CREATE_TABLE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(concat!(
        r"(?i)CREATE\s+TABLE\s+(?:IF\s+NOT\s+EXISTS\s+)?",
        ident!(),
        r"\s*\("
    ))
    .expect("valid regex")
});

static CREATE_INDEX: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(concat!(
        r"(?is)CREATE\s+(UNIQUE\s+)?INDEX\s+(?:IF\s+NOT\s+EXISTS\s+)?",
        ident!(),
        r"\s+ON\s+",
        ident!(),
        r"\s*\(([^)]+)\)"
    ))
    .expect("valid regex")
});

static FOREIGN_KEY_PREFIX: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?i)^FOREIGN\s+KEY").expect("valid regex"));

static PRIMARY_KEY_PREFIX: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?i)^PRIMARY\s+KEY").expect("valid regex"));

static IGNORED_CONSTRAINT_PREFIX: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?i)^(?:UNIQUE|CHECK|CONSTRAINT)\b").expect("valid regex"));

static PRIMARY_KEY_COLUMNS: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?i)PRIMARY\s+KEY\s*\(([^)]+)\)").expect("valid regex"));

static FOREIGN_KEY: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(concat!(
        r"(?is)FOREIGN\s+KEY\s*\(([^)]+)\)\s*REFERENCES\s+",
        ident!(),
        r"\s*\(([^)]+)\)"
    ))
    .expect("valid regex")
});

static INLINE_REFERENCES: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(concat!(
        r"(?is)\bREFERENCES\s+",
        ident!(),
        r"\s*\(\s*",
        ident!(),
        r"\s*\)"
    ))
    .expect("valid regex")
});

static ON_DELETE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(concat!(r"(?i)\bON\s+DELETE\s+", action!())).expect("valid regex")
});

static ON_UPDATE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(concat!(r"(?i)\bON\s+UPDATE\s+", action!())).expect("valid regex")
});

static COLUMN: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(concat!(r"(?s)^", ident!(), r"\s+(\w+)(.*)$")).expect("valid regex"));

static PRIMARY_KEY_FLAG: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?i)PRIMARY\s+KEY").expect("valid regex"));

static AUTO_INCREMENT_FLAG: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?i)AUTO_?INCREMENT").expect("valid regex"));

static NOT_NULL_FLAG: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?i)NOT\s+NULL").expect("valid regex"));

static DEFAULT_BEFORE_CONSTRAINT: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?is)\bDEFAULT\s+(.+?)\s+(?:NOT\s+NULL|PRIMARY|FOREIGN|UNIQUE|CHECK|$)")
        .expect("valid regex")
});

static DEFAULT_AT_END: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?is)\bDEFAULT\s+(\S+)\s*$").expect("valid regex"));

/// Does the statement contain `CREATE TABLE`?
pub fn is_create_table(sql: &str) -> bool {
    CREATE_TABLE_SHAPE.is_match(sql)
}

/// Does the statement contain `CREATE [UNIQUE] INDEX`?
pub fn is_create_index(sql: &str) -> bool {
    CREATE_INDEX_SHAPE.is_match(sql)
}

/// Parse `CREATE TABLE [IF NOT EXISTS] name ( body )`.
///
/// The body runs to the paren matching the opening one; if the statement is
/// unbalanced, to the last `)` in it.
pub fn parse_create_table(sql: &str) -> Option<Table> {
    let captures = CREATE_TABLE.captures(sql)?;
    let name = captures.get(1)?.as_str();
    let open = captures.get(0)?.end();
    let body = &sql[open..matching_paren(sql, open)?];

    let mut table = Table::new(name);

    for item in split_top_level(body) {
        let item = without_comments(item);
        let item = item.trim();
        if FOREIGN_KEY_PREFIX.is_match(item) {
            table.foreign_keys.extend(parse_foreign_key(item));
        } else if PRIMARY_KEY_PREFIX.is_match(item) {
            if let Some(cols) = PRIMARY_KEY_COLUMNS.captures(item) {
                table.primary_key.extend(split_column_list(&cols[1]));
            }
        } else if IGNORED_CONSTRAINT_PREFIX.is_match(item) {
            continue;
        } else if let Some(column) = parse_column(item) {
            if let Some(fk) = parse_inline_reference(&column.name, item) {
                table.foreign_keys.push(fk);
            }
            table.add_column(column);
        } else {
            tracing::trace!(table = name, item, "skipping unrecognized table item");
        }
    }

    Some(table)
}

/// Byte offset of the `)` closing the paren just before `open`. Parens in
/// quoted strings and comments are not counted.
fn matching_paren(sql: &str, open: usize) -> Option<usize> {
    let bytes = sql.as_bytes();
    let mut depth = 0usize;
    let mut i = open;

    while i < bytes.len() {
        if let Some(end) = skip_quoted_or_comment(bytes, i) {
            i = end;
            continue;
        }
        match bytes[i] {
            b'(' => depth += 1,
            b')' if depth == 0 => return Some(i),
            b')' => depth -= 1,
            _ => {}
        }
        i += 1;
    }
    sql.rfind(')').filter(|&close| close >= open)
}

/// Split a table body on commas at parenthesis depth zero. Commas inside
/// single-quoted strings and `--` / `/* */` comments do not split. Comments
/// leading an item are dropped with it; empty items are dropped.
pub fn split_top_level(body: &str) -> Vec<&str> {
    let bytes = body.as_bytes();
    let mut items = Vec::new();
    let mut depth = 0usize;
    let mut start = 0;
    let mut i = 0;

    while i < bytes.len() {
        if let Some(end) = skip_quoted_or_comment(bytes, i) {
            i = end;
            continue;
        }
        match bytes[i] {
            b'(' => depth += 1,
            b')' => depth = depth.saturating_sub(1),
            b',' if depth == 0 => {
                items.push(&body[start..i]);
                start = i + 1;
            }
            _ => {}
        }
        i += 1;
    }
    items.push(&body[start..]);

    items
        .into_iter()
        .map(trim_leading_comments)
        .filter(|item| !item.is_empty())
        .collect()
}

/// End offset of the single-quoted string or SQL comment starting at `i`.
/// Unterminated runs end at the end of input; a line comment ends before
/// its newline.
fn skip_quoted_or_comment(bytes: &[u8], i: usize) -> Option<usize> {
    match bytes[i] {
        b'\'' => Some(find_from(bytes, i + 1, b"'").map_or(bytes.len(), |end| end + 1)),
        b'-' if bytes.get(i + 1) == Some(&b'-') => {
            Some(find_from(bytes, i + 2, b"\n").unwrap_or(bytes.len()))
        }
        b'/' if bytes.get(i + 1) == Some(&b'*') => {
            Some(find_from(bytes, i + 2, b"*/").map_or(bytes.len(), |end| end + 2))
        }
        _ => None,
    }
}

fn find_from(bytes: &[u8], from: usize, pat: &[u8]) -> Option<usize> {
    bytes
        .get(from..)?
        .windows(pat.len())
        .position(|w| w == pat)
        .map(|pos| from + pos)
}

fn trim_leading_comments(item: &str) -> &str {
    let mut item = item.trim();
    while item.starts_with("--") || item.starts_with("/*") {
        let end = skip_quoted_or_comment(item.as_bytes(), 0).unwrap_or(item.len());
        item = item[end..].trim();
    }
    item
}

/// Item text with every comment outside quoted strings removed
fn without_comments(item: &str) -> String {
    let bytes = item.as_bytes();
    let mut out = String::with_capacity(item.len());
    let mut copied = 0;
    let mut i = 0;

    while i < bytes.len() {
        match skip_quoted_or_comment(bytes, i) {
            Some(end) if bytes[i] != b'\'' => {
                out.push_str(&item[copied..i]);
                out.push(' ');
                copied = end;
                i = end;
            }
            Some(end) => i = end,
            None => i += 1,
        }
    }
    out.push_str(&item[copied..]);
    out
}

/// Comma-separated column names, trimmed and unquoted
fn split_column_list(list: &str) -> impl Iterator<Item = String> + '_ {
    list.split(',')
        .map(|c| c.trim().trim_matches(|ch: char| matches!(ch, '"' | '`' | '[' | ']')))
        .filter(|c| !c.is_empty())
        .map(str::to_string)
}

/// Parse a column definition: `name TYPE [constraints...]`.
///
/// The type is the first word after the name, uppercased as-is; a suffix
/// attached without a space such as `(255)` is not part of it.
pub fn parse_column(def: &str) -> Option<Column> {
    let captures = COLUMN.captures(def.trim())?;
    let name = captures.get(1)?.as_str();
    let type_word = captures.get(2)?.as_str();
    let rest = captures.get(3).map_or("", |m| m.as_str());

    let mut column = Column::new(name, type_word);

    if PRIMARY_KEY_FLAG.is_match(rest) {
        column = column.primary_key();
    }
    if AUTO_INCREMENT_FLAG.is_match(rest) {
        column = column.auto_increment();
    }
    if NOT_NULL_FLAG.is_match(rest) {
        column = column.not_null();
    }

    let default = DEFAULT_BEFORE_CONSTRAINT
        .captures(rest)
        .or_else(|| DEFAULT_AT_END.captures(rest))
        .map(|c| c[1].trim().to_string());
    if let Some(default) = default {
        column = column.with_default(default);
    }

    Some(column)
}

/// Parse `FOREIGN KEY (cols) REFERENCES table(cols) [ON DELETE a] [ON UPDATE a]`.
///
/// Composite keys yield one entry per column pair.
pub fn parse_foreign_key(item: &str) -> Vec<ForeignKey> {
    let Some(captures) = FOREIGN_KEY.captures(item) else {
        tracing::trace!(item, "unparseable foreign key");
        return Vec::new();
    };
    let columns: Vec<String> = split_column_list(&captures[1]).collect();
    let references_table = captures[2].to_string();
    let references_columns: Vec<String> = split_column_list(&captures[3]).collect();

    let tail = &item[captures.get(0).map_or(item.len(), |m| m.end())..];
    let on_delete = referential_action(&ON_DELETE, tail);
    let on_update = referential_action(&ON_UPDATE, tail);

    columns
        .into_iter()
        .zip(references_columns)
        .map(|(column, references_column)| ForeignKey {
            column,
            references_table: references_table.clone(),
            references_column,
            on_delete: on_delete.clone(),
            on_update: on_update.clone(),
        })
        .collect()
}

/// Column-level `REFERENCES table(col)` inside a column definition
fn parse_inline_reference(column: &str, def: &str) -> Option<ForeignKey> {
    let captures = INLINE_REFERENCES.captures(def)?;
    let tail = &def[captures.get(0)?.end()..];
    Some(ForeignKey {
        column: column.to_string(),
        references_table: captures[1].to_string(),
        references_column: captures[2].to_string(),
        on_delete: referential_action(&ON_DELETE, tail),
        on_update: referential_action(&ON_UPDATE, tail),
    })
}

fn referential_action(pattern: &Regex, tail: &str) -> Option<String> {
    pattern
        .captures(tail)
        .map(|c| c[1].split_whitespace().collect::<Vec<_>>().join(" "))
}

/// Parse `CREATE [UNIQUE] INDEX [IF NOT EXISTS] name ON table (cols)`.
///
/// Returns the owning table name with the index. The column list is split
/// on every comma; index column lists are taken to be flat.
pub fn parse_create_index(sql: &str) -> Option<(String, Index)> {
    let captures = CREATE_INDEX.captures(sql)?;
    let index = Index {
        name: captures[2].to_string(),
        columns: captures[4].split(',').map(|c| c.trim().to_string()).collect(),
        is_unique: captures.get(1).is_some(),
    };
    Some((captures[3].to_string(), index))
}
