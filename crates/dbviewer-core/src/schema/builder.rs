//! Schema builder - folds extracted SQL fragments into a Schema

use crate::extract::{extract_fragments, SqlFragment};
use crate::schema::ddl;
use crate::schema::Schema;

/// Builder for constructing a Schema from the SQL fragments of one file.
///
/// Fragments must be fed in source order: an index is attached only if its
/// table has already been recorded, so an index that appears before its
/// `CREATE TABLE` is dropped.
pub struct SchemaBuilder {
    schema: Schema,
}

impl SchemaBuilder {
    pub fn new() -> Self {
        Self {
            schema: Schema::new(),
        }
    }

    /// Extract every SQL fragment from source text and process it
    pub fn parse(&mut self, source: &str) {
        let fragments = extract_fragments(source);
        tracing::debug!(fragments = fragments.len(), "extracted SQL fragments");

        for fragment in &fragments {
            self.process_fragment(fragment);
        }
    }

    /// Process one fragment. A fragment may hold several `;`-separated
    /// statements; they are processed left to right.
    pub fn process_fragment(&mut self, fragment: &SqlFragment) {
        for stmt in split_sql_statements(&fragment.text) {
            self.process_statement(stmt, fragment);
        }
    }

    /// Process a single SQL statement
    fn process_statement(&mut self, sql: &str, fragment: &SqlFragment) {
        if ddl::is_create_table(sql) {
            match ddl::parse_create_table(sql) {
                Some(table) => {
                    if self.schema.table_exists(&table.name) {
                        tracing::debug!(
                            table = %table.name,
                            line = fragment.span.line,
                            "CREATE TABLE replaces an earlier definition"
                        );
                    }
                    self.schema.add_table(table);
                }
                None => {
                    tracing::trace!(line = fragment.span.line, "unparseable CREATE TABLE");
                }
            }
        }

        if ddl::is_create_index(sql) {
            let Some((table_name, index)) = ddl::parse_create_index(sql) else {
                tracing::trace!(line = fragment.span.line, "unparseable CREATE INDEX");
                return;
            };
            match self.schema.get_table_mut(&table_name) {
                Some(table) => table.indexes.push(index),
                None => {
                    tracing::debug!(
                        index = %index.name,
                        table = %table_name,
                        line = fragment.span.line,
                        "dropping index for a table not seen yet"
                    );
                }
            }
        }
    }

    /// Consume the builder and return the schema
    pub fn build(self) -> Schema {
        self.schema
    }
}

impl Default for SchemaBuilder {
    fn default() -> Self {
        Self::new()
    }
}

/// Split SQL text into statements on `;`, ignoring semicolons inside
/// quoted strings and `--` / `/* */` comments.
///
/// An unterminated quote or block comment runs to the end of the text, so
/// everything after it stays in the last statement.
fn split_sql_statements(sql: &str) -> Vec<&str> {
    let bytes = sql.as_bytes();
    let len = bytes.len();
    let mut statements = Vec::new();
    let mut start = 0;
    let mut i = 0;

    while i < len {
        match bytes[i] {
            quote @ (b'\'' | b'"') => {
                i += 1;
                while i < len && bytes[i] != quote {
                    i += 1;
                }
                i += 1;
            }
            b'-' if bytes.get(i + 1) == Some(&b'-') => {
                while i < len && bytes[i] != b'\n' {
                    i += 1;
                }
            }
            b'/' if bytes.get(i + 1) == Some(&b'*') => {
                i += 2;
                while i < len && !(bytes[i] == b'*' && bytes.get(i + 1) == Some(&b'/')) {
                    i += 1;
                }
                i += 2;
            }
            b';' => {
                statements.push(&sql[start..i]);
                start = i + 1;
                i += 1;
            }
            _ => i += 1,
        }
    }

    if start < len {
        statements.push(&sql[start..]);
    }

    statements
        .into_iter()
        .map(str::trim)
        .filter(|stmt| !stmt.is_empty())
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn build(source: &str) -> Schema {
        let mut builder = SchemaBuilder::new();
        builder.parse(source);
        builder.build()
    }

    #[test]
    fn test_tables_and_index_in_order() {
        let schema = build(
            r#"
            db.run(`CREATE TABLE users (id INTEGER PRIMARY KEY, name TEXT)`);
            db.run(`CREATE TABLE posts (id INTEGER PRIMARY KEY, user_id INTEGER, FOREIGN KEY (user_id) REFERENCES users(id))`);
            db.run("CREATE UNIQUE INDEX idx_u ON users(name)");
            "#,
        );

        assert_eq!(schema.len(), 2);
        let users = schema.get_table("users").unwrap();
        assert_eq!(users.indexes.len(), 1);
        assert_eq!(users.indexes[0].name, "idx_u");
        assert!(users.indexes[0].is_unique);
        assert_eq!(users.indexes[0].columns, vec!["name"]);

        let posts = schema.get_table("posts").unwrap();
        assert_eq!(posts.foreign_keys.len(), 1);
        assert_eq!(posts.foreign_keys[0].references_table, "users");
        assert_eq!(posts.foreign_keys[0].references_column, "id");
    }

    #[test]
    fn test_index_before_table_is_dropped() {
        let schema = build(
            r#"
            db.run("CREATE UNIQUE INDEX idx_u ON users(name)");
            db.run(`CREATE TABLE users (id INTEGER PRIMARY KEY, name TEXT)`);
            "#,
        );

        let users = schema.get_table("users").unwrap();
        assert!(users.indexes.is_empty());
    }

    #[test]
    fn test_duplicate_table_last_write_wins() {
        let schema = build(
            r#"
            const v1 = `CREATE TABLE settings (key TEXT, value TEXT)`;
            const v2 = `CREATE TABLE settings (id INTEGER PRIMARY KEY)`;
            "#,
        );

        assert_eq!(schema.len(), 1);
        assert_eq!(
            schema.get_table("settings").unwrap().column_names(),
            vec!["id"]
        );
    }

    #[test]
    fn test_index_attached_then_table_replaced() {
        let schema = build(
            r#"
            run(`CREATE TABLE t (a TEXT)`);
            run(`CREATE INDEX idx_a ON t(a)`);
            run(`CREATE TABLE t (a TEXT, b TEXT)`);
            "#,
        );

        // Overwrite, not merge: the earlier index goes with the earlier table
        assert!(schema.get_table("t").unwrap().indexes.is_empty());
    }

    #[test]
    fn test_multiple_statements_in_one_fragment() {
        let schema = build(
            "db.exec(`
                CREATE TABLE a (id INTEGER PRIMARY KEY);
                CREATE TABLE b (id INTEGER PRIMARY KEY, a_id INTEGER REFERENCES a(id));
                CREATE INDEX idx_b_a ON b(a_id);
            `);",
        );

        assert_eq!(schema.table_names(), vec!["a", "b"]);
        assert_eq!(schema.get_table("b").unwrap().indexes.len(), 1);
    }

    #[test]
    fn test_no_sql_yields_empty_schema() {
        assert!(build("export const answer = 42; const s = 'hello';").is_empty());
    }

    #[test]
    fn test_queries_are_ignored() {
        let schema = build(r#"db.query("SELECT * FROM users"); db.run("PRAGMA journal_mode = WAL");"#);
        assert!(schema.is_empty());
    }

    #[test]
    fn test_split_sql_statements() {
        let stmts = split_sql_statements("CREATE TABLE a (id INT); CREATE TABLE b (id INT);");
        assert_eq!(stmts, vec!["CREATE TABLE a (id INT)", "CREATE TABLE b (id INT)"]);
    }

    #[test]
    fn test_split_preserves_string_literals_and_comments() {
        let stmts = split_sql_statements(
            "INSERT INTO t VALUES ('a;b'); -- trailing; comment\nCREATE TABLE c (x TEXT) /* ; */",
        );
        assert_eq!(stmts.len(), 2);
        assert!(stmts[0].contains("'a;b'"));
        assert!(stmts[1].starts_with("-- trailing; comment"));
    }

    #[test]
    fn test_split_unterminated_quote_keeps_rest_together() {
        let stmts = split_sql_statements("CREATE TABLE a (id INT); INSERT INTO a VALUES ('x); CREATE TABLE b (id INT);");
        assert_eq!(
            stmts,
            vec![
                "CREATE TABLE a (id INT)",
                "INSERT INTO a VALUES ('x); CREATE TABLE b (id INT);"
            ]
        );
    }
}
