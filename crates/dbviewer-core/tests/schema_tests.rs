// Integration tests for schema recovery
use std::io::Write;

use dbviewer_core::{parse_schema, parse_schema_source, Error, Relationship, Schema};
use pretty_assertions::assert_eq;

const SAMPLE_SCHEMA: &str = r#"
import { Database } from "bun:sqlite";

// Don't forget: every table gets an integer id
export function initializeSchema(db: Database): void {
  db.run(`
    CREATE TABLE IF NOT EXISTS users (
      id INTEGER PRIMARY KEY AUTOINCREMENT,
      email TEXT NOT NULL,
      name TEXT,
      created_at TEXT NOT NULL DEFAULT (datetime('now'))
    )
  `);

  db.run(`
    CREATE TABLE IF NOT EXISTS posts (
      id INTEGER PRIMARY KEY AUTOINCREMENT,
      user_id INTEGER NOT NULL,
      title TEXT NOT NULL,
      content TEXT,
      FOREIGN KEY (user_id) REFERENCES users(id) ON DELETE CASCADE
    )
  `);

  db.run(`
    CREATE UNIQUE INDEX IF NOT EXISTS idx_users_email
    ON users(email)
  `);

  db.run(`
    CREATE INDEX IF NOT EXISTS idx_posts_user_id
    ON posts(user_id)
  `);
}
"#;

fn sample() -> Schema {
    parse_schema_source(SAMPLE_SCHEMA)
}

#[test]
fn test_parses_tables_in_order() {
    let schema = sample();
    assert_eq!(schema.table_names(), vec!["users", "posts"]);
}

#[test]
fn test_users_columns() {
    let schema = sample();
    let users = schema.get_table("users").unwrap();
    assert_eq!(users.columns.len(), 4);

    let id = users.get_column("id").unwrap();
    assert_eq!(id.data_type, "INTEGER");
    assert!(id.is_primary_key);
    assert!(id.is_auto_increment);
    assert!(!id.nullable);

    let email = users.get_column("email").unwrap();
    assert_eq!(email.data_type, "TEXT");
    assert!(!email.nullable);

    assert!(users.get_column("name").unwrap().nullable);
    assert_eq!(
        users.get_column("created_at").unwrap().default_value.as_deref(),
        Some("(datetime('now'))")
    );
}

#[test]
fn test_foreign_keys() {
    let schema = sample();
    let posts = schema.get_table("posts").unwrap();
    assert_eq!(posts.foreign_keys.len(), 1);

    let fk = &posts.foreign_keys[0];
    assert_eq!(fk.column, "user_id");
    assert_eq!(fk.references_table, "users");
    assert_eq!(fk.references_column, "id");
    assert_eq!(fk.on_delete.as_deref(), Some("CASCADE"));
    assert_eq!(fk.on_update, None);
}

#[test]
fn test_indexes() {
    let schema = sample();

    let users = schema.get_table("users").unwrap();
    assert_eq!(users.indexes.len(), 1);
    assert_eq!(users.indexes[0].name, "idx_users_email");
    assert!(users.indexes[0].is_unique);
    assert_eq!(users.indexes[0].columns, vec!["email"]);

    let posts = schema.get_table("posts").unwrap();
    assert_eq!(posts.indexes.len(), 1);
    assert_eq!(posts.indexes[0].name, "idx_posts_user_id");
    assert!(!posts.indexes[0].is_unique);
}

#[test]
fn test_primary_keys() {
    let schema = sample();
    assert_eq!(schema.get_table("users").unwrap().primary_key, vec!["id"]);
    assert_eq!(schema.get_table("posts").unwrap().primary_key, vec!["id"]);
}

#[test]
fn test_relationships() {
    let schema = sample();
    assert_eq!(
        schema.relationships(),
        vec![Relationship {
            from_table: "posts".to_string(),
            from_column: "user_id".to_string(),
            to_table: "users".to_string(),
            to_column: "id".to_string(),
            on_delete: Some("CASCADE".to_string()),
            on_update: None,
        }]
    );
}

#[test]
fn test_parse_is_idempotent() {
    assert_eq!(sample(), sample());
}

#[test]
fn test_schema_json_shape() {
    let json = serde_json::to_value(sample()).unwrap();
    let tables = json["tables"].as_array().unwrap();
    assert_eq!(tables.len(), 2);
    assert_eq!(tables[0]["name"], "users");
    assert_eq!(tables[0]["primaryKey"][0], "id");
    assert_eq!(tables[0]["columns"][0]["type"], "INTEGER");
    assert_eq!(tables[0]["columns"][0]["isPrimaryKey"], true);
    assert_eq!(tables[0]["columns"][0]["isAutoIncrement"], true);
    assert_eq!(tables[1]["foreignKeys"][0]["referencesTable"], "users");
    assert_eq!(tables[1]["indexes"][0]["isUnique"], false);
}

#[test]
fn test_composite_primary_key_and_set_null() {
    let schema = parse_schema_source(
        r#"
        const ddl = `
          CREATE TABLE memberships (
            user_id INTEGER NOT NULL,
            group_id INTEGER,
            PRIMARY KEY (user_id, group_id),
            FOREIGN KEY (group_id) REFERENCES groups(id) ON DELETE SET NULL ON UPDATE NO ACTION,
            UNIQUE (user_id, group_id)
          )
        `;
        "#,
    );

    let table = schema.get_table("memberships").unwrap();
    assert_eq!(table.column_names(), vec!["user_id", "group_id"]);
    assert_eq!(table.primary_key, vec!["user_id", "group_id"]);
    assert_eq!(table.foreign_keys[0].on_delete.as_deref(), Some("SET NULL"));
    assert_eq!(table.foreign_keys[0].on_update.as_deref(), Some("NO ACTION"));
}

#[test]
fn test_parse_schema_from_file() {
    let mut file = tempfile::Builder::new().suffix(".ts").tempfile().unwrap();
    file.write_all(SAMPLE_SCHEMA.as_bytes()).unwrap();

    let schema = parse_schema(file.path()).unwrap();
    assert_eq!(schema, sample());
}

#[test]
fn test_parse_schema_missing_file() {
    let dir = tempfile::tempdir().unwrap();
    let err = parse_schema(dir.path().join("schema.ts")).unwrap_err();
    assert!(matches!(err, Error::Read { .. }));
}
