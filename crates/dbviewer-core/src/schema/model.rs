//! Schema model - tables, columns, keys and indexes recovered from DDL

use indexmap::IndexMap;
use serde::{Deserialize, Deserializer, Serialize, Serializer};

/// Recovered schema - tables keyed by name.
///
/// A later `CREATE TABLE` with the same name replaces the earlier one.
/// Serializes as `{"tables": [...]}`.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Schema {
    pub tables: IndexMap<String, Table>,
}

impl Schema {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a table, replacing any table with the same name
    pub fn add_table(&mut self, table: Table) {
        self.tables.insert(table.name.clone(), table);
    }

    /// Look up a table by name
    pub fn get_table(&self, name: &str) -> Option<&Table> {
        self.tables.get(name)
    }

    /// Look up a table by name (mutable)
    pub fn get_table_mut(&mut self, name: &str) -> Option<&mut Table> {
        self.tables.get_mut(name)
    }

    /// Check if a table exists
    pub fn table_exists(&self, name: &str) -> bool {
        self.tables.contains_key(name)
    }

    /// Get all table names
    pub fn table_names(&self) -> Vec<&str> {
        self.tables.keys().map(|s| s.as_str()).collect()
    }

    pub fn len(&self) -> usize {
        self.tables.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tables.is_empty()
    }

    /// Every foreign key of every table as a directed column-to-column edge
    pub fn relationships(&self) -> Vec<Relationship> {
        self.tables
            .values()
            .flat_map(|table| {
                table.foreign_keys.iter().map(move |fk| Relationship {
                    from_table: table.name.clone(),
                    from_column: fk.column.clone(),
                    to_table: fk.references_table.clone(),
                    to_column: fk.references_column.clone(),
                    on_delete: fk.on_delete.clone(),
                    on_update: fk.on_update.clone(),
                })
            })
            .collect()
    }
}

#[derive(Serialize, Deserialize)]
struct SchemaRepr {
    tables: Vec<Table>,
}

impl Serialize for Schema {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        SchemaRepr {
            tables: self.tables.values().cloned().collect(),
        }
        .serialize(serializer)
    }
}

impl<'de> Deserialize<'de> for Schema {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let repr = SchemaRepr::deserialize(deserializer)?;
        let mut schema = Schema::new();
        for table in repr.tables {
            schema.add_table(table);
        }
        Ok(schema)
    }
}

/// Table definition
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Table {
    pub name: String,
    /// Declaration order
    pub columns: Vec<Column>,
    /// Filled from inline and table-level PRIMARY KEY constraints, in the order seen
    pub primary_key: Vec<String>,
    pub foreign_keys: Vec<ForeignKey>,
    /// Attached after creation as `CREATE INDEX` statements are found
    pub indexes: Vec<Index>,
}

impl Table {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            columns: Vec::new(),
            primary_key: Vec::new(),
            foreign_keys: Vec::new(),
            indexes: Vec::new(),
        }
    }

    /// Get a column by name (case-insensitive)
    pub fn get_column(&self, name: &str) -> Option<&Column> {
        self.columns
            .iter()
            .find(|c| c.name.eq_ignore_ascii_case(name))
    }

    /// Check if a column exists
    pub fn column_exists(&self, name: &str) -> bool {
        self.get_column(name).is_some()
    }

    /// Get all column names
    pub fn column_names(&self) -> Vec<&str> {
        self.columns.iter().map(|c| c.name.as_str()).collect()
    }

    /// Add a column; an inline primary key also joins `primary_key`
    pub fn add_column(&mut self, column: Column) {
        if column.is_primary_key {
            self.primary_key.push(column.name.clone());
        }
        self.columns.push(column);
    }
}

/// Column definition
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Column {
    pub name: String,
    /// Declared type word, uppercased
    #[serde(rename = "type")]
    pub data_type: String,
    pub nullable: bool,
    pub is_primary_key: bool,
    pub is_auto_increment: bool,
    /// Raw default expression, unparsed
    pub default_value: Option<String>,
}

impl Column {
    pub fn new(name: impl Into<String>, data_type: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            data_type: data_type.into().to_uppercase(),
            nullable: true,
            is_primary_key: false,
            is_auto_increment: false,
            default_value: None,
        }
    }

    pub fn not_null(mut self) -> Self {
        self.nullable = false;
        self
    }

    pub fn with_default(mut self, default: impl Into<String>) -> Self {
        self.default_value = Some(default.into());
        self
    }

    pub fn primary_key(mut self) -> Self {
        self.is_primary_key = true;
        self.nullable = false;
        self
    }

    pub fn auto_increment(mut self) -> Self {
        self.is_auto_increment = true;
        self
    }
}

/// Foreign key constraint (single column)
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ForeignKey {
    pub column: String,
    /// Not checked against the parsed tables
    pub references_table: String,
    pub references_column: String,
    pub on_delete: Option<String>,
    pub on_update: Option<String>,
}

/// Index definition
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Index {
    pub name: String,
    /// Key order
    pub columns: Vec<String>,
    pub is_unique: bool,
}

/// Directed edge from a foreign-key column to the column it references.
/// Derived from the schema on demand, never stored.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Relationship {
    pub from_table: String,
    pub from_column: String,
    pub to_table: String,
    pub to_column: String,
    pub on_delete: Option<String>,
    pub on_update: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn fk(column: &str, table: &str, on_delete: Option<&str>) -> ForeignKey {
        ForeignKey {
            column: column.to_string(),
            references_table: table.to_string(),
            references_column: "id".to_string(),
            on_delete: on_delete.map(str::to_string),
            on_update: None,
        }
    }

    #[test]
    fn test_add_table_overwrites() {
        let mut schema = Schema::new();
        let mut first = Table::new("users");
        first.add_column(Column::new("id", "integer"));
        schema.add_table(first);

        let mut second = Table::new("users");
        second.add_column(Column::new("uid", "text"));
        second.add_column(Column::new("email", "text"));
        schema.add_table(second);

        assert_eq!(schema.len(), 1);
        let users = schema.get_table("users").unwrap();
        assert_eq!(users.column_names(), vec!["uid", "email"]);
    }

    #[test]
    fn test_column_builder() {
        let col = Column::new("id", "integer").primary_key().auto_increment();
        assert_eq!(col.data_type, "INTEGER");
        assert!(!col.nullable);
        assert!(col.is_primary_key);
        assert!(col.is_auto_increment);
    }

    #[test]
    fn test_inline_primary_key_joins_table_key() {
        let mut table = Table::new("t");
        table.add_column(Column::new("id", "INTEGER").primary_key());
        table.add_column(Column::new("name", "TEXT"));
        assert_eq!(table.primary_key, vec!["id"]);
        assert!(table.column_exists("NAME"));
    }

    #[test]
    fn test_relationships_flatten_foreign_keys() {
        let mut schema = Schema::new();
        schema.add_table(Table::new("users"));
        let mut posts = Table::new("posts");
        posts.foreign_keys.push(fk("user_id", "users", Some("CASCADE")));
        posts.foreign_keys.push(fk("editor_id", "users", None));
        schema.add_table(posts);

        let rels = schema.relationships();
        assert_eq!(rels.len(), 2);
        assert_eq!(rels[0].from_table, "posts");
        assert_eq!(rels[0].from_column, "user_id");
        assert_eq!(rels[0].to_table, "users");
        assert_eq!(rels[0].to_column, "id");
        assert_eq!(rels[0].on_delete.as_deref(), Some("CASCADE"));
        assert_eq!(rels[1].on_delete, None);
    }

    #[test]
    fn test_schema_serializes_table_list() {
        let mut schema = Schema::new();
        let mut users = Table::new("users");
        users.add_column(Column::new("id", "INTEGER").primary_key());
        schema.add_table(users);

        let json = serde_json::to_value(&schema).unwrap();
        assert_eq!(json["tables"][0]["name"], "users");
        assert_eq!(json["tables"][0]["primaryKey"][0], "id");
        assert_eq!(json["tables"][0]["columns"][0]["type"], "INTEGER");
        assert_eq!(json["tables"][0]["columns"][0]["isPrimaryKey"], true);
        assert!(json["tables"][0]["columns"][0]["defaultValue"].is_null());

        let back: Schema = serde_json::from_value(json).unwrap();
        assert_eq!(back, schema);
    }
}
