//! Output formatting

use dbviewer_core::{Column, FunctionCatalog, Relationship, Schema, SqlFragment, Table};
use miette::{IntoDiagnostic, Result};
use serde::Serialize;

use crate::args::OutputFormat;
use crate::context::Info;
use crate::detect::DetectedFiles;

/// Renders the documents a command produces
pub struct OutputFormatter {
    format: OutputFormat,
}

impl OutputFormatter {
    pub fn new(format: OutputFormat) -> Self {
        Self { format }
    }

    pub fn schema(&self, schema: &Schema) -> Result<String> {
        match self.format {
            OutputFormat::Human => Ok(human_schema(schema)),
            OutputFormat::Json => to_json(schema),
        }
    }

    pub fn functions(&self, catalog: &FunctionCatalog) -> Result<String> {
        match self.format {
            OutputFormat::Human => Ok(human_functions(catalog)),
            OutputFormat::Json => to_json(catalog),
        }
    }

    pub fn relationships(&self, relationships: &[Relationship]) -> Result<String> {
        match self.format {
            OutputFormat::Human => Ok(human_relationships(relationships)),
            OutputFormat::Json => to_json(&serde_json::json!({ "relationships": relationships })),
        }
    }

    pub fn info(&self, info: &Info) -> Result<String> {
        match self.format {
            OutputFormat::Human => Ok(format!(
                "Schema file:    {}\nFunctions file: {}\nTables:         {}\nFunctions:      {} exported",
                or_none(&info.schema_path),
                or_none(&info.functions_path),
                info.table_count,
                info.function_count
            )),
            OutputFormat::Json => to_json(info),
        }
    }

    pub fn detected(&self, detected: &DetectedFiles) -> Result<String> {
        match self.format {
            OutputFormat::Human => {
                let show = |path: &Option<std::path::PathBuf>| {
                    path.as_ref()
                        .map_or_else(|| "(not found)".to_string(), |p| p.display().to_string())
                };
                Ok(format!(
                    "Schema file:    {}\nFunctions file: {}",
                    show(&detected.schema_path),
                    show(&detected.functions_path)
                ))
            }
            OutputFormat::Json => to_json(detected),
        }
    }

    pub fn fragments(&self, fragments: &[SqlFragment]) -> Result<String> {
        match self.format {
            OutputFormat::Human => {
                let lines: Vec<String> = fragments
                    .iter()
                    .map(|f| {
                        format!(
                            "{:>5}:{:<3} {}",
                            f.span.line,
                            f.span.column,
                            dbviewer_core::query::normalize_sql(&f.text)
                        )
                    })
                    .collect();
                Ok(lines.join("\n"))
            }
            OutputFormat::Json => to_json(fragments),
        }
    }
}

fn to_json<T: Serialize + ?Sized>(value: &T) -> Result<String> {
    serde_json::to_string_pretty(value).into_diagnostic()
}

fn or_none(path: &str) -> &str {
    if path.is_empty() {
        "(none)"
    } else {
        path
    }
}

fn human_schema(schema: &Schema) -> String {
    let mut out = vec![format!("Schema: {} table(s)", schema.len())];
    for table in schema.tables.values() {
        out.push(String::new());
        out.extend(human_table(table));
    }
    out.join("\n")
}

fn human_table(table: &Table) -> Vec<String> {
    let mut out = vec![format!("Table: {}", table.name)];
    out.extend(table.columns.iter().map(|c| format!("  - {}", human_column(c))));

    if !table.primary_key.is_empty() {
        out.push(format!("  primary key ({})", table.primary_key.join(", ")));
    }
    for fk in &table.foreign_keys {
        let mut line = format!(
            "  foreign key {} -> {}.{}",
            fk.column, fk.references_table, fk.references_column
        );
        if let Some(action) = &fk.on_delete {
            line.push_str(&format!(" ON DELETE {}", action));
        }
        if let Some(action) = &fk.on_update {
            line.push_str(&format!(" ON UPDATE {}", action));
        }
        out.push(line);
    }
    for index in &table.indexes {
        out.push(format!(
            "  {}index {} ({})",
            if index.is_unique { "unique " } else { "" },
            index.name,
            index.columns.join(", ")
        ));
    }
    out
}

fn human_column(column: &Column) -> String {
    let mut parts = vec![column.name.clone(), column.data_type.clone()];
    if column.is_primary_key {
        parts.push("PRIMARY KEY".to_string());
    }
    if column.is_auto_increment {
        parts.push("AUTOINCREMENT".to_string());
    }
    if !column.nullable && !column.is_primary_key {
        parts.push("NOT NULL".to_string());
    }
    if let Some(default) = &column.default_value {
        parts.push(format!("DEFAULT {}", default));
    }
    parts.join(" ")
}

fn human_functions(catalog: &FunctionCatalog) -> String {
    let mut out = vec![format!(
        "Functions: {} ({} exported)",
        catalog.len(),
        catalog.exported().count()
    )];

    for f in &catalog.functions {
        let params: Vec<String> = f
            .params
            .iter()
            .map(|p| format!("{}: {}", p.name, p.type_name))
            .collect();
        out.push(String::new());
        out.push(format!(
            "{}{}({}): {}  (line {})",
            if f.is_exported { "export " } else { "" },
            f.name,
            params.join(", "),
            f.return_type,
            f.line
        ));
        if let Some(description) = &f.description {
            out.push(format!("  {}", description));
        }
        for query in &f.sql_queries {
            out.push(format!("  [{}] {}", query.kind, query.sql));
        }
        if !f.tables_used.is_empty() {
            out.push(format!("  tables: {}", f.tables_used.join(", ")));
        }
    }
    out.join("\n")
}

fn human_relationships(relationships: &[Relationship]) -> String {
    if relationships.is_empty() {
        return "No relationships".to_string();
    }
    relationships
        .iter()
        .map(|r| {
            let mut line = format!(
                "{}.{} -> {}.{}",
                r.from_table, r.from_column, r.to_table, r.to_column
            );
            if let Some(action) = &r.on_delete {
                line.push_str(&format!(" ON DELETE {}", action));
            }
            if let Some(action) = &r.on_update {
                line.push_str(&format!(" ON UPDATE {}", action));
            }
            line
        })
        .collect::<Vec<_>>()
        .join("\n")
}
