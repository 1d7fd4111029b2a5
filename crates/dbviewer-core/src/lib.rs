//! dbviewer-core: schema and query recovery from source code
//!
//! This library reconstructs a database schema and a catalog of
//! query-issuing functions from SQL embedded in string literals, without
//! executing the code or connecting to a database.

pub mod error;
pub mod extract;
pub mod functions;
pub mod language;
pub mod query;
pub mod schema;

use std::path::Path;

pub use error::{Error, Result, Span};
pub use extract::{extract_fragments, looks_like_sql, SqlFragment};
pub use functions::{FunctionCatalog, FunctionExtractor, Param, ParsedFunction};
pub use language::SourceLanguage;
pub use query::{Query, QueryKind};
pub use schema::{Column, ForeignKey, Index, Relationship, Schema, SchemaBuilder, Table};

use functions::typescript::TypeScriptTree;

/// Parse a schema definition file
pub fn parse_schema(path: impl AsRef<Path>) -> Result<Schema> {
    let path = path.as_ref();
    let source = read_source(path)?;
    tracing::info!(path = %path.display(), "parsing schema file");
    Ok(parse_schema_source(&source))
}

/// Parse schema definitions from source text
pub fn parse_schema_source(source: &str) -> Schema {
    let mut builder = SchemaBuilder::new();
    builder.parse(source);
    builder.build()
}

/// Parse a file of query functions. The grammar is chosen from the extension.
pub fn parse_functions(path: impl AsRef<Path>) -> Result<FunctionCatalog> {
    let path = path.as_ref();
    let language =
        SourceLanguage::from_path(path).ok_or_else(|| Error::UnsupportedLanguage {
            path: path.to_path_buf(),
        })?;
    let source = read_source(path)?;
    tracing::info!(path = %path.display(), %language, "parsing functions file");

    let tree = TypeScriptTree::parse_with_origin(&source, language, &path.display().to_string())?;
    Ok(FunctionExtractor::extract(&tree))
}

/// Parse query functions from source text
pub fn parse_functions_source(source: &str, language: SourceLanguage) -> Result<FunctionCatalog> {
    let tree = TypeScriptTree::parse(source, language)?;
    Ok(FunctionExtractor::extract(&tree))
}

fn read_source(path: &Path) -> Result<String> {
    std::fs::read_to_string(path).map_err(|source| Error::Read {
        path: path.to_path_buf(),
        source,
    })
}
