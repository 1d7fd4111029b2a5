//! Resolving and loading the files a command works on

use std::path::{Path, PathBuf};

use dbviewer_core::{FunctionCatalog, Relationship, Schema};
use miette::{miette, Result};
use serde::Serialize;

use crate::args::{OutputFormat, SourceArgs};
use crate::config::Config;
use crate::detect::detect_db_files;

/// Parsed documents for one invocation. A file that is not configured, or
/// that fails to parse, leaves its document empty.
pub struct Context {
    pub schema_path: Option<PathBuf>,
    pub functions_path: Option<PathBuf>,
    pub schema: Option<Schema>,
    pub functions: Option<FunctionCatalog>,
    pub format: OutputFormat,
}

/// Summary document: which files are in use and how much they hold
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Info {
    pub schema_path: String,
    pub functions_path: String,
    pub table_count: usize,
    pub function_count: usize,
}

impl Context {
    /// Resolve file paths from config, CLI flags and auto-detection, then parse them
    pub fn load(args: &SourceArgs) -> Result<Self> {
        let config = match &args.config {
            Some(path) => Config::from_file(path)?,
            None => Config::find_and_load()?.unwrap_or_default(),
        };
        let config = config.merge_with_args(args);

        let mut schema_path = config.schema.as_ref().map(PathBuf::from);
        let mut functions_path = config.functions.as_ref().map(PathBuf::from);

        if schema_path.is_none() || functions_path.is_none() {
            let base = config.dir.as_deref().unwrap_or(".");
            let detected = detect_db_files(Path::new(base))?;
            schema_path = schema_path.or(detected.schema_path);
            functions_path = functions_path.or(detected.functions_path);
        }

        if schema_path.is_none() && functions_path.is_none() {
            return Err(miette!(
                help = "pass --schema and --functions, or run from a directory containing them",
                "Could not find schema.ts or index.ts files"
            ));
        }

        let schema = schema_path.as_deref().and_then(load_schema);
        let functions = functions_path.as_deref().and_then(load_functions);

        Ok(Self {
            schema_path,
            functions_path,
            schema,
            functions,
            format: config.output_format(),
        })
    }

    pub fn schema(&self) -> Result<&Schema> {
        self.schema
            .as_ref()
            .ok_or_else(|| miette!("No schema file configured"))
    }

    pub fn functions(&self) -> Result<&FunctionCatalog> {
        self.functions
            .as_ref()
            .ok_or_else(|| miette!("No functions file configured"))
    }

    pub fn relationships(&self) -> Result<Vec<Relationship>> {
        Ok(self.schema()?.relationships())
    }

    pub fn info(&self) -> Info {
        let display = |path: &Option<PathBuf>| {
            path.as_deref()
                .map(|p| absolute(p).display().to_string())
                .unwrap_or_default()
        };
        Info {
            schema_path: display(&self.schema_path),
            functions_path: display(&self.functions_path),
            table_count: self.schema.as_ref().map_or(0, Schema::len),
            function_count: self
                .functions
                .as_ref()
                .map_or(0, |catalog| catalog.exported().count()),
        }
    }
}

fn load_schema(path: &Path) -> Option<Schema> {
    match dbviewer_core::parse_schema(path) {
        Ok(schema) => {
            tracing::info!(path = %path.display(), tables = schema.len(), "loaded schema");
            Some(schema)
        }
        Err(e) => {
            tracing::error!(path = %path.display(), error = %e, "failed to parse schema file");
            None
        }
    }
}

fn load_functions(path: &Path) -> Option<FunctionCatalog> {
    match dbviewer_core::parse_functions(path) {
        Ok(catalog) => {
            tracing::info!(path = %path.display(), functions = catalog.len(), "loaded functions");
            Some(catalog)
        }
        Err(e) => {
            tracing::error!(path = %path.display(), error = %e, "failed to parse functions file");
            None
        }
    }
}

fn absolute(path: &Path) -> PathBuf {
    std::path::absolute(path).unwrap_or_else(|_| path.to_path_buf())
}
