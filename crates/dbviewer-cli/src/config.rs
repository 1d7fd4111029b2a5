//! Configuration file handling

use std::path::{Path, PathBuf};

use miette::{IntoDiagnostic, Result, WrapErr};
use serde::{Deserialize, Serialize};

use crate::args::{OutputFormat, SourceArgs};

pub const CONFIG_FILE_NAME: &str = "dbviewer.toml";

/// Configuration for dbviewer
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Default)]
pub struct Config {
    /// Schema definition file
    #[serde(default)]
    pub schema: Option<String>,

    /// Query functions file
    #[serde(default)]
    pub functions: Option<String>,

    /// Directory to auto-detect files in
    #[serde(default)]
    pub dir: Option<String>,

    /// Output format (human, json)
    #[serde(default)]
    pub format: Option<String>,
}

impl Config {
    /// Load configuration from a TOML file. Relative paths in the file are
    /// taken relative to the directory holding it.
    pub fn from_file(path: &Path) -> Result<Self> {
        let contents = std::fs::read_to_string(path)
            .into_diagnostic()
            .wrap_err_with(|| format!("failed to read {}", path.display()))?;
        let config: Config = toml::from_str(&contents)
            .into_diagnostic()
            .wrap_err_with(|| format!("invalid configuration in {}", path.display()))?;
        tracing::debug!(path = %path.display(), "loaded configuration");

        match path.parent() {
            Some(base) if !base.as_os_str().is_empty() => Ok(config.rebase(base)),
            _ => Ok(config),
        }
    }

    /// Try to find and load dbviewer.toml in current directory or parent directories
    pub fn find_and_load() -> Result<Option<Self>> {
        let current_dir = std::env::current_dir().into_diagnostic()?;
        Self::find_and_load_from(current_dir)
    }

    /// Like [`Config::find_and_load`], starting the search at `dir`
    pub fn find_and_load_from(mut dir: PathBuf) -> Result<Option<Self>> {
        loop {
            let config_path = dir.join(CONFIG_FILE_NAME);
            if config_path.is_file() {
                return Ok(Some(Self::from_file(&config_path)?));
            }

            // Try parent directory
            if !dir.pop() {
                break;
            }
        }

        Ok(None)
    }

    fn rebase(self, base: &Path) -> Self {
        let join = |value: Option<String>| value.map(|p| base.join(p).display().to_string());
        Self {
            schema: join(self.schema),
            functions: join(self.functions),
            dir: join(self.dir),
            format: self.format,
        }
    }

    /// Merge CLI arguments into configuration
    /// CLI arguments take precedence over config file values
    pub fn merge_with_args(mut self, args: &SourceArgs) -> Self {
        if let Some(schema) = &args.schema {
            self.schema = Some(schema.display().to_string());
        }

        if let Some(functions) = &args.functions {
            self.functions = Some(functions.display().to_string());
        }

        if let Some(dir) = &args.dir {
            self.dir = Some(dir.display().to_string());
        }

        if let Some(fmt) = args.format {
            self.format = Some(format!("{:?}", fmt).to_lowercase());
        }

        self
    }

    pub fn output_format(&self) -> OutputFormat {
        match self.format.as_deref() {
            Some("json") => OutputFormat::Json,
            _ => OutputFormat::Human,
        }
    }
}
