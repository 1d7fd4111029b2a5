//! Source language support

use std::path::Path;
use std::str::FromStr;

use tree_sitter::Language;

/// Source languages whose syntax trees the function extractor can walk
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SourceLanguage {
    /// TypeScript and plain JavaScript (the TypeScript grammar is a superset)
    #[default]
    TypeScript,
    /// TSX / JSX
    Tsx,
}

impl SourceLanguage {
    /// Detect language from file extension
    pub fn from_path(path: &Path) -> Option<Self> {
        match path.extension().and_then(|ext| ext.to_str()) {
            Some("ts" | "mts" | "cts" | "js" | "mjs" | "cjs") => Some(SourceLanguage::TypeScript),
            Some("tsx" | "jsx") => Some(SourceLanguage::Tsx),
            _ => None,
        }
    }

    /// Get the tree-sitter grammar for parsing
    pub fn grammar(&self) -> Language {
        match self {
            SourceLanguage::TypeScript => tree_sitter_typescript::LANGUAGE_TYPESCRIPT.into(),
            SourceLanguage::Tsx => tree_sitter_typescript::LANGUAGE_TSX.into(),
        }
    }
}

impl FromStr for SourceLanguage {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "typescript" | "ts" | "javascript" | "js" => Ok(SourceLanguage::TypeScript),
            "tsx" | "jsx" => Ok(SourceLanguage::Tsx),
            _ => Err(format!(
                "Unknown language: '{}'. Supported languages: typescript, tsx.",
                s
            )),
        }
    }
}

impl std::fmt::Display for SourceLanguage {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            SourceLanguage::TypeScript => write!(f, "typescript"),
            SourceLanguage::Tsx => write!(f, "tsx"),
        }
    }
}
