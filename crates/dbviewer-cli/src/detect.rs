//! Auto-detection of schema and functions files

use std::path::{Path, PathBuf};

use miette::{IntoDiagnostic, Result};
use serde::Serialize;

pub const SCHEMA_FILE_NAMES: [&str; 2] = ["schema.ts", "schema.js"];

pub const FUNCTION_FILE_NAMES: [&str; 6] = [
    "index.ts",
    "index.js",
    "queries.ts",
    "queries.js",
    "db.ts",
    "db.js",
];

/// Directories searched under the base, in priority order
pub const SEARCH_DIRS: [&str; 7] = [
    ".",
    "src/db",
    "src/database",
    "db",
    "database",
    "lib/db",
    "lib/database",
];

/// Directory names never descended into by the fallback search
const SKIPPED_DIRS: [&str; 4] = ["node_modules", ".git", "dist", "target"];

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DetectedFiles {
    pub schema_path: Option<PathBuf>,
    pub functions_path: Option<PathBuf>,
}

/// Look for a schema file and a functions file under `base`.
///
/// The well-known directories are tried first, directory order outermost.
/// If no schema file turns up there, the whole tree is searched for one and
/// a functions file is then looked for beside it.
pub fn detect_db_files(base: &Path) -> Result<DetectedFiles> {
    let mut detected = DetectedFiles {
        schema_path: find_file(base, &SCHEMA_FILE_NAMES),
        functions_path: find_file(base, &FUNCTION_FILE_NAMES),
    };

    if detected.schema_path.is_none() && base.is_dir() {
        detected.schema_path = search_tree(base, &SCHEMA_FILE_NAMES)?;
        if let Some(dir) = detected.schema_path.as_deref().and_then(Path::parent) {
            if detected.functions_path.is_none() {
                detected.functions_path = find_in_dir(dir, &FUNCTION_FILE_NAMES);
            }
        }
    }

    tracing::debug!(
        base = %base.display(),
        schema = ?detected.schema_path,
        functions = ?detected.functions_path,
        "detected files"
    );
    Ok(detected)
}

fn find_file(base: &Path, names: &[&str]) -> Option<PathBuf> {
    SEARCH_DIRS
        .iter()
        .find_map(|dir| find_in_dir(&base.join(dir), names))
}

fn find_in_dir(dir: &Path, names: &[&str]) -> Option<PathBuf> {
    names
        .iter()
        .map(|name| dir.join(name))
        .find(|path| path.is_file())
}

/// First match for any of `names` anywhere below `base`, shallowest first
fn search_tree(base: &Path, names: &[&str]) -> Result<Option<PathBuf>> {
    let root = glob::Pattern::escape(&base.display().to_string());
    let mut found = Vec::new();

    for name in names {
        let pattern = format!("{}/**/{}", root, name);
        for path in glob::glob(&pattern).into_diagnostic()?.flatten() {
            let skipped = path
                .strip_prefix(base)
                .unwrap_or(&path)
                .components()
                .any(|c| SKIPPED_DIRS.iter().any(|s| c.as_os_str() == *s));
            if !skipped && path.is_file() {
                found.push(path);
            }
        }
    }

    found.sort_by_key(|path| (path.components().count(), path.clone()));
    Ok(found.into_iter().next())
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use std::fs;

    fn touch(base: &Path, rel: &str) {
        let path = base.join(rel);
        fs::create_dir_all(path.parent().unwrap()).unwrap();
        fs::write(path, "// file").unwrap();
    }

    #[test]
    fn test_detects_src_db() {
        let dir = tempfile::tempdir().unwrap();
        touch(dir.path(), "src/db/schema.ts");
        touch(dir.path(), "src/db/index.ts");

        let detected = detect_db_files(dir.path()).unwrap();
        assert_eq!(
            detected.schema_path,
            Some(dir.path().join("src/db").join("schema.ts"))
        );
        assert_eq!(
            detected.functions_path,
            Some(dir.path().join("src/db").join("index.ts"))
        );
    }

    #[test]
    fn test_root_files_win() {
        let dir = tempfile::tempdir().unwrap();
        touch(dir.path(), "schema.ts");
        touch(dir.path(), "index.ts");
        touch(dir.path(), "src/db/schema.ts");

        let detected = detect_db_files(dir.path()).unwrap();
        assert_eq!(detected.schema_path, Some(dir.path().join(".").join("schema.ts")));
        assert_eq!(detected.functions_path, Some(dir.path().join(".").join("index.ts")));
    }

    #[test]
    fn test_file_name_order_within_directory() {
        let dir = tempfile::tempdir().unwrap();
        touch(dir.path(), "db/db.ts");
        touch(dir.path(), "db/queries.js");

        let detected = detect_db_files(dir.path()).unwrap();
        assert_eq!(
            detected.functions_path,
            Some(dir.path().join("db").join("queries.js"))
        );
    }

    #[test]
    fn test_nonexistent_directory() {
        let detected = detect_db_files(Path::new("/non/existent/path")).unwrap();
        assert_eq!(detected, DetectedFiles::default());
    }

    #[test]
    fn test_fallback_search() {
        let dir = tempfile::tempdir().unwrap();
        touch(dir.path(), "app/storage/schema.ts");
        touch(dir.path(), "app/storage/queries.ts");
        touch(dir.path(), "node_modules/pkg/schema.ts");

        let detected = detect_db_files(dir.path()).unwrap();
        assert_eq!(
            detected.schema_path,
            Some(dir.path().join("app/storage/schema.ts"))
        );
        assert_eq!(
            detected.functions_path,
            Some(dir.path().join("app/storage").join("queries.ts"))
        );
    }
}
