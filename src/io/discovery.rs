use std::path::{Path, PathBuf};

use tracing::{debug, info};
use walkdir::WalkDir;

use crate::error::{FusionError, Result};

/// A spreadsheet found under the data directory.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DiscoveredFile {
    pub path: PathBuf,
    /// Path relative to the data directory, `/`-separated.
    pub source_id: String,
}

/// Recursively lists `.xlsx` files under `root`, sorted by their relative path
/// ignoring case. Excel lock files (`~$name.xlsx`) are skipped.
pub fn discover_xlsx(root: &Path) -> Result<Vec<DiscoveredFile>> {
    if !root.is_dir() {
        return Err(FusionError::MissingInput(root.to_path_buf()));
    }

    let mut files = Vec::new();
    for entry in WalkDir::new(root) {
        let entry = entry.map_err(std::io::Error::from)?;
        if !entry.file_type().is_file() || !is_workbook(entry.path()) {
            continue;
        }
        let source_id = source_id_for(root, entry.path());
        debug!(source = %source_id, "discovered workbook");
        files.push(DiscoveredFile {
            path: entry.into_path(),
            source_id,
        });
    }

    files.sort_by(|lhs, rhs| {
        lhs.source_id
            .to_lowercase()
            .cmp(&rhs.source_id.to_lowercase())
            .then_with(|| lhs.source_id.cmp(&rhs.source_id))
    });

    info!(root = %root.display(), count = files.len(), "workbooks discovered");
    Ok(files)
}

fn is_workbook(path: &Path) -> bool {
    let is_xlsx = path
        .extension()
        .and_then(|ext| ext.to_str())
        .is_some_and(|ext| ext.eq_ignore_ascii_case("xlsx"));
    let is_lock_file = path
        .file_name()
        .and_then(|name| name.to_str())
        .is_some_and(|name| name.starts_with("~$"));
    is_xlsx && !is_lock_file
}

fn source_id_for(root: &Path, path: &Path) -> String {
    let relative = path.strip_prefix(root).unwrap_or(path);
    relative
        .components()
        .map(|component| component.as_os_str().to_string_lossy())
        .collect::<Vec<_>>()
        .join("/")
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::tempdir;

    #[test]
    fn finds_workbooks_recursively_in_case_insensitive_order() {
        let dir = tempdir().expect("temporary directory");
        let root = dir.path();
        fs::create_dir_all(root.join("b-folder/nested")).expect("folders created");
        for name in [
            "zeta.xlsx",
            "Alpha.XLSX",
            "b-folder/nested/beta.xlsx",
            "b-folder/Apple.xlsx",
            "notes.txt",
            "~$zeta.xlsx",
        ] {
            fs::write(root.join(name), b"").expect("file written");
        }

        let found: Vec<String> = discover_xlsx(root)
            .expect("discovery")
            .into_iter()
            .map(|file| file.source_id)
            .collect();

        assert_eq!(
            found,
            vec![
                "Alpha.XLSX",
                "b-folder/Apple.xlsx",
                "b-folder/nested/beta.xlsx",
                "zeta.xlsx",
            ]
        );
    }

    #[test]
    fn missing_directory_is_an_error() {
        let dir = tempdir().expect("temporary directory");
        let result = discover_xlsx(&dir.path().join("absent"));
        assert!(matches!(result, Err(FusionError::MissingInput(_))));
    }

    #[test]
    fn empty_directory_yields_nothing() {
        let dir = tempdir().expect("temporary directory");
        assert!(discover_xlsx(dir.path()).expect("discovery").is_empty());
    }
}
