//! Locale file discovery.

use std::path::{Path, PathBuf};

use crate::error::{IngestError, Result};

/// A discovered locale configuration file.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LocaleFile {
    /// Locale identifier derived from the file stem (`fr.json` -> `fr`).
    pub locale: String,
    /// Path to the JSON document.
    pub path: PathBuf,
}

/// Lists all locale configuration files in a directory.
///
/// Non-JSON files are ignored. Results are sorted by locale identifier so
/// processing order is stable across runs.
pub fn list_locale_files(dir: &Path) -> Result<Vec<LocaleFile>> {
    if !dir.is_dir() {
        return Err(IngestError::DirectoryNotFound {
            path: dir.to_path_buf(),
        });
    }

    let entries = std::fs::read_dir(dir).map_err(|e| IngestError::DirectoryRead {
        path: dir.to_path_buf(),
        source: e,
    })?;

    let mut files = Vec::new();
    for entry_result in entries {
        let entry = entry_result.map_err(|e| IngestError::DirectoryRead {
            path: dir.to_path_buf(),
            source: e,
        })?;

        let path = entry.path();
        if !path.is_file() {
            continue;
        }

        let is_json = path
            .extension()
            .and_then(|ext| ext.to_str())
            .map(|ext| ext.eq_ignore_ascii_case("json"))
            .unwrap_or(false);
        if !is_json {
            continue;
        }

        let Some(locale) = path.file_stem().and_then(|stem| stem.to_str()) else {
            continue;
        };
        files.push(LocaleFile {
            locale: locale.to_string(),
            path,
        });
    }

    files.sort_by(|a, b| a.locale.cmp(&b.locale));
    Ok(files)
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn create_test_dir() -> TempDir {
        let dir = TempDir::new().unwrap();
        for name in &["fr.json", "en.json", "zh-Hans.json", "notes.txt"] {
            std::fs::write(dir.path().join(name), "{}").unwrap();
        }
        dir
    }

    #[test]
    fn lists_json_files_sorted_by_locale() {
        let dir = create_test_dir();
        let files = list_locale_files(dir.path()).unwrap();
        let locales: Vec<&str> = files.iter().map(|f| f.locale.as_str()).collect();
        assert_eq!(locales, vec!["en", "fr", "zh-Hans"]);
    }

    #[test]
    fn missing_directory_is_an_error() {
        let dir = TempDir::new().unwrap();
        let missing = dir.path().join("localizations");
        let err = list_locale_files(&missing).unwrap_err();
        assert!(matches!(err, IngestError::DirectoryNotFound { .. }));
    }
}
