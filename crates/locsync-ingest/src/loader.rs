//! Lenient loading of locale configuration documents.

use std::path::Path;

use tracing::{debug, warn};

use locsync_model::{LocaleConfig, LocaleDocument};

use crate::discovery::list_locale_files;
use crate::error::{IngestError, Result};

/// Result of loading a localizations directory.
#[derive(Debug, Default)]
pub struct LoadedLocales {
    /// Successfully parsed documents, sorted by locale.
    pub documents: Vec<LocaleDocument>,
    /// Human-readable messages for files that were skipped.
    pub errors: Vec<String>,
}

/// Loads every locale document in the directory.
///
/// A file that cannot be read or parsed is skipped with a warning and
/// recorded in `errors`; the remaining files still load. Only a missing or
/// unreadable directory fails the whole call.
pub fn load_locale_documents(dir: &Path) -> Result<LoadedLocales> {
    let files = list_locale_files(dir)?;
    let mut loaded = LoadedLocales::default();

    for file in files {
        match load_one(&file.path) {
            Ok(config) => {
                if config.is_empty() {
                    debug!(locale = %file.locale, "no platform sections, skipping");
                }
                loaded.documents.push(LocaleDocument {
                    locale: file.locale,
                    config,
                });
            }
            Err(error) => {
                warn!(locale = %file.locale, %error, "skipping locale file");
                loaded.errors.push(error.to_string());
            }
        }
    }

    Ok(loaded)
}

fn load_one(path: &Path) -> Result<LocaleConfig> {
    let text = std::fs::read_to_string(path).map_err(|e| IngestError::FileRead {
        path: path.to_path_buf(),
        source: e,
    })?;
    serde_json::from_str(&text).map_err(|e| IngestError::Parse {
        path: path.to_path_buf(),
        source: e,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn loads_documents_and_skips_invalid_ones() {
        let dir = TempDir::new().unwrap();
        std::fs::write(
            dir.path().join("en.json"),
            r#"{"android":{"app_name":"App"}}"#,
        )
        .unwrap();
        std::fs::write(
            dir.path().join("fr.json"),
            r#"{"android":{"app_name":"Appli"},"ios":{"CFBundleDisplayName":"Appli"}}"#,
        )
        .unwrap();
        std::fs::write(dir.path().join("de.json"), "{ not json").unwrap();

        let loaded = load_locale_documents(dir.path()).unwrap();
        let locales: Vec<&str> = loaded
            .documents
            .iter()
            .map(|d| d.locale.as_str())
            .collect();
        assert_eq!(locales, vec!["en", "fr"]);
        assert_eq!(loaded.errors.len(), 1);
        assert!(loaded.errors[0].contains("de.json"));
    }

    #[test]
    fn empty_sections_still_produce_a_document() {
        let dir = TempDir::new().unwrap();
        std::fs::write(dir.path().join("it.json"), "{}").unwrap();

        let loaded = load_locale_documents(dir.path()).unwrap();
        assert_eq!(loaded.documents.len(), 1);
        assert!(loaded.documents[0].config.is_empty());
    }
}
