//! Android platform update: walks the locale documents and merges each
//! locale's strings into the native resource tree.

use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use tracing::{debug, info, warn};

use locsync_model::{LocaleDocument, StringMap, merge_strings};

use crate::folders::resource_folders;
use crate::strings_xml::{read_strings_file, write_strings_file};

/// Outcome of the Android platform update.
#[derive(Debug, Default)]
pub struct AndroidReport {
    /// Reason the platform was skipped entirely, when it was.
    pub skipped: Option<String>,
    /// Locales whose resources were written.
    pub locales_applied: Vec<String>,
    /// Resource files written.
    pub files_written: Vec<PathBuf>,
    /// Total number of keys merged across all written files.
    pub keys_merged: usize,
    /// Per-locale failures; these never abort the batch.
    pub errors: Vec<String>,
}

/// Resource root of the generated Android project.
pub fn android_res_dir(project_root: &Path) -> PathBuf {
    project_root
        .join("android")
        .join("app")
        .join("src")
        .join("main")
        .join("res")
}

/// Merges every document's Android strings into the resource tree.
///
/// A missing resource tree skips the platform with an informational
/// message; per-locale failures are collected and processing continues.
pub fn update_android(project_root: &Path, documents: &[LocaleDocument]) -> AndroidReport {
    let mut report = AndroidReport::default();
    let res_dir = android_res_dir(project_root);

    if !res_dir.is_dir() {
        info!(
            path = %res_dir.display(),
            "Android resources directory not found; scaffold the native project first"
        );
        report.skipped = Some(format!(
            "resources directory not found: {}",
            res_dir.display()
        ));
        return report;
    }

    for document in documents {
        let Some(strings) = &document.config.android else {
            debug!(locale = %document.locale, "no Android section, skipping");
            continue;
        };

        let mut applied = false;
        for folder in resource_folders(&document.locale) {
            match merge_into_folder(&res_dir.join(&folder), strings) {
                Ok(path) => {
                    report.keys_merged += strings.len();
                    report.files_written.push(path);
                    applied = true;
                }
                Err(error) => {
                    warn!(locale = %document.locale, folder, "failed to update resources: {error:#}");
                    report
                        .errors
                        .push(format!("{} ({folder}): {error:#}", document.locale));
                }
            }
        }
        if applied {
            report.locales_applied.push(document.locale.clone());
        }
    }

    report
}

fn merge_into_folder(target_dir: &Path, strings: &StringMap) -> Result<PathBuf> {
    fs::create_dir_all(target_dir)
        .with_context(|| format!("create directory {}", target_dir.display()))?;
    let path = target_dir.join("strings.xml");

    let existing = read_strings_file(&path);
    let merged = merge_strings(&existing, strings);
    write_strings_file(&path, &merged)?;
    info!(path = %path.display(), merged = strings.len(), "updated Android strings");
    Ok(path)
}
