//! iOS platform update: strings generation, `Info.plist` maintenance, and
//! project graph synchronization with all-or-nothing write-back.

use std::collections::BTreeSet;
use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use tracing::{debug, info, warn};

use locsync_model::{LocaleDocument, StringMap, merge_strings};
use locsync_pbxproj::{PbxProject, SyncOutcome, synchronize};

use crate::discovery::{IosProjectPaths, locate_ios_project};
use crate::plist::{PlistDict, PlistValue, read_plist, write_plist};
use crate::strings::{read_strings_file, render_strings};

/// How development-region values are written into `Info.plist`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum PlistMode {
    /// Write the localized value into the plist directly.
    #[default]
    Overwrite,
    /// Replace each localized value with a `$(KEY)` variable reference.
    Variables,
}

/// Outcome of the iOS platform update.
#[derive(Debug, Default)]
pub struct IosReport {
    /// Reason the platform was skipped entirely, when it was.
    pub skipped: Option<String>,
    /// Locales whose strings file was written.
    pub locales_applied: Vec<String>,
    /// Strings files written.
    pub strings_files_written: Vec<PathBuf>,
    /// Keys absent from `Info.plist` that were skipped with a warning.
    pub keys_skipped: Vec<String>,
    /// Whether the project graph was synchronized and written back.
    pub project_synchronized: bool,
    /// What the graph synchronization changed, when it ran.
    pub sync_outcome: Option<SyncOutcome>,
    /// Failures; these suppress the affected write-back only.
    pub errors: Vec<String>,
}

/// Merges every document's iOS strings into the native project.
///
/// The project file write-back happens only after graph synchronization
/// completes without error; an integrity failure leaves the file exactly
/// as it was on disk.
pub fn update_ios(project_root: &Path, documents: &[LocaleDocument], mode: PlistMode) -> IosReport {
    let mut report = IosReport::default();
    let Some(paths) = locate_ios_project(project_root) else {
        info!("iOS project directory not found; scaffold the native project first");
        report.skipped = Some("iOS project directory not found".to_string());
        return report;
    };

    let info_plist_path = paths.res_dir.join("Info.plist");
    let mut info_plist = match read_plist(&info_plist_path) {
        Ok(plist) => plist,
        Err(error) => {
            warn!("could not read Info.plist: {error:#}");
            report.errors.push(format!("Info.plist: {error:#}"));
            return report;
        }
    };
    let development_region = info_plist
        .get_str("CFBundleDevelopmentRegion")
        .map(str::to_string);

    let mut languages = BTreeSet::new();
    for document in documents {
        let Some(section) = &document.config.ios else {
            debug!(locale = %document.locale, "no iOS section, skipping");
            continue;
        };
        match apply_locale(
            &paths,
            &mut info_plist,
            development_region.as_deref(),
            document,
            section,
            mode,
            &mut report,
        ) {
            Ok(path) => {
                languages.insert(document.locale.clone());
                report.locales_applied.push(document.locale.clone());
                report.strings_files_written.push(path);
            }
            Err(error) => {
                warn!(locale = %document.locale, "failed to update strings: {error:#}");
                report
                    .errors
                    .push(format!("{}: {error:#}", document.locale));
            }
        }
    }

    if !languages.is_empty() {
        info_plist.insert(
            "CFBundleLocalizations",
            PlistValue::Array(
                languages
                    .iter()
                    .map(|locale| PlistValue::String(locale.clone()))
                    .collect(),
            ),
        );
        match write_plist(&info_plist_path, &info_plist) {
            Ok(()) => info!(path = %info_plist_path.display(), "updated Info.plist"),
            Err(error) => report.errors.push(format!("Info.plist: {error:#}")),
        }
    }

    if languages.is_empty() {
        debug!("no iOS locales applied, skipping project sync");
    } else if paths.pbxproj.is_file() {
        match synchronize_project(&paths.pbxproj, &languages) {
            Ok(outcome) => {
                report.project_synchronized = true;
                report.sync_outcome = Some(outcome);
            }
            Err(error) => {
                warn!("project synchronization failed: {error:#}");
                report.errors.push(format!("project sync: {error:#}"));
            }
        }
    } else {
        debug!(path = %paths.pbxproj.display(), "project file not found, skipping graph sync");
    }

    report
}

/// Writes one locale's strings file and applies development-region values
/// to `Info.plist`.
fn apply_locale(
    paths: &IosProjectPaths,
    info_plist: &mut PlistDict,
    development_region: Option<&str>,
    document: &LocaleDocument,
    section: &StringMap,
    mode: PlistMode,
    report: &mut IosReport,
) -> Result<PathBuf> {
    let lproj = paths.res_dir.join(format!("{}.lproj", document.locale));
    fs::create_dir_all(&lproj).with_context(|| format!("create {}", lproj.display()))?;

    if development_region == Some(document.locale.as_str()) {
        for (key, value) in section {
            if info_plist.contains_key(key) {
                let replacement = match mode {
                    PlistMode::Overwrite => value.clone(),
                    PlistMode::Variables => format!("$({key})"),
                };
                info_plist.insert(key.clone(), PlistValue::String(replacement));
            }
        }
    }

    // Only keys that exist in Info.plist have a localization slot.
    let mut entries = StringMap::new();
    for (key, value) in section {
        if info_plist.contains_key(key) {
            entries.insert(key.clone(), value.clone());
        } else {
            warn!(locale = %document.locale, key, "key not found in Info.plist, skipping");
            report.keys_skipped.push(key.clone());
        }
    }

    let path = lproj.join("InfoPlist.strings");
    let existing = read_strings_file(&path);
    let merged = merge_strings(&existing, &entries);
    fs::write(&path, render_strings(&merged))
        .with_context(|| format!("write {}", path.display()))?;
    info!(path = %path.display(), merged = entries.len(), "updated iOS strings");
    Ok(path)
}

/// Loads, synchronizes, and writes back the project file. Write-back is the
/// last step and is skipped entirely on error or when nothing changed.
fn synchronize_project(path: &Path, languages: &BTreeSet<String>) -> Result<SyncOutcome> {
    let mut project = PbxProject::load(path).context("load project file")?;
    let outcome = synchronize(&mut project, languages)?;
    if outcome.changed() {
        project.save(path).context("write project file")?;
        info!(path = %path.display(), "updated Xcode project configuration");
    } else {
        debug!(path = %path.display(), "project graph already up to date");
    }
    Ok(outcome)
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    const INFO_PLIST: &str = r#"<?xml version="1.0" encoding="UTF-8"?>
<!DOCTYPE plist PUBLIC "-//Apple//DTD PLIST 1.0//EN" "http://www.apple.com/DTDs/PropertyList-1.0.dtd">
<plist version="1.0">
<dict>
	<key>CFBundleDevelopmentRegion</key>
	<string>en</string>
	<key>CFBundleDisplayName</key>
	<string>App</string>
	<key>NSCameraUsageDescription</key>
	<string>Take photos</string>
</dict>
</plist>
"#;

    const PBXPROJ: &str = r#"
{
	archiveVersion = 1;
	classes = {
	};
	objectVersion = 56;
	objects = {
		5E0000000000000000000001 = {
			isa = PBXProject;
			developmentRegion = en;
			knownRegions = (
				en,
				Base,
			);
			mainGroup = 5E0000000000000000000002;
		};
		5E0000000000000000000002 = {
			isa = PBXGroup;
			children = (
			);
			sourceTree = "<group>";
		};
		5E0000000000000000000003 = {
			isa = PBXResourcesBuildPhase;
			buildActionMask = 2147483647;
			files = (
			);
		};
	};
	rootObject = 5E0000000000000000000001;
}
"#;

    fn scaffold() -> (TempDir, IosProjectPaths) {
        let root = TempDir::new().unwrap();
        let res_dir = root.path().join("ios/App/App");
        fs::create_dir_all(&res_dir).unwrap();
        fs::write(res_dir.join("Info.plist"), INFO_PLIST).unwrap();
        let proj_dir = root.path().join("ios/App/App.xcodeproj");
        fs::create_dir_all(&proj_dir).unwrap();
        fs::write(proj_dir.join("project.pbxproj"), PBXPROJ).unwrap();
        let paths = locate_ios_project(root.path()).unwrap();
        (root, paths)
    }

    fn document(locale: &str, entries: &[(&str, &str)]) -> LocaleDocument {
        LocaleDocument {
            locale: locale.to_string(),
            config: locsync_model::LocaleConfig {
                android: None,
                ios: Some(
                    entries
                        .iter()
                        .map(|(k, v)| ((*k).to_string(), (*v).to_string()))
                        .collect(),
                ),
            },
        }
    }

    #[test]
    fn writes_strings_plist_and_project() {
        let (root, paths) = scaffold();
        let documents = vec![
            document(
                "en",
                &[
                    ("CFBundleDisplayName", "My App"),
                    ("MissingKey", "ignored"),
                ],
            ),
            document("fr", &[("CFBundleDisplayName", "Mon App")]),
        ];

        let report = update_ios(root.path(), &documents, PlistMode::Overwrite);
        assert!(report.skipped.is_none());
        assert!(report.errors.is_empty(), "{:?}", report.errors);
        assert_eq!(report.locales_applied, vec!["en", "fr"]);
        assert_eq!(report.keys_skipped, vec!["MissingKey"]);
        assert!(report.project_synchronized);

        let en = fs::read_to_string(paths.res_dir.join("en.lproj/InfoPlist.strings")).unwrap();
        assert!(en.contains("CFBundleDisplayName = \"My App\";"));
        assert!(!en.contains("MissingKey"));
        let fr = fs::read_to_string(paths.res_dir.join("fr.lproj/InfoPlist.strings")).unwrap();
        assert!(fr.contains("CFBundleDisplayName = \"Mon App\";"));

        let plist = read_plist(&paths.res_dir.join("Info.plist")).unwrap();
        // Development-region values are written through in overwrite mode.
        assert_eq!(plist.get_str("CFBundleDisplayName"), Some("My App"));
        let Some(PlistValue::Array(localizations)) = plist.get("CFBundleLocalizations") else {
            panic!("CFBundleLocalizations missing");
        };
        assert_eq!(localizations.len(), 2);

        let project_text = fs::read_to_string(&paths.pbxproj).unwrap();
        assert!(project_text.contains("PBXVariantGroup"));
        assert!(project_text.contains("fr.lproj/InfoPlist.strings"));
    }

    #[test]
    fn variables_mode_writes_reference_tokens() {
        let (root, paths) = scaffold();
        let documents = vec![document("en", &[("CFBundleDisplayName", "My App")])];

        let report = update_ios(root.path(), &documents, PlistMode::Variables);
        assert!(report.errors.is_empty(), "{:?}", report.errors);

        let plist = read_plist(&paths.res_dir.join("Info.plist")).unwrap();
        assert_eq!(
            plist.get_str("CFBundleDisplayName"),
            Some("$(CFBundleDisplayName)")
        );
        // The strings file still carries the localized value.
        let en = fs::read_to_string(paths.res_dir.join("en.lproj/InfoPlist.strings")).unwrap();
        assert!(en.contains("CFBundleDisplayName = \"My App\";"));
    }

    #[test]
    fn merges_existing_strings_entries() {
        let (root, paths) = scaffold();
        let lproj = paths.res_dir.join("fr.lproj");
        fs::create_dir_all(&lproj).unwrap();
        fs::write(
            lproj.join("InfoPlist.strings"),
            "NSCameraUsageDescription = \"Prendre des photos\";\n",
        )
        .unwrap();

        let report = update_ios(
            root.path(),
            &[document("fr", &[("CFBundleDisplayName", "Mon App")])],
            PlistMode::Overwrite,
        );
        assert!(report.errors.is_empty(), "{:?}", report.errors);

        let fr = fs::read_to_string(lproj.join("InfoPlist.strings")).unwrap();
        assert!(fr.contains("CFBundleDisplayName = \"Mon App\";"));
        assert!(fr.contains("NSCameraUsageDescription = \"Prendre des photos\";"));
    }

    #[test]
    fn graph_integrity_error_suppresses_project_write_back() {
        let (root, paths) = scaffold();
        // A project without a resources build phase fails synchronization.
        let corrupt = PBXPROJ.replace("isa = PBXResourcesBuildPhase;", "isa = PBXUnknownPhase;");
        fs::write(&paths.pbxproj, &corrupt).unwrap();

        let report = update_ios(
            root.path(),
            &[document("fr", &[("CFBundleDisplayName", "Mon App")])],
            PlistMode::Overwrite,
        );

        assert!(!report.project_synchronized);
        assert!(report.errors.iter().any(|e| e.contains("project sync")));
        // The project file is exactly as it was before the run.
        assert_eq!(fs::read_to_string(&paths.pbxproj).unwrap(), corrupt);
        // Strings were still written; the failure is isolated to the graph.
        assert!(paths.res_dir.join("fr.lproj/InfoPlist.strings").is_file());
    }

    #[test]
    fn missing_project_skips_platform() {
        let root = TempDir::new().unwrap();
        let report = update_ios(
            root.path(),
            &[document("fr", &[("CFBundleDisplayName", "Mon App")])],
            PlistMode::Overwrite,
        );
        assert!(report.skipped.is_some());
        assert!(report.locales_applied.is_empty());
    }

    #[test]
    fn documents_without_ios_section_are_ignored() {
        let (root, paths) = scaffold();
        let documents = vec![LocaleDocument {
            locale: "fr".to_string(),
            config: locsync_model::LocaleConfig::default(),
        }];
        let report = update_ios(root.path(), &documents, PlistMode::Overwrite);
        assert!(report.locales_applied.is_empty());
        assert!(!paths.res_dir.join("fr.lproj").exists());
        // Nothing to localize: Info.plist is left untouched.
        assert_eq!(
            fs::read_to_string(paths.res_dir.join("Info.plist")).unwrap(),
            INFO_PLIST
        );
    }
}
