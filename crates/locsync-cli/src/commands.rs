use anyhow::{Context, Result};
use tracing::{info, info_span};

use locsync_android::update_android;
use locsync_ingest::load_locale_documents;
use locsync_ios::{PlistMode, update_ios};
use locsync_model::Platform;

use crate::cli::{Cli, PlatformArg, PlistModeArg};
use crate::types::{PlatformSummary, SyncResult};

/// Runs the sync for the selected platforms.
///
/// Locale documents are loaded once; each platform's update then runs to
/// completion in sequence. Per-file and per-platform failures are collected
/// into the result rather than aborting the run; only a missing
/// localizations directory fails outright.
pub fn run_sync(cli: &Cli) -> Result<SyncResult> {
    let project_root = &cli.project_root;
    let localizations_dir = project_root.join("localizations");

    let loaded = load_locale_documents(&localizations_dir).context("load localizations")?;
    info!(
        locales = loaded.documents.len(),
        skipped = loaded.errors.len(),
        "loaded locale documents"
    );

    let mut result = SyncResult {
        project_root: project_root.clone(),
        locales: loaded
            .documents
            .iter()
            .map(|document| document.locale.clone())
            .collect(),
        platforms: Vec::new(),
        ingest_errors: loaded.errors,
        has_errors: false,
    };

    for platform in selected_platforms(cli.platform) {
        let span = info_span!("platform", platform = %platform);
        let _guard = span.enter();
        let summary = match platform {
            Platform::Android => {
                let report = update_android(project_root, &loaded.documents);
                PlatformSummary {
                    platform,
                    skipped: report.skipped,
                    locales_applied: report.locales_applied.len(),
                    files_written: report.files_written.len(),
                    project_synchronized: None,
                    errors: report.errors,
                }
            }
            Platform::Ios => {
                let report = update_ios(project_root, &loaded.documents, plist_mode(cli.plist_mode));
                PlatformSummary {
                    platform,
                    skipped: report.skipped,
                    locales_applied: report.locales_applied.len(),
                    files_written: report.strings_files_written.len(),
                    project_synchronized: Some(report.project_synchronized),
                    errors: report.errors,
                }
            }
        };
        result.platforms.push(summary);
    }

    result.has_errors = result
        .platforms
        .iter()
        .any(|summary| !summary.errors.is_empty());
    Ok(result)
}

/// Platforms to run, in execution order.
fn selected_platforms(arg: PlatformArg) -> Vec<Platform> {
    match arg {
        PlatformArg::Android => vec![Platform::Android],
        PlatformArg::Ios => vec![Platform::Ios],
        PlatformArg::Both => vec![Platform::Android, Platform::Ios],
    }
}

fn plist_mode(arg: PlistModeArg) -> PlistMode {
    match arg {
        PlistModeArg::Overwrite => PlistMode::Overwrite,
        PlistModeArg::Variables => PlistMode::Variables,
    }
}
