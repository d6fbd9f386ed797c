use std::path::PathBuf;

use locsync_model::Platform;

/// Result of a full sync run.
#[derive(Debug)]
pub struct SyncResult {
    pub project_root: PathBuf,
    /// Locales discovered in the localizations directory.
    pub locales: Vec<String>,
    /// Per-platform outcomes, in execution order.
    pub platforms: Vec<PlatformSummary>,
    /// Locale files that could not be loaded.
    pub ingest_errors: Vec<String>,
    pub has_errors: bool,
}

/// Outcome of one platform's update.
#[derive(Debug)]
pub struct PlatformSummary {
    pub platform: Platform,
    /// Reason the platform was skipped, when it was.
    pub skipped: Option<String>,
    pub locales_applied: usize,
    pub files_written: usize,
    /// Whether the project graph was synchronized (iOS only).
    pub project_synchronized: Option<bool>,
    pub errors: Vec<String>,
}
