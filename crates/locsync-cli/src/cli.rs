//! CLI argument definitions for the localization sync tool.

use std::path::PathBuf;

use clap::{Parser, ValueEnum};
use clap_verbosity_flag::{Verbosity, WarnLevel};
use colorchoice_clap::Color;

#[derive(Parser)]
#[command(
    name = "locsync",
    version,
    about = "Sync localization files into generated Android and iOS projects",
    long_about = "Reads per-locale JSON documents from the 'localizations' directory\n\
                  and merges them into the native project trees: Android strings.xml\n\
                  resources and iOS InfoPlist.strings files, Info.plist, and the\n\
                  Xcode project configuration."
)]
pub struct Cli {
    /// Platform to update.
    #[arg(long = "platform", value_enum, default_value = "both")]
    pub platform: PlatformArg,

    /// Project root containing 'localizations' and the native project trees.
    #[arg(long = "project-root", value_name = "DIR", default_value = ".")]
    pub project_root: PathBuf,

    /// How development-region values are written into Info.plist.
    #[arg(long = "plist-mode", value_enum, default_value = "overwrite")]
    pub plist_mode: PlistModeArg,

    /// Adjust log verbosity (-v for debug, -vv for trace, -q for errors only).
    #[command(flatten)]
    pub verbosity: Verbosity<WarnLevel>,

    /// Control ANSI color output (auto, always, never).
    #[command(flatten)]
    pub color: Color,

    /// Explicit log level (overrides -v/-q flags).
    #[arg(long = "log-level", value_enum, global = true)]
    pub log_level: Option<LogLevelArg>,

    /// Log output format (pretty for human, json for machine parsing).
    #[arg(
        long = "log-format",
        value_enum,
        default_value = "pretty",
        global = true
    )]
    pub log_format: LogFormatArg,

    /// Write logs to a file instead of stderr.
    #[arg(long = "log-file", value_name = "PATH", global = true)]
    pub log_file: Option<PathBuf>,
}

#[derive(Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum PlatformArg {
    Ios,
    Android,
    Both,
}

/// Development-region Info.plist handling.
#[derive(Clone, Copy, ValueEnum)]
pub enum PlistModeArg {
    /// Write localized values into Info.plist directly.
    Overwrite,
    /// Replace localized values with $(KEY) variable references.
    Variables,
}

/// CLI log level choices.
#[derive(Clone, Copy, ValueEnum)]
pub enum LogLevelArg {
    Error,
    Warn,
    Info,
    Debug,
    Trace,
}

/// CLI log format choices.
#[derive(Clone, Copy, ValueEnum)]
pub enum LogFormatArg {
    Pretty,
    Compact,
    Json,
}
