//! CLI library components for the localization sync tool.

pub mod logging;
