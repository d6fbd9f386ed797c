//! Shared data model for the localization sync pipeline.
//!
//! Defines the shape of per-locale configuration documents and the merge
//! rule both platform mergers apply to flat string resources.

pub mod config;
pub mod merge;
pub mod platform;

pub use config::{LocaleConfig, LocaleDocument, StringMap};
pub use merge::merge_strings;
pub use platform::Platform;
