//! Per-locale configuration documents.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

/// Flat key/value string resource map.
///
/// `BTreeMap` keeps output ordering deterministic across runs regardless of
/// the order keys appear in the source document.
pub type StringMap = BTreeMap<String, String>;

/// One locale's configuration file (`localizations/<locale>.json`).
///
/// Both platform sections are optional; a missing section means the locale
/// has no content for that platform.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct LocaleConfig {
    /// Android string resources (`strings.xml` entries).
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub android: Option<StringMap>,
    /// iOS `Info.plist` localization values (`InfoPlist.strings` entries).
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub ios: Option<StringMap>,
}

impl LocaleConfig {
    /// Returns true when neither platform section is present.
    pub fn is_empty(&self) -> bool {
        self.android.is_none() && self.ios.is_none()
    }
}

/// A locale configuration paired with the locale identifier it was loaded
/// for (derived from the file stem, e.g. `fr.json` -> `fr`).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LocaleDocument {
    /// Locale identifier (e.g. `en`, `fr`, `zh-Hans`).
    pub locale: String,
    /// Parsed configuration content.
    pub config: LocaleConfig,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn config_parses_with_missing_sections() {
        let config: LocaleConfig =
            serde_json::from_str(r#"{"android":{"app_name":"App"}}"#).expect("parse config");
        assert_eq!(
            config.android.as_ref().and_then(|map| map.get("app_name")),
            Some(&"App".to_string())
        );
        assert!(config.ios.is_none());
        assert!(!config.is_empty());
    }

    #[test]
    fn empty_document_is_empty() {
        let config: LocaleConfig = serde_json::from_str("{}").expect("parse config");
        assert!(config.is_empty());
    }

    #[test]
    fn config_round_trips() {
        let mut android = StringMap::new();
        android.insert("app_name".to_string(), "App".to_string());
        let config = LocaleConfig {
            android: Some(android),
            ios: None,
        };
        let json = serde_json::to_string(&config).expect("serialize config");
        let round: LocaleConfig = serde_json::from_str(&json).expect("deserialize config");
        assert_eq!(round, config);
    }
}
