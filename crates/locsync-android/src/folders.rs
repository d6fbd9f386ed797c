//! Locale to `values` directory mapping.

/// Locales whose Android resource qualifiers differ from the locale
/// identifier. Chinese script tags fan out to the region qualifiers Android
/// resolves at runtime.
const LANGUAGE_MAPPINGS: [(&str, &[&str]); 2] = [
    ("zh-Hans", &["zh-rCN"]),
    ("zh-Hant", &["zh-rHK", "zh-rTW", "zh-rMO"]),
];

/// Resource directory names a locale's strings land in.
///
/// `en` is the default locale and writes to the unqualified `values`
/// directory; mapped locales may target several directories.
pub fn resource_folders(locale: &str) -> Vec<String> {
    if let Some((_, qualifiers)) = LANGUAGE_MAPPINGS.iter().find(|(tag, _)| *tag == locale) {
        return qualifiers
            .iter()
            .map(|qualifier| format!("values-{qualifier}"))
            .collect();
    }
    if locale == "en" {
        return vec!["values".to_string()];
    }
    vec![format!("values-{locale}")]
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_locale_uses_unqualified_values() {
        assert_eq!(resource_folders("en"), vec!["values"]);
    }

    #[test]
    fn plain_locales_get_one_qualified_folder() {
        assert_eq!(resource_folders("fr"), vec!["values-fr"]);
    }

    #[test]
    fn chinese_script_tags_fan_out() {
        assert_eq!(resource_folders("zh-Hans"), vec!["values-zh-rCN"]);
        assert_eq!(
            resource_folders("zh-Hant"),
            vec!["values-zh-rHK", "values-zh-rTW", "values-zh-rMO"]
        );
    }
}
