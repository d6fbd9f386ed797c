//! `strings.xml` reading and writing.
//!
//! Reading is lenient where the original tree may be dirty: a missing file
//! is an empty map, and a file that fails to parse is treated as empty
//! with a warning so a corrupt resource never blocks the merge.

use std::fs;
use std::path::Path;

use anyhow::{Context, Result};
use quick_xml::Reader;
use quick_xml::events::{BytesDecl, BytesEnd, BytesStart, BytesText, Event};
use tracing::warn;

use locsync_model::StringMap;

/// Parses a `strings.xml` document into its key/value entries.
pub fn parse_strings_xml(text: &str) -> Result<StringMap> {
    let mut reader = Reader::from_str(text);
    let mut strings = StringMap::new();
    // Key and accumulated text of the <string> element being read.
    let mut current: Option<(String, String)> = None;

    loop {
        match reader.read_event().context("read strings.xml event")? {
            Event::Start(element) if element.name().as_ref() == b"string" => {
                current = string_name(&element)?.map(|key| (key, String::new()));
            }
            Event::Empty(element) if element.name().as_ref() == b"string" => {
                if let Some(key) = string_name(&element)? {
                    strings.insert(key, String::new());
                }
            }
            Event::Text(text) => {
                if let Some((_, value)) = current.as_mut() {
                    value.push_str(&text.decode().context("decode string value")?);
                }
            }
            Event::GeneralRef(reference) => {
                if let Some((_, value)) = current.as_mut() {
                    push_entity(value, &reference)?;
                }
            }
            Event::End(element) if element.name().as_ref() == b"string" => {
                if let Some((key, value)) = current.take() {
                    strings.insert(key, value);
                }
            }
            Event::Eof => break,
            _ => {}
        }
    }
    Ok(strings)
}

/// Resolves an entity reference event into the accumulated value.
fn push_entity(out: &mut String, reference: &quick_xml::events::BytesRef<'_>) -> Result<()> {
    if let Some(ch) = reference
        .resolve_char_ref()
        .context("resolve character reference")?
    {
        out.push(ch);
        return Ok(());
    }
    match reference.as_ref() {
        b"amp" => out.push('&'),
        b"lt" => out.push('<'),
        b"gt" => out.push('>'),
        b"quot" => out.push('"'),
        b"apos" => out.push('\''),
        other => anyhow::bail!(
            "unsupported entity reference: &{};",
            String::from_utf8_lossy(other)
        ),
    }
    Ok(())
}

fn string_name(element: &BytesStart<'_>) -> Result<Option<String>> {
    for attribute in element.attributes() {
        let attribute = attribute.context("read string attribute")?;
        if attribute.key.as_ref() == b"name" {
            let value = attribute
                .unescape_value()
                .context("unescape string name")?
                .into_owned();
            return Ok(Some(value));
        }
    }
    Ok(None)
}

/// Reads an existing `strings.xml`, treating a missing or unparseable file
/// as empty.
pub fn read_strings_file(path: &Path) -> StringMap {
    let text = match fs::read_to_string(path) {
        Ok(text) => text,
        Err(error) if error.kind() == std::io::ErrorKind::NotFound => return StringMap::new(),
        Err(error) => {
            warn!(path = %path.display(), %error, "could not read existing strings.xml, treating as empty");
            return StringMap::new();
        }
    };
    match parse_strings_xml(&text) {
        Ok(strings) => strings,
        Err(error) => {
            warn!(path = %path.display(), %error, "could not parse existing strings.xml, treating as empty");
            StringMap::new()
        }
    }
}

/// Renders the merged map as an Android resource document. Values are
/// entity-escaped (`& < > " '`).
pub fn render_strings_xml(strings: &StringMap) -> Result<String> {
    let mut writer = quick_xml::Writer::new_with_indent(Vec::new(), b' ', 4);
    writer.write_event(Event::Decl(BytesDecl::new("1.0", Some("utf-8"), None)))?;
    writer.write_event(Event::Start(BytesStart::new("resources")))?;
    for (key, value) in strings {
        let mut element = BytesStart::new("string");
        element.push_attribute(("name", key.as_str()));
        writer.write_event(Event::Start(element))?;
        writer.write_event(Event::Text(BytesText::new(value)))?;
        writer.write_event(Event::End(BytesEnd::new("string")))?;
    }
    writer.write_event(Event::End(BytesEnd::new("resources")))?;

    let mut output = writer.into_inner();
    output.push(b'\n');
    String::from_utf8(output).context("strings.xml output is not UTF-8")
}

/// Writes the merged map to `path`, creating parent directories as needed.
pub fn write_strings_file(path: &Path, strings: &StringMap) -> Result<()> {
    let xml = render_strings_xml(strings)?;
    fs::write(path, xml).with_context(|| format!("write {}", path.display()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    fn map(entries: &[(&str, &str)]) -> StringMap {
        entries
            .iter()
            .map(|(k, v)| ((*k).to_string(), (*v).to_string()))
            .collect()
    }

    #[test]
    fn renders_expected_document() {
        let xml = render_strings_xml(&map(&[("app_name", "App")])).unwrap();
        assert!(xml.contains(r#"<string name="app_name">App</string>"#));
        assert!(xml.starts_with("<?xml"));
        assert!(xml.contains("<resources>"));
    }

    #[test]
    fn escapes_special_characters() {
        let xml = render_strings_xml(&map(&[("greeting", r#"Say "hi" & <wave>"#)])).unwrap();
        assert!(xml.contains("&quot;hi&quot;"));
        assert!(xml.contains("&amp;"));
        assert!(xml.contains("&lt;wave&gt;"));
        assert!(!xml.contains("<wave>"));
    }

    #[test]
    fn escaped_values_round_trip_through_the_parser() {
        let original = map(&[("quote", "a \"b\" \\ c\nd & <e>")]);
        let xml = render_strings_xml(&original).unwrap();
        let parsed = parse_strings_xml(&xml).unwrap();
        assert_eq!(parsed, original);
    }

    #[test]
    fn parses_empty_elements_and_entities() {
        let parsed = parse_strings_xml(
            r#"<resources>
                <string name="empty"/>
                <string name="amp">a &amp; b</string>
            </resources>"#,
        )
        .unwrap();
        assert_eq!(parsed, map(&[("empty", ""), ("amp", "a & b")]));
    }

    #[test]
    fn missing_file_reads_as_empty() {
        let dir = tempfile::tempdir().unwrap();
        assert!(read_strings_file(&dir.path().join("strings.xml")).is_empty());
    }

    #[test]
    fn unparseable_file_reads_as_empty() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("strings.xml");
        std::fs::write(&path, "<resources><string").unwrap();
        assert!(read_strings_file(&path).is_empty());
    }

    proptest! {
        /// Written values are recovered exactly by re-parsing the document.
        #[test]
        fn values_round_trip(value in "[ -~]{0,32}") {
            let original = map(&[("key", &value)]);
            let xml = render_strings_xml(&original).unwrap();
            let parsed = parse_strings_xml(&xml).unwrap();
            prop_assert_eq!(parsed, original);
        }
    }
}
