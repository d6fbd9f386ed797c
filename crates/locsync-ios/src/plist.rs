//! XML property-list codec for `Info.plist`.
//!
//! Only the keys the sync owns are ever rewritten; everything else in the
//! document (nested dictionaries, arrays, numbers, booleans, data blobs)
//! round-trips through the value tree untouched. Numeric, date, and data
//! payloads are kept as their verbatim text since the tool never computes
//! with them.

use std::fs;
use std::io::Write;
use std::path::Path;

use anyhow::{Context, Result, bail};
use quick_xml::Reader;
use quick_xml::events::{BytesDecl, BytesEnd, BytesRef, BytesStart, BytesText, Event};

const PLIST_DOCTYPE: &str = r#"plist PUBLIC "-//Apple//DTD PLIST 1.0//EN" "http://www.apple.com/DTDs/PropertyList-1.0.dtd""#;

/// A property-list value.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PlistValue {
    String(String),
    /// Verbatim `<integer>` text.
    Integer(String),
    /// Verbatim `<real>` text.
    Real(String),
    Boolean(bool),
    /// Verbatim `<date>` text.
    Date(String),
    /// Verbatim `<data>` text (base64, whitespace included).
    Data(String),
    Array(Vec<PlistValue>),
    Dict(PlistDict),
}

/// An insertion-ordered property-list dictionary.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PlistDict {
    entries: Vec<(String, PlistValue)>,
}

impl PlistDict {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn contains_key(&self, key: &str) -> bool {
        self.entries.iter().any(|(k, _)| k == key)
    }

    pub fn get(&self, key: &str) -> Option<&PlistValue> {
        self.entries.iter().find(|(k, _)| k == key).map(|(_, v)| v)
    }

    pub fn get_str(&self, key: &str) -> Option<&str> {
        match self.get(key) {
            Some(PlistValue::String(s)) => Some(s),
            _ => None,
        }
    }

    /// Inserts or replaces in place, keeping the original entry position on
    /// replacement.
    pub fn insert(&mut self, key: impl Into<String>, value: PlistValue) {
        let key = key.into();
        if let Some(slot) = self
            .entries
            .iter_mut()
            .find(|(k, _)| *k == key)
            .map(|(_, v)| v)
        {
            *slot = value;
        } else {
            self.entries.push((key, value));
        }
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &PlistValue)> {
        self.entries.iter().map(|(k, v)| (k.as_str(), v))
    }
}

impl FromIterator<(String, PlistValue)> for PlistDict {
    fn from_iter<T: IntoIterator<Item = (String, PlistValue)>>(iter: T) -> Self {
        Self {
            entries: iter.into_iter().collect(),
        }
    }
}

/// Parses an XML property list whose root value is a dictionary.
pub fn parse_plist(text: &str) -> Result<PlistDict> {
    let mut reader = Reader::from_str(text);

    // Skip the prolog up to the <plist> element.
    loop {
        match reader.read_event().context("read plist event")? {
            Event::Start(element) if element.name().as_ref() == b"plist" => break,
            Event::Eof => bail!("document has no <plist> element"),
            _ => {}
        }
    }

    let value = loop {
        match reader.read_event().context("read plist event")? {
            Event::Start(element) => {
                let tag = element.name().as_ref().to_vec();
                break parse_value(&mut reader, &tag)?;
            }
            Event::Empty(element) => break empty_value(element.name().as_ref())?,
            Event::End(element) if element.name().as_ref() == b"plist" => {
                bail!("plist has no root value")
            }
            Event::Text(_) | Event::Comment(_) => {}
            Event::Eof => bail!("unexpected end of plist"),
            other => bail!("unexpected content in plist: {other:?}"),
        }
    };

    match value {
        PlistValue::Dict(dict) => Ok(dict),
        _ => bail!("plist root value must be a dictionary"),
    }
}

fn parse_value(reader: &mut Reader<&[u8]>, tag: &[u8]) -> Result<PlistValue> {
    match tag {
        b"dict" => parse_dict(reader).map(PlistValue::Dict),
        b"array" => parse_array(reader).map(PlistValue::Array),
        b"string" => read_text(reader, b"string").map(PlistValue::String),
        b"integer" => read_text(reader, b"integer").map(PlistValue::Integer),
        b"real" => read_text(reader, b"real").map(PlistValue::Real),
        b"date" => read_text(reader, b"date").map(PlistValue::Date),
        b"data" => read_text(reader, b"data").map(PlistValue::Data),
        b"true" => read_text(reader, b"true").map(|_| PlistValue::Boolean(true)),
        b"false" => read_text(reader, b"false").map(|_| PlistValue::Boolean(false)),
        other => bail!(
            "unsupported plist element <{}>",
            String::from_utf8_lossy(other)
        ),
    }
}

fn empty_value(tag: &[u8]) -> Result<PlistValue> {
    match tag {
        b"true" => Ok(PlistValue::Boolean(true)),
        b"false" => Ok(PlistValue::Boolean(false)),
        b"string" => Ok(PlistValue::String(String::new())),
        b"integer" => Ok(PlistValue::Integer(String::new())),
        b"real" => Ok(PlistValue::Real(String::new())),
        b"date" => Ok(PlistValue::Date(String::new())),
        b"data" => Ok(PlistValue::Data(String::new())),
        b"dict" => Ok(PlistValue::Dict(PlistDict::new())),
        b"array" => Ok(PlistValue::Array(Vec::new())),
        other => bail!(
            "unsupported plist element <{}/>",
            String::from_utf8_lossy(other)
        ),
    }
}

fn parse_dict(reader: &mut Reader<&[u8]>) -> Result<PlistDict> {
    let mut dict = PlistDict::new();
    loop {
        match reader.read_event().context("read plist event")? {
            Event::Start(element) if element.name().as_ref() == b"key" => {
                let key = read_text(reader, b"key")?;
                let value = parse_dict_value(reader, &key)?;
                dict.insert(key, value);
            }
            Event::Empty(element) if element.name().as_ref() == b"key" => {
                let value = parse_dict_value(reader, "")?;
                dict.insert(String::new(), value);
            }
            Event::End(element) if element.name().as_ref() == b"dict" => return Ok(dict),
            Event::Text(_) | Event::Comment(_) => {}
            Event::Eof => bail!("unterminated <dict>"),
            other => bail!("unexpected content in <dict>: {other:?}"),
        }
    }
}

/// Reads the value element following a `<key>`.
fn parse_dict_value(reader: &mut Reader<&[u8]>, key: &str) -> Result<PlistValue> {
    loop {
        match reader.read_event().context("read plist event")? {
            Event::Start(element) => {
                let tag = element.name().as_ref().to_vec();
                return parse_value(reader, &tag);
            }
            Event::Empty(element) => return empty_value(element.name().as_ref()),
            Event::Text(_) | Event::Comment(_) => {}
            Event::End(_) => bail!("key {key:?} has no value"),
            Event::Eof => bail!("unterminated <dict>"),
            other => bail!("unexpected content after key {key:?}: {other:?}"),
        }
    }
}

fn parse_array(reader: &mut Reader<&[u8]>) -> Result<Vec<PlistValue>> {
    let mut items = Vec::new();
    loop {
        match reader.read_event().context("read plist event")? {
            Event::Start(element) => {
                let tag = element.name().as_ref().to_vec();
                items.push(parse_value(reader, &tag)?);
            }
            Event::Empty(element) => items.push(empty_value(element.name().as_ref())?),
            Event::End(element) if element.name().as_ref() == b"array" => return Ok(items),
            Event::Text(_) | Event::Comment(_) => {}
            Event::Eof => bail!("unterminated <array>"),
            other => bail!("unexpected content in <array>: {other:?}"),
        }
    }
}

/// Accumulates text content up to the matching end tag.
fn read_text(reader: &mut Reader<&[u8]>, tag: &[u8]) -> Result<String> {
    let mut out = String::new();
    loop {
        match reader.read_event().context("read plist event")? {
            Event::Text(text) => out.push_str(&text.decode().context("decode plist text")?),
            Event::GeneralRef(reference) => push_entity(&mut out, &reference)?,
            Event::End(element) if element.name().as_ref() == tag => return Ok(out),
            Event::Eof => bail!(
                "unterminated <{}> element",
                String::from_utf8_lossy(tag)
            ),
            other => bail!(
                "unexpected content in <{}>: {other:?}",
                String::from_utf8_lossy(tag)
            ),
        }
    }
}

fn push_entity(out: &mut String, reference: &BytesRef<'_>) -> Result<()> {
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
        other => bail!(
            "unsupported entity reference: &{};",
            String::from_utf8_lossy(other)
        ),
    }
    Ok(())
}

/// Renders the dictionary back to an XML property list.
pub fn render_plist(root: &PlistDict) -> Result<String> {
    let mut writer = quick_xml::Writer::new_with_indent(Vec::new(), b'\t', 1);
    writer.write_event(Event::Decl(BytesDecl::new("1.0", Some("UTF-8"), None)))?;
    writer.write_event(Event::DocType(BytesText::from_escaped(PLIST_DOCTYPE)))?;

    let mut plist = BytesStart::new("plist");
    plist.push_attribute(("version", "1.0"));
    writer.write_event(Event::Start(plist))?;
    write_value(&mut writer, &PlistValue::Dict(root.clone()))?;
    writer.write_event(Event::End(BytesEnd::new("plist")))?;

    let mut output = writer.into_inner();
    output.push(b'\n');
    String::from_utf8(output).context("plist output is not UTF-8")
}

fn write_value<W: Write>(writer: &mut quick_xml::Writer<W>, value: &PlistValue) -> Result<()> {
    match value {
        PlistValue::String(text) => write_text_element(writer, "string", text),
        PlistValue::Integer(text) => write_text_element(writer, "integer", text),
        PlistValue::Real(text) => write_text_element(writer, "real", text),
        PlistValue::Date(text) => write_text_element(writer, "date", text),
        PlistValue::Data(text) => write_text_element(writer, "data", text),
        PlistValue::Boolean(true) => {
            writer.write_event(Event::Empty(BytesStart::new("true")))?;
            Ok(())
        }
        PlistValue::Boolean(false) => {
            writer.write_event(Event::Empty(BytesStart::new("false")))?;
            Ok(())
        }
        PlistValue::Array(items) => {
            writer.write_event(Event::Start(BytesStart::new("array")))?;
            for item in items {
                write_value(writer, item)?;
            }
            writer.write_event(Event::End(BytesEnd::new("array")))?;
            Ok(())
        }
        PlistValue::Dict(dict) => {
            writer.write_event(Event::Start(BytesStart::new("dict")))?;
            for (key, entry) in dict.iter() {
                write_text_element(writer, "key", key)?;
                write_value(writer, entry)?;
            }
            writer.write_event(Event::End(BytesEnd::new("dict")))?;
            Ok(())
        }
    }
}

fn write_text_element<W: Write>(
    writer: &mut quick_xml::Writer<W>,
    name: &str,
    text: &str,
) -> Result<()> {
    writer.write_event(Event::Start(BytesStart::new(name)))?;
    writer.write_event(Event::Text(BytesText::new(text)))?;
    writer.write_event(Event::End(BytesEnd::new(name)))?;
    Ok(())
}

/// Reads and parses an `Info.plist` from disk.
pub fn read_plist(path: &Path) -> Result<PlistDict> {
    let text =
        fs::read_to_string(path).with_context(|| format!("read {}", path.display()))?;
    parse_plist(&text).with_context(|| format!("parse {}", path.display()))
}

/// Serializes and writes an `Info.plist`.
pub fn write_plist(path: &Path, root: &PlistDict) -> Result<()> {
    let text = render_plist(root)?;
    fs::write(path, text).with_context(|| format!("write {}", path.display()))
}

#[cfg(test)]
mod tests {
    use super::*;

    const INFO_PLIST: &str = r#"<?xml version="1.0" encoding="UTF-8"?>
<!DOCTYPE plist PUBLIC "-//Apple//DTD PLIST 1.0//EN" "http://www.apple.com/DTDs/PropertyList-1.0.dtd">
<plist version="1.0">
<dict>
	<key>CFBundleDevelopmentRegion</key>
	<string>en</string>
	<key>CFBundleDisplayName</key>
	<string>App</string>
	<key>UIRequiresFullScreen</key>
	<true/>
	<key>CFBundleVersion</key>
	<integer>1</integer>
	<key>UISupportedInterfaceOrientations</key>
	<array>
		<string>UIInterfaceOrientationPortrait</string>
	</array>
	<key>NSAppTransportSecurity</key>
	<dict>
		<key>NSAllowsArbitraryLoads</key>
		<false/>
	</dict>
</dict>
</plist>
"#;

    #[test]
    fn parses_typical_info_plist() {
        let plist = parse_plist(INFO_PLIST).unwrap();
        assert_eq!(plist.get_str("CFBundleDevelopmentRegion"), Some("en"));
        assert_eq!(plist.get_str("CFBundleDisplayName"), Some("App"));
        assert_eq!(
            plist.get("UIRequiresFullScreen"),
            Some(&PlistValue::Boolean(true))
        );
        assert_eq!(
            plist.get("CFBundleVersion"),
            Some(&PlistValue::Integer("1".to_string()))
        );
        let Some(PlistValue::Array(orientations)) = plist.get("UISupportedInterfaceOrientations")
        else {
            panic!("expected array");
        };
        assert_eq!(orientations.len(), 1);
        let Some(PlistValue::Dict(ats)) = plist.get("NSAppTransportSecurity") else {
            panic!("expected dict");
        };
        assert_eq!(
            ats.get("NSAllowsArbitraryLoads"),
            Some(&PlistValue::Boolean(false))
        );
    }

    #[test]
    fn round_trip_preserves_every_entry() {
        let plist = parse_plist(INFO_PLIST).unwrap();
        let rendered = render_plist(&plist).unwrap();
        let reparsed = parse_plist(&rendered).unwrap();
        assert_eq!(reparsed, plist);
        assert!(rendered.contains("<!DOCTYPE plist"));
    }

    #[test]
    fn insert_replaces_in_place() {
        let mut plist = parse_plist(INFO_PLIST).unwrap();
        plist.insert(
            "CFBundleDisplayName",
            PlistValue::String("Appli".to_string()),
        );
        let keys: Vec<&str> = plist.iter().map(|(k, _)| k).collect();
        assert_eq!(keys[1], "CFBundleDisplayName");
        assert_eq!(plist.get_str("CFBundleDisplayName"), Some("Appli"));
    }

    #[test]
    fn escaped_text_round_trips() {
        let mut plist = PlistDict::new();
        plist.insert(
            "CFBundleDisplayName",
            PlistValue::String("Fish & <Chips>".to_string()),
        );
        let rendered = render_plist(&plist).unwrap();
        assert!(rendered.contains("&amp;"));
        let reparsed = parse_plist(&rendered).unwrap();
        assert_eq!(reparsed.get_str("CFBundleDisplayName"), Some("Fish & <Chips>"));
    }

    #[test]
    fn root_must_be_a_dictionary() {
        let err = parse_plist(
            r#"<plist version="1.0"><array></array></plist>"#,
        )
        .unwrap_err();
        assert!(err.to_string().contains("dictionary"));
    }
}
