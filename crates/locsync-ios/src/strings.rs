//! `InfoPlist.strings` codec.
//!
//! The format is a sequence of `KEY = "VALUE";` entries. Values escape
//! backslash, double quote, and newline; the reader honors the same
//! escapes so written files merge cleanly on the next run.

use std::fs;
use std::path::Path;

use anyhow::{Result, bail};
use tracing::warn;

use locsync_model::StringMap;

/// Escapes a value for embedding in a double-quoted strings literal.
pub fn escape_value(value: &str) -> String {
    let mut out = String::with_capacity(value.len());
    for ch in value.chars() {
        match ch {
            '\\' => out.push_str("\\\\"),
            '"' => out.push_str("\\\""),
            '\n' => out.push_str("\\n"),
            _ => out.push(ch),
        }
    }
    out
}

/// Renders the entries as a strings file, one entry per line.
pub fn render_strings(entries: &StringMap) -> String {
    let mut out = String::new();
    for (key, value) in entries {
        if is_bare_key(key) {
            out.push_str(key);
        } else {
            out.push('"');
            out.push_str(&escape_value(key));
            out.push('"');
        }
        out.push_str(" = \"");
        out.push_str(&escape_value(value));
        out.push_str("\";\n");
    }
    out
}

fn is_bare_key(key: &str) -> bool {
    !key.is_empty()
        && key
            .chars()
            .all(|ch| ch.is_ascii_alphanumeric() || matches!(ch, '_' | '.' | '$'))
}

/// Parses a strings file back into its entries.
pub fn parse_strings(text: &str) -> Result<StringMap> {
    let mut entries = StringMap::new();
    let mut chars = text.chars().peekable();

    loop {
        skip_trivia(&mut chars)?;
        let Some(&first) = chars.peek() else {
            return Ok(entries);
        };

        let key = if first == '"' {
            parse_quoted(&mut chars)?
        } else if is_bare_key_char(first) {
            parse_bare(&mut chars)
        } else {
            bail!("unexpected character {first:?} where a key was expected");
        };

        skip_trivia(&mut chars)?;
        if chars.next() != Some('=') {
            bail!("expected '=' after key {key:?}");
        }
        skip_trivia(&mut chars)?;
        if chars.peek() != Some(&'"') {
            bail!("expected quoted value for key {key:?}");
        }
        let value = parse_quoted(&mut chars)?;
        skip_trivia(&mut chars)?;
        if chars.next() != Some(';') {
            bail!("expected ';' after value for key {key:?}");
        }
        entries.insert(key, value);
    }
}

fn is_bare_key_char(ch: char) -> bool {
    ch.is_ascii_alphanumeric() || matches!(ch, '_' | '.' | '$' | '-')
}

fn skip_trivia(chars: &mut std::iter::Peekable<std::str::Chars<'_>>) -> Result<()> {
    loop {
        match chars.peek() {
            Some(ch) if ch.is_whitespace() => {
                chars.next();
            }
            Some('/') => {
                let mut lookahead = chars.clone();
                lookahead.next();
                match lookahead.peek() {
                    Some('/') => {
                        for ch in chars.by_ref() {
                            if ch == '\n' {
                                break;
                            }
                        }
                    }
                    Some('*') => {
                        chars.next();
                        chars.next();
                        let mut previous = ' ';
                        loop {
                            match chars.next() {
                                Some('/') if previous == '*' => break,
                                Some(ch) => previous = ch,
                                None => bail!("unterminated comment"),
                            }
                        }
                    }
                    _ => return Ok(()),
                }
            }
            _ => return Ok(()),
        }
    }
}

fn parse_bare(chars: &mut std::iter::Peekable<std::str::Chars<'_>>) -> String {
    let mut out = String::new();
    while let Some(&ch) = chars.peek() {
        if !is_bare_key_char(ch) {
            break;
        }
        out.push(ch);
        chars.next();
    }
    out
}

fn parse_quoted(chars: &mut std::iter::Peekable<std::str::Chars<'_>>) -> Result<String> {
    if chars.next() != Some('"') {
        bail!("expected opening quote");
    }
    let mut out = String::new();
    loop {
        match chars.next() {
            Some('"') => return Ok(out),
            Some('\\') => match chars.next() {
                Some('n') => out.push('\n'),
                Some('t') => out.push('\t'),
                Some('r') => out.push('\r'),
                Some(ch @ ('"' | '\\' | '\'')) => out.push(ch),
                Some(ch) => {
                    out.push('\\');
                    out.push(ch);
                }
                None => bail!("unterminated escape sequence"),
            },
            Some(ch) => out.push(ch),
            None => bail!("unterminated string literal"),
        }
    }
}

/// Reads an existing strings file, treating a missing or unparseable file
/// as empty so a dirty tree never blocks the merge.
pub fn read_strings_file(path: &Path) -> StringMap {
    let text = match fs::read_to_string(path) {
        Ok(text) => text,
        Err(error) if error.kind() == std::io::ErrorKind::NotFound => return StringMap::new(),
        Err(error) => {
            warn!(path = %path.display(), %error, "could not read existing strings file, treating as empty");
            return StringMap::new();
        }
    };
    match parse_strings(&text) {
        Ok(entries) => entries,
        Err(error) => {
            warn!(path = %path.display(), %error, "could not parse existing strings file, treating as empty");
            StringMap::new()
        }
    }
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
    fn renders_one_entry_per_line() {
        let out = render_strings(&map(&[
            ("CFBundleDisplayName", "App"),
            ("NSCameraUsageDescription", "Take photos"),
        ]));
        assert_eq!(
            out,
            "CFBundleDisplayName = \"App\";\nNSCameraUsageDescription = \"Take photos\";\n"
        );
    }

    #[test]
    fn escapes_quotes_backslashes_and_newlines() {
        let out = render_strings(&map(&[("k", "a \"b\" \\ c\nd")]));
        assert_eq!(out, "k = \"a \\\"b\\\" \\\\ c\\nd\";\n");
    }

    #[test]
    fn escaped_values_round_trip_through_the_parser() {
        let original = map(&[("k", "a \"b\" \\ c\nd")]);
        let parsed = parse_strings(&render_strings(&original)).unwrap();
        assert_eq!(parsed, original);
    }

    #[test]
    fn parses_quoted_keys_and_comments() {
        let parsed = parse_strings(
            "/* generated */\n\"my key\" = \"value\"; // trailing\nplain = \"v2\";\n",
        )
        .unwrap();
        assert_eq!(parsed, map(&[("my key", "value"), ("plain", "v2")]));
    }

    #[test]
    fn rejects_missing_semicolon() {
        assert!(parse_strings("k = \"v\"").is_err());
    }

    #[test]
    fn missing_file_reads_as_empty() {
        let dir = tempfile::tempdir().unwrap();
        assert!(read_strings_file(&dir.path().join("InfoPlist.strings")).is_empty());
    }

    proptest! {
        /// Written values are recovered exactly by re-parsing with the
        /// format's own grammar.
        #[test]
        fn values_round_trip(value in "[ -~\n\t]{0,32}") {
            let original = map(&[("key", &value)]);
            let parsed = parse_strings(&render_strings(&original)).unwrap();
            prop_assert_eq!(parsed, original);
        }
    }
}
