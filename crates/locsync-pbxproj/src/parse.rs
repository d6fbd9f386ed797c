//! Reader for the ASCII property-list dialect used by Xcode project files.
//!
//! The dialect consists of quoted strings (`"like\nthis"`), bare atoms
//! (`text.plist.strings`, `56`), ordered dictionaries (`{ key = value; }`),
//! and arrays (`( a, b, )`). Block and line comments are annotations only;
//! they are dropped on read and regenerated from display names on write.

use crate::error::{PbxError, Result};
use crate::value::{Dict, Value};

/// Parses a complete project file into its top-level dictionary.
pub fn parse(text: &str) -> Result<Dict> {
    let mut parser = Parser::new(text);
    parser.skip_trivia()?;
    let value = parser.parse_value()?;
    parser.skip_trivia()?;
    if !parser.at_end() {
        return Err(parser.error("trailing content after root object"));
    }
    match value {
        Value::Dict(dict) => Ok(dict),
        _ => Err(PbxError::Parse {
            line: 1,
            column: 1,
            message: "root value must be a dictionary".to_string(),
        }),
    }
}

struct Parser {
    chars: Vec<char>,
    pos: usize,
    line: usize,
    column: usize,
}

impl Parser {
    fn new(text: &str) -> Self {
        Self {
            chars: text.chars().collect(),
            pos: 0,
            line: 1,
            column: 1,
        }
    }

    fn at_end(&self) -> bool {
        self.pos >= self.chars.len()
    }

    fn peek(&self) -> Option<char> {
        self.chars.get(self.pos).copied()
    }

    fn peek_at(&self, offset: usize) -> Option<char> {
        self.chars.get(self.pos + offset).copied()
    }

    fn bump(&mut self) -> Option<char> {
        let ch = self.chars.get(self.pos).copied()?;
        self.pos += 1;
        if ch == '\n' {
            self.line += 1;
            self.column = 1;
        } else {
            self.column += 1;
        }
        Some(ch)
    }

    fn error(&self, message: impl Into<String>) -> PbxError {
        PbxError::Parse {
            line: self.line,
            column: self.column,
            message: message.into(),
        }
    }

    fn expect(&mut self, expected: char) -> Result<()> {
        match self.peek() {
            Some(ch) if ch == expected => {
                self.bump();
                Ok(())
            }
            Some(ch) => Err(self.error(format!("expected '{expected}', found '{ch}'"))),
            None => Err(self.error(format!("expected '{expected}', found end of input"))),
        }
    }

    /// Skips whitespace and comments.
    fn skip_trivia(&mut self) -> Result<()> {
        loop {
            match self.peek() {
                Some(ch) if ch.is_whitespace() => {
                    self.bump();
                }
                Some('/') if self.peek_at(1) == Some('/') => {
                    while let Some(ch) = self.peek() {
                        if ch == '\n' {
                            break;
                        }
                        self.bump();
                    }
                }
                Some('/') if self.peek_at(1) == Some('*') => {
                    self.bump();
                    self.bump();
                    loop {
                        match self.peek() {
                            Some('*') if self.peek_at(1) == Some('/') => {
                                self.bump();
                                self.bump();
                                break;
                            }
                            Some(_) => {
                                self.bump();
                            }
                            None => return Err(self.error("unterminated block comment")),
                        }
                    }
                }
                _ => return Ok(()),
            }
        }
    }

    fn parse_value(&mut self) -> Result<Value> {
        match self.peek() {
            Some('{') => {
                self.bump();
                self.parse_dict().map(Value::Dict)
            }
            Some('(') => {
                self.bump();
                self.parse_array().map(Value::Array)
            }
            Some('"') => self.parse_quoted().map(Value::String),
            Some(ch) if is_atom_char(ch) => Ok(Value::String(self.parse_atom())),
            Some(ch) => Err(self.error(format!("unexpected character '{ch}'"))),
            None => Err(self.error("unexpected end of input")),
        }
    }

    /// Parses dictionary entries after the opening brace.
    fn parse_dict(&mut self) -> Result<Dict> {
        let mut dict = Dict::new();
        loop {
            self.skip_trivia()?;
            match self.peek() {
                Some('}') => {
                    self.bump();
                    return Ok(dict);
                }
                Some(_) => {
                    let key = self.parse_key()?;
                    self.skip_trivia()?;
                    self.expect('=')?;
                    self.skip_trivia()?;
                    let value = self.parse_value()?;
                    self.skip_trivia()?;
                    self.expect(';')?;
                    dict.insert(key, value);
                }
                None => return Err(self.error("unterminated dictionary")),
            }
        }
    }

    /// Parses array elements after the opening parenthesis. A trailing comma
    /// before the closing parenthesis is allowed, as Xcode emits one.
    fn parse_array(&mut self) -> Result<Vec<Value>> {
        let mut items = Vec::new();
        loop {
            self.skip_trivia()?;
            match self.peek() {
                Some(')') => {
                    self.bump();
                    return Ok(items);
                }
                Some(_) => {
                    items.push(self.parse_value()?);
                    self.skip_trivia()?;
                    if self.peek() == Some(',') {
                        self.bump();
                    } else if self.peek() != Some(')') {
                        return Err(self.error("expected ',' or ')' in array"));
                    }
                }
                None => return Err(self.error("unterminated array")),
            }
        }
    }

    fn parse_key(&mut self) -> Result<String> {
        match self.peek() {
            Some('"') => self.parse_quoted(),
            Some(ch) if is_atom_char(ch) => Ok(self.parse_atom()),
            Some(ch) => Err(self.error(format!("unexpected character '{ch}' in key"))),
            None => Err(self.error("unexpected end of input in key")),
        }
    }

    fn parse_quoted(&mut self) -> Result<String> {
        self.expect('"')?;
        let mut out = String::new();
        loop {
            match self.bump() {
                Some('"') => return Ok(out),
                Some('\\') => match self.bump() {
                    Some('n') => out.push('\n'),
                    Some('t') => out.push('\t'),
                    Some('r') => out.push('\r'),
                    Some(ch @ ('"' | '\\' | '\'')) => out.push(ch),
                    // Unrecognized escapes pass through verbatim.
                    Some(ch) => {
                        out.push('\\');
                        out.push(ch);
                    }
                    None => return Err(self.error("unterminated string escape")),
                },
                Some(ch) => out.push(ch),
                None => return Err(self.error("unterminated string")),
            }
        }
    }

    fn parse_atom(&mut self) -> String {
        let mut out = String::new();
        while let Some(ch) = self.peek() {
            if !is_atom_char(ch) {
                break;
            }
            out.push(ch);
            self.bump();
        }
        out
    }
}

/// Characters allowed in an unquoted atom.
pub(crate) fn is_atom_char(ch: char) -> bool {
    ch.is_ascii_alphanumeric() || matches!(ch, '_' | '$' | '.' | '/' | ':' | '-' | '+' | '@')
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_nested_structure() {
        let text = r#"
        // !$*UTF8*$!
        {
            archiveVersion = 1;
            objects = {
                ABC123 /* note */ = {isa = PBXBuildFile; fileRef = DEF456; };
            };
            list = (a, b.c, "quoted value",);
        }
        "#;
        let dict = parse(text).expect("parse");
        assert_eq!(dict.get_str("archiveVersion"), Some("1"));
        let objects = dict.get("objects").and_then(Value::as_dict).expect("objects");
        let entry = objects.get("ABC123").and_then(Value::as_dict).expect("entry");
        assert_eq!(entry.get_str("isa"), Some("PBXBuildFile"));
        assert_eq!(entry.get_str("fileRef"), Some("DEF456"));
        let list = dict.get("list").and_then(Value::as_array).expect("list");
        assert_eq!(list.len(), 3);
        assert_eq!(list[2].as_str(), Some("quoted value"));
    }

    #[test]
    fn unescapes_quoted_strings() {
        let dict = parse(r#"{ v = "a\"b\\c\nd"; }"#).expect("parse");
        assert_eq!(dict.get_str("v"), Some("a\"b\\c\nd"));
    }

    #[test]
    fn drops_comments() {
        let dict = parse("{ /* leading */ a = 1; // line\n b = 2; }").expect("parse");
        assert_eq!(dict.get_str("a"), Some("1"));
        assert_eq!(dict.get_str("b"), Some("2"));
    }

    #[test]
    fn reports_position_on_error() {
        let err = parse("{\n  a = ;\n}").expect_err("must fail");
        match err {
            PbxError::Parse { line, .. } => assert_eq!(line, 2),
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn rejects_trailing_content() {
        assert!(parse("{ a = 1; } extra").is_err());
    }

    #[test]
    fn empty_quoted_string_is_valid() {
        let dict = parse(r#"{ v = ""; }"#).expect("parse");
        assert_eq!(dict.get_str("v"), Some(""));
    }
}
