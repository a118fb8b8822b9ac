//! Java `.properties` file parsing
//!
//! Gradle build scripts read `key.properties` and `local.properties` through
//! `java.util.Properties`, so this parser follows the same line rules:
//! `#`/`!` comments, `=`/`:`/whitespace separators, backslash line
//! continuations and `\uXXXX` escapes.

use lipikar_core::error::{Error, Result};
use std::collections::HashMap;
use std::path::Path;

/// Parsed key/value pairs from a properties file
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Properties {
    entries: HashMap<String, String>,
}

impl Properties {
    /// Parse properties from text
    pub fn parse(input: &str) -> Result<Self> {
        let mut entries = HashMap::new();

        for line in LogicalLines::new(input) {
            let (key, value) = split_entry(&line.text);
            let key = unescape(key).map_err(|msg| malformed(line.number, msg))?;
            let value = unescape(value).map_err(|msg| malformed(line.number, msg))?;
            entries.insert(key, value);
        }

        Ok(Self { entries })
    }

    /// Parse properties from raw bytes
    ///
    /// UTF-8 input is used as-is; anything else is read as ISO-8859-1, the
    /// encoding `Properties.load(InputStream)` assumes.
    pub fn from_bytes(bytes: &[u8]) -> Result<Self> {
        match std::str::from_utf8(bytes) {
            Ok(text) => Self::parse(text),
            Err(_) => {
                let text: String = bytes.iter().map(|&b| char::from(b)).collect();
                Self::parse(&text)
            }
        }
    }

    /// Read and parse a properties file
    pub fn load(path: &Path) -> Result<Self> {
        let bytes = std::fs::read(path).map_err(|e| {
            Error::from(e).with_context(format!("Failed to read {}", path.display()))
        })?;
        Self::from_bytes(&bytes).map_err(|e| e.with_context(format!("In {}", path.display())))
    }

    /// Look up a value by key
    pub fn get(&self, key: &str) -> Option<&str> {
        self.entries.get(key).map(String::as_str)
    }

    /// Whether a key is present
    pub fn contains_key(&self, key: &str) -> bool {
        self.entries.contains_key(key)
    }

    /// All keys, sorted
    pub fn keys(&self) -> Vec<&str> {
        let mut keys: Vec<&str> = self.entries.keys().map(String::as_str).collect();
        keys.sort_unstable();
        keys
    }

    /// Number of entries
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Whether there are no entries
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

fn malformed(line: usize, msg: String) -> Error {
    Error::parse(format!("Malformed properties at line {}: {}", line, msg))
}

/// A key/value line after continuations have been joined
struct LogicalLine {
    /// 1-based number of the natural line it starts on
    number: usize,
    text: String,
}

struct LogicalLines<'a> {
    lines: std::iter::Enumerate<NaturalLines<'a>>,
}

impl<'a> LogicalLines<'a> {
    fn new(input: &'a str) -> Self {
        Self {
            lines: NaturalLines { rest: input }.enumerate(),
        }
    }
}

impl Iterator for LogicalLines<'_> {
    type Item = LogicalLine;

    fn next(&mut self) -> Option<LogicalLine> {
        loop {
            let (index, raw) = self.lines.next()?;
            let trimmed = trim_leading(raw);
            if trimmed.is_empty() || trimmed.starts_with('#') || trimmed.starts_with('!') {
                continue;
            }

            let mut text = String::new();
            let mut current = trimmed;
            loop {
                if ends_with_continuation(current) {
                    text.push_str(&current[..current.len() - 1]);
                    match self.lines.next() {
                        Some((_, next)) => current = trim_leading(next),
                        None => break,
                    }
                } else {
                    text.push_str(current);
                    break;
                }
            }

            return Some(LogicalLine {
                number: index + 1,
                text,
            });
        }
    }
}

/// Splits on `\n`, `\r` and `\r\n`
struct NaturalLines<'a> {
    rest: &'a str,
}

impl<'a> Iterator for NaturalLines<'a> {
    type Item = &'a str;

    fn next(&mut self) -> Option<&'a str> {
        if self.rest.is_empty() {
            return None;
        }
        match self.rest.find(['\n', '\r']) {
            Some(pos) => {
                let line = &self.rest[..pos];
                let skip = if self.rest[pos..].starts_with("\r\n") { 2 } else { 1 };
                self.rest = &self.rest[pos + skip..];
                Some(line)
            }
            None => {
                let line = self.rest;
                self.rest = "";
                Some(line)
            }
        }
    }
}

fn is_blank(c: char) -> bool {
    matches!(c, ' ' | '\t' | '\x0c')
}

fn trim_leading(s: &str) -> &str {
    s.trim_start_matches(is_blank)
}

fn ends_with_continuation(s: &str) -> bool {
    let backslashes = s.chars().rev().take_while(|&c| c == '\\').count();
    backslashes % 2 == 1
}

/// Split a logical line into its raw (still escaped) key and value
fn split_entry(line: &str) -> (&str, &str) {
    let mut escaped = false;
    let mut key_end = line.len();
    let mut separator = None;

    for (i, c) in line.char_indices() {
        if escaped {
            escaped = false;
            continue;
        }
        match c {
            '\\' => escaped = true,
            '=' | ':' => {
                key_end = i;
                separator = Some(c);
                break;
            }
            c if is_blank(c) => {
                key_end = i;
                break;
            }
            _ => {}
        }
    }

    let key = &line[..key_end];
    let mut rest = &line[key_end..];
    match separator {
        Some(sep) => rest = &rest[sep.len_utf8()..],
        None => {
            rest = trim_leading(rest);
            if let Some(stripped) = rest.strip_prefix(['=', ':']) {
                rest = stripped;
            }
        }
    }

    (key, trim_leading(rest))
}

/// Resolve backslash escapes
fn unescape(raw: &str) -> std::result::Result<String, String> {
    let mut out = String::with_capacity(raw.len());
    let mut chars = raw.chars();

    while let Some(c) = chars.next() {
        if c != '\\' {
            out.push(c);
            continue;
        }
        match chars.next() {
            Some('t') => out.push('\t'),
            Some('n') => out.push('\n'),
            Some('r') => out.push('\r'),
            Some('f') => out.push('\x0c'),
            Some('u') => out.push(decode_unicode(&mut chars)?),
            Some(other) => out.push(other),
            None => {}
        }
    }

    Ok(out)
}

fn decode_unicode(chars: &mut std::str::Chars<'_>) -> std::result::Result<char, String> {
    let digits: String = chars.by_ref().take(4).collect();
    if digits.len() != 4 || !digits.chars().all(|c| c.is_ascii_hexdigit()) {
        return Err(format!("malformed \\uxxxx encoding '\\u{}'", digits));
    }
    let code = u32::from_str_radix(&digits, 16)
        .map_err(|e| format!("malformed \\uxxxx encoding: {}", e))?;
    // Lone surrogates cannot be represented in a Rust string
    Ok(char::from_u32(code).unwrap_or(char::REPLACEMENT_CHARACTER))
}
