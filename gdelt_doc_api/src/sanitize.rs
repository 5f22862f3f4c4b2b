//! Character sanitization for API responses.
//!
//! The DOC API sometimes emits control characters and broken byte sequences
//! inside article titles and URLs. A raw control character inside a JSON
//! string makes the whole body unparseable, and the ones that survive parsing
//! end up nested anywhere in the article array, so sanitization runs twice:
//! once over the raw text and once over every string in the parsed value.
//!
//! Bodies that still fail to parse get a bounded repair loop: the character
//! the parser stopped at is blanked and parsing is retried. Only characters
//! inside string literals are ever touched.

use serde_json::{Map, Value};

/// Decides which characters are invalid and what replaces them.
///
/// The default strips every control character and U+FFFD, the marker left
/// behind by lossy UTF-8 decoding.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Sanitizer {
    /// Replacement for invalid characters. `None` removes them.
    pub replacement: Option<char>,
    /// Characters treated as invalid in addition to control characters.
    pub extra: Vec<char>,
    /// How many characters the repair loop may blank before giving up.
    pub max_repairs: usize,
}

/// Default limit for [`Sanitizer::max_repairs`].
pub const DEFAULT_MAX_REPAIRS: usize = 100;

impl Default for Sanitizer {
    fn default() -> Self {
        Self {
            replacement: None,
            extra: vec![char::REPLACEMENT_CHARACTER],
            max_repairs: DEFAULT_MAX_REPAIRS,
        }
    }
}

impl Sanitizer {
    pub fn with_replacement(mut self, replacement: char) -> Self {
        self.replacement = Some(replacement);
        self
    }

    pub fn with_extra_chars(mut self, chars: &[char]) -> Self {
        self.extra.extend_from_slice(chars);
        self
    }

    pub fn with_max_repairs(mut self, max_repairs: usize) -> Self {
        self.max_repairs = max_repairs;
        self
    }

    pub fn is_invalid(&self, c: char) -> bool {
        c.is_control() || self.extra.contains(&c)
    }

    /// Cleans a single string.
    pub fn clean(&self, input: &str) -> String {
        let mut out = String::with_capacity(input.len());
        for c in input.chars() {
            if self.is_invalid(c) {
                if let Some(r) = self.replacement {
                    out.push(r);
                }
            } else {
                out.push(c);
            }
        }
        out
    }

    /// Lexical pass over raw JSON text.
    ///
    /// Inside string literals every invalid character is replaced or dropped.
    /// Outside string literals JSON whitespace is kept and other control
    /// characters are dropped. Valid escape sequences are left intact; a
    /// backslash before any other character, such as `\'`, is dropped.
    pub fn sanitize_json_text(&self, input: &str) -> String {
        let mut out = String::with_capacity(input.len());
        let mut in_string = false;
        let mut escaped = false;

        for c in input.chars() {
            if in_string {
                if escaped {
                    escaped = false;
                    match c {
                        '"' | '\\' | '/' | 'b' | 'f' | 'n' | 'r' | 't' | 'u' => {
                            out.push('\\');
                            out.push(c);
                        }
                        c if self.is_invalid(c) => out.push_str("\\u0020"),
                        c => out.push(c),
                    }
                    continue;
                }
                match c {
                    '\\' => escaped = true,
                    '"' => {
                        in_string = false;
                        out.push(c);
                    }
                    c if self.is_invalid(c) => {
                        if let Some(r) = self.replacement {
                            out.push(r);
                        }
                    }
                    c => out.push(c),
                }
            } else {
                match c {
                    '"' => {
                        in_string = true;
                        out.push(c);
                    }
                    ' ' | '\n' | '\r' | '\t' => out.push(c),
                    c if self.is_invalid(c) => {}
                    c => out.push(c),
                }
            }
        }
        out
    }

    /// Structural pass: cleans every string and object key in `value`.
    pub fn sanitize_value(&self, value: Value) -> Value {
        match value {
            Value::String(s) => Value::String(self.clean(&s)),
            Value::Array(items) => {
                Value::Array(items.into_iter().map(|v| self.sanitize_value(v)).collect())
            }
            Value::Object(map) => {
                let cleaned: Map<String, Value> = map
                    .into_iter()
                    .map(|(k, v)| (self.clean(&k), self.sanitize_value(v)))
                    .collect();
                Value::Object(cleaned)
            }
            other => other,
        }
    }

    /// Runs both passes and parses the result, repairing up to
    /// `max_repairs` characters the parser rejects.
    pub fn parse(&self, body: &str) -> Result<Value, serde_json::Error> {
        let mut text = self.sanitize_json_text(body);
        let mut repairs = 0;
        loop {
            match serde_json::from_str::<Value>(&text) {
                Ok(value) => return Ok(self.sanitize_value(value)),
                Err(e) if e.is_syntax() && repairs < self.max_repairs => {
                    match repair_at(&text, &e) {
                        Some(repaired) => {
                            tracing::debug!("Blanked a character after parse error: {}", e);
                            text = repaired;
                            repairs += 1;
                        }
                        None => return Err(e),
                    }
                }
                Err(e) => return Err(e),
            }
        }
    }
}

/// Blanks the character `err` points at, or the backslash starting a broken
/// escape sequence. Returns `None` when the position is outside a string
/// literal or nothing would change.
fn repair_at(text: &str, err: &serde_json::Error) -> Option<String> {
    let line_start = match err.line() {
        0 | 1 => 0,
        line => text.match_indices('\n').nth(line - 2)?.0 + 1,
    };
    let end = (line_start + err.column()).min(text.len());
    if end == 0 {
        return None;
    }

    let mut start = end - 1;
    while !text.is_char_boundary(start) {
        start -= 1;
    }
    if err.to_string().contains("escape") {
        start = text[..end].rfind('\\')?;
    }

    if !inside_string(&text[..start]) {
        return None;
    }
    let c = text[start..].chars().next()?;
    if c == ' ' {
        return None;
    }

    let mut out = String::with_capacity(text.len());
    out.push_str(&text[..start]);
    out.push(' ');
    out.push_str(&text[start + c.len_utf8()..]);
    Some(out)
}

/// Whether the end of `prefix` lies inside a JSON string literal.
fn inside_string(prefix: &str) -> bool {
    let mut in_string = false;
    let mut escaped = false;
    for c in prefix.chars() {
        if escaped {
            escaped = false;
        } else if in_string && c == '\\' {
            escaped = true;
        } else if c == '"' {
            in_string = !in_string;
        }
    }
    in_string
}
