//! Lenient tag tokenizer for streamed markup.
//!
//! The tokenizer turns markup text into open-tag, close-tag and text events.
//! It never fails: malformed attributes are dropped, and a tag that is still
//! being generated (no closing `>` yet) stops the scan so that it can be
//! picked up once more text has arrived. [`Tokenizer::position`] reports how
//! far the scan got.

use std::borrow::Cow;
use std::collections::BTreeMap;

use tracing::debug;

use super::vocab;

/// An open tag with its well-formed attributes.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OpenTag {
    /// Tag name, upper-cased
    pub name: String,
    /// Attributes keyed by lower-cased name
    pub attributes: BTreeMap<String, String>,
}

/// A structural event.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Event {
    /// An element starts.
    Open(OpenTag),
    /// An element ends (explicitly, or right after a self-closing/void open).
    Close(String),
    /// Text between tags, with entities decoded.
    Text(String),
}

/// Outcome of scanning one piece of markup starting at `<`.
enum Markup {
    Open {
        tag: OpenTag,
        end: usize,
        self_closing: bool,
    },
    Close {
        name: String,
        end: usize,
    },
    /// Comment, declaration or processing instruction.
    Skipped { end: usize },
    /// No terminating `>` before the end of input.
    Incomplete,
}

/// Iterator over the events of a markup string.
pub struct Tokenizer<'a> {
    input: &'a str,
    pos: usize,
    pending_close: Option<String>,
    stalled: bool,
}

impl<'a> Tokenizer<'a> {
    /// Create a tokenizer over `input`.
    pub fn new(input: &'a str) -> Self {
        Self {
            input,
            pos: 0,
            pending_close: None,
            stalled: false,
        }
    }

    /// Byte offset up to which the input has been consumed.
    ///
    /// Once the iterator is exhausted this is either the input length or
    /// the start of an incomplete trailing tag.
    pub fn position(&self) -> usize {
        self.pos
    }

    /// Check that no synthesized close event is waiting to be emitted.
    pub fn at_rest(&self) -> bool {
        self.pending_close.is_none()
    }

    /// Check if the scan stopped at an incomplete tag.
    pub fn is_stalled(&self) -> bool {
        self.stalled
    }

    fn scan_text(&mut self) -> Event {
        let bytes = self.input.as_bytes();
        let start = self.pos;
        // A literal '<' at the start is part of the text
        let mut i = start + 1;
        while i < bytes.len() {
            if bytes[i] == b'<' && opens_markup(bytes, i) {
                break;
            }
            i += 1;
        }
        self.pos = i;
        Event::Text(decode(&self.input[start..i]).into_owned())
    }

    fn scan_markup(&self, start: usize) -> Markup {
        let bytes = self.input.as_bytes();
        let len = bytes.len();
        if start + 1 >= len {
            return Markup::Incomplete;
        }

        if self.input[start..].starts_with("<!--") {
            return match self.input[start + 4..].find("-->") {
                Some(rel) => Markup::Skipped {
                    end: start + 4 + rel + 3,
                },
                None => Markup::Incomplete,
            };
        }

        match bytes[start + 1] {
            b'!' | b'?' => match find_byte(bytes, start + 2, b'>') {
                Some(gt) => Markup::Skipped { end: gt + 1 },
                None => Markup::Incomplete,
            },
            b'/' => {
                let name_end = scan_name(bytes, start + 2);
                let name = self.input[start + 2..name_end].to_ascii_uppercase();
                match find_byte(bytes, name_end, b'>') {
                    Some(gt) if name.is_empty() => Markup::Skipped { end: gt + 1 },
                    Some(gt) => Markup::Close { name, end: gt + 1 },
                    None => Markup::Incomplete,
                }
            }
            _ => {
                let name_end = scan_name(bytes, start + 1);
                let name = self.input[start + 1..name_end].to_ascii_uppercase();
                self.scan_attributes(name, name_end, len)
            }
        }
    }

    fn scan_attributes(&self, name: String, mut i: usize, len: usize) -> Markup {
        let bytes = self.input.as_bytes();
        let mut attributes = BTreeMap::new();

        loop {
            i = skip_whitespace(bytes, i);
            if i >= len {
                return Markup::Incomplete;
            }

            match bytes[i] {
                b'>' => {
                    return Markup::Open {
                        tag: OpenTag { name, attributes },
                        end: i + 1,
                        self_closing: false,
                    };
                }
                b'/' => {
                    if i + 1 >= len {
                        return Markup::Incomplete;
                    }
                    if bytes[i + 1] == b'>' {
                        return Markup::Open {
                            tag: OpenTag { name, attributes },
                            end: i + 2,
                            self_closing: true,
                        };
                    }
                    i += 1;
                }
                c if is_name_byte(c) => {
                    let key_start = i;
                    i = scan_name(bytes, i);
                    let key = self.input[key_start..i].to_ascii_lowercase();

                    i = skip_whitespace(bytes, i);
                    if i >= len {
                        return Markup::Incomplete;
                    }
                    if bytes[i] != b'=' {
                        debug!(tag = %name, attribute = %key, "dropping attribute without value");
                        continue;
                    }

                    i = skip_whitespace(bytes, i + 1);
                    if i >= len {
                        return Markup::Incomplete;
                    }

                    match bytes[i] {
                        b'"' => {
                            let value_start = i + 1;
                            let quote = find_byte(bytes, value_start, b'"');
                            let next_tag = find_byte(bytes, value_start, b'<');
                            match (quote, next_tag) {
                                (Some(stop), next) if next.is_none_or(|lt| stop < lt) => {
                                    let value = decode(&self.input[value_start..stop]).into_owned();
                                    attributes.entry(key).or_insert(value);
                                    i = stop + 1;
                                }
                                (_, Some(lt)) => {
                                    // Another tag starts before the quote closes
                                    let Some(stop) = find_byte(&bytes[..lt], value_start, b'>')
                                    else {
                                        debug!(tag = %name, "skipping tag cut off by another tag");
                                        return Markup::Skipped { end: lt };
                                    };
                                    debug!(tag = %name, attribute = %key, "dropping attribute with unterminated quote");
                                    i = stop;
                                }
                                _ => return Markup::Incomplete,
                            }
                        }
                        b'\'' => {
                            let Some(stop) = find_either(bytes, i + 1, b'\'', b'>') else {
                                return Markup::Incomplete;
                            };
                            debug!(tag = %name, attribute = %key, "dropping single-quoted attribute");
                            i = if bytes[stop] == b'\'' { stop + 1 } else { stop };
                        }
                        _ => {
                            while i < len
                                && !bytes[i].is_ascii_whitespace()
                                && bytes[i] != b'>'
                                && !(bytes[i] == b'/' && i + 1 < len && bytes[i + 1] == b'>')
                            {
                                i += 1;
                            }
                            if i >= len {
                                return Markup::Incomplete;
                            }
                            debug!(tag = %name, attribute = %key, "dropping unquoted attribute");
                        }
                    }
                }
                _ => i += 1,
            }
        }
    }
}

impl Iterator for Tokenizer<'_> {
    type Item = Event;

    fn next(&mut self) -> Option<Event> {
        if let Some(name) = self.pending_close.take() {
            return Some(Event::Close(name));
        }

        loop {
            if self.stalled || self.pos >= self.input.len() {
                return None;
            }

            let bytes = self.input.as_bytes();
            if bytes[self.pos] != b'<' || !opens_markup(bytes, self.pos) {
                return Some(self.scan_text());
            }

            match self.scan_markup(self.pos) {
                Markup::Open {
                    tag,
                    end,
                    self_closing,
                } => {
                    self.pos = end;
                    if self_closing || vocab::is_void(&tag.name) {
                        self.pending_close = Some(tag.name.clone());
                    }
                    return Some(Event::Open(tag));
                }
                Markup::Close { name, end } => {
                    self.pos = end;
                    return Some(Event::Close(name));
                }
                Markup::Skipped { end } => {
                    self.pos = end;
                }
                Markup::Incomplete => {
                    self.stalled = true;
                    return None;
                }
            }
        }
    }
}

/// Tokenize a complete string into events.
pub fn tokenize(input: &str) -> Vec<Event> {
    Tokenizer::new(input).collect()
}

/// Check whether the `<` at `i` starts markup rather than literal text.
///
/// A `<` at the very end of the input may still become a tag.
fn opens_markup(bytes: &[u8], i: usize) -> bool {
    match bytes.get(i + 1) {
        None => true,
        Some(&c) => c.is_ascii_alphabetic() || matches!(c, b'/' | b'!' | b'?'),
    }
}

fn is_name_byte(c: u8) -> bool {
    c.is_ascii_alphanumeric() || matches!(c, b'-' | b'_' | b':' | b'.')
}

fn scan_name(bytes: &[u8], mut i: usize) -> usize {
    while i < bytes.len() && is_name_byte(bytes[i]) {
        i += 1;
    }
    i
}

fn skip_whitespace(bytes: &[u8], mut i: usize) -> usize {
    while i < bytes.len() && bytes[i].is_ascii_whitespace() {
        i += 1;
    }
    i
}

fn find_byte(bytes: &[u8], from: usize, needle: u8) -> Option<usize> {
    bytes
        .get(from..)?
        .iter()
        .position(|&b| b == needle)
        .map(|rel| from + rel)
}

fn find_either(bytes: &[u8], from: usize, a: u8, b: u8) -> Option<usize> {
    bytes
        .get(from..)?
        .iter()
        .position(|&c| c == a || c == b)
        .map(|rel| from + rel)
}

/// Decode character entities one at a time. A sequence that does not decode
/// (a bare `&`, an unknown name, an entity cut off at the end of the stream)
/// is kept as written.
fn decode(raw: &str) -> Cow<'_, str> {
    if !raw.contains('&') {
        return Cow::Borrowed(raw);
    }

    let bytes = raw.as_bytes();
    let mut out = String::with_capacity(raw.len());
    let mut copied = 0;
    let mut i = 0;
    while let Some(amp) = find_byte(bytes, i, b'&') {
        let end = bytes[amp + 1..]
            .iter()
            .position(|&b| b == b';' || b == b'&' || b.is_ascii_whitespace())
            .map(|rel| amp + 1 + rel)
            .filter(|&end| bytes[end] == b';');

        i = amp + 1;
        let Some(end) = end else {
            continue;
        };
        if let Ok(decoded) = quick_xml::escape::unescape(&raw[amp..=end]) {
            out.push_str(&raw[copied..amp]);
            out.push_str(&decoded);
            copied = end + 1;
            i = end + 1;
        }
    }
    out.push_str(&raw[copied..]);
    Cow::Owned(out)
}
