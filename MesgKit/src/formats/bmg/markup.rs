//! UTF-16 string codec with escape markup
//!
//! Strings in DAT1 are null-terminated big-endian UTF-16. Control records
//! are embedded after a `0x001A` marker unit and are rendered in text form as
//! `{gg:nnnn}` or `{gg:nnnn:payload}`. The characters `{`, `}` and `\` are
//! escaped with a backslash, and line breaks become `\n` and `\r`, so a
//! decoded string always fits on one line.

use byteorder::{BigEndian, ByteOrder};

use super::slice_at;
use crate::error::{Error, Result};

/// Code unit that introduces an escape record
pub const ESCAPE_MARKER: u16 = 0x001A;

/// Marker + length + group + number
const ESCAPE_FIXED_LEN: usize = 6;

/// The record length is a single byte that includes the fixed part
pub const MAX_ESCAPE_PAYLOAD: usize = u8::MAX as usize - ESCAPE_FIXED_LEN;

/// An embedded control record
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EscapeRecord {
    pub group: u8,
    pub number: u16,
    pub payload: Vec<u8>,
}

impl EscapeRecord {
    /// Read the record whose marker unit sits at `marker_offset`
    ///
    /// Returns the record and its total raw length (marker included).
    pub fn read(raw: &[u8], marker_offset: usize) -> Result<(Self, usize)> {
        let fixed = slice_at(raw, marker_offset, ESCAPE_FIXED_LEN)?;
        let length = fixed[2];
        if (length as usize) < ESCAPE_FIXED_LEN {
            return Err(Error::MalformedEscape {
                offset: marker_offset,
                length,
            });
        }

        let record = slice_at(raw, marker_offset, length as usize)?;
        Ok((
            Self {
                group: record[3],
                number: BigEndian::read_u16(&record[4..6]),
                payload: record[ESCAPE_FIXED_LEN..].to_vec(),
            },
            length as usize,
        ))
    }

    /// Parse the inside of a `{...}` token (without the braces)
    ///
    /// Grammar: `GG:NNNN[:PAYLOAD]`, where `GG` is 2 hex digits, `NNNN` is 4
    /// hex digits and `PAYLOAD` is an even number of hex digits.
    pub fn parse_token(token: &str) -> Result<Self> {
        let fail = |reason| Error::EscapeSyntax {
            token: format!("{{{token}}}"),
            reason,
        };

        let fields: Vec<&str> = token.split(':').collect();
        let (group, number, payload) = match fields.as_slice() {
            [group, number] => (*group, *number, ""),
            [group, number, payload] => (*group, *number, *payload),
            _ => return Err(fail("expected 2 or 3 ':'-separated fields")),
        };

        if group.len() != 2 || !is_hex(group) {
            return Err(fail("group must be exactly 2 hex digits"));
        }
        if number.len() != 4 || !is_hex(number) {
            return Err(fail("number must be exactly 4 hex digits"));
        }
        if payload.len() % 2 != 0 {
            return Err(fail("payload must have an even number of hex digits"));
        }
        let payload = hex::decode(payload).map_err(|_| fail("payload is not hex"))?;
        if payload.len() > MAX_ESCAPE_PAYLOAD {
            return Err(fail("payload longer than 249 bytes"));
        }

        Ok(Self {
            group: u8::from_str_radix(group, 16).map_err(|_| fail("group is not hex"))?,
            number: u16::from_str_radix(number, 16).map_err(|_| fail("number is not hex"))?,
            payload,
        })
    }

    /// Render as markup, braces included
    #[must_use]
    pub fn to_token(&self) -> String {
        if self.payload.is_empty() {
            format!("{{{:02x}:{:04x}}}", self.group, self.number)
        } else {
            format!(
                "{{{:02x}:{:04x}:{}}}",
                self.group,
                self.number,
                hex::encode(&self.payload)
            )
        }
    }

    /// Total raw length, marker included
    #[must_use]
    pub fn raw_len(&self) -> usize {
        ESCAPE_FIXED_LEN + self.payload.len()
    }

    /// Append the raw form (marker, length, group, number, payload)
    pub fn write_to(&self, out: &mut Vec<u8>) {
        let mut fixed = [0u8; ESCAPE_FIXED_LEN];
        BigEndian::write_u16(&mut fixed[0..2], ESCAPE_MARKER);
        fixed[2] = self.raw_len() as u8;
        fixed[3] = self.group;
        BigEndian::write_u16(&mut fixed[4..6], self.number);
        out.extend_from_slice(&fixed);
        out.extend_from_slice(&self.payload);
    }
}

/// Decode a null-terminated string starting at `start`
///
/// Returns the markup text and the offset just past the terminator.
pub fn decode_string(raw: &[u8], start: usize) -> Result<(String, usize)> {
    let mut text = String::new();
    let mut pos = start;

    loop {
        let unit = read_unit(raw, pos)?;
        let (ch, width) = match unit {
            0 => return Ok((text, pos + 2)),
            0xD800..=0xDBFF => {
                let low = read_unit(raw, pos + 2)?;
                if !(0xDC00..=0xDFFF).contains(&low) {
                    return Err(Error::MalformedUtf16 { offset: pos });
                }
                let scalar = 0x10000 + ((u32::from(unit) - 0xD800) << 10) + (u32::from(low) - 0xDC00);
                let ch = char::from_u32(scalar).ok_or(Error::MalformedUtf16 { offset: pos })?;
                (ch, 4)
            }
            0xDC00..=0xDFFF => return Err(Error::MalformedUtf16 { offset: pos }),
            _ => {
                let ch = char::from_u32(u32::from(unit)).ok_or(Error::MalformedUtf16 { offset: pos })?;
                (ch, 2)
            }
        };

        match ch {
            '\u{1A}' => {
                let (record, length) = EscapeRecord::read(raw, pos)?;
                text.push_str(&record.to_token());
                pos += length;
                continue;
            }
            '{' | '}' | '\\' => {
                text.push('\\');
                text.push(ch);
            }
            '\n' => text.push_str("\\n"),
            '\r' => text.push_str("\\r"),
            _ => text.push(ch),
        }
        pos += width;
    }
}

/// Encode markup text into null-terminated UTF-16BE with escape records
pub fn encode_string(text: &str) -> Result<Vec<u8>> {
    let mut out = Vec::with_capacity(text.len() * 2 + 2);
    let mut rest = text;

    while let Some(ch) = rest.chars().next() {
        rest = &rest[ch.len_utf8()..];
        match ch {
            '\\' => {
                let mut tail = rest.chars();
                let escaped = tail.next().ok_or_else(|| Error::EscapeSyntax {
                    token: "\\".to_string(),
                    reason: "trailing backslash",
                })?;
                let unescaped = match escaped {
                    'n' => '\n',
                    'r' => '\r',
                    other => other,
                };
                push_char(&mut out, unescaped)?;
                rest = tail.as_str();
            }
            '{' => {
                let close = rest.find('}').ok_or_else(|| Error::EscapeSyntax {
                    token: format!("{{{rest}"),
                    reason: "missing closing '}'",
                })?;
                EscapeRecord::parse_token(&rest[..close])?.write_to(&mut out);
                rest = &rest[close + 1..];
            }
            _ => push_char(&mut out, ch)?,
        }
    }

    out.extend_from_slice(&[0, 0]);
    Ok(out)
}

fn push_char(out: &mut Vec<u8>, ch: char) -> Result<()> {
    // Either would be misread on decode: NUL terminates, 0x1A starts a record
    if ch == '\0' || ch == '\u{1A}' {
        return Err(Error::EscapeSyntax {
            token: format!("U+{:04X}", ch as u32),
            reason: "control character cannot appear literally; use {..} markup",
        });
    }
    let mut units = [0u16; 2];
    for unit in ch.encode_utf16(&mut units) {
        let mut bytes = [0u8; 2];
        BigEndian::write_u16(&mut bytes, *unit);
        out.extend_from_slice(&bytes);
    }
    Ok(())
}

fn read_unit(raw: &[u8], pos: usize) -> Result<u16> {
    slice_at(raw, pos, 2).map(BigEndian::read_u16)
}

fn is_hex(s: &str) -> bool {
    s.bytes().all(|b| b.is_ascii_hexdigit())
}
