//! Editable text form of a BMG container
//!
//! # Format
//!
//! ```text
//! BMG decoded text file
//! e=2 mid=True
//! 5;00112233; Hello
//! 6;00112233; Second line\nwith {1a:0001} markup
//! ```
//!
//! Line 2 carries the encoding code and whether ids are present. Each
//! further line is one entry: the id (or `x` when the container has no
//! ids), the info blob as hex pairs, and the string markup.

use std::fmt::Write as _;
use std::path::Path;

use super::{MessageContainer, MessageEntry, StringEncoding};
use crate::error::{Error, Result};

/// First line of every decoded text file
pub const TEXT_HEADER: &str = "BMG decoded text file";

/// Render a container as text
///
/// # Errors
/// Returns [`Error::IdPresenceMismatch`] if an entry's id disagrees with
/// `has_ids`, or [`Error::EscapeSyntax`] if an entry's text contains a
/// literal `\n` or `\r`.
pub fn to_text(container: &MessageContainer) -> Result<String> {
    container.check_ids()?;

    let mut out = String::with_capacity(64 + container.len() * 32);
    out.push_str(TEXT_HEADER);
    out.push('\n');
    let _ = writeln!(
        out,
        "e={} mid={}",
        container.encoding.code(),
        if container.has_ids { "True" } else { "False" }
    );

    for entry in &container.entries {
        if entry.text.contains(['\n', '\r']) {
            return Err(Error::EscapeSyntax {
                token: entry.text.clone(),
                reason: "literal line break in entry text; write it as \\n or \\r",
            });
        }
        match entry.id {
            Some(id) => {
                let _ = write!(out, "{id}");
            }
            None => out.push('x'),
        }
        out.push(';');
        out.push_str(&hex::encode(&entry.info));
        out.push_str("; ");
        out.push_str(&entry.text);
        out.push('\n');
    }

    Ok(out)
}

/// Parse a decoded text file
///
/// # Errors
/// Returns [`Error::HeaderMismatch`], [`Error::MetadataSyntax`],
/// [`Error::EntrySyntax`] or [`Error::IdConsistency`] with the 1-based line
/// number of the offending line.
pub fn from_text(input: &str) -> Result<MessageContainer> {
    let mut lines = input.lines().enumerate().map(|(i, line)| (i + 1, line));

    let header = lines.next().map_or("", |(_, line)| line);
    let header = header.strip_prefix('\u{FEFF}').unwrap_or(header);
    if header != TEXT_HEADER {
        return Err(Error::HeaderMismatch {
            expected: TEXT_HEADER,
            found: header.to_string(),
        });
    }

    let (line, metadata) = lines.next().unwrap_or((2, ""));
    let (encoding, has_ids) = parse_metadata(metadata).ok_or_else(|| Error::MetadataSyntax {
        line,
        found: metadata.to_string(),
    })?;

    let mut entries = Vec::new();
    for (line, content) in lines {
        let parsed = parse_entry_line(content).map_err(|reason| Error::EntrySyntax { line, reason })?;
        if parsed.id.is_some() != has_ids {
            return Err(Error::IdConsistency { line, has_ids });
        }
        entries.push(MessageEntry {
            text: parsed.text.to_string(),
            info: parsed.info,
            id: parsed.id,
        });
    }

    Ok(MessageContainer {
        encoding,
        has_ids,
        entries,
    })
}

/// Read a decoded text file from disk
///
/// # Errors
/// Returns [`Error::Io`] if the file cannot be read, or any error of [`from_text`].
pub fn read_bmg_text<P: AsRef<Path>>(path: P) -> Result<MessageContainer> {
    let content = std::fs::read_to_string(path)?;
    from_text(&content)
}

/// Write a container as a decoded text file
///
/// # Errors
/// Returns an error if the container cannot be rendered or the file cannot be written.
pub fn write_bmg_text<P: AsRef<Path>>(path: P, container: &MessageContainer) -> Result<()> {
    let text = to_text(container)?;
    std::fs::write(path, text)?;
    Ok(())
}

/// Parse `e=<digits> mid=<True|False>`
fn parse_metadata(line: &str) -> Option<(StringEncoding, bool)> {
    let (code, mid) = line.strip_prefix("e=")?.split_once(" mid=")?;
    if code.is_empty() || !code.bytes().all(|b| b.is_ascii_digit()) {
        return None;
    }
    let encoding = code
        .parse::<u8>()
        .ok()
        .and_then(|c| StringEncoding::from_code(c).ok())?;
    let has_ids = match mid {
        "True" => true,
        "False" => false,
        _ => return None,
    };
    Some((encoding, has_ids))
}

/// One `<id|x>;<hex>; <text>` line
#[derive(Debug, PartialEq, Eq)]
struct EntryLine<'a> {
    id: Option<u32>,
    info: Vec<u8>,
    text: &'a str,
}

/// Parse an entry line; the error is a short description of the problem
///
/// The space after the second `;` is optional. The text is everything after
/// it and may itself contain `;`.
fn parse_entry_line(line: &str) -> std::result::Result<EntryLine<'_>, &'static str> {
    let (id_field, rest) = line.split_once(';').ok_or("missing ';' after id")?;
    let (info_field, text) = rest.split_once(';').ok_or("missing ';' after info")?;

    let id = match id_field {
        "x" => None,
        digits if !digits.is_empty() && digits.bytes().all(|b| b.is_ascii_digit()) => {
            Some(digits.parse::<u32>().map_err(|_| "id does not fit in 32 bits")?)
        }
        _ => return Err("id must be a decimal number or 'x'"),
    };

    if info_field.len() % 2 != 0 {
        return Err("info must be whole hex pairs");
    }
    let info = hex::decode(info_field).map_err(|_| "info is not hex")?;

    Ok(EntryLine {
        id,
        info,
        text: text.strip_prefix(' ').unwrap_or(text),
    })
}
