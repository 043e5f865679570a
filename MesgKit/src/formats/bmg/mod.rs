//! BMG message container format
//!
//! Big-endian `MESGbmg1` container of UTF-16 strings, each paired with a
//! fixed-width info blob and an optional numeric id. Can be converted
//! to/from an editable line-oriented text format.

mod markup;
mod reader;
mod text;
mod writer;

pub use markup::{EscapeRecord, decode_string, encode_string};
pub use reader::{SectionInfo, parse_bmg_bytes, read_bmg, scan_sections};
pub use text::{from_text, read_bmg_text, to_text, write_bmg_text};
pub use writer::{serialize_bmg, write_bmg, write_bmg_to};

use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};

/// "MESGbmg1" magic signature
pub const BMG_MAGIC: &[u8; 8] = b"MESGbmg1";

/// Size of the file header; the first section starts here
pub const HEADER_SIZE: usize = 0x20;

/// Size of a section header (tag + length)
pub const SECTION_HEADER_SIZE: usize = 8;

/// Sections are padded to this boundary
pub const SECTION_ALIGNMENT: usize = 16;

/// Entry index section tag
pub const INF1_TAG: &[u8; 4] = b"INF1";

/// String data section tag
pub const DAT1_TAG: &[u8; 4] = b"DAT1";

/// Message id section tag
pub const MID1_TAG: &[u8; 4] = b"MID1";

/// Unused MID1 header field, conventionally this value
pub const MID1_FORMAT: u16 = 0x1000;

/// String encoding declared in the container header
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum StringEncoding {
    /// Legacy single-byte format from early titles
    LegacyGc,
    /// Windows-1252
    Cp1252,
    /// UTF-16 big-endian (the only encoding decoded)
    #[default]
    Utf16,
    /// Shift-JIS
    ShiftJis,
    /// UTF-8
    Utf8,
}

impl StringEncoding {
    /// Map a header byte to an encoding
    pub fn from_code(code: u8) -> Result<Self> {
        match code {
            0 => Ok(Self::LegacyGc),
            1 => Ok(Self::Cp1252),
            2 => Ok(Self::Utf16),
            3 => Ok(Self::ShiftJis),
            4 => Ok(Self::Utf8),
            other => Err(Error::InvalidEncoding(other)),
        }
    }

    /// The header byte for this encoding
    #[must_use]
    pub fn code(self) -> u8 {
        match self {
            Self::LegacyGc => 0,
            Self::Cp1252 => 1,
            Self::Utf16 => 2,
            Self::ShiftJis => 3,
            Self::Utf8 => 4,
        }
    }

    #[must_use]
    pub fn name(self) -> &'static str {
        match self {
            Self::LegacyGc => "legacy-gc",
            Self::Cp1252 => "cp1252",
            Self::Utf16 => "utf-16",
            Self::ShiftJis => "shift-jis",
            Self::Utf8 => "utf-8",
        }
    }

    /// Fail unless strings in this encoding can be decoded and encoded
    pub fn ensure_supported(self) -> Result<()> {
        if self == Self::Utf16 {
            Ok(())
        } else {
            Err(Error::UnsupportedEncoding(self.name()))
        }
    }
}

/// A single message: markup text, info blob and optional id
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MessageEntry {
    /// Message text in markup form (escape records as `{gg:nnnn}`)
    pub text: String,
    /// Fixed-width metadata blob (stride - 4 bytes)
    pub info: Vec<u8>,
    /// Message id from MID1, if the container has one
    pub id: Option<u32>,
}

impl MessageEntry {
    pub fn new(text: impl Into<String>, info: impl Into<Vec<u8>>, id: Option<u32>) -> Self {
        Self {
            text: text.into(),
            info: info.into(),
            id,
        }
    }
}

/// An ordered collection of messages plus container-wide flags
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct MessageContainer {
    pub encoding: StringEncoding,
    /// Whether a MID1 section is present (every entry then carries an id)
    pub has_ids: bool,
    pub entries: Vec<MessageEntry>,
}

impl MessageContainer {
    /// Create an empty UTF-16 container
    #[must_use]
    pub fn new(has_ids: bool) -> Self {
        Self {
            encoding: StringEncoding::Utf16,
            has_ids,
            entries: Vec::new(),
        }
    }

    /// Get the number of entries
    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Check if the container is empty
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// The info blob length shared by every entry
    ///
    /// An empty container reports 0.
    ///
    /// # Errors
    /// Returns [`Error::InfoLengthMismatch`] naming the first entry whose blob
    /// length differs from the first entry's.
    pub fn info_len(&self) -> Result<usize> {
        let Some(first) = self.entries.first() else {
            return Ok(0);
        };
        let expected = first.info.len();
        match self
            .entries
            .iter()
            .enumerate()
            .find(|(_, e)| e.info.len() != expected)
        {
            Some((index, entry)) => Err(Error::InfoLengthMismatch {
                index,
                expected,
                found: entry.info.len(),
            }),
            None => Ok(expected),
        }
    }

    /// Check that ids are present on every entry iff `has_ids` is set
    pub fn check_ids(&self) -> Result<()> {
        match self
            .entries
            .iter()
            .position(|e| e.id.is_some() != self.has_ids)
        {
            Some(index) => Err(Error::IdPresenceMismatch {
                index,
                has_ids: self.has_ids,
            }),
            None => Ok(()),
        }
    }

    /// Find an entry by message id
    #[must_use]
    pub fn find_by_id(&self, id: u32) -> Option<&MessageEntry> {
        self.entries.iter().find(|e| e.id == Some(id))
    }

    /// Case-insensitive substring search over entry text
    ///
    /// Returns `(index, entry)` pairs in container order.
    #[must_use]
    pub fn search(&self, query: &str) -> Vec<(usize, &MessageEntry)> {
        let query_lower = query.to_lowercase();
        self.entries
            .iter()
            .enumerate()
            .filter(|(_, e)| e.text.to_lowercase().contains(&query_lower))
            .collect()
    }
}

/// Borrow `len` bytes at `offset`, or fail with [`Error::TruncatedData`]
pub(crate) fn slice_at(data: &[u8], offset: usize, len: usize) -> Result<&[u8]> {
    data.get(offset..offset.saturating_add(len))
        .ok_or(Error::TruncatedData {
            offset,
            needed: len,
            available: data.len().saturating_sub(offset),
        })
}

/// Round `len` up to the section alignment
pub(crate) fn align_section(len: usize) -> usize {
    len.div_ceil(SECTION_ALIGNMENT) * SECTION_ALIGNMENT
}
