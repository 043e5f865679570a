//! Error types for `MesgKit`

use thiserror::Error;

/// The error type for `MesgKit` operations.
///
/// Every transform is all-or-nothing: the first error aborts it and no
/// partial output is produced.
#[non_exhaustive]
#[derive(Error, Debug)]
pub enum Error {
    // ==================== IO Errors ====================
    /// IO error from file operations.
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// JSON serialization error.
    #[error("JSON error: {0}")]
    JsonError(#[from] serde_json::Error),

    // ==================== Binary Container Errors ====================
    /// The file does not start with the `MESGbmg1` magic.
    #[error("invalid BMG magic: expected MESGbmg1, found {0:?}")]
    BadMagic([u8; 8]),

    /// A required section is absent from the container.
    #[error("missing required section {0}")]
    MissingSection(&'static str),

    /// A declared length or offset runs past the end of the data.
    #[error("truncated data at offset {offset:#x}: need {needed} bytes, {available} available")]
    TruncatedData {
        /// Offset where the read started.
        offset: usize,
        /// Number of bytes the read needed.
        needed: usize,
        /// Number of bytes left in the buffer.
        available: usize,
    },

    /// A section header declares a length smaller than the header itself.
    #[error("section {tag} at offset {offset:#x} has invalid length {length}")]
    InvalidSectionLength {
        /// Section tag as text.
        tag: String,
        /// Offset of the section header.
        offset: usize,
        /// Declared length.
        length: u32,
    },

    /// The INF1 stride cannot hold the 4-byte string offset.
    #[error("INF1 stride {0} is smaller than 4")]
    StrideMismatch(u16),

    /// MID1 and INF1 disagree on the number of entries.
    #[error("MID1 lists {mid} ids but INF1 lists {inf} entries")]
    IdCountMismatch {
        /// Entry count from INF1.
        inf: usize,
        /// Id count from MID1.
        mid: usize,
    },

    /// An entry's info blob differs in length from the first entry's.
    #[error("entry {index} has a {found}-byte info blob, expected {expected}")]
    InfoLengthMismatch {
        /// Index of the offending entry.
        index: usize,
        /// Length of the first entry's blob.
        expected: usize,
        /// Length of the offending blob.
        found: usize,
    },

    /// An entry's id presence disagrees with the container's `has_ids` flag.
    #[error("entry {index} id presence does not match has_ids={has_ids}")]
    IdPresenceMismatch {
        /// Index of the offending entry.
        index: usize,
        /// The container flag.
        has_ids: bool,
    },

    /// The info blob is too long for a 16-bit stride.
    #[error("info blob of {0} bytes does not fit a 16-bit stride")]
    InfoTooLong(usize),

    /// The container holds more entries than INF1 can count.
    #[error("too many entries: {0} (maximum 65535)")]
    TooManyEntries(usize),

    /// The string encoding byte is not a known code.
    #[error("invalid string encoding code: {0}")]
    InvalidEncoding(u8),

    /// The string encoding is known but its strings cannot be decoded.
    #[error("unsupported string encoding: {0} (only UTF-16 is supported)")]
    UnsupportedEncoding(&'static str),

    // ==================== String Codec Errors ====================
    /// A surrogate code unit without its partner.
    #[error("unpaired UTF-16 surrogate at offset {offset:#x}")]
    MalformedUtf16 {
        /// Offset of the surrogate.
        offset: usize,
    },

    /// An embedded escape record with an impossible length byte.
    #[error("escape record at offset {offset:#x} declares length {length} (minimum 6)")]
    MalformedEscape {
        /// Offset of the escape marker.
        offset: usize,
        /// The declared record length.
        length: u8,
    },

    /// A `{...}` markup token or backslash escape could not be parsed.
    #[error("invalid escape markup '{token}': {reason}")]
    EscapeSyntax {
        /// The offending token.
        token: String,
        /// What was wrong with it.
        reason: &'static str,
    },

    // ==================== Text Format Errors ====================
    /// The first line is not the decoded-text header.
    #[error("line 1: expected header '{expected}', found '{found}'")]
    HeaderMismatch {
        /// The expected header literal.
        expected: &'static str,
        /// The first line of the input.
        found: String,
    },

    /// The metadata line is not `e=<int> mid=<True|False>`.
    #[error("line {line}: invalid metadata line '{found}'")]
    MetadataSyntax {
        /// 1-based line number.
        line: usize,
        /// The offending line.
        found: String,
    },

    /// An entry line is not `<id|x>;<hex>; <text>`.
    #[error("line {line}: invalid entry ({reason})")]
    EntrySyntax {
        /// 1-based line number.
        line: usize,
        /// What was wrong with it.
        reason: &'static str,
    },

    /// An entry's id field disagrees with the `mid=` flag.
    #[error("line {line}: id field does not match mid={has_ids}")]
    IdConsistency {
        /// 1-based line number.
        line: usize,
        /// The declared flag.
        has_ids: bool,
    },
}

/// A specialized Result type for `MesgKit` operations.
pub type Result<T> = std::result::Result<T, Error>;
