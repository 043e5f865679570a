//! BMG file writing
//!
//! Section bodies are built and validated in memory first, then written in
//! one forward pass; the total size in the header is patched at the end.

use std::fs::File;
use std::io::{BufWriter, Cursor, Seek, SeekFrom, Write};
use std::path::Path;

use byteorder::{BigEndian, WriteBytesExt};

use super::markup::encode_string;
use super::{
    BMG_MAGIC, DAT1_TAG, INF1_TAG, MID1_FORMAT, MID1_TAG, MessageContainer, SECTION_HEADER_SIZE,
    StringEncoding, align_section,
};
use crate::error::{Error, Result};

/// Offset of the total-size field in the header
const SIZE_FIELD_OFFSET: u64 = 8;

/// A fully built section body waiting to be written
struct Section {
    tag: &'static [u8; 4],
    body: Vec<u8>,
}

/// Write a .bmg file to disk
///
/// Nothing is created on disk if the container fails validation.
///
/// # Errors
/// Returns an error if the container is invalid or file writing fails.
pub fn write_bmg<P: AsRef<Path>>(path: P, container: &MessageContainer) -> Result<()> {
    let sections = build_sections(container)?;

    let file = File::create(path)?;
    let mut writer = BufWriter::new(file);
    write_sections(&mut writer, container.encoding, &sections)?;
    writer.flush()?;
    Ok(())
}

/// Serialize a container to bytes
///
/// # Errors
/// Returns [`Error::InfoLengthMismatch`] if info blobs differ in length,
/// [`Error::EscapeSyntax`] if a string has malformed markup, or another
/// validation error.
pub fn serialize_bmg(container: &MessageContainer) -> Result<Vec<u8>> {
    let mut cursor = Cursor::new(Vec::new());
    write_bmg_to(&mut cursor, container)?;
    Ok(cursor.into_inner())
}

/// Write a container to a seekable sink at its current position
///
/// After the sections are written the writer seeks back to patch the total
/// size, then returns to the end. Returns the number of bytes written.
///
/// # Errors
/// Returns an error if validation fails or the sink cannot be written or
/// seeked. Validation happens before anything is written.
pub fn write_bmg_to<W: Write + Seek>(writer: &mut W, container: &MessageContainer) -> Result<u64> {
    let sections = build_sections(container)?;
    write_sections(writer, container.encoding, &sections)
}

fn build_sections(container: &MessageContainer) -> Result<Vec<Section>> {
    container.encoding.ensure_supported()?;
    let info_len = container.info_len()?;
    container.check_ids()?;

    let count = u16::try_from(container.len()).map_err(|_| Error::TooManyEntries(container.len()))?;
    let stride = u16::try_from(info_len + 4).map_err(|_| Error::InfoTooLong(info_len))?;

    // Offset 0 holds an empty string so no entry points there
    let mut dat1 = vec![0u8, 0];
    let mut inf1 = Vec::with_capacity(8 + container.len() * stride as usize);
    inf1.write_u16::<BigEndian>(count)?;
    inf1.write_u16::<BigEndian>(stride)?;
    inf1.write_u32::<BigEndian>(0)?;

    for entry in &container.entries {
        let string_offset = dat1.len() as u32;
        dat1.extend_from_slice(&encode_string(&entry.text)?);
        inf1.write_u32::<BigEndian>(string_offset)?;
        inf1.extend_from_slice(&entry.info);
    }

    let mut sections = vec![
        Section {
            tag: INF1_TAG,
            body: inf1,
        },
        Section {
            tag: DAT1_TAG,
            body: dat1,
        },
    ];

    if container.has_ids {
        let mut mid1 = Vec::with_capacity(8 + container.len() * 4);
        mid1.write_u16::<BigEndian>(count)?;
        mid1.write_u16::<BigEndian>(MID1_FORMAT)?;
        mid1.write_u32::<BigEndian>(0)?;
        for id in container.entries.iter().filter_map(|e| e.id) {
            mid1.write_u32::<BigEndian>(id)?;
        }
        sections.push(Section {
            tag: MID1_TAG,
            body: mid1,
        });
    }

    tracing::debug!(
        "Built {} sections for {} entries (stride {})",
        sections.len(),
        count,
        stride
    );
    Ok(sections)
}

fn write_sections<W: Write + Seek>(
    writer: &mut W,
    encoding: StringEncoding,
    sections: &[Section],
) -> Result<u64> {
    let start = writer.stream_position()?;

    // Header
    writer.write_all(BMG_MAGIC)?;
    writer.write_u32::<BigEndian>(0)?; // total size, patched below
    writer.write_u32::<BigEndian>(sections.len() as u32)?;
    writer.write_u8(encoding.code())?;
    writer.write_all(&[0u8; 15])?;

    for section in sections {
        // Declared length equals the padded physical length
        let length = align_section(section.body.len() + SECTION_HEADER_SIZE);
        writer.write_all(section.tag)?;
        writer.write_u32::<BigEndian>(length as u32)?;
        writer.write_all(&section.body)?;

        let padding = length - SECTION_HEADER_SIZE - section.body.len();
        writer.write_all(&vec![0u8; padding])?;
    }

    // Go back and write the total size
    let end = writer.stream_position()?;
    let total = end - start;
    writer.seek(SeekFrom::Start(start + SIZE_FIELD_OFFSET))?;
    writer.write_u32::<BigEndian>(total as u32)?;
    writer.seek(SeekFrom::Start(end))?;

    Ok(total)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::formats::bmg::{HEADER_SIZE, MessageEntry, parse_bmg_bytes, scan_sections};

    fn sample(has_ids: bool) -> MessageContainer {
        let id = |n| has_ids.then_some(n);
        MessageContainer {
            encoding: StringEncoding::Utf16,
            has_ids,
            entries: vec![
                MessageEntry::new("Hello", vec![0x00, 0x11, 0x22, 0x33], id(5)),
                MessageEntry::new(r"Line one\nLine {0a:0034:0102}two \{ok\}", vec![1, 2, 3, 4], id(6)),
                MessageEntry::new("", vec![0xFF; 4], id(0xFFFF_FFFF)),
            ],
        }
    }

    #[test]
    fn test_roundtrip() {
        for has_ids in [false, true] {
            let container = sample(has_ids);
            let bytes = serialize_bmg(&container).unwrap();
            assert_eq!(parse_bmg_bytes(&bytes).unwrap(), container);
        }
    }

    #[test]
    fn test_layout() {
        let bytes = serialize_bmg(&sample(true)).unwrap();

        assert_eq!(&bytes[..8], BMG_MAGIC);
        assert_eq!(u32::from_be_bytes(bytes[8..12].try_into().unwrap()) as usize, bytes.len());
        assert_eq!(u32::from_be_bytes(bytes[12..16].try_into().unwrap()), 3);
        assert_eq!(bytes[0x10], 2);
        assert!(bytes[0x11..HEADER_SIZE].iter().all(|&b| b == 0));

        let sections = scan_sections(&bytes).unwrap();
        let tags: Vec<String> = sections.iter().map(|s| s.tag_str()).collect();
        assert_eq!(tags, ["INF1", "DAT1", "MID1"]);

        // Declared lengths are 16-aligned and tile the file exactly
        let mut offset = HEADER_SIZE;
        for section in &sections {
            assert_eq!(section.offset, offset);
            assert_eq!(section.length % 16, 0);
            offset += section.length as usize;
        }
        assert_eq!(offset, bytes.len());

        // INF1: count, stride, first string at DAT1 offset 2
        let inf1 = sections[0].payload_offset();
        assert_eq!(&bytes[inf1..inf1 + 4], &[0x00, 0x03, 0x00, 0x08]);
        assert_eq!(&bytes[inf1 + 8..inf1 + 16], &[0, 0, 0, 2, 0x00, 0x11, 0x22, 0x33]);

        // DAT1 starts with the empty-string sentinel
        let dat1 = sections[1].payload_offset();
        assert_eq!(&bytes[dat1..dat1 + 4], &[0x00, 0x00, 0x00, b'H']);

        // MID1: count, 0x1000, reserved, ids
        let mid1 = sections[2].payload_offset();
        assert_eq!(&bytes[mid1..mid1 + 4], &[0x00, 0x03, 0x10, 0x00]);
        assert_eq!(&bytes[mid1 + 8..mid1 + 12], &[0, 0, 0, 5]);
    }

    #[test]
    fn test_two_sections_without_ids() {
        let bytes = serialize_bmg(&sample(false)).unwrap();
        assert_eq!(u32::from_be_bytes(bytes[12..16].try_into().unwrap()), 2);
        assert_eq!(scan_sections(&bytes).unwrap().len(), 2);
    }

    #[test]
    fn test_info_length_mismatch() {
        let mut container = sample(false);
        container.entries[1].info.push(0);
        assert!(matches!(
            serialize_bmg(&container),
            Err(Error::InfoLengthMismatch {
                index: 1,
                expected: 4,
                found: 5
            })
        ));
    }

    #[test]
    fn test_id_presence_mismatch() {
        let mut container = sample(true);
        container.entries[2].id = None;
        assert!(matches!(
            serialize_bmg(&container),
            Err(Error::IdPresenceMismatch { index: 2, has_ids: true })
        ));
    }

    #[test]
    fn test_bad_markup_fails_before_output() {
        let mut container = sample(false);
        container.entries[0].text = "{zz}".to_string();

        let mut cursor = Cursor::new(Vec::new());
        assert!(matches!(
            write_bmg_to(&mut cursor, &container),
            Err(Error::EscapeSyntax { .. })
        ));
        assert!(cursor.into_inner().is_empty());
    }

    #[test]
    fn test_unsupported_encoding() {
        let mut container = sample(false);
        container.encoding = StringEncoding::Utf8;
        assert!(matches!(serialize_bmg(&container), Err(Error::UnsupportedEncoding(_))));
    }

    #[test]
    fn test_empty_container() {
        let container = MessageContainer::new(true);
        let bytes = serialize_bmg(&container).unwrap();
        let inf1 = HEADER_SIZE + 8;
        // An empty container still gets a stride that covers the offset field
        assert_eq!(&bytes[inf1..inf1 + 4], &[0, 0, 0, 4]);
        assert_eq!(parse_bmg_bytes(&bytes).unwrap(), container);
    }

    #[test]
    fn test_too_many_entries() {
        let mut container = MessageContainer::new(false);
        container.entries = vec![MessageEntry::new("", vec![], None); 65536];
        assert!(matches!(serialize_bmg(&container), Err(Error::TooManyEntries(65536))));
    }

    #[test]
    fn test_write_at_offset_patches_relative_size() {
        let container = sample(false);
        let expected = serialize_bmg(&container).unwrap();

        let mut cursor = Cursor::new(Vec::new());
        cursor.write_all(b"prefix").unwrap();
        let written = write_bmg_to(&mut cursor, &container).unwrap();
        cursor.write_all(b"!").unwrap();

        let out = cursor.into_inner();
        assert_eq!(written as usize, expected.len());
        assert_eq!(&out[6..6 + expected.len()], expected.as_slice());
        assert_eq!(out.last(), Some(&b'!'));
    }
}
