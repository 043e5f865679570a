//! BMG file reading and parsing
//!
//! Reading happens in two phases: the section table is scanned first, then
//! INF1 offsets are resolved against DAT1, so the physical order of the
//! sections does not matter.

use std::fs::File;
use std::io::Read;
use std::path::Path;

use byteorder::{BigEndian, ByteOrder};

use super::markup::decode_string;
use super::{
    BMG_MAGIC, DAT1_TAG, HEADER_SIZE, INF1_TAG, MID1_FORMAT, MID1_TAG, MessageContainer,
    MessageEntry, SECTION_HEADER_SIZE, StringEncoding, slice_at,
};
use crate::error::{Error, Result};

/// Bytes before the INF1/MID1 tables (count, stride or format, reserved)
const TABLE_HEADER_SIZE: usize = 8;

/// Location of one section inside a container
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SectionInfo {
    pub tag: [u8; 4],
    /// Offset of the section header from the start of the file
    pub offset: usize,
    /// Declared length, header included
    pub length: u32,
}

impl SectionInfo {
    /// Tag as text (non-ASCII bytes replaced)
    #[must_use]
    pub fn tag_str(&self) -> String {
        String::from_utf8_lossy(&self.tag).into_owned()
    }

    /// Offset of the first payload byte
    #[must_use]
    pub fn payload_offset(&self) -> usize {
        self.offset + SECTION_HEADER_SIZE
    }

    fn payload<'a>(&self, data: &'a [u8]) -> &'a [u8] {
        &data[self.payload_offset()..self.offset + self.length as usize]
    }
}

/// Fixed fields of the file header
struct Header {
    declared_size: u32,
    section_count: u32,
    encoding_code: u8,
}

/// Read a .bmg file from disk
///
/// # Errors
///
/// Returns [`Error::Io`] if the file cannot be opened or read, or any of the
/// structural errors of [`parse_bmg_bytes`].
pub fn read_bmg<P: AsRef<Path>>(path: P) -> Result<MessageContainer> {
    let mut file = File::open(path)?;
    let mut buffer = Vec::new();
    file.read_to_end(&mut buffer)?;
    parse_bmg_bytes(&buffer)
}

/// Parse BMG data from bytes
///
/// # Errors
///
/// Returns [`Error::BadMagic`] if the data does not start with `MESGbmg1`,
/// [`Error::MissingSection`] if INF1 or DAT1 is absent,
/// [`Error::TruncatedData`] if a length or offset runs past the data, and
/// [`Error::StrideMismatch`] if the INF1 stride is below 4.
pub fn parse_bmg_bytes(data: &[u8]) -> Result<MessageContainer> {
    let header = read_header(data)?;
    let encoding = StringEncoding::from_code(header.encoding_code)?;
    encoding.ensure_supported()?;

    if header.declared_size as usize != data.len() {
        tracing::warn!(
            "BMG header declares {} bytes but {} are present",
            header.declared_size,
            data.len()
        );
    }

    // Phase 1: locate sections
    let mut inf1 = None;
    let mut dat1 = None;
    let mut mid1 = None;
    for section in scan_sections(data)? {
        let slot = match &section.tag {
            INF1_TAG => &mut inf1,
            DAT1_TAG => &mut dat1,
            MID1_TAG => &mut mid1,
            _ => {
                tracing::debug!("Skipping unknown section {}", section.tag_str());
                continue;
            }
        };
        if slot.replace(section.clone()).is_some() {
            tracing::warn!("Duplicate {} section, using the last one", section.tag_str());
        }
    }

    // Phase 2: resolve cross-references
    let inf1 = inf1.ok_or(Error::MissingSection("INF1"))?;
    let dat1 = dat1.ok_or(Error::MissingSection("DAT1"))?;

    let records = read_inf1(inf1.payload(data)).map_err(|e| rebase(e, inf1.payload_offset()))?;
    let ids = match &mid1 {
        Some(mid1) => {
            let ids = read_mid1(mid1.payload(data)).map_err(|e| rebase(e, mid1.payload_offset()))?;
            if ids.len() != records.len() {
                return Err(Error::IdCountMismatch {
                    inf: records.len(),
                    mid: ids.len(),
                });
            }
            Some(ids)
        }
        None => None,
    };

    let strings = dat1.payload(data);
    let mut entries = Vec::with_capacity(records.len());
    for (index, (string_offset, info)) in records.into_iter().enumerate() {
        let (text, _) = decode_string(strings, string_offset as usize)
            .map_err(|e| rebase(e, dat1.payload_offset()))?;
        let id = ids.as_ref().map(|ids| ids[index]);
        entries.push(MessageEntry { text, info, id });
    }

    tracing::debug!(
        "Parsed BMG: {} entries, ids={}",
        entries.len(),
        mid1.is_some()
    );

    Ok(MessageContainer {
        encoding,
        has_ids: mid1.is_some(),
        entries,
    })
}

/// Walk the section table
///
/// Returns every section declared in the header, in file order, after
/// checking that each one lies inside `data`.
pub fn scan_sections(data: &[u8]) -> Result<Vec<SectionInfo>> {
    let header = read_header(data)?;

    let mut sections = Vec::with_capacity(header.section_count.min(16) as usize);
    let mut offset = HEADER_SIZE;
    for _ in 0..header.section_count {
        let head = slice_at(data, offset, SECTION_HEADER_SIZE)?;
        let mut tag = [0u8; 4];
        tag.copy_from_slice(&head[..4]);
        let length = BigEndian::read_u32(&head[4..8]);

        if (length as usize) < SECTION_HEADER_SIZE {
            return Err(Error::InvalidSectionLength {
                tag: String::from_utf8_lossy(&tag).into_owned(),
                offset,
                length,
            });
        }
        slice_at(data, offset, length as usize)?;

        tracing::debug!(
            "Section {} at {:#x}, {} bytes",
            String::from_utf8_lossy(&tag),
            offset,
            length
        );
        sections.push(SectionInfo {
            tag,
            offset,
            length,
        });
        offset += length as usize;
    }

    Ok(sections)
}

fn read_header(data: &[u8]) -> Result<Header> {
    let header = slice_at(data, 0, HEADER_SIZE).map_err(|_| {
        let mut magic = [0u8; 8];
        let len = data.len().min(8);
        magic[..len].copy_from_slice(&data[..len]);
        if &magic == BMG_MAGIC {
            Error::TruncatedData {
                offset: 0,
                needed: HEADER_SIZE,
                available: data.len(),
            }
        } else {
            Error::BadMagic(magic)
        }
    })?;

    let mut magic = [0u8; 8];
    magic.copy_from_slice(&header[..8]);
    if &magic != BMG_MAGIC {
        return Err(Error::BadMagic(magic));
    }

    Ok(Header {
        declared_size: BigEndian::read_u32(&header[0x08..0x0C]),
        section_count: BigEndian::read_u32(&header[0x0C..0x10]),
        encoding_code: header[0x10],
    })
}

/// Read INF1 records as `(string_offset, info)` pairs
fn read_inf1(payload: &[u8]) -> Result<Vec<(u32, Vec<u8>)>> {
    let head = slice_at(payload, 0, TABLE_HEADER_SIZE)?;
    let count = BigEndian::read_u16(&head[0..2]) as usize;
    let stride = BigEndian::read_u16(&head[2..4]);
    if stride < 4 {
        return Err(Error::StrideMismatch(stride));
    }

    let table = slice_at(payload, TABLE_HEADER_SIZE, count * stride as usize)?;
    Ok(table
        .chunks_exact(stride as usize)
        .map(|record| (BigEndian::read_u32(&record[..4]), record[4..].to_vec()))
        .collect())
}

/// Read MID1 ids
fn read_mid1(payload: &[u8]) -> Result<Vec<u32>> {
    let head = slice_at(payload, 0, TABLE_HEADER_SIZE)?;
    let count = BigEndian::read_u16(&head[0..2]) as usize;
    let format = BigEndian::read_u16(&head[2..4]);
    if format != MID1_FORMAT {
        tracing::debug!("MID1 format field is {format:#06x}");
    }

    let table = slice_at(payload, TABLE_HEADER_SIZE, count * 4)?;
    Ok(table.chunks_exact(4).map(BigEndian::read_u32).collect())
}

/// Turn a section-relative error offset into a file offset
fn rebase(err: Error, base: usize) -> Error {
    match err {
        Error::TruncatedData {
            offset,
            needed,
            available,
        } => Error::TruncatedData {
            offset: base + offset,
            needed,
            available,
        },
        Error::MalformedUtf16 { offset } => Error::MalformedUtf16 {
            offset: base + offset,
        },
        Error::MalformedEscape { offset, length } => Error::MalformedEscape {
            offset: base + offset,
            length,
        },
        other => other,
    }
}
