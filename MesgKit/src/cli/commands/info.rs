//! CLI command for inspecting a BMG container

use std::path::Path;

use serde::Serialize;

use crate::error::Result;
use crate::formats::bmg::{parse_bmg_bytes, scan_sections};

/// Summary of a container, as printed by `info --json`
#[derive(Debug, Serialize)]
pub struct InfoSummary {
    pub file_size: usize,
    pub encoding: &'static str,
    pub encoding_code: u8,
    pub has_ids: bool,
    pub entries: usize,
    /// INF1 stride: string offset plus info blob
    pub stride: usize,
    pub sections: Vec<SectionSummary>,
}

#[derive(Debug, Serialize)]
pub struct SectionSummary {
    pub tag: String,
    pub offset: usize,
    pub length: u32,
}

/// Build the summary for a container held in memory
pub fn summarize(data: &[u8]) -> Result<InfoSummary> {
    let sections = scan_sections(data)?;
    let container = parse_bmg_bytes(data)?;

    Ok(InfoSummary {
        file_size: data.len(),
        encoding: container.encoding.name(),
        encoding_code: container.encoding.code(),
        has_ids: container.has_ids,
        entries: container.len(),
        stride: container.info_len()? + 4,
        sections: sections
            .iter()
            .map(|s| SectionSummary {
                tag: s.tag_str(),
                offset: s.offset,
                length: s.length,
            })
            .collect(),
    })
}

pub fn execute(path: &Path, json: bool) -> anyhow::Result<()> {
    let data = std::fs::read(path)?;
    let summary = summarize(&data)?;

    if json {
        println!("{}", serde_json::to_string_pretty(&summary)?);
        return Ok(());
    }

    println!("BMG File Information");
    println!("====================");
    println!("File:        {}", path.display());
    println!("Size:        {} bytes", summary.file_size);
    println!("Encoding:    {} ({})", summary.encoding, summary.encoding_code);
    println!("Message ids: {}", if summary.has_ids { "yes" } else { "no" });
    println!("Entries:     {}", summary.entries);
    println!("Stride:      {}", summary.stride);
    println!();

    println!("Sections:");
    println!("---------");
    for section in &summary.sections {
        println!(
            "  {} at {:#06x} | {:>8} bytes",
            section.tag, section.offset, section.length
        );
    }

    Ok(())
}
