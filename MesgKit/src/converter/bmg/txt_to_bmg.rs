//! Decoded text to BMG conversion

use std::path::Path;

use crate::converter::{ConvertPhase, ConvertProgress, ConvertProgressCallback};
use crate::error::Result;
use crate::formats::bmg::{from_text, serialize_bmg};

/// Convert a decoded text file back to .bmg
///
/// # Errors
/// Returns an error if reading, parsing or encoding fails.
pub fn convert_txt_to_bmg<P: AsRef<Path>>(source: P, dest: P) -> Result<()> {
    convert_txt_to_bmg_with_progress(source, dest, &|_| {})
}

/// Convert a decoded text file back to .bmg with progress callback
///
/// The container is serialized in memory first; the destination is not
/// touched if any line or markup token is invalid.
///
/// # Errors
/// Returns an error if reading, parsing or encoding fails.
pub fn convert_txt_to_bmg_with_progress<P: AsRef<Path>>(
    source: P,
    dest: P,
    progress: ConvertProgressCallback,
) -> Result<()> {
    tracing::info!(
        "Converting TXT→BMG: {:?} → {:?}",
        source.as_ref(),
        dest.as_ref()
    );

    progress(&ConvertProgress::with_file(
        ConvertPhase::ReadingSource,
        1,
        4,
        "Reading text file...",
    ));
    let content = std::fs::read_to_string(&source)?;

    progress(&ConvertProgress::with_file(
        ConvertPhase::Parsing,
        2,
        4,
        "Parsing entries...",
    ));
    let container = from_text(&content)?;

    progress(&ConvertProgress::with_file(
        ConvertPhase::Converting,
        3,
        4,
        format!("Encoding {} entries...", container.len()),
    ));
    let bytes = serialize_bmg(&container)?;

    progress(&ConvertProgress::with_file(
        ConvertPhase::WritingOutput,
        4,
        4,
        "Writing BMG file...",
    ));
    std::fs::write(dest, bytes)?;

    progress(&ConvertProgress::new(ConvertPhase::Complete, 4, 4));
    tracing::info!("Conversion complete");
    Ok(())
}

/// Encode the text format straight to BMG bytes
///
/// # Errors
/// Returns an error if the text is malformed.
pub fn text_to_bmg_bytes(text: &str) -> Result<Vec<u8>> {
    let container = from_text(text)?;
    serialize_bmg(&container)
}
