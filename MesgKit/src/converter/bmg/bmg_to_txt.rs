//! BMG to decoded text conversion

use std::path::Path;

use crate::converter::{ConvertPhase, ConvertProgress, ConvertProgressCallback};
use crate::error::Result;
use crate::formats::bmg::{parse_bmg_bytes, to_text};

/// Convert a .bmg file to the decoded text format
///
/// # Errors
/// Returns an error if reading, decoding or writing fails.
pub fn convert_bmg_to_txt<P: AsRef<Path>>(source: P, dest: P) -> Result<()> {
    convert_bmg_to_txt_with_progress(source, dest, &|_| {})
}

/// Convert a .bmg file to the decoded text format with progress callback
///
/// The destination is only written once the whole container has been
/// decoded and rendered.
///
/// # Errors
/// Returns an error if reading, decoding or writing fails.
pub fn convert_bmg_to_txt_with_progress<P: AsRef<Path>>(
    source: P,
    dest: P,
    progress: ConvertProgressCallback,
) -> Result<()> {
    tracing::info!(
        "Converting BMG→TXT: {:?} → {:?}",
        source.as_ref(),
        dest.as_ref()
    );

    progress(&ConvertProgress::with_file(
        ConvertPhase::ReadingSource,
        1,
        4,
        "Reading BMG file...",
    ));
    let data = std::fs::read(&source)?;

    progress(&ConvertProgress::with_file(
        ConvertPhase::Parsing,
        2,
        4,
        format!("Parsing {} bytes...", data.len()),
    ));
    let container = parse_bmg_bytes(&data)?;

    progress(&ConvertProgress::with_file(
        ConvertPhase::Converting,
        3,
        4,
        format!("Rendering {} entries as text...", container.len()),
    ));
    let text = to_text(&container)?;

    progress(&ConvertProgress::with_file(
        ConvertPhase::WritingOutput,
        4,
        4,
        "Writing text file...",
    ));
    std::fs::write(dest, text)?;

    progress(&ConvertProgress::new(ConvertPhase::Complete, 4, 4));
    tracing::info!("Conversion complete");
    Ok(())
}

/// Decode BMG bytes straight to the text format
///
/// # Errors
/// Returns an error if the bytes are not a valid container.
pub fn bmg_to_text_string(data: &[u8]) -> Result<String> {
    let container = parse_bmg_bytes(data)?;
    to_text(&container)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::formats::bmg::{MessageContainer, MessageEntry, serialize_bmg};
    use std::cell::RefCell;

    #[test]
    fn test_bmg_to_text_string() {
        let mut container = MessageContainer::new(true);
        container
            .entries
            .push(MessageEntry::new("Hi {1a:0002:ff}", vec![0, 1], Some(3)));
        let bytes = serialize_bmg(&container).unwrap();

        assert_eq!(
            bmg_to_text_string(&bytes).unwrap(),
            "BMG decoded text file\ne=2 mid=True\n3;0001; Hi {1a:0002:ff}\n"
        );
    }

    #[test]
    fn test_progress_phases() {
        let dir = tempfile::tempdir().unwrap();
        let source = dir.path().join("msg.bmg");
        let dest = dir.path().join("msg.txt");

        let mut container = MessageContainer::new(false);
        container.entries.push(MessageEntry::new("One", vec![], None));
        std::fs::write(&source, serialize_bmg(&container).unwrap()).unwrap();

        let phases = RefCell::new(Vec::new());
        convert_bmg_to_txt_with_progress(&source, &dest, &|p| phases.borrow_mut().push(p.phase))
            .unwrap();

        assert_eq!(
            phases.into_inner(),
            vec![
                ConvertPhase::ReadingSource,
                ConvertPhase::Parsing,
                ConvertPhase::Converting,
                ConvertPhase::WritingOutput,
                ConvertPhase::Complete,
            ]
        );
        assert!(std::fs::read_to_string(&dest).unwrap().ends_with("x;; One\n"));
    }

    #[test]
    fn test_bad_source_leaves_no_output() {
        let dir = tempfile::tempdir().unwrap();
        let source = dir.path().join("broken.bmg");
        let dest = dir.path().join("broken.txt");
        std::fs::write(&source, b"MESGbmg2 not really").unwrap();

        assert!(convert_bmg_to_txt(&source, &dest).is_err());
        assert!(!dest.exists());
    }
}
