//! CLI interface for format conversion
use std::path::Path;
use std::time::Instant;

use crate::cli::progress::{print_convert_progress, print_done};
use crate::converter::{
    ConvertProgress, ConvertProgressCallback, convert_bmg_to_txt_with_progress,
    convert_txt_to_bmg_with_progress,
};

/// Which way a conversion runs
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Direction {
    BmgToTxt,
    TxtToBmg,
}

pub fn execute(
    source: &Path,
    destination: &Path,
    input_format: Option<&str>,
    output_format: Option<&str>,
    quiet: bool,
) -> anyhow::Result<()> {
    let direction = detect_direction(source, destination, input_format, output_format)?;
    let progress: ConvertProgressCallback = if quiet {
        &silent
    } else {
        &print_convert_progress
    };

    if !quiet {
        println!("Converting {} to {}", source.display(), destination.display());
    }
    let start = Instant::now();

    match direction {
        Direction::BmgToTxt => convert_bmg_to_txt_with_progress(source, destination, progress)?,
        Direction::TxtToBmg => convert_txt_to_bmg_with_progress(source, destination, progress)?,
    }

    if !quiet {
        print_done(start.elapsed());
    }
    Ok(())
}

fn silent(_: &ConvertProgress) {}

/// Pick the conversion direction
///
/// Explicit formats win over extensions. A binary input or a text output
/// means BMG -> TXT; anything else is treated as TXT -> BMG.
pub fn detect_direction(
    source: &Path,
    destination: &Path,
    input_format: Option<&str>,
    output_format: Option<&str>,
) -> anyhow::Result<Direction> {
    for fmt in [input_format, output_format].into_iter().flatten() {
        if !matches!(fmt.to_lowercase().as_str(), "bmg" | "mesg" | "txt") {
            anyhow::bail!("Unsupported format '{fmt}'. Valid formats: bmg, mesg, txt");
        }
    }

    let input = format_of(source, input_format);
    let output = format_of(destination, output_format);

    let to_text = matches!(input.as_deref(), Some("bmg" | "mesg")) || output.as_deref() == Some("txt");
    Ok(if to_text {
        Direction::BmgToTxt
    } else {
        Direction::TxtToBmg
    })
}

/// Explicit format, or the lowercased file extension
fn format_of(path: &Path, explicit: Option<&str>) -> Option<String> {
    explicit.map(str::to_lowercase).or_else(|| {
        path.extension()
            .and_then(std::ffi::OsStr::to_str)
            .map(str::to_lowercase)
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn detect(source: &str, dest: &str, i: Option<&str>, o: Option<&str>) -> Direction {
        detect_direction(Path::new(source), Path::new(dest), i, o).unwrap()
    }

    #[test]
    fn test_detect_from_extensions() {
        assert_eq!(detect("msg.bmg", "msg.txt", None, None), Direction::BmgToTxt);
        assert_eq!(detect("MSG.MESG", "out", None, None), Direction::BmgToTxt);
        assert_eq!(detect("dump", "msg.txt", None, None), Direction::BmgToTxt);
        assert_eq!(detect("msg.txt", "msg.bmg", None, None), Direction::TxtToBmg);
        assert_eq!(detect("edited", "out", None, None), Direction::TxtToBmg);
    }

    #[test]
    fn test_explicit_formats_override() {
        assert_eq!(detect("a.dat", "b.dat", Some("bmg"), None), Direction::BmgToTxt);
        assert_eq!(detect("a.bmg", "b.bmg", Some("txt"), Some("BMG")), Direction::TxtToBmg);
    }

    #[test]
    fn test_unknown_format_rejected() {
        assert!(detect_direction(Path::new("a"), Path::new("b"), Some("xml"), None).is_err());
    }
}
