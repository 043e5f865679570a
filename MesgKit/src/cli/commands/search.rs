//! CLI command for searching message text

use std::path::Path;

use crate::formats::bmg::{MessageContainer, MessageEntry, read_bmg, read_bmg_text};

/// Longest preview printed per match, in characters
const PREVIEW_CHARS: usize = 80;

/// Search entries of a .bmg or decoded .txt file by text content
pub fn execute(path: &Path, query: &str, limit: usize, quiet: bool) -> anyhow::Result<()> {
    let container = load(path)?;
    let matches: Vec<_> = container.search(query).into_iter().take(limit).collect();

    if matches.is_empty() {
        if !quiet {
            println!("No entries found containing '{query}'");
        }
        return Ok(());
    }

    if !quiet {
        println!("Found {} entries containing '{}':", matches.len(), query);
        println!();
    }
    for (index, entry) in &matches {
        println!("{}", label(*index, entry));
        if !quiet {
            println!("  {}", preview(&entry.text));
        }
    }

    Ok(())
}

/// Decoded text files are recognized by extension; everything else is binary
fn load(path: &Path) -> crate::error::Result<MessageContainer> {
    let is_text = path
        .extension()
        .and_then(std::ffi::OsStr::to_str)
        .is_some_and(|ext| ext.eq_ignore_ascii_case("txt"));
    if is_text {
        read_bmg_text(path)
    } else {
        read_bmg(path)
    }
}

/// Message id if present, otherwise the entry index
fn label(index: usize, entry: &MessageEntry) -> String {
    match entry.id {
        Some(id) => format!("id {id}"),
        None => format!("#{index}"),
    }
}

/// Truncate long text for display
fn preview(text: &str) -> String {
    if text.chars().count() > PREVIEW_CHARS {
        let head: String = text.chars().take(PREVIEW_CHARS - 3).collect();
        format!("{head}...")
    } else {
        text.to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_label() {
        assert_eq!(label(3, &MessageEntry::new("", vec![], Some(12))), "id 12");
        assert_eq!(label(3, &MessageEntry::new("", vec![], None)), "#3");
    }

    #[test]
    fn test_preview_truncates_on_chars() {
        assert_eq!(preview("short"), "short");
        let long = "é".repeat(100);
        let shown = preview(&long);
        assert_eq!(shown.chars().count(), PREVIEW_CHARS);
        assert!(shown.ends_with("..."));
    }

    #[test]
    fn test_load_by_extension() {
        let dir = tempfile::tempdir().unwrap();
        let txt = dir.path().join("msg.TXT");
        std::fs::write(&txt, "BMG decoded text file\ne=2 mid=False\nx;; Found me\n").unwrap();
        let container = load(&txt).unwrap();
        assert_eq!(container.search("found").len(), 1);

        // Not a BMG file
        assert!(load(&dir.path().join("missing.bmg")).is_err());
    }
}
