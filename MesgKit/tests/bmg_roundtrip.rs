use mesgkit::converter::{
    bmg_to_text_string, convert_bmg_to_txt, convert_txt_to_bmg, text_to_bmg_bytes,
};
use mesgkit::prelude::*;
use pretty_assertions::assert_eq;
use tempfile::tempdir;

fn sample(has_ids: bool) -> MessageContainer {
    let id = |n| has_ids.then_some(n);
    MessageContainer {
        encoding: StringEncoding::Utf16,
        has_ids,
        entries: vec![
            MessageEntry::new("Hello", vec![0x00, 0x11, 0x22, 0x33], id(5)),
            MessageEntry::new(r"Hi\n{0a:0001} end", vec![0x01, 0x00, 0x00, 0x00], id(6)),
            MessageEntry::new("Ünïcödé 日本語 🎮", vec![0xFF, 0xFF, 0xFF, 0xFF], id(7)),
            MessageEntry::new(r"Braces \{kept\} and \\ too", vec![0; 4], id(8)),
            MessageEntry::new("", vec![0x12, 0x34, 0x56, 0x78], id(9)),
        ],
    }
}

#[test]
fn test_binary_roundtrip() {
    for has_ids in [false, true] {
        let container = sample(has_ids);
        let bytes = serialize_bmg(&container).unwrap();
        assert_eq!(parse_bmg_bytes(&bytes).unwrap(), container);
    }
}

#[test]
fn test_text_roundtrip() {
    for has_ids in [false, true] {
        let container = sample(has_ids);
        let text = to_text(&container).unwrap();
        assert_eq!(from_text(&text).unwrap(), container);
    }
}

#[test]
fn test_entry_rendering() {
    let text = to_text(&sample(true)).unwrap();
    let lines: Vec<&str> = text.lines().collect();
    assert_eq!(lines[0], "BMG decoded text file");
    assert_eq!(lines[1], "e=2 mid=True");
    assert_eq!(lines[2], "5;00112233; Hello");
    assert_eq!(lines[3], r"6;01000000; Hi\n{0a:0001} end");

    let text = to_text(&sample(false)).unwrap();
    assert!(text.lines().skip(2).all(|line| line.starts_with("x;")));
}

#[test]
fn test_escape_record_bytes() {
    let raw = encode_string("A{0a:0034:0102}").unwrap();
    assert_eq!(
        raw,
        vec![0x00, b'A', 0x00, 0x1A, 0x08, 0x0A, 0x00, 0x34, 0x01, 0x02, 0x00, 0x00]
    );

    let (text, _) = decode_string(&raw, 0).unwrap();
    assert_eq!(text, "A{0a:0034:0102}");
}

#[test]
fn test_info_length_mismatch_rejected() {
    let mut container = sample(false);
    container.entries[2].info = vec![1, 2];
    assert!(matches!(
        serialize_bmg(&container),
        Err(Error::InfoLengthMismatch { index: 2, .. })
    ));
}

#[test]
fn test_mid_false_with_numeric_id_rejected() {
    let input = "BMG decoded text file\ne=2 mid=False\nx;00; fine\n12;00; numbered\n";
    assert!(matches!(
        from_text(input),
        Err(Error::IdConsistency { line: 4, has_ids: false })
    ));
}

#[test]
fn test_in_memory_converters() {
    let bytes = serialize_bmg(&sample(true)).unwrap();
    let text = bmg_to_text_string(&bytes).unwrap();
    assert_eq!(text_to_bmg_bytes(&text).unwrap(), bytes);
}

#[test]
fn test_file_helpers() {
    let dir = tempdir().unwrap();
    let bmg_path = dir.path().join("message.bmg");
    let txt_path = dir.path().join("message.txt");
    let container = sample(true);

    write_bmg(&bmg_path, &container).unwrap();
    assert_eq!(read_bmg(&bmg_path).unwrap(), container);

    write_bmg_text(&txt_path, &container).unwrap();
    assert_eq!(read_bmg_text(&txt_path).unwrap(), container);
}

#[test]
fn test_convert_files_both_ways() {
    let dir = tempdir().unwrap();
    let original = dir.path().join("original.bmg");
    let decoded = dir.path().join("decoded.txt");
    let rebuilt = dir.path().join("rebuilt.bmg");

    let bytes = serialize_bmg(&sample(false)).unwrap();
    std::fs::write(&original, &bytes).unwrap();

    convert_bmg_to_txt(&original, &decoded).unwrap();
    convert_txt_to_bmg(&decoded, &rebuilt).unwrap();

    assert_eq!(std::fs::read(&rebuilt).unwrap(), bytes);
}

#[test]
fn test_edited_text_rebuilds() {
    let dir = tempdir().unwrap();
    let decoded = dir.path().join("decoded.txt");
    let rebuilt = dir.path().join("rebuilt.bmg");

    let mut text = to_text(&sample(true)).unwrap();
    text = text.replace("5;00112233; Hello", "5;00112233; Goodbye{1a:0002:ff}");
    std::fs::write(&decoded, text).unwrap();

    convert_txt_to_bmg(&decoded, &rebuilt).unwrap();
    let container = read_bmg(&rebuilt).unwrap();
    assert_eq!(container.find_by_id(5).unwrap().text, "Goodbye{1a:0002:ff}");
    assert_eq!(container.len(), 5);
}

#[test]
fn test_truncated_file_rejected() {
    let bytes = serialize_bmg(&sample(true)).unwrap();
    for len in [0, 4, 0x1F, 0x28, bytes.len() - 1] {
        assert!(parse_bmg_bytes(&bytes[..len]).is_err(), "length {len} should fail");
    }
}

#[test]
fn test_carriage_return_survives_text_form() {
    let mut container = MessageContainer::new(false);
    container
        .entries
        .push(MessageEntry::new(r"ends with cr\r", vec![0xAA], None));
    container
        .entries
        .push(MessageEntry::new(r"\r\nmixed\r\n", vec![0xBB], None));
    let bytes = serialize_bmg(&container).unwrap();

    let text = bmg_to_text_string(&bytes).unwrap();
    assert_eq!(text.lines().count(), 4);
    assert_eq!(text_to_bmg_bytes(&text).unwrap(), bytes);
}
