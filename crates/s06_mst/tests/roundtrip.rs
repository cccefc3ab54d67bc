use std::io::Cursor;

use pretty_assertions::{assert_eq, assert_str_eq};
use tracing_test::traced_test;
use widestring::U16String;

use s06_mst::error::Result;
use s06_mst::{StringEntry, StringTable, XmlOptions};

fn entry(name: &str, text: &str) -> StringEntry {
    StringEntry::new(name.into(), U16String::from_str(text))
}

/// A table exercising every field kind: multi-line text, Japanese text,
/// an empty body, a placeholder, and a duplicated name.
fn sample_table(big_endian: bool) -> StringTable {
    let mut table = StringTable::new("msg_sample_e", big_endian);
    table.push_entry(entry("MSG_HELLO", "Hello,\nworld!"));
    table.push_entry(entry("MSG_KANJI", "こんにちは"));
    table.push_entry(entry("MSG_NO_TEXT", ""));
    table.push_entry(entry("MSG_BUTTON", "Press the button"));
    table.set_placeholder(3, "icon_a_button");
    table.push_entry(entry("MSG_HELLO", "duplicate name"));
    table
}

#[traced_test]
#[test]
fn binary_round_trip_preserves_entries() -> Result<()> {
    for big_endian in [true, false] {
        let table = sample_table(big_endian);
        let data = table.to_mst_vec()?;

        let loaded = StringTable::read_mst(Cursor::new(&data[..]))?;
        assert_eq!(loaded.name(), table.name());
        assert_eq!(loaded.big_endian(), big_endian);
        assert_eq!(loaded.entries(), table.entries());
        assert_eq!(loaded.placeholder(3), Some("icon_a_button"));
    }

    Ok(())
}

#[traced_test]
#[test]
fn xml_round_trip_preserves_entries() -> Result<()> {
    let table = sample_table(true);

    let document = table.to_xml_string(XmlOptions::default())?;
    let mut warnings = Vec::new();
    let loaded = StringTable::read_xml(&document, &mut warnings)?;

    assert!(warnings.is_empty(), "unexpected warnings: {warnings:?}");
    assert_eq!(loaded.name(), table.name());
    assert_eq!(loaded.entries(), table.entries());
    assert_eq!(loaded.placeholder(3), Some("icon_a_button"));

    Ok(())
}

#[traced_test]
#[test]
fn binary_survives_a_pass_through_xml_byte_for_byte() -> Result<()> {
    for big_endian in [true, false] {
        let original = sample_table(big_endian).to_mst_vec()?;

        let loaded = StringTable::read_mst(Cursor::new(&original[..]))?;
        let document = loaded.to_xml_string(XmlOptions::default())?;

        let mut warnings = Vec::new();
        let reloaded = StringTable::read_xml(&document, &mut warnings)?;
        assert!(warnings.is_empty(), "unexpected warnings: {warnings:?}");

        let rebuilt = reloaded.to_mst_vec()?;
        assert_str_eq!(
            format!("{:02X?}", rebuilt),
            format!("{:02X?}", original)
        );
    }

    Ok(())
}

#[traced_test]
#[test]
fn reloaded_binary_matches_entry_sequence() -> Result<()> {
    let table = sample_table(true);
    let data = table.to_mst_vec()?;
    let loaded = StringTable::read_mst(Cursor::new(data))?;

    let pairs: Vec<(String, String)> = loaded
        .entries()
        .iter()
        .map(|e| (e.name.clone(), e.text.to_string_lossy()))
        .collect();

    assert_eq!(
        pairs,
        vec![
            ("MSG_HELLO".into(), "Hello,\nworld!".into()),
            ("MSG_KANJI".into(), "こんにちは".into()),
            ("MSG_NO_TEXT".into(), String::new()),
            ("MSG_BUTTON".into(), "Press the button".into()),
            ("MSG_HELLO".into(), "duplicate name".into()),
        ]
    );

    // the duplicated name resolves to its last entry
    assert_eq!(loaded.index_of("MSG_HELLO"), Some(4));

    Ok(())
}
