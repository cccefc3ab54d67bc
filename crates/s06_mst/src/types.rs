//! Base types for the structure of an MST file, plus the in-memory model.

use std::collections::HashMap;

use binrw::{BinRead, BinWrite};
use derive_more::derive::Constructor;
use widestring::{U16Str, U16String};

use crate::text;

/// Magic tag of the outer BINA container, stored big-endian regardless of
/// the table's declared endianness.
pub const BINA_MAGIC: [u8; 4] = *b"BINA";

/// Magic tag of the WTXT string-table payload.
pub const WTXT_MAGIC: [u8; 4] = *b"WTXT";

/// The only supported format version byte.
pub const MST_VERSION: u8 = b'1';

/// Maximum size of an MST file. Larger declared sizes are rejected outright.
pub const MST_MAX_FILE_SIZE: u32 = 16 * 1024 * 1024;

/// MST file header
///
/// All offsets are relative to the end of the header. Multi-byte field
/// endianness is determined by the `endianness` byte, so this struct is
/// read and written with an explicit [`binrw::Endian`].
#[derive(BinRead, BinWrite, Debug, Copy, Clone, PartialEq)]
pub struct MstHeader {
    /// Total size of the MST file
    pub file_size: u32,

    /// Start of the differential offset table
    pub doff_tbl_offset: u32,

    /// Differential offset table length
    pub doff_tbl_length: u32,

    pub unk_zero1: u32,
    pub unk_zero2: u32,
    pub unk_zero3: u16,

    /// Version byte, always `'1'`
    pub version: u8,

    /// `'B'` for big-endian, `'L'` for little-endian
    pub endianness: u8,

    /// `"BINA"`, endian-independent
    pub bina_magic: [u8; 4],

    pub unk_zero4: u32,
}

impl Default for MstHeader {
    fn default() -> Self {
        Self {
            file_size: 0,
            doff_tbl_offset: 0,
            doff_tbl_length: 0,
            unk_zero1: 0,
            unk_zero2: 0,
            unk_zero3: 0,
            version: MST_VERSION,
            endianness: b'B',
            bina_magic: BINA_MAGIC,
            unk_zero4: 0,
        }
    }
}

/// WTXT sub-header, immediately following the MST header
///
/// Offsets are relative to the start of this sub-header.
#[derive(BinRead, BinWrite, Debug, Default, Copy, Clone, PartialEq)]
pub struct WtxtHeader {
    /// `"WTXT"`, endian-independent
    pub magic: [u8; 4],

    /// Offset of the table name string
    pub name_offset: u32,

    /// Number of message records following this sub-header
    pub count: u32,
}

/// One message record in the fixed-size record array
///
/// All offsets are relative to the start of the WTXT sub-header;
/// 0 means the field is absent.
#[derive(BinRead, BinWrite, Debug, Default, Copy, Clone, PartialEq)]
pub struct MsgRecord {
    /// Offset of the message name (Shift-JIS, NUL-terminated)
    pub name_offset: u32,

    /// Offset of the message text (UTF-16, NUL-terminated)
    pub text_offset: u32,

    /// Offset of the placeholder name (Shift-JIS, NUL-terminated)
    pub placeholder_offset: u32,
}

/// One localized message: a name key and its UTF-16 body.
#[derive(Constructor, Clone, Debug, Default, PartialEq, Eq)]
pub struct StringEntry {
    /// Message identifier, used for lookup and stored as Shift-JIS on disk
    pub name: String,

    /// Message body; may be empty
    pub text: U16String,
}

/// An in-memory MST string table.
///
/// Built wholesale by [`StringTable::read_mst`] or [`StringTable::read_xml`]
/// and consumed by the matching save operations, which take `&self`.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct StringTable {
    name: String,
    big_endian: bool,
    entries: Vec<StringEntry>,
    placeholders: HashMap<usize, String>,
    lookup: HashMap<String, usize>,
    diff_tbl: Option<Vec<u8>>,
}

impl StringTable {
    /// Create an empty table with the given name and endianness.
    pub fn new(name: impl ToString, big_endian: bool) -> StringTable {
        StringTable {
            name: name.to_string(),
            big_endian,
            ..Default::default()
        }
    }

    /// Number of entries contained in this table.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Whether this table contains no entries
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// The table name.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Replace the table name.
    pub fn set_name(&mut self, name: impl ToString) {
        self.name = name.to_string();
    }

    /// Format version character. Only `'1'` exists.
    pub const fn version(&self) -> char {
        MST_VERSION as char
    }

    /// Whether multi-byte fields of the binary form are big-endian.
    pub const fn big_endian(&self) -> bool {
        self.big_endian
    }

    /// Change the endianness used when saving the binary form.
    pub fn set_big_endian(&mut self, big_endian: bool) {
        self.big_endian = big_endian;
    }

    /// Get a slice over the entries in this table, in on-disk order.
    pub fn entries(&self) -> &[StringEntry] {
        &self.entries
    }

    /// Get a contained entry by index
    pub fn by_index(&self, index: usize) -> Option<&StringEntry> {
        self.entries.get(index)
    }

    /// Search for an entry by name
    ///
    /// When the same name was written more than once, the last writer wins.
    pub fn by_name(&self, name: impl AsRef<str>) -> Option<&StringEntry> {
        self.index_of(name).and_then(|i| self.entries.get(i))
    }

    /// Get the index of an entry by name, if it's present.
    pub fn index_of(&self, name: impl AsRef<str>) -> Option<usize> {
        self.lookup.get(name.as_ref()).copied()
    }

    /// Get an entry's text as UTF-8, by index.
    pub fn text_utf8(&self, index: usize) -> Option<String> {
        self.by_index(index).map(|e| text::utf16_to_utf8(&e.text))
    }

    /// Get an entry's text as UTF-16, by index.
    pub fn text_utf16(&self, index: usize) -> Option<&U16Str> {
        self.by_index(index).map(|e| e.text.as_ustr())
    }

    /// Get the placeholder name associated with an entry, if any.
    pub fn placeholder(&self, index: usize) -> Option<&str> {
        self.placeholders.get(&index).map(String::as_str)
    }

    /// Associate a placeholder name with an entry index.
    pub fn set_placeholder(&mut self, index: usize, name: impl ToString) {
        self.placeholders.insert(index, name.to_string());
    }

    /// Drop the placeholder association for an entry index, if any.
    pub fn clear_placeholder(&mut self, index: usize) {
        self.placeholders.remove(&index);
    }

    /// Append an entry, keeping the name lookup current.
    ///
    /// A duplicate name takes over the lookup slot; the earlier entry stays
    /// addressable by index.
    pub fn push_entry(&mut self, entry: StringEntry) {
        let index = self.entries.len();
        if !entry.name.is_empty() {
            self.lookup.insert(entry.name.clone(), index);
        }
        self.entries.push(entry);
    }

    /// Place an entry at an arbitrary index, filling any hole below it with
    /// empty entries.
    ///
    /// Returns `true` when a previously named entry was displaced.
    pub fn put_entry(&mut self, index: usize, entry: StringEntry) -> bool {
        if index >= self.entries.len() {
            self.entries.resize_with(index + 1, StringEntry::default);
        }

        let displaced = !self.entries[index].name.is_empty();
        if displaced {
            self.lookup.remove(&self.entries[index].name);
        }

        if !entry.name.is_empty() {
            self.lookup.insert(entry.name.clone(), index);
        }
        self.entries[index] = entry;
        displaced
    }

    /// Raw differential offset table bytes captured from the most recent
    /// successful load, if any.
    pub fn diff_tbl(&self) -> Option<&[u8]> {
        self.diff_tbl.as_deref()
    }

    pub(crate) fn set_diff_tbl(&mut self, diff_tbl: Option<Vec<u8>>) {
        self.diff_tbl = diff_tbl;
    }
}

#[cfg(test)]
mod test {
    use std::io::Cursor;

    use binrw::{BinRead, BinWrite, Endian};
    use pretty_assertions::assert_eq;

    use widestring::U16String;

    use crate::error::Result;
    use crate::types::{MstHeader, MsgRecord, StringEntry, StringTable, WtxtHeader};

    #[test]
    fn read_big_endian_header() -> Result<()> {
        #[rustfmt::skip]
        let mut input = Cursor::new(vec![
            0x00, 0x00, 0x00, 0x48,
            0x00, 0x00, 0x00, 0x24,
            0x00, 0x00, 0x00, 0x04,
            0x00, 0x00, 0x00, 0x00,
            0x00, 0x00, 0x00, 0x00,
            0x00, 0x00,
            0x31, 0x42,
            0x42, 0x49, 0x4E, 0x41,
            0x00, 0x00, 0x00, 0x00,
        ]);

        let expected = MstHeader {
            file_size: 0x48,
            doff_tbl_offset: 0x24,
            doff_tbl_length: 0x04,
            ..Default::default()
        };

        assert_eq!(MstHeader::read_options(&mut input, Endian::Big, ())?, expected);

        Ok(())
    }

    #[test]
    fn read_little_endian_header() -> Result<()> {
        #[rustfmt::skip]
        let mut input = Cursor::new(vec![
            0x48, 0x00, 0x00, 0x00,
            0x24, 0x00, 0x00, 0x00,
            0x04, 0x00, 0x00, 0x00,
            0x00, 0x00, 0x00, 0x00,
            0x00, 0x00, 0x00, 0x00,
            0x00, 0x00,
            0x31, 0x4C,
            0x42, 0x49, 0x4E, 0x41,
            0x00, 0x00, 0x00, 0x00,
        ]);

        let expected = MstHeader {
            file_size: 0x48,
            doff_tbl_offset: 0x24,
            doff_tbl_length: 0x04,
            endianness: b'L',
            ..Default::default()
        };

        assert_eq!(
            MstHeader::read_options(&mut input, Endian::Little, ())?,
            expected
        );

        Ok(())
    }

    #[test]
    fn write_big_endian_header() -> Result<()> {
        #[rustfmt::skip]
        let expected: Vec<u8> = vec![
            0x00, 0x00, 0x00, 0x48,
            0x00, 0x00, 0x00, 0x24,
            0x00, 0x00, 0x00, 0x04,
            0x00, 0x00, 0x00, 0x00,
            0x00, 0x00, 0x00, 0x00,
            0x00, 0x00,
            0x31, 0x42,
            0x42, 0x49, 0x4E, 0x41,
            0x00, 0x00, 0x00, 0x00,
        ];

        let header = MstHeader {
            file_size: 0x48,
            doff_tbl_offset: 0x24,
            doff_tbl_length: 0x04,
            ..Default::default()
        };

        let mut actual = Vec::new();
        header.write_options(&mut Cursor::new(&mut actual), Endian::Big, ())?;

        assert_eq!(actual, expected);

        Ok(())
    }

    #[test]
    fn read_sub_header_and_record() -> Result<()> {
        #[rustfmt::skip]
        let mut input = Cursor::new(vec![
            0x57, 0x54, 0x58, 0x54,
            0x00, 0x00, 0x00, 0x1E,
            0x00, 0x00, 0x00, 0x01,

            0x00, 0x00, 0x00, 0x20,
            0x00, 0x00, 0x00, 0x18,
            0x00, 0x00, 0x00, 0x00,
        ]);

        let wtxt = WtxtHeader::read_options(&mut input, Endian::Big, ())?;
        assert_eq!(
            wtxt,
            WtxtHeader {
                magic: *b"WTXT",
                name_offset: 0x1E,
                count: 1,
            }
        );

        let record = MsgRecord::read_options(&mut input, Endian::Big, ())?;
        assert_eq!(
            record,
            MsgRecord {
                name_offset: 0x20,
                text_offset: 0x18,
                placeholder_offset: 0,
            }
        );

        Ok(())
    }

    #[test]
    fn lookup_follows_last_writer() {
        let mut table = StringTable::new("test", true);
        table.push_entry(StringEntry::new("msg".into(), U16String::from_str("first")));
        table.push_entry(StringEntry::new("msg".into(), U16String::from_str("second")));

        assert_eq!(table.len(), 2);
        assert_eq!(table.index_of("msg"), Some(1));
        assert_eq!(table.text_utf8(0).as_deref(), Some("first"));
        assert_eq!(table.by_name("msg").map(|e| e.text.to_string_lossy()),
            Some("second".to_string()));
    }

    #[test]
    fn put_entry_fills_holes() {
        let mut table = StringTable::new("test", true);
        let displaced = table.put_entry(2, StringEntry::new("c".into(), U16String::from_str("C")));

        assert!(!displaced);
        assert_eq!(table.len(), 3);
        assert_eq!(table.by_index(0), Some(&StringEntry::default()));
        assert_eq!(table.index_of("c"), Some(2));

        let displaced = table.put_entry(2, StringEntry::new("c2".into(), U16String::from_str("C2")));
        assert!(displaced);
        assert_eq!(table.index_of("c"), None);
        assert_eq!(table.index_of("c2"), Some(2));
    }
}
