//! Types for reading MST string tables
//!

use std::io::{Cursor, Read, Seek, SeekFrom};

use binrw::{BinRead, Endian};
use byteorder::{BigEndian, ByteOrder, LittleEndian};
use tracing::{instrument, warn};
use widestring::U16String;

use crate::error::{Error, Result};
use crate::offsets;
use crate::text;
use crate::types::{
    MsgRecord, MstHeader, StringEntry, StringTable, WtxtHeader, BINA_MAGIC, MST_MAX_FILE_SIZE,
    MST_VERSION, WTXT_MAGIC,
};

/// Size of the fixed MST header, in bytes.
pub const HEADER_SIZE: usize = 32;

/// Size of the WTXT sub-header, in bytes.
pub const SUB_HEADER_SIZE: usize = 12;

/// Size of one message record, in bytes.
pub const RECORD_SIZE: usize = 12;

impl StringTable {
    /// Read an MST file and parse its entries.
    ///
    /// The reader may sit anywhere in the stream; all offsets in the file
    /// are absolute, so parsing restarts from the top.
    ///
    /// A record with an out-of-bounds pointer stops the scan: the entries
    /// read so far are kept and a warning is logged, which is how files in
    /// the wild with short record counts have always been treated.
    #[instrument(skip(reader), err)]
    pub fn read_mst<R: Read + Seek>(mut reader: R) -> Result<StringTable> {
        let mut raw_header = [0u8; HEADER_SIZE];
        reader.read_exact(&mut raw_header)?;

        if raw_header[0x18..0x1C] != BINA_MAGIC {
            return Err(Error::InvalidMagic);
        }
        if raw_header[0x16] != MST_VERSION {
            return Err(Error::UnsupportedVersion(raw_header[0x16] as char));
        }
        let endian = match raw_header[0x17] {
            b'B' => Endian::Big,
            b'L' => Endian::Little,
            other => return Err(Error::InvalidEndianness(other)),
        };
        let big_endian = endian == Endian::Big;

        let header = MstHeader::read_options(&mut Cursor::new(&raw_header[..]), endian, ())?;

        let min_size = (HEADER_SIZE + SUB_HEADER_SIZE + RECORD_SIZE) as u32;
        if header.file_size < min_size {
            return Err(Error::FileTooSmall(header.file_size));
        }
        if header.file_size > MST_MAX_FILE_SIZE {
            return Err(Error::FileTooLarge(header.file_size));
        }
        if HEADER_SIZE as u64 + u64::from(header.doff_tbl_offset) + u64::from(header.doff_tbl_length)
            > u64::from(header.file_size)
        {
            return Err(Error::OffsetTableBounds);
        }

        reader.seek(SeekFrom::Start(0))?;
        let mut data = vec![0u8; header.file_size as usize];
        reader.read_exact(&mut data)?;

        // Every offset in the file is relative to the end of the MST header.
        let region = &data[HEADER_SIZE..];

        let wtxt = WtxtHeader::read_options(&mut Cursor::new(region), endian, ())?;
        if wtxt.magic != WTXT_MAGIC {
            return Err(Error::InvalidSubMagic);
        }

        let mut table = StringTable::new("", big_endian);

        // The first name in the name blob is the table's own.
        match read_name(region, wtxt.name_offset) {
            Some(name) => table.set_name(name),
            None => warn!(
                offset = wtxt.name_offset,
                "table name offset out of bounds, leaving the table name empty"
            ),
        }

        let mut cursor = Cursor::new(region);
        cursor.set_position(SUB_HEADER_SIZE as u64);
        for index in 0..wtxt.count as usize {
            if SUB_HEADER_SIZE + (index + 1) * RECORD_SIZE > region.len() {
                warn!(index, kept = table.len(), "record array truncated, stopping the scan");
                break;
            }
            let record = MsgRecord::read_options(&mut cursor, endian, ())?;

            let Some(name) = read_name(region, record.name_offset) else {
                warn!(
                    index,
                    offset = record.name_offset,
                    kept = table.len(),
                    "message name out of bounds, stopping the scan"
                );
                break;
            };

            // A text offset that lands in the name blob marks a record
            // with no message body.
            let text = if record.text_offset == 0 || record.text_offset >= wtxt.name_offset {
                U16String::new()
            } else {
                match read_text(region, record.text_offset, big_endian) {
                    Some(text) => text,
                    None => {
                        warn!(
                            index,
                            offset = record.text_offset,
                            kept = table.len(),
                            "message text out of bounds, stopping the scan"
                        );
                        break;
                    }
                }
            };

            if record.placeholder_offset != 0 {
                match read_name(region, record.placeholder_offset) {
                    Some(placeholder) => table.set_placeholder(index, placeholder),
                    None => {
                        warn!(
                            index,
                            offset = record.placeholder_offset,
                            kept = table.len(),
                            "placeholder name out of bounds, stopping the scan"
                        );
                        break;
                    }
                }
            }

            table.push_entry(StringEntry::new(name, text));
        }

        let diff =
            &region[header.doff_tbl_offset as usize..][..header.doff_tbl_length as usize];
        match offsets::decode_offsets(diff, region, big_endian) {
            Ok(_) => table.set_diff_tbl(Some(diff.to_vec())),
            Err(err) => warn!(%err, "discarding undecodable differential offset table"),
        }

        Ok(table)
    }
}

/// Resolve a NUL-terminated Shift-JIS string inside the data region.
///
/// Returns `None` when the offset itself is out of bounds; a string
/// running to the end of the region without a terminator is accepted.
fn read_name(region: &[u8], offset: u32) -> Option<String> {
    let bytes = region.get(offset as usize..)?;
    let len = bytes.iter().position(|&b| b == 0).unwrap_or(bytes.len());
    Some(text::decode_cpn(text::CP_SJIS, &bytes[..len]))
}

/// Resolve a NUL-terminated UTF-16 string in file endianness.
fn read_text(region: &[u8], offset: u32, big_endian: bool) -> Option<U16String> {
    let mut pos = offset as usize;
    if pos >= region.len() {
        return None;
    }

    let mut units = Vec::new();
    while pos + 2 <= region.len() {
        let word = &region[pos..pos + 2];
        let unit = if big_endian {
            BigEndian::read_u16(word)
        } else {
            LittleEndian::read_u16(word)
        };
        pos += 2;
        if unit == 0 {
            break;
        }
        units.push(unit);
    }
    Some(U16String::from_vec(units))
}
