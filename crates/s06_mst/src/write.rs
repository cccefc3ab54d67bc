//! Types for writing MST string tables
//!

use std::collections::HashMap;
use std::io::{Cursor, Write};

use binrw::{BinWrite, Endian};
use byteorder::{BigEndian, LittleEndian, WriteBytesExt};
use tracing::{instrument, warn};

use crate::error::{Error, Result};
use crate::offsets;
use crate::read::{HEADER_SIZE, RECORD_SIZE, SUB_HEADER_SIZE};
use crate::text;
use crate::types::{
    MsgRecord, MstHeader, StringTable, WtxtHeader, MST_MAX_FILE_SIZE, WTXT_MAGIC,
};

/// Name written for a table that has none; the file format requires the
/// first name-blob string to exist.
const GENERIC_TABLE_NAME: &str = "mst06";

/// Accumulates the Shift-JIS name blob, deduplicating whole strings.
#[derive(Default)]
struct NameBlob {
    bytes: Vec<u8>,
    dedup: HashMap<String, u32>,
}

impl NameBlob {
    /// Look up or append a name, returning its offset within the blob.
    fn insert(&mut self, name: &str) -> u32 {
        if let Some(&offset) = self.dedup.get(name) {
            return offset;
        }
        let offset = self.bytes.len() as u32;
        self.bytes
            .extend_from_slice(&text::encode_cpn(text::CP_SJIS, name));
        self.bytes.push(0);
        self.dedup.insert(name.to_owned(), offset);
        offset
    }
}

/// A record before its offsets are rebased onto the blob bases.
struct PendingRecord {
    name: u32,
    text: Option<u32>,
    placeholder: Option<u32>,
}

impl StringTable {
    /// Serialize the table into MST form and hand the bytes to a writer.
    #[instrument(skip_all, err)]
    pub fn write_mst<W: Write>(&self, mut writer: W) -> Result<()> {
        let data = self.to_mst_vec()?;
        writer.write_all(&data)?;
        writer.flush()?;
        Ok(())
    }

    /// Serialize the table into an in-memory MST image.
    pub fn to_mst_vec(&self) -> Result<Vec<u8>> {
        if self.is_empty() {
            return Err(Error::EmptyTable);
        }
        let endian = if self.big_endian() {
            Endian::Big
        } else {
            Endian::Little
        };

        let mut names = NameBlob::default();
        let mut text_blob: Vec<u8> = Vec::new();

        let table_name = if self.name().is_empty() {
            GENERIC_TABLE_NAME
        } else {
            self.name()
        };
        let table_name_offset = names.insert(table_name);

        let mut records: Vec<PendingRecord> = Vec::with_capacity(self.len());
        for (index, entry) in self.entries().iter().enumerate() {
            let name = if entry.name.is_empty() {
                names.insert(&format!("XXX_MSG_{index}"))
            } else {
                names.insert(&entry.name)
            };

            let text = if entry.text.is_empty() {
                None
            } else {
                let offset = text_blob.len() as u32;
                for &unit in entry.text.as_slice().iter().chain(&[0u16]) {
                    if self.big_endian() {
                        text_blob.write_u16::<BigEndian>(unit)?;
                    } else {
                        text_blob.write_u16::<LittleEndian>(unit)?;
                    }
                }
                Some(offset)
            };

            let placeholder = self.placeholder(index).map(|p| names.insert(p));

            // Every record must carry a name; insert() always yields one,
            // so this only trips on blob bookkeeping gone wrong.
            if names.bytes.get(name as usize).is_none() {
                return Err(Error::UnresolvableEntry { index });
            }

            records.push(PendingRecord {
                name,
                text,
                placeholder,
            });
        }

        let text_base = (SUB_HEADER_SIZE + self.len() * RECORD_SIZE) as u32;
        let name_base = text_base + text_blob.len() as u32;

        // Positions of every present offset field, relative to the end of
        // the MST header; these are what the differential table relocates.
        let mut positions: Vec<u32> = Vec::with_capacity(1 + self.len() * 3);
        positions.push(4);
        for (index, record) in records.iter().enumerate() {
            let base = (SUB_HEADER_SIZE + index * RECORD_SIZE) as u32;
            positions.push(base);
            if record.text.is_some() {
                positions.push(base + 4);
            }
            if record.placeholder.is_some() {
                positions.push(base + 8);
            }
        }

        let mut diff_tbl = offsets::encode_positions(&positions);
        if let Some(raw) = self.diff_tbl() {
            // A captured table that still matches the record layout is
            // re-emitted verbatim, byte padding included.
            if offsets::decode_positions(raw) == positions {
                diff_tbl = raw.to_vec();
            } else {
                warn!("captured differential offset table no longer matches the layout, re-encoding");
            }
        }
        while diff_tbl.len() % 4 != 0 {
            diff_tbl.push(0);
        }

        let unpadded_len = name_base as usize + names.bytes.len();
        let doff_offset = (unpadded_len + 3) & !3;
        let file_size = HEADER_SIZE + doff_offset + diff_tbl.len();
        if file_size > MST_MAX_FILE_SIZE as usize {
            return Err(Error::FileTooLarge(file_size as u32));
        }

        let header = MstHeader {
            file_size: file_size as u32,
            doff_tbl_offset: doff_offset as u32,
            doff_tbl_length: diff_tbl.len() as u32,
            endianness: if self.big_endian() { b'B' } else { b'L' },
            ..Default::default()
        };
        let wtxt = WtxtHeader {
            magic: WTXT_MAGIC,
            name_offset: name_base + table_name_offset,
            count: self.len() as u32,
        };

        let mut out = Cursor::new(Vec::with_capacity(file_size));
        header.write_options(&mut out, endian, ())?;
        wtxt.write_options(&mut out, endian, ())?;
        for record in &records {
            let record = MsgRecord {
                name_offset: name_base + record.name,
                text_offset: record.text.map_or(0, |offset| text_base + offset),
                placeholder_offset: record.placeholder.map_or(0, |offset| name_base + offset),
            };
            record.write_options(&mut out, endian, ())?;
        }

        let mut data = out.into_inner();
        data.extend_from_slice(&text_blob);
        data.extend_from_slice(&names.bytes);
        data.resize(HEADER_SIZE + doff_offset, 0);
        data.extend_from_slice(&diff_tbl);
        debug_assert_eq!(data.len(), file_size);

        Ok(data)
    }
}
