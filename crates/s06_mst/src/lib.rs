//! This library handles reading from and creating **MST** string tables used by *Sonic '06*.
//!
//! # MST Format Documentation
//!
//! This crate provides utilities to read and rebuild the **MST** string-table format used by
//! the game *Sonic the Hedgehog (2006)*. MST files carry the localized message text for one
//! game area or menu, stored inside a BINA binary container and typically identified with the
//! `.mst` extension. The same data can be round-tripped through an `mst06` XML document for
//! translation editing, see [`StringTable::write_xml`] and [`StringTable::read_xml`].
//!
//! ## File Structure
//!
//! An MST file consists of a BINA header, a WTXT sub-header, a fixed-size record array, a
//! UTF-16 text blob, a Shift-JIS name blob, and a trailing differential offset table.
//!
//! | Offset (bytes) | Field                  | Description                                                |
//! |----------------|------------------------|------------------------------------------------------------|
//! | 0x0000         | File Size              | 4 bytes: Total size of the MST file                        |
//! | 0x0004         | Offset Table Offset    | 4 bytes: Start of the differential offset table            |
//! | 0x0008         | Offset Table Length    | 4 bytes: Length of the differential offset table           |
//! | 0x000C         | Reserved               | 10 bytes: Zero                                             |
//! | 0x0016         | Version                | 1 byte: ASCII `'1'`                                        |
//! | 0x0017         | Endianness             | 1 byte: `'B'` (big-endian) or `'L'` (little-endian)        |
//! | 0x0018         | Magic number           | 4 bytes: "BINA"                                            |
//! | 0x001C         | Reserved               | 4 bytes: Zero                                              |
//!
//! ### Header
//!
//! - **Magic Number**: The 4-byte tag `"BINA"` identifying the container family. Unlike the
//!   size fields it is a byte sequence, not an integer, so it never byte-swaps.
//! - **Version**: A single ASCII character; only `'1'` exists.
//! - **Endianness**: Governs every multi-byte integer in the file. Console releases are
//!   big-endian.
//! - **Offset Table Offset/Length**: Locate the differential offset table. Both are relative
//!   to the end of this header, and the table is 4-byte aligned at both ends.
//!
//! All offsets everywhere else in the file are relative to the end of the header as well.
//!
//! ### WTXT Sub-Header and Record Array
//!
//! | Offset (bytes) | Field                  | Description                                             |
//! |----------------|------------------------|---------------------------------------------------------|
//! | 0x0000         | Magic number           | 4 bytes: "WTXT"                                         |
//! | 0x0004         | Name Offset            | 4 bytes: Offset of the table's own name                 |
//! | 0x0008         | Record Count           | 4 bytes: Number of message records                      |
//!
//! Each record is three 4-byte offsets: message name, message text, and an optional
//! placeholder name (an icon/tag reference). A zero offset means the field is absent.
//!
//! ### Blobs
//!
//! Message names and placeholder names are NUL-terminated Shift-JIS strings, deduplicated
//! whole: identical strings are stored once and shared by every record that uses them.
//! Message text is NUL-terminated UTF-16 in the file's endianness.
//!
//! ### Differential Offset Table
//!
//! A compact relocation map: a walk of deltas locating every offset field in the file, used
//! by the game when rebasing the file in memory. See [`offsets`] for the exact byte forms.
//! Because a loaded file's table is not guaranteed to be reproducible from the documented
//! rules alone, [`StringTable`] retains the captured bytes and re-emits them verbatim when
//! the record layout is unchanged.
//!
//! ## Additional Information
//!
//! - **File Extension**: `.mst`
//! - **Maximum Size**: 16 MiB
//! - **Text Encodings**: Shift-JIS (names), UTF-16 (message text)
//!

pub mod error;
pub mod escape;
pub mod offsets;
pub mod read;
pub mod text;
pub mod types;
pub mod write;
pub mod xml;

#[cfg(feature = "serde")]
mod serde;

pub use types::{StringEntry, StringTable};
pub use xml::{Indent, XmlOptions};
