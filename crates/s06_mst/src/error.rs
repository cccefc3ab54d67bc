//! Error types that can be emitted from this library
//!

use miette::Diagnostic;
use thiserror::Error;

/// Error type for library
#[derive(Error, Diagnostic, Debug)]
pub enum Error {
    /// Transparent wrapper for [`std::io::Error`]
    #[error(transparent)]
    IOError(#[from] std::io::Error),

    /// Transparent wrapper for [`binrw::Error`]
    #[error(transparent)]
    BinRWError(#[from] binrw::Error),

    /// Transparent wrapper for [`quick_xml::Error`]
    #[error(transparent)]
    XmlError(#[from] quick_xml::Error),

    /// file does not start with a BINA string table header
    #[error("file does not carry the BINA magic")]
    InvalidMagic,

    /// the WTXT sub-header is missing or corrupt
    #[error("file does not carry the WTXT sub-header magic")]
    InvalidSubMagic,

    /// only version '1' tables are supported
    #[error("unsupported MST version {0:?}")]
    UnsupportedVersion(char),

    /// the endianness byte must be 'B' or 'L'
    #[error("invalid endianness byte {0:#04x}")]
    InvalidEndianness(u8),

    /// declared file size is below the minimum for one record
    #[error("file too small ({0} bytes)")]
    FileTooSmall(u32),

    /// declared file size exceeds the 16 MiB format limit
    #[error("file too large ({0} bytes)")]
    FileTooLarge(u32),

    /// the differential offset table region exceeds the file
    #[error("differential offset table out of bounds")]
    OffsetTableBounds,

    /// an offset points past the end of the data region
    #[error("offset {offset:#x} out of bounds")]
    OffsetOutOfBounds {
        /// The offending offset, relative to the end of the MST header
        offset: u32,
    },

    /// refusing to save a table with no entries
    #[error("string table has no entries")]
    EmptyTable,

    /// an entry could not be resolved to a name during save
    #[error("entry {index} has no resolvable name")]
    UnresolvableEntry {
        /// Index of the offending entry
        index: usize,
    },

    /// the XML document is missing required structure
    #[error("{0}")]
    XmlStructure(String),
}

/// Generic result type with crate's Error as its error variant
pub type Result<T> = core::result::Result<T, Error>;
