//! Error types that can be emitted from this library

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

    /// file does not follow the pak container layout
    #[error(transparent)]
    #[diagnostic(transparent)]
    Format(#[from] FormatError),

    /// unable to find requested entry
    #[error("unable to find requested entry")]
    EntryNotFound(#[from] EntryNotFoundError),

    /// entry data failed validation when materialized
    #[error("entry failed validation")]
    CorruptEntry(#[from] CorruptEntryError),

    /// {0}
    #[error("{0}")]
    CustomError(String),
}

/// Errors detected while decoding the container structure.
///
/// All of these are fatal to opening the archive; none of them are
/// recoverable by reading further.
#[derive(Error, Diagnostic, Debug)]
pub enum FormatError {
    /// file is not a pak archive
    #[error("file is not a pak archive")]
    UnrecognizedSignature,

    /// pak revision is not supported
    #[error("unsupported pak version {0}")]
    UnsupportedVersion(u32),

    /// a required chunk is absent
    #[error("missing required {0} chunk")]
    MissingChunk(&'static str),

    /// the entry table ended early
    #[error("entry table is truncated: expected {expected} entries, found {found}")]
    TruncatedTable { expected: u32, found: u32 },

    /// two entries share one name
    #[error("duplicate entry name {0}")]
    DuplicateEntry(String),

    /// an entry's data range leaves the data region
    #[error("entry {0} lies outside the data region")]
    EntryOutOfBounds(String),
}

/// Error type to provide further information when a requested entry has not been found
#[derive(Error, Diagnostic, Debug)]
#[error("unable to find requested entry")]
pub enum EntryNotFoundError {
    /// at index {0}
    #[error("at index {0}")]
    Index(usize),

    /// by name {0}
    #[error("by name {0}")]
    Name(String),
}

/// Error type describing why a materialized entry failed validation.
///
/// These only surface from [`crate::read::PakArchive::read_entry`]; the
/// archive and its other entries stay usable afterwards.
#[derive(Error, Diagnostic, Debug)]
pub enum CorruptEntryError {
    /// decompressed size differs from the table
    #[error("entry {name}: expected {expected} bytes, decoded {actual}")]
    LengthMismatch {
        name: String,
        expected: u64,
        actual: u64,
    },

    /// checksum differs from the table
    #[error("entry {name}: expected crc32 {expected:#010x}, computed {actual:#010x}")]
    ChecksumMismatch {
        name: String,
        expected: u32,
        actual: u32,
    },
}

/// Generic result type with crate's Error as its error variant
pub type Result<T> = core::result::Result<T, Error>;
