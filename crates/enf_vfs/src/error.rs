//! Error types that can be emitted from this library

use std::path::PathBuf;

use miette::Diagnostic;
use thiserror::Error;

/// Error type for library
#[derive(Error, Diagnostic, Debug)]
pub enum Error {
    /// Transparent wrapper for [`std::io::Error`]
    #[error(transparent)]
    IOError(#[from] std::io::Error),

    /// Transparent wrapper for [`enf_pak::error::Error`]
    #[error(transparent)]
    Pak(#[from] enf_pak::error::Error),

    /// an archive could not be loaded into the session
    #[error("failed to load archive `{}`", .path.display())]
    Archive {
        path: PathBuf,
        #[source]
        source: enf_pak::error::Error,
    },

    /// Transparent wrapper for [`zip::result::ZipError`]
    #[error(transparent)]
    Zip(#[from] zip::result::ZipError),

    /// refusing to replace an existing file without `overwrite`
    #[error("destination `{}` already exists", .0.display())]
    DestinationExists(PathBuf),

    /// the cancellation flag was raised between entries
    #[error("cancelled after writing {written} entries")]
    Cancelled { written: usize },
}

/// Generic result type with crate's Error as its error variant
pub type Result<T> = core::result::Result<T, Error>;
