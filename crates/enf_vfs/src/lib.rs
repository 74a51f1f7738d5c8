//! Session layer over *Enfusion* PAK archives.
//!
//! [`PakSession`] opens one or more archives and merges their entries into
//! a single browsable tree, with each archive's entries under a top-level
//! directory named after the archive file. Scripts found inside can be
//! parsed into [`enf_script`] models, and the whole session can be written
//! back out as loose files or a zip archive, synchronously or on a
//! background [`ExtractTask`].
//!
//! ```no_run
//! use enf_vfs::{extract_all, ExtractOptions, PakSession, SessionOptions};
//!
//! # fn doit() -> enf_vfs::Result<()> {
//! let mut session = PakSession::load(&["data.pak", "mods.pak"], SessionOptions::default())?;
//! let written = extract_all(
//!     &mut session,
//!     "unpacked".as_ref(),
//!     &ExtractOptions::builder().overwrite(true).build(),
//! )?;
//! println!("wrote {written} files");
//! # Ok(())
//! # }
//! ```

pub mod error;
pub mod extract;
pub mod session;
pub mod tree;

pub use error::{Error, Result};
pub use extract::{
    export_zip, extract_all, extract_entry, ExtractOptions, ExtractProgress, ExtractTask,
};
pub use session::{LoadedArchive, PakSession, ScriptParsing, SessionOptions};
pub use tree::{FileRef, PakNode, TreeBuilder, TreeConflict};
