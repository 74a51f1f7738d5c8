//! This library handles reading from and creating **PAK** files used by *Enfusion* engine titles.
//!
//! # PAK Archive Format Documentation
//!
//! This crate provides utilities to read and extract data from the **PAK** archive format used by
//! games built on the *Enfusion* engine. A PAK file is an IFF-style container: a single `FORM`
//! group whose payload is a sequence of tagged chunks. PAK files are typically identified with
//! the `.pak` extension.
//!
//! ## File Structure
//!
//! | Offset (bytes) | Field                  | Description                                                |
//! |----------------|------------------------|------------------------------------------------------------|
//! | 0x0000         | Group identifier       | 4 bytes: `"FORM"`                                          |
//! | 0x0004         | Group size             | 4 bytes, big endian: size of everything after this field   |
//! | 0x0008         | Form type              | 4 bytes: `"PAC1"` (PAK container, revision 1)              |
//! | 0x000C         | Chunks                 | Sequence of chunks until the group size is consumed        |
//!
//! Each chunk is a 4-byte ASCII identifier followed by a 4-byte big endian payload size and the
//! payload itself. Chunk framing follows the IFF convention (sizes big endian); all integers
//! *inside* chunk payloads are little endian. A well-formed archive carries these chunks, in
//! file order:
//!
//! ### `HEAD` — archive header
//!
//! | Offset (bytes) | Field                  | Description                                             |
//! |----------------|------------------------|---------------------------------------------------------|
//! | 0x0000         | Version                | 4 bytes: format version, fixed value 1                  |
//! | 0x0004         | Entry Count            | 4 bytes: number of entries in the archive               |
//! | 0x0008         | Reserved               | 8 bytes: zero                                           |
//!
//! ### `DATA` — data region
//!
//! The raw bytes of every entry, stored back to back. Entries may be stored as-is or
//! zlib-compressed; each entry's record states which. Entry offsets are relative to the start
//! of this chunk's payload.
//!
//! ### `FILE` — entry table
//!
//! `Entry Count` records, stored back to back. Each record:
//!
//! | Offset (bytes) | Field                  | Description                                             |
//! |----------------|------------------------|---------------------------------------------------------|
//! | 0x0000         | Data Offset            | 4 bytes: offset of the entry data within `DATA`         |
//! | 0x0004         | Stored Size            | 4 bytes: size of the entry data as stored               |
//! | 0x0008         | Uncompressed Size      | 4 bytes: size of the entry data once decompressed       |
//! | 0x000C         | Compression            | 4 bytes: compression method for the entry data         |
//! | 0x0010         | CRC32                  | 4 bytes: CRC-32 checksum of the uncompressed data       |
//! | 0x0014         | Name Length            | 2 bytes: length of the entry name in bytes              |
//! | 0x0016         | Name                   | UTF-8 entry path, `/`-separated, no terminator          |
//!
//! - **Compression**: `0` stores the data as-is, `2` compresses it with zlib.
//! - **CRC32**: a [`crc::CRC_32_ISO_HDLC`] checksum of the uncompressed entry data. A stored
//!   value of zero disables verification for that entry.
//! - **Name**: entry paths use `/` as the separator and never begin with one.
//!
//! ## Additional Information
//!
//! - **File Extension**: `.pak`
//! - **Endianness**: big endian for the IFF framing, little endian for chunk payloads
//! - **Compression Methods**:
//!   - `0`: None (no compression)
//!   - `2`: Zlib (compressed with Zlib)
//!

pub mod chunk;
pub mod compression;
pub mod error;
pub mod read;
pub mod types;
pub mod write;

pub use compression::CompressionMethod;
pub use read::PakArchive;
pub use write::PakWriter;
