//! Base types for structure of PAK file.

use crate::compression::CompressionMethod;
use binrw::{BinRead, BinWrite};

/// The one container revision this crate understands.
pub const PAK_VERSION: u32 = 1;

/// Checksum algorithm applied to uncompressed entry data.
pub(crate) static PAK_CRC: crc::Crc<u32> = crc::Crc::<u32>::new(&crc::CRC_32_ISO_HDLC);

/// PAK archive header, the payload of the `HEAD` chunk.
///
/// All fields are stored in little endian format. The version is fixed at 1;
/// readers reject anything else.
#[derive(BinRead, BinWrite, Debug, Copy, Clone, PartialEq, Eq)]
#[brw(little)]
pub struct PakHeader {
    /// The container revision
    pub version: u32,

    /// The number of entries stored in the file
    pub entries: u32,

    /// Reserved, written as zero
    pub reserved: u64,
}

impl PakHeader {
    /// Encoded size of the header payload.
    pub const LEN: usize = 16;
}

impl Default for PakHeader {
    fn default() -> Self {
        Self {
            version: PAK_VERSION,
            entries: 0,
            reserved: 0,
        }
    }
}

/// The fixed-size head of one entry table record.
///
/// The entry name follows the fixed part on disk, prefixed with a little
/// endian `u16` length; names are handled by the reader and writer directly
/// since their length varies per record.
#[derive(BinRead, BinWrite, Debug, Default, Copy, Clone, PartialEq)]
#[brw(little)]
pub struct PakRecord {
    /// The offset to this entry's data from the start of the `DATA` payload
    pub data_offset: u32,

    /// The size of this entry's data as stored
    pub data_stored: u32,

    /// The size of this entry's data once decompressed
    pub data_uncompressed: u32,

    /// The compression method used for this entry's data
    pub data_compression: CompressionMethod,

    /// A [`crc::CRC_32_ISO_HDLC`] checksum of the uncompressed data, zero to skip verification
    pub checksum: u32,
}

impl PakRecord {
    /// Encoded size of the fixed part, excluding the name.
    pub const LEN: usize = 20;
}
