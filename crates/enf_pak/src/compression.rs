//! Entry compression and decompression handling.

use std::fmt;
use std::io::{self, Read, Seek, Write};

use binrw::{BinRead, BinWrite};
use flate2::{read::ZlibDecoder, write::ZlibEncoder, Compression};
use tracing::instrument;

use crate::error::Result;

/// Identifies the storage format used for an entry inside the PAK file
///
/// When creating PAK files, the default method for new entries is chosen via
/// [`crate::write::PakWriterOptions`] and can be overridden per entry with
/// [`crate::write::PakWriter::start_entry_with`].
#[derive(BinRead, BinWrite, Debug, Copy, Clone, Default, PartialEq, Eq)]
#[brw(repr=u32)]
pub enum CompressionMethod {
    /// Stores the data as it is
    None = 0,

    /// Compress the data using Zlib
    #[default]
    Zlib = 2,
}

impl fmt::Display for CompressionMethod {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            CompressionMethod::None => write!(f, "none"),
            CompressionMethod::Zlib => write!(f, "zlib"),
        }
    }
}

pub(crate) enum PakBlockReader<'a, R: Read + Seek> {
    Raw(io::Take<&'a mut R>),
    Compressed(Box<ZlibDecoder<io::Take<&'a mut R>>>),
}

impl<'a, R: Read + Seek> PakBlockReader<'a, R> {
    #[tracing::instrument(skip(reader))]
    pub fn new(
        reader: &'a mut R,
        start: u64,
        limit: u64,
        compression: CompressionMethod,
    ) -> Result<Self> {
        reader.seek(io::SeekFrom::Start(start))?;

        let limit_reader = reader.by_ref().take(limit);
        Ok(match compression {
            CompressionMethod::None => PakBlockReader::Raw(limit_reader),
            CompressionMethod::Zlib => {
                PakBlockReader::Compressed(Box::new(ZlibDecoder::new(limit_reader)))
            }
        })
    }
}

impl<R: Read + Seek> Read for PakBlockReader<'_, R> {
    #[instrument(skip(self), err)]
    fn read(&mut self, buf: &mut [u8]) -> io::Result<usize> {
        match self {
            PakBlockReader::Raw(r) => r.read(buf),
            PakBlockReader::Compressed(r) => r.read(buf),
        }
    }

    #[instrument(skip(self), err)]
    fn read_exact(&mut self, buf: &mut [u8]) -> io::Result<()> {
        match self {
            PakBlockReader::Raw(r) => r.read_exact(buf),
            PakBlockReader::Compressed(r) => r.read_exact(buf),
        }
    }

    #[instrument(skip(self), err)]
    fn read_to_end(&mut self, buf: &mut Vec<u8>) -> io::Result<usize> {
        match self {
            PakBlockReader::Raw(r) => r.read_to_end(buf),
            PakBlockReader::Compressed(r) => r.read_to_end(buf),
        }
    }

    #[instrument(skip(self), err)]
    fn read_to_string(&mut self, buf: &mut String) -> io::Result<usize> {
        match self {
            PakBlockReader::Raw(r) => r.read_to_string(buf),
            PakBlockReader::Compressed(r) => r.read_to_string(buf),
        }
    }
}

pub(crate) enum PakBlockWriter<W: Write> {
    Raw(W, usize),
    Compressed(Box<ZlibEncoder<W>>),
}

impl<W: Write> PakBlockWriter<W> {
    #[tracing::instrument(skip(writer))]
    pub fn new(writer: W, compression: CompressionMethod) -> Self {
        match compression {
            CompressionMethod::None => PakBlockWriter::Raw(writer, 0),
            CompressionMethod::Zlib => PakBlockWriter::Compressed(Box::new(ZlibEncoder::new(
                writer,
                Compression::default(),
            ))),
        }
    }

    #[instrument(skip(self), err)]
    pub fn finalize(self) -> io::Result<W> {
        match self {
            PakBlockWriter::Raw(w, _) => Ok(w),
            PakBlockWriter::Compressed(w) => w.finish(),
        }
    }

    /// Bytes fed into this block before any compression.
    pub fn total_in(&self) -> u64 {
        match self {
            PakBlockWriter::Raw(_, c) => *c as u64,
            PakBlockWriter::Compressed(w) => w.total_in(),
        }
    }
}

impl<W: Write> Write for PakBlockWriter<W> {
    #[instrument(skip(self, buf), err)]
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        match self {
            PakBlockWriter::Raw(w, c) => {
                let written = w.write(buf)?;
                *c += written;
                Ok(written)
            }
            PakBlockWriter::Compressed(w) => w.write(buf),
        }
    }

    #[instrument(skip(self), err)]
    fn flush(&mut self) -> io::Result<()> {
        match self {
            PakBlockWriter::Raw(w, _) => w.flush(),
            PakBlockWriter::Compressed(w) => w.flush(),
        }
    }
}
