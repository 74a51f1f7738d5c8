//! Types for reading PAK archives
//!

use binrw::BinRead;
use byteorder::{LittleEndian, ReadBytesExt};
use indexmap::IndexMap;
use std::{
    borrow::Cow,
    fmt::{self, Debug},
    fs::File,
    io::{Cursor, Read, Seek, SeekFrom},
    path::Path,
    sync::Arc,
};
use tracing::debug;

use crate::{
    chunk::{ChunkHeader, FormHeader, CHUNK_DATA, CHUNK_FILE, CHUNK_HEAD, FORM_TYPE},
    compression::{CompressionMethod, PakBlockReader},
    error::{CorruptEntryError, EntryNotFoundError, Error, FormatError, Result},
    types::{PakHeader, PakRecord, PAK_CRC, PAK_VERSION},
};

/// A struct for reading an entry from a PAK file
pub struct PakEntry<'a, R: Read + Seek> {
    data: Cow<'a, PakEntryData>,
    reader: PakBlockReader<'a, R>,
}

impl<'a, R: Read + Seek> Debug for PakEntry<'a, R> {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "PakEntry({:#?})", self.get_metadata())
    }
}

/// Methods for retrieving information on PAK file entries
impl<'a, R: Read + Seek> PakEntry<'a, R> {
    /// Get the name of the entry
    ///
    /// # Warnings
    ///
    /// It is dangerous to use this name directly when extracting an archive.
    /// It may contain an absolute path (`/etc/shadow`), or break out of the
    /// current directory (`../runtime`). Carelessly writing to these paths
    /// allows an attacker to craft a PAK archive that will overwrite critical
    /// files.
    ///
    pub fn name(&self) -> &str {
        &self.get_metadata().file_name
    }

    /// Get the name of the entry, in the raw (internal) byte representation.
    pub fn name_raw(&self) -> &[u8] {
        &self.get_metadata().file_name_raw
    }

    /// Get the size of the entry, in bytes, as stored in the archive
    pub fn stored_size(&self) -> u64 {
        self.get_metadata().stored_size
    }

    /// Get the size of the entry, in bytes, when uncompressed
    pub fn size(&self) -> u64 {
        self.get_metadata().uncompressed_size
    }

    /// Get the CRC32 hash of the uncompressed entry data, zero when absent
    pub fn crc32(&self) -> u32 {
        self.get_metadata().crc32
    }

    /// Get the starting offset of the entry data within the file
    pub fn data_start(&self) -> u64 {
        self.get_metadata().data_start
    }

    /// Get the compression method used for this entry
    pub fn compression_method(&self) -> CompressionMethod {
        self.get_metadata().compression_method
    }

    fn get_metadata(&self) -> &PakEntryData {
        self.data.as_ref()
    }
}

impl<R: Read + Seek> Read for PakEntry<'_, R> {
    fn read(&mut self, buf: &mut [u8]) -> std::io::Result<usize> {
        self.reader.read(buf)
    }
}

/// Structure representing a PAK file entry.
#[derive(Debug, Clone, Default)]
pub struct PakEntryData {
    /// CRC32 checksum of the uncompressed data, zero when absent
    pub crc32: u32,
    /// Method of compressing the entry in the pak
    pub compression_method: CompressionMethod,
    /// Size of the entry data in the pak
    pub stored_size: u64,
    /// Size of the entry when extracted
    pub uncompressed_size: u64,
    /// Name of the entry
    pub file_name: Box<str>,
    /// Raw entry name. To be used when file_name was incorrectly decoded.
    pub file_name_raw: Box<[u8]>,
    /// Specifies where the entry data starts, from the beginning of the file
    pub data_start: u64,
}

#[derive(Debug)]
pub(crate) struct Shared {
    header: PakHeader,
    files: IndexMap<Box<str>, PakEntryData>,
}

/// PAK archive reader
///
/// Only the container structure and the entry table are decoded up front;
/// entry data stays on disk until asked for.
///
/// ```no_run
/// use std::io::prelude::*;
///
/// fn list_pak_contents(reader: impl Read + Seek) -> enf_pak::error::Result<()> {
///     let mut pak = enf_pak::PakArchive::new(reader)?;
///
///     for i in 0..pak.len() {
///         let mut entry = pak.by_index(i)?;
///         println!("Entry: {}", entry.name());
///         std::io::copy(&mut entry, &mut std::io::stdout())?;
///     }
///
///     Ok(())
/// }
/// ```
#[derive(Debug)]
pub struct PakArchive<R> {
    reader: R,
    shared: Arc<Shared>,
}

impl<R> PakArchive<R> {
    /// Total size of the entries in the archive once decompressed, if it can
    /// be known. Doesn't include container metadata.
    pub fn decompressed_size(&self) -> Option<u128> {
        let mut total = 0u128;
        for file in self.shared.files.values() {
            total = total.checked_add(file.uncompressed_size as u128)?;
        }
        Some(total)
    }
}

impl PakArchive<File> {
    /// Open a PAK archive from a path.
    #[tracing::instrument]
    pub fn open(path: impl AsRef<Path> + Debug) -> Result<PakArchive<File>> {
        let file = File::open(path)?;
        PakArchive::new(file)
    }
}

impl<R: Read + Seek> PakArchive<R> {
    /// Read a PAK archive collecting the entries it contains.
    pub fn new(mut reader: R) -> Result<PakArchive<R>> {
        let shared = Self::get_metadata(&mut reader)?;
        Ok(PakArchive {
            reader,
            shared: shared.into(),
        })
    }

    /// Number of entries contained in this PAK.
    pub fn len(&self) -> usize {
        self.shared.files.len()
    }

    /// Whether this PAK archive contains no entries
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// The container revision recorded in the header.
    pub fn version(&self) -> u32 {
        self.shared.header.version
    }

    /// Returns an iterator over all the entry names in this archive.
    pub fn file_names(&self) -> impl Iterator<Item = &str> {
        self.shared.files.keys().map(|s| s.as_ref())
    }

    /// Get the index of an entry by name, if it's present.
    #[inline(always)]
    pub fn index_for_name(&self, name: &str) -> Option<usize> {
        self.shared.files.get_index_of(name)
    }

    /// Get the name of an entry, if it's present.
    #[inline(always)]
    pub fn name_for_index(&self, index: usize) -> Option<&str> {
        self.shared
            .files
            .get_index(index)
            .map(|(name, _)| name.as_ref())
    }

    /// Search for an entry by name
    pub fn by_name(&mut self, name: &str) -> Result<PakEntry<'_, R>> {
        let Some(index) = self.shared.files.get_index_of(name) else {
            return Err(Error::EntryNotFound(EntryNotFoundError::Name(
                name.to_owned(),
            )));
        };
        self.by_index(index)
    }

    /// Get a contained entry by index
    pub fn by_index(&mut self, entry_number: usize) -> Result<PakEntry<'_, R>> {
        let (_, data) = self
            .shared
            .files
            .get_index(entry_number)
            .ok_or(Error::EntryNotFound(EntryNotFoundError::Index(entry_number)))?;

        Ok(PakEntry {
            data: Cow::Borrowed(data),
            reader: PakBlockReader::new(
                &mut self.reader,
                data.data_start,
                data.stored_size,
                data.compression_method,
            )?,
        })
    }

    /// Materialize one entry, validating its size and checksum.
    ///
    /// A failure here is scoped to the entry; the archive and every other
    /// entry remain readable.
    pub fn read_entry(&mut self, entry_number: usize) -> Result<Vec<u8>> {
        let mut entry = self.by_index(entry_number)?;
        let name = entry.name().to_owned();
        let expected_len = entry.size();
        let expected_crc = entry.crc32();

        let mut buffer = Vec::with_capacity(expected_len as usize);
        entry.read_to_end(&mut buffer)?;

        if buffer.len() as u64 != expected_len {
            return Err(CorruptEntryError::LengthMismatch {
                name,
                expected: expected_len,
                actual: buffer.len() as u64,
            }
            .into());
        }

        if expected_crc != 0 {
            let actual = PAK_CRC.checksum(&buffer);
            if actual != expected_crc {
                return Err(CorruptEntryError::ChecksumMismatch {
                    name,
                    expected: expected_crc,
                    actual,
                }
                .into());
            }
        }

        Ok(buffer)
    }

    /// Unwrap and return the inner reader object
    ///
    /// The position of the reader is undefined.
    pub fn into_inner(self) -> R {
        self.reader
    }

    fn get_metadata(reader: &mut R) -> Result<Shared> {
        reader.seek(SeekFrom::Start(0))?;

        let mut preamble = Vec::with_capacity(FormHeader::LEN);
        reader
            .by_ref()
            .take(FormHeader::LEN as u64)
            .read_to_end(&mut preamble)?;

        let form = FormHeader::parse(&preamble)?;
        if form.form_type != FORM_TYPE {
            return Err(FormatError::UnrecognizedSignature.into());
        }

        let mut header: Option<PakHeader> = None;
        let mut data_region: Option<(u64, u64)> = None;
        let mut table: Option<Vec<u8>> = None;

        // The group size counts everything after its own field.
        let end = 8u64 + form.size as u64;
        let mut pos = FormHeader::LEN as u64;

        while pos + ChunkHeader::LEN as u64 <= end {
            reader.seek(SeekFrom::Start(pos))?;

            let mut raw = [0u8; ChunkHeader::LEN];
            if reader.read_exact(&mut raw).is_err() {
                break;
            }
            let chunk = ChunkHeader::parse(&raw)?;
            let payload = pos + ChunkHeader::LEN as u64;
            debug!(id = %chunk.name(), size = chunk.size, offset = payload, "chunk");

            match chunk.id {
                CHUNK_HEAD => {
                    let mut buf = Vec::with_capacity(chunk.size as usize);
                    reader
                        .by_ref()
                        .take(chunk.size as u64)
                        .read_to_end(&mut buf)?;
                    let decoded = PakHeader::read(&mut Cursor::new(buf))?;
                    if decoded.version != PAK_VERSION {
                        return Err(FormatError::UnsupportedVersion(decoded.version).into());
                    }
                    header = Some(decoded);
                }
                CHUNK_DATA => {
                    data_region = Some((payload, chunk.size as u64));
                }
                CHUNK_FILE => {
                    let mut buf = Vec::with_capacity(chunk.size as usize);
                    reader
                        .by_ref()
                        .take(chunk.size as u64)
                        .read_to_end(&mut buf)?;
                    table = Some(buf);
                }
                // Unknown chunks are allowed and skipped.
                _ => {}
            }

            pos = payload + chunk.size as u64;
        }

        let header = header.ok_or(FormatError::MissingChunk("HEAD"))?;
        let (data_start, data_size) = data_region.ok_or(FormatError::MissingChunk("DATA"))?;
        let table = table.ok_or(FormatError::MissingChunk("FILE"))?;

        let files = Self::get_entries(&header, &table, data_start, data_size)?;

        Ok(Shared { header, files })
    }

    fn get_entries(
        header: &PakHeader,
        table: &[u8],
        data_start: u64,
        data_size: u64,
    ) -> Result<IndexMap<Box<str>, PakEntryData>> {
        let mut cursor = Cursor::new(table);
        let mut files = IndexMap::with_capacity(header.entries as usize);

        for found in 0..header.entries {
            let remaining = table.len() as u64 - cursor.position();
            if remaining < PakRecord::LEN as u64 {
                return Err(FormatError::TruncatedTable {
                    expected: header.entries,
                    found,
                }
                .into());
            }
            let record = PakRecord::read(&mut cursor)?;

            let name_raw = Self::read_name(&mut cursor, table.len()).ok_or(
                FormatError::TruncatedTable {
                    expected: header.entries,
                    found,
                },
            )?;
            let file_name: Box<str> = String::from_utf8_lossy(&name_raw).into();

            let entry_end = record.data_offset as u64 + record.data_stored as u64;
            if entry_end > data_size {
                return Err(FormatError::EntryOutOfBounds(file_name.into()).into());
            }

            let file = PakEntryData {
                crc32: record.checksum,
                compression_method: record.data_compression,
                stored_size: record.data_stored as u64,
                uncompressed_size: record.data_uncompressed as u64,
                data_start: data_start + record.data_offset as u64,
                file_name,
                file_name_raw: name_raw.into(),
            };

            if let Some(previous) = files.insert(file.file_name.clone(), file) {
                return Err(FormatError::DuplicateEntry(previous.file_name.into()).into());
            }
        }

        Ok(files)
    }

    fn read_name(cursor: &mut Cursor<&[u8]>, table_len: usize) -> Option<Vec<u8>> {
        let remaining = table_len as u64 - cursor.position();
        if remaining < 2 {
            return None;
        }
        let len = cursor.read_u16::<LittleEndian>().ok()? as u64;
        if table_len as u64 - cursor.position() < len {
            return None;
        }

        let mut name_raw = vec![0u8; len as usize];
        cursor.read_exact(&mut name_raw).ok()?;
        Some(name_raw)
    }
}
