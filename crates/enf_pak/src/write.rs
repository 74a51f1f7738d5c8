//! Types for creating PAK archives
//!

use binrw::BinWrite;
use bon::Builder;
use byteorder::{BigEndian, LittleEndian, WriteBytesExt};
use indexmap::IndexSet;
use std::fmt::Debug;
use std::io::{self, Cursor, Seek, Write};
use std::mem;
use tracing::{instrument, Level};

use crate::chunk::{CHUNK_DATA, CHUNK_FILE, CHUNK_HEAD, FORM_TYPE};
use crate::compression::{CompressionMethod, PakBlockWriter};
use crate::error::{Error, FormatError, Result};
use crate::types::{PakHeader, PakRecord, PAK_CRC};

/// Options for how the PAK file should be written
#[derive(Debug, Clone, Copy, Builder)]
pub struct PakWriterOptions {
    /// The compression method applied to entries unless overridden per entry
    #[builder(default)]
    pub entry_compression: CompressionMethod,
}

/// PAK archive generator
///
/// Entry data and the entry table are buffered until [`PakWriter::finish`],
/// at which point every chunk size is known and the container is written out
/// in one pass.
///
/// ```
/// # fn doit() -> enf_pak::error::Result<()>
/// # {
/// # use enf_pak::PakWriter;
/// use std::io::Write;
/// use enf_pak::write::PakWriterOptions;
///
/// // Any Write + Seek target works; a `File` is the usual choice.
/// let buf = std::io::Cursor::new(Vec::new());
/// let mut pak = PakWriter::new(buf, PakWriterOptions::builder()
///            .entry_compression(enf_pak::CompressionMethod::None)
///            .build());
///
/// pak.start_entry("hello_world.txt")?;
/// pak.write_all(b"Hello, World!")?;
///
/// // Nothing reaches the target until the container is finished.
/// pak.finish()?;
///
/// # Ok(())
/// # }
/// # doit().unwrap();
/// ```
pub struct PakWriter<W: Write + Seek> {
    inner: W,
    options: PakWriterOptions,
    writing_entry: bool,
    names: IndexSet<Box<str>>,
    table_block: Cursor<Vec<u8>>,
    data_block: Cursor<Vec<u8>>,
    current_block: Option<PakBlockWriter<Cursor<Vec<u8>>>>,
    current_digest: Option<crc::Digest<'static, u32>>,
    header: PakHeader,
    record: PakRecord,
}

impl<W: Write + Seek> PakWriter<W> {
    /// Initializes the archive.
    ///
    /// Call [`PakWriter::start_entry`] before writing any data. A successful
    /// write leaves the entry open for more data; after a failed write,
    /// [`PakWriter::is_writing_entry`] tells whether it still is.
    pub fn new(inner: W, options: PakWriterOptions) -> PakWriter<W> {
        PakWriter {
            inner,
            options,
            writing_entry: false,
            names: IndexSet::new(),
            table_block: Cursor::new(Vec::new()),
            data_block: Cursor::new(Vec::new()),
            current_block: None,
            current_digest: None,
            header: PakHeader::default(),
            record: PakRecord::default(),
        }
    }

    /// Returns true if an entry is currently open for writing.
    pub const fn is_writing_entry(&self) -> bool {
        self.writing_entry
    }

    /// Start a new entry compressed with the default method.
    pub fn start_entry(&mut self, name: impl ToString) -> Result<()> {
        self.start_entry_with(name, self.options.entry_compression)
    }

    /// Start a new entry with the requested compression.
    #[instrument(skip(self, name), err)]
    pub fn start_entry_with(
        &mut self,
        name: impl ToString,
        compression: CompressionMethod,
    ) -> Result<()> {
        if self.writing_entry {
            self.finish_entry()?;
        }

        assert!(self.current_block.is_none());

        let name = name.to_string();
        if name.len() > u16::MAX as usize {
            return Err(Error::CustomError(format!(
                "entry name is too long to encode: {} bytes",
                name.len()
            )));
        }
        if self.names.contains(name.as_str()) {
            return Err(FormatError::DuplicateEntry(name).into());
        }

        let _ = mem::replace(
            &mut self.current_block,
            Some(PakBlockWriter::new(Cursor::new(Vec::new()), compression)),
        );
        self.current_digest = Some(PAK_CRC.digest());

        self.header.entries += 1;
        self.names.insert(name.into_boxed_str());

        // Update Record
        self.record.data_compression = compression;
        self.record.data_offset = self.data_block.get_ref().len() as u32;

        self.writing_entry = true;

        Ok(())
    }

    #[instrument(skip(self), err)]
    fn finish_entry(&mut self) -> Result<()> {
        let current_block = self
            .current_block
            .take()
            .expect("current data block should always be valid when finishing an entry");
        let digest = self
            .current_digest
            .take()
            .expect("checksum state should always be valid when finishing an entry");

        let block_total_in = current_block.total_in();
        let current_block_data = current_block.finalize()?.into_inner();

        self.record.data_uncompressed = block_total_in as u32;
        self.record.data_stored = current_block_data.len() as u32;
        self.record.checksum = digest.finalize();

        self.record.write(&mut self.table_block)?;

        let name = self
            .names
            .last()
            .expect("an entry name should always be recorded when finishing an entry");
        self.table_block
            .write_u16::<LittleEndian>(name.len() as u16)?;
        self.table_block.write_all(name.as_bytes())?;

        self.data_block.write_all(&current_block_data)?;
        self.writing_entry = false;

        Ok(())
    }

    /// Finish the last entry and write the container around everything
    ///
    /// Returns the underlying writer with the complete archive written out.
    #[instrument(skip(self), err)]
    pub fn finish(mut self) -> Result<W> {
        if self.writing_entry {
            self.finish_entry()?;
        }

        let data_block = self.data_block.into_inner();
        let table_block = self.table_block.into_inner();

        // The group size counts the form type and every chunk after it.
        let form_size = 4 + (8 + PakHeader::LEN) + (8 + data_block.len()) + (8 + table_block.len());

        self.inner.write_all(b"FORM")?;
        self.inner.write_u32::<BigEndian>(form_size as u32)?;
        self.inner.write_all(&FORM_TYPE)?;

        self.inner.write_all(&CHUNK_HEAD)?;
        self.inner.write_u32::<BigEndian>(PakHeader::LEN as u32)?;
        self.header.write(&mut self.inner)?;

        self.inner.write_all(&CHUNK_DATA)?;
        self.inner.write_u32::<BigEndian>(data_block.len() as u32)?;
        self.inner.write_all(&data_block)?;

        self.inner.write_all(&CHUNK_FILE)?;
        self.inner.write_u32::<BigEndian>(table_block.len() as u32)?;
        self.inner.write_all(&table_block)?;

        Ok(self.inner)
    }
}

impl<W: Write + Seek> Write for PakWriter<W> {
    #[instrument(skip_all, err, ret(level = Level::TRACE), fields(size=buf.len()) )]
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        if !self.writing_entry {
            return Err(io::Error::new(
                io::ErrorKind::Other,
                "No entry has been started",
            ));
        }
        let written = self
            .current_block
            .as_mut()
            .expect("current data block should be initialized by the time we write")
            .write(buf)?;
        self.current_digest
            .as_mut()
            .expect("checksum state should be initialized by the time we write")
            .update(&buf[..written]);
        Ok(written)
    }

    #[instrument(skip(self), err)]
    fn flush(&mut self) -> io::Result<()> {
        self.inner.flush()
    }
}

#[cfg(test)]
mod test {
    use pretty_assertions::assert_str_eq;
    use tracing_test::traced_test;

    use crate::error::{Error, FormatError, Result};
    use crate::{
        compression::CompressionMethod,
        write::{PakWriter, PakWriterOptions},
    };
    use std::io::{Cursor, Write};

    #[traced_test]
    #[test]
    fn pak_empty_write() -> Result<()> {
        #[rustfmt::skip]
        let expected = vec![
            // Form (12)
            b'F', b'O', b'R', b'M',
            0x00, 0x00, 0x00, 0x2C,
            b'P', b'A', b'C', b'1',
            // Head (24)
            b'H', b'E', b'A', b'D',
            0x00, 0x00, 0x00, 0x10,
            0x01, 0x00, 0x00, 0x00,
            0x00, 0x00, 0x00, 0x00,
            0x00, 0x00, 0x00, 0x00, 0x00, 0x00, 0x00, 0x00,
            // Data (8)
            b'D', b'A', b'T', b'A',
            0x00, 0x00, 0x00, 0x00,
            // File (8)
            b'F', b'I', b'L', b'E',
            0x00, 0x00, 0x00, 0x00,
        ];

        let writer = PakWriter::new(
            Cursor::new(Vec::new()),
            PakWriterOptions::builder()
                .entry_compression(CompressionMethod::None)
                .build(),
        );
        let result = writer.finish()?;
        assert_eq!(result.get_ref().len(), expected.len());
        assert_str_eq!(
            format!("{:02X?}", *result.get_ref()),
            format!("{:02X?}", expected)
        );

        Ok(())
    }

    #[traced_test]
    #[test]
    fn pak_uncompressed_with_data_write() -> Result<()> {
        let file_data = [
            0x48, 0x65, 0x6C, 0x6C, 0x6F, 0x20, 0x57, 0x6F, 0x72, 0x6C, 0x64,
        ];

        #[rustfmt::skip]
        let expected = [
            // Form (12)
            b'F', b'O', b'R', b'M',
            0x00, 0x00, 0x00, 0x56,
            b'P', b'A', b'C', b'1',
            // Head (24)
            b'H', b'E', b'A', b'D',
            0x00, 0x00, 0x00, 0x10,
            0x01, 0x00, 0x00, 0x00,
            0x01, 0x00, 0x00, 0x00,
            0x00, 0x00, 0x00, 0x00, 0x00, 0x00, 0x00, 0x00,
            // Data (19)
            b'D', b'A', b'T', b'A',
            0x00, 0x00, 0x00, 0x0B,
            0x48, 0x65, 0x6C, 0x6C, 0x6F, 0x20, 0x57, 0x6F, 0x72, 0x6C, 0x64,
            // File (39)
            b'F', b'I', b'L', b'E',
            0x00, 0x00, 0x00, 0x1F,
            0x00, 0x00, 0x00, 0x00,
            0x0B, 0x00, 0x00, 0x00,
            0x0B, 0x00, 0x00, 0x00,
            0x00, 0x00, 0x00, 0x00,
            0x56, 0xB1, 0x17, 0x4A,
            0x09, 0x00,
            b'h', b'e', b'l', b'l', b'o', b'.', b't', b'x', b't',
        ];

        let mut writer = PakWriter::new(
            Cursor::new(Vec::new()),
            PakWriterOptions::builder()
                .entry_compression(CompressionMethod::None)
                .build(),
        );
        writer.start_entry("hello.txt")?;
        writer.write_all(&file_data)?;

        let result = writer.finish()?;
        assert_eq!(result.get_ref().len(), expected.len());
        assert_str_eq!(
            format!("{:02X?}", *result.get_ref()),
            format!("{:02X?}", expected)
        );

        Ok(())
    }

    #[traced_test]
    #[test]
    fn pak_compressed_with_data_write() -> Result<()> {
        let file_data = [
            0x48, 0x65, 0x6C, 0x6C, 0x6F, 0x20, 0x57, 0x6F, 0x72, 0x6C, 0x64,
        ];

        #[rustfmt::skip]
        let expected = [
            // Form (12)
            b'F', b'O', b'R', b'M',
            0x00, 0x00, 0x00, 0x5E,
            b'P', b'A', b'C', b'1',
            // Head (24)
            b'H', b'E', b'A', b'D',
            0x00, 0x00, 0x00, 0x10,
            0x01, 0x00, 0x00, 0x00,
            0x01, 0x00, 0x00, 0x00,
            0x00, 0x00, 0x00, 0x00, 0x00, 0x00, 0x00, 0x00,
            // Data (27)
            b'D', b'A', b'T', b'A',
            0x00, 0x00, 0x00, 0x13,
            0x78, 0x9C, 0xF3, 0x48, 0xCD, 0xC9, 0xC9, 0x57, 0x08, 0xCF, 0x2F, 0xCA, 0x49, 0x01,
            0x00, 0x18, 0x0B, 0x04, 0x1D,
            // File (39)
            b'F', b'I', b'L', b'E',
            0x00, 0x00, 0x00, 0x1F,
            0x00, 0x00, 0x00, 0x00,
            0x13, 0x00, 0x00, 0x00,
            0x0B, 0x00, 0x00, 0x00,
            0x02, 0x00, 0x00, 0x00,
            0x56, 0xB1, 0x17, 0x4A,
            0x09, 0x00,
            b'h', b'e', b'l', b'l', b'o', b'.', b't', b'x', b't',
        ];

        let mut writer = PakWriter::new(
            Cursor::new(Vec::new()),
            PakWriterOptions::builder()
                .entry_compression(CompressionMethod::Zlib)
                .build(),
        );
        writer.start_entry("hello.txt")?;
        writer.write_all(&file_data)?;

        let result = writer.finish()?;
        assert_eq!(result.get_ref().len(), expected.len());
        assert_str_eq!(
            format!("{:02X?}", *result.get_ref()),
            format!("{:02X?}", expected)
        );

        Ok(())
    }

    #[traced_test]
    #[test]
    fn pak_multiple_entries_write() -> Result<()> {
        let hello_data = [
            0x48, 0x65, 0x6C, 0x6C, 0x6F, 0x20, 0x57, 0x6F, 0x72, 0x6C, 0x64,
        ];

        let world_data = [
            0x57, 0x6F, 0x72, 0x6C, 0x64, 0x20, 0x48, 0x65, 0x6C, 0x6C, 0x6F,
        ];

        let mut writer = PakWriter::new(
            Cursor::new(Vec::new()),
            PakWriterOptions::builder()
                .entry_compression(CompressionMethod::None)
                .build(),
        );
        writer.start_entry("hello.txt")?;
        writer.write_all(&hello_data)?;

        writer.start_entry("world.txt")?;
        writer.write_all(&world_data)?;

        let result = writer.finish()?;
        let bytes = result.get_ref();

        // Data region holds both payloads back to back at offset 44.
        assert_eq!(&bytes[44..55], &hello_data);
        assert_eq!(&bytes[55..66], &world_data);

        Ok(())
    }

    #[test]
    fn pak_duplicate_entry_rejected() -> Result<()> {
        let mut writer = PakWriter::new(
            Cursor::new(Vec::new()),
            PakWriterOptions::builder()
                .entry_compression(CompressionMethod::None)
                .build(),
        );
        writer.start_entry("hello.txt")?;
        writer.write_all(b"Hello World")?;

        let result = writer.start_entry("hello.txt");
        assert!(matches!(
            result,
            Err(Error::Format(FormatError::DuplicateEntry(name))) if name == "hello.txt"
        ));

        Ok(())
    }

    #[test]
    fn pak_write_without_entry() {
        let mut writer = PakWriter::new(
            Cursor::new(Vec::new()),
            PakWriterOptions::builder()
                .entry_compression(CompressionMethod::None)
                .build(),
        );

        assert!(writer.write(b"Hello World").is_err());
    }
}
