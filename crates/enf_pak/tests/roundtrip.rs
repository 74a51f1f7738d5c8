use enf_pak::{
    error::Error,
    read::PakArchive,
    write::{PakWriter, PakWriterOptions},
    CompressionMethod,
};
use miette::{IntoDiagnostic, Result};
use std::io::{Cursor, Read, Seek, Write};
use tracing::{info, instrument};
use tracing_test::traced_test;

#[instrument(skip_all)]
fn build_archive(entries: &[(&str, &[u8], CompressionMethod)]) -> Result<Cursor<Vec<u8>>> {
    let mut writer = PakWriter::new(
        Cursor::new(Vec::new()),
        PakWriterOptions::builder()
            .entry_compression(CompressionMethod::None)
            .build(),
    );

    for (name, data, compression) in entries {
        info!("inserting {name}");
        writer.start_entry_with(*name, *compression)?;
        writer.write_all(data).into_diagnostic()?;
    }

    let mut written = writer.finish()?;

    // Rewind so we can read from the generated data
    written.rewind().into_diagnostic()?;
    Ok(written)
}

#[traced_test]
#[test]
fn roundtrip_mixed_compression() -> Result<()> {
    let entries: [(&str, &[u8], CompressionMethod); 3] = [
        (
            "scripts/init.c",
            b"void main() {}",
            CompressionMethod::Zlib,
        ),
        ("data/config.txt", b"Hello World", CompressionMethod::None),
        ("empty.bin", b"", CompressionMethod::None),
    ];

    let written = build_archive(&entries)?;
    let mut pak = PakArchive::new(written)?;

    assert_eq!(pak.len(), entries.len());
    assert_eq!(pak.version(), 1);
    assert_eq!(
        pak.file_names().collect::<Vec<_>>(),
        entries.iter().map(|(name, _, _)| *name).collect::<Vec<_>>()
    );

    for (i, (name, data, compression)) in entries.iter().enumerate() {
        info!("comparing {name}");

        let entry = pak.by_name(name)?;
        assert_eq!(entry.size(), data.len() as u64);
        assert_eq!(entry.compression_method(), *compression);
        drop(entry);

        let actual = pak.read_entry(i)?;
        assert_eq!(&actual, data);
    }

    Ok(())
}

#[traced_test]
#[test]
fn roundtrip_compressed_payload_shrinks() -> Result<()> {
    let payload = b"The quick brown fox jumps over the lazy dog. ".repeat(512);
    let entries: [(&str, &[u8], CompressionMethod); 1] =
        [("docs/fox.txt", payload.as_slice(), CompressionMethod::Zlib)];

    let written = build_archive(&entries)?;
    let mut pak = PakArchive::new(written)?;

    let entry = pak.by_name("docs/fox.txt")?;
    assert_eq!(entry.size(), payload.len() as u64);
    assert!(entry.stored_size() < entry.size());
    drop(entry);

    let actual = pak.read_entry(0)?;
    assert_eq!(actual, payload);

    Ok(())
}

#[traced_test]
#[test]
fn streamed_reads_match_buffered() -> Result<()> {
    let entries: [(&str, &[u8], CompressionMethod); 1] = [(
        "logs/boot.txt",
        b"Hello World and then some more text",
        CompressionMethod::Zlib,
    )];

    let written = build_archive(&entries)?;
    let mut pak = PakArchive::new(written)?;

    let mut entry = pak.by_index(0)?;
    let mut head = [0u8; 5];
    entry.read_exact(&mut head).into_diagnostic()?;
    assert_eq!(&head, b"Hello");

    let mut rest = Vec::new();
    entry.read_to_end(&mut rest).into_diagnostic()?;
    assert_eq!(rest.as_slice(), b" World and then some more text");

    Ok(())
}

#[traced_test]
#[test]
fn missing_entry_reported() -> Result<()> {
    let entries: [(&str, &[u8], CompressionMethod); 1] =
        [("hello.txt", b"Hello World", CompressionMethod::None)];

    let written = build_archive(&entries)?;
    let mut pak = PakArchive::new(written)?;

    let result = pak.by_name("absent.txt");
    assert!(matches!(result, Err(Error::EntryNotFound(_))));

    Ok(())
}
