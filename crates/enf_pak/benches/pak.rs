use divan::AllocProfiler;

#[global_allocator]
static ALLOC: AllocProfiler = AllocProfiler::system();

fn main() {
    divan::main();
}

pub mod read {
    use divan::Bencher;
    use enf_pak::{
        read::PakArchive,
        write::{PakWriter, PakWriterOptions},
        CompressionMethod,
    };
    use std::io::{prelude::*, Cursor};

    fn get_input() -> Vec<u8> {
        let mut writer = PakWriter::new(
            Cursor::new(Vec::new()),
            PakWriterOptions::builder()
                .entry_compression(CompressionMethod::Zlib)
                .build(),
        );

        let payload = b"The quick brown fox jumps over the lazy dog. ".repeat(64);
        for i in 0..256 {
            writer
                .start_entry(format!("scripts/module_{i:03}.c"))
                .unwrap();
            writer.write_all(&payload).unwrap();
        }

        writer.finish().unwrap().into_inner()
    }

    #[divan::bench]
    fn open(bencher: Bencher) {
        bencher.with_inputs(get_input).bench_refs(|data| {
            divan::black_box(PakArchive::new(Cursor::new(data)).unwrap());
        });
    }

    #[divan::bench]
    fn access_entry(bencher: Bencher) {
        bencher
            .with_inputs(|| PakArchive::new(Cursor::new(get_input())).unwrap())
            .bench_refs(|pak| {
                divan::black_box(pak.by_index(0).unwrap());
            });
    }

    #[divan::bench(sample_count = 1)]
    fn read_entry_first(bencher: Bencher) {
        let mut pak = PakArchive::new(Cursor::new(get_input())).unwrap();
        bencher.bench_local(move || {
            let mut buffer = Vec::new();

            let mut entry = pak.by_index(0).unwrap();
            entry.read_to_end(&mut buffer).unwrap();
        });
    }

    #[divan::bench(sample_count = 1)]
    fn read_entry_all(bencher: Bencher) {
        let mut pak = PakArchive::new(Cursor::new(get_input())).unwrap();

        bencher.bench_local(move || {
            let mut buffer = Vec::new();
            for i in 0..pak.len() {
                let mut entry = pak.by_index(i).unwrap();
                entry.read_to_end(&mut buffer).unwrap();
                buffer.clear();
            }
        });
    }
}

pub mod write {
    use divan::Bencher;
    use enf_pak::{
        write::{PakWriter, PakWriterOptions},
        CompressionMethod,
    };
    use std::io::{prelude::*, Cursor};

    fn write_archive(compression: CompressionMethod) -> Vec<u8> {
        let mut writer = PakWriter::new(
            Cursor::new(Vec::new()),
            PakWriterOptions::builder()
                .entry_compression(compression)
                .build(),
        );

        let payload = b"The quick brown fox jumps over the lazy dog. ".repeat(64);
        for i in 0..256 {
            writer
                .start_entry(format!("scripts/module_{i:03}.c"))
                .unwrap();
            writer.write_all(&payload).unwrap();
        }

        writer.finish().unwrap().into_inner()
    }

    #[divan::bench]
    fn uncompressed(bencher: Bencher) {
        bencher.bench(|| divan::black_box(write_archive(CompressionMethod::None)));
    }

    #[divan::bench]
    fn compressed(bencher: Bencher) {
        bencher.bench(|| divan::black_box(write_archive(CompressionMethod::Zlib)));
    }
}
