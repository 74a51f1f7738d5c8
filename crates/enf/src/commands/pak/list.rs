use clap::Args;
use enf_pak::PakArchive;
use miette::{Context, IntoDiagnostic, Result};
use owo_colors::OwoColorize;
use std::{fs::File, path::PathBuf};

#[derive(Args)]
pub struct ListArgs {
    /// An input PAK file
    #[arg(short, long, value_name = "FILE")]
    file: PathBuf,

    /// Show sizes, compression and checksums
    #[arg(long, default_value_t = false)]
    long: bool,
}

impl ListArgs {
    pub fn handle(&self) -> Result<()> {
        let f = File::open(&self.file)
            .into_diagnostic()
            .context(format!("path: {}", &self.file.display()))?;
        let mut pak = PakArchive::new(f)?;

        if !self.long {
            for name in pak.file_names() {
                println!("{}", name);
            }
            return Ok(());
        }

        println!(
            "{}",
            format!(
                "{:>12} {:>12} {:>6} {:>8}  {}",
                "size", "stored", "method", "crc32", "name"
            )
            .bold()
        );

        let count = pak.len();
        for i in 0..count {
            let entry = pak.by_index(i)?;
            println!(
                "{:>12} {:>12} {} {}  {}",
                entry.size(),
                entry.stored_size(),
                format!("{:>6}", entry.compression_method()).blue(),
                format!("{:08x}", entry.crc32()).dimmed(),
                entry.name()
            );
        }
        println!("{} entries", count);

        Ok(())
    }
}
