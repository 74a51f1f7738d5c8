use clap::Args;
use enf_pak::{
    write::{PakWriter, PakWriterOptions},
    CompressionMethod,
};
use itertools::Itertools;
use miette::{miette, Context, IntoDiagnostic, Result};
use std::{fs::File, path::PathBuf};
use tracing::info;
use walkdir::WalkDir;

#[derive(Args)]
pub struct CreateArgs {
    /// An input directory
    #[arg(short, long, value_name = "DIR")]
    directory: PathBuf,

    /// A target PAK file
    #[arg(short, long, value_name = "FILE")]
    file: PathBuf,

    /// Allow overwriting the target
    #[arg(long, default_value_t = false)]
    overwrite: bool,

    /// Store entries without compression
    #[arg(long, default_value_t = false)]
    no_compress: bool,
}

impl CreateArgs {
    pub fn handle(&self) -> Result<()> {
        info!("creating {}", &self.file.display());

        let files = WalkDir::new(&self.directory)
            .into_iter()
            .filter_map(|e| e.ok())
            .filter(|e| !e.file_type().is_dir())
            .collect::<Vec<_>>();

        if files.is_empty() {
            return Err(miette!("directory is empty"));
        }

        let out = if !self.overwrite {
            File::create_new(&self.file)
                .into_diagnostic()
                .context(format!("creating {}", &self.file.display()))?
        } else {
            File::create(&self.file)
                .into_diagnostic()
                .context(format!("creating {}", &self.file.display()))?
        };

        let compression = if self.no_compress {
            CompressionMethod::None
        } else {
            CompressionMethod::Zlib
        };

        let mut pak = PakWriter::new(
            out,
            PakWriterOptions::builder()
                .entry_compression(compression)
                .build(),
        );

        for file in files {
            let name = file
                .path()
                .strip_prefix(&self.directory)
                .into_diagnostic()?;
            // Entry names always use forward slashes, whatever the host.
            let name = name
                .components()
                .map(|c| c.as_os_str().to_string_lossy())
                .join("/");
            info!("adding {}", name);

            pak.start_entry(&name)
                .context(format!("starting entry for {}", name))?;

            let mut f = File::open(file.path())
                .into_diagnostic()
                .context(format!("opening {}", file.path().display()))?;

            std::io::copy(&mut f, &mut pak)
                .into_diagnostic()
                .context(format!("copying {}", file.path().display()))?;
        }

        pak.finish().context("finalizing pak file")?;

        Ok(())
    }
}
