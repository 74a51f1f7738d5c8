use clap::Args;
use enf_vfs::{ExtractOptions, ExtractTask, PakSession, SessionOptions};
use miette::Result;
use std::path::PathBuf;
use tracing::info;

#[derive(Args)]
pub struct ExtractArgs {
    /// Input PAK files, merged in the order given
    #[arg(short, long, value_name = "FILE", required = true)]
    files: Vec<PathBuf>,

    /// A target directory
    #[arg(short, long, value_name = "DIR")]
    directory: PathBuf,

    /// Allow overwriting files in the target
    #[arg(long, default_value_t = false)]
    overwrite: bool,
}

impl ExtractArgs {
    pub fn handle(&self) -> Result<()> {
        let session = PakSession::load(&self.files, SessionOptions::default())?;
        let task = ExtractTask::spawn_all(
            session,
            self.directory.clone(),
            ExtractOptions::builder().overwrite(self.overwrite).build(),
        );

        while let Ok(event) = task.progress().recv() {
            info!("[{}/{}] writing {}", event.current, event.total, event.path);
        }

        let written = task.join()?;
        println!(
            "extracted {} files into {}",
            written,
            self.directory.display()
        );

        Ok(())
    }
}
