use clap::Args;
use enf_vfs::{ExtractOptions, ExtractTask, PakSession, SessionOptions};
use miette::Result;
use std::path::PathBuf;
use tracing::info;

#[derive(Args)]
pub struct ZipArgs {
    /// Input PAK files, merged in the order given
    #[arg(short, long, value_name = "FILE", required = true)]
    files: Vec<PathBuf>,

    /// A target zip file
    #[arg(short, long, value_name = "FILE")]
    output: PathBuf,

    /// Allow overwriting the target
    #[arg(long, default_value_t = false)]
    overwrite: bool,
}

impl ZipArgs {
    pub fn handle(&self) -> Result<()> {
        let session = PakSession::load(&self.files, SessionOptions::default())?;
        let task = ExtractTask::spawn_zip(
            session,
            self.output.clone(),
            ExtractOptions::builder().overwrite(self.overwrite).build(),
        );

        while let Ok(event) = task.progress().recv() {
            info!("[{}/{}] adding {}", event.current, event.total, event.path);
        }

        let written = task.join()?;
        println!("wrote {} entries to {}", written, self.output.display());

        Ok(())
    }
}
