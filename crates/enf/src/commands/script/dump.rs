use clap::Args;
use enf_script::ParsedScript;
use enf_vfs::{PakSession, ScriptParsing, SessionOptions};
use miette::{miette, IntoDiagnostic, Result};
use std::path::PathBuf;
use tracing::warn;

#[derive(Args)]
pub struct DumpArgs {
    /// An input PAK file
    #[arg(short, long, value_name = "FILE")]
    file: PathBuf,

    /// Dump only this entry, named by its path inside the archive
    #[arg(short, long, value_name = "ENTRY")]
    entry: Option<String>,

    /// Emit the parsed model as JSON instead of source
    #[arg(long, default_value_t = false)]
    json: bool,
}

impl DumpArgs {
    pub fn handle(&self) -> Result<()> {
        let session = PakSession::load(
            &[&self.file],
            SessionOptions::builder()
                .parsing(ScriptParsing::Enabled)
                .build(),
        )?;
        let label = session.archives()[0].label();

        if let Some(entry) = &self.entry {
            let key = format!("{label}/{entry}");
            let parsed = session
                .script(&key)
                .ok_or(miette!("`{}` is not a script entry", entry))?;
            return self.dump_one(&key, parsed);
        }

        if session.scripts().is_empty() {
            warn!("no script entries in {}", self.file.display());
            return Ok(());
        }

        for (path, parsed) in session.scripts() {
            self.dump_one(path, parsed)?;
        }

        Ok(())
    }

    fn dump_one(&self, path: &str, parsed: &ParsedScript) -> Result<()> {
        for diagnostic in &parsed.diagnostics {
            warn!(offset = diagnostic.offset, "{}: {}", path, diagnostic.message);
        }

        println!("// {}", path);
        if self.json {
            println!(
                "{}",
                serde_json::to_string_pretty(&parsed.scope).into_diagnostic()?
            );
        } else {
            print!("{}", enf_script::print(&parsed.scope));
        }
        println!();

        Ok(())
    }
}
