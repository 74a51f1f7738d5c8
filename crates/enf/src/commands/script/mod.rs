pub mod dump;

#[derive(clap::Subcommand)]
pub enum ScriptCommands {
    /// Reconstruct script declarations from a PAK file
    Dump(dump::DumpArgs),
}

impl ScriptCommands {
    pub fn handle(&self) -> miette::Result<()> {
        match self {
            ScriptCommands::Dump(dump) => dump.handle(),
        }
    }
}
