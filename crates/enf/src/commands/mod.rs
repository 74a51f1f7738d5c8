pub mod pak;
pub mod script;

#[derive(clap::Subcommand)]
pub enum Commands {
    /// Handle PAK archives
    Pak {
        #[command(subcommand)]
        command: pak::PakCommands,
    },
    /// Handle Enforce scripts inside PAK archives
    Script {
        #[command(subcommand)]
        command: script::ScriptCommands,
    },
}

impl Commands {
    pub fn handle(&self) -> miette::Result<()> {
        match self {
            Commands::Pak { command } => command.handle(),
            Commands::Script { command } => command.handle(),
        }
    }
}
