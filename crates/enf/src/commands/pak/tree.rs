use clap::Args;
use enf_vfs::{PakNode, PakSession, ScriptParsing, SessionOptions};
use indexmap::IndexMap;
use itertools::Itertools;
use miette::Result;
use owo_colors::OwoColorize;
use std::path::PathBuf;

#[derive(Args)]
pub struct TreeArgs {
    /// Input PAK files, merged in the order given
    #[arg(short, long, value_name = "FILE", required = true)]
    files: Vec<PathBuf>,

    /// Parse script entries and annotate them with diagnostic counts
    #[arg(long, default_value_t = false)]
    scripts: bool,
}

impl TreeArgs {
    pub fn handle(&self) -> Result<()> {
        let parsing = if self.scripts {
            ScriptParsing::Enabled
        } else {
            ScriptParsing::Disabled
        };
        let session = PakSession::load(
            &self.files,
            SessionOptions::builder().parsing(parsing).build(),
        )?;

        render(&session, session.tree(), "", 0);

        if !session.conflicts().is_empty() {
            println!();
            println!(
                "{} {}",
                format!("{} shadowed entries:", session.conflicts().len()).red(),
                session
                    .conflicts()
                    .iter()
                    .map(|c| c.path.as_str())
                    .join(", ")
            );
        }
        println!("{} files", session.file_count());

        Ok(())
    }
}

fn render(session: &PakSession, nodes: &IndexMap<String, PakNode>, prefix: &str, depth: usize) {
    for (name, node) in nodes {
        let path = if prefix.is_empty() {
            name.clone()
        } else {
            format!("{prefix}/{name}")
        };
        let pad = "  ".repeat(depth);

        match node {
            PakNode::Directory(children) => {
                println!("{pad}{}", name.blue());
                render(session, children, &path, depth + 1);
            }
            PakNode::File(_) => match session.script(&path) {
                Some(parsed) if !parsed.diagnostics.is_empty() => {
                    let note = format!("({} diagnostics)", parsed.diagnostics.len());
                    println!("{pad}{name} {}", note.yellow());
                }
                Some(_) => println!("{pad}{name} {}", "(ok)".green()),
                None => println!("{pad}{name}"),
            },
        }
    }
}
