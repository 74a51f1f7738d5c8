pub mod create;
pub mod extract;
pub mod list;
pub mod tree;
pub mod zip;

#[derive(clap::Subcommand)]
pub enum PakCommands {
    /// List the entries of a PAK file
    List(list::ListArgs),
    /// Render one or more PAK files as a merged tree
    Tree(tree::TreeArgs),
    /// Extract PAK files into a directory
    Extract(extract::ExtractArgs),
    /// Export PAK files as a zip archive
    Zip(zip::ZipArgs),
    /// Create a PAK file from a directory
    Create(create::CreateArgs),
}

impl PakCommands {
    pub fn handle(&self) -> miette::Result<()> {
        match self {
            PakCommands::List(list) => list.handle(),
            PakCommands::Tree(tree) => tree.handle(),
            PakCommands::Extract(extract) => extract.handle(),
            PakCommands::Zip(zip) => zip.handle(),
            PakCommands::Create(create) => create.handle(),
        }
    }
}
