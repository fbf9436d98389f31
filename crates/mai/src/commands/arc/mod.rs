pub mod extract;
pub mod list;
pub mod pack;

#[derive(clap::Subcommand)]
pub enum ArcCommands {
    /// List the entries of an archive
    List(list::ListArgs),
    /// Extract an archive into a directory
    Extract(extract::ExtractArgs),
    /// Pack a directory into a flat archive
    Pack(pack::PackArgs),
}

impl ArcCommands {
    pub fn handle(&self) -> miette::Result<()> {
        match self {
            ArcCommands::List(list) => list.handle(),
            ArcCommands::Extract(extract) => extract.handle(),
            ArcCommands::Pack(pack) => pack.handle(),
        }
    }
}
