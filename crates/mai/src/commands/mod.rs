pub mod arc;
pub mod cm;

#[derive(clap::Subcommand)]
pub enum Commands {
    /// Handle MAI archives
    Arc {
        #[command(subcommand)]
        command: arc::ArcCommands,
    },
    /// Handle CM images
    Cm {
        #[command(subcommand)]
        command: cm::CmCommands,
    },
}

impl Commands {
    pub fn handle(&self) -> miette::Result<()> {
        match self {
            Commands::Arc { command } => command.handle(),
            Commands::Cm { command } => command.handle(),
        }
    }
}
