use clap::{Parser, Subcommand};
use notedeck_core::policy::Role;

#[derive(Debug, Parser)]
#[command(name = "notedeck")]
#[command(bin_name = "notedeck")]
#[command(version)]
#[command(about = "Keyboard and mouse explorer for a department > note library")]
pub struct Cli {
    /// Write a debug log under the config directory's diagnostics folder.
    #[arg(long, global = true)]
    pub diagnostics: bool,

    /// Act as this role instead of the one in the config (admin, staff or student).
    #[arg(long, global = true, value_name = "ROLE")]
    pub role: Option<Role>,

    #[command(subcommand)]
    pub command: Option<Command>,
}

#[derive(Debug, Subcommand)]
pub enum Command {
    #[command(about = "Run environment and configuration checks")]
    Doctor,
    #[command(about = "Print the whole library as a table")]
    Tree,
    #[command(about = "Create a config and an empty library")]
    Init {
        /// Overwrite an existing config and library.
        #[arg(long)]
        force: bool,
        /// Seed the library with a small demo hierarchy.
        #[arg(long)]
        sample: bool,
    },
}

impl Cli {
    /// The explorer takes over the terminal, so nothing may log to stderr while it runs.
    pub fn is_interactive(&self) -> bool {
        self.command.is_none()
    }
}
