//! Command line surface.

use std::path::PathBuf;

use clap::{Args, Parser, Subcommand};

#[derive(Parser, Debug)]
#[command(name = "harbour", version, about = "Declarative containers behind a path-prefix gateway")]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Make the runtime match a declaration (default: the last applied one)
    Apply {
        path: Option<PathBuf>,
    },
    /// Start the containers of a declaration without removing anything
    Add {
        path: PathBuf,
    },
    /// Remove one running container and forget it
    Remove {
        name: String,
    },
    /// Run the gateway
    Serve(ServeArgs),
}

#[derive(Args, Debug)]
#[command(args_conflicts_with_subcommands = true)]
pub struct ServeArgs {
    #[command(subcommand)]
    pub action: Option<ServeAction>,

    /// Declaration to route from (default: the last applied one)
    pub path: Option<PathBuf>,

    /// Start in the background and return immediately
    #[arg(short = 'd', long)]
    pub detached: bool,

    /// Set on the re-executed background child
    #[arg(long, hide = true)]
    pub foreground: bool,
}

#[derive(Subcommand, Debug, PartialEq, Eq)]
pub enum ServeAction {
    /// Stop every running gateway
    Stop,
}
