//! CLI argument definitions.

use clap::{Parser, Subcommand};

use crate::commands::book::BookCommand;
use crate::commands::serve::ServeArgs;

/// Contact directory service and client.
#[derive(Parser, Debug)]
#[command(name = "contacts")]
#[command(author, version = env!("ABOOK_VERSION"), about, long_about = None)]
pub struct Cli {
    /// Increase verbosity (-v, -vv, -vvv)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,

    /// Output logs as JSON
    #[arg(long, global = true)]
    pub json_logs: bool,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Run the address book service
    Serve(ServeArgs),

    /// Address book operations against a running service
    Book(BookCommand),
}
