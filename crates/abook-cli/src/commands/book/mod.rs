//! Address book subcommand implementations.

mod create;
mod delete;
mod load;
mod query;
mod sources;
mod status;
mod subscribe;
mod update;

use std::io::{self, Read};

use anyhow::{Context, Result};
use clap::{Args, Subcommand};

use abook_core::ServiceUrl;
use abook_rpc::RpcAddressBook;

#[derive(Args, Debug)]
pub struct BookCommand {
    /// Address book service URL
    #[arg(
        long,
        env = "ABOOK_URL",
        default_value = "http://127.0.0.1:8642",
        global = true
    )]
    pub url: String,

    #[command(subcommand)]
    pub command: BookSubcommand,
}

#[derive(Subcommand, Debug)]
pub enum BookSubcommand {
    /// Query contacts
    Query(query::QueryArgs),

    /// Create a contact
    Create(create::CreateArgs),

    /// Update contacts from a vCard file (matched by UID)
    Update(update::UpdateArgs),

    /// Delete contacts by id
    Delete(delete::DeleteArgs),

    /// Import every card of a vCard file
    Load(load::LoadArgs),

    /// List sources
    Sources(sources::SourcesArgs),

    /// Register a source
    CreateSource(sources::CreateSourceArgs),

    /// Remove a source and its contacts
    RemoveSource(sources::RemoveSourceArgs),

    /// Remove every source and contact
    Reset(status::ResetArgs),

    /// Show service status
    Status(status::StatusArgs),

    /// Set the readiness flag
    SetReady(status::SetReadyArgs),

    /// Set the safe-mode flag
    SetSafeMode(status::SetSafeModeArgs),

    /// Stream change events
    Subscribe(subscribe::SubscribeArgs),
}

pub async fn handle(cmd: BookCommand) -> Result<()> {
    let url = ServiceUrl::new(&cmd.url).context("Invalid service URL")?;
    let book = RpcAddressBook::connect(url)
        .await
        .with_context(|| format!("Failed to connect to {}", cmd.url))?;

    match cmd.command {
        BookSubcommand::Query(args) => query::run(&book, args).await,
        BookSubcommand::Create(args) => create::run(&book, args).await,
        BookSubcommand::Update(args) => update::run(&book, args).await,
        BookSubcommand::Delete(args) => delete::run(&book, args).await,
        BookSubcommand::Load(args) => load::run(&book, args).await,
        BookSubcommand::Sources(args) => sources::list(&book, args).await,
        BookSubcommand::CreateSource(args) => sources::create(&book, args).await,
        BookSubcommand::RemoveSource(args) => sources::remove(&book, args).await,
        BookSubcommand::Reset(args) => status::reset(&book, args).await,
        BookSubcommand::Status(args) => status::show(&book, args).await,
        BookSubcommand::SetReady(args) => status::set_ready(&book, args).await,
        BookSubcommand::SetSafeMode(args) => status::set_safe_mode(&book, args).await,
        BookSubcommand::Subscribe(args) => subscribe::run(&book, args).await,
    }
}

/// Read a file, or stdin for `-`.
fn read_input(path: &str) -> Result<String> {
    if path == "-" {
        let mut buf = String::new();
        io::stdin()
            .read_to_string(&mut buf)
            .context("Failed to read from stdin")?;
        Ok(buf)
    } else {
        std::fs::read_to_string(path).with_context(|| format!("Failed to read {}", path))
    }
}
