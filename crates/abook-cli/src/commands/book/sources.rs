//! Source command implementations.

use anyhow::{Context, Result, bail};
use clap::Args;
use colored::Colorize;

use abook_core::{AddressBook, Source, SourceId};
use abook_rpc::RpcAddressBook;

use crate::output;

#[derive(Args, Debug)]
pub struct SourcesArgs {
    /// Output sources as JSON lines
    #[arg(long)]
    pub json: bool,
}

#[derive(Args, Debug)]
pub struct CreateSourceArgs {
    /// Source id
    pub id: String,

    /// Display name (defaults to the id)
    #[arg(long)]
    pub name: Option<String>,

    /// Account provider
    #[arg(long, default_value = "")]
    pub provider: String,

    /// Owning application id
    #[arg(long, default_value = "")]
    pub application_id: String,

    /// Account id
    #[arg(long, default_value_t = 0)]
    pub account_id: u32,

    /// Mark the source read-only
    #[arg(long)]
    pub read_only: bool,

    /// Make this the primary source
    #[arg(long)]
    pub primary: bool,
}

#[derive(Args, Debug)]
pub struct RemoveSourceArgs {
    /// Source id
    pub id: String,
}

pub async fn list(book: &RpcAddressBook, args: SourcesArgs) -> Result<()> {
    let sources = book
        .available_sources()
        .await
        .context("Failed to list sources")?;

    if sources.is_empty() {
        eprintln!("{}", "No sources.".dimmed());
        return Ok(());
    }

    for source in &sources {
        if args.json {
            output::json(source)?;
        } else {
            output::source(source);
        }
    }
    Ok(())
}

pub async fn create(book: &RpcAddressBook, args: CreateSourceArgs) -> Result<()> {
    let id = SourceId::new(&args.id).context("Invalid source id")?;
    let name = args.name.clone().unwrap_or_else(|| args.id.clone());
    let source = Source::new(id, name)
        .with_account(args.provider, args.application_id, args.account_id)
        .with_read_only(args.read_only)
        .with_primary(args.primary);

    if !book
        .create_source(source)
        .await
        .context("Failed to create source")?
    {
        bail!("Source '{}' already exists", args.id);
    }

    output::success(&format!("Created source {}", args.id));
    Ok(())
}

pub async fn remove(book: &RpcAddressBook, args: RemoveSourceArgs) -> Result<()> {
    let id = SourceId::new(&args.id).context("Invalid source id")?;

    if !book
        .remove_source(&id)
        .await
        .context("Failed to remove source")?
    {
        bail!("Source '{}' does not exist", args.id);
    }

    output::success(&format!("Removed source {}", args.id));
    Ok(())
}
