//! Status and flag command implementations.

use anyhow::{Context, Result};
use clap::Args;

use abook_core::AddressBook;
use abook_rpc::RpcAddressBook;

use crate::output;

#[derive(Args, Debug)]
pub struct StatusArgs {
    /// Also list supported sort keys
    #[arg(long)]
    pub sort_fields: bool,
}

#[derive(Args, Debug)]
pub struct ResetArgs {}

#[derive(Args, Debug)]
pub struct SetReadyArgs {
    /// New value (true or false)
    #[arg(action = clap::ArgAction::Set)]
    pub ready: bool,
}

#[derive(Args, Debug)]
pub struct SetSafeModeArgs {
    /// New value (true or false)
    #[arg(action = clap::ArgAction::Set)]
    pub enabled: bool,
}

pub async fn show(book: &RpcAddressBook, args: StatusArgs) -> Result<()> {
    let ready = book.is_ready().await.context("Failed to read readiness")?;
    let safe_mode = book.safe_mode().await.context("Failed to read safe mode")?;
    let sources = book
        .available_sources()
        .await
        .context("Failed to list sources")?;

    output::field("URL", book.url().as_str());
    output::field("Ready", &ready.to_string());
    output::field("Safe mode", &safe_mode.to_string());
    output::field("Sources", &sources.len().to_string());

    if args.sort_fields {
        let fields = book
            .sort_fields()
            .await
            .context("Failed to read sort fields")?;
        output::field("Sort fields", &fields.join(", "));
    }
    Ok(())
}

pub async fn reset(book: &RpcAddressBook, _args: ResetArgs) -> Result<()> {
    if book.reset().await.context("Failed to reset")? {
        output::success("Address book reset");
    } else {
        output::error("Reset was refused");
    }
    Ok(())
}

pub async fn set_ready(book: &RpcAddressBook, args: SetReadyArgs) -> Result<()> {
    book.set_ready(args.ready)
        .await
        .context("Failed to set readiness")?;
    output::success(&format!("Ready: {}", args.ready));
    Ok(())
}

pub async fn set_safe_mode(book: &RpcAddressBook, args: SetSafeModeArgs) -> Result<()> {
    book.set_safe_mode(args.enabled)
        .await
        .context("Failed to set safe mode")?;
    output::success(&format!("Safe mode: {}", args.enabled));
    Ok(())
}
