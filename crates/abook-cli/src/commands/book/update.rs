//! Update command implementation.

use anyhow::{Context, Result};
use clap::Args;

use abook_core::{AddressBook, split_cards};
use abook_rpc::RpcAddressBook;

use crate::output;

use super::read_input;

#[derive(Args, Debug)]
pub struct UpdateArgs {
    /// vCard file holding one or more cards with UIDs (use - for stdin)
    pub file: String,
}

pub async fn run(book: &RpcAddressBook, args: UpdateArgs) -> Result<()> {
    let text = read_input(&args.file)?;
    let cards = split_cards(&text);

    let updated = book
        .update_contacts(&cards)
        .await
        .context("Failed to update contacts")?;

    output::success(&format!("Updated {} of {} contacts", updated, cards.len()));
    Ok(())
}
