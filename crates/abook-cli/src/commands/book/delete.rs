//! Delete command implementation.

use anyhow::{Context, Result};
use clap::Args;
use colored::Colorize;

use abook_core::{AddressBook, ContactId};
use abook_rpc::RpcAddressBook;

use crate::output;

#[derive(Args, Debug)]
pub struct DeleteArgs {
    /// Contact ids
    #[arg(required = true)]
    pub ids: Vec<String>,
}

pub async fn run(book: &RpcAddressBook, args: DeleteArgs) -> Result<()> {
    // Malformed ids cannot match a contact; skip them like unknown ones.
    let ids: Vec<ContactId> = args
        .ids
        .iter()
        .filter_map(|raw| match ContactId::new(raw.as_str()) {
            Ok(id) => Some(id),
            Err(e) => {
                eprintln!("{} {}", "SKIPPED".yellow(), e);
                None
            }
        })
        .collect();

    let removed = book
        .remove_contacts(&ids)
        .await
        .context("Failed to delete contacts")?;

    output::success(&format!("Removed {} contacts", removed));
    Ok(())
}
