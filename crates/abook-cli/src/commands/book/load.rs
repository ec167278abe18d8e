//! Load command implementation.

use anyhow::{Context, Result};
use clap::Args;
use colored::Colorize;

use abook_core::{AddressBook, Error, SourceId, split_cards};
use abook_rpc::RpcAddressBook;

use crate::output;

use super::read_input;

#[derive(Args, Debug)]
pub struct LoadArgs {
    /// vCard file with any number of cards (use - for stdin)
    pub file: String,

    /// Target source (defaults to the primary source)
    #[arg(long)]
    pub source: Option<String>,
}

pub async fn run(book: &RpcAddressBook, args: LoadArgs) -> Result<()> {
    let text = read_input(&args.file)?;
    let source = args
        .source
        .as_deref()
        .map(SourceId::new)
        .transpose()
        .context("Invalid source id")?;

    let mut created = 0;
    let mut skipped = 0;
    for card in split_cards(&text) {
        match book.create_contact(&card, source.as_ref()).await {
            Ok(id) => {
                created += 1;
                println!("{}", id);
            }
            Err(Error::Validation(e)) => {
                skipped += 1;
                eprintln!("{} {}", "SKIPPED".yellow(), e);
            }
            Err(e) => return Err(e).context("Failed to load contacts"),
        }
    }

    output::success(&format!("Loaded {} contacts ({} skipped)", created, skipped));
    Ok(())
}
