//! Create command implementation.

use anyhow::{Context, Result};
use clap::Args;

use abook_core::{AddressBook, SourceId};
use abook_rpc::RpcAddressBook;

use super::read_input;

/// Card used when no file is given.
const SAMPLE_CARD: &str = "BEGIN:VCARD
VERSION:3.0
N:Gump;Forrest
FN:Forrest Gump
TEL;TYPE=WORK,VOICE:(111) 555-1212
TEL;TYPE=HOME,VOICE:(404) 555-1212
EMAIL;TYPE=PREF,INTERNET:forrestgump@example.com
END:VCARD
";

#[derive(Args, Debug)]
pub struct CreateArgs {
    /// vCard file (use - for stdin); a sample card is used when omitted
    #[arg(long)]
    pub file: Option<String>,

    /// Target source (defaults to the primary source)
    #[arg(long)]
    pub source: Option<String>,
}

pub async fn run(book: &RpcAddressBook, args: CreateArgs) -> Result<()> {
    let card = match &args.file {
        Some(path) => read_input(path)?,
        None => SAMPLE_CARD.to_string(),
    };
    let source = args
        .source
        .as_deref()
        .map(SourceId::new)
        .transpose()
        .context("Invalid source id")?;

    let id = book
        .create_contact(&card, source.as_ref())
        .await
        .context("Failed to create contact")?;

    println!("{}", id);
    Ok(())
}
