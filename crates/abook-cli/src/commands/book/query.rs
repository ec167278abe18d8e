//! Query command implementation.

use anyhow::{Context, Result};
use clap::Args;
use colored::Colorize;

use abook_core::{AddressBook, PageRequest, Query, SourceId};
use abook_rpc::RpcAddressBook;

use crate::output;

#[derive(Args, Debug)]
pub struct QueryArgs {
    /// Filter clause, e.g. `EMAIL:example.com "Forrest Gump"`
    #[arg(long, default_value = "")]
    pub clause: String,

    /// Sort clause, e.g. `LAST_NAME, FIRST_NAME DESC`
    #[arg(long, default_value = "")]
    pub sort: String,

    /// Field to return (repeatable; all fields when omitted)
    #[arg(long = "field")]
    pub fields: Vec<String>,

    /// Source to search (repeatable; all sources when omitted)
    #[arg(long = "source")]
    pub sources: Vec<String>,

    /// First result to return
    #[arg(long, default_value_t = 0)]
    pub start: usize,

    /// Maximum number of results
    #[arg(long)]
    pub limit: Option<usize>,

    /// Print full vCards
    #[arg(long)]
    pub vcard: bool,

    /// Output contacts as JSON lines
    #[arg(long)]
    pub json: bool,
}

pub async fn run(book: &RpcAddressBook, args: QueryArgs) -> Result<()> {
    let sources = args
        .sources
        .iter()
        .map(SourceId::new)
        .collect::<Result<Vec<_>, _>>()
        .context("Invalid source id")?;

    let query = Query::all()
        .with_clause(args.clause.clone())
        .with_sort(args.sort.clone())
        .with_fields(args.fields.clone())
        .with_sources(sources);

    let page = PageRequest {
        start: args.start,
        size: args.limit,
    };

    let view = book.query(&query).await.context("Query failed")?;
    let contacts = book.contacts_details(view, &[], page).await;
    book.close_view(view).await.context("Failed to close view")?;
    let contacts = contacts.context("Failed to read results")?;

    if contacts.is_empty() {
        eprintln!("{}", "No contacts found.".dimmed());
        return Ok(());
    }

    for contact in &contacts {
        if args.json {
            output::json(contact)?;
        } else if args.vcard {
            print!("{}", contact.card);
        } else {
            output::contact(contact);
        }
    }

    Ok(())
}
