//! Subscribe command implementation.

use anyhow::{Context, Result};
use clap::Args;
use colored::Colorize;
use futures_util::StreamExt;

use abook_rpc::RpcAddressBook;

use crate::output;

#[derive(Args, Debug)]
pub struct SubscribeArgs {
    /// Output events as JSON
    #[arg(long)]
    pub json: bool,

    /// Exit after this many events
    #[arg(long)]
    pub count: Option<usize>,
}

pub async fn run(book: &RpcAddressBook, args: SubscribeArgs) -> Result<()> {
    let mut stream = book
        .subscribe_now()
        .await
        .context("Failed to start subscription")?;

    eprintln!("{}", "Listening for events...".dimmed());
    eprintln!("{}", "Press Ctrl+C to stop.".dimmed());

    let mut seen = 0;
    while let Some(result) = stream.next().await {
        match result {
            Ok(event) => {
                if args.json {
                    output::json(&event)?;
                } else {
                    output::event(&event);
                }
                seen += 1;
                if args.count.is_some_and(|limit| seen >= limit) {
                    break;
                }
            }
            Err(e) => {
                eprintln!("{} {}", "ERROR".red(), e);
            }
        }
    }

    Ok(())
}
