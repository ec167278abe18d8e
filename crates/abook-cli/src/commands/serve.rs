//! Serve command implementation.

use std::path::PathBuf;
use std::sync::Arc;

use anyhow::{Context, Result};
use clap::Args;
use tokio::net::TcpListener;
use tracing::info;

use abook_core::AddressBook;
use abook_memory::{Directory, DirectoryConfig};

#[derive(Args, Debug)]
pub struct ServeArgs {
    /// Address to listen on
    #[arg(long, env = "ABOOK_LISTEN", default_value = "127.0.0.1:8642")]
    pub listen: String,

    /// vCard file imported into the default source at start-up
    #[arg(long, env = "ABOOK_DEMO_DATA")]
    pub demo_data: Option<PathBuf>,

    /// Start with safe mode enabled
    #[arg(long, env = "ABOOK_SAFE_MODE")]
    pub safe_mode: bool,

    /// Start without the default personal source
    #[arg(long)]
    pub no_default_source: bool,
}

impl ServeArgs {
    fn config(&self) -> DirectoryConfig {
        let mut config = if self.no_default_source {
            DirectoryConfig::empty()
        } else {
            DirectoryConfig::default()
        };
        config.safe_mode = self.safe_mode;
        config.demo_data = self.demo_data.clone();
        config
    }
}

pub async fn run(args: ServeArgs) -> Result<()> {
    let directory = Directory::from_config(&args.config())
        .await
        .context("Failed to initialise directory")?;

    let listener = TcpListener::bind(&args.listen)
        .await
        .with_context(|| format!("Failed to bind {}", args.listen))?;
    let addr = listener
        .local_addr()
        .context("Failed to read listen address")?;

    directory.set_ready(true).await?;
    info!(contacts = directory.len().await, "Directory ready");

    println!("Listening on http://{}", addr);

    abook_rpc::serve(Arc::new(directory), listener, async {
        let _ = tokio::signal::ctrl_c().await;
        info!("Shutting down");
    })
    .await
    .context("Server failed")
}
