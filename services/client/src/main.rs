use anyhow::{Result, bail};
use clap::Parser;
use std::sync::Arc;
use tracing::{error, info};
use tracing_subscriber::EnvFilter;

use client::auth::{IdentityProvider, StaticIdentity};
use client::cli::{Cli, run};
use client::config::ClientConfig;
use client::state::AppState;

#[tokio::main]
async fn main() -> Result<()> {
    // Initialize logging
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();
    let config = ClientConfig::from_env()?;

    let identity: Arc<dyn IdentityProvider> = match (&config.email, &config.access_token) {
        (Some(email), Some(token)) => Arc::new(StaticIdentity::with_token(email, token)),
        _ if cli.command.needs_identity() => {
            bail!("This command needs EDU_SYNC_EMAIL and EDU_SYNC_ACCESS_TOKEN")
        }
        _ => Arc::new(StaticIdentity::default()),
    };

    info!("Starting Edu Sync client");
    let state = AppState::start(config, identity).await?;

    let result = run(cli.command, &state).await;
    if let Err(e) = &result {
        error!("{:#}", e);
    }
    state.shutdown().await;
    result
}
