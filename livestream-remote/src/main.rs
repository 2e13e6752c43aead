mod cli;
mod commands;
mod output;

use std::sync::Arc;

use anyhow::Result;
use clap::Parser;
use tracing::debug;

use livestream_remote_core::auth::{IdentityProvider, NoIdentityProvider, StaticIdTokenProvider};
use livestream_remote_core::storage::FileTokenStore;
use livestream_remote_core::{logging, Config, RemoteClient};

use cli::{Cli, Commands};

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    // 1. Load configuration
    let config = Config::load(cli.config.as_deref())?;

    // 2. Validate configuration (fail fast on misconfigurations)
    if let Err(errors) = config.validate() {
        for e in &errors {
            eprintln!("Config validation error: {e}");
        }
        return Err(anyhow::anyhow!(
            "Configuration validation failed with {} error(s)",
            errors.len()
        ));
    }

    // 3. Initialize logging
    logging::init_logging(&config.logging)?;
    debug!(base_url = %config.api.base_url, "livestream-remote starting");

    // 4. Wire the client
    let identity: Arc<dyn IdentityProvider> = match &cli.command {
        Commands::LoginGoogle { id_token } => {
            Arc::new(StaticIdTokenProvider::new(id_token.clone()))
        }
        _ => Arc::new(NoIdentityProvider),
    };
    let store = Arc::new(FileTokenStore::new(&config.storage.token_file));
    let client = RemoteClient::new(&config, store, identity)?;

    let format = cli.format;
    if let Err(e) = commands::run(&client, cli.command, format).await {
        debug!(error = ?e, "Command failed");
        output::print_error(&e.to_string(), format);
        std::process::exit(1);
    }
    Ok(())
}
