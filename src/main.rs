use std::{env, sync::Arc};

use anyhow::Context;
use chessfish_indexer::{config::IndexerConfig, indexer::Indexer, store::provider::PostgresStore};
use tracing::info;
use tracing_subscriber::EnvFilter;

const DEFAULT_LOG_FILTER: &str = "chessfish_indexer=info,sqlx=warn";

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(DEFAULT_LOG_FILTER)),
        )
        .try_init();

    let args: Vec<String> = env::args().collect();
    let config_file = if args.contains(&"--local".to_string()) {
        "local_config.toml"
    } else {
        "config.toml"
    };

    let config = IndexerConfig::from_toml(config_file)?;
    info!(
        config_file,
        chains = config.chains.len(),
        polling_interval = config.core.polling_interval,
        "Loaded configuration"
    );

    let store = PostgresStore::new(&config.core.db_url, config.core.require_ssl);
    store
        .create_tables()
        .await
        .context("Failed to create database tables")?;
    info!("Database tables created successfully");

    let indexer = Indexer::new(&config, Arc::new(store)).context("Invalid contract registry")?;
    indexer.start().await
}
