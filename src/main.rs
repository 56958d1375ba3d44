// src/main.rs
use std::sync::Arc;

use anyhow::Context;
use clap::Parser;
use log::info;

use aigram::cache::{CacheConfig, QueryCache};
use aigram::config::BackendConfig;
use aigram::handlers::{self, cli::Cli};
use aigram::queries::Queries;
use aigram::repositories::AppwriteBackend;
use aigram::services::{CollectionIds, Gateway};

fn mask_id(id: &str) -> String {
    match (id.get(..4), id.get(id.len().saturating_sub(4)..)) {
        (Some(head), Some(tail)) if id.len() > 8 => format!("{head}***{tail}"),
        _ => "[REDACTED]".to_string(),
    }
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    env_logger::init();
    dotenv::dotenv().ok();

    let cli = Cli::parse();
    let config = BackendConfig::from_env()?;

    info!("Backend URL: {}", config.endpoint);
    info!("Project: {}", mask_id(&config.project_id));

    let backend = AppwriteBackend::new(&config).context("failed to build http client")?;
    let gateway = Gateway::new(Arc::new(backend), CollectionIds::from(&config));
    let cache = QueryCache::new(CacheConfig::from(&config));
    let queries = Queries::new(gateway, cache);

    handlers::run(&queries, cli).await?;
    Ok(())
}
