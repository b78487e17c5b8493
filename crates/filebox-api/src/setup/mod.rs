//! Application setup and initialization

pub mod database;
pub mod routes;
pub mod server;
pub mod stores;

use crate::state::AppState;
use anyhow::{Context, Result};
use filebox_cache::TtlStore;
use filebox_core::Config;
use filebox_db::FileRecordRepository;
use filebox_services::{FileService, ImageOptimizer, OptimizationClient};
use std::sync::Arc;

/// Initialize the entire application from configuration.
pub async fn initialize_app(config: Config) -> Result<(Arc<AppState>, axum::Router)> {
    // Fail fast on misconfiguration
    config.validate().context("Configuration validation failed")?;
    tracing::info!(
        environment = %config.environment,
        record_backend = ?config.record_backend,
        cache_backend = ?config.cache_backend,
        "Configuration loaded and validated successfully"
    );

    let records = stores::setup_record_store(&config).await?;
    let cache = stores::setup_cache_store(&config).await?;
    let optimizer: Arc<dyn ImageOptimizer> = Arc::new(
        OptimizationClient::new(config.optimizer.clone())
            .context("Failed to create optimization client")?,
    );

    build_app(config, records, cache, optimizer)
}

/// Wire state and routes over already constructed stores and provider.
pub fn build_app(
    config: Config,
    records: Arc<dyn FileRecordRepository>,
    cache: Arc<dyn TtlStore>,
    optimizer: Arc<dyn ImageOptimizer>,
) -> Result<(Arc<AppState>, axum::Router)> {
    crate::error::set_production_mode(config.is_production());

    let service = FileService::from_config(&config, records, cache, optimizer);
    let state = Arc::new(AppState::new(service, config));
    let router = routes::setup_routes(&state.config, state.clone())?;

    Ok((state, router))
}
