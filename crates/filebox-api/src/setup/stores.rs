//! Record and TTL store selection

use anyhow::{Context, Result};
use filebox_cache::{MemoryTtlStore, RedisConfig, RedisTtlStore, TtlStore};
use filebox_core::{CacheBackend, Config, RecordBackend};
use filebox_db::{FileRecordRepository, InMemoryFileRecordRepository, PgFileRecordRepository};
use std::sync::Arc;

pub async fn setup_record_store(config: &Config) -> Result<Arc<dyn FileRecordRepository>> {
    match config.record_backend {
        RecordBackend::Postgres => {
            let pool = super::database::setup_database(config).await?;
            Ok(Arc::new(PgFileRecordRepository::new(pool)))
        }
        RecordBackend::Memory => {
            tracing::warn!("Using in-memory record store; files are lost on restart");
            Ok(Arc::new(InMemoryFileRecordRepository::new()))
        }
    }
}

pub async fn setup_cache_store(config: &Config) -> Result<Arc<dyn TtlStore>> {
    match config.cache_backend {
        CacheBackend::Redis => {
            let redis_config = RedisConfig::from(config);
            let store =
                RedisTtlStore::new(&redis_config).context("Failed to create Redis pool")?;
            store.ping().await.context("Failed to reach Redis")?;

            tracing::info!(
                prefix = %redis_config.prefix,
                pool_size = redis_config.pool_size,
                "Redis connected successfully"
            );
            Ok(Arc::new(store))
        }
        CacheBackend::Memory => {
            tracing::warn!("Using in-memory TTL store; aliases and thumbnails are per process");
            Ok(Arc::new(MemoryTtlStore::new()))
        }
    }
}
