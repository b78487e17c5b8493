use std::time::Duration;

use async_trait::async_trait;
use deadpool_redis::{Config, Pool, Runtime};
use redis::AsyncCommands;

use crate::{CacheError, RedisConfig, TtlStore};

/// Redis-backed implementation of [`TtlStore`].
///
/// Values are stored as plain Redis strings with millisecond expiries. Reads with
/// touch use `GETEX`, so the read and the lifetime reset are a single command.
pub struct RedisTtlStore {
    pool: Pool,
    prefix: String,
}

impl RedisTtlStore {
    /// # Errors
    ///
    /// Returns [`CacheError::Connection`] if the pool cannot be created.
    pub fn new(config: &RedisConfig) -> Result<Self, CacheError> {
        let cfg = Config::from_url(&config.url);
        let pool = cfg
            .builder()
            .map(|b| {
                b.max_size(config.pool_size)
                    .wait_timeout(Some(config.connection_timeout))
                    .runtime(Runtime::Tokio1)
                    .build()
            })
            .map_err(|e| CacheError::Connection(e.to_string()))?
            .map_err(|e| CacheError::Connection(e.to_string()))?;

        Ok(Self {
            pool,
            prefix: config.prefix.clone(),
        })
    }

    fn key(&self, key: &str) -> String {
        if self.prefix.is_empty() {
            key.to_string()
        } else {
            format!("{}:{}", self.prefix, key)
        }
    }

    async fn conn(&self) -> Result<deadpool_redis::Connection, CacheError> {
        self.pool
            .get()
            .await
            .map_err(|e| CacheError::Connection(e.to_string()))
    }

    /// Round-trip a `PING`, used by startup checks.
    #[tracing::instrument(skip(self), fields(cache.backend = "redis", cache.operation = "ping"))]
    pub async fn ping(&self) -> Result<(), CacheError> {
        let mut conn = self.conn().await?;
        let _: String = redis::cmd("PING")
            .query_async(&mut conn)
            .await
            .map_err(|e| CacheError::Backend(e.to_string()))?;
        Ok(())
    }
}

fn ttl_millis(ttl: Duration) -> u64 {
    u64::try_from(ttl.as_millis()).unwrap_or(u64::MAX).max(1)
}

#[async_trait]
impl TtlStore for RedisTtlStore {
    #[tracing::instrument(
        skip(self, key),
        fields(cache.backend = "redis", cache.operation = "get", cache.key = %key)
    )]
    async fn get(&self, key: &str) -> Result<Option<Vec<u8>>, CacheError> {
        let mut conn = self.conn().await?;
        let value: Option<Vec<u8>> = conn
            .get(self.key(key))
            .await
            .map_err(|e| CacheError::Backend(e.to_string()))?;
        Ok(value)
    }

    #[tracing::instrument(
        skip(self, key, value),
        fields(cache.backend = "redis", cache.operation = "set", cache.key = %key)
    )]
    async fn set(&self, key: &str, value: &[u8], ttl: Duration) -> Result<(), CacheError> {
        let mut conn = self.conn().await?;
        let () = conn
            .pset_ex(self.key(key), value, ttl_millis(ttl))
            .await
            .map_err(|e| CacheError::Backend(e.to_string()))?;
        Ok(())
    }

    #[tracing::instrument(
        skip(self, key),
        fields(cache.backend = "redis", cache.operation = "expire", cache.key = %key)
    )]
    async fn expire(&self, key: &str, ttl: Duration) -> Result<bool, CacheError> {
        let ms = i64::try_from(ttl_millis(ttl)).unwrap_or(i64::MAX);
        let mut conn = self.conn().await?;
        let applied: bool = conn
            .pexpire(self.key(key), ms)
            .await
            .map_err(|e| CacheError::Backend(e.to_string()))?;
        Ok(applied)
    }

    #[tracing::instrument(
        skip(self, key),
        fields(cache.backend = "redis", cache.operation = "getex", cache.key = %key)
    )]
    async fn get_with_touch(
        &self,
        key: &str,
        ttl: Duration,
    ) -> Result<Option<Vec<u8>>, CacheError> {
        let mut conn = self.conn().await?;
        let value: Option<Vec<u8>> = redis::cmd("GETEX")
            .arg(self.key(key))
            .arg("PX")
            .arg(ttl_millis(ttl))
            .query_async(&mut conn)
            .await
            .map_err(|e| CacheError::Backend(e.to_string()))?;
        Ok(value)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn keys_are_prefixed() {
        let store = RedisTtlStore::new(&RedisConfig::default()).unwrap();
        assert_eq!(store.key("file:abc"), "filebox:file:abc");
    }

    #[test]
    fn empty_prefix_leaves_keys_untouched() {
        let config = RedisConfig {
            prefix: String::new(),
            ..RedisConfig::default()
        };
        let store = RedisTtlStore::new(&config).unwrap();
        assert_eq!(store.key("thumbnail:xs:1"), "thumbnail:xs:1");
    }

    #[test]
    fn sub_millisecond_ttl_rounds_up() {
        assert_eq!(ttl_millis(Duration::from_micros(10)), 1);
        assert_eq!(ttl_millis(Duration::from_secs(2)), 2000);
    }

    #[derive(Clone, Default)]
    struct SpanNames(std::sync::Arc<std::sync::Mutex<Vec<String>>>);

    impl<S: tracing::Subscriber> tracing_subscriber::Layer<S> for SpanNames {
        fn on_new_span(
            &self,
            attrs: &tracing::span::Attributes<'_>,
            _id: &tracing::span::Id,
            _ctx: tracing_subscriber::layer::Context<'_, S>,
        ) {
            self.0.lock().unwrap().push(attrs.metadata().name().to_string());
        }
    }

    #[tokio::test]
    async fn commands_run_inside_spans() {
        use tracing_subscriber::layer::SubscriberExt;

        let spans = SpanNames::default();
        let _default =
            tracing::subscriber::set_default(tracing_subscriber::registry().with(spans.clone()));

        // Nothing listens here, so every command fails after its span opens.
        let config = RedisConfig {
            url: "redis://127.0.0.1:1".to_string(),
            ..RedisConfig::default()
        };
        let store = RedisTtlStore::new(&config).unwrap();
        assert!(store.ping().await.is_err());
        assert!(store.get("k").await.is_err());
        assert!(store.set("k", b"v", Duration::from_secs(1)).await.is_err());
        assert!(store.expire("k", Duration::from_secs(1)).await.is_err());
        assert!(store.get_with_touch("k", Duration::from_secs(1)).await.is_err());

        let names = spans.0.lock().unwrap().clone();
        for op in ["ping", "get", "set", "expire", "get_with_touch"] {
            assert!(names.iter().any(|n| n == op), "no span for {}", op);
        }
    }

    #[cfg(feature = "integration")]
    #[tokio::test]
    async fn conformance_against_live_redis() {
        let url = std::env::var("REDIS_URL").unwrap_or_else(|_| "redis://localhost:6379".into());
        let config = RedisConfig {
            url,
            prefix: format!("filebox-test-{}", std::process::id()),
            ..RedisConfig::default()
        };
        let store = RedisTtlStore::new(&config).unwrap();
        crate::testing::run_store_conformance_tests(&store)
            .await
            .unwrap();
    }
}
