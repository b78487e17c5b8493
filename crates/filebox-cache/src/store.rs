use std::time::Duration;

use async_trait::async_trait;

use crate::CacheError;

/// Key-value store with a per-key time-to-live.
///
/// Implementations must be `Send + Sync` and safe for concurrent access.
#[async_trait]
pub trait TtlStore: Send + Sync {
    /// Value for `key`, or `None` if missing or expired.
    async fn get(&self, key: &str) -> Result<Option<Vec<u8>>, CacheError>;

    /// Store `value` under `key`, replacing any previous value and lifetime.
    async fn set(&self, key: &str, value: &[u8], ttl: Duration) -> Result<(), CacheError>;

    /// Reset the remaining lifetime of `key`. Returns `false` if the key does not exist.
    async fn expire(&self, key: &str, ttl: Duration) -> Result<bool, CacheError>;

    /// Read and, on a hit, reset the lifetime to `ttl`.
    async fn get_with_touch(
        &self,
        key: &str,
        ttl: Duration,
    ) -> Result<Option<Vec<u8>>, CacheError> {
        let value = self.get(key).await?;
        if value.is_some() {
            self.expire(key, ttl).await?;
        }
        Ok(value)
    }
}
