use std::time::Duration;

/// Connection settings for [`crate::RedisTtlStore`].
#[derive(Debug, Clone)]
pub struct RedisConfig {
    /// Redis connection URL (e.g. `redis://127.0.0.1:6379`).
    pub url: String,

    /// Prepended to every key as `{prefix}:{key}`.
    pub prefix: String,

    pub pool_size: usize,

    /// Timeout for acquiring a pooled connection.
    pub connection_timeout: Duration,
}

impl Default for RedisConfig {
    fn default() -> Self {
        Self {
            url: String::from("redis://localhost:6379"),
            prefix: String::from("filebox"),
            pool_size: 16,
            connection_timeout: Duration::from_secs(5),
        }
    }
}

impl From<&filebox_core::Config> for RedisConfig {
    fn from(config: &filebox_core::Config) -> Self {
        Self {
            url: config.redis_url.clone(),
            prefix: config.redis_key_prefix.clone(),
            pool_size: config.redis_pool_size,
            ..Self::default()
        }
    }
}
