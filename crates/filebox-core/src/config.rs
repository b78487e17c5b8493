//! Configuration module
//!
//! Configuration is read once from the environment at startup and handed to
//! constructors as plain structs. Components never read environment variables on
//! their own.

use std::env;
use std::path::PathBuf;
use std::time::Duration;

use crate::constants;

const SERVER_PORT: u16 = 3010;
const API_PREFIX: &str = "/api/files";
const MAX_CONNECTIONS: u32 = 20;
const CONNECTION_TIMEOUT_SECS: u64 = 30;
const REDIS_URL: &str = "redis://localhost:6379";
const REDIS_POOL_SIZE: usize = 16;
const REDIS_KEY_PREFIX: &str = "filebox";
const MAX_FILE_SIZE_MB: usize = 25;

/// Which record store backs file metadata and payloads.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum RecordBackend {
    Postgres,
    Memory,
}

impl RecordBackend {
    pub fn parse(s: &str) -> Result<Self, anyhow::Error> {
        match s.trim().to_lowercase().as_str() {
            "postgres" | "postgresql" => Ok(RecordBackend::Postgres),
            "memory" => Ok(RecordBackend::Memory),
            other => Err(anyhow::anyhow!(
                "RECORD_STORE must be 'postgres' or 'memory', got '{}'",
                other
            )),
        }
    }
}

/// Which TTL key-value store backs aliases and thumbnails.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum CacheBackend {
    Redis,
    Memory,
}

impl CacheBackend {
    pub fn parse(s: &str) -> Result<Self, anyhow::Error> {
        match s.trim().to_lowercase().as_str() {
            "redis" => Ok(CacheBackend::Redis),
            "memory" => Ok(CacheBackend::Memory),
            other => Err(anyhow::anyhow!(
                "CACHE_STORE must be 'redis' or 'memory', got '{}'",
                other
            )),
        }
    }
}

/// Alias issuing policy.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct AliasConfig {
    pub length: usize,
    /// Used when the caller gives no expiry; also the upper bound for caller expiries.
    pub ttl: Duration,
}

impl Default for AliasConfig {
    fn default() -> Self {
        Self {
            length: constants::ALIAS_LENGTH,
            ttl: Duration::from_secs(constants::ALIAS_TTL_SECS),
        }
    }
}

/// Thumbnail cache policy.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ThumbnailConfig {
    pub ttl: Duration,
    pub quality: u8,
    pub single_flight: bool,
}

impl Default for ThumbnailConfig {
    fn default() -> Self {
        Self {
            ttl: Duration::from_secs(constants::THUMBNAIL_TTL_SECS),
            quality: constants::THUMBNAIL_QUALITY,
            single_flight: true,
        }
    }
}

/// Optimization provider connection settings.
#[derive(Clone, PartialEq, Eq)]
pub struct OptimizerConfig {
    pub endpoint: String,
    pub api_key: Option<String>,
    pub poll_timeout_secs: u64,
    pub temp_dir: PathBuf,
}

impl std::fmt::Debug for OptimizerConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("OptimizerConfig")
            .field("endpoint", &self.endpoint)
            .field("api_key", &self.api_key.as_ref().map(|_| "<redacted>"))
            .field("poll_timeout_secs", &self.poll_timeout_secs)
            .field("temp_dir", &self.temp_dir)
            .finish()
    }
}

impl Default for OptimizerConfig {
    fn default() -> Self {
        Self {
            endpoint: constants::OPTIMIZER_URL.to_string(),
            api_key: None,
            poll_timeout_secs: constants::OPTIMIZER_POLL_TIMEOUT_SECS,
            temp_dir: env::temp_dir(),
        }
    }
}

/// Application configuration.
#[derive(Clone, Debug)]
pub struct Config {
    pub environment: String,
    pub server_port: u16,
    pub api_prefix: String,
    pub cors_origins: Vec<String>,
    pub record_backend: RecordBackend,
    pub database_url: Option<String>,
    pub db_max_connections: u32,
    pub db_timeout_seconds: u64,
    pub cache_backend: CacheBackend,
    pub redis_url: String,
    pub redis_pool_size: usize,
    pub redis_key_prefix: String,
    pub max_file_size_bytes: usize,
    pub public_base_url: String,
    pub alias: AliasConfig,
    pub thumbnail: ThumbnailConfig,
    pub optimizer: OptimizerConfig,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            environment: "development".to_string(),
            server_port: SERVER_PORT,
            api_prefix: API_PREFIX.to_string(),
            cors_origins: vec!["*".to_string()],
            record_backend: RecordBackend::Memory,
            database_url: None,
            db_max_connections: MAX_CONNECTIONS,
            db_timeout_seconds: CONNECTION_TIMEOUT_SECS,
            cache_backend: CacheBackend::Memory,
            redis_url: REDIS_URL.to_string(),
            redis_pool_size: REDIS_POOL_SIZE,
            redis_key_prefix: REDIS_KEY_PREFIX.to_string(),
            max_file_size_bytes: MAX_FILE_SIZE_MB * 1024 * 1024,
            public_base_url: String::new(),
            alias: AliasConfig::default(),
            thumbnail: ThumbnailConfig::default(),
            optimizer: OptimizerConfig::default(),
        }
    }
}

impl Config {
    /// Load from the process environment (after `.env`, when present).
    pub fn from_env() -> Result<Self, anyhow::Error> {
        dotenvy::dotenv().ok();
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Build from an arbitrary variable source.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, anyhow::Error>
    where
        F: Fn(&str) -> Option<String>,
    {
        let environment = lookup("ENVIRONMENT")
            .or_else(|| lookup("APP_ENV"))
            .unwrap_or_else(|| "development".to_string());

        let cors_origins: Vec<String> = lookup("CORS_ORIGINS")
            .unwrap_or_else(|| "*".to_string())
            .split(',')
            .map(|s| s.trim().to_string())
            .filter(|s| !s.is_empty())
            .collect();

        let record_backend =
            RecordBackend::parse(&lookup("RECORD_STORE").unwrap_or_else(|| "postgres".into()))?;
        let cache_backend =
            CacheBackend::parse(&lookup("CACHE_STORE").unwrap_or_else(|| "redis".into()))?;

        let max_file_size_mb: usize = parse_or("MAX_FILE_SIZE_MB", &lookup, MAX_FILE_SIZE_MB)?;

        let alias = AliasConfig {
            length: parse_or("ALIAS_LENGTH", &lookup, constants::ALIAS_LENGTH)?,
            ttl: Duration::from_secs(parse_or(
                "ALIAS_TTL_SECONDS",
                &lookup,
                constants::ALIAS_TTL_SECS,
            )?),
        };

        let thumbnail = ThumbnailConfig {
            ttl: Duration::from_secs(parse_or(
                "THUMBNAIL_TTL_SECONDS",
                &lookup,
                constants::THUMBNAIL_TTL_SECS,
            )?),
            quality: parse_or("THUMBNAIL_QUALITY", &lookup, constants::THUMBNAIL_QUALITY)?,
            single_flight: parse_bool_or("THUMBNAIL_SINGLE_FLIGHT", &lookup, true)?,
        };

        let optimizer = OptimizerConfig {
            endpoint: lookup("OPTIMIZER_URL").unwrap_or_else(|| constants::OPTIMIZER_URL.into()),
            api_key: lookup("OPTIMIZER_API_KEY").filter(|k| !k.trim().is_empty()),
            poll_timeout_secs: parse_or(
                "OPTIMIZER_POLL_TIMEOUT_SECONDS",
                &lookup,
                constants::OPTIMIZER_POLL_TIMEOUT_SECS,
            )?,
            temp_dir: lookup("TEMP_DIR")
                .map(PathBuf::from)
                .unwrap_or_else(env::temp_dir),
        };

        let config = Config {
            environment,
            server_port: parse_or("PORT", &lookup, SERVER_PORT)?,
            api_prefix: lookup("API_PREFIX").unwrap_or_else(|| API_PREFIX.to_string()),
            cors_origins,
            record_backend,
            database_url: lookup("DATABASE_URL"),
            db_max_connections: parse_or("DB_MAX_CONNECTIONS", &lookup, MAX_CONNECTIONS)?,
            db_timeout_seconds: parse_or("DB_TIMEOUT_SECONDS", &lookup, CONNECTION_TIMEOUT_SECS)?,
            cache_backend,
            redis_url: lookup("REDIS_URL").unwrap_or_else(|| REDIS_URL.to_string()),
            redis_pool_size: parse_or("REDIS_POOL_SIZE", &lookup, REDIS_POOL_SIZE)?,
            redis_key_prefix: lookup("REDIS_KEY_PREFIX")
                .unwrap_or_else(|| REDIS_KEY_PREFIX.to_string()),
            max_file_size_bytes: max_file_size_mb * 1024 * 1024,
            public_base_url: lookup("PUBLIC_BASE_URL").unwrap_or_default(),
            alias,
            thumbnail,
            optimizer,
        };

        Ok(config)
    }

    /// Check if the application is running in production mode
    pub fn is_production(&self) -> bool {
        let env = self.environment.to_lowercase();
        env == "production" || env == "prod"
    }

    pub fn validate(&self) -> Result<(), anyhow::Error> {
        if self.is_production() && self.cors_origins.iter().any(|o| o == "*") {
            return Err(anyhow::anyhow!(
                "CORS_ORIGINS cannot be '*' in production. Please specify explicit origins."
            ));
        }

        if !(8..=64).contains(&self.alias.length) {
            return Err(anyhow::anyhow!("ALIAS_LENGTH must be between 8 and 64"));
        }

        // Permanent ids are UUIDs (32 simple / 36 hyphenated); aliases are told apart by length.
        if self.alias.length == 32 || self.alias.length == 36 {
            return Err(anyhow::anyhow!(
                "ALIAS_LENGTH must differ from the permanent id lengths (32, 36)"
            ));
        }

        if self.alias.ttl.is_zero() {
            return Err(anyhow::anyhow!("ALIAS_TTL_SECONDS must be greater than 0"));
        }

        if self.thumbnail.ttl.is_zero() {
            return Err(anyhow::anyhow!(
                "THUMBNAIL_TTL_SECONDS must be greater than 0"
            ));
        }

        if !(1..=100).contains(&self.thumbnail.quality) {
            return Err(anyhow::anyhow!("THUMBNAIL_QUALITY must be between 1 and 100"));
        }

        if self.max_file_size_bytes == 0 {
            return Err(anyhow::anyhow!("MAX_FILE_SIZE_MB must be greater than 0"));
        }

        if self.record_backend == RecordBackend::Postgres {
            let url = self.database_url.as_deref().ok_or_else(|| {
                anyhow::anyhow!("DATABASE_URL must be set when RECORD_STORE=postgres")
            })?;
            if !(url.starts_with("postgres://") || url.starts_with("postgresql://")) {
                return Err(anyhow::anyhow!(
                    "DATABASE_URL must be a valid PostgreSQL connection string"
                ));
            }
        }

        if self.cache_backend == CacheBackend::Redis && !self.redis_url.starts_with("redis") {
            return Err(anyhow::anyhow!("REDIS_URL must be a redis:// or rediss:// URL"));
        }

        Ok(())
    }
}

fn parse_or<T, F>(key: &str, lookup: &F, default: T) -> Result<T, anyhow::Error>
where
    T: std::str::FromStr,
    F: Fn(&str) -> Option<String>,
{
    match lookup(key) {
        Some(raw) => raw
            .trim()
            .parse::<T>()
            .map_err(|_| anyhow::anyhow!("{} must be a valid number, got '{}'", key, raw)),
        None => Ok(default),
    }
}

fn parse_bool_or<F>(key: &str, lookup: &F, default: bool) -> Result<bool, anyhow::Error>
where
    F: Fn(&str) -> Option<String>,
{
    match lookup(key).map(|v| v.trim().to_lowercase()) {
        Some(v) if v == "true" || v == "1" || v == "yes" => Ok(true),
        Some(v) if v == "false" || v == "0" || v == "no" => Ok(false),
        Some(v) => Err(anyhow::anyhow!("{} must be a boolean, got '{}'", key, v)),
        None => Ok(default),
    }
}
