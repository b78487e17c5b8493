//! Defaults shared across crates. Runtime values come from [`crate::Config`].

/// Length of generated alias tokens.
pub const ALIAS_LENGTH: usize = 30;

/// Default (and maximum) alias lifetime: one hour.
pub const ALIAS_TTL_SECS: u64 = 60 * 60;

/// Default thumbnail lifetime: 30 days, refreshed on every hit.
pub const THUMBNAIL_TTL_SECS: u64 = 30 * 24 * 60 * 60;

/// JPEG quality used when encoding thumbnails.
pub const THUMBNAIL_QUALITY: u8 = 80;

/// Key namespace for alias entries in the TTL store.
pub const ALIAS_KEY_PREFIX: &str = "file";

/// Key namespace for thumbnail entries in the TTL store.
pub const THUMBNAIL_KEY_PREFIX: &str = "thumbnail";

pub const OPTIMIZER_URL: &str = "https://api.megaoptim.com/v1/optimize";

/// Server-side long-poll bound passed to the provider's result endpoint.
pub const OPTIMIZER_POLL_TIMEOUT_SECS: u64 = 300;

/// Header carrying the provider API key.
pub const OPTIMIZER_API_KEY_HEADER: &str = "X-API-KEY";

/// Fallback content type for payloads whose type cannot be detected.
pub const OCTET_STREAM: &str = "application/octet-stream";

/// Fallback extension for payloads whose type cannot be detected.
pub const UNKNOWN_EXTENSION: &str = "bin";
