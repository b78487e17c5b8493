//! TTL key-value stores
//!
//! Aliases and thumbnails both live in a [`TtlStore`]: opaque byte values under
//! string keys, each with its own time-to-live. [`RedisTtlStore`] is the production
//! backend; [`MemoryTtlStore`] expires entries lazily in process.

mod config;
mod error;
mod memory;
mod redis_store;
mod store;
pub mod testing;

pub use config::RedisConfig;
pub use error::CacheError;
pub use memory::MemoryTtlStore;
pub use redis_store::RedisTtlStore;
pub use store::TtlStore;
