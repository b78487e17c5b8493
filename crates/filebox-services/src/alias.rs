//! Short-lived public aliases for permanent file ids.

use std::sync::Arc;
use std::time::Duration;

use filebox_cache::TtlStore;
use filebox_core::constants::ALIAS_KEY_PREFIX;
use filebox_core::{AliasConfig, AppError};
use rand::Rng;
use uuid::Uuid;

const TOKEN_ALPHABET: &[u8] = b"ABCDEFGHIJKLMNOPQRSTUVWXYZabcdefghijklmnopqrstuvwxyz0123456789_-";

/// Maps alias tokens to file ids through the TTL store.
///
/// An id whose length equals the configured alias length is treated as an alias;
/// anything else must parse as a permanent id and is returned without a store lookup.
#[derive(Clone)]
pub struct AliasResolver {
    store: Arc<dyn TtlStore>,
    config: AliasConfig,
}

impl AliasResolver {
    pub fn new(store: Arc<dyn TtlStore>, config: AliasConfig) -> Self {
        Self { store, config }
    }

    fn key(token: &str) -> String {
        format!("{}:{}", ALIAS_KEY_PREFIX, token)
    }

    /// Caller expiries are honoured only when shorter than the default.
    fn effective_ttl(&self, requested: Option<Duration>) -> Duration {
        match requested {
            Some(ttl) if !ttl.is_zero() => ttl.min(self.config.ttl),
            _ => self.config.ttl,
        }
    }

    pub async fn resolve(&self, id: &str) -> Result<Option<Uuid>, AppError> {
        if id.len() != self.config.length {
            return Ok(Uuid::try_parse(id).ok());
        }

        let resolved = self
            .store
            .get(&Self::key(id))
            .await?
            .and_then(|raw| String::from_utf8(raw).ok())
            .and_then(|value| Uuid::try_parse(&value).ok());

        if resolved.is_none() {
            tracing::debug!("Alias missing or expired");
        }

        Ok(resolved)
    }

    /// Store a fresh alias for `id`. Every call creates a new, independent token.
    pub async fn issue(&self, id: Uuid, ttl: Option<Duration>) -> Result<String, AppError> {
        let ttl = self.effective_ttl(ttl);
        let token = generate_token(self.config.length);

        self.store
            .set(&Self::key(&token), id.to_string().as_bytes(), ttl)
            .await?;

        tracing::debug!(file_id = %id, ttl_secs = ttl.as_secs(), "Issued file alias");
        Ok(token)
    }
}

fn generate_token(length: usize) -> String {
    let mut rng = rand::rng();
    (0..length)
        .map(|_| TOKEN_ALPHABET[rng.random_range(0..TOKEN_ALPHABET.len())] as char)
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_token_length_and_alphabet() {
        let token = generate_token(30);
        assert_eq!(token.len(), 30);
        assert!(token.bytes().all(|b| TOKEN_ALPHABET.contains(&b)));
    }

    #[test]
    fn test_tokens_differ() {
        assert_ne!(generate_token(30), generate_token(30));
    }

    #[test]
    fn test_requested_ttl_capped_at_default() {
        let resolver = AliasResolver::new(
            Arc::new(filebox_cache::MemoryTtlStore::new()),
            AliasConfig::default(),
        );
        assert_eq!(
            resolver.effective_ttl(Some(Duration::from_secs(2))),
            Duration::from_secs(2)
        );
        assert_eq!(
            resolver.effective_ttl(Some(Duration::from_secs(7200))),
            Duration::from_secs(3600)
        );
        assert_eq!(resolver.effective_ttl(None), Duration::from_secs(3600));
    }
}
