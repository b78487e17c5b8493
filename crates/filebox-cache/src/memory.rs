use std::collections::HashMap;
use std::sync::Mutex;
use std::time::Duration;

use async_trait::async_trait;
use tokio::time::Instant;

use crate::{CacheError, TtlStore};

struct Entry {
    value: Vec<u8>,
    expires_at: Instant,
}

/// How often `set` sweeps out expired entries that were never read again.
const DEFAULT_SWEEP_INTERVAL: Duration = Duration::from_secs(60);

struct Entries {
    map: HashMap<String, Entry>,
    last_sweep: Instant,
}

/// In-process [`TtlStore`]. Expired entries are dropped when next touched, and
/// writes sweep the whole map at most once per sweep interval.
///
/// Time comes from `tokio::time`, so paused-clock tests can advance past a TTL.
pub struct MemoryTtlStore {
    entries: Mutex<Entries>,
    sweep_interval: Duration,
}

impl Default for MemoryTtlStore {
    fn default() -> Self {
        Self::with_sweep_interval(DEFAULT_SWEEP_INTERVAL)
    }
}

impl MemoryTtlStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_sweep_interval(sweep_interval: Duration) -> Self {
        Self {
            entries: Mutex::new(Entries {
                map: HashMap::new(),
                last_sweep: Instant::now(),
            }),
            sweep_interval,
        }
    }

    /// Number of live entries.
    pub fn len(&self) -> usize {
        let now = Instant::now();
        self.lock()
            .map(|entries| entries.map.values().filter(|e| e.expires_at > now).count())
            .unwrap_or(0)
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    #[cfg(test)]
    fn stored_len(&self) -> usize {
        self.lock().map(|entries| entries.map.len()).unwrap_or(0)
    }

    fn lock(&self) -> Result<std::sync::MutexGuard<'_, Entries>, CacheError> {
        self.entries
            .lock()
            .map_err(|_| CacheError::Backend("memory store lock poisoned".to_string()))
    }
}

#[async_trait]
impl TtlStore for MemoryTtlStore {
    async fn get(&self, key: &str) -> Result<Option<Vec<u8>>, CacheError> {
        let mut entries = self.lock()?;
        match entries.map.get(key) {
            Some(entry) if entry.expires_at > Instant::now() => Ok(Some(entry.value.clone())),
            Some(_) => {
                entries.map.remove(key);
                Ok(None)
            }
            None => Ok(None),
        }
    }

    async fn set(&self, key: &str, value: &[u8], ttl: Duration) -> Result<(), CacheError> {
        let now = Instant::now();
        let entry = Entry {
            value: value.to_vec(),
            expires_at: now + ttl,
        };

        let mut entries = self.lock()?;
        if now.duration_since(entries.last_sweep) >= self.sweep_interval {
            let before = entries.map.len();
            entries.map.retain(|_, e| e.expires_at > now);
            entries.last_sweep = now;
            tracing::debug!(
                removed = before - entries.map.len(),
                remaining = entries.map.len(),
                "Swept expired entries"
            );
        }
        entries.map.insert(key.to_string(), entry);
        Ok(())
    }

    async fn expire(&self, key: &str, ttl: Duration) -> Result<bool, CacheError> {
        let now = Instant::now();
        let mut entries = self.lock()?;
        match entries.map.get_mut(key) {
            Some(entry) if entry.expires_at > now => {
                entry.expires_at = now + ttl;
                Ok(true)
            }
            Some(_) => {
                entries.map.remove(key);
                Ok(false)
            }
            None => Ok(false),
        }
    }
}
