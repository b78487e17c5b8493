//! Cache-aside thumbnails with sliding expiration.

use std::collections::HashMap;
use std::future::Future;
use std::sync::{Arc, Mutex};
use std::time::{Duration, Instant};

use filebox_cache::TtlStore;
use filebox_core::constants::THUMBNAIL_KEY_PREFIX;
use filebox_core::models::{FileRecord, ThumbnailBucket};
use filebox_core::{AppError, ThumbnailConfig};
use filebox_processing::ImageCodec;
use uuid::Uuid;

type Gate = Arc<tokio::sync::Mutex<()>>;

/// A caller's claim on a key's gate.
struct InFlight<'a> {
    cache: &'a ThumbnailCache,
    key: String,
    gate: Gate,
}

impl Drop for InFlight<'_> {
    fn drop(&mut self) {
        self.cache.release_gate(&self.key, &self.gate);
    }
}

/// Resized JPEG derivatives keyed by `(bucket, file id)`.
///
/// Every hit resets the entry's lifetime. With single-flight enabled, concurrent
/// misses for one key wait for a single computation instead of each resizing.
pub struct ThumbnailCache {
    store: Arc<dyn TtlStore>,
    codec: Arc<dyn ImageCodec>,
    config: ThumbnailConfig,
    in_flight: Mutex<HashMap<String, Gate>>,
}

impl ThumbnailCache {
    pub fn new(
        store: Arc<dyn TtlStore>,
        codec: Arc<dyn ImageCodec>,
        config: ThumbnailConfig,
    ) -> Self {
        Self {
            store,
            codec,
            config,
            in_flight: Mutex::new(HashMap::new()),
        }
    }

    fn key(bucket: ThumbnailBucket, id: Uuid) -> String {
        format!("{}:{}:{}", THUMBNAIL_KEY_PREFIX, bucket, id)
    }

    /// Read-with-touch: a hit resets the entry's TTL to the configured default.
    pub async fn get(
        &self,
        bucket: ThumbnailBucket,
        id: Uuid,
    ) -> Result<Option<Vec<u8>>, AppError> {
        Ok(self
            .store
            .get_with_touch(&Self::key(bucket, id), self.config.ttl)
            .await?)
    }

    pub async fn put(
        &self,
        bucket: ThumbnailBucket,
        id: Uuid,
        bytes: &[u8],
        ttl: Option<Duration>,
    ) -> Result<(), AppError> {
        let ttl = ttl.unwrap_or(self.config.ttl);
        self.store.set(&Self::key(bucket, id), bytes, ttl).await?;
        Ok(())
    }

    /// Cached bytes (touching the entry), or the output of `compute`, stored before returning.
    pub async fn get_or_compute<F, Fut>(
        &self,
        bucket: ThumbnailBucket,
        id: Uuid,
        compute: F,
    ) -> Result<Vec<u8>, AppError>
    where
        F: FnOnce() -> Fut,
        Fut: Future<Output = Result<Vec<u8>, AppError>>,
    {
        if let Some(hit) = self.get(bucket, id).await? {
            tracing::debug!(file_id = %id, bucket = %bucket, "Thumbnail cache hit");
            return Ok(hit);
        }

        if !self.config.single_flight {
            return self.compute_and_store(bucket, id, compute).await;
        }

        // Released on drop, so an aborted request still clears its entry.
        let flight = self.acquire_gate(Self::key(bucket, id));
        let _lock = flight.gate.lock().await;

        // Another caller may have filled the entry while this one waited.
        match self.get(bucket, id).await? {
            Some(hit) => Ok(hit),
            None => self.compute_and_store(bucket, id, compute).await,
        }
    }

    async fn compute_and_store<F, Fut>(
        &self,
        bucket: ThumbnailBucket,
        id: Uuid,
        compute: F,
    ) -> Result<Vec<u8>, AppError>
    where
        F: FnOnce() -> Fut,
        Fut: Future<Output = Result<Vec<u8>, AppError>>,
    {
        let start = Instant::now();
        let bytes = compute().await?;
        self.put(bucket, id, &bytes, None).await?;

        tracing::info!(
            file_id = %id,
            bucket = %bucket,
            size_bytes = bytes.len(),
            duration_ms = start.elapsed().as_millis() as u64,
            "Thumbnail generated"
        );
        Ok(bytes)
    }

    fn acquire_gate(&self, key: String) -> InFlight<'_> {
        let mut in_flight = self.in_flight.lock().unwrap_or_else(|p| p.into_inner());
        let gate = in_flight.entry(key.clone()).or_default().clone();
        InFlight {
            cache: self,
            key,
            gate,
        }
    }

    fn release_gate(&self, key: &str, gate: &Gate) {
        let mut in_flight = self.in_flight.lock().unwrap_or_else(|p| p.into_inner());
        // One reference in the map plus ours means nobody else is waiting.
        if Arc::strong_count(gate) <= 2 {
            in_flight.remove(key);
        }
    }

    #[cfg(test)]
    fn in_flight_len(&self) -> usize {
        self.in_flight.lock().map(|m| m.len()).unwrap_or(0)
    }

    /// Thumbnail of `record` for the named bucket.
    ///
    /// `None` for an unknown bucket or a non-image record; neither touches the cache.
    pub async fn thumbnail(
        &self,
        record: &FileRecord,
        bucket: &str,
    ) -> Result<Option<Vec<u8>>, AppError> {
        let bucket = match bucket.parse::<ThumbnailBucket>() {
            Ok(bucket) => bucket,
            Err(e) => {
                tracing::debug!(file_id = %record.id, error = %e, "Unsupported thumbnail bucket");
                return Ok(None);
            }
        };

        if !record.is_image() {
            tracing::debug!(
                file_id = %record.id,
                mime_type = %record.mime_type,
                "Not an image, no thumbnail"
            );
            return Ok(None);
        }

        let source = &record.bin_data;
        let codec = Arc::clone(&self.codec);
        let dimension = bucket.max_dimension();
        let quality = self.config.quality;

        let bytes = self
            .get_or_compute(bucket, record.id, move || async move {
                let data = source.clone();
                tokio::task::spawn_blocking(move || codec.thumbnail(&data, dimension, quality))
                    .await
                    .map_err(|e| AppError::Internal(format!("Thumbnail task failed: {}", e)))?
                    .map_err(AppError::from)
            })
            .await?;

        Ok(Some(bytes))
    }
}
