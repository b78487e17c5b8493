#![allow(dead_code)]

use std::io::Cursor;
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use async_trait::async_trait;
use base64::engine::general_purpose::STANDARD;
use base64::Engine;
use filebox_cache::{CacheError, MemoryTtlStore, TtlStore};
use filebox_core::models::{OptimizeOptions, OptimizedResult};
use filebox_core::{AppError, Config};
use filebox_db::InMemoryFileRecordRepository;
use filebox_services::{FileService, ImageOptimizer};
use image::{ImageFormat, Rgb, RgbImage};

pub fn png_bytes(width: u32, height: u32) -> Vec<u8> {
    let img = RgbImage::from_fn(width, height, |x, y| Rgb([(x * 20) as u8, (y * 20) as u8, 128]));
    let mut buffer = Vec::new();
    img.write_to(&mut Cursor::new(&mut buffer), ImageFormat::Png)
        .unwrap();
    buffer
}

pub fn base64(data: &[u8]) -> String {
    STANDARD.encode(data)
}

/// TTL store wrapper that counts calls.
#[derive(Default)]
pub struct CountingStore {
    inner: MemoryTtlStore,
    pub gets: AtomicUsize,
    pub sets: AtomicUsize,
}

impl CountingStore {
    pub fn calls(&self) -> usize {
        self.gets.load(Ordering::SeqCst) + self.sets.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl TtlStore for CountingStore {
    async fn get(&self, key: &str) -> Result<Option<Vec<u8>>, CacheError> {
        self.gets.fetch_add(1, Ordering::SeqCst);
        self.inner.get(key).await
    }

    async fn set(&self, key: &str, value: &[u8], ttl: Duration) -> Result<(), CacheError> {
        self.sets.fetch_add(1, Ordering::SeqCst);
        self.inner.set(key, value, ttl).await
    }

    async fn expire(&self, key: &str, ttl: Duration) -> Result<bool, CacheError> {
        self.inner.expire(key, ttl).await
    }
}

/// Provider double returning a fixed outcome.
#[derive(Default)]
pub struct StubOptimizer {
    pub result: Option<OptimizedResult>,
    pub payload: Vec<u8>,
    pub seen_paths: Mutex<Vec<PathBuf>>,
    pub seen_contents: Mutex<Vec<Vec<u8>>>,
}

impl StubOptimizer {
    pub fn returning(result: Option<OptimizedResult>, payload: Vec<u8>) -> Self {
        Self {
            result,
            payload,
            ..Default::default()
        }
    }

    pub fn successful(payload: Vec<u8>) -> Self {
        let result = OptimizedResult {
            url: Some("https://cdn.example.com/optimized.png".to_string()),
            optimized_size: Some(payload.len() as u64),
            saved_percent: Some(42.0),
            success: true,
            ..Default::default()
        };
        Self::returning(Some(result), payload)
    }

    pub fn last_path(&self) -> Option<PathBuf> {
        self.seen_paths.lock().unwrap().last().cloned()
    }
}

#[async_trait]
impl ImageOptimizer for StubOptimizer {
    async fn optimize(
        &self,
        path: &Path,
        _options: &OptimizeOptions,
    ) -> Result<Option<OptimizedResult>, AppError> {
        self.seen_paths.lock().unwrap().push(path.to_path_buf());
        self.seen_contents
            .lock()
            .unwrap()
            .push(std::fs::read(path).unwrap());
        Ok(self.result.clone())
    }

    async fn fetch_result(&self, _url: &str) -> Result<Vec<u8>, AppError> {
        Ok(self.payload.clone())
    }
}

pub fn test_config(temp_dir: &Path) -> Config {
    let mut config = Config::default();
    config.optimizer.temp_dir = temp_dir.to_path_buf();
    config
}

pub struct TestContext {
    pub service: FileService,
    pub records: InMemoryFileRecordRepository,
    pub cache: Arc<CountingStore>,
    pub temp_dir: tempfile::TempDir,
}

pub fn context_with(optimizer: Arc<dyn ImageOptimizer>) -> TestContext {
    let temp_dir = tempfile::tempdir().unwrap();
    let config = test_config(temp_dir.path());
    let records = InMemoryFileRecordRepository::new();
    let cache = Arc::new(CountingStore::default());

    let service = FileService::from_config(
        &config,
        Arc::new(records.clone()),
        cache.clone(),
        optimizer,
    );

    TestContext {
        service,
        records,
        cache,
        temp_dir,
    }
}

pub fn context() -> TestContext {
    context_with(Arc::new(StubOptimizer::default()))
}

pub fn dir_is_empty(path: &Path) -> bool {
    std::fs::read_dir(path).map(|mut d| d.next().is_none()).unwrap_or(true)
}
