//! Image optimization provider

mod client;

pub use client::OptimizationClient;

use std::path::Path;

use async_trait::async_trait;
use filebox_core::models::{OptimizeOptions, OptimizedResult};
use filebox_core::AppError;

/// Remote optimization of a local image file.
#[async_trait]
pub trait ImageOptimizer: Send + Sync {
    /// Optimize the file at `path`.
    ///
    /// `Ok(None)` when the provider reports an error or an unexpected status; those
    /// are logged, not raised. Transport failures are returned as `AppError::Upstream`.
    async fn optimize(
        &self,
        path: &Path,
        options: &OptimizeOptions,
    ) -> Result<Option<OptimizedResult>, AppError>;

    /// Download the optimized payload from a result URL.
    async fn fetch_result(&self, url: &str) -> Result<Vec<u8>, AppError>;
}
