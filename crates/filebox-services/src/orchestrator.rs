//! Optimize-and-replace workflow for stored images.

use std::path::PathBuf;
use std::sync::Arc;
use std::time::Instant;

use filebox_core::models::{FileRecord, OptimizeOptions};
use filebox_core::AppError;
use filebox_db::FileRecordRepository;
use tempfile::NamedTempFile;
use uuid::Uuid;

use crate::optimizer::ImageOptimizer;

/// Runs one optimization per call: record → temp file → provider → record update.
///
/// Each call writes to its own temporary file, removed when the call returns on
/// every path. The record is only mutated after the replacement bytes are fully
/// downloaded.
pub struct OptimizationOrchestrator {
    records: Arc<dyn FileRecordRepository>,
    optimizer: Arc<dyn ImageOptimizer>,
    temp_dir: PathBuf,
}

impl OptimizationOrchestrator {
    pub fn new(
        records: Arc<dyn FileRecordRepository>,
        optimizer: Arc<dyn ImageOptimizer>,
        temp_dir: PathBuf,
    ) -> Self {
        Self {
            records,
            optimizer,
            temp_dir,
        }
    }

    async fn write_temp(&self, record: &FileRecord) -> Result<NamedTempFile, AppError> {
        tokio::fs::create_dir_all(&self.temp_dir).await?;

        let prefix = format!("{}-", record.id);
        let suffix = format!(".{}", record.extension);
        let temp = tempfile::Builder::new()
            .prefix(&prefix)
            .suffix(&suffix)
            .tempfile_in(&self.temp_dir)?;

        tokio::fs::write(temp.path(), &record.bin_data).await?;
        Ok(temp)
    }

    /// Optimized record, or `None` when the record is missing or the provider
    /// produced nothing usable. In the `None` case the stored file is unchanged.
    #[tracing::instrument(skip(self, options), fields(file_id = %id))]
    pub async fn optimize(
        &self,
        id: Uuid,
        options: &OptimizeOptions,
    ) -> Result<Option<FileRecord>, AppError> {
        let Some(mut record) = self.records.find_by_id(id).await? else {
            return Ok(None);
        };

        let start = Instant::now();
        let temp = self.write_temp(&record).await?;

        let optimized = self.optimizer.optimize(temp.path(), options).await?;
        let Some(result) = optimized else {
            tracing::info!("Optimization produced no result; file unchanged");
            return Ok(None);
        };
        let Some(url) = result.success_url() else {
            tracing::info!("Optimization unsuccessful; file unchanged");
            return Ok(None);
        };

        let bytes = self.optimizer.fetch_result(url).await?;
        temp.close()?;

        if let Some(reported) = result.optimized_size {
            if reported != bytes.len() as u64 {
                tracing::warn!(
                    reported_size = reported,
                    fetched_size = bytes.len(),
                    "Provider size differs from downloaded payload; using downloaded size"
                );
            }
        }

        let original_size = record.size;
        record.replace_payload(bytes);
        self.records.save(&record).await?;

        tracing::info!(
            filename = %record.filename,
            original_size,
            optimized_size = record.size,
            saved_percent = result.saved_percent.unwrap_or_default(),
            duration_ms = start.elapsed().as_millis() as u64,
            "Optimized file"
        );

        Ok(Some(record))
    }
}
