//! File operations exposed to the transport layer.

use std::sync::Arc;
use std::time::Duration;

use chrono::Utc;
use filebox_core::constants::{OCTET_STREAM, UNKNOWN_EXTENSION};
use filebox_core::models::{
    CreateFileRequest, DeleteFileRequest, DeleteResult, FileContent, FileInfo, FileRecord,
    GetFileRequest, NewFileRecord, OptimizeFileRequest, OptimizeOptions,
};
use filebox_core::validation::{normalize_filename, validate_optimize_options};
use filebox_cache::TtlStore;
use filebox_core::{AppError, Config, FieldErrors};
use filebox_db::FileRecordRepository;
use filebox_processing::{ImageCodec, ImageCrateCodec, UploadValidator};
use uuid::Uuid;
use validator::Validate;

use crate::{AliasResolver, ImageOptimizer, OptimizationOrchestrator, ThumbnailCache};

pub struct FileService {
    records: Arc<dyn FileRecordRepository>,
    aliases: AliasResolver,
    thumbnails: ThumbnailCache,
    orchestrator: OptimizationOrchestrator,
    codec: Arc<dyn ImageCodec>,
    uploads: UploadValidator,
    url_prefix: String,
}

impl FileService {
    /// `url_prefix` is prepended to `/file/{id}/{filename}` in generated URLs.
    pub fn new(
        records: Arc<dyn FileRecordRepository>,
        aliases: AliasResolver,
        thumbnails: ThumbnailCache,
        orchestrator: OptimizationOrchestrator,
        codec: Arc<dyn ImageCodec>,
        uploads: UploadValidator,
        url_prefix: impl Into<String>,
    ) -> Self {
        Self {
            records,
            aliases,
            thumbnails,
            orchestrator,
            codec,
            uploads,
            url_prefix: url_prefix.into().trim_end_matches('/').to_string(),
        }
    }

    /// Wire the service from configuration over the given stores and provider.
    pub fn from_config(
        config: &Config,
        records: Arc<dyn FileRecordRepository>,
        cache: Arc<dyn TtlStore>,
        optimizer: Arc<dyn ImageOptimizer>,
    ) -> Self {
        let codec: Arc<dyn ImageCodec> = Arc::new(ImageCrateCodec);
        let url_prefix = format!(
            "{}{}",
            config.public_base_url.trim_end_matches('/'),
            config.api_prefix
        );

        Self::new(
            Arc::clone(&records),
            AliasResolver::new(Arc::clone(&cache), config.alias.clone()),
            ThumbnailCache::new(cache, Arc::clone(&codec), config.thumbnail.clone()),
            OptimizationOrchestrator::new(
                records,
                optimizer,
                config.optimizer.temp_dir.clone(),
            ),
            codec,
            UploadValidator::new(config.max_file_size_bytes),
            url_prefix,
        )
    }

    fn public_url(&self, id: &str, filename: &str) -> String {
        format!("{}/file/{}/{}", self.url_prefix, id, filename)
    }

    /// Permanent-id URL for public records without an explicit expiry; otherwise a
    /// URL through a freshly issued alias.
    async fn file_info(
        &self,
        record: &FileRecord,
        ex: Option<u64>,
    ) -> Result<FileInfo, AppError> {
        let url = if record.is_public && ex.is_none() {
            self.public_url(&record.id.to_string(), &record.filename)
        } else {
            let alias = self
                .aliases
                .issue(record.id, ex.map(Duration::from_secs))
                .await?;
            self.public_url(&alias, &record.filename)
        };

        Ok(FileInfo::from_record(record, url))
    }

    fn parse_id(raw: Option<&str>) -> Result<Uuid, AppError> {
        let raw = raw.unwrap_or_default();
        Uuid::try_parse(raw).map_err(|_| {
            let mut report = FieldErrors::new();
            report.add("id", "id must be a valid file id");
            AppError::Validation(report)
        })
    }

    #[tracing::instrument(skip(self, request))]
    pub async fn get_file_info(
        &self,
        request: GetFileRequest,
    ) -> Result<Option<FileInfo>, AppError> {
        request.validate()?;
        let id = Self::parse_id(request.id.as_deref())?;

        let Some(record) = self.records.find_by_id(id).await? else {
            return Ok(None);
        };

        Ok(Some(self.file_info(&record, request.ex).await?))
    }

    #[tracing::instrument(skip(self, request))]
    pub async fn create_file(&self, request: CreateFileRequest) -> Result<FileInfo, AppError> {
        request.validate().map_err(|e| {
            AppError::Validation(FieldErrors::from(e).rename("bin_data", "binData"))
        })?;

        let encoded = request.bin_data.as_deref().unwrap_or_default();
        let bin_data = self.uploads.decode_payload(encoded)?;

        let (mime_type, extension) = match self.codec.detect_type(&bin_data) {
            Some(detected) => (detected.mime_type, detected.extension),
            None => (OCTET_STREAM.to_string(), UNKNOWN_EXTENSION.to_string()),
        };

        let filename = normalize_filename(
            request.filename.as_deref().unwrap_or_default(),
            &extension,
            Utc::now().timestamp_millis(),
        );

        let created = self
            .records
            .create(NewFileRecord {
                filename,
                extension,
                mime_type,
                bin_data,
                is_public: request.is_public.unwrap_or(true),
            })
            .await?;

        tracing::info!(
            file_id = %created.id,
            filename = %created.filename,
            mime_type = %created.mime_type,
            size_bytes = created.size,
            is_public = created.is_public,
            "File stored"
        );

        self.file_info(&created, None).await
    }

    #[tracing::instrument(skip(self, request))]
    pub async fn delete_file(&self, request: DeleteFileRequest) -> Result<DeleteResult, AppError> {
        request.validate()?;
        let id = Self::parse_id(request.id.as_deref())?;

        let deleted_count = self.records.delete_by_id(id).await?;
        tracing::info!(file_id = %id, deleted_count, "File delete requested");

        Ok(DeleteResult { deleted_count })
    }

    /// Updated file info, or `None` when the file is missing or the provider did not
    /// produce a replacement.
    #[tracing::instrument(skip(self, request))]
    pub async fn optimize_file(
        &self,
        request: OptimizeFileRequest,
    ) -> Result<Option<FileInfo>, AppError> {
        request.validate()?;
        let id = Self::parse_id(request.id.as_deref())?;
        let options = request.options.unwrap_or_else(OptimizeOptions::new);
        validate_optimize_options(&options)?;

        let Some(record) = self.orchestrator.optimize(id, &options).await? else {
            return Ok(None);
        };

        Ok(Some(self.file_info(&record, None).await?))
    }

    async fn find_for_download(
        &self,
        alias_or_id: &str,
        filename: &str,
    ) -> Result<Option<FileRecord>, AppError> {
        let Some(id) = self.aliases.resolve(alias_or_id).await? else {
            return Ok(None);
        };
        self.records.find_by_id_and_filename(id, filename).await
    }

    pub async fn fetch_file(
        &self,
        alias_or_id: &str,
        filename: &str,
    ) -> Result<Option<FileContent>, AppError> {
        Ok(self
            .find_for_download(alias_or_id, filename)
            .await?
            .map(FileContent::from))
    }

    /// JPEG thumbnail, or `None` for a missing file, an unsupported bucket, or a
    /// non-image file.
    pub async fn fetch_thumbnail(
        &self,
        alias_or_id: &str,
        filename: &str,
        bucket: &str,
    ) -> Result<Option<Vec<u8>>, AppError> {
        let Some(record) = self.find_for_download(alias_or_id, filename).await? else {
            return Ok(None);
        };
        self.thumbnails.thumbnail(&record, bucket).await
    }
}
