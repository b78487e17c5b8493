use filebox_core::models::{FileRecord, NewFileRecord};
use filebox_core::AppError;
use uuid::Uuid;

/// Persistence for file records
#[async_trait::async_trait]
pub trait FileRecordRepository: Send + Sync {
    async fn find_by_id(&self, id: Uuid) -> Result<Option<FileRecord>, AppError>;

    /// Compound lookup used by downloads: both the id and the stored filename must match.
    async fn find_by_id_and_filename(
        &self,
        id: Uuid,
        filename: &str,
    ) -> Result<Option<FileRecord>, AppError>;

    async fn create(&self, record: NewFileRecord) -> Result<FileRecord, AppError>;

    /// Persist the payload and size of an existing record.
    /// Fails with `NotFound` if the record no longer exists.
    async fn save(&self, record: &FileRecord) -> Result<(), AppError>;

    /// Number of records removed (0 or 1).
    async fn delete_by_id(&self, id: Uuid) -> Result<u64, AppError>;
}
