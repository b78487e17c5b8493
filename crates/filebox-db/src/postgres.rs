use filebox_core::models::{FileRecord, NewFileRecord};
use filebox_core::AppError;
use sqlx::migrate::Migrator;
use sqlx::{PgPool, Postgres};
use uuid::Uuid;

use crate::FileRecordRepository;

/// Embedded schema migrations for the `files` table.
pub static MIGRATOR: Migrator = sqlx::migrate!("./migrations");

const FILE_COLUMNS: &str =
    "id, filename, extension, mime_type, size, bin_data, is_public, created_at";

/// Repository for file records in PostgreSQL
#[derive(Clone)]
pub struct PgFileRecordRepository {
    pool: PgPool,
}

impl PgFileRecordRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait::async_trait]
impl FileRecordRepository for PgFileRecordRepository {
    #[tracing::instrument(skip(self), fields(db.table = "files", db.operation = "select", db.record_id = %id))]
    async fn find_by_id(&self, id: Uuid) -> Result<Option<FileRecord>, AppError> {
        let record = sqlx::query_as::<Postgres, FileRecord>(&format!(
            "SELECT {} FROM files WHERE id = $1",
            FILE_COLUMNS
        ))
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(record)
    }

    #[tracing::instrument(skip(self), fields(db.table = "files", db.operation = "select", db.record_id = %id))]
    async fn find_by_id_and_filename(
        &self,
        id: Uuid,
        filename: &str,
    ) -> Result<Option<FileRecord>, AppError> {
        let record = sqlx::query_as::<Postgres, FileRecord>(&format!(
            "SELECT {} FROM files WHERE id = $1 AND filename = $2",
            FILE_COLUMNS
        ))
        .bind(id)
        .bind(filename)
        .fetch_optional(&self.pool)
        .await?;

        Ok(record)
    }

    #[tracing::instrument(skip(self, record), fields(db.table = "files", db.operation = "insert", size_bytes = record.bin_data.len()))]
    async fn create(&self, record: NewFileRecord) -> Result<FileRecord, AppError> {
        let created = sqlx::query_as::<Postgres, FileRecord>(&format!(
            r#"
            INSERT INTO files (filename, extension, mime_type, size, bin_data, is_public)
            VALUES ($1, $2, $3, $4, $5, $6)
            RETURNING {}
            "#,
            FILE_COLUMNS
        ))
        .bind(&record.filename)
        .bind(&record.extension)
        .bind(&record.mime_type)
        .bind(record.size())
        .bind(&record.bin_data)
        .bind(record.is_public)
        .fetch_one(&self.pool)
        .await?;

        tracing::info!(file_id = %created.id, filename = %created.filename, "File record created");

        Ok(created)
    }

    #[tracing::instrument(skip(self, record), fields(db.table = "files", db.operation = "update", db.record_id = %record.id))]
    async fn save(&self, record: &FileRecord) -> Result<(), AppError> {
        let result = sqlx::query("UPDATE files SET bin_data = $2, size = $3 WHERE id = $1")
            .bind(record.id)
            .bind(&record.bin_data)
            .bind(record.size)
            .execute(&self.pool)
            .await?;

        if result.rows_affected() == 0 {
            return Err(AppError::NotFound(format!("File {} not found", record.id)));
        }

        Ok(())
    }

    #[tracing::instrument(skip(self), fields(db.table = "files", db.operation = "delete", db.record_id = %id))]
    async fn delete_by_id(&self, id: Uuid) -> Result<u64, AppError> {
        let result = sqlx::query("DELETE FROM files WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await?;

        Ok(result.rows_affected())
    }
}
