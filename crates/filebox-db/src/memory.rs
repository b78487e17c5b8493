use std::collections::HashMap;
use std::sync::Arc;

use chrono::Utc;
use filebox_core::models::{FileRecord, NewFileRecord};
use filebox_core::AppError;
use tokio::sync::RwLock;
use uuid::Uuid;

use crate::FileRecordRepository;

/// Process-local record store.
#[derive(Clone, Default)]
pub struct InMemoryFileRecordRepository {
    records: Arc<RwLock<HashMap<Uuid, FileRecord>>>,
}

impl InMemoryFileRecordRepository {
    pub fn new() -> Self {
        Self::default()
    }

    pub async fn len(&self) -> usize {
        self.records.read().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.records.read().await.is_empty()
    }
}

#[async_trait::async_trait]
impl FileRecordRepository for InMemoryFileRecordRepository {
    async fn find_by_id(&self, id: Uuid) -> Result<Option<FileRecord>, AppError> {
        Ok(self.records.read().await.get(&id).cloned())
    }

    async fn find_by_id_and_filename(
        &self,
        id: Uuid,
        filename: &str,
    ) -> Result<Option<FileRecord>, AppError> {
        Ok(self
            .records
            .read()
            .await
            .get(&id)
            .filter(|r| r.filename == filename)
            .cloned())
    }

    async fn create(&self, record: NewFileRecord) -> Result<FileRecord, AppError> {
        let created = FileRecord {
            id: Uuid::new_v4(),
            size: record.size(),
            filename: record.filename,
            extension: record.extension,
            mime_type: record.mime_type,
            bin_data: record.bin_data,
            is_public: record.is_public,
            created_at: Utc::now(),
        };
        self.records
            .write()
            .await
            .insert(created.id, created.clone());
        Ok(created)
    }

    async fn save(&self, record: &FileRecord) -> Result<(), AppError> {
        let mut records = self.records.write().await;
        match records.get_mut(&record.id) {
            Some(stored) => {
                stored.bin_data = record.bin_data.clone();
                stored.size = record.size;
                Ok(())
            }
            None => Err(AppError::NotFound(format!("File {} not found", record.id))),
        }
    }

    async fn delete_by_id(&self, id: Uuid) -> Result<u64, AppError> {
        Ok(self.records.write().await.remove(&id).map_or(0, |_| 1))
    }
}
