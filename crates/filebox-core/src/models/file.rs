use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use uuid::Uuid;

/// Stored file: metadata plus the binary payload.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[cfg_attr(feature = "sqlx", derive(sqlx::FromRow))]
pub struct FileRecord {
    pub id: Uuid,
    pub filename: String,
    pub extension: String,
    pub mime_type: String,
    pub size: i64,
    #[serde(skip)]
    pub bin_data: Vec<u8>,
    pub is_public: bool,
    pub created_at: DateTime<Utc>,
}

impl FileRecord {
    pub fn is_image(&self) -> bool {
        self.mime_type.starts_with("image/")
    }

    /// Swap the payload in place, keeping `size` in step with it.
    pub fn replace_payload(&mut self, bin_data: Vec<u8>) {
        self.size = bin_data.len() as i64;
        self.bin_data = bin_data;
    }
}

/// Data for a record that does not exist yet. Id and creation time are assigned by the store.
#[derive(Debug, Clone)]
pub struct NewFileRecord {
    pub filename: String,
    pub extension: String,
    pub mime_type: String,
    pub bin_data: Vec<u8>,
    pub is_public: bool,
}

impl NewFileRecord {
    pub fn size(&self) -> i64 {
        self.bin_data.len() as i64
    }
}

/// Public view of a record, with a download URL.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct FileInfo {
    #[serde(rename = "_id")]
    pub id: Uuid,
    pub filename: String,
    pub extension: String,
    pub mime_type: String,
    pub size: i64,
    pub url: String,
}

impl FileInfo {
    pub fn from_record(record: &FileRecord, url: String) -> Self {
        FileInfo {
            id: record.id,
            filename: record.filename.clone(),
            extension: record.extension.clone(),
            mime_type: record.mime_type.clone(),
            size: record.size,
            url,
        }
    }
}

/// Payload returned by a raw fetch.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FileContent {
    pub mime_type: String,
    pub bin_data: Vec<u8>,
}

impl From<FileRecord> for FileContent {
    fn from(record: FileRecord) -> Self {
        FileContent {
            mime_type: record.mime_type,
            bin_data: record.bin_data,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct DeleteResult {
    pub deleted_count: u64,
}
