use filebox_core::AppError;

/// Errors raised by TTL store backends.
#[derive(Debug, thiserror::Error)]
pub enum CacheError {
    /// The backend could not be reached or a pooled connection could not be obtained.
    #[error("connection error: {0}")]
    Connection(String),

    /// The backend rejected or failed a command.
    #[error("backend error: {0}")]
    Backend(String),
}

impl From<CacheError> for AppError {
    fn from(err: CacheError) -> Self {
        AppError::Cache(err.to_string())
    }
}
