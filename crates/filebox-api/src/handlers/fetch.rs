//! Byte downloads by alias or permanent id.

use crate::error::HttpAppError;
use crate::state::AppState;
use axum::{
    extract::{Path, Query, State},
    http::header,
    response::{IntoResponse, Response},
};
use filebox_core::AppError;
use serde::Deserialize;
use std::sync::Arc;
use utoipa::IntoParams;

const THUMBNAIL_MIME: &str = "image/jpeg";

#[derive(Debug, Deserialize, IntoParams)]
pub struct FetchQuery {
    /// Thumbnail bucket: xs, sm, md or lg
    pub size: Option<String>,
}

fn not_found() -> AppError {
    AppError::NotFound("File not found".to_string())
}

#[utoipa::path(
    get,
    path = "/api/files/file/{alias_or_id}/{filename}",
    tag = "files",
    params(
        ("alias_or_id" = String, Path, description = "Temporary alias or permanent file id"),
        ("filename" = String, Path, description = "Stored filename"),
        FetchQuery
    ),
    responses(
        (status = 200, description = "File bytes with the stored mime type, or a JPEG thumbnail"),
        (status = 404, description = "Unknown file, expired alias, or no thumbnail available")
    )
)]
pub async fn fetch_file(
    State(state): State<Arc<AppState>>,
    Path((alias_or_id, filename)): Path<(String, String)>,
    Query(query): Query<FetchQuery>,
) -> Result<Response, HttpAppError> {
    if let Some(bucket) = query.size.as_deref() {
        let bytes = state
            .service
            .fetch_thumbnail(&alias_or_id, &filename, bucket)
            .await?
            .ok_or_else(not_found)?;
        return Ok(([(header::CONTENT_TYPE, THUMBNAIL_MIME)], bytes).into_response());
    }

    let content = state
        .service
        .fetch_file(&alias_or_id, &filename)
        .await?
        .ok_or_else(not_found)?;

    Ok(([(header::CONTENT_TYPE, content.mime_type)], content.bin_data).into_response())
}
