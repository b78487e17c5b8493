//! Metadata commands: get, create, delete, optimize.

use crate::error::{ErrorResponse, HttpAppError, JsonBody};
use crate::state::AppState;
use axum::{extract::State, http::StatusCode, response::IntoResponse, Json};
use filebox_core::models::{
    CreateFileRequest, DeleteFileRequest, DeleteResult, FileInfo, GetFileRequest,
    OptimizeFileRequest,
};
use filebox_core::AppError;
use std::sync::Arc;

#[utoipa::path(
    post,
    path = "/api/files/files/get",
    tag = "files",
    request_body = GetFileRequest,
    responses(
        (status = 200, description = "File found", body = FileInfo),
        (status = 400, description = "Invalid request", body = ErrorResponse),
        (status = 404, description = "File not found", body = ErrorResponse)
    )
)]
pub async fn get_file(
    State(state): State<Arc<AppState>>,
    JsonBody(request): JsonBody<GetFileRequest>,
) -> Result<Json<FileInfo>, HttpAppError> {
    let info = state
        .service
        .get_file_info(request)
        .await?
        .ok_or_else(|| AppError::NotFound("File not found".to_string()))?;

    Ok(Json(info))
}

#[utoipa::path(
    post,
    path = "/api/files/files/post",
    tag = "files",
    request_body = CreateFileRequest,
    responses(
        (status = 201, description = "File stored", body = FileInfo),
        (status = 400, description = "Invalid request", body = ErrorResponse),
        (status = 413, description = "File too large", body = ErrorResponse)
    )
)]
pub async fn create_file(
    State(state): State<Arc<AppState>>,
    JsonBody(request): JsonBody<CreateFileRequest>,
) -> Result<impl IntoResponse, HttpAppError> {
    let info = state.service.create_file(request).await?;
    Ok((StatusCode::CREATED, Json(info)))
}

#[utoipa::path(
    post,
    path = "/api/files/files/delete",
    tag = "files",
    request_body = DeleteFileRequest,
    responses(
        (status = 200, description = "Number of deleted records", body = DeleteResult),
        (status = 400, description = "Invalid request", body = ErrorResponse)
    )
)]
pub async fn delete_file(
    State(state): State<Arc<AppState>>,
    JsonBody(request): JsonBody<DeleteFileRequest>,
) -> Result<Json<DeleteResult>, HttpAppError> {
    Ok(Json(state.service.delete_file(request).await?))
}

/// Responds with `null` when the file is missing or the provider produced no
/// replacement.
#[utoipa::path(
    post,
    path = "/api/files/files/optimize",
    tag = "files",
    request_body = OptimizeFileRequest,
    responses(
        (status = 200, description = "Optimized file, or null", body = FileInfo),
        (status = 400, description = "Invalid request", body = ErrorResponse),
        (status = 502, description = "Provider unreachable", body = ErrorResponse)
    )
)]
pub async fn optimize_file(
    State(state): State<Arc<AppState>>,
    JsonBody(request): JsonBody<OptimizeFileRequest>,
) -> Result<Json<Option<FileInfo>>, HttpAppError> {
    Ok(Json(state.service.optimize_file(request).await?))
}
