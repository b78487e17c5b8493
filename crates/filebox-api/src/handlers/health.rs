use axum::{http::StatusCode, response::IntoResponse, Json};

/// Liveness probe - process is running.
#[utoipa::path(
    get,
    path = "/api/files/health",
    tag = "health",
    responses((status = 200, description = "Service is up"))
)]
pub async fn health_check() -> impl IntoResponse {
    (StatusCode::OK, Json(serde_json::json!({ "status": "ok" })))
}
