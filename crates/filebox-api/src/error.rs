//! HTTP error response conversion
//!
//! Handlers return `Result<impl IntoResponse, HttpAppError>` and propagate
//! [`AppError`] with `?`; rendering (status, body, logging) happens here.

use axum::{
    extract::rejection::JsonRejection,
    extract::{FromRequest, Request},
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use filebox_core::{AppError, ErrorMetadata, FieldErrors, LogLevel};
use serde::{de::DeserializeOwned, Serialize};
use std::sync::atomic::{AtomicBool, Ordering};
use utoipa::ToSchema;

static HIDE_DETAILS: AtomicBool = AtomicBool::new(false);

/// Hide error details and types from clients. Set once at startup.
pub fn set_production_mode(production: bool) {
    HIDE_DETAILS.store(production, Ordering::Relaxed);
}

fn is_production() -> bool {
    HIDE_DETAILS.load(Ordering::Relaxed)
}

#[derive(Debug, Serialize, ToSchema)]
pub struct ErrorResponse {
    pub error: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub details: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error_type: Option<String>,
    /// Machine-readable error code for programmatic handling
    pub code: String,
    /// Whether this error is recoverable (can be retried)
    pub recoverable: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub suggested_action: Option<String>,
    /// Field-level messages for validation failures
    #[serde(skip_serializing_if = "Option::is_none")]
    pub errors: Option<FieldErrors>,
}

impl ErrorResponse {
    fn from_app_error(error: &AppError, with_details: bool) -> Self {
        Self {
            error: error.client_message(),
            details: with_details.then(|| error.detailed_message()),
            error_type: with_details.then(|| error.error_type().to_string()),
            code: error.error_code().to_string(),
            recoverable: error.is_recoverable(),
            suggested_action: error.suggested_action().map(String::from),
            errors: error.field_errors().cloned(),
        }
    }
}

/// Wrapper type for AppError to implement IntoResponse (orphan rule).
#[derive(Debug)]
pub struct HttpAppError(pub AppError);

impl From<AppError> for HttpAppError {
    fn from(err: AppError) -> Self {
        HttpAppError(err)
    }
}

impl From<anyhow::Error> for HttpAppError {
    fn from(err: anyhow::Error) -> Self {
        HttpAppError(AppError::from(err))
    }
}

/// Convert JSON body deserialization failures into a 400 with our ErrorResponse format.
impl From<JsonRejection> for HttpAppError {
    fn from(rejection: JsonRejection) -> Self {
        HttpAppError(AppError::InvalidInput(format!(
            "Invalid request body: {}",
            rejection.body_text()
        )))
    }
}

/// JSON body extractor that answers malformed bodies with [`ErrorResponse`] instead of
/// axum's plain-text rejection.
#[derive(Debug, Clone, Copy)]
pub struct JsonBody<T>(pub T);

impl<T, S> FromRequest<S> for JsonBody<T>
where
    T: DeserializeOwned + Send,
    S: Send + Sync,
    Json<T>: FromRequest<S, Rejection = JsonRejection>,
{
    type Rejection = HttpAppError;

    async fn from_request(req: Request, state: &S) -> Result<Self, Self::Rejection> {
        let Json(inner) = Json::<T>::from_request(req, state)
            .await
            .map_err(HttpAppError::from)?;
        Ok(JsonBody(inner))
    }
}

fn log_error(error: &AppError) {
    let error_type = error.error_type();
    match error.log_level() {
        LogLevel::Debug => {
            tracing::debug!(error = %error, error_type = error_type, "Error occurred");
        }
        LogLevel::Warn => {
            tracing::warn!(error = %error, error_type = error_type, "Error occurred");
        }
        LogLevel::Error => {
            tracing::error!(error = %error, error_type = error_type, "Error occurred");
        }
    }
}

impl IntoResponse for HttpAppError {
    fn into_response(self) -> Response {
        let app_error = &self.0;

        let status = StatusCode::from_u16(app_error.http_status_code())
            .unwrap_or(StatusCode::INTERNAL_SERVER_ERROR);

        log_error(app_error);

        // Details only leave the process for non-sensitive errors outside production.
        let with_details = !is_production() && !app_error.is_sensitive();
        let body = ErrorResponse::from_app_error(app_error, with_details);

        (status, Json(body)).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_validation_error_lists_fields() {
        let mut report = FieldErrors::new();
        report.add("filename", "filename is required");
        let err = AppError::Validation(report);

        let body = ErrorResponse::from_app_error(&err, true);
        let json = serde_json::to_value(&body).expect("serialize");

        assert_eq!(json["code"], "VALIDATION_ERROR");
        assert_eq!(json["errors"]["filename"][0], "filename is required");
        assert_eq!(json["recoverable"], false);
    }

    #[test]
    fn test_non_validation_error_omits_field_map() {
        let err = AppError::NotFound("File not found".to_string());
        let json = serde_json::to_value(ErrorResponse::from_app_error(&err, true)).unwrap();

        assert_eq!(json["error"], "File not found");
        assert_eq!(json["error_type"], "NotFound");
        assert!(json.get("errors").is_none());
    }

    #[test]
    fn test_details_hidden_when_requested() {
        let err = AppError::Upstream("connection refused".to_string());
        let json = serde_json::to_value(ErrorResponse::from_app_error(&err, false)).unwrap();

        assert_eq!(json["error"], "Optimization provider unavailable");
        assert!(json.get("details").is_none());
        assert!(json.get("error_type").is_none());
    }

    #[test]
    fn test_status_from_metadata() {
        let response = HttpAppError(AppError::PayloadTooLarge("too big".into())).into_response();
        assert_eq!(response.status(), StatusCode::PAYLOAD_TOO_LARGE);
    }
}
