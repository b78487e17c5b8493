//! Request DTOs for the exposed file operations.
//!
//! Required fields are `Option`s so that a missing field shows up in the field
//! report instead of failing deserialization. `_id` is accepted wherever `id` is.

use serde::Deserialize;
use utoipa::ToSchema;
use validator::Validate;

use super::OptimizeOptions;

#[derive(Debug, Clone, Default, Deserialize, ToSchema, Validate)]
pub struct GetFileRequest {
    #[serde(default, alias = "_id")]
    #[validate(
        required(message = "id is required"),
        length(min = 1, message = "id must not be empty")
    )]
    pub id: Option<String>,
    /// Alias lifetime in seconds. Capped at the configured alias TTL.
    #[serde(default)]
    #[validate(range(min = 1, message = "ex must be a positive number of seconds"))]
    pub ex: Option<u64>,
}

impl GetFileRequest {
    pub fn for_id(id: impl Into<String>) -> Self {
        Self {
            id: Some(id.into()),
            ex: None,
        }
    }
}

#[derive(Debug, Clone, Default, Deserialize, ToSchema, Validate)]
#[serde(rename_all = "camelCase")]
pub struct CreateFileRequest {
    #[serde(default)]
    #[validate(
        required(message = "filename is required"),
        length(min = 1, max = 255, message = "filename must be between 1 and 255 characters")
    )]
    pub filename: Option<String>,
    /// Base64-encoded payload.
    #[serde(default)]
    #[validate(
        required(message = "binData is required"),
        length(min = 1, message = "binData must not be empty")
    )]
    pub bin_data: Option<String>,
    #[serde(default)]
    pub is_public: Option<bool>,
}

#[derive(Debug, Clone, Default, Deserialize, ToSchema, Validate)]
pub struct DeleteFileRequest {
    #[serde(default, alias = "_id")]
    #[validate(
        required(message = "id is required"),
        length(min = 1, message = "id must not be empty")
    )]
    pub id: Option<String>,
}

#[derive(Debug, Clone, Default, Deserialize, ToSchema, Validate)]
pub struct OptimizeFileRequest {
    #[serde(default, alias = "_id")]
    #[validate(
        required(message = "id is required"),
        length(min = 1, message = "id must not be empty")
    )]
    pub id: Option<String>,
    #[serde(default)]
    pub options: Option<OptimizeOptions>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::FieldErrors;
    use serde_json::json;

    #[test]
    fn test_underscore_id_accepted() {
        let req: GetFileRequest = serde_json::from_value(json!({"_id": "abc", "ex": 2})).unwrap();
        assert_eq!(req.id.as_deref(), Some("abc"));
        assert_eq!(req.ex, Some(2));
        assert!(req.validate().is_ok());
    }

    #[test]
    fn test_missing_fields_reported_per_field() {
        let req: CreateFileRequest = serde_json::from_value(json!({})).unwrap();
        let report: FieldErrors = req.validate().unwrap_err().into();

        assert_eq!(report.get("filename"), Some(&["filename is required".to_string()][..]));
        assert!(report.get("bin_data").is_some());
    }

    #[test]
    fn test_zero_expiry_rejected() {
        let req = GetFileRequest {
            id: Some("abc".to_string()),
            ex: Some(0),
        };
        let report: FieldErrors = req.validate().unwrap_err().into();
        assert!(report.get("ex").is_some());
    }

    #[test]
    fn test_optimize_request_options_optional() {
        let req: OptimizeFileRequest = serde_json::from_value(json!({"id": "abc"})).unwrap();
        assert!(req.options.is_none());

        let req: OptimizeFileRequest =
            serde_json::from_value(json!({"id": "abc", "options": {"compression": "ultra"}}))
                .unwrap();
        assert_eq!(req.options.unwrap().0["compression"], "ultra");
    }
}
