//! OpenAPI documentation.
//! Handler annotations use the default `/api/files` prefix; paths are rewritten to
//! the configured prefix when the document is served.

use utoipa::OpenApi;

use crate::error;
use crate::handlers;
use filebox_core::models;

/// Prefix used in handler path annotations (utoipa requires compile-time literals).
const OPENAPI_PATH_PLACEHOLDER: &str = "/api/files";

fn transform_openapi_paths(spec: &mut utoipa::openapi::OpenApi, prefix: &str) {
    if OPENAPI_PATH_PLACEHOLDER == prefix {
        return;
    }
    let path_map = std::mem::take(&mut spec.paths.paths);
    for (key, item) in path_map {
        let new_key = key.replacen(OPENAPI_PATH_PLACEHOLDER, prefix, 1);
        spec.paths.paths.insert(new_key, item);
    }
}

/// Returns the OpenAPI document with paths under `prefix`.
pub fn get_openapi_spec(prefix: &str) -> utoipa::openapi::OpenApi {
    let mut spec = ApiDoc::openapi();
    transform_openapi_paths(&mut spec, prefix);
    spec
}

#[derive(OpenApi)]
#[openapi(
    info(
        title = "Filebox API",
        version = "0.1.0",
        description = "File storage with temporary aliases, cached thumbnails and provider-backed image optimization."
    ),
    paths(
        handlers::files::get_file,
        handlers::files::create_file,
        handlers::files::delete_file,
        handlers::files::optimize_file,
        handlers::fetch::fetch_file,
        handlers::health::health_check,
    ),
    components(schemas(
        models::FileInfo,
        models::DeleteResult,
        models::GetFileRequest,
        models::CreateFileRequest,
        models::DeleteFileRequest,
        models::OptimizeFileRequest,
        models::OptimizeOptions,
        filebox_core::FieldErrors,
        error::ErrorResponse,
    )),
    tags(
        (name = "files", description = "File metadata, upload, download and optimization"),
        (name = "health", description = "Liveness")
    )
)]
pub struct ApiDoc;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_paths_follow_configured_prefix() {
        let spec = get_openapi_spec("/v1/storage");
        assert!(spec.paths.paths.contains_key("/v1/storage/files/post"));
        assert!(spec
            .paths
            .paths
            .contains_key("/v1/storage/file/{alias_or_id}/{filename}"));
        assert!(!spec.paths.paths.keys().any(|k| k.starts_with("/api/files")));
    }

    #[test]
    fn test_default_prefix_unchanged() {
        let spec = get_openapi_spec("/api/files");
        assert!(spec.paths.paths.contains_key("/api/files/files/get"));
        assert!(spec.paths.paths.contains_key("/api/files/health"));
    }
}
