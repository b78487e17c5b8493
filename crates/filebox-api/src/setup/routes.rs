//! Route configuration and setup

use crate::handlers;
use crate::state::AppState;
use anyhow::Context;
use axum::{
    extract::DefaultBodyLimit,
    http::{HeaderValue, Method},
    routing::{get, post},
    Json, Router,
};
use filebox_core::Config;
use std::sync::Arc;
use tower::limit::ConcurrencyLimitLayer;
use tower_http::cors::{Any, CorsLayer};
use tower_http::limit::RequestBodyLimitLayer;
use tower_http::trace::TraceLayer;

/// Server-level bound on in-flight requests.
const HTTP_CONCURRENCY_LIMIT: usize = 10_000;

/// Slack for JSON framing and the other fields of an upload body.
const BODY_OVERHEAD_BYTES: usize = 64 * 1024;

/// Largest accepted request body: the base64 form of a maximum-size file.
pub fn request_body_limit(config: &Config) -> usize {
    config.max_file_size_bytes.div_ceil(3) * 4 + BODY_OVERHEAD_BYTES
}

/// Setup all application routes
pub fn setup_routes(config: &Config, state: Arc<AppState>) -> Result<Router<()>, anyhow::Error> {
    let cors = setup_cors(config)?;
    let body_limit = request_body_limit(config);

    let openapi = crate::api_doc::get_openapi_spec(&config.api_prefix);
    let api = Router::new()
        .route("/files/get", post(handlers::files::get_file))
        .route("/files/post", post(handlers::files::create_file))
        .route("/files/delete", post(handlers::files::delete_file))
        .route("/files/optimize", post(handlers::files::optimize_file))
        .route(
            "/file/{alias_or_id}/{filename}",
            get(handlers::fetch::fetch_file),
        )
        .route("/health", get(handlers::health::health_check))
        .route(
            "/openapi.json",
            get(move || {
                let openapi = openapi.clone();
                async move { Json(openapi) }
            }),
        );

    let prefix = config.api_prefix.trim_end_matches('/');
    let routes = if prefix.is_empty() {
        api
    } else {
        Router::new().nest(prefix, api)
    };

    tracing::info!(
        api_prefix = %config.api_prefix,
        body_limit_bytes = body_limit,
        http_concurrency_limit = HTTP_CONCURRENCY_LIMIT,
        "Routes configured"
    );

    let app = routes
        .layer(ConcurrencyLimitLayer::new(HTTP_CONCURRENCY_LIMIT))
        .layer(DefaultBodyLimit::disable())
        .layer(RequestBodyLimitLayer::new(body_limit))
        .layer(cors)
        .layer(TraceLayer::new_for_http())
        .with_state(state);

    Ok(app)
}

/// Setup CORS configuration
fn setup_cors(config: &Config) -> Result<CorsLayer, anyhow::Error> {
    let methods = [Method::GET, Method::POST, Method::OPTIONS];

    let cors = if config.cors_origins.iter().any(|o| o == "*") {
        tracing::warn!("CORS configured to allow all origins - not recommended for production");
        CorsLayer::new()
            .allow_origin(Any)
            .allow_methods(methods)
            .allow_headers(Any)
    } else {
        let origins = config
            .cors_origins
            .iter()
            .map(|o| {
                o.parse::<HeaderValue>()
                    .with_context(|| format!("Invalid CORS origin '{}'", o))
            })
            .collect::<Result<Vec<_>, _>>()?;

        CorsLayer::new()
            .allow_origin(origins)
            .allow_methods(methods)
            .allow_headers(Any)
    };
    Ok(cors)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_body_limit_covers_base64_payload() {
        let config = Config {
            max_file_size_bytes: 3 * 1024,
            ..Config::default()
        };
        assert_eq!(request_body_limit(&config), 4 * 1024 + BODY_OVERHEAD_BYTES);
    }

    #[test]
    fn test_invalid_cors_origin_rejected() {
        let config = Config {
            cors_origins: vec!["https://ok.example.com".into(), "bad\norigin".into()],
            ..Config::default()
        };
        assert!(setup_cors(&config).is_err());
    }
}
