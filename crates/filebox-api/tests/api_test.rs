//! End-to-end HTTP scenarios over in-memory stores.

use std::io::Cursor;
use std::path::Path;
use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use axum::http::StatusCode;
use axum_test::TestServer;
use base64::engine::general_purpose::STANDARD;
use base64::Engine;
use filebox_cache::MemoryTtlStore;
use filebox_core::models::{OptimizeOptions, OptimizedResult};
use filebox_core::{AppError, Config};
use filebox_db::InMemoryFileRecordRepository;
use filebox_services::ImageOptimizer;
use serde_json::{json, Value};

/// Provider double that never produces a replacement.
struct NoResultOptimizer;

#[async_trait]
impl ImageOptimizer for NoResultOptimizer {
    async fn optimize(
        &self,
        _path: &Path,
        _options: &OptimizeOptions,
    ) -> Result<Option<OptimizedResult>, AppError> {
        Ok(None)
    }

    async fn fetch_result(&self, _url: &str) -> Result<Vec<u8>, AppError> {
        Err(AppError::Upstream("not expected".to_string()))
    }
}

struct TestApp {
    server: TestServer,
    _temp_dir: tempfile::TempDir,
}

fn setup_with(configure: impl FnOnce(&mut Config)) -> TestApp {
    let temp_dir = tempfile::tempdir().unwrap();
    let mut config = Config::default();
    config.optimizer.temp_dir = temp_dir.path().to_path_buf();
    configure(&mut config);

    let (_state, router) = filebox_api::setup::build_app(
        config,
        Arc::new(InMemoryFileRecordRepository::new()),
        Arc::new(MemoryTtlStore::new()),
        Arc::new(NoResultOptimizer),
    )
    .unwrap();

    TestApp {
        server: TestServer::new(router).unwrap(),
        _temp_dir: temp_dir,
    }
}

fn setup() -> TestApp {
    setup_with(|_| {})
}

fn png_base64(width: u32, height: u32) -> String {
    let img = image::RgbImage::from_pixel(width, height, image::Rgb([200, 40, 40]));
    let mut buffer = Vec::new();
    img.write_to(&mut Cursor::new(&mut buffer), image::ImageFormat::Png)
        .unwrap();
    STANDARD.encode(buffer)
}

/// Path part of a generated URL (the test config has no public base URL).
fn url_path(info: &Value) -> String {
    info["url"].as_str().unwrap().to_string()
}

async fn upload(server: &TestServer, body: Value) -> Value {
    let response = server.post("/api/files/files/post").json(&body).await;
    response.assert_status(StatusCode::CREATED);
    response.json::<Value>()
}

#[tokio::test]
async fn test_health() {
    let app = setup();
    let response = app.server.get("/api/files/health").await;
    response.assert_status_ok();
    response.assert_json(&json!({ "status": "ok" }));
}

#[tokio::test]
async fn test_upload_then_download() {
    let app = setup();
    let info = upload(
        &app.server,
        json!({ "filename": "test.png", "binData": png_base64(10, 10), "isPublic": true }),
    )
    .await;

    assert_eq!(info["filename"], "test.png");
    assert_eq!(info["extension"], "png");
    assert_eq!(info["mimeType"], "image/png");
    let id = info["_id"].as_str().unwrap();
    assert!(url_path(&info).contains(id));

    let response = app.server.get(&url_path(&info)).await;
    response.assert_status_ok();
    assert_eq!(response.header("content-type"), "image/png");
    assert_eq!(response.as_bytes().len() as u64, info["size"].as_u64().unwrap());
}

#[tokio::test]
async fn test_get_accepts_underscore_id() {
    let app = setup();
    let created = upload(
        &app.server,
        json!({ "filename": "a.png", "binData": png_base64(2, 2) }),
    )
    .await;

    let response = app
        .server
        .post("/api/files/files/get")
        .json(&json!({ "_id": created["_id"] }))
        .await;
    response.assert_status_ok();
    assert_eq!(response.json::<Value>()["_id"], created["_id"]);
}

#[tokio::test]
async fn test_expiring_alias_stops_working() {
    let app = setup();
    let created = upload(
        &app.server,
        json!({ "filename": "test.png", "binData": png_base64(10, 10) }),
    )
    .await;

    let response = app
        .server
        .post("/api/files/files/get")
        .json(&json!({ "id": created["_id"], "ex": 2 }))
        .await;
    response.assert_status_ok();
    let info = response.json::<Value>();
    let url = url_path(&info);
    assert_ne!(url, url_path(&created));

    app.server.get(&url).await.assert_status_ok();

    tokio::time::sleep(Duration::from_secs(3)).await;
    app.server.get(&url).await.assert_status_not_found();
}

#[tokio::test]
async fn test_delete_then_download_not_found() {
    let app = setup();
    let created = upload(
        &app.server,
        json!({ "filename": "test.png", "binData": png_base64(10, 10) }),
    )
    .await;

    let response = app
        .server
        .post("/api/files/files/delete")
        .json(&json!({ "id": created["_id"] }))
        .await;
    response.assert_status_ok();
    response.assert_json(&json!({ "deletedCount": 1 }));

    app.server
        .get(&url_path(&created))
        .await
        .assert_status_not_found();
    app.server
        .post("/api/files/files/get")
        .json(&json!({ "id": created["_id"] }))
        .await
        .assert_status_not_found();
}

#[tokio::test]
async fn test_validation_errors_name_fields() {
    let app = setup();

    let response = app
        .server
        .post("/api/files/files/post")
        .json(&json!({ "binData": png_base64(2, 2) }))
        .await;
    response.assert_status_bad_request();
    let body = response.json::<Value>();
    assert_eq!(body["code"], "VALIDATION_ERROR");
    assert!(body["errors"]["filename"].is_array());

    let response = app
        .server
        .post("/api/files/files/get")
        .json(&json!({}))
        .await;
    response.assert_status_bad_request();
    assert!(response.json::<Value>()["errors"]["id"].is_array());
}

#[tokio::test]
async fn test_malformed_body_is_bad_request() {
    let app = setup();
    let response = app
        .server
        .post("/api/files/files/post")
        .content_type("application/json")
        .bytes("{not json".into())
        .await;
    response.assert_status_bad_request();
    assert_eq!(response.json::<Value>()["code"], "INVALID_INPUT");
}

#[tokio::test]
async fn test_oversized_upload_rejected() {
    let app = setup_with(|config| config.max_file_size_bytes = 1024);
    let payload = STANDARD.encode(vec![7u8; 4096]);

    let response = app
        .server
        .post("/api/files/files/post")
        .json(&json!({ "filename": "big.bin", "binData": payload }))
        .await;
    response.assert_status(StatusCode::PAYLOAD_TOO_LARGE);
}

#[tokio::test]
async fn test_thumbnail_download() {
    let app = setup();
    let created = upload(
        &app.server,
        json!({ "filename": "wide.png", "binData": png_base64(100, 50) }),
    )
    .await;

    let response = app
        .server
        .get(&url_path(&created))
        .add_query_param("size", "xs")
        .await;
    response.assert_status_ok();
    assert_eq!(response.header("content-type"), "image/jpeg");

    let thumb = image::load_from_memory(response.as_bytes()).unwrap();
    assert_eq!((thumb.width(), thumb.height()), (60, 30));

    app.server
        .get(&url_path(&created))
        .add_query_param("size", "xxl")
        .await
        .assert_status_not_found();
}

#[tokio::test]
async fn test_optimize_without_result_returns_null() {
    let app = setup();
    let created = upload(
        &app.server,
        json!({ "filename": "photo.png", "binData": png_base64(8, 8) }),
    )
    .await;

    let response = app
        .server
        .post("/api/files/files/optimize")
        .json(&json!({ "id": created["_id"], "options": { "compression": "lossless" } }))
        .await;
    response.assert_status_ok();
    assert_eq!(response.json::<Value>(), Value::Null);
}

#[tokio::test]
async fn test_openapi_document_served() {
    let app = setup();
    let response = app.server.get("/api/files/openapi.json").await;
    response.assert_status_ok();
    let doc = response.json::<Value>();
    assert!(doc["paths"]["/api/files/files/post"].is_object());
}
