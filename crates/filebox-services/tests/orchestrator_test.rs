mod helpers;

use std::sync::Arc;

use filebox_core::models::{NewFileRecord, OptimizeOptions, OptimizedResult};
use filebox_core::OptimizerConfig;
use filebox_db::{FileRecordRepository, InMemoryFileRecordRepository};
use filebox_services::{OptimizationClient, OptimizationOrchestrator};
use helpers::{dir_is_empty, png_bytes, StubOptimizer};
use mockito::Matcher;
use serde_json::json;
use uuid::Uuid;

async fn seeded_repo() -> (InMemoryFileRecordRepository, Uuid, Vec<u8>) {
    let repo = InMemoryFileRecordRepository::new();
    let payload = png_bytes(12, 12);
    let record = repo
        .create(NewFileRecord {
            filename: "photo.png".to_string(),
            extension: "png".to_string(),
            mime_type: "image/png".to_string(),
            bin_data: payload.clone(),
            is_public: true,
        })
        .await
        .unwrap();
    (repo, record.id, payload)
}

#[tokio::test]
async fn missing_record_returns_none_without_calling_provider() {
    let temp_dir = tempfile::tempdir().unwrap();
    let optimizer = Arc::new(StubOptimizer::successful(vec![1, 2, 3]));
    let orchestrator = OptimizationOrchestrator::new(
        Arc::new(InMemoryFileRecordRepository::new()),
        optimizer.clone(),
        temp_dir.path().to_path_buf(),
    );

    let result = orchestrator
        .optimize(Uuid::new_v4(), &OptimizeOptions::new())
        .await
        .unwrap();

    assert!(result.is_none());
    assert!(optimizer.last_path().is_none());
}

#[tokio::test]
async fn provider_receives_record_payload_in_unique_temp_file() {
    let temp_dir = tempfile::tempdir().unwrap();
    let (repo, id, payload) = seeded_repo().await;
    let optimizer = Arc::new(StubOptimizer::successful(vec![9; 8]));
    let orchestrator = OptimizationOrchestrator::new(
        Arc::new(repo),
        optimizer.clone(),
        temp_dir.path().to_path_buf(),
    );

    orchestrator.optimize(id, &OptimizeOptions::new()).await.unwrap();
    orchestrator.optimize(id, &OptimizeOptions::new()).await.unwrap();

    let paths = optimizer.seen_paths.lock().unwrap().clone();
    assert_eq!(paths.len(), 2);
    assert_ne!(paths[0], paths[1]);
    assert!(paths[0].starts_with(temp_dir.path()));
    assert!(paths[0]
        .file_name()
        .unwrap()
        .to_string_lossy()
        .starts_with(&id.to_string()));
    assert_eq!(optimizer.seen_contents.lock().unwrap()[0], payload);
    assert!(dir_is_empty(temp_dir.path()));
}

#[tokio::test]
async fn unsuccessful_result_leaves_record_and_cleans_temp_file() {
    let temp_dir = tempfile::tempdir().unwrap();
    let (repo, id, payload) = seeded_repo().await;
    let failed = OptimizedResult {
        url: Some("https://cdn.example.com/x.png".to_string()),
        success: false,
        ..Default::default()
    };
    let orchestrator = OptimizationOrchestrator::new(
        Arc::new(repo.clone()),
        Arc::new(StubOptimizer::returning(Some(failed), vec![1])),
        temp_dir.path().to_path_buf(),
    );

    let result = orchestrator.optimize(id, &OptimizeOptions::new()).await.unwrap();

    assert!(result.is_none());
    let stored = repo.find_by_id(id).await.unwrap().unwrap();
    assert_eq!(stored.bin_data, payload);
    assert!(dir_is_empty(temp_dir.path()));
}

#[tokio::test]
async fn provider_error_status_leaves_record_unchanged() {
    let mut server = mockito::Server::new_async().await;
    let _submit = server
        .mock("POST", "/v1/optimize")
        .with_status(200)
        .with_header("content-type", "application/json")
        .with_body(json!({"status": "error", "errors": ["Unsupported"]}).to_string())
        .create_async()
        .await;

    let temp_dir = tempfile::tempdir().unwrap();
    let (repo, id, payload) = seeded_repo().await;
    let client = OptimizationClient::new(OptimizerConfig {
        endpoint: format!("{}/v1/optimize", server.url()),
        api_key: Some("k".to_string()),
        ..OptimizerConfig::default()
    })
    .unwrap();
    let orchestrator = OptimizationOrchestrator::new(
        Arc::new(repo.clone()),
        Arc::new(client),
        temp_dir.path().to_path_buf(),
    );

    let result = orchestrator.optimize(id, &OptimizeOptions::new()).await.unwrap();

    assert!(result.is_none());
    let stored = repo.find_by_id(id).await.unwrap().unwrap();
    assert_eq!(stored.bin_data, payload);
    assert_eq!(stored.size, payload.len() as i64);
    assert!(dir_is_empty(temp_dir.path()));
}

#[tokio::test]
async fn processing_then_completed_poll_replaces_payload() {
    let mut server = mockito::Server::new_async().await;
    let optimized = b"optimized-bytes".to_vec();
    let download_url = format!("{}/downloads/photo.png", server.url());

    let _submit = server
        .mock("POST", "/v1/optimize")
        .with_status(202)
        .with_header("content-type", "application/json")
        .with_body(json!({"status": "processing", "process_id": "p-1"}).to_string())
        .create_async()
        .await;
    let _poll = server
        .mock("POST", "/v1/optimize/p-1/result")
        .match_query(Matcher::UrlEncoded("timeout".into(), "300".into()))
        .with_status(200)
        .with_header("content-type", "application/json")
        .with_body(
            json!({
                "status": "ok",
                "result": [{
                    "url": download_url,
                    "optimized_size": optimized.len(),
                    "saved_percent": 37.5,
                    "success": true
                }]
            })
            .to_string(),
        )
        .create_async()
        .await;
    let download = server
        .mock("GET", "/downloads/photo.png")
        .with_status(200)
        .with_body(optimized.clone())
        .create_async()
        .await;

    let temp_dir = tempfile::tempdir().unwrap();
    let (repo, id, _) = seeded_repo().await;
    let client = OptimizationClient::new(OptimizerConfig {
        endpoint: format!("{}/v1/optimize", server.url()),
        api_key: Some("k".to_string()),
        ..OptimizerConfig::default()
    })
    .unwrap();
    let orchestrator = OptimizationOrchestrator::new(
        Arc::new(repo.clone()),
        Arc::new(client),
        temp_dir.path().to_path_buf(),
    );

    let updated = orchestrator
        .optimize(id, &OptimizeOptions::new())
        .await
        .unwrap()
        .unwrap();

    download.assert_async().await;
    assert_eq!(updated.bin_data, optimized);
    assert_eq!(updated.size, optimized.len() as i64);

    let stored = repo.find_by_id(id).await.unwrap().unwrap();
    assert_eq!(stored.bin_data, optimized);
    assert_eq!(stored.size, optimized.len() as i64);
    assert!(dir_is_empty(temp_dir.path()));
}

#[tokio::test]
async fn failed_download_propagates_and_keeps_original() {
    let mut server = mockito::Server::new_async().await;
    let download_url = format!("{}/downloads/gone.png", server.url());
    let _submit = server
        .mock("POST", "/v1/optimize")
        .with_status(200)
        .with_header("content-type", "application/json")
        .with_body(
            json!({"status": "ok", "result": [{"url": download_url, "success": 1}]}).to_string(),
        )
        .create_async()
        .await;
    let _download = server
        .mock("GET", "/downloads/gone.png")
        .with_status(500)
        .create_async()
        .await;

    let temp_dir = tempfile::tempdir().unwrap();
    let (repo, id, payload) = seeded_repo().await;
    let client = OptimizationClient::new(OptimizerConfig {
        endpoint: format!("{}/v1/optimize", server.url()),
        ..OptimizerConfig::default()
    })
    .unwrap();
    let orchestrator = OptimizationOrchestrator::new(
        Arc::new(repo.clone()),
        Arc::new(client),
        temp_dir.path().to_path_buf(),
    );

    let err = orchestrator
        .optimize(id, &OptimizeOptions::new())
        .await
        .unwrap_err();

    assert!(matches!(err, filebox_core::AppError::Upstream(_)));
    assert_eq!(repo.find_by_id(id).await.unwrap().unwrap().bin_data, payload);
    assert!(dir_is_empty(temp_dir.path()));
}
