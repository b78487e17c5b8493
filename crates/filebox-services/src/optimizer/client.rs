use std::path::Path;
use std::time::Instant;

use anyhow::{Context, Result};
use async_trait::async_trait;
use filebox_core::constants::OPTIMIZER_API_KEY_HEADER;
use filebox_core::models::{
    OptimizationResponse, OptimizationStatus, OptimizeOptions, OptimizedResult,
};
use filebox_core::validation::RESERVED_OPTION_KEYS;
use filebox_core::{AppError, OptimizerConfig};
use reqwest::multipart::{Form, Part};

use super::ImageOptimizer;

/// HTTP client for a MegaOptim-compatible provider.
///
/// Submissions either complete immediately (`ok`) or return a process id
/// (`processing`) that is then long-polled on `{endpoint}/{process_id}/result`.
pub struct OptimizationClient {
    http_client: reqwest::Client,
    config: OptimizerConfig,
}

impl OptimizationClient {
    pub fn new(config: OptimizerConfig) -> Result<Self, AppError> {
        if config.api_key.is_none() {
            tracing::error!(
                "Optimizer API key not configured (OPTIMIZER_API_KEY); provider calls will be unauthenticated"
            );
        }

        let http_client = reqwest::Client::builder()
            .build()
            .context("Failed to create HTTP client for optimization provider")?;

        Ok(Self {
            http_client,
            config,
        })
    }

    fn authorized(&self, request: reqwest::RequestBuilder) -> reqwest::RequestBuilder {
        match &self.config.api_key {
            Some(key) => request.header(OPTIMIZER_API_KEY_HEADER, key),
            None => request,
        }
    }

    fn result_url(&self, process_id: &str) -> String {
        format!(
            "{}/{}/result",
            self.config.endpoint.trim_end_matches('/'),
            process_id
        )
    }

    /// Post the file and options as multipart form data.
    pub async fn submit(
        &self,
        path: &Path,
        options: &OptimizeOptions,
    ) -> Result<OptimizationResponse> {
        let data = tokio::fs::read(path)
            .await
            .with_context(|| format!("Failed to read {}", path.display()))?;
        let file_name = path
            .file_name()
            .and_then(|n| n.to_str())
            .unwrap_or("upload")
            .to_string();

        let mut form = Form::new();
        for (key, value) in options.form_fields() {
            if RESERVED_OPTION_KEYS.contains(&key.as_str()) {
                continue;
            }
            form = form.text(key, value);
        }
        let form = form
            .text("type", "file")
            .part("file", Part::bytes(data).file_name(file_name));

        let response = self
            .authorized(self.http_client.post(&self.config.endpoint))
            .multipart(form)
            .send()
            .await
            .context("Failed to send request to optimization provider")?;

        Self::parse_response(response).await
    }

    /// Block on the provider until the job finishes (bounded server-side by the poll timeout).
    pub async fn await_result(&self, process_id: &str) -> Result<OptimizationResponse> {
        let response = self
            .authorized(self.http_client.post(self.result_url(process_id)))
            .query(&[("timeout", self.config.poll_timeout_secs)])
            .send()
            .await
            .context("Failed to poll optimization result")?;

        Self::parse_response(response).await
    }

    /// Provider bodies carry their own status; HTTP errors without one are failures.
    async fn parse_response(response: reqwest::Response) -> Result<OptimizationResponse> {
        let status = response.status();
        let body = response
            .bytes()
            .await
            .context("Failed to read optimization provider response")?;

        match serde_json::from_slice::<OptimizationResponse>(&body) {
            Ok(parsed) if !parsed.status.is_empty() => Ok(parsed),
            _ if !status.is_success() => Err(anyhow::anyhow!(
                "Optimization provider request failed: {} - {}",
                status,
                String::from_utf8_lossy(&body)
            )),
            Ok(parsed) => Ok(parsed),
            Err(e) => Err(e).context("Failed to parse optimization provider response"),
        }
    }

    async fn run(
        &self,
        path: &Path,
        options: &OptimizeOptions,
    ) -> Result<Option<OptimizedResult>> {
        let start = Instant::now();
        let response = self.submit(path, options).await?;

        match response.status() {
            OptimizationStatus::Ok => {
                tracing::info!(
                    path = %path.display(),
                    status = "ok",
                    duration_ms = start.elapsed().as_millis() as u64,
                    "Optimization completed"
                );
                Ok(response.into_first_result())
            }
            OptimizationStatus::Processing => {
                let Some(process_id) = response.process_id.clone() else {
                    tracing::error!(
                        path = %path.display(),
                        "Provider reported processing without a process id"
                    );
                    return Ok(None);
                };

                tracing::info!(
                    process_id = %process_id,
                    status = "processing",
                    "Waiting for optimization result"
                );
                let polled = self.await_result(&process_id).await?;

                if let OptimizationStatus::Error = polled.status() {
                    tracing::error!(
                        process_id = %process_id,
                        errors = ?polled.errors,
                        "Optimization failed"
                    );
                    return Ok(None);
                }

                tracing::info!(
                    process_id = %process_id,
                    status = %polled.status,
                    duration_ms = start.elapsed().as_millis() as u64,
                    "Optimization completed"
                );
                Ok(polled.into_first_result())
            }
            OptimizationStatus::Error => {
                tracing::error!(
                    path = %path.display(),
                    errors = ?response.errors,
                    "Optimization provider returned an error"
                );
                Ok(None)
            }
            OptimizationStatus::Other(status) => {
                tracing::error!(
                    path = %path.display(),
                    status = %status,
                    "Unexpected optimization provider status"
                );
                Ok(None)
            }
        }
    }
}

fn upstream(err: anyhow::Error) -> AppError {
    AppError::Upstream(format!("{:#}", err))
}

#[async_trait]
impl ImageOptimizer for OptimizationClient {
    async fn optimize(
        &self,
        path: &Path,
        options: &OptimizeOptions,
    ) -> Result<Option<OptimizedResult>, AppError> {
        self.run(path, options).await.map_err(upstream)
    }

    async fn fetch_result(&self, url: &str) -> Result<Vec<u8>, AppError> {
        let response = self
            .http_client
            .get(url)
            .send()
            .await
            .context("Failed to download optimized file")
            .map_err(upstream)?;

        if !response.status().is_success() {
            return Err(AppError::Upstream(format!(
                "Failed to download optimized file: {}",
                response.status()
            )));
        }

        let data = response
            .bytes()
            .await
            .context("Failed to read optimized file data")
            .map_err(upstream)?;

        Ok(data.to_vec())
    }
}
