//! ML service client: the single point of entry for calls to the external
//! resume-parsing / recommendation service.
//!
//! No other module talks to the ML service over HTTP. Handlers depend on the
//! `MlService` trait so they can be driven by in-process fakes in tests.
//!
//! Every call carries a fixed timeout and is never retried.
use std::time::Duration;

use async_trait::async_trait;
use reqwest::{multipart, Client, Response};
use serde::Deserialize;
use serde_json::Value;
use thiserror::Error;
use tokio_util::io::ReaderStream;
use tracing::debug;

use crate::models::resume::{ParseResumeResponse, ParsedResume};
use crate::recommend::request::RecommendationRequest;
use crate::upload::storage::StoredUpload;

pub const PARSE_TIMEOUT: Duration = Duration::from_secs(30);
pub const RECOMMEND_TIMEOUT: Duration = Duration::from_secs(30);
pub const HEALTH_TIMEOUT: Duration = Duration::from_secs(5);
pub const DETAILED_HEALTH_TIMEOUT: Duration = Duration::from_secs(10);

#[derive(Debug, Error)]
pub enum MlError {
    #[error("{endpoint} timed out after {}ms", .timeout.as_millis())]
    Timeout {
        endpoint: &'static str,
        timeout: Duration,
    },

    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("ML service error (status {status}): {message}")]
    Api { status: u16, message: String },

    #[error("Failed to read upload: {0}")]
    Io(#[from] std::io::Error),
}

/// Operations the relays need from the external ML service.
#[async_trait]
pub trait MlService: Send + Sync {
    /// Sends the stored file to the parser and returns the extracted fields.
    async fn parse_resume(&self, upload: &StoredUpload) -> Result<ParsedResume, MlError>;

    /// Forwards a validated request and returns the upstream `recommendations`
    /// field untouched (`null` when absent).
    async fn recommend(&self, request: &RecommendationRequest) -> Result<Value, MlError>;

    /// Probes `/health`, returning the reported status string.
    async fn health(&self, timeout: Duration) -> Result<String, MlError>;
}

#[derive(Debug, Deserialize)]
struct RecommendResponse {
    #[serde(default)]
    recommendations: Value,
}

/// FastAPI-style error body: `{"detail": "..."}` or `{"detail": [...]}`.
#[derive(Debug, Deserialize)]
struct UpstreamError {
    detail: Value,
}

/// reqwest-backed `MlService`.
#[derive(Clone)]
pub struct MlClient {
    client: Client,
    base_url: String,
}

impl MlClient {
    pub fn new(base_url: impl Into<String>) -> Result<Self, MlError> {
        Ok(Self {
            client: Client::builder().build()?,
            base_url: base_url.into().trim_end_matches('/').to_string(),
        })
    }

    fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }
}

#[async_trait]
impl MlService for MlClient {
    async fn parse_resume(&self, upload: &StoredUpload) -> Result<ParsedResume, MlError> {
        let file = tokio::fs::File::open(upload.path()).await?;
        let length = file.metadata().await?.len();

        let part = multipart::Part::stream_with_length(
            reqwest::Body::wrap_stream(ReaderStream::new(file)),
            length,
        )
        .file_name(upload.file_name().to_string())
        .mime_str(upload.mime_type())?;

        let form = multipart::Form::new()
            .part("file", part)
            .text("file_type", upload.mime_type());

        let response = self
            .client
            .post(self.url("/parse_resume"))
            .multipart(form)
            .timeout(PARSE_TIMEOUT)
            .send()
            .await
            .map_err(|e| classify(e, "parse_resume", PARSE_TIMEOUT))?;

        let response = ensure_success(response).await?;
        let parsed: ParseResumeResponse = response
            .json()
            .await
            .map_err(|e| classify(e, "parse_resume", PARSE_TIMEOUT))?;

        debug!("Parser returned resume fields for {}", upload.file_name());
        Ok(parsed.into())
    }

    async fn recommend(&self, request: &RecommendationRequest) -> Result<Value, MlError> {
        let response = self
            .client
            .post(self.url("/recommend"))
            .json(request)
            .timeout(RECOMMEND_TIMEOUT)
            .send()
            .await
            .map_err(|e| classify(e, "recommend", RECOMMEND_TIMEOUT))?;

        let response = ensure_success(response).await?;
        let body: RecommendResponse = response
            .json()
            .await
            .map_err(|e| classify(e, "recommend", RECOMMEND_TIMEOUT))?;

        Ok(body.recommendations)
    }

    async fn health(&self, timeout: Duration) -> Result<String, MlError> {
        let response = self
            .client
            .get(self.url("/health"))
            .timeout(timeout)
            .send()
            .await
            .map_err(|e| classify(e, "health", timeout))?;

        let response = ensure_success(response).await?;

        // A 2xx without a readable status field still counts as healthy.
        let status = response
            .json::<Value>()
            .await
            .ok()
            .and_then(|body| body.get("status").and_then(Value::as_str).map(String::from))
            .unwrap_or_else(|| "healthy".to_string());

        Ok(status)
    }
}

fn classify(err: reqwest::Error, endpoint: &'static str, timeout: Duration) -> MlError {
    if err.is_timeout() {
        MlError::Timeout { endpoint, timeout }
    } else {
        MlError::Http(err)
    }
}

async fn ensure_success(response: Response) -> Result<Response, MlError> {
    let status = response.status();
    if status.is_success() {
        return Ok(response);
    }

    let body = response.text().await.unwrap_or_default();
    let message = serde_json::from_str::<UpstreamError>(&body)
        .map(|e| match e.detail {
            Value::String(text) => text,
            other => other.to_string(),
        })
        .unwrap_or(body);

    Err(MlError::Api {
        status: status.as_u16(),
        message,
    })
}
