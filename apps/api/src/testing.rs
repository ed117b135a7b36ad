//! Shared fixtures for handler tests: a scripted ML service and request helpers.

use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::{Duration, Instant};

use async_trait::async_trait;
use axum::response::Response;
use serde_json::{json, Value};

use crate::companies::directory::CompanyDirectory;
use crate::config::{Config, Environment};
use crate::ml_client::{MlError, MlService};
use crate::models::resume::ParsedResume;
use crate::recommend::request::RecommendationRequest;
use crate::state::AppState;
use crate::upload::storage::StoredUpload;

pub const BOUNDARY: &str = "matchmaker-test-boundary";

/// In-process stand-in for the ML service. Either answers every call or fails
/// every call with the given upstream status, and records what it was sent.
#[derive(Default)]
pub struct FakeMl {
    fail_with: Option<u16>,
    health_status: Option<&'static str>,
    pub parse_calls: AtomicUsize,
    pub recommend_calls: AtomicUsize,
    uploads: Mutex<Vec<(PathBuf, bool)>>,
    requests: Mutex<Vec<Value>>,
}

impl FakeMl {
    pub fn healthy() -> Self {
        Self::default()
    }

    pub fn failing(status: u16) -> Self {
        Self {
            fail_with: Some(status),
            ..Self::default()
        }
    }

    /// Answers health probes with `status` instead of `healthy`.
    pub fn reporting(status: &'static str) -> Self {
        Self {
            health_status: Some(status),
            ..Self::default()
        }
    }

    pub fn recommendations() -> Value {
        json!([{
            "id": "rec-1",
            "company": "TechCorp Solutions",
            "role": "Data Science Intern",
            "match_score": 87.5
        }])
    }

    /// Paths handed to `parse_resume`, with whether the file existed at call time.
    pub fn seen_uploads(&self) -> Vec<(PathBuf, bool)> {
        self.uploads.lock().unwrap().clone()
    }

    /// Requests handed to `recommend`, as they would be serialised on the wire.
    pub fn forwarded(&self) -> Vec<Value> {
        self.requests.lock().unwrap().clone()
    }

    fn outcome<T>(&self, value: T) -> Result<T, MlError> {
        match self.fail_with {
            Some(status) => Err(MlError::Api {
                status,
                message: "upstream exploded".to_string(),
            }),
            None => Ok(value),
        }
    }
}

#[async_trait]
impl MlService for FakeMl {
    async fn parse_resume(&self, upload: &StoredUpload) -> Result<ParsedResume, MlError> {
        self.parse_calls.fetch_add(1, Ordering::SeqCst);
        let path = upload.path().to_path_buf();
        let existed = path.exists();
        self.uploads.lock().unwrap().push((path, existed));

        self.outcome(ParsedResume {
            skills: vec!["Rust".to_string()],
            interests: vec!["systems".to_string()],
            ..ParsedResume::default()
        })
    }

    async fn recommend(&self, request: &RecommendationRequest) -> Result<Value, MlError> {
        self.recommend_calls.fetch_add(1, Ordering::SeqCst);
        self.requests
            .lock()
            .unwrap()
            .push(serde_json::to_value(request).unwrap());
        self.outcome(Self::recommendations())
    }

    async fn health(&self, _timeout: Duration) -> Result<String, MlError> {
        self.outcome(self.health_status.unwrap_or("healthy").to_string())
    }
}

/// Production config pointing at the default local ML service.
pub fn test_config() -> Config {
    Config {
        ml_service_url: "http://localhost:8000".to_string(),
        environment: Environment::Production,
        upload_dir: PathBuf::from("uploads"),
        companies_file: None,
        port: 5000,
        rust_log: "info".to_string(),
    }
}

pub fn test_state(ml: Arc<FakeMl>, upload_dir: &Path, environment: Environment) -> AppState {
    let mut config = test_config();
    config.upload_dir = upload_dir.to_path_buf();
    config.environment = environment;

    AppState {
        config,
        ml,
        companies: Arc::new(CompanyDirectory::builtin().unwrap()),
        started_at: Instant::now(),
    }
}

/// Single-part multipart body delimited by `BOUNDARY`.
pub fn multipart_body(field: &str, file_name: &str, content_type: &str, content: &[u8]) -> Vec<u8> {
    let mut body = format!(
        "--{BOUNDARY}\r\n\
         Content-Disposition: form-data; name=\"{field}\"; filename=\"{file_name}\"\r\n\
         Content-Type: {content_type}\r\n\r\n"
    )
    .into_bytes();
    body.extend_from_slice(content);
    body.extend_from_slice(format!("\r\n--{BOUNDARY}--\r\n").as_bytes());
    body
}

pub async fn read_json(response: Response) -> Value {
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    serde_json::from_slice(&bytes).unwrap()
}
