use std::fmt;
use std::path::PathBuf;

use anyhow::{Context, Result};

const DEFAULT_ML_SERVICE_URL: &str = "http://localhost:8000";

/// Deployment environment. Only `Development` exposes upstream error detail
/// in response bodies.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Environment {
    Development,
    Production,
    Other(String),
}

impl Environment {
    pub fn parse(raw: &str) -> Self {
        match raw.trim().to_ascii_lowercase().as_str() {
            "development" | "dev" => Environment::Development,
            "production" | "prod" | "" => Environment::Production,
            other => Environment::Other(other.to_string()),
        }
    }

    pub fn as_str(&self) -> &str {
        match self {
            Environment::Development => "development",
            Environment::Production => "production",
            Environment::Other(name) => name,
        }
    }

    pub fn is_development(&self) -> bool {
        matches!(self, Environment::Development)
    }
}

impl fmt::Display for Environment {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Application configuration loaded from environment variables.
#[derive(Debug, Clone)]
pub struct Config {
    /// Base URL of the external parse/recommend service, without trailing slash.
    pub ml_service_url: String,
    pub environment: Environment,
    pub upload_dir: PathBuf,
    /// Optional JSON file replacing the built-in company fixture.
    pub companies_file: Option<PathBuf>,
    pub port: u16,
    pub rust_log: String,
}

impl Config {
    pub fn from_env() -> Result<Self> {
        dotenvy::dotenv().ok(); // load .env if present; ignore if missing

        let environment = std::env::var("APP_ENV")
            .or_else(|_| std::env::var("NODE_ENV"))
            .map(|raw| Environment::parse(&raw))
            .unwrap_or(Environment::Production);

        Ok(Config {
            ml_service_url: normalize_base_url(
                &std::env::var("ML_SERVICE_URL")
                    .unwrap_or_else(|_| DEFAULT_ML_SERVICE_URL.to_string()),
            ),
            environment,
            upload_dir: std::env::var("UPLOAD_DIR")
                .map(PathBuf::from)
                .unwrap_or_else(|_| PathBuf::from("uploads")),
            companies_file: std::env::var("COMPANIES_FILE").ok().map(PathBuf::from),
            port: std::env::var("PORT")
                .unwrap_or_else(|_| "5000".to_string())
                .parse::<u16>()
                .context("PORT must be a valid port number")?,
            rust_log: std::env::var("RUST_LOG").unwrap_or_else(|_| "info".to_string()),
        })
    }

    /// Returns the error text only when running in development.
    pub fn error_detail(&self, err: &impl fmt::Display) -> Option<String> {
        self.environment
            .is_development()
            .then(|| err.to_string())
    }
}

fn normalize_base_url(raw: &str) -> String {
    raw.trim().trim_end_matches('/').to_string()
}
