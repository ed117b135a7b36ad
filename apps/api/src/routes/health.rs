//! Liveness and composite health checks.
//!
//! A failed downstream probe is reported in the body, never raised: these
//! handlers cannot fail on an unreachable ML service.

use std::time::Instant;

use axum::{extract::State, http::StatusCode, Json};
use chrono::{DateTime, Utc};
use serde::Serialize;
use serde_json::{json, Value};

use crate::ml_client::{DETAILED_HEALTH_TIMEOUT, HEALTH_TIMEOUT};
use crate::state::AppState;

const HEALTHY: &str = "healthy";
const UNHEALTHY: &str = "unhealthy";

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct HealthReport {
    pub status: &'static str,
    pub timestamp: DateTime<Utc>,
    /// Seconds since startup.
    pub uptime: f64,
    pub environment: String,
    pub version: &'static str,
    pub services: ServiceSummary,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub ml_service_error: Option<String>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ServiceSummary {
    pub ml_service: String,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DetailedHealthReport {
    pub status: &'static str,
    pub timestamp: DateTime<Utc>,
    pub uptime: f64,
    pub memory: Option<MemoryUsage>,
    pub environment: String,
    pub version: &'static str,
    pub services: DetailedServices,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DetailedServices {
    pub ml_service: ServiceProbe,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ServiceProbe {
    pub status: String,
    pub response_time: Option<String>,
    pub error: Option<String>,
}

impl ServiceProbe {
    fn is_unhealthy(&self) -> bool {
        self.status == UNHEALTHY
    }
}

#[derive(Debug, Serialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct MemoryUsage {
    pub resident_bytes: u64,
    pub virtual_bytes: u64,
}

/// GET /health
/// Liveness only; never touches the ML service.
pub async fn health_handler() -> Json<Value> {
    Json(json!({
        "status": "ok",
        "version": env!("CARGO_PKG_VERSION"),
        "service": env!("CARGO_PKG_NAME")
    }))
}

/// GET /api/health
pub async fn api_health_handler(State(state): State<AppState>) -> (StatusCode, Json<HealthReport>) {
    let (ml_service, ml_service_error) = match state.ml.health(HEALTH_TIMEOUT).await {
        Ok(status) => (status, None),
        Err(e) => {
            tracing::warn!("ML service health probe failed: {e}");
            (UNHEALTHY.to_string(), Some(e.to_string()))
        }
    };

    let unhealthy = ml_service == UNHEALTHY;
    let report = HealthReport {
        status: if unhealthy { UNHEALTHY } else { HEALTHY },
        timestamp: Utc::now(),
        uptime: state.started_at.elapsed().as_secs_f64(),
        environment: state.config.environment.to_string(),
        version: env!("CARGO_PKG_VERSION"),
        services: ServiceSummary { ml_service },
        ml_service_error,
    };

    (status_code(unhealthy), Json(report))
}

/// GET /api/health/detailed
pub async fn detailed_health_handler(
    State(state): State<AppState>,
) -> (StatusCode, Json<DetailedHealthReport>) {
    let started = Instant::now();
    let ml_service = match state.ml.health(DETAILED_HEALTH_TIMEOUT).await {
        Ok(status) => ServiceProbe {
            status,
            response_time: Some(format!("{}ms", started.elapsed().as_millis())),
            error: None,
        },
        Err(e) => {
            tracing::warn!("ML service detailed health probe failed: {e}");
            ServiceProbe {
                status: UNHEALTHY.to_string(),
                response_time: None,
                error: Some(e.to_string()),
            }
        }
    };

    let unhealthy = ml_service.is_unhealthy();
    let report = DetailedHealthReport {
        status: if unhealthy { UNHEALTHY } else { HEALTHY },
        timestamp: Utc::now(),
        uptime: state.started_at.elapsed().as_secs_f64(),
        memory: memory_usage().await,
        environment: state.config.environment.to_string(),
        version: env!("CARGO_PKG_VERSION"),
        services: DetailedServices { ml_service },
    };

    (status_code(unhealthy), Json(report))
}

fn status_code(unhealthy: bool) -> StatusCode {
    if unhealthy {
        StatusCode::SERVICE_UNAVAILABLE
    } else {
        StatusCode::OK
    }
}

/// Best effort; `None` where `/proc` is unavailable.
async fn memory_usage() -> Option<MemoryUsage> {
    let status = tokio::fs::read_to_string("/proc/self/status").await.ok()?;
    parse_proc_status(&status)
}

fn parse_proc_status(status: &str) -> Option<MemoryUsage> {
    let field_kb = |name: &str| -> Option<u64> {
        status
            .lines()
            .find_map(|line| line.strip_prefix(name))
            .and_then(|rest| rest.trim().trim_end_matches("kB").trim().parse().ok())
    };

    Some(MemoryUsage {
        resident_bytes: field_kb("VmRSS:")? * 1024,
        virtual_bytes: field_kb("VmSize:")? * 1024,
    })
}
