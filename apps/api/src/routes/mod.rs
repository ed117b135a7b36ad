pub mod health;

use axum::{
    extract::DefaultBodyLimit,
    routing::{get, post},
    Router,
};

use crate::companies::handlers as companies;
use crate::errors::AppError;
use crate::recommend::handlers::handle_recommend;
use crate::state::AppState;
use crate::upload::handlers::handle_upload;
use crate::upload::validator::MAX_UPLOAD_BYTES;

/// Room for multipart boundaries and headers on top of the file itself.
const UPLOAD_BODY_LIMIT: usize = MAX_UPLOAD_BYTES + 512 * 1024;

async fn route_not_found() -> AppError {
    AppError::NotFound("Route not found".to_string())
}

pub fn build_router(state: AppState) -> Router {
    Router::new()
        .route("/health", get(health::health_handler))
        .route("/api/health", get(health::api_health_handler))
        .route("/api/health/detailed", get(health::detailed_health_handler))
        .route(
            "/api/upload",
            post(handle_upload).layer(DefaultBodyLimit::max(UPLOAD_BODY_LIMIT)),
        )
        .route("/api/recommend", post(handle_recommend))
        .route("/api/companies", get(companies::handle_list_companies))
        .route(
            "/api/companies/search",
            post(companies::handle_search_companies),
        )
        .route("/api/companies/:id", get(companies::handle_get_company))
        .fallback(route_not_found)
        .with_state(state)
}
