use axum::{
    extract::{rejection::JsonRejection, State},
    Json,
};
use serde::Serialize;
use serde_json::Value;
use tracing::info;

use crate::errors::AppError;
use crate::recommend::request::{RecommendationRequest, INVALID_SHAPE_MESSAGE};
use crate::state::AppState;

#[derive(Debug, Serialize)]
pub struct RecommendResponse {
    pub success: bool,
    pub message: &'static str,
    /// Upstream `recommendations` field, relayed verbatim.
    pub recommendations: Value,
}

/// POST /api/recommend
///
/// Validates the body before any network call, then forwards it to the
/// recommender.
pub async fn handle_recommend(
    State(state): State<AppState>,
    payload: Result<Json<Value>, JsonRejection>,
) -> Result<Json<RecommendResponse>, AppError> {
    let Json(body) = payload.map_err(|rejection| AppError::InvalidRequest {
        message: INVALID_SHAPE_MESSAGE.to_string(),
        detail: Some(rejection.body_text()),
    })?;

    let request = RecommendationRequest::from_body(body)?;
    info!(kind = request.kind(), "Forwarding recommendation request");

    let recommendations =
        state
            .ml
            .recommend(&request)
            .await
            .map_err(|e| AppError::RecommendationFailure {
                detail: state.config.error_detail(&e),
            })?;

    Ok(Json(RecommendResponse {
        success: true,
        message: "Recommendations generated successfully",
        recommendations,
    }))
}
