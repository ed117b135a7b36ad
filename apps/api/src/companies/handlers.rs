use axum::{
    extract::{Path, State},
    Json,
};
use bytes::Bytes;
use serde::Serialize;

use crate::companies::directory::CompanySearch;
use crate::errors::AppError;
use crate::models::company::Company;
use crate::state::AppState;

#[derive(Debug, Serialize)]
pub struct CompanyListResponse {
    pub success: bool,
    pub companies: Vec<Company>,
}

#[derive(Debug, Serialize)]
pub struct CompanyResponse {
    pub success: bool,
    pub company: Company,
}

#[derive(Debug, Serialize)]
pub struct CompanySearchResponse {
    pub success: bool,
    pub companies: Vec<Company>,
    pub total: usize,
}

/// GET /api/companies
pub async fn handle_list_companies(State(state): State<AppState>) -> Json<CompanyListResponse> {
    Json(CompanyListResponse {
        success: true,
        companies: state.companies.all().to_vec(),
    })
}

/// GET /api/companies/:id
pub async fn handle_get_company(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<CompanyResponse>, AppError> {
    let company = state
        .companies
        .get(&id)
        .cloned()
        .ok_or_else(|| AppError::NotFound("Company not found".to_string()))?;

    Ok(Json(CompanyResponse {
        success: true,
        company,
    }))
}

/// POST /api/companies/search
///
/// An empty body means no filters.
pub async fn handle_search_companies(
    State(state): State<AppState>,
    body: Bytes,
) -> Result<Json<CompanySearchResponse>, AppError> {
    let filter: CompanySearch = if body.iter().all(u8::is_ascii_whitespace) {
        CompanySearch::default()
    } else {
        serde_json::from_slice(&body).map_err(|e| AppError::InvalidRequest {
            message: "Invalid search filters".to_string(),
            detail: Some(e.to_string()),
        })?
    };

    let companies: Vec<Company> = state.companies.search(&filter).into_iter().cloned().collect();

    Ok(Json(CompanySearchResponse {
        success: true,
        total: companies.len(),
        companies,
    }))
}
