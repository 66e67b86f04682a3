//! Supplier price/stock probe endpoints

use axum::extract::{Query, State};
use axum::Json;
use serde::{Deserialize, Serialize};

use crate::api::error::ApiError;
use crate::api::AppState;
use crate::application::dto::{ProbeOutcome, ProbeResult};
use crate::error::ServiceError;

#[derive(Debug, Deserialize)]
pub struct CheckParams {
    pub url: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct CheckResponse {
    pub success: bool,
    #[serde(flatten)]
    pub result: ProbeResult,
}

/// `GET /check?url=...`
pub async fn check_single(
    State(state): State<AppState>,
    Query(params): Query<CheckParams>,
) -> Result<Json<CheckResponse>, ApiError> {
    let url = params
        .url
        .filter(|u| !u.trim().is_empty())
        .ok_or_else(|| ServiceError::validation("parâmetro url é obrigatório"))?;

    let result = state.probe.check_url(&url).await?;
    Ok(Json(CheckResponse { success: true, result }))
}

#[derive(Debug, Deserialize)]
pub struct BatchRequest {
    #[serde(default)]
    pub urls: Vec<String>,
}

#[derive(Debug, Serialize)]
pub struct BatchResponse {
    pub results: Vec<ProbeOutcome>,
}

/// `POST /check-batch` - bounded parallel probe; every URL reports its own
/// success or failure.
pub async fn check_batch(
    State(state): State<AppState>,
    Json(request): Json<BatchRequest>,
) -> Result<Json<BatchResponse>, ApiError> {
    let results = state.probe.check_batch(&request.urls).await?;
    Ok(Json(BatchResponse { results }))
}
