//! Structured extraction endpoints, one per supplier family

use axum::extract::{Query, State};
use axum::Json;
use serde::{Deserialize, Serialize};

use crate::api::error::ApiError;
use crate::api::AppState;
use crate::domain::product::ExtractedProductInfo;
use crate::error::ServiceError;

#[derive(Debug, Deserialize)]
pub struct DescriptionParams {
    pub url: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct DescriptionResponse {
    pub success: bool,
    pub url: String,
    #[serde(rename = "hasContent")]
    pub has_content: bool,
    #[serde(flatten)]
    pub info: ExtractedProductInfo,
}

async fn describe(
    state: &AppState,
    params: DescriptionParams,
    domains: &[String],
) -> Result<Json<DescriptionResponse>, ApiError> {
    let url = params
        .url
        .filter(|u| !u.trim().is_empty())
        .ok_or_else(|| ServiceError::validation("parâmetro url é obrigatório"))?;

    let info = state.probe.describe(&url, domains).await?;
    Ok(Json(DescriptionResponse {
        success: true,
        url,
        has_content: info.has_content(),
        info,
    }))
}

/// `GET /product-description?url=...` - primary supplier pages.
pub async fn product_description(
    State(state): State<AppState>,
    Query(params): Query<DescriptionParams>,
) -> Result<Json<DescriptionResponse>, ApiError> {
    let domains = state.probe.probe_domains().to_vec();
    describe(&state, params, &domains).await
}

/// `GET /lojavale-description?url=...` - LojaVale pages.
pub async fn lojavale_description(
    State(state): State<AppState>,
    Query(params): Query<DescriptionParams>,
) -> Result<Json<DescriptionResponse>, ApiError> {
    let domains = state.probe.lojavale_domains().to_vec();
    describe(&state, params, &domains).await
}
