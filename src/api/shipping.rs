//! Shipping estimate endpoint

use axum::extract::State;
use axum::Json;
use serde::{Deserialize, Serialize};

use crate::api::error::ApiError;
use crate::api::AppState;
use crate::application::dto::CartItemInput;
use crate::domain::shipping::ShippingOption;
use crate::domain::value_objects::{cents_to_reais, format_brl};
use crate::error::ServiceError;

#[derive(Debug, Deserialize)]
pub struct ShippingRequest {
    pub cep: Option<String>,
    #[serde(default)]
    pub items: Vec<CartItemInput>,
}

#[derive(Debug, Serialize)]
pub struct ShippingOptionView {
    pub name: String,
    pub carrier: String,
    pub price: f64,
    #[serde(rename = "priceFormatted")]
    pub price_formatted: String,
    #[serde(rename = "deliveryDays")]
    pub delivery_days: u32,
}

impl From<ShippingOption> for ShippingOptionView {
    fn from(option: ShippingOption) -> Self {
        Self {
            price: cents_to_reais(option.price_cents),
            price_formatted: format_brl(option.price_cents),
            name: option.name,
            carrier: option.carrier,
            delivery_days: option.delivery_days,
        }
    }
}

#[derive(Debug, Serialize)]
pub struct ShippingResponse {
    pub success: bool,
    #[serde(rename = "isFreeZone")]
    pub is_free_zone: bool,
    pub options: Vec<ShippingOptionView>,
}

/// `POST /shipping` body `{cep, items}`.
pub async fn estimate(
    State(state): State<AppState>,
    Json(request): Json<ShippingRequest>,
) -> Result<Json<ShippingResponse>, ApiError> {
    let cep = request
        .cep
        .filter(|c| !c.trim().is_empty())
        .ok_or_else(|| ServiceError::validation("CEP é obrigatório"))?;

    let quote = state.shipping.estimate(&cep, &request.items).await?;
    Ok(Json(ShippingResponse {
        success: true,
        is_free_zone: quote.is_free_zone,
        options: quote.options.into_iter().map(ShippingOptionView::from).collect(),
    }))
}
