//! Checkout endpoint

use axum::extract::State;
use axum::Json;
use serde_json::{json, Value};

use crate::api::error::ApiError;
use crate::api::AppState;
use crate::application::dto::CheckoutRequest;

/// `POST /checkout` body `{items, customer, shipping}`.
///
/// Validation failures answer 400 with every accumulated message; success
/// answers the external reference and the processor redirect URL.
pub async fn create_order(
    State(state): State<AppState>,
    Json(request): Json<CheckoutRequest>,
) -> Result<Json<Value>, ApiError> {
    let confirmation = state.checkout.create_order(request).await?;
    Ok(Json(json!({ "success": true, "data": confirmation })))
}
