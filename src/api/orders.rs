//! Order status lookup endpoint

use axum::extract::{Path, State};
use axum::Json;

use crate::api::error::ApiError;
use crate::api::AppState;
use crate::application::dto::OrderView;
use crate::error::ServiceError;

/// `GET /order/{reference}`
pub async fn get_order(
    State(state): State<AppState>,
    Path(reference): Path<String>,
) -> Result<Json<OrderView>, ApiError> {
    let order = state
        .orders
        .find_by_reference(&reference)
        .await
        .map_err(ServiceError::Internal)?
        .ok_or_else(|| ServiceError::not_found(format!("pedido {reference}")))?;
    let items = state
        .orders
        .items_for(&reference)
        .await
        .map_err(ServiceError::Internal)?;

    Ok(Json(OrderView::from_order(order, items)))
}
