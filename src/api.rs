//! HTTP API surface
//!
//! Thin axum handlers over the application services. Every JSON route gets
//! permissive CORS headers; OPTIONS preflights are answered by the layer.

pub mod check;
pub mod checkout;
pub mod description;
pub mod error;
pub mod orders;
pub mod products;
pub mod shipping;
pub mod webhook;

use std::sync::Arc;

use axum::routing::{get, post};
use axum::Router;
use tower_http::cors::CorsLayer;

use crate::application::{
    CatalogService, CheckoutService, ProbeService, ShippingEstimator, WebhookService,
};
use crate::domain::repositories::OrderRepository;

#[derive(Clone)]
pub struct AppState {
    pub probe: Arc<ProbeService>,
    pub catalog: Arc<CatalogService>,
    pub shipping: Arc<ShippingEstimator>,
    pub checkout: Arc<CheckoutService>,
    pub webhook: Arc<WebhookService>,
    pub orders: Arc<dyn OrderRepository>,
}

pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/check", get(check::check_single))
        .route("/check-batch", post(check::check_batch))
        .route("/product-description", get(description::product_description))
        .route("/lojavale-description", get(description::lojavale_description))
        .route("/products", get(products::list_products))
        .route("/shipping", post(shipping::estimate))
        .route("/checkout", post(checkout::create_order))
        .route("/webhook", post(webhook::receive))
        .route("/order/:reference", get(orders::get_order))
        .layer(CorsLayer::permissive())
        .with_state(state)
}
