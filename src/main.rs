use std::sync::Arc;

use anyhow::{Context, Result};
use tracing::info;

use blu_storefront::api::{self, AppState};
use blu_storefront::application::{
    CatalogService, CheckoutService, ProbeService, ShippingEstimator, WebhookService,
};
use blu_storefront::infrastructure::carrier::HttpCarrierClient;
use blu_storefront::infrastructure::mercado_pago::MercadoPagoClient;
use blu_storefront::infrastructure::order_repository::SqliteOrderRepository;
use blu_storefront::infrastructure::product_repository::SqliteProductRepository;
use blu_storefront::infrastructure::webhook_log_repository::SqliteWebhookLogRepository;
use blu_storefront::infrastructure::{logging, AppConfig, DatabaseConnection, HttpClient};

#[tokio::main]
async fn main() -> Result<()> {
    logging::init_logging()?;
    let config = AppConfig::load()?;

    let db = DatabaseConnection::new(&config.database.url).await?;
    db.migrate().await?;

    let products = Arc::new(SqliteProductRepository::new(db.pool().clone()));
    let orders = Arc::new(SqliteOrderRepository::new(db.pool().clone()));
    let webhook_logs = Arc::new(SqliteWebhookLogRepository::new(db.pool().clone()));

    let http = Arc::new(HttpClient::new(&config.http)?);
    let gateway = Arc::new(MercadoPagoClient::new(config.payment.clone()));
    let carrier = Arc::new(HttpCarrierClient::new(config.shipping.carrier_api_url.clone()));

    let state = AppState {
        probe: Arc::new(ProbeService::new(
            http,
            products.clone(),
            config.suppliers.clone(),
        )),
        catalog: Arc::new(CatalogService::new(products.clone(), config.store.clone())),
        shipping: Arc::new(ShippingEstimator::new(config.shipping.clone(), carrier)),
        checkout: Arc::new(CheckoutService::new(
            products,
            orders.clone(),
            gateway.clone(),
            config.shipping.clone(),
        )),
        webhook: Arc::new(WebhookService::new(
            orders.clone(),
            webhook_logs,
            gateway,
            config.payment.webhook_secret.clone(),
        )),
        orders,
    };

    let addr = format!("{}:{}", config.server.host, config.server.port);
    let listener = tokio::net::TcpListener::bind(&addr)
        .await
        .with_context(|| format!("Failed to bind {addr}"))?;
    info!(%addr, "storefront backend listening");

    axum::serve(listener, api::router(state))
        .with_graceful_shutdown(shutdown_signal())
        .await
        .context("Server error")?;

    Ok(())
}

async fn shutdown_signal() {
    if let Err(cause) = tokio::signal::ctrl_c().await {
        tracing::error!(%cause, "failed to install shutdown signal handler");
    }
}
