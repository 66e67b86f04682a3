//! Repository and gateway interfaces
//!
//! Trait definitions for the seams between the application services and the
//! outside world: the relational store, the payment processor and the
//! carrier quoting service. Implementations live in the infrastructure layer.

use anyhow::Result;
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::domain::customer::Customer;
use crate::domain::order::{Order, OrderItem, OrderStatus};
use crate::domain::product::Product;
use crate::domain::shipping::ShippingOption;
use crate::domain::webhook::WebhookLogEntry;

/// Catalog listing filters; all optional, combined with AND.
#[derive(Debug, Clone, Default)]
pub struct CatalogFilter {
    pub category: Option<String>,
    pub in_stock: Option<bool>,
}

#[async_trait]
pub trait ProductRepository: Send + Sync {
    async fn upsert(&self, product: &Product) -> Result<()>;
    async fn find_by_id(&self, id: &str) -> Result<Option<Product>>;
    async fn find_by_source_url(&self, url: &str) -> Result<Option<Product>>;
    async fn find_all(&self, filter: &CatalogFilter) -> Result<Vec<Product>>;
    /// Refresh the live price/stock columns from a supplier probe.
    async fn update_probe_snapshot(
        &self,
        id: &str,
        price_cents: Option<i64>,
        in_stock: bool,
        stock: Option<i64>,
    ) -> Result<()>;
}

/// Webhook-driven mutation of an order's payment fields. The only write
/// path into an order after creation.
#[derive(Debug, Clone)]
pub struct PaymentUpdate {
    pub status: OrderStatus,
    pub payment_id: String,
    pub status_detail: Option<String>,
    pub payment_method: Option<String>,
    pub paid_at: Option<DateTime<Utc>>,
}

#[async_trait]
pub trait OrderRepository: Send + Sync {
    /// Persist customer upsert, order insert and item inserts atomically.
    async fn create_order(
        &self,
        customer: &Customer,
        order: &Order,
        items: &[OrderItem],
    ) -> Result<()>;
    async fn find_by_reference(&self, reference: &str) -> Result<Option<Order>>;
    async fn items_for(&self, reference: &str) -> Result<Vec<OrderItem>>;
    async fn set_preference_id(&self, reference: &str, preference_id: &str) -> Result<()>;
    async fn apply_payment_update(&self, reference: &str, update: &PaymentUpdate) -> Result<()>;
    async fn find_customer_by_email(&self, email: &str) -> Result<Option<Customer>>;
}

#[async_trait]
pub trait WebhookLogRepository: Send + Sync {
    /// Append-only; the stored row is never mutated afterwards.
    async fn append(&self, entry: &WebhookLogEntry) -> Result<()>;
}

/// One line item sent to the payment processor.
#[derive(Debug, Clone, Serialize)]
pub struct SessionItem {
    pub title: String,
    pub quantity: i64,
    pub unit_price_cents: i64,
}

/// Everything the processor needs to host the payment form.
#[derive(Debug, Clone)]
pub struct CheckoutSessionRequest {
    pub external_reference: String,
    pub items: Vec<SessionItem>,
    pub payer_name: String,
    pub payer_email: String,
    pub payer_phone: String,
    pub shipping_address: Option<String>,
    pub shipping_cep: Option<String>,
}

/// Processor-side session handle returned on creation.
#[derive(Debug, Clone, Deserialize)]
pub struct CheckoutSession {
    pub preference_id: String,
    /// URL the buyer is redirected to for payment.
    pub init_point: String,
}

/// Authoritative payment details fetched back from the processor. Webhook
/// envelopes are never trusted for amounts or status.
#[derive(Debug, Clone, Deserialize)]
pub struct PaymentDetails {
    pub id: String,
    pub status: String,
    pub status_detail: Option<String>,
    pub payment_method: Option<String>,
    pub external_reference: Option<String>,
}

#[async_trait]
pub trait PaymentGateway: Send + Sync {
    async fn create_checkout_session(
        &self,
        request: &CheckoutSessionRequest,
    ) -> Result<CheckoutSession>;
    async fn get_payment(&self, payment_id: &str) -> Result<PaymentDetails>;
}

#[async_trait]
pub trait CarrierQuotes: Send + Sync {
    /// Remote carrier rates for one product to a destination CEP.
    async fn quote(&self, product_id: &str, cep: &str) -> Result<Vec<ShippingOption>>;
}
