//! Request and response shapes shared between the API layer and services

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::domain::order::{Order, OrderItem};
use crate::domain::value_objects::{cents_to_reais, format_brl};

fn default_quantity() -> i64 {
    1
}

/// One cart line as submitted by the storefront. Unit prices are never
/// accepted from the caller; they are always re-read from the catalog.
#[derive(Debug, Clone, Deserialize)]
pub struct CartItemInput {
    pub id: String,
    #[serde(default = "default_quantity")]
    pub quantity: i64,
}

#[derive(Debug, Clone, Deserialize)]
pub struct CustomerInput {
    pub name: String,
    pub email: String,
    pub phone: String,
    #[serde(rename = "taxId", alias = "tax_id", default)]
    pub tax_id: Option<String>,
}

/// The shipping option the customer picked, plus the destination address.
#[derive(Debug, Clone, Deserialize, Default)]
pub struct ShippingSelectionInput {
    #[serde(default)]
    pub cep: Option<String>,
    #[serde(default)]
    pub address: Option<String>,
    #[serde(default)]
    pub city: Option<String>,
    #[serde(default)]
    pub state: Option<String>,
    #[serde(rename = "priceCents", alias = "price_cents", default)]
    pub price_cents: Option<i64>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct CheckoutRequest {
    pub items: Vec<CartItemInput>,
    pub customer: CustomerInput,
    #[serde(default)]
    pub shipping: ShippingSelectionInput,
}

/// Payload returned by a successful checkout: where to send the buyer and
/// how to correlate the eventual webhook.
#[derive(Debug, Clone, Serialize)]
pub struct CheckoutConfirmation {
    pub external_reference: String,
    pub init_point: String,
    pub preference_id: String,
    pub subtotal: f64,
    pub shipping_cost: f64,
    pub total: f64,
    pub total_formatted: String,
}

/// Result of a single-URL supplier probe.
#[derive(Debug, Clone, Serialize)]
pub struct ProbeResult {
    pub url: String,
    pub price: Option<f64>,
    #[serde(rename = "inStock")]
    pub in_stock: bool,
    pub quantity: Option<u32>,
    #[serde(rename = "checkedAt")]
    pub checked_at: DateTime<Utc>,
}

/// One entry of a batch probe; failures are reported per URL, never for
/// the batch as a whole.
#[derive(Debug, Clone, Serialize)]
#[serde(untagged)]
pub enum ProbeOutcome {
    Ok {
        success: bool,
        #[serde(flatten)]
        result: ProbeResult,
    },
    Failed {
        success: bool,
        url: String,
        error: String,
    },
}

impl ProbeOutcome {
    pub fn ok(result: ProbeResult) -> Self {
        Self::Ok { success: true, result }
    }

    pub fn failed(url: &str, error: String) -> Self {
        Self::Failed { success: false, url: url.to_string(), error }
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct OrderItemView {
    pub product_id: String,
    pub sku: Option<String>,
    pub name: String,
    pub image: Option<String>,
    pub unit_price: f64,
    pub quantity: i64,
    pub total: f64,
}

/// Order status payload for `GET /order/{reference}`.
#[derive(Debug, Clone, Serialize)]
pub struct OrderView {
    pub external_reference: String,
    pub status: String,
    pub customer_name: String,
    pub customer_email: String,
    pub subtotal: f64,
    pub shipping_cost: f64,
    pub discount: f64,
    pub total: f64,
    pub total_formatted: String,
    pub paid_at: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
    pub items: Vec<OrderItemView>,
}

impl OrderView {
    pub fn from_order(order: Order, items: Vec<OrderItem>) -> Self {
        Self {
            external_reference: order.external_reference,
            status: order.status.as_str().to_string(),
            customer_name: order.customer_name,
            customer_email: order.customer_email,
            subtotal: cents_to_reais(order.subtotal_cents),
            shipping_cost: cents_to_reais(order.shipping_cents),
            discount: cents_to_reais(order.discount_cents),
            total: cents_to_reais(order.total_cents),
            total_formatted: format_brl(order.total_cents),
            paid_at: order.paid_at,
            created_at: order.created_at,
            items: items
                .into_iter()
                .map(|item| OrderItemView {
                    product_id: item.product_id,
                    sku: item.sku,
                    name: item.name,
                    image: item.image,
                    unit_price: cents_to_reais(item.unit_price_cents),
                    quantity: item.quantity,
                    total: cents_to_reais(item.total_cents),
                })
                .collect(),
        }
    }
}
