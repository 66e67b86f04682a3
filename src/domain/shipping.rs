//! Shipping quote value objects

use serde::{Deserialize, Serialize};

/// One deliverable shipping choice offered to the customer.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ShippingOption {
    pub name: String,
    pub carrier: String,
    #[serde(rename = "priceCents")]
    pub price_cents: i64,
    #[serde(rename = "deliveryDays")]
    pub delivery_days: u32,
}

/// The full answer to a shipping estimate: free-zone membership plus the
/// merged option list, sorted ascending by price.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ShippingQuote {
    #[serde(rename = "isFreeZone")]
    pub is_free_zone: bool,
    pub options: Vec<ShippingOption>,
}
