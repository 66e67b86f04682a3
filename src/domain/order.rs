//! Orders, order items and the payment status state machine

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Payment status of an order.
///
/// Orders are created `Pending` and only the webhook reconciliation path
/// moves them afterwards. `Approved` may still move to `Refunded`; the
/// remaining states are terminal for this subsystem.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum OrderStatus {
    Pending,
    Approved,
    InProcess,
    Rejected,
    Cancelled,
    Refunded,
}

impl OrderStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Pending => "pending",
            Self::Approved => "approved",
            Self::InProcess => "in_process",
            Self::Rejected => "rejected",
            Self::Cancelled => "cancelled",
            Self::Refunded => "refunded",
        }
    }

    pub fn parse(value: &str) -> Option<Self> {
        match value {
            "pending" => Some(Self::Pending),
            "approved" => Some(Self::Approved),
            "in_process" => Some(Self::InProcess),
            "rejected" => Some(Self::Rejected),
            "cancelled" => Some(Self::Cancelled),
            "refunded" => Some(Self::Refunded),
            _ => None,
        }
    }

    /// Whether the state machine admits moving from `self` to `next`.
    pub fn can_transition_to(&self, next: OrderStatus) -> bool {
        if *self == next {
            return true;
        }
        match self {
            Self::Pending => true,
            Self::Approved => next == Self::Refunded,
            _ => false,
        }
    }
}

/// An order with customer and shipping snapshots taken at checkout time.
///
/// Invariant: `total_cents = subtotal_cents + shipping_cents - discount_cents`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Order {
    /// Globally unique opaque token minted at checkout; correlates the
    /// order with the processor-side payment session.
    pub external_reference: String,
    pub customer_email: String,
    pub customer_name: String,
    pub customer_phone: String,
    pub customer_tax_id: Option<String>,
    pub shipping_address: Option<String>,
    pub shipping_city: Option<String>,
    pub shipping_state: Option<String>,
    pub shipping_cep: Option<String>,
    pub subtotal_cents: i64,
    pub shipping_cents: i64,
    pub discount_cents: i64,
    pub total_cents: i64,
    pub status: OrderStatus,
    /// Processor checkout-session identifier.
    pub preference_id: Option<String>,
    /// Processor payment identifier, known only after the first notification.
    pub payment_id: Option<String>,
    pub status_detail: Option<String>,
    pub payment_method: Option<String>,
    pub paid_at: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// A purchased line, snapshotted from the catalog at purchase time so
/// historical orders survive later catalog changes.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OrderItem {
    pub order_reference: String,
    pub product_id: String,
    pub sku: Option<String>,
    pub name: String,
    pub image: Option<String>,
    pub unit_price_cents: i64,
    /// Always >= 1.
    pub quantity: i64,
    /// `unit_price_cents * quantity`.
    pub total_cents: i64,
}
