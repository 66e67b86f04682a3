//! Customer records, keyed by e-mail

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// A storefront customer. Upserted by e-mail (case-insensitive) on every
/// checkout attempt; never deleted by this subsystem.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Customer {
    pub email: String,
    pub name: String,
    pub phone: String,
    /// CPF or CNPJ, digits only, when the customer supplied one.
    pub tax_id: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}
