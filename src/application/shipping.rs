//! Shipping cost estimation
//!
//! Combines a static free-zone rule with remote carrier rates and a
//! fixed-price fallback table. Carrier failures are non-fatal: the tier is
//! skipped and the fallback covers the quote.

use std::sync::Arc;

use tracing::warn;

use crate::application::dto::CartItemInput;
use crate::domain::repositories::CarrierQuotes;
use crate::domain::shipping::{ShippingOption, ShippingQuote};
use crate::error::{ServiceError, ServiceResult};
use crate::infrastructure::config::{FallbackRate, ShippingConfig};

/// Normalize and validate a postal code: exactly 8 digits after stripping
/// everything else.
pub fn normalize_cep(raw: &str) -> Option<String> {
    let digits: String = raw.chars().filter(char::is_ascii_digit).collect();
    (digits.len() == 8).then_some(digits)
}

pub struct ShippingEstimator {
    config: ShippingConfig,
    carrier: Arc<dyn CarrierQuotes>,
}

impl ShippingEstimator {
    pub fn new(config: ShippingConfig, carrier: Arc<dyn CarrierQuotes>) -> Self {
        Self { config, carrier }
    }

    pub fn is_free_zone(&self, cep_digits: &str) -> bool {
        self.config
            .free_zone_prefixes
            .iter()
            .any(|prefix| cep_digits.starts_with(prefix.as_str()))
    }

    fn fallback_options(&self, cep_digits: &str) -> Vec<ShippingOption> {
        let same_state = self
            .config
            .same_state_prefixes
            .iter()
            .any(|prefix| cep_digits.starts_with(prefix.as_str()));
        let rates = if same_state {
            &self.config.fallback_same_state
        } else {
            &self.config.fallback_other
        };
        rates.iter().map(FallbackRate::to_option).collect()
    }

    /// Rank shipping options for a destination and cart.
    pub async fn estimate(
        &self,
        raw_cep: &str,
        items: &[CartItemInput],
    ) -> ServiceResult<ShippingQuote> {
        let cep = normalize_cep(raw_cep)
            .ok_or_else(|| ServiceError::validation("CEP inválido: informe 8 dígitos"))?;

        let is_free_zone = self.is_free_zone(&cep);
        let mut options = Vec::new();

        if is_free_zone {
            options.push(ShippingOption {
                name: "Entrega local".to_string(),
                carrier: "Própria".to_string(),
                price_cents: 0,
                delivery_days: self.config.free_zone_delivery_days,
            });
        }

        // Carrier rates are quoted for the first item; failure degrades to
        // the fallback table.
        let mut remote = match items.first() {
            Some(item) => match self.carrier.quote(&item.id, &cep).await {
                Ok(rates) => rates,
                Err(error) => {
                    warn!(cep = %cep, %error, "carrier quote failed, using fallback rates");
                    Vec::new()
                }
            },
            None => Vec::new(),
        };

        if remote.is_empty() {
            remote = self.fallback_options(&cep);
        }
        options.extend(remote);

        // Stable sort keeps ingestion order for price ties.
        options.sort_by_key(|option| option.price_cents);

        Ok(ShippingQuote { is_free_zone, options })
    }
}
