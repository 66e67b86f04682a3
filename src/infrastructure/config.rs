//! Application configuration
//!
//! All process-wide constant tables live here (supplier allow-lists,
//! free-zone prefixes, fallback rate tables, processor credentials) and are
//! injected into the services at startup instead of being read as ambient
//! globals. Values come from defaults, an optional `storefront.toml` and
//! `STOREFRONT__*` environment overrides, in that order.

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};

use crate::domain::shipping::ShippingOption;

/// Complete application configuration.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    pub server: ServerConfig,
    pub database: DatabaseConfig,
    pub http: HttpConfig,
    pub store: StoreConfig,
    pub suppliers: SuppliersConfig,
    pub shipping: ShippingConfig,
    pub payment: PaymentConfig,
}

/// Public identity of the storefront, used by the product feeds.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct StoreConfig {
    pub name: String,
    pub base_url: String,
}

impl Default for StoreConfig {
    fn default() -> Self {
        Self {
            name: "Blumenau Automação".to_string(),
            base_url: "https://www.blumenauautomacao.com.br".to_string(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self { host: "0.0.0.0".to_string(), port: 8080 }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct DatabaseConfig {
    pub url: String,
}

impl Default for DatabaseConfig {
    fn default() -> Self {
        Self { url: "sqlite:data/storefront.db".to_string() }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct HttpConfig {
    pub user_agent: String,
}

impl Default for HttpConfig {
    fn default() -> Self {
        Self {
            // Supplier pages render differently for unknown clients, so the
            // probe announces a desktop browser.
            user_agent: "Mozilla/5.0 (Windows NT 10.0; Win64; x64) AppleWebKit/537.36 \
                         (KHTML, like Gecko) Chrome/120.0.0.0 Safari/537.36"
                .to_string(),
        }
    }
}

/// Per-endpoint supplier domain allow-lists and batch limits.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct SuppliersConfig {
    pub probe_domains: Vec<String>,
    pub lojavale_domains: Vec<String>,
    pub max_batch_size: usize,
    pub batch_concurrency: usize,
}

impl Default for SuppliersConfig {
    fn default() -> Self {
        Self {
            probe_domains: vec!["proesi.com.br".to_string()],
            lojavale_domains: vec!["lojavale.com.br".to_string()],
            max_batch_size: 10,
            batch_concurrency: 10,
        }
    }
}

impl SuppliersConfig {
    /// Whether `url` belongs to one of the allowed hosts. Subdomains of an
    /// allowed host are accepted.
    pub fn is_allowed(url: &str, domains: &[String]) -> bool {
        let Ok(parsed) = url::Url::parse(url) else {
            return false;
        };
        let Some(host) = parsed.host_str() else {
            return false;
        };
        domains
            .iter()
            .any(|d| host == d || host.ends_with(&format!(".{d}")))
    }
}

/// A fixed-price fallback shipping rate.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FallbackRate {
    pub name: String,
    pub carrier: String,
    pub price_cents: i64,
    pub delivery_days: u32,
}

impl FallbackRate {
    pub fn to_option(&self) -> ShippingOption {
        ShippingOption {
            name: self.name.clone(),
            carrier: self.carrier.clone(),
            price_cents: self.price_cents,
            delivery_days: self.delivery_days,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ShippingConfig {
    /// CEP prefixes eligible for zero-cost local delivery.
    pub free_zone_prefixes: Vec<String>,
    pub free_zone_delivery_days: u32,
    /// CEP prefixes considered same-state for the fallback rate table.
    pub same_state_prefixes: Vec<String>,
    pub fallback_same_state: Vec<FallbackRate>,
    pub fallback_other: Vec<FallbackRate>,
    /// Remote carrier quoting endpoint. The fixed-rate table covers every
    /// quote when unset.
    pub carrier_api_url: Option<String>,
}

impl Default for ShippingConfig {
    fn default() -> Self {
        Self {
            free_zone_prefixes: vec!["890".to_string(), "891".to_string()],
            free_zone_delivery_days: 2,
            same_state_prefixes: vec!["88".to_string(), "89".to_string()],
            fallback_same_state: vec![
                FallbackRate {
                    name: "PAC".to_string(),
                    carrier: "Correios".to_string(),
                    price_cents: 2590,
                    delivery_days: 7,
                },
                FallbackRate {
                    name: "SEDEX".to_string(),
                    carrier: "Correios".to_string(),
                    price_cents: 4590,
                    delivery_days: 3,
                },
            ],
            fallback_other: vec![
                FallbackRate {
                    name: "PAC".to_string(),
                    carrier: "Correios".to_string(),
                    price_cents: 3990,
                    delivery_days: 12,
                },
                FallbackRate {
                    name: "SEDEX".to_string(),
                    carrier: "Correios".to_string(),
                    price_cents: 6990,
                    delivery_days: 5,
                },
            ],
            carrier_api_url: None,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct PaymentConfig {
    pub base_url: String,
    /// Processor API credential. Absent until configured; checkout fails
    /// with a configuration error without it.
    pub access_token: Option<String>,
    /// Public URL the processor posts payment notifications to.
    pub notification_url: Option<String>,
    /// Shared secret for webhook signature verification. Verification is
    /// skipped when unset.
    pub webhook_secret: Option<String>,
}

impl Default for PaymentConfig {
    fn default() -> Self {
        Self {
            base_url: "https://api.mercadopago.com".to_string(),
            access_token: None,
            notification_url: None,
            webhook_secret: None,
        }
    }
}

impl AppConfig {
    /// Load configuration from defaults, optional file and environment.
    pub fn load() -> Result<Self> {
        let settings = config::Config::builder()
            .add_source(config::File::with_name("storefront").required(false))
            .add_source(config::Environment::with_prefix("STOREFRONT").separator("__"))
            .build()
            .context("Failed to assemble configuration sources")?;

        settings
            .try_deserialize()
            .context("Failed to deserialize configuration")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_config_is_complete() {
        let config = AppConfig::default();
        assert_eq!(config.suppliers.max_batch_size, 10);
        assert!(!config.shipping.free_zone_prefixes.is_empty());
        assert!(config.payment.access_token.is_none());
    }

    #[test]
    fn domain_allow_list_accepts_subdomains_only() {
        let domains = vec!["proesi.com.br".to_string()];
        assert!(SuppliersConfig::is_allowed("https://proesi.com.br/produto/x", &domains));
        assert!(SuppliersConfig::is_allowed("https://www.proesi.com.br/p", &domains));
        assert!(!SuppliersConfig::is_allowed("https://notproesi.com.br/p", &domains));
        assert!(!SuppliersConfig::is_allowed("https://evil.com/proesi.com.br", &domains));
        assert!(!SuppliersConfig::is_allowed("not a url", &domains));
    }
}
