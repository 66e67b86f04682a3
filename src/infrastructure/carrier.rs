//! Remote carrier quoting client
//!
//! Fetches live shipping rates from the configured quoting endpoint. Any
//! failure here is non-fatal by design: the estimator logs it and falls
//! back to the fixed-rate table.

use anyhow::{Context, Result};
use async_trait::async_trait;
use serde::Deserialize;

use crate::domain::repositories::CarrierQuotes;
use crate::domain::shipping::ShippingOption;
use crate::domain::value_objects::reais_to_cents;

pub struct HttpCarrierClient {
    http: reqwest::Client,
    quote_url: Option<String>,
}

#[derive(Debug, Deserialize)]
struct CarrierRate {
    name: String,
    #[serde(default)]
    carrier: Option<String>,
    price: f64,
    #[serde(rename = "deliveryDays", alias = "delivery_days")]
    delivery_days: u32,
}

impl HttpCarrierClient {
    pub fn new(quote_url: Option<String>) -> Self {
        Self { http: reqwest::Client::new(), quote_url }
    }
}

#[async_trait]
impl CarrierQuotes for HttpCarrierClient {
    async fn quote(&self, product_id: &str, cep: &str) -> Result<Vec<ShippingOption>> {
        let Some(quote_url) = self.quote_url.as_deref() else {
            anyhow::bail!("carrier quote endpoint not configured");
        };

        let response = self
            .http
            .get(quote_url)
            .query(&[("product", product_id), ("cep", cep)])
            .send()
            .await
            .context("Failed to reach carrier quote service")?;

        if !response.status().is_success() {
            anyhow::bail!("carrier quote failed with status {}", response.status());
        }

        let rates: Vec<CarrierRate> =
            response.json().await.context("Failed to decode carrier rates")?;

        Ok(rates
            .into_iter()
            .filter(|rate| rate.price >= 0.0)
            .map(|rate| ShippingOption {
                carrier: rate.carrier.unwrap_or_else(|| rate.name.clone()),
                name: rate.name,
                price_cents: reais_to_cents(rate.price),
                delivery_days: rate.delivery_days,
            })
            .collect())
    }
}
