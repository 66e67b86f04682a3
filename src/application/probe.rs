//! Supplier page probing
//!
//! Single and batch price/stock probes against allowed supplier domains,
//! plus the full structured extraction used by the description endpoints.
//! Batch probes fan out a bounded number of concurrent fetches and join all
//! of them; one slow or failing fetch never cancels its siblings.

use std::sync::Arc;

use chrono::Utc;
use futures::stream::{self, StreamExt};
use tracing::warn;

use crate::application::dto::{ProbeOutcome, ProbeResult};
use crate::domain::product::ExtractedProductInfo;
use crate::domain::repositories::ProductRepository;
use crate::domain::value_objects::reais_to_cents;
use crate::error::{ServiceError, ServiceResult};
use crate::extraction;
use crate::infrastructure::config::SuppliersConfig;
use crate::infrastructure::http_client::HttpClient;

pub struct ProbeService {
    http: Arc<HttpClient>,
    products: Arc<dyn ProductRepository>,
    suppliers: SuppliersConfig,
}

impl ProbeService {
    pub fn new(
        http: Arc<HttpClient>,
        products: Arc<dyn ProductRepository>,
        suppliers: SuppliersConfig,
    ) -> Self {
        Self { http, products, suppliers }
    }

    pub fn max_batch_size(&self) -> usize {
        self.suppliers.max_batch_size
    }

    fn require_allowed(&self, url: &str, domains: &[String]) -> ServiceResult<()> {
        if SuppliersConfig::is_allowed(url, domains) {
            Ok(())
        } else {
            Err(ServiceError::validation(format!("URL não permitida: {url}")))
        }
    }

    /// Probe one supplier URL for price and stock. When the URL maps to a
    /// known catalog row its live price/stock snapshot is refreshed,
    /// best-effort.
    pub async fn check_url(&self, url: &str) -> ServiceResult<ProbeResult> {
        self.require_allowed(url, &self.suppliers.probe_domains)?;

        let html = self.http.get_text(url).await.map_err(|cause| {
            warn!(%url, %cause, "supplier fetch failed");
            ServiceError::upstream("supplier fetch")
        })?;
        let info = extraction::extract(&html);

        match self.products.find_by_source_url(url).await {
            Ok(Some(product)) => {
                let refresh = self
                    .products
                    .update_probe_snapshot(
                        &product.id,
                        info.price.map(reais_to_cents),
                        info.stock.in_stock,
                        info.stock.quantity.map(i64::from),
                    )
                    .await;
                if let Err(cause) = refresh {
                    warn!(product_id = %product.id, %cause, "probe snapshot refresh failed");
                }
            }
            Ok(None) => {}
            Err(cause) => warn!(%url, %cause, "catalog lookup for probe failed"),
        }

        Ok(ProbeResult {
            url: url.to_string(),
            price: info.price,
            in_stock: info.stock.in_stock,
            quantity: info.stock.quantity,
            checked_at: Utc::now(),
        })
    }

    /// Probe up to `max_batch_size` URLs concurrently, reporting each one
    /// independently as success or failure.
    pub async fn check_batch(&self, urls: &[String]) -> ServiceResult<Vec<ProbeOutcome>> {
        if urls.is_empty() {
            return Err(ServiceError::validation("informe ao menos uma URL"));
        }
        if urls.len() > self.suppliers.max_batch_size {
            return Err(ServiceError::validation(format!(
                "máximo de {} URLs por chamada",
                self.suppliers.max_batch_size
            )));
        }

        let outcomes = stream::iter(urls.iter().cloned())
            .map(|url| async move {
                match self.check_url(&url).await {
                    Ok(result) => ProbeOutcome::ok(result),
                    Err(error) => ProbeOutcome::failed(&url, error.to_string()),
                }
            })
            .buffered(self.suppliers.batch_concurrency)
            .collect::<Vec<_>>()
            .await;

        Ok(outcomes)
    }

    /// Full structured extraction for the description endpoints. The domain
    /// allow-list differs per endpoint, so the caller picks it.
    pub async fn describe(
        &self,
        url: &str,
        domains: &[String],
    ) -> ServiceResult<ExtractedProductInfo> {
        self.require_allowed(url, domains)?;
        let html = self.http.get_text(url).await.map_err(|cause| {
            warn!(%url, %cause, "supplier fetch failed");
            ServiceError::upstream("supplier fetch")
        })?;
        Ok(extraction::extract(&html))
    }

    pub fn probe_domains(&self) -> &[String] {
        &self.suppliers.probe_domains
    }

    pub fn lojavale_domains(&self) -> &[String] {
        &self.suppliers.lojavale_domains
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn disallowed_domain_is_a_validation_error() {
        let suppliers = SuppliersConfig::default();
        assert!(!SuppliersConfig::is_allowed(
            "https://outra-loja.com.br/produto",
            &suppliers.probe_domains
        ));
    }
}
