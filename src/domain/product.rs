//! Catalog products and the best-effort facts extracted from supplier pages

use std::collections::BTreeMap;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Catalog product, sourced from the supplier import and served read-only.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Product {
    pub id: String,
    pub sku: Option<String>,
    pub name: String,
    pub slug: String,
    pub brand: Option<String>,
    /// Unit price in centavos. Never negative.
    #[serde(rename = "priceCents")]
    pub price_cents: i64,
    /// Tracked stock quantity, when the supplier exposes one.
    pub stock: Option<i64>,
    #[serde(rename = "inStock")]
    pub in_stock: bool,
    pub category: Option<String>,
    #[serde(rename = "categoryPath")]
    pub category_path: Vec<String>,
    #[serde(rename = "weightKg")]
    pub weight_kg: Option<f64>,
    /// Length, width, height in centimeters.
    #[serde(rename = "dimensionsCm")]
    pub dimensions_cm: Option<(f64, f64, f64)>,
    pub description: Option<String>,
    pub image: Option<String>,
    pub images: Vec<String>,
    pub datasheet: Option<String>,
    #[serde(rename = "sourceUrl")]
    pub source_url: String,
    #[serde(rename = "createdAt")]
    pub created_at: DateTime<Utc>,
    #[serde(rename = "updatedAt")]
    pub updated_at: DateTime<Utc>,
}

impl Product {
    /// Price in reais, for display payloads.
    pub fn price_reais(&self) -> f64 {
        self.price_cents as f64 / 100.0
    }
}

/// Stock availability as read off a supplier page.
///
/// Absence of a negative signal is treated as availability, so the default
/// is in stock with unknown quantity.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StockInfo {
    #[serde(rename = "inStock")]
    pub in_stock: bool,
    pub quantity: Option<u32>,
}

impl Default for StockInfo {
    fn default() -> Self {
        Self { in_stock: true, quantity: None }
    }
}

impl StockInfo {
    pub fn unavailable() -> Self {
        Self { in_stock: false, quantity: Some(0) }
    }

    pub fn available(quantity: Option<u32>) -> Self {
        Self { in_stock: true, quantity }
    }
}

/// Embedded product video reference, normalized to a canonical embed URL.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct VideoEmbed {
    pub url: String,
    pub platform: VideoPlatform,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum VideoPlatform {
    Youtube,
    Vimeo,
}

/// Everything the extractor could read off a single product page.
///
/// Extraction is best-effort against unknown markup: every field is
/// optional/empty-able and absence is not an error.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ExtractedProductInfo {
    pub price: Option<f64>,
    pub stock: StockInfo,
    pub description: Option<String>,
    /// Spec-name to spec-value pairs; later duplicate keys overwrite earlier ones.
    pub specs: BTreeMap<String, String>,
    /// Standalone lines from single-cell rows in line-list layouts.
    #[serde(rename = "specLines")]
    pub spec_lines: Vec<String>,
    /// Raw text of every table-like fragment, in document order.
    pub tables: Vec<String>,
    pub warranty: Option<String>,
    #[serde(rename = "boxContents")]
    pub box_contents: Option<String>,
    pub datasheet: Option<String>,
    pub image: Option<String>,
    pub videos: Vec<VideoEmbed>,
}

impl ExtractedProductInfo {
    /// True when the page yielded at least one usable content field.
    ///
    /// Lets callers distinguish "page had no usable data" from "fetch failed".
    pub fn has_content(&self) -> bool {
        self.description.is_some()
            || !self.specs.is_empty()
            || !self.spec_lines.is_empty()
            || !self.videos.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_stock_is_available_with_unknown_quantity() {
        let stock = StockInfo::default();
        assert!(stock.in_stock);
        assert_eq!(stock.quantity, None);
    }

    #[test]
    fn empty_extraction_has_no_content() {
        let info = ExtractedProductInfo::default();
        assert!(!info.has_content());
    }

    #[test]
    fn specs_alone_count_as_content() {
        let mut info = ExtractedProductInfo::default();
        info.specs.insert("Tensão".to_string(), "220V".to_string());
        assert!(info.has_content());
    }
}
