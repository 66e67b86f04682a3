//! Catalog listing and the export feeds
//!
//! The same product rows are rendered three ways: JSON for the storefront,
//! an RSS/Google-Shopping XML feed for Merchant Center and a downloadable
//! CSV with a fixed column order.

use std::sync::Arc;

use crate::domain::product::Product;
use crate::domain::repositories::{CatalogFilter, ProductRepository};
use crate::error::{ServiceError, ServiceResult};
use crate::infrastructure::config::StoreConfig;

/// Merchant Center rejects overlong fields.
const MAX_FEED_TITLE: usize = 150;
const MAX_FEED_DESCRIPTION: usize = 5000;

pub struct CatalogService {
    products: Arc<dyn ProductRepository>,
    store: StoreConfig,
}

impl CatalogService {
    pub fn new(products: Arc<dyn ProductRepository>, store: StoreConfig) -> Self {
        Self { products, store }
    }

    pub async fn list(&self, filter: &CatalogFilter) -> ServiceResult<Vec<Product>> {
        Ok(self.products.find_all(filter).await?)
    }

    pub async fn get(&self, id: &str) -> ServiceResult<Product> {
        self.products
            .find_by_id(id)
            .await?
            .ok_or_else(|| ServiceError::not_found(format!("product {id}")))
    }

    pub async fn google_feed(&self, filter: &CatalogFilter) -> ServiceResult<String> {
        let products = self.products.find_all(filter).await?;
        Ok(render_google_feed(&products, &self.store))
    }

    pub async fn csv_export(&self, filter: &CatalogFilter) -> ServiceResult<String> {
        let products = self.products.find_all(filter).await?;
        Ok(render_csv(&products, &self.store))
    }
}

/// Flatten whitespace for feed fields: tabs/newlines become spaces, doubled
/// spaces collapse, and overlong values are cut with an ellipsis.
pub fn clean_feed_text(text: &str, max_length: usize) -> String {
    let mut cleaned = text
        .replace(['\t', '\n', '\r'], " ")
        .split_whitespace()
        .collect::<Vec<_>>()
        .join(" ");
    if cleaned.chars().count() > max_length {
        cleaned = cleaned.chars().take(max_length.saturating_sub(3)).collect();
        cleaned.push_str("...");
    }
    cleaned
}

fn xml_escape(text: &str) -> String {
    text.replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
        .replace('"', "&quot;")
}

fn product_link(store: &StoreConfig, slug: &str) -> String {
    format!("{}/produto.html?slug={slug}", store.base_url.trim_end_matches('/'))
}

fn feed_brand(brand: Option<&str>) -> String {
    match brand {
        Some(b)
            if !b.trim().is_empty()
                && !matches!(b.trim().to_lowercase().as_str(), "importado" | "genérico" | "generico") =>
        {
            clean_feed_text(b, 70)
        }
        _ => "Importado".to_string(),
    }
}

/// RSS 2.0 feed in the Google Shopping namespace. Products without a
/// price, image or slug are skipped; out-of-stock products are included
/// and flagged `out_of_stock`.
pub fn render_google_feed(products: &[Product], store: &StoreConfig) -> String {
    let mut feed = String::from(concat!(
        "<?xml version=\"1.0\" encoding=\"UTF-8\"?>\n",
        "<rss version=\"2.0\" xmlns:g=\"http://base.google.com/ns/1.0\">\n",
        "<channel>\n",
    ));
    feed.push_str(&format!("<title>{}</title>\n", xml_escape(&store.name)));
    feed.push_str(&format!("<link>{}</link>\n", xml_escape(&store.base_url)));
    feed.push_str(&format!(
        "<description>{} - catálogo de produtos</description>\n",
        xml_escape(&store.name)
    ));

    for product in products {
        let Some(image) = product.image.as_deref() else { continue };
        if product.price_cents <= 0 || product.slug.is_empty() {
            continue;
        }

        let title = clean_feed_text(&product.name, MAX_FEED_TITLE);
        let description = match product.description.as_deref() {
            Some(d) if !d.trim().is_empty() => clean_feed_text(d, MAX_FEED_DESCRIPTION),
            _ => title.clone(),
        };
        let availability = if product.in_stock { "in_stock" } else { "out_of_stock" };
        let product_type = product.category_path.join(" > ");

        feed.push_str("<item>\n");
        feed.push_str(&format!("<g:id>{}</g:id>\n", xml_escape(&product.id)));
        feed.push_str(&format!("<title>{}</title>\n", xml_escape(&title)));
        feed.push_str(&format!("<description>{}</description>\n", xml_escape(&description)));
        feed.push_str(&format!(
            "<link>{}</link>\n",
            xml_escape(&product_link(store, &product.slug))
        ));
        feed.push_str(&format!("<g:image_link>{}</g:image_link>\n", xml_escape(image)));
        feed.push_str(&format!("<g:availability>{availability}</g:availability>\n"));
        feed.push_str(&format!(
            "<g:price>{:.2} BRL</g:price>\n",
            product.price_cents as f64 / 100.0
        ));
        feed.push_str(&format!("<g:brand>{}</g:brand>\n", xml_escape(&feed_brand(product.brand.as_deref()))));
        feed.push_str("<g:condition>new</g:condition>\n");
        feed.push_str("<g:identifier_exists>false</g:identifier_exists>\n");
        if !product_type.is_empty() {
            feed.push_str(&format!("<g:product_type>{}</g:product_type>\n", xml_escape(&product_type)));
        }
        feed.push_str("</item>\n");
    }

    feed.push_str("</channel>\n</rss>\n");
    feed
}

fn csv_escape(field: &str) -> String {
    if field.contains([',', '"', '\n', '\r']) {
        format!("\"{}\"", field.replace('"', "\"\""))
    } else {
        field.to_string()
    }
}

/// Fixed column order: id, sku, name, price, in_stock, stock, category,
/// brand, image, link.
pub fn render_csv(products: &[Product], store: &StoreConfig) -> String {
    let mut csv = String::from("id,sku,name,price,in_stock,stock,category,brand,image,link\n");
    for product in products {
        let row = [
            product.id.clone(),
            product.sku.clone().unwrap_or_default(),
            clean_feed_text(&product.name, MAX_FEED_TITLE),
            format!("{:.2}", product.price_cents as f64 / 100.0),
            product.in_stock.to_string(),
            product.stock.map(|s| s.to_string()).unwrap_or_default(),
            product.category.clone().unwrap_or_default(),
            product.brand.clone().unwrap_or_default(),
            product.image.clone().unwrap_or_default(),
            product_link(store, &product.slug),
        ];
        let escaped: Vec<String> = row.iter().map(|field| csv_escape(field)).collect();
        csv.push_str(&escaped.join(","));
        csv.push('\n');
    }
    csv
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;

    fn product(id: &str, price_cents: i64, in_stock: bool) -> Product {
        let now = Utc::now();
        Product {
            id: id.to_string(),
            sku: Some(format!("SKU-{id}")),
            name: format!("Produto, \"{id}\""),
            slug: format!("produto-{id}"),
            brand: Some("Weg".to_string()),
            price_cents,
            stock: Some(4),
            in_stock,
            category: Some("reles".to_string()),
            category_path: vec!["Automação".to_string(), "Relés".to_string()],
            weight_kg: None,
            dimensions_cm: None,
            description: Some("Linha 1\nLinha\t2".to_string()),
            image: Some(format!("https://cdn.example.com/{id}.jpg")),
            images: Vec::new(),
            datasheet: None,
            source_url: format!("https://www.proesi.com.br/{id}"),
            created_at: now,
            updated_at: now,
        }
    }

    #[test]
    fn feed_contains_google_namespace_fields() {
        let store = StoreConfig::default();
        let feed = render_google_feed(&[product("p1", 12_990, true)], &store);
        assert!(feed.contains("xmlns:g=\"http://base.google.com/ns/1.0\""));
        assert!(feed.contains("<g:price>129.90 BRL</g:price>"));
        assert!(feed.contains("<g:availability>in_stock</g:availability>"));
        assert!(feed.contains("<g:product_type>Automação &gt; Relés</g:product_type>"));
        assert!(feed.contains("produto.html?slug=produto-p1"));
    }

    #[test]
    fn feed_skips_products_without_price_or_image() {
        let store = StoreConfig::default();
        let mut no_image = product("p2", 5000, true);
        no_image.image = None;
        let feed = render_google_feed(&[product("p1", 0, true), no_image], &store);
        assert!(!feed.contains("<item>"));
    }

    #[test]
    fn feed_marks_out_of_stock_products() {
        let store = StoreConfig::default();
        let feed = render_google_feed(&[product("p1", 5000, false)], &store);
        assert!(feed.contains("<g:availability>out_of_stock</g:availability>"));
    }

    #[test]
    fn generic_brands_fall_back_to_importado() {
        assert_eq!(feed_brand(Some("importado")), "Importado");
        assert_eq!(feed_brand(Some("")), "Importado");
        assert_eq!(feed_brand(None), "Importado");
        assert_eq!(feed_brand(Some("Weg")), "Weg");
    }

    #[test]
    fn clean_feed_text_flattens_whitespace_and_truncates() {
        assert_eq!(clean_feed_text("a\tb\nc   d", 100), "a b c d");
        let long = "x".repeat(200);
        let cleaned = clean_feed_text(&long, 150);
        assert_eq!(cleaned.chars().count(), 150);
        assert!(cleaned.ends_with("..."));
    }

    #[test]
    fn csv_has_header_and_quotes_embedded_commas() {
        let store = StoreConfig::default();
        let csv = render_csv(&[product("p1", 12_990, true)], &store);
        let mut lines = csv.lines();
        assert_eq!(
            lines.next().unwrap(),
            "id,sku,name,price,in_stock,stock,category,brand,image,link"
        );
        let row = lines.next().unwrap();
        assert!(row.starts_with("p1,SKU-p1,"));
        assert!(row.contains("\"Produto, \"\"p1\"\"\""));
        assert!(row.contains("129.90"));
    }
}
