//! Catalog listing endpoint with JSON, Google-feed and CSV renderings

use axum::extract::{Query, State};
use axum::http::header;
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde::{Deserialize, Serialize};
use serde_json::json;

use crate::api::error::ApiError;
use crate::api::AppState;
use crate::domain::product::Product;
use crate::domain::repositories::CatalogFilter;
use crate::domain::value_objects::{cents_to_reais, format_brl};

#[derive(Debug, Deserialize)]
pub struct ProductsParams {
    pub id: Option<String>,
    pub category: Option<String>,
    #[serde(rename = "inStock")]
    pub in_stock: Option<bool>,
    pub format: Option<String>,
}

/// Storefront-facing product payload, prices in reais.
#[derive(Debug, Serialize)]
pub struct ProductView {
    pub id: String,
    pub sku: Option<String>,
    pub name: String,
    pub slug: String,
    pub brand: Option<String>,
    pub price: f64,
    #[serde(rename = "priceFormatted")]
    pub price_formatted: String,
    pub stock: Option<i64>,
    #[serde(rename = "inStock")]
    pub in_stock: bool,
    pub category: Option<String>,
    #[serde(rename = "categoryPath")]
    pub category_path: Vec<String>,
    pub description: Option<String>,
    pub image: Option<String>,
    pub images: Vec<String>,
    pub datasheet: Option<String>,
    #[serde(rename = "sourceUrl")]
    pub source_url: String,
}

impl From<Product> for ProductView {
    fn from(product: Product) -> Self {
        Self {
            price: cents_to_reais(product.price_cents),
            price_formatted: format_brl(product.price_cents),
            id: product.id,
            sku: product.sku,
            name: product.name,
            slug: product.slug,
            brand: product.brand,
            stock: product.stock,
            in_stock: product.in_stock,
            category: product.category,
            category_path: product.category_path,
            description: product.description,
            image: product.image,
            images: product.images,
            datasheet: product.datasheet,
            source_url: product.source_url,
        }
    }
}

/// `GET /products?id=&category=&inStock=&format=json|google|csv`
pub async fn list_products(
    State(state): State<AppState>,
    Query(params): Query<ProductsParams>,
) -> Result<Response, ApiError> {
    if let Some(id) = params.id.as_deref() {
        let product = state.catalog.get(id).await?;
        return Ok(Json(ProductView::from(product)).into_response());
    }

    let filter = CatalogFilter {
        category: params.category.clone(),
        in_stock: params.in_stock,
    };

    match params.format.as_deref().unwrap_or("json") {
        "google" => {
            let feed = state.catalog.google_feed(&filter).await?;
            Ok((
                [(header::CONTENT_TYPE, "application/xml; charset=utf-8")],
                feed,
            )
                .into_response())
        }
        "csv" => {
            let csv = state.catalog.csv_export(&filter).await?;
            Ok((
                [
                    (header::CONTENT_TYPE, "text/csv; charset=utf-8"),
                    (
                        header::CONTENT_DISPOSITION,
                        "attachment; filename=\"products.csv\"",
                    ),
                ],
                csv,
            )
                .into_response())
        }
        _ => {
            let products = state.catalog.list(&filter).await?;
            let views: Vec<ProductView> = products.into_iter().map(ProductView::from).collect();
            Ok(Json(json!({ "total": views.len(), "products": views })).into_response())
        }
    }
}
