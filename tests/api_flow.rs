//! End-to-end API tests: checkout through webhook reconciliation
//!
//! Drives the real router against a temporary SQLite database, with the
//! payment processor and carrier replaced by in-memory stubs.

use std::sync::{Arc, Mutex};

use anyhow::Result;
use async_trait::async_trait;
use axum::body::Body;
use axum::http::{Request, StatusCode};
use axum::Router;
use chrono::Utc;
use serde_json::{json, Value};
use sqlx::{Row, SqlitePool};
use tower::ServiceExt;

use blu_storefront::api::{self, AppState};
use blu_storefront::application::{
    CatalogService, CheckoutService, ProbeService, ShippingEstimator, WebhookService,
};
use blu_storefront::domain::product::Product;
use blu_storefront::domain::repositories::{
    CarrierQuotes, CheckoutSession, CheckoutSessionRequest, PaymentDetails, PaymentGateway,
    ProductRepository,
};
use blu_storefront::domain::shipping::ShippingOption;
use blu_storefront::infrastructure::config::{
    HttpConfig, ShippingConfig, StoreConfig, SuppliersConfig,
};
use blu_storefront::infrastructure::order_repository::SqliteOrderRepository;
use blu_storefront::infrastructure::product_repository::SqliteProductRepository;
use blu_storefront::infrastructure::webhook_log_repository::SqliteWebhookLogRepository;
use blu_storefront::infrastructure::{DatabaseConnection, HttpClient};

/// Gateway stub: remembers the last created session and answers payment
/// fetches with a configurable status for that same external reference.
#[derive(Default)]
struct StubGateway {
    last_reference: Mutex<Option<String>>,
    payment_status: Mutex<String>,
    reference_override: Mutex<Option<String>>,
}

impl StubGateway {
    fn set_status(&self, status: &str) {
        *self.payment_status.lock().unwrap() = status.to_string();
    }

    fn override_reference(&self, reference: &str) {
        *self.reference_override.lock().unwrap() = Some(reference.to_string());
    }

    fn last_reference(&self) -> Option<String> {
        self.last_reference.lock().unwrap().clone()
    }
}

#[async_trait]
impl PaymentGateway for StubGateway {
    async fn create_checkout_session(
        &self,
        request: &CheckoutSessionRequest,
    ) -> Result<CheckoutSession> {
        *self.last_reference.lock().unwrap() = Some(request.external_reference.clone());
        Ok(CheckoutSession {
            preference_id: format!("pref-{}", request.external_reference),
            init_point: "https://pago.example.com/init".to_string(),
        })
    }

    async fn get_payment(&self, payment_id: &str) -> Result<PaymentDetails> {
        let reference = self
            .reference_override
            .lock()
            .unwrap()
            .clone()
            .or_else(|| self.last_reference());
        Ok(PaymentDetails {
            id: payment_id.to_string(),
            status: self.payment_status.lock().unwrap().clone(),
            status_detail: Some("accredited".to_string()),
            payment_method: Some("pix".to_string()),
            external_reference: reference,
        })
    }
}

struct NoCarrier;

#[async_trait]
impl CarrierQuotes for NoCarrier {
    async fn quote(&self, _product_id: &str, _cep: &str) -> Result<Vec<ShippingOption>> {
        anyhow::bail!("carrier offline in tests")
    }
}

fn sample_product(id: &str, price_cents: i64, stock: Option<i64>) -> Product {
    let now = Utc::now();
    Product {
        id: id.to_string(),
        sku: Some(format!("SKU-{id}")),
        name: format!("Produto {id}"),
        slug: format!("produto-{id}"),
        brand: Some("Weg".to_string()),
        price_cents,
        stock,
        in_stock: true,
        category: Some("reles".to_string()),
        category_path: vec!["Automação".to_string(), "Relés".to_string()],
        weight_kg: Some(0.3),
        dimensions_cm: None,
        description: Some("Relé de uso geral".to_string()),
        image: Some(format!("https://cdn.example.com/{id}.jpg")),
        images: Vec::new(),
        datasheet: None,
        source_url: format!("https://www.proesi.com.br/{id}"),
        created_at: now,
        updated_at: now,
    }
}

struct TestApp {
    router: Router,
    pool: SqlitePool,
    gateway: Arc<StubGateway>,
    _dir: tempfile::TempDir,
}

async fn spawn_app() -> TestApp {
    let dir = tempfile::tempdir().unwrap();
    let url = format!("sqlite:{}", dir.path().join("api.db").display());
    let db = DatabaseConnection::new(&url).await.unwrap();
    db.migrate().await.unwrap();
    let pool = db.pool().clone();

    let products = Arc::new(SqliteProductRepository::new(pool.clone()));
    products
        .upsert(&sample_product("p1", 15_000, Some(10)))
        .await
        .unwrap();
    products.upsert(&sample_product("p2", 4990, Some(1))).await.unwrap();

    let orders = Arc::new(SqliteOrderRepository::new(pool.clone()));
    let logs = Arc::new(SqliteWebhookLogRepository::new(pool.clone()));
    let gateway = Arc::new(StubGateway::default());
    gateway.set_status("approved");
    let shipping_config = ShippingConfig::default();

    let state = AppState {
        probe: Arc::new(ProbeService::new(
            Arc::new(HttpClient::new(&HttpConfig::default()).unwrap()),
            products.clone(),
            SuppliersConfig::default(),
        )),
        catalog: Arc::new(CatalogService::new(products.clone(), StoreConfig::default())),
        shipping: Arc::new(ShippingEstimator::new(shipping_config.clone(), Arc::new(NoCarrier))),
        checkout: Arc::new(CheckoutService::new(
            products,
            orders.clone(),
            gateway.clone(),
            shipping_config,
        )),
        webhook: Arc::new(WebhookService::new(orders.clone(), logs, gateway.clone(), None)),
        orders,
    };

    TestApp { router: api::router(state), pool, gateway, _dir: dir }
}

async fn send(router: &Router, request: Request<Body>) -> (StatusCode, Value) {
    let response = router.clone().oneshot(request).await.unwrap();
    let status = response.status();
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX).await.unwrap();
    let body = if bytes.is_empty() {
        Value::Null
    } else {
        serde_json::from_slice(&bytes).unwrap_or(Value::Null)
    };
    (status, body)
}

fn get(uri: &str) -> Request<Body> {
    Request::builder().uri(uri).body(Body::empty()).unwrap()
}

fn post_json(uri: &str, body: Value) -> Request<Body> {
    Request::builder()
        .method("POST")
        .uri(uri)
        .header("content-type", "application/json")
        .body(Body::from(serde_json::to_vec(&body).unwrap()))
        .unwrap()
}

fn checkout_body(items: Value) -> Value {
    json!({
        "items": items,
        "customer": {
            "name": "Maria Silva",
            "email": "maria@example.com",
            "phone": "47 99999-0000",
            "taxId": "529.982.247-25"
        },
        "shipping": {
            "cep": "89010-000",
            "address": "Rua XV, 100",
            "city": "Blumenau",
            "state": "SC"
        }
    })
}

#[tokio::test]
async fn products_listing_supports_filters_and_formats() {
    let app = spawn_app().await;

    let (status, body) = send(&app.router, get("/products")).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["total"], json!(2));

    let (status, body) = send(&app.router, get("/products?id=p1")).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["price"], json!(150.0));
    assert_eq!(body["priceFormatted"], json!("R$ 150,00"));

    let (status, _) = send(&app.router, get("/products?id=ghost")).await;
    assert_eq!(status, StatusCode::NOT_FOUND);

    let response = app
        .router
        .clone()
        .oneshot(get("/products?format=google"))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    assert!(response.headers()["content-type"]
        .to_str()
        .unwrap()
        .starts_with("application/xml"));
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX).await.unwrap();
    let xml = String::from_utf8(bytes.to_vec()).unwrap();
    assert!(xml.contains("<g:price>150.00 BRL</g:price>"));

    let response = app
        .router
        .clone()
        .oneshot(get("/products?format=csv"))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    assert!(response.headers()["content-disposition"]
        .to_str()
        .unwrap()
        .contains("attachment"));
}

#[tokio::test]
async fn shipping_estimate_flags_free_zone() {
    let app = spawn_app().await;

    let (status, body) = send(
        &app.router,
        post_json("/shipping", json!({ "cep": "89010-000", "items": [{"id": "p1"}] })),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["isFreeZone"], json!(true));
    assert_eq!(body["options"][0]["price"], json!(0.0));

    let (status, body) = send(
        &app.router,
        post_json("/shipping", json!({ "cep": "123", "items": [] })),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["success"], json!(false));
}

#[tokio::test]
async fn checkout_then_webhook_approves_the_order() {
    let app = spawn_app().await;

    // Checkout: subtotal 150.00, free-zone CEP.
    let (status, body) = send(
        &app.router,
        post_json("/checkout", checkout_body(json!([{"id": "p1", "quantity": 1}]))),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["success"], json!(true));
    assert_eq!(body["data"]["total"], json!(150.0));
    assert_eq!(body["data"]["shipping_cost"], json!(0.0));
    let reference = body["data"]["external_reference"].as_str().unwrap().to_string();
    assert_eq!(app.gateway.last_reference().as_deref(), Some(reference.as_str()));

    // Order starts pending.
    let (status, body) = send(&app.router, get(&format!("/order/{reference}"))).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["status"], json!("pending"));
    assert!(body["paid_at"].is_null());
    assert_eq!(body["items"][0]["unit_price"], json!(150.0));

    // Webhook with processor status approved.
    let (status, _) = send(
        &app.router,
        post_json("/webhook", json!({ "type": "payment", "data": { "id": "pay-1" } })),
    )
    .await;
    assert_eq!(status, StatusCode::OK);

    let (status, body) = send(&app.router, get(&format!("/order/{reference}"))).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["status"], json!("approved"));
    assert!(!body["paid_at"].is_null());

    // Replaying the same notification keeps the final state stable.
    let (status, _) = send(
        &app.router,
        post_json("/webhook", json!({ "type": "payment", "data": { "id": "pay-1" } })),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    let items: Vec<(i64,)> = sqlx::query_as("SELECT COUNT(*) FROM order_items")
        .fetch_all(&app.pool)
        .await
        .unwrap();
    assert_eq!(items[0].0, 1);
}

#[tokio::test]
async fn submitted_prices_are_ignored_in_favor_of_the_catalog() {
    let app = spawn_app().await;

    let mut body = checkout_body(json!([{"id": "p2", "quantity": 1, "price": 0.01}]));
    body["items"][0]["unit_price"] = json!(0.01);
    let (status, response) = send(&app.router, post_json("/checkout", body)).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(response["data"]["subtotal"], json!(49.90));

    let row = sqlx::query("SELECT unit_price_cents FROM order_items LIMIT 1")
        .fetch_one(&app.pool)
        .await
        .unwrap();
    assert_eq!(row.get::<i64, _>("unit_price_cents"), 4990);
}

#[tokio::test]
async fn excessive_quantity_fails_validation_and_creates_no_order() {
    let app = spawn_app().await;

    let (status, body) = send(
        &app.router,
        post_json("/checkout", checkout_body(json!([{"id": "p2", "quantity": 5}]))),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["success"], json!(false));
    assert!(body["errors"].as_array().unwrap()[0]
        .as_str()
        .unwrap()
        .contains("estoque insuficiente"));

    let orders: (i64,) = sqlx::query_as("SELECT COUNT(*) FROM orders")
        .fetch_one(&app.pool)
        .await
        .unwrap();
    assert_eq!(orders.0, 0);
}

#[tokio::test]
async fn webhook_for_unknown_reference_acks_and_audits() {
    let app = spawn_app().await;
    app.gateway.override_reference("ref-fantasma");

    let (status, _) = send(
        &app.router,
        post_json("/webhook", json!({ "type": "payment", "data": { "id": "pay-9" } })),
    )
    .await;
    assert_eq!(status, StatusCode::OK);

    let rows = sqlx::query("SELECT processed, error FROM webhook_logs")
        .fetch_all(&app.pool)
        .await
        .unwrap();
    assert_eq!(rows.len(), 1);
    assert!(!rows[0].get::<bool, _>("processed"));
    assert!(rows[0]
        .get::<Option<String>, _>("error")
        .unwrap()
        .contains("ref-fantasma"));
}

#[tokio::test]
async fn non_payment_notifications_are_acknowledged() {
    let app = spawn_app().await;

    let (status, _) = send(
        &app.router,
        post_json("/webhook", json!({ "type": "merchant_order", "data": { "id": "mo-1" } })),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
}

#[tokio::test]
async fn unknown_order_lookup_is_404() {
    let app = spawn_app().await;
    let (status, body) = send(&app.router, get("/order/nao-existe")).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body["success"], json!(false));
}

#[tokio::test]
async fn check_requires_url_from_allowed_supplier() {
    let app = spawn_app().await;

    let (status, _) = send(&app.router, get("/check")).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    let (status, body) = send(
        &app.router,
        get("/check?url=https://outra-loja.com.br/produto/x"),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["success"], json!(false));
}

#[tokio::test]
async fn batch_check_rejects_oversized_batches() {
    let app = spawn_app().await;

    let urls: Vec<String> = (0..11)
        .map(|i| format!("https://www.proesi.com.br/produto-{i}"))
        .collect();
    let (status, body) = send(&app.router, post_json("/check-batch", json!({ "urls": urls }))).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert!(body["errors"].as_array().unwrap()[0]
        .as_str()
        .unwrap()
        .contains("máximo"));
}

#[tokio::test]
async fn preflight_gets_permissive_cors_headers() {
    let app = spawn_app().await;

    let request = Request::builder()
        .method("OPTIONS")
        .uri("/products")
        .header("origin", "https://www.blumenauautomacao.com.br")
        .header("access-control-request-method", "GET")
        .body(Body::empty())
        .unwrap();
    let response = app.router.clone().oneshot(request).await.unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    assert!(response.headers().contains_key("access-control-allow-origin"));
}
