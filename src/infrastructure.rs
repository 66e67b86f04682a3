//! Infrastructure module - configuration, persistence and remote clients

pub mod carrier;
pub mod config;
pub mod database;
pub mod http_client;
pub mod logging;
pub mod mercado_pago;
pub mod order_repository;
pub mod product_repository;
pub mod webhook_log_repository;

pub use config::AppConfig;
pub use database::DatabaseConnection;
pub use http_client::HttpClient;
