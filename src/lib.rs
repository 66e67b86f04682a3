//! Storefront backend
//!
//! HTTP endpoints for a small e-commerce storefront: catalog exposure and
//! feeds, supplier price/stock probing with best-effort HTML extraction,
//! shipping estimates, checkout against a payment processor and webhook
//! reconciliation of payment status.

pub mod api;
pub mod application;
pub mod domain;
pub mod error;
pub mod extraction;
pub mod infrastructure;
