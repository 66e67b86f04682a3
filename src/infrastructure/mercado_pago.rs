//! Payment processor client (Mercado Pago)
//!
//! Creates checkout preferences, fetches authoritative payment details and
//! verifies webhook signatures. Signature verification recomputes the
//! HMAC-SHA256 digest over the documented manifest and compares it in
//! constant time - presence of a marker substring is never enough.

use anyhow::{Context, Result};
use async_trait::async_trait;
use hmac::{Hmac, Mac};
use serde::Deserialize;
use serde_json::json;
use sha2::Sha256;

use crate::domain::repositories::{
    CheckoutSession, CheckoutSessionRequest, PaymentDetails, PaymentGateway,
};
use crate::error::ServiceError;
use crate::infrastructure::config::PaymentConfig;

type HmacSha256 = Hmac<Sha256>;

/// Verify the `x-signature` header (`ts=...,v1=...`) against the manifest
/// `id:{data.id};request-id:{request-id};ts:{ts};`. Segments without a
/// value are omitted from the manifest, mirroring the processor's scheme.
pub fn verify_signature(
    secret: &str,
    signature_header: Option<&str>,
    data_id: &str,
    request_id: Option<&str>,
) -> bool {
    let Some(header) = signature_header else {
        return false;
    };

    let mut ts = None;
    let mut v1 = None;
    for part in header.split(',') {
        match part.trim().split_once('=') {
            Some(("ts", value)) => ts = Some(value.trim().to_string()),
            Some(("v1", value)) => v1 = Some(value.trim().to_string()),
            _ => {}
        }
    }
    let (Some(ts), Some(v1)) = (ts, v1) else {
        return false;
    };
    let Ok(expected) = hex::decode(v1) else {
        return false;
    };

    let mut manifest = String::new();
    if !data_id.is_empty() {
        manifest.push_str(&format!("id:{};", data_id.to_lowercase()));
    }
    if let Some(request_id) = request_id.filter(|r| !r.is_empty()) {
        manifest.push_str(&format!("request-id:{request_id};"));
    }
    manifest.push_str(&format!("ts:{ts};"));

    let Ok(mut mac) = HmacSha256::new_from_slice(secret.as_bytes()) else {
        return false;
    };
    mac.update(manifest.as_bytes());
    mac.verify_slice(&expected).is_ok()
}

pub struct MercadoPagoClient {
    http: reqwest::Client,
    config: PaymentConfig,
}

#[derive(Debug, Deserialize)]
struct PreferenceResponse {
    id: String,
    init_point: String,
}

#[derive(Debug, Deserialize)]
struct PaymentResponse {
    id: serde_json::Value,
    status: String,
    status_detail: Option<String>,
    payment_method_id: Option<String>,
    external_reference: Option<String>,
}

impl MercadoPagoClient {
    pub fn new(config: PaymentConfig) -> Self {
        Self { http: reqwest::Client::new(), config }
    }

    fn access_token(&self) -> Result<&str> {
        self.config
            .access_token
            .as_deref()
            .ok_or_else(|| {
                ServiceError::Configuration(
                    "payment access token not configured (payment.access_token)".to_string(),
                )
                .into()
            })
    }
}

#[async_trait]
impl PaymentGateway for MercadoPagoClient {
    async fn create_checkout_session(
        &self,
        request: &CheckoutSessionRequest,
    ) -> Result<CheckoutSession> {
        let token = self.access_token()?;

        let items: Vec<serde_json::Value> = request
            .items
            .iter()
            .map(|item| {
                json!({
                    "title": item.title,
                    "quantity": item.quantity,
                    "unit_price": item.unit_price_cents as f64 / 100.0,
                    "currency_id": "BRL",
                })
            })
            .collect();

        let mut body = json!({
            "items": items,
            "payer": {
                "name": request.payer_name,
                "email": request.payer_email,
                "phone": { "number": request.payer_phone },
            },
            "external_reference": request.external_reference,
        });
        if let Some(notification_url) = self.config.notification_url.as_deref() {
            body["notification_url"] = json!(notification_url);
        }
        if let (Some(address), Some(cep)) =
            (request.shipping_address.as_deref(), request.shipping_cep.as_deref())
        {
            body["shipments"] = json!({
                "receiver_address": { "street_name": address, "zip_code": cep },
            });
        }

        let response = self
            .http
            .post(format!("{}/checkout/preferences", self.config.base_url))
            .bearer_auth(token)
            .json(&body)
            .send()
            .await
            .context("Failed to reach payment processor")?;

        if !response.status().is_success() {
            anyhow::bail!("preference creation failed with status {}", response.status());
        }

        let preference: PreferenceResponse = response
            .json()
            .await
            .context("Failed to decode preference response")?;

        Ok(CheckoutSession {
            preference_id: preference.id,
            init_point: preference.init_point,
        })
    }

    async fn get_payment(&self, payment_id: &str) -> Result<PaymentDetails> {
        let token = self.access_token()?;

        let response = self
            .http
            .get(format!("{}/v1/payments/{payment_id}", self.config.base_url))
            .bearer_auth(token)
            .send()
            .await
            .context("Failed to reach payment processor")?;

        if !response.status().is_success() {
            anyhow::bail!("payment fetch failed with status {}", response.status());
        }

        let payment: PaymentResponse =
            response.json().await.context("Failed to decode payment response")?;

        // The processor returns numeric payment ids; normalize to text.
        let id = match &payment.id {
            serde_json::Value::String(s) => s.clone(),
            other => other.to_string(),
        };

        Ok(PaymentDetails {
            id,
            status: payment.status,
            status_detail: payment.status_detail,
            payment_method: payment.payment_method_id,
            external_reference: payment.external_reference,
        })
    }
}
