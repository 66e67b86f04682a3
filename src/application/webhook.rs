//! Payment-webhook reconciliation
//!
//! The processor retries on any non-2xx answer, so the handler only refuses
//! when a retry is the correct remedy (bad signature, malformed payload,
//! transient failure). Conditions this system cannot fix by retrying -
//! unknown reference, ignored notification type - are acknowledged and
//! recorded in the audit log.

use std::sync::Arc;

use chrono::Utc;
use serde::Deserialize;
use tracing::{error, info, warn};

use crate::domain::order::OrderStatus;
use crate::domain::repositories::{OrderRepository, PaymentGateway, PaymentUpdate, WebhookLogRepository};
use crate::domain::webhook::WebhookLogEntry;
use crate::infrastructure::mercado_pago::verify_signature;

const WEBHOOK_SOURCE: &str = "mercadopago";

/// How the handler answers the processor.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WebhookAck {
    /// 200 - processed, ignored, or unprocessable-by-retry.
    Ok,
    /// 401 - signature verification enabled and failed.
    Unauthorized,
    /// 400 - payload this system cannot parse.
    BadRequest,
    /// 500 - transient failure; the processor should retry.
    Retry,
}

/// Notification envelope. Only `type` and `data.id` are trusted; amounts
/// and status always come from the authoritative payment fetch.
#[derive(Debug, Deserialize)]
struct NotificationEnvelope {
    #[serde(rename = "type", alias = "topic")]
    kind: Option<String>,
    #[serde(default)]
    data: NotificationData,
}

#[derive(Debug, Default, Deserialize)]
struct NotificationData {
    id: Option<String>,
}

/// Fixed mapping from the processor's status vocabulary onto the internal
/// enum. Unknown statuses stay `pending`.
pub fn map_processor_status(status: &str) -> OrderStatus {
    match status {
        "approved" => OrderStatus::Approved,
        "pending" => OrderStatus::Pending,
        "in_process" | "in_mediation" => OrderStatus::InProcess,
        "rejected" => OrderStatus::Rejected,
        "cancelled" => OrderStatus::Cancelled,
        "refunded" | "charged_back" => OrderStatus::Refunded,
        _ => OrderStatus::Pending,
    }
}

pub struct WebhookService {
    orders: Arc<dyn OrderRepository>,
    logs: Arc<dyn WebhookLogRepository>,
    gateway: Arc<dyn PaymentGateway>,
    webhook_secret: Option<String>,
}

impl WebhookService {
    pub fn new(
        orders: Arc<dyn OrderRepository>,
        logs: Arc<dyn WebhookLogRepository>,
        gateway: Arc<dyn PaymentGateway>,
        webhook_secret: Option<String>,
    ) -> Self {
        Self { orders, logs, gateway, webhook_secret }
    }

    /// Audit logging is best-effort: a failure is logged and swallowed so it
    /// can never change the response already decided for the processor.
    async fn audit(&self, entry: WebhookLogEntry) {
        if let Err(cause) = self.logs.append(&entry).await {
            error!(%cause, "failed to append webhook audit row");
        }
    }

    pub async fn handle_notification(
        &self,
        raw_body: &str,
        signature_header: Option<&str>,
        request_id: Option<&str>,
    ) -> WebhookAck {
        let envelope: NotificationEnvelope = match serde_json::from_str(raw_body) {
            Ok(envelope) => envelope,
            Err(cause) => {
                warn!(%cause, "malformed webhook payload");
                self.audit(WebhookLogEntry::failed(
                    WEBHOOK_SOURCE,
                    "unknown",
                    raw_body,
                    "malformed payload",
                ))
                .await;
                return WebhookAck::BadRequest;
            }
        };

        let event_type = envelope.kind.as_deref().unwrap_or("unknown").to_string();
        let data_id = envelope.data.id.as_deref().unwrap_or_default().to_string();

        if let Some(secret) = self.webhook_secret.as_deref() {
            if !verify_signature(secret, signature_header, &data_id, request_id) {
                warn!(event_type, "webhook signature verification failed");
                self.audit(WebhookLogEntry::failed(
                    WEBHOOK_SOURCE,
                    &event_type,
                    raw_body,
                    "invalid signature",
                ))
                .await;
                return WebhookAck::Unauthorized;
            }
        }

        if event_type != "payment" {
            self.audit(WebhookLogEntry::failed(
                WEBHOOK_SOURCE,
                &event_type,
                raw_body,
                "ignored notification type",
            ))
            .await;
            return WebhookAck::Ok;
        }

        if data_id.is_empty() {
            self.audit(WebhookLogEntry::failed(
                WEBHOOK_SOURCE,
                &event_type,
                raw_body,
                "missing payment id",
            ))
            .await;
            return WebhookAck::BadRequest;
        }

        let payment = match self.gateway.get_payment(&data_id).await {
            Ok(payment) => payment,
            Err(cause) => {
                error!(payment_id = %data_id, %cause, "authoritative payment fetch failed");
                self.audit(WebhookLogEntry::failed(
                    WEBHOOK_SOURCE,
                    &event_type,
                    raw_body,
                    "payment fetch failed",
                ))
                .await;
                return WebhookAck::Retry;
            }
        };

        let Some(reference) = payment.external_reference.clone().filter(|r| !r.is_empty()) else {
            self.audit(WebhookLogEntry::failed(
                WEBHOOK_SOURCE,
                &event_type,
                raw_body,
                "payment carries no external reference",
            ))
            .await;
            return WebhookAck::Ok;
        };

        let order = match self.orders.find_by_reference(&reference).await {
            Ok(Some(order)) => order,
            Ok(None) => {
                // Retrying cannot conjure the order, so acknowledge.
                warn!(%reference, "webhook for unknown order reference");
                self.audit(WebhookLogEntry::failed(
                    WEBHOOK_SOURCE,
                    &event_type,
                    raw_body,
                    &format!("order not found: {reference}"),
                ))
                .await;
                return WebhookAck::Ok;
            }
            Err(cause) => {
                error!(%reference, %cause, "order lookup failed");
                self.audit(WebhookLogEntry::failed(
                    WEBHOOK_SOURCE,
                    &event_type,
                    raw_body,
                    "order lookup failed",
                ))
                .await;
                return WebhookAck::Retry;
            }
        };

        let next_status = map_processor_status(&payment.status);
        if !order.status.can_transition_to(next_status) {
            warn!(
                %reference,
                from = order.status.as_str(),
                to = next_status.as_str(),
                "ignoring disallowed status transition"
            );
            self.audit(WebhookLogEntry::failed(
                WEBHOOK_SOURCE,
                &event_type,
                raw_body,
                &format!(
                    "transition {} -> {} not allowed",
                    order.status.as_str(),
                    next_status.as_str()
                ),
            ))
            .await;
            return WebhookAck::Ok;
        }

        let paid_at = (next_status == OrderStatus::Approved && order.status != OrderStatus::Approved)
            .then(Utc::now);

        let update = PaymentUpdate {
            status: next_status,
            payment_id: payment.id.clone(),
            status_detail: payment.status_detail.clone(),
            payment_method: payment.payment_method.clone(),
            paid_at,
        };

        if let Err(cause) = self.orders.apply_payment_update(&reference, &update).await {
            error!(%reference, %cause, "payment update failed");
            self.audit(WebhookLogEntry::failed(
                WEBHOOK_SOURCE,
                &event_type,
                raw_body,
                "payment update failed",
            ))
            .await;
            return WebhookAck::Retry;
        }

        info!(
            %reference,
            status = next_status.as_str(),
            payment_id = %payment.id,
            "order reconciled from payment notification"
        );
        self.audit(WebhookLogEntry::processed(WEBHOOK_SOURCE, &event_type, raw_body)).await;
        WebhookAck::Ok
    }
}
