//! Payment notification endpoint
//!
//! Answers quickly and only refuses when the processor retrying would
//! actually help; see the webhook service for the full policy.

use axum::extract::State;
use axum::http::{HeaderMap, StatusCode};

use crate::api::AppState;
use crate::application::webhook::WebhookAck;

/// `POST /webhook`
pub async fn receive(
    State(state): State<AppState>,
    headers: HeaderMap,
    body: String,
) -> StatusCode {
    let signature = headers.get("x-signature").and_then(|v| v.to_str().ok());
    let request_id = headers.get("x-request-id").and_then(|v| v.to_str().ok());

    match state
        .webhook
        .handle_notification(&body, signature, request_id)
        .await
    {
        WebhookAck::Ok => StatusCode::OK,
        WebhookAck::Unauthorized => StatusCode::UNAUTHORIZED,
        WebhookAck::BadRequest => StatusCode::BAD_REQUEST,
        WebhookAck::Retry => StatusCode::INTERNAL_SERVER_ERROR,
    }
}
