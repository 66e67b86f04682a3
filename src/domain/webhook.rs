//! Append-only audit records for inbound payment notifications

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// One inbound payment notification, recorded regardless of outcome.
/// Rows are never mutated after insert.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WebhookLogEntry {
    pub source: String,
    pub event_type: String,
    /// Raw notification payload as received.
    pub payload: String,
    pub processed: bool,
    pub error: Option<String>,
    pub received_at: DateTime<Utc>,
}

impl WebhookLogEntry {
    pub fn processed(source: &str, event_type: &str, payload: &str) -> Self {
        Self {
            source: source.to_string(),
            event_type: event_type.to_string(),
            payload: payload.to_string(),
            processed: true,
            error: None,
            received_at: Utc::now(),
        }
    }

    pub fn failed(source: &str, event_type: &str, payload: &str, error: &str) -> Self {
        Self {
            source: source.to_string(),
            event_type: event_type.to_string(),
            payload: payload.to_string(),
            processed: false,
            error: Some(error.to_string()),
            received_at: Utc::now(),
        }
    }
}
