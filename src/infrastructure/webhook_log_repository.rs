//! SQLite implementation of the webhook audit log

use anyhow::Result;
use async_trait::async_trait;
use sqlx::SqlitePool;

use crate::domain::repositories::WebhookLogRepository;
use crate::domain::webhook::WebhookLogEntry;

#[derive(Clone)]
pub struct SqliteWebhookLogRepository {
    pool: SqlitePool,
}

impl SqliteWebhookLogRepository {
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl WebhookLogRepository for SqliteWebhookLogRepository {
    async fn append(&self, entry: &WebhookLogEntry) -> Result<()> {
        sqlx::query(
            r#"
            INSERT INTO webhook_logs (source, event_type, payload, processed, error, received_at)
            VALUES (?, ?, ?, ?, ?, ?)
            "#,
        )
        .bind(&entry.source)
        .bind(&entry.event_type)
        .bind(&entry.payload)
        .bind(entry.processed)
        .bind(&entry.error)
        .bind(entry.received_at)
        .execute(&self.pool)
        .await?;
        Ok(())
    }
}
