use anyhow::Context;
use async_trait::async_trait;
use serde::Serialize;
use sqlx::{FromRow, PgPool};
use time::OffsetDateTime;
use tokio::sync::Mutex;

#[derive(Debug, Clone, Serialize, FromRow)]
pub struct ContactMessage {
    pub id: i64,
    pub name: String,
    pub email: String,
    pub message: String,
    #[serde(with = "time::serde::rfc3339")]
    pub received_at: OffsetDateTime,
}

#[derive(Debug, Clone)]
pub struct NewContactMessage {
    pub name: String,
    pub email: String,
    pub message: String,
}

/// Write-only store for messages left through the public contact form.
#[async_trait]
pub trait ContactInbox: Send + Sync {
    async fn submit(&self, new: NewContactMessage) -> anyhow::Result<ContactMessage>;
}

pub struct PgContactInbox {
    db: PgPool,
}

impl PgContactInbox {
    pub fn new(db: PgPool) -> Self {
        Self { db }
    }
}

#[async_trait]
impl ContactInbox for PgContactInbox {
    async fn submit(&self, new: NewContactMessage) -> anyhow::Result<ContactMessage> {
        sqlx::query_as::<_, ContactMessage>(
            r#"
            INSERT INTO contact_messages (name, email, message)
            VALUES ($1, $2, $3)
            RETURNING id, name, email, message, received_at
            "#,
        )
        .bind(&new.name)
        .bind(&new.email)
        .bind(&new.message)
        .fetch_one(&self.db)
        .await
        .context("insert contact message")
    }
}

#[derive(Default)]
pub struct MemoryContactInbox {
    messages: Mutex<Vec<ContactMessage>>,
}

impl MemoryContactInbox {
    #[cfg(test)]
    pub async fn len(&self) -> usize {
        self.messages.lock().await.len()
    }
}

#[async_trait]
impl ContactInbox for MemoryContactInbox {
    async fn submit(&self, new: NewContactMessage) -> anyhow::Result<ContactMessage> {
        let mut messages = self.messages.lock().await;
        let msg = ContactMessage {
            id: messages.len() as i64 + 1,
            name: new.name,
            email: new.email,
            message: new.message,
            received_at: OffsetDateTime::now_utc(),
        };
        messages.push(msg.clone());
        Ok(msg)
    }
}
