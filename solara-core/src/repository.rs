use async_trait::async_trait;
use serde_json::Value;
use solara_shared::submission::Submission;
use uuid::Uuid;

#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    #[error("store backend error: {0}")]
    Backend(String),
}

#[derive(Debug, thiserror::Error)]
pub enum WebhookError {
    #[error("webhook receiver returned status {status}")]
    Rejected { status: u16 },
    #[error("webhook transport failure: {0}")]
    Transport(String),
}

/// Keyed record store for submissions. Upsert-only; either form path
/// may create the record.
#[async_trait]
pub trait SubmissionStore: Send + Sync {
    async fn upsert_form1(&self, id: Uuid, payload: &Value) -> Result<(), StoreError>;

    async fn upsert_form2(&self, id: Uuid, payload: &Value) -> Result<(), StoreError>;

    async fn get(&self, id: Uuid) -> Result<Option<Submission>, StoreError>;
}

/// Outbound delivery to the workflow-automation webhook receiver.
#[async_trait]
pub trait WebhookSink: Send + Sync {
    async fn deliver(&self, url: &str, payload: &Value) -> Result<(), WebhookError>;
}
