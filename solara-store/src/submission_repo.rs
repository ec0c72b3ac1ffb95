use async_trait::async_trait;
use redis::{AsyncCommands, RedisResult};
use serde_json::Value;
use std::collections::HashMap;
use tracing::info;
use uuid::Uuid;

use solara_core::repository::{StoreError, SubmissionStore};
use solara_shared::submission::Submission;

/// Submission records live in a Redis hash per id with fields
/// `form1`, `form2`, `form1_filled`, `form2_filled`. Writes are
/// per-field upserts; records are never deleted here.
#[derive(Clone)]
pub struct RedisClient {
    client: redis::Client,
}

impl RedisClient {
    pub async fn new(connection_string: &str) -> Result<Self, redis::RedisError> {
        let client = redis::Client::open(connection_string)?;
        Ok(Self { client })
    }

    pub async fn hset_submission_field(
        &self,
        submission_id: &str,
        field: &str,
        value: &str,
    ) -> RedisResult<()> {
        let mut conn = self.client.get_multiplexed_async_connection().await?;
        let key = format!("submission:{}", submission_id);
        conn.hset(key, field, value).await
    }

    pub async fn hgetall_submission(
        &self,
        submission_id: &str,
    ) -> RedisResult<HashMap<String, String>> {
        let mut conn = self.client.get_multiplexed_async_connection().await?;
        let key = format!("submission:{}", submission_id);
        conn.hgetall(key).await
    }

    async fn write_form(&self, id: Uuid, form_field: &str, payload: &Value) -> Result<(), StoreError> {
        let id_str = id.to_string();
        let body = payload.to_string();

        self.hset_submission_field(&id_str, form_field, &body)
            .await
            .map_err(backend)?;
        self.hset_submission_field(&id_str, &format!("{}_filled", form_field), "1")
            .await
            .map_err(backend)?;

        info!(submission_id = %id, field = form_field, "submission slot upserted");
        Ok(())
    }
}

fn backend(err: redis::RedisError) -> StoreError {
    StoreError::Backend(err.to_string())
}

/// Rebuild a record from its hash fields. An empty hash means the key
/// does not exist; the filled flags follow the payload slots, which
/// `write_form` always sets together.
fn hydrate(id: Uuid, fields: &HashMap<String, String>) -> Option<Submission> {
    if fields.is_empty() {
        return None;
    }

    let mut submission = Submission::new(id);
    if let Some(payload) = fields.get("form1").and_then(|raw| serde_json::from_str(raw).ok()) {
        submission = submission.with_form1(payload);
    }
    if let Some(payload) = fields.get("form2").and_then(|raw| serde_json::from_str(raw).ok()) {
        submission = submission.with_form2(payload);
    }
    Some(submission)
}

#[async_trait]
impl SubmissionStore for RedisClient {
    async fn upsert_form1(&self, id: Uuid, payload: &Value) -> Result<(), StoreError> {
        self.write_form(id, "form1", payload).await
    }

    async fn upsert_form2(&self, id: Uuid, payload: &Value) -> Result<(), StoreError> {
        self.write_form(id, "form2", payload).await
    }

    async fn get(&self, id: Uuid) -> Result<Option<Submission>, StoreError> {
        let fields = self
            .hgetall_submission(&id.to_string())
            .await
            .map_err(backend)?;

        Ok(hydrate(id, &fields))
    }
}
