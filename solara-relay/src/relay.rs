use serde_json::Value;
use std::sync::Arc;
use tracing::info;
use uuid::Uuid;

use solara_core::repository::{SubmissionStore, WebhookError, WebhookSink};
use solara_core::{PipelineError, PipelineResult};
use solara_shared::lead::LeadPayload;
use solara_shared::submission::Submission;

use crate::normalize;
use crate::validate;

/// Accepts raw form payloads, persists them, and forwards them to the
/// workflow webhook. Persistence comes first: the relay never claims
/// success when the store write failed, and a webhook rejection is
/// surfaced even though the record is already stored (at-least-once
/// delivery, no automatic retry).
pub struct SubmissionRelay {
    store: Arc<dyn SubmissionStore>,
    webhook: Arc<dyn WebhookSink>,
    intake_url: String,
    survey_url: String,
}

impl SubmissionRelay {
    pub fn new(
        store: Arc<dyn SubmissionStore>,
        webhook: Arc<dyn WebhookSink>,
        intake_url: String,
        survey_url: String,
    ) -> Self {
        Self {
            store,
            webhook,
            intake_url,
            survey_url,
        }
    }

    /// Relay a project-intake payload (form 1).
    pub async fn relay_intake(&self, id: Uuid, raw: &Value) -> PipelineResult<LeadPayload> {
        // 1. Validate before touching any external system
        validate::validate_intake(raw)?;

        // 2. Normalize into the receiver's schema
        let payload = normalize::normalize_intake(raw);
        let normalized = serde_json::to_value(&payload)
            .map_err(|e| PipelineError::Transport(format!("failed to encode payload: {}", e)))?;

        // 3. Persist the normalized payload
        self.store
            .upsert_form1(id, &normalized)
            .await
            .map_err(|e| PipelineError::Persistence(e.to_string()))?;

        // 4. Forward
        self.webhook
            .deliver(&self.intake_url, &normalized)
            .await
            .map_err(map_webhook_error)?;

        info!(submission_id = %id, "intake submission relayed");
        Ok(payload)
    }

    /// Relay a survey-booking payload (form 2). Stored and forwarded
    /// as-is; only intake payloads get reshaped.
    pub async fn relay_survey(&self, id: Uuid, raw: &Value) -> PipelineResult<()> {
        if !raw.is_object() {
            return Err(PipelineError::Validation(
                "Survey payload must be a JSON object".to_string(),
            ));
        }

        self.store
            .upsert_form2(id, raw)
            .await
            .map_err(|e| PipelineError::Persistence(e.to_string()))?;

        self.webhook
            .deliver(&self.survey_url, raw)
            .await
            .map_err(map_webhook_error)?;

        info!(submission_id = %id, "survey submission relayed");
        Ok(())
    }

    pub async fn fetch(&self, id: Uuid) -> PipelineResult<Option<Submission>> {
        self.store
            .get(id)
            .await
            .map_err(|e| PipelineError::Persistence(e.to_string()))
    }
}

fn map_webhook_error(err: WebhookError) -> PipelineError {
    match err {
        WebhookError::Rejected { status } => PipelineError::UpstreamRejection(format!(
            "Webhook receiver rejected the payload (status {})",
            status
        )),
        WebhookError::Transport(message) => PipelineError::Transport(message),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use serde_json::json;
    use solara_core::repository::StoreError;
    use std::sync::Mutex;

    #[derive(Default)]
    struct MockStore {
        fail: bool,
        form1_writes: Mutex<Vec<(Uuid, Value)>>,
        form2_writes: Mutex<Vec<(Uuid, Value)>>,
    }

    #[async_trait]
    impl SubmissionStore for MockStore {
        async fn upsert_form1(&self, id: Uuid, payload: &Value) -> Result<(), StoreError> {
            if self.fail {
                return Err(StoreError::Backend("redis down".to_string()));
            }
            self.form1_writes.lock().unwrap().push((id, payload.clone()));
            Ok(())
        }

        async fn upsert_form2(&self, id: Uuid, payload: &Value) -> Result<(), StoreError> {
            if self.fail {
                return Err(StoreError::Backend("redis down".to_string()));
            }
            self.form2_writes.lock().unwrap().push((id, payload.clone()));
            Ok(())
        }

        async fn get(&self, _id: Uuid) -> Result<Option<Submission>, StoreError> {
            Ok(None)
        }
    }

    #[derive(Default)]
    struct MockSink {
        reject_status: Option<u16>,
        deliveries: Mutex<Vec<(String, Value)>>,
    }

    #[async_trait]
    impl WebhookSink for MockSink {
        async fn deliver(&self, url: &str, payload: &Value) -> Result<(), WebhookError> {
            if let Some(status) = self.reject_status {
                return Err(WebhookError::Rejected { status });
            }
            self.deliveries
                .lock()
                .unwrap()
                .push((url.to_string(), payload.clone()));
            Ok(())
        }
    }

    fn intake() -> Value {
        json!({
            "firstName": "Ana",
            "lastName": "Reyes",
            "customerEmail": "ana@example.com",
            "streetAddress": "1 Main St",
            "city": "Fresno",
            "state": "CA",
            "postalCode": "93706",
            "utilityProvider": "PG&E"
        })
    }

    fn relay(store: Arc<MockStore>, sink: Arc<MockSink>) -> SubmissionRelay {
        SubmissionRelay::new(
            store,
            sink,
            "https://hooks.example.com/intake".to_string(),
            "https://hooks.example.com/survey".to_string(),
        )
    }

    #[tokio::test]
    async fn test_intake_persists_then_forwards() {
        let store = Arc::new(MockStore::default());
        let sink = Arc::new(MockSink::default());
        let relay = relay(store.clone(), sink.clone());
        let id = Uuid::new_v4();

        relay.relay_intake(id, &intake()).await.unwrap();

        let writes = store.form1_writes.lock().unwrap();
        assert_eq!(writes.len(), 1);
        assert_eq!(writes[0].0, id);
        assert_eq!(writes[0].1["customerInfo"]["email"], "ana@example.com");

        let deliveries = sink.deliveries.lock().unwrap();
        assert_eq!(deliveries.len(), 1);
        assert_eq!(deliveries[0].0, "https://hooks.example.com/intake");
        assert_eq!(deliveries[0].1["projectDetails"]["utilityProvider"], "PG&E");
    }

    #[tokio::test]
    async fn test_missing_email_blocks_everything() {
        let store = Arc::new(MockStore::default());
        let sink = Arc::new(MockSink::default());
        let relay = relay(store.clone(), sink.clone());

        let mut raw = intake();
        raw.as_object_mut().unwrap().remove("customerEmail");

        let err = relay.relay_intake(Uuid::new_v4(), &raw).await.unwrap_err();
        assert!(matches!(err, PipelineError::Validation(_)));
        assert!(store.form1_writes.lock().unwrap().is_empty());
        assert!(sink.deliveries.lock().unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_store_failure_blocks_webhook() {
        let store = Arc::new(MockStore {
            fail: true,
            ..Default::default()
        });
        let sink = Arc::new(MockSink::default());
        let relay = relay(store, sink.clone());

        let err = relay.relay_intake(Uuid::new_v4(), &intake()).await.unwrap_err();
        assert!(matches!(err, PipelineError::Persistence(_)));
        assert!(sink.deliveries.lock().unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_webhook_rejection_surfaces_after_persistence() {
        let store = Arc::new(MockStore::default());
        let sink = Arc::new(MockSink {
            reject_status: Some(500),
            ..Default::default()
        });
        let relay = relay(store.clone(), sink);

        let err = relay.relay_intake(Uuid::new_v4(), &intake()).await.unwrap_err();
        match err {
            PipelineError::UpstreamRejection(msg) => assert!(msg.contains("500")),
            other => panic!("expected rejection, got {:?}", other),
        }
        // the record was still written
        assert_eq!(store.form1_writes.lock().unwrap().len(), 1);
    }

    #[tokio::test]
    async fn test_survey_forwards_raw_payload() {
        let store = Arc::new(MockStore::default());
        let sink = Arc::new(MockSink::default());
        let relay = relay(store.clone(), sink.clone());
        let id = Uuid::new_v4();

        let raw = json!({ "orderNumber": "SO-1", "surveyDate": "2026-01-09" });
        relay.relay_survey(id, &raw).await.unwrap();

        assert_eq!(store.form2_writes.lock().unwrap()[0].1, raw);
        let deliveries = sink.deliveries.lock().unwrap();
        assert_eq!(deliveries[0].0, "https://hooks.example.com/survey");
    }
}
