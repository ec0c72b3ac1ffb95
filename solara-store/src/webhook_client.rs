use async_trait::async_trait;
use serde_json::Value;
use tracing::info;

use solara_core::repository::{WebhookError, WebhookSink};

/// Plain POST delivery to the workflow-automation receiver. Success is
/// any 2xx; everything else is a rejection the relay surfaces.
#[derive(Clone)]
pub struct WebhookClient {
    http: reqwest::Client,
}

impl WebhookClient {
    pub fn new() -> Self {
        Self {
            http: reqwest::Client::new(),
        }
    }
}

impl Default for WebhookClient {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl WebhookSink for WebhookClient {
    async fn deliver(&self, url: &str, payload: &Value) -> Result<(), WebhookError> {
        let response = self
            .http
            .post(url)
            .json(payload)
            .send()
            .await
            .map_err(|e| WebhookError::Transport(e.to_string()))?;

        let status = response.status();
        if status.is_success() {
            info!(url, status = status.as_u16(), "webhook delivered");
            Ok(())
        } else {
            Err(WebhookError::Rejected {
                status: status.as_u16(),
            })
        }
    }
}
