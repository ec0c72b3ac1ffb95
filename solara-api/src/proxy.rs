use axum::{
    extract::{Json, State},
    routing::post,
    Router,
};
use serde_json::{json, Value};
use tracing::info;

use solara_core::repository::WebhookError;
use solara_core::PipelineError;
use solara_shared::flatten::flatten_payload;

use crate::error::AppError;
use crate::state::AppState;

pub fn routes() -> Router<AppState> {
    Router::new().route("/v1/proxy/webhook", post(forward_webhook))
}

/// Flatten an arbitrary payload to string fields and forward it to the
/// configured receiver.
async fn forward_webhook(
    State(state): State<AppState>,
    Json(payload): Json<Value>,
) -> Result<Json<Value>, AppError> {
    if !payload.is_object() {
        return Err(PipelineError::Validation(
            "Proxy payload must be a JSON object".to_string(),
        )
        .into());
    }

    let flat = flatten_payload(&payload);
    state
        .webhooks
        .deliver(&state.proxy_url, &flat)
        .await
        .map_err(|err| match err {
            WebhookError::Rejected { status } => PipelineError::UpstreamRejection(format!(
                "Webhook receiver rejected the payload (status {})",
                status
            )),
            WebhookError::Transport(message) => PipelineError::Transport(message),
        })?;

    info!(fields = flat.as_object().map(|o| o.len()).unwrap_or(0), "proxied webhook payload");
    Ok(Json(json!({ "success": true })))
}
