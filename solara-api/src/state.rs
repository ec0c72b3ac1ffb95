use std::sync::Arc;

use solara_booking::BookingOrchestrator;
use solara_core::repository::WebhookSink;
use solara_relay::SubmissionRelay;
use solara_store::DriveClient;

#[derive(Clone)]
pub struct AppState {
    pub relay: Arc<SubmissionRelay>,
    pub orchestrator: Arc<BookingOrchestrator>,
    pub drive: Arc<DriveClient>,
    pub webhooks: Arc<dyn WebhookSink>,
    pub proxy_url: String,
}
