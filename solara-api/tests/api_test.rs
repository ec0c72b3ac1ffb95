use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use axum::body::Body;
use axum::http::{Request, StatusCode};
use http_body_util::BodyExt;
use serde_json::{json, Value};
use tower::ServiceExt;
use uuid::Uuid;

use solara_api::{app, AppState};
use solara_booking::BookingOrchestrator;
use solara_core::order::{Order, OrderCommit, Planning, Reservation, ReservationRequest, Slot, SlotRequest};
use solara_core::repository::{StoreError, SubmissionStore, WebhookError, WebhookSink};
use solara_core::routing::{RoutingApi, RoutingError};
use solara_relay::SubmissionRelay;
use solara_shared::submission::Submission;
use solara_store::app_config::DriveConfig;
use solara_store::DriveClient;

#[derive(Default)]
struct MockSink {
    deliveries: Mutex<Vec<(String, Value)>>,
}

#[async_trait]
impl WebhookSink for MockSink {
    async fn deliver(&self, url: &str, payload: &Value) -> Result<(), WebhookError> {
        self.deliveries
            .lock()
            .unwrap()
            .push((url.to_string(), payload.clone()));
        Ok(())
    }
}

#[derive(Default)]
struct MockStore {
    form1_writes: Mutex<Vec<(Uuid, Value)>>,
    form2_writes: Mutex<Vec<(Uuid, Value)>>,
}

#[async_trait]
impl SubmissionStore for MockStore {
    async fn upsert_form1(&self, id: Uuid, payload: &Value) -> Result<(), StoreError> {
        self.form1_writes.lock().unwrap().push((id, payload.clone()));
        Ok(())
    }

    async fn upsert_form2(&self, id: Uuid, payload: &Value) -> Result<(), StoreError> {
        self.form2_writes.lock().unwrap().push((id, payload.clone()));
        Ok(())
    }

    async fn get(&self, _id: Uuid) -> Result<Option<Submission>, StoreError> {
        Ok(None)
    }
}

#[derive(Default)]
struct MockRouting {
    slots: Vec<Slot>,
    discover_calls: Mutex<usize>,
}

#[async_trait]
impl RoutingApi for MockRouting {
    async fn create_order(&self, _order: &Order) -> Result<(), RoutingError> {
        Ok(())
    }

    async fn commit_order(&self, _commit: &OrderCommit) -> Result<(), RoutingError> {
        Ok(())
    }

    async fn delete_orders(&self, _order_nos: &[String]) -> Result<(), RoutingError> {
        Ok(())
    }

    async fn discover_slots(
        &self,
        _order: &Order,
        _request: &SlotRequest,
        _planning: &Planning,
    ) -> Result<Vec<Slot>, RoutingError> {
        *self.discover_calls.lock().unwrap() += 1;
        Ok(self.slots.clone())
    }

    async fn reserve_slot(&self, request: &ReservationRequest) -> Result<Reservation, RoutingError> {
        Ok(Reservation {
            reservation_id: format!("res-{}", request.date),
        })
    }
}

fn test_state(
    store: Arc<MockStore>,
    sink: Arc<MockSink>,
    routing: Arc<MockRouting>,
) -> AppState {
    let webhooks: Arc<dyn WebhookSink> = sink;
    let relay = Arc::new(SubmissionRelay::new(
        store,
        webhooks.clone(),
        "https://hooks.test/intake".to_string(),
        "https://hooks.test/survey".to_string(),
    ));
    let orchestrator = Arc::new(BookingOrchestrator::new(routing));
    let drive = Arc::new(DriveClient::new(DriveConfig {
        client_email: "svc@test.iam.gserviceaccount.com".to_string(),
        private_key: "unused-in-tests".to_string(),
        folder_id: "folder".to_string(),
        share_with: None,
    }));

    AppState {
        relay,
        orchestrator,
        drive,
        webhooks,
        proxy_url: "https://hooks.test/proxy".to_string(),
    }
}

fn default_state() -> AppState {
    test_state(
        Arc::new(MockStore::default()),
        Arc::new(MockSink::default()),
        Arc::new(MockRouting::default()),
    )
}

async fn post_json(app: axum::Router, uri: &str, body: Value) -> (StatusCode, Value) {
    let request = Request::builder()
        .method("POST")
        .uri(uri)
        .header("content-type", "application/json")
        .body(Body::from(serde_json::to_vec(&body).unwrap()))
        .unwrap();

    let response = app.oneshot(request).await.unwrap();
    let status = response.status();
    let bytes = response.into_body().collect().await.unwrap().to_bytes();
    let value = serde_json::from_slice(&bytes).unwrap_or(Value::Null);
    (status, value)
}

#[tokio::test]
async fn test_health() {
    let app = app(default_state());
    let response = app
        .oneshot(Request::builder().uri("/health").body(Body::empty()).unwrap())
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
}

#[tokio::test]
async fn test_intake_accepted_and_forwarded() {
    let store = Arc::new(MockStore::default());
    let sink = Arc::new(MockSink::default());
    let app = app(test_state(store.clone(), sink.clone(), Arc::new(MockRouting::default())));

    let (status, body) = post_json(
        app,
        "/v1/submissions/project",
        json!({
            "payload": {
                "firstName": "Ana",
                "lastName": "Reyes",
                "customerEmail": "ana@example.com",
                "streetAddress": "1 Main St",
                "city": "Fresno",
                "state": "CA",
                "postalCode": "93706"
            }
        }),
    )
    .await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["success"], true);
    assert!(body["submissionId"].is_string());

    assert_eq!(store.form1_writes.lock().unwrap().len(), 1);
    let deliveries = sink.deliveries.lock().unwrap();
    assert_eq!(deliveries.len(), 1);
    assert_eq!(deliveries[0].0, "https://hooks.test/intake");
}

#[tokio::test]
async fn test_intake_missing_email_is_rejected_before_side_effects() {
    let store = Arc::new(MockStore::default());
    let sink = Arc::new(MockSink::default());
    let app = app(test_state(store.clone(), sink.clone(), Arc::new(MockRouting::default())));

    let (status, body) = post_json(
        app,
        "/v1/submissions/project",
        json!({
            "payload": {
                "firstName": "Ana",
                "lastName": "Reyes",
                "streetAddress": "1 Main St",
                "city": "Fresno",
                "state": "CA",
                "postalCode": "93706"
            }
        }),
    )
    .await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["success"], false);
    assert!(body["message"].as_str().unwrap().contains("customerEmail"));
    assert!(store.form1_writes.lock().unwrap().is_empty());
    assert!(sink.deliveries.lock().unwrap().is_empty());
}

#[tokio::test]
async fn test_weekend_only_discovery_never_reaches_provider() {
    let routing = Arc::new(MockRouting::default());
    let app = app(test_state(
        Arc::new(MockStore::default()),
        Arc::new(MockSink::default()),
        routing.clone(),
    ));

    // 2030-01-12 / 2030-01-13 are a Saturday and a Sunday
    let (status, body) = post_json(
        app,
        "/v1/bookings/slots",
        json!({
            "order": {
                "orderNo": "SO-1",
                "type": "P",
                "duration": 60,
                "location": { "address": "1 Main St, Fresno, CA 93706" }
            },
            "slots": { "dates": ["2030-01-12", "2030-01-13"], "timeWindows": [] }
        }),
    )
    .await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["success"], false);
    assert_eq!(*routing.discover_calls.lock().unwrap(), 0);
}

#[tokio::test]
async fn test_discovery_returns_slots_and_echoes_order_no() {
    let routing = Arc::new(MockRouting {
        slots: vec![Slot {
            from: "2030-01-09T10:00:00".to_string(),
            to: "2030-01-09T14:00:00".to_string(),
        }],
        ..Default::default()
    });
    let app = app(test_state(
        Arc::new(MockStore::default()),
        Arc::new(MockSink::default()),
        routing,
    ));

    // 2030-01-09 is a Wednesday
    let (status, body) = post_json(
        app,
        "/v1/bookings/slots",
        json!({
            "order": {
                "orderNo": "SO-1",
                "type": "P",
                "duration": 60,
                "location": { "address": "1 Main St, Fresno, CA 93706" }
            },
            "slots": { "dates": ["2030-01-09"], "timeWindows": [] }
        }),
    )
    .await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["orderNo"], "SO-1");
    assert_eq!(body["slots"].as_array().unwrap().len(), 1);
}

#[tokio::test]
async fn test_reserve_rejects_malformed_time_slot() {
    let app = app(default_state());

    let (status, body) = post_json(
        app,
        "/v1/bookings/reserve",
        json!({ "orderNo": "SO-1", "timeSlot": "next tuesday morning" }),
    )
    .await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["success"], false);
}

#[tokio::test]
async fn test_proxy_flattens_before_forwarding() {
    let sink = Arc::new(MockSink::default());
    let app = app(test_state(
        Arc::new(MockStore::default()),
        sink.clone(),
        Arc::new(MockRouting::default()),
    ));

    let (status, body) = post_json(
        app,
        "/v1/proxy/webhook",
        json!({
            "customer": { "contact": { "phone": "555-0100" } },
            "feedbackRating": 5
        }),
    )
    .await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["success"], true);

    let deliveries = sink.deliveries.lock().unwrap();
    assert_eq!(deliveries.len(), 1);
    assert_eq!(deliveries[0].0, "https://hooks.test/proxy");
    assert_eq!(deliveries[0].1["customer_contact_phone"], "555-0100");
    // numbers are stringified for the receiver
    assert_eq!(deliveries[0].1["feedbackRating"], "5");
}

#[tokio::test]
async fn test_unknown_submission_is_404() {
    let app = app(default_state());
    let uri = format!("/v1/submissions/{}", Uuid::new_v4());

    let response = app
        .oneshot(Request::builder().uri(&uri).body(Body::empty()).unwrap())
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::NOT_FOUND);
}
