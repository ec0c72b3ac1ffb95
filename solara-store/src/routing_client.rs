use async_trait::async_trait;
use reqwest::Method;
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use serde_json::json;

use crate::app_config::RoutingConfig;
use solara_core::order::{
    Order, OrderCommit, Planning, Reservation, ReservationRequest, Slot, SlotRequest,
};
use solara_core::routing::{GeocodingCandidate, RoutingApi, RoutingError};

/// HTTP client for the routing/scheduling provider. The API key rides
/// along as a query parameter on every call.
#[derive(Clone)]
pub struct RoutingClient {
    http: reqwest::Client,
    base_url: String,
    api_key: String,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct ProviderFault {
    code: Option<String>,
    message: Option<String>,
    #[serde(default)]
    geocoding_results: Vec<GeocodingCandidate>,
}

#[derive(Debug, Deserialize)]
struct SlotsResponse {
    slots: Vec<Slot>,
}

#[derive(Serialize)]
struct SlotDiscoveryBody<'a> {
    #[serde(flatten)]
    order: &'a Order,
    slots: &'a SlotRequest,
    planning: &'a Planning,
}

impl RoutingClient {
    pub fn new(config: &RoutingConfig) -> Self {
        Self {
            http: reqwest::Client::new(),
            base_url: config.base_url.trim_end_matches('/').to_string(),
            api_key: config.api_key.clone(),
        }
    }

    async fn send(
        &self,
        method: Method,
        path: &str,
        body: &impl Serialize,
    ) -> Result<reqwest::Response, RoutingError> {
        let url = format!("{}/{}", self.base_url, path);
        let response = self
            .http
            .request(method, &url)
            .query(&[("key", self.api_key.as_str())])
            .json(body)
            .send()
            .await
            .map_err(|e| RoutingError::Transport(e.to_string()))?;

        let status = response.status();
        if status.is_success() {
            Ok(response)
        } else {
            let text = response
                .text()
                .await
                .map_err(|e| RoutingError::Transport(e.to_string()))?;
            Err(decode_fault(status.as_u16(), &text))
        }
    }

    async fn send_json<T: DeserializeOwned>(
        &self,
        method: Method,
        path: &str,
        body: &impl Serialize,
    ) -> Result<T, RoutingError> {
        self.send(method, path, body)
            .await?
            .json::<T>()
            .await
            .map_err(|e| RoutingError::Transport(e.to_string()))
    }
}

/// A non-2xx with a parseable `code` is a business error; anything
/// else is transport.
fn decode_fault(status: u16, body: &str) -> RoutingError {
    if let Ok(fault) = serde_json::from_str::<ProviderFault>(body) {
        if let Some(code) = fault.code {
            return RoutingError::Business {
                code,
                message: fault.message.unwrap_or_default(),
                geocoding_results: fault.geocoding_results,
            };
        }
    }
    RoutingError::Transport(format!("provider returned status {}: {}", status, body))
}

#[async_trait]
impl RoutingApi for RoutingClient {
    async fn create_order(&self, order: &Order) -> Result<(), RoutingError> {
        self.send(Method::POST, "orders", order).await.map(|_| ())
    }

    async fn commit_order(&self, commit: &OrderCommit) -> Result<(), RoutingError> {
        self.send(Method::POST, "orders", commit).await.map(|_| ())
    }

    async fn delete_orders(&self, order_nos: &[String]) -> Result<(), RoutingError> {
        self.send(Method::DELETE, "orders", &json!({ "orderNos": order_nos }))
            .await
            .map(|_| ())
    }

    async fn discover_slots(
        &self,
        order: &Order,
        request: &SlotRequest,
        planning: &Planning,
    ) -> Result<Vec<Slot>, RoutingError> {
        let body = SlotDiscoveryBody {
            order,
            slots: request,
            planning,
        };
        let response: SlotsResponse = self.send_json(Method::POST, "slots", &body).await?;
        Ok(response.slots)
    }

    async fn reserve_slot(&self, request: &ReservationRequest) -> Result<Reservation, RoutingError> {
        self.send_json(Method::POST, "reservations", request).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use solara_core::routing::{ERR_LOC_GEOCODING_MULTIPLE, ERR_ORD_EXISTS};

    #[test]
    fn test_decode_business_fault() {
        let body = r#"{"code":"ERR_ORD_EXISTS","message":"order already exists"}"#;
        let err = decode_fault(409, body);

        assert!(err.is_code(ERR_ORD_EXISTS));
    }

    #[test]
    fn test_decode_geocoding_fault_carries_candidates() {
        let body = r#"{
            "code": "ERR_LOC_GEOCODING_MULTIPLE",
            "message": "ambiguous address",
            "geocodingResults": [
                ["1 Main St, Fresno, CA 93706, USA", 36.7378, -119.7871],
                ["1 Main St, Fresno, TX, USA", 31.0, -96.1]
            ]
        }"#;

        match decode_fault(409, body) {
            RoutingError::Business {
                code,
                geocoding_results,
                ..
            } => {
                assert_eq!(code, ERR_LOC_GEOCODING_MULTIPLE);
                assert_eq!(geocoding_results.len(), 2);
                assert_eq!(geocoding_results[0].0, "1 Main St, Fresno, CA 93706, USA");
                assert_eq!(geocoding_results[0].1, 36.7378);
            }
            other => panic!("expected business error, got {:?}", other),
        }
    }

    #[test]
    fn test_codeless_body_is_transport() {
        let err = decode_fault(502, "<html>bad gateway</html>");
        assert!(matches!(err, RoutingError::Transport(_)));
    }

    #[test]
    fn test_discovery_body_shape() {
        let order = Order {
            order_no: "SO-1".to_string(),
            order_type: "P".to_string(),
            duration: 60,
            location: Default::default(),
            date: None,
        };
        let request = SlotRequest {
            dates: vec![chrono::NaiveDate::from_ymd_opt(2026, 1, 9).unwrap()],
            time_windows: vec![],
        };
        let planning = Planning::default();

        let body = serde_json::to_value(SlotDiscoveryBody {
            order: &order,
            slots: &request,
            planning: &planning,
        })
        .unwrap();

        assert_eq!(body["orderNo"], "SO-1");
        assert_eq!(body["slots"]["dates"][0], "2026-01-09");
        assert_eq!(body["planning"]["lockType"], "none");
    }
}
