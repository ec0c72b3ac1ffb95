use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

/// A bookable job location as the routing provider understands it.
///
/// The UI-side geocoder attaches `checkedMultiResult` / `partialMatch`
/// flags and preliminary coordinates that the provider rejects; they
/// are stripped before any provider call so the provider geocodes the
/// address itself.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Location {
    pub address: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub location_name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub latitude: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub longitude: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub checked_multi_result: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub partial_match: Option<bool>,
}

impl Location {
    /// Remove fields the provider's geocoder cannot accept.
    pub fn strip_for_geocoding(&mut self) {
        self.latitude = None;
        self.longitude = None;
        self.checked_multi_result = None;
        self.partial_match = None;
    }
}

/// A bookable job in the routing provider.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Order {
    pub order_no: String,
    #[serde(rename = "type")]
    pub order_type: String,
    pub duration: u32,
    pub location: Location,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub date: Option<NaiveDate>,
}

/// Candidate dates and time windows submitted for slot discovery.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SlotRequest {
    pub dates: Vec<NaiveDate>,
    pub time_windows: Vec<TimeWindow>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TimeWindow {
    pub tw_from: String,
    pub tw_to: String,
}

/// Planning block required by the provider's slot-discovery endpoint.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Planning {
    pub clustering: bool,
    pub lock_type: String,
    pub use_drivers: Vec<String>,
}

impl Default for Planning {
    fn default() -> Self {
        Self {
            clustering: false,
            lock_type: "none".to_string(),
            use_drivers: Vec::new(),
        }
    }
}

/// A concrete bookable time window offered by the provider.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Slot {
    pub from: String,
    pub to: String,
}

/// Reservation request for one concrete window of one order.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ReservationRequest {
    pub order_no: String,
    pub date: String,
    pub tw_from: String,
    pub tw_to: String,
}

/// A provisional, time-limited hold issued by the provider.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Reservation {
    pub reservation_id: String,
}

/// Create-or-update body that commits a reservation to a real order.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OrderCommit {
    #[serde(flatten)]
    pub order: Order,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub reservation_id: Option<String>,
}
