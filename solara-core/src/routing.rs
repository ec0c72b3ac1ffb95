use async_trait::async_trait;
use serde::Deserialize;

use crate::order::{Order, OrderCommit, Planning, Reservation, ReservationRequest, Slot, SlotRequest};

pub const ERR_ORD_EXISTS: &str = "ERR_ORD_EXISTS";
pub const ERR_LOC_GEOCODING_MULTIPLE: &str = "ERR_LOC_GEOCODING_MULTIPLE";
pub const ERR_INVALID_OR_EXPIRED_RESERVATION: &str = "ERR_INVALID_OR_EXPIRED_RESERVATION";

/// One resolved geocoding candidate: `[address, latitude, longitude]`
/// on the wire.
#[derive(Debug, Clone, Deserialize)]
pub struct GeocodingCandidate(pub String, pub f64, pub f64);

#[derive(Debug, thiserror::Error)]
pub enum RoutingError {
    /// Provider returned a business error body with a `code` field.
    #[error("{code}: {message}")]
    Business {
        code: String,
        message: String,
        geocoding_results: Vec<GeocodingCandidate>,
    },
    /// Network failure, non-JSON body, or a non-2xx without a code.
    #[error("transport failure: {0}")]
    Transport(String),
}

impl RoutingError {
    pub fn is_code(&self, expected: &str) -> bool {
        matches!(self, RoutingError::Business { code, .. } if code == expected)
    }
}

/// Port over the external routing/scheduling provider's HTTP API.
#[async_trait]
pub trait RoutingApi: Send + Sync {
    /// Create an order; `ERR_ORD_EXISTS` if the orderNo is taken.
    async fn create_order(&self, order: &Order) -> Result<(), RoutingError>;

    /// Create-or-update an order, optionally committing a reservation.
    async fn commit_order(&self, commit: &OrderCommit) -> Result<(), RoutingError>;

    /// Bulk delete by orderNo.
    async fn delete_orders(&self, order_nos: &[String]) -> Result<(), RoutingError>;

    /// Discover concrete bookable slots for a candidate order.
    async fn discover_slots(
        &self,
        order: &Order,
        request: &SlotRequest,
        planning: &Planning,
    ) -> Result<Vec<Slot>, RoutingError>;

    /// Place a provisional hold on one concrete window.
    async fn reserve_slot(&self, request: &ReservationRequest) -> Result<Reservation, RoutingError>;
}
