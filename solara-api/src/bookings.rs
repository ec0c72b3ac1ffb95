use axum::{
    extract::{Json, State},
    routing::post,
    Router,
};
use serde::Deserialize;
use serde_json::{json, Value};
use tracing::info;

use solara_core::order::{Order, SlotRequest};

use crate::error::AppError;
use crate::state::AppState;

#[derive(Debug, Deserialize)]
struct DiscoverRequest {
    order: Order,
    slots: SlotRequest,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct ReserveRequest {
    order_no: String,
    /// `"<ISO datetime> - <ISO datetime>"` as shown to the customer.
    time_slot: String,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct FinalizeRequest {
    order: Order,
    #[serde(default)]
    reservation_id: Option<String>,
}

pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/v1/bookings/slots", post(discover_slots))
        .route("/v1/bookings/reserve", post(reserve_slot))
        .route("/v1/bookings/finalize", post(finalize_order))
}

async fn discover_slots(
    State(state): State<AppState>,
    Json(req): Json<DiscoverRequest>,
) -> Result<Json<Value>, AppError> {
    let discovery = state.orchestrator.discover_slots(req.order, req.slots).await?;

    info!(
        order_no = %discovery.order_no,
        slots = discovery.slots.len(),
        "slot discovery completed"
    );
    Ok(Json(json!({
        "success": true,
        "orderNo": discovery.order_no,
        "slots": discovery.slots,
    })))
}

async fn reserve_slot(
    State(state): State<AppState>,
    Json(req): Json<ReserveRequest>,
) -> Result<Json<Value>, AppError> {
    let reservation = state
        .orchestrator
        .reserve_slot(&req.order_no, &req.time_slot)
        .await?;

    info!(order_no = %req.order_no, reservation_id = %reservation.reservation_id, "slot reserved");
    Ok(Json(json!({
        "success": true,
        "reservationId": reservation.reservation_id,
    })))
}

async fn finalize_order(
    State(state): State<AppState>,
    Json(req): Json<FinalizeRequest>,
) -> Result<Json<Value>, AppError> {
    let order_no = req.order.order_no.clone();
    state
        .orchestrator
        .finalize_order(req.order, req.reservation_id)
        .await?;

    info!(order_no = %order_no, "order finalized");
    Ok(Json(json!({ "success": true, "orderNo": order_no })))
}
