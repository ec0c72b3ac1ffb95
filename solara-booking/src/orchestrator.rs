use chrono::{DateTime, Utc};
use chrono_tz::Tz;
use rand::Rng;
use std::sync::Arc;
use tracing::{info, warn};

use solara_core::order::{
    Order, OrderCommit, Planning, Reservation, ReservationRequest, Slot, SlotRequest,
};
use solara_core::routing::{
    RoutingApi, RoutingError, ERR_INVALID_OR_EXPIRED_RESERVATION, ERR_LOC_GEOCODING_MULTIPLE,
    ERR_ORD_EXISTS,
};
use solara_core::{PipelineError, PipelineResult};

use crate::rules;
use crate::warehouse;

/// Result of a slot-discovery attempt. `order_no` is always the
/// caller's original number, even when a temporary one was used
/// against the provider.
#[derive(Debug)]
pub struct SlotDiscovery {
    pub slots: Vec<Slot>,
    pub order_no: String,
}

/// Mediates between the UI flow and the routing/scheduling provider.
///
/// Each stage (discover, reserve, finalize) is invoked independently by
/// the client and may be retried wholesale; the orchestrator itself
/// retries at most once per conflict kind, as an explicit protocol
/// rather than nested error handling.
pub struct BookingOrchestrator {
    routing: Arc<dyn RoutingApi>,
    planning: Planning,
}

impl BookingOrchestrator {
    pub fn new(routing: Arc<dyn RoutingApi>) -> Self {
        Self {
            routing,
            planning: Planning::default(),
        }
    }

    /// Discover candidate slots for a prospective order.
    pub async fn discover_slots(
        &self,
        order: Order,
        request: SlotRequest,
    ) -> PipelineResult<SlotDiscovery> {
        self.discover_slots_at(order, request, rules::pacific_now())
            .await
    }

    async fn discover_slots_at(
        &self,
        mut order: Order,
        mut request: SlotRequest,
        now: DateTime<Tz>,
    ) -> PipelineResult<SlotDiscovery> {
        // 1. Apply booking policy to the candidate dates
        let outcome = rules::filter_dates(&request.dates, &order.location, now);
        if !outcome.removed.is_empty() {
            info!(
                removed = outcome.removed.len(),
                kept = outcome.kept.len(),
                "booking policy removed candidate dates"
            );
        }
        if outcome.kept.is_empty() {
            return Err(PipelineError::Validation(rules::NO_DATES_MESSAGE.to_string()));
        }
        request.dates = outcome.kept;

        // The order's own date is subject to the same policy
        if let Some(date) = order.date {
            if let Some(reason) = rules::date_violation(date, &order.location, now) {
                return Err(PipelineError::Validation(format!(
                    "Requested order date {} is not bookable ({}). {}",
                    date,
                    reason,
                    rules::NO_DATES_MESSAGE
                )));
            }
        }

        // 2. The provider geocodes customer addresses itself
        order.location.strip_for_geocoding();
        let original_no = order.order_no.clone();

        // 3. Probe: a create that hits ERR_ORD_EXISTS tells us the
        //    number is taken before discovery trips over it
        match self.routing.create_order(&order).await {
            Ok(()) => {
                // Number was free; drop the probe order again
                if let Err(err) = self
                    .routing
                    .delete_orders(std::slice::from_ref(&original_no))
                    .await
                {
                    warn!(order_no = %original_no, error = %err, "failed to delete probe order");
                }
            }
            Err(err) if err.is_code(ERR_ORD_EXISTS) => {
                order.order_no = temp_order_no();
                info!(
                    original = %original_no,
                    temporary = %order.order_no,
                    "orderNo already exists, discovering under a temporary number"
                );
            }
            Err(err) => {
                // Probe is best-effort; discovery gets its own shot
                warn!(order_no = %original_no, error = %err, "probe create failed, continuing");
            }
        }

        // 4. Discovery with at most one retry per conflict kind
        let mut used_temporary = order.order_no != original_no;
        let mut retried_exists = false;
        let mut retried_geocoding = false;

        let result = loop {
            match self
                .routing
                .discover_slots(&order, &request, &self.planning)
                .await
            {
                Ok(slots) => break Ok(slots),
                Err(err) if err.is_code(ERR_ORD_EXISTS) && !retried_exists => {
                    retried_exists = true;
                    order.order_no = temp_order_no();
                    used_temporary = true;
                    info!(temporary = %order.order_no, "discovery hit ERR_ORD_EXISTS, retrying once");
                }
                Err(RoutingError::Business {
                    code,
                    geocoding_results,
                    ..
                }) if code == ERR_LOC_GEOCODING_MULTIPLE
                    && !retried_geocoding
                    && !geocoding_results.is_empty() =>
                {
                    retried_geocoding = true;
                    let candidate = &geocoding_results[0];
                    order.location.address = candidate.0.clone();
                    order.location.latitude = Some(candidate.1);
                    order.location.longitude = Some(candidate.2);
                    info!(address = %order.location.address, "ambiguous geocoding, retrying with first candidate pinned");
                }
                Err(err) => break Err(err),
            }
        };

        // 5. Best-effort cleanup of the temporary order
        if used_temporary {
            if let Err(err) = self
                .routing
                .delete_orders(std::slice::from_ref(&order.order_no))
                .await
            {
                warn!(order_no = %order.order_no, error = %err, "failed to clean up temporary order");
            }
        }

        let slots = result.map_err(map_routing_error)?;

        // 6. Defensive re-check on what the provider handed back
        let slots: Vec<Slot> = slots
            .into_iter()
            .filter(|slot| {
                if rules::slot_on_weekend(&slot.from) {
                    warn!(from = %slot.from, "provider returned a weekend slot, dropping");
                    false
                } else {
                    true
                }
            })
            .collect();

        Ok(SlotDiscovery {
            slots,
            order_no: original_no,
        })
    }

    /// Place a hold on a chosen slot. `time_slot` is the human-entered
    /// string `"<ISO datetime> - <ISO datetime>"`. No retry here;
    /// reservation failures go straight back to the caller.
    pub async fn reserve_slot(&self, order_no: &str, time_slot: &str) -> PipelineResult<Reservation> {
        let (date, tw_from, tw_to) = parse_time_slot(time_slot)?;
        let request = ReservationRequest {
            order_no: order_no.to_string(),
            date,
            tw_from,
            tw_to,
        };
        self.routing
            .reserve_slot(&request)
            .await
            .map_err(map_routing_error)
    }

    /// Commit the final order, consuming a prior reservation. Warehouse
    /// addresses carry fixed coordinates; customer addresses are left
    /// for the provider to geocode.
    pub async fn finalize_order(
        &self,
        mut order: Order,
        reservation_id: Option<String>,
    ) -> PipelineResult<()> {
        order.location.strip_for_geocoding();
        if let Some(depot) = warehouse::warehouse_for_address(&order.location.address) {
            order.location.latitude = Some(depot.latitude);
            order.location.longitude = Some(depot.longitude);
            order
                .location
                .location_name
                .get_or_insert_with(|| depot.name.to_string());
        }

        let commit = OrderCommit {
            order,
            reservation_id,
        };
        self.routing
            .commit_order(&commit)
            .await
            .map_err(map_routing_error)
    }
}

/// Parse `"<ISO datetime> - <ISO datetime>"` by fixed positions: the
/// date is the first 10 characters, the clock times sit at 11..16 of
/// each half.
fn parse_time_slot(time_slot: &str) -> PipelineResult<(String, String, String)> {
    if !time_slot.is_ascii() {
        return Err(PipelineError::Validation(
            "Time slot must be an ASCII datetime range".to_string(),
        ));
    }
    let (from_part, to_part) = time_slot.split_once(" - ").ok_or_else(|| {
        PipelineError::Validation(
            "Time slot must look like \"<from datetime> - <to datetime>\"".to_string(),
        )
    })?;
    if from_part.len() < 16 || to_part.len() < 16 {
        return Err(PipelineError::Validation(
            "Time slot datetimes are too short".to_string(),
        ));
    }
    Ok((
        from_part[..10].to_string(),
        from_part[11..16].to_string(),
        to_part[11..16].to_string(),
    ))
}

fn temp_order_no() -> String {
    let suffix: u32 = rand::thread_rng().gen_range(0..10_000);
    format!("tmp-{}-{:04}", Utc::now().timestamp_millis(), suffix)
}

fn map_routing_error(err: RoutingError) -> PipelineError {
    match err {
        RoutingError::Business { code, message, .. } => match code.as_str() {
            ERR_ORD_EXISTS | ERR_LOC_GEOCODING_MULTIPLE => {
                PipelineError::UpstreamConflict(format!("{}: {}", code, message))
            }
            ERR_INVALID_OR_EXPIRED_RESERVATION => PipelineError::UpstreamRejection(
                "Your reservation is no longer valid. Please select a new slot.".to_string(),
            ),
            _ => PipelineError::UpstreamRejection(format!("{}: {}", code, message)),
        },
        RoutingError::Transport(message) => PipelineError::Transport(message),
    }
}
