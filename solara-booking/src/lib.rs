pub mod orchestrator;
pub mod rules;
pub mod warehouse;

pub use orchestrator::{BookingOrchestrator, SlotDiscovery};
