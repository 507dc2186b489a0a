//! Event Bus System
//!
//! Telemetry events emitted by page controllers are published on a
//! [`TelemetryBusContainer`] and fanned out to subscribers.

pub mod telemetry_bus;

pub use telemetry_bus::{SubscriptionId, TelemetryBusContainer, TelemetryEvent};
