use std::collections::BTreeMap;

use serde_json::Value;

use crate::core::event_bus::{TelemetryBusContainer, TelemetryEvent};

/// Telemetry event names
pub mod events {
    pub const SHOW_WEB_PAGE: &str = "WebPages.showWebPage";
    pub const ACTION: &str = "WebPages.action";
    pub const DISPOSE_WEB_PAGE: &str = "WebPages.disposeWebPage";
}

/// Fire-and-forget telemetry sink
///
/// Implementations must never panic or block the caller on delivery.
pub trait TelemetrySink: Send + Sync {
    fn send_event(
        &self,
        name: &str,
        properties: BTreeMap<String, Value>,
        measurements: BTreeMap<String, f64>,
    );
}

impl TelemetrySink for TelemetryBusContainer {
    fn send_event(
        &self,
        name: &str,
        properties: BTreeMap<String, Value>,
        measurements: BTreeMap<String, f64>,
    ) {
        self.publish(TelemetryEvent::new(name, properties, measurements));
    }
}

/// Discards every event
#[derive(Clone, Copy, Debug, Default)]
pub struct NoopTelemetry;

impl TelemetrySink for NoopTelemetry {
    fn send_event(&self, _: &str, _: BTreeMap<String, Value>, _: BTreeMap<String, f64>) {}
}

/// Log every event at debug level (subscriber for the telemetry bus)
pub fn log_telemetry_event(event: &TelemetryEvent) {
    log::debug!(
        "[Telemetry] {} properties={:?} measurements={:?}",
        event.name,
        event.properties,
        event.measurements
    );
}
