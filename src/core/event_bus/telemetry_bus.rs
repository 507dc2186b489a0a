//! Telemetry Event Bus
//!
//! Fans telemetry events out to subscribers (an exporter, a log sink, tests).
//! Publishing never fails: telemetry is best-effort, and a panicking
//! subscriber is logged and skipped.

use std::collections::BTreeMap;
use std::panic::{self, AssertUnwindSafe};
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex, MutexGuard};

use chrono::{DateTime, Utc};
use serde::Serialize;
use serde_json::Value;

/// Identifier returned by [`TelemetryBusContainer::subscribe`]
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct SubscriptionId(u64);

/// A single telemetry event
#[derive(Clone, Debug, Serialize)]
pub struct TelemetryEvent {
    pub name: String,
    pub properties: BTreeMap<String, Value>,
    pub measurements: BTreeMap<String, f64>,
    pub timestamp: DateTime<Utc>,
}

impl TelemetryEvent {
    pub fn new(
        name: impl Into<String>,
        properties: BTreeMap<String, Value>,
        measurements: BTreeMap<String, f64>,
    ) -> Self {
        Self {
            name: name.into(),
            properties,
            measurements,
            timestamp: Utc::now(),
        }
    }

    /// String value of a property, if present
    pub fn property(&self, key: &str) -> Option<&str> {
        self.properties.get(key).and_then(Value::as_str)
    }
}

type Callback = Arc<dyn Fn(&TelemetryEvent) + Send + Sync + 'static>;

struct TelemetryBus {
    enabled: bool,
    subscribers: Vec<(SubscriptionId, Callback)>,
}

/// Thread-safe, cloneable telemetry bus
#[derive(Clone)]
pub struct TelemetryBusContainer {
    inner: Arc<Mutex<TelemetryBus>>,
    next_id: Arc<AtomicU64>,
}

impl TelemetryBusContainer {
    /// Create a new, enabled telemetry bus
    pub fn new() -> Self {
        Self::with_enabled(true)
    }

    pub fn with_enabled(enabled: bool) -> Self {
        Self {
            inner: Arc::new(Mutex::new(TelemetryBus {
                enabled,
                subscribers: Vec::new(),
            })),
            next_id: Arc::new(AtomicU64::new(1)),
        }
    }

    // Poisoning is ignored: telemetry keeps working after a panic elsewhere.
    fn lock(&self) -> MutexGuard<'_, TelemetryBus> {
        self.inner.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    pub fn set_enabled(&self, enabled: bool) {
        self.lock().enabled = enabled;
    }

    pub fn is_enabled(&self) -> bool {
        self.lock().enabled
    }

    /// Subscribe to all telemetry events
    pub fn subscribe<F>(&self, callback: F) -> SubscriptionId
    where
        F: Fn(&TelemetryEvent) + Send + Sync + 'static,
    {
        let id = SubscriptionId(self.next_id.fetch_add(1, Ordering::Relaxed));
        self.lock().subscribers.push((id, Arc::new(callback)));
        id
    }

    /// Unsubscribe using a subscription ID
    pub fn unsubscribe(&self, id: SubscriptionId) -> bool {
        let mut bus = self.lock();
        let before = bus.subscribers.len();
        bus.subscribers.retain(|(sub_id, _)| *sub_id != id);
        bus.subscribers.len() != before
    }

    /// Publish an event to all subscribers
    pub fn publish(&self, event: TelemetryEvent) {
        // Callbacks run outside the lock so they may (un)subscribe.
        let callbacks: Vec<Callback> = {
            let bus = self.lock();
            if !bus.enabled {
                log::trace!("[TelemetryBus] Disabled, dropping event: {}", event.name);
                return;
            }
            bus.subscribers.iter().map(|(_, cb)| cb.clone()).collect()
        };

        log::debug!(
            "[TelemetryBus] Publishing event: {} to {} subscribers",
            event.name,
            callbacks.len()
        );
        for callback in callbacks {
            let delivered = panic::catch_unwind(AssertUnwindSafe(|| callback(&event)));
            if delivered.is_err() {
                log::error!(
                    "[TelemetryBus] Subscriber panicked while handling event: {}",
                    event.name
                );
            }
        }
    }

    /// Get the number of active subscriptions
    pub fn subscriber_count(&self) -> usize {
        self.lock().subscribers.len()
    }
}

impl Default for TelemetryBusContainer {
    fn default() -> Self {
        Self::new()
    }
}
