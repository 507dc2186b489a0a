// Collaborator services consumed by page controllers

pub mod global_state;
pub mod telemetry_service;

pub use global_state::{GlobalState, JsonFileGlobalState, MemoryGlobalState};
pub use telemetry_service::{NoopTelemetry, TelemetrySink, events as telemetry_events};
