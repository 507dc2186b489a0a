//! Lifecycle controllers for web page panels hosted by an editor-like host:
//! startup visibility, creation and reveal, the message protocol with the
//! page's content, usage telemetry and teardown.

pub mod assets;
pub mod core;
pub mod host;
pub mod panels;

pub use assets::{Assets, get_default_config};
pub use crate::core::Config;
pub use crate::core::event_bus::{TelemetryBusContainer, TelemetryEvent};
pub use crate::core::services::{GlobalState, JsonFileGlobalState, MemoryGlobalState, TelemetrySink};
pub use host::{HeadlessHost, PanelHandle, PanelHost, Subscription, ViewColumn};
pub use panels::{ChangelogPage, PageContext, ViewConfig, WebViewController, WebViewPage, WelcomePage};
