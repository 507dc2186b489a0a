use std::path::PathBuf;
use std::sync::Arc;

use crate::core::services::{GlobalState, TelemetrySink};
use crate::host::{ContentReader, PanelHost};

/// Collaborators shared by every page controller
#[derive(Clone)]
pub struct PageContext {
    pub global_state: Arc<dyn GlobalState>,
    pub telemetry: Arc<dyn TelemetrySink>,
    pub host: Arc<dyn PanelHost>,
    pub content: Arc<dyn ContentReader>,
    /// Only directory panels may load local resources from
    pub resource_root: PathBuf,
}
