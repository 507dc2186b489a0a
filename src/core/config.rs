use serde::{Deserialize, Serialize};
use std::path::PathBuf;

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct Config {
    /// Root that `{{root}}` placeholders in page templates resolve to
    #[serde(default = "default_resource_root")]
    pub resource_root: PathBuf,
    /// URI scheme the host serves local resources under
    #[serde(default = "default_resource_scheme")]
    pub resource_scheme: String,
    /// Directory holding the page templates (defaults to `<user_data_dir>/pages`)
    #[serde(default)]
    pub pages_dir: Option<PathBuf>,
    /// Global state file (defaults to `<user_data_dir>/state.json`)
    #[serde(default)]
    pub state_file: Option<PathBuf>,
    #[serde(default)]
    pub telemetry: TelemetryConfig,
}

fn default_resource_root() -> PathBuf {
    PathBuf::from(".")
}

pub const DEFAULT_RESOURCE_SCHEME: &str = "vscode-resource";

fn default_resource_scheme() -> String {
    DEFAULT_RESOURCE_SCHEME.to_string()
}

impl Default for Config {
    fn default() -> Self {
        Self {
            resource_root: default_resource_root(),
            resource_scheme: default_resource_scheme(),
            pages_dir: None,
            state_file: None,
            telemetry: TelemetryConfig::default(),
        }
    }
}

/// Telemetry configuration
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct TelemetryConfig {
    /// Drop every event when disabled
    #[serde(default = "default_true")]
    pub enabled: bool,
}

impl Default for TelemetryConfig {
    fn default() -> Self {
        Self { enabled: true }
    }
}

fn default_true() -> bool {
    true
}
