//! Host panel interface
//!
//! The windowing host that actually displays web page panels sits behind
//! [`PanelHost`] and [`PanelHandle`]. [`headless::HeadlessHost`] implements
//! them without a window.

pub mod content;
pub mod headless;
mod subscription;

use std::path::{Path, PathBuf};
use std::sync::Arc;

use anyhow::Result;
use futures::future::BoxFuture;
use serde_json::{Map, Value};

pub use content::{ContentReader, FsContentReader};
pub use headless::{HeadlessHost, HeadlessPanel};
pub use subscription::Subscription;

/// Message posted by a panel's embedded content
pub type PanelMessage = Map<String, Value>;

/// Callback for messages from the panel; the host drives the returned future
pub type MessageHandler = Arc<dyn Fn(PanelMessage) -> BoxFuture<'static, ()> + Send + Sync>;

/// Callback run once the host has disposed a panel
pub type DisposeHandler = Arc<dyn Fn() + Send + Sync>;

/// Editor column a panel is shown in
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ViewColumn {
    Active,
    One,
    Two,
    Three,
}

/// Capabilities granted to a panel when it is created
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct PanelOptions {
    pub enable_scripts: bool,
    pub enable_command_uris: bool,
    pub retain_context_when_hidden: bool,
    pub local_resource_roots: Vec<PathBuf>,
}

impl PanelOptions {
    /// Scripts and command URIs enabled, state retained while hidden,
    /// local resources restricted to `resource_root`
    pub fn for_resource_root(resource_root: PathBuf) -> Self {
        Self {
            enable_scripts: true,
            enable_command_uris: true,
            retain_context_when_hidden: true,
            local_resource_roots: vec![resource_root],
        }
    }
}

/// A panel opened by the host
pub trait PanelHandle: Send + Sync {
    fn id(&self) -> &str;
    fn reveal(&self, column: ViewColumn);
    fn dispose(&self);
    fn on_message(&self, handler: MessageHandler) -> Subscription;
    fn on_dispose(&self, handler: DisposeHandler) -> Subscription;
    fn post_message(&self, payload: Value) -> Result<()>;
    fn set_html(&self, html: String);
}

/// The windowing host
pub trait PanelHost: Send + Sync {
    fn create_panel(
        &self,
        view_type: &str,
        title: &str,
        column: ViewColumn,
        options: &PanelOptions,
    ) -> Result<Arc<dyn PanelHandle>>;

    /// Address of a local path as seen from inside a panel
    fn as_webview_uri(&self, path: &Path) -> String;
}

/// Format `path` as a `<scheme>:/<path>` URI
pub fn resource_uri(scheme: &str, path: &Path) -> String {
    let path = path.to_string_lossy().replace('\\', "/");
    if path.starts_with('/') {
        format!("{}:{}", scheme, path)
    } else {
        format!("{}:/{}", scheme, path)
    }
}
