//! Web View Controller - lifecycle of a single web page panel
//!
//! A controller owns at most one panel. It decides whether the page opens on
//! startup, creates or reveals the panel, answers messages from the page's
//! content and reports how long the page stayed open.

use std::collections::BTreeMap;
use std::path::PathBuf;
use std::sync::{Arc, Mutex, MutexGuard, Weak};

use anyhow::{Context, Result};
use async_trait::async_trait;
use futures::FutureExt;
use serde_json::{Value, json};

use super::context::PageContext;
use super::protocol::{self, ShowOnStartup};
use crate::core::services::telemetry_events;
use crate::host::{PanelHandle, PanelMessage, PanelOptions, Subscription, ViewColumn};

/// Static description of a page type
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ViewConfig {
    /// Markup template rendered into the panel
    pub content_path: PathBuf,
    /// Global state key of the "show on startup" flag
    pub show_on_startup_key: String,
    pub title: String,
    /// Panel identity, also tags telemetry
    pub view_type: String,
}

/// A concrete page type
#[async_trait]
pub trait WebViewPage: Send + Sync + 'static {
    fn config(&self) -> &ViewConfig;

    /// Whether the page opens on startup when no choice was stored yet
    ///
    /// Called at most once per page: its answer is persisted.
    async fn decide_default_show_on_startup(&self) -> Result<bool>;
}

#[derive(Default)]
struct PanelState {
    panel: Option<Arc<dyn PanelHandle>>,
    /// Creation time in milliseconds, 0 while closed
    start_show_date: i64,
    disposables: Vec<Subscription>,
}

fn same_panel(a: &Arc<dyn PanelHandle>, b: &Arc<dyn PanelHandle>) -> bool {
    std::ptr::addr_eq(Arc::as_ptr(a), Arc::as_ptr(b))
}

fn now_millis() -> i64 {
    chrono::Utc::now().timestamp_millis()
}

/// Controller for one page panel
pub struct WebViewController<P: WebViewPage> {
    page: P,
    context: PageContext,
    options: PanelOptions,
    state: Mutex<PanelState>,
    /// Serializes the read, decide and persist steps of the startup gate
    startup_gate: tokio::sync::Mutex<()>,
    weak_self: Weak<Self>,
}

impl<P: WebViewPage> WebViewController<P> {
    pub fn new(page: P, context: PageContext) -> Arc<Self> {
        let options = PanelOptions::for_resource_root(context.resource_root.clone());
        Arc::new_cyclic(|weak_self| Self {
            page,
            context,
            options,
            state: Mutex::new(PanelState::default()),
            startup_gate: tokio::sync::Mutex::new(()),
            weak_self: weak_self.clone(),
        })
    }

    pub fn page(&self) -> &P {
        &self.page
    }

    pub fn config(&self) -> &ViewConfig {
        self.page.config()
    }

    pub fn options(&self) -> &PanelOptions {
        &self.options
    }

    fn lock_state(&self) -> MutexGuard<'_, PanelState> {
        self.state.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    fn active_panel(&self) -> Option<Arc<dyn PanelHandle>> {
        self.lock_state().panel.clone()
    }

    pub fn is_open(&self) -> bool {
        self.lock_state().panel.is_some()
    }

    /// Creation time of the open panel in milliseconds, 0 while closed
    pub fn session_start(&self) -> i64 {
        self.lock_state().start_show_date
    }

    /// Read the persisted "show on startup" value
    pub async fn show_on_startup(&self) -> Result<Option<Value>> {
        let key = &self.config().show_on_startup_key;
        self.context
            .global_state
            .get(key)
            .await
            .with_context(|| format!("Failed to read global state key '{}'", key))
    }

    async fn set_show_on_startup(&self, value: bool) -> Result<()> {
        let key = &self.config().show_on_startup_key;
        self.context
            .global_state
            .update(key, Value::Bool(value))
            .await
            .with_context(|| format!("Failed to update global state key '{}'", key))
    }

    fn send_show_event(&self, trigger: &str) {
        self.context.telemetry.send_event(
            telemetry_events::SHOW_WEB_PAGE,
            BTreeMap::from([
                ("trigger".to_string(), json!(trigger)),
                ("viewType".to_string(), json!(self.config().view_type)),
            ]),
            BTreeMap::new(),
        );
    }

    /// Show the page on startup unless the user turned that off
    pub async fn check_and_show(&self) -> Result<()> {
        if !self.resolve_show_on_startup().await? {
            return Ok(());
        }

        self.send_show_event("auto");
        self.create_and_show().await
    }

    /// Whether the startup gate opens, establishing the default on first run
    ///
    /// Concurrent callers queue on the gate lock and re-read the flag, so the
    /// page's default is decided once.
    async fn resolve_show_on_startup(&self) -> Result<bool> {
        let _gate = self.startup_gate.lock().await;
        let stored = self.show_on_startup().await?;

        match ShowOnStartup::from_stored(stored.as_ref()) {
            ShowOnStartup::Disabled => {
                log::debug!(
                    "[WebView] {} disabled on startup, not showing",
                    self.config().view_type
                );
                Ok(false)
            }
            ShowOnStartup::Unset => {
                let show = self.page.decide_default_show_on_startup().await?;
                self.set_show_on_startup(show).await?;
                log::info!(
                    "[WebView] {} first run, show on startup defaults to {}",
                    self.config().view_type,
                    show
                );
                Ok(show)
            }
            ShowOnStartup::Enabled => Ok(true),
        }
    }

    /// Show the page on user request
    pub async fn show(&self) -> Result<()> {
        self.send_show_event("manual");
        self.create_and_show().await
    }

    /// Reveal the open panel, or create and render a new one
    pub async fn create_and_show(&self) -> Result<()> {
        let config = self.config();

        // The panel is stored before the first await so a concurrent call
        // reveals it instead of creating a second one.
        let panel = {
            let mut state = self.lock_state();
            if let Some(panel) = state.panel.clone() {
                drop(state);
                panel.reveal(ViewColumn::One);
                return Ok(());
            }

            let panel = self
                .context
                .host
                .create_panel(&config.view_type, &config.title, ViewColumn::One, &self.options)
                .with_context(|| format!("Failed to create panel '{}'", config.view_type))?;
            state.panel = Some(panel.clone());
            state.start_show_date = now_millis();
            panel
        };

        log::info!("[WebView] Created panel {} ({})", panel.id(), config.view_type);

        let html = match self.render_content().await {
            Ok(html) => html,
            Err(err) => {
                self.abort_creation(&panel);
                return Err(err);
            }
        };

        if !self.is_current(&panel) {
            log::debug!("[WebView] Panel {} disposed while rendering", panel.id());
            return Ok(());
        }
        panel.set_html(html);

        let weak = self.weak_self.clone();
        let on_message = panel.on_message(Arc::new(move |message: PanelMessage| {
            let weak = weak.clone();
            async move {
                let Some(controller) = weak.upgrade() else {
                    return;
                };
                if let Err(err) = controller.receive_message(message).await {
                    log::error!(
                        "[WebView] Failed to handle message for {}: {:#}",
                        controller.config().view_type,
                        err
                    );
                }
            }
            .boxed()
        }));

        let weak = self.weak_self.clone();
        let on_dispose = panel.on_dispose(Arc::new(move || {
            if let Some(controller) = weak.upgrade() {
                controller.dispose();
            }
        }));

        let mut state = self.lock_state();
        if state.panel.as_ref().is_some_and(|p| same_panel(p, &panel)) {
            state.disposables.push(on_message);
            state.disposables.push(on_dispose);
        }
        // Otherwise the panel went away meanwhile and the subscriptions are
        // released on drop.
        Ok(())
    }

    fn is_current(&self, panel: &Arc<dyn PanelHandle>) -> bool {
        self.lock_state()
            .panel
            .as_ref()
            .is_some_and(|p| same_panel(p, panel))
    }

    /// Tear down a panel whose content failed to render
    fn abort_creation(&self, panel: &Arc<dyn PanelHandle>) {
        let disposables = {
            let mut state = self.lock_state();
            if !state.panel.as_ref().is_some_and(|p| same_panel(p, panel)) {
                return;
            }
            state.panel = None;
            state.start_show_date = 0;
            std::mem::take(&mut state.disposables)
        };

        log::warn!(
            "[WebView] Aborting panel {} ({}): content failed to render",
            panel.id(),
            self.config().view_type
        );
        panel.dispose();
        for mut disposable in disposables {
            disposable.dispose();
        }
    }

    /// Load the page template and point `{{root}}` at the resource root
    pub async fn render_content(&self) -> Result<String> {
        let root = self.context.host.as_webview_uri(&self.context.resource_root);
        let html = self.context.content.read_text(&self.config().content_path).await?;

        Ok(html.replace(protocol::ROOT_PLACEHOLDER, &root))
    }

    /// Handle a message posted by the page's content
    ///
    /// Commands are checked independently; unknown or malformed messages are ignored.
    pub async fn receive_message(&self, message: PanelMessage) -> Result<()> {
        let Some(panel) = self.active_panel() else {
            return Ok(());
        };

        let command = message
            .get("command")
            .and_then(Value::as_str)
            .map(str::to_owned);
        let Some(command) = command else {
            log::debug!("[WebView] Ignoring message without command");
            return Ok(());
        };

        if command == protocol::DOCUMENT_READY {
            let value = self.show_on_startup().await?.unwrap_or(Value::Null);
            panel
                .post_message(json!({
                    "command": protocol::SHOW_ON_STARTUP,
                    "value": value,
                }))
                .with_context(|| format!("Failed to post message to panel {}", panel.id()))?;
        }

        if command == protocol::TOGGLE_SHOW_PAGE {
            match message.get("value").and_then(Value::as_bool) {
                Some(value) => self.set_show_on_startup(value).await?,
                None => log::debug!("[WebView] Ignoring {} without boolean value", command),
            }
        }

        if command == protocol::EXECUTE_COMMAND || command == protocol::OPEN_LINK {
            self.context.telemetry.send_event(
                telemetry_events::ACTION,
                message.into_iter().collect(),
                BTreeMap::new(),
            );
        }

        Ok(())
    }

    /// Close the panel and report the session duration
    ///
    /// Safe to call repeatedly and from the host's dispose callback.
    pub fn dispose(&self) {
        let (panel, start_show_date, disposables) = {
            let mut state = self.lock_state();
            (
                state.panel.take(),
                std::mem::take(&mut state.start_show_date),
                std::mem::take(&mut state.disposables),
            )
        };

        if let Some(panel) = panel {
            panel.dispose();

            let duration = (now_millis() - start_show_date) as f64 / 1000.0;
            log::info!(
                "[WebView] Disposed panel {} ({}) after {:.1}s",
                panel.id(),
                self.config().view_type,
                duration
            );
            self.context.telemetry.send_event(
                telemetry_events::DISPOSE_WEB_PAGE,
                BTreeMap::from([("viewType".to_string(), json!(self.config().view_type))]),
                BTreeMap::from([("duration".to_string(), duration)]),
            );
        }

        for mut disposable in disposables {
            disposable.dispose();
        }
    }
}
