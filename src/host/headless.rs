//! Headless host
//!
//! Keeps panels in memory instead of drawing them. The embedded content and
//! the user are simulated with [`HeadlessPanel::deliver_message`] and
//! [`HeadlessPanel::close`]. Used by the preview binary and in tests.

use std::path::Path;
use std::sync::{Arc, Mutex, MutexGuard, Weak};

use anyhow::Result;
use serde_json::Value;

use super::{
    DisposeHandler, MessageHandler, PanelHandle, PanelHost, PanelMessage, PanelOptions,
    Subscription, ViewColumn, resource_uri,
};
use crate::core::config::DEFAULT_RESOURCE_SCHEME;

fn lock<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
}

/// Handlers keyed by registration id
struct HandlerList<H> {
    next_id: u64,
    handlers: Vec<(u64, H)>,
}

impl<H: Clone> HandlerList<H> {
    fn new() -> Self {
        Self {
            next_id: 1,
            handlers: Vec::new(),
        }
    }

    fn snapshot(&self) -> Vec<H> {
        self.handlers.iter().map(|(_, h)| h.clone()).collect()
    }
}

type SharedHandlers<H> = Arc<Mutex<HandlerList<H>>>;

fn register<H: Clone + Send + 'static>(list: &SharedHandlers<H>, handler: H) -> Subscription {
    let id = {
        let mut list = lock(list);
        let id = list.next_id;
        list.next_id += 1;
        list.handlers.push((id, handler));
        id
    };

    let weak: Weak<Mutex<HandlerList<H>>> = Arc::downgrade(list);
    Subscription::new(move || {
        if let Some(list) = weak.upgrade() {
            lock(&list).handlers.retain(|(handler_id, _)| *handler_id != id);
        }
    })
}

#[derive(Default)]
struct PanelState {
    html: Option<String>,
    column: Option<ViewColumn>,
    reveal_count: usize,
    disposed: bool,
    posted: Vec<Value>,
}

/// A panel held by [`HeadlessHost`]
pub struct HeadlessPanel {
    id: String,
    view_type: String,
    title: String,
    options: PanelOptions,
    state: Mutex<PanelState>,
    message_handlers: SharedHandlers<MessageHandler>,
    dispose_handlers: SharedHandlers<DisposeHandler>,
}

impl HeadlessPanel {
    fn new(view_type: &str, title: &str, column: ViewColumn, options: &PanelOptions) -> Self {
        Self {
            id: uuid::Uuid::new_v4().to_string(),
            view_type: view_type.to_string(),
            title: title.to_string(),
            options: options.clone(),
            state: Mutex::new(PanelState {
                column: Some(column),
                ..PanelState::default()
            }),
            message_handlers: Arc::new(Mutex::new(HandlerList::new())),
            dispose_handlers: Arc::new(Mutex::new(HandlerList::new())),
        }
    }

    pub fn view_type(&self) -> &str {
        &self.view_type
    }

    pub fn title(&self) -> &str {
        &self.title
    }

    pub fn options(&self) -> &PanelOptions {
        &self.options
    }

    pub fn html(&self) -> Option<String> {
        lock(&self.state).html.clone()
    }

    pub fn column(&self) -> Option<ViewColumn> {
        lock(&self.state).column
    }

    pub fn reveal_count(&self) -> usize {
        lock(&self.state).reveal_count
    }

    pub fn is_disposed(&self) -> bool {
        lock(&self.state).disposed
    }

    /// Messages the controller posted to the panel's content
    pub fn posted_messages(&self) -> Vec<Value> {
        lock(&self.state).posted.clone()
    }

    pub fn message_handler_count(&self) -> usize {
        lock(&self.message_handlers).handlers.len()
    }

    pub fn dispose_handler_count(&self) -> usize {
        lock(&self.dispose_handlers).handlers.len()
    }

    /// Deliver a message from the panel's content to every message handler
    pub async fn deliver_message(&self, message: PanelMessage) {
        if self.is_disposed() {
            log::warn!("[HeadlessHost] Dropping message for disposed panel {}", self.id);
            return;
        }

        let handlers = lock(&self.message_handlers).snapshot();
        for handler in handlers {
            handler(message.clone()).await;
        }
    }

    /// Close the panel the way a user would
    pub fn close(&self) {
        self.dispose_internal();
    }

    fn dispose_internal(&self) {
        {
            let mut state = lock(&self.state);
            if state.disposed {
                return;
            }
            state.disposed = true;
            state.column = None;
        }

        log::debug!("[HeadlessHost] Disposed panel {} ({})", self.id, self.view_type);

        // Handlers may unregister themselves, so run them on a snapshot.
        let handlers = lock(&self.dispose_handlers).snapshot();
        for handler in handlers {
            handler();
        }
    }
}

impl PanelHandle for HeadlessPanel {
    fn id(&self) -> &str {
        &self.id
    }

    fn reveal(&self, column: ViewColumn) {
        let mut state = lock(&self.state);
        if state.disposed {
            return;
        }
        state.column = Some(column);
        state.reveal_count += 1;
    }

    fn dispose(&self) {
        self.dispose_internal();
    }

    fn on_message(&self, handler: MessageHandler) -> Subscription {
        register(&self.message_handlers, handler)
    }

    fn on_dispose(&self, handler: DisposeHandler) -> Subscription {
        register(&self.dispose_handlers, handler)
    }

    fn post_message(&self, payload: Value) -> Result<()> {
        let mut state = lock(&self.state);
        if state.disposed {
            anyhow::bail!("Panel {} is disposed", self.id);
        }
        log::trace!("[HeadlessHost] Panel {} received: {}", self.id, payload);
        state.posted.push(payload);
        Ok(())
    }

    fn set_html(&self, html: String) {
        lock(&self.state).html = Some(html);
    }
}

/// In-memory [`PanelHost`]
pub struct HeadlessHost {
    scheme: String,
    panels: Mutex<Vec<Arc<HeadlessPanel>>>,
}

impl HeadlessHost {
    pub fn new() -> Self {
        Self::with_scheme(DEFAULT_RESOURCE_SCHEME)
    }

    pub fn with_scheme(scheme: impl Into<String>) -> Self {
        Self {
            scheme: scheme.into(),
            panels: Mutex::new(Vec::new()),
        }
    }

    /// Every panel created so far, in creation order
    pub fn panels(&self) -> Vec<Arc<HeadlessPanel>> {
        lock(&self.panels).clone()
    }

    pub fn created_count(&self) -> usize {
        lock(&self.panels).len()
    }

    /// Most recently created panel that is still open
    pub fn active_panel(&self) -> Option<Arc<HeadlessPanel>> {
        lock(&self.panels)
            .iter()
            .rev()
            .find(|panel| !panel.is_disposed())
            .cloned()
    }
}

impl Default for HeadlessHost {
    fn default() -> Self {
        Self::new()
    }
}

impl PanelHost for HeadlessHost {
    fn create_panel(
        &self,
        view_type: &str,
        title: &str,
        column: ViewColumn,
        options: &PanelOptions,
    ) -> Result<Arc<dyn PanelHandle>> {
        let panel = Arc::new(HeadlessPanel::new(view_type, title, column, options));
        log::debug!(
            "[HeadlessHost] Created panel {} ({}, \"{}\")",
            panel.id,
            view_type,
            title
        );
        lock(&self.panels).push(panel.clone());
        Ok(panel)
    }

    fn as_webview_uri(&self, path: &Path) -> String {
        resource_uri(&self.scheme, path)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use futures::FutureExt;
    use serde_json::json;
    use std::path::PathBuf;
    use std::sync::atomic::{AtomicUsize, Ordering};

    fn options() -> PanelOptions {
        PanelOptions::for_resource_root(PathBuf::from("/ext"))
    }

    #[test]
    fn test_create_panel_records_panel() {
        let host = HeadlessHost::new();
        let handle = host
            .create_panel("welcomePage", "Welcome", ViewColumn::One, &options())
            .unwrap();

        assert_eq!(host.created_count(), 1);
        let panel = host.active_panel().unwrap();
        assert_eq!(panel.id(), handle.id());
        assert_eq!(panel.view_type(), "welcomePage");
        assert_eq!(panel.title(), "Welcome");
        assert_eq!(panel.column(), Some(ViewColumn::One));
    }

    #[tokio::test]
    async fn test_deliver_message_reaches_handlers_until_released() {
        let host = HeadlessHost::new();
        host.create_panel("page", "Page", ViewColumn::One, &options())
            .unwrap();
        let panel = host.active_panel().unwrap();

        let calls = Arc::new(AtomicUsize::new(0));
        let calls_clone = calls.clone();
        let mut subscription = panel.on_message(Arc::new(move |_message: PanelMessage| {
            calls_clone.fetch_add(1, Ordering::SeqCst);
            async {}.boxed()
        }));

        let message = json!({"command": "documentReady"}).as_object().unwrap().clone();
        panel.deliver_message(message.clone()).await;
        assert_eq!(calls.load(Ordering::SeqCst), 1);

        subscription.dispose();
        assert_eq!(panel.message_handler_count(), 0);
        panel.deliver_message(message).await;
        assert_eq!(calls.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn test_close_fires_dispose_handlers_once() {
        let host = HeadlessHost::new();
        host.create_panel("page", "Page", ViewColumn::One, &options())
            .unwrap();
        let panel = host.active_panel().unwrap();

        let calls = Arc::new(AtomicUsize::new(0));
        let calls_clone = calls.clone();
        let _subscription = panel.on_dispose(Arc::new(move || {
            calls_clone.fetch_add(1, Ordering::SeqCst);
        }));

        panel.close();
        PanelHandle::dispose(&*panel);

        assert_eq!(calls.load(Ordering::SeqCst), 1);
        assert!(panel.is_disposed());
        assert!(host.active_panel().is_none());
    }

    #[test]
    fn test_post_message_after_dispose_fails() {
        let host = HeadlessHost::new();
        let handle = host
            .create_panel("page", "Page", ViewColumn::One, &options())
            .unwrap();

        handle.dispose();

        assert!(handle.post_message(json!({"command": "x"})).is_err());
    }

    #[test]
    fn test_as_webview_uri_uses_scheme() {
        let host = HeadlessHost::with_scheme("app-resource");

        assert_eq!(host.as_webview_uri(Path::new("/ext")), "app-resource:/ext");
    }
}
