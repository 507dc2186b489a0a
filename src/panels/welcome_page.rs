use std::path::Path;

use anyhow::Result;
use async_trait::async_trait;

use super::web_view::{ViewConfig, WebViewPage};

pub const WELCOME_VIEW_TYPE: &str = "welcomePage";
pub const WELCOME_SHOW_ON_STARTUP_KEY: &str = "showOnStartupWelcomePage";

/// Welcome page, shown on the first start
pub struct WelcomePage {
    config: ViewConfig,
}

impl WelcomePage {
    pub fn new(pages_dir: &Path) -> Self {
        Self {
            config: ViewConfig {
                content_path: pages_dir.join("welcome.html"),
                show_on_startup_key: WELCOME_SHOW_ON_STARTUP_KEY.to_string(),
                title: "Welcome".to_string(),
                view_type: WELCOME_VIEW_TYPE.to_string(),
            },
        }
    }
}

#[async_trait]
impl WebViewPage for WelcomePage {
    fn config(&self) -> &ViewConfig {
        &self.config
    }

    async fn decide_default_show_on_startup(&self) -> Result<bool> {
        Ok(true)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::event_bus::TelemetryBusContainer;
    use crate::core::services::{GlobalState, JsonFileGlobalState};
    use crate::host::{FsContentReader, HeadlessHost};
    use crate::panels::{PageContext, WebViewController};
    use serde_json::json;
    use std::sync::Arc;

    async fn controller(
        pages_dir: &Path,
        state_path: &Path,
    ) -> (Arc<HeadlessHost>, Arc<WebViewController<WelcomePage>>) {
        let state = JsonFileGlobalState::open(state_path.to_path_buf()).await.unwrap();
        let host = Arc::new(HeadlessHost::new());
        let context = PageContext {
            global_state: Arc::new(state),
            telemetry: Arc::new(TelemetryBusContainer::new()),
            host: host.clone(),
            content: Arc::new(FsContentReader),
            resource_root: pages_dir.to_path_buf(),
        };
        (host, WebViewController::new(WelcomePage::new(pages_dir), context))
    }

    #[tokio::test]
    async fn test_welcome_shows_on_first_start_only_until_toggled_off() {
        let temp_dir = tempfile::tempdir().unwrap();
        let pages_dir = crate::core::config_manager::initialize_pages_dir_at(
            &temp_dir.path().join("pages"),
        )
        .unwrap();
        let state_path = temp_dir.path().join("state.json");

        // First start: welcome opens with the embedded template rendered
        let (host, welcome) = controller(&pages_dir, &state_path).await;
        welcome.check_and_show().await.unwrap();
        let panel = host.active_panel().unwrap();
        let html = panel.html().unwrap();
        assert!(!html.contains("{{root}}"));
        assert!(html.contains(&format!("vscode-resource:{}", pages_dir.display())));

        // The user unticks "show on startup" and closes the page
        panel
            .deliver_message(
                json!({"command": "toggleShowPage", "value": false})
                    .as_object()
                    .cloned()
                    .unwrap(),
            )
            .await;
        panel.close();
        assert!(!welcome.is_open());

        // Next start reads the persisted choice
        let (host, welcome) = controller(&pages_dir, &state_path).await;
        welcome.check_and_show().await.unwrap();
        assert_eq!(host.created_count(), 0);

        let state = JsonFileGlobalState::open(state_path).await.unwrap();
        assert_eq!(
            state.get(WELCOME_SHOW_ON_STARTUP_KEY).await.unwrap(),
            Some(json!(false))
        );
    }
}
