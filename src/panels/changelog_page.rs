use std::path::Path;
use std::sync::Arc;

use anyhow::{Context, Result};
use async_trait::async_trait;
use serde_json::Value;

use super::web_view::{ViewConfig, WebViewPage};
use crate::core::Version;
use crate::core::services::GlobalState;

pub const CHANGELOG_VIEW_TYPE: &str = "changelogPage";
pub const CHANGELOG_SHOW_ON_STARTUP_KEY: &str = "showOnStartupChangelogPage";
pub const LAST_SEEN_VERSION_KEY: &str = "lastSeenVersion";

/// Release notes page
///
/// Defaults to showing when the installed version is newer than the last
/// version the user ran.
pub struct ChangelogPage {
    config: ViewConfig,
    global_state: Arc<dyn GlobalState>,
    current_version: Version,
}

impl ChangelogPage {
    pub fn new(pages_dir: &Path, global_state: Arc<dyn GlobalState>) -> Self {
        Self::with_current_version(pages_dir, global_state, Version::current())
    }

    pub fn with_current_version(
        pages_dir: &Path,
        global_state: Arc<dyn GlobalState>,
        current_version: Version,
    ) -> Self {
        Self {
            config: ViewConfig {
                content_path: pages_dir.join("changelog.html"),
                show_on_startup_key: CHANGELOG_SHOW_ON_STARTUP_KEY.to_string(),
                title: "What's New".to_string(),
                view_type: CHANGELOG_VIEW_TYPE.to_string(),
            },
            global_state,
            current_version,
        }
    }

    async fn last_seen_version(&self) -> Result<Option<Version>> {
        let stored = self
            .global_state
            .get(LAST_SEEN_VERSION_KEY)
            .await
            .context("Failed to read last seen version")?;

        // An unparsable version counts as never seen.
        Ok(stored
            .as_ref()
            .and_then(Value::as_str)
            .and_then(|raw| match Version::parse(raw) {
                Ok(version) => Some(version),
                Err(err) => {
                    log::warn!("[ChangelogPage] Ignoring stored version '{}': {}", raw, err);
                    None
                }
            }))
    }
}

#[async_trait]
impl WebViewPage for ChangelogPage {
    fn config(&self) -> &ViewConfig {
        &self.config
    }

    async fn decide_default_show_on_startup(&self) -> Result<bool> {
        let show = match self.last_seen_version().await? {
            Some(last_seen) => self.current_version.is_newer_than(&last_seen),
            None => true,
        };

        self.global_state
            .update(
                LAST_SEEN_VERSION_KEY,
                Value::String(self.current_version.to_string()),
            )
            .await
            .context("Failed to record current version")?;

        Ok(show)
    }
}
