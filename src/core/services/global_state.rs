//! Global State - extension-wide key/value storage that outlives a session
//!
//! Two implementations are provided: an in-memory store for tests and
//! embedding, and a JSON file store that persists every update to disk.

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use async_trait::async_trait;
use serde_json::Value;
use tokio::sync::RwLock;

/// Persistent key/value store shared by all pages
///
/// Updating a key to `Value::Null` removes it, so a later `get` reports it as unset.
#[async_trait]
pub trait GlobalState: Send + Sync {
    async fn get(&self, key: &str) -> Result<Option<Value>>;
    async fn update(&self, key: &str, value: Value) -> Result<()>;
}

fn apply_update(values: &mut BTreeMap<String, Value>, key: &str, value: Value) {
    if value.is_null() {
        values.remove(key);
    } else {
        values.insert(key.to_string(), value);
    }
}

/// In-memory global state
#[derive(Default)]
pub struct MemoryGlobalState {
    values: RwLock<BTreeMap<String, Value>>,
}

impl MemoryGlobalState {
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a store pre-populated with `values`
    pub fn with_values<I, K>(values: I) -> Self
    where
        I: IntoIterator<Item = (K, Value)>,
        K: Into<String>,
    {
        Self {
            values: RwLock::new(values.into_iter().map(|(k, v)| (k.into(), v)).collect()),
        }
    }
}

#[async_trait]
impl GlobalState for MemoryGlobalState {
    async fn get(&self, key: &str) -> Result<Option<Value>> {
        Ok(self.values.read().await.get(key).cloned())
    }

    async fn update(&self, key: &str, value: Value) -> Result<()> {
        apply_update(&mut *self.values.write().await, key, value);
        Ok(())
    }
}

/// Global state persisted as a pretty-printed JSON object
pub struct JsonFileGlobalState {
    path: PathBuf,
    values: RwLock<BTreeMap<String, Value>>,
}

impl JsonFileGlobalState {
    /// Open the state file, starting empty if it does not exist yet
    pub async fn open(path: PathBuf) -> Result<Self> {
        let values = Self::load(&path).await?;
        log::debug!(
            "[GlobalState] Loaded {} keys from {}",
            values.len(),
            path.display()
        );

        Ok(Self {
            path,
            values: RwLock::new(values),
        })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    async fn load(path: &Path) -> Result<BTreeMap<String, Value>> {
        if !tokio::fs::try_exists(path)
            .await
            .with_context(|| format!("Failed to access state file: {}", path.display()))?
        {
            return Ok(BTreeMap::new());
        }

        let content = tokio::fs::read_to_string(path)
            .await
            .with_context(|| format!("Failed to read state file: {}", path.display()))?;

        if content.trim().is_empty() {
            return Ok(BTreeMap::new());
        }

        serde_json::from_str(&content)
            .with_context(|| format!("Failed to parse state file: {}", path.display()))
    }

    async fn save(&self, values: &BTreeMap<String, Value>) -> Result<()> {
        let content =
            serde_json::to_string_pretty(values).context("Failed to serialize global state")?;
        let path = self.path.clone();

        smol::unblock(move || {
            if let Some(parent) = path.parent() {
                if !parent.as_os_str().is_empty() && !parent.exists() {
                    std::fs::create_dir_all(parent)
                        .context("Failed to create state directory")?;
                }
            }

            std::fs::write(&path, content)
                .with_context(|| format!("Failed to write state file: {}", path.display()))?;

            log::debug!("[GlobalState] Wrote state file: {}", path.display());
            Ok(())
        })
        .await
    }
}

#[async_trait]
impl GlobalState for JsonFileGlobalState {
    async fn get(&self, key: &str) -> Result<Option<Value>> {
        Ok(self.values.read().await.get(key).cloned())
    }

    async fn update(&self, key: &str, value: Value) -> Result<()> {
        // Write lock is held across the save so updates reach disk in order.
        let mut values = self.values.write().await;
        let mut next = values.clone();
        apply_update(&mut next, key, value);

        self.save(&next).await?;
        *values = next;
        Ok(())
    }
}
