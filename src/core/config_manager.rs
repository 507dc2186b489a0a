use anyhow::{Context, Result};
use std::path::{Path, PathBuf};

/// Get the user data directory
/// - macOS: ~/.webview-pages/
/// - Windows: %APPDATA%\webview-pages\
/// - Linux: ~/.config/webview-pages/
pub fn get_user_data_dir() -> Result<PathBuf> {
    #[cfg(target_os = "macos")]
    {
        let home = dirs::home_dir()
            .ok_or_else(|| anyhow::anyhow!("Failed to get home directory"))?;
        Ok(home.join(".webview-pages"))
    }

    #[cfg(target_os = "windows")]
    {
        let appdata = dirs::config_dir()
            .ok_or_else(|| anyhow::anyhow!("Failed to get AppData directory"))?;
        Ok(appdata.join("webview-pages"))
    }

    #[cfg(target_os = "linux")]
    {
        let config = dirs::config_dir()
            .ok_or_else(|| anyhow::anyhow!("Failed to get config directory"))?;
        Ok(config.join("webview-pages"))
    }

    #[cfg(not(any(target_os = "macos", target_os = "windows", target_os = "linux")))]
    {
        Err(anyhow::anyhow!("Unsupported platform"))
    }
}

/// Get the config file path in the user data directory
pub fn get_user_config_path() -> Result<PathBuf> {
    Ok(get_user_data_dir()?.join("config.json"))
}

/// Write the embedded default config to `path` unless a file already exists there
pub fn ensure_default_config_at(path: &Path) -> Result<()> {
    if path.exists() {
        log::info!("Using existing config file: {:?}", path);
        return Ok(());
    }

    if let Some(parent) = path.parent() {
        if !parent.as_os_str().is_empty() && !parent.exists() {
            log::info!("Creating config directory: {:?}", parent);
            std::fs::create_dir_all(parent)
                .with_context(|| format!("Failed to create directory: {:?}", parent))?;
        }
    }

    log::info!("Config file not found, creating from embedded default: {:?}", path);

    let default_config = crate::assets::get_default_config()
        .ok_or_else(|| anyhow::anyhow!("Failed to get embedded default config"))?;

    std::fs::write(path, default_config)
        .with_context(|| format!("Failed to write config file: {:?}", path))?;

    Ok(())
}

/// Initialize user config directory and config file
/// If config file doesn't exist, create it from the embedded default config
pub fn initialize_user_config() -> Result<PathBuf> {
    let config_path = get_user_config_path()?;
    ensure_default_config_at(&config_path)?;
    Ok(config_path)
}

/// Load config from a file
pub fn load_config(path: &Path) -> Result<crate::core::config::Config> {
    let config_content = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read config file: {:?}", path))?;

    let config: crate::core::config::Config = serde_json::from_str(&config_content)
        .with_context(|| format!("Failed to parse config file: {:?}", path))?;

    Ok(config)
}

/// Load config from user data directory
pub fn load_user_config() -> Result<crate::core::config::Config> {
    let config_path = initialize_user_config()?;
    load_config(&config_path)
}

/// Get the pages directory path in the user data directory
pub fn get_pages_dir() -> Result<PathBuf> {
    Ok(get_user_data_dir()?.join("pages"))
}

/// Populate `pages_dir` with the embedded page templates
/// Existing files are left untouched so local edits survive
pub fn initialize_pages_dir_at(pages_dir: &Path) -> Result<PathBuf> {
    if !pages_dir.exists() {
        log::info!("Creating pages directory: {:?}", pages_dir);
        std::fs::create_dir_all(pages_dir)
            .with_context(|| format!("Failed to create pages directory: {:?}", pages_dir))?;
    }

    let embedded_pages = crate::assets::get_embedded_pages();

    if embedded_pages.is_empty() {
        log::warn!("No embedded pages found");
        return Ok(pages_dir.to_path_buf());
    }

    for (filename, content) in embedded_pages {
        let page_path = pages_dir.join(&filename);

        if !page_path.exists() {
            log::info!("Creating page file: {:?}", page_path);
            std::fs::write(&page_path, content)
                .with_context(|| format!("Failed to write page file: {:?}", page_path))?;
        }
    }

    log::info!("Pages directory initialized: {:?}", pages_dir);
    Ok(pages_dir.to_path_buf())
}

/// Initialize the pages directory in the user data directory
pub fn initialize_pages_dir() -> Result<PathBuf> {
    initialize_pages_dir_at(&get_pages_dir()?)
}

/// Get state file path based on build mode
/// - Debug mode: target/state.json
/// - Release mode: <user_data_dir>/state.json
pub fn get_state_file_path() -> PathBuf {
    if cfg!(debug_assertions) {
        PathBuf::from("target/state.json")
    } else {
        get_user_data_dir()
            .map(|dir| dir.join("state.json"))
            .unwrap_or_else(|_| PathBuf::from("state.json"))
    }
}
