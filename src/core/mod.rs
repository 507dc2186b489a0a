// Core infrastructure modules
pub mod config;
pub mod config_manager;
pub mod event_bus;
pub mod services;
pub mod version;

// Re-export commonly used types
pub use config::Config;
pub use version::Version;
