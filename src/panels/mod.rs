// Page-related modules

mod changelog_page;
mod context;
pub mod protocol;
pub mod web_view;
mod welcome_page;

// Re-export page types
pub use changelog_page::{
    CHANGELOG_SHOW_ON_STARTUP_KEY, CHANGELOG_VIEW_TYPE, ChangelogPage, LAST_SEEN_VERSION_KEY,
};
pub use context::PageContext;
pub use protocol::ShowOnStartup;
pub use web_view::{ViewConfig, WebViewController, WebViewPage};
pub use welcome_page::{WELCOME_SHOW_ON_STARTUP_KEY, WELCOME_VIEW_TYPE, WelcomePage};
