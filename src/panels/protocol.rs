//! Message protocol between a controller and its panel's content

use serde_json::Value;

/// Placeholder in page templates replaced with the resource root URI
pub const ROOT_PLACEHOLDER: &str = "{{root}}";

// Incoming commands
pub const DOCUMENT_READY: &str = "documentReady";
pub const TOGGLE_SHOW_PAGE: &str = "toggleShowPage";
pub const EXECUTE_COMMAND: &str = "executeCommand";
pub const OPEN_LINK: &str = "openLink";

// Outgoing commands
pub const SHOW_ON_STARTUP: &str = "showOnStartup";

/// Persisted "show automatically" flag of a page
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ShowOnStartup {
    /// Never evaluated
    Unset,
    Enabled,
    Disabled,
}

impl ShowOnStartup {
    /// Interpret a stored value; anything other than `false` counts as enabled
    pub fn from_stored(value: Option<&Value>) -> Self {
        match value {
            None | Some(Value::Null) => Self::Unset,
            Some(Value::Bool(false)) => Self::Disabled,
            Some(_) => Self::Enabled,
        }
    }
}

impl From<bool> for ShowOnStartup {
    fn from(value: bool) -> Self {
        if value { Self::Enabled } else { Self::Disabled }
    }
}
