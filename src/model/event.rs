use crate::error::FeedError;
use serde::{Deserialize, Serialize};

/// One status report pushed by the monitor.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StatusEvent {
    pub target: String,
    pub up: bool,
}

impl StatusEvent {
    pub fn status_word(&self) -> &'static str {
        if self.up { "UP" } else { "DOWN" }
    }

    /// Text shown in the target's list row, e.g. `10.0.0.1 is UP`.
    pub fn display_text(&self) -> String {
        format!("{} is {}", self.target, self.status_word())
    }
}

/// Decodes one raw text message into a [`StatusEvent`].
///
/// Anything that is not a JSON object with a string `target` and a boolean
/// `up` is reported as [`FeedError::MalformedPayload`]. Extra fields are ignored.
pub fn parse_update(payload: &str) -> Result<StatusEvent, FeedError> {
    Ok(serde_json::from_str(payload)?)
}
