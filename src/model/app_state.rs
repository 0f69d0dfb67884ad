use super::connection::ConnectionState;
use super::location::PageLocation;
use super::page::Page;
use serde::{Deserialize, Serialize};

/// Only the location is persisted; the list and connection live for one session.
#[derive(Debug, Default, Serialize, Deserialize)]
pub struct AppState {
    #[serde(default)]
    pub location: PageLocation,
    #[serde(skip, default)]
    pub page: Page,
    #[serde(skip, default)]
    pub connection: ConnectionState,
    /// Number of inbound messages dropped as malformed.
    #[serde(skip, default)]
    pub malformed: u32,
}
