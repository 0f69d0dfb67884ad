use thiserror::Error;

/// Errors raised while turning feed messages into list updates.
#[derive(Debug, Error)]
pub enum FeedError {
    /// Inbound message is not a JSON status event.
    #[error("malformed payload: {0}")]
    MalformedPayload(#[from] serde_json::Error),

    /// The list container updates are appended to does not exist.
    #[error("container `{0}` is missing from the page")]
    ContainerMissing(String),

    /// Connecting to or reading from the WebSocket failed.
    #[error("transport error: {0}")]
    Transport(#[from] tokio_tungstenite::tungstenite::Error),

    /// Hostname or port rejected before building the endpoint URL.
    #[error("invalid location: {0}")]
    InvalidLocation(String),
}
