use std::sync::{Arc, Mutex};
use std::thread::JoinHandle;

use futures::StreamExt;
use log::{debug, error, info, warn};
use tokio_tungstenite::tungstenite::Message;

use crate::error::FeedError;
use crate::model::{AppState, ConnectionState, Page, StatusEvent, element_id, parse_update};

pub type SharedState = Arc<Mutex<AppState>>;

/// Writes `event` into the row of its target, creating the row on first sight.
pub fn apply_update(page: &mut Page, event: &StatusEvent) -> Result<(), FeedError> {
    let id = element_id(&event.target);
    page.get_or_add_element_by_id(&id)?.set_status(event);
    Ok(())
}

/// Parses one raw message and applies it to the shared page.
///
/// Malformed payloads are counted in [`AppState::malformed`] before the error
/// is returned, so callers may skip them and keep reading.
pub fn handle_message(state: &SharedState, payload: &str) -> Result<StatusEvent, FeedError> {
    let parsed = parse_update(payload);
    let mut state = state.lock().expect("Failed to lock state for applying update");
    let event = match parsed {
        Ok(event) => event,
        Err(e) => {
            state.malformed = state.malformed.saturating_add(1);
            return Err(e);
        }
    };
    apply_update(&mut state.page, &event)?;
    Ok(event)
}

fn set_connection(state: &SharedState, connection: ConnectionState) {
    let mut state = state.lock().expect("Failed to lock state for connection update");
    state.connection = connection;
}

/// Opens the feed at `url` and applies every inbound message until the server
/// closes the stream or something fails. The final outcome is recorded in
/// [`AppState::connection`]. There is no reconnect.
pub async fn feed_task(url: String, state: SharedState) -> Result<(), FeedError> {
    set_connection(&state, ConnectionState::Connecting { url: url.clone() });

    match read_feed(&url, &state).await {
        Ok(reason) => {
            info!("Feed {url} closed: {reason}");
            set_connection(&state, ConnectionState::Closed { reason });
            Ok(())
        }
        Err(e) => {
            error!("Feed {url} stopped: {e}");
            set_connection(
                &state,
                ConnectionState::Failed {
                    error: e.to_string(),
                },
            );
            Err(e)
        }
    }
}

/// Returns the close reason on an orderly shutdown.
async fn read_feed(url: &str, state: &SharedState) -> Result<String, FeedError> {
    let (mut ws, response) = tokio_tungstenite::connect_async(url).await?;
    info!("Connected to {url} (status: {})", response.status());
    set_connection(state, ConnectionState::Open { url: url.to_string() });

    while let Some(msg) = ws.next().await {
        match msg? {
            Message::Text(text) => match handle_message(state, text.as_str()) {
                Ok(event) => debug!("{}", event.display_text()),
                Err(FeedError::MalformedPayload(e)) => {
                    warn!("Skipping malformed message {:?}: {e}", text.as_str());
                }
                Err(e) => return Err(e),
            },
            Message::Binary(data) => debug!("Ignoring binary message ({} bytes)", data.len()),
            Message::Close(frame) => {
                return Ok(match frame {
                    Some(f) => format!("{} {}", u16::from(f.code), f.reason.as_str())
                        .trim_end()
                        .to_string(),
                    None => "closed by server".to_string(),
                });
            }
            // Pings are answered by tungstenite.
            Message::Ping(_) | Message::Pong(_) | Message::Frame(_) => {}
        }
    }

    Ok("stream ended".to_string())
}

/// The session's feed connection, running on its own thread.
#[derive(Debug)]
pub struct FeedHandle {
    url: String,
    thread: JoinHandle<()>,
}

impl FeedHandle {
    pub fn url(&self) -> &str {
        &self.url
    }

    pub fn is_finished(&self) -> bool {
        self.thread.is_finished()
    }
}

/// Starts [`feed_task`] on a background thread with its own tokio runtime.
pub fn spawn_feed(url: String, state: SharedState) -> std::io::Result<FeedHandle> {
    let task_url = url.clone();
    let thread = std::thread::Builder::new()
        .name("status-feed".to_string())
        .spawn(move || {
            let runtime = match tokio::runtime::Builder::new_multi_thread()
                .enable_all()
                .build()
            {
                Ok(runtime) => runtime,
                Err(e) => {
                    error!("Failed to start feed runtime: {e}");
                    set_connection(
                        &state,
                        ConnectionState::Failed {
                            error: e.to_string(),
                        },
                    );
                    return;
                }
            };
            // Outcome is logged and stored in the state by feed_task.
            let _ = runtime.block_on(feed_task(task_url, state));
        })?;

    Ok(FeedHandle { url, thread })
}

#[cfg(test)]
#[path = "feed_tests.rs"]
mod tests;
