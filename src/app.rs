use crate::logic::{FeedHandle, SharedState, spawn_feed};
use crate::model::{AppState, ConnectionState, ListItem, PageLocation};
use eframe::egui;
use eframe::egui::{Color32, RichText};
use log::{error, info, warn};
use std::sync::{Arc, Mutex};
use std::time::Duration;
use tr::tr;

pub struct StatusFeedApp {
    pub(crate) state: SharedState,
    pub input_hostname: String,
    pub input_port: String,
    pub(crate) feed: Option<FeedHandle>,
    pub(crate) location_error: Option<String>,
}

/// Helper for application-specific colors adapted for light/dark themes.
struct FeedVisuals {
    pub is_dark: bool,
}

impl FeedVisuals {
    fn from_ctx(ctx: &egui::Context) -> Self {
        Self {
            is_dark: ctx.style().visuals.dark_mode,
        }
    }

    fn down_color(&self) -> Color32 {
        Color32::from_rgb(213, 94, 0) // Vermilion
    }

    fn up_color(&self) -> Color32 {
        if self.is_dark {
            Color32::from_rgb(86, 180, 233) // Sky Blue
        } else {
            Color32::from_rgb(0, 114, 178) // Blue
        }
    }

    fn pending_color(&self) -> Color32 {
        if self.is_dark {
            Color32::from_gray(160)
        } else {
            Color32::from_gray(90)
        }
    }

    fn status_color(&self, up: Option<bool>) -> Color32 {
        match up {
            Some(true) => self.up_color(),
            Some(false) => self.down_color(),
            None => self.pending_color(),
        }
    }

    fn connection_color(&self, connection: &ConnectionState) -> Color32 {
        match connection {
            ConnectionState::Open { .. } => self.up_color(),
            ConnectionState::Closed { .. } | ConnectionState::Failed { .. } => self.down_color(),
            ConnectionState::Idle | ConnectionState::Connecting { .. } => self.pending_color(),
        }
    }
}

fn connection_text(connection: &ConnectionState) -> String {
    match connection {
        ConnectionState::Idle => tr!("Not connected").to_string(),
        ConnectionState::Connecting { url } => tr!("Connecting to {}", url).to_string(),
        ConnectionState::Open { url } => tr!("Connected to {}", url).to_string(),
        ConnectionState::Closed { reason } => tr!("Feed closed: {}", reason).to_string(),
        ConnectionState::Failed { error } => tr!("Feed failed: {}", error).to_string(),
    }
}

impl StatusFeedApp {
    /// Restores the persisted location, applies environment overrides and
    /// opens the feed.
    pub fn new(cc: &eframe::CreationContext<'_>) -> Self {
        let mut app_state = match cc.storage {
            Some(storage) => {
                if let Some(serialized) = storage.get_string(eframe::APP_KEY) {
                    serde_json::from_str(&serialized).unwrap_or_else(|e| {
                        warn!("Ignoring unreadable saved state: {e}");
                        AppState::default()
                    })
                } else {
                    AppState::default()
                }
            }
            None => AppState::default(),
        };

        match app_state.location.with_env_overrides() {
            Ok(location) => app_state.location = location,
            Err(e) => warn!("Ignoring location override: {e}"),
        }

        let mut app = Self::from_state(Arc::new(Mutex::new(app_state)));
        app.connect();
        app
    }

    /// Builds the app around existing state without opening a connection.
    pub fn from_state(state: SharedState) -> Self {
        let (input_hostname, input_port) = {
            let s = state.lock().expect("Failed to lock state for reading location");
            (
                s.location.hostname.clone(),
                s.location.port.map(|p| p.to_string()).unwrap_or_default(),
            )
        };

        Self {
            state,
            input_hostname,
            input_port,
            feed: None,
            location_error: None,
        }
    }

    /// True while the session's connection is still running.
    pub fn feed_active(&self) -> bool {
        self.feed.as_ref().is_some_and(|f| !f.is_finished())
    }

    /// Opens the feed for the location in the input fields, unless one is
    /// already running.
    pub fn connect(&mut self) {
        if self.feed_active() {
            return;
        }

        let location = match PageLocation::parse(&self.input_hostname, &self.input_port) {
            Ok(location) => location,
            Err(e) => {
                warn!("{e}");
                self.location_error = Some(e.to_string());
                return;
            }
        };
        self.location_error = None;

        let url = location.monitor_url();
        info!("{url}");
        self.state
            .lock()
            .expect("Failed to lock state for storing location")
            .location = location;

        match spawn_feed(url, self.state.clone()) {
            Ok(handle) => self.feed = Some(handle),
            Err(e) => {
                error!("Failed to start feed thread: {e}");
                self.state
                    .lock()
                    .expect("Failed to lock state for connection update")
                    .connection = ConnectionState::Failed {
                    error: e.to_string(),
                };
            }
        }
    }

    pub fn ui_layout(&mut self, ctx: &egui::Context) {
        let visuals = FeedVisuals::from_ctx(ctx);

        let (connection, malformed, items) = {
            let state = self.state.lock().expect("Failed to lock state for drawing");
            (
                state.connection.clone(),
                state.malformed,
                state.page.update_list().map(|l| l.items().to_vec()),
            )
        };

        egui::CentralPanel::default().show(ctx, |ui| {
            ui.horizontal(|ui| {
                ui.add(
                    egui::TextEdit::singleline(&mut self.input_hostname)
                        .hint_text(tr!("Host name"))
                        .desired_width(8.0 * 24.0),
                );
                let port = ui.add(
                    egui::TextEdit::singleline(&mut self.input_port)
                        .char_limit(5)
                        .hint_text(tr!("Port"))
                        .desired_width(8.0 * 6.0),
                );

                let can_connect = !self.feed_active() && !connection.is_active();
                let clicked = ui
                    .add_enabled(can_connect, egui::Button::new(tr!("Connect")))
                    .clicked();
                let entered = port.lost_focus() && ui.input(|i| i.key_pressed(egui::Key::Enter));
                if clicked || (can_connect && entered) {
                    self.connect();
                }
            });

            if let Some(err) = &self.location_error {
                ui.colored_label(visuals.down_color(), err);
            }

            ui.colored_label(
                visuals.connection_color(&connection),
                connection_text(&connection),
            );
            if malformed > 0 {
                ui.label(
                    RichText::new(tr!("Skipped malformed messages: {}", malformed))
                        .color(visuals.pending_color())
                        .small(),
                );
            }

            ui.separator();

            let Some(items) = items else {
                ui.colored_label(visuals.down_color(), tr!("Update list is missing"));
                return;
            };
            if items.is_empty() {
                ui.label(RichText::new(tr!("Waiting for updates…")).italics());
                return;
            }

            egui::ScrollArea::vertical().show(ui, |ui| {
                for item in &items {
                    status_row(ui, &visuals, item);
                }
            });
        });
    }
}

fn status_row(ui: &mut egui::Ui, visuals: &FeedVisuals, item: &ListItem) {
    let response = ui.colored_label(visuals.status_color(item.up), &item.text);
    if let Some(at) = item.updated_at {
        response.on_hover_text(tr!("Updated {}", at.format("%H:%M:%S")));
    }
}

impl eframe::App for StatusFeedApp {
    fn save(&mut self, storage: &mut dyn eframe::Storage) {
        let serialized = {
            let state = self.state.lock().expect("Failed to lock state for saving");
            serde_json::to_string_pretty(&*state).unwrap_or_default()
        };
        storage.set_string(eframe::APP_KEY, serialized);
    }

    fn update(&mut self, ctx: &egui::Context, _frame: &mut eframe::Frame) {
        self.ui_layout(ctx);
        ctx.request_repaint_after(Duration::from_millis(250));
    }
}
