#![cfg_attr(not(debug_assertions), windows_subsystem = "windows")] // hide console window on Windows in release

use eframe::egui;
use egui_status_feed::app::StatusFeedApp;
use tr::{tr, tr_init};

fn main() -> eframe::Result {
    env_logger::init();
    tr_init!("./locales");

    let options = eframe::NativeOptions {
        viewport: egui::ViewportBuilder::default()
            .with_title(tr!("Status feed"))
            .with_inner_size([480.0, 520.0])
            .with_resizable(true),
        renderer: eframe::Renderer::Wgpu,
        ..Default::default()
    };

    eframe::run_native(
        "egui_status_feed",
        options,
        Box::new(|cc| Ok(Box::new(StatusFeedApp::new(cc)))),
    )
}
