//! Graph Sketchpad
//!
//! A desktop canvas for sketching small graphs with a force-directed
//! layout keeping them readable.

mod app;
mod graph;
mod settings;
mod theme;

use eframe::egui;
use tracing_subscriber;

fn main() -> eframe::Result<()> {
    // Initialize logging
    tracing_subscriber::fmt::init();

    let options = eframe::NativeOptions {
        viewport: egui::ViewportBuilder::default()
            .with_inner_size([1120.0, 640.0])
            .with_title("Graph Sketchpad"),
        persist_window: true, // Persist window state and egui memory between sessions
        ..Default::default()
    };

    eframe::run_native(
        "Graph Sketchpad",
        options,
        Box::new(|cc| Ok(Box::new(app::SketchpadApp::new(cc)))),
    )
}
