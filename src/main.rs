mod app;
mod color;
mod state;
mod ui;

use app::RustyEdaApp;
use eframe::egui;
use rusty_eda::config::DashboardConfig;

fn main() -> eframe::Result {
    env_logger::init();

    let config = DashboardConfig::from_env();

    let options = eframe::NativeOptions {
        viewport: egui::ViewportBuilder::default()
            .with_inner_size([1280.0, 860.0])
            .with_min_inner_size([720.0, 480.0]),
        ..Default::default()
    };

    eframe::run_native(
        "Rusty EDA – Synthetic Data Explorer",
        options,
        Box::new(|_cc| Ok(Box::new(RustyEdaApp::new(config)))),
    )
}
