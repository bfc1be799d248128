mod app;
mod cache;
mod color;
mod config;
mod data;
mod error;
mod predict;
mod state;
mod ui;

use std::sync::Arc;

use app::VehiclePriceApp;
use cache::Resources;
use config::AppConfig;
use eframe::egui;

fn main() -> eframe::Result {
    env_logger::init();

    let config = AppConfig::from_env();
    log::info!(
        "Data source {}, model bundle {}",
        config.data_source,
        config.model_path.display()
    );
    let resources = Arc::new(Resources::new(&config));

    let options = eframe::NativeOptions {
        viewport: egui::ViewportBuilder::default()
            .with_inner_size([1280.0, 860.0])
            .with_min_inner_size([720.0, 480.0]),
        ..Default::default()
    };

    eframe::run_native(
        "Vehicle Price Explorer",
        options,
        Box::new(|_cc| Ok(Box::new(VehiclePriceApp::new(resources)))),
    )
}
