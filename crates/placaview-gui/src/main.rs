//! GUI entry point for PlacaView

mod app;
mod edit_panel;
mod preview;
mod records_panel;
mod search_panel;
mod settings_panel;
mod task;
mod upload_panel;

use app::PlacaViewApp;
use eframe::egui;

fn main() -> eframe::Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("warn")).init();

    let options = eframe::NativeOptions {
        viewport: egui::ViewportBuilder::default()
            .with_inner_size([1000.0, 700.0])
            .with_min_inner_size([800.0, 500.0]),
        ..Default::default()
    };

    eframe::run_native(
        "PlacaView",
        options,
        Box::new(|cc| Ok(Box::new(PlacaViewApp::new(cc)))),
    )
}
