//! Commodity Dash - Commodity Price Percentage-Change Dashboard

use anyhow::Context;
use commodity_dash::config::{Settings, CONFIG_FILE};
use commodity_dash::gui::DashboardApp;
use commodity_dash::logging;
use eframe::egui;
use tracing::info;

fn main() -> anyhow::Result<()> {
    let settings = Settings::load(CONFIG_FILE).context("loading dashboard settings")?;
    logging::init(&settings.log_level);
    info!(data = %settings.data_path.display(), "startup");

    // Configure native options
    let options = eframe::NativeOptions {
        viewport: egui::ViewportBuilder::default()
            .with_inner_size([1400.0, 800.0])
            .with_min_inner_size([1200.0, 700.0])
            .with_title(&settings.window_title),
        ..Default::default()
    };

    let title = settings.window_title.clone();
    eframe::run_native(
        &title,
        options,
        Box::new(move |cc| Ok(Box::new(DashboardApp::new(cc, settings)))),
    )
    .map_err(|e| anyhow::anyhow!("{e}"))
}
