mod app;
mod color;
mod config;
mod data;
mod export;
mod pipeline;
mod present;
mod state;
mod ui;

use anyhow::{Context, Result};
use app::SalesDashboardApp;
use data::source::{FileSource, HttpSource, SalesSource};
use eframe::egui;

fn main() -> Result<()> {
    env_logger::init();

    let config = config::load_config().context("loading configuration")?;
    let source: Box<dyn SalesSource> = match &config.source.file {
        Some(path) => {
            log::info!("Reading sales from file {}", path.display());
            Box::new(FileSource::new(path))
        }
        None => {
            log::info!("Fetching sales from {}", config.source.url);
            Box::new(
                HttpSource::new(config.source.url.clone(), config.timeout())
                    .context("building HTTP client")?,
            )
        }
    };

    let options = eframe::NativeOptions {
        viewport: egui::ViewportBuilder::default()
            .with_inner_size([1400.0, 900.0])
            .with_min_inner_size([800.0, 500.0]),
        ..Default::default()
    };

    eframe::run_native(
        "Sales Dashboard",
        options,
        Box::new(|_cc| Ok(Box::new(SalesDashboardApp::new(config, source)))),
    )
    .map_err(|e| anyhow::anyhow!("running the UI: {e}"))
}
