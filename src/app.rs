use eframe::egui;

use crate::config::Config;
use crate::data::source::SalesSource;
use crate::state::{AppState, Page};
use crate::ui::{dashboard, panels, raw_data};

// ---------------------------------------------------------------------------
// eframe App implementation
// ---------------------------------------------------------------------------

pub struct SalesDashboardApp {
    pub state: AppState,
    source: Box<dyn SalesSource>,
    source_label: String,
}

impl SalesDashboardApp {
    pub fn new(config: Config, source: Box<dyn SalesSource>) -> Self {
        let source_label = source.describe();
        Self {
            state: AppState::new(config),
            source,
            source_label,
        }
    }
}

impl eframe::App for SalesDashboardApp {
    fn update(&mut self, ctx: &egui::Context, _frame: &mut eframe::Frame) {
        // ---- Top panel: page switcher ----
        egui::TopBottomPanel::top("top_bar").show(ctx, |ui| {
            panels::top_bar(ui, &mut self.state, &self.source_label);
        });

        let AppState {
            config,
            page,
            dashboard: dashboard_page,
            raw_data: raw_page,
            ..
        } = &mut self.state;

        // ---- Left side panel: filters ----
        egui::SidePanel::left("filter_panel")
            .default_width(240.0)
            .resizable(true)
            .show(ctx, |ui| match page {
                Page::Dashboard => panels::dashboard_filters(ui, dashboard_page, config),
                Page::RawData => panels::raw_data_filters(ui, raw_page),
            });

        // Controls may have changed above; fetch before rendering results.
        self.state.refresh(self.source.as_ref());

        // ---- Central panel: results ----
        let AppState {
            config,
            page,
            dashboard: dashboard_page,
            raw_data: raw_page,
            ..
        } = &mut self.state;
        egui::CentralPanel::default().show(ctx, |ui| match page {
            Page::Dashboard => dashboard::dashboard(ui, dashboard_page, config),
            Page::RawData => raw_data::raw_data(ui, raw_page, config),
        });
    }
}
