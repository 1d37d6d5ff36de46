use std::ops::RangeInclusive;

use eframe::egui::{self, Color32, RichText, ScrollArea, Ui};

use crate::config::Config;
use crate::data::filter::Selection;
use crate::data::regions::Region;
use crate::state::{AppState, DashboardPage, Page, RawDataPage};

// ---------------------------------------------------------------------------
// Top bar
// ---------------------------------------------------------------------------

/// Render the top menu / page switcher.
pub fn top_bar(ui: &mut Ui, state: &mut AppState, source_label: &str) {
    egui::menu::bar(ui, |ui: &mut Ui| {
        ui.selectable_value(&mut state.page, Page::Dashboard, "Sales dashboard");
        ui.selectable_value(&mut state.page, Page::RawData, "Raw data");

        ui.separator();

        match state.page {
            Page::Dashboard => {
                if let Some(ds) = &state.dashboard.dataset {
                    ui.label(format!("{} sales loaded", ds.len()));
                }
            }
            Page::RawData => {
                if let Some(ds) = &state.raw_data.dataset {
                    ui.label(format!("{} sales loaded", ds.len()));
                }
            }
        }

        ui.separator();
        ui.weak(source_label);
    });
}

/// Red status line with a retry button. Returns true when retry was clicked.
pub fn error_banner(ui: &mut Ui, error: &str) -> bool {
    let mut retry = false;
    ui.horizontal(|ui: &mut Ui| {
        ui.label(RichText::new(error).color(Color32::RED));
        retry = ui.button("Retry").clicked();
    });
    retry
}

// ---------------------------------------------------------------------------
// Left side panel – filter widgets
// ---------------------------------------------------------------------------

/// Sidebar of the dashboard page.
pub fn dashboard_filters(ui: &mut Ui, page: &mut DashboardPage, config: &Config) {
    ui.heading("Filters");
    ui.separator();

    ScrollArea::vertical()
        .auto_shrink([false, false])
        .show(ui, |ui: &mut Ui| {
            let controls = &mut page.controls;

            ui.strong("Region");
            egui::ComboBox::from_id_salt("region")
                .selected_text(controls.region.label())
                .show_ui(ui, |ui: &mut Ui| {
                    for region in Region::ALL {
                        ui.selectable_value(&mut controls.region, region, region.label());
                    }
                });
            ui.separator();

            ui.checkbox(&mut controls.all_years, "Whole period");
            if !controls.all_years {
                ui.add(
                    egui::Slider::new(
                        &mut controls.year,
                        config.dashboard.first_year..=config.dashboard.last_year,
                    )
                    .text("Year"),
                );
            }
            ui.separator();

            selection_filter(ui, "Sellers", &page.seller_options, &mut controls.sellers);
        });
}

/// Sidebar of the raw-data page.
pub fn raw_data_filters(ui: &mut Ui, page: &mut RawDataPage) {
    ui.heading("Filters");
    ui.separator();

    let Some(bounds) = page.bounds.clone() else {
        ui.label("No dataset loaded.");
        return;
    };

    ScrollArea::vertical()
        .auto_shrink([false, false])
        .show(ui, |ui: &mut Ui| {
            let controls = &mut page.controls;
            let options = &page.options;

            selection_filter(ui, "Product", &options.products, &mut controls.products);

            egui::CollapsingHeader::new(RichText::new("Price").strong())
                .id_salt("price")
                .show(ui, |ui: &mut Ui| {
                    range_sliders(ui, &mut controls.price, &bounds.price);
                });

            if let (Some((first, last)), Some(dates)) = (bounds.dates, controls.dates.as_mut()) {
                egui::CollapsingHeader::new(RichText::new("Purchase date").strong())
                    .id_salt("purchase_date")
                    .show(ui, |ui: &mut Ui| {
                        ui.horizontal(|ui: &mut Ui| {
                            ui.label("From");
                            ui.add(egui_extras::DatePickerButton::new(&mut dates.0).id_salt("date_from"));
                        });
                        ui.horizontal(|ui: &mut Ui| {
                            ui.label("To");
                            ui.add(egui_extras::DatePickerButton::new(&mut dates.1).id_salt("date_to"));
                        });
                        dates.0 = dates.0.clamp(first, last);
                        dates.1 = dates.1.clamp(dates.0, last);
                    });
            }

            selection_filter(ui, "Category", &options.categories, &mut controls.categories);

            egui::CollapsingHeader::new(RichText::new("Freight").strong())
                .id_salt("freight")
                .show(ui, |ui: &mut Ui| {
                    range_sliders(ui, &mut controls.freight, &bounds.freight);
                });

            selection_filter(ui, "Seller", &options.sellers, &mut controls.sellers);
            selection_filter(ui, "Purchase location", &options.locations, &mut controls.locations);
        });
}

/// Collapsible multi-choice list with All / None buttons.
fn selection_filter(ui: &mut Ui, title: &str, options: &[String], selection: &mut Selection) {
    // Show count of selected / total in the header
    let (n_selected, n_total) = selection.count(options);
    let header_text = format!("{title}  ({n_selected}/{n_total})");

    egui::CollapsingHeader::new(RichText::new(header_text).strong())
        .id_salt(title)
        .default_open(false)
        .show(ui, |ui: &mut Ui| {
            ui.horizontal(|ui: &mut Ui| {
                if ui.small_button("All").clicked() {
                    *selection = Selection::Any;
                }
                if ui.small_button("None").clicked() {
                    *selection = Selection::none();
                }
            });

            for option in options {
                let mut checked = selection.matches(option);
                if ui.checkbox(&mut checked, option.as_str()).changed() {
                    selection.toggle(option, options);
                }
            }
        });
}

/// Two sliders acting as one inclusive range control.
fn range_sliders(ui: &mut Ui, value: &mut (f64, f64), bounds: &RangeInclusive<f64>) {
    ui.add(egui::Slider::new(&mut value.0, bounds.clone()).text("min"));
    ui.add(egui::Slider::new(&mut value.1, bounds.clone()).text("max"));
    if value.0 > value.1 {
        value.1 = value.0;
    }
}
