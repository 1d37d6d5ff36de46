use std::time::Instant;

use eframe::egui::{self, Color32, RichText, Ui};
use egui_extras::{Column as TableColumn, TableBuilder};

use crate::config::Config;
use crate::data::model::Column;
use crate::export::ensure_csv_extension;
use crate::state::RawDataPage;
use crate::ui::panels::error_banner;

// ---------------------------------------------------------------------------
// Raw data (central panel)
// ---------------------------------------------------------------------------

pub fn raw_data(ui: &mut Ui, page: &mut RawDataPage, config: &Config) {
    ui.heading("RAW DATA");

    if let Some(error) = page.error.clone() {
        if error_banner(ui, &error) {
            page.retry();
        }
        return;
    }
    if page.dataset.is_none() {
        ui.centered_and_justified(|ui: &mut Ui| {
            ui.heading("Loading sales…");
        });
        return;
    }

    column_picker(ui, &mut page.controls.columns);

    let Some(view) = page.view().cloned() else {
        return;
    };
    let Some(dataset) = page.dataset.as_ref() else {
        return;
    };

    ui.push_id("raw_rows", |ui: &mut Ui| {
        let height = (ui.available_height() - 120.0).max(120.0);
        TableBuilder::new(ui)
            .striped(true)
            .resizable(true)
            .max_scroll_height(height)
            .columns(TableColumn::auto().at_least(60.0), view.columns.len())
            .header(20.0, |mut header| {
                for column in &view.columns {
                    header.col(|ui: &mut Ui| {
                        ui.strong(column.header());
                    });
                }
            })
            .body(|body| {
                body.rows(18.0, view.rows.len(), |mut row| {
                    let record = &dataset.records()[view.rows[row.index()]];
                    for &column in &view.columns {
                        row.col(|ui: &mut Ui| {
                            ui.label(record.cell(column).to_string());
                        });
                    }
                });
            });
    });

    ui.separator();
    ui.label(view.summary());
    ui.label("Write a name for the file");

    ui.horizontal(|ui: &mut Ui| {
        ui.text_edit_singleline(&mut page.controls.file_stem);
        if ui.button("Download the table as CSV").clicked() {
            download(page, config);
        }
    });

    if let Some(message) = &page.export_error {
        ui.colored_label(Color32::RED, message);
    }

    if let Some(remaining) = page.tick_notification(Instant::now()) {
        if let Some(note) = &page.notification {
            ui.label(RichText::new(format!("✅ {}", note.message)).color(Color32::DARK_GREEN));
        }
        ui.ctx().request_repaint_after(remaining);
    }
}

/// Collapsible column multi-select. Keeps display order regardless of click order.
fn column_picker(ui: &mut Ui, selected: &mut Vec<Column>) {
    egui::CollapsingHeader::new(RichText::new("Columns").strong())
        .id_salt("columns")
        .show(ui, |ui: &mut Ui| {
            ui.horizontal_wrapped(|ui: &mut Ui| {
                for column in Column::ALL {
                    let mut checked = selected.contains(&column);
                    if ui.checkbox(&mut checked, column.header()).changed() {
                        if checked {
                            selected.push(column);
                            selected.sort();
                        } else {
                            selected.retain(|c| *c != column);
                        }
                    }
                }
            });
        });
}

fn download(page: &mut RawDataPage, config: &Config) {
    let file = rfd::FileDialog::new()
        .set_title("Save table")
        .set_file_name(page.file_name(config))
        .add_filter("CSV", &["csv"])
        .save_file();

    let Some(path) = file else {
        return;
    };
    let path = ensure_csv_extension(path);
    if let Err(e) = page.export_to(&path, config.notification_ttl()) {
        let e = anyhow::Error::new(e);
        log::error!("Failed to export {}: {e:#}", path.display());
        page.export_error = Some(format!("Could not save {}: {e:#}", path.display()));
    }
}
