use eframe::egui::{self, ScrollArea, Ui};
use egui_extras::{Column as TableColumn, TableBuilder};

use crate::config::{Config, TOP_SELLERS_RANGE};
use crate::data::aggregate::CategorySummary;
use crate::data::model::{Column, Dataset};
use crate::state::{DashboardPage, DashboardTab};
use crate::ui::charts;
use crate::ui::panels::error_banner;

// ---------------------------------------------------------------------------
// Dashboard (central panel)
// ---------------------------------------------------------------------------

pub fn dashboard(ui: &mut Ui, page: &mut DashboardPage, config: &Config) {
    ui.heading("SALES DASHBOARD 🛒");

    if let Some(error) = page.error.clone() {
        if error_banner(ui, &error) {
            page.retry();
        }
        return;
    }

    ui.horizontal(|ui: &mut Ui| {
        ui.selectable_value(&mut page.tab, DashboardTab::Revenue, "Revenue");
        ui.selectable_value(&mut page.tab, DashboardTab::SalesCount, "Sales count");
        ui.selectable_value(&mut page.tab, DashboardTab::Sellers, "Sellers");
    });
    ui.separator();

    if page.tab == DashboardTab::Sellers {
        ui.horizontal(|ui: &mut Ui| {
            ui.label("Number of sellers");
            ui.add(egui::DragValue::new(&mut page.controls.top_sellers).range(TOP_SELLERS_RANGE));
        });
    }

    let tab = page.tab;
    let Some(view) = page.view(&config.dashboard) else {
        ui.centered_and_justified(|ui: &mut Ui| {
            ui.heading("Loading sales…");
        });
        return;
    };

    ScrollArea::vertical()
        .auto_shrink([false, false])
        .show(ui, |ui: &mut Ui| match tab {
            DashboardTab::Revenue => {
                ui.columns(2, |cols: &mut [Ui]| {
                    cols[0].label("Revenue");
                    cols[0].heading(&view.revenue_kpi);
                    charts::geo_chart(&mut cols[0], "revenue_map", &view.revenue_map);
                    charts::bar_chart(&mut cols[0], "revenue_locations", &view.revenue_top_locations);

                    cols[1].label("Sales count");
                    cols[1].heading(&view.count_kpi);
                    charts::line_chart(&mut cols[1], "revenue_monthly", &view.revenue_monthly);
                    charts::bar_chart(&mut cols[1], "revenue_categories", &view.revenue_categories);
                });
                ui.separator();
                sales_table(ui, &view.rows);
                ui.separator();
                category_count_table(ui, &view.category_counts);
            }
            DashboardTab::SalesCount => {
                ui.columns(2, |cols: &mut [Ui]| {
                    cols[0].label("Revenue");
                    cols[0].heading(&view.revenue_kpi);
                    charts::geo_chart(&mut cols[0], "count_map", &view.count_map);
                    charts::bar_chart(&mut cols[0], "count_locations", &view.count_top_locations);

                    cols[1].label("Sales count");
                    cols[1].heading(&view.count_kpi);
                    charts::line_chart(&mut cols[1], "count_monthly", &view.count_monthly);
                    charts::bar_chart(&mut cols[1], "count_categories", &view.count_categories);
                });
            }
            DashboardTab::Sellers => {
                ui.columns(2, |cols: &mut [Ui]| {
                    cols[0].label("Revenue");
                    cols[0].heading(&view.revenue_kpi);
                    charts::bar_chart(&mut cols[0], "sellers_revenue", &view.top_sellers_revenue);

                    cols[1].label("Sales count");
                    cols[1].heading(&view.count_kpi);
                    charts::bar_chart(&mut cols[1], "sellers_count", &view.top_sellers_count);
                });
            }
        });
}

fn sales_table(ui: &mut Ui, rows: &Dataset) {
    ui.push_id("dashboard_rows", |ui: &mut Ui| {
        TableBuilder::new(ui)
            .striped(true)
            .resizable(true)
            .max_scroll_height(300.0)
            .columns(TableColumn::auto().at_least(60.0), Column::ALL.len())
            .header(20.0, |mut header| {
                for column in Column::ALL {
                    header.col(|ui: &mut Ui| {
                        ui.strong(column.header());
                    });
                }
            })
            .body(|body| {
                body.rows(18.0, rows.len(), |mut row| {
                    let record = &rows.records()[row.index()];
                    for column in Column::ALL {
                        row.col(|ui: &mut Ui| {
                            ui.label(record.cell(column).to_string());
                        });
                    }
                });
            });
    });
}

fn category_count_table(ui: &mut Ui, rows: &[CategorySummary]) {
    egui::Grid::new("category_counts").striped(true).show(ui, |ui: &mut Ui| {
        ui.strong(Column::Category.header());
        ui.strong("count");
        ui.end_row();
        for row in rows {
            ui.label(&row.category);
            ui.label(row.totals.count.to_string());
            ui.end_row();
        }
    });
}
