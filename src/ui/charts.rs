use eframe::egui::{Color32, Ui};
use egui_plot::{Bar, BarChart, Legend, Line, LineStyle, Plot, PlotPoint, PlotPoints, Points, Text};

use crate::color::ColorMap;
use crate::present::chart::{BarChartSpec, GeoChartSpec, LineChartSpec, Orientation};
use crate::present::format::group_thousands;

const CHART_HEIGHT: f32 = 280.0;
const MAX_MARKER_RADIUS: f32 = 18.0;
const BAR_COLOR: Color32 = Color32::from_rgb(76, 114, 176);

const MONTH_ABBREV: [&str; 12] = [
    "Jan", "Feb", "Mar", "Apr", "May", "Jun", "Jul", "Aug", "Sep", "Oct", "Nov", "Dec",
];

/// Label for an integer tick that lands on one of `labels`, blank otherwise.
fn category_tick(value: f64, labels: &[String]) -> String {
    let rounded = value.round();
    if (value - rounded).abs() > 1e-6 || rounded < 0.0 {
        return String::new();
    }
    labels.get(rounded as usize).cloned().unwrap_or_default()
}

// ---------------------------------------------------------------------------
// Geographic scatter
// ---------------------------------------------------------------------------

/// Markers at each location's coordinates, area proportional to the metric.
pub fn geo_chart(ui: &mut Ui, id: &str, spec: &GeoChartSpec) {
    ui.strong(&spec.title);
    let colors = ColorMap::new(spec.points.iter().map(|p| p.label.as_str()));

    Plot::new(id)
        .height(CHART_HEIGHT)
        .data_aspect(1.0)
        .x_axis_label("lon")
        .y_axis_label("lat")
        .show(ui, |plot_ui| {
            for point in &spec.points {
                let radius = spec.radius(point.value, MAX_MARKER_RADIUS).max(2.0);
                plot_ui.points(
                    Points::new(PlotPoints::new(vec![[point.lon, point.lat]]))
                        .radius(radius)
                        .color(colors.color_for(&point.label).gamma_multiply(0.7))
                        .name(format!("{}: {}", point.label, group_thousands(point.value, 2))),
                );
                plot_ui.text(Text::new(PlotPoint::new(point.lon, point.lat), point.label.as_str()));
            }
        });
}

// ---------------------------------------------------------------------------
// Bar charts
// ---------------------------------------------------------------------------

pub fn bar_chart(ui: &mut Ui, id: &str, spec: &BarChartSpec) {
    ui.strong(&spec.title);

    let labels: Vec<String> = spec.bars.iter().map(|b| b.label.clone()).collect();
    let horizontal = spec.orientation == Orientation::Horizontal;
    let bars: Vec<Bar> = spec
        .bars
        .iter()
        .enumerate()
        .map(|(i, b)| {
            Bar::new(i as f64, b.value)
                .name(format!("{}: {}", b.label, group_thousands(b.value, 2)))
                .fill(BAR_COLOR)
                .width(0.7)
        })
        .collect();

    let mut chart = BarChart::new(bars).name(spec.value_label).color(BAR_COLOR);
    if horizontal {
        chart = chart.horizontal();
    }

    let mut plot = Plot::new(id).height(CHART_HEIGHT).allow_drag(false).allow_scroll(false);
    plot = if horizontal {
        plot.x_axis_label(spec.value_label)
            .y_axis_formatter(move |mark, _range| category_tick(mark.value, &labels))
            .include_x(0.0)
    } else {
        plot.y_axis_label(spec.value_label)
            .x_axis_formatter(move |mark, _range| category_tick(mark.value, &labels))
            .include_y(0.0)
    };

    plot.show(ui, |plot_ui| plot_ui.bar_chart(chart));
}

// ---------------------------------------------------------------------------
// Monthly line chart
// ---------------------------------------------------------------------------

/// One line per year over the twelve months.
pub fn line_chart(ui: &mut Ui, id: &str, spec: &LineChartSpec) {
    ui.strong(&spec.title);
    let colors = ColorMap::new(spec.series.iter().map(|s| s.name.as_str()));
    let styles = [
        LineStyle::Solid,
        LineStyle::dashed_loose(),
        LineStyle::dotted_loose(),
        LineStyle::dashed_dense(),
    ];

    Plot::new(id)
        .height(CHART_HEIGHT)
        .legend(Legend::default())
        .y_axis_label(spec.value_label)
        .include_y(0.0)
        .include_x(1.0)
        .include_x(12.0)
        .x_axis_formatter(|mark, _range| {
            let month = mark.value.round();
            if (mark.value - month).abs() > 1e-6 || !(1.0..=12.0).contains(&month) {
                return String::new();
            }
            MONTH_ABBREV[month as usize - 1].to_string()
        })
        .show(ui, |plot_ui| {
            for (i, series) in spec.series.iter().enumerate() {
                let color = colors.color_for(&series.name);
                plot_ui.line(
                    Line::new(PlotPoints::new(series.points.clone()))
                        .name(&series.name)
                        .color(color)
                        .style(styles[i % styles.len()])
                        .width(2.0),
                );
                plot_ui.points(
                    Points::new(PlotPoints::new(series.points.clone()))
                        .name(&series.name)
                        .color(color)
                        .radius(3.0),
                );
            }
        });
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn ticks_only_on_whole_indices() {
        let labels = vec!["SP".to_string(), "RJ".to_string()];
        assert_eq!(category_tick(0.0, &labels), "SP");
        assert_eq!(category_tick(1.0, &labels), "RJ");
        assert_eq!(category_tick(0.5, &labels), "");
        assert_eq!(category_tick(2.0, &labels), "");
        assert_eq!(category_tick(-1.0, &labels), "");
    }
}
