use std::collections::BTreeMap;

use crate::data::aggregate::{CategorySummary, LocationSummary, Metric, MonthlySummary, SellerSummary};

// ---------------------------------------------------------------------------
// Chart specifications – plain data handed to the renderer
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Orientation {
    Vertical,
    Horizontal,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Bar {
    pub label: String,
    pub value: f64,
}

#[derive(Debug, Clone, PartialEq)]
pub struct BarChartSpec {
    pub title: String,
    pub value_label: &'static str,
    pub orientation: Orientation,
    /// In display order (first bar is the largest).
    pub bars: Vec<Bar>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Series {
    pub name: String,
    /// `[month, value]` with month in 1..=12.
    pub points: Vec<[f64; 2]>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct LineChartSpec {
    pub title: String,
    pub value_label: &'static str,
    /// One series per year, oldest first.
    pub series: Vec<Series>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct GeoPoint {
    pub label: String,
    pub lat: f64,
    pub lon: f64,
    pub value: f64,
}

#[derive(Debug, Clone, PartialEq)]
pub struct GeoChartSpec {
    pub title: String,
    pub value_label: &'static str,
    pub points: Vec<GeoPoint>,
}

impl GeoChartSpec {
    /// Largest value on the map, used to scale marker sizes.
    pub fn max_value(&self) -> f64 {
        self.points.iter().map(|p| p.value).fold(0.0, f64::max)
    }

    /// Marker radius so that marker *area* is proportional to `value`.
    pub fn radius(&self, value: f64, max_radius: f32) -> f32 {
        let max = self.max_value();
        if max <= 0.0 || value <= 0.0 {
            return 0.0;
        }
        ((value / max).sqrt() as f32) * max_radius
    }
}

pub fn value_label(metric: Metric) -> &'static str {
    match metric {
        Metric::Revenue => "Revenue",
        Metric::Count => "Sales",
    }
}

// ---------------------------------------------------------------------------
// Builders
// ---------------------------------------------------------------------------

pub fn geo_chart(title: &str, rows: &[LocationSummary], metric: Metric) -> GeoChartSpec {
    GeoChartSpec {
        title: title.to_string(),
        value_label: value_label(metric),
        points: rows
            .iter()
            .map(|r| GeoPoint {
                label: r.location.clone(),
                lat: r.lat,
                lon: r.lon,
                value: metric.of(&r.totals),
            })
            .collect(),
    }
}

/// First `n` locations of an already-ranked table.
pub fn location_bars(title: &str, rows: &[LocationSummary], metric: Metric, n: usize) -> BarChartSpec {
    BarChartSpec {
        title: title.to_string(),
        value_label: value_label(metric),
        orientation: Orientation::Vertical,
        bars: rows
            .iter()
            .take(n)
            .map(|r| Bar {
                label: r.location.clone(),
                value: metric.of(&r.totals),
            })
            .collect(),
    }
}

pub fn monthly_lines(title: &str, rows: &[MonthlySummary], metric: Metric) -> LineChartSpec {
    let mut by_year: BTreeMap<i32, Vec<[f64; 2]>> = BTreeMap::new();
    for row in rows {
        by_year
            .entry(row.year)
            .or_default()
            .push([f64::from(row.month), metric.of(&row.totals)]);
    }
    LineChartSpec {
        title: title.to_string(),
        value_label: value_label(metric),
        series: by_year
            .into_iter()
            .map(|(year, points)| Series {
                name: year.to_string(),
                points,
            })
            .collect(),
    }
}

pub fn category_bars(title: &str, rows: &[CategorySummary], metric: Metric) -> BarChartSpec {
    BarChartSpec {
        title: title.to_string(),
        value_label: value_label(metric),
        orientation: Orientation::Vertical,
        bars: rows
            .iter()
            .map(|r| Bar {
                label: r.category.clone(),
                value: metric.of(&r.totals),
            })
            .collect(),
    }
}

pub fn seller_bars(title: &str, rows: &[SellerSummary], metric: Metric) -> BarChartSpec {
    BarChartSpec {
        title: title.to_string(),
        value_label: value_label(metric),
        orientation: Orientation::Horizontal,
        bars: rows
            .iter()
            .map(|r| Bar {
                label: r.seller.clone(),
                value: metric.of(&r.totals),
            })
            .collect(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::aggregate::{by_location, by_month};
    use crate::data::model::fixtures::sample_dataset;

    #[test]
    fn monthly_series_split_by_year() {
        let spec = monthly_lines("Monthly revenue", &by_month(&sample_dataset()), Metric::Revenue);
        let names: Vec<&str> = spec.series.iter().map(|s| s.name.as_str()).collect();
        assert_eq!(names, vec!["2021", "2022"]);
        assert_eq!(spec.series[0].points.len(), 12);
        assert_eq!(spec.series[0].points[..4], [[1.0, 1700.0], [2.0, 2500.0], [3.0, 80.0], [4.0, 0.0]]);
        assert_eq!(
            spec.series[1].points,
            vec![[1.0, 560.0], [2.0, 0.0], [3.0, 0.0], [4.0, 0.0], [5.0, 0.0], [6.0, 1100.0]]
        );
    }

    #[test]
    fn location_bars_take_the_head() {
        let view = by_location(&sample_dataset());
        let spec = location_bars("Top locations", &view.by_count, Metric::Count, 2);
        assert_eq!(spec.bars.len(), 2);
        assert_eq!(spec.bars[0], Bar { label: "SP".into(), value: 3.0 });
        assert_eq!(spec.value_label, "Sales");
    }

    #[test]
    fn marker_area_tracks_value() {
        let view = by_location(&sample_dataset());
        let spec = geo_chart("Revenue by state", &view.by_revenue, Metric::Revenue);
        assert_eq!(spec.max_value(), 3040.0);
        assert_eq!(spec.radius(3040.0, 20.0), 20.0);
        assert!((spec.radius(760.0, 20.0) - 10.0).abs() < 1e-4);
        assert_eq!(spec.radius(0.0, 20.0), 0.0);
    }

    #[test]
    fn empty_geo_chart_has_no_radius() {
        let spec = geo_chart("empty", &[], Metric::Count);
        assert_eq!(spec.radius(1.0, 10.0), 0.0);
    }
}
