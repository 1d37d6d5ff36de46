use std::ops::RangeInclusive;

use chrono::NaiveDate;

use crate::config::{DashboardConfig, RawDataConfig, TOP_SELLERS_RANGE};
use crate::data::aggregate::{self, CategorySummary, Metric};
use crate::data::filter::{self, FilterCriteria, Selection};
use crate::data::model::{Column, Dataset};
use crate::data::regions::Region;
use crate::data::source::SalesQuery;
use crate::present::chart::{self, BarChartSpec, GeoChartSpec, LineChartSpec};
use crate::present::format::format_magnitude;

// ---------------------------------------------------------------------------
// Dashboard page: fetch → filter → aggregate → present
// ---------------------------------------------------------------------------

/// Everything the dashboard sidebar and tabs let the user choose.
#[derive(Debug, Clone, PartialEq)]
pub struct DashboardControls {
    pub region: Region,
    /// "Whole period" toggle. When set, `year` is ignored.
    pub all_years: bool,
    pub year: i32,
    pub sellers: Selection,
    pub top_sellers: usize,
}

impl DashboardControls {
    pub fn new(config: &DashboardConfig) -> Self {
        Self {
            region: Region::Brazil,
            all_years: true,
            year: config.first_year,
            sellers: Selection::Any,
            top_sellers: config.default_top_sellers,
        }
    }

    /// Server-side part of the selection.
    pub fn query(&self) -> SalesQuery {
        SalesQuery {
            region: self.region,
            year: (!self.all_years).then_some(self.year),
        }
    }

    /// Client-side part of the selection.
    pub fn criteria(&self) -> FilterCriteria {
        FilterCriteria {
            sellers: self.sellers.clone(),
            ..Default::default()
        }
    }
}

/// Render-ready output of one dashboard run.
#[derive(Debug, Clone)]
pub struct DashboardView {
    pub revenue_kpi: String,
    pub count_kpi: String,
    pub rows: Dataset,

    pub revenue_map: GeoChartSpec,
    pub revenue_top_locations: BarChartSpec,
    pub revenue_monthly: LineChartSpec,
    pub revenue_categories: BarChartSpec,
    pub category_counts: Vec<CategorySummary>,

    pub count_map: GeoChartSpec,
    pub count_top_locations: BarChartSpec,
    pub count_monthly: LineChartSpec,
    pub count_categories: BarChartSpec,

    pub top_sellers_revenue: BarChartSpec,
    pub top_sellers_count: BarChartSpec,
}

pub fn dashboard_view(dataset: &Dataset, controls: &DashboardControls, config: &DashboardConfig) -> DashboardView {
    let rows = filter::apply(dataset, &controls.criteria());

    let locations = aggregate::by_location(&rows);
    let months = aggregate::by_month(&rows);
    let categories = aggregate::by_category(&rows);
    let sellers = aggregate::by_seller(&rows);
    let n = controls
        .top_sellers
        .clamp(*TOP_SELLERS_RANGE.start(), *TOP_SELLERS_RANGE.end());

    DashboardView {
        revenue_kpi: format_magnitude(rows.total_revenue(), "R$"),
        count_kpi: format_magnitude(rows.len() as f64, ""),

        revenue_map: chart::geo_chart("Revenue by state", &locations.by_revenue, Metric::Revenue),
        revenue_top_locations: chart::location_bars(
            "Top states (revenue)",
            &locations.by_revenue,
            Metric::Revenue,
            config.top_locations,
        ),
        revenue_monthly: chart::monthly_lines("Monthly revenue", &months, Metric::Revenue),
        revenue_categories: chart::category_bars("Revenue by category", &categories.by_revenue, Metric::Revenue),

        count_map: chart::geo_chart("Sales by state", &locations.by_count, Metric::Count),
        count_top_locations: chart::location_bars(
            "Top states (sales)",
            &locations.by_count,
            Metric::Count,
            config.top_locations,
        ),
        count_monthly: chart::monthly_lines("Monthly sales", &months, Metric::Count),
        count_categories: chart::category_bars("Sales by category", &categories.by_count, Metric::Count),

        top_sellers_revenue: chart::seller_bars(
            &format!("Top {n} sellers (revenue)"),
            &sellers.top(Metric::Revenue, n),
            Metric::Revenue,
        ),
        top_sellers_count: chart::seller_bars(
            &format!("Top {n} sellers (sales)"),
            &sellers.top(Metric::Count, n),
            Metric::Count,
        ),

        category_counts: categories.by_count,
        rows,
    }
}

// ---------------------------------------------------------------------------
// Raw-data page: fetch → filter → table / export
// ---------------------------------------------------------------------------

/// Column picker and filters of the raw-data page.
#[derive(Debug, Clone, PartialEq)]
pub struct RawDataControls {
    pub columns: Vec<Column>,
    pub products: Selection,
    pub categories: Selection,
    pub sellers: Selection,
    pub locations: Selection,
    pub price: (f64, f64),
    pub freight: (f64, f64),
    pub dates: Option<(NaiveDate, NaiveDate)>,
    pub file_stem: String,
}

impl RawDataControls {
    pub fn new(config: &RawDataConfig) -> Self {
        Self {
            columns: Column::ALL.to_vec(),
            products: Selection::Any,
            categories: Selection::Any,
            sellers: Selection::Any,
            locations: Selection::Any,
            price: (0.0, config.price_max),
            freight: (0.0, 0.0),
            dates: None,
            file_stem: config.default_file_name.clone(),
        }
    }

    /// Slider limits for a freshly loaded dataset. The default slider
    /// positions cover every row.
    pub fn bounds(dataset: &Dataset, config: &RawDataConfig) -> RawDataBounds {
        let price_max = dataset
            .records()
            .iter()
            .map(|r| r.price.ceil())
            .fold(config.price_max, f64::max);
        RawDataBounds {
            price: 0.0..=price_max,
            freight: 0.0..=dataset.max_freight().unwrap_or(0.0).ceil(),
            dates: dataset.date_bounds(),
        }
    }

    /// Reset every range to its full extent.
    pub fn reset_ranges(&mut self, bounds: &RawDataBounds) {
        self.price = (*bounds.price.start(), *bounds.price.end());
        self.freight = (*bounds.freight.start(), *bounds.freight.end());
        self.dates = bounds.dates;
    }

    pub fn criteria(&self) -> FilterCriteria {
        FilterCriteria {
            products: self.products.clone(),
            categories: self.categories.clone(),
            sellers: self.sellers.clone(),
            locations: self.locations.clone(),
            price: Some(self.price.0..=self.price.1),
            freight: Some(self.freight.0..=self.freight.1),
            purchase_date: self.dates.map(|(start, end)| start..=end),
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct RawDataBounds {
    pub price: RangeInclusive<f64>,
    pub freight: RangeInclusive<f64>,
    pub dates: Option<(NaiveDate, NaiveDate)>,
}

/// Rows and columns that survive the raw-data filters.
#[derive(Debug, Clone, PartialEq)]
pub struct RawDataView {
    /// Indices into the fetched dataset.
    pub rows: Vec<usize>,
    /// Selected columns in display order.
    pub columns: Vec<Column>,
}

impl RawDataView {
    pub fn summary(&self) -> String {
        format!(
            "The table has {} rows and {} columns",
            self.rows.len(),
            self.columns.len()
        )
    }
}

pub fn raw_data_view(dataset: &Dataset, controls: &RawDataControls) -> RawDataView {
    let columns = Column::ALL
        .iter()
        .copied()
        .filter(|c| controls.columns.contains(c))
        .collect();
    RawDataView {
        rows: filter::filtered_indices(dataset, &controls.criteria()),
        columns,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::Config;
    use crate::data::model::fixtures::sample_dataset;

    #[test]
    fn dashboard_kpis_and_charts() {
        let config = Config::default();
        let controls = DashboardControls::new(&config.dashboard);
        let view = dashboard_view(&sample_dataset(), &controls, &config.dashboard);

        assert_eq!(view.revenue_kpi, "R$ 5.94 thousand");
        assert_eq!(view.count_kpi, " 7.00 ");
        assert_eq!(view.rows.len(), 7);
        assert_eq!(view.revenue_top_locations.bars.len(), 5);
        assert_eq!(view.top_sellers_revenue.bars.len(), 4);
        assert_eq!(view.top_sellers_count.title, "Top 5 sellers (sales)");
        assert_eq!(view.revenue_monthly.series.len(), 2);
    }

    #[test]
    fn seller_filter_narrows_every_table() {
        let config = Config::default();
        let mut controls = DashboardControls::new(&config.dashboard);
        controls.sellers = Selection::only(["Ana"]);
        let view = dashboard_view(&sample_dataset(), &controls, &config.dashboard);

        assert_eq!(view.rows.len(), 3);
        assert_eq!(view.revenue_map.points.len(), 1);
        assert_eq!(view.top_sellers_count.bars.len(), 1);
    }

    #[test]
    fn deselecting_every_seller_degrades_gracefully() {
        let config = Config::default();
        let mut controls = DashboardControls::new(&config.dashboard);
        controls.sellers = Selection::none();
        let view = dashboard_view(&sample_dataset(), &controls, &config.dashboard);

        assert!(view.rows.is_empty());
        assert_eq!(view.revenue_kpi, "R$ 0.00 ");
        assert!(view.revenue_map.points.is_empty());
        assert!(view.count_monthly.series.is_empty());
        assert!(view.top_sellers_revenue.bars.is_empty());
    }

    #[test]
    fn query_uses_sentinels() {
        let config = Config::default();
        let mut controls = DashboardControls::new(&config.dashboard);
        assert_eq!(controls.query(), SalesQuery::default());

        controls.all_years = false;
        controls.year = 2022;
        controls.region = Region::South;
        assert_eq!(controls.query().year, Some(2022));
        assert_eq!(controls.query().region, Region::South);
    }

    #[test]
    fn raw_data_defaults_keep_every_row() {
        let config = Config::default();
        let ds = sample_dataset();
        let mut controls = RawDataControls::new(&config.raw_data);
        controls.reset_ranges(&RawDataControls::bounds(&ds, &config.raw_data));

        let view = raw_data_view(&ds, &controls);
        assert_eq!(view.rows.len(), ds.len());
        assert_eq!(view.summary(), "The table has 7 rows and 12 columns");
    }

    #[test]
    fn raw_data_columns_follow_display_order() {
        let config = Config::default();
        let ds = sample_dataset();
        let mut controls = RawDataControls::new(&config.raw_data);
        controls.reset_ranges(&RawDataControls::bounds(&ds, &config.raw_data));
        controls.columns = vec![Column::Seller, Column::Product];
        controls.price = (1000.0, 5000.0);

        let view = raw_data_view(&ds, &controls);
        assert_eq!(view.columns, vec![Column::Product, Column::Seller]);
        assert_eq!(view.rows, vec![1, 2, 6]);
    }

    #[test]
    fn price_bound_stretches_to_the_data() {
        let config = Config::default();
        let mut records = sample_dataset().records().to_vec();
        records[0].price = 7250.4;
        let bounds = RawDataControls::bounds(&Dataset::new(records), &config.raw_data);
        assert_eq!(*bounds.price.end(), 7251.0);
        assert_eq!(*bounds.freight.end(), 125.0);
    }
}
