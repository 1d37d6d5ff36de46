use std::collections::BTreeMap;

use chrono::{Datelike, Month};

use super::model::{Dataset, SaleRecord};

// ---------------------------------------------------------------------------
// Shared accumulator
// ---------------------------------------------------------------------------

/// Sum of price and number of rows for one group.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct Totals {
    pub revenue: f64,
    pub count: usize,
}

impl Totals {
    fn add(&mut self, record: &SaleRecord) {
        self.revenue += record.price;
        self.count += 1;
    }
}

/// Which aggregate a ranking is ordered by.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Metric {
    Revenue,
    Count,
}

impl Metric {
    pub fn of(self, totals: &Totals) -> f64 {
        match self {
            Metric::Revenue => totals.revenue,
            Metric::Count => totals.count as f64,
        }
    }
}

/// Group rows by `key`. Groups come out in ascending key order.
fn group_by<K, F>(dataset: &Dataset, key: F) -> BTreeMap<K, Totals>
where
    K: Ord,
    F: Fn(&SaleRecord) -> K,
{
    let mut groups: BTreeMap<K, Totals> = BTreeMap::new();
    for record in dataset.records() {
        groups.entry(key(record)).or_default().add(record);
    }
    groups
}

/// Stable descending sort: equal values keep their group order.
fn rank_desc<T>(rows: &mut [T], metric: Metric, totals: impl Fn(&T) -> &Totals) {
    rows.sort_by(|a, b| metric.of(totals(b)).total_cmp(&metric.of(totals(a))));
}

// ---------------------------------------------------------------------------
// By location
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq)]
pub struct LocationSummary {
    pub location: String,
    /// First coordinate pair seen for this location.
    pub lat: f64,
    pub lon: f64,
    pub totals: Totals,
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct LocationView {
    pub by_revenue: Vec<LocationSummary>,
    pub by_count: Vec<LocationSummary>,
}

pub fn by_location(dataset: &Dataset) -> LocationView {
    let mut groups: BTreeMap<&str, LocationSummary> = BTreeMap::new();
    for record in dataset.records() {
        groups
            .entry(record.location.as_str())
            .or_insert_with(|| LocationSummary {
                location: record.location.clone(),
                lat: record.lat,
                lon: record.lon,
                totals: Totals::default(),
            })
            .totals
            .add(record);
    }

    let rows: Vec<LocationSummary> = groups.into_values().collect();
    let mut by_revenue = rows.clone();
    rank_desc(&mut by_revenue, Metric::Revenue, |r| &r.totals);
    let mut by_count = rows;
    rank_desc(&mut by_count, Metric::Count, |r| &r.totals);

    LocationView { by_revenue, by_count }
}

// ---------------------------------------------------------------------------
// By month
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq)]
pub struct MonthlySummary {
    pub year: i32,
    /// 1-based calendar month.
    pub month: u32,
    pub month_name: &'static str,
    pub totals: Totals,
}

/// Revenue and sales count per calendar month, in chronological order.
///
/// Every month between the first and last sale is present; months without
/// sales carry zero totals.
pub fn by_month(dataset: &Dataset) -> Vec<MonthlySummary> {
    let groups = group_by(dataset, |r| (r.purchase_date.year(), r.purchase_date.month()));
    let (Some(&first), Some(&last)) = (groups.keys().next(), groups.keys().next_back()) else {
        return Vec::new();
    };

    let mut rows = Vec::new();
    let (mut year, mut month) = first;
    while (year, month) <= last {
        rows.push(MonthlySummary {
            year,
            month,
            month_name: month_name(month),
            totals: groups.get(&(year, month)).copied().unwrap_or_default(),
        });
        if month == 12 {
            year += 1;
            month = 1;
        } else {
            month += 1;
        }
    }
    rows
}

fn month_name(month: u32) -> &'static str {
    u8::try_from(month)
        .ok()
        .and_then(|m| Month::try_from(m).ok())
        .map_or("", |m| m.name())
}

// ---------------------------------------------------------------------------
// By category
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq)]
pub struct CategorySummary {
    pub category: String,
    pub totals: Totals,
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct CategoryView {
    pub by_revenue: Vec<CategorySummary>,
    pub by_count: Vec<CategorySummary>,
}

pub fn by_category(dataset: &Dataset) -> CategoryView {
    let rows: Vec<CategorySummary> = group_by(dataset, |r| r.category.clone())
        .into_iter()
        .map(|(category, totals)| CategorySummary { category, totals })
        .collect();

    let mut by_revenue = rows.clone();
    rank_desc(&mut by_revenue, Metric::Revenue, |r| &r.totals);
    let mut by_count = rows;
    rank_desc(&mut by_count, Metric::Count, |r| &r.totals);

    CategoryView { by_revenue, by_count }
}

// ---------------------------------------------------------------------------
// By seller
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq)]
pub struct SellerSummary {
    pub seller: String,
    pub totals: Totals,
}

/// Per-seller totals in seller-name order.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct SellerTable {
    rows: Vec<SellerSummary>,
}

impl SellerTable {
    pub fn rows(&self) -> &[SellerSummary] {
        &self.rows
    }

    /// The `n` best sellers by `metric`, or all of them if there are fewer.
    pub fn top(&self, metric: Metric, n: usize) -> Vec<SellerSummary> {
        let mut ranked = self.rows.clone();
        rank_desc(&mut ranked, metric, |r| &r.totals);
        ranked.truncate(n);
        ranked
    }
}

pub fn by_seller(dataset: &Dataset) -> SellerTable {
    SellerTable {
        rows: group_by(dataset, |r| r.seller.clone())
            .into_iter()
            .map(|(seller, totals)| SellerSummary { seller, totals })
            .collect(),
    }
}
