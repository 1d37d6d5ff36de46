use std::collections::BTreeSet;
use std::fmt;
use std::sync::atomic::{AtomicU64, Ordering};

use chrono::NaiveDate;

// ---------------------------------------------------------------------------
// SaleRecord – one row of the sales table
// ---------------------------------------------------------------------------

/// A single sale as returned by the products endpoint.
#[derive(Debug, Clone, PartialEq)]
pub struct SaleRecord {
    pub product: String,
    pub category: String,
    pub price: f64,
    pub freight: f64,
    pub purchase_date: NaiveDate,
    pub seller: String,
    /// Purchase location (state code).
    pub location: String,
    pub lat: f64,
    pub lon: f64,
    pub rating: Option<u8>,
    pub payment_type: Option<String>,
    pub installments: Option<u32>,
}

// ---------------------------------------------------------------------------
// Column – every displayable / exportable field
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Column {
    Product,
    Category,
    Price,
    Freight,
    PurchaseDate,
    Seller,
    Location,
    Rating,
    PaymentType,
    Installments,
    Lat,
    Lon,
}

impl Column {
    /// All columns in display order.
    pub const ALL: [Column; 12] = [
        Column::Product,
        Column::Category,
        Column::Price,
        Column::Freight,
        Column::PurchaseDate,
        Column::Seller,
        Column::Location,
        Column::Rating,
        Column::PaymentType,
        Column::Installments,
        Column::Lat,
        Column::Lon,
    ];

    /// Header used in tables and the CSV header row.
    pub fn header(self) -> &'static str {
        match self {
            Column::Product => "Product",
            Column::Category => "Product Category",
            Column::Price => "Price",
            Column::Freight => "Freight",
            Column::PurchaseDate => "Purchase Date",
            Column::Seller => "Seller",
            Column::Location => "Purchase Location",
            Column::Rating => "Purchase Rating",
            Column::PaymentType => "Payment Type",
            Column::Installments => "Installments",
            Column::Lat => "lat",
            Column::Lon => "lon",
        }
    }
}

impl fmt::Display for Column {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.header())
    }
}

// ---------------------------------------------------------------------------
// CellValue – a borrowed view of one cell
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum CellValue<'a> {
    Text(&'a str),
    Number(f64),
    Integer(i64),
    Date(NaiveDate),
    Empty,
}

impl fmt::Display for CellValue<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CellValue::Text(s) => write!(f, "{s}"),
            CellValue::Number(v) => write!(f, "{v}"),
            CellValue::Integer(i) => write!(f, "{i}"),
            CellValue::Date(d) => write!(f, "{}", d.format("%Y-%m-%d")),
            CellValue::Empty => Ok(()),
        }
    }
}

impl SaleRecord {
    pub fn cell(&self, column: Column) -> CellValue<'_> {
        match column {
            Column::Product => CellValue::Text(&self.product),
            Column::Category => CellValue::Text(&self.category),
            Column::Price => CellValue::Number(self.price),
            Column::Freight => CellValue::Number(self.freight),
            Column::PurchaseDate => CellValue::Date(self.purchase_date),
            Column::Seller => CellValue::Text(&self.seller),
            Column::Location => CellValue::Text(&self.location),
            Column::Rating => self
                .rating
                .map_or(CellValue::Empty, |r| CellValue::Integer(i64::from(r))),
            Column::PaymentType => self
                .payment_type
                .as_deref()
                .map_or(CellValue::Empty, CellValue::Text),
            Column::Installments => self
                .installments
                .map_or(CellValue::Empty, |n| CellValue::Integer(i64::from(n))),
            Column::Lat => CellValue::Number(self.lat),
            Column::Lon => CellValue::Number(self.lon),
        }
    }
}

// ---------------------------------------------------------------------------
// Dataset – the complete fetched table
// ---------------------------------------------------------------------------

/// Process-unique identity of a fetched dataset. Used as a cache key.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct DatasetId(u64);

impl DatasetId {
    fn next() -> Self {
        static NEXT: AtomicU64 = AtomicU64::new(1);
        DatasetId(NEXT.fetch_add(1, Ordering::Relaxed))
    }
}

/// An immutable, ordered collection of sales.
///
/// Filtering never mutates a dataset; it produces a new one via [`Dataset::subset`].
#[derive(Debug, Clone)]
pub struct Dataset {
    id: DatasetId,
    records: Vec<SaleRecord>,
}

impl Dataset {
    pub fn new(records: Vec<SaleRecord>) -> Self {
        Dataset {
            id: DatasetId::next(),
            records,
        }
    }

    pub fn id(&self) -> DatasetId {
        self.id
    }

    pub fn records(&self) -> &[SaleRecord] {
        &self.records
    }

    /// Number of sales.
    pub fn len(&self) -> usize {
        self.records.len()
    }

    /// Whether the dataset is empty.
    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    /// New dataset with the rows at `indices`, in the order given.
    pub fn subset(&self, indices: &[usize]) -> Dataset {
        Dataset::new(
            indices
                .iter()
                .filter_map(|&i| self.records.get(i).cloned())
                .collect(),
        )
    }

    /// Sorted unique values of a text column (used to populate multi-choice filters).
    pub fn unique_values(&self, column: Column) -> Vec<String> {
        let set: BTreeSet<String> = self
            .records
            .iter()
            .map(|r| r.cell(column))
            .filter(|c| !matches!(c, CellValue::Empty))
            .map(|c| c.to_string())
            .collect();
        set.into_iter().collect()
    }

    /// Earliest and latest purchase date, if any rows exist.
    pub fn date_bounds(&self) -> Option<(NaiveDate, NaiveDate)> {
        let min = self.records.iter().map(|r| r.purchase_date).min()?;
        let max = self.records.iter().map(|r| r.purchase_date).max()?;
        Some((min, max))
    }

    pub fn max_freight(&self) -> Option<f64> {
        self.records.iter().map(|r| r.freight).reduce(f64::max)
    }

    /// Sum of `price` over every row.
    pub fn total_revenue(&self) -> f64 {
        self.records.iter().map(|r| r.price).sum()
    }
}

#[cfg(test)]
pub(crate) mod fixtures {
    use super::*;

    /// Compact builder for test rows.
    pub fn sale(product: &str, category: &str, price: f64, date: &str, seller: &str, location: &str) -> SaleRecord {
        SaleRecord {
            product: product.to_string(),
            category: category.to_string(),
            price,
            freight: price / 20.0,
            purchase_date: NaiveDate::parse_from_str(date, "%Y-%m-%d").unwrap(),
            seller: seller.to_string(),
            location: location.to_string(),
            lat: -23.5,
            lon: -46.6,
            rating: Some(4),
            payment_type: Some("cartao_credito".to_string()),
            installments: Some(1),
        }
    }

    pub fn sample_dataset() -> Dataset {
        Dataset::new(vec![
            sale("Cama box", "moveis", 500.0, "2021-01-10", "Ana", "SP"),
            sale("Guitarra", "instrumentos musicais", 1200.0, "2021-01-22", "Bruno", "RJ"),
            sale("Celular ABXY", "eletronicos", 2500.0, "2021-02-03", "Ana", "SP"),
            sale("Jogo de panelas", "utilidades domesticas", 80.0, "2021-03-15", "Carla", "MG"),
            sale("Cama box", "moveis", 520.0, "2022-01-05", "Bruno", "RS"),
            sale("Bola de futebol", "esporte e lazer", 40.0, "2022-01-30", "Ana", "SP"),
            sale("Guitarra", "instrumentos musicais", 1100.0, "2022-06-18", "Daniel", "BA"),
        ])
    }
}

#[cfg(test)]
mod tests {
    use super::fixtures::*;
    use super::*;

    #[test]
    fn every_dataset_gets_a_fresh_id() {
        let a = Dataset::new(Vec::new());
        let b = Dataset::new(Vec::new());
        assert_ne!(a.id(), b.id());
    }

    #[test]
    fn subset_preserves_requested_order() {
        let ds = sample_dataset();
        let sub = ds.subset(&[2, 0]);
        assert_eq!(sub.len(), 2);
        assert_eq!(sub.records()[0], ds.records()[2]);
        assert_eq!(sub.records()[1], ds.records()[0]);
    }

    #[test]
    fn unique_values_are_sorted_and_deduplicated() {
        let ds = sample_dataset();
        assert_eq!(ds.unique_values(Column::Seller), vec!["Ana", "Bruno", "Carla", "Daniel"]);
    }

    #[test]
    fn bounds_on_empty_dataset_are_none() {
        let ds = Dataset::new(Vec::new());
        assert!(ds.date_bounds().is_none());
        assert!(ds.max_freight().is_none());
        assert_eq!(ds.total_revenue(), 0.0);
    }

    #[test]
    fn cells_render_like_the_export() {
        let r = sale("Cama box", "moveis", 500.5, "2021-01-10", "Ana", "SP");
        assert_eq!(r.cell(Column::Price).to_string(), "500.5");
        assert_eq!(r.cell(Column::PurchaseDate).to_string(), "2021-01-10");
        assert_eq!(r.cell(Column::Rating).to_string(), "4");
    }
}
