use std::path::{Path, PathBuf};
use std::time::{Duration, Instant};

use chrono::{Datelike, NaiveDate};
use reqwest::blocking::{Client, ClientBuilder, RequestBuilder};
use reqwest::StatusCode;
use serde::Deserialize;
use serde_json::Value as JsonValue;

use super::error::{FetchError, LoadError, ParseError};
use super::model::{Dataset, SaleRecord};
use super::regions::Region;

/// Purchase dates arrive as `DD/MM/YYYY`.
pub const DATE_FORMAT: &str = "%d/%m/%Y";

static USER_AGENT: &str = concat!(env!("CARGO_PKG_NAME"), "/", env!("CARGO_PKG_VERSION"));

// ---------------------------------------------------------------------------
// Query – the server-side filter
// ---------------------------------------------------------------------------

/// Parameters sent with the fetch. The default query returns everything.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct SalesQuery {
    pub region: Region,
    /// `None` means the whole period.
    pub year: Option<i32>,
}

impl SalesQuery {
    /// Query string pairs: `regiao=<lowercased region or empty>&ano=<year or empty>`.
    pub fn params(&self) -> [(&'static str, String); 2] {
        [
            ("regiao", self.region.query_value()),
            ("ano", self.year.map(|y| y.to_string()).unwrap_or_default()),
        ]
    }

    /// Whether a record falls inside this query. Mirrors the endpoint's own filter.
    pub fn matches(&self, record: &SaleRecord) -> bool {
        self.region.contains(&record.location)
            && self.year.map_or(true, |y| record.purchase_date.year() == y)
    }
}

// ---------------------------------------------------------------------------
// Sources
// ---------------------------------------------------------------------------

/// Somewhere a sales dataset can be loaded from.
pub trait SalesSource {
    fn fetch(&self, query: &SalesQuery) -> Result<Dataset, LoadError>;

    /// Short description for the status bar.
    fn describe(&self) -> String;
}

/// Fetches the dataset from the products endpoint over HTTP.
pub struct HttpSource {
    client: Client,
    url: String,
}

impl HttpSource {
    pub fn new(url: impl Into<String>, timeout: Duration) -> Result<Self, FetchError> {
        let client = ClientBuilder::new()
            .user_agent(USER_AGENT)
            .timeout(timeout)
            .build()?;
        Ok(Self {
            client,
            url: url.into(),
        })
    }

    fn request(&self, query: &SalesQuery) -> RequestBuilder {
        self.client.get(&self.url).query(&query.params())
    }
}

/// Anything outside 2xx is a fetch failure carrying the status and URL.
fn check_status(status: StatusCode, url: &str) -> Result<(), FetchError> {
    if status.is_success() {
        return Ok(());
    }
    log::error!("GET {url} returned {status}");
    Err(FetchError::Status {
        status: status.as_u16(),
        url: url.to_string(),
    })
}

impl SalesSource for HttpSource {
    fn fetch(&self, query: &SalesQuery) -> Result<Dataset, LoadError> {
        let started = Instant::now();
        let response = self.request(query).send().map_err(FetchError::from)?;
        check_status(response.status(), response.url().as_str())?;

        let body = response.text().map_err(FetchError::from)?;
        let dataset = parse_dataset(&body)?;
        log::info!(
            "Fetched {} sales from {} ({:?}) in {:?}",
            dataset.len(),
            self.url,
            query,
            started.elapsed()
        );
        Ok(dataset)
    }

    fn describe(&self) -> String {
        self.url.clone()
    }
}

/// Reads a JSON file in the endpoint's schema and applies the query locally.
pub struct FileSource {
    path: PathBuf,
}

impl FileSource {
    pub fn new(path: impl AsRef<Path>) -> Self {
        Self {
            path: path.as_ref().to_path_buf(),
        }
    }
}

impl SalesSource for FileSource {
    fn fetch(&self, query: &SalesQuery) -> Result<Dataset, LoadError> {
        let text = std::fs::read_to_string(&self.path).map_err(|source| FetchError::File {
            path: self.path.display().to_string(),
            source,
        })?;
        let all = parse_dataset(&text)?;
        let records: Vec<SaleRecord> = all
            .records()
            .iter()
            .filter(|r| query.matches(r))
            .cloned()
            .collect();
        log::info!(
            "Loaded {} of {} sales from {} ({:?})",
            records.len(),
            all.len(),
            self.path.display(),
            query
        );
        Ok(Dataset::new(records))
    }

    fn describe(&self) -> String {
        self.path.display().to_string()
    }
}

// ---------------------------------------------------------------------------
// JSON parsing
// ---------------------------------------------------------------------------

/// Wire shape of one sale. Field names are fixed by the endpoint.
#[derive(Debug, Deserialize)]
struct WireSale {
    #[serde(rename = "Produto")]
    product: String,
    #[serde(rename = "Categoria do Produto")]
    category: String,
    #[serde(rename = "Preço")]
    price: f64,
    #[serde(rename = "Frete")]
    freight: f64,
    #[serde(rename = "Data da Compra")]
    purchase_date: String,
    #[serde(rename = "Vendedor")]
    seller: String,
    #[serde(rename = "Local da compra")]
    location: String,
    lat: f64,
    lon: f64,
    #[serde(rename = "Avaliação da compra")]
    rating: Option<u8>,
    #[serde(rename = "Tipo de pagamento")]
    payment_type: Option<String>,
    #[serde(rename = "Quantidade de parcelas")]
    installments: Option<u32>,
}

/// Parse the endpoint's JSON array into a [`Dataset`].
///
/// Fails on the first bad row; no row is ever skipped.
pub fn parse_dataset(text: &str) -> Result<Dataset, ParseError> {
    let root: JsonValue = serde_json::from_str(text)?;
    let JsonValue::Array(rows) = root else {
        return Err(ParseError::NotAnArray);
    };

    let mut records = Vec::with_capacity(rows.len());
    for (row, value) in rows.into_iter().enumerate() {
        let wire: WireSale = serde_json::from_value(value).map_err(|e| ParseError::Record {
            row,
            message: e.to_string(),
        })?;
        let purchase_date = NaiveDate::parse_from_str(wire.purchase_date.trim(), DATE_FORMAT)
            .map_err(|_| ParseError::Date {
                row,
                value: wire.purchase_date.clone(),
            })?;

        records.push(SaleRecord {
            product: wire.product,
            category: wire.category,
            price: wire.price,
            freight: wire.freight,
            purchase_date,
            seller: wire.seller,
            location: wire.location,
            lat: wire.lat,
            lon: wire.lon,
            rating: wire.rating,
            payment_type: wire.payment_type,
            installments: wire.installments,
        });
    }

    Ok(Dataset::new(records))
}
