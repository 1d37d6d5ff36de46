use thiserror::Error;

/// The data source could not be reached or refused the request.
#[derive(Error, Debug)]
pub enum FetchError {
    #[error("request to the sales endpoint failed")]
    Request(#[from] reqwest::Error),

    #[error("sales endpoint {url} answered with HTTP {status}")]
    Status { status: u16, url: String },

    #[error("reading sales file {path}")]
    File {
        path: String,
        #[source]
        source: std::io::Error,
    },
}

/// The response arrived but does not describe a valid dataset.
///
/// Any of these aborts the whole load: a partially parsed dataset would
/// silently under-count every aggregate.
#[derive(Error, Debug)]
pub enum ParseError {
    #[error("response is not valid JSON")]
    Json(#[from] serde_json::Error),

    #[error("expected a top-level JSON array of sales")]
    NotAnArray,

    #[error("row {row}: {message}")]
    Record { row: usize, message: String },

    #[error("row {row}: purchase date '{value}' is not DD/MM/YYYY")]
    Date { row: usize, value: String },
}

/// Anything that can go wrong while loading a dataset from a source.
#[derive(Error, Debug)]
pub enum LoadError {
    #[error(transparent)]
    Fetch(#[from] FetchError),

    #[error(transparent)]
    Parse(#[from] ParseError),
}

/// Failure while producing or saving a CSV export.
#[derive(Error, Debug)]
pub enum ExportError {
    #[error("serializing CSV")]
    Csv(#[from] csv::Error),

    #[error("writing export file")]
    Io(#[from] std::io::Error),
}
