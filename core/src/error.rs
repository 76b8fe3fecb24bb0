use thiserror::Error;

#[derive(Error, Debug)]
pub enum ReportError {
    #[error("JSON must be a list or an object with a data/items/results list")]
    InvalidPayloadShape,

    #[error("Invalid numeric value for '{field}': {value:?}")]
    InvalidNumericValue { field: String, value: String },

    #[error("Request to {url} failed: {source}")]
    Network {
        url: String,
        #[source]
        source: reqwest::Error,
    },

    #[error("Request to {url} returned HTTP {status}")]
    HttpStatus { url: String, status: u16 },

    #[error("Invalid JSON: {0}")]
    InvalidJson(#[from] serde_json::Error),

    #[error("Query script has no statements")]
    EmptyScript,

    #[error("Query execution failed: {0}")]
    QueryExecution(#[source] rusqlite::Error),

    #[error("File not found: {path}")]
    MissingFile { path: String },

    #[error("Path is a directory: {path}")]
    IsADirectory { path: String },

    #[error("Database error: {0}")]
    Database(#[from] rusqlite::Error),

    #[error("Invalid URL: {0}")]
    InvalidUrl(#[from] url::ParseError),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

pub type ReportResult<T> = Result<T, ReportError>;
