use thiserror::Error;

/// Error type definitions
///
/// Only load-time, configuration and caller-misuse problems are errors.
/// Degenerate statistics (too few observations, constant series, missing
/// columns) are reported through the outcome types of each component.
#[derive(Error, Debug)]
pub enum Error {
    #[error("IO error: {0}")]
    IoError(String),

    #[error("IO error: {0}")]
    Io(#[source] std::io::Error),

    #[error("CSV error: {0}")]
    Csv(#[source] csv::Error),

    #[error("JSON error: {0}")]
    Json(#[source] serde_json::Error),

    #[error("Column not found: {0}")]
    ColumnNotFound(String),

    #[error("Empty data: {0}")]
    EmptyData(String),

    #[error("Insufficient data error: {0}")]
    InsufficientData(String),

    #[error("Invalid value: {0}")]
    InvalidValue(String),

    #[error("Invalid input: {0}")]
    InvalidInput(String),

    #[error("Dimension mismatch error: {0}")]
    DimensionMismatch(String),

    #[error("Computation error: {0}")]
    Computation(String),

    #[error("Configuration error: {0}")]
    ConfigurationError(String),
}

/// Result type alias
pub type Result<T> = std::result::Result<T, Error>;

impl From<csv::Error> for Error {
    fn from(err: csv::Error) -> Self {
        Error::Csv(err)
    }
}

impl From<serde_json::Error> for Error {
    fn from(err: serde_json::Error) -> Self {
        Error::Json(err)
    }
}

impl From<std::io::Error> for Error {
    fn from(err: std::io::Error) -> Self {
        Error::Io(err)
    }
}

/// Map a statrs distribution construction failure into a computation error
pub(crate) fn distribution_error<E: std::fmt::Display>(what: &str, err: E) -> Error {
    Error::Computation(format!("{} distribution: {}", what, err))
}
