//! Error types for the settlement service

use thiserror::Error;

/// Result type for settlement operations
pub type Result<T> = std::result::Result<T, Error>;

/// Settlement errors
#[derive(Error, Debug)]
pub enum Error {
    /// Ledger error (storage, serialization)
    #[error("Ledger error: {0}")]
    Ledger(#[from] payment_ledger::Error),

    /// Malformed settlement date
    #[error("Invalid date format (use YYYY-MM-DD)")]
    InvalidDate,

    /// Bad or missing input fields
    #[error("Validation error: {0}")]
    Validation(String),

    /// Metrics registration error
    #[error("Metrics error: {0}")]
    Metrics(String),

    /// Invalid configuration
    #[error("Invalid configuration: {0}")]
    Config(String),
}

impl Error {
    /// Whether this error is the caller's fault (a 4xx at an HTTP boundary)
    /// rather than a server-side failure.
    pub fn is_client_error(&self) -> bool {
        match self {
            Error::InvalidDate | Error::Validation(_) => true,
            Error::Ledger(payment_ledger::Error::Validation(_)) => true,
            _ => false,
        }
    }
}
