//! Error types for data operations.

use thiserror::Error;

/// Result type for data operations.
pub type Result<T> = std::result::Result<T, DataError>;

/// Errors that can occur during data operations.
#[derive(Debug, Error)]
pub enum DataError {
    /// Yahoo Finance API error
    #[error("Yahoo Finance API error for {symbol}: {message}")]
    YahooApi {
        /// Symbol being fetched when the error occurred
        symbol: String,
        /// Provider error message
        message: String,
    },

    /// Yahoo Finance client could not be constructed
    #[error("Failed to create Yahoo Finance client: {0}")]
    Client(String),

    /// Invalid date range
    #[error("Invalid date range: end {end} must be after start {start}")]
    InvalidDateRange {
        /// Start date of the range
        start: String,
        /// End date of the range
        end: String,
    },

    /// Missing data
    #[error("Missing data for {symbol}: {reason}")]
    MissingData {
        /// Symbol that was queried
        symbol: String,
        /// Reason for missing data
        reason: String,
    },

    /// Polars error
    #[error("Polars error: {0}")]
    Polars(#[from] polars::prelude::PolarsError),

    /// Time conversion error
    #[error("Time conversion error: {0}")]
    TimeConversion(String),

    /// Invalid symbol
    #[error("Invalid symbol: {0}")]
    InvalidSymbol(String),
}

impl DataError {
    pub(crate) fn yahoo(symbol: &str, err: impl std::fmt::Display) -> Self {
        Self::YahooApi {
            symbol: symbol.to_string(),
            message: err.to_string(),
        }
    }
}
