//! Adjusted close fetching from Yahoo Finance.

use crate::error::{DataError, Result};
use crate::range::DateRange;
use crate::source::PriceSource;
use polars::prelude::*;
use std::time::Duration;
use tokio::time::sleep;
use tracing::debug;
use yahoo_finance_api as yahoo;

/// Configuration for quote fetching.
#[derive(Debug, Clone)]
pub struct FetchConfig {
    /// Delay applied after every request (default: 250ms).
    pub request_delay: Duration,
}

impl Default for FetchConfig {
    fn default() -> Self {
        Self {
            request_delay: Duration::from_millis(250),
        }
    }
}

/// Yahoo Finance quote provider with rate limiting.
pub struct YahooQuoteProvider {
    provider: yahoo::YahooConnector,
    config: FetchConfig,
}

impl std::fmt::Debug for YahooQuoteProvider {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("YahooQuoteProvider")
            .field("config", &self.config)
            .finish_non_exhaustive()
    }
}

impl YahooQuoteProvider {
    /// Create a new provider with the default request delay.
    pub fn new() -> Result<Self> {
        Self::with_config(FetchConfig::default())
    }

    /// Create a new provider with a custom configuration.
    pub fn with_config(config: FetchConfig) -> Result<Self> {
        let provider =
            yahoo::YahooConnector::new().map_err(|e| DataError::Client(e.to_string()))?;
        Ok(Self { provider, config })
    }

    /// Fetch adjusted daily closes for a single symbol.
    ///
    /// # Arguments
    /// * `symbol` - The ticker symbol (e.g., "AAPL")
    /// * `range` - Date range; the end date is exclusive
    ///
    /// # Returns
    /// A Polars DataFrame with columns: symbol, date, adjusted_close.
    /// Non-finite closes are stored as nulls.
    pub async fn fetch_quotes(&self, symbol: &str, range: &DateRange) -> Result<DataFrame> {
        if symbol.trim().is_empty() {
            return Err(DataError::InvalidSymbol("Empty symbol".to_string()));
        }

        let (start_time, end_time) = range.to_offset_datetimes()?;

        debug!(symbol, %range, "requesting quote history");
        let response = self
            .provider
            .get_quote_history(symbol, start_time, end_time)
            .await
            .map_err(|e| DataError::yahoo(symbol, e))?;

        let quotes = response.quotes().map_err(|e| DataError::yahoo(symbol, e))?;

        if quotes.is_empty() {
            return Err(DataError::MissingData {
                symbol: symbol.to_string(),
                reason: "No data returned from Yahoo Finance".to_string(),
            });
        }

        let timestamps: Vec<i64> = quotes.iter().map(|q| q.timestamp as i64).collect();
        let closes: Vec<Option<f64>> = quotes
            .iter()
            .map(|q| q.adjclose.is_finite().then_some(q.adjclose))
            .collect();

        let df = closes_frame(symbol, timestamps, closes)?;

        sleep(self.config.request_delay).await;

        Ok(df)
    }
}

impl PriceSource for YahooQuoteProvider {
    async fn fetch_closes(&self, symbol: &str, range: &DateRange) -> Result<DataFrame> {
        self.fetch_quotes(symbol, range).await
    }
}

/// Build the `symbol, date, adjusted_close` frame from unix timestamps.
pub(crate) fn closes_frame(
    symbol: &str,
    timestamps: Vec<i64>,
    closes: Vec<Option<f64>>,
) -> Result<DataFrame> {
    let height = timestamps.len();
    let df = DataFrame::new(vec![
        Series::new("symbol".into(), vec![symbol; height]).into(),
        Series::new("timestamp".into(), timestamps).into(),
        Series::new("adjusted_close".into(), closes).into(),
    ])?;

    let df = df
        .lazy()
        .with_column(
            (col("timestamp") * lit(1_000_000_000))
                .cast(DataType::Datetime(TimeUnit::Nanoseconds, None))
                .cast(DataType::Date)
                .alias("date"),
        )
        .select(&[col("symbol"), col("date"), col("adjusted_close")])
        .collect()?;

    Ok(df)
}
