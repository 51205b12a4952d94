//! Abstraction over price providers.

use crate::error::Result;
use crate::range::DateRange;
use polars::prelude::DataFrame;
use std::future::Future;

/// A provider of adjusted daily closing prices.
///
/// Implementations return a frame with columns `symbol` (str), `date` (Date)
/// and `adjusted_close` (f64, null where the provider has no usable value).
pub trait PriceSource {
    /// Fetch adjusted daily closes for one symbol over a date range.
    fn fetch_closes(
        &self,
        symbol: &str,
        range: &DateRange,
    ) -> impl Future<Output = Result<DataFrame>> + Send;
}
