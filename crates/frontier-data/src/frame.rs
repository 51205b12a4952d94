//! Multi-ticker price frames.
//!
//! Fetches each ticker's adjusted closes and aligns them on date into a wide
//! frame: `date, <TICKER_1>, <TICKER_2>, ...`.

use crate::error::{DataError, Result};
use crate::range::DateRange;
use crate::source::PriceSource;
use polars::prelude::*;
use tracing::info;

/// Fetch and align adjusted closes for every ticker.
///
/// Tickers are fetched one after another. The first failure aborts the whole
/// fetch; no partial frame is returned. `on_fetched` is invoked after each
/// ticker completes, which the CLI uses to drive a progress bar.
pub async fn fetch_price_frame<S, F>(
    source: &S,
    tickers: &[String],
    range: &DateRange,
    mut on_fetched: F,
) -> Result<DataFrame>
where
    S: PriceSource + Sync,
    F: FnMut(&str),
{
    let mut frames = Vec::with_capacity(tickers.len());

    for ticker in tickers {
        let df = source.fetch_closes(ticker, range).await?;
        on_fetched(ticker);
        frames.push((ticker.clone(), df));
    }

    let wide = align_closes(frames)?;
    info!(
        tickers = tickers.len(),
        rows = wide.height(),
        %range,
        "fetched price history"
    );
    Ok(wide)
}

/// Align per-ticker close frames on date.
///
/// Each ticker frame is left-joined onto the first ticker's calendar, so a
/// date absent for a later ticker yields a null in that ticker's column.
/// Dates missing from the first ticker are not represented; such rows would
/// be discarded by missing-value filtering in any case.
///
/// # Returns
/// A frame sorted by date with columns `date` followed by one f64 column per
/// ticker, in input order.
pub fn align_closes(frames: Vec<(String, DataFrame)>) -> Result<DataFrame> {
    let mut frames = frames.into_iter();
    let Some((first_symbol, first)) = frames.next() else {
        return Err(DataError::MissingData {
            symbol: "batch".to_string(),
            reason: "No tickers requested".to_string(),
        });
    };

    let mut wide = ticker_closes(first, &first_symbol);
    for (symbol, df) in frames {
        wide = wide.join(
            ticker_closes(df, &symbol),
            [col("date")],
            [col("date")],
            JoinArgs::new(JoinType::Left),
        );
    }

    let aligned = wide
        .sort(["date"], SortMultipleOptions::default())
        .collect()?;

    Ok(aligned)
}

fn ticker_closes(df: DataFrame, symbol: &str) -> LazyFrame {
    df.lazy()
        .select([col("date"), col("adjusted_close").alias(symbol)])
}
