//! Aligned price tables and simple returns.

use crate::estimate::EstimationError;
use chrono::NaiveDate;
use ndarray::Array2;
use polars::prelude::*;
use tracing::debug;

/// Days from 0001-01-01 (CE) to 1970-01-01, the epoch of polars `Date`.
const UNIX_EPOCH_DAYS_FROM_CE: i32 = 719_163;

/// Daily closes aligned on a common calendar.
///
/// One row per date, one column per ticker; `None` marks a missing or
/// non-finite price.
#[derive(Debug, Clone, PartialEq)]
pub struct PriceTable {
    tickers: Vec<String>,
    dates: Vec<NaiveDate>,
    rows: Vec<Vec<Option<f64>>>,
}

impl PriceTable {
    /// Create a price table from rows of optional prices.
    ///
    /// # Errors
    ///
    /// Returns [`EstimationError::Shape`] if the number of dates and rows
    /// differ or a row's width differs from the number of tickers.
    pub fn new(
        tickers: Vec<String>,
        dates: Vec<NaiveDate>,
        rows: Vec<Vec<Option<f64>>>,
    ) -> Result<Self, EstimationError> {
        if dates.len() != rows.len() {
            return Err(EstimationError::Shape(format!(
                "{} dates for {} price rows",
                dates.len(),
                rows.len()
            )));
        }
        if let Some(row) = rows.iter().find(|r| r.len() != tickers.len()) {
            return Err(EstimationError::Shape(format!(
                "price row has {} values for {} tickers",
                row.len(),
                tickers.len()
            )));
        }

        let rows = rows
            .into_iter()
            .map(|row| row.into_iter().map(|p| p.filter(|v| v.is_finite())).collect())
            .collect();

        Ok(Self {
            tickers,
            dates,
            rows,
        })
    }

    /// Build a price table from a wide frame with a `date` column and one
    /// f64 column per ticker.
    ///
    /// Repeated dates keep their first row.
    pub fn from_frame(df: &DataFrame, tickers: &[String]) -> Result<Self, EstimationError> {
        let days = df.column("date")?.cast(&DataType::Int32)?;
        let days = days.i32()?;

        let mut dates = Vec::with_capacity(df.height());
        for day in days {
            let day = day.ok_or_else(|| EstimationError::Shape("null date".to_string()))?;
            let date = NaiveDate::from_num_days_from_ce_opt(day + UNIX_EPOCH_DAYS_FROM_CE)
                .ok_or_else(|| EstimationError::Shape(format!("date out of range: {day}")))?;
            dates.push(date);
        }

        let mut columns = Vec::with_capacity(tickers.len());
        for ticker in tickers {
            let values = df.column(ticker)?.cast(&DataType::Float64)?;
            let values: Vec<Option<f64>> = values.f64()?.into_iter().collect();
            columns.push(values);
        }

        let mut kept_dates: Vec<NaiveDate> = Vec::with_capacity(dates.len());
        let mut rows = Vec::with_capacity(dates.len());
        for (i, date) in dates.into_iter().enumerate() {
            if kept_dates.last() == Some(&date) {
                debug!(%date, "skipping repeated date");
                continue;
            }
            kept_dates.push(date);
            rows.push(columns.iter().map(|c| c[i]).collect());
        }

        Self::new(tickers.to_vec(), kept_dates, rows)
    }

    /// Tickers in column order.
    pub fn tickers(&self) -> &[String] {
        &self.tickers
    }

    /// Dates in row order.
    pub fn dates(&self) -> &[NaiveDate] {
        &self.dates
    }

    /// Number of rows.
    pub fn len(&self) -> usize {
        self.rows.len()
    }

    /// Whether the table has no rows.
    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    /// Price of `ticker` index `col` on row `row`.
    pub fn price(&self, row: usize, col: usize) -> Option<f64> {
        self.rows.get(row).and_then(|r| r.get(col).copied().flatten())
    }

    /// Remove every row that is missing a price for any ticker.
    ///
    /// The whole row goes, not just the missing cell, so every remaining
    /// row shares one trading calendar across tickers.
    ///
    /// # Returns
    /// Number of rows removed.
    pub fn drop_incomplete_rows(&mut self) -> usize {
        let before = self.rows.len();
        let mut dates = Vec::with_capacity(before);
        let mut rows = Vec::with_capacity(before);
        for (date, row) in self.dates.drain(..).zip(self.rows.drain(..)) {
            if row.iter().all(Option::is_some) {
                dates.push(date);
                rows.push(row);
            }
        }
        self.dates = dates;
        self.rows = rows;
        before - self.rows.len()
    }
}

/// Simple returns between consecutive complete price rows.
#[derive(Debug, Clone, PartialEq)]
pub struct ReturnMatrix {
    tickers: Vec<String>,
    dates: Vec<NaiveDate>,
    values: Array2<f64>,
    dropped_rows: usize,
}

impl ReturnMatrix {
    /// Compute simple returns `(p[t] - p[t-1]) / p[t-1]`.
    ///
    /// Rows with any missing price are removed before differencing, so a
    /// single gap in one ticker removes that date for every ticker.
    ///
    /// # Errors
    ///
    /// Returns [`EstimationError::NonPositivePrice`] when a price used as a
    /// denominator is zero or negative.
    pub fn from_prices(prices: &PriceTable) -> Result<Self, EstimationError> {
        let mut prices = prices.clone();
        let dropped_rows = prices.drop_incomplete_rows();
        if dropped_rows > 0 {
            debug!(dropped_rows, "removed rows with missing prices");
        }

        let complete: Vec<Vec<f64>> = prices
            .rows
            .iter()
            .map(|row| row.iter().flatten().copied().collect())
            .collect();

        let n_assets = prices.tickers.len();
        let n_returns = complete.len().saturating_sub(1);
        let mut values = Array2::<f64>::zeros((n_returns, n_assets));

        for (t, pair) in complete.windows(2).enumerate() {
            let (prev_row, curr_row) = (&pair[0], &pair[1]);
            for (j, (&prev, &curr)) in prev_row.iter().zip(curr_row).enumerate() {
                if prev <= 0.0 {
                    return Err(EstimationError::NonPositivePrice {
                        ticker: prices.tickers[j].clone(),
                        date: prices.dates[t],
                        price: prev,
                    });
                }
                values[[t, j]] = (curr - prev) / prev;
            }
        }

        Ok(Self {
            dates: prices.dates.iter().skip(1).copied().collect(),
            tickers: prices.tickers,
            values,
            dropped_rows,
        })
    }

    /// Tickers in column order.
    pub fn tickers(&self) -> &[String] {
        &self.tickers
    }

    /// Date each return ends on.
    pub fn dates(&self) -> &[NaiveDate] {
        &self.dates
    }

    /// Return matrix (T x N).
    pub const fn values(&self) -> &Array2<f64> {
        &self.values
    }

    /// Number of return observations.
    pub fn observations(&self) -> usize {
        self.values.nrows()
    }

    /// Price rows removed for missing values.
    pub const fn dropped_rows(&self) -> usize {
        self.dropped_rows
    }
}
