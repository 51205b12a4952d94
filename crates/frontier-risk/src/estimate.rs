//! Mean and covariance estimation from aligned prices.

use crate::covariance::{
    CovarianceDiagnostics, CovarianceError, CovarianceEstimator, SampleCovarianceEstimator,
};
use crate::returns::{PriceTable, ReturnMatrix};
use chrono::NaiveDate;
use ndarray::{Array1, Array2, Axis};
use thiserror::Error;
use tracing::debug;

/// Errors that can occur while estimating returns and risk
#[derive(Debug, Error)]
pub enum EstimationError {
    /// Too few return observations remain after dropping incomplete rows
    #[error(
        "Insufficient data: need at least {required} return observations after dropping rows with missing prices, got {actual}"
    )]
    InsufficientData {
        /// Required number of observations
        required: usize,
        /// Actual number of observations
        actual: usize,
    },

    /// A zero or negative price would be used as a return denominator
    #[error("Non-positive price {price} for {ticker} on {date}")]
    NonPositivePrice {
        /// Ticker with the bad price
        ticker: String,
        /// Date of the bad price
        date: NaiveDate,
        /// The price itself
        price: f64,
    },

    /// Inconsistent table dimensions
    #[error("Malformed price table: {0}")]
    Shape(String),

    /// Price frame could not be read
    #[error("Price frame error: {0}")]
    Frame(#[from] polars::prelude::PolarsError),

    /// Covariance estimation error
    #[error("Covariance error: {0}")]
    Covariance(#[from] CovarianceError),
}

/// Estimated expected returns and covariance for a ticker set.
#[derive(Debug, Clone)]
pub struct MarketEstimates {
    /// Tickers in vector/matrix order
    pub tickers: Vec<String>,
    /// Mean daily simple return per ticker
    pub mean: Array1<f64>,
    /// Sample covariance of daily simple returns
    pub covariance: Array2<f64>,
    /// Number of return observations used
    pub observations: usize,
    /// Price rows removed for missing values
    pub dropped_rows: usize,
}

impl MarketEstimates {
    /// Number of assets.
    pub fn n_assets(&self) -> usize {
        self.mean.len()
    }

    /// Eigenvalue diagnostics of the covariance matrix.
    pub fn diagnostics(&self) -> Result<CovarianceDiagnostics, EstimationError> {
        Ok(CovarianceDiagnostics::compute(&self.covariance)?)
    }

    /// Whether there are fewer observations than assets, which forces a
    /// singular sample covariance.
    pub fn is_undersampled(&self) -> bool {
        self.observations < self.n_assets()
    }
}

/// Estimate mean returns and sample covariance from a price table.
///
/// Rows with any missing price are dropped before differencing.
///
/// # Errors
///
/// Returns [`EstimationError::InsufficientData`] when fewer than two return
/// observations remain.
pub fn estimate(prices: &PriceTable) -> Result<MarketEstimates, EstimationError> {
    let returns = ReturnMatrix::from_prices(prices)?;
    estimate_from_returns(&returns)
}

/// Estimate mean returns and sample covariance from a return matrix.
pub fn estimate_from_returns(returns: &ReturnMatrix) -> Result<MarketEstimates, EstimationError> {
    let observations = returns.observations();
    if observations < SampleCovarianceEstimator::MIN_OBSERVATIONS {
        return Err(EstimationError::InsufficientData {
            required: SampleCovarianceEstimator::MIN_OBSERVATIONS,
            actual: observations,
        });
    }

    let mean = returns
        .values()
        .mean_axis(Axis(0))
        .ok_or(EstimationError::InsufficientData {
            required: SampleCovarianceEstimator::MIN_OBSERVATIONS,
            actual: 0,
        })?;
    let covariance = SampleCovarianceEstimator::new().estimate(returns.values())?;

    debug!(
        assets = mean.len(),
        observations,
        dropped_rows = returns.dropped_rows(),
        "estimated mean returns and covariance"
    );

    Ok(MarketEstimates {
        tickers: returns.tickers().to_vec(),
        mean,
        covariance,
        observations,
        dropped_rows: returns.dropped_rows(),
    })
}
