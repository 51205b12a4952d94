//! Portfolio risk and return
//!
//! Portfolio variance under a full asset covariance matrix:
//! Var(R_p) = w^T * Σ * w
//!
//! Daily estimates are annualized with [`TRADING_DAYS`]:
//! - expected return: (μ · w) * 252
//! - volatility: sqrt(w^T Σ w) * sqrt(252)

use ndarray::{Array1, Array2};
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Trading days per year used for annualization
pub const TRADING_DAYS: f64 = 252.0;

/// Portfolio computation errors
#[derive(Debug, Error)]
pub enum PortfolioError {
    /// Dimension mismatch
    #[error("Dimension mismatch: expected {expected}, got {actual}")]
    DimensionMismatch {
        /// Expected dimension
        expected: usize,
        /// Actual dimension
        actual: usize,
    },

    /// Invalid portfolio weights
    #[error("Invalid portfolio weights: {0}")]
    InvalidWeights(String),
}

fn check_dimensions(weights: &Array1<f64>, cov: &Array2<f64>) -> Result<(), PortfolioError> {
    let n = weights.len();
    if cov.nrows() != n {
        return Err(PortfolioError::DimensionMismatch {
            expected: n,
            actual: cov.nrows(),
        });
    }
    if cov.ncols() != n {
        return Err(PortfolioError::DimensionMismatch {
            expected: n,
            actual: cov.ncols(),
        });
    }
    Ok(())
}

/// Compute daily portfolio variance w^T Σ w
///
/// Rounding can push the quadratic form of a singular matrix slightly below
/// zero; the result is clamped at zero.
pub fn portfolio_variance(weights: &Array1<f64>, cov: &Array2<f64>) -> Result<f64, PortfolioError> {
    check_dimensions(weights, cov)?;
    Ok(weights.dot(&cov.dot(weights)).max(0.0))
}

/// Compute daily portfolio volatility (standard deviation)
pub fn portfolio_volatility(
    weights: &Array1<f64>,
    cov: &Array2<f64>,
) -> Result<f64, PortfolioError> {
    Ok(portfolio_variance(weights, cov)?.sqrt())
}

/// Annualized expected return (μ · w) * 252
pub fn annualized_return(weights: &Array1<f64>, mean: &Array1<f64>) -> Result<f64, PortfolioError> {
    if mean.len() != weights.len() {
        return Err(PortfolioError::DimensionMismatch {
            expected: weights.len(),
            actual: mean.len(),
        });
    }
    Ok(mean.dot(weights) * TRADING_DAYS)
}

/// Annualized volatility sqrt(w^T Σ w) * sqrt(252)
pub fn annualized_volatility(
    weights: &Array1<f64>,
    cov: &Array2<f64>,
) -> Result<f64, PortfolioError> {
    Ok(portfolio_volatility(weights, cov)? * TRADING_DAYS.sqrt())
}

/// Sharpe ratio with a zero risk-free rate.
///
/// `None` when volatility is exactly zero.
pub fn sharpe_ratio(annual_return: f64, annual_volatility: f64) -> Option<f64> {
    (annual_volatility != 0.0).then(|| annual_return / annual_volatility)
}

/// Annualized performance summary of a weight vector
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PortfolioMetrics {
    /// Expected annual return (fraction, not percent)
    pub expected_annual_return: f64,
    /// Annual volatility (fraction, not percent)
    pub annual_volatility: f64,
    /// Sharpe ratio, absent when volatility is zero
    pub sharpe_ratio: Option<f64>,
}

impl PortfolioMetrics {
    /// Compute metrics for `weights` given daily mean returns and covariance
    pub fn compute(
        weights: &Array1<f64>,
        mean: &Array1<f64>,
        cov: &Array2<f64>,
    ) -> Result<Self, PortfolioError> {
        if weights.iter().any(|w| !w.is_finite()) {
            return Err(PortfolioError::InvalidWeights(
                "weights must be finite".to_string(),
            ));
        }

        let expected_annual_return = annualized_return(weights, mean)?;
        let annual_volatility = annualized_volatility(weights, cov)?;

        Ok(Self {
            expected_annual_return,
            annual_volatility,
            sharpe_ratio: sharpe_ratio(expected_annual_return, annual_volatility),
        })
    }
}

/// One asset's contribution to portfolio volatility
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RiskContribution {
    /// Asset ticker
    pub ticker: String,
    /// Portfolio weight
    pub weight: f64,
    /// Annualized contribution w_i * (Σw)_i / σ_p
    pub contribution: f64,
    /// Share of total volatility in percent
    pub percent_of_risk: f64,
}

/// Euler decomposition of annualized volatility into per-asset parts
///
/// Contributions sum to the annualized portfolio volatility. Returns an
/// empty vector when volatility is zero.
pub fn risk_contributions(
    tickers: &[String],
    weights: &Array1<f64>,
    cov: &Array2<f64>,
) -> Result<Vec<RiskContribution>, PortfolioError> {
    if tickers.len() != weights.len() {
        return Err(PortfolioError::DimensionMismatch {
            expected: weights.len(),
            actual: tickers.len(),
        });
    }

    let vol = portfolio_volatility(weights, cov)?;
    if vol == 0.0 {
        return Ok(Vec::new());
    }

    let marginal = cov.dot(weights);
    let scale = TRADING_DAYS.sqrt();

    Ok(tickers
        .iter()
        .zip(weights.iter().zip(marginal.iter()))
        .map(|(ticker, (&w, &m))| {
            let daily = w * m / vol;
            RiskContribution {
                ticker: ticker.clone(),
                weight: w,
                contribution: daily * scale,
                percent_of_risk: daily / vol * 100.0,
            }
        })
        .collect())
}
