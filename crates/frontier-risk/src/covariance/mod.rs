//! Asset covariance estimation
//!
//! Provides the sample covariance estimator used for mean-variance
//! optimization, plus eigenvalue diagnostics for spotting degenerate
//! matrices before they reach the optimizer.

pub mod utils;

pub use utils::{CovarianceDiagnostics, EigenDecomposition, jacobi_eigendecomp};

use ndarray::{Array2, Axis};
use thiserror::Error;

/// Errors that can occur during covariance estimation
#[derive(Debug, Error)]
pub enum CovarianceError {
    /// Insufficient data for estimation
    #[error("Insufficient data: need at least {required} observations, got {actual}")]
    InsufficientData {
        /// Required number of observations
        required: usize,
        /// Actual number of observations
        actual: usize,
    },

    /// Dimension mismatch
    #[error("Dimension mismatch: expected {expected}, got {actual}")]
    DimensionMismatch {
        /// Expected dimension
        expected: usize,
        /// Actual dimension
        actual: usize,
    },
}

/// Trait for covariance matrix estimators
pub trait CovarianceEstimator {
    /// Estimate the covariance matrix from asset returns
    ///
    /// # Arguments
    /// * `returns` - Matrix where each row is a time period and each column is an asset
    ///
    /// # Returns
    /// * Estimated covariance matrix (N x N where N is number of assets)
    fn estimate(&self, returns: &Array2<f64>) -> Result<Array2<f64>, CovarianceError>;
}

/// Unbiased sample covariance estimator.
///
/// Σ = (X - x̄)ᵀ (X - x̄) / (T - 1)
#[derive(Debug, Clone, Copy, Default)]
pub struct SampleCovarianceEstimator;

impl SampleCovarianceEstimator {
    /// Minimum number of observations for an unbiased estimate
    pub const MIN_OBSERVATIONS: usize = 2;

    /// Create a new sample covariance estimator
    pub const fn new() -> Self {
        Self
    }
}

impl CovarianceEstimator for SampleCovarianceEstimator {
    fn estimate(&self, returns: &Array2<f64>) -> Result<Array2<f64>, CovarianceError> {
        let n_periods = returns.nrows();
        if n_periods < Self::MIN_OBSERVATIONS {
            return Err(CovarianceError::InsufficientData {
                required: Self::MIN_OBSERVATIONS,
                actual: n_periods,
            });
        }

        let means = returns
            .mean_axis(Axis(0))
            .ok_or(CovarianceError::InsufficientData {
                required: Self::MIN_OBSERVATIONS,
                actual: 0,
            })?;
        let centered = returns - &means.insert_axis(Axis(0));

        let cov = centered.t().dot(&centered) / (n_periods - 1) as f64;

        // Symmetrize to remove rounding asymmetry
        Ok((&cov + &cov.t()) / 2.0)
    }
}
