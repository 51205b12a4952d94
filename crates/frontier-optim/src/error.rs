//! Error types for weight optimization

use frontier_risk::PortfolioError;
use thiserror::Error;

/// Errors that can occur while optimizing portfolio weights
#[derive(Debug, Error)]
pub enum OptimizeError {
    /// Mean vector and covariance matrix do not describe the same assets
    #[error("Dimension error: {0}")]
    Dimension(String),

    /// Sharpe ratio requested for a portfolio with zero volatility
    #[error("Portfolio volatility is zero; the Sharpe ratio is undefined")]
    ZeroVolatility,

    /// The solver stopped without meeting its convergence criterion
    #[error("Optimization did not converge after {iterations} iterations: {reason}")]
    NotConverged {
        /// Iterations performed
        iterations: u64,
        /// Why the solver stopped
        reason: String,
    },

    /// The solution violates the long-only budget constraint
    #[error("Constraint violated: {0}")]
    Constraint(String),

    /// Objective name not recognized
    #[error("Unknown objective '{0}' (expected min-volatility or max-sharpe)")]
    UnknownObjective(String),

    /// Portfolio arithmetic failed
    #[error("Portfolio error: {0}")]
    Portfolio(#[from] PortfolioError),
}

/// Result type for optimization
pub type Result<T> = std::result::Result<T, OptimizeError>;
