//! Optimization objectives
//!
//! Both objectives are expressed as costs to minimize. Maximum Sharpe is
//! minimized as its negation.

use crate::error::{OptimizeError, Result};
use frontier_risk::TRADING_DAYS;
use frontier_risk::portfolio::{annualized_return, portfolio_volatility};
use ndarray::{Array1, Array2};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// What the optimizer minimizes
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum Objective {
    /// Daily portfolio volatility sqrt(w^T Σ w)
    MinVolatility,
    /// Negated annualized Sharpe ratio
    MaxSharpe,
}

impl Objective {
    /// Stable identifier used in CLI arguments and query strings
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::MinVolatility => "min-volatility",
            Self::MaxSharpe => "max-sharpe",
        }
    }

    /// Human-readable label
    pub const fn label(&self) -> &'static str {
        match self {
            Self::MinVolatility => "Minimum volatility",
            Self::MaxSharpe => "Maximum Sharpe ratio",
        }
    }

    /// Evaluate the cost of `weights`
    ///
    /// # Errors
    ///
    /// [`OptimizeError::ZeroVolatility`] when the Sharpe objective meets a
    /// portfolio with exactly zero volatility.
    pub fn cost(&self, weights: &Array1<f64>, mean: &Array1<f64>, cov: &Array2<f64>) -> Result<f64> {
        let vol = portfolio_volatility(weights, cov)?;
        match self {
            Self::MinVolatility => Ok(vol),
            Self::MaxSharpe => {
                if vol == 0.0 {
                    return Err(OptimizeError::ZeroVolatility);
                }
                let annual_return = annualized_return(weights, mean)?;
                Ok(-annual_return / (vol * TRADING_DAYS.sqrt()))
            }
        }
    }
}

impl fmt::Display for Objective {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Objective {
    type Err = OptimizeError;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_ascii_lowercase().replace('_', "-").as_str() {
            "min-volatility" | "min-vol" => Ok(Self::MinVolatility),
            "max-sharpe" | "sharpe" => Ok(Self::MaxSharpe),
            _ => Err(OptimizeError::UnknownObjective(s.to_string())),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_abs_diff_eq;
    use ndarray::array;
    use rstest::rstest;

    #[test]
    fn test_min_volatility_cost_is_portfolio_volatility() {
        let cov = array![[0.04, 0.01, 0.0], [0.01, 0.09, 0.02], [0.0, 0.02, 0.16]];
        let mean = array![0.0, 0.0, 0.0];
        let w = Array1::from_elem(3, 1.0 / 3.0);

        let cost = Objective::MinVolatility.cost(&w, &mean, &cov).unwrap();

        let direct = w.dot(&cov.dot(&w)).sqrt();
        assert_abs_diff_eq!(cost, direct, epsilon = 1e-15);
    }

    #[test]
    fn test_max_sharpe_cost_is_negated_sharpe() {
        let cov = array![[0.0004, 0.0], [0.0, 0.0001]];
        let mean = array![0.001, 0.0005];
        let w = array![0.5, 0.5];

        let cost = Objective::MaxSharpe.cost(&w, &mean, &cov).unwrap();

        let ret = 0.00075 * 252.0;
        let vol = (0.25 * 0.0004_f64 + 0.25 * 0.0001).sqrt() * 252.0_f64.sqrt();
        assert_abs_diff_eq!(cost, -ret / vol, epsilon = 1e-12);
    }

    #[test]
    fn test_max_sharpe_cost_rejects_zero_volatility() {
        let cov = Array2::<f64>::zeros((2, 2));
        let mean = array![0.001, 0.002];
        let w = array![0.5, 0.5];

        let result = Objective::MaxSharpe.cost(&w, &mean, &cov);

        assert!(matches!(result, Err(OptimizeError::ZeroVolatility)));
    }

    #[rstest]
    #[case("min-volatility", Objective::MinVolatility)]
    #[case("MIN_VOLATILITY", Objective::MinVolatility)]
    #[case("max-sharpe", Objective::MaxSharpe)]
    #[case(" max_sharpe ", Objective::MaxSharpe)]
    fn test_parse_objective(#[case] input: &str, #[case] expected: Objective) {
        assert_eq!(input.parse::<Objective>().unwrap(), expected);
    }

    #[test]
    fn test_parse_unknown_objective() {
        assert!("max-return".parse::<Objective>().is_err());
        assert_eq!(Objective::MaxSharpe.to_string(), "max-sharpe");
    }
}
