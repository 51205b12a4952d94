//! Long-only weight optimization
//!
//! Weights live on the probability simplex: `w_i >= 0`, `sum(w) = 1`. The
//! search runs in logit space instead, with
//!
//! w = softmax([z_1, ..., z_{n-1}, 0])
//!
//! so every point the solver visits is a feasible portfolio and `z = 0` is
//! the equal-weight portfolio. L-BFGS minimizes the objective over the
//! logits using the analytic gradient pulled back through the softmax:
//!
//! ∂f/∂z_j = w_j (g_j - w·g),  g = ∇_w f
//!
//! An asset driven to (numerically) zero weight has a vanishing logit
//! gradient even when it should be held, so a pass is only accepted once the
//! first-order optimality conditions hold on the simplex: no asset has a
//! marginal cost below the portfolio's `w·g`. Otherwise the search restarts
//! from the best weights blended toward equal weights.

use crate::error::{OptimizeError, Result};
use crate::objective::Objective;
use argmin::core::{CostFunction, Executor, Gradient, State};
use argmin::solver::linesearch::MoreThuenteLineSearch;
use argmin::solver::quasinewton::LBFGS;
use frontier_risk::TRADING_DAYS;
use frontier_risk::portfolio::portfolio_variance;
use ndarray::{Array1, Array2};
use serde::{Deserialize, Serialize};
use tracing::debug;

/// Allowed deviation of the weight sum from one
pub const BUDGET_TOLERANCE: f64 = 1e-6;

/// Correction pairs kept by L-BFGS
const LBFGS_MEMORY: usize = 10;

/// Share of equal weights blended into a restart point
const RESTART_BLEND: f64 = 0.05;

/// Solver settings
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OptimizerConfig {
    /// Iteration cap per L-BFGS pass (default: 1000)
    pub max_iters: u64,
    /// L-BFGS stops once the logit gradient norm falls below this
    /// (default: 1e-10)
    pub grad_tolerance: f64,
    /// Largest accepted first-order improvement, relative to the largest
    /// marginal cost (default: 1e-3)
    pub optimality_tolerance: f64,
    /// Passes after the first before giving up (default: 5)
    pub max_restarts: u32,
}

impl Default for OptimizerConfig {
    fn default() -> Self {
        Self {
            max_iters: 1_000,
            grad_tolerance: 1e-10,
            optimality_tolerance: 1e-3,
            max_restarts: 5,
        }
    }
}

/// Optimal weights and solver bookkeeping
#[derive(Debug, Clone, PartialEq)]
pub struct Solution {
    /// Portfolio weights in asset order
    pub weights: Array1<f64>,
    /// Objective value at `weights`
    pub cost: f64,
    /// Solver iterations performed, summed over passes
    pub iterations: u64,
}

/// Map `n - 1` free logits to `n` simplex weights
///
/// The last logit is pinned at zero. Exponents are shifted by their maximum
/// so large logits do not overflow.
pub fn softmax_weights(logits: &[f64]) -> Array1<f64> {
    let max = logits.iter().copied().fold(0.0_f64, f64::max);
    let exps: Vec<f64> = logits
        .iter()
        .copied()
        .chain(std::iter::once(0.0))
        .map(|z| (z - max).exp())
        .collect();
    let total: f64 = exps.iter().sum();
    Array1::from_iter(exps.into_iter().map(|e| e / total))
}

/// Inverse of [`softmax_weights`] for strictly positive weights.
fn weights_to_logits(weights: &Array1<f64>) -> Vec<f64> {
    let n = weights.len();
    let last = weights[n - 1].ln();
    weights
        .iter()
        .take(n - 1)
        .map(|w| w.ln() - last)
        .collect()
}

/// Smooth surrogate of an objective with the same minimizers.
///
/// Minimum volatility is solved as variance relative to the equal-weight
/// variance, which keeps costs and gradients near one whatever the scale of
/// the returns. Maximum Sharpe uses the objective unchanged.
#[derive(Clone)]
struct LogitProblem {
    objective: Objective,
    mean: Array1<f64>,
    cov: Array2<f64>,
    variance_scale: f64,
}

impl LogitProblem {
    fn cost_at(&self, weights: &Array1<f64>) -> Result<f64> {
        match self.objective {
            Objective::MinVolatility => {
                Ok(portfolio_variance(weights, &self.cov)? / self.variance_scale)
            }
            Objective::MaxSharpe => self.objective.cost(weights, &self.mean, &self.cov),
        }
    }

    /// Gradient with respect to the weights.
    fn weight_gradient(&self, weights: &Array1<f64>) -> Result<Array1<f64>> {
        let sigma_w = self.cov.dot(weights);
        match self.objective {
            Objective::MinVolatility => Ok(sigma_w * (2.0 / self.variance_scale)),
            Objective::MaxSharpe => {
                let variance = weights.dot(&sigma_w).max(0.0);
                if variance == 0.0 {
                    return Err(OptimizeError::ZeroVolatility);
                }
                let vol = variance.sqrt();
                let daily_return = self.mean.dot(weights);
                // f = -sqrt(252) μ·w / σ
                let gradient = &self.mean / vol - sigma_w * (daily_return / (vol * variance));
                Ok(gradient * -TRADING_DAYS.sqrt())
            }
        }
    }
}

impl CostFunction for LogitProblem {
    type Param = Vec<f64>;
    type Output = f64;

    fn cost(&self, logits: &Self::Param) -> std::result::Result<Self::Output, argmin::core::Error> {
        Ok(self.cost_at(&softmax_weights(logits))?)
    }
}

impl Gradient for LogitProblem {
    type Param = Vec<f64>;
    type Gradient = Vec<f64>;

    fn gradient(
        &self,
        logits: &Self::Param,
    ) -> std::result::Result<Self::Gradient, argmin::core::Error> {
        let weights = softmax_weights(logits);
        let g = self.weight_gradient(&weights)?;
        let lambda = weights.dot(&g);
        Ok((0..logits.len())
            .map(|j| weights[j] * (g[j] - lambda))
            .collect())
    }
}

/// Largest first-order improvement available from shifting weight.
///
/// With `g` the weight gradient and `λ = w·g`, an optimum on the simplex has
/// `g_i >= λ` for every asset, with equality wherever `w_i > 0`. Since
/// `Σ w_i (g_i - λ) = 0`, bounding `λ - g_i` from above also bounds how far
/// held assets sit from equal marginal cost. The result is relative to the
/// largest marginal cost (or one, if smaller).
pub fn optimality_gap(weights: &Array1<f64>, gradient: &Array1<f64>) -> f64 {
    if !gradient.iter().all(|g| g.is_finite()) {
        return f64::INFINITY;
    }
    let lambda = weights.dot(gradient);
    let scale = gradient.iter().fold(1.0_f64, |m, g| m.max(g.abs()));
    gradient
        .iter()
        .map(|g| (lambda - g) / scale)
        .fold(0.0_f64, f64::max)
}

fn check_inputs(mean: &Array1<f64>, cov: &Array2<f64>) -> Result<usize> {
    let n = mean.len();
    if n == 0 {
        return Err(OptimizeError::Dimension(
            "at least one asset is required".to_string(),
        ));
    }
    if cov.dim() != (n, n) {
        return Err(OptimizeError::Dimension(format!(
            "covariance is {}x{} for {} assets",
            cov.nrows(),
            cov.ncols(),
            n
        )));
    }
    Ok(n)
}

/// Check the long-only budget constraint
pub fn check_weights(weights: &Array1<f64>) -> Result<()> {
    if let Some(w) = weights
        .iter()
        .find(|w| !w.is_finite() || **w < 0.0 || **w > 1.0)
    {
        return Err(OptimizeError::Constraint(format!(
            "weight {w} outside [0, 1]"
        )));
    }
    let total = weights.sum();
    if (total - 1.0).abs() > BUDGET_TOLERANCE {
        return Err(OptimizeError::Constraint(format!(
            "weights sum to {total}, expected 1"
        )));
    }
    Ok(())
}

fn solver_error(err: argmin::core::Error) -> OptimizeError {
    match err.downcast::<OptimizeError>() {
        Ok(e) => e,
        Err(other) => OptimizeError::NotConverged {
            iterations: 0,
            reason: other.to_string(),
        },
    }
}

/// One L-BFGS pass from `start`; returns the best logits and iterations.
fn lbfgs_pass(
    problem: &LogitProblem,
    start: Vec<f64>,
    config: &OptimizerConfig,
) -> Result<(Vec<f64>, u64)> {
    let linesearch: MoreThuenteLineSearch<Vec<f64>, Vec<f64>, f64> = MoreThuenteLineSearch::new();
    let solver: LBFGS<_, Vec<f64>, Vec<f64>, f64> = LBFGS::new(linesearch, LBFGS_MEMORY)
        .with_tolerance_grad(config.grad_tolerance)
        .map_err(solver_error)?
        .with_tolerance_cost(0.0)
        .map_err(solver_error)?;

    let result = Executor::new(problem.clone(), solver)
        .configure(|state| state.param(start).max_iters(config.max_iters))
        .run()
        .map_err(solver_error)?;

    let state = result.state();
    let iterations = state.get_iter();
    let logits = state
        .get_best_param()
        .cloned()
        .ok_or_else(|| OptimizeError::NotConverged {
            iterations,
            reason: "no best parameter recorded".to_string(),
        })?;
    debug!(
        iterations,
        termination = ?state.get_termination_reason(),
        cost = state.get_best_cost(),
        "L-BFGS pass finished"
    );
    Ok((logits, iterations))
}

/// Find long-only weights minimizing `objective`
///
/// Starts from equal weights. A single asset gets the whole budget without
/// running the solver.
///
/// # Arguments
/// * `objective` - Cost to minimize
/// * `mean` - Mean daily returns (N)
/// * `cov` - Daily return covariance (N x N)
/// * `config` - Solver settings
///
/// # Errors
///
/// * [`OptimizeError::Dimension`] for no assets or mismatched shapes
/// * [`OptimizeError::ZeroVolatility`] when the Sharpe objective meets a
///   zero-volatility portfolio
/// * [`OptimizeError::NotConverged`] when no pass meets the optimality
///   tolerance within the restart budget
pub fn optimize(
    objective: Objective,
    mean: &Array1<f64>,
    cov: &Array2<f64>,
    config: &OptimizerConfig,
) -> Result<Solution> {
    let n = check_inputs(mean, cov)?;
    let equal = Array1::from_elem(n, 1.0 / n as f64);

    if n == 1 {
        let cost = objective.cost(&equal, mean, cov)?;
        return Ok(Solution {
            weights: equal,
            cost,
            iterations: 0,
        });
    }

    let variance_scale = portfolio_variance(&equal, cov)?;
    if objective == Objective::MinVolatility && variance_scale == 0.0 {
        // Variance is clamped at zero, so a riskless equal-weight portfolio
        // is already optimal
        return Ok(Solution {
            weights: equal,
            cost: 0.0,
            iterations: 0,
        });
    }

    let problem = LogitProblem {
        objective,
        mean: mean.clone(),
        cov: cov.clone(),
        variance_scale,
    };

    let mut start = vec![0.0; n - 1];
    let mut iterations = 0;
    let mut gap = f64::INFINITY;

    for pass in 0..=config.max_restarts {
        let (logits, pass_iterations) = lbfgs_pass(&problem, start, config)?;
        iterations += pass_iterations;

        let weights = softmax_weights(&logits);
        gap = optimality_gap(&weights, &problem.weight_gradient(&weights)?);
        debug!(pass, gap, "optimality check");

        if gap <= config.optimality_tolerance {
            check_weights(&weights)?;
            let cost = objective.cost(&weights, mean, cov)?;
            debug!(
                objective = %objective,
                iterations,
                cost,
                "optimizer converged"
            );
            return Ok(Solution {
                weights,
                cost,
                iterations,
            });
        }

        let blended = &weights * (1.0 - RESTART_BLEND) + &equal * RESTART_BLEND;
        start = weights_to_logits(&blended);
    }

    Err(OptimizeError::NotConverged {
        iterations,
        reason: format!(
            "optimality gap {gap:.3e} above tolerance {} after {} restarts",
            config.optimality_tolerance, config.max_restarts
        ),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_abs_diff_eq;
    use ndarray::array;

    #[test]
    fn test_zero_logits_give_equal_weights() {
        let w = softmax_weights(&[0.0, 0.0, 0.0]);
        assert_eq!(w.len(), 4);
        for v in w.iter() {
            assert_abs_diff_eq!(*v, 0.25, epsilon = 1e-15);
        }
    }

    #[test]
    fn test_softmax_handles_extreme_logits() {
        let w = softmax_weights(&[1000.0, -1000.0]);
        assert_abs_diff_eq!(w[0], 1.0, epsilon = 1e-15);
        assert_abs_diff_eq!(w.sum(), 1.0, epsilon = 1e-15);
        assert!(w.iter().all(|v| v.is_finite() && *v >= 0.0));
    }

    #[test]
    fn test_optimality_gap_flags_cheaper_asset_left_out() {
        // Second asset has the lower marginal cost but holds nothing
        let stuck = optimality_gap(&array![1.0, 0.0], &array![2.0, 1.0]);
        assert_abs_diff_eq!(stuck, 0.5, epsilon = 1e-15);

        // Equal marginal cost on held assets, higher cost on the empty one
        let optimal = optimality_gap(&array![0.5, 0.5, 0.0], &array![1.0, 1.0, 3.0]);
        assert_abs_diff_eq!(optimal, 0.0, epsilon = 1e-15);

        assert!(optimality_gap(&array![0.5, 0.5], &array![f64::NAN, 1.0]).is_infinite());
    }

    #[test]
    fn test_logit_gradient_matches_finite_differences() {
        let problem = LogitProblem {
            objective: Objective::MaxSharpe,
            mean: array![0.0008, 0.0012, -0.0003],
            cov: array![
                [0.0004, 0.00006, 0.00002],
                [0.00006, 0.0009, 0.0001],
                [0.00002, 0.0001, 0.000225]
            ],
            variance_scale: 1.0,
        };
        let logits = vec![0.3, -0.7];
        let gradient = problem.gradient(&logits).unwrap();

        let h = 1e-6;
        for j in 0..logits.len() {
            let mut up = logits.clone();
            let mut down = logits.clone();
            up[j] += h;
            down[j] -= h;
            let numeric = (problem.cost(&up).unwrap() - problem.cost(&down).unwrap()) / (2.0 * h);
            assert_abs_diff_eq!(gradient[j], numeric, epsilon = 1e-6);
        }
    }

    #[test]
    fn test_restarts_are_counted_in_iterations() {
        let config = OptimizerConfig {
            max_iters: 2,
            max_restarts: 3,
            optimality_tolerance: 0.0,
            ..Default::default()
        };
        let result = optimize(
            Objective::MinVolatility,
            &array![0.0, 0.0, 0.0],
            &array![
                [0.0004, 0.00006, 0.00002],
                [0.00006, 0.0009, 0.0001],
                [0.00002, 0.0001, 0.000225]
            ],
            &config,
        );

        match result {
            Err(OptimizeError::NotConverged { iterations, reason }) => {
                assert!(iterations > 2, "iterations: {iterations}");
                assert!(reason.contains("after 3 restarts"), "{reason}");
            }
            other => panic!("expected NotConverged, got {other:?}"),
        }
    }

    #[test]
    fn test_check_weights() {
        assert!(check_weights(&array![0.25, 0.75]).is_ok());
        assert!(check_weights(&array![0.5, 0.6]).is_err());
        assert!(check_weights(&array![-0.1, 1.1]).is_err());
        assert!(check_weights(&array![f64::NAN, 1.0]).is_err());
    }

    #[test]
    fn test_dimension_errors() {
        let config = OptimizerConfig::default();
        let empty = optimize(
            Objective::MinVolatility,
            &Array1::zeros(0),
            &Array2::zeros((0, 0)),
            &config,
        );
        assert!(matches!(empty, Err(OptimizeError::Dimension(_))));

        let mismatched = optimize(
            Objective::MinVolatility,
            &Array1::zeros(2),
            &Array2::eye(3),
            &config,
        );
        assert!(matches!(mismatched, Err(OptimizeError::Dimension(_))));
    }

    #[test]
    fn test_single_asset_gets_full_weight() {
        let solution = optimize(
            Objective::MinVolatility,
            &array![0.001],
            &array![[0.0004]],
            &OptimizerConfig::default(),
        )
        .unwrap();

        assert_eq!(solution.weights, array![1.0]);
        assert_eq!(solution.iterations, 0);
        assert_abs_diff_eq!(solution.cost, 0.02, epsilon = 1e-15);
    }
}
