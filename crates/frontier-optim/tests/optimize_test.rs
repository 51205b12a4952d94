//! Integration tests for long-only weight optimization

use approx::assert_abs_diff_eq;
use chrono::NaiveDate;
use frontier_optim::{Objective, OptimizeError, OptimizerConfig, optimize};
use frontier_risk::{PortfolioMetrics, PriceTable, estimate};
use ndarray::{Array1, Array2, array};
use rstest::rstest;

fn three_asset_cov() -> Array2<f64> {
    array![
        [0.0004, 0.00006, 0.00002],
        [0.00006, 0.0009, 0.0001],
        [0.00002, 0.0001, 0.000225]
    ]
}

fn price_table(columns: &[(&str, &[f64])]) -> PriceTable {
    let n = columns[0].1.len();
    let start = NaiveDate::from_ymd_opt(2022, 1, 3).unwrap();
    let dates = (0..n)
        .map(|i| start + chrono::Duration::days(i as i64))
        .collect();
    let rows = (0..n)
        .map(|t| columns.iter().map(|(_, p)| Some(p[t])).collect())
        .collect();
    let tickers = columns.iter().map(|(t, _)| t.to_string()).collect();
    PriceTable::new(tickers, dates, rows).unwrap()
}

#[rstest]
#[case(Objective::MinVolatility)]
#[case(Objective::MaxSharpe)]
fn test_weights_satisfy_budget(#[case] objective: Objective) {
    let mean = array![0.0008, 0.0012, 0.0003];

    let solution = optimize(objective, &mean, &three_asset_cov(), &OptimizerConfig::default())
        .unwrap();

    assert_abs_diff_eq!(solution.weights.sum(), 1.0, epsilon = 1e-6);
    assert!(solution.weights.iter().all(|w| (0.0..=1.0).contains(w)));
    assert!(solution.iterations > 0);
}

#[test]
fn test_min_volatility_beats_equal_weights() {
    let mean = Array1::zeros(3);
    let cov = three_asset_cov();
    let equal = Array1::from_elem(3, 1.0 / 3.0);

    let solution = optimize(Objective::MinVolatility, &mean, &cov, &OptimizerConfig::default())
        .unwrap();

    let equal_cost = Objective::MinVolatility.cost(&equal, &mean, &cov).unwrap();
    assert_abs_diff_eq!(equal_cost, equal.dot(&cov.dot(&equal)).sqrt(), epsilon = 1e-15);
    assert!(solution.cost <= equal_cost);
}

#[test]
fn test_diagonal_covariance_gives_inverse_variance_weights() {
    let variances = [0.04, 0.01, 0.0225];
    let cov = Array2::from_diag(&Array1::from_vec(variances.to_vec()));
    let mean = Array1::from_elem(3, 0.001);

    let solution = optimize(Objective::MinVolatility, &mean, &cov, &OptimizerConfig::default())
        .unwrap();

    let inverse: Vec<f64> = variances.iter().map(|v| 1.0 / v).collect();
    let total: f64 = inverse.iter().sum();
    for (w, inv) in solution.weights.iter().zip(&inverse) {
        assert_abs_diff_eq!(*w, inv / total, epsilon = 1e-3);
    }
}

#[test]
fn test_twenty_asset_diagonal_covariance_gives_inverse_variance_weights() {
    let variances: Vec<f64> = (0..20).map(|i| 1e-4 * (1.0 + 0.35 * i as f64)).collect();
    let cov = Array2::from_diag(&Array1::from_vec(variances.clone()));
    let mean = Array1::from_elem(20, 0.0005);

    let solution = optimize(Objective::MinVolatility, &mean, &cov, &OptimizerConfig::default())
        .unwrap();

    let total: f64 = variances.iter().map(|v| 1.0 / v).sum();
    for (w, v) in solution.weights.iter().zip(&variances) {
        assert_abs_diff_eq!(*w, 1.0 / v / total, epsilon = 1e-5);
    }
    assert_abs_diff_eq!(solution.cost, (1.0 / total).sqrt(), epsilon = 1e-9);
}

#[test]
fn test_sixteen_asset_max_sharpe_drops_negative_means() {
    // Uncorrelated assets: the long-only optimum is w ∝ μ / σ² over the
    // assets with positive mean, zero elsewhere.
    let means: Vec<f64> = (0..16)
        .map(|i| if i % 4 == 3 { -0.0004 } else { 0.0002 + 0.0001 * i as f64 })
        .collect();
    let variances: Vec<f64> = (0..16).map(|i| 1e-4 * (1.0 + 0.25 * (i % 5) as f64)).collect();
    let mean = Array1::from_vec(means.clone());
    let cov = Array2::from_diag(&Array1::from_vec(variances.clone()));

    let solution = optimize(Objective::MaxSharpe, &mean, &cov, &OptimizerConfig::default())
        .unwrap();

    let scores: Vec<f64> = means
        .iter()
        .zip(&variances)
        .map(|(m, v)| m.max(0.0) / v)
        .collect();
    let total: f64 = scores.iter().sum();
    for (i, (w, score)) in solution.weights.iter().zip(&scores).enumerate() {
        assert_abs_diff_eq!(*w, score / total, epsilon = 1e-4);
        if means[i] < 0.0 {
            assert!(*w < 1e-6, "asset {i} held at {w}");
        }
    }
}

#[test]
fn test_one_factor_min_volatility_excludes_high_beta_assets() {
    // Σ = ββ'σ_m² + diag(s²). Past a beta threshold, adding an asset only
    // raises variance, so the optimum sits on the boundary of the simplex.
    let n = 20;
    let beta: Vec<f64> = (0..n).map(|i| 0.5 + 0.1 * i as f64).collect();
    let specific: Vec<f64> = (0..n).map(|i| 1e-4 * (1.0 + 0.5 * (i % 4) as f64)).collect();
    let cov = Array2::from_shape_fn((n, n), |(i, j)| {
        beta[i] * beta[j] * 1e-4 + if i == j { specific[i] } else { 0.0 }
    });
    let mean = Array1::from_elem(n, 0.0003);

    let solution = optimize(Objective::MinVolatility, &mean, &cov, &OptimizerConfig::default())
        .unwrap();
    let w = &solution.weights;

    // Reference values from projected gradient descent on the simplex
    assert_abs_diff_eq!(w[0], 0.392089, epsilon = 1e-4);
    assert_abs_diff_eq!(w[1], 0.218166, epsilon = 1e-4);
    assert_abs_diff_eq!(w[4], 0.132729, epsilon = 1e-4);
    for (i, wi) in w.iter().enumerate().skip(7) {
        assert!(*wi < 1e-4, "asset {i} held at {wi}");
    }

    // First-order conditions: equal marginal variance on held assets and
    // no cheaper asset left out
    let marginal = cov.dot(w);
    let variance = w.dot(&marginal);
    for i in 0..n {
        assert!(marginal[i] >= variance * (1.0 - 1e-4), "asset {i}");
        if w[i] > 1e-3 {
            assert_abs_diff_eq!(marginal[i] / variance, 1.0, epsilon = 1e-4);
        }
    }
}

#[test]
fn test_max_sharpe_prefers_higher_return_per_risk() {
    // Same volatility, so the Sharpe-optimal portfolio leans on the asset
    // with the higher mean.
    let cov = array![[0.0004, 0.0], [0.0, 0.0004]];
    let mean = array![0.002, 0.0005];

    let solution = optimize(Objective::MaxSharpe, &mean, &cov, &OptimizerConfig::default())
        .unwrap();

    // Closed form for uncorrelated assets: w ∝ μ / σ²
    assert_abs_diff_eq!(solution.weights[0], 0.8, epsilon = 1e-3);
    assert_abs_diff_eq!(solution.weights[1], 0.2, epsilon = 1e-3);
}

#[test]
fn test_constant_prices_make_sharpe_fail() {
    let prices = price_table(&[("A", &[50.0, 50.0, 50.0, 50.0]), ("B", &[20.0, 20.0, 20.0, 20.0])]);
    let estimates = estimate(&prices).unwrap();

    let result = optimize(
        Objective::MaxSharpe,
        &estimates.mean,
        &estimates.covariance,
        &OptimizerConfig::default(),
    );
    assert!(matches!(result, Err(OptimizeError::ZeroVolatility)));

    let equal = Array1::from_elem(2, 0.5);
    let metrics = PortfolioMetrics::compute(&equal, &estimates.mean, &estimates.covariance).unwrap();
    assert!(metrics.sharpe_ratio.is_none());
}

#[test]
fn test_riskless_asset_takes_the_minimum_volatility_budget() {
    let prices = price_table(&[("A", &[100.0, 101.0, 102.0]), ("B", &[100.0, 100.0, 100.0])]);
    let estimates = estimate(&prices).unwrap();

    let solution = optimize(
        Objective::MinVolatility,
        &estimates.mean,
        &estimates.covariance,
        &OptimizerConfig::default(),
    )
    .unwrap();

    assert!(solution.weights[1] > 0.99, "weights: {}", solution.weights);
}

#[test]
fn test_iteration_cap_is_an_error() {
    let config = OptimizerConfig {
        max_iters: 1,
        max_restarts: 0,
        ..Default::default()
    };
    let mean = array![0.0008, 0.0012, 0.0003];

    let result = optimize(Objective::MinVolatility, &mean, &three_asset_cov(), &config);

    assert!(matches!(
        result,
        Err(OptimizeError::NotConverged { .. })
    ));
}
