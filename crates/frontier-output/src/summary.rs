//! Console report for an optimized allocation.

use crate::format::{format_percent, format_ratio};
use chrono::NaiveDate;
use frontier_risk::{PortfolioMetrics, RiskContribution};
use serde::{Deserialize, Serialize};
use std::fmt;

/// A single position in the optimized portfolio.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Holding {
    /// Ticker symbol.
    pub ticker: String,

    /// Weight in the portfolio (0.0 to 1.0).
    pub weight: f64,
}

impl Holding {
    /// Create a new holding.
    pub const fn new(ticker: String, weight: f64) -> Self {
        Self { ticker, weight }
    }

    /// Weight as a percentage rounded to two decimals.
    pub fn weight_pct(&self) -> f64 {
        (self.weight * 10_000.0).round() / 100.0
    }
}

/// Everything needed to present one optimization run.
///
/// Holds the allocation, its annualized metrics and the per-asset risk
/// contributions, plus enough context (objective, period, sample size) to
/// read the numbers without the original request.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct AllocationSummary {
    /// Objective label, e.g. "Maximum Sharpe ratio".
    pub objective: String,

    /// First requested date.
    pub period_start: NaiveDate,

    /// Last requested date (exclusive).
    pub period_end: NaiveDate,

    /// Optimized holdings in ticker order.
    pub holdings: Vec<Holding>,

    /// Annualized return, volatility and Sharpe ratio.
    pub metrics: PortfolioMetrics,

    /// Per-asset contributions to annualized volatility.
    pub contributions: Vec<RiskContribution>,

    /// Daily return observations used.
    pub observations: usize,

    /// Price rows dropped for missing values.
    pub dropped_rows: usize,
}

impl AllocationSummary {
    /// Build a summary from parallel ticker and weight slices.
    #[allow(clippy::too_many_arguments)]
    pub fn new(
        objective: impl Into<String>,
        period_start: NaiveDate,
        period_end: NaiveDate,
        tickers: &[String],
        weights: &[f64],
        metrics: PortfolioMetrics,
        contributions: Vec<RiskContribution>,
        observations: usize,
        dropped_rows: usize,
    ) -> Self {
        let holdings = tickers
            .iter()
            .zip(weights)
            .map(|(t, w)| Holding::new(t.clone(), *w))
            .collect();

        Self {
            objective: objective.into(),
            period_start,
            period_end,
            holdings,
            metrics,
            contributions,
            observations,
            dropped_rows,
        }
    }

    /// Sum of all weights (should be close to 1.0).
    pub fn total_weight(&self) -> f64 {
        self.holdings.iter().map(|h| h.weight).sum()
    }

    /// Holdings sorted by descending weight.
    pub fn ranked_holdings(&self) -> Vec<&Holding> {
        let mut ranked: Vec<&Holding> = self.holdings.iter().collect();
        ranked.sort_by(|a, b| b.weight.total_cmp(&a.weight));
        ranked
    }
}

struct RiskContributionLine<'a>(&'a RiskContribution);

impl fmt::Display for RiskContributionLine<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{}: {:.2}% of risk (contribution: {})",
            self.0.ticker,
            self.0.percent_of_risk,
            format_percent(self.0.contribution)
        )
    }
}

impl fmt::Display for AllocationSummary {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(
            f,
            "{} ({} to {})",
            self.objective, self.period_start, self.period_end
        )?;
        writeln!(f)?;

        let width = self
            .holdings
            .iter()
            .map(|h| h.ticker.len())
            .max()
            .unwrap_or(0)
            .max("Ticker".len());
        writeln!(f, "  {:<width$}  {:>8}", "Ticker", "Weight")?;
        for holding in &self.holdings {
            writeln!(
                f,
                "  {:<width$}  {:>8}",
                holding.ticker,
                format_percent(holding.weight)
            )?;
        }
        writeln!(
            f,
            "  {:<width$}  {:>8}",
            "Total",
            format_percent(self.total_weight())
        )?;
        if let Some(top) = self.ranked_holdings().first() {
            writeln!(
                f,
                "  Largest position: {} ({})",
                top.ticker,
                format_percent(top.weight)
            )?;
        }
        writeln!(f)?;

        writeln!(
            f,
            "  Expected Annual Return: {}",
            format_percent(self.metrics.expected_annual_return)
        )?;
        writeln!(
            f,
            "  Annual Volatility: {}",
            format_percent(self.metrics.annual_volatility)
        )?;
        writeln!(
            f,
            "  Sharpe Ratio: {}",
            format_ratio(self.metrics.sharpe_ratio)
        )?;

        if !self.contributions.is_empty() {
            writeln!(f)?;
            writeln!(f, "  Risk Contributions:")?;
            for contribution in &self.contributions {
                writeln!(f, "    {}", RiskContributionLine(contribution))?;
            }
        }

        writeln!(f)?;
        write!(
            f,
            "  {} daily returns used, {} incomplete price rows dropped",
            self.observations, self.dropped_rows
        )
    }
}
