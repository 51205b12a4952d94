//! End-to-end optimization: acquisition, estimation, optimization, metrics.
//!
//! Every call recomputes everything from the price source. Nothing is
//! cached between runs and a failure at any stage aborts the run.

use crate::tickers::TickerSet;
use chrono::NaiveDate;
use frontier_data::{DataError, DateRange, PriceSource, fetch_price_frame};
use frontier_optim::{Objective, OptimizeError, OptimizerConfig, optimize};
use frontier_output::AllocationSummary;
use frontier_risk::{
    EstimationError, MarketEstimates, PortfolioMetrics, PriceTable, RiskContribution, estimate,
    risk_contributions,
};
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::{debug, info, warn};

/// Errors from a pipeline run, tagged by the stage that failed
#[derive(Debug, Error)]
pub enum PipelineError {
    /// The request itself is malformed (tickers, dates, objective)
    #[error("Invalid request: {0}")]
    InvalidRequest(String),

    /// Price data could not be fetched
    #[error("{0}")]
    Acquisition(#[from] DataError),

    /// Returns or covariance could not be estimated
    #[error("{0}")]
    Estimation(#[from] EstimationError),

    /// The optimizer failed
    #[error("{0}")]
    Optimization(#[from] OptimizeError),
}

impl PipelineError {
    /// Short stable tag for the failing stage
    pub const fn kind(&self) -> &'static str {
        match self {
            Self::InvalidRequest(_) => "invalid_request",
            Self::Acquisition(_) => "acquisition",
            Self::Estimation(_) => "estimation",
            Self::Optimization(_) => "optimization",
        }
    }
}

/// What to optimize
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OptimizationRequest {
    /// Tickers in output order
    pub tickers: TickerSet,
    /// Price history window
    pub range: DateRange,
    /// Objective to minimize
    pub objective: Objective,
}

impl OptimizationRequest {
    /// Create a request from validated parts
    pub const fn new(tickers: TickerSet, range: DateRange, objective: Objective) -> Self {
        Self {
            tickers,
            range,
            objective,
        }
    }

    /// Parse a request from user-entered strings
    ///
    /// Dates use `YYYY-MM-DD`. Every parse failure is reported as
    /// [`PipelineError::InvalidRequest`].
    pub fn parse(
        tickers: &str,
        start: &str,
        end: &str,
        objective: &str,
    ) -> Result<Self, PipelineError> {
        let tickers = TickerSet::parse(tickers)?;
        let range = parse_range(start, end)?;
        let objective = objective
            .parse::<Objective>()
            .map_err(|e| PipelineError::InvalidRequest(e.to_string()))?;
        Ok(Self::new(tickers, range, objective))
    }
}

fn parse_date(label: &str, value: &str) -> Result<NaiveDate, PipelineError> {
    value.trim().parse::<NaiveDate>().map_err(|e| {
        PipelineError::InvalidRequest(format!(
            "{label} date '{value}' is not YYYY-MM-DD: {e}"
        ))
    })
}

/// Parse and validate a `YYYY-MM-DD` date pair
pub fn parse_range(start: &str, end: &str) -> Result<DateRange, PipelineError> {
    let start = parse_date("start", start)?;
    let end = parse_date("end", end)?;
    DateRange::new(start, end).map_err(|e| PipelineError::InvalidRequest(e.to_string()))
}

/// Outcome of a successful run
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OptimizationResult {
    /// Tickers in request order
    pub tickers: Vec<String>,
    /// Optimized weights, parallel to `tickers`
    pub weights: Vec<f64>,
    /// Objective that was minimized
    pub objective: Objective,
    /// First requested date
    pub start: NaiveDate,
    /// Last requested date (exclusive)
    pub end: NaiveDate,
    /// Annualized return, volatility and Sharpe ratio
    pub metrics: PortfolioMetrics,
    /// Per-asset contributions to annualized volatility
    pub contributions: Vec<RiskContribution>,
    /// Solver iterations
    pub iterations: u64,
    /// Daily return observations used
    pub observations: usize,
    /// Price rows dropped for missing values
    pub dropped_rows: usize,
}

impl OptimizationResult {
    /// Build the presentation summary
    pub fn summary(&self) -> AllocationSummary {
        AllocationSummary::new(
            self.objective.label(),
            self.start,
            self.end,
            &self.tickers,
            &self.weights,
            self.metrics,
            self.contributions.clone(),
            self.observations,
            self.dropped_rows,
        )
    }

    /// Weight for `ticker`, if present
    pub fn weight(&self, ticker: &str) -> Option<f64> {
        self.tickers
            .iter()
            .position(|t| t == ticker)
            .and_then(|i| self.weights.get(i).copied())
    }
}

fn warn_if_degenerate(estimates: &MarketEstimates) {
    if estimates.is_undersampled() {
        warn!(
            observations = estimates.observations,
            assets = estimates.n_assets(),
            "fewer return observations than assets; covariance is singular"
        );
    }
    match estimates.diagnostics() {
        Ok(diagnostics) if diagnostics.is_degenerate() => warn!(
            condition_number = diagnostics.condition_number,
            null_dimensions = diagnostics.null_dimensions,
            positive_semidefinite = diagnostics.positive_semidefinite,
            min_eigenvalue = diagnostics.min_eigenvalue,
            "covariance matrix is singular, indefinite or ill-conditioned"
        ),
        Ok(diagnostics) => debug!(
            condition_number = diagnostics.condition_number,
            "covariance diagnostics"
        ),
        Err(e) => warn!(error = %e, "could not compute covariance diagnostics"),
    }
}

/// Run the full pipeline for one request
///
/// # Arguments
/// * `source` - Price provider
/// * `request` - Tickers, date range and objective
/// * `config` - Solver settings
/// * `on_fetched` - Called after each ticker's prices arrive
///
/// # Errors
///
/// The first failing stage, tagged as acquisition, estimation or
/// optimization.
pub async fn run<S, F>(
    source: &S,
    request: &OptimizationRequest,
    config: &OptimizerConfig,
    on_fetched: F,
) -> Result<OptimizationResult, PipelineError>
where
    S: PriceSource + Sync,
    F: FnMut(&str),
{
    let tickers = request.tickers.as_slice();

    let frame = fetch_price_frame(source, tickers, &request.range, on_fetched).await?;
    let prices = PriceTable::from_frame(&frame, tickers)?;
    let estimates = estimate(&prices)?;
    info!(
        observations = estimates.observations,
        dropped_rows = estimates.dropped_rows,
        "estimated returns and covariance"
    );
    warn_if_degenerate(&estimates);

    let solution = optimize(
        request.objective,
        &estimates.mean,
        &estimates.covariance,
        config,
    )?;
    let metrics = PortfolioMetrics::compute(&solution.weights, &estimates.mean, &estimates.covariance)
        .map_err(OptimizeError::from)?;
    let contributions = risk_contributions(tickers, &solution.weights, &estimates.covariance)
        .map_err(OptimizeError::from)?;

    info!(
        objective = %request.objective,
        iterations = solution.iterations,
        annual_volatility = metrics.annual_volatility,
        "optimization complete"
    );

    Ok(OptimizationResult {
        tickers: tickers.to_vec(),
        weights: solution.weights.to_vec(),
        objective: request.objective,
        start: request.range.start(),
        end: request.range.end(),
        metrics,
        contributions,
        iterations: solution.iterations,
        observations: estimates.observations,
        dropped_rows: estimates.dropped_rows,
    })
}
