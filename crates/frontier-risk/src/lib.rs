#![doc = include_str!("../README.md")]
#![doc(issue_tracker_base_url = "https://github.com/factordynamics/frontier/issues/")]
#![cfg_attr(docsrs, feature(doc_cfg, doc_auto_cfg))]
#![warn(missing_docs)]
#![deny(unsafe_code)]

pub mod covariance;
pub mod estimate;
pub mod portfolio;
pub mod returns;

// Re-export main types
pub use covariance::{CovarianceDiagnostics, CovarianceEstimator, SampleCovarianceEstimator};
pub use estimate::{EstimationError, MarketEstimates, estimate, estimate_from_returns};
pub use portfolio::{
    PortfolioError, PortfolioMetrics, RiskContribution, TRADING_DAYS, risk_contributions,
};
pub use returns::{PriceTable, ReturnMatrix};
