#![doc = include_str!("../README.md")]
#![doc(issue_tracker_base_url = "https://github.com/factordynamics/frontier/issues/")]
#![cfg_attr(docsrs, feature(doc_cfg, doc_auto_cfg))]
#![warn(missing_docs)]
#![forbid(unsafe_code)]

pub mod batch;
pub mod pipeline;
pub mod tickers;

// Re-export main types from sub-crates
pub use frontier_data as data;
pub use frontier_optim as optim;
pub use frontier_output as output;
pub use frontier_risk as risk;

pub use batch::{BATCH_END, BATCH_OBJECTIVE, BATCH_START, BATCH_TICKERS, batch_request};
pub use pipeline::{
    OptimizationRequest, OptimizationResult, PipelineError, parse_range, run,
};
pub use tickers::TickerSet;

/// Version information.
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
