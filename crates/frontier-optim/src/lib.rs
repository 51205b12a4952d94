#![doc = include_str!("../README.md")]
#![doc(issue_tracker_base_url = "https://github.com/factordynamics/frontier/issues/")]
#![cfg_attr(docsrs, feature(doc_cfg, doc_auto_cfg))]
#![warn(missing_docs)]
#![deny(unsafe_code)]

pub mod error;
pub mod objective;
pub mod solver;

pub use error::{OptimizeError, Result};
pub use objective::Objective;
pub use solver::{
    BUDGET_TOLERANCE, OptimizerConfig, Solution, check_weights, optimality_gap, optimize,
    softmax_weights,
};
