#![doc = include_str!("../README.md")]
#![doc(issue_tracker_base_url = "https://github.com/factordynamics/frontier/issues/")]
#![cfg_attr(docsrs, feature(doc_cfg, doc_auto_cfg))]
#![warn(missing_docs)]
#![forbid(unsafe_code)]

pub mod export;
pub mod format;
pub mod summary;

pub use export::{ExportError, ExportFormat, Exporter, HoldingRecord};
pub use format::{BATCH_HEADER, NOT_AVAILABLE, format_batch_weights, format_percent, format_ratio};
pub use summary::{AllocationSummary, Holding};
