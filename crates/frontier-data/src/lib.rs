#![doc = include_str!("../README.md")]
#![doc(issue_tracker_base_url = "https://github.com/factordynamics/frontier/issues/")]
#![cfg_attr(docsrs, feature(doc_cfg, doc_auto_cfg))]
#![warn(missing_docs)]
#![forbid(unsafe_code)]

pub mod error;
pub mod frame;
pub mod range;
pub mod source;
pub mod yahoo;

pub use error::{DataError, Result};
pub use frame::{align_closes, fetch_price_frame};
pub use range::DateRange;
pub use source::PriceSource;
pub use yahoo::{FetchConfig, YahooQuoteProvider};

/// Version information.
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
