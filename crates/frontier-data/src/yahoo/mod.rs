//! Yahoo Finance data providers.

pub mod quotes;

pub use quotes::{FetchConfig, YahooQuoteProvider};
