//! Number formatting shared by console and dashboard output.

use std::fmt::Write;

/// Header printed before batch-mode weights.
pub const BATCH_HEADER: &str = "Optimized Portfolio Weights:";

/// Placeholder for a metric that is undefined.
pub const NOT_AVAILABLE: &str = "n/a";

/// Format a fraction as a percentage with two decimals (`0.1234` -> `12.34%`).
pub fn format_percent(fraction: f64) -> String {
    format!("{:.2}%", fraction * 100.0)
}

/// Format an optional ratio with two decimals, `n/a` when absent.
pub fn format_ratio(ratio: Option<f64>) -> String {
    ratio.map_or_else(|| NOT_AVAILABLE.to_string(), |r| format!("{r:.2}"))
}

/// Render batch-mode output: the header line followed by one
/// `TICKER: xx.xx%` line per ticker, in input order.
pub fn format_batch_weights(tickers: &[String], weights: &[f64]) -> String {
    let mut out = String::new();
    let _ = writeln!(out, "{BATCH_HEADER}");
    for (ticker, weight) in tickers.iter().zip(weights) {
        let _ = writeln!(out, "{ticker}: {}", format_percent(*weight));
    }
    out
}
