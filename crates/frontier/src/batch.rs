//! Fixed inputs for batch mode.

use crate::pipeline::{OptimizationRequest, PipelineError, parse_range};
use crate::tickers::TickerSet;
use frontier_optim::Objective;

/// Tickers optimized in batch mode.
pub const BATCH_TICKERS: [&str; 4] = ["AAPL", "MSFT", "GOOGL", "AMZN"];

/// First date of batch-mode price history.
pub const BATCH_START: &str = "2022-01-01";

/// End of batch-mode price history (exclusive).
pub const BATCH_END: &str = "2023-01-01";

/// Objective used in batch mode.
pub const BATCH_OBJECTIVE: Objective = Objective::MinVolatility;

/// The batch-mode request.
pub fn batch_request() -> Result<OptimizationRequest, PipelineError> {
    Ok(OptimizationRequest::new(
        TickerSet::new(BATCH_TICKERS)?,
        parse_range(BATCH_START, BATCH_END)?,
        BATCH_OBJECTIVE,
    ))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_batch_request() {
        let request = batch_request().unwrap();
        assert_eq!(request.tickers.as_slice(), BATCH_TICKERS);
        assert_eq!(request.range.to_string(), "2022-01-01 to 2023-01-01");
        assert_eq!(request.objective, Objective::MinVolatility);
    }
}
