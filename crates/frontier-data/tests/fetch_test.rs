//! Integration tests for multi-ticker fetching with an in-memory source.

use chrono::NaiveDate;
use frontier_data::{DataError, DateRange, PriceSource, Result, fetch_price_frame};
use polars::prelude::*;
use std::collections::HashMap;
use std::sync::Mutex;

/// Serves fixed closes per symbol and records every request.
struct StaticSource {
    closes: HashMap<String, Vec<f64>>,
    requested: Mutex<Vec<String>>,
}

impl StaticSource {
    fn new(closes: &[(&str, &[f64])]) -> Self {
        Self {
            closes: closes
                .iter()
                .map(|(s, c)| (s.to_string(), c.to_vec()))
                .collect(),
            requested: Mutex::new(Vec::new()),
        }
    }
}

impl PriceSource for StaticSource {
    async fn fetch_closes(&self, symbol: &str, _range: &DateRange) -> Result<DataFrame> {
        self.requested.lock().unwrap().push(symbol.to_string());

        let closes = self
            .closes
            .get(symbol)
            .ok_or_else(|| DataError::InvalidSymbol(symbol.to_string()))?;

        // Consecutive days starting 2024-01-02 (days since epoch)
        let days: Vec<i32> = (0..closes.len() as i32).map(|d| 19_724 + d).collect();
        let df = DataFrame::new(vec![
            Series::new("symbol".into(), vec![symbol; closes.len()]).into(),
            Series::new("date".into(), days)
                .cast(&DataType::Date)?
                .into(),
            Series::new("adjusted_close".into(), closes.clone()).into(),
        ])?;
        Ok(df)
    }
}

fn range() -> DateRange {
    DateRange::new(
        NaiveDate::from_ymd_opt(2024, 1, 1).unwrap(),
        NaiveDate::from_ymd_opt(2024, 2, 1).unwrap(),
    )
    .unwrap()
}

#[tokio::test]
async fn test_fetch_price_frame_aligns_all_tickers() {
    let source = StaticSource::new(&[("A", &[100.0, 101.0, 102.0]), ("B", &[10.0, 10.0, 10.0])]);
    let tickers = vec!["A".to_string(), "B".to_string()];
    let mut fetched = Vec::new();

    let wide = fetch_price_frame(&source, &tickers, &range(), |t| fetched.push(t.to_string()))
        .await
        .unwrap();

    assert_eq!(wide.get_column_names(), vec!["date", "A", "B"]);
    assert_eq!(wide.height(), 3);
    assert_eq!(fetched, tickers);
}

#[tokio::test]
async fn test_fetch_price_frame_aborts_on_first_failure() {
    let source = StaticSource::new(&[("A", &[100.0, 101.0]), ("C", &[1.0, 2.0])]);
    let tickers = vec!["A".to_string(), "NOPE".to_string(), "C".to_string()];

    let result = fetch_price_frame(&source, &tickers, &range(), |_| {}).await;

    assert!(matches!(result, Err(DataError::InvalidSymbol(ref s)) if s == "NOPE"));
    // No retry and nothing fetched after the failing ticker
    assert_eq!(*source.requested.lock().unwrap(), vec!["A", "NOPE"]);
}
