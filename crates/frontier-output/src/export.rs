//! Export functionality for optimized allocations.
//!
//! Allocations can be written as CSV (one row per holding) or as JSON
//! carrying the full summary.

use crate::summary::AllocationSummary;
use serde::{Deserialize, Serialize};
use std::fs::File;
use std::io::Write;
use std::path::Path;
use std::str::FromStr;
use thiserror::Error;

/// Errors that can occur during export operations.
#[derive(Debug, Error)]
pub enum ExportError {
    /// CSV serialization error.
    #[error("CSV serialization error: {0}")]
    Csv(#[from] csv::Error),

    /// JSON serialization error.
    #[error("JSON serialization error: {0}")]
    Json(#[from] serde_json::Error),

    /// IO error.
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Invalid format error.
    #[error("Invalid format: {0}")]
    InvalidFormat(String),
}

/// Export format options.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExportFormat {
    /// Comma-separated values format.
    Csv,

    /// Compact JSON format.
    Json,

    /// Pretty-printed JSON format.
    PrettyJson,
}

impl ExportFormat {
    /// Get the file extension for this format.
    pub const fn extension(&self) -> &str {
        match self {
            Self::Csv => "csv",
            Self::Json | Self::PrettyJson => "json",
        }
    }

    /// Infer the format from a file extension. JSON files are pretty-printed.
    pub fn from_path(path: &Path) -> Result<Self, ExportError> {
        let ext = path
            .extension()
            .and_then(|e| e.to_str())
            .ok_or_else(|| {
                ExportError::InvalidFormat(format!("no file extension on {}", path.display()))
            })?;
        match ext.to_ascii_lowercase().as_str() {
            "csv" => Ok(Self::Csv),
            "json" => Ok(Self::PrettyJson),
            other => Err(ExportError::InvalidFormat(format!(
                "unsupported extension '.{other}' (expected .csv or .json)"
            ))),
        }
    }
}

impl FromStr for ExportFormat {
    type Err = ExportError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "csv" => Ok(Self::Csv),
            "json" => Ok(Self::Json),
            "pretty-json" | "pretty_json" => Ok(Self::PrettyJson),
            other => Err(ExportError::InvalidFormat(other.to_string())),
        }
    }
}

/// One CSV row of an allocation export.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct HoldingRecord {
    /// Ticker symbol.
    pub ticker: String,

    /// Weight (0.0 to 1.0).
    pub weight: f64,

    /// Weight in percent, rounded to two decimals.
    pub weight_pct: f64,
}

impl AllocationSummary {
    /// Flatten holdings into CSV records.
    pub fn to_records(&self) -> Vec<HoldingRecord> {
        self.holdings
            .iter()
            .map(|h| HoldingRecord {
                ticker: h.ticker.clone(),
                weight: h.weight,
                weight_pct: h.weight_pct(),
            })
            .collect()
    }
}

/// Trait for types that can be exported to various formats.
pub trait Exporter {
    /// Export data to a string in the specified format.
    ///
    /// # Errors
    ///
    /// Returns an error if serialization fails.
    fn export_to_string(&self, format: ExportFormat) -> Result<String, ExportError>;

    /// Export data to a file in the specified format.
    ///
    /// # Errors
    ///
    /// Returns an error if serialization or file writing fails.
    fn export_to_file(&self, path: &Path, format: ExportFormat) -> Result<(), ExportError> {
        let content = self.export_to_string(format)?;
        let mut file = File::create(path)?;
        file.write_all(content.as_bytes())?;
        Ok(())
    }
}

fn records_to_csv(records: &[HoldingRecord]) -> Result<String, ExportError> {
    let mut wtr = csv::Writer::from_writer(vec![]);
    for record in records {
        wtr.serialize(record)?;
    }
    let bytes = wtr.into_inner().map_err(|e| e.into_error())?;
    String::from_utf8(bytes).map_err(|e| ExportError::InvalidFormat(e.to_string()))
}

impl Exporter for AllocationSummary {
    fn export_to_string(&self, format: ExportFormat) -> Result<String, ExportError> {
        match format {
            ExportFormat::Csv => records_to_csv(&self.to_records()),
            ExportFormat::Json => Ok(serde_json::to_string(self)?),
            ExportFormat::PrettyJson => Ok(serde_json::to_string_pretty(self)?),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;
    use frontier_risk::PortfolioMetrics;
    use rstest::rstest;

    fn summary() -> AllocationSummary {
        AllocationSummary::new(
            "Maximum Sharpe ratio",
            NaiveDate::from_ymd_opt(2023, 1, 1).unwrap(),
            NaiveDate::from_ymd_opt(2024, 1, 1).unwrap(),
            &["AAPL".to_string(), "MSFT".to_string()],
            &[0.25, 0.75],
            PortfolioMetrics {
                expected_annual_return: 0.2,
                annual_volatility: 0.25,
                sharpe_ratio: Some(0.8),
            },
            Vec::new(),
            249,
            0,
        )
    }

    #[test]
    fn test_csv_export() {
        let csv = summary().export_to_string(ExportFormat::Csv).unwrap();
        let lines: Vec<&str> = csv.lines().collect();
        assert_eq!(lines[0], "ticker,weight,weight_pct");
        assert_eq!(lines[1], "AAPL,0.25,25.0");
        assert_eq!(lines[2], "MSFT,0.75,75.0");
        assert_eq!(lines.len(), 3);
    }

    #[test]
    fn test_json_export() {
        let json = summary().export_to_string(ExportFormat::Json).unwrap();
        let value: serde_json::Value = serde_json::from_str(&json).unwrap();
        assert_eq!(value["holdings"][1]["ticker"], "MSFT");
        assert_eq!(value["metrics"]["sharpe_ratio"], 0.8);
        assert_eq!(value["period_start"], "2023-01-01");

        let pretty = summary().export_to_string(ExportFormat::PrettyJson).unwrap();
        assert!(pretty.contains('\n'));
    }

    #[rstest]
    #[case("weights.csv", ExportFormat::Csv)]
    #[case("weights.JSON", ExportFormat::PrettyJson)]
    fn test_format_from_path(#[case] path: &str, #[case] expected: ExportFormat) {
        assert_eq!(ExportFormat::from_path(Path::new(path)).unwrap(), expected);
    }

    #[test]
    fn test_format_from_path_rejects_unknown() {
        assert!(ExportFormat::from_path(Path::new("weights.xlsx")).is_err());
        assert!(ExportFormat::from_path(Path::new("weights")).is_err());
        assert_eq!(ExportFormat::Csv.extension(), "csv");
    }

    #[test]
    fn test_export_to_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("allocation.csv");

        summary().export_to_file(&path, ExportFormat::Csv).unwrap();

        let written = std::fs::read_to_string(&path).unwrap();
        assert!(written.starts_with("ticker,weight,weight_pct\n"));
    }
}
