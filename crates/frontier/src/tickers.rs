//! Ticker lists as entered by users.

use crate::pipeline::PipelineError;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// An ordered, non-empty list of unique upper-case ticker symbols.
///
/// Input order is kept; a repeated symbol keeps its first position.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "Vec<String>", into = "Vec<String>")]
pub struct TickerSet(Vec<String>);

impl TickerSet {
    /// Normalize a list of raw symbols.
    ///
    /// Entries are trimmed and upper-cased; blank entries are skipped.
    ///
    /// # Errors
    ///
    /// [`PipelineError::InvalidRequest`] if no symbol remains or a symbol
    /// contains characters Yahoo does not use (`A-Z`, digits, `.`, `-`, `^`,
    /// `=`).
    pub fn new<I, S>(symbols: I) -> Result<Self, PipelineError>
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let mut tickers: Vec<String> = Vec::new();
        for raw in symbols {
            let symbol = raw.as_ref().trim().to_ascii_uppercase();
            if symbol.is_empty() {
                continue;
            }
            if let Some(c) = symbol
                .chars()
                .find(|c| !(c.is_ascii_alphanumeric() || matches!(c, '.' | '-' | '^' | '=')))
            {
                return Err(PipelineError::InvalidRequest(format!(
                    "invalid character '{c}' in ticker '{symbol}'"
                )));
            }
            if !tickers.contains(&symbol) {
                tickers.push(symbol);
            }
        }

        if tickers.is_empty() {
            return Err(PipelineError::InvalidRequest(
                "at least one ticker is required".to_string(),
            ));
        }
        Ok(Self(tickers))
    }

    /// Parse a comma-separated list such as `"aapl, MSFT,,googl"`.
    pub fn parse(input: &str) -> Result<Self, PipelineError> {
        Self::new(input.split(','))
    }

    /// Symbols in order.
    pub fn as_slice(&self) -> &[String] {
        &self.0
    }

    /// Number of symbols.
    pub fn len(&self) -> usize {
        self.0.len()
    }

    /// Whether there are no symbols. Never true for a constructed set.
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Iterate over symbols.
    pub fn iter(&self) -> std::slice::Iter<'_, String> {
        self.0.iter()
    }
}

impl FromStr for TickerSet {
    type Err = PipelineError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

impl TryFrom<Vec<String>> for TickerSet {
    type Error = PipelineError;

    fn try_from(value: Vec<String>) -> Result<Self, Self::Error> {
        Self::new(value)
    }
}

impl From<TickerSet> for Vec<String> {
    fn from(value: TickerSet) -> Self {
        value.0
    }
}

impl<'a> IntoIterator for &'a TickerSet {
    type Item = &'a String;
    type IntoIter = std::slice::Iter<'a, String>;

    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}

impl fmt::Display for TickerSet {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0.join(", "))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[rstest]
    #[case("AAPL,MSFT", &["AAPL", "MSFT"])]
    #[case(" aapl , msft ", &["AAPL", "MSFT"])]
    #[case("AAPL,,MSFT,", &["AAPL", "MSFT"])]
    #[case("aapl,MSFT,AAPL", &["AAPL", "MSFT"])]
    #[case("RELIANCE.NS, tcs.ns", &["RELIANCE.NS", "TCS.NS"])]
    #[case("^GSPC,BRK-B", &["^GSPC", "BRK-B"])]
    fn test_parse(#[case] input: &str, #[case] expected: &[&str]) {
        let set = TickerSet::parse(input).unwrap();
        assert_eq!(set.as_slice(), expected);
    }

    #[rstest]
    #[case("")]
    #[case(" , ,")]
    #[case("AAPL MSFT")]
    #[case("<script>")]
    fn test_parse_rejects(#[case] input: &str) {
        assert!(matches!(
            TickerSet::parse(input),
            Err(PipelineError::InvalidRequest(_))
        ));
    }

    #[test]
    fn test_serde_validates() {
        let set: TickerSet = serde_json::from_str(r#"["msft", "aapl", "MSFT"]"#).unwrap();
        assert_eq!(set.to_string(), "MSFT, AAPL");
        assert!(serde_json::from_str::<TickerSet>("[]").is_err());
        assert_eq!(serde_json::to_string(&set).unwrap(), r#"["MSFT","AAPL"]"#);
    }
}
