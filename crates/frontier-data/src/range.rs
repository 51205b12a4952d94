//! Validated calendar date ranges.

use crate::error::{DataError, Result};
use chrono::{NaiveDate, NaiveTime};
use serde::{Deserialize, Serialize};
use std::fmt;

/// A half-open range of calendar dates `[start, end)`.
///
/// The end date is exclusive, matching how Yahoo Finance treats the
/// `period2` bound. A range is only constructible when `end > start`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct DateRange {
    start: NaiveDate,
    end: NaiveDate,
}

impl DateRange {
    /// Create a new date range.
    ///
    /// # Errors
    ///
    /// Returns [`DataError::InvalidDateRange`] when `end` is not after `start`.
    pub fn new(start: NaiveDate, end: NaiveDate) -> Result<Self> {
        if end <= start {
            return Err(DataError::InvalidDateRange {
                start: start.to_string(),
                end: end.to_string(),
            });
        }
        Ok(Self { start, end })
    }

    /// First date of the range.
    pub const fn start(&self) -> NaiveDate {
        self.start
    }

    /// Exclusive end date of the range.
    pub const fn end(&self) -> NaiveDate {
        self.end
    }

    /// Start and end as `time::OffsetDateTime` at midnight UTC.
    pub(crate) fn to_offset_datetimes(self) -> Result<(time::OffsetDateTime, time::OffsetDateTime)> {
        Ok((to_offset_datetime(self.start)?, to_offset_datetime(self.end)?))
    }
}

impl fmt::Display for DateRange {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} to {}", self.start, self.end)
    }
}

fn to_offset_datetime(date: NaiveDate) -> Result<time::OffsetDateTime> {
    let timestamp = date.and_time(NaiveTime::MIN).and_utc().timestamp();
    time::OffsetDateTime::from_unix_timestamp(timestamp)
        .map_err(|e| DataError::TimeConversion(e.to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    #[test]
    fn test_valid_range() {
        let range = DateRange::new(date(2022, 1, 1), date(2023, 1, 1)).unwrap();
        assert_eq!(range.start(), date(2022, 1, 1));
        assert_eq!(range.end(), date(2023, 1, 1));
        assert_eq!(range.to_string(), "2022-01-01 to 2023-01-01");
    }

    #[rstest]
    #[case(date(2023, 1, 1), date(2022, 1, 1))]
    #[case(date(2023, 1, 1), date(2023, 1, 1))]
    fn test_rejects_empty_or_inverted(#[case] start: NaiveDate, #[case] end: NaiveDate) {
        let result = DateRange::new(start, end);
        assert!(matches!(result, Err(DataError::InvalidDateRange { .. })));
    }

    #[test]
    fn test_offset_datetimes_are_midnight_utc() {
        let range = DateRange::new(date(2022, 1, 1), date(2022, 1, 2)).unwrap();
        let (start, end) = range.to_offset_datetimes().unwrap();
        assert_eq!(start.unix_timestamp(), 1_640_995_200);
        assert_eq!(end.unix_timestamp() - start.unix_timestamp(), 86_400);
    }
}
