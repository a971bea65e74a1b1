//! Common types used throughout CivicWorks

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

/// Date format accepted on input and produced on output
pub const DATE_FORMAT: &str = "%Y-%m-%d";

/// Date range (start_date to end_date), either side optional
#[derive(Debug, Clone, Copy, Serialize, Deserialize, Default, PartialEq, Eq)]
pub struct DateRange {
    pub start_date: Option<NaiveDate>,
    pub end_date: Option<NaiveDate>,
}

impl DateRange {
    pub fn new(start: Option<NaiveDate>, end: Option<NaiveDate>) -> Self {
        Self {
            start_date: start,
            end_date: end,
        }
    }

    /// False only when both ends are set and the end precedes the start
    pub fn is_ordered(&self) -> bool {
        match (self.start_date, self.end_date) {
            (Some(start), Some(end)) => start <= end,
            _ => true,
        }
    }

    pub fn duration_days(&self) -> Option<i64> {
        match (self.start_date, self.end_date) {
            (Some(start), Some(end)) => Some((end - start).num_days()),
            _ => None,
        }
    }

    /// Whether the range ended strictly before `today`
    pub fn ended_before(&self, today: NaiveDate) -> bool {
        self.end_date.map(|end| end < today).unwrap_or(false)
    }
}
