use std::fmt;

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use thiserror::Error;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum PeriodError {
    #[error("period {0:?} is not in YYYY-MM format")]
    InvalidFormat(String),
    #[error("month {0} is outside the range 1..=12")]
    InvalidMonth(u32),
    #[error("year {0} is outside the supported range")]
    YearOutOfRange(i32),
}

/// A reporting month in `YYYY-MM` form.
///
/// Years are restricted to 1900..=2100 so the derived calendar dates (period
/// bounds, filing due dates) always exist.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct Period {
    year: i32,
    month: u32,
}

impl Period {
    pub fn new(year: i32, month: u32) -> Result<Self, PeriodError> {
        if !(1900..=2100).contains(&year) {
            return Err(PeriodError::YearOutOfRange(year));
        }
        if !(1..=12).contains(&month) {
            return Err(PeriodError::InvalidMonth(month));
        }
        Ok(Period { year, month })
    }

    pub fn parse(value: &str) -> Result<Self, PeriodError> {
        let (year, month) = value
            .split_once('-')
            .ok_or_else(|| PeriodError::InvalidFormat(value.to_string()))?;
        let year: i32 = year
            .parse()
            .map_err(|_| PeriodError::InvalidFormat(value.to_string()))?;
        let month: u32 = month
            .parse()
            .map_err(|_| PeriodError::InvalidFormat(value.to_string()))?;
        Period::new(year, month)
    }

    pub fn year(&self) -> i32 {
        self.year
    }

    pub fn month(&self) -> u32 {
        self.month
    }

    /// Calendar quarter 1..=4 containing this period.
    pub fn quarter(&self) -> u32 {
        (self.month - 1) / 3 + 1
    }

    /// Last month of the quarter containing this period: 3, 6, 9 or 12.
    pub fn quarter_end_month(&self) -> u32 {
        self.quarter() * 3
    }

    pub fn first_day(&self) -> Result<NaiveDate, PeriodError> {
        NaiveDate::from_ymd_opt(self.year, self.month, 1)
            .ok_or(PeriodError::YearOutOfRange(self.year))
    }

    pub fn last_day(&self) -> Result<NaiveDate, PeriodError> {
        let (next_year, next_month) = if self.month == 12 {
            (self.year + 1, 1)
        } else {
            (self.year, self.month + 1)
        };
        let first_of_next = NaiveDate::from_ymd_opt(next_year, next_month, 1)
            .ok_or(PeriodError::YearOutOfRange(self.year))?;
        first_of_next
            .pred_opt()
            .ok_or(PeriodError::YearOutOfRange(self.year))
    }
}

impl fmt::Display for Period {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:04}-{:02}", self.year, self.month)
    }
}

impl TryFrom<String> for Period {
    type Error = PeriodError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Period::parse(&value)
    }
}

impl From<Period> for String {
    fn from(period: Period) -> Self {
        period.to_string()
    }
}
