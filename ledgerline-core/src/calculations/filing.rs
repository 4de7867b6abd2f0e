//! Filing frequency and due date derivation from a period's tax due.

use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::error::ErrorKind;
use crate::models::Period;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum FilingError {
    #[error("monthly threshold {monthly} must not be below quarterly threshold {quarterly}")]
    ThresholdsOutOfOrder { monthly: Decimal, quarterly: Decimal },
    #[error("filing due date out of range for year {0}")]
    DateOutOfRange(i32),
}

impl FilingError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            FilingError::ThresholdsOutOfOrder { .. } => ErrorKind::Configuration,
            FilingError::DateOutOfRange(_) => ErrorKind::InvalidInput,
        }
    }
}

/// Tax-due cutoffs that escalate the filing frequency.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FilingPolicy {
    /// Above this, the jurisdiction expects monthly returns.
    pub monthly_threshold: Decimal,
    /// Above this (and at or below monthly), quarterly returns.
    pub quarterly_threshold: Decimal,
}

impl Default for FilingPolicy {
    fn default() -> Self {
        FilingPolicy {
            monthly_threshold: Decimal::new(20_000, 0),
            quarterly_threshold: Decimal::new(1_200, 0),
        }
    }
}

impl FilingPolicy {
    pub fn validate(&self) -> Result<(), FilingError> {
        if self.monthly_threshold < self.quarterly_threshold {
            return Err(FilingError::ThresholdsOutOfOrder {
                monthly: self.monthly_threshold,
                quarterly: self.quarterly_threshold,
            });
        }
        Ok(())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FilingFrequency {
    Monthly,
    Quarterly,
    #[serde(rename = "annually")]
    Annual,
}

impl FilingFrequency {
    pub fn as_str(&self) -> &'static str {
        match self {
            FilingFrequency::Monthly => "monthly",
            FilingFrequency::Quarterly => "quarterly",
            FilingFrequency::Annual => "annually",
        }
    }
}

/// A return one jurisdiction expects for one period.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FilingRequirement {
    pub state: String,
    pub period: Period,
    pub frequency: FilingFrequency,
    pub due_date: NaiveDate,
    pub tax_due: Decimal,
    pub taxable_sales: Decimal,
}

/// Derives the filing frequency and due date for a period's tax due.
/// Returns `None` when nothing is owed.
///
/// Monthly filings are due the 20th of the following month, quarterly
/// filings the 20th after the quarter closes, annual filings January 31st
/// of the next year.
pub fn derive_filing(
    policy: &FilingPolicy,
    period: Period,
    tax_due: Decimal,
) -> Result<Option<(FilingFrequency, NaiveDate)>, FilingError> {
    policy.validate()?;
    if tax_due <= Decimal::ZERO {
        return Ok(None);
    }

    let derived = if tax_due > policy.monthly_threshold {
        (FilingFrequency::Monthly, month_day_after(period.year(), period.month(), 20)?)
    } else if tax_due > policy.quarterly_threshold {
        let quarter_end = period.quarter_end_month();
        (FilingFrequency::Quarterly, month_day_after(period.year(), quarter_end, 20)?)
    } else {
        let due = NaiveDate::from_ymd_opt(period.year() + 1, 1, 31)
            .ok_or(FilingError::DateOutOfRange(period.year() + 1))?;
        (FilingFrequency::Annual, due)
    };
    Ok(Some(derived))
}

/// `day` of the month after (`year`, `month`), rolling December into January.
fn month_day_after(year: i32, month: u32, day: u32) -> Result<NaiveDate, FilingError> {
    let (year, month) = if month == 12 {
        (year + 1, 1)
    } else {
        (year, month + 1)
    };
    NaiveDate::from_ymd_opt(year, month, day).ok_or(FilingError::DateOutOfRange(year))
}
