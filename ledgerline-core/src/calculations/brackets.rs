//! Progressive bracket lookup using precomputed base amounts.
//!
//! Tax for an income is `base + rate * (income - min)` of the containing
//! bracket, so a single row lookup replaces summing the brackets below.

use rust_decimal::Decimal;
use thiserror::Error;

use crate::calculations::common::round_half_up;
use crate::error::ErrorKind;
use crate::models::{Bracket, RateTable};

#[derive(Debug, Error, PartialEq, Eq)]
pub enum BracketError {
    #[error("income cannot be negative, got {0}")]
    NegativeIncome(Decimal),
    #[error("no bracket covers income {0}")]
    NoMatchingBracket(Decimal),
}

impl BracketError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            BracketError::NegativeIncome(_) => ErrorKind::InvalidInput,
            BracketError::NoMatchingBracket(_) => ErrorKind::Configuration,
        }
    }
}

/// Computes tax and marginal rate against one validated rate table.
pub struct BracketCalculator<'a> {
    table: &'a RateTable,
}

impl<'a> BracketCalculator<'a> {
    pub fn new(table: &'a RateTable) -> Self {
        BracketCalculator { table }
    }

    /// Tax owed on `income`, rounded to cents.
    pub fn tax(&self, income: Decimal) -> Result<Decimal, BracketError> {
        let bracket = self.containing(income)?;
        Ok(round_half_up(
            bracket.base + bracket.rate * (income - bracket.min),
        ))
    }

    /// Rate of the bracket containing `income`.
    ///
    /// Brackets are half-open `[min, max)`, so an income equal to a
    /// boundary takes the upper bracket's rate.
    pub fn marginal_rate(&self, income: Decimal) -> Result<Decimal, BracketError> {
        Ok(self.containing(income)?.rate)
    }

    fn containing(&self, income: Decimal) -> Result<&Bracket, BracketError> {
        if income < Decimal::ZERO {
            return Err(BracketError::NegativeIncome(income));
        }
        self.table
            .brackets()
            .iter()
            .find(|b| income >= b.min && b.max.is_none_or(|m| income < m))
            .ok_or(BracketError::NoMatchingBracket(income))
    }
}
