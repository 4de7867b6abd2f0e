use std::collections::HashMap;

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use super::filing_status::FilingStatus;

/// One row of a progressive rate schedule.
///
/// A bracket covers the half-open income range `[min, max)`; `max` of `None`
/// marks the top bracket. `base` is the precomputed tax owed on all income
/// below `min`, so tax inside a bracket is `base + rate * (income - min)`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Bracket {
    pub min: Decimal,
    pub max: Option<Decimal>,
    pub rate: Decimal,
    pub base: Decimal,
}

#[derive(Debug, Error, PartialEq, Eq)]
pub enum RateTableError {
    #[error("rate table has no brackets")]
    Empty,
    #[error("first bracket must start at zero, got {0}")]
    FirstMinNotZero(Decimal),
    #[error("bracket {index} is not contiguous: expected min {expected}, got {actual}")]
    NotContiguous {
        index: usize,
        expected: Decimal,
        actual: Decimal,
    },
    #[error("bracket {index} has max {max} not greater than min {min}")]
    EmptyRange { index: usize, min: Decimal, max: Decimal },
    #[error("bracket {0} is unbounded but is not the last bracket")]
    UnboundedBeforeLast(usize),
    #[error("last bracket must be unbounded, got max {0}")]
    BoundedLast(Decimal),
    #[error("bracket {index} has rate {rate} outside the range 0..=1")]
    RateOutOfRange { index: usize, rate: Decimal },
    #[error("bracket {index} has negative base {base}")]
    NegativeBase { index: usize, base: Decimal },
    #[error("bracket {index} has base {base} lower than previous base {previous}")]
    DecreasingBase {
        index: usize,
        base: Decimal,
        previous: Decimal,
    },
}

/// A validated progressive rate schedule.
///
/// Construction through [`RateTable::new`] guarantees the brackets are sorted,
/// contiguous from zero, and cover all non-negative income, so lookups by
/// income cannot fall between rows.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RateTable {
    brackets: Vec<Bracket>,
}

impl RateTable {
    pub fn new(brackets: Vec<Bracket>) -> Result<Self, RateTableError> {
        if brackets.is_empty() {
            return Err(RateTableError::Empty);
        }
        let first = &brackets[0];
        if !first.min.is_zero() {
            return Err(RateTableError::FirstMinNotZero(first.min));
        }
        let last_index = brackets.len() - 1;
        let mut expected_min = Decimal::ZERO;
        let mut previous_base = Decimal::ZERO;
        for (index, bracket) in brackets.iter().enumerate() {
            if bracket.min != expected_min {
                return Err(RateTableError::NotContiguous {
                    index,
                    expected: expected_min,
                    actual: bracket.min,
                });
            }
            if bracket.rate < Decimal::ZERO || bracket.rate > Decimal::ONE {
                return Err(RateTableError::RateOutOfRange {
                    index,
                    rate: bracket.rate,
                });
            }
            if bracket.base < Decimal::ZERO {
                return Err(RateTableError::NegativeBase {
                    index,
                    base: bracket.base,
                });
            }
            if index > 0 && bracket.base < previous_base {
                return Err(RateTableError::DecreasingBase {
                    index,
                    base: bracket.base,
                    previous: previous_base,
                });
            }
            previous_base = bracket.base;
            match bracket.max {
                Some(max) => {
                    if index == last_index {
                        return Err(RateTableError::BoundedLast(max));
                    }
                    if max <= bracket.min {
                        return Err(RateTableError::EmptyRange {
                            index,
                            min: bracket.min,
                            max,
                        });
                    }
                    expected_min = max;
                }
                None => {
                    if index != last_index {
                        return Err(RateTableError::UnboundedBeforeLast(index));
                    }
                }
            }
        }
        Ok(RateTable { brackets })
    }

    /// Builds a table without running validation. Reserved for the built-in
    /// schedules, whose literals are checked against [`RateTable::new`] in tests.
    pub(crate) fn from_validated(brackets: Vec<Bracket>) -> Self {
        RateTable { brackets }
    }

    pub fn brackets(&self) -> &[Bracket] {
        &self.brackets
    }
}

/// Bracket schedules and standard deductions for one tax year, keyed by
/// filing status.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct BracketTableSet {
    pub tax_year: i32,
    tables: HashMap<FilingStatus, RateTable>,
    standard_deductions: HashMap<FilingStatus, Decimal>,
}

impl BracketTableSet {
    pub fn new(tax_year: i32) -> Self {
        BracketTableSet {
            tax_year,
            tables: HashMap::new(),
            standard_deductions: HashMap::new(),
        }
    }

    pub fn insert_table(&mut self, status: FilingStatus, table: RateTable) {
        self.tables.insert(status, table);
    }

    pub fn insert_standard_deduction(&mut self, status: FilingStatus, amount: Decimal) {
        self.standard_deductions.insert(status, amount);
    }

    pub fn table(&self, status: FilingStatus) -> Option<&RateTable> {
        self.tables.get(&status)
    }

    pub fn standard_deduction(&self, status: FilingStatus) -> Option<Decimal> {
        self.standard_deductions.get(&status).copied()
    }

    /// Illustrative 2024 federal schedules for all four filing statuses.
    /// Replaceable data, not authoritative guidance.
    pub fn default_2024() -> Self {
        let mut set = BracketTableSet::new(2024);
        set.insert_table(
            FilingStatus::Single,
            RateTable::from_validated(vec![
                row(0, Some(11_600), 10, 0),
                row(11_600, Some(47_150), 12, 116_000),
                row(47_150, Some(100_525), 22, 542_600),
                row(100_525, Some(191_950), 24, 1_716_850),
                row(191_950, Some(243_725), 32, 3_911_050),
                row(243_725, Some(609_350), 35, 5_567_850),
                row(609_350, None, 37, 18_364_725),
            ]),
        );
        set.insert_table(
            FilingStatus::MarriedJoint,
            RateTable::from_validated(vec![
                row(0, Some(23_200), 10, 0),
                row(23_200, Some(94_300), 12, 232_000),
                row(94_300, Some(201_050), 22, 1_085_200),
                row(201_050, Some(383_900), 24, 3_433_700),
                row(383_900, Some(487_450), 32, 7_822_100),
                row(487_450, Some(731_200), 35, 11_135_700),
                row(731_200, None, 37, 19_666_950),
            ]),
        );
        set.insert_table(
            FilingStatus::MarriedSeparate,
            RateTable::from_validated(vec![
                row(0, Some(11_600), 10, 0),
                row(11_600, Some(47_150), 12, 116_000),
                row(47_150, Some(100_525), 22, 542_600),
                row(100_525, Some(191_950), 24, 1_716_850),
                row(191_950, Some(243_725), 32, 3_911_050),
                row(243_725, Some(365_600), 35, 5_567_850),
                row(365_600, None, 37, 9_833_475),
            ]),
        );
        set.insert_table(
            FilingStatus::HeadOfHousehold,
            RateTable::from_validated(vec![
                row(0, Some(16_550), 10, 0),
                row(16_550, Some(63_100), 12, 165_500),
                row(63_100, Some(100_500), 22, 724_100),
                row(100_500, Some(191_950), 24, 1_546_900),
                row(191_950, Some(243_700), 32, 3_741_700),
                row(243_700, Some(609_350), 35, 5_397_700),
                row(609_350, None, 37, 18_195_450),
            ]),
        );
        set.insert_standard_deduction(FilingStatus::Single, Decimal::new(14_600, 0));
        set.insert_standard_deduction(FilingStatus::MarriedJoint, Decimal::new(29_200, 0));
        set.insert_standard_deduction(FilingStatus::MarriedSeparate, Decimal::new(14_600, 0));
        set.insert_standard_deduction(FilingStatus::HeadOfHousehold, Decimal::new(21_900, 0));
        set
    }
}

pub(crate) fn row(min: i64, max: Option<i64>, rate_pct: i64, base_cents: i64) -> Bracket {
    Bracket {
        min: Decimal::new(min, 0),
        max: max.map(|m| Decimal::new(m, 0)),
        rate: Decimal::new(rate_pct, 2),
        base: Decimal::new(base_cents, 2),
    }
}
