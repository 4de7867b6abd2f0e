use std::collections::HashMap;

use rust_decimal::Decimal;
use serde::Serialize;

use super::filing_status::FilingStatus;
use super::rate_table::{RateTable, row};

/// Annualized percentage-method withholding schedules for one tax year.
///
/// Employers publish two schedules; separate filers and heads of household
/// withhold on the single schedule while keeping their own standard deduction.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct WithholdingTableSet {
    pub tax_year: i32,
    single_schedule: RateTable,
    married_schedule: RateTable,
    standard_deductions: HashMap<FilingStatus, Decimal>,
}

impl WithholdingTableSet {
    pub fn new(
        tax_year: i32,
        single_schedule: RateTable,
        married_schedule: RateTable,
        standard_deductions: HashMap<FilingStatus, Decimal>,
    ) -> Self {
        WithholdingTableSet {
            tax_year,
            single_schedule,
            married_schedule,
            standard_deductions,
        }
    }

    pub fn schedule_for(&self, status: FilingStatus) -> &RateTable {
        match status {
            FilingStatus::MarriedJoint => &self.married_schedule,
            _ => &self.single_schedule,
        }
    }

    pub fn standard_deduction(&self, status: FilingStatus) -> Option<Decimal> {
        self.standard_deductions.get(&status).copied()
    }

    /// Illustrative 2024 withholding schedules. The first band of each
    /// schedule withholds nothing.
    pub fn default_2024() -> Self {
        let single_schedule = RateTable::from_validated(vec![
            row(0, Some(3_325), 0, 0),
            row(3_325, Some(4_817), 10, 0),
            row(4_817, Some(9_817), 12, 14_920),
            row(9_817, Some(20_817), 22, 74_920),
            row(20_817, Some(43_375), 24, 316_920),
            row(43_375, Some(95_375), 32, 858_312),
            row(95_375, Some(200_000), 35, 2_522_312),
            row(200_000, None, 37, 6_184_187),
        ]);
        let married_schedule = RateTable::from_validated(vec![
            row(0, Some(8_600), 0, 0),
            row(8_600, Some(11_600), 10, 0),
            row(11_600, Some(21_600), 12, 30_000),
            row(21_600, Some(43_600), 22, 150_000),
            row(43_600, Some(88_600), 24, 634_000),
            row(88_600, Some(192_600), 32, 1_714_000),
            row(192_600, Some(400_000), 35, 5_042_000),
            row(400_000, None, 37, 12_301_000),
        ]);
        let mut standard_deductions = HashMap::new();
        standard_deductions.insert(FilingStatus::Single, Decimal::new(14_600, 0));
        standard_deductions.insert(FilingStatus::MarriedJoint, Decimal::new(29_200, 0));
        standard_deductions.insert(FilingStatus::MarriedSeparate, Decimal::new(14_600, 0));
        standard_deductions.insert(FilingStatus::HeadOfHousehold, Decimal::new(21_900, 0));
        WithholdingTableSet::new(2024, single_schedule, married_schedule, standard_deductions)
    }
}
