//! Entity-specific tax strategies behind a single dispatch point.
//!
//! Every supported entity type owns a strategy module producing the shared
//! result shape. The set is closed: tags that do not parse into an
//! [`EntityType`] are rejected instead of falling back to a default strategy.

mod c_corp;
mod partnership;
mod s_corp;
mod sole_prop;

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::calculations::brackets::BracketError;
use crate::calculations::common::round_rate;
use crate::calculations::estimates::{self, QuarterlySchedule, ScheduleError};
use crate::calculations::self_employment::SeTaxBreakdown;
use crate::error::ErrorKind;
use crate::models::{
    BracketTableSet, EntityType, FilingStatus, Recommendation, TaxPolicy, TaxPolicyError,
};

#[derive(Debug, Error, PartialEq, Eq)]
pub enum EntityTaxError {
    #[error("unsupported entity type: {0}")]
    UnsupportedEntityType(String),
    #[error("no bracket table configured for filing status {0}")]
    MissingBracketTable(FilingStatus),
    #[error("no standard deduction configured for filing status {0}")]
    MissingStandardDeduction(FilingStatus),
    #[error("gross income cannot be negative, got {0}")]
    NegativeGrossIncome(Decimal),
    #[error("business expenses cannot be negative, got {0}")]
    NegativeExpenses(Decimal),
    #[error(transparent)]
    Policy(#[from] TaxPolicyError),
    #[error(transparent)]
    Bracket(#[from] BracketError),
    #[error(transparent)]
    Schedule(#[from] ScheduleError),
}

impl EntityTaxError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            EntityTaxError::UnsupportedEntityType(_) => ErrorKind::UnsupportedEntityType,
            EntityTaxError::MissingBracketTable(_)
            | EntityTaxError::MissingStandardDeduction(_)
            | EntityTaxError::Policy(_) => ErrorKind::Configuration,
            EntityTaxError::NegativeGrossIncome(_) | EntityTaxError::NegativeExpenses(_) => {
                ErrorKind::InvalidInput
            }
            EntityTaxError::Bracket(err) => err.kind(),
            EntityTaxError::Schedule(err) => err.kind(),
        }
    }
}

/// Year-level income projection the strategies work from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct FinancialProjection {
    pub gross_income: Decimal,
    pub business_expenses: Decimal,
    pub filing_status: FilingStatus,
}

impl FinancialProjection {
    pub fn new(
        gross_income: Decimal,
        business_expenses: Decimal,
        filing_status: FilingStatus,
    ) -> Self {
        FinancialProjection {
            gross_income,
            business_expenses,
            filing_status,
        }
    }

    pub fn net_income(&self) -> Decimal {
        self.gross_income - self.business_expenses
    }
}

/// Reasonable-compensation split used by the S corporation strategy.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct SalarySplit {
    pub reasonable_salary: Decimal,
    pub distribution: Decimal,
}

/// Result shared by all strategies. Components a strategy does not produce
/// stay `None`, so a sole proprietorship carries self-employment tax while
/// a C corporation carries neither that nor a salary split.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TaxCalculationResult {
    pub entity_type: EntityType,
    pub gross_income: Decimal,
    pub business_expenses: Decimal,
    pub adjusted_gross_income: Decimal,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub standard_deduction: Option<Decimal>,
    pub taxable_income: Decimal,
    pub federal_tax: Decimal,
    pub state_tax: Decimal,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub self_employment_tax: Option<SeTaxBreakdown>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub payroll_tax: Option<Decimal>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub salary_split: Option<SalarySplit>,
    pub total_tax: Decimal,
    pub effective_rate: Decimal,
    pub marginal_rate: Decimal,
}

/// Full estimate: the calculation, its quarterly payment schedule, and any
/// planning recommendations it triggered.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TaxEstimate {
    pub result: TaxCalculationResult,
    pub quarterly: QuarterlySchedule,
    pub recommendations: Vec<Recommendation>,
}

pub struct EntityTaxCalculator<'a> {
    policy: &'a TaxPolicy,
    tables: &'a BracketTableSet,
}

impl<'a> EntityTaxCalculator<'a> {
    pub fn new(policy: &'a TaxPolicy, tables: &'a BracketTableSet) -> Self {
        EntityTaxCalculator { policy, tables }
    }

    /// Runs the strategy for `entity_type` against the projection.
    /// `state` is a jurisdiction code; an empty string means no state levy.
    pub fn compute(
        &self,
        entity_type: EntityType,
        projection: &FinancialProjection,
        state: &str,
    ) -> Result<TaxCalculationResult, EntityTaxError> {
        self.policy.validate()?;
        if projection.gross_income < Decimal::ZERO {
            return Err(EntityTaxError::NegativeGrossIncome(projection.gross_income));
        }
        if projection.business_expenses < Decimal::ZERO {
            return Err(EntityTaxError::NegativeExpenses(projection.business_expenses));
        }
        match entity_type {
            EntityType::SoleProprietorship => {
                sole_prop::compute(self.policy, self.tables, projection, state)
            }
            EntityType::SCorporation => s_corp::compute(self.policy, self.tables, projection, state),
            EntityType::CCorporation => c_corp::compute(self.policy, projection, state),
            EntityType::Partnership => {
                partnership::compute(self.policy, self.tables, projection, state)
            }
        }
    }

    /// Full estimate including the quarterly schedule and recommendations.
    pub fn estimate(
        &self,
        entity_type: EntityType,
        projection: &FinancialProjection,
        state: &str,
    ) -> Result<TaxEstimate, EntityTaxError> {
        let result = self.compute(entity_type, projection, state)?;
        let quarterly =
            estimates::quarterly_schedule(self.policy, self.tables.tax_year, result.total_tax)?;
        let recommendations = estimates::recommendations(self.policy, &result);
        Ok(TaxEstimate {
            result,
            quarterly,
            recommendations,
        })
    }

    /// As [`estimate`](Self::estimate), but starting from a raw entity tag.
    pub fn estimate_for_tag(
        &self,
        tag: &str,
        projection: &FinancialProjection,
        state: &str,
    ) -> Result<TaxEstimate, EntityTaxError> {
        let entity_type = EntityType::parse(tag)
            .ok_or_else(|| EntityTaxError::UnsupportedEntityType(tag.to_string()))?;
        self.estimate(entity_type, projection, state)
    }
}

/// Effective rate over pre-deduction net income, zero when there is no income.
pub(super) fn effective_rate(total_tax: Decimal, net_income: Decimal) -> Decimal {
    if net_income > Decimal::ZERO {
        round_rate(total_tax / net_income)
    } else {
        Decimal::ZERO
    }
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;
    use rust_decimal_macros::dec;

    use super::*;

    fn fixtures() -> (TaxPolicy, BracketTableSet) {
        (TaxPolicy::default(), BracketTableSet::default_2024())
    }

    #[test]
    fn unknown_tags_are_rejected() {
        let (policy, tables) = fixtures();
        let calc = EntityTaxCalculator::new(&policy, &tables);
        let projection = FinancialProjection::new(dec!(100000), dec!(0), FilingStatus::Single);

        let result = calc.estimate_for_tag("nonprofit", &projection, "");

        assert_eq!(
            result.unwrap_err(),
            EntityTaxError::UnsupportedEntityType("nonprofit".to_string())
        );
    }

    #[test]
    fn llc_tags_map_onto_their_strategies() {
        let (policy, tables) = fixtures();
        let calc = EntityTaxCalculator::new(&policy, &tables);
        let projection = FinancialProjection::new(dec!(100000), dec!(20000), FilingStatus::Single);

        let single = calc.estimate_for_tag("single_member_llc", &projection, "").unwrap();
        let multi = calc.estimate_for_tag("multi_member_llc", &projection, "").unwrap();

        assert_eq!(single.result.entity_type, EntityType::SoleProprietorship);
        assert_eq!(multi.result.entity_type, EntityType::Partnership);
    }

    #[test]
    fn negative_gross_income_fails_validation() {
        let (policy, tables) = fixtures();
        let calc = EntityTaxCalculator::new(&policy, &tables);
        let projection = FinancialProjection::new(dec!(-1), dec!(0), FilingStatus::Single);

        let result = calc.compute(EntityType::SoleProprietorship, &projection, "");

        assert_eq!(result, Err(EntityTaxError::NegativeGrossIncome(dec!(-1))));
        assert_eq!(
            EntityTaxError::NegativeGrossIncome(dec!(-1)).kind(),
            ErrorKind::InvalidInput
        );
    }

    #[test]
    fn estimate_includes_quarterly_schedule_and_safe_harbor() {
        let (policy, tables) = fixtures();
        let calc = EntityTaxCalculator::new(&policy, &tables);
        let projection = FinancialProjection::new(dec!(100000), dec!(20000), FilingStatus::Single);

        let estimate = calc
            .estimate(EntityType::SoleProprietorship, &projection, "")
            .unwrap();

        // total 20744.64 split four ways, safe harbor at 110%
        assert_eq!(estimate.quarterly.quarterly_amount, dec!(5186.16));
        assert_eq!(estimate.quarterly.safe_harbor_amount, dec!(22819.10));
        assert_eq!(estimate.quarterly.payments.len(), 4);
    }

    #[test]
    fn effective_rate_is_zero_without_income() {
        assert_eq!(effective_rate(dec!(1000), dec!(0)), dec!(0));
        assert_eq!(effective_rate(dec!(1000), dec!(-500)), dec!(0));
        assert_eq!(effective_rate(dec!(2500), dec!(10000)), dec!(0.2500));
    }
}
