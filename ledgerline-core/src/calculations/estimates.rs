//! Quarterly estimated payment schedule and planning recommendations.

use chrono::NaiveDate;
use rust_decimal::{Decimal, RoundingStrategy};
use serde::Serialize;
use thiserror::Error;

use crate::calculations::common::round_half_up;
use crate::calculations::entity::TaxCalculationResult;
use crate::error::ErrorKind;
use crate::models::{EntityType, Recommendation, RecommendationKind, Severity, TaxPolicy};

#[derive(Debug, Error, PartialEq, Eq)]
pub enum ScheduleError {
    #[error("cannot build a payment schedule for tax year {0}")]
    YearOutOfRange(i32),
}

impl ScheduleError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            ScheduleError::YearOutOfRange(_) => ErrorKind::Configuration,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct QuarterlyPayment {
    pub quarter: u8,
    pub due_date: NaiveDate,
    pub amount: Decimal,
}

/// Four equal estimated payments plus the prior-year safe harbor figure.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct QuarterlySchedule {
    pub annual_total: Decimal,
    pub quarterly_amount: Decimal,
    /// Paying this much avoids underpayment penalties regardless of the
    /// final liability.
    pub safe_harbor_amount: Decimal,
    pub payments: Vec<QuarterlyPayment>,
}

/// Splits an annual liability into the four estimated payment due dates:
/// April, June, and September of the tax year, then January of the next.
pub fn quarterly_schedule(
    policy: &TaxPolicy,
    tax_year: i32,
    annual_total: Decimal,
) -> Result<QuarterlySchedule, ScheduleError> {
    let quarterly_amount = round_half_up(annual_total / Decimal::from(4));
    let due_dates = [
        (tax_year, 4, 15),
        (tax_year, 6, 15),
        (tax_year, 9, 15),
        (tax_year + 1, 1, 15),
    ];
    let mut payments = Vec::with_capacity(4);
    for (index, (year, month, day)) in due_dates.into_iter().enumerate() {
        let due_date = NaiveDate::from_ymd_opt(year, month, day)
            .ok_or(ScheduleError::YearOutOfRange(year))?;
        payments.push(QuarterlyPayment {
            quarter: index as u8 + 1,
            due_date,
            amount: quarterly_amount,
        });
    }
    Ok(QuarterlySchedule {
        annual_total,
        quarterly_amount,
        safe_harbor_amount: round_half_up(annual_total * policy.safe_harbor_factor),
        payments,
    })
}

/// Planning recommendations derived from a finished entity calculation.
pub fn recommendations(policy: &TaxPolicy, result: &TaxCalculationResult) -> Vec<Recommendation> {
    let mut recs = Vec::new();

    if result.effective_rate > policy.high_effective_rate_threshold {
        let percent = (result.effective_rate * Decimal::ONE_HUNDRED)
            .round_dp_with_strategy(1, RoundingStrategy::MidpointAwayFromZero);
        recs.push(Recommendation {
            kind: RecommendationKind::TaxReduction,
            priority: Severity::High,
            title: "High Tax Rate - Consider Tax Strategies".to_string(),
            description: format!(
                "Effective tax rate is {percent}%. Consider accelerating deductions or deferring income"
            ),
            estimated_savings: Some(round_half_up(result.total_tax * Decimal::new(1, 1))),
        });
    }

    if result.entity_type == EntityType::SoleProprietorship
        && result.gross_income > policy.entity_election_income_threshold
    {
        if let Some(se) = &result.self_employment_tax {
            recs.push(Recommendation {
                kind: RecommendationKind::EntityElection,
                priority: Severity::Medium,
                title: "Consider S-Corp Election".to_string(),
                description: "An S-Corp election could reduce self-employment taxes".to_string(),
                estimated_savings: Some(round_half_up(se.total * Decimal::new(5, 1))),
            });
        }
    }

    if result.taxable_income > policy.retirement_income_threshold {
        // SEP-IRA style cap: a quarter of taxable income up to the annual limit
        let contribution = policy
            .retirement_contribution_cap
            .min(result.taxable_income * Decimal::new(25, 2));
        recs.push(Recommendation {
            kind: RecommendationKind::RetirementPlanning,
            priority: Severity::Medium,
            title: "Maximize Retirement Contributions".to_string(),
            description: format!(
                "Contributing {} to a retirement plan could lower taxable income",
                round_half_up(contribution)
            ),
            estimated_savings: Some(round_half_up(contribution * result.marginal_rate)),
        });
    }

    recs
}
