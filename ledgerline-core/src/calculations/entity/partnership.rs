//! Partnership strategy, also covering multi-member LLCs.
//!
//! Modeled at the partnership level: the combined net income runs through
//! the individual brackets and self-employment tax without a standard
//! deduction, approximating the partners' aggregate position.

use rust_decimal::Decimal;

use crate::calculations::brackets::BracketCalculator;
use crate::calculations::common::{max, round_half_up};
use crate::calculations::self_employment::SeTaxCalculator;
use crate::models::{BracketTableSet, EntityType, TaxPolicy};

use super::{EntityTaxError, FinancialProjection, TaxCalculationResult, effective_rate};

pub(super) fn compute(
    policy: &TaxPolicy,
    tables: &BracketTableSet,
    projection: &FinancialProjection,
    state: &str,
) -> Result<TaxCalculationResult, EntityTaxError> {
    let status = projection.filing_status;
    let table = tables
        .table(status)
        .ok_or(EntityTaxError::MissingBracketTable(status))?;

    let net = projection.net_income();
    let se = SeTaxCalculator::new(policy).calculate(net, status)?;
    let taxable_income = max(Decimal::ZERO, net);
    let brackets = BracketCalculator::new(table);
    let federal_tax = brackets.tax(taxable_income)?;
    let marginal_rate = brackets.marginal_rate(taxable_income)?;
    let state_tax = round_half_up(taxable_income * policy.pass_through_rate_for(state));
    let total_tax = federal_tax + state_tax + se.total;

    Ok(TaxCalculationResult {
        entity_type: EntityType::Partnership,
        gross_income: projection.gross_income,
        business_expenses: projection.business_expenses,
        adjusted_gross_income: net,
        standard_deduction: None,
        taxable_income,
        federal_tax,
        state_tax,
        self_employment_tax: Some(se),
        payroll_tax: None,
        salary_split: None,
        total_tax,
        effective_rate: effective_rate(total_tax, net),
        marginal_rate,
    })
}
