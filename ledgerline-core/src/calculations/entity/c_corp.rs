//! C corporation strategy: flat federal and state rates on taxable income.

use rust_decimal::Decimal;

use crate::calculations::common::{max, round_half_up};
use crate::models::{EntityType, TaxPolicy};

use super::{EntityTaxError, FinancialProjection, TaxCalculationResult, effective_rate};

pub(super) fn compute(
    policy: &TaxPolicy,
    projection: &FinancialProjection,
    state: &str,
) -> Result<TaxCalculationResult, EntityTaxError> {
    let net = projection.net_income();
    let taxable_income = max(Decimal::ZERO, net);
    let federal_tax = round_half_up(taxable_income * policy.corporate_federal_rate);
    let state_tax = round_half_up(taxable_income * policy.corporate_rate_for(state));
    let total_tax = federal_tax + state_tax;

    Ok(TaxCalculationResult {
        entity_type: EntityType::CCorporation,
        gross_income: projection.gross_income,
        business_expenses: projection.business_expenses,
        adjusted_gross_income: net,
        standard_deduction: None,
        taxable_income,
        federal_tax,
        state_tax,
        self_employment_tax: None,
        payroll_tax: None,
        salary_split: None,
        total_tax,
        effective_rate: effective_rate(total_tax, net),
        marginal_rate: policy.corporate_federal_rate,
    })
}
