//! S corporation strategy.
//!
//! Net income splits into a reasonable salary (a fraction of net, capped)
//! carrying combined payroll tax, and a distribution that does not. The whole
//! net still flows through the owner's individual brackets.

use rust_decimal::Decimal;

use crate::calculations::brackets::BracketCalculator;
use crate::calculations::common::{max, round_half_up};
use crate::models::{BracketTableSet, EntityType, TaxPolicy};

use super::{EntityTaxError, FinancialProjection, SalarySplit, TaxCalculationResult, effective_rate};

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
    let reasonable_salary = max(
        Decimal::ZERO,
        round_half_up(net * policy.scorp_salary_fraction).min(policy.scorp_salary_ceiling),
    );
    let payroll_tax = round_half_up(reasonable_salary * policy.combined_payroll_tax_rate);
    let distribution = net - reasonable_salary;

    let taxable_income = max(Decimal::ZERO, net);
    let brackets = BracketCalculator::new(table);
    let federal_tax = brackets.tax(taxable_income)?;
    let marginal_rate = brackets.marginal_rate(taxable_income)?;
    let state_tax = round_half_up(taxable_income * policy.pass_through_rate_for(state));
    let total_tax = federal_tax + state_tax + payroll_tax;

    Ok(TaxCalculationResult {
        entity_type: EntityType::SCorporation,
        gross_income: projection.gross_income,
        business_expenses: projection.business_expenses,
        adjusted_gross_income: net,
        standard_deduction: None,
        taxable_income,
        federal_tax,
        state_tax,
        self_employment_tax: None,
        payroll_tax: Some(payroll_tax),
        salary_split: Some(SalarySplit {
            reasonable_salary,
            distribution,
        }),
        total_tax,
        effective_rate: effective_rate(total_tax, net),
        marginal_rate,
    })
}
