use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use super::filing_status::FilingStatus;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PayBasis {
    /// Paid per hour worked; overtime hours earn the configured premium.
    Hourly,
    /// Paid an annual salary split evenly across pay periods.
    Salaried,
}

/// Per-employee input to a payroll run.
///
/// `pay_rate` is the hourly rate for hourly employees and the annual salary
/// for salaried ones. `additional_withholding` is an annual amount, matching
/// how withholding elections are usually stated.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EmployeePayInput {
    pub employee_id: String,
    pub pay_basis: PayBasis,
    pub hours_worked: Decimal,
    pub overtime_hours: Decimal,
    pub pay_rate: Decimal,
    pub filing_status: FilingStatus,
    pub allowances: u32,
    pub additional_withholding: Decimal,
    pub other_deductions: Decimal,
}

impl EmployeePayInput {
    /// Hourly input with no overtime, allowances or extra deductions.
    pub fn hourly(employee_id: impl Into<String>, hours: Decimal, rate: Decimal) -> Self {
        EmployeePayInput {
            employee_id: employee_id.into(),
            pay_basis: PayBasis::Hourly,
            hours_worked: hours,
            overtime_hours: Decimal::ZERO,
            pay_rate: rate,
            filing_status: FilingStatus::Single,
            allowances: 0,
            additional_withholding: Decimal::ZERO,
            other_deductions: Decimal::ZERO,
        }
    }

    /// Salaried input with no allowances or extra deductions.
    pub fn salaried(employee_id: impl Into<String>, annual_salary: Decimal) -> Self {
        EmployeePayInput {
            employee_id: employee_id.into(),
            pay_basis: PayBasis::Salaried,
            hours_worked: Decimal::ZERO,
            overtime_hours: Decimal::ZERO,
            pay_rate: annual_salary,
            filing_status: FilingStatus::Single,
            allowances: 0,
            additional_withholding: Decimal::ZERO,
            other_deductions: Decimal::ZERO,
        }
    }
}
