//! Per-employee paycheck computation and the batch payroll run.
//!
//! A paycheck is gross pay (hourly with an overtime premium, or an even
//! salary slice) less federal withholding, state withholding, FICA, and any
//! voluntary deductions. The batch run aggregates lines, derives the deposit
//! requirement from total taxes, and raises non-blocking compliance alerts.

use chrono::{Datelike, Duration, NaiveDate};
use rust_decimal::{Decimal, RoundingStrategy};
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::warn;

use crate::calculations::common::round_half_up;
use crate::calculations::withholding::{WithholdingCalculator, WithholdingError};
use crate::error::{ErrorKind, ItemError};
use crate::models::{
    ComplianceAlert, ComplianceAlertKind, EmployeePayInput, PayBasis, PayrollConfig,
    PayrollConfigError, Period, PeriodError, Severity, WithholdingTableSet,
};

#[derive(Debug, Error, PartialEq, Eq)]
pub enum PayrollError {
    #[error(transparent)]
    Config(#[from] PayrollConfigError),
    #[error(transparent)]
    Withholding(#[from] WithholdingError),
    #[error("hours cannot be negative, got {0}")]
    NegativeHours(Decimal),
    #[error("pay rate cannot be negative, got {0}")]
    NegativeRate(Decimal),
    #[error("deductions cannot be negative, got {0}")]
    NegativeDeductions(Decimal),
    #[error("deductions exceed pay, net would be {net_pay}")]
    NegativeNetPay { net_pay: Decimal },
    #[error(transparent)]
    Period(#[from] PeriodError),
    #[error("deposit due date out of range for year {0}")]
    DueDateOutOfRange(i32),
}

impl PayrollError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            PayrollError::Config(_) => ErrorKind::Configuration,
            PayrollError::Withholding(err) => err.kind(),
            PayrollError::NegativeHours(_)
            | PayrollError::NegativeRate(_)
            | PayrollError::NegativeDeductions(_)
            | PayrollError::NegativeNetPay { .. }
            | PayrollError::Period(_)
            | PayrollError::DueDateOutOfRange(_) => ErrorKind::InvalidInput,
        }
    }
}

/// One computed paycheck.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PayrollLine {
    pub employee_id: String,
    pub hours_worked: Decimal,
    pub overtime_hours: Decimal,
    pub gross_pay: Decimal,
    pub federal_withholding: Decimal,
    pub state_withholding: Decimal,
    pub social_security: Decimal,
    pub medicare: Decimal,
    pub additional_medicare: Decimal,
    pub other_deductions: Decimal,
    pub total_taxes: Decimal,
    pub net_pay: Decimal,
}

/// Failure for one employee inside an otherwise successful run.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PayrollLineError {
    pub employee_id: String,
    pub error: ItemError,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DepositSchedule {
    NextBusinessDay,
    SemiWeekly,
    Monthly,
}

/// Employment tax deposit derived from a run's total withheld taxes.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DepositRequirement {
    pub schedule: DepositSchedule,
    pub due_date: NaiveDate,
    pub federal_amount: Decimal,
    pub state_amount: Decimal,
}

/// Batch run output. `lines` holds the paychecks that computed cleanly,
/// `line_errors` the employees that were skipped, keyed by employee id.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PayrollRunSummary {
    pub client_id: String,
    pub period: Period,
    pub pay_date: NaiveDate,
    pub employee_count: usize,
    pub total_gross: Decimal,
    pub total_taxes: Decimal,
    pub total_net: Decimal,
    pub lines: Vec<PayrollLine>,
    pub line_errors: Vec<PayrollLineError>,
    pub deposit: Option<DepositRequirement>,
    pub compliance_alerts: Vec<ComplianceAlert>,
}

pub struct PaycheckWorksheet<'a> {
    tables: &'a WithholdingTableSet,
    config: &'a PayrollConfig,
}

impl<'a> PaycheckWorksheet<'a> {
    pub fn new(tables: &'a WithholdingTableSet, config: &'a PayrollConfig) -> Self {
        PaycheckWorksheet { tables, config }
    }

    /// Computes one paycheck.
    pub fn calculate(&self, input: &EmployeePayInput) -> Result<PayrollLine, PayrollError> {
        self.config.validate()?;
        if input.hours_worked < Decimal::ZERO {
            return Err(PayrollError::NegativeHours(input.hours_worked));
        }
        if input.overtime_hours < Decimal::ZERO {
            return Err(PayrollError::NegativeHours(input.overtime_hours));
        }
        if input.pay_rate < Decimal::ZERO {
            return Err(PayrollError::NegativeRate(input.pay_rate));
        }
        if input.other_deductions < Decimal::ZERO {
            return Err(PayrollError::NegativeDeductions(input.other_deductions));
        }

        let periods = Decimal::from(self.config.periods_per_year);
        let gross_pay = match input.pay_basis {
            PayBasis::Salaried => round_half_up(input.pay_rate / periods),
            PayBasis::Hourly => round_half_up(
                input.hours_worked * input.pay_rate
                    + input.overtime_hours * input.pay_rate * self.config.overtime_multiplier,
            ),
        };

        let withholding = WithholdingCalculator::new(self.tables, self.config);
        let annual = withholding.annual_withholding(
            gross_pay * periods,
            input.filing_status,
            input.allowances,
            input.additional_withholding,
        )?;
        let federal_withholding = round_half_up(annual / periods);
        let state_withholding = round_half_up(gross_pay * self.config.state_withholding_rate);
        let fica = withholding.fica(gross_pay)?;

        let total_taxes = federal_withholding + state_withholding + fica.total();
        let net_pay = gross_pay - total_taxes - input.other_deductions;
        if net_pay < Decimal::ZERO {
            return Err(PayrollError::NegativeNetPay { net_pay });
        }

        Ok(PayrollLine {
            employee_id: input.employee_id.clone(),
            hours_worked: input.hours_worked,
            overtime_hours: input.overtime_hours,
            gross_pay,
            federal_withholding,
            state_withholding,
            social_security: fica.social_security,
            medicare: fica.medicare,
            additional_medicare: fica.additional_medicare,
            other_deductions: input.other_deductions,
            total_taxes,
            net_pay,
        })
    }

    /// Runs payroll for a whole period. Employees whose paycheck fails
    /// validation are collected into `line_errors`; the run itself only
    /// fails on configuration or period problems.
    pub fn run(
        &self,
        client_id: &str,
        period: Period,
        inputs: &[EmployeePayInput],
    ) -> Result<PayrollRunSummary, PayrollError> {
        self.config.validate()?;
        let pay_date = period.last_day()? + Duration::days(3);

        let mut lines = Vec::new();
        let mut line_errors = Vec::new();
        let mut compliance_alerts = Vec::new();
        for input in inputs {
            match self.calculate(input) {
                Ok(line) => {
                    compliance_alerts.extend(self.compliance_checks(input, &line));
                    lines.push(line);
                }
                Err(err) => {
                    warn!(
                        employee_id = %input.employee_id,
                        error = %err,
                        "skipping employee in payroll run"
                    );
                    line_errors.push(PayrollLineError {
                        employee_id: input.employee_id.clone(),
                        error: ItemError::new(err.kind(), err.to_string()),
                    });
                }
            }
        }

        let total_gross: Decimal = lines.iter().map(|l| l.gross_pay).sum();
        let total_taxes: Decimal = lines.iter().map(|l| l.total_taxes).sum();
        let total_net: Decimal = lines.iter().map(|l| l.net_pay).sum();
        let deposit = if total_taxes > Decimal::ZERO {
            Some(self.deposit_requirement(total_taxes, pay_date)?)
        } else {
            None
        };

        Ok(PayrollRunSummary {
            client_id: client_id.to_string(),
            period,
            pay_date,
            employee_count: lines.len(),
            total_gross,
            total_taxes,
            total_net,
            lines,
            line_errors,
            deposit,
            compliance_alerts,
        })
    }

    /// Deposit schedule for the taxes withheld in one run.
    ///
    /// Large liabilities deposit the next business day, mid-size ones on the
    /// semi-weekly calendar (Wednesday for mid-week paydays, Friday
    /// otherwise), everything else monthly on the 15th.
    pub fn deposit_requirement(
        &self,
        total_taxes: Decimal,
        pay_date: NaiveDate,
    ) -> Result<DepositRequirement, PayrollError> {
        let (schedule, due_date) = if total_taxes >= self.config.next_day_deposit_threshold {
            (DepositSchedule::NextBusinessDay, pay_date + Duration::days(1))
        } else if total_taxes >= self.config.semiweekly_deposit_threshold {
            let weekday = i64::from(pay_date.weekday().num_days_from_monday());
            let days_ahead = if (2..=4).contains(&weekday) {
                9 - weekday
            } else {
                (11 - weekday) % 7
            };
            (DepositSchedule::SemiWeekly, pay_date + Duration::days(days_ahead))
        } else {
            let (year, month) = if pay_date.month() == 12 {
                (pay_date.year() + 1, 1)
            } else {
                (pay_date.year(), pay_date.month() + 1)
            };
            let due = NaiveDate::from_ymd_opt(year, month, 15)
                .ok_or(PayrollError::DueDateOutOfRange(year))?;
            (DepositSchedule::Monthly, due)
        };
        let federal_amount = round_half_up(total_taxes * self.config.federal_deposit_share);
        Ok(DepositRequirement {
            schedule,
            due_date,
            federal_amount,
            state_amount: round_half_up(total_taxes - federal_amount),
        })
    }

    fn compliance_checks(
        &self,
        input: &EmployeePayInput,
        line: &PayrollLine,
    ) -> Vec<ComplianceAlert> {
        let mut alerts = Vec::new();
        if line.hours_worked > Decimal::ZERO {
            let effective_rate = line.gross_pay / line.hours_worked;
            if effective_rate < self.config.minimum_wage {
                alerts.push(ComplianceAlert {
                    kind: ComplianceAlertKind::MinimumWageViolation,
                    severity: Severity::High,
                    employee_id: input.employee_id.clone(),
                    message: format!(
                        "Effective hourly rate ${} is below the minimum wage ${}",
                        round_half_up(effective_rate),
                        self.config.minimum_wage
                    ),
                    recommendation: "Review hourly rate and ensure minimum wage compliance"
                        .to_string(),
                });
            }
        }
        if line.hours_worked > self.config.standard_workweek_hours
            && line.overtime_hours == Decimal::ZERO
        {
            alerts.push(ComplianceAlert {
                kind: ComplianceAlertKind::OvertimeCompliance,
                severity: Severity::Medium,
                employee_id: input.employee_id.clone(),
                message: format!(
                    "Worked {} hours with no overtime recorded",
                    line.hours_worked
                ),
                recommendation: "Verify overtime exemption status or correct the hours".to_string(),
            });
        }
        if line.gross_pay > Decimal::ZERO {
            let ratio = line.total_taxes / line.gross_pay;
            if ratio > self.config.high_withholding_ratio {
                let percent = (ratio * Decimal::ONE_HUNDRED)
                    .round_dp_with_strategy(1, RoundingStrategy::MidpointAwayFromZero);
                alerts.push(ComplianceAlert {
                    kind: ComplianceAlertKind::HighWithholding,
                    severity: Severity::Low,
                    employee_id: input.employee_id.clone(),
                    message: format!("Withholding is {percent}% of gross pay"),
                    recommendation: "Review withholding elections and deductions".to_string(),
                });
            }
        }
        alerts
    }
}
