use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use super::filing_status::FilingStatus;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum PayrollConfigError {
    #[error("periods per year must be at least 1")]
    ZeroPeriods,
    #[error("{field} {value} is outside the range 0..=1")]
    RateOutOfRange { field: &'static str, value: Decimal },
    #[error("{field} {value} must not be negative")]
    NegativeAmount { field: &'static str, value: Decimal },
    #[error("overtime multiplier {0} must be at least 1")]
    OvertimeMultiplierTooLow(Decimal),
    #[error(
        "next-day deposit threshold {next_day} must not be below semi-weekly threshold {semi_weekly}"
    )]
    DepositThresholdsOutOfOrder {
        next_day: Decimal,
        semi_weekly: Decimal,
    },
}

/// Employer-side payroll parameters: pay frequency, FICA rates, the flat state
/// withholding approximation, and deposit/compliance thresholds.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PayrollConfig {
    /// Pay periods per year; 26 models a bi-weekly cycle.
    pub periods_per_year: u32,
    /// Employee share of social security tax.
    pub social_security_rate: Decimal,
    /// Annual wage base above which social security stops accruing.
    pub social_security_wage_base: Decimal,
    /// Employee share of medicare tax, uncapped.
    pub medicare_rate: Decimal,
    /// Additional medicare rate once annualized wages pass the threshold.
    pub additional_medicare_rate: Decimal,
    /// Annualized wage threshold for additional medicare withholding.
    pub additional_medicare_threshold: Decimal,
    /// Annual withholding allowance amount.
    pub per_allowance: Decimal,
    /// Flat state withholding approximation applied to gross pay.
    pub state_withholding_rate: Decimal,
    /// Premium applied to overtime hours.
    pub overtime_multiplier: Decimal,
    /// Hourly floor used by the minimum-wage compliance check.
    pub minimum_wage: Decimal,
    /// Hours above which unrecorded overtime is flagged.
    pub standard_workweek_hours: Decimal,
    /// Tax-to-gross ratio above which withholding is flagged for review.
    pub high_withholding_ratio: Decimal,
    /// Per-run tax total requiring a next-business-day deposit.
    pub next_day_deposit_threshold: Decimal,
    /// Per-run tax total placing the employer on a semi-weekly schedule.
    pub semiweekly_deposit_threshold: Decimal,
    /// Share of a deposit attributed to federal liabilities.
    pub federal_deposit_share: Decimal,
}

impl Default for PayrollConfig {
    fn default() -> Self {
        PayrollConfig {
            periods_per_year: 26,
            social_security_rate: Decimal::new(62, 3),
            social_security_wage_base: Decimal::new(160_200, 0),
            medicare_rate: Decimal::new(145, 4),
            additional_medicare_rate: Decimal::new(9, 3),
            additional_medicare_threshold: Decimal::new(200_000, 0),
            per_allowance: Decimal::new(4_300, 0),
            state_withholding_rate: Decimal::new(5, 2),
            overtime_multiplier: Decimal::new(15, 1),
            minimum_wage: Decimal::new(725, 2),
            standard_workweek_hours: Decimal::new(40, 0),
            high_withholding_ratio: Decimal::new(50, 2),
            next_day_deposit_threshold: Decimal::new(100_000, 0),
            semiweekly_deposit_threshold: Decimal::new(50_000, 0),
            federal_deposit_share: Decimal::new(90, 2),
        }
    }
}

impl PayrollConfig {
    pub fn validate(&self) -> Result<(), PayrollConfigError> {
        if self.periods_per_year == 0 {
            return Err(PayrollConfigError::ZeroPeriods);
        }
        for (field, value) in [
            ("social security rate", self.social_security_rate),
            ("medicare rate", self.medicare_rate),
            ("additional medicare rate", self.additional_medicare_rate),
            ("state withholding rate", self.state_withholding_rate),
            ("high withholding ratio", self.high_withholding_ratio),
            ("federal deposit share", self.federal_deposit_share),
        ] {
            if value < Decimal::ZERO || value > Decimal::ONE {
                return Err(PayrollConfigError::RateOutOfRange { field, value });
            }
        }
        for (field, value) in [
            ("social security wage base", self.social_security_wage_base),
            ("additional medicare threshold", self.additional_medicare_threshold),
            ("per-allowance amount", self.per_allowance),
            ("minimum wage", self.minimum_wage),
            ("standard workweek hours", self.standard_workweek_hours),
            ("next-day deposit threshold", self.next_day_deposit_threshold),
            ("semi-weekly deposit threshold", self.semiweekly_deposit_threshold),
        ] {
            if value < Decimal::ZERO {
                return Err(PayrollConfigError::NegativeAmount { field, value });
            }
        }
        if self.overtime_multiplier < Decimal::ONE {
            return Err(PayrollConfigError::OvertimeMultiplierTooLow(
                self.overtime_multiplier,
            ));
        }
        if self.next_day_deposit_threshold < self.semiweekly_deposit_threshold {
            return Err(PayrollConfigError::DepositThresholdsOutOfOrder {
                next_day: self.next_day_deposit_threshold,
                semi_weekly: self.semiweekly_deposit_threshold,
            });
        }
        Ok(())
    }
}

#[derive(Debug, Error, PartialEq, Eq)]
pub enum TaxPolicyError {
    #[error("{field} {value} is outside the range 0..=1")]
    RateOutOfRange { field: &'static str, value: Decimal },
    #[error("{field} {value} must not be negative")]
    NegativeAmount { field: &'static str, value: Decimal },
    #[error("safe harbor factor {0} must be at least 1")]
    SafeHarborFactorTooLow(Decimal),
}

/// Entity-level tax parameters: self-employment rates, the S-corp salary
/// policy, flat state approximations, and advisory thresholds.
///
/// Every number here is policy data rather than statute; callers swap the
/// whole policy to model a different year or jurisdiction posture.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TaxPolicy {
    /// Portion of net earnings subject to self-employment tax.
    pub se_earnings_factor: Decimal,
    /// Combined employer and employee social security rate for SE tax.
    pub se_social_security_rate: Decimal,
    /// Wage base capping the social security portion of SE tax.
    pub se_social_security_wage_base: Decimal,
    /// Combined medicare rate for SE tax, uncapped.
    pub se_medicare_rate: Decimal,
    /// Additional medicare rate above the filing-status threshold.
    pub se_additional_medicare_rate: Decimal,
    /// Additional medicare threshold for non-joint filers.
    pub se_additional_threshold_single: Decimal,
    /// Additional medicare threshold for joint filers.
    pub se_additional_threshold_joint: Decimal,
    /// Fraction of net income treated as a reasonable S-corp salary.
    pub scorp_salary_fraction: Decimal,
    /// Ceiling on the assumed reasonable salary.
    pub scorp_salary_ceiling: Decimal,
    /// Combined employer and employee payroll tax rate on S-corp salary.
    pub combined_payroll_tax_rate: Decimal,
    /// Flat federal rate for C-corporations.
    pub corporate_federal_rate: Decimal,
    /// Flat state approximation for C-corporations.
    pub corporate_state_rate: Decimal,
    /// Flat state approximation for pass-through entities.
    pub pass_through_state_rate: Decimal,
    /// States whose codes suppress the flat state approximation entirely.
    pub no_income_tax_states: Vec<String>,
    /// Multiplier applied to total tax for the safe-harbor estimate.
    pub safe_harbor_factor: Decimal,
    /// Effective rate above which a tax-reduction recommendation fires.
    pub high_effective_rate_threshold: Decimal,
    /// Gross income above which an S-corp election is suggested.
    pub entity_election_income_threshold: Decimal,
    /// Taxable income above which retirement planning is suggested.
    pub retirement_income_threshold: Decimal,
    /// Cap on the modeled retirement contribution.
    pub retirement_contribution_cap: Decimal,
}

impl Default for TaxPolicy {
    fn default() -> Self {
        TaxPolicy {
            se_earnings_factor: Decimal::new(9_235, 4),
            se_social_security_rate: Decimal::new(124, 3),
            se_social_security_wage_base: Decimal::new(160_200, 0),
            se_medicare_rate: Decimal::new(29, 3),
            se_additional_medicare_rate: Decimal::new(9, 3),
            se_additional_threshold_single: Decimal::new(200_000, 0),
            se_additional_threshold_joint: Decimal::new(250_000, 0),
            scorp_salary_fraction: Decimal::new(40, 2),
            scorp_salary_ceiling: Decimal::new(100_000, 0),
            combined_payroll_tax_rate: Decimal::new(153, 3),
            corporate_federal_rate: Decimal::new(21, 2),
            corporate_state_rate: Decimal::new(6, 2),
            pass_through_state_rate: Decimal::new(5, 2),
            no_income_tax_states: vec!["TX".to_string()],
            safe_harbor_factor: Decimal::new(110, 2),
            high_effective_rate_threshold: Decimal::new(25, 2),
            entity_election_income_threshold: Decimal::new(100_000, 0),
            retirement_income_threshold: Decimal::new(50_000, 0),
            retirement_contribution_cap: Decimal::new(66_000, 0),
        }
    }
}

impl TaxPolicy {
    pub fn validate(&self) -> Result<(), TaxPolicyError> {
        for (field, value) in [
            ("SE earnings factor", self.se_earnings_factor),
            ("SE social security rate", self.se_social_security_rate),
            ("SE medicare rate", self.se_medicare_rate),
            ("SE additional medicare rate", self.se_additional_medicare_rate),
            ("S-corp salary fraction", self.scorp_salary_fraction),
            ("combined payroll tax rate", self.combined_payroll_tax_rate),
            ("corporate federal rate", self.corporate_federal_rate),
            ("corporate state rate", self.corporate_state_rate),
            ("pass-through state rate", self.pass_through_state_rate),
            ("high effective rate threshold", self.high_effective_rate_threshold),
        ] {
            if value < Decimal::ZERO || value > Decimal::ONE {
                return Err(TaxPolicyError::RateOutOfRange { field, value });
            }
        }
        for (field, value) in [
            ("SE social security wage base", self.se_social_security_wage_base),
            ("SE additional threshold (single)", self.se_additional_threshold_single),
            ("SE additional threshold (joint)", self.se_additional_threshold_joint),
            ("S-corp salary ceiling", self.scorp_salary_ceiling),
            ("entity election income threshold", self.entity_election_income_threshold),
            ("retirement income threshold", self.retirement_income_threshold),
            ("retirement contribution cap", self.retirement_contribution_cap),
        ] {
            if value < Decimal::ZERO {
                return Err(TaxPolicyError::NegativeAmount { field, value });
            }
        }
        if self.safe_harbor_factor < Decimal::ONE {
            return Err(TaxPolicyError::SafeHarborFactorTooLow(self.safe_harbor_factor));
        }
        Ok(())
    }

    pub fn se_additional_threshold(&self, status: FilingStatus) -> Decimal {
        match status {
            FilingStatus::MarriedJoint => self.se_additional_threshold_joint,
            _ => self.se_additional_threshold_single,
        }
    }

    /// Flat state rate for pass-through income, zero for exempt states.
    pub fn pass_through_rate_for(&self, state: &str) -> Decimal {
        if self.state_is_exempt(state) {
            Decimal::ZERO
        } else {
            self.pass_through_state_rate
        }
    }

    /// Flat state rate for corporate income, zero for exempt states.
    pub fn corporate_rate_for(&self, state: &str) -> Decimal {
        if self.state_is_exempt(state) {
            Decimal::ZERO
        } else {
            self.corporate_state_rate
        }
    }

    fn state_is_exempt(&self, state: &str) -> bool {
        state.is_empty() || self.no_income_tax_states.iter().any(|code| code == state)
    }
}
