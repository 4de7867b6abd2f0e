//! Federal income tax withholding and FICA amounts.
//!
//! Income tax withholding works on annualized wages: reduce by allowances
//! and the standard deduction, floor at zero, run the percentage-method
//! schedule, then add any flat extra withholding. Callers divide the annual
//! figure across their pay periods. FICA works per period.

use rust_decimal::Decimal;
use serde::Serialize;
use thiserror::Error;
use tracing::warn;

use crate::calculations::brackets::{BracketCalculator, BracketError};
use crate::calculations::common::{max, round_half_up};
use crate::error::ErrorKind;
use crate::models::{FilingStatus, PayrollConfig, PayrollConfigError, WithholdingTableSet};

#[derive(Debug, Error, PartialEq, Eq)]
pub enum WithholdingError {
    #[error(transparent)]
    Config(#[from] PayrollConfigError),
    #[error("no standard deduction configured for filing status {0}")]
    MissingStandardDeduction(FilingStatus),
    #[error("gross pay cannot be negative, got {0}")]
    NegativeGross(Decimal),
    #[error("additional withholding cannot be negative, got {0}")]
    NegativeAdditional(Decimal),
    #[error(transparent)]
    Bracket(#[from] BracketError),
}

impl WithholdingError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            WithholdingError::Config(_) => ErrorKind::Configuration,
            WithholdingError::MissingStandardDeduction(_) => ErrorKind::Configuration,
            WithholdingError::NegativeGross(_) => ErrorKind::InvalidInput,
            WithholdingError::NegativeAdditional(_) => ErrorKind::InvalidInput,
            WithholdingError::Bracket(err) => err.kind(),
        }
    }
}

/// Employee share of FICA for one pay period.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FicaWithholding {
    pub social_security: Decimal,
    pub medicare: Decimal,
    pub additional_medicare: Decimal,
}

impl FicaWithholding {
    pub fn total(&self) -> Decimal {
        self.social_security + self.medicare + self.additional_medicare
    }
}

pub struct WithholdingCalculator<'a> {
    tables: &'a WithholdingTableSet,
    config: &'a PayrollConfig,
}

impl<'a> WithholdingCalculator<'a> {
    pub fn new(tables: &'a WithholdingTableSet, config: &'a PayrollConfig) -> Self {
        WithholdingCalculator { tables, config }
    }

    /// Annual federal income tax withholding.
    ///
    /// `additional` is an annual flat amount added after the schedule runs;
    /// the floor at zero applies to taxable wages, not to the extra amount.
    pub fn annual_withholding(
        &self,
        annual_gross: Decimal,
        status: FilingStatus,
        allowances: u32,
        additional: Decimal,
    ) -> Result<Decimal, WithholdingError> {
        self.config.validate()?;
        if annual_gross < Decimal::ZERO {
            return Err(WithholdingError::NegativeGross(annual_gross));
        }
        if additional < Decimal::ZERO {
            return Err(WithholdingError::NegativeAdditional(additional));
        }
        let deduction = self
            .tables
            .standard_deduction(status)
            .ok_or(WithholdingError::MissingStandardDeduction(status))?;
        let allowance_total = Decimal::from(allowances) * self.config.per_allowance;
        let taxable = max(Decimal::ZERO, annual_gross - allowance_total - deduction);
        let schedule = self.tables.schedule_for(status);
        let tax = BracketCalculator::new(schedule).tax(taxable)?;
        Ok(round_half_up(tax + additional))
    }

    /// Employee FICA withholding on one period's gross pay.
    ///
    /// Social security caps at the wage base spread evenly over the year's
    /// periods. Medicare is uncapped. The additional medicare surtax applies
    /// to the whole period only when annualized gross exceeds the threshold;
    /// there is no partial-period proration.
    pub fn fica(&self, gross: Decimal) -> Result<FicaWithholding, WithholdingError> {
        self.config.validate()?;
        if gross < Decimal::ZERO {
            return Err(WithholdingError::NegativeGross(gross));
        }
        let periods = Decimal::from(self.config.periods_per_year);
        let period_wage_base = self.config.social_security_wage_base / periods;
        let ss_base = if gross > period_wage_base {
            warn!(
                gross = %gross,
                period_wage_base = %round_half_up(period_wage_base),
                "gross pay exceeds the per-period social security wage base"
            );
            period_wage_base
        } else {
            gross
        };
        let additional_medicare = if gross * periods > self.config.additional_medicare_threshold {
            round_half_up(gross * self.config.additional_medicare_rate)
        } else {
            Decimal::ZERO
        };
        Ok(FicaWithholding {
            social_security: round_half_up(ss_base * self.config.social_security_rate),
            medicare: round_half_up(gross * self.config.medicare_rate),
            additional_medicare,
        })
    }
}
