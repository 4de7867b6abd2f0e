//! Self-employment tax on net business income.

use rust_decimal::Decimal;
use serde::Serialize;

use crate::calculations::common::{max, round_half_up};
use crate::models::{FilingStatus, TaxPolicy, TaxPolicyError};

/// Component view of the self-employment tax.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SeTaxBreakdown {
    /// Net income scaled by the earnings factor before any tax applies.
    pub net_earnings: Decimal,
    pub social_security: Decimal,
    pub medicare: Decimal,
    pub additional_medicare: Decimal,
    pub total: Decimal,
}

impl SeTaxBreakdown {
    pub fn zero() -> Self {
        SeTaxBreakdown {
            net_earnings: Decimal::ZERO,
            social_security: Decimal::ZERO,
            medicare: Decimal::ZERO,
            additional_medicare: Decimal::ZERO,
            total: Decimal::ZERO,
        }
    }
}

pub struct SeTaxCalculator<'a> {
    policy: &'a TaxPolicy,
}

impl<'a> SeTaxCalculator<'a> {
    pub fn new(policy: &'a TaxPolicy) -> Self {
        SeTaxCalculator { policy }
    }

    /// Self-employment tax on `net_income`. Zero or negative net income owes
    /// nothing and is not an error.
    pub fn calculate(
        &self,
        net_income: Decimal,
        status: FilingStatus,
    ) -> Result<SeTaxBreakdown, TaxPolicyError> {
        self.policy.validate()?;
        if net_income <= Decimal::ZERO {
            return Ok(SeTaxBreakdown::zero());
        }
        let net_earnings = round_half_up(net_income * self.policy.se_earnings_factor);
        let ss_base = net_earnings.min(self.policy.se_social_security_wage_base);
        let social_security = round_half_up(ss_base * self.policy.se_social_security_rate);
        let medicare = round_half_up(net_earnings * self.policy.se_medicare_rate);
        let threshold = self.policy.se_additional_threshold(status);
        let additional_medicare = round_half_up(
            max(Decimal::ZERO, net_earnings - threshold) * self.policy.se_additional_medicare_rate,
        );
        Ok(SeTaxBreakdown {
            net_earnings,
            social_security,
            medicare,
            additional_medicare,
            total: social_security + medicare + additional_medicare,
        })
    }
}
