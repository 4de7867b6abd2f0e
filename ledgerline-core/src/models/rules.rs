use regex::Regex;
use rust_decimal::Decimal;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum RuleSetError {
    #[error("invalid classification pattern {pattern:?}: {source}")]
    InvalidPattern {
        pattern: String,
        source: regex::Error,
    },
}

/// Description-matching rule. Patterns are regular expressions; the built-in
/// rules carry a `(?i)` flag so matching is case-insensitive.
#[derive(Debug, Clone)]
pub struct PatternRule {
    pattern: String,
    matcher: Regex,
    pub category: String,
    pub subcategory: String,
    pub confidence: Decimal,
}

impl PatternRule {
    pub fn new(
        pattern: &str,
        category: impl Into<String>,
        subcategory: impl Into<String>,
    ) -> Result<Self, RuleSetError> {
        let matcher = Regex::new(pattern).map_err(|source| RuleSetError::InvalidPattern {
            pattern: pattern.to_string(),
            source,
        })?;
        Ok(PatternRule {
            pattern: pattern.to_string(),
            matcher,
            category: category.into(),
            subcategory: subcategory.into(),
            confidence: Decimal::new(9, 1),
        })
    }

    pub fn pattern(&self) -> &str {
        &self.pattern
    }

    pub fn is_match(&self, description: &str) -> bool {
        self.matcher.is_match(description)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AmountBound {
    /// Matches when the absolute amount is at least the rule amount.
    Min,
    /// Matches when the absolute amount is at most the rule amount.
    Max,
}

/// Magnitude-based rule applied after every pattern rule has missed.
#[derive(Debug, Clone)]
pub struct AmountRule {
    pub bound: AmountBound,
    pub amount: Decimal,
    pub category: String,
    pub subcategory: String,
    pub confidence: Decimal,
}

impl AmountRule {
    pub fn min_amount(
        amount: Decimal,
        category: impl Into<String>,
        subcategory: impl Into<String>,
    ) -> Self {
        AmountRule {
            bound: AmountBound::Min,
            amount,
            category: category.into(),
            subcategory: subcategory.into(),
            confidence: Decimal::new(7, 1),
        }
    }

    pub fn max_amount(
        amount: Decimal,
        category: impl Into<String>,
        subcategory: impl Into<String>,
    ) -> Self {
        AmountRule {
            bound: AmountBound::Max,
            amount,
            category: category.into(),
            subcategory: subcategory.into(),
            confidence: Decimal::new(6, 1),
        }
    }

    pub fn matches(&self, amount: Decimal) -> bool {
        let magnitude = amount.abs();
        match self.bound {
            AmountBound::Min => magnitude >= self.amount,
            AmountBound::Max => magnitude <= self.amount,
        }
    }
}

/// Ordered classification rules. Pattern rules are tried top to bottom and
/// the first match wins, so more specific patterns belong earlier.
#[derive(Debug, Clone, Default)]
pub struct RuleSet {
    pub pattern_rules: Vec<PatternRule>,
    pub amount_rules: Vec<AmountRule>,
}

impl RuleSet {
    pub fn new(pattern_rules: Vec<PatternRule>, amount_rules: Vec<AmountRule>) -> Self {
        RuleSet {
            pattern_rules,
            amount_rules,
        }
    }

    /// Built-in vendor and amount rules covering common small-business
    /// ledger descriptions.
    pub fn default_rules() -> Result<Self, RuleSetError> {
        let patterns = [
            (r"(?i)amazon|amzn", "Office Supplies", "General"),
            (r"(?i)gas|fuel|shell|exxon|bp", "Vehicle Expenses", "Fuel"),
            (r"(?i)office depot|staples|best buy", "Office Supplies", "Equipment"),
            (r"(?i)restaurant|cafe|food|dining", "Meals & Entertainment", "Business Meals"),
            (r"(?i)hotel|motel|lodging|airbnb", "Travel", "Lodging"),
            (r"(?i)airline|flight|airport", "Travel", "Airfare"),
            (r"(?i)internet|phone|verizon|att|comcast", "Utilities", "Communications"),
            (r"(?i)electric|power|gas company|water", "Utilities", "Basic Utilities"),
            (r"(?i)insurance", "Insurance", "General"),
            (r"(?i)bank fee|service charge", "Bank Charges", "Fees"),
            (r"(?i)payroll|salary|wages", "Payroll", "Wages"),
            (r"(?i)rent|lease", "Rent", "Office Rent"),
            (r"(?i)legal|attorney|law", "Professional Services", "Legal"),
            (r"(?i)accounting|bookkeeping|cpa", "Professional Services", "Accounting"),
            (r"(?i)marketing|advertising|google ads", "Marketing", "Advertising"),
            (r"(?i)software|subscription|saas", "Software", "Subscriptions"),
        ];
        let mut pattern_rules = Vec::with_capacity(patterns.len());
        for (pattern, category, subcategory) in patterns {
            pattern_rules.push(PatternRule::new(pattern, category, subcategory)?);
        }
        let amount_rules = vec![
            AmountRule::min_amount(Decimal::new(5_000, 0), "Equipment", "Major Equipment"),
            AmountRule::max_amount(Decimal::new(25, 0), "Office Supplies", "Miscellaneous"),
        ];
        Ok(RuleSet::new(pattern_rules, amount_rules))
    }
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;
    use rust_decimal_macros::dec;

    use super::*;

    #[test]
    fn pattern_rules_match_case_insensitively() {
        let rule = PatternRule::new(r"(?i)shell|exxon", "Vehicle Expenses", "Fuel").unwrap();
        assert!(rule.is_match("SHELL OIL 57444"));
        assert!(rule.is_match("exxon station"));
        assert!(!rule.is_match("grocery store"));
    }

    #[test]
    fn pattern_rule_rejects_invalid_regex() {
        let err = PatternRule::new(r"(?i)[unclosed", "Misc", "Misc").unwrap_err();
        match err {
            RuleSetError::InvalidPattern { pattern, .. } => {
                assert_eq!(pattern, r"(?i)[unclosed");
            }
        }
    }

    #[test]
    fn amount_rules_compare_magnitudes() {
        let min = AmountRule::min_amount(dec!(5000), "Equipment", "Major Equipment");
        assert!(min.matches(dec!(-7500)));
        assert!(min.matches(dec!(5000)));
        assert!(!min.matches(dec!(4999.99)));

        let max = AmountRule::max_amount(dec!(25), "Office Supplies", "Miscellaneous");
        assert!(max.matches(dec!(-12.50)));
        assert!(max.matches(dec!(25)));
        assert!(!max.matches(dec!(25.01)));
    }

    #[test]
    fn default_rules_compile() {
        let rules = RuleSet::default_rules().unwrap();
        assert_eq!(rules.pattern_rules.len(), 16);
        assert_eq!(rules.amount_rules.len(), 2);
        for rule in &rules.pattern_rules {
            assert_eq!(rule.confidence, dec!(0.9), "{}", rule.pattern());
        }
        assert_eq!(rules.amount_rules[0].confidence, dec!(0.7));
        assert_eq!(rules.amount_rules[1].confidence, dec!(0.6));
    }
}
