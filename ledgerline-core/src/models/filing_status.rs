use std::fmt;

use serde::{Deserialize, Serialize};

/// Filing status used to pick bracket schedules and standard deductions.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FilingStatus {
    Single,
    MarriedJoint,
    MarriedSeparate,
    HeadOfHousehold,
}

impl FilingStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            FilingStatus::Single => "single",
            FilingStatus::MarriedJoint => "married_joint",
            FilingStatus::MarriedSeparate => "married_separate",
            FilingStatus::HeadOfHousehold => "head_of_household",
        }
    }

    pub fn parse(value: &str) -> Option<Self> {
        match value {
            "single" => Some(FilingStatus::Single),
            "married_joint" | "married" | "married_filing_jointly" => Some(FilingStatus::MarriedJoint),
            "married_separate" | "married_filing_separately" => Some(FilingStatus::MarriedSeparate),
            "head_of_household" => Some(FilingStatus::HeadOfHousehold),
            _ => None,
        }
    }
}

impl fmt::Display for FilingStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;

    use super::*;

    #[test]
    fn parse_accepts_canonical_codes() {
        assert_eq!(FilingStatus::parse("single"), Some(FilingStatus::Single));
        assert_eq!(FilingStatus::parse("married_joint"), Some(FilingStatus::MarriedJoint));
        assert_eq!(FilingStatus::parse("married_separate"), Some(FilingStatus::MarriedSeparate));
        assert_eq!(FilingStatus::parse("head_of_household"), Some(FilingStatus::HeadOfHousehold));
    }

    #[test]
    fn parse_accepts_long_form_aliases() {
        assert_eq!(FilingStatus::parse("married"), Some(FilingStatus::MarriedJoint));
        assert_eq!(
            FilingStatus::parse("married_filing_jointly"),
            Some(FilingStatus::MarriedJoint)
        );
        assert_eq!(
            FilingStatus::parse("married_filing_separately"),
            Some(FilingStatus::MarriedSeparate)
        );
    }

    #[test]
    fn parse_rejects_unknown_codes() {
        assert_eq!(FilingStatus::parse("widowed"), None);
        assert_eq!(FilingStatus::parse(""), None);
        assert_eq!(FilingStatus::parse("SINGLE"), None);
    }

    #[test]
    fn as_str_round_trips_through_parse() {
        for status in [
            FilingStatus::Single,
            FilingStatus::MarriedJoint,
            FilingStatus::MarriedSeparate,
            FilingStatus::HeadOfHousehold,
        ] {
            assert_eq!(FilingStatus::parse(status.as_str()), Some(status));
        }
    }
}
