use std::collections::HashMap;

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// Sales tax posture of one jurisdiction.
///
/// `nexus_threshold_sales` of `None` means the jurisdiction levies no sales
/// tax at all; threshold tracking is a no-op there. A transaction-count
/// threshold, where present, is recorded alongside cumulative counts but does
/// not by itself trigger an escalation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct JurisdictionRates {
    /// State-level rate applied to state-jurisdiction sales.
    pub state_rate: Decimal,
    /// Combined average rate including local surcharges.
    pub combined_rate: Decimal,
    /// Economic nexus threshold on cumulative sales.
    pub nexus_threshold_sales: Option<Decimal>,
    /// Economic nexus threshold on cumulative transaction count.
    pub nexus_threshold_transactions: Option<i64>,
}

impl JurisdictionRates {
    /// Rate for a sale in the named locality. `None` and the literal
    /// `"State"` locality use the state rate; anything else uses the
    /// combined average.
    pub fn rate_for_locality(&self, locality: Option<&str>) -> Decimal {
        match locality {
            None => self.state_rate,
            Some("State") => self.state_rate,
            Some(_) => self.combined_rate,
        }
    }
}

/// Rate and threshold lookup keyed by jurisdiction code.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct JurisdictionTable {
    rates: HashMap<String, JurisdictionRates>,
}

impl JurisdictionTable {
    pub fn new() -> Self {
        JurisdictionTable::default()
    }

    pub fn insert(&mut self, code: impl Into<String>, rates: JurisdictionRates) {
        self.rates.insert(code.into(), rates);
    }

    pub fn get(&self, code: &str) -> Option<&JurisdictionRates> {
        self.rates.get(code)
    }

    pub fn len(&self) -> usize {
        self.rates.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rates.is_empty()
    }

    /// Illustrative state-level table covering all fifty US states.
    /// Replaceable data, not authoritative guidance.
    pub fn default_states() -> Self {
        fn r(mantissa: i64, scale: u32) -> Decimal {
            Decimal::new(mantissa, scale)
        }
        fn entry(
            state_rate: Decimal,
            combined_rate: Decimal,
            threshold_sales: Option<i64>,
            threshold_transactions: Option<i64>,
        ) -> JurisdictionRates {
            JurisdictionRates {
                state_rate,
                combined_rate,
                nexus_threshold_sales: threshold_sales.map(|t| Decimal::new(t, 0)),
                nexus_threshold_transactions: threshold_transactions,
            }
        }

        let mut table = JurisdictionTable::new();
        table.insert("AL", entry(r(4, 2), r(91, 3), Some(250_000), Some(200)));
        table.insert("AK", entry(r(0, 2), r(18, 3), Some(100_000), Some(200)));
        table.insert("AZ", entry(r(56, 3), r(83, 3), Some(100_000), Some(200)));
        table.insert("AR", entry(r(65, 3), r(94, 3), Some(100_000), Some(200)));
        table.insert("CA", entry(r(725, 4), r(10, 2), Some(500_000), None));
        table.insert("CO", entry(r(29, 3), r(77, 3), Some(100_000), Some(200)));
        table.insert("CT", entry(r(635, 4), r(635, 4), Some(100_000), Some(200)));
        table.insert("DE", entry(r(0, 2), r(0, 2), None, None));
        table.insert("FL", entry(r(6, 2), r(72, 3), Some(100_000), None));
        table.insert("GA", entry(r(4, 2), r(73, 3), Some(100_000), Some(200)));
        table.insert("HI", entry(r(4, 2), r(45, 3), Some(100_000), Some(200)));
        table.insert("ID", entry(r(6, 2), r(63, 3), Some(100_000), None));
        table.insert("IL", entry(r(625, 4), r(889, 4), Some(100_000), Some(200)));
        table.insert("IN", entry(r(7, 2), r(7, 2), Some(100_000), Some(200)));
        table.insert("IA", entry(r(6, 2), r(68, 3), Some(100_000), Some(200)));
        table.insert("KS", entry(r(65, 3), r(86, 3), Some(100_000), None));
        table.insert("KY", entry(r(6, 2), r(6, 2), Some(100_000), Some(200)));
        table.insert("LA", entry(r(445, 4), r(955, 4), Some(100_000), Some(200)));
        table.insert("ME", entry(r(55, 3), r(55, 3), Some(100_000), Some(200)));
        table.insert("MD", entry(r(6, 2), r(6, 2), Some(100_000), Some(200)));
        table.insert("MA", entry(r(625, 4), r(625, 4), Some(100_000), None));
        table.insert("MI", entry(r(6, 2), r(6, 2), Some(100_000), Some(200)));
        table.insert("MN", entry(r(6_875, 5), r(7_375, 5), Some(100_000), Some(200)));
        table.insert("MS", entry(r(7, 2), r(71, 3), Some(250_000), None));
        table.insert("MO", entry(r(4_225, 5), r(8_175, 5), Some(100_000), None));
        table.insert("MT", entry(r(0, 2), r(0, 2), None, None));
        table.insert("NE", entry(r(55, 3), r(69, 3), Some(100_000), Some(200)));
        table.insert("NV", entry(r(685, 4), r(815, 4), Some(100_000), Some(200)));
        table.insert("NH", entry(r(0, 2), r(0, 2), None, None));
        table.insert("NJ", entry(r(6_625, 5), r(6_625, 5), Some(100_000), Some(200)));
        table.insert("NM", entry(r(5_125, 5), r(7_725, 5), Some(100_000), None));
        table.insert("NY", entry(r(4, 2), r(88, 3), Some(500_000), Some(100)));
        table.insert("NC", entry(r(475, 4), r(695, 4), Some(100_000), Some(200)));
        table.insert("ND", entry(r(5, 2), r(68, 3), Some(100_000), None));
        table.insert("OH", entry(r(575, 4), r(715, 4), Some(100_000), Some(200)));
        table.insert("OK", entry(r(45, 3), r(89, 3), Some(100_000), None));
        table.insert("OR", entry(r(0, 2), r(0, 2), None, None));
        table.insert("PA", entry(r(6, 2), r(63, 3), Some(100_000), None));
        table.insert("RI", entry(r(7, 2), r(7, 2), Some(100_000), Some(200)));
        table.insert("SC", entry(r(6, 2), r(75, 3), Some(100_000), None));
        table.insert("SD", entry(r(45, 3), r(64, 3), Some(100_000), Some(200)));
        table.insert("TN", entry(r(7, 2), r(95, 3), Some(100_000), None));
        table.insert("TX", entry(r(625, 4), r(82, 3), Some(500_000), None));
        table.insert("UT", entry(r(485, 4), r(625, 4), Some(100_000), Some(200)));
        table.insert("VT", entry(r(6, 2), r(61, 3), Some(100_000), Some(200)));
        table.insert("VA", entry(r(53, 3), r(58, 3), Some(100_000), Some(200)));
        table.insert("WA", entry(r(65, 3), r(93, 3), Some(100_000), Some(200)));
        table.insert("WV", entry(r(6, 2), r(67, 3), Some(100_000), Some(200)));
        table.insert("WI", entry(r(5, 2), r(54, 3), Some(100_000), Some(200)));
        table.insert("WY", entry(r(4, 2), r(55, 3), Some(100_000), Some(200)));
        table
    }
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;
    use rust_decimal_macros::dec;

    use super::*;

    #[test]
    fn default_table_covers_fifty_states() {
        let table = JurisdictionTable::default_states();
        assert_eq!(table.len(), 50);
        assert!(table.get("CA").is_some());
        assert!(table.get("PR").is_none());
    }

    #[test]
    fn no_sales_tax_states_have_no_thresholds() {
        let table = JurisdictionTable::default_states();
        for code in ["DE", "MT", "NH", "OR"] {
            let rates = table.get(code).unwrap();
            assert_eq!(rates.nexus_threshold_sales, None, "{code}");
            assert_eq!(rates.state_rate, Decimal::ZERO, "{code}");
        }
    }

    #[test]
    fn locality_selects_state_or_combined_rate() {
        let table = JurisdictionTable::default_states();
        let ca = table.get("CA").unwrap();
        assert_eq!(ca.rate_for_locality(None), dec!(0.0725));
        assert_eq!(ca.rate_for_locality(Some("State")), dec!(0.0725));
        assert_eq!(ca.rate_for_locality(Some("Los Angeles County")), dec!(0.10));
    }

    #[test]
    fn thresholds_match_the_large_state_carve_outs() {
        let table = JurisdictionTable::default_states();
        assert_eq!(
            table.get("CA").unwrap().nexus_threshold_sales,
            Some(dec!(500000))
        );
        assert_eq!(
            table.get("NY").unwrap().nexus_threshold_transactions,
            Some(100)
        );
        assert_eq!(
            table.get("WA").unwrap().nexus_threshold_sales,
            Some(dec!(100000))
        );
    }
}
