//! Rule-based transaction classification.
//!
//! Rules run in a fixed order: description patterns first (top to bottom,
//! first match wins), then amount-magnitude rules, then a catch-all keyed on
//! the transaction's sign. Classification always produces an answer, so a
//! batch never rejects an item.

use std::collections::BTreeMap;

use rust_decimal::Decimal;
use serde::Serialize;

use crate::models::{Classification, ClassifiedTransaction, RuleSet, Transaction, TransactionKind};

/// Per-category rollup inside a batch summary. `total` accumulates absolute
/// amounts so debits and credits do not cancel.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize)]
pub struct CategoryTotals {
    pub count: usize,
    pub total: Decimal,
}

/// Batch-level aggregates. `total_debits` keeps its negative sign, matching
/// the ledger convention, so `net_change = total_credits + total_debits`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct BatchSummary {
    pub transactions_processed: usize,
    pub total_debits: Decimal,
    pub total_credits: Decimal,
    pub net_change: Decimal,
    pub category_summary: BTreeMap<String, CategoryTotals>,
    pub low_confidence_count: usize,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ClassificationBatch {
    pub items: Vec<ClassifiedTransaction>,
    pub summary: BatchSummary,
}

pub struct TransactionClassifier<'a> {
    rules: &'a RuleSet,
}

impl<'a> TransactionClassifier<'a> {
    /// Confidence below this counts as needing review in batch summaries.
    const LOW_CONFIDENCE: Decimal = Decimal::from_parts(7, 0, 0, false, 1);

    pub fn new(rules: &'a RuleSet) -> Self {
        TransactionClassifier { rules }
    }

    /// Classifies one description and amount.
    pub fn classify(&self, description: &str, amount: Decimal) -> Classification {
        for rule in &self.rules.pattern_rules {
            if rule.is_match(description) {
                return Classification {
                    category: rule.category.clone(),
                    subcategory: rule.subcategory.clone(),
                    confidence: rule.confidence,
                };
            }
        }
        for rule in &self.rules.amount_rules {
            if rule.matches(amount) {
                return Classification {
                    category: rule.category.clone(),
                    subcategory: rule.subcategory.clone(),
                    confidence: rule.confidence,
                };
            }
        }
        let (category, subcategory) = if amount > Decimal::ZERO {
            ("Income", "Unclassified Income")
        } else {
            ("Expenses", "Unclassified Expenses")
        };
        Classification {
            category: category.to_string(),
            subcategory: subcategory.to_string(),
            confidence: Decimal::new(3, 1),
        }
    }

    pub fn classify_transaction(&self, transaction: &Transaction) -> ClassifiedTransaction {
        ClassifiedTransaction {
            kind: TransactionKind::from_amount(transaction.amount),
            classification: self.classify(&transaction.description, transaction.amount),
            transaction: transaction.clone(),
        }
    }

    /// Classifies a whole batch and rolls up the summary.
    pub fn classify_batch(&self, transactions: &[Transaction]) -> ClassificationBatch {
        let items: Vec<ClassifiedTransaction> = transactions
            .iter()
            .map(|t| self.classify_transaction(t))
            .collect();

        let mut total_debits = Decimal::ZERO;
        let mut total_credits = Decimal::ZERO;
        let mut category_summary: BTreeMap<String, CategoryTotals> = BTreeMap::new();
        let mut low_confidence_count = 0;
        for item in &items {
            let amount = item.transaction.amount;
            if amount < Decimal::ZERO {
                total_debits += amount;
            } else {
                total_credits += amount;
            }
            let entry = category_summary
                .entry(item.classification.category.clone())
                .or_default();
            entry.count += 1;
            entry.total += amount.abs();
            if item.classification.confidence < Self::LOW_CONFIDENCE {
                low_confidence_count += 1;
            }
        }

        ClassificationBatch {
            summary: BatchSummary {
                transactions_processed: items.len(),
                total_debits,
                total_credits,
                net_change: total_credits + total_debits,
                category_summary,
                low_confidence_count,
            },
            items,
        }
    }
}

#[cfg(test)]
mod tests {
    use chrono::NaiveDate;
    use pretty_assertions::assert_eq;
    use rust_decimal_macros::dec;

    use super::*;

    fn tx(description: &str, amount: Decimal) -> Transaction {
        Transaction {
            date: NaiveDate::from_ymd_opt(2024, 3, 14).unwrap(),
            description: description.to_string(),
            amount,
            reference_id: None,
        }
    }

    #[test]
    fn fuel_vendors_classify_with_high_confidence() {
        let rules = RuleSet::default_rules().unwrap();
        let classifier = TransactionClassifier::new(&rules);

        let result = classifier.classify("SHELL OIL 57744", dec!(-45.00));

        assert_eq!(result.category, "Vehicle Expenses");
        assert_eq!(result.subcategory, "Fuel");
        assert_eq!(result.confidence, dec!(0.9));
    }

    #[test]
    fn first_matching_pattern_wins() {
        let rules = RuleSet::default_rules().unwrap();
        let classifier = TransactionClassifier::new(&rules);

        // matches both the amazon rule and the cafe rule; amazon is earlier
        let result = classifier.classify("AMAZON CAFE ORDER", dec!(-30.00));

        assert_eq!(result.category, "Office Supplies");
        assert_eq!(result.subcategory, "General");
    }

    #[test]
    fn amount_rules_apply_when_no_pattern_matches() {
        let rules = RuleSet::default_rules().unwrap();
        let classifier = TransactionClassifier::new(&rules);

        let large = classifier.classify("WIRE 99887", dec!(-7500.00));
        let small = classifier.classify("MISC 1021", dec!(-12.50));

        assert_eq!(large.category, "Equipment");
        assert_eq!(large.subcategory, "Major Equipment");
        assert_eq!(large.confidence, dec!(0.7));
        assert_eq!(small.category, "Office Supplies");
        assert_eq!(small.subcategory, "Miscellaneous");
        assert_eq!(small.confidence, dec!(0.6));
    }

    #[test]
    fn unmatched_transactions_fall_back_by_sign() {
        let rules = RuleSet::default_rules().unwrap();
        let classifier = TransactionClassifier::new(&rules);

        let credit = classifier.classify("CLIENT CHECK 2231", dec!(2500.00));
        let debit = classifier.classify("CHECK 1021", dec!(-300.00));

        assert_eq!(credit.category, "Income");
        assert_eq!(credit.subcategory, "Unclassified Income");
        assert_eq!(credit.confidence, dec!(0.3));
        assert_eq!(debit.category, "Expenses");
        assert_eq!(debit.subcategory, "Unclassified Expenses");
    }

    #[test]
    fn zero_amounts_hit_the_small_amount_rule_before_the_fallback() {
        let rules = RuleSet::default_rules().unwrap();
        let classifier = TransactionClassifier::new(&rules);

        let with_rules = classifier.classify("VOID", dec!(0));

        // |0| is within the small-amount bound, so the rule fires
        assert_eq!(with_rules.subcategory, "Miscellaneous");

        let empty = RuleSet::new(Vec::new(), Vec::new());
        let bare = TransactionClassifier::new(&empty);

        // without rules, zero is not income
        assert_eq!(bare.classify("VOID", dec!(0)).category, "Expenses");
    }

    #[test]
    fn classify_transaction_tags_the_kind() {
        let rules = RuleSet::default_rules().unwrap();
        let classifier = TransactionClassifier::new(&rules);

        let credit = classifier.classify_transaction(&tx("DEPOSIT 18", dec!(1200)));
        let debit = classifier.classify_transaction(&tx("STAPLES 441", dec!(-89.99)));

        assert_eq!(credit.kind, TransactionKind::Credit);
        assert_eq!(debit.kind, TransactionKind::Debit);
        assert_eq!(debit.classification.subcategory, "Equipment");
    }

    #[test]
    fn batch_summary_rolls_up_totals_and_confidence() {
        let rules = RuleSet::default_rules().unwrap();
        let classifier = TransactionClassifier::new(&rules);
        let transactions = vec![
            tx("SHELL OIL 57744", dec!(-45.00)),
            tx("CLIENT CHECK 2231", dec!(2500.00)),
            tx("MISC 1021", dec!(-12.50)),
            tx("STAPLES 441", dec!(-89.99)),
        ];

        let batch = classifier.classify_batch(&transactions);

        assert_eq!(batch.items.len(), 4);
        let summary = &batch.summary;
        assert_eq!(summary.transactions_processed, 4);
        assert_eq!(summary.total_debits, dec!(-147.49));
        assert_eq!(summary.total_credits, dec!(2500.00));
        assert_eq!(summary.net_change, dec!(2352.51));
        assert_eq!(summary.low_confidence_count, 2);

        let office = &summary.category_summary["Office Supplies"];
        assert_eq!(office.count, 2);
        assert_eq!(office.total, dec!(102.49));
        let vehicle = &summary.category_summary["Vehicle Expenses"];
        assert_eq!(vehicle.count, 1);
        assert_eq!(vehicle.total, dec!(45.00));
    }

    #[test]
    fn empty_batch_produces_an_empty_summary() {
        let rules = RuleSet::default_rules().unwrap();
        let classifier = TransactionClassifier::new(&rules);

        let batch = classifier.classify_batch(&[]);

        assert!(batch.items.is_empty());
        assert_eq!(batch.summary.transactions_processed, 0);
        assert_eq!(batch.summary.net_change, dec!(0));
        assert!(batch.summary.category_summary.is_empty());
    }
}
