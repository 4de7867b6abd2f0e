//! Review pass over raw transactions before they reach the books.
//!
//! Flags potential duplicates, unusually large amounts, and suspiciously
//! round amounts. Flags are advisory; nothing here blocks processing.

use std::collections::HashSet;

use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::Serialize;

use crate::models::{Severity, Transaction};

/// Absolute amount above which a transaction is worth a second look.
const LARGE_AMOUNT: Decimal = Decimal::from_parts(10_000, 0, 0, false, 0);
/// Round-amount check modulus; amounts this size and evenly divisible flag.
const ROUND_MODULUS: Decimal = Decimal::from_parts(100, 0, 0, false, 0);
/// Duplicate keys compare only the leading characters of the description.
const DUPLICATE_DESCRIPTION_PREFIX: usize = 50;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ReviewFlagKind {
    Duplicates,
    LargeAmounts,
    RoundAmounts,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ReviewFlag {
    #[serde(rename = "type")]
    pub kind: ReviewFlagKind,
    pub severity: Severity,
    pub count: usize,
    /// Indices into the reviewed slice.
    pub transaction_indices: Vec<usize>,
    pub message: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ReviewStatus {
    Completed,
    NeedsReview,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ReviewReport {
    pub status: ReviewStatus,
    pub flags: Vec<ReviewFlag>,
}

/// Reviews a transaction slice and reports anything needing human attention.
pub fn review_transactions(transactions: &[Transaction]) -> ReviewReport {
    let mut flags = Vec::new();

    let duplicates = find_duplicates(transactions);
    if !duplicates.is_empty() {
        flags.push(ReviewFlag {
            kind: ReviewFlagKind::Duplicates,
            severity: Severity::Medium,
            count: duplicates.len(),
            message: format!(
                "Found {} potential duplicate transactions",
                duplicates.len()
            ),
            transaction_indices: duplicates,
        });
    }

    let large: Vec<usize> = transactions
        .iter()
        .enumerate()
        .filter(|(_, t)| t.amount.abs() > LARGE_AMOUNT)
        .map(|(i, _)| i)
        .collect();
    if !large.is_empty() {
        flags.push(ReviewFlag {
            kind: ReviewFlagKind::LargeAmounts,
            severity: Severity::Medium,
            count: large.len(),
            message: format!("Found {} large transactions requiring review", large.len()),
            transaction_indices: large,
        });
    }

    let round: Vec<usize> = transactions
        .iter()
        .enumerate()
        .filter(|(_, t)| {
            t.amount.abs() >= ROUND_MODULUS && (t.amount % ROUND_MODULUS) == Decimal::ZERO
        })
        .map(|(i, _)| i)
        .collect();
    if !round.is_empty() {
        flags.push(ReviewFlag {
            kind: ReviewFlagKind::RoundAmounts,
            severity: Severity::Low,
            count: round.len(),
            message: format!("Found {} round dollar amounts worth verifying", round.len()),
            transaction_indices: round,
        });
    }

    ReviewReport {
        status: if flags.is_empty() {
            ReviewStatus::Completed
        } else {
            ReviewStatus::NeedsReview
        },
        flags,
    }
}

/// Later occurrences of an already-seen (date, amount, description prefix)
/// key are the flagged ones; the first stays unflagged.
fn find_duplicates(transactions: &[Transaction]) -> Vec<usize> {
    let mut seen: HashSet<(NaiveDate, Decimal, String)> = HashSet::new();
    let mut duplicates = Vec::new();
    for (index, transaction) in transactions.iter().enumerate() {
        let prefix: String = transaction
            .description
            .chars()
            .take(DUPLICATE_DESCRIPTION_PREFIX)
            .collect();
        let key = (transaction.date, transaction.amount, prefix);
        if !seen.insert(key) {
            duplicates.push(index);
        }
    }
    duplicates
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;
    use rust_decimal_macros::dec;

    use super::*;

    fn tx(day: u32, description: &str, amount: Decimal) -> Transaction {
        Transaction {
            date: NaiveDate::from_ymd_opt(2024, 5, day).unwrap(),
            description: description.to_string(),
            amount,
            reference_id: None,
        }
    }

    #[test]
    fn repeated_transactions_flag_the_later_occurrence() {
        let transactions = vec![
            tx(1, "STAPLES 441", dec!(-89.99)),
            tx(2, "SHELL OIL", dec!(-45.12)),
            tx(1, "STAPLES 441", dec!(-89.99)),
        ];

        let report = review_transactions(&transactions);

        assert_eq!(report.status, ReviewStatus::NeedsReview);
        assert_eq!(report.flags.len(), 1);
        let flag = &report.flags[0];
        assert_eq!(flag.kind, ReviewFlagKind::Duplicates);
        assert_eq!(flag.transaction_indices, vec![2]);
    }

    #[test]
    fn duplicate_keys_compare_only_the_description_prefix() {
        let long_a = format!("{} batch A", "X".repeat(60));
        let long_b = format!("{} batch B", "X".repeat(60));
        let transactions = vec![tx(1, &long_a, dec!(-10.00)), tx(1, &long_b, dec!(-10.00))];

        let report = review_transactions(&transactions);

        assert_eq!(report.flags[0].kind, ReviewFlagKind::Duplicates);
        assert_eq!(report.flags[0].transaction_indices, vec![1]);
    }

    #[test]
    fn large_amounts_flag_strictly_above_the_threshold() {
        let transactions = vec![
            tx(1, "EQUIPMENT PURCHASE", dec!(-15000.01)),
            tx(2, "BOUNDARY CASE", dec!(-10000.00)),
        ];

        let report = review_transactions(&transactions);

        let large = report
            .flags
            .iter()
            .find(|f| f.kind == ReviewFlagKind::LargeAmounts)
            .unwrap();
        assert_eq!(large.transaction_indices, vec![0]);
    }

    #[test]
    fn round_amounts_flag_in_either_direction() {
        let transactions = vec![
            tx(1, "CONSULTING RETAINER", dec!(300.00)),
            tx(2, "SUPPLIES RUN", dec!(-45.50)),
            tx(3, "REFUND ISSUED", dec!(-300.00)),
            tx(4, "SMALL EVEN", dec!(100)),
        ];

        let report = review_transactions(&transactions);

        let round = report
            .flags
            .iter()
            .find(|f| f.kind == ReviewFlagKind::RoundAmounts)
            .unwrap();
        assert_eq!(round.severity, Severity::Low);
        assert_eq!(round.transaction_indices, vec![0, 2, 3]);
    }

    #[test]
    fn clean_batches_complete_without_flags() {
        let transactions = vec![
            tx(1, "STAPLES 441", dec!(-89.99)),
            tx(2, "SHELL OIL", dec!(-45.12)),
        ];

        let report = review_transactions(&transactions);

        assert_eq!(report.status, ReviewStatus::Completed);
        assert!(report.flags.is_empty());
    }
}
