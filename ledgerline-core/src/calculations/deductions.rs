//! Deductibility review of categorized expenses.
//!
//! Works from category totals rather than raw transactions: each category
//! gets a deductible percentage, documentation checklist, and notes, with
//! planning recommendations and a Section 179 pass for equipment purchases.

use std::collections::BTreeMap;

use rust_decimal::Decimal;
use serde::Serialize;
use thiserror::Error;

use crate::calculations::common::round_half_up;
use crate::error::ErrorKind;
use crate::models::{ClassifiedTransaction, Recommendation, RecommendationKind, Severity};

/// Category totals keyed category, then subcategory. Amounts are positive
/// expense magnitudes.
pub type ExpenseBreakdown = BTreeMap<String, BTreeMap<String, Decimal>>;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum DeductionError {
    #[error("assumed tax rate must be between 0 and 1, got {0}")]
    RateOutOfRange(Decimal),
    #[error("{field} cannot be negative, got {value}")]
    NegativeThreshold { field: &'static str, value: Decimal },
    #[error("expense total for {category} cannot be negative, got {amount}")]
    NegativeExpense { category: String, amount: Decimal },
}

impl DeductionError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            DeductionError::RateOutOfRange(_) | DeductionError::NegativeThreshold { .. } => {
                ErrorKind::Configuration
            }
            DeductionError::NegativeExpense { .. } => ErrorKind::InvalidInput,
        }
    }
}

/// Thresholds and rates for the deduction review.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DeductionPolicy {
    /// Annual Section 179 expensing limit.
    pub section_179_max: Decimal,
    /// Equipment spend beyond this starts phasing the limit out.
    pub section_179_phase_out: Decimal,
    /// Meal spend above this triggers the optimization recommendation.
    pub meals_review_threshold: Decimal,
    /// Vehicle spend above this suggests comparing deduction methods.
    pub vehicle_review_threshold: Decimal,
    /// Equipment spend above this suggests a depreciation strategy review.
    pub equipment_review_threshold: Decimal,
    /// Flat rate used to translate deductions into estimated savings.
    pub assumed_tax_rate: Decimal,
}

impl Default for DeductionPolicy {
    fn default() -> Self {
        DeductionPolicy {
            section_179_max: Decimal::new(1_220_000, 0),
            section_179_phase_out: Decimal::new(3_050_000, 0),
            meals_review_threshold: Decimal::new(5_000, 0),
            vehicle_review_threshold: Decimal::new(10_000, 0),
            equipment_review_threshold: Decimal::new(2_500, 0),
            assumed_tax_rate: Decimal::new(25, 2),
        }
    }
}

impl DeductionPolicy {
    pub fn validate(&self) -> Result<(), DeductionError> {
        if self.assumed_tax_rate < Decimal::ZERO || self.assumed_tax_rate > Decimal::ONE {
            return Err(DeductionError::RateOutOfRange(self.assumed_tax_rate));
        }
        for (field, value) in [
            ("section_179_max", self.section_179_max),
            ("section_179_phase_out", self.section_179_phase_out),
            ("meals_review_threshold", self.meals_review_threshold),
            ("vehicle_review_threshold", self.vehicle_review_threshold),
            ("equipment_review_threshold", self.equipment_review_threshold),
        ] {
            if value < Decimal::ZERO {
                return Err(DeductionError::NegativeThreshold { field, value });
            }
        }
        Ok(())
    }
}

/// One category's deductibility assessment.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CategoryAssessment {
    pub total: Decimal,
    pub subcategories: BTreeMap<String, Decimal>,
    pub deductible_percentage: Decimal,
    pub deductible_amount: Decimal,
    pub notes: String,
    pub documentation_needed: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Section179Analysis {
    pub total_equipment: Decimal,
    pub eligible_amount: Decimal,
    pub max_deduction: Decimal,
    pub estimated_savings: Decimal,
    pub phase_out_applies: bool,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DeductionAnalysis {
    pub total_expenses: Decimal,
    pub categories: BTreeMap<String, CategoryAssessment>,
    pub recommendations: Vec<Recommendation>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub section_179: Option<Section179Analysis>,
}

/// Sums classified debits into an [`ExpenseBreakdown`]. Credits are income,
/// not expenses, and are skipped.
pub fn expense_totals(items: &[ClassifiedTransaction]) -> ExpenseBreakdown {
    let mut breakdown: ExpenseBreakdown = BTreeMap::new();
    for item in items {
        if item.transaction.amount < Decimal::ZERO {
            let subtotal = breakdown
                .entry(item.classification.category.clone())
                .or_default()
                .entry(item.classification.subcategory.clone())
                .or_default();
            *subtotal += item.transaction.amount.abs();
        }
    }
    breakdown
}

pub struct DeductionAnalyzer<'a> {
    policy: &'a DeductionPolicy,
}

impl<'a> DeductionAnalyzer<'a> {
    pub fn new(policy: &'a DeductionPolicy) -> Self {
        DeductionAnalyzer { policy }
    }

    pub fn analyze(&self, expenses: &ExpenseBreakdown) -> Result<DeductionAnalysis, DeductionError> {
        self.policy.validate()?;

        let mut categories = BTreeMap::new();
        let mut total_expenses = Decimal::ZERO;
        for (category, subcategories) in expenses {
            let total: Decimal = subcategories.values().copied().sum();
            if total < Decimal::ZERO {
                return Err(DeductionError::NegativeExpense {
                    category: category.clone(),
                    amount: total,
                });
            }
            total_expenses += total;
            let (percentage, notes) = deductibility(category);
            categories.insert(
                category.clone(),
                CategoryAssessment {
                    total,
                    subcategories: subcategories.clone(),
                    deductible_percentage: percentage,
                    deductible_amount: round_half_up(total * percentage / Decimal::ONE_HUNDRED),
                    notes: notes.to_string(),
                    documentation_needed: documentation(category)
                        .iter()
                        .map(|s| s.to_string())
                        .collect(),
                },
            );
        }

        let section_179 = self.section_179(&categories);
        let recommendations = self.recommendations(&categories, section_179.as_ref());

        Ok(DeductionAnalysis {
            total_expenses,
            categories,
            recommendations,
            section_179,
        })
    }

    fn section_179(
        &self,
        categories: &BTreeMap<String, CategoryAssessment>,
    ) -> Option<Section179Analysis> {
        let total_equipment = categories.get("Equipment").map(|c| c.total)?;
        if total_equipment <= Decimal::ZERO {
            return None;
        }
        let eligible_amount = total_equipment.min(self.policy.section_179_max);
        Some(Section179Analysis {
            total_equipment,
            eligible_amount,
            max_deduction: self.policy.section_179_max,
            estimated_savings: round_half_up(eligible_amount * self.policy.assumed_tax_rate),
            phase_out_applies: total_equipment > self.policy.section_179_phase_out,
        })
    }

    fn recommendations(
        &self,
        categories: &BTreeMap<String, CategoryAssessment>,
        section_179: Option<&Section179Analysis>,
    ) -> Vec<Recommendation> {
        let mut recs = Vec::new();
        let category_total = |name: &str| categories.get(name).map_or(Decimal::ZERO, |c| c.total);

        let meals = category_total("Meals & Entertainment");
        if meals > self.policy.meals_review_threshold {
            // half the spend is currently non-deductible; some may qualify in full
            let savings = meals * Decimal::new(5, 1) * self.policy.assumed_tax_rate;
            recs.push(Recommendation {
                kind: RecommendationKind::MealsOptimization,
                priority: Severity::Medium,
                title: "Review Meal Deduction Opportunities".to_string(),
                description: "Some meal costs may qualify for full deduction instead of 50%"
                    .to_string(),
                estimated_savings: Some(round_half_up(savings)),
            });
        }

        let vehicle = category_total("Vehicle Expenses");
        if vehicle > self.policy.vehicle_review_threshold {
            recs.push(Recommendation {
                kind: RecommendationKind::VehicleMethod,
                priority: Severity::Medium,
                title: "Compare Vehicle Deduction Methods".to_string(),
                description: "Compare standard mileage against actual expenses".to_string(),
                estimated_savings: Some(round_half_up(vehicle * Decimal::new(1, 1))),
            });
        }

        let equipment = category_total("Equipment");
        if equipment > self.policy.equipment_review_threshold {
            recs.push(Recommendation {
                kind: RecommendationKind::DepreciationStrategy,
                priority: Severity::High,
                title: "Evaluate Depreciation Strategy".to_string(),
                description: "Weigh immediate expensing against multi-year depreciation"
                    .to_string(),
                estimated_savings: Some(round_half_up(equipment * self.policy.assumed_tax_rate)),
            });
        }

        if let Some(analysis) = section_179 {
            recs.push(Recommendation {
                kind: RecommendationKind::Section179,
                priority: Severity::High,
                title: "Section 179 Expensing Available".to_string(),
                description: "Equipment purchases may qualify for immediate expensing".to_string(),
                estimated_savings: Some(analysis.estimated_savings),
            });
        }

        recs
    }
}

fn deductibility(category: &str) -> (Decimal, &'static str) {
    let full = Decimal::ONE_HUNDRED;
    match category {
        "Office Supplies" => (full, "Fully deductible if used for business"),
        "Travel" => (full, "Business travel is fully deductible"),
        "Meals & Entertainment" => (Decimal::new(50, 0), "Generally 50% deductible for business meals"),
        "Vehicle Expenses" => (full, "Business use percentage applies"),
        "Professional Services" => (full, "Fully deductible business expenses"),
        "Utilities" => (full, "Business portion is deductible"),
        "Insurance" => (full, "Business insurance is fully deductible"),
        "Marketing" => (full, "Advertising and marketing expenses are deductible"),
        _ => (full, "Review for business purpose"),
    }
}

fn documentation(category: &str) -> &'static [&'static str] {
    match category {
        "Travel" => &["Receipts", "Business purpose", "Dates and locations"],
        "Meals & Entertainment" => &[
            "Receipts",
            "Business purpose",
            "Attendees",
            "Business relationship",
        ],
        "Vehicle Expenses" => &["Mileage log", "Business purpose", "Receipts for expenses"],
        "Equipment" => &["Receipts", "Business use percentage", "Depreciation records"],
        "Professional Services" => &["Invoices", "Contracts", "Business purpose"],
        "Office Supplies" => &["Receipts", "Business use verification"],
        _ => &["Receipts", "Business purpose documentation"],
    }
}

#[cfg(test)]
mod tests {
    use chrono::NaiveDate;
    use pretty_assertions::assert_eq;
    use rust_decimal_macros::dec;

    use super::*;
    use crate::models::{Classification, Transaction, TransactionKind};

    fn breakdown(entries: &[(&str, &str, Decimal)]) -> ExpenseBreakdown {
        let mut expenses = ExpenseBreakdown::new();
        for (category, subcategory, amount) in entries {
            *expenses
                .entry(category.to_string())
                .or_default()
                .entry(subcategory.to_string())
                .or_default() += *amount;
        }
        expenses
    }

    #[test]
    fn meals_assess_at_half_deductibility() {
        let policy = DeductionPolicy::default();
        let analyzer = DeductionAnalyzer::new(&policy);
        let expenses = breakdown(&[("Meals & Entertainment", "Business Meals", dec!(8000))]);

        let analysis = analyzer.analyze(&expenses).unwrap();

        let meals = &analysis.categories["Meals & Entertainment"];
        assert_eq!(meals.deductible_percentage, dec!(50));
        assert_eq!(meals.deductible_amount, dec!(4000.00));
        assert!(meals.documentation_needed.contains(&"Attendees".to_string()));

        let rec = analysis
            .recommendations
            .iter()
            .find(|r| r.kind == RecommendationKind::MealsOptimization)
            .unwrap();
        assert_eq!(rec.estimated_savings, Some(dec!(1000.00)));
    }

    #[test]
    fn unknown_categories_default_to_full_deductibility() {
        let policy = DeductionPolicy::default();
        let analyzer = DeductionAnalyzer::new(&policy);
        let expenses = breakdown(&[("Gardening", "Landscaping", dec!(400))]);

        let analysis = analyzer.analyze(&expenses).unwrap();

        let category = &analysis.categories["Gardening"];
        assert_eq!(category.deductible_percentage, dec!(100));
        assert_eq!(category.deductible_amount, dec!(400.00));
        assert_eq!(category.notes, "Review for business purpose");
        assert_eq!(
            category.documentation_needed,
            vec!["Receipts", "Business purpose documentation"]
        );
    }

    #[test]
    fn equipment_triggers_section_179_analysis() {
        let policy = DeductionPolicy::default();
        let analyzer = DeductionAnalyzer::new(&policy);
        let expenses = breakdown(&[("Equipment", "Major Equipment", dec!(50000))]);

        let analysis = analyzer.analyze(&expenses).unwrap();

        let section = analysis.section_179.unwrap();
        assert_eq!(section.eligible_amount, dec!(50000));
        assert_eq!(section.estimated_savings, dec!(12500.00));
        assert!(!section.phase_out_applies);

        let kinds: Vec<_> = analysis.recommendations.iter().map(|r| r.kind).collect();
        assert!(kinds.contains(&RecommendationKind::DepreciationStrategy));
        assert!(kinds.contains(&RecommendationKind::Section179));
    }

    #[test]
    fn heavy_equipment_spend_caps_and_phases_out() {
        let policy = DeductionPolicy::default();
        let analyzer = DeductionAnalyzer::new(&policy);
        let expenses = breakdown(&[("Equipment", "Major Equipment", dec!(3100000))]);

        let analysis = analyzer.analyze(&expenses).unwrap();

        let section = analysis.section_179.unwrap();
        assert_eq!(section.eligible_amount, dec!(1220000));
        assert!(section.phase_out_applies);
    }

    #[test]
    fn vehicle_spend_above_threshold_suggests_method_comparison() {
        let policy = DeductionPolicy::default();
        let analyzer = DeductionAnalyzer::new(&policy);
        let expenses = breakdown(&[("Vehicle Expenses", "Fuel", dec!(12000))]);

        let analysis = analyzer.analyze(&expenses).unwrap();

        let rec = analysis
            .recommendations
            .iter()
            .find(|r| r.kind == RecommendationKind::VehicleMethod)
            .unwrap();
        assert_eq!(rec.estimated_savings, Some(dec!(1200.00)));
    }

    #[test]
    fn negative_category_totals_are_rejected() {
        let policy = DeductionPolicy::default();
        let analyzer = DeductionAnalyzer::new(&policy);
        let expenses = breakdown(&[("Office Supplies", "General", dec!(-50))]);

        let result = analyzer.analyze(&expenses);

        assert_eq!(
            result,
            Err(DeductionError::NegativeExpense {
                category: "Office Supplies".to_string(),
                amount: dec!(-50),
            })
        );
    }

    #[test]
    fn expense_totals_sum_debits_only() {
        let date = NaiveDate::from_ymd_opt(2024, 4, 2).unwrap();
        let item = |description: &str, amount: Decimal, category: &str, subcategory: &str| {
            ClassifiedTransaction {
                transaction: Transaction {
                    date,
                    description: description.to_string(),
                    amount,
                    reference_id: None,
                },
                kind: TransactionKind::from_amount(amount),
                classification: Classification {
                    category: category.to_string(),
                    subcategory: subcategory.to_string(),
                    confidence: dec!(0.9),
                },
            }
        };
        let items = vec![
            item("SHELL OIL", dec!(-45.00), "Vehicle Expenses", "Fuel"),
            item("EXXON 12", dec!(-30.00), "Vehicle Expenses", "Fuel"),
            item("CLIENT CHECK", dec!(2500.00), "Income", "Unclassified Income"),
        ];

        let breakdown = expense_totals(&items);

        assert_eq!(breakdown["Vehicle Expenses"]["Fuel"], dec!(75.00));
        assert!(!breakdown.contains_key("Income"));
    }
}
