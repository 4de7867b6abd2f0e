//! Rule-based financial calculation modules.
//!
//! Each module covers one worksheet-style computation: progressive bracket
//! lookups, payroll withholding, entity tax strategies, transaction
//! classification, sales tax with nexus tracking, and filing requirements.
//! Calculators borrow their rate tables and policies so one loaded
//! configuration serves many computations.

pub mod brackets;
pub mod classify;
pub mod common;
pub mod deductions;
pub mod entity;
pub mod estimates;
pub mod filing;
pub mod nexus;
pub mod payroll;
pub mod review;
pub mod sales_tax;
pub mod self_employment;
pub mod withholding;

pub use brackets::{BracketCalculator, BracketError};
pub use classify::{BatchSummary, CategoryTotals, ClassificationBatch, TransactionClassifier};
pub use deductions::{
    CategoryAssessment, DeductionAnalysis, DeductionAnalyzer, DeductionError, DeductionPolicy,
    ExpenseBreakdown, Section179Analysis,
};
pub use entity::{
    EntityTaxCalculator, EntityTaxError, FinancialProjection, SalarySplit, TaxCalculationResult,
    TaxEstimate,
};
pub use estimates::{QuarterlyPayment, QuarterlySchedule, ScheduleError};
pub use filing::{FilingError, FilingFrequency, FilingPolicy, FilingRequirement};
pub use nexus::{JurisdictionStanding, NexusAnalysis, NexusError, NexusOutcome, NexusTracker};
pub use payroll::{
    DepositRequirement, DepositSchedule, PaycheckWorksheet, PayrollError, PayrollLine,
    PayrollLineError, PayrollRunSummary,
};
pub use review::{ReviewFlag, ReviewFlagKind, ReviewReport, ReviewStatus};
pub use sales_tax::{
    JurisdictionSummary, SaleRecord, SaleRecordError, SalesTaxCalculator, SalesTaxComputation,
    SalesTaxError, SalesTaxPipeline, SalesTaxReport,
};
pub use self_employment::{SeTaxBreakdown, SeTaxCalculator};
pub use withholding::{FicaWithholding, WithholdingCalculator, WithholdingError};
