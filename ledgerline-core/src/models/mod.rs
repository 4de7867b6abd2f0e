mod advice;
mod entity_type;
mod filing_status;
mod jurisdiction;
mod nexus;
mod pay_input;
mod period;
mod policy;
mod rate_table;
mod rules;
mod transaction;
mod withholding_table;

pub use advice::{ComplianceAlert, ComplianceAlertKind, Recommendation, RecommendationKind, Severity};
pub use entity_type::EntityType;
pub use filing_status::FilingStatus;
pub use jurisdiction::{JurisdictionRates, JurisdictionTable};
pub use nexus::{NexusAlert, NexusAlertKind, NexusRecord, NexusStatus};
pub use pay_input::{EmployeePayInput, PayBasis};
pub use period::{Period, PeriodError};
pub use policy::{PayrollConfig, PayrollConfigError, TaxPolicy, TaxPolicyError};
pub use rate_table::{Bracket, BracketTableSet, RateTable, RateTableError};
pub use rules::{AmountBound, AmountRule, PatternRule, RuleSet, RuleSetError};
pub use transaction::{Classification, ClassifiedTransaction, Transaction, TransactionKind};
pub use withholding_table::WithholdingTableSet;
