use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// Priority attached to recommendations and compliance alerts.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Severity {
    Low,
    Medium,
    High,
}

impl Severity {
    pub fn as_str(&self) -> &'static str {
        match self {
            Severity::Low => "low",
            Severity::Medium => "medium",
            Severity::High => "high",
        }
    }
}

/// Machine-readable category of an advisory recommendation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RecommendationKind {
    TaxReduction,
    EntityElection,
    RetirementPlanning,
    #[serde(rename = "section_179")]
    Section179,
    MealsOptimization,
    VehicleMethod,
    DepreciationStrategy,
    RegistrationRequired,
    NexusMonitoring,
    ComplianceSystem,
}

/// Advisory output. Estimated savings are rough planning figures, not
/// quotes, and are omitted where no sensible estimate exists.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Recommendation {
    #[serde(rename = "type")]
    pub kind: RecommendationKind,
    pub priority: Severity,
    pub title: String,
    pub description: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub estimated_savings: Option<Decimal>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ComplianceAlertKind {
    MinimumWageViolation,
    OvertimeCompliance,
    HighWithholding,
}

/// Per-employee compliance finding raised during a payroll run. Alerts
/// never block the run; they travel alongside the computed lines.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ComplianceAlert {
    #[serde(rename = "type")]
    pub kind: ComplianceAlertKind,
    pub severity: Severity,
    pub employee_id: String,
    pub message: String,
    pub recommendation: String,
}
