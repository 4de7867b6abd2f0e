use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// Economic nexus standing for one client in one jurisdiction.
///
/// Variants are declared in escalation order so the derived `Ord` gives the
/// monotone progression: a standing never moves backwards, and `Exceeded` is
/// terminal.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum NexusStatus {
    Monitoring,
    Approaching,
    Exceeded,
}

impl NexusStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            NexusStatus::Monitoring => "monitoring",
            NexusStatus::Approaching => "approaching",
            NexusStatus::Exceeded => "exceeded",
        }
    }

    pub fn parse(value: &str) -> Option<Self> {
        match value {
            "monitoring" => Some(NexusStatus::Monitoring),
            "approaching" => Some(NexusStatus::Approaching),
            "exceeded" => Some(NexusStatus::Exceeded),
            _ => None,
        }
    }
}

/// Persisted cumulative sales position against a jurisdiction's thresholds.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NexusRecord {
    pub client_id: String,
    pub jurisdiction: String,
    pub threshold_sales: Decimal,
    pub threshold_transactions: Option<i64>,
    pub cumulative_sales: Decimal,
    pub cumulative_transactions: i64,
    pub status: NexusStatus,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum NexusAlertKind {
    #[serde(rename = "nexus_threshold_warning")]
    ThresholdWarning,
    #[serde(rename = "nexus_threshold_exceeded")]
    ThresholdExceeded,
}

/// Alert raised when a standing escalates. Alerts fire on the transition
/// only, never again for the same standing.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NexusAlert {
    pub kind: NexusAlertKind,
    pub jurisdiction: String,
    pub threshold_sales: Decimal,
    pub cumulative_sales: Decimal,
    pub message: String,
    pub action_required: String,
}

impl NexusAlert {
    pub fn approaching(jurisdiction: &str, threshold_sales: Decimal, cumulative_sales: Decimal) -> Self {
        NexusAlert {
            kind: NexusAlertKind::ThresholdWarning,
            jurisdiction: jurisdiction.to_string(),
            threshold_sales,
            cumulative_sales,
            message: format!("Approaching sales threshold in {jurisdiction}"),
            action_required: "Monitor sales closely".to_string(),
        }
    }

    pub fn exceeded(jurisdiction: &str, threshold_sales: Decimal, cumulative_sales: Decimal) -> Self {
        NexusAlert {
            kind: NexusAlertKind::ThresholdExceeded,
            jurisdiction: jurisdiction.to_string(),
            threshold_sales,
            cumulative_sales,
            message: format!("Sales threshold exceeded in {jurisdiction}"),
            action_required: "Register for sales tax collection".to_string(),
        }
    }
}
