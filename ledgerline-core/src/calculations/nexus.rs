use rust_decimal::{Decimal, RoundingStrategy};
use serde::Serialize;
use thiserror::Error;
use tracing::{info, warn};

use crate::db::{NexusRepository, RepositoryError};
use crate::error::ErrorKind;
use crate::models::{
    JurisdictionTable, NexusAlert, NexusRecord, NexusStatus, Recommendation, RecommendationKind,
    Severity,
};

/// Fraction of the sales threshold at which a standing escalates to
/// `Approaching`.
const APPROACHING_RATIO: Decimal = Decimal::from_parts(8, 0, 0, false, 1);

#[derive(Debug, Error)]
pub enum NexusError {
    #[error("no rate entry for jurisdiction {0}")]
    UnknownJurisdiction(String),

    #[error("period sales must not be negative, got {0}")]
    NegativeSales(Decimal),

    #[error("period transaction count must not be negative, got {0}")]
    NegativeTransactions(i64),

    #[error(transparent)]
    Store(#[from] RepositoryError),
}

impl NexusError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            NexusError::UnknownJurisdiction(_) => ErrorKind::UnsupportedJurisdiction,
            NexusError::NegativeSales(_) | NexusError::NegativeTransactions(_) => {
                ErrorKind::InvalidInput
            }
            NexusError::Store(err) => err.kind(),
        }
    }
}

/// Outcome of folding one period's sales into a jurisdiction standing.
///
/// `record` is `None` when the jurisdiction has no economic nexus threshold
/// and is therefore not tracked. `alert` is `Some` only on the call where
/// the standing escalated.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct NexusOutcome {
    pub record: Option<NexusRecord>,
    pub alert: Option<NexusAlert>,
}

/// One jurisdiction's position against its sales threshold.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct JurisdictionStanding {
    pub jurisdiction: String,
    pub cumulative_sales: Decimal,
    pub threshold_sales: Decimal,
    /// Cumulative sales as a percentage of the threshold, one decimal place.
    pub threshold_percentage: Decimal,
    pub status: NexusStatus,
}

/// Client-wide view of nexus exposure across every tracked jurisdiction.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct NexusAnalysis {
    pub client_id: String,
    pub total_monitored: usize,
    pub exceeded: usize,
    pub approaching: usize,
    pub registration_required: Vec<JurisdictionStanding>,
    pub monitoring: Vec<JurisdictionStanding>,
    pub recommendations: Vec<Recommendation>,
}

/// Tracks cumulative sales against economic nexus thresholds.
///
/// Standings escalate monotonically from `Monitoring` through `Approaching`
/// to `Exceeded` and never move backwards when a later period's sales dip.
/// Alerts surface on the escalating call only, never again for the same
/// standing.
pub struct NexusTracker<'a> {
    store: &'a dyn NexusRepository,
    table: &'a JurisdictionTable,
}

impl<'a> NexusTracker<'a> {
    pub fn new(store: &'a dyn NexusRepository, table: &'a JurisdictionTable) -> Self {
        NexusTracker { store, table }
    }

    /// Add one period's sales for a client in a jurisdiction and re-evaluate
    /// the standing.
    ///
    /// # Errors
    /// * [`NexusError::UnknownJurisdiction`] if the jurisdiction has no rate
    ///   table entry.
    /// * [`NexusError::NegativeSales`] / [`NexusError::NegativeTransactions`]
    ///   on negative period figures.
    pub async fn record_sales(
        &self,
        client_id: &str,
        jurisdiction: &str,
        period_sales: Decimal,
        period_transactions: i64,
    ) -> Result<NexusOutcome, NexusError> {
        if period_sales < Decimal::ZERO {
            return Err(NexusError::NegativeSales(period_sales));
        }
        if period_transactions < 0 {
            return Err(NexusError::NegativeTransactions(period_transactions));
        }

        let rates = self
            .table
            .get(jurisdiction)
            .ok_or_else(|| NexusError::UnknownJurisdiction(jurisdiction.to_string()))?;

        let Some(threshold_sales) = rates.nexus_threshold_sales else {
            // No economic nexus threshold, nothing to track.
            return Ok(NexusOutcome {
                record: None,
                alert: None,
            });
        };

        let mut record = self
            .store
            .accumulate_sales(
                client_id,
                jurisdiction,
                threshold_sales,
                rates.nexus_threshold_transactions,
                period_sales,
                period_transactions,
            )
            .await?;

        let prior = record.status;
        let next = prior.max(evaluate(&record));

        let alert = if next > prior {
            self.store.set_status(client_id, jurisdiction, next).await?;
            record.status = next;
            match next {
                NexusStatus::Exceeded => {
                    warn!(
                        client_id,
                        jurisdiction,
                        cumulative_sales = %record.cumulative_sales,
                        threshold_sales = %record.threshold_sales,
                        "sales threshold exceeded"
                    );
                    Some(NexusAlert::exceeded(
                        jurisdiction,
                        record.threshold_sales,
                        record.cumulative_sales,
                    ))
                }
                NexusStatus::Approaching => {
                    info!(
                        client_id,
                        jurisdiction,
                        cumulative_sales = %record.cumulative_sales,
                        threshold_sales = %record.threshold_sales,
                        "approaching sales threshold"
                    );
                    Some(NexusAlert::approaching(
                        jurisdiction,
                        record.threshold_sales,
                        record.cumulative_sales,
                    ))
                }
                NexusStatus::Monitoring => None,
            }
        } else {
            None
        };

        Ok(NexusOutcome {
            record: Some(record),
            alert,
        })
    }

    /// Summarize a client's exposure across every tracked jurisdiction.
    ///
    /// Jurisdictions are bucketed by current sales rather than stored status,
    /// so a record updated outside [`record_sales`](NexusTracker::record_sales)
    /// still lands in the right bucket.
    pub async fn analyze(&self, client_id: &str) -> Result<NexusAnalysis, NexusError> {
        let records = self.store.list_records(client_id).await?;

        let mut registration_required = Vec::new();
        let mut monitoring = Vec::new();
        let mut approaching = 0usize;

        for record in &records {
            let threshold_percentage = if record.threshold_sales > Decimal::ZERO {
                (record.cumulative_sales / record.threshold_sales * Decimal::ONE_HUNDRED)
                    .round_dp_with_strategy(1, RoundingStrategy::MidpointAwayFromZero)
            } else {
                Decimal::ZERO
            };
            let standing = JurisdictionStanding {
                jurisdiction: record.jurisdiction.clone(),
                cumulative_sales: record.cumulative_sales,
                threshold_sales: record.threshold_sales,
                threshold_percentage,
                status: record.status,
            };

            if record.cumulative_sales >= record.threshold_sales {
                registration_required.push(standing);
            } else {
                if record.cumulative_sales >= record.threshold_sales * APPROACHING_RATIO {
                    approaching += 1;
                }
                monitoring.push(standing);
            }
        }

        let recommendations = nexus_recommendations(&registration_required, &monitoring);

        Ok(NexusAnalysis {
            client_id: client_id.to_string(),
            total_monitored: records.len(),
            exceeded: registration_required.len(),
            approaching,
            registration_required,
            monitoring,
            recommendations,
        })
    }
}

fn evaluate(record: &NexusRecord) -> NexusStatus {
    if record.cumulative_sales >= record.threshold_sales {
        NexusStatus::Exceeded
    } else if record.cumulative_sales >= record.threshold_sales * APPROACHING_RATIO {
        NexusStatus::Approaching
    } else {
        NexusStatus::Monitoring
    }
}

fn nexus_recommendations(
    registration_required: &[JurisdictionStanding],
    monitoring: &[JurisdictionStanding],
) -> Vec<Recommendation> {
    let mut recommendations = Vec::new();

    for standing in registration_required {
        let sales = standing
            .cumulative_sales
            .round_dp_with_strategy(0, RoundingStrategy::MidpointAwayFromZero);
        let threshold = standing
            .threshold_sales
            .round_dp_with_strategy(0, RoundingStrategy::MidpointAwayFromZero);
        recommendations.push(Recommendation {
            kind: RecommendationKind::RegistrationRequired,
            priority: Severity::High,
            title: format!(
                "Sales Tax Registration Required - {}",
                standing.jurisdiction
            ),
            description: format!("Sales of ${sales} exceed threshold of ${threshold}"),
            estimated_savings: None,
        });
    }

    for standing in monitoring {
        if standing.threshold_percentage > Decimal::new(50, 0) {
            let percent = standing
                .threshold_percentage
                .round_dp_with_strategy(0, RoundingStrategy::MidpointAwayFromZero);
            recommendations.push(Recommendation {
                kind: RecommendationKind::NexusMonitoring,
                priority: Severity::Medium,
                title: format!("Monitor Sales Activity - {}", standing.jurisdiction),
                description: format!("Sales at {percent}% of nexus threshold"),
                estimated_savings: None,
            });
        }
    }

    if !registration_required.is_empty() {
        recommendations.push(Recommendation {
            kind: RecommendationKind::ComplianceSystem,
            priority: Severity::High,
            title: "Implement Sales Tax Compliance System".to_string(),
            description: format!(
                "Active nexus in {} states requires systematic compliance",
                registration_required.len()
            ),
            estimated_savings: None,
        });
    }

    recommendations
}
