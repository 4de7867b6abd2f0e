use std::collections::BTreeMap;

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::warn;

use crate::db::NexusRepository;
use crate::error::{ErrorKind, ItemError};
use crate::models::{JurisdictionTable, NexusAlert, Period};

use super::common::round_half_up;
use super::filing::{derive_filing, FilingError, FilingPolicy, FilingRequirement};
use super::nexus::{NexusError, NexusTracker};

#[derive(Debug, Error)]
pub enum SalesTaxError {
    #[error(transparent)]
    Nexus(#[from] NexusError),

    #[error(transparent)]
    Filing(#[from] FilingError),
}

impl SalesTaxError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            SalesTaxError::Nexus(err) => err.kind(),
            SalesTaxError::Filing(err) => err.kind(),
        }
    }
}

/// One sale line destined for a jurisdiction. `locality` of `None` means the
/// state-level rate applies; negative amounts act as credits for returns.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SaleRecord {
    pub state: String,
    pub locality: Option<String>,
    pub amount: Decimal,
    pub taxable: bool,
}

/// Aggregated sales position for one `(state, locality)` pair.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct JurisdictionSummary {
    pub state: String,
    pub locality: String,
    pub gross_sales: Decimal,
    pub taxable_sales: Decimal,
    pub exempt_sales: Decimal,
    pub tax_rate: Decimal,
    pub tax_due: Decimal,
    pub transaction_count: usize,
}

/// A sale record the calculator had to skip, identified by input position.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SaleRecordError {
    pub index: usize,
    pub state: String,
    pub error: ItemError,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SalesTaxComputation {
    pub summaries: Vec<JurisdictionSummary>,
    pub item_errors: Vec<SaleRecordError>,
    pub total_tax_due: Decimal,
}

/// Groups sale records by jurisdiction and accrues tax at the applicable
/// rate. Tax accrues unrounded per line and is rounded once per summary.
pub struct SalesTaxCalculator<'a> {
    table: &'a JurisdictionTable,
}

impl<'a> SalesTaxCalculator<'a> {
    pub fn new(table: &'a JurisdictionTable) -> Self {
        SalesTaxCalculator { table }
    }

    /// Per-item failures (unknown states) are collected rather than failing
    /// the batch; every valid record is still computed.
    pub fn calculate(&self, records: &[SaleRecord]) -> SalesTaxComputation {
        let mut groups: BTreeMap<(String, String), JurisdictionSummary> = BTreeMap::new();
        let mut item_errors = Vec::new();

        for (index, record) in records.iter().enumerate() {
            let Some(rates) = self.table.get(&record.state) else {
                item_errors.push(SaleRecordError {
                    index,
                    state: record.state.clone(),
                    error: ItemError::new(
                        ErrorKind::UnsupportedJurisdiction,
                        format!("no tax rate data for state {}", record.state),
                    ),
                });
                continue;
            };

            let locality = record
                .locality
                .clone()
                .unwrap_or_else(|| "State".to_string());
            let rate = rates.rate_for_locality(record.locality.as_deref());

            let summary = groups
                .entry((record.state.clone(), locality.clone()))
                .or_insert_with(|| JurisdictionSummary {
                    state: record.state.clone(),
                    locality,
                    gross_sales: Decimal::ZERO,
                    taxable_sales: Decimal::ZERO,
                    exempt_sales: Decimal::ZERO,
                    tax_rate: rate,
                    tax_due: Decimal::ZERO,
                    transaction_count: 0,
                });

            summary.gross_sales += record.amount;
            summary.transaction_count += 1;
            if record.taxable {
                summary.taxable_sales += record.amount;
                summary.tax_due += record.amount * rate;
            } else {
                summary.exempt_sales += record.amount;
            }
        }

        let mut summaries: Vec<JurisdictionSummary> = groups.into_values().collect();
        for summary in &mut summaries {
            summary.tax_due = round_half_up(summary.tax_due);
        }
        let total_tax_due = summaries.iter().map(|s| s.tax_due).sum();

        SalesTaxComputation {
            summaries,
            item_errors,
            total_tax_due,
        }
    }
}

/// Everything a period's sales produce: jurisdiction totals, skipped
/// records, nexus alerts, and filing requirements.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SalesTaxReport {
    pub client_id: String,
    pub period: Period,
    pub total_transactions: usize,
    pub total_tax_due: Decimal,
    pub summaries: Vec<JurisdictionSummary>,
    pub item_errors: Vec<SaleRecordError>,
    pub nexus_alerts: Vec<NexusAlert>,
    pub filing_requirements: Vec<FilingRequirement>,
}

/// Monthly sales tax pipeline: calculate by jurisdiction, fold gross sales
/// into nexus standings, then derive filing requirements.
pub struct SalesTaxPipeline<'a> {
    store: &'a dyn NexusRepository,
    table: &'a JurisdictionTable,
    filing: FilingPolicy,
}

impl<'a> SalesTaxPipeline<'a> {
    pub fn new(
        store: &'a dyn NexusRepository,
        table: &'a JurisdictionTable,
        filing: FilingPolicy,
    ) -> Self {
        SalesTaxPipeline {
            store,
            table,
            filing,
        }
    }

    pub async fn process(
        &self,
        client_id: &str,
        period: Period,
        records: &[SaleRecord],
    ) -> Result<SalesTaxReport, SalesTaxError> {
        let computation = SalesTaxCalculator::new(self.table).calculate(records);

        // One nexus accumulation per state per run, localities aggregated.
        let mut state_totals: BTreeMap<&str, (Decimal, i64)> = BTreeMap::new();
        for summary in &computation.summaries {
            let entry = state_totals
                .entry(summary.state.as_str())
                .or_insert((Decimal::ZERO, 0));
            entry.0 += summary.gross_sales;
            entry.1 += summary.transaction_count as i64;
        }

        let tracker = NexusTracker::new(self.store, self.table);
        let mut nexus_alerts = Vec::new();
        for (state, (gross, transactions)) in &state_totals {
            if *gross < Decimal::ZERO {
                warn!(
                    client_id,
                    state,
                    gross = %gross,
                    "negative net sales skipped for nexus tracking"
                );
                continue;
            }
            let outcome = tracker
                .record_sales(client_id, state, *gross, *transactions)
                .await?;
            if let Some(alert) = outcome.alert {
                nexus_alerts.push(alert);
            }
        }

        let mut filing_requirements = Vec::new();
        for summary in &computation.summaries {
            if let Some((frequency, due_date)) =
                derive_filing(&self.filing, period, summary.tax_due)?
            {
                filing_requirements.push(FilingRequirement {
                    state: summary.state.clone(),
                    period,
                    frequency,
                    due_date,
                    tax_due: summary.tax_due,
                    taxable_sales: summary.taxable_sales,
                });
            }
        }

        Ok(SalesTaxReport {
            client_id: client_id.to_string(),
            period,
            total_transactions: records.len(),
            total_tax_due: computation.total_tax_due,
            summaries: computation.summaries,
            item_errors: computation.item_errors,
            nexus_alerts,
            filing_requirements,
        })
    }
}
