//! # Reconciliation Service
//!
//! End-of-day cash count against the payment ledger.
//!
//! ## Daily Run
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                         run_daily()                                     │
//! │                                                                         │
//! │  expected = Σ final_cents of completed transactions in [day, day+1)    │
//! │  actual   = cash counted by staff                                      │
//! │                                                                         │
//! │  discrepancy = actual - expected                                       │
//! │      0       → balanced      (exact match, integer cents)              │
//! │      ≠ 0     → discrepancy   (negative = short, positive = over)       │
//! │                                                                         │
//! │  The record is immutable; a recount produces a new record.             │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

use chrono::{DateTime, Duration, Utc};
use serde::Serialize;
use tracing::{debug, info};

use brewpos_core::{
    reconciliation_status, validation, CoreError, DailyReconciliation, Money,
    ReconciliationStatus, Transaction,
};
use brewpos_db::repository::reconciliation::generate_reconciliation_id;
use brewpos_db::Database;

use crate::context::ActorContext;
use crate::error::ServiceResult;

/// Result of one reconciliation run.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ReconciliationOutcome {
    pub record: DailyReconciliation,
    /// Number of ledger transactions behind the expected figure.
    pub transaction_count: usize,
}

/// Orchestrates end-of-day reconciliation.
#[derive(Debug, Clone)]
pub struct ReconciliationService {
    db: Database,
}

impl ReconciliationService {
    /// Creates a new reconciliation service.
    pub fn new(db: Database) -> Self {
        ReconciliationService { db }
    }

    /// Runs reconciliation for the day starting at `day_start` (a 24-hour
    /// window) against the counted cash amount.
    pub async fn run_daily(
        &self,
        ctx: &ActorContext,
        day_start: DateTime<Utc>,
        counted: Money,
    ) -> ServiceResult<ReconciliationOutcome> {
        debug!(day = %day_start, counted = %counted, "run_daily reconciliation");

        validation::validate_price_cents(counted.cents()).map_err(CoreError::Validation)?;

        let day_end = day_start + Duration::days(1);

        let expected_cents = self
            .db
            .transactions()
            .sum_completed_in_window(day_start, day_end)
            .await?;
        let transactions = self
            .db
            .transactions()
            .list_in_window(day_start, day_end)
            .await?;

        let discrepancy_cents = counted.cents() - expected_cents;
        let status = reconciliation_status(discrepancy_cents);

        let record = DailyReconciliation {
            id: generate_reconciliation_id(),
            reconciliation_date: day_start,
            expected_cents,
            actual_cents: counted.cents(),
            discrepancy_cents,
            status,
            created_by: ctx.actor_id.clone(),
            created_at: Utc::now(),
        };

        self.db.reconciliations().insert(&record).await?;

        match status {
            ReconciliationStatus::Balanced => {
                info!(id = %record.id, expected_cents, "Reconciliation balanced")
            }
            ReconciliationStatus::Discrepancy => info!(
                id = %record.id,
                expected_cents,
                discrepancy_cents,
                "Reconciliation discrepancy"
            ),
        }

        Ok(ReconciliationOutcome {
            record,
            transaction_count: transactions.len(),
        })
    }

    /// The day's transactions for the reconciliation detail view.
    pub async fn day_transactions(
        &self,
        day_start: DateTime<Utc>,
    ) -> ServiceResult<Vec<Transaction>> {
        Ok(self
            .db
            .transactions()
            .list_in_window(day_start, day_start + Duration::days(1))
            .await?)
    }

    /// Recent reconciliation records, newest first.
    pub async fn history(&self, limit: u32) -> ServiceResult<Vec<DailyReconciliation>> {
        Ok(self.db.reconciliations().list_recent(limit).await?)
    }
}

// =============================================================================
// Unit Tests
// =============================================================================
