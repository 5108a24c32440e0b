//! # Reconciliation Repository
//!
//! Persistence for end-of-day cash reconciliation records.

use sqlx::SqlitePool;
use tracing::debug;
use uuid::Uuid;

use crate::error::DbResult;
use brewpos_core::DailyReconciliation;

/// Repository for daily reconciliation records.
#[derive(Debug, Clone)]
pub struct ReconciliationRepository {
    pool: SqlitePool,
}

impl ReconciliationRepository {
    /// Creates a new ReconciliationRepository.
    pub fn new(pool: SqlitePool) -> Self {
        ReconciliationRepository { pool }
    }

    /// Inserts a reconciliation record. Records are immutable; a recount
    /// gets a fresh row rather than an update.
    pub async fn insert(&self, record: &DailyReconciliation) -> DbResult<()> {
        debug!(
            id = %record.id,
            discrepancy_cents = record.discrepancy_cents,
            "Inserting reconciliation record"
        );

        sqlx::query(
            r#"
            INSERT INTO daily_reconciliations (
                id, reconciliation_date, expected_cents, actual_cents,
                discrepancy_cents, status, created_by, created_at
            ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8)
            "#,
        )
        .bind(&record.id)
        .bind(record.reconciliation_date)
        .bind(record.expected_cents)
        .bind(record.actual_cents)
        .bind(record.discrepancy_cents)
        .bind(record.status)
        .bind(&record.created_by)
        .bind(record.created_at)
        .execute(&self.pool)
        .await?;

        Ok(())
    }

    /// Lists the most recent reconciliation records, newest first.
    pub async fn list_recent(&self, limit: u32) -> DbResult<Vec<DailyReconciliation>> {
        let records = sqlx::query_as::<_, DailyReconciliation>(
            r#"
            SELECT id, reconciliation_date, expected_cents, actual_cents,
                   discrepancy_cents, status, created_by, created_at
            FROM daily_reconciliations
            ORDER BY created_at DESC
            LIMIT ?1
            "#,
        )
        .bind(limit)
        .fetch_all(&self.pool)
        .await?;

        Ok(records)
    }
}

/// Helper to generate a new reconciliation record ID.
pub fn generate_reconciliation_id() -> String {
    Uuid::new_v4().to_string()
}
