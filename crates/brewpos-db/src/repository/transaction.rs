//! # Transaction Repository
//!
//! Read-side access to the payment ledger.
//!
//! Transactions are written only by [`crate::repository::order::OrderRepository::record_payment`]
//! as part of the payment transaction; this repository is queries only.

use chrono::{DateTime, Utc};
use sqlx::SqlitePool;

use crate::error::DbResult;
use brewpos_core::Transaction;

/// Repository for payment ledger reads.
#[derive(Debug, Clone)]
pub struct TransactionRepository {
    pool: SqlitePool,
}

impl TransactionRepository {
    /// Creates a new TransactionRepository.
    pub fn new(pool: SqlitePool) -> Self {
        TransactionRepository { pool }
    }

    /// Gets a transaction by ID.
    pub async fn get_by_id(&self, id: &str) -> DbResult<Option<Transaction>> {
        let transaction = sqlx::query_as::<_, Transaction>(
            r#"
            SELECT id, order_id, total_cents, discount_cents, discount_type,
                   promotion_id, final_cents, tendered_cents, change_cents,
                   payment_status, created_by, created_at
            FROM transactions
            WHERE id = ?1
            "#,
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(transaction)
    }

    /// Lists the transactions for one order (at most one under normal
    /// operation; the pending-status guard prevents double payment).
    pub async fn list_for_order(&self, order_id: &str) -> DbResult<Vec<Transaction>> {
        let transactions = sqlx::query_as::<_, Transaction>(
            r#"
            SELECT id, order_id, total_cents, discount_cents, discount_type,
                   promotion_id, final_cents, tendered_cents, change_cents,
                   payment_status, created_by, created_at
            FROM transactions
            WHERE order_id = ?1
            ORDER BY created_at
            "#,
        )
        .bind(order_id)
        .fetch_all(&self.pool)
        .await?;

        Ok(transactions)
    }

    /// Lists transactions in a half-open time window `[start, end)`,
    /// newest first (transaction history view).
    pub async fn list_in_window(
        &self,
        start: DateTime<Utc>,
        end: DateTime<Utc>,
    ) -> DbResult<Vec<Transaction>> {
        let transactions = sqlx::query_as::<_, Transaction>(
            r#"
            SELECT id, order_id, total_cents, discount_cents, discount_type,
                   promotion_id, final_cents, tendered_cents, change_cents,
                   payment_status, created_by, created_at
            FROM transactions
            WHERE created_at >= ?1 AND created_at < ?2
            ORDER BY created_at DESC
            "#,
        )
        .bind(start)
        .bind(end)
        .fetch_all(&self.pool)
        .await?;

        Ok(transactions)
    }

    /// Sums the final amounts of completed transactions in `[start, end)`.
    ///
    /// This is the reconciliation's expected-cash figure. `COALESCE` makes
    /// a day with no sales sum to zero rather than NULL.
    pub async fn sum_completed_in_window(
        &self,
        start: DateTime<Utc>,
        end: DateTime<Utc>,
    ) -> DbResult<i64> {
        let total: i64 = sqlx::query_scalar(
            r#"
            SELECT COALESCE(SUM(final_cents), 0)
            FROM transactions
            WHERE payment_status = 'completed'
              AND created_at >= ?1 AND created_at < ?2
            "#,
        )
        .bind(start)
        .bind(end)
        .fetch_one(&self.pool)
        .await?;

        Ok(total)
    }
}
