//! # Stock Repository
//!
//! Stock levels and the append-only movement ledger.
//!
//! ## Ledger Invariant
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  Every change to stock_levels.current_stock goes through                │
//! │  apply_movement(), which in ONE transaction:                            │
//! │                                                                         │
//! │    1. inserts the level row at zero if the product has none yet        │
//! │       (a write statement, so the transaction holds the write lock      │
//! │       from here on)                                                    │
//! │    2. applies a RELATIVE update guarded in SQL:                        │
//! │         current_stock = current_stock + delta                          │
//! │         WHERE current_stock + delta >= 0                               │
//! │       zero rows affected → rejected, roll back, nothing written        │
//! │    3. reads the post-update row and appends a stock_movements row      │
//! │       with the previous/new pair                                       │
//! │                                                                         │
//! │  Result: movements for a product chain without gaps -                  │
//! │    movement[n].new_stock == movement[n+1].previous_stock               │
//! │  and a movement row exists for every level change, or neither does.   │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

use chrono::Utc;
use sqlx::SqlitePool;
use tracing::debug;
use uuid::Uuid;

use crate::error::DbResult;
use brewpos_core::{default_threshold, MovementType, StockLevel, StockMovement};

/// Result of attempting to apply a stock movement.
#[derive(Debug, Clone)]
pub enum StockApplyOutcome {
    /// Movement applied; both rows committed.
    Applied {
        level: StockLevel,
        movement: StockMovement,
    },
    /// Movement rejected: it would have driven stock below zero.
    /// Nothing was written.
    InsufficientStock { current_stock: i64 },
}

/// Repository for stock levels and movements.
#[derive(Debug, Clone)]
pub struct StockRepository {
    pool: SqlitePool,
}

impl StockRepository {
    /// Creates a new StockRepository.
    pub fn new(pool: SqlitePool) -> Self {
        StockRepository { pool }
    }

    /// Gets the stock level for a product, if one exists.
    ///
    /// A product with no level row has never had a movement; callers treat
    /// that as zero stock.
    pub async fn get_level(&self, product_id: &str) -> DbResult<Option<StockLevel>> {
        let level = sqlx::query_as::<_, StockLevel>(
            r#"
            SELECT product_id, current_stock, threshold_level, last_updated
            FROM stock_levels
            WHERE product_id = ?1
            "#,
        )
        .bind(product_id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(level)
    }

    /// Lists all stock levels (inventory view).
    pub async fn list_levels(&self) -> DbResult<Vec<StockLevel>> {
        let levels = sqlx::query_as::<_, StockLevel>(
            r#"
            SELECT product_id, current_stock, threshold_level, last_updated
            FROM stock_levels
            ORDER BY product_id
            "#,
        )
        .fetch_all(&self.pool)
        .await?;

        Ok(levels)
    }

    /// Lists movements for a product, newest first.
    pub async fn list_movements(&self, product_id: &str, limit: u32) -> DbResult<Vec<StockMovement>> {
        let movements = sqlx::query_as::<_, StockMovement>(
            r#"
            SELECT id, product_id, movement_type, quantity,
                   previous_stock, new_stock, created_by, created_at
            FROM stock_movements
            WHERE product_id = ?1
            ORDER BY created_at DESC, id DESC
            LIMIT ?2
            "#,
        )
        .bind(product_id)
        .bind(limit)
        .fetch_all(&self.pool)
        .await?;

        Ok(movements)
    }

    /// Applies one stock movement atomically.
    ///
    /// The guard is a relative SQL update (`current_stock = current_stock +
    /// delta WHERE current_stock + delta >= 0`), never a read-modify-write
    /// in Rust: concurrent adjustments serialize on the row and each sees
    /// the other's committed value. The ensure-row insert runs first so the
    /// transaction holds the write lock before anything is read. A rejected
    /// movement rolls back without writing anything; the CHECK constraints
    /// on both tables back up the guard against any writer that bypasses
    /// this method.
    ///
    /// ## Arguments
    /// * `quantity` - Positive unit count; direction comes from `movement_type`.
    pub async fn apply_movement(
        &self,
        product_id: &str,
        movement_type: MovementType,
        quantity: i64,
        created_by: Option<&str>,
    ) -> DbResult<StockApplyOutcome> {
        debug!(
            product_id = %product_id,
            movement_type = ?movement_type,
            quantity,
            "Applying stock movement"
        );

        let now = Utc::now();
        let delta = movement_type.signed(quantity);

        let mut tx = self.pool.begin().await?;

        // Ensure the level row exists so the relative update below covers
        // first movements too. Rolled back if the movement is rejected.
        sqlx::query(
            r#"
            INSERT INTO stock_levels (product_id, current_stock, threshold_level, last_updated)
            VALUES (?1, 0, ?2, ?3)
            ON CONFLICT(product_id) DO NOTHING
            "#,
        )
        .bind(product_id)
        .bind(default_threshold())
        .bind(now)
        .execute(&mut *tx)
        .await?;

        let result = sqlx::query(
            r#"
            UPDATE stock_levels SET
                current_stock = current_stock + ?2,
                last_updated = ?3
            WHERE product_id = ?1 AND current_stock + ?2 >= 0
            "#,
        )
        .bind(product_id)
        .bind(delta)
        .bind(now)
        .execute(&mut *tx)
        .await?;

        if result.rows_affected() == 0 {
            // Guard rejected the movement. Report the level it protected;
            // the transaction rolls back on drop, so the ensure-row insert
            // leaves no trace either.
            let current_stock: i64 =
                sqlx::query_scalar("SELECT current_stock FROM stock_levels WHERE product_id = ?1")
                    .bind(product_id)
                    .fetch_one(&mut *tx)
                    .await?;

            return Ok(StockApplyOutcome::InsufficientStock { current_stock });
        }

        let level = sqlx::query_as::<_, StockLevel>(
            r#"
            SELECT product_id, current_stock, threshold_level, last_updated
            FROM stock_levels
            WHERE product_id = ?1
            "#,
        )
        .bind(product_id)
        .fetch_one(&mut *tx)
        .await?;

        let movement = StockMovement {
            id: Uuid::new_v4().to_string(),
            product_id: product_id.to_string(),
            movement_type,
            quantity,
            previous_stock: level.current_stock - delta,
            new_stock: level.current_stock,
            created_by: created_by.map(str::to_string),
            created_at: now,
        };

        sqlx::query(
            r#"
            INSERT INTO stock_movements (
                id, product_id, movement_type, quantity,
                previous_stock, new_stock, created_by, created_at
            ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8)
            "#,
        )
        .bind(&movement.id)
        .bind(&movement.product_id)
        .bind(movement.movement_type)
        .bind(movement.quantity)
        .bind(movement.previous_stock)
        .bind(movement.new_stock)
        .bind(&movement.created_by)
        .bind(movement.created_at)
        .execute(&mut *tx)
        .await?;

        tx.commit().await?;

        Ok(StockApplyOutcome::Applied { level, movement })
    }

    /// Updates the low-stock threshold for a product.
    pub async fn set_threshold(&self, product_id: &str, threshold_level: i64) -> DbResult<()> {
        debug!(product_id = %product_id, threshold_level, "Setting stock threshold");

        let now = Utc::now();

        sqlx::query(
            r#"
            INSERT INTO stock_levels (product_id, current_stock, threshold_level, last_updated)
            VALUES (?1, 0, ?2, ?3)
            ON CONFLICT(product_id) DO UPDATE SET
                threshold_level = ?2,
                last_updated = ?3
            "#,
        )
        .bind(product_id)
        .bind(threshold_level)
        .bind(now)
        .execute(&self.pool)
        .await?;

        Ok(())
    }
}
