//! # Stock Ledger
//!
//! Guarded stock adjustments with an append-only audit trail.
//!
//! ## Adjustment Flow
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                           adjust()                                      │
//! │                                                                         │
//! │  1. validate amount              positive, <= MAX_STOCK_ADJUSTMENT     │
//! │  2. product must exist           active products only show in UI but   │
//! │                                  any existing product can be adjusted  │
//! │  3. apply_movement()             ONE transaction, guard inside:        │
//! │       UPDATE ... SET current = current + delta                         │
//! │             WHERE current + delta >= 0                                 │
//! │       zero rows → roll back, nothing written                           │
//! │       else     → updated level + ledger row                            │
//! │                                                                         │
//! │  The guard is evaluated by the database against the committed row,     │
//! │  not against a value read into Rust, so two racing removals can        │
//! │  never jointly drive a level negative.                                 │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

use serde::Serialize;
use tracing::{debug, info};

use brewpos_core::{
    stock_status, validation, CoreError, MovementType, StockLevel, StockMovement, StockStatus,
    DEFAULT_THRESHOLD_LEVEL,
};
use brewpos_db::{Database, ProductStockRow, StockApplyOutcome};

use crate::context::ActorContext;
use crate::error::ServiceResult;

/// Result of one applied stock adjustment.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct StockAdjustment {
    pub product_id: String,
    pub previous_stock: i64,
    pub new_stock: i64,
    pub status: StockStatus,
    pub movement_id: String,
}

/// Stock level with its derived status, for the inventory view.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct StockView {
    pub product_id: String,
    pub current_stock: i64,
    pub threshold_level: i64,
    pub status: StockStatus,
}

impl From<StockLevel> for StockView {
    fn from(level: StockLevel) -> Self {
        let status = level.status();
        StockView {
            product_id: level.product_id,
            current_stock: level.current_stock,
            threshold_level: level.threshold_level,
            status,
        }
    }
}

/// Orchestrates stock adjustments and inventory reads.
#[derive(Debug, Clone)]
pub struct StockLedger {
    db: Database,
}

impl StockLedger {
    /// Creates a new stock ledger service.
    pub fn new(db: Database) -> Self {
        StockLedger { db }
    }

    /// Applies one stock adjustment.
    ///
    /// `amount` is a positive unit count; `movement_type` gives the
    /// direction. A removal exceeding the current level is rejected and
    /// nothing is written.
    pub async fn adjust(
        &self,
        ctx: &ActorContext,
        product_id: &str,
        movement_type: MovementType,
        amount: i64,
    ) -> ServiceResult<StockAdjustment> {
        debug!(product_id = %product_id, movement_type = ?movement_type, amount, "adjust stock");

        validation::validate_stock_amount(amount).map_err(CoreError::Validation)?;

        // Adjusting stock for a product that was never on the menu is
        // always a mistake; reject before touching the ledger.
        self.db
            .products()
            .get_by_id(product_id)
            .await?
            .ok_or_else(|| CoreError::ProductNotFound(product_id.to_string()))?;

        let outcome = self
            .db
            .stock()
            .apply_movement(product_id, movement_type, amount, ctx.actor())
            .await?;

        match outcome {
            StockApplyOutcome::Applied { level, movement } => {
                info!(
                    product_id = %product_id,
                    previous = movement.previous_stock,
                    new = movement.new_stock,
                    "Stock adjusted"
                );

                Ok(StockAdjustment {
                    product_id: level.product_id,
                    previous_stock: movement.previous_stock,
                    new_stock: movement.new_stock,
                    status: stock_status(level.current_stock, level.threshold_level),
                    movement_id: movement.id,
                })
            }
            StockApplyOutcome::InsufficientStock { current_stock } => {
                Err(CoreError::NegativeStock {
                    current: current_stock,
                    requested: amount,
                }
                .into())
            }
        }
    }

    /// Current stock view for one product. Products with no movements yet
    /// report zero stock at the default threshold.
    pub async fn level(&self, product_id: &str) -> ServiceResult<StockView> {
        let level = self.db.stock().get_level(product_id).await?;

        Ok(level.map(StockView::from).unwrap_or(StockView {
            product_id: product_id.to_string(),
            current_stock: 0,
            threshold_level: DEFAULT_THRESHOLD_LEVEL,
            status: StockStatus::OutOfStock,
        }))
    }

    /// Active menu products joined with their stock levels. Products that
    /// never had a movement appear with null stock columns.
    pub async fn menu_with_stock(&self) -> ServiceResult<Vec<ProductStockRow>> {
        Ok(self.db.products().list_with_stock().await?)
    }

    /// All stock levels with derived statuses (inventory screen).
    pub async fn inventory(&self) -> ServiceResult<Vec<StockView>> {
        let levels = self.db.stock().list_levels().await?;
        Ok(levels.into_iter().map(StockView::from).collect())
    }

    /// Products at or below their low-stock threshold.
    pub async fn low_stock(&self) -> ServiceResult<Vec<StockView>> {
        let views = self.inventory().await?;
        Ok(views
            .into_iter()
            .filter(|v| v.status != StockStatus::InStock)
            .collect())
    }

    /// Movement history for a product, newest first.
    pub async fn movements(
        &self,
        product_id: &str,
        limit: u32,
    ) -> ServiceResult<Vec<StockMovement>> {
        Ok(self.db.stock().list_movements(product_id, limit).await?)
    }

    /// Updates the low-stock threshold for a product.
    pub async fn set_threshold(&self, product_id: &str, threshold_level: i64) -> ServiceResult<()> {
        if threshold_level < 0 {
            return Err(CoreError::Validation(
                brewpos_core::ValidationError::MustNotBeNegative {
                    field: "threshold_level".to_string(),
                },
            )
            .into());
        }

        self.db
            .products()
            .get_by_id(product_id)
            .await?
            .ok_or_else(|| CoreError::ProductNotFound(product_id.to_string()))?;

        Ok(self.db.stock().set_threshold(product_id, threshold_level).await?)
    }
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ErrorCode;
    use brewpos_core::Product;
    use brewpos_db::DbConfig;
    use chrono::Utc;
    use uuid::Uuid;

    async fn test_db() -> Database {
        Database::new(DbConfig::in_memory()).await.unwrap()
    }

    async fn seed_product(db: &Database) -> Product {
        let now = Utc::now();
        let product = Product {
            id: Uuid::new_v4().to_string(),
            name: "Latte".to_string(),
            category: "espresso".to_string(),
            price_cents: 495,
            is_active: true,
            created_at: now,
            updated_at: now,
        };
        db.products().insert(&product).await.unwrap();
        product
    }

    #[tokio::test]
    async fn first_movement_creates_level() {
        let db = test_db().await;
        let ledger = StockLedger::new(db.clone());
        let product = seed_product(&db).await;

        let adjustment = ledger
            .adjust(&ActorContext::staff("sam"), &product.id, MovementType::Add, 25)
            .await
            .unwrap();

        assert_eq!(adjustment.previous_stock, 0);
        assert_eq!(adjustment.new_stock, 25);
        assert_eq!(adjustment.status, StockStatus::InStock);

        let view = ledger.level(&product.id).await.unwrap();
        assert_eq!(view.current_stock, 25);
        assert_eq!(view.threshold_level, DEFAULT_THRESHOLD_LEVEL);
    }

    #[tokio::test]
    async fn movements_chain_without_gaps() {
        let db = test_db().await;
        let ledger = StockLedger::new(db.clone());
        let product = seed_product(&db).await;

        ledger
            .adjust(&ActorContext::anonymous(), &product.id, MovementType::Add, 30)
            .await
            .unwrap();
        ledger
            .adjust(&ActorContext::anonymous(), &product.id, MovementType::Remove, 12)
            .await
            .unwrap();
        ledger
            .adjust(&ActorContext::anonymous(), &product.id, MovementType::Add, 5)
            .await
            .unwrap();

        // Newest first; reverse for chronological chaining check
        let mut movements = ledger.movements(&product.id, 10).await.unwrap();
        movements.reverse();

        assert_eq!(movements.len(), 3);
        assert_eq!(movements[0].previous_stock, 0);
        for pair in movements.windows(2) {
            assert_eq!(pair[0].new_stock, pair[1].previous_stock);
        }
        assert_eq!(movements[2].new_stock, 23);
    }

    #[tokio::test]
    async fn removal_below_zero_rejected_without_movement() {
        // 5 on hand, remove 8 → rejected, level unchanged, no ledger row
        let db = test_db().await;
        let ledger = StockLedger::new(db.clone());
        let product = seed_product(&db).await;

        ledger
            .adjust(&ActorContext::anonymous(), &product.id, MovementType::Add, 5)
            .await
            .unwrap();

        let err = ledger
            .adjust(&ActorContext::anonymous(), &product.id, MovementType::Remove, 8)
            .await
            .unwrap_err();

        assert_eq!(err.code, ErrorCode::InsufficientStock);
        assert!(err.message.contains('5'));
        assert!(err.message.contains('8'));

        let view = ledger.level(&product.id).await.unwrap();
        assert_eq!(view.current_stock, 5);

        let movements = ledger.movements(&product.id, 10).await.unwrap();
        assert_eq!(movements.len(), 1);
    }

    #[tokio::test]
    async fn rejected_removal_on_unstocked_product_leaves_no_level_row() {
        // Removing from a product with no level row is rejected at current
        // stock zero, and the rejection must not create the row either.
        let db = test_db().await;
        let ledger = StockLedger::new(db.clone());
        let product = seed_product(&db).await;

        let err = ledger
            .adjust(&ActorContext::anonymous(), &product.id, MovementType::Remove, 1)
            .await
            .unwrap_err();

        assert_eq!(err.code, ErrorCode::InsufficientStock);
        assert!(err.message.contains('0'));

        assert!(db.stock().get_level(&product.id).await.unwrap().is_none());
        assert!(ledger.movements(&product.id, 10).await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn removal_to_exactly_zero_allowed() {
        let db = test_db().await;
        let ledger = StockLedger::new(db.clone());
        let product = seed_product(&db).await;

        ledger
            .adjust(&ActorContext::anonymous(), &product.id, MovementType::Add, 7)
            .await
            .unwrap();
        let adjustment = ledger
            .adjust(&ActorContext::anonymous(), &product.id, MovementType::Remove, 7)
            .await
            .unwrap();

        assert_eq!(adjustment.new_stock, 0);
        assert_eq!(adjustment.status, StockStatus::OutOfStock);
    }

    #[tokio::test]
    async fn status_transitions_with_threshold() {
        // Threshold 10: 11 → in_stock, 10 → low_stock, 0 → out_of_stock
        let db = test_db().await;
        let ledger = StockLedger::new(db.clone());
        let product = seed_product(&db).await;

        let a = ledger
            .adjust(&ActorContext::anonymous(), &product.id, MovementType::Add, 11)
            .await
            .unwrap();
        assert_eq!(a.status, StockStatus::InStock);

        let b = ledger
            .adjust(&ActorContext::anonymous(), &product.id, MovementType::Remove, 1)
            .await
            .unwrap();
        assert_eq!(b.status, StockStatus::LowStock);

        let c = ledger
            .adjust(&ActorContext::anonymous(), &product.id, MovementType::Remove, 10)
            .await
            .unwrap();
        assert_eq!(c.status, StockStatus::OutOfStock);
    }

    #[tokio::test]
    async fn unknown_product_rejected() {
        let db = test_db().await;
        let ledger = StockLedger::new(db.clone());

        let err = ledger
            .adjust(&ActorContext::anonymous(), "missing", MovementType::Add, 5)
            .await
            .unwrap_err();

        assert_eq!(err.code, ErrorCode::NotFound);
    }

    #[tokio::test]
    async fn invalid_amounts_rejected() {
        let db = test_db().await;
        let ledger = StockLedger::new(db.clone());
        let product = seed_product(&db).await;

        for amount in [0, -5, 100_001] {
            let err = ledger
                .adjust(&ActorContext::anonymous(), &product.id, MovementType::Add, amount)
                .await
                .unwrap_err();
            assert_eq!(err.code, ErrorCode::ValidationError);
        }
    }

    #[tokio::test]
    async fn menu_with_stock_includes_unstocked_products() {
        let db = test_db().await;
        let ledger = StockLedger::new(db.clone());
        let stocked = seed_product(&db).await;
        let unstocked = seed_product(&db).await;

        ledger
            .adjust(&ActorContext::anonymous(), &stocked.id, MovementType::Add, 40)
            .await
            .unwrap();

        let menu = ledger.menu_with_stock().await.unwrap();
        assert_eq!(menu.len(), 2);

        let stocked_row = menu.iter().find(|r| r.id == stocked.id).unwrap();
        assert_eq!(stocked_row.current_stock, Some(40));

        let unstocked_row = menu.iter().find(|r| r.id == unstocked.id).unwrap();
        assert_eq!(unstocked_row.current_stock, None);
    }

    #[tokio::test]
    async fn low_stock_report() {
        let db = test_db().await;
        let ledger = StockLedger::new(db.clone());
        let low = seed_product(&db).await;
        let fine = seed_product(&db).await;

        ledger
            .adjust(&ActorContext::anonymous(), &low.id, MovementType::Add, 3)
            .await
            .unwrap();
        ledger
            .adjust(&ActorContext::anonymous(), &fine.id, MovementType::Add, 50)
            .await
            .unwrap();

        let report = ledger.low_stock().await.unwrap();
        assert_eq!(report.len(), 1);
        assert_eq!(report[0].product_id, low.id);
    }
}
