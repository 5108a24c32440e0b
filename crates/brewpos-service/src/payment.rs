//! # Payment Processor
//!
//! Validates, calculates and records payments against pending orders.
//!
//! ## Payment Flow
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                      process_payment()                                  │
//! │                                                                         │
//! │  1. validate tendered amount            (>= 0)                         │
//! │  2. load order                          must exist, must be pending    │
//! │  3. re-fetch promotion (if selected)    must be eligible NOW           │
//! │  4. calculate                           discount → total → change      │
//! │     (pure functions; the same math as the register's live preview)     │
//! │  5. tendered >= final total?            else reject, NOTHING written   │
//! │  6. record_payment()                    ONE transaction:               │
//! │       • order: discount snapshot + final total + pending→completed    │
//! │       • transactions: immutable ledger row                            │
//! │       • order_status_history: pending→completed                       │
//! │                                                                         │
//! │  Steps 1-5 are read-only. A rejected payment leaves no trace.         │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

use chrono::Utc;
use serde::Serialize;
use tracing::{debug, info};
use uuid::Uuid;

use brewpos_core::{
    calculate_change, calculate_discount, calculate_total, validation, CoreError,
    DiscountSelection, Money, Order, PaymentStatus, Transaction,
};
use brewpos_db::Database;

use crate::context::ActorContext;
use crate::error::ServiceResult;

/// Live payment preview for the register screen.
///
/// Same arithmetic as [`PaymentProcessor::process_payment`]; showing this and
/// then processing can never produce different numbers.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PaymentPreview {
    pub order_id: String,
    pub total_before_discount_cents: i64,
    pub discount_cents: i64,
    pub final_cents: i64,
}

/// Result of a successfully recorded payment.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PaymentOutcome {
    pub transaction_id: String,
    pub order_id: String,
    pub total_before_discount_cents: i64,
    pub discount_cents: i64,
    pub final_cents: i64,
    pub tendered_cents: i64,
    pub change_cents: i64,
}

/// Orchestrates payment validation, calculation and persistence.
#[derive(Debug, Clone)]
pub struct PaymentProcessor {
    db: Database,
}

impl PaymentProcessor {
    /// Creates a new payment processor.
    pub fn new(db: Database) -> Self {
        PaymentProcessor { db }
    }

    /// Computes the discount and final total for an order without writing
    /// anything. Absent order id → zeroed preview (nothing selected yet).
    pub async fn preview(
        &self,
        order_id: Option<&str>,
        selection: &DiscountSelection,
    ) -> ServiceResult<PaymentPreview> {
        let order = match order_id {
            Some(id) => self.db.orders().get_by_id(id).await?,
            None => None,
        };

        let discount = calculate_discount(order.as_ref(), selection);
        let total = calculate_total(order.as_ref(), discount);

        Ok(PaymentPreview {
            order_id: order.as_ref().map(|o| o.id.clone()).unwrap_or_default(),
            total_before_discount_cents: order.as_ref().map(|o| o.total_cents).unwrap_or(0),
            discount_cents: discount.cents(),
            final_cents: total.cents(),
        })
    }

    /// Processes a payment against a pending order.
    ///
    /// ## Rejections (all before any write)
    /// - Order missing, or not pending
    /// - Selected promotion missing or no longer eligible
    /// - Tendered amount below the computed final total
    pub async fn process_payment(
        &self,
        ctx: &ActorContext,
        order_id: &str,
        selection: &DiscountSelection,
        tendered: Money,
    ) -> ServiceResult<PaymentOutcome> {
        debug!(order_id = %order_id, tendered = %tendered, "process_payment");

        validation::validate_tendered_cents(tendered.cents())
            .map_err(CoreError::Validation)?;

        let order = self
            .db
            .orders()
            .get_by_id(order_id)
            .await?
            .ok_or_else(|| CoreError::OrderNotFound(order_id.to_string()))?;

        if !order.is_pending() {
            return Err(CoreError::OrderNotPending {
                order_id: order.id,
                current_status: order.status,
            }
            .into());
        }

        // A promotion selected at the register may have been archived or
        // expired since the screen loaded. Re-fetch and re-check.
        let selection = self.refresh_selection(selection).await?;

        let discount = calculate_discount(Some(&order), &selection);
        let final_total = calculate_total(Some(&order), discount);
        let change = calculate_change(tendered, final_total);

        if tendered < final_total {
            return Err(CoreError::InsufficientTendered {
                tendered_cents: tendered.cents(),
                required_cents: final_total.cents(),
            }
            .into());
        }

        let record = Transaction {
            id: Uuid::new_v4().to_string(),
            order_id: order.id.clone(),
            total_cents: order.total_cents,
            discount_cents: discount.cents(),
            discount_type: selection.kind(),
            promotion_id: selection.promotion_id().map(str::to_string),
            final_cents: final_total.cents(),
            tendered_cents: tendered.cents(),
            change_cents: change.cents(),
            payment_status: PaymentStatus::Completed,
            created_by: ctx.actor_id.clone(),
            created_at: Utc::now(),
        };

        self.db.orders().record_payment(&record).await?;

        info!(
            order_id = %record.order_id,
            transaction_id = %record.id,
            final_cents = record.final_cents,
            change_cents = record.change_cents,
            "Payment recorded"
        );

        Ok(PaymentOutcome {
            transaction_id: record.id,
            order_id: record.order_id,
            total_before_discount_cents: record.total_cents,
            discount_cents: record.discount_cents,
            final_cents: record.final_cents,
            tendered_cents: record.tendered_cents,
            change_cents: record.change_cents,
        })
    }

    /// Re-fetches a selected promotion and checks eligibility at processing
    /// time. Manual and no-discount selections pass through unchanged.
    async fn refresh_selection(
        &self,
        selection: &DiscountSelection,
    ) -> ServiceResult<DiscountSelection> {
        let DiscountSelection::Promotion { promotion } = selection else {
            return Ok(selection.clone());
        };

        let fresh = self
            .db
            .promotions()
            .get_by_id(&promotion.id)
            .await?
            .ok_or_else(|| CoreError::PromotionNotFound(promotion.id.clone()))?;

        if !fresh.is_eligible(Utc::now()) {
            return Err(CoreError::PromotionNotEligible(fresh.id).into());
        }

        Ok(DiscountSelection::Promotion { promotion: fresh })
    }

    /// Loads an order for read-only display.
    pub async fn get_order(&self, order_id: &str) -> ServiceResult<Option<Order>> {
        Ok(self.db.orders().get_by_id(order_id).await?)
    }
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ErrorCode;
    use brewpos_core::{DiscountKind, DiscountType, OrderStatus, Promotion};
    use brewpos_db::DbConfig;
    use chrono::Duration;

    async fn test_db() -> Database {
        Database::new(DbConfig::in_memory()).await.unwrap()
    }

    async fn seed_pending_order(db: &Database, total_cents: i64) -> Order {
        let now = Utc::now();
        let order = Order {
            id: Uuid::new_v4().to_string(),
            order_number: format!("BRW-TEST-{}", &Uuid::new_v4().to_string()[..8]),
            status: OrderStatus::Pending,
            total_cents,
            total_before_discount_cents: None,
            discount_cents: 0,
            applied_promotion_id: None,
            total_items: 1,
            notes: None,
            created_by: Some("test".to_string()),
            created_at: now,
            updated_at: now,
        };
        db.orders().create_with_items(&order, &[]).await.unwrap();
        order
    }

    async fn seed_promotion(db: &Database, discount_type: DiscountType, value: i64) -> Promotion {
        let now = Utc::now();
        let promo = Promotion {
            id: Uuid::new_v4().to_string(),
            name: "Test Promo".to_string(),
            description: None,
            discount_type,
            discount_value: value,
            is_active: true,
            is_archived: false,
            start_date: now - Duration::days(1),
            end_date: now + Duration::days(1),
            created_by: None,
            created_at: now,
            updated_at: now,
        };
        db.promotions().insert(&promo).await.unwrap();
        promo
    }

    #[tokio::test]
    async fn payment_with_manual_discount() {
        // $100.00 order, $20.00 manual discount, $80.00 tendered exactly
        let db = test_db().await;
        let processor = PaymentProcessor::new(db.clone());
        let order = seed_pending_order(&db, 10_000).await;

        let outcome = processor
            .process_payment(
                &ActorContext::staff("maria"),
                &order.id,
                &DiscountSelection::Manual {
                    amount: Money::from_cents(2000),
                },
                Money::from_cents(8000),
            )
            .await
            .unwrap();

        assert_eq!(outcome.total_before_discount_cents, 10_000);
        assert_eq!(outcome.discount_cents, 2000);
        assert_eq!(outcome.final_cents, 8000);
        assert_eq!(outcome.change_cents, 0);

        // Order reflects the snapshot and is completed
        let paid = db.orders().get_by_id(&order.id).await.unwrap().unwrap();
        assert_eq!(paid.status, OrderStatus::Completed);
        assert_eq!(paid.total_cents, 8000);
        assert_eq!(paid.total_before_discount_cents, Some(10_000));
        assert_eq!(paid.discount_cents, 2000);

        // Ledger row exists and matches
        let txs = db.transactions().list_for_order(&order.id).await.unwrap();
        assert_eq!(txs.len(), 1);
        assert_eq!(txs[0].discount_type, DiscountKind::Manual);
        assert_eq!(txs[0].created_by.as_deref(), Some("maria"));

        // History: NULL→pending, pending→completed
        let history = db.orders().get_status_history(&order.id).await.unwrap();
        assert_eq!(history.len(), 2);
        assert_eq!(history[1].previous_status, Some(OrderStatus::Pending));
        assert_eq!(history[1].new_status, OrderStatus::Completed);
    }

    #[tokio::test]
    async fn payment_with_percentage_promotion_and_change() {
        // $100.00 order, 15% promotion, $100.00 tendered → $15.00 change
        let db = test_db().await;
        let processor = PaymentProcessor::new(db.clone());
        let order = seed_pending_order(&db, 10_000).await;
        let promo = seed_promotion(&db, DiscountType::Percentage, 1500).await;

        let outcome = processor
            .process_payment(
                &ActorContext::anonymous(),
                &order.id,
                &DiscountSelection::Promotion { promotion: promo.clone() },
                Money::from_cents(10_000),
            )
            .await
            .unwrap();

        assert_eq!(outcome.discount_cents, 1500);
        assert_eq!(outcome.final_cents, 8500);
        assert_eq!(outcome.change_cents, 1500);

        let paid = db.orders().get_by_id(&order.id).await.unwrap().unwrap();
        assert_eq!(paid.applied_promotion_id.as_deref(), Some(promo.id.as_str()));
    }

    #[tokio::test]
    async fn underpayment_rejected_without_writes() {
        // $85.00 due, $50.00 tendered → rejected, order untouched, no ledger row
        let db = test_db().await;
        let processor = PaymentProcessor::new(db.clone());
        let order = seed_pending_order(&db, 8500).await;

        let err = processor
            .process_payment(
                &ActorContext::anonymous(),
                &order.id,
                &DiscountSelection::None,
                Money::from_cents(5000),
            )
            .await
            .unwrap_err();

        assert_eq!(err.code, ErrorCode::PaymentError);

        let untouched = db.orders().get_by_id(&order.id).await.unwrap().unwrap();
        assert_eq!(untouched.status, OrderStatus::Pending);
        assert_eq!(untouched.total_cents, 8500);
        assert_eq!(untouched.total_before_discount_cents, None);
        assert_eq!(untouched.discount_cents, 0);

        let txs = db.transactions().list_for_order(&order.id).await.unwrap();
        assert!(txs.is_empty());

        let history = db.orders().get_status_history(&order.id).await.unwrap();
        assert_eq!(history.len(), 1); // only the creation row
    }

    #[tokio::test]
    async fn oversized_discount_pays_zero() {
        // Discount beyond the total: pay $0.00, tender $0.00
        let db = test_db().await;
        let processor = PaymentProcessor::new(db.clone());
        let order = seed_pending_order(&db, 500).await;

        let outcome = processor
            .process_payment(
                &ActorContext::anonymous(),
                &order.id,
                &DiscountSelection::Manual {
                    amount: Money::from_cents(10_000),
                },
                Money::zero(),
            )
            .await
            .unwrap();

        assert_eq!(outcome.final_cents, 0);
        assert_eq!(outcome.change_cents, 0);
    }

    #[tokio::test]
    async fn completed_order_cannot_be_paid_again() {
        let db = test_db().await;
        let processor = PaymentProcessor::new(db.clone());
        let order = seed_pending_order(&db, 1000).await;

        processor
            .process_payment(
                &ActorContext::anonymous(),
                &order.id,
                &DiscountSelection::None,
                Money::from_cents(1000),
            )
            .await
            .unwrap();

        let err = processor
            .process_payment(
                &ActorContext::anonymous(),
                &order.id,
                &DiscountSelection::None,
                Money::from_cents(1000),
            )
            .await
            .unwrap_err();

        assert_eq!(err.code, ErrorCode::PaymentError);

        let txs = db.transactions().list_for_order(&order.id).await.unwrap();
        assert_eq!(txs.len(), 1);
    }

    #[tokio::test]
    async fn archived_promotion_rejected_at_payment_time() {
        let db = test_db().await;
        let processor = PaymentProcessor::new(db.clone());
        let order = seed_pending_order(&db, 10_000).await;
        let promo = seed_promotion(&db, DiscountType::Percentage, 1500).await;

        // Archived after the register screen loaded it
        db.promotions().archive(&promo.id).await.unwrap();

        let err = processor
            .process_payment(
                &ActorContext::anonymous(),
                &order.id,
                &DiscountSelection::Promotion { promotion: promo },
                Money::from_cents(10_000),
            )
            .await
            .unwrap_err();

        assert_eq!(err.code, ErrorCode::BusinessLogic);
        assert!(db
            .transactions()
            .list_for_order(&order.id)
            .await
            .unwrap()
            .is_empty());
    }

    #[tokio::test]
    async fn negative_tendered_rejected() {
        let db = test_db().await;
        let processor = PaymentProcessor::new(db.clone());
        let order = seed_pending_order(&db, 1000).await;

        let err = processor
            .process_payment(
                &ActorContext::anonymous(),
                &order.id,
                &DiscountSelection::None,
                Money::from_cents(-1),
            )
            .await
            .unwrap_err();

        assert_eq!(err.code, ErrorCode::ValidationError);
    }

    #[tokio::test]
    async fn preview_matches_processing() {
        let db = test_db().await;
        let processor = PaymentProcessor::new(db.clone());
        let order = seed_pending_order(&db, 7777).await;
        let promo = seed_promotion(&db, DiscountType::Percentage, 825).await;

        let selection = DiscountSelection::Promotion { promotion: promo };
        let preview = processor
            .preview(Some(&order.id), &selection)
            .await
            .unwrap();

        let outcome = processor
            .process_payment(
                &ActorContext::anonymous(),
                &order.id,
                &selection,
                Money::from_cents(preview.final_cents),
            )
            .await
            .unwrap();

        assert_eq!(preview.discount_cents, outcome.discount_cents);
        assert_eq!(preview.final_cents, outcome.final_cents);
    }
}
