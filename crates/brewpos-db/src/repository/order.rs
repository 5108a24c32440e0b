//! # Order Repository
//!
//! Database operations for orders, line items, status history and payment
//! recording.
//!
//! ## Order Lifecycle
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                       Order Lifecycle                                   │
//! │                                                                         │
//! │  1. INTAKE (one transaction)                                           │
//! │     └── create_with_items()                                            │
//! │         ├── INSERT orders          { status: pending }                 │
//! │         ├── INSERT order_items     (+ customizations)                  │
//! │         └── INSERT order_status_history  (NULL → pending)              │
//! │                                                                         │
//! │  2. PAYMENT (one transaction)                                          │
//! │     └── record_payment()                                               │
//! │         ├── UPDATE orders: discount snapshot + final total            │
//! │         │          AND status pending → completed                      │
//! │         ├── INSERT transactions    (immutable receipt)                 │
//! │         └── INSERT order_status_history  (pending → completed)         │
//! │                                                                         │
//! │  3. (OPTIONAL) CANCEL (one transaction)                                │
//! │     └── update_status() → { status: cancelled } + history row          │
//! │                                                                         │
//! │  A reader can never observe half of any step: each commits atomically. │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

use chrono::Utc;
use sqlx::SqlitePool;
use tracing::debug;
use uuid::Uuid;

use crate::error::{DbError, DbResult};
use brewpos_core::{ItemCustomization, Order, OrderItem, OrderStatus, OrderStatusChange, Transaction};

/// Repository for order database operations.
#[derive(Debug, Clone)]
pub struct OrderRepository {
    pool: SqlitePool,
}

impl OrderRepository {
    /// Creates a new OrderRepository.
    pub fn new(pool: SqlitePool) -> Self {
        OrderRepository { pool }
    }

    /// Gets an order by ID.
    pub async fn get_by_id(&self, id: &str) -> DbResult<Option<Order>> {
        let order = sqlx::query_as::<_, Order>(
            r#"
            SELECT id, order_number, status, total_cents,
                   total_before_discount_cents, discount_cents,
                   applied_promotion_id, total_items, notes,
                   created_by, created_at, updated_at
            FROM orders
            WHERE id = ?1
            "#,
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(order)
    }

    /// Lists pending orders, newest first (the payment screen's order queue).
    pub async fn list_pending(&self) -> DbResult<Vec<Order>> {
        let orders = sqlx::query_as::<_, Order>(
            r#"
            SELECT id, order_number, status, total_cents,
                   total_before_discount_cents, discount_cents,
                   applied_promotion_id, total_items, notes,
                   created_by, created_at, updated_at
            FROM orders
            WHERE status = 'pending'
            ORDER BY created_at DESC
            "#,
        )
        .fetch_all(&self.pool)
        .await?;

        Ok(orders)
    }

    /// Lists most recent orders regardless of status (order history view).
    pub async fn list_recent(&self, limit: u32) -> DbResult<Vec<Order>> {
        let orders = sqlx::query_as::<_, Order>(
            r#"
            SELECT id, order_number, status, total_cents,
                   total_before_discount_cents, discount_cents,
                   applied_promotion_id, total_items, notes,
                   created_by, created_at, updated_at
            FROM orders
            ORDER BY created_at DESC
            LIMIT ?1
            "#,
        )
        .bind(limit)
        .fetch_all(&self.pool)
        .await?;

        Ok(orders)
    }

    /// Gets all line items for an order.
    pub async fn get_items(&self, order_id: &str) -> DbResult<Vec<OrderItem>> {
        let items = sqlx::query_as::<_, OrderItem>(
            r#"
            SELECT id, order_id, product_id, quantity, unit_price_cents,
                   subtotal_cents, notes, created_at
            FROM order_items
            WHERE order_id = ?1
            ORDER BY created_at
            "#,
        )
        .bind(order_id)
        .fetch_all(&self.pool)
        .await?;

        Ok(items)
    }

    /// Gets the customizations for one line item.
    pub async fn get_customizations(&self, order_item_id: &str) -> DbResult<Vec<ItemCustomization>> {
        let customizations = sqlx::query_as::<_, ItemCustomization>(
            r#"
            SELECT id, order_item_id, name, price_cents, quantity
            FROM order_item_customizations
            WHERE order_item_id = ?1
            "#,
        )
        .bind(order_item_id)
        .fetch_all(&self.pool)
        .await?;

        Ok(customizations)
    }

    /// Gets the append-only status history for an order, oldest first.
    pub async fn get_status_history(&self, order_id: &str) -> DbResult<Vec<OrderStatusChange>> {
        let history = sqlx::query_as::<_, OrderStatusChange>(
            r#"
            SELECT id, order_id, previous_status, new_status, notes,
                   changed_by, created_at
            FROM order_status_history
            WHERE order_id = ?1
            ORDER BY created_at
            "#,
        )
        .bind(order_id)
        .fetch_all(&self.pool)
        .await?;

        Ok(history)
    }

    /// Creates an order with its line items, customizations and the initial
    /// `pending` status history row, all in one transaction.
    ///
    /// ## Snapshot Pattern
    /// Unit prices on line items are copied at creation time; later product
    /// price changes never affect an existing order.
    pub async fn create_with_items(
        &self,
        order: &Order,
        items: &[(OrderItem, Vec<ItemCustomization>)],
    ) -> DbResult<()> {
        debug!(id = %order.id, order_number = %order.order_number, items = items.len(), "Creating order");

        let mut tx = self.pool.begin().await?;

        sqlx::query(
            r#"
            INSERT INTO orders (
                id, order_number, status, total_cents,
                total_before_discount_cents, discount_cents,
                applied_promotion_id, total_items, notes,
                created_by, created_at, updated_at
            ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11, ?12)
            "#,
        )
        .bind(&order.id)
        .bind(&order.order_number)
        .bind(order.status)
        .bind(order.total_cents)
        .bind(order.total_before_discount_cents)
        .bind(order.discount_cents)
        .bind(&order.applied_promotion_id)
        .bind(order.total_items)
        .bind(&order.notes)
        .bind(&order.created_by)
        .bind(order.created_at)
        .bind(order.updated_at)
        .execute(&mut *tx)
        .await?;

        for (item, customizations) in items {
            sqlx::query(
                r#"
                INSERT INTO order_items (
                    id, order_id, product_id, quantity,
                    unit_price_cents, subtotal_cents, notes, created_at
                ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8)
                "#,
            )
            .bind(&item.id)
            .bind(&item.order_id)
            .bind(&item.product_id)
            .bind(item.quantity)
            .bind(item.unit_price_cents)
            .bind(item.subtotal_cents)
            .bind(&item.notes)
            .bind(item.created_at)
            .execute(&mut *tx)
            .await?;

            for customization in customizations {
                sqlx::query(
                    r#"
                    INSERT INTO order_item_customizations (
                        id, order_item_id, name, price_cents, quantity
                    ) VALUES (?1, ?2, ?3, ?4, ?5)
                    "#,
                )
                .bind(&customization.id)
                .bind(&customization.order_item_id)
                .bind(&customization.name)
                .bind(customization.price_cents)
                .bind(customization.quantity)
                .execute(&mut *tx)
                .await?;
            }
        }

        // Initial history row: NULL → pending
        sqlx::query(
            r#"
            INSERT INTO order_status_history (
                id, order_id, previous_status, new_status, notes,
                changed_by, created_at
            ) VALUES (?1, ?2, NULL, ?3, NULL, ?4, ?5)
            "#,
        )
        .bind(Uuid::new_v4().to_string())
        .bind(&order.id)
        .bind(order.status)
        .bind(&order.created_by)
        .bind(order.created_at)
        .execute(&mut *tx)
        .await?;

        tx.commit().await?;
        Ok(())
    }

    /// Records a payment against a pending order.
    ///
    /// ## One Transaction, Three Writes
    /// 1. Order update: `total_before_discount`, `discount_amount`,
    ///    `applied_promotion_id` and `total_amount` land together, and the
    ///    status moves `pending → completed` in the same statement. The
    ///    `WHERE status = 'pending'` guard makes concurrent double-payment
    ///    a no-op that rolls back.
    /// 2. Immutable transaction row (the receipt ledger entry).
    /// 3. Status history row (`pending → completed`).
    ///
    /// The ledger and the order record can never disagree: either all three
    /// writes commit or none do.
    ///
    /// ## Arguments
    /// * `record` - The fully-computed transaction; order fields are derived
    ///   from its snapshot values.
    pub async fn record_payment(&self, record: &Transaction) -> DbResult<()> {
        debug!(
            order_id = %record.order_id,
            final_cents = record.final_cents,
            "Recording payment"
        );

        let now = Utc::now();
        let mut tx = self.pool.begin().await?;

        let result = sqlx::query(
            r#"
            UPDATE orders SET
                total_before_discount_cents = ?2,
                discount_cents = ?3,
                applied_promotion_id = ?4,
                total_cents = ?5,
                status = 'completed',
                updated_at = ?6
            WHERE id = ?1 AND status = 'pending'
            "#,
        )
        .bind(&record.order_id)
        .bind(record.total_cents)
        .bind(record.discount_cents)
        .bind(&record.promotion_id)
        .bind(record.final_cents)
        .bind(now)
        .execute(&mut *tx)
        .await?;

        if result.rows_affected() == 0 {
            // Order vanished or was paid/cancelled by a concurrent actor.
            return Err(DbError::not_found("Order (pending)", &record.order_id));
        }

        sqlx::query(
            r#"
            INSERT INTO transactions (
                id, order_id, total_cents, discount_cents, discount_type,
                promotion_id, final_cents, tendered_cents, change_cents,
                payment_status, created_by, created_at
            ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11, ?12)
            "#,
        )
        .bind(&record.id)
        .bind(&record.order_id)
        .bind(record.total_cents)
        .bind(record.discount_cents)
        .bind(record.discount_type)
        .bind(&record.promotion_id)
        .bind(record.final_cents)
        .bind(record.tendered_cents)
        .bind(record.change_cents)
        .bind(record.payment_status)
        .bind(&record.created_by)
        .bind(record.created_at)
        .execute(&mut *tx)
        .await?;

        sqlx::query(
            r#"
            INSERT INTO order_status_history (
                id, order_id, previous_status, new_status, notes,
                changed_by, created_at
            ) VALUES (?1, ?2, ?3, ?4, NULL, ?5, ?6)
            "#,
        )
        .bind(Uuid::new_v4().to_string())
        .bind(&record.order_id)
        .bind(OrderStatus::Pending)
        .bind(OrderStatus::Completed)
        .bind(&record.created_by)
        .bind(now)
        .execute(&mut *tx)
        .await?;

        tx.commit().await?;
        Ok(())
    }

    /// Applies a status transition and appends the history row, in one
    /// transaction. Used for cancellation; payment goes through
    /// [`Self::record_payment`].
    ///
    /// The `WHERE status = ?` guard doubles as an optimistic concurrency
    /// check: a stale caller gets NotFound instead of clobbering a
    /// concurrent transition.
    pub async fn update_status(
        &self,
        order_id: &str,
        from: OrderStatus,
        to: OrderStatus,
        notes: Option<&str>,
        changed_by: Option<&str>,
    ) -> DbResult<()> {
        debug!(order_id = %order_id, from = ?from, to = ?to, "Updating order status");

        let now = Utc::now();
        let mut tx = self.pool.begin().await?;

        let result = sqlx::query(
            r#"
            UPDATE orders SET status = ?3, updated_at = ?4
            WHERE id = ?1 AND status = ?2
            "#,
        )
        .bind(order_id)
        .bind(from)
        .bind(to)
        .bind(now)
        .execute(&mut *tx)
        .await?;

        if result.rows_affected() == 0 {
            return Err(DbError::not_found("Order", order_id));
        }

        sqlx::query(
            r#"
            INSERT INTO order_status_history (
                id, order_id, previous_status, new_status, notes,
                changed_by, created_at
            ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7)
            "#,
        )
        .bind(Uuid::new_v4().to_string())
        .bind(order_id)
        .bind(from)
        .bind(to)
        .bind(notes)
        .bind(changed_by)
        .bind(now)
        .execute(&mut *tx)
        .await?;

        tx.commit().await?;
        Ok(())
    }
}

/// Generates an order number in format: BRW-YYYYMMDD-HHMMSS-NNNN
///
/// ## Format
/// - YYYYMMDD-HHMMSS: Creation timestamp (UTC)
/// - NNNN: Random suffix so two orders in the same second stay distinct
///   (the column's UNIQUE constraint is the backstop)
///
/// ## Example
/// `BRW-20260830-143012-0417`
pub fn generate_order_number() -> String {
    let now = Utc::now();
    let nanos = now.timestamp_subsec_nanos();
    format!("BRW-{}-{:04}", now.format("%Y%m%d-%H%M%S"), nanos % 10000)
}

/// Generates a new order ID.
pub fn generate_order_id() -> String {
    Uuid::new_v4().to_string()
}

/// Generates a new order item ID.
pub fn generate_order_item_id() -> String {
    Uuid::new_v4().to_string()
}
