//! # Order Service
//!
//! Order intake and lifecycle management.
//!
//! ## Intake
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                        create_order()                                   │
//! │                                                                         │
//! │  NewOrder { items: [{ product_id, quantity, customizations }] }        │
//! │       │                                                                 │
//! │       ▼                                                                 │
//! │  validate quantities, load products (must exist and be active)         │
//! │       │                                                                 │
//! │       ▼                                                                 │
//! │  snapshot prices:                                                       │
//! │    line subtotal = unit_price * qty + Σ(customization price * qty)     │
//! │    order total   = Σ line subtotals                                    │
//! │       │                                                                 │
//! │       ▼                                                                 │
//! │  create_with_items()  - one transaction, status = pending              │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

use chrono::Utc;
use serde::{Deserialize, Serialize};
use tracing::{debug, info};
use uuid::Uuid;

use brewpos_core::{
    validation, CoreError, ItemCustomization, Money, Order, OrderItem, OrderStatus,
    OrderStatusChange,
};
use brewpos_db::repository::order::{generate_order_id, generate_order_item_id, generate_order_number};
use brewpos_db::Database;

use crate::context::ActorContext;
use crate::error::{ServiceError, ServiceResult};

// =============================================================================
// Input Types
// =============================================================================

/// A new order as entered at the register.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewOrder {
    pub items: Vec<NewOrderItem>,
    #[serde(default)]
    pub notes: Option<String>,
}

/// One requested line item.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewOrderItem {
    pub product_id: String,
    pub quantity: i64,
    #[serde(default)]
    pub customizations: Vec<NewOrderCustomization>,
    #[serde(default)]
    pub notes: Option<String>,
}

/// A priced customization on a requested line item.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewOrderCustomization {
    pub name: String,
    pub price_cents: i64,
    pub quantity: i64,
}

/// Full order view: header, line items with customizations, history.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct OrderDetails {
    pub order: Order,
    pub items: Vec<(OrderItem, Vec<ItemCustomization>)>,
    pub history: Vec<OrderStatusChange>,
}

// =============================================================================
// Order Service
// =============================================================================

/// Orchestrates order intake, cancellation and reads.
#[derive(Debug, Clone)]
pub struct OrderService {
    db: Database,
}

impl OrderService {
    /// Creates a new order service.
    pub fn new(db: Database) -> Self {
        OrderService { db }
    }

    /// Creates a pending order from register input.
    ///
    /// Prices are snapshotted from the live products at this moment; later
    /// price edits never change this order.
    pub async fn create_order(&self, ctx: &ActorContext, input: NewOrder) -> ServiceResult<Order> {
        debug!(items = input.items.len(), "create_order");

        if input.items.is_empty() {
            return Err(ServiceError::validation("Order must have at least one item"));
        }

        let now = Utc::now();
        let order_id = generate_order_id();

        let mut items: Vec<(OrderItem, Vec<ItemCustomization>)> = Vec::new();
        let mut order_total = Money::zero();
        let mut total_items = 0;

        for requested in &input.items {
            validation::validate_quantity(requested.quantity).map_err(CoreError::Validation)?;

            let product = self
                .db
                .products()
                .get_by_id(&requested.product_id)
                .await?
                .ok_or_else(|| CoreError::ProductNotFound(requested.product_id.clone()))?;

            if !product.is_active {
                return Err(ServiceError::validation(format!(
                    "Product '{}' is not on the menu",
                    product.name
                )));
            }

            let item_id = generate_order_item_id();
            let mut customizations = Vec::new();
            let mut customization_total = Money::zero();

            for c in &requested.customizations {
                validation::validate_name(&c.name).map_err(CoreError::Validation)?;
                validation::validate_price_cents(c.price_cents).map_err(CoreError::Validation)?;
                validation::validate_quantity(c.quantity).map_err(CoreError::Validation)?;

                let customization = ItemCustomization {
                    id: Uuid::new_v4().to_string(),
                    order_item_id: item_id.clone(),
                    name: c.name.trim().to_string(),
                    price_cents: c.price_cents,
                    quantity: c.quantity,
                };
                customization_total += customization.total();
                customizations.push(customization);
            }

            let subtotal =
                product.price().multiply_quantity(requested.quantity) + customization_total;

            let item = OrderItem {
                id: item_id,
                order_id: order_id.clone(),
                product_id: product.id.clone(),
                quantity: requested.quantity,
                unit_price_cents: product.price_cents,
                subtotal_cents: subtotal.cents(),
                notes: requested.notes.clone(),
                created_at: now,
            };

            order_total += subtotal;
            total_items += requested.quantity;
            items.push((item, customizations));
        }

        let order = Order {
            id: order_id,
            order_number: generate_order_number(),
            status: OrderStatus::Pending,
            total_cents: order_total.cents(),
            total_before_discount_cents: None,
            discount_cents: 0,
            applied_promotion_id: None,
            total_items,
            notes: input.notes,
            created_by: ctx.actor_id.clone(),
            created_at: now,
            updated_at: now,
        };

        self.db.orders().create_with_items(&order, &items).await?;

        info!(
            order_id = %order.id,
            order_number = %order.order_number,
            total = %order.total(),
            items = items.len(),
            "Order created"
        );

        Ok(order)
    }

    /// Cancels a pending order. Completed and cancelled orders cannot be
    /// cancelled (again).
    pub async fn cancel_order(
        &self,
        ctx: &ActorContext,
        order_id: &str,
        reason: Option<&str>,
    ) -> ServiceResult<()> {
        debug!(order_id = %order_id, "cancel_order");

        let order = self
            .db
            .orders()
            .get_by_id(order_id)
            .await?
            .ok_or_else(|| CoreError::OrderNotFound(order_id.to_string()))?;

        if !order.status.can_transition_to(OrderStatus::Cancelled) {
            return Err(CoreError::IllegalTransition {
                from: order.status,
                to: OrderStatus::Cancelled,
            }
            .into());
        }

        self.db
            .orders()
            .update_status(
                order_id,
                order.status,
                OrderStatus::Cancelled,
                reason,
                ctx.actor(),
            )
            .await?;

        info!(order_id = %order_id, "Order cancelled");
        Ok(())
    }

    /// Pending orders awaiting payment, newest first.
    pub async fn list_pending(&self) -> ServiceResult<Vec<Order>> {
        Ok(self.db.orders().list_pending().await?)
    }

    /// Recent orders regardless of status.
    pub async fn list_recent(&self, limit: u32) -> ServiceResult<Vec<Order>> {
        Ok(self.db.orders().list_recent(limit).await?)
    }

    /// Full order details: header, line items with customizations, and the
    /// status history.
    pub async fn get_details(&self, order_id: &str) -> ServiceResult<OrderDetails> {
        let orders = self.db.orders();

        let order = orders
            .get_by_id(order_id)
            .await?
            .ok_or_else(|| CoreError::OrderNotFound(order_id.to_string()))?;

        let mut items = Vec::new();
        for item in orders.get_items(order_id).await? {
            let customizations = orders.get_customizations(&item.id).await?;
            items.push((item, customizations));
        }

        let history = orders.get_status_history(order_id).await?;

        Ok(OrderDetails {
            order,
            items,
            history,
        })
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

    async fn test_db() -> Database {
        Database::new(DbConfig::in_memory()).await.unwrap()
    }

    async fn seed_product(db: &Database, name: &str, price_cents: i64) -> Product {
        let now = Utc::now();
        let product = Product {
            id: Uuid::new_v4().to_string(),
            name: name.to_string(),
            category: "espresso".to_string(),
            price_cents,
            is_active: true,
            created_at: now,
            updated_at: now,
        };
        db.products().insert(&product).await.unwrap();
        product
    }

    fn item(product_id: &str, quantity: i64) -> NewOrderItem {
        NewOrderItem {
            product_id: product_id.to_string(),
            quantity,
            customizations: vec![],
            notes: None,
        }
    }

    #[tokio::test]
    async fn create_order_snapshots_prices_and_sums_totals() {
        let db = test_db().await;
        let service = OrderService::new(db.clone());
        let latte = seed_product(&db, "Latte", 495).await;
        let croissant = seed_product(&db, "Croissant", 350).await;

        let order = service
            .create_order(
                &ActorContext::staff("maria"),
                NewOrder {
                    items: vec![item(&latte.id, 2), item(&croissant.id, 1)],
                    notes: None,
                },
            )
            .await
            .unwrap();

        // 2 * 495 + 350 = 1340
        assert_eq!(order.total_cents, 1340);
        assert_eq!(order.total_items, 3);
        assert_eq!(order.status, OrderStatus::Pending);
        assert_eq!(order.created_by.as_deref(), Some("maria"));
        assert!(order.order_number.starts_with("BRW-"));

        // Price edit after intake does not move the order total
        let mut updated = latte.clone();
        updated.price_cents = 999;
        db.products().update(&updated).await.unwrap();

        let details = service.get_details(&order.id).await.unwrap();
        assert_eq!(details.order.total_cents, 1340);
        let latte_item = details
            .items
            .iter()
            .find(|(i, _)| i.product_id == latte.id)
            .unwrap();
        assert_eq!(latte_item.0.unit_price_cents, 495);
    }

    #[tokio::test]
    async fn customizations_add_to_line_subtotal() {
        let db = test_db().await;
        let service = OrderService::new(db.clone());
        let latte = seed_product(&db, "Latte", 495).await;

        let order = service
            .create_order(
                &ActorContext::anonymous(),
                NewOrder {
                    items: vec![NewOrderItem {
                        product_id: latte.id.clone(),
                        quantity: 1,
                        customizations: vec![
                            NewOrderCustomization {
                                name: "Extra Shot".to_string(),
                                price_cents: 75,
                                quantity: 2,
                            },
                            NewOrderCustomization {
                                name: "Oat Milk".to_string(),
                                price_cents: 60,
                                quantity: 1,
                            },
                        ],
                        notes: Some("extra hot".to_string()),
                    }],
                    notes: None,
                },
            )
            .await
            .unwrap();

        // 495 + 2*75 + 60 = 705
        assert_eq!(order.total_cents, 705);

        let details = service.get_details(&order.id).await.unwrap();
        assert_eq!(details.items.len(), 1);
        assert_eq!(details.items[0].1.len(), 2);
        assert_eq!(details.items[0].0.subtotal_cents, 705);
    }

    #[tokio::test]
    async fn empty_order_rejected() {
        let db = test_db().await;
        let service = OrderService::new(db);

        let err = service
            .create_order(
                &ActorContext::anonymous(),
                NewOrder {
                    items: vec![],
                    notes: None,
                },
            )
            .await
            .unwrap_err();

        assert_eq!(err.code, ErrorCode::ValidationError);
    }

    #[tokio::test]
    async fn inactive_product_rejected() {
        let db = test_db().await;
        let service = OrderService::new(db.clone());
        let retired = seed_product(&db, "Pumpkin Latte", 595).await;
        db.products().soft_delete(&retired.id).await.unwrap();

        let err = service
            .create_order(
                &ActorContext::anonymous(),
                NewOrder {
                    items: vec![item(&retired.id, 1)],
                    notes: None,
                },
            )
            .await
            .unwrap_err();

        assert_eq!(err.code, ErrorCode::ValidationError);
    }

    #[tokio::test]
    async fn cancel_pending_order_appends_history() {
        let db = test_db().await;
        let service = OrderService::new(db.clone());
        let latte = seed_product(&db, "Latte", 495).await;

        let order = service
            .create_order(
                &ActorContext::anonymous(),
                NewOrder {
                    items: vec![item(&latte.id, 1)],
                    notes: None,
                },
            )
            .await
            .unwrap();

        service
            .cancel_order(&ActorContext::staff("sam"), &order.id, Some("customer left"))
            .await
            .unwrap();

        let details = service.get_details(&order.id).await.unwrap();
        assert_eq!(details.order.status, OrderStatus::Cancelled);

        let last = details.history.last().unwrap();
        assert_eq!(last.previous_status, Some(OrderStatus::Pending));
        assert_eq!(last.new_status, OrderStatus::Cancelled);
        assert_eq!(last.notes.as_deref(), Some("customer left"));
        assert_eq!(last.changed_by.as_deref(), Some("sam"));
    }

    #[tokio::test]
    async fn cancelled_order_cannot_be_cancelled_again() {
        let db = test_db().await;
        let service = OrderService::new(db.clone());
        let latte = seed_product(&db, "Latte", 495).await;

        let order = service
            .create_order(
                &ActorContext::anonymous(),
                NewOrder {
                    items: vec![item(&latte.id, 1)],
                    notes: None,
                },
            )
            .await
            .unwrap();

        service
            .cancel_order(&ActorContext::anonymous(), &order.id, None)
            .await
            .unwrap();

        let err = service
            .cancel_order(&ActorContext::anonymous(), &order.id, None)
            .await
            .unwrap_err();

        assert_eq!(err.code, ErrorCode::BusinessLogic);
    }

    #[tokio::test]
    async fn pending_queue_excludes_cancelled() {
        let db = test_db().await;
        let service = OrderService::new(db.clone());
        let latte = seed_product(&db, "Latte", 495).await;

        let keep = service
            .create_order(
                &ActorContext::anonymous(),
                NewOrder {
                    items: vec![item(&latte.id, 1)],
                    notes: None,
                },
            )
            .await
            .unwrap();
        let abandoned = service
            .create_order(
                &ActorContext::anonymous(),
                NewOrder {
                    items: vec![item(&latte.id, 1)],
                    notes: None,
                },
            )
            .await
            .unwrap();

        service
            .cancel_order(&ActorContext::anonymous(), &abandoned.id, None)
            .await
            .unwrap();

        let pending = service.list_pending().await.unwrap();
        assert_eq!(pending.len(), 1);
        assert_eq!(pending[0].id, keep.id);
    }
}
