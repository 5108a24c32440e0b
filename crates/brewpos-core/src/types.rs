//! # Domain Types
//!
//! Core domain types used throughout BrewPOS.
//!
//! ## Type Hierarchy
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                         Domain Types                                    │
//! │                                                                         │
//! │  ┌─────────────────┐   ┌─────────────────┐   ┌─────────────────┐       │
//! │  │     Order       │   │   Transaction   │   │   StockLevel    │       │
//! │  │  ─────────────  │   │  ─────────────  │   │  ─────────────  │       │
//! │  │  id (UUID)      │   │  id (UUID)      │   │  product_id     │       │
//! │  │  order_number   │   │  order_id (FK)  │   │  current_stock  │       │
//! │  │  status         │   │  final_cents    │   │  threshold      │       │
//! │  │  total_cents    │   │  change_cents   │   └─────────────────┘       │
//! │  └─────────────────┘   └─────────────────┘                             │
//! │                                                                         │
//! │  ┌─────────────────┐   ┌─────────────────┐   ┌─────────────────┐       │
//! │  │   Promotion     │   │   OrderStatus   │   │  MovementType   │       │
//! │  │  ─────────────  │   │  ─────────────  │   │  ─────────────  │       │
//! │  │  discount_type  │   │  Pending        │   │  Add            │       │
//! │  │  discount_value │   │  Completed      │   │  Remove         │       │
//! │  │  end_date       │   │  Cancelled      │   └─────────────────┘       │
//! │  └─────────────────┘   └─────────────────┘                             │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Dual-Key Identity Pattern
//! Every entity has:
//! - `id`: UUID v4 - immutable, used for database relations
//! - Business ID where one exists: (order_number, promotion name, etc.)

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::money::Money;
use crate::DEFAULT_THRESHOLD_LEVEL;

// =============================================================================
// Product
// =============================================================================

/// A menu product available for sale.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[cfg_attr(feature = "sqlx", derive(sqlx::FromRow))]
pub struct Product {
    /// Unique identifier (UUID v4).
    pub id: String,

    /// Display name shown on the order screen and receipt.
    pub name: String,

    /// Menu category (e.g., "espresso", "pastry").
    pub category: String,

    /// Price in cents (smallest currency unit).
    pub price_cents: i64,

    /// Whether the product is active (soft delete).
    pub is_active: bool,

    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Product {
    /// Returns the price as a Money type.
    #[inline]
    pub fn price(&self) -> Money {
        Money::from_cents(self.price_cents)
    }
}

// =============================================================================
// Order Status
// =============================================================================

/// The status of a customer order.
///
/// ## State Machine
/// ```text
/// pending ──► completed   (payment processed)
/// pending ──► cancelled   (staff cancellation)
/// ```
/// Completed and cancelled are terminal. Every transition is recorded in
/// the order status history, one append-only row per transition.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[cfg_attr(feature = "sqlx", derive(sqlx::Type))]
#[cfg_attr(feature = "sqlx", sqlx(rename_all = "lowercase"))]
#[serde(rename_all = "snake_case")]
pub enum OrderStatus {
    /// Order created, awaiting payment.
    Pending,
    /// Payment recorded; order is immutable.
    Completed,
    /// Order abandoned or voided before payment.
    Cancelled,
}

impl OrderStatus {
    /// Checks whether a transition to `next` is legal.
    ///
    /// This is the single authority on order lifecycle; callers never
    /// flip the status field ad hoc.
    pub fn can_transition_to(self, next: OrderStatus) -> bool {
        matches!(
            (self, next),
            (OrderStatus::Pending, OrderStatus::Completed)
                | (OrderStatus::Pending, OrderStatus::Cancelled)
        )
    }

    /// Database/string representation (matches the CHECK constraint).
    pub fn as_str(&self) -> &'static str {
        match self {
            OrderStatus::Pending => "pending",
            OrderStatus::Completed => "completed",
            OrderStatus::Cancelled => "cancelled",
        }
    }
}

impl Default for OrderStatus {
    fn default() -> Self {
        OrderStatus::Pending
    }
}

// =============================================================================
// Order
// =============================================================================

/// One customer purchase grouping line items.
///
/// ## Invariant (once payment is processed)
/// `total_cents = total_before_discount_cents - discount_cents`,
/// `discount_cents >= 0`, `total_cents >= 0`.
///
/// Mutated exactly once, by the payment processor; immutable thereafter
/// except for status transitions.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[cfg_attr(feature = "sqlx", derive(sqlx::FromRow))]
pub struct Order {
    pub id: String,
    /// Human-readable order number (e.g., `BRW-20260830-143012-0042`).
    pub order_number: String,
    pub status: OrderStatus,
    /// Current total. Pre-discount sum of line items until payment;
    /// post-discount final amount afterwards.
    pub total_cents: i64,
    /// Pre-discount snapshot, set by the payment processor. Null until then.
    pub total_before_discount_cents: Option<i64>,
    /// Discount applied at payment time. Zero until then.
    pub discount_cents: i64,
    /// Promotion used at payment time, if any.
    pub applied_promotion_id: Option<String>,
    /// Sum of line item quantities (denormalized for the order queue view).
    pub total_items: i64,
    pub notes: Option<String>,
    /// Staff member who created the order. Null when no actor was available.
    pub created_by: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Order {
    /// Returns the current total as Money.
    #[inline]
    pub fn total(&self) -> Money {
        Money::from_cents(self.total_cents)
    }

    /// Returns the applied discount as Money.
    #[inline]
    pub fn discount(&self) -> Money {
        Money::from_cents(self.discount_cents)
    }

    /// Whether the order is still awaiting payment.
    #[inline]
    pub fn is_pending(&self) -> bool {
        self.status == OrderStatus::Pending
    }
}

// =============================================================================
// Order Line Item
// =============================================================================

/// A line item in an order.
/// Uses snapshot pattern: unit price is frozen at order-creation time and
/// decoupled from the live product price.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[cfg_attr(feature = "sqlx", derive(sqlx::FromRow))]
pub struct OrderItem {
    pub id: String,
    pub order_id: String,
    pub product_id: String,
    /// Quantity ordered (positive).
    pub quantity: i64,
    /// Unit price in cents at order-creation time (frozen).
    pub unit_price_cents: i64,
    /// `quantity * unit_price + customizations`.
    pub subtotal_cents: i64,
    /// Free-text preparation notes ("oat milk", "extra hot").
    pub notes: Option<String>,
    pub created_at: DateTime<Utc>,
}

impl OrderItem {
    #[inline]
    pub fn unit_price(&self) -> Money {
        Money::from_cents(self.unit_price_cents)
    }

    #[inline]
    pub fn subtotal(&self) -> Money {
        Money::from_cents(self.subtotal_cents)
    }
}

/// A priced customization on a line item (extra shot, syrup, alt milk).
/// Additive to the line subtotal.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[cfg_attr(feature = "sqlx", derive(sqlx::FromRow))]
pub struct ItemCustomization {
    pub id: String,
    pub order_item_id: String,
    pub name: String,
    pub price_cents: i64,
    pub quantity: i64,
}

impl ItemCustomization {
    /// Total cost of this customization (`price * quantity`).
    #[inline]
    pub fn total(&self) -> Money {
        Money::from_cents(self.price_cents * self.quantity)
    }
}

// =============================================================================
// Order Status History
// =============================================================================

/// Append-only record of one order status transition.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[cfg_attr(feature = "sqlx", derive(sqlx::FromRow))]
pub struct OrderStatusChange {
    pub id: String,
    pub order_id: String,
    /// Null for the initial `pending` row written at order creation.
    pub previous_status: Option<OrderStatus>,
    pub new_status: OrderStatus,
    pub notes: Option<String>,
    pub changed_by: Option<String>,
    pub created_at: DateTime<Utc>,
}

// =============================================================================
// Promotion
// =============================================================================

/// How a promotion's discount value is interpreted.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[cfg_attr(feature = "sqlx", derive(sqlx::Type))]
#[cfg_attr(feature = "sqlx", sqlx(rename_all = "snake_case"))]
#[serde(rename_all = "snake_case")]
pub enum DiscountType {
    /// `discount_value` is basis points of the order total (1500 = 15%).
    Percentage,
    /// `discount_value` is a flat amount in cents.
    FixedAmount,
}

/// A named, time-bounded discount campaign.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[cfg_attr(feature = "sqlx", derive(sqlx::FromRow))]
pub struct Promotion {
    pub id: String,
    pub name: String,
    pub description: Option<String>,
    pub discount_type: DiscountType,
    /// Basis points for percentage promotions, cents for fixed-amount.
    /// Not range-validated against the order total; the pricing engine
    /// clamps the final total at zero.
    pub discount_value: i64,
    pub is_active: bool,
    /// Soft-disabled. Archiving also clears `is_active`.
    pub is_archived: bool,
    pub start_date: DateTime<Utc>,
    pub end_date: DateTime<Utc>,
    pub created_by: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Promotion {
    /// Whether the promotion may be offered for selection at `now`:
    /// active, not archived, and not past its end date.
    pub fn is_eligible(&self, now: DateTime<Utc>) -> bool {
        self.is_active && !self.is_archived && now <= self.end_date
    }
}

// =============================================================================
// Transaction
// =============================================================================

/// Which kind of discount was applied at payment time.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[cfg_attr(feature = "sqlx", derive(sqlx::Type))]
#[cfg_attr(feature = "sqlx", sqlx(rename_all = "lowercase"))]
#[serde(rename_all = "snake_case")]
pub enum DiscountKind {
    /// No discount.
    None,
    /// Operator-entered flat amount.
    Manual,
    /// A selected promotion.
    Promo,
}

/// Payment state of a transaction.
///
/// Only `completed` is ever written at creation; no partial or pending
/// transaction state is modeled.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[cfg_attr(feature = "sqlx", derive(sqlx::Type))]
#[cfg_attr(feature = "sqlx", sqlx(rename_all = "lowercase"))]
#[serde(rename_all = "snake_case")]
pub enum PaymentStatus {
    Completed,
}

/// An immutable receipt of a completed payment against an order.
///
/// Forms the ledger used by reconciliation and transaction-history
/// reporting. Never mutated after creation.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[cfg_attr(feature = "sqlx", derive(sqlx::FromRow))]
pub struct Transaction {
    pub id: String,
    pub order_id: String,
    /// Pre-discount order total snapshot.
    pub total_cents: i64,
    pub discount_cents: i64,
    pub discount_type: DiscountKind,
    pub promotion_id: Option<String>,
    /// Amount actually charged (post-discount).
    pub final_cents: i64,
    pub tendered_cents: i64,
    pub change_cents: i64,
    pub payment_status: PaymentStatus,
    pub created_by: Option<String>,
    pub created_at: DateTime<Utc>,
}

impl Transaction {
    #[inline]
    pub fn final_amount(&self) -> Money {
        Money::from_cents(self.final_cents)
    }

    #[inline]
    pub fn change_amount(&self) -> Money {
        Money::from_cents(self.change_cents)
    }
}

// =============================================================================
// Stock
// =============================================================================

/// Direction of a stock adjustment.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[cfg_attr(feature = "sqlx", derive(sqlx::Type))]
#[cfg_attr(feature = "sqlx", sqlx(rename_all = "lowercase"))]
#[serde(rename_all = "snake_case")]
pub enum MovementType {
    /// Delivery or correction upwards.
    Add,
    /// Usage, spoilage or correction downwards.
    Remove,
}

impl MovementType {
    /// Signed delta for a given quantity.
    pub fn signed(&self, quantity: i64) -> i64 {
        match self {
            MovementType::Add => quantity,
            MovementType::Remove => -quantity,
        }
    }
}

/// Current stock for one product. One row per product, mutated only through
/// the stock ledger, created on first movement if absent.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[cfg_attr(feature = "sqlx", derive(sqlx::FromRow))]
pub struct StockLevel {
    pub product_id: String,
    /// Always >= 0 (enforced by the ledger and a CHECK constraint).
    pub current_stock: i64,
    /// At or below this level the product is classified as low stock.
    pub threshold_level: i64,
    pub last_updated: DateTime<Utc>,
}

impl StockLevel {
    /// Derived classification, recomputed on every read - never stored.
    #[inline]
    pub fn status(&self) -> StockStatus {
        stock_status(self.current_stock, self.threshold_level)
    }
}

/// Immutable audit record for one stock adjustment.
///
/// Movements chain: each record's `previous_stock`/`new_stock` pair lines
/// up with the next movement's `previous_stock` for the same product.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[cfg_attr(feature = "sqlx", derive(sqlx::FromRow))]
pub struct StockMovement {
    pub id: String,
    pub product_id: String,
    pub movement_type: MovementType,
    /// Positive count of units moved.
    pub quantity: i64,
    pub previous_stock: i64,
    pub new_stock: i64,
    pub created_by: Option<String>,
    pub created_at: DateTime<Utc>,
}

/// Derived stock classification for inventory views.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum StockStatus {
    OutOfStock,
    LowStock,
    InStock,
}

/// Classifies a stock level against its threshold.
///
/// ## Example
/// ```rust
/// use brewpos_core::types::{stock_status, StockStatus};
///
/// assert_eq!(stock_status(0, 10), StockStatus::OutOfStock);
/// assert_eq!(stock_status(5, 10), StockStatus::LowStock);
/// assert_eq!(stock_status(15, 10), StockStatus::InStock);
/// ```
pub fn stock_status(current_stock: i64, threshold_level: i64) -> StockStatus {
    if current_stock <= 0 {
        StockStatus::OutOfStock
    } else if current_stock <= threshold_level {
        StockStatus::LowStock
    } else {
        StockStatus::InStock
    }
}

/// Default threshold for a stock level created by its first movement.
pub fn default_threshold() -> i64 {
    DEFAULT_THRESHOLD_LEVEL
}

// =============================================================================
// Daily Reconciliation
// =============================================================================

/// Outcome of an end-of-day cash count.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[cfg_attr(feature = "sqlx", derive(sqlx::Type))]
#[cfg_attr(feature = "sqlx", sqlx(rename_all = "lowercase"))]
#[serde(rename_all = "snake_case")]
pub enum ReconciliationStatus {
    /// Counted cash matches the ledger to the cent.
    Balanced,
    /// Counted cash differs from the ledger.
    Discrepancy,
}

/// One reconciliation run: ledger-derived expected cash vs. counted cash.
/// Immutable once created.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[cfg_attr(feature = "sqlx", derive(sqlx::FromRow))]
pub struct DailyReconciliation {
    pub id: String,
    pub reconciliation_date: DateTime<Utc>,
    /// Sum of the day's completed transactions' final amounts.
    pub expected_cents: i64,
    /// Manually counted cash, entered by staff.
    pub actual_cents: i64,
    /// `actual - expected`. Negative means cash is short.
    pub discrepancy_cents: i64,
    pub status: ReconciliationStatus,
    pub created_by: Option<String>,
    pub created_at: DateTime<Utc>,
}

impl DailyReconciliation {
    #[inline]
    pub fn discrepancy(&self) -> Money {
        Money::from_cents(self.discrepancy_cents)
    }
}

/// Classifies a discrepancy. Balanced only when the count matches the
/// ledger exactly - in integer cents there is no sub-cent tolerance.
pub fn reconciliation_status(discrepancy_cents: i64) -> ReconciliationStatus {
    if discrepancy_cents == 0 {
        ReconciliationStatus::Balanced
    } else {
        ReconciliationStatus::Discrepancy
    }
}

// =============================================================================
// Unit Tests
// =============================================================================
