//! # Error Types
//!
//! Domain-specific error types for brewpos-core.
//!
//! ## Error Hierarchy
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                         Error Types                                     │
//! │                                                                         │
//! │  brewpos-core errors (this file)                                       │
//! │  ├── CoreError        - Business rule violations                       │
//! │  └── ValidationError  - Input validation failures                      │
//! │                                                                         │
//! │  brewpos-db errors (separate crate)                                    │
//! │  └── DbError          - Database operation failures                    │
//! │                                                                         │
//! │  brewpos-service errors                                                │
//! │  └── ServiceError     - What callers see (coded + message)             │
//! │                                                                         │
//! │  Flow: ValidationError → CoreError → DbError → ServiceError → caller   │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Design Principles
//! 1. Use `thiserror` for derive macros (not manual impl)
//! 2. Include context in error messages (order number, amounts, etc.)
//! 3. Errors are enum variants, never String
//! 4. Each error variant maps to a user-facing message

use thiserror::Error;

use crate::types::OrderStatus;

// =============================================================================
// Core Error
// =============================================================================

/// Core business logic errors.
///
/// These errors represent business rule violations. They are detected
/// before any write and should be translated to user-facing messages.
#[derive(Debug, Error)]
pub enum CoreError {
    /// Order cannot be found.
    #[error("Order not found: {0}")]
    OrderNotFound(String),

    /// Product cannot be found.
    #[error("Product not found: {0}")]
    ProductNotFound(String),

    /// Promotion cannot be found.
    #[error("Promotion not found: {0}")]
    PromotionNotFound(String),

    /// Order is not in a state that allows the requested operation.
    ///
    /// ## When This Occurs
    /// - Paying an order that is already completed or cancelled
    /// - Cancelling a completed order
    #[error("Order {order_id} is {current_status:?}, cannot perform operation")]
    OrderNotPending {
        order_id: String,
        current_status: OrderStatus,
    },

    /// Requested status change is not a legal transition.
    #[error("Illegal order status transition: {from:?} -> {to:?}")]
    IllegalTransition { from: OrderStatus, to: OrderStatus },

    /// Tendered amount does not cover the final total.
    ///
    /// ## User Workflow
    /// ```text
    /// Pay order ($8.50 due, $5.00 tendered)
    ///      │
    ///      ▼
    /// InsufficientTendered { tendered: 500, required: 850 }
    ///      │
    ///      ▼
    /// UI shows: "Insufficient amount tendered"  (no writes performed)
    /// ```
    #[error("Insufficient amount tendered: {tendered_cents} cents offered, {required_cents} cents required")]
    InsufficientTendered {
        tendered_cents: i64,
        required_cents: i64,
    },

    /// Stock adjustment would drive the level below zero.
    #[error("Stock cannot be negative: {current} on hand, tried to remove {requested}")]
    NegativeStock { current: i64, requested: i64 },

    /// Promotion is inactive, archived or past its end date.
    #[error("Promotion {0} is not eligible")]
    PromotionNotEligible(String),

    /// Validation error (wraps ValidationError).
    #[error("Validation error: {0}")]
    Validation(#[from] ValidationError),
}

// =============================================================================
// Validation Error
// =============================================================================

/// Input validation errors.
///
/// These errors occur when user input doesn't meet requirements.
/// Used for early validation before business logic runs.
#[derive(Debug, Error)]
pub enum ValidationError {
    /// A required field is missing or empty.
    #[error("{field} is required")]
    Required { field: String },

    /// Field value is too long.
    #[error("{field} must be at most {max} characters")]
    TooLong { field: String, max: usize },

    /// Numeric value is out of range.
    #[error("{field} must be between {min} and {max}")]
    OutOfRange { field: String, min: i64, max: i64 },

    /// Value must be positive.
    #[error("{field} must be positive")]
    MustBePositive { field: String },

    /// Value must not be negative.
    #[error("{field} must not be negative")]
    MustNotBeNegative { field: String },

    /// Invalid format (e.g., invalid UUID, invalid date window).
    #[error("{field} has invalid format: {reason}")]
    InvalidFormat { field: String, reason: String },

    /// Duplicate value (e.g., duplicate order number).
    #[error("{field} '{value}' already exists")]
    Duplicate { field: String, value: String },
}
