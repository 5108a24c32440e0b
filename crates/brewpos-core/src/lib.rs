//! # brewpos-core: Pure Business Logic for BrewPOS
//!
//! This crate is the heart of BrewPOS. It contains all business logic
//! as pure functions with zero I/O dependencies.
//!
//! ## Architecture Position
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                        BrewPOS Architecture                             │
//! │                                                                         │
//! │  ┌─────────────────────────────────────────────────────────────────┐   │
//! │  │                  brewpos-service (orchestration)                │   │
//! │  │   PaymentProcessor ── StockLedger ── OrderService ── ...        │   │
//! │  └─────────────────────────────┬───────────────────────────────────┘   │
//! │                                │                                        │
//! │  ┌─────────────────────────────▼───────────────────────────────────┐   │
//! │  │               ★ brewpos-core (THIS CRATE) ★                     │   │
//! │  │                                                                 │   │
//! │  │   ┌───────────┐  ┌───────────┐  ┌───────────┐  ┌───────────┐  │   │
//! │  │   │   types   │  │   money   │  │  pricing  │  │ validation│  │   │
//! │  │   │   Order   │  │   Money   │  │ discount  │  │   rules   │  │   │
//! │  │   │ Promotion │  │  percent  │  │  change   │  │  checks   │  │   │
//! │  │   └───────────┘  └───────────┘  └───────────┘  └───────────┘  │   │
//! │  │                                                                 │   │
//! │  │   NO I/O • NO DATABASE • NO NETWORK • PURE FUNCTIONS           │   │
//! │  └─────────────────────────────────────────────────────────────────┘   │
//! │                                │                                        │
//! │  ┌─────────────────────────────▼───────────────────────────────────┐   │
//! │  │                  brewpos-db (Database Layer)                    │   │
//! │  │             SQLite queries, migrations, repositories            │   │
//! │  └─────────────────────────────────────────────────────────────────┘   │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Modules
//!
//! - [`types`] - Domain types (Order, Promotion, Transaction, StockLevel, ...)
//! - [`money`] - Money type with integer arithmetic (no floating point!)
//! - [`pricing`] - The pricing engine: discount, total and change calculations
//! - [`error`] - Domain error types
//! - [`validation`] - Business rule validation
//!
//! ## Design Principles
//!
//! 1. **Pure Functions**: Every function is deterministic - same input = same output
//! 2. **No I/O**: Database, network, file system access is FORBIDDEN here
//! 3. **Integer Money**: All monetary values are in cents (i64) to avoid float errors
//! 4. **Explicit Errors**: All errors are typed, never strings or panics

// =============================================================================
// Module Declarations
// =============================================================================

pub mod error;
pub mod money;
pub mod pricing;
pub mod types;
pub mod validation;

// =============================================================================
// Re-exports for Convenience
// =============================================================================

pub use error::{CoreError, ValidationError};
pub use money::Money;
pub use pricing::{calculate_change, calculate_discount, calculate_total, DiscountSelection};
pub use types::*;

// =============================================================================
// Crate-Level Constants
// =============================================================================

/// Default low-stock threshold applied when a stock level row is created
/// by the first movement against a product.
pub const DEFAULT_THRESHOLD_LEVEL: i64 = 10;

/// Maximum quantity of a single line item in an order.
///
/// ## Business Reason
/// Prevents accidental over-ordering (e.g., typing 1000 instead of 10).
pub const MAX_ITEM_QUANTITY: i64 = 999;

/// Maximum single stock adjustment.
///
/// ## Business Reason
/// A coffee shop never receives more than this in one delivery; larger
/// values are almost certainly input mistakes.
pub const MAX_STOCK_ADJUSTMENT: i64 = 100_000;
