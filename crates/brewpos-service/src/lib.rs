//! # brewpos-service: Orchestration Layer for BrewPOS
//!
//! Services that tie the pure calculation engine (brewpos-core) to the
//! persistence layer (brewpos-db). Every operation follows the same shape:
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                     Service Operation Shape                             │
//! │                                                                         │
//! │   1. VALIDATE inputs          (brewpos-core::validation)               │
//! │   2. LOAD current state       (brewpos-db repositories)                │
//! │   3. CHECK business rules     (state machine, eligibility, guards)     │
//! │   4. CALCULATE                (brewpos-core::pricing - pure)           │
//! │   5. PERSIST atomically       (repository transaction methods)         │
//! │                                                                         │
//! │   Any failure in 1-4 returns before a single write happens.           │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Services
//!
//! - [`payment::PaymentProcessor`] - Validates and records payments
//! - [`stock::StockLedger`] - Guarded stock adjustments with audit trail
//! - [`orders::OrderService`] - Order intake and cancellation
//! - [`promotions::PromotionService`] - Discount campaign management
//! - [`reconciliation::ReconciliationService`] - End-of-day cash count

pub mod context;
pub mod error;
pub mod orders;
pub mod payment;
pub mod promotions;
pub mod reconciliation;
pub mod stock;

pub use context::ActorContext;
pub use error::{ErrorCode, ServiceError, ServiceResult};
pub use orders::{NewOrder, NewOrderCustomization, NewOrderItem, OrderDetails, OrderService};
pub use payment::{PaymentOutcome, PaymentPreview, PaymentProcessor};
pub use promotions::{NewPromotion, PromotionService, PromotionUpdate};
pub use reconciliation::{ReconciliationOutcome, ReconciliationService};
pub use stock::{StockAdjustment, StockLedger, StockView};
