//! # brewpos-db: Database Layer for BrewPOS
//!
//! This crate provides database access for the BrewPOS system.
//! It uses SQLite for local storage with sqlx for async operations.
//!
//! ## Architecture Position
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                        BrewPOS Data Flow                                │
//! │                                                                         │
//! │  Service operation (process_payment, adjust_stock, ...)               │
//! │       │                                                                 │
//! │       ▼                                                                 │
//! │  ┌─────────────────────────────────────────────────────────────────┐   │
//! │  │                    brewpos-db (THIS CRATE)                      │   │
//! │  │                                                                 │   │
//! │  │   ┌───────────────┐    ┌───────────────┐    ┌──────────────┐  │   │
//! │  │   │   Database    │    │  Repositories │    │  Migrations  │  │   │
//! │  │   │   (pool.rs)   │◄───│  order.rs     │    │  (embedded)  │  │   │
//! │  │   │               │    │  stock.rs     │    │              │  │   │
//! │  │   │ SqlitePool    │    │  promotion.rs │    │ 001_init.sql │  │   │
//! │  │   │ Management    │    │  ...          │    │              │  │   │
//! │  │   └───────────────┘    └───────────────┘    └──────────────┘  │   │
//! │  └─────────────────────────────────────────────────────────────────┘   │
//! │       │                                                                 │
//! │       ▼                                                                 │
//! │  SQLite database file (or :memory: in tests)                           │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Transaction Boundaries
//!
//! The operations with audit-integrity requirements are committed as single
//! SQLite transactions inside their repository methods:
//!
//! - [`repository::order::OrderRepository::record_payment`] - order update +
//!   transaction insert + status transition + history row
//! - [`repository::stock::StockRepository::apply_movement`] - stock level
//!   upsert + movement row
//! - [`repository::order::OrderRepository::create_with_items`] - order +
//!   items + customizations + initial history row
//!
//! A reader can never observe one half of any of these.
//!
//! ## Usage
//!
//! ```rust,ignore
//! use brewpos_db::{Database, DbConfig};
//!
//! let db = Database::new(DbConfig::new("path/to/brewpos.db")).await?;
//! let pending = db.orders().list_pending().await?;
//! ```

// =============================================================================
// Module Declarations
// =============================================================================

pub mod error;
pub mod migrations;
pub mod pool;
pub mod repository;

// =============================================================================
// Re-exports
// =============================================================================

pub use error::{DbError, DbResult};
pub use pool::{Database, DbConfig};

pub use repository::order::OrderRepository;
pub use repository::product::{ProductRepository, ProductStockRow};
pub use repository::promotion::PromotionRepository;
pub use repository::reconciliation::ReconciliationRepository;
pub use repository::stock::{StockApplyOutcome, StockRepository};
pub use repository::transaction::TransactionRepository;
