//! # Repository Module
//!
//! Database repository implementations for BrewPOS.
//!
//! ## Repository Pattern
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  Service operation                                                      │
//! │       │                                                                 │
//! │       │  db.orders().record_payment(...)                               │
//! │       ▼                                                                 │
//! │  OrderRepository                                                       │
//! │  ├── get_by_id(&self, id)                                              │
//! │  ├── create_with_items(&self, order, items)                            │
//! │  └── record_payment(&self, ...)   ← one SQLite transaction            │
//! │       │                                                                 │
//! │       ▼                                                                 │
//! │  SQLite Database                                                       │
//! │                                                                         │
//! │  Benefits:                                                              │
//! │  • SQL is isolated in one place                                        │
//! │  • Multi-write invariants live next to the writes they protect         │
//! │  • Easy to test against an in-memory database                          │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Available Repositories
//!
//! - [`product::ProductRepository`] - Menu product CRUD
//! - [`order::OrderRepository`] - Orders, line items, status history, payment
//! - [`promotion::PromotionRepository`] - Promotion campaigns
//! - [`stock::StockRepository`] - Stock levels and the movement ledger
//! - [`transaction::TransactionRepository`] - Payment ledger reads
//! - [`reconciliation::ReconciliationRepository`] - Daily cash reconciliation

pub mod order;
pub mod product;
pub mod promotion;
pub mod reconciliation;
pub mod stock;
pub mod transaction;
