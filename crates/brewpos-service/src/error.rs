//! # Service Error Type
//!
//! Unified error type returned by all service operations.
//!
//! ## Error Handling Strategy
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                      Error Flow in BrewPOS                              │
//! │                                                                         │
//! │  Caller (UI, CLI, API)             Services                             │
//! │  ─────────────────────             ────────                             │
//! │                                                                         │
//! │  processor.process_payment(...)                                         │
//! │         │                                                               │
//! │         ▼                                                               │
//! │  ┌──────────────────────────────────────────────────────────────────┐  │
//! │  │  Service Operation                                               │  │
//! │  │  Result<T, ServiceError>                                         │  │
//! │  │         │                                                        │  │
//! │  │         ▼                                                        │  │
//! │  │  Validation?  ── CoreError::Validation ──────────┐              │  │
//! │  │         │                                        │              │  │
//! │  │         ▼                                        ▼              │  │
//! │  │  Business rule? ── CoreError::* ──────────── ServiceError ────► │  │
//! │  │         │                                        ▲              │  │
//! │  │         ▼                                        │              │  │
//! │  │  Database?    ── DbError::* ─────────────────────┘              │  │
//! │  └──────────────────────────────────────────────────────────────────┘  │
//! │                                                                         │
//! │  Callers match on `code` for programmatic handling and show            │
//! │  `message` to the operator.                                            │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

use serde::Serialize;

use brewpos_core::CoreError;
use brewpos_db::DbError;

/// Error returned from service operations.
///
/// Carries a machine-readable `code` and a human-readable `message`; the
/// message is safe to show at the register.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ServiceError {
    /// Machine-readable error code for programmatic handling
    pub code: ErrorCode,

    /// Human-readable error message for display
    pub message: String,
}

/// Error codes for service responses.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ErrorCode {
    /// Resource not found
    NotFound,

    /// Input validation failed
    ValidationError,

    /// Database operation failed
    DatabaseError,

    /// Business rule violation (illegal status transition, ineligible
    /// promotion, ...)
    BusinessLogic,

    /// Internal error
    Internal,

    /// Stock adjustment would drive a level negative
    InsufficientStock,

    /// Payment rejected (underpayment, order not payable)
    PaymentError,
}

impl ServiceError {
    /// Creates a new service error.
    pub fn new(code: ErrorCode, message: impl Into<String>) -> Self {
        ServiceError {
            code,
            message: message.into(),
        }
    }

    /// Creates a not found error.
    pub fn not_found(resource: &str, id: &str) -> Self {
        ServiceError::new(
            ErrorCode::NotFound,
            format!("{} not found: {}", resource, id),
        )
    }

    /// Creates a validation error.
    pub fn validation(message: impl Into<String>) -> Self {
        ServiceError::new(ErrorCode::ValidationError, message)
    }

    /// Creates a payment error.
    pub fn payment(message: impl Into<String>) -> Self {
        ServiceError::new(ErrorCode::PaymentError, message)
    }

    /// Creates an internal error.
    pub fn internal(message: impl Into<String>) -> Self {
        ServiceError::new(ErrorCode::Internal, message)
    }
}

/// Converts database errors to service errors.
impl From<DbError> for ServiceError {
    fn from(err: DbError) -> Self {
        match err {
            DbError::NotFound { entity, id } => ServiceError::not_found(&entity, &id),
            DbError::UniqueViolation { field, value } => ServiceError::new(
                ErrorCode::ValidationError,
                format!("{} '{}' already exists", field, value),
            ),
            DbError::ForeignKeyViolation { message } => {
                tracing::error!("Foreign key violation: {}", message);
                ServiceError::new(ErrorCode::ValidationError, "Invalid reference")
            }
            DbError::CheckViolation { message } => {
                tracing::error!("Check violation: {}", message);
                ServiceError::new(ErrorCode::BusinessLogic, "Constraint violation")
            }
            DbError::ConnectionFailed(_) => {
                ServiceError::new(ErrorCode::DatabaseError, "Database connection failed")
            }
            DbError::MigrationFailed(_) => {
                ServiceError::new(ErrorCode::DatabaseError, "Database migration failed")
            }
            DbError::QueryFailed(e) => {
                // Log the actual error but return a generic message
                tracing::error!("Database query failed: {}", e);
                ServiceError::new(ErrorCode::DatabaseError, "Database operation failed")
            }
            DbError::TransactionFailed(e) => {
                tracing::error!("Transaction failed: {}", e);
                ServiceError::new(ErrorCode::DatabaseError, "Database transaction failed")
            }
            DbError::PoolExhausted => {
                ServiceError::new(ErrorCode::DatabaseError, "Database pool exhausted")
            }
            DbError::Internal(e) => {
                tracing::error!("Internal database error: {}", e);
                ServiceError::new(ErrorCode::DatabaseError, "Database operation failed")
            }
        }
    }
}

/// Converts core errors to service errors.
impl From<CoreError> for ServiceError {
    fn from(err: CoreError) -> Self {
        match err {
            CoreError::OrderNotFound(id) => ServiceError::not_found("Order", &id),
            CoreError::ProductNotFound(id) => ServiceError::not_found("Product", &id),
            CoreError::PromotionNotFound(id) => ServiceError::not_found("Promotion", &id),
            CoreError::OrderNotPending {
                order_id,
                current_status,
            } => ServiceError::new(
                ErrorCode::PaymentError,
                format!(
                    "Order {} is {}, not payable",
                    order_id,
                    current_status.as_str()
                ),
            ),
            CoreError::IllegalTransition { from, to } => ServiceError::new(
                ErrorCode::BusinessLogic,
                format!(
                    "Cannot change order status from {} to {}",
                    from.as_str(),
                    to.as_str()
                ),
            ),
            CoreError::InsufficientTendered {
                tendered_cents,
                required_cents,
            } => ServiceError::new(
                ErrorCode::PaymentError,
                format!(
                    "Insufficient amount tendered: {} cents offered, {} cents required",
                    tendered_cents, required_cents
                ),
            ),
            CoreError::NegativeStock { current, requested } => ServiceError::new(
                ErrorCode::InsufficientStock,
                format!(
                    "Stock cannot go negative: {} on hand, tried to remove {}",
                    current, requested
                ),
            ),
            CoreError::PromotionNotEligible(id) => ServiceError::new(
                ErrorCode::BusinessLogic,
                format!("Promotion {} is not eligible", id),
            ),
            CoreError::Validation(e) => ServiceError::validation(e.to_string()),
        }
    }
}

impl std::fmt::Display for ServiceError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "[{:?}] {}", self.code, self.message)
    }
}

impl std::error::Error for ServiceError {}

/// Result type for service operations.
pub type ServiceResult<T> = Result<T, ServiceError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_insufficient_tendered_maps_to_payment_error() {
        let err: ServiceError = CoreError::InsufficientTendered {
            tendered_cents: 500,
            required_cents: 850,
        }
        .into();

        assert_eq!(err.code, ErrorCode::PaymentError);
        assert!(err.message.contains("500"));
        assert!(err.message.contains("850"));
    }

    #[test]
    fn test_negative_stock_maps_to_insufficient_stock() {
        let err: ServiceError = CoreError::NegativeStock {
            current: 3,
            requested: 5,
        }
        .into();

        assert_eq!(err.code, ErrorCode::InsufficientStock);
    }

    #[test]
    fn test_db_not_found_maps_through() {
        let err: ServiceError = DbError::not_found("Order", "o-123").into();
        assert_eq!(err.code, ErrorCode::NotFound);
        assert!(err.message.contains("o-123"));
    }
}
