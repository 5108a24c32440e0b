//! # Validation Module
//!
//! Input validation utilities for BrewPOS.
//!
//! ## Validation Strategy
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                      Validation Layers                                  │
//! │                                                                         │
//! │  Layer 1: Service operation (Rust)                                     │
//! │  ├── Type validation (deserialization)                                 │
//! │  └── THIS MODULE: Business rule validation                             │
//! │           │                                                             │
//! │           ▼                                                             │
//! │  Layer 2: Database (SQLite)                                            │
//! │  ├── NOT NULL / CHECK constraints                                      │
//! │  ├── UNIQUE constraints                                                │
//! │  └── Foreign key constraints                                           │
//! │                                                                         │
//! │  Defense in depth: each layer catches different errors                 │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

use chrono::{DateTime, Utc};

use crate::error::ValidationError;
use crate::{MAX_ITEM_QUANTITY, MAX_STOCK_ADJUSTMENT};

/// Result type for validation operations.
pub type ValidationResult<T> = Result<T, ValidationError>;

// =============================================================================
// String Validators
// =============================================================================

/// Validates a product or promotion name.
///
/// ## Rules
/// - Must not be empty
/// - Must be at most 200 characters
pub fn validate_name(name: &str) -> ValidationResult<()> {
    let name = name.trim();

    if name.is_empty() {
        return Err(ValidationError::Required {
            field: "name".to_string(),
        });
    }

    if name.len() > 200 {
        return Err(ValidationError::TooLong {
            field: "name".to_string(),
            max: 200,
        });
    }

    Ok(())
}

// =============================================================================
// Numeric Validators
// =============================================================================

/// Validates a line item quantity.
///
/// ## Rules
/// - Must be positive (> 0)
/// - Must not exceed MAX_ITEM_QUANTITY (999)
pub fn validate_quantity(qty: i64) -> ValidationResult<()> {
    if qty <= 0 {
        return Err(ValidationError::MustBePositive {
            field: "quantity".to_string(),
        });
    }

    if qty > MAX_ITEM_QUANTITY {
        return Err(ValidationError::OutOfRange {
            field: "quantity".to_string(),
            min: 1,
            max: MAX_ITEM_QUANTITY,
        });
    }

    Ok(())
}

/// Validates a stock adjustment amount.
///
/// ## Rules
/// - Must be positive (> 0); direction comes from the movement type
/// - Must not exceed MAX_STOCK_ADJUSTMENT
pub fn validate_stock_amount(amount: i64) -> ValidationResult<()> {
    if amount <= 0 {
        return Err(ValidationError::MustBePositive {
            field: "amount".to_string(),
        });
    }

    if amount > MAX_STOCK_ADJUSTMENT {
        return Err(ValidationError::OutOfRange {
            field: "amount".to_string(),
            min: 1,
            max: MAX_STOCK_ADJUSTMENT,
        });
    }

    Ok(())
}

/// Validates a price in cents.
///
/// ## Rules
/// - Must be non-negative (>= 0); zero is allowed (free items)
pub fn validate_price_cents(cents: i64) -> ValidationResult<()> {
    if cents < 0 {
        return Err(ValidationError::MustNotBeNegative {
            field: "price".to_string(),
        });
    }

    Ok(())
}

/// Validates a tendered amount in cents.
///
/// ## Rules
/// - Must be non-negative. Whether it covers the total is checked against
///   the computed final amount by the payment processor, not here.
pub fn validate_tendered_cents(cents: i64) -> ValidationResult<()> {
    if cents < 0 {
        return Err(ValidationError::MustNotBeNegative {
            field: "amount tendered".to_string(),
        });
    }

    Ok(())
}

/// Validates a promotion discount value.
///
/// ## Rules
/// - Must be positive. Percentage values above 100% and fixed amounts above
///   any order total are accepted - the pricing engine clamps at payment
///   time.
pub fn validate_discount_value(value: i64) -> ValidationResult<()> {
    if value <= 0 {
        return Err(ValidationError::MustBePositive {
            field: "discount value".to_string(),
        });
    }

    Ok(())
}

// =============================================================================
// Date Validators
// =============================================================================

/// Validates a promotion date window.
///
/// ## Rules
/// - End date must not precede the start date
pub fn validate_date_window(
    start: DateTime<Utc>,
    end: DateTime<Utc>,
) -> ValidationResult<()> {
    if end < start {
        return Err(ValidationError::InvalidFormat {
            field: "end_date".to_string(),
            reason: "must not precede start_date".to_string(),
        });
    }

    Ok(())
}

// =============================================================================
// UUID Validators
// =============================================================================

/// Validates a UUID string format.
///
/// ## Example
/// ```rust
/// use brewpos_core::validation::validate_uuid;
///
/// assert!(validate_uuid("550e8400-e29b-41d4-a716-446655440000").is_ok());
/// assert!(validate_uuid("not-a-uuid").is_err());
/// ```
pub fn validate_uuid(id: &str) -> ValidationResult<()> {
    if id.trim().is_empty() {
        return Err(ValidationError::Required {
            field: "id".to_string(),
        });
    }

    uuid::Uuid::parse_str(id).map_err(|_| ValidationError::InvalidFormat {
        field: "id".to_string(),
        reason: "must be a valid UUID".to_string(),
    })?;

    Ok(())
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Duration;

    #[test]
    fn test_validate_name() {
        assert!(validate_name("Flat White").is_ok());
        assert!(validate_name("").is_err());
        assert!(validate_name("   ").is_err());
        assert!(validate_name(&"A".repeat(300)).is_err());
    }

    #[test]
    fn test_validate_quantity() {
        assert!(validate_quantity(1).is_ok());
        assert!(validate_quantity(999).is_ok());

        assert!(validate_quantity(0).is_err());
        assert!(validate_quantity(-1).is_err());
        assert!(validate_quantity(1000).is_err());
    }

    #[test]
    fn test_validate_stock_amount() {
        assert!(validate_stock_amount(1).is_ok());
        assert!(validate_stock_amount(100_000).is_ok());

        assert!(validate_stock_amount(0).is_err());
        assert!(validate_stock_amount(-5).is_err());
        assert!(validate_stock_amount(100_001).is_err());
    }

    #[test]
    fn test_validate_price_cents() {
        assert!(validate_price_cents(0).is_ok());
        assert!(validate_price_cents(450).is_ok());
        assert!(validate_price_cents(-100).is_err());
    }

    #[test]
    fn test_validate_tendered_cents() {
        assert!(validate_tendered_cents(0).is_ok());
        assert!(validate_tendered_cents(10_000).is_ok());
        assert!(validate_tendered_cents(-1).is_err());
    }

    #[test]
    fn test_validate_discount_value() {
        assert!(validate_discount_value(1500).is_ok());
        // Above 100% is accepted; the clamp handles it.
        assert!(validate_discount_value(20_000).is_ok());
        assert!(validate_discount_value(0).is_err());
    }

    #[test]
    fn test_validate_date_window() {
        let now = Utc::now();
        assert!(validate_date_window(now, now + Duration::days(7)).is_ok());
        assert!(validate_date_window(now, now).is_ok());
        assert!(validate_date_window(now, now - Duration::days(1)).is_err());
    }

    #[test]
    fn test_validate_uuid() {
        assert!(validate_uuid("550e8400-e29b-41d4-a716-446655440000").is_ok());
        assert!(validate_uuid("").is_err());
        assert!(validate_uuid("not-a-uuid").is_err());
    }
}
