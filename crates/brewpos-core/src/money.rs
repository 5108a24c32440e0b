//! # Money Module
//!
//! Provides the `Money` type for handling monetary values safely.
//!
//! ## Why Integer Money?
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  THE FLOATING POINT PROBLEM                                             │
//! │                                                                         │
//! │  In JavaScript/floating point:                                          │
//! │    0.1 + 0.2 = 0.30000000000000004  ← WRONG                             │
//! │                                                                         │
//! │  A discount chain computed in floats drifts:                            │
//! │    subtotal → discount → total → change each add rounding error,        │
//! │    and reconciliation compares the accumulated sums at end of day.      │
//! │                                                                         │
//! │  OUR SOLUTION: Integer Cents                                            │
//! │    Every amount in the system is an i64 count of minor units.           │
//! │    The one place rounding happens (percentage discounts) is explicit.   │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Usage
//! ```rust
//! use brewpos_core::money::Money;
//!
//! // Create from cents (the only way in)
//! let price = Money::from_cents(450); // $4.50 latte
//!
//! // Arithmetic operations
//! let two = price * 2;                       // $9.00
//! let total = two + Money::from_cents(125);  // $10.25
//! ```

use serde::{Deserialize, Serialize};
use std::fmt;
use std::ops::{Add, AddAssign, Mul, Sub, SubAssign};

// =============================================================================
// Money Type
// =============================================================================

/// Represents a monetary value in the smallest currency unit (cents).
///
/// ## Design Decisions
/// - **i64 (signed)**: Allows negative values for discrepancies and refunds
/// - **Single field tuple struct**: Zero-cost abstraction over i64
/// - **Derives**: Full serde support for JSON serialization
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct Money(i64);

impl Money {
    /// Creates a Money value from cents (the smallest currency unit).
    ///
    /// ## Example
    /// ```rust
    /// use brewpos_core::money::Money;
    ///
    /// let price = Money::from_cents(450); // Represents $4.50
    /// assert_eq!(price.cents(), 450);
    /// ```
    #[inline]
    pub const fn from_cents(cents: i64) -> Self {
        Money(cents)
    }

    /// Returns the value in cents (smallest currency unit).
    #[inline]
    pub const fn cents(&self) -> i64 {
        self.0
    }

    /// Returns the major unit (dollars) portion.
    #[inline]
    pub const fn dollars(&self) -> i64 {
        self.0 / 100
    }

    /// Returns the minor unit (cents) portion (always 0-99).
    #[inline]
    pub const fn cents_part(&self) -> i64 {
        (self.0 % 100).abs()
    }

    /// Returns zero money value.
    #[inline]
    pub const fn zero() -> Self {
        Money(0)
    }

    /// Checks if the value is zero.
    #[inline]
    pub const fn is_zero(&self) -> bool {
        self.0 == 0
    }

    /// Checks if the value is positive (greater than zero).
    #[inline]
    pub const fn is_positive(&self) -> bool {
        self.0 > 0
    }

    /// Checks if the value is negative (less than zero).
    #[inline]
    pub const fn is_negative(&self) -> bool {
        self.0 < 0
    }

    /// Returns the absolute value.
    #[inline]
    pub const fn abs(&self) -> Self {
        Money(self.0.abs())
    }

    /// Returns the larger of self and zero.
    ///
    /// Used by the pricing engine to clamp totals and change: an over-large
    /// discount floors the total at zero instead of producing a negative
    /// amount.
    #[inline]
    pub const fn max_zero(&self) -> Self {
        if self.0 < 0 {
            Money(0)
        } else {
            *self
        }
    }

    /// Calculates a percentage of this amount, given in basis points.
    ///
    /// ## Why Basis Points?
    /// 1 basis point = 0.01% = 1/10000. A "15% off" promotion stores
    /// `1500`, and the discount stays exact integer arithmetic.
    ///
    /// ## Implementation
    /// Integer math with explicit rounding: `(amount * bps + 5000) / 10000`.
    /// Widened to i128 so large amounts cannot overflow.
    ///
    /// ## Example
    /// ```rust
    /// use brewpos_core::money::Money;
    ///
    /// let total = Money::from_cents(10_000);   // $100.00
    /// let discount = total.percentage(1500);   // 15%
    /// assert_eq!(discount.cents(), 1500);      // $15.00
    /// ```
    pub fn percentage(&self, bps: i64) -> Money {
        let cents = (self.0 as i128 * bps as i128 + 5000) / 10000;
        Money::from_cents(cents as i64)
    }

    /// Multiplies money by a quantity.
    ///
    /// ## Example
    /// ```rust
    /// use brewpos_core::money::Money;
    ///
    /// let unit_price = Money::from_cents(450); // $4.50
    /// let line_total = unit_price.multiply_quantity(3);
    /// assert_eq!(line_total.cents(), 1350); // $13.50
    /// ```
    #[inline]
    pub const fn multiply_quantity(&self, qty: i64) -> Self {
        Money(self.0 * qty)
    }
}

// =============================================================================
// Trait Implementations
// =============================================================================

/// Display implementation shows money in a human-readable format.
///
/// ## Note
/// This is for logs and receipts. UI display formatting (localization)
/// is the presentation layer's concern.
impl fmt::Display for Money {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let sign = if self.0 < 0 { "-" } else { "" };
        write!(
            f,
            "{}${}.{:02}",
            sign,
            self.dollars().abs(),
            self.cents_part()
        )
    }
}

/// Default money is zero.
impl Default for Money {
    fn default() -> Self {
        Money::zero()
    }
}

impl Add for Money {
    type Output = Self;

    #[inline]
    fn add(self, other: Self) -> Self {
        Money(self.0 + other.0)
    }
}

impl AddAssign for Money {
    #[inline]
    fn add_assign(&mut self, other: Self) {
        self.0 += other.0;
    }
}

impl Sub for Money {
    type Output = Self;

    #[inline]
    fn sub(self, other: Self) -> Self {
        Money(self.0 - other.0)
    }
}

impl SubAssign for Money {
    #[inline]
    fn sub_assign(&mut self, other: Self) {
        self.0 -= other.0;
    }
}

/// Multiplication by integer (for quantity calculations).
impl Mul<i32> for Money {
    type Output = Self;

    #[inline]
    fn mul(self, qty: i32) -> Self {
        Money(self.0 * qty as i64)
    }
}

impl Mul<i64> for Money {
    type Output = Self;

    #[inline]
    fn mul(self, qty: i64) -> Self {
        Money(self.0 * qty)
    }
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_from_cents() {
        let money = Money::from_cents(1099);
        assert_eq!(money.cents(), 1099);
        assert_eq!(money.dollars(), 10);
        assert_eq!(money.cents_part(), 99);
    }

    #[test]
    fn test_display() {
        assert_eq!(format!("{}", Money::from_cents(1099)), "$10.99");
        assert_eq!(format!("{}", Money::from_cents(500)), "$5.00");
        assert_eq!(format!("{}", Money::from_cents(-550)), "-$5.50");
        assert_eq!(format!("{}", Money::from_cents(0)), "$0.00");
    }

    #[test]
    fn test_arithmetic() {
        let a = Money::from_cents(1000);
        let b = Money::from_cents(500);

        assert_eq!((a + b).cents(), 1500);
        assert_eq!((a - b).cents(), 500);
        let result: Money = a * 3;
        assert_eq!(result.cents(), 3000);
    }

    #[test]
    fn test_max_zero() {
        assert_eq!(Money::from_cents(-500).max_zero().cents(), 0);
        assert_eq!(Money::from_cents(0).max_zero().cents(), 0);
        assert_eq!(Money::from_cents(500).max_zero().cents(), 500);
    }

    #[test]
    fn test_percentage_basic() {
        // $100.00 at 15% = $15.00
        let amount = Money::from_cents(10_000);
        assert_eq!(amount.percentage(1500).cents(), 1500);
    }

    #[test]
    fn test_percentage_with_rounding() {
        // $10.00 at 8.25% = $0.825 → rounds to $0.83
        let amount = Money::from_cents(1000);
        assert_eq!(amount.percentage(825).cents(), 83);
    }

    #[test]
    fn test_percentage_over_hundred() {
        // Values above 100% are accepted; the pricing engine clamps later.
        let amount = Money::from_cents(500);
        assert_eq!(amount.percentage(20_000).cents(), 1000);
    }

    #[test]
    fn test_zero_and_checks() {
        let zero = Money::zero();
        assert!(zero.is_zero());
        assert!(!zero.is_positive());
        assert!(!zero.is_negative());

        let positive = Money::from_cents(100);
        assert!(positive.is_positive());

        let negative = Money::from_cents(-100);
        assert!(negative.is_negative());
    }

    #[test]
    fn test_multiply_quantity() {
        let unit_price = Money::from_cents(299);
        let line_total = unit_price.multiply_quantity(3);
        assert_eq!(line_total.cents(), 897);
    }
}
