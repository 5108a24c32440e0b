//! # Pricing Engine
//!
//! Pure, side-effect-free payment calculations: discount, final total and
//! change. Re-derivable from inputs at any time - the same functions drive
//! the live payment preview and the final persisted write, so the two can
//! never disagree.
//!
//! ## Calculation Flow
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                    Payment Calculation Chain                            │
//! │                                                                         │
//! │  Order (total_cents)    DiscountSelection                              │
//! │        │                      │                                         │
//! │        └──────────┬───────────┘                                         │
//! │                   ▼                                                     │
//! │        calculate_discount() ──► discount                               │
//! │                   │                                                     │
//! │                   ▼                                                     │
//! │        calculate_total() ──► final total  (clamped at $0.00)           │
//! │                   │                                                     │
//! │                   ▼                                                     │
//! │        calculate_change(tendered, total) ──► change (never negative)   │
//! │                                                                         │
//! │  NO STATE • NO FAILURE MODES • ARITHMETIC ONLY                         │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Clamping Policy
//! A discount is never validated against the order total here. An over-large
//! manual or fixed-amount discount is silently absorbed by the `max(0, ...)`
//! clamp in [`calculate_total`] - the total floors at zero rather than going
//! negative. Rejecting underpayment is the payment processor's job, not this
//! module's.

use serde::{Deserialize, Serialize};

use crate::money::Money;
use crate::types::{DiscountKind, DiscountType, Order, Promotion};

// =============================================================================
// Discount Selection
// =============================================================================

/// The operator's discount choice for one payment.
///
/// Carrying the promotion inside the `Promotion` variant makes the
/// "promo selected but no promotion attached" state unrepresentable.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "snake_case", tag = "kind")]
pub enum DiscountSelection {
    /// No discount.
    None,
    /// Operator-entered flat amount, taken verbatim (not capped to the
    /// order total).
    Manual { amount: Money },
    /// A promotion campaign; percentage or fixed per its discount type.
    Promotion { promotion: Promotion },
}

impl DiscountSelection {
    /// The discount kind recorded on the transaction ledger.
    pub fn kind(&self) -> DiscountKind {
        match self {
            DiscountSelection::None => DiscountKind::None,
            DiscountSelection::Manual { .. } => DiscountKind::Manual,
            DiscountSelection::Promotion { .. } => DiscountKind::Promo,
        }
    }

    /// The promotion id to stamp on the order, if a promotion was used.
    pub fn promotion_id(&self) -> Option<&str> {
        match self {
            DiscountSelection::Promotion { promotion } => Some(promotion.id.as_str()),
            _ => None,
        }
    }
}

// =============================================================================
// Calculations
// =============================================================================

/// Derives the discount amount for an order and a discount selection.
///
/// ## Rules
/// - Absent order → zero (nothing selected in the payment screen yet).
/// - `None` → zero.
/// - `Manual` → the entered amount verbatim.
/// - `Promotion` percentage → `order.total * value_bps / 10000`, rounded.
/// - `Promotion` fixed amount → the value verbatim.
///
/// ## Example
/// ```rust
/// use brewpos_core::money::Money;
/// use brewpos_core::pricing::{calculate_discount, DiscountSelection};
///
/// let discount = calculate_discount(None, &DiscountSelection::Manual {
///     amount: Money::from_cents(500),
/// });
/// assert_eq!(discount, Money::zero()); // no order selected
/// ```
pub fn calculate_discount(order: Option<&Order>, selection: &DiscountSelection) -> Money {
    let Some(order) = order else {
        return Money::zero();
    };

    match selection {
        DiscountSelection::None => Money::zero(),
        DiscountSelection::Manual { amount } => *amount,
        DiscountSelection::Promotion { promotion } => promotion_discount(order, promotion),
    }
}

/// Discount contributed by a promotion against an order total.
fn promotion_discount(order: &Order, promotion: &Promotion) -> Money {
    match promotion.discount_type {
        DiscountType::Percentage => order.total().percentage(promotion.discount_value),
        DiscountType::FixedAmount => Money::from_cents(promotion.discount_value),
    }
}

/// Final total after discount: `max(0, order.total - discount)`.
///
/// This is the sole clamp in the engine. It guarantees a non-negative
/// result regardless of discount magnitude, silently absorbing an
/// over-large discount rather than signaling an error.
pub fn calculate_total(order: Option<&Order>, discount: Money) -> Money {
    let Some(order) = order else {
        return Money::zero();
    };

    (order.total() - discount).max_zero()
}

/// Change due: `max(0, tendered - total)`. Never negative.
///
/// A tendered amount below the total yields zero change - the payment
/// processor rejects underpayment before this point, not this function.
pub fn calculate_change(amount_tendered: Money, total_amount: Money) -> Money {
    (amount_tendered - total_amount).max_zero()
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::OrderStatus;
    use chrono::Utc;

    fn order_with_total(cents: i64) -> Order {
        let now = Utc::now();
        Order {
            id: "o1".to_string(),
            order_number: "BRW-20260830-0001".to_string(),
            status: OrderStatus::Pending,
            total_cents: cents,
            total_before_discount_cents: None,
            discount_cents: 0,
            applied_promotion_id: None,
            total_items: 1,
            notes: None,
            created_by: None,
            created_at: now,
            updated_at: now,
        }
    }

    fn percentage_promo(bps: i64) -> Promotion {
        let now = Utc::now();
        Promotion {
            id: "p1".to_string(),
            name: "Test".to_string(),
            description: None,
            discount_type: DiscountType::Percentage,
            discount_value: bps,
            is_active: true,
            is_archived: false,
            start_date: now,
            end_date: now + chrono::Duration::days(7),
            created_by: None,
            created_at: now,
            updated_at: now,
        }
    }

    #[test]
    fn manual_discount_applied_verbatim() {
        // $100.00 order, $20.00 manual discount → $20.00 off, $80.00 due
        let order = order_with_total(10_000);
        let selection = DiscountSelection::Manual {
            amount: Money::from_cents(2000),
        };

        let discount = calculate_discount(Some(&order), &selection);
        assert_eq!(discount.cents(), 2000);
        assert_eq!(calculate_total(Some(&order), discount).cents(), 8000);
    }

    #[test]
    fn percentage_promotion_discount() {
        // $100.00 order, 15% promotion → $15.00 off, $85.00 due
        let order = order_with_total(10_000);
        let selection = DiscountSelection::Promotion {
            promotion: percentage_promo(1500),
        };

        let discount = calculate_discount(Some(&order), &selection);
        assert_eq!(discount.cents(), 1500);
        assert_eq!(calculate_total(Some(&order), discount).cents(), 8500);
    }

    #[test]
    fn fixed_amount_promotion_discount() {
        let order = order_with_total(10_000);
        let mut promo = percentage_promo(0);
        promo.discount_type = DiscountType::FixedAmount;
        promo.discount_value = 250;

        let discount =
            calculate_discount(Some(&order), &DiscountSelection::Promotion { promotion: promo });
        assert_eq!(discount.cents(), 250);
    }

    #[test]
    fn change_is_tendered_minus_total() {
        // $85.00 due, $100.00 tendered → $15.00 change
        let change = calculate_change(Money::from_cents(10_000), Money::from_cents(8500));
        assert_eq!(change.cents(), 1500);
    }

    #[test]
    fn change_never_negative() {
        let change = calculate_change(Money::from_cents(5000), Money::from_cents(8500));
        assert_eq!(change, Money::zero());
    }

    #[test]
    fn absent_order_yields_zero() {
        let selection = DiscountSelection::Manual {
            amount: Money::from_cents(500),
        };
        assert_eq!(calculate_discount(None, &selection), Money::zero());
        assert_eq!(calculate_total(None, Money::from_cents(500)), Money::zero());
    }

    #[test]
    fn no_discount_selection_yields_zero() {
        let order = order_with_total(10_000);
        assert_eq!(
            calculate_discount(Some(&order), &DiscountSelection::None),
            Money::zero()
        );
    }

    #[test]
    fn oversized_discount_floors_total_at_zero() {
        // $1000.00 discount on a $5.00 order: total floors at zero, the
        // discount itself is not rejected here.
        let order = order_with_total(500);
        let selection = DiscountSelection::Manual {
            amount: Money::from_cents(100_000),
        };

        let discount = calculate_discount(Some(&order), &selection);
        assert_eq!(discount.cents(), 100_000);
        assert_eq!(calculate_total(Some(&order), discount), Money::zero());
    }

    #[test]
    fn total_never_negative_for_any_selection() {
        let order = order_with_total(123);
        let selections = [
            DiscountSelection::None,
            DiscountSelection::Manual {
                amount: Money::from_cents(999_999),
            },
            DiscountSelection::Promotion {
                promotion: percentage_promo(25_000), // 250%
            },
        ];

        for selection in &selections {
            let discount = calculate_discount(Some(&order), selection);
            assert!(!calculate_total(Some(&order), discount).is_negative());
        }
    }

    #[test]
    fn calculations_are_deterministic() {
        let order = order_with_total(7777);
        let selection = DiscountSelection::Promotion {
            promotion: percentage_promo(825),
        };

        let first = calculate_discount(Some(&order), &selection);
        let second = calculate_discount(Some(&order), &selection);
        assert_eq!(first, second);

        assert_eq!(
            calculate_total(Some(&order), first),
            calculate_total(Some(&order), second)
        );
        assert_eq!(
            calculate_change(Money::from_cents(9000), first),
            calculate_change(Money::from_cents(9000), second)
        );
    }

    #[test]
    fn selection_kind_mapping() {
        assert_eq!(DiscountSelection::None.kind(), DiscountKind::None);
        assert_eq!(
            DiscountSelection::Manual {
                amount: Money::zero()
            }
            .kind(),
            DiscountKind::Manual
        );

        let promo_selection = DiscountSelection::Promotion {
            promotion: percentage_promo(1000),
        };
        assert_eq!(promo_selection.kind(), DiscountKind::Promo);
        assert_eq!(promo_selection.promotion_id(), Some("p1"));
    }
}
