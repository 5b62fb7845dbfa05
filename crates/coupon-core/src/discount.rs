//! # Discount Calculator
//!
//! Turns a coupon and an order amount into a discount amount.
//!
//! ## Rules
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  Percentage    discount = amount × value / 100     (not rounded)        │
//! │                100.00 × 10% = 10.00,  0.99 × 15% = 0.1485               │
//! │                                                                         │
//! │  FixedAmount   discount = min(value, amount)                            │
//! │                5.00 off 3.00 = 3.00 (never below zero final)            │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! Neither rule clamps negative amounts. A negative order amount flows
//! through: 10% of -100.00 is -10.00.

use crate::money::Money;
use crate::types::{Coupon, DiscountType};

/// Computes the discount `coupon` grants on `order_amount`.
///
/// Pure and deterministic. Validity (active, expiry, cap) is not checked
/// here; see [`crate::validator::CouponValidator`].
///
/// ## Example
/// ```rust
/// use chrono::Utc;
/// use coupon_core::discount::calculate_discount;
/// use coupon_core::money::Money;
/// use coupon_core::types::{Coupon, DiscountType};
/// use rust_decimal::Decimal;
///
/// let now = Utc::now();
/// let coupon = Coupon {
///     id: "c-1".into(),
///     code: "SAVE5".into(),
///     description: None,
///     discount_type: DiscountType::FixedAmount,
///     discount_value: Decimal::from(5),
///     expiry_date: None,
///     max_usage_count: None,
///     current_usage_count: 0,
///     is_active: true,
///     allow_multiple_discounts: true,
///     created_by_id: "u-1".into(),
///     created_at: now,
///     updated_at: now,
/// };
///
/// assert_eq!(calculate_discount(&coupon, Money::from(100)), Money::from(5));
/// assert_eq!(calculate_discount(&coupon, Money::from(3)), Money::from(3));
/// ```
pub fn calculate_discount(coupon: &Coupon, order_amount: Money) -> Money {
    match coupon.discount_type {
        DiscountType::Percentage => order_amount.percent_of(coupon.discount_value),
        DiscountType::FixedAmount => coupon.fixed_amount().min(order_amount),
    }
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;
    use rust_decimal::Decimal;

    fn coupon(discount_type: DiscountType, discount_value: &str) -> Coupon {
        let now = Utc::now();
        Coupon {
            id: "c-1".to_string(),
            code: "TEST".to_string(),
            description: None,
            discount_type,
            discount_value: discount_value.parse().unwrap(),
            expiry_date: None,
            max_usage_count: None,
            current_usage_count: 0,
            is_active: true,
            allow_multiple_discounts: true,
            created_by_id: "u-1".to_string(),
            created_at: now,
            updated_at: now,
        }
    }

    fn money(s: &str) -> Money {
        s.parse().unwrap()
    }

    #[test]
    fn test_percentage() {
        let c = coupon(DiscountType::Percentage, "10");
        assert_eq!(calculate_discount(&c, money("100")), money("10"));
        assert_eq!(calculate_discount(&c, money("90")), money("9"));
    }

    #[test]
    fn test_percentage_is_not_rounded() {
        let c = coupon(DiscountType::Percentage, "15");
        assert_eq!(calculate_discount(&c, money("0.99")), money("0.1485"));

        let fractional = coupon(DiscountType::Percentage, "12.5");
        assert_eq!(calculate_discount(&fractional, money("10.01")), money("1.25125"));
    }

    #[test]
    fn test_percentage_matches_formula_across_amounts() {
        let rate = Decimal::new(175, 1); // 17.5%
        let c = coupon(DiscountType::Percentage, "17.5");
        for amount in ["0.01", "0.99", "1.37", "49.95", "1234.56"] {
            let a = money(amount);
            let expected = a.amount() * rate / Decimal::ONE_HUNDRED;
            assert_eq!(calculate_discount(&c, a).amount(), expected, "amount {amount}");
        }
    }

    #[test]
    fn test_full_percentage_zeroes_the_order() {
        let c = coupon(DiscountType::Percentage, "100");
        let amount = money("43.21");
        assert_eq!(calculate_discount(&c, amount), amount);
    }

    #[test]
    fn test_fixed_amount() {
        let c = coupon(DiscountType::FixedAmount, "5");
        assert_eq!(calculate_discount(&c, money("100")), money("5"));
    }

    #[test]
    fn test_fixed_amount_capped_at_order() {
        let c = coupon(DiscountType::FixedAmount, "5.00");
        assert_eq!(calculate_discount(&c, money("3.00")), money("3"));
        assert_eq!(calculate_discount(&c, Money::zero()), Money::zero());
    }

    #[test]
    fn test_negative_amount_is_not_clamped() {
        let pct = coupon(DiscountType::Percentage, "10");
        assert_eq!(calculate_discount(&pct, money("-100")), money("-10"));

        let fixed = coupon(DiscountType::FixedAmount, "5");
        assert_eq!(calculate_discount(&fixed, money("-100")), money("-100"));
    }
}
