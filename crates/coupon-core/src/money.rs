//! # Money Module
//!
//! Provides the `Money` type for handling monetary values safely.
//!
//! ## Why Decimal Money?
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  THE FLOATING POINT PROBLEM                                             │
//! │                                                                         │
//! │  In JavaScript/floating point:                                          │
//! │    0.1 + 0.2 = 0.30000000000000004  ❌ WRONG!                           │
//! │                                                                         │
//! │  Stacked coupons make it worse: every step compounds the error.        │
//! │    100.00 → 10% off → 10% off = 81.00 must be EXACTLY 81.00            │
//! │                                                                         │
//! │  OUR SOLUTION: base-10 Decimal                                          │
//! │    0.99 → 15% off → 15% off = 0.715275, exactly                        │
//! │    No intermediate rounding; the client decides how to display it      │
//! │                                                                         │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Usage
//! ```rust
//! use coupon_core::money::Money;
//! use rust_decimal::Decimal;
//!
//! let order: Money = "100.00".parse().unwrap();
//!
//! let discount = order.percent_of(Decimal::from(10));
//! assert_eq!(discount, Money::from(10));
//! assert_eq!(order - discount, Money::from(90));
//! ```

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::ops::{Add, AddAssign, Sub, SubAssign};
use std::str::FromStr;
use ts_rs::TS;

// =============================================================================
// Money Type
// =============================================================================

/// A monetary amount in currency units (`99.50` is ninety-nine fifty).
///
/// ## Design Decisions
/// - **Decimal, not f64**: base-10 arithmetic, exact for every amount a
///   client can type
/// - **Signed**: a negative order amount is not rejected by the validator,
///   it simply flows through the arithmetic
/// - **Never rounded** by the core. Results carry every fractional digit
///   the arithmetic produces
/// - **Serializes as a plain JSON number** (`90`, `0.715275`)
///
/// ## Where Money is Used
/// ```text
/// ┌─────────────────────────────────────────────────────────────────────────┐
/// │  orderAmount ──► Coupon A ──► running total ──► Coupon B ──► final     │
/// │                     │                              │                    │
/// │                     └── discountAmount             └── discountAmount   │
/// │                                                                         │
/// │  totalDiscountAmount = orderAmount - final                              │
/// └─────────────────────────────────────────────────────────────────────────┘
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize, TS)]
#[ts(export)]
#[serde(transparent)]
pub struct Money(#[ts(type = "number")] Decimal);

impl Money {
    /// Wraps a decimal amount.
    #[inline]
    pub const fn new(amount: Decimal) -> Self {
        Money(amount)
    }

    /// Returns the underlying decimal.
    #[inline]
    pub const fn amount(&self) -> Decimal {
        self.0
    }

    /// Returns zero money value.
    #[inline]
    pub const fn zero() -> Self {
        Money(Decimal::ZERO)
    }

    /// Returns the smaller of two amounts.
    #[inline]
    pub fn min(self, other: Money) -> Money {
        Money(self.0.min(other.0))
    }

    /// Returns `percent` percent of this amount, unrounded.
    ///
    /// `percent` is on the 0–100 scale. The rate is reduced to a fraction
    /// first, so an in-range rate never grows the amount.
    ///
    /// ## Example
    /// ```rust
    /// use coupon_core::money::Money;
    /// use rust_decimal::Decimal;
    ///
    /// // 15% of 0.99 = 0.1485
    /// let amount: Money = "0.99".parse().unwrap();
    /// assert_eq!(amount.percent_of(Decimal::from(15)).to_string(), "0.1485");
    /// ```
    pub fn percent_of(&self, percent: Decimal) -> Money {
        Money(self.0 * (percent / Decimal::ONE_HUNDRED))
    }
}

// =============================================================================
// Trait Implementations
// =============================================================================

/// Plain decimal with no trailing-zero padding (`90`, `0.1485`), for logs
/// and exports. The admin panel formats amounts itself.
impl fmt::Display for Money {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0.normalize())
    }
}

impl FromStr for Money {
    type Err = rust_decimal::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Decimal::from_str(s).map(Money)
    }
}

impl From<Decimal> for Money {
    fn from(amount: Decimal) -> Self {
        Money(amount)
    }
}

/// Whole currency units.
impl From<i64> for Money {
    fn from(units: i64) -> Self {
        Money(Decimal::from(units))
    }
}

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

// =============================================================================
// Unit Tests
// =============================================================================
