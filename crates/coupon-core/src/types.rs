//! # Domain Types
//!
//! Core domain types used throughout the coupon backend.
//!
//! ## Type Hierarchy
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                         Domain Types                                    │
//! │                                                                         │
//! │  ┌─────────────────┐   ┌─────────────────┐   ┌─────────────────┐       │
//! │  │     Coupon      │   │      User       │   │   CouponUsage   │       │
//! │  │  ─────────────  │   │  ─────────────  │   │  ─────────────  │       │
//! │  │  id (UUID)      │   │  id (UUID)      │   │  id (UUID)      │       │
//! │  │  code (business)│   │  username       │   │  coupon_id (FK) │       │
//! │  │  discount_type  │   │  password_hash  │   │  order_amount   │       │
//! │  │  discount_value │   │  last_login     │   │  discount_amount│       │
//! │  └─────────────────┘   └─────────────────┘   └─────────────────┘       │
//! │                                                                         │
//! │  ┌─────────────────┐                                                    │
//! │  │  DiscountType   │   Closed set. Unknown tags are rejected when      │
//! │  │  ─────────────  │   parsed, so the calculator never sees one.       │
//! │  │  Percentage     │                                                    │
//! │  │  FixedAmount    │                                                    │
//! │  └─────────────────┘                                                    │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Dual-Key Identity Pattern
//! Every coupon has:
//! - `id`: UUID v4 - immutable, used for database relations
//! - `code`: what customers type at checkout, unique and case-sensitive

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Deserializer, Serialize};
use std::fmt;
use std::str::FromStr;
use ts_rs::TS;

use crate::error::CoreError;
use crate::money::Money;

// =============================================================================
// Discount Type
// =============================================================================

/// How a coupon's `discount_value` is interpreted.
///
/// ## Units
/// ```text
/// ┌──────────────┬─────────────────────────┬───────────────────────────────┐
/// │ Type         │ discount_value unit     │ Example                       │
/// ├──────────────┼─────────────────────────┼───────────────────────────────┤
/// │ Percentage   │ percent, 0 to 100       │ 10   → 10% off                │
/// │ FixedAmount  │ currency units          │ 5.00 → 5.00 off               │
/// └──────────────┴─────────────────────────┴───────────────────────────────┘
/// ```
///
/// The tag is the variant name, in JSON and in storage.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, TS)]
#[ts(export)]
pub enum DiscountType {
    /// A share of the order amount.
    Percentage,
    /// A flat amount, capped at the order amount.
    FixedAmount,
}

impl DiscountType {
    /// The storage and wire tag.
    pub const fn as_str(&self) -> &'static str {
        match self {
            DiscountType::Percentage => "Percentage",
            DiscountType::FixedAmount => "FixedAmount",
        }
    }
}

impl FromStr for DiscountType {
    type Err = CoreError;

    fn from_str(tag: &str) -> Result<Self, Self::Err> {
        match tag {
            "Percentage" => Ok(DiscountType::Percentage),
            "FixedAmount" => Ok(DiscountType::FixedAmount),
            other => Err(CoreError::UnsupportedDiscountType(other.to_string())),
        }
    }
}

impl fmt::Display for DiscountType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

// Routed through FromStr so JSON input fails the same way a bad row does.
impl<'de> Deserialize<'de> for DiscountType {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        let tag = String::deserialize(deserializer)?;
        tag.parse().map_err(serde::de::Error::custom)
    }
}

// =============================================================================
// Coupon
// =============================================================================

/// A discount code as stored by the backend.
///
/// The validator treats coupons as read-only. Only the persistence layer
/// bumps `current_usage_count`, and only on redemption.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS)]
#[ts(export)]
#[serde(rename_all = "camelCase")]
pub struct Coupon {
    /// Unique identifier (UUID v4).
    pub id: String,

    /// Code customers enter at checkout. Unique, case-sensitive.
    pub code: String,

    /// Free text shown in the admin panel.
    pub description: Option<String>,

    pub discount_type: DiscountType,

    /// Percent (0 to 100) for percentage coupons, currency units for fixed ones.
    #[ts(type = "number")]
    pub discount_value: Decimal,

    /// Absent means the coupon never expires.
    #[ts(as = "Option<String>")]
    pub expiry_date: Option<DateTime<Utc>>,

    /// Absent means unlimited redemptions.
    pub max_usage_count: Option<i64>,

    pub current_usage_count: i64,

    pub is_active: bool,

    /// If false, the coupon must be the only one on an order.
    pub allow_multiple_discounts: bool,

    /// Admin user who created the coupon.
    pub created_by_id: String,

    #[ts(as = "String")]
    pub created_at: DateTime<Utc>,

    #[ts(as = "String")]
    pub updated_at: DateTime<Utc>,
}

impl Coupon {
    /// Checks whether the coupon's expiry date lies before `now`.
    ///
    /// A coupon expiring exactly at `now` is still usable.
    pub fn is_expired(&self, now: DateTime<Utc>) -> bool {
        matches!(self.expiry_date, Some(expiry) if expiry < now)
    }

    /// Checks whether the usage cap has been reached.
    pub fn is_maxed_out(&self) -> bool {
        matches!(self.max_usage_count, Some(max) if self.current_usage_count >= max)
    }

    /// Active, unexpired and under its usage cap.
    ///
    /// ## Example
    /// ```rust
    /// use chrono::{Duration, Utc};
    /// use coupon_core::types::{Coupon, DiscountType};
    /// use rust_decimal::Decimal;
    ///
    /// let now = Utc::now();
    /// let mut coupon = Coupon {
    ///     id: "c-1".into(),
    ///     code: "WELCOME2024".into(),
    ///     description: None,
    ///     discount_type: DiscountType::Percentage,
    ///     discount_value: Decimal::from(10),
    ///     expiry_date: Some(now + Duration::days(30)),
    ///     max_usage_count: Some(100),
    ///     current_usage_count: 0,
    ///     is_active: true,
    ///     allow_multiple_discounts: false,
    ///     created_by_id: "u-1".into(),
    ///     created_at: now,
    ///     updated_at: now,
    /// };
    /// assert!(coupon.is_valid_for_use(now));
    ///
    /// coupon.current_usage_count = 100;
    /// assert!(!coupon.is_valid_for_use(now));
    /// ```
    pub fn is_valid_for_use(&self, now: DateTime<Utc>) -> bool {
        self.is_active && !self.is_expired(now) && !self.is_maxed_out()
    }

    /// Returns the discount value as Money (fixed-amount coupons only).
    #[inline]
    pub fn fixed_amount(&self) -> Money {
        Money::new(self.discount_value)
    }
}

// =============================================================================
// Coupon Input
// =============================================================================

/// Payload for creating or updating a coupon.
///
/// Usage counters and audit fields are owned by the backend and cannot be
/// set through this type.
#[derive(Debug, Clone, Serialize, Deserialize, TS)]
#[ts(export)]
#[serde(rename_all = "camelCase")]
pub struct CouponInput {
    pub code: String,
    #[serde(default)]
    pub description: Option<String>,
    pub discount_type: DiscountType,
    #[ts(type = "number")]
    pub discount_value: Decimal,
    #[serde(default)]
    #[ts(as = "Option<String>")]
    pub expiry_date: Option<DateTime<Utc>>,
    #[serde(default)]
    pub max_usage_count: Option<i64>,
    #[serde(default = "default_true")]
    pub is_active: bool,
    #[serde(default)]
    pub allow_multiple_discounts: bool,
}

fn default_true() -> bool {
    true
}

// =============================================================================
// User
// =============================================================================

/// An admin user of the management panel.
#[derive(Debug, Clone, Serialize, Deserialize, TS)]
#[ts(export)]
#[serde(rename_all = "camelCase")]
pub struct User {
    pub id: String,
    pub username: String,

    /// Argon2 PHC string. Never leaves the backend.
    #[serde(skip_serializing, default)]
    #[ts(skip)]
    pub password_hash: String,

    pub is_active: bool,

    #[ts(as = "String")]
    pub created_at: DateTime<Utc>,

    #[ts(as = "Option<String>")]
    pub last_login: Option<DateTime<Utc>>,
}

// =============================================================================
// Coupon Usage
// =============================================================================

/// One redemption of one coupon.
///
/// A stacked order writes one row per applied coupon.
#[derive(Debug, Clone, Serialize, Deserialize, TS)]
#[ts(export)]
#[serde(rename_all = "camelCase")]
pub struct CouponUsage {
    pub id: String,
    pub coupon_id: String,
    #[ts(as = "String")]
    pub used_at: DateTime<Utc>,
    /// Amount the coupon was applied against (the running total).
    pub order_amount: Money,
    pub discount_amount: Money,
}

// =============================================================================
// Unit Tests
// =============================================================================
