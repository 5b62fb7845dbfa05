//! # Coupon Validator
//!
//! Single-coupon validation, multi-coupon stacking and the compatibility
//! pre-flight check.
//!
//! ## Single Coupon
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  validate(code, amount, previously_applied)                             │
//! │       │                                                                 │
//! │       ├── lookup fails?          → "Coupon not found"                   │
//! │       ├── inactive/expired/cap?  → "Coupon is not valid for use"        │
//! │       ├── others applied and                                            │
//! │       │   this one can't stack?  → "This coupon cannot be combined..."  │
//! │       └── OK → discount, final = amount - discount                      │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Stacking Is Compounding
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  100.00 ──► A (10%) ──► 90.00 ──► B (10%) ──► 81.00                     │
//! │                 10.00             9.00                                  │
//! │                                                                         │
//! │  Each coupon sees the running total, not the original amount, so the   │
//! │  order of codes can change the result. Callers control the order.     │
//! │  The running total is never rounded between steps.                     │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! Only the *current* coupon's stacking flag is checked against the codes
//! already applied. A stackable coupon applied after a non-stackable one is
//! accepted by [`CouponValidator::validate`]; [`CouponValidator::validate_all`]
//! still rejects that combination up front through
//! [`CouponValidator::can_combine`].
//!
//! ## Usage
//! ```rust
//! use chrono::Utc;
//! use coupon_core::money::Money;
//! use coupon_core::store::CouponSnapshot;
//! use coupon_core::validator::CouponValidator;
//!
//! let store = CouponSnapshot::new();
//! let validator = CouponValidator::new(&store, Utc::now());
//!
//! let result = validator.validate("NOPE", Money::from(100), &[]).unwrap();
//! assert!(!result.is_valid);
//! assert_eq!(result.message.as_deref(), Some("Coupon not found"));
//! ```

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use ts_rs::TS;

use crate::discount::calculate_discount;
use crate::error::CoreResult;
use crate::money::Money;
use crate::store::CouponLookup;
use crate::types::{Coupon, DiscountType};

// =============================================================================
// Messages
// =============================================================================

pub const MSG_NOT_FOUND: &str = "Coupon not found";
pub const MSG_NOT_VALID_FOR_USE: &str = "Coupon is not valid for use";
pub const MSG_CANNOT_COMBINE: &str = "This coupon cannot be combined with other coupons";
pub const MSG_SOME_CANNOT_COMBINE: &str = "Some of these coupons cannot be combined";

// =============================================================================
// Result Types
// =============================================================================

/// Outcome of validating one coupon code.
///
/// Ordinary invalidity (unknown code, expired, stacking conflict) is a
/// result with `is_valid: false`, not an error.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS)]
#[ts(export)]
#[serde(rename_all = "camelCase")]
pub struct CouponValidationResult {
    pub is_valid: bool,
    pub message: Option<String>,
    pub discount_amount: Option<Money>,
    pub final_amount: Option<Money>,
    pub discount_type: Option<DiscountType>,
    #[ts(type = "number | null")]
    pub discount_value: Option<Decimal>,
    pub allow_multiple_discounts: Option<bool>,
    pub applied_code: Option<String>,
}

impl CouponValidationResult {
    /// A failed validation carrying only a message.
    pub fn invalid(message: impl Into<String>) -> Self {
        Self {
            is_valid: false,
            message: Some(message.into()),
            discount_amount: None,
            final_amount: None,
            discount_type: None,
            discount_value: None,
            allow_multiple_discounts: None,
            applied_code: None,
        }
    }

    fn accepted(coupon: &Coupon, order_amount: Money, discount: Money) -> Self {
        Self {
            is_valid: true,
            message: None,
            discount_amount: Some(discount),
            final_amount: Some(order_amount - discount),
            discount_type: Some(coupon.discount_type),
            discount_value: Some(coupon.discount_value),
            allow_multiple_discounts: Some(coupon.allow_multiple_discounts),
            applied_code: Some(coupon.code.clone()),
        }
    }
}

/// One step of a stacked validation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS)]
#[ts(export)]
#[serde(rename_all = "camelCase")]
pub struct AppliedCouponInfo {
    pub code: String,
    pub discount_amount: Money,
    pub discount_type: DiscountType,
    #[ts(type = "number")]
    pub discount_value: Decimal,
    /// Running total after this coupon.
    pub final_amount: Money,
}

/// Outcome of validating an ordered list of coupon codes.
///
/// On failure `applied_coupons` is empty and both totals are zero.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS)]
#[ts(export)]
#[serde(rename_all = "camelCase")]
pub struct MultiCouponValidationResult {
    pub is_valid: bool,
    pub message: Option<String>,
    pub applied_coupons: Vec<AppliedCouponInfo>,
    pub total_discount_amount: Money,
    pub final_amount: Money,
}

impl MultiCouponValidationResult {
    fn invalid(message: impl Into<String>) -> Self {
        Self {
            is_valid: false,
            message: Some(message.into()),
            applied_coupons: Vec::new(),
            total_discount_amount: Money::zero(),
            final_amount: Money::zero(),
        }
    }
}

// =============================================================================
// Validator
// =============================================================================

/// Validates coupon codes against a lookup at a fixed instant.
///
/// `now` is captured once so every code in a stacked request is judged
/// against the same clock.
pub struct CouponValidator<'a, S: CouponLookup + ?Sized> {
    store: &'a S,
    now: DateTime<Utc>,
}

/// Internal outcome of the eligibility checks.
enum Check {
    Rejected(&'static str),
    Accepted { coupon: Coupon, discount: Money },
}

impl<'a, S: CouponLookup + ?Sized> CouponValidator<'a, S> {
    pub fn new(store: &'a S, now: DateTime<Utc>) -> Self {
        Self { store, now }
    }

    /// Runs the checks in order, first failure wins.
    fn check(
        &self,
        code: &str,
        order_amount: Money,
        previously_applied: &[String],
    ) -> CoreResult<Check> {
        let Some(coupon) = self.store.find_by_code(code)? else {
            return Ok(Check::Rejected(MSG_NOT_FOUND));
        };

        if !coupon.is_valid_for_use(self.now) {
            return Ok(Check::Rejected(MSG_NOT_VALID_FOR_USE));
        }

        if !previously_applied.is_empty() && !coupon.allow_multiple_discounts {
            return Ok(Check::Rejected(MSG_CANNOT_COMBINE));
        }

        let discount = calculate_discount(&coupon, order_amount);
        Ok(Check::Accepted { coupon, discount })
    }

    /// Validates a single code against `order_amount`.
    ///
    /// `previously_applied` lists codes already on the order; when it is
    /// non-empty the coupon must allow stacking.
    ///
    /// ## Errors
    /// Only store failures. Every business outcome is a result.
    pub fn validate(
        &self,
        code: &str,
        order_amount: Money,
        previously_applied: &[String],
    ) -> CoreResult<CouponValidationResult> {
        Ok(match self.check(code, order_amount, previously_applied)? {
            Check::Rejected(message) => CouponValidationResult::invalid(message),
            Check::Accepted { coupon, discount } => {
                CouponValidationResult::accepted(&coupon, order_amount, discount)
            }
        })
    }

    /// Applies `codes` in order, each against the running total.
    ///
    /// Stops at the first invalid code and reports it as
    /// `"Coupon {code}: {reason}"`.
    ///
    /// ## Example
    /// ```text
    /// codes = [A (10%), B (5.00 fixed)], amount = 100.00
    ///
    ///   A: 100.00 - 10.00 = 90.00
    ///   B:  90.00 -  5.00 = 85.00
    ///
    ///   total_discount_amount = 15.00, final_amount = 85.00
    /// ```
    pub fn validate_all(
        &self,
        codes: &[String],
        order_amount: Money,
    ) -> CoreResult<MultiCouponValidationResult> {
        if !self.can_combine(codes)? {
            return Ok(MultiCouponValidationResult::invalid(MSG_SOME_CANNOT_COMBINE));
        }

        let mut current = order_amount;
        let mut applied_codes: Vec<String> = Vec::with_capacity(codes.len());
        let mut applied_coupons = Vec::with_capacity(codes.len());

        for code in codes {
            match self.check(code, current, &applied_codes)? {
                Check::Rejected(reason) => {
                    return Ok(MultiCouponValidationResult::invalid(format!(
                        "Coupon {code}: {reason}"
                    )));
                }
                Check::Accepted { coupon, discount } => {
                    current -= discount;
                    applied_coupons.push(AppliedCouponInfo {
                        code: code.clone(),
                        discount_amount: discount,
                        discount_type: coupon.discount_type,
                        discount_value: coupon.discount_value,
                        final_amount: current,
                    });
                    applied_codes.push(code.clone());
                }
            }
        }

        Ok(MultiCouponValidationResult {
            is_valid: true,
            message: None,
            applied_coupons,
            total_discount_amount: order_amount - current,
            final_amount: current,
        })
    }

    /// Checks whether `codes` may be used together.
    ///
    /// ## Rules
    /// - Any unknown code → false
    /// - More than one code and any of them refuses stacking → false
    /// - Otherwise true (a single code, or no codes, always combine)
    ///
    /// Validity for use is not considered here.
    pub fn can_combine(&self, codes: &[String]) -> CoreResult<bool> {
        let mut all_stackable = true;

        for code in codes {
            match self.store.find_by_code(code)? {
                None => return Ok(false),
                Some(coupon) => all_stackable &= coupon.allow_multiple_discounts,
            }
        }

        Ok(codes.len() <= 1 || all_stackable)
    }
}

// =============================================================================
// Unit Tests
// =============================================================================
