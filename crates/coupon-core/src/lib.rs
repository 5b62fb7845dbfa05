//! # coupon-core: Pure Business Logic for Coupon Management
//!
//! This crate is the **heart** of the coupon backend. It contains the
//! discount rules and the validators as pure functions with zero I/O
//! dependencies.
//!
//! ## Architecture Position
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                   Coupon Management Architecture                        │
//! │                                                                         │
//! │  ┌─────────────────────────────────────────────────────────────────┐   │
//! │  │                    Admin Panel (React)                          │   │
//! │  │    Coupon list ──► Coupon form ──► Checkout tester ──► Reports │   │
//! │  └─────────────────────────────┬───────────────────────────────────┘   │
//! │                                │ HTTP / JSON                            │
//! │  ┌─────────────────────────────▼───────────────────────────────────┐   │
//! │  │                    coupon-api (axum)                            │   │
//! │  │    /api/coupons/validate, /validate-multiple, /can-combine ... │   │
//! │  └─────────────────────────────┬───────────────────────────────────┘   │
//! │                                │                                        │
//! │  ┌─────────────────────────────▼───────────────────────────────────┐   │
//! │  │               ★ coupon-core (THIS CRATE) ★                      │   │
//! │  │                                                                 │   │
//! │  │   ┌───────────┐  ┌───────────┐  ┌───────────┐  ┌───────────┐  │   │
//! │  │   │   types   │  │ discount  │  │ validator │  │  report   │  │   │
//! │  │   │  Coupon   │  │ calculate │  │  single   │  │  status   │  │   │
//! │  │   │  Money    │  │           │  │  multi    │  │  stats    │  │   │
//! │  │   └───────────┘  └───────────┘  └───────────┘  └───────────┘  │   │
//! │  │                                                                 │   │
//! │  │   NO I/O • NO DATABASE • NO CLOCK • PURE FUNCTIONS             │   │
//! │  └─────────────────────────────────────────────────────────────────┘   │
//! │                                │                                        │
//! │  ┌─────────────────────────────▼───────────────────────────────────┐   │
//! │  │                    coupon-db (Database Layer)                   │   │
//! │  │              SQLite queries, migrations, repositories           │   │
//! │  └─────────────────────────────────────────────────────────────────┘   │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Modules
//!
//! - [`types`] - Domain types (Coupon, User, CouponUsage, DiscountType)
//! - [`money`] - Money type over `rust_decimal` (no floating point!)
//! - [`discount`] - Discount calculator
//! - [`store`] - `CouponLookup` seam and the per-request snapshot
//! - [`validator`] - Single/multi coupon validation and compatibility
//! - [`report`] - Status classification, report filters, statistics
//! - [`validation`] - Form input rules
//! - [`error`] - Domain error types
//!
//! ## Design Principles
//!
//! 1. **Pure Functions**: the current time is a parameter, never read here
//! 2. **No I/O**: coupons arrive through [`store::CouponLookup`]
//! 3. **Decimal Money**: currency units for amounts, 0-100 for percentages,
//!    never rounded
//! 4. **Results, not errors**: an unusable coupon is a validation result
//!
//! ## Example Usage
//!
//! ```rust
//! use chrono::Utc;
//! use coupon_core::{CouponSnapshot, CouponValidator, Money};
//!
//! let store = CouponSnapshot::new();
//! let validator = CouponValidator::new(&store, Utc::now());
//!
//! assert!(validator.can_combine(&[]).unwrap());
//! let result = validator.validate_all(&[], Money::from(100)).unwrap();
//! assert_eq!(result.final_amount, Money::from(100));
//! ```

// =============================================================================
// Module Declarations
// =============================================================================

pub mod discount;
pub mod error;
pub mod money;
pub mod report;
pub mod store;
pub mod types;
pub mod validation;
pub mod validator;

// =============================================================================
// Re-exports for Convenience
// =============================================================================
// These allow users to do `use coupon_core::Money` instead of
// `use coupon_core::money::Money`

pub use discount::calculate_discount;
pub use error::{CoreError, CoreResult, ValidationError};
pub use money::Money;
pub use report::{compute_statistics, CouponReportRow, CouponStatistics, CouponStatus, ReportFilter};
pub use store::{CouponLookup, CouponSnapshot};
pub use types::*;
pub use validator::{
    AppliedCouponInfo, CouponValidationResult, CouponValidator, MultiCouponValidationResult,
};
