//! # Coupon Lookup
//!
//! The seam between the pure validator and wherever coupons live.
//!
//! ## Request Flow
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  HTTP request: codes ["A", "B"]                                         │
//! │       │                                                                 │
//! │       ▼                                                                 │
//! │  CouponRepository (coupon-db)  ── one read per distinct code ──┐        │
//! │                                                                 │        │
//! │  CouponSnapshot  ◄──────────────────────────────────────────────┘        │
//! │       │  implements CouponLookup                                        │
//! │       ▼                                                                 │
//! │  CouponValidator (pure, synchronous)                                    │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! Codes missing from the snapshot are simply "not found"; the validator
//! turns that into a result message.

use std::collections::HashMap;

use crate::error::CoreResult;
use crate::types::Coupon;

/// Read access to coupons by code.
pub trait CouponLookup {
    /// Finds a coupon by its exact (case-sensitive) code.
    fn find_by_code(&self, code: &str) -> CoreResult<Option<Coupon>>;
}

/// Coupons read from the store for a single request, keyed by code.
#[derive(Debug, Clone, Default)]
pub struct CouponSnapshot {
    by_code: HashMap<String, Coupon>,
}

impl CouponSnapshot {
    /// Creates an empty snapshot.
    pub fn new() -> Self {
        Self::default()
    }

    /// Builds a snapshot from coupons already read from the store.
    pub fn from_coupons(coupons: impl IntoIterator<Item = Coupon>) -> Self {
        let by_code = coupons
            .into_iter()
            .map(|coupon| (coupon.code.clone(), coupon))
            .collect();
        Self { by_code }
    }

    /// Adds or replaces a coupon.
    pub fn insert(&mut self, coupon: Coupon) {
        self.by_code.insert(coupon.code.clone(), coupon);
    }

    pub fn len(&self) -> usize {
        self.by_code.len()
    }

    pub fn is_empty(&self) -> bool {
        self.by_code.is_empty()
    }
}

impl CouponLookup for CouponSnapshot {
    fn find_by_code(&self, code: &str) -> CoreResult<Option<Coupon>> {
        Ok(self.by_code.get(code).cloned())
    }
}

// =============================================================================
// Unit Tests
// =============================================================================
