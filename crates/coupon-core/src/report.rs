//! # Reports
//!
//! Pure classification, filtering and aggregation behind the admin
//! panel's report screens. The database layer reads rows; everything
//! here is computed in memory against an explicit `now`.
//!
//! ## Status Classification
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  is_active = false ?          ──► Inactive                              │
//! │  expiry_date < now ?          ──► Expired                               │
//! │  usage >= max_usage_count ?   ──► MaxedOut                              │
//! │  otherwise                    ──► Active                                │
//! │                                                                         │
//! │  Checked top to bottom: an inactive expired coupon is Inactive.        │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

use chrono::{DateTime, NaiveDate, Utc};
use rust_decimal::{Decimal, RoundingStrategy};
use serde::{Deserialize, Serialize};
use ts_rs::TS;

use crate::types::Coupon;

// =============================================================================
// Coupon Status
// =============================================================================

/// Where a coupon stands at a given instant.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export)]
pub enum CouponStatus {
    Inactive,
    Expired,
    MaxedOut,
    Active,
}

impl CouponStatus {
    /// Classifies `coupon` at `now`.
    pub fn of(coupon: &Coupon, now: DateTime<Utc>) -> Self {
        if !coupon.is_active {
            CouponStatus::Inactive
        } else if coupon.is_expired(now) {
            CouponStatus::Expired
        } else if coupon.is_maxed_out() {
            CouponStatus::MaxedOut
        } else {
            CouponStatus::Active
        }
    }
}

// =============================================================================
// Report Filter
// =============================================================================

/// Optional narrowing of a coupon report.
///
/// Dates are calendar days in UTC and both ends are inclusive.
/// Field names follow the query string (`?start_date=2024-01-01`).
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct ReportFilter {
    #[ts(as = "Option<String>")]
    pub start_date: Option<NaiveDate>,
    #[ts(as = "Option<String>")]
    pub end_date: Option<NaiveDate>,
    pub user_id: Option<String>,
}

impl ReportFilter {
    /// Checks whether `coupon` falls inside the filter.
    pub fn matches(&self, coupon: &Coupon) -> bool {
        let created = coupon.created_at.date_naive();

        if matches!(self.start_date, Some(start) if created < start) {
            return false;
        }
        if matches!(self.end_date, Some(end) if created > end) {
            return false;
        }
        match &self.user_id {
            Some(user_id) => &coupon.created_by_id == user_id,
            None => true,
        }
    }
}

// =============================================================================
// Report Row
// =============================================================================

/// A coupon as shown in the report table and the spreadsheet export.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS)]
#[ts(export)]
#[serde(rename_all = "camelCase")]
pub struct CouponReportRow {
    #[serde(flatten)]
    pub coupon: Coupon,
    /// Absent when the creating user no longer exists.
    pub created_by_username: Option<String>,
    pub status: CouponStatus,
}

impl CouponReportRow {
    pub fn from_coupon(coupon: Coupon, created_by_username: Option<String>, now: DateTime<Utc>) -> Self {
        let status = CouponStatus::of(&coupon, now);
        Self {
            coupon,
            created_by_username,
            status,
        }
    }

    /// `"3/100"` or `"3/∞"` for the usage column.
    pub fn usage_label(&self) -> String {
        match self.coupon.max_usage_count {
            Some(max) => format!("{}/{}", self.coupon.current_usage_count, max),
            None => format!("{}/∞", self.coupon.current_usage_count),
        }
    }
}

// =============================================================================
// Statistics
// =============================================================================

/// Aggregate numbers for the dashboard.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export)]
#[serde(rename_all = "camelCase")]
pub struct CouponStatistics {
    pub total_coupons: i64,
    /// Coupons whose status is [`CouponStatus::Active`].
    pub active_coupons: i64,
    /// Coupons whose status is [`CouponStatus::Expired`].
    pub expired_coupons: i64,
    /// Sum of `current_usage_count`.
    pub total_usage: i64,
    /// Mean `discount_value` to 2 decimal places, half away from zero.
    /// Zero when empty.
    #[ts(type = "number")]
    pub average_discount: Decimal,
}

/// Computes statistics over an already filtered set of coupons.
///
/// ## Example
/// ```rust
/// use chrono::Utc;
/// use coupon_core::report::compute_statistics;
///
/// let stats = compute_statistics(&[], Utc::now());
/// assert_eq!(stats.total_coupons, 0);
/// assert!(stats.average_discount.is_zero());
/// ```
pub fn compute_statistics(coupons: &[Coupon], now: DateTime<Utc>) -> CouponStatistics {
    if coupons.is_empty() {
        return CouponStatistics::default();
    }

    let mut stats = CouponStatistics {
        total_coupons: coupons.len() as i64,
        ..CouponStatistics::default()
    };
    let mut value_sum = Decimal::ZERO;

    for coupon in coupons {
        match CouponStatus::of(coupon, now) {
            CouponStatus::Active => stats.active_coupons += 1,
            CouponStatus::Expired => stats.expired_coupons += 1,
            CouponStatus::Inactive | CouponStatus::MaxedOut => {}
        }
        stats.total_usage += coupon.current_usage_count;
        value_sum += coupon.discount_value;
    }

    stats.average_discount = (value_sum / Decimal::from(coupons.len() as i64))
        .round_dp_with_strategy(2, RoundingStrategy::MidpointAwayFromZero);
    stats
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::DiscountType;
    use chrono::{Duration, TimeZone};

    fn coupon(code: &str, created_at: DateTime<Utc>) -> Coupon {
        Coupon {
            id: format!("id-{code}"),
            code: code.to_string(),
            description: None,
            discount_type: DiscountType::Percentage,
            discount_value: Decimal::from(10),
            expiry_date: None,
            max_usage_count: None,
            current_usage_count: 0,
            is_active: true,
            allow_multiple_discounts: true,
            created_by_id: "u-1".to_string(),
            created_at,
            updated_at: created_at,
        }
    }

    fn day(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    #[test]
    fn test_status_order() {
        let now = Utc::now();
        let mut c = coupon("A", now);
        assert_eq!(CouponStatus::of(&c, now), CouponStatus::Active);

        c.max_usage_count = Some(1);
        c.current_usage_count = 1;
        assert_eq!(CouponStatus::of(&c, now), CouponStatus::MaxedOut);

        c.expiry_date = Some(now - Duration::hours(1));
        assert_eq!(CouponStatus::of(&c, now), CouponStatus::Expired);

        c.is_active = false;
        assert_eq!(CouponStatus::of(&c, now), CouponStatus::Inactive);
    }

    #[test]
    fn test_filter_dates_are_inclusive() {
        let created = Utc.with_ymd_and_hms(2024, 3, 15, 23, 59, 0).unwrap();
        let c = coupon("A", created);

        let filter = ReportFilter {
            start_date: Some(day(2024, 3, 15)),
            end_date: Some(day(2024, 3, 15)),
            user_id: None,
        };
        assert!(filter.matches(&c));

        let filter = ReportFilter {
            start_date: Some(day(2024, 3, 16)),
            ..ReportFilter::default()
        };
        assert!(!filter.matches(&c));

        let filter = ReportFilter {
            end_date: Some(day(2024, 3, 14)),
            ..ReportFilter::default()
        };
        assert!(!filter.matches(&c));
    }

    #[test]
    fn test_filter_by_user() {
        let c = coupon("A", Utc::now());

        let mine = ReportFilter {
            user_id: Some("u-1".to_string()),
            ..ReportFilter::default()
        };
        let theirs = ReportFilter {
            user_id: Some("u-2".to_string()),
            ..ReportFilter::default()
        };

        assert!(mine.matches(&c));
        assert!(!theirs.matches(&c));
        assert!(ReportFilter::default().matches(&c));
    }

    #[test]
    fn test_statistics() {
        let now = Utc::now();

        let active = coupon("A", now);

        let mut expired = coupon("B", now);
        expired.expiry_date = Some(now - Duration::days(1));
        expired.current_usage_count = 4;
        expired.discount_value = Decimal::from(20);

        let mut inactive = coupon("C", now);
        inactive.is_active = false;
        inactive.current_usage_count = 1;
        inactive.discount_value = Decimal::new(501, 2);

        let stats = compute_statistics(&[active, expired, inactive], now);

        assert_eq!(stats.total_coupons, 3);
        assert_eq!(stats.active_coupons, 1);
        assert_eq!(stats.expired_coupons, 1);
        assert_eq!(stats.total_usage, 5);
        // (10 + 20 + 5.01) / 3 = 11.67
        assert_eq!(stats.average_discount, Decimal::new(1167, 2));
    }

    #[test]
    fn test_report_row_json_is_flat() {
        let now = Utc::now();
        let mut c = coupon("A", now);
        c.max_usage_count = Some(100);
        c.current_usage_count = 3;

        let row = CouponReportRow::from_coupon(c, Some("admin".to_string()), now);
        assert_eq!(row.usage_label(), "3/100");

        let json = serde_json::to_value(&row).unwrap();
        assert_eq!(json["code"], "A");
        assert_eq!(json["createdByUsername"], "admin");
        assert_eq!(json["status"], "Active");
    }
}
