//! Report service.
//!
//! Reads coupons once per request and hands filtering, classification and
//! aggregation to `coupon_core::report`.

use std::sync::Arc;

use chrono::{NaiveDate, Utc};
use serde::Deserialize;

use coupon_core::{compute_statistics, Coupon, CouponReportRow, CouponStatistics, ReportFilter, User};

use crate::error::{ApiError, ApiResult};
use crate::AppState;

/// Query of `GET /api/reports/coupons/by-date`; both ends required.
#[derive(Debug, Clone, Deserialize)]
pub struct DateRangeQuery {
    pub start_date: NaiveDate,
    pub end_date: NaiveDate,
}

impl From<DateRangeQuery> for ReportFilter {
    fn from(range: DateRangeQuery) -> Self {
        ReportFilter {
            start_date: Some(range.start_date),
            end_date: Some(range.end_date),
            user_id: None,
        }
    }
}

/// Report service implementation.
pub struct ReportService {
    state: Arc<AppState>,
}

impl ReportService {
    /// Create a new report service.
    pub fn new(state: Arc<AppState>) -> Self {
        ReportService { state }
    }

    /// Active admin users, ordered by username.
    pub async fn users(&self) -> ApiResult<Vec<User>> {
        Ok(self.state.db.users().list_active().await?)
    }

    /// Report rows matching `filter`, newest first.
    pub async fn coupons(&self, filter: &ReportFilter) -> ApiResult<Vec<CouponReportRow>> {
        check_range(filter)?;

        let now = Utc::now();
        let rows = self
            .state
            .db
            .coupons()
            .list_with_creators()
            .await?
            .into_iter()
            .filter(|(coupon, _)| filter.matches(coupon))
            .map(|(coupon, username)| CouponReportRow::from_coupon(coupon, username, now))
            .collect();

        Ok(rows)
    }

    /// Coupons created by one user, newest first.
    pub async fn coupons_by_user(&self, user_id: &str) -> ApiResult<Vec<CouponReportRow>> {
        let username = self
            .state
            .db
            .users()
            .get_by_id(user_id)
            .await?
            .map(|user| user.username);

        let now = Utc::now();
        let rows = self
            .state
            .db
            .coupons()
            .list_by_creator(user_id)
            .await?
            .into_iter()
            .map(|coupon| CouponReportRow::from_coupon(coupon, username.clone(), now))
            .collect();

        Ok(rows)
    }

    /// Dashboard statistics over the coupons matching `filter`.
    pub async fn statistics(&self, filter: &ReportFilter) -> ApiResult<CouponStatistics> {
        check_range(filter)?;

        let coupons: Vec<Coupon> = self
            .state
            .db
            .coupons()
            .list_all()
            .await?
            .into_iter()
            .filter(|coupon| filter.matches(coupon))
            .collect();

        Ok(compute_statistics(&coupons, Utc::now()))
    }

    /// The filtered report as CSV, one row per coupon.
    pub async fn export_csv(&self, filter: &ReportFilter) -> ApiResult<String> {
        let rows = self.coupons(filter).await?;
        Ok(render_csv(&rows))
    }
}

fn check_range(filter: &ReportFilter) -> ApiResult<()> {
    match (filter.start_date, filter.end_date) {
        (Some(start), Some(end)) if start > end => Err(ApiError::validation(
            "start_date must not be after end_date",
        )),
        _ => Ok(()),
    }
}

// =============================================================================
// CSV Rendering
// =============================================================================

const CSV_HEADER: &str =
    "Code,Description,Discount Type,Discount Value,Usage,Status,Expiry Date,Created By,Created At";

fn render_csv(rows: &[CouponReportRow]) -> String {
    let mut out = String::from(CSV_HEADER);
    out.push_str("\r\n");

    for row in rows {
        let coupon = &row.coupon;
        let fields = [
            coupon.code.clone(),
            coupon.description.clone().unwrap_or_default(),
            coupon.discount_type.to_string(),
            coupon.discount_value.normalize().to_string(),
            row.usage_label(),
            format!("{:?}", row.status),
            coupon
                .expiry_date
                .map(|d| d.format("%Y-%m-%d").to_string())
                .unwrap_or_default(),
            row.created_by_username.clone().unwrap_or_default(),
            coupon.created_at.format("%Y-%m-%d %H:%M").to_string(),
        ];

        let line: Vec<String> = fields.iter().map(|f| csv_field(f)).collect();
        out.push_str(&line.join(","));
        out.push_str("\r\n");
    }

    out
}

/// Quotes a field when it contains a delimiter, quote or line break.
fn csv_field(value: &str) -> String {
    if value.contains([',', '"', '\n', '\r']) {
        format!("\"{}\"", value.replace('"', "\"\""))
    } else {
        value.to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ErrorCode;
    use crate::services::coupon_service::CouponService;
    use crate::services::test_support::{seed_admin, test_state};
    use coupon_core::{CouponInput, CouponStatus, DiscountType};

    fn input(code: &str, value: &str, active: bool) -> CouponInput {
        CouponInput {
            code: code.to_string(),
            description: Some(format!("{code}, the \"best\" deal")),
            discount_type: DiscountType::Percentage,
            discount_value: value.parse().unwrap(),
            expiry_date: None,
            max_usage_count: None,
            is_active: active,
            allow_multiple_discounts: true,
        }
    }

    #[tokio::test]
    async fn test_rows_carry_creator_and_status() {
        let state = test_state().await;
        let admin = seed_admin(&state).await;
        let coupons = CouponService::new(state.clone());
        coupons.create(input("ON", "10", true), &admin.id).await.unwrap();
        coupons.create(input("OFF", "20", false), &admin.id).await.unwrap();

        let reports = ReportService::new(state.clone());
        let rows = reports.coupons_by_user(&admin.id).await.unwrap();

        assert_eq!(rows.len(), 2);
        assert!(rows.iter().all(|r| r.created_by_username.as_deref() == Some("admin")));
        let off = rows.iter().find(|r| r.coupon.code == "OFF").unwrap();
        assert_eq!(off.status, CouponStatus::Inactive);

        assert!(reports.coupons_by_user("someone-else").await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_statistics_over_filter() {
        let state = test_state().await;
        let admin = seed_admin(&state).await;
        let coupons = CouponService::new(state.clone());
        coupons.create(input("ON", "10", true), &admin.id).await.unwrap();
        coupons.create(input("OFF", "20.01", false), &admin.id).await.unwrap();

        let stats = ReportService::new(state)
            .statistics(&ReportFilter::default())
            .await
            .unwrap();

        assert_eq!(stats.total_coupons, 2);
        assert_eq!(stats.active_coupons, 1);
        // (10 + 20.01) / 2 = 15.005, rounded half away from zero
        assert_eq!(stats.average_discount, "15.01".parse::<rust_decimal::Decimal>().unwrap());
    }

    #[tokio::test]
    async fn test_inverted_range_rejected() {
        let state = test_state().await;
        let filter = ReportFilter {
            start_date: NaiveDate::from_ymd_opt(2024, 2, 1),
            end_date: NaiveDate::from_ymd_opt(2024, 1, 1),
            user_id: None,
        };

        let err = ReportService::new(state).coupons(&filter).await.unwrap_err();
        assert_eq!(err.code, ErrorCode::ValidationError);
    }

    #[tokio::test]
    async fn test_csv_export_quotes_fields() {
        let state = test_state().await;
        let admin = seed_admin(&state).await;
        CouponService::new(state.clone())
            .create(input("ON", "10", true), &admin.id)
            .await
            .unwrap();

        let csv = ReportService::new(state)
            .export_csv(&ReportFilter::default())
            .await
            .unwrap();
        let lines: Vec<&str> = csv.split("\r\n").collect();

        assert_eq!(lines[0], CSV_HEADER);
        assert!(lines[1].starts_with("ON,\"ON, the \"\"best\"\" deal\",Percentage,10,0/∞,Active,"));
    }

    #[tokio::test]
    async fn test_csv_export_prints_fractional_values_as_entered() {
        let state = test_state().await;
        let admin = seed_admin(&state).await;
        CouponService::new(state.clone())
            .create(input("HALF", "12.50", true), &admin.id)
            .await
            .unwrap();

        let csv = ReportService::new(state)
            .export_csv(&ReportFilter::default())
            .await
            .unwrap();
        let row = csv.split("\r\n").nth(1).unwrap();

        assert!(row.contains(",Percentage,12.5,"), "{row}");
    }
}
