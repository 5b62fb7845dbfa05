//! Report routes (all authenticated).

use std::sync::Arc;

use axum::extract::{Path, State};
use axum::http::header;
use axum::response::IntoResponse;
use axum::routing::get;
use axum::{Json, Router};

use coupon_core::{CouponReportRow, CouponStatistics, ReportFilter, User};

use crate::auth::AuthUser;
use crate::error::{ApiQuery, ApiResult};
use crate::services::report_service::{DateRangeQuery, ReportService};
use crate::AppState;

pub fn router() -> Router<Arc<AppState>> {
    Router::new()
        .route("/api/reports/users", get(users))
        .route("/api/reports/coupons", get(coupons))
        .route("/api/reports/coupons/by-user/{user_id}", get(coupons_by_user))
        .route("/api/reports/coupons/by-date", get(coupons_by_date))
        .route("/api/reports/coupons/export", get(export))
        .route("/api/reports/statistics", get(statistics))
}

async fn users(State(state): State<Arc<AppState>>, _user: AuthUser) -> ApiResult<Json<Vec<User>>> {
    Ok(Json(ReportService::new(state).users().await?))
}

async fn coupons(
    State(state): State<Arc<AppState>>,
    _user: AuthUser,
    ApiQuery(filter): ApiQuery<ReportFilter>,
) -> ApiResult<Json<Vec<CouponReportRow>>> {
    Ok(Json(ReportService::new(state).coupons(&filter).await?))
}

async fn coupons_by_user(
    State(state): State<Arc<AppState>>,
    _user: AuthUser,
    Path(user_id): Path<String>,
) -> ApiResult<Json<Vec<CouponReportRow>>> {
    Ok(Json(ReportService::new(state).coupons_by_user(&user_id).await?))
}

async fn coupons_by_date(
    State(state): State<Arc<AppState>>,
    _user: AuthUser,
    ApiQuery(range): ApiQuery<DateRangeQuery>,
) -> ApiResult<Json<Vec<CouponReportRow>>> {
    Ok(Json(ReportService::new(state).coupons(&range.into()).await?))
}

async fn export(
    State(state): State<Arc<AppState>>,
    _user: AuthUser,
    ApiQuery(filter): ApiQuery<ReportFilter>,
) -> ApiResult<impl IntoResponse> {
    let csv = ReportService::new(state).export_csv(&filter).await?;
    Ok((
        [
            (header::CONTENT_TYPE, "text/csv; charset=utf-8"),
            (
                header::CONTENT_DISPOSITION,
                "attachment; filename=\"coupons_report.csv\"",
            ),
        ],
        csv,
    ))
}

async fn statistics(
    State(state): State<Arc<AppState>>,
    _user: AuthUser,
    ApiQuery(filter): ApiQuery<ReportFilter>,
) -> ApiResult<Json<CouponStatistics>> {
    Ok(Json(ReportService::new(state).statistics(&filter).await?))
}
