//! Coupon routes: public validation plus authenticated administration.

use std::sync::Arc;

use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::routing::{get, post};
use axum::{Json, Router};

use coupon_core::{Coupon, CouponInput, CouponValidationResult, MultiCouponValidationResult};

use crate::auth::AuthUser;
use crate::error::{ApiJson, ApiResult};
use crate::services::coupon_service::{CouponService, MultiCouponRequest, ValidateCouponRequest};
use crate::AppState;

pub fn router() -> Router<Arc<AppState>> {
    Router::new()
        .route("/api/coupons", get(list_coupons).post(create_coupon))
        .route("/api/coupons/validate", post(validate))
        .route("/api/coupons/validate-multiple", post(validate_multiple))
        .route("/api/coupons/can-combine", post(can_combine))
        .route("/api/coupons/redeem", post(redeem))
        .route(
            "/api/coupons/{id}",
            get(get_coupon).put(update_coupon).delete(delete_coupon),
        )
}

// =============================================================================
// Validation (public)
// =============================================================================

async fn validate(
    State(state): State<Arc<AppState>>,
    ApiJson(request): ApiJson<ValidateCouponRequest>,
) -> ApiResult<Json<CouponValidationResult>> {
    Ok(Json(CouponService::new(state).validate(&request).await?))
}

async fn validate_multiple(
    State(state): State<Arc<AppState>>,
    ApiJson(request): ApiJson<MultiCouponRequest>,
) -> ApiResult<Json<MultiCouponValidationResult>> {
    Ok(Json(CouponService::new(state).validate_multiple(&request).await?))
}

async fn can_combine(
    State(state): State<Arc<AppState>>,
    ApiJson(codes): ApiJson<Vec<String>>,
) -> ApiResult<Json<bool>> {
    Ok(Json(CouponService::new(state).can_combine(&codes).await?))
}

// =============================================================================
// Redemption and administration (authenticated)
// =============================================================================

async fn redeem(
    State(state): State<Arc<AppState>>,
    _user: AuthUser,
    ApiJson(request): ApiJson<MultiCouponRequest>,
) -> ApiResult<Json<MultiCouponValidationResult>> {
    Ok(Json(CouponService::new(state).redeem(&request).await?))
}

async fn list_coupons(
    State(state): State<Arc<AppState>>,
    _user: AuthUser,
) -> ApiResult<Json<Vec<Coupon>>> {
    Ok(Json(CouponService::new(state).list().await?))
}

async fn get_coupon(
    State(state): State<Arc<AppState>>,
    _user: AuthUser,
    Path(id): Path<String>,
) -> ApiResult<Json<Coupon>> {
    Ok(Json(CouponService::new(state).get(&id).await?))
}

async fn create_coupon(
    State(state): State<Arc<AppState>>,
    user: AuthUser,
    ApiJson(input): ApiJson<CouponInput>,
) -> ApiResult<(StatusCode, Json<Coupon>)> {
    let coupon = CouponService::new(state).create(input, &user.user_id).await?;
    Ok((StatusCode::CREATED, Json(coupon)))
}

async fn update_coupon(
    State(state): State<Arc<AppState>>,
    _user: AuthUser,
    Path(id): Path<String>,
    ApiJson(input): ApiJson<CouponInput>,
) -> ApiResult<Json<Coupon>> {
    Ok(Json(CouponService::new(state).update(&id, input).await?))
}

async fn delete_coupon(
    State(state): State<Arc<AppState>>,
    _user: AuthUser,
    Path(id): Path<String>,
) -> ApiResult<StatusCode> {
    CouponService::new(state).delete(&id).await?;
    Ok(StatusCode::NO_CONTENT)
}
