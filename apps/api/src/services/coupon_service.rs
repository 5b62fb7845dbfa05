//! Coupon service: validation, redemption and administration.
//!
//! Validation reads the requested codes from the database once per request,
//! freezes them in a [`CouponSnapshot`] and runs the pure validator over it.
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  codes ──► CouponRepository::get_by_codes ──► CouponSnapshot            │
//! │                                                     │                   │
//! │                          CouponValidator::new(&snapshot, Utc::now())    │
//! │                                                     │                   │
//! │                 validate / validate_all / can_combine                   │
//! │                                                     │                   │
//! │  redeem only:            UsageRepository::record_redemption (1 tx)      │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

use std::sync::Arc;

use chrono::Utc;
use serde::{Deserialize, Serialize};
use tracing::{debug, info};
use uuid::Uuid;

use coupon_core::validation::validate_coupon_input;
use coupon_core::{
    Coupon, CouponInput, CouponLookup, CouponSnapshot, CouponUsage, CouponValidationResult,
    CouponValidator, Money, MultiCouponValidationResult,
};
use coupon_db::DbError;

use crate::error::{ApiError, ApiResult};
use crate::AppState;

const MSG_CODE_EXISTS: &str = "Coupon code already exists";

/// Upper bound on codes in one request. Keeps the `IN (...)` lookup well
/// under SQLite's bound-parameter limit.
pub const MAX_CODES_PER_REQUEST: usize = 100;

/// Body of `POST /api/coupons/validate`.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ValidateCouponRequest {
    pub code: String,
    pub order_amount: Money,
    #[serde(default)]
    pub previously_applied_coupons: Vec<String>,
}

/// Body of `POST /api/coupons/validate-multiple` and `/redeem`.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MultiCouponRequest {
    pub coupon_codes: Vec<String>,
    pub order_amount: Money,
}

/// Coupon service implementation.
pub struct CouponService {
    state: Arc<AppState>,
}

impl CouponService {
    /// Create a new coupon service.
    pub fn new(state: Arc<AppState>) -> Self {
        CouponService { state }
    }

    async fn snapshot(&self, codes: &[String]) -> ApiResult<CouponSnapshot> {
        if codes.len() > MAX_CODES_PER_REQUEST {
            return Err(ApiError::validation(format!(
                "At most {} coupon codes per request",
                MAX_CODES_PER_REQUEST
            )));
        }

        let coupons = self.state.db.coupons().get_by_codes(codes).await?;
        debug!(requested = codes.len(), found = coupons.len(), "Coupon snapshot loaded");
        Ok(CouponSnapshot::from_coupons(coupons))
    }

    // =========================================================================
    // Validation
    // =========================================================================

    /// Validates one code against an order amount.
    pub async fn validate(&self, request: &ValidateCouponRequest) -> ApiResult<CouponValidationResult> {
        let snapshot = self.snapshot(std::slice::from_ref(&request.code)).await?;
        let validator = CouponValidator::new(&snapshot, Utc::now());

        Ok(validator.validate(
            &request.code,
            request.order_amount,
            &request.previously_applied_coupons,
        )?)
    }

    /// Applies several codes in order against one order amount.
    pub async fn validate_multiple(
        &self,
        request: &MultiCouponRequest,
    ) -> ApiResult<MultiCouponValidationResult> {
        let snapshot = self.snapshot(&request.coupon_codes).await?;
        let validator = CouponValidator::new(&snapshot, Utc::now());

        Ok(validator.validate_all(&request.coupon_codes, request.order_amount)?)
    }

    /// Checks whether the codes may be used together.
    pub async fn can_combine(&self, codes: &[String]) -> ApiResult<bool> {
        let snapshot = self.snapshot(codes).await?;
        let validator = CouponValidator::new(&snapshot, Utc::now());

        Ok(validator.can_combine(codes)?)
    }

    /// Validates the codes and, when valid, records one usage per coupon.
    ///
    /// An invalid result is returned as-is and nothing is written.
    pub async fn redeem(&self, request: &MultiCouponRequest) -> ApiResult<MultiCouponValidationResult> {
        let snapshot = self.snapshot(&request.coupon_codes).await?;
        let now = Utc::now();
        let result = CouponValidator::new(&snapshot, now)
            .validate_all(&request.coupon_codes, request.order_amount)?;

        if !result.is_valid {
            return Ok(result);
        }

        let mut usages = Vec::with_capacity(result.applied_coupons.len());
        for applied in &result.applied_coupons {
            let coupon = snapshot
                .find_by_code(&applied.code)?
                .ok_or_else(|| ApiError::internal(format!("Applied coupon vanished: {}", applied.code)))?;

            usages.push(CouponUsage {
                id: Uuid::new_v4().to_string(),
                coupon_id: coupon.id,
                used_at: now,
                // The amount this coupon was applied to
                order_amount: applied.final_amount + applied.discount_amount,
                discount_amount: applied.discount_amount,
            });
        }

        self.state.db.usage().record_redemption(&usages).await?;

        info!(
            coupons = usages.len(),
            order_amount = %request.order_amount,
            total_discount = %result.total_discount_amount,
            "Coupons redeemed"
        );

        Ok(result)
    }

    // =========================================================================
    // Administration
    // =========================================================================

    /// Lists every coupon, newest first.
    pub async fn list(&self) -> ApiResult<Vec<Coupon>> {
        Ok(self.state.db.coupons().list_all().await?)
    }

    /// Fetches a coupon by id.
    pub async fn get(&self, id: &str) -> ApiResult<Coupon> {
        self.state
            .db
            .coupons()
            .get_by_id(id)
            .await?
            .ok_or_else(|| ApiError::not_found("Coupon", id))
    }

    /// Creates a coupon owned by `user_id`.
    pub async fn create(&self, input: CouponInput, user_id: &str) -> ApiResult<Coupon> {
        validate_coupon_input(&input)?;

        if self.state.db.coupons().code_exists(&input.code, None).await? {
            return Err(ApiError::conflict(MSG_CODE_EXISTS));
        }

        let now = Utc::now();
        let coupon = Coupon {
            id: Uuid::new_v4().to_string(),
            code: input.code,
            description: input.description,
            discount_type: input.discount_type,
            discount_value: input.discount_value,
            expiry_date: input.expiry_date,
            max_usage_count: input.max_usage_count,
            current_usage_count: 0,
            is_active: input.is_active,
            allow_multiple_discounts: input.allow_multiple_discounts,
            created_by_id: user_id.to_string(),
            created_at: now,
            updated_at: now,
        };

        let coupon = self
            .state
            .db
            .coupons()
            .insert(&coupon)
            .await
            .map_err(map_duplicate_code)?;

        info!(code = %coupon.code, created_by = %user_id, "Coupon created");
        Ok(coupon)
    }

    /// Replaces a coupon's editable fields.
    ///
    /// Usage counters, creator and creation time are kept.
    pub async fn update(&self, id: &str, input: CouponInput) -> ApiResult<Coupon> {
        validate_coupon_input(&input)?;

        let existing = self.get(id).await?;

        if self.state.db.coupons().code_exists(&input.code, Some(id)).await? {
            return Err(ApiError::conflict(MSG_CODE_EXISTS));
        }

        let coupon = Coupon {
            code: input.code,
            description: input.description,
            discount_type: input.discount_type,
            discount_value: input.discount_value,
            expiry_date: input.expiry_date,
            max_usage_count: input.max_usage_count,
            is_active: input.is_active,
            allow_multiple_discounts: input.allow_multiple_discounts,
            updated_at: Utc::now(),
            ..existing
        };

        self.state
            .db
            .coupons()
            .update(&coupon)
            .await
            .map_err(map_duplicate_code)?;

        info!(id = %id, code = %coupon.code, "Coupon updated");
        Ok(coupon)
    }

    /// Deletes a coupon and its usage history.
    pub async fn delete(&self, id: &str) -> ApiResult<()> {
        self.state.db.coupons().delete(id).await?;
        info!(id = %id, "Coupon deleted");
        Ok(())
    }
}

/// A concurrent insert can still trip the unique index after `code_exists`.
fn map_duplicate_code(err: DbError) -> ApiError {
    match err {
        DbError::UniqueViolation { .. } => ApiError::conflict(MSG_CODE_EXISTS),
        other => other.into(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ErrorCode;
    use crate::services::test_support::{seed_admin, test_state};
    use chrono::Duration;
    use coupon_core::DiscountType;

    fn input(code: &str, discount_type: DiscountType, value: &str, stackable: bool) -> CouponInput {
        CouponInput {
            code: code.to_string(),
            description: None,
            discount_type,
            discount_value: value.parse().unwrap(),
            expiry_date: Some(Utc::now() + Duration::days(30)),
            max_usage_count: Some(10),
            is_active: true,
            allow_multiple_discounts: stackable,
        }
    }

    fn codes(list: &[&str]) -> Vec<String> {
        list.iter().map(|c| c.to_string()).collect()
    }

    #[tokio::test]
    async fn test_validate_reads_live_coupon() {
        let state = test_state().await;
        let admin = seed_admin(&state).await;
        let service = CouponService::new(state.clone());

        service
            .create(input("WELCOME2024", DiscountType::Percentage, "10", false), &admin.id)
            .await
            .unwrap();

        let result = service
            .validate(&ValidateCouponRequest {
                code: "WELCOME2024".into(),
                order_amount: Money::from(100),
                previously_applied_coupons: vec![],
            })
            .await
            .unwrap();

        assert!(result.is_valid);
        assert_eq!(result.discount_amount, Some(Money::from(10)));
        assert_eq!(result.final_amount, Some(Money::from(90)));
    }

    #[tokio::test]
    async fn test_redeem_records_usage_per_coupon() {
        let state = test_state().await;
        let admin = seed_admin(&state).await;
        let service = CouponService::new(state.clone());

        let a = service
            .create(input("A", DiscountType::Percentage, "10", true), &admin.id)
            .await
            .unwrap();
        let b = service
            .create(input("B", DiscountType::FixedAmount, "5", true), &admin.id)
            .await
            .unwrap();

        let result = service
            .redeem(&MultiCouponRequest {
                coupon_codes: codes(&["A", "B"]),
                order_amount: Money::from(100),
            })
            .await
            .unwrap();

        assert!(result.is_valid);
        assert_eq!(result.final_amount, Money::from(85));
        assert_eq!(service.get(&a.id).await.unwrap().current_usage_count, 1);
        assert_eq!(service.get(&b.id).await.unwrap().current_usage_count, 1);

        let history = state.db.usage().list_for_coupon(&b.id).await.unwrap();
        assert_eq!(history.len(), 1);
        // B was applied to the total left after A
        assert_eq!(history[0].order_amount, Money::from(90));
        assert_eq!(history[0].discount_amount, Money::from(5));
    }

    #[tokio::test]
    async fn test_invalid_redeem_writes_nothing() {
        let state = test_state().await;
        let admin = seed_admin(&state).await;
        let service = CouponService::new(state.clone());

        let a = service
            .create(input("A", DiscountType::Percentage, "10", true), &admin.id)
            .await
            .unwrap();

        let result = service
            .redeem(&MultiCouponRequest {
                coupon_codes: codes(&["A", "GHOST"]),
                order_amount: Money::from(100),
            })
            .await
            .unwrap();

        assert!(!result.is_valid);
        assert_eq!(service.get(&a.id).await.unwrap().current_usage_count, 0);
    }

    #[tokio::test]
    async fn test_redeem_until_cap_then_not_valid() {
        let state = test_state().await;
        let admin = seed_admin(&state).await;
        let service = CouponService::new(state.clone());

        let mut once = input("ONCE", DiscountType::FixedAmount, "1", false);
        once.max_usage_count = Some(1);
        service.create(once, &admin.id).await.unwrap();

        let request = MultiCouponRequest {
            coupon_codes: codes(&["ONCE"]),
            order_amount: Money::from(10),
        };

        assert!(service.redeem(&request).await.unwrap().is_valid);

        let second = service.redeem(&request).await.unwrap();
        assert!(!second.is_valid);
        assert_eq!(
            second.message.as_deref(),
            Some("Coupon ONCE: Coupon is not valid for use")
        );
    }

    #[tokio::test]
    async fn test_duplicate_code_conflicts() {
        let state = test_state().await;
        let admin = seed_admin(&state).await;
        let service = CouponService::new(state.clone());

        service
            .create(input("SAVE5", DiscountType::FixedAmount, "5", true), &admin.id)
            .await
            .unwrap();

        let err = service
            .create(input("SAVE5", DiscountType::FixedAmount, "7", true), &admin.id)
            .await
            .unwrap_err();

        assert_eq!(err.code, ErrorCode::Conflict);
        assert_eq!(err.message, "Coupon code already exists");
    }

    #[tokio::test]
    async fn test_update_keeps_counters_and_checks_other_codes() {
        let state = test_state().await;
        let admin = seed_admin(&state).await;
        let service = CouponService::new(state.clone());

        let a = service
            .create(input("A", DiscountType::Percentage, "10", true), &admin.id)
            .await
            .unwrap();
        service
            .create(input("B", DiscountType::Percentage, "10", true), &admin.id)
            .await
            .unwrap();

        // Renaming onto another coupon's code is refused
        let err = service
            .update(&a.id, input("B", DiscountType::Percentage, "10", true))
            .await
            .unwrap_err();
        assert_eq!(err.code, ErrorCode::Conflict);

        // Keeping its own code is fine
        let updated = service
            .update(&a.id, input("A", DiscountType::FixedAmount, "2.5", false))
            .await
            .unwrap();
        assert_eq!(updated.discount_type, DiscountType::FixedAmount);
        assert_eq!(updated.created_by_id, admin.id);
        assert_eq!(updated.current_usage_count, 0);
        assert_eq!(
            service.get(&a.id).await.unwrap().discount_value,
            "2.50".parse::<rust_decimal::Decimal>().unwrap()
        );
    }

    #[tokio::test]
    async fn test_invalid_input_rejected_before_write() {
        let state = test_state().await;
        let admin = seed_admin(&state).await;
        let service = CouponService::new(state.clone());

        let err = service
            .create(input("TOO MUCH", DiscountType::Percentage, "200", true), &admin.id)
            .await
            .unwrap_err();

        assert_eq!(err.code, ErrorCode::ValidationError);
        assert!(service.list().await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_stacked_redemption_keeps_sub_cent_amounts() {
        let state = test_state().await;
        let admin = seed_admin(&state).await;
        let service = CouponService::new(state.clone());

        service
            .create(input("A", DiscountType::Percentage, "15", true), &admin.id)
            .await
            .unwrap();
        let b = service
            .create(input("B", DiscountType::Percentage, "15", true), &admin.id)
            .await
            .unwrap();

        let result = service
            .redeem(&MultiCouponRequest {
                coupon_codes: codes(&["A", "B"]),
                order_amount: "0.99".parse().unwrap(),
            })
            .await
            .unwrap();

        assert_eq!(result.final_amount, "0.715275".parse().unwrap());

        let history = state.db.usage().list_for_coupon(&b.id).await.unwrap();
        assert_eq!(history[0].order_amount, "0.8415".parse().unwrap());
        assert_eq!(history[0].discount_amount, "0.126225".parse().unwrap());
    }

    #[tokio::test]
    async fn test_too_many_codes_rejected() {
        let state = test_state().await;
        let service = CouponService::new(state);

        let request = MultiCouponRequest {
            coupon_codes: vec!["A".to_string(); MAX_CODES_PER_REQUEST + 1],
            order_amount: Money::from(100),
        };

        let err = service.validate_multiple(&request).await.unwrap_err();
        assert_eq!(err.code, ErrorCode::ValidationError);

        let err = service.can_combine(&request.coupon_codes).await.unwrap_err();
        assert_eq!(err.code, ErrorCode::ValidationError);

        // The limit itself is accepted
        let request = MultiCouponRequest {
            coupon_codes: vec!["A".to_string(); MAX_CODES_PER_REQUEST],
            order_amount: Money::from(100),
        };
        assert!(!service.validate_multiple(&request).await.unwrap().is_valid);
    }

    #[tokio::test]
    async fn test_missing_coupon_is_not_found() {
        let state = test_state().await;
        let service = CouponService::new(state);

        assert_eq!(service.get("nope").await.unwrap_err().code, ErrorCode::NotFound);
        assert_eq!(service.delete("nope").await.unwrap_err().code, ErrorCode::NotFound);
    }
}
