//! # Usage Repository
//!
//! Redemption history and usage counters.
//!
//! ## Redemption Transaction
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  BEGIN                                                                  │
//! │    for each applied coupon:                                             │
//! │      INSERT INTO coupon_usage (...)                                     │
//! │      UPDATE coupons SET current_usage_count = current_usage_count + 1   │
//! │  COMMIT                                                                 │
//! │                                                                         │
//! │  Any failure rolls back every row: an order is counted fully or not    │
//! │  at all.                                                                │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! The increment is unconditional. Two concurrent redemptions that both
//! validated against the last remaining use will both succeed.

use chrono::{DateTime, Utc};
use sqlx::SqlitePool;
use tracing::{debug, info};

use crate::error::{DbError, DbResult};
use coupon_core::{CoreError, CouponUsage, Money};

#[derive(Debug, Clone, sqlx::FromRow)]
struct UsageRow {
    id: String,
    coupon_id: String,
    used_at: DateTime<Utc>,
    order_amount: String,
    discount_amount: String,
}

fn parse_amount(field: &str, value: &str) -> Result<Money, CoreError> {
    value.parse().map_err(|_| CoreError::InvalidDecimal {
        field: field.to_string(),
        value: value.to_string(),
    })
}

impl TryFrom<UsageRow> for CouponUsage {
    type Error = CoreError;

    fn try_from(row: UsageRow) -> Result<Self, Self::Error> {
        Ok(CouponUsage {
            order_amount: parse_amount("order_amount", &row.order_amount)?,
            discount_amount: parse_amount("discount_amount", &row.discount_amount)?,
            id: row.id,
            coupon_id: row.coupon_id,
            used_at: row.used_at,
        })
    }
}

/// Repository for redemption records.
#[derive(Debug, Clone)]
pub struct UsageRepository {
    pool: SqlitePool,
}

impl UsageRepository {
    /// Creates a new UsageRepository.
    pub fn new(pool: SqlitePool) -> Self {
        UsageRepository { pool }
    }

    /// Records one order's redemptions atomically.
    ///
    /// ## Returns
    /// * `Err(DbError::NotFound)` - A coupon vanished before commit (nothing written)
    pub async fn record_redemption(&self, usages: &[CouponUsage]) -> DbResult<()> {
        let mut tx = self.pool.begin().await?;

        for usage in usages {
            debug!(coupon_id = %usage.coupon_id, discount = %usage.discount_amount, "Recording usage");

            sqlx::query(
                r#"
                INSERT INTO coupon_usage (
                    id, coupon_id, used_at, order_amount, discount_amount
                ) VALUES (?1, ?2, ?3, ?4, ?5)
                "#,
            )
            .bind(&usage.id)
            .bind(&usage.coupon_id)
            .bind(usage.used_at)
            .bind(usage.order_amount.amount().to_string())
            .bind(usage.discount_amount.amount().to_string())
            .execute(&mut *tx)
            .await?;

            let result = sqlx::query(
                r#"
                UPDATE coupons
                SET current_usage_count = current_usage_count + 1,
                    updated_at = ?2
                WHERE id = ?1
                "#,
            )
            .bind(&usage.coupon_id)
            .bind(usage.used_at)
            .execute(&mut *tx)
            .await?;

            if result.rows_affected() == 0 {
                // Dropping the transaction rolls it back
                return Err(DbError::not_found("Coupon", &usage.coupon_id));
            }
        }

        tx.commit().await?;

        info!(count = usages.len(), "Redemption recorded");
        Ok(())
    }

    /// Lists a coupon's redemptions, newest first.
    pub async fn list_for_coupon(&self, coupon_id: &str) -> DbResult<Vec<CouponUsage>> {
        let rows = sqlx::query_as::<_, UsageRow>(
            r#"
            SELECT id, coupon_id, used_at, order_amount, discount_amount
            FROM coupon_usage
            WHERE coupon_id = ?1
            ORDER BY used_at DESC
            "#,
        )
        .bind(coupon_id)
        .fetch_all(&self.pool)
        .await?;

        rows.into_iter()
            .map(|row| CouponUsage::try_from(row).map_err(DbError::from))
            .collect()
    }
}

// =============================================================================
// Unit Tests
// =============================================================================
