//! # Coupon Repository
//!
//! Database operations for coupons.
//!
//! ## Key Operations
//! - Lookup by code (validation) and by id (admin panel)
//! - CRUD for the admin panel
//! - Report listings joined with the creating user
//!
//! ## Row Decoding
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  SQLite row ──► CouponRow (sqlx::FromRow) ──► Coupon (TryFrom)         │
//! │                   discount_type: String         discount_type: enum    │
//! │                   discount_value: TEXT          discount_value: Decimal│
//! │                                                                         │
//! │  "Percentage" / "FixedAmount"   → ok                                   │
//! │  anything else                  → CoreError::UnsupportedDiscountType   │
//! │  unparsable discount_value      → CoreError::InvalidDecimal            │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

use std::collections::HashSet;

use chrono::{DateTime, Utc};
use sqlx::{QueryBuilder, Sqlite, SqlitePool};
use tracing::debug;

use crate::error::{DbError, DbResult};
use coupon_core::{Coupon, CoreError};

/// Column list shared by every coupon SELECT.
const COUPON_COLUMNS: &str = r#"
    c.id, c.code, c.description, c.discount_type, c.discount_value,
    c.expiry_date, c.max_usage_count, c.current_usage_count,
    c.is_active, c.allow_multiple_discounts,
    c.created_by_id, c.created_at, c.updated_at
"#;

// =============================================================================
// Row Types
// =============================================================================

/// Raw `coupons` row.
#[derive(Debug, Clone, sqlx::FromRow)]
pub(crate) struct CouponRow {
    id: String,
    code: String,
    description: Option<String>,
    discount_type: String,
    /// Decimal text, exact (`"12.5"`).
    discount_value: String,
    expiry_date: Option<DateTime<Utc>>,
    max_usage_count: Option<i64>,
    current_usage_count: i64,
    is_active: bool,
    allow_multiple_discounts: bool,
    created_by_id: String,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

impl TryFrom<CouponRow> for Coupon {
    type Error = CoreError;

    fn try_from(row: CouponRow) -> Result<Self, Self::Error> {
        Ok(Coupon {
            discount_type: row.discount_type.parse()?,
            discount_value: row.discount_value.parse().map_err(|_| CoreError::InvalidDecimal {
                field: "discount_value".to_string(),
                value: row.discount_value.clone(),
            })?,
            id: row.id,
            code: row.code,
            description: row.description,
            expiry_date: row.expiry_date,
            max_usage_count: row.max_usage_count,
            current_usage_count: row.current_usage_count,
            is_active: row.is_active,
            allow_multiple_discounts: row.allow_multiple_discounts,
            created_by_id: row.created_by_id,
            created_at: row.created_at,
            updated_at: row.updated_at,
        })
    }
}

/// Coupon row joined with the creator's username.
#[derive(Debug, Clone, sqlx::FromRow)]
struct CouponWithCreatorRow {
    #[sqlx(flatten)]
    coupon: CouponRow,
    created_by_username: Option<String>,
}

fn decode_all(rows: Vec<CouponRow>) -> DbResult<Vec<Coupon>> {
    rows.into_iter()
        .map(|row| Coupon::try_from(row).map_err(DbError::from))
        .collect()
}

// =============================================================================
// Repository
// =============================================================================

/// Repository for coupon database operations.
///
/// ## Usage
/// ```rust,ignore
/// let repo = db.coupons();
///
/// let coupon = repo.get_by_code("WELCOME2024").await?;
/// let all = repo.list_all().await?;
/// ```
#[derive(Debug, Clone)]
pub struct CouponRepository {
    pool: SqlitePool,
}

impl CouponRepository {
    /// Creates a new CouponRepository.
    pub fn new(pool: SqlitePool) -> Self {
        CouponRepository { pool }
    }

    /// Lists every coupon, newest first.
    pub async fn list_all(&self) -> DbResult<Vec<Coupon>> {
        let rows = sqlx::query_as::<_, CouponRow>(&format!(
            "SELECT {COUPON_COLUMNS} FROM coupons c ORDER BY c.created_at DESC, c.code"
        ))
        .fetch_all(&self.pool)
        .await?;

        debug!(count = rows.len(), "Listed coupons");
        decode_all(rows)
    }

    /// Gets a coupon by its ID.
    ///
    /// ## Returns
    /// * `Ok(Some(Coupon))` - Coupon found
    /// * `Ok(None)` - Coupon not found
    pub async fn get_by_id(&self, id: &str) -> DbResult<Option<Coupon>> {
        let row = sqlx::query_as::<_, CouponRow>(&format!(
            "SELECT {COUPON_COLUMNS} FROM coupons c WHERE c.id = ?1"
        ))
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(row.map(Coupon::try_from).transpose()?)
    }

    /// Gets a coupon by its exact, case-sensitive code.
    pub async fn get_by_code(&self, code: &str) -> DbResult<Option<Coupon>> {
        debug!(code = %code, "Looking up coupon by code");

        let row = sqlx::query_as::<_, CouponRow>(&format!(
            "SELECT {COUPON_COLUMNS} FROM coupons c WHERE c.code = ?1"
        ))
        .bind(code)
        .fetch_optional(&self.pool)
        .await?;

        Ok(row.map(Coupon::try_from).transpose()?)
    }

    /// Reads the distinct `codes` in one query. Unknown codes are skipped
    /// and the result is unordered.
    ///
    /// The result feeds a `CouponSnapshot` for one validation request.
    pub async fn get_by_codes(&self, codes: &[String]) -> DbResult<Vec<Coupon>> {
        let distinct: HashSet<&str> = codes.iter().map(String::as_str).collect();
        if distinct.is_empty() {
            return Ok(Vec::new());
        }

        debug!(count = distinct.len(), "Looking up coupons by code");

        let mut query: QueryBuilder<Sqlite> =
            QueryBuilder::new(format!("SELECT {COUPON_COLUMNS} FROM coupons c WHERE c.code IN ("));
        let mut separated = query.separated(", ");
        for code in &distinct {
            separated.push_bind(*code);
        }
        separated.push_unseparated(")");

        let rows = query
            .build_query_as::<CouponRow>()
            .fetch_all(&self.pool)
            .await?;

        decode_all(rows)
    }

    /// Checks whether `code` is taken, optionally ignoring one coupon
    /// (the one being edited).
    pub async fn code_exists(&self, code: &str, exclude_id: Option<&str>) -> DbResult<bool> {
        let count: i64 = sqlx::query_scalar(
            "SELECT COUNT(*) FROM coupons WHERE code = ?1 AND (?2 IS NULL OR id <> ?2)",
        )
        .bind(code)
        .bind(exclude_id)
        .fetch_one(&self.pool)
        .await?;

        Ok(count > 0)
    }

    /// Inserts a new coupon.
    ///
    /// ## Returns
    /// * `Ok(Coupon)` - The inserted coupon
    /// * `Err(DbError::UniqueViolation)` - Code already exists
    pub async fn insert(&self, coupon: &Coupon) -> DbResult<Coupon> {
        debug!(code = %coupon.code, "Inserting coupon");

        sqlx::query(
            r#"
            INSERT INTO coupons (
                id, code, description, discount_type, discount_value,
                expiry_date, max_usage_count, current_usage_count,
                is_active, allow_multiple_discounts,
                created_by_id, created_at, updated_at
            ) VALUES (
                ?1, ?2, ?3, ?4, ?5,
                ?6, ?7, ?8,
                ?9, ?10,
                ?11, ?12, ?13
            )
            "#,
        )
        .bind(&coupon.id)
        .bind(&coupon.code)
        .bind(&coupon.description)
        .bind(coupon.discount_type.as_str())
        .bind(coupon.discount_value.to_string())
        .bind(coupon.expiry_date)
        .bind(coupon.max_usage_count)
        .bind(coupon.current_usage_count)
        .bind(coupon.is_active)
        .bind(coupon.allow_multiple_discounts)
        .bind(&coupon.created_by_id)
        .bind(coupon.created_at)
        .bind(coupon.updated_at)
        .execute(&self.pool)
        .await
        .map_err(|e| match DbError::from(e) {
            DbError::UniqueViolation { field, .. } => DbError::duplicate(field, &coupon.code),
            other => other,
        })?;

        Ok(coupon.clone())
    }

    /// Updates the editable fields of an existing coupon.
    ///
    /// Usage counters and creator are left untouched.
    ///
    /// ## Returns
    /// * `Ok(())` - Update successful
    /// * `Err(DbError::NotFound)` - Coupon doesn't exist
    pub async fn update(&self, coupon: &Coupon) -> DbResult<()> {
        debug!(id = %coupon.id, code = %coupon.code, "Updating coupon");

        let result = sqlx::query(
            r#"
            UPDATE coupons SET
                code = ?2,
                description = ?3,
                discount_type = ?4,
                discount_value = ?5,
                expiry_date = ?6,
                max_usage_count = ?7,
                is_active = ?8,
                allow_multiple_discounts = ?9,
                updated_at = ?10
            WHERE id = ?1
            "#,
        )
        .bind(&coupon.id)
        .bind(&coupon.code)
        .bind(&coupon.description)
        .bind(coupon.discount_type.as_str())
        .bind(coupon.discount_value.to_string())
        .bind(coupon.expiry_date)
        .bind(coupon.max_usage_count)
        .bind(coupon.is_active)
        .bind(coupon.allow_multiple_discounts)
        .bind(coupon.updated_at)
        .execute(&self.pool)
        .await?;

        if result.rows_affected() == 0 {
            return Err(DbError::not_found("Coupon", &coupon.id));
        }

        Ok(())
    }

    /// Hard-deletes a coupon. Its usage history goes with it.
    pub async fn delete(&self, id: &str) -> DbResult<()> {
        debug!(id = %id, "Deleting coupon");

        let result = sqlx::query("DELETE FROM coupons WHERE id = ?1")
            .bind(id)
            .execute(&self.pool)
            .await?;

        if result.rows_affected() == 0 {
            return Err(DbError::not_found("Coupon", id));
        }

        Ok(())
    }

    /// Lists coupons created by one user, newest first.
    pub async fn list_by_creator(&self, user_id: &str) -> DbResult<Vec<Coupon>> {
        let rows = sqlx::query_as::<_, CouponRow>(&format!(
            "SELECT {COUPON_COLUMNS} FROM coupons c
             WHERE c.created_by_id = ?1
             ORDER BY c.created_at DESC, c.code"
        ))
        .bind(user_id)
        .fetch_all(&self.pool)
        .await?;

        decode_all(rows)
    }

    /// Lists every coupon with its creator's username, newest first.
    ///
    /// The username is `None` when the creator row is missing.
    pub async fn list_with_creators(&self) -> DbResult<Vec<(Coupon, Option<String>)>> {
        let rows = sqlx::query_as::<_, CouponWithCreatorRow>(&format!(
            "SELECT {COUPON_COLUMNS}, u.username AS created_by_username
             FROM coupons c
             LEFT JOIN users u ON u.id = c.created_by_id
             ORDER BY c.created_at DESC, c.code"
        ))
        .fetch_all(&self.pool)
        .await?;

        rows.into_iter()
            .map(|row| -> DbResult<(Coupon, Option<String>)> {
                let coupon = Coupon::try_from(row.coupon)?;
                Ok((coupon, row.created_by_username))
            })
            .collect()
    }

    /// Counts all coupons.
    pub async fn count(&self) -> DbResult<i64> {
        let count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM coupons")
            .fetch_one(&self.pool)
            .await?;
        Ok(count)
    }
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
pub(crate) mod tests {
    use super::*;
    use crate::repository::user::tests::insert_user;
    use crate::{Database, DbConfig};
    use chrono::Duration;
    use coupon_core::DiscountType;
    use rust_decimal::Decimal;
    use uuid::Uuid;

    pub(crate) fn sample_coupon(code: &str, created_by_id: &str) -> Coupon {
        let now = Utc::now();
        Coupon {
            id: Uuid::new_v4().to_string(),
            code: code.to_string(),
            description: Some(format!("{code} description")),
            discount_type: DiscountType::Percentage,
            discount_value: Decimal::from(10),
            expiry_date: Some(now + Duration::days(30)),
            max_usage_count: Some(100),
            current_usage_count: 0,
            is_active: true,
            allow_multiple_discounts: true,
            created_by_id: created_by_id.to_string(),
            created_at: now,
            updated_at: now,
        }
    }

    async fn setup() -> (Database, String) {
        let db = Database::new(DbConfig::in_memory()).await.unwrap();
        let user = insert_user(&db, "admin").await;
        (db, user.id)
    }

    #[tokio::test]
    async fn test_insert_and_get() {
        let (db, user_id) = setup().await;
        let repo = db.coupons();

        let coupon = sample_coupon("WELCOME2024", &user_id);
        repo.insert(&coupon).await.unwrap();

        let by_id = repo.get_by_id(&coupon.id).await.unwrap().unwrap();
        assert_eq!(by_id.code, "WELCOME2024");
        assert_eq!(by_id.discount_type, DiscountType::Percentage);
        assert_eq!(by_id.expiry_date, coupon.expiry_date);

        let by_code = repo.get_by_code("WELCOME2024").await.unwrap().unwrap();
        assert_eq!(by_code.id, coupon.id);

        // Codes are case-sensitive
        assert!(repo.get_by_code("welcome2024").await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_duplicate_code_is_rejected() {
        let (db, user_id) = setup().await;
        let repo = db.coupons();

        repo.insert(&sample_coupon("DUP", &user_id)).await.unwrap();
        let err = repo.insert(&sample_coupon("DUP", &user_id)).await.unwrap_err();

        assert!(matches!(err, DbError::UniqueViolation { value, .. } if value == "DUP"));
    }

    #[tokio::test]
    async fn test_code_exists_can_exclude_self() {
        let (db, user_id) = setup().await;
        let repo = db.coupons();

        let coupon = sample_coupon("SAVE5", &user_id);
        repo.insert(&coupon).await.unwrap();

        assert!(repo.code_exists("SAVE5", None).await.unwrap());
        assert!(!repo.code_exists("SAVE5", Some(&coupon.id)).await.unwrap());
        assert!(!repo.code_exists("OTHER", None).await.unwrap());
    }

    #[tokio::test]
    async fn test_update_and_delete() {
        let (db, user_id) = setup().await;
        let repo = db.coupons();

        let mut coupon = sample_coupon("SPRING15", &user_id);
        repo.insert(&coupon).await.unwrap();

        coupon.discount_type = DiscountType::FixedAmount;
        coupon.discount_value = Decimal::new(750, 2);
        coupon.is_active = false;
        repo.update(&coupon).await.unwrap();

        let stored = repo.get_by_id(&coupon.id).await.unwrap().unwrap();
        assert_eq!(stored.discount_type, DiscountType::FixedAmount);
        assert_eq!(stored.discount_value, Decimal::new(75, 1));
        assert!(!stored.is_active);

        repo.delete(&coupon.id).await.unwrap();
        assert!(repo.get_by_id(&coupon.id).await.unwrap().is_none());

        let err = repo.delete(&coupon.id).await.unwrap_err();
        assert!(matches!(err, DbError::NotFound { .. }));
    }

    #[tokio::test]
    async fn test_update_missing_coupon() {
        let (db, user_id) = setup().await;

        let err = db
            .coupons()
            .update(&sample_coupon("GHOST", &user_id))
            .await
            .unwrap_err();
        assert!(matches!(err, DbError::NotFound { .. }));
    }

    #[tokio::test]
    async fn test_get_by_codes_skips_unknown_and_duplicates() {
        let (db, user_id) = setup().await;
        let repo = db.coupons();

        repo.insert(&sample_coupon("A", &user_id)).await.unwrap();
        repo.insert(&sample_coupon("B", &user_id)).await.unwrap();

        let codes = vec!["A".to_string(), "GHOST".to_string(), "A".to_string(), "B".to_string()];
        let found = repo.get_by_codes(&codes).await.unwrap();

        let mut found_codes: Vec<_> = found.iter().map(|c| c.code.as_str()).collect();
        found_codes.sort();
        assert_eq!(found_codes, vec!["A", "B"]);

        assert!(repo.get_by_codes(&[]).await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_get_by_codes_handles_long_repetitive_lists() {
        let (db, user_id) = setup().await;
        let repo = db.coupons();

        repo.insert(&sample_coupon("A", &user_id)).await.unwrap();

        let codes: Vec<String> = (0..5_000)
            .map(|i| if i % 2 == 0 { "A".to_string() } else { format!("X{}", i % 7) })
            .collect();
        let found = repo.get_by_codes(&codes).await.unwrap();

        assert_eq!(found.len(), 1);
        assert_eq!(found[0].code, "A");
    }

    #[tokio::test]
    async fn test_fractional_discount_value_survives_storage() {
        let (db, user_id) = setup().await;
        let repo = db.coupons();

        let mut coupon = sample_coupon("HALF", &user_id);
        coupon.discount_value = Decimal::new(125, 1);
        repo.insert(&coupon).await.unwrap();

        let stored = repo.get_by_code("HALF").await.unwrap().unwrap();
        assert_eq!(stored.discount_value, Decimal::new(125, 1));
    }

    #[tokio::test]
    async fn test_unknown_discount_type_in_storage() {
        let (db, user_id) = setup().await;
        let repo = db.coupons();

        let coupon = sample_coupon("WEIRD", &user_id);
        repo.insert(&coupon).await.unwrap();

        sqlx::query("UPDATE coupons SET discount_type = 'percentage' WHERE id = ?1")
            .bind(&coupon.id)
            .execute(db.pool())
            .await
            .unwrap();

        let err = repo.get_by_code("WEIRD").await.unwrap_err();
        assert!(matches!(
            err,
            DbError::Domain(CoreError::UnsupportedDiscountType(tag)) if tag == "percentage"
        ));
    }

    #[tokio::test]
    async fn test_listings_by_creator() {
        let (db, admin_id) = setup().await;
        let other = insert_user(&db, "marketing").await;
        let repo = db.coupons();

        repo.insert(&sample_coupon("ADMIN1", &admin_id)).await.unwrap();
        repo.insert(&sample_coupon("MKT1", &other.id)).await.unwrap();
        repo.insert(&sample_coupon("MKT2", &other.id)).await.unwrap();

        assert_eq!(repo.count().await.unwrap(), 3);
        assert_eq!(repo.list_all().await.unwrap().len(), 3);
        assert_eq!(repo.list_by_creator(&other.id).await.unwrap().len(), 2);

        let joined = repo.list_with_creators().await.unwrap();
        let admin_row = joined.iter().find(|(c, _)| c.code == "ADMIN1").unwrap();
        assert_eq!(admin_row.1.as_deref(), Some("admin"));
    }
}
