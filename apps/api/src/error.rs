//! # API Error Type
//!
//! Unified error type for HTTP handlers.
//!
//! ## Error Handling Strategy
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                    Error Flow in the Coupon API                         │
//! │                                                                         │
//! │  Handler -> Result<T, ApiError>                                         │
//! │         │                                                               │
//! │         ├── DbError::NotFound          ──► 404 NOT_FOUND                │
//! │         ├── DbError::UniqueViolation   ──► 409 CONFLICT                 │
//! │         ├── DbError::QueryFailed ...   ──► 500 DATABASE_ERROR           │
//! │         ├── CoreError (bad stored row) ──► 500 DOMAIN_ERROR             │
//! │         ├── ValidationError            ──► 400 VALIDATION_ERROR         │
//! │         ├── bad JSON / query string    ──► 400 VALIDATION_ERROR         │
//! │         └── missing/invalid token      ──► 401 UNAUTHORIZED             │
//! │                                                                         │
//! │  Body: { "code": "NOT_FOUND", "message": "Coupon not found: 42" }       │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! A coupon that is unknown, expired or cannot be stacked is NOT an error:
//! the validator answers 200 with `isValid: false`.
//!
//! Internal failures are logged with their detail and answered with a
//! generic message.

use axum::extract::rejection::{JsonRejection, QueryRejection};
use axum::extract::{FromRequest, FromRequestParts};
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde::Serialize;

use coupon_core::{CoreError, ValidationError};
use coupon_db::DbError;

/// API error returned from handlers.
///
/// ## Serialization
/// ```json
/// {
///   "code": "CONFLICT",
///   "message": "Coupon code already exists"
/// }
/// ```
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ApiError {
    /// Machine-readable error code for programmatic handling
    pub code: ErrorCode,

    /// Human-readable error message for display
    pub message: String,
}

/// Error codes for API responses.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ErrorCode {
    /// Input validation failed (400)
    ValidationError,

    /// Missing or invalid credentials (401)
    Unauthorized,

    /// Resource not found (404)
    NotFound,

    /// Duplicate code or username (409)
    Conflict,

    /// Database operation failed (500)
    DatabaseError,

    /// Stored data violates a domain rule (500)
    DomainError,

    /// Internal server error (500)
    Internal,
}

impl ErrorCode {
    /// HTTP status for this code.
    pub fn status(self) -> StatusCode {
        match self {
            ErrorCode::ValidationError => StatusCode::BAD_REQUEST,
            ErrorCode::Unauthorized => StatusCode::UNAUTHORIZED,
            ErrorCode::NotFound => StatusCode::NOT_FOUND,
            ErrorCode::Conflict => StatusCode::CONFLICT,
            ErrorCode::DatabaseError | ErrorCode::DomainError | ErrorCode::Internal => {
                StatusCode::INTERNAL_SERVER_ERROR
            }
        }
    }
}

impl ApiError {
    /// Creates a new API error.
    pub fn new(code: ErrorCode, message: impl Into<String>) -> Self {
        ApiError {
            code,
            message: message.into(),
        }
    }

    /// Creates a not found error.
    pub fn not_found(resource: &str, id: &str) -> Self {
        ApiError::new(ErrorCode::NotFound, format!("{} not found: {}", resource, id))
    }

    /// Creates a validation error.
    pub fn validation(message: impl Into<String>) -> Self {
        ApiError::new(ErrorCode::ValidationError, message)
    }

    /// Creates a conflict error.
    pub fn conflict(message: impl Into<String>) -> Self {
        ApiError::new(ErrorCode::Conflict, message)
    }

    /// Creates an authentication error.
    pub fn unauthorized(message: impl Into<String>) -> Self {
        ApiError::new(ErrorCode::Unauthorized, message)
    }

    /// Creates an internal error.
    pub fn internal(message: impl Into<String>) -> Self {
        ApiError::new(ErrorCode::Internal, message)
    }
}

impl std::fmt::Display for ApiError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{:?}: {}", self.code, self.message)
    }
}

impl std::error::Error for ApiError {}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        (self.code.status(), Json(self)).into_response()
    }
}

/// Converts database errors to API errors.
impl From<DbError> for ApiError {
    fn from(err: DbError) -> Self {
        match err {
            DbError::NotFound { entity, id } => ApiError::not_found(&entity, &id),
            DbError::UniqueViolation { field, value } => {
                ApiError::conflict(format!("{} '{}' already exists", field, value))
            }
            DbError::ForeignKeyViolation { message } => {
                tracing::error!("Foreign key violation: {}", message);
                ApiError::validation("Invalid reference")
            }
            DbError::Domain(e) => e.into(),
            DbError::ConnectionFailed(_) => {
                ApiError::new(ErrorCode::DatabaseError, "Database connection failed")
            }
            DbError::MigrationFailed(_) => {
                ApiError::new(ErrorCode::DatabaseError, "Database migration failed")
            }
            DbError::PoolExhausted => {
                ApiError::new(ErrorCode::DatabaseError, "Database pool exhausted")
            }
            DbError::QueryFailed(e) => {
                // Log the actual error but return a generic message
                tracing::error!("Database query failed: {}", e);
                ApiError::new(ErrorCode::DatabaseError, "Database operation failed")
            }
            DbError::Internal(e) => {
                tracing::error!("Internal database error: {}", e);
                ApiError::new(ErrorCode::DatabaseError, "Database operation failed")
            }
        }
    }
}

/// Converts core errors to API errors.
impl From<CoreError> for ApiError {
    fn from(err: CoreError) -> Self {
        match err {
            CoreError::UnsupportedDiscountType(tag) => {
                tracing::error!(tag = %tag, "Unsupported discount type in stored data");
                ApiError::new(
                    ErrorCode::DomainError,
                    format!("Unsupported discount type: {}", tag),
                )
            }
            CoreError::InvalidDecimal { field, value } => {
                tracing::error!(field = %field, value = %value, "Unparsable decimal in stored data");
                ApiError::new(ErrorCode::DomainError, format!("Invalid decimal in {}", field))
            }
            CoreError::StoreUnavailable(e) => {
                tracing::error!("Coupon store unavailable: {}", e);
                ApiError::new(ErrorCode::DatabaseError, "Database operation failed")
            }
            CoreError::Validation(e) => e.into(),
        }
    }
}

/// Converts validation errors to API errors.
impl From<ValidationError> for ApiError {
    fn from(err: ValidationError) -> Self {
        match err {
            ValidationError::Duplicate { .. } => ApiError::conflict(err.to_string()),
            other => ApiError::validation(other.to_string()),
        }
    }
}

impl From<JsonRejection> for ApiError {
    fn from(rejection: JsonRejection) -> Self {
        ApiError::validation(rejection.body_text())
    }
}

impl From<QueryRejection> for ApiError {
    fn from(rejection: QueryRejection) -> Self {
        ApiError::validation(rejection.body_text())
    }
}

/// Result type for handlers.
pub type ApiResult<T> = Result<T, ApiError>;

// =============================================================================
// Extractors
// =============================================================================

/// `Json` whose rejection is a 400 `VALIDATION_ERROR` body.
#[derive(Debug, FromRequest)]
#[from_request(via(axum::Json), rejection(ApiError))]
pub struct ApiJson<T>(pub T);

/// `Query` whose rejection is a 400 `VALIDATION_ERROR` body.
#[derive(Debug, FromRequestParts)]
#[from_request(via(axum::extract::Query), rejection(ApiError))]
pub struct ApiQuery<T>(pub T);

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_db_errors_map_to_codes() {
        let err: ApiError = DbError::not_found("Coupon", "42").into();
        assert_eq!(err.code, ErrorCode::NotFound);
        assert_eq!(err.message, "Coupon not found: 42");

        let err: ApiError = DbError::duplicate("code", "SAVE5").into();
        assert_eq!(err.code, ErrorCode::Conflict);

        let err: ApiError = DbError::QueryFailed("disk I/O error".into()).into();
        assert_eq!(err.code, ErrorCode::DatabaseError);
        assert!(!err.message.contains("disk"));
    }

    #[test]
    fn test_unsupported_discount_type_is_domain_error() {
        let err: ApiError =
            DbError::Domain(CoreError::UnsupportedDiscountType("bogo".into())).into();

        assert_eq!(err.code, ErrorCode::DomainError);
        assert_eq!(err.code.status(), StatusCode::INTERNAL_SERVER_ERROR);
    }

    #[test]
    fn test_unparsable_stored_decimal_is_domain_error() {
        let err: ApiError = DbError::Domain(CoreError::InvalidDecimal {
            field: "discount_value".into(),
            value: "ten".into(),
        })
        .into();

        assert_eq!(err.code, ErrorCode::DomainError);
        assert_eq!(err.message, "Invalid decimal in discount_value");
    }

    #[test]
    fn test_validation_errors_are_bad_requests() {
        let err: ApiError = ValidationError::Required {
            field: "code".into(),
        }
        .into();
        assert_eq!(err.code.status(), StatusCode::BAD_REQUEST);
        assert_eq!(err.message, "code is required");

        let err: ApiError = CoreError::Validation(ValidationError::Duplicate {
            field: "username".into(),
            value: "admin".into(),
        })
        .into();
        assert_eq!(err.code.status(), StatusCode::CONFLICT);
    }

    #[test]
    fn test_serializes_screaming_snake_code() {
        let json = serde_json::to_value(ApiError::validation("bad")).unwrap();
        assert_eq!(json["code"], "VALIDATION_ERROR");
        assert_eq!(json["message"], "bad");
    }
}
