//! # Error Types
//!
//! Domain-specific error types for coupon-core.
//!
//! ## Error Hierarchy
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                         Error Types                                     │
//! │                                                                         │
//! │  coupon-core errors (this file)                                        │
//! │  ├── CoreError        - Hard domain failures                           │
//! │  └── ValidationError  - Input validation failures (CRUD, auth forms)   │
//! │                                                                         │
//! │  coupon-db errors (separate crate)                                     │
//! │  └── DbError          - Database operation failures                    │
//! │                                                                         │
//! │  API errors (apps/api)                                                 │
//! │  └── ApiError         - What the admin panel sees (serialized)         │
//! │                                                                         │
//! │  Flow: ValidationError → CoreError → DbError → ApiError → HTTP         │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Not Everything Is An Error
//! A coupon that does not exist, has expired, or refuses to stack is a
//! normal validation outcome. Those come back as a result with
//! `is_valid: false` and a message, never as a `CoreError`.

use thiserror::Error;

// =============================================================================
// Core Error
// =============================================================================

/// Core business logic errors.
///
/// These are failures the validator cannot turn into a result message.
#[derive(Debug, Error)]
pub enum CoreError {
    /// A discount type tag outside the closed set was read.
    ///
    /// ## When This Occurs
    /// - A row in the coupons table carries a tag other than
    ///   `Percentage` / `FixedAmount`
    /// - A client submits an unknown tag on create/update
    #[error("Unsupported discount type: {0}")]
    UnsupportedDiscountType(String),

    /// A stored amount or discount value is not a decimal number.
    #[error("Invalid decimal in {field}: '{value}'")]
    InvalidDecimal { field: String, value: String },

    /// The coupon store could not be read.
    #[error("Coupon store unavailable: {0}")]
    StoreUnavailable(String),

    /// Validation error (wraps ValidationError).
    #[error("Validation error: {0}")]
    Validation(#[from] ValidationError),
}

// =============================================================================
// Validation Error
// =============================================================================

/// Input validation errors.
///
/// These errors occur when user input doesn't meet requirements.
/// Used for early validation before anything touches the database.
#[derive(Debug, Error)]
pub enum ValidationError {
    /// A required field is missing or empty.
    #[error("{field} is required")]
    Required { field: String },

    /// Field value is too short.
    #[error("{field} must be at least {min} characters")]
    TooShort { field: String, min: usize },

    /// Field value is too long.
    #[error("{field} must be at most {max} characters")]
    TooLong { field: String, max: usize },

    /// Numeric value is out of range.
    #[error("{field} must be between {min} and {max}")]
    OutOfRange { field: String, min: String, max: String },

    /// Numeric value is below its floor (no upper bound).
    #[error("{field} must be at least {min}")]
    BelowMinimum { field: String, min: String },

    /// Invalid format (e.g., coupon code with spaces, invalid date).
    #[error("{field} has invalid format: {reason}")]
    InvalidFormat { field: String, reason: String },

    /// Duplicate value (e.g., duplicate coupon code).
    #[error("{field} '{value}' already exists")]
    Duplicate { field: String, value: String },

    /// Two fields that must match do not (password confirmation).
    #[error("{field} does not match {other}")]
    Mismatch { field: String, other: String },
}

// =============================================================================
// Result Type Alias
// =============================================================================

/// Convenience type alias for Results with CoreError.
pub type CoreResult<T> = Result<T, CoreError>;

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_messages() {
        let err = CoreError::UnsupportedDiscountType("bogo".to_string());
        assert_eq!(err.to_string(), "Unsupported discount type: bogo");
    }

    #[test]
    fn test_validation_error_messages() {
        let err = ValidationError::Required {
            field: "code".to_string(),
        };
        assert_eq!(err.to_string(), "code is required");

        let err = ValidationError::TooShort {
            field: "password".to_string(),
            min: 8,
        };
        assert_eq!(err.to_string(), "password must be at least 8 characters");

        let err = ValidationError::Mismatch {
            field: "confirmPassword".to_string(),
            other: "password".to_string(),
        };
        assert_eq!(err.to_string(), "confirmPassword does not match password");

        let err = ValidationError::OutOfRange {
            field: "discountValue".to_string(),
            min: "0".to_string(),
            max: "100".to_string(),
        };
        assert_eq!(err.to_string(), "discountValue must be between 0 and 100");
    }

    #[test]
    fn test_validation_converts_to_core_error() {
        let validation_err = ValidationError::Required {
            field: "code".to_string(),
        };
        let core_err: CoreError = validation_err.into();
        assert!(matches!(core_err, CoreError::Validation(_)));
    }
}
