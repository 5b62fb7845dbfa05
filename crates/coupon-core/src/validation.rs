//! # Validation Module
//!
//! Input validation for coupon and user forms.
//!
//! ## Validation Strategy
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                      Validation Layers                                  │
//! │                                                                         │
//! │  Layer 1: Admin panel (TypeScript)                                     │
//! │  └── Immediate user feedback                                           │
//! │           │                                                             │
//! │           ▼                                                             │
//! │  Layer 2: API (Rust)                                                   │
//! │  ├── Type validation (JSON deserialization)                            │
//! │  └── THIS MODULE: form rules                                           │
//! │           │                                                             │
//! │           ▼                                                             │
//! │  Layer 3: Database (SQLite)                                            │
//! │  ├── UNIQUE (coupon code, username)                                    │
//! │  └── Foreign keys                                                      │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! These rules apply to creating and editing coupons. Coupon *codes typed at
//! checkout* are never validated here; an odd code is simply not found.
//!
//! ## Usage
//! ```rust
//! use coupon_core::validation::{validate_coupon_code, validate_username};
//!
//! validate_coupon_code("WELCOME2024").unwrap();
//! validate_username("admin").unwrap();
//! ```

use rust_decimal::Decimal;

use crate::error::ValidationError;
use crate::types::{CouponInput, DiscountType};

/// Result type for validation operations.
pub type ValidationResult<T> = Result<T, ValidationError>;

pub const MAX_CODE_LEN: usize = 50;
pub const MAX_DESCRIPTION_LEN: usize = 500;
pub const MIN_USERNAME_LEN: usize = 3;
pub const MAX_USERNAME_LEN: usize = 50;
pub const MIN_PASSWORD_LEN: usize = 8;
pub const MAX_PASSWORD_LEN: usize = 100;
pub const MAX_DISCOUNT_SCALE: u32 = 2;

// =============================================================================
// Coupon Validators
// =============================================================================

/// Validates a coupon code.
///
/// ## Rules
/// - Must not be empty
/// - At most 50 characters
/// - Only ASCII letters, digits, hyphens and underscores
///
/// ## Example
/// ```rust
/// use coupon_core::validation::validate_coupon_code;
///
/// assert!(validate_coupon_code("SPRING-15").is_ok());
/// assert!(validate_coupon_code("").is_err());
/// assert!(validate_coupon_code("TEN OFF").is_err());
/// ```
pub fn validate_coupon_code(code: &str) -> ValidationResult<()> {
    if code.trim().is_empty() {
        return Err(ValidationError::Required {
            field: "code".to_string(),
        });
    }

    if code.chars().count() > MAX_CODE_LEN {
        return Err(ValidationError::TooLong {
            field: "code".to_string(),
            max: MAX_CODE_LEN,
        });
    }

    if !code
        .chars()
        .all(|c| c.is_ascii_alphanumeric() || c == '-' || c == '_')
    {
        return Err(ValidationError::InvalidFormat {
            field: "code".to_string(),
            reason: "must contain only letters, numbers, hyphens, and underscores".to_string(),
        });
    }

    Ok(())
}

/// Validates a discount value for its type.
///
/// ## Rules
/// - Never negative
/// - At most 2 decimal places (the admin panel's precision)
/// - Percentage: at most 100
/// - FixedAmount: no upper bound (the calculator caps at the order amount)
///
/// ## Example
/// ```rust
/// use coupon_core::types::DiscountType;
/// use coupon_core::validation::validate_discount_value;
/// use rust_decimal::Decimal;
///
/// assert!(validate_discount_value(DiscountType::Percentage, Decimal::new(125, 1)).is_ok());
/// assert!(validate_discount_value(DiscountType::Percentage, Decimal::from(101)).is_err());
/// ```
pub fn validate_discount_value(discount_type: DiscountType, value: Decimal) -> ValidationResult<()> {
    match discount_type {
        DiscountType::Percentage if value < Decimal::ZERO || value > Decimal::ONE_HUNDRED => {
            return Err(ValidationError::OutOfRange {
                field: "discountValue".to_string(),
                min: "0".to_string(),
                max: "100".to_string(),
            });
        }
        DiscountType::FixedAmount if value < Decimal::ZERO => {
            return Err(ValidationError::BelowMinimum {
                field: "discountValue".to_string(),
                min: "0".to_string(),
            });
        }
        _ => {}
    }

    if value.normalize().scale() > MAX_DISCOUNT_SCALE {
        return Err(ValidationError::InvalidFormat {
            field: "discountValue".to_string(),
            reason: format!("at most {MAX_DISCOUNT_SCALE} decimal places"),
        });
    }

    Ok(())
}

/// Validates the whole create/update payload.
///
/// Code uniqueness needs the database and is checked by the caller.
pub fn validate_coupon_input(input: &CouponInput) -> ValidationResult<()> {
    validate_coupon_code(&input.code)?;

    if let Some(description) = &input.description {
        if description.chars().count() > MAX_DESCRIPTION_LEN {
            return Err(ValidationError::TooLong {
                field: "description".to_string(),
                max: MAX_DESCRIPTION_LEN,
            });
        }
    }

    validate_discount_value(input.discount_type, input.discount_value)?;

    if let Some(max) = input.max_usage_count {
        if max < 1 {
            return Err(ValidationError::BelowMinimum {
                field: "maxUsageCount".to_string(),
                min: "1".to_string(),
            });
        }
    }

    Ok(())
}

// =============================================================================
// User Validators
// =============================================================================

/// Validates a username (3 to 50 characters, surrounding spaces ignored).
pub fn validate_username(username: &str) -> ValidationResult<()> {
    let username = username.trim();

    if username.is_empty() {
        return Err(ValidationError::Required {
            field: "username".to_string(),
        });
    }

    let len = username.chars().count();
    if len < MIN_USERNAME_LEN {
        return Err(ValidationError::TooShort {
            field: "username".to_string(),
            min: MIN_USERNAME_LEN,
        });
    }
    if len > MAX_USERNAME_LEN {
        return Err(ValidationError::TooLong {
            field: "username".to_string(),
            max: MAX_USERNAME_LEN,
        });
    }

    Ok(())
}

/// Validates a new password and its confirmation.
///
/// ## Rules
/// - 8 to 100 characters (not trimmed)
/// - `confirm` must be identical
pub fn validate_new_password(password: &str, confirm: &str) -> ValidationResult<()> {
    if password.is_empty() {
        return Err(ValidationError::Required {
            field: "password".to_string(),
        });
    }

    let len = password.chars().count();
    if len < MIN_PASSWORD_LEN {
        return Err(ValidationError::TooShort {
            field: "password".to_string(),
            min: MIN_PASSWORD_LEN,
        });
    }
    if len > MAX_PASSWORD_LEN {
        return Err(ValidationError::TooLong {
            field: "password".to_string(),
            max: MAX_PASSWORD_LEN,
        });
    }

    if password != confirm {
        return Err(ValidationError::Mismatch {
            field: "confirmPassword".to_string(),
            other: "password".to_string(),
        });
    }

    Ok(())
}

// =============================================================================
// Unit Tests
// =============================================================================
