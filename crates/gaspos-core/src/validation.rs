//! # Validation Module
//!
//! Input validation utilities for GasPOS payroll.
//!
//! ## Validation Strategy
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                      Validation Layers                                  │
//! │                                                                         │
//! │  Layer 1: Frontend (TypeScript)                                        │
//! │  ├── Basic format checks (empty, length)                               │
//! │  └── Immediate user feedback                                           │
//! │           │                                                             │
//! │           ▼                                                             │
//! │  Layer 2: THIS MODULE: Business rule validation                        │
//! │  └── Runs before any engine or repository call                         │
//! │           │                                                             │
//! │           ▼                                                             │
//! │  Layer 3: Database (SQLite)                                            │
//! │  ├── NOT NULL constraints                                              │
//! │  ├── UNIQUE constraints                                                │
//! │  └── Foreign key constraints                                           │
//! │                                                                         │
//! │  Defense in depth: Multiple layers catch different errors              │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! Note the asymmetry with attendance data: operator *input* is validated
//! strictly here, while historical clock data is computed through with
//! zero defaults (see [`crate::shift`]). A typo in a new employee form is
//! fixable at entry time; a malformed punch from last Tuesday is not.
//!
//! ## Usage
//! ```rust
//! use gaspos_core::validation::{validate_employee_name, validate_pin};
//!
//! validate_employee_name("Dela Cruz, Juan").unwrap();
//! validate_pin("1234").unwrap();
//! ```

use crate::error::ValidationError;
use crate::money::Money;
use crate::{MAX_DAILY_RATE_CENTS, PIN_LENGTH};

/// Result type for validation operations.
pub type ValidationResult<T> = Result<T, ValidationError>;

// =============================================================================
// String Validators
// =============================================================================

/// Validates an employee display name.
///
/// ## Rules
/// - Must not be empty
/// - Must be between 1 and 200 characters
///
/// ## Example
/// ```rust
/// use gaspos_core::validation::validate_employee_name;
///
/// assert!(validate_employee_name("Dela Cruz, Juan").is_ok());
/// assert!(validate_employee_name("").is_err());
/// ```
pub fn validate_employee_name(name: &str) -> ValidationResult<()> {
    let name = name.trim();

    if name.is_empty() {
        return Err(ValidationError::Required {
            field: "name".to_string(),
        });
    }

    if name.len() > 200 {
        return Err(ValidationError::TooLong {
            field: "name".to_string(),
            max: 200,
        });
    }

    Ok(())
}

/// Validates a store identifier.
///
/// ## Rules
/// - Must not be empty
/// - Must be between 1 and 50 characters
/// - Alphanumeric, hyphens, and underscores only
pub fn validate_store_id(store_id: &str) -> ValidationResult<()> {
    let store_id = store_id.trim();

    if store_id.is_empty() {
        return Err(ValidationError::Required {
            field: "store_id".to_string(),
        });
    }

    if store_id.len() > 50 {
        return Err(ValidationError::TooLong {
            field: "store_id".to_string(),
            max: 50,
        });
    }

    if !store_id
        .chars()
        .all(|c| c.is_alphanumeric() || c == '-' || c == '_')
    {
        return Err(ValidationError::InvalidFormat {
            field: "store_id".to_string(),
            reason: "must contain only letters, numbers, hyphens, and underscores".to_string(),
        });
    }

    Ok(())
}

/// Validates a terminal clock-in PIN.
///
/// ## Rules
/// - Exactly [`PIN_LENGTH`] characters
/// - Digits only
///
/// ## Example
/// ```rust
/// use gaspos_core::validation::validate_pin;
///
/// assert!(validate_pin("1234").is_ok());
/// assert!(validate_pin("12a4").is_err());
/// assert!(validate_pin("12345").is_err());
/// ```
pub fn validate_pin(pin: &str) -> ValidationResult<()> {
    if pin.len() != PIN_LENGTH || !pin.chars().all(|c| c.is_ascii_digit()) {
        return Err(ValidationError::InvalidFormat {
            field: "pin".to_string(),
            reason: format!("must be exactly {PIN_LENGTH} digits"),
        });
    }

    Ok(())
}

/// Validates a scheduled shift time string.
///
/// ## Rules
/// - `HH:MM`, 24-hour clock
///
/// Only employee-form input goes through this; stored punches bypass it and
/// degrade to zero minutes when malformed.
pub fn validate_shift_time(time: &str) -> ValidationResult<()> {
    let valid = match time.split_once(':') {
        Some((h, m)) => {
            h.len() == 2
                && m.len() == 2
                && h.parse::<u32>().is_ok_and(|h| h < 24)
                && m.parse::<u32>().is_ok_and(|m| m < 60)
        }
        None => false,
    };

    if !valid {
        return Err(ValidationError::InvalidFormat {
            field: "shift time".to_string(),
            reason: "must be HH:MM in 24-hour clock".to_string(),
        });
    }

    Ok(())
}

// =============================================================================
// Numeric Validators
// =============================================================================

/// Validates a daily salary rate.
///
/// ## Rules
/// - Must be positive
/// - Capped at [`MAX_DAILY_RATE_CENTS`] as a fat-finger guard
pub fn validate_daily_rate(rate: Money) -> ValidationResult<()> {
    if !rate.is_positive() {
        return Err(ValidationError::MustBePositive {
            field: "daily rate".to_string(),
        });
    }

    if rate.cents() > MAX_DAILY_RATE_CENTS {
        return Err(ValidationError::OutOfRange {
            field: "daily rate".to_string(),
            min: 1,
            max: MAX_DAILY_RATE_CENTS,
        });
    }

    Ok(())
}

/// Validates a credit grant amount (loan, vale, or SSS).
///
/// ## Rules
/// - Must be strictly positive; balance decreases happen only through
///   payroll finalization, never through a negative grant
pub fn validate_credit_amount(amount: Money) -> ValidationResult<()> {
    if !amount.is_positive() {
        return Err(ValidationError::MustBePositive {
            field: "credit amount".to_string(),
        });
    }

    Ok(())
}

// =============================================================================
// Unit Tests
// =============================================================================
