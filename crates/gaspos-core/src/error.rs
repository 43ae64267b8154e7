//! # Error Types
//!
//! Domain-specific error types for gaspos-core.
//!
//! ## Error Hierarchy
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                         Error Types                                     │
//! │                                                                         │
//! │  gaspos-core errors (this file)                                        │
//! │  ├── PayrollError     - Payroll state-transition failures              │
//! │  └── ValidationError  - Input validation failures                      │
//! │                                                                         │
//! │  gaspos-db errors (separate crate)                                     │
//! │  └── DbError          - Database operation failures                    │
//! │                                                                         │
//! │  Flow: ValidationError → PayrollError → DbError → caller               │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Design Principles
//! 1. Use `thiserror` for derive macros (not manual impl)
//! 2. Include context in error messages (employee id, period, etc.)
//! 3. Errors are enum variants, never String
//!
//! Note that most bad *data* does not error at all: malformed clock punches
//! and shift times degrade to zero minutes (see [`crate::shift`]). Errors
//! here are reserved for operations that must not proceed.

use chrono::NaiveDate;
use thiserror::Error;

// =============================================================================
// Payroll Error
// =============================================================================

/// Payroll state-transition errors.
///
/// These represent operations the engine refuses to perform, as opposed to
/// degraded inputs which it computes through with zero defaults.
#[derive(Debug, Error)]
pub enum PayrollError {
    /// Employee id is not in the engine's employee set.
    #[error("Employee not found: {0}")]
    EmployeeNotFound(String),

    /// Finalization was attempted without explicit operator confirmation.
    ///
    /// ## When This Occurs
    /// Finalization permanently decrements loan/SSS balances and sweeps the
    /// vale balance. The caller must pass confirmation through explicitly.
    #[error("Finalization requires explicit operator confirmation")]
    ConfirmationRequired,

    /// A history record already exists for this (store, period) key.
    ///
    /// ## When This Occurs
    /// Re-finalizing the same period would double-deduct every employee's
    /// loan and SSS balances, so it is rejected outright.
    #[error("Payroll for store {store_id} from {start} to {end} is already finalized")]
    PeriodAlreadyFinalized {
        store_id: String,
        start: NaiveDate,
        end: NaiveDate,
    },

    /// Period start is after period end.
    #[error("Invalid payroll period: {start} is after {end}")]
    InvalidPeriod { start: NaiveDate, end: NaiveDate },

    /// Period spans more calendar days than the sanity cap.
    #[error("Payroll period spans {days} days, maximum is {max}")]
    PeriodTooLong { days: i64, max: i64 },

    /// Historical edit targets an employee row not in the snapshot.
    #[error("History record {record_id} has no row for employee {employee_id}")]
    HistoryRowNotFound {
        record_id: String,
        employee_id: String,
    },

    /// Validation error (wraps ValidationError).
    #[error("Validation error: {0}")]
    Validation(#[from] ValidationError),
}

// =============================================================================
// Validation Error
// =============================================================================

/// Input validation errors.
///
/// These errors occur when operator input doesn't meet requirements.
/// Used for early validation before business logic runs.
#[derive(Debug, Error)]
pub enum ValidationError {
    /// A required field is missing or empty.
    #[error("{field} is required")]
    Required { field: String },

    /// Field value is too long.
    #[error("{field} must be at most {max} characters")]
    TooLong { field: String, max: usize },

    /// Value must be positive.
    #[error("{field} must be positive")]
    MustBePositive { field: String },

    /// Numeric value is out of range.
    #[error("{field} must be between {min} and {max}")]
    OutOfRange { field: String, min: i64, max: i64 },

    /// Invalid format (e.g., non-numeric PIN, invalid date).
    #[error("{field} has invalid format: {reason}")]
    InvalidFormat { field: String, reason: String },
}

// =============================================================================
// Result Type Alias
// =============================================================================

/// Convenience type alias for Results with PayrollError.
pub type PayrollResult<T> = Result<T, PayrollError>;

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_messages() {
        let err = PayrollError::PeriodAlreadyFinalized {
            store_id: "STORE-01".to_string(),
            start: NaiveDate::from_ymd_opt(2026, 3, 2).unwrap(),
            end: NaiveDate::from_ymd_opt(2026, 3, 8).unwrap(),
        };
        assert_eq!(
            err.to_string(),
            "Payroll for store STORE-01 from 2026-03-02 to 2026-03-08 is already finalized"
        );
    }

    #[test]
    fn test_validation_error_messages() {
        let err = ValidationError::MustBePositive {
            field: "credit amount".to_string(),
        };
        assert_eq!(err.to_string(), "credit amount must be positive");
    }

    #[test]
    fn test_validation_converts_to_payroll_error() {
        let validation_err = ValidationError::Required {
            field: "name".to_string(),
        };
        let payroll_err: PayrollError = validation_err.into();
        assert!(matches!(payroll_err, PayrollError::Validation(_)));
    }
}
