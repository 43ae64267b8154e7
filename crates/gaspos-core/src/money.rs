//! # Money Module
//!
//! Provides the `Money` type for handling monetary values safely.
//!
//! ## Why Integer Money?
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  THE FLOATING POINT PROBLEM                                             │
//! │                                                                         │
//! │  In JavaScript/floating point:                                          │
//! │    0.1 + 0.2 = 0.30000000000000004  ❌ WRONG!                           │
//! │                                                                         │
//! │  A payroll run aggregates dozens of per-row deductions. Drift that is  │
//! │  invisible on one row becomes a visible centavo mismatch on the        │
//! │  Aggregate Totals row.                                                 │
//! │                                                                         │
//! │  OUR SOLUTION: Integer Centavos                                        │
//! │    Every amount is an i64 count of centavos. Rounding happens at each  │
//! │    computation site (rate → deduction → net), never implicitly.        │
//! │                                                                         │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Usage
//! ```rust
//! use gaspos_core::money::Money;
//!
//! // A daily rate of ₱610.00
//! let daily = Money::from_cents(61_000);
//!
//! // Hourly rate over an 8-hour payable window (9h shift − 1h break)
//! let hourly = daily.hourly_from_daily(480);
//! assert_eq!(hourly.cents(), 7_625); // ₱76.25
//! ```

use serde::{Deserialize, Serialize};
use std::fmt;
use std::ops::{Add, AddAssign, Sub, SubAssign};
use ts_rs::TS;

// =============================================================================
// Money Type
// =============================================================================

/// Represents a monetary value in centavos (the smallest peso unit).
///
/// ## Design Decisions
/// - **i64 (signed)**: Net pay can legitimately go negative when deductions
///   exceed earnings for a short period
/// - **Single field tuple struct**: Zero-cost abstraction over i64
/// - **Derives**: Full serde support for JSON serialization
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize, TS,
)]
#[cfg_attr(feature = "sqlx", derive(sqlx::Type))]
#[cfg_attr(feature = "sqlx", sqlx(transparent))]
#[ts(export)]
pub struct Money(i64);

impl Money {
    /// Creates a Money value from centavos.
    #[inline]
    pub const fn from_cents(cents: i64) -> Self {
        Money(cents)
    }

    /// Parses a money value from an operator-entered peso string.
    ///
    /// ## Contract
    /// - `"250"` → `Some(₱250.00)`, `"12.5"` → `Some(₱12.50)`
    /// - `"0"` → `Some(₱0.00)` — an explicit zero, distinct from `None`
    /// - Empty/whitespace/garbage → `None` (treated as "unset")
    ///
    /// This distinction matters for manual payment overrides: an explicit
    /// `"0"` suppresses a deduction entirely, while an unset field falls
    /// back to the computed default.
    pub fn from_pesos_str(input: &str) -> Option<Money> {
        let trimmed = input.trim();
        if trimmed.is_empty() {
            return None;
        }
        trimmed
            .parse::<f64>()
            .ok()
            .filter(|v| v.is_finite())
            .map(|v| Money((v * 100.0).round() as i64))
    }

    /// Returns the value in centavos.
    #[inline]
    pub const fn cents(&self) -> i64 {
        self.0
    }

    /// Returns the whole-peso portion.
    #[inline]
    pub const fn pesos(&self) -> i64 {
        self.0 / 100
    }

    /// Returns the centavo portion (always 0-99).
    #[inline]
    pub const fn cents_part(&self) -> i64 {
        (self.0 % 100).abs()
    }

    /// Returns zero money value.
    #[inline]
    pub const fn zero() -> Self {
        Money(0)
    }

    /// Checks if the value is zero.
    #[inline]
    pub const fn is_zero(&self) -> bool {
        self.0 == 0
    }

    /// Checks if the value is positive (greater than zero).
    #[inline]
    pub const fn is_positive(&self) -> bool {
        self.0 > 0
    }

    /// Checks if the value is negative (less than zero).
    #[inline]
    pub const fn is_negative(&self) -> bool {
        self.0 < 0
    }

    /// Subtraction that never goes below zero.
    ///
    /// Used for balance decrements at finalization: a loan balance can reach
    /// zero but can never be driven negative by a payroll deduction.
    #[inline]
    pub fn clamped_sub(self, other: Money) -> Money {
        Money((self.0 - other.0).max(0))
    }

    // =========================================================================
    // Payroll Rate Arithmetic
    // =========================================================================
    //
    // Each helper rounds half-up at the computation site, matching the
    // "round to 2 decimals at the point of computation" rule. i128
    // intermediates prevent overflow on large amounts.

    /// Derives an hourly rate from this daily rate over `payable_minutes`.
    ///
    /// `payable_minutes` is the scheduled shift length minus the unpaid
    /// break. Returns zero when no payable time remains (degenerate shift).
    ///
    /// ## Example
    /// ```rust
    /// use gaspos_core::money::Money;
    ///
    /// // ₱610.00 daily over 480 payable minutes = ₱76.25/hour
    /// let hourly = Money::from_cents(61_000).hourly_from_daily(480);
    /// assert_eq!(hourly.cents(), 7_625);
    /// ```
    pub fn hourly_from_daily(self, payable_minutes: u32) -> Money {
        if payable_minutes == 0 {
            return Money::zero();
        }
        let d = payable_minutes as i128;
        let cents = (self.0 as i128 * 60 + d / 2) / d;
        Money(cents as i64)
    }

    /// Pay for `minutes` at this hourly rate.
    ///
    /// Used for late and undertime deductions: `(minutes / 60) × hourly`.
    pub fn for_minutes(self, minutes: u32) -> Money {
        let cents = (self.0 as i128 * minutes as i128 + 30) / 60;
        Money(cents as i64)
    }

    /// Pay for fractional `hours` at this hourly rate.
    ///
    /// Overtime hours are operator-entered and may be fractional (1.5h);
    /// the product is rounded to the centavo here, once.
    pub fn for_hours(self, hours: f64) -> Money {
        Money((self.0 as f64 * hours).round() as i64)
    }

    /// Pay for a presence count expressed in half-day units at this daily
    /// rate. A half-day pays exactly half the daily rate.
    pub fn for_half_days(self, half_days: u32) -> Money {
        let cents = (self.0 as i128 * half_days as i128 + 1) / 2;
        Money(cents as i64)
    }
}

// =============================================================================
// Trait Implementations
// =============================================================================

/// Display implementation shows money in a human-readable format.
///
/// ## Note
/// This is for debugging and logs. Receipt/report formatting is the
/// surrounding application's concern.
impl fmt::Display for Money {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let sign = if self.0 < 0 { "-" } else { "" };
        write!(f, "{}₱{}.{:02}", sign, self.pesos().abs(), self.cents_part())
    }
}

/// Default money is zero.
impl Default for Money {
    fn default() -> Self {
        Money::zero()
    }
}

/// Addition of two Money values.
impl Add for Money {
    type Output = Self;

    #[inline]
    fn add(self, other: Self) -> Self {
        Money(self.0 + other.0)
    }
}

/// Addition assignment (+=).
impl AddAssign for Money {
    #[inline]
    fn add_assign(&mut self, other: Self) {
        self.0 += other.0;
    }
}

/// Subtraction of two Money values.
impl Sub for Money {
    type Output = Self;

    #[inline]
    fn sub(self, other: Self) -> Self {
        Money(self.0 - other.0)
    }
}

/// Subtraction assignment (-=).
impl SubAssign for Money {
    #[inline]
    fn sub_assign(&mut self, other: Self) {
        self.0 -= other.0;
    }
}

// =============================================================================
// Unit Tests
// =============================================================================
