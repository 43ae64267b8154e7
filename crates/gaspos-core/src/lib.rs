//! # gaspos-core: Pure Payroll Logic for GasPOS
//!
//! This crate is the **heart** of GasPOS back-office payroll. It contains
//! the whole gross-to-net computation as pure functions with zero I/O
//! dependencies.
//!
//! ## Architecture Position
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                        GasPOS Architecture                              │
//! │                                                                         │
//! │  ┌─────────────────────────────────────────────────────────────────┐   │
//! │  │                  Back-Office Frontend (TypeScript)              │   │
//! │  │    Attendance ──► Payroll Sheet ──► Finalize ──► History       │   │
//! │  └─────────────────────────────┬───────────────────────────────────┘   │
//! │                                │ IPC / HTTP                             │
//! │  ┌─────────────────────────────▼───────────────────────────────────┐   │
//! │  │               ★ gaspos-core (THIS CRATE) ★                      │   │
//! │  │                                                                 │   │
//! │  │   ┌───────────┐  ┌───────────┐  ┌───────────┐  ┌───────────┐  │   │
//! │  │   │   types   │  │   money   │  │   shift   │  │   adjust  │  │   │
//! │  │   │ Employee  │  │   Money   │  │ DayClass  │  │ overrides │  │   │
//! │  │   │ PayPeriod │  │  centavos │  │ half-day  │  │  OT/inc.  │  │   │
//! │  │   └───────────┘  └───────────┘  └───────────┘  └───────────┘  │   │
//! │  │   ┌───────────┐  ┌───────────┐  ┌───────────┐                 │   │
//! │  │   │   calc    │  │  engine   │  │ validation│                 │   │
//! │  │   │ row math  │  │ lifecycle │  │   rules   │                 │   │
//! │  │   └───────────┘  └───────────┘  └───────────┘                 │   │
//! │  │                                                                 │   │
//! │  │   NO I/O • NO DATABASE • NO CLOCK • PURE FUNCTIONS             │   │
//! │  └─────────────────────────────────────────────────────────────────┘   │
//! │                                │                                        │
//! │  ┌─────────────────────────────▼───────────────────────────────────┐   │
//! │  │                    gaspos-db (Database Layer)                   │   │
//! │  │              SQLite queries, migrations, repositories           │   │
//! │  └─────────────────────────────────────────────────────────────────┘   │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Modules
//!
//! - [`types`] - Domain types (Employee, AttendanceRecord, PayrollRow, etc.)
//! - [`money`] - Money type with integer centavo arithmetic (no floating point!)
//! - [`shift`] - Shift windows, clock parsing, and day classification
//! - [`adjust`] - Operator-entered manual adjustments
//! - [`calc`] - Per-employee gross-to-net row computation
//! - [`engine`] - Run lifecycle: live view, drafts, finalization, history edits
//! - [`error`] - Domain error types
//! - [`validation`] - Business rule validation
//!
//! ## Design Principles
//!
//! 1. **Pure Functions**: Every computation is deterministic - same snapshot = same payroll
//! 2. **No I/O**: Database, network, and wall-clock access are FORBIDDEN here;
//!    timestamps are passed in by the caller
//! 3. **Integer Money**: All monetary values are centavos (i64) to avoid float drift
//! 4. **Describe, Then Apply**: Finalization returns a [`engine::FinalizeOutcome`]
//!    that is applied only after the database commit succeeds
//!
//! ## Example Usage
//!
//! ```rust
//! use gaspos_core::money::Money;
//!
//! // A daily rate of ₱610.00, never constructed from floats
//! let daily = Money::from_cents(61_000);
//!
//! // 08:00–17:00 shift, one unpaid hour → ₱76.25/hour
//! let hourly = daily.hourly_from_daily(480);
//! assert_eq!(hourly.cents(), 7_625);
//!
//! // 24 minutes late costs ₱30.50
//! assert_eq!(hourly.for_minutes(24).cents(), 3_050);
//! ```

// =============================================================================
// Module Declarations
// =============================================================================

pub mod adjust;
pub mod calc;
pub mod engine;
pub mod error;
pub mod money;
pub mod shift;
pub mod types;
pub mod validation;

// =============================================================================
// Re-exports for Convenience
// =============================================================================
// These allow users to do `use gaspos_core::Money` instead of
// `use gaspos_core::money::Money`

pub use adjust::{AdjustmentSet, ManualAdjustments};
pub use engine::{FinalizeOutcome, HistoryEdit, PayrollEngine};
pub use error::{PayrollError, PayrollResult, ValidationError};
pub use money::Money;
pub use types::*;

// =============================================================================
// Crate-Level Constants
// =============================================================================

/// Scope key for payroll runs that cover every store.
///
/// ## Why a constant?
/// Drafts and history records are keyed by (store, period). An unscoped
/// run still needs a stable key so its draft upserts and its duplicate
/// detection behave exactly like a store-scoped run's.
pub const GLOBAL_SCOPE: &str = "ALL";

/// Maximum calendar days a pay period may span.
///
/// ## Business Reason
/// The business runs weekly payroll; a month is already generous. The cap
/// mostly guards against swapped or fat-fingered date inputs producing a
/// multi-year date iteration.
pub const MAX_PERIOD_DAYS: i64 = 31;

/// Unpaid break minutes subtracted from the scheduled shift when deriving
/// the hourly rate.
///
/// ## Business Reason
/// Every shift includes a one-hour unpaid meal break, so a 9-hour
/// scheduled shift pays as 8 hourly units.
pub const UNPAID_BREAK_MINUTES: u32 = 60;

/// Grace minutes added to the half-day lower bound on ordinary shifts.
///
/// ## Business Reason
/// Working a few minutes past the literal midpoint should still count as
/// a half-day, not silently tip into full-day-with-huge-undertime.
pub const HALF_DAY_GRACE_MINUTES: u32 = 30;

/// Scheduled length (minutes) at which a shift stops receiving the
/// half-day grace. Twelve-hour shifts use the bare midpoint.
pub const LONG_SHIFT_MINUTES: u32 = 720;

/// Required length of a terminal clock-in PIN.
pub const PIN_LENGTH: usize = 4;

/// Upper bound for a daily salary rate, in centavos (₱100,000.00).
///
/// ## Business Reason
/// Fat-finger guard: no daily rate in this business is six digits of
/// pesos. Catching it at the form beats a startling payroll sheet later.
pub const MAX_DAILY_RATE_CENTS: i64 = 10_000_000;
