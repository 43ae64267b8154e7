//! # Domain Types
//!
//! Core domain types for the GasPOS payroll engine.
//!
//! ## Type Hierarchy
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                         Domain Types                                    │
//! │                                                                         │
//! │  ┌─────────────────┐   ┌──────────────────┐   ┌──────────────────┐     │
//! │  │    Employee     │   │ AttendanceRecord │   │   PayrollRow     │     │
//! │  │  ─────────────  │   │  ──────────────  │   │  ──────────────  │     │
//! │  │  id (UUID)      │   │  employee_id     │   │  days / gross    │     │
//! │  │  daily rate     │   │  date (unique    │   │  ot / incentive  │     │
//! │  │  shift window   │   │   per employee)  │   │  vale/loan/sss   │     │
//! │  │  loan/sss/vale  │   │  punches, status │   │  late/UT → net   │     │
//! │  └─────────────────┘   └──────────────────┘   └──────────────────┘     │
//! │                                                                         │
//! │  ┌─────────────────┐   ┌──────────────────┐   ┌──────────────────┐     │
//! │  │   PayPeriod     │   │   PayrollDraft   │   │ PayrollHistory   │     │
//! │  │  inclusive date │   │  (store,period)→ │   │ Record: frozen   │     │
//! │  │  range, ≤31d    │   │  adjustments     │   │ finalized rows   │     │
//! │  └─────────────────┘   └──────────────────┘   └──────────────────┘     │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Dual-Key Identity Pattern
//! Every entity has:
//! - `id`: UUID v4 - immutable, used for database relations
//! - Business ID: (employee_no, draft key, etc.) - human-readable

use chrono::{DateTime, Days, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use ts_rs::TS;

use crate::adjust::AdjustmentSet;
use crate::error::{PayrollError, PayrollResult};
use crate::money::Money;
use crate::shift::ShiftWindow;
use crate::MAX_PERIOD_DAYS;

// =============================================================================
// Enums
// =============================================================================

/// Employee classification. Riders deliver cylinders; staff run the store.
/// Both are paid through the same weekly payroll cycle.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, TS)]
#[cfg_attr(feature = "sqlx", derive(sqlx::Type))]
#[cfg_attr(feature = "sqlx", sqlx(rename_all = "UPPERCASE"))]
#[ts(export)]
#[serde(rename_all = "UPPERCASE")]
pub enum EmployeeType {
    Staff,
    Rider,
}

/// Attendance status for one employee-day.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, TS)]
#[cfg_attr(feature = "sqlx", derive(sqlx::Type))]
#[cfg_attr(feature = "sqlx", sqlx(rename_all = "UPPERCASE"))]
#[ts(export)]
#[serde(rename_all = "UPPERCASE")]
pub enum AttendanceStatus {
    /// Normal working day; late/undertime derive from punches.
    Regular,
    /// Official business: excused, paid, no penalties.
    Ob,
    /// Paid time off: excused, paid, no penalties.
    Pto,
    /// Explicitly marked absent.
    Absent,
}

impl Default for AttendanceStatus {
    fn default() -> Self {
        AttendanceStatus::Regular
    }
}

/// The three independent running balances a credit grant can target.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, TS)]
#[cfg_attr(feature = "sqlx", derive(sqlx::Type))]
#[cfg_attr(feature = "sqlx", sqlx(rename_all = "UPPERCASE"))]
#[ts(export)]
#[serde(rename_all = "UPPERCASE")]
pub enum CreditKind {
    /// Company loan: amortized by a fixed weekly deduction.
    Loan,
    /// Cash advance: swept in full every payroll run.
    Vale,
    /// SSS statutory loan: amortized by a fixed weekly deduction.
    Sss,
}

// =============================================================================
// Employee
// =============================================================================

/// A person on payroll.
///
/// Balances are mutated only through the engine: credit grants increase
/// them, finalization decreases them. The entity itself is long-lived and
/// deleted only by explicit HR action.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct Employee {
    /// Unique identifier (UUID v4).
    pub id: String,

    /// Business identifier shown on reports (e.g. "EMP-0012").
    pub employee_no: String,

    /// Display name.
    pub name: String,

    pub employee_type: EmployeeType,

    /// Stores this employee is authorized to work in.
    pub store_ids: Vec<String>,

    /// Fixed daily salary rate in centavos.
    pub daily_rate_cents: i64,

    /// Scheduled shift start, `"HH:MM"` local clock.
    pub shift_start: String,

    /// Scheduled shift end, `"HH:MM"` local clock.
    pub shift_end: String,

    /// Optional 4-digit terminal PIN for clock-in.
    pub pin: Option<String>,

    /// Outstanding company-loan balance in centavos.
    pub loan_balance_cents: i64,

    /// Fixed weekly company-loan deduction in centavos.
    pub loan_weekly_cents: i64,

    /// Outstanding SSS-loan balance in centavos.
    pub sss_balance_cents: i64,

    /// Fixed weekly SSS-loan deduction in centavos.
    pub sss_weekly_cents: i64,

    /// Outstanding cash-advance (vale) balance in centavos.
    /// No fixed deduction: swept in full each payroll run.
    pub vale_balance_cents: i64,

    #[ts(as = "String")]
    pub created_at: DateTime<Utc>,

    #[ts(as = "String")]
    pub updated_at: DateTime<Utc>,
}

impl Employee {
    /// Returns the daily rate as Money.
    #[inline]
    pub fn daily_rate(&self) -> Money {
        Money::from_cents(self.daily_rate_cents)
    }

    /// Returns the outstanding company-loan balance as Money.
    #[inline]
    pub fn loan_balance(&self) -> Money {
        Money::from_cents(self.loan_balance_cents)
    }

    /// Returns the outstanding SSS-loan balance as Money.
    #[inline]
    pub fn sss_balance(&self) -> Money {
        Money::from_cents(self.sss_balance_cents)
    }

    /// Returns the outstanding vale balance as Money.
    #[inline]
    pub fn vale_balance(&self) -> Money {
        Money::from_cents(self.vale_balance_cents)
    }

    /// Parses the scheduled shift into a minutes-of-day window.
    pub fn shift_window(&self) -> ShiftWindow {
        ShiftWindow::from_strings(&self.shift_start, &self.shift_end)
    }

    /// Whether this employee works at the given store.
    pub fn is_assigned_to(&self, store_id: &str) -> bool {
        self.store_ids.iter().any(|s| s == store_id)
    }
}

// =============================================================================
// Attendance Record
// =============================================================================

/// One employee's clock activity for one calendar date.
///
/// Invariant: at most one record per (employee_id, date) pair — enforced by
/// the attendance repository's upsert.
///
/// The stored `late_minutes`/`undertime_minutes`/`is_half_day` fields are
/// written by the terminal clock-out flow for the attendance screens; the
/// payroll calculator derives its own classification from the punches via
/// [`crate::shift::classify_day`] so the two can never diverge silently.
/// `overtime_minutes` is legacy: payroll overtime comes exclusively from
/// manual per-date adjustment entries.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct AttendanceRecord {
    pub id: String,
    pub employee_id: String,
    #[ts(as = "String")]
    pub date: NaiveDate,
    /// Clock-in punch, `"HH:MM"`. Absent or empty means no punch.
    pub time_in: Option<String>,
    /// Clock-out punch, `"HH:MM"`. Absent or empty means no punch.
    pub time_out: Option<String>,
    pub late_minutes: i64,
    pub undertime_minutes: i64,
    /// Legacy, superseded by manual overtime in payroll.
    pub overtime_minutes: i64,
    pub is_half_day: bool,
    pub status: AttendanceStatus,
    #[ts(as = "String")]
    pub created_at: DateTime<Utc>,
    #[ts(as = "String")]
    pub updated_at: DateTime<Utc>,
}

impl AttendanceRecord {
    /// Whether a clock-in punch was actually made (non-empty value).
    #[inline]
    pub fn punched_in(&self) -> bool {
        self.time_in
            .as_deref()
            .is_some_and(|t| !t.trim().is_empty())
    }

    /// Whether a clock-out punch was actually made (non-empty value).
    #[inline]
    pub fn punched_out(&self) -> bool {
        self.time_out
            .as_deref()
            .is_some_and(|t| !t.trim().is_empty())
    }
}

// =============================================================================
// Pay Period
// =============================================================================

/// A closed, inclusive calendar date range for one payroll run.
///
/// Construction validates ordering and caps the span at
/// [`MAX_PERIOD_DAYS`] calendar days as a sanity bound, so date iteration
/// downstream is always finite.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct PayPeriod {
    #[ts(as = "String")]
    pub start: NaiveDate,
    #[ts(as = "String")]
    pub end: NaiveDate,
}

impl PayPeriod {
    /// Creates a validated pay period.
    pub fn new(start: NaiveDate, end: NaiveDate) -> PayrollResult<Self> {
        if start > end {
            return Err(PayrollError::InvalidPeriod { start, end });
        }
        let days = (end - start).num_days() + 1;
        if days > MAX_PERIOD_DAYS {
            return Err(PayrollError::PeriodTooLong {
                days,
                max: MAX_PERIOD_DAYS,
            });
        }
        Ok(PayPeriod { start, end })
    }

    /// Number of calendar days covered, inclusive.
    pub fn num_days(&self) -> i64 {
        (self.end - self.start).num_days() + 1
    }

    /// Whether `date` falls inside the period.
    #[inline]
    pub fn contains(&self, date: NaiveDate) -> bool {
        date >= self.start && date <= self.end
    }

    /// Iterates every calendar date from start to end, inclusive.
    pub fn days(&self) -> impl Iterator<Item = NaiveDate> {
        let start = self.start;
        (0..self.num_days() as u64).filter_map(move |offset| start.checked_add_days(Days::new(offset)))
    }
}

// =============================================================================
// Payroll Row
// =============================================================================

/// One employee's full earnings/deductions breakdown for one period.
///
/// This is both the live calculator output and the frozen row shape stored
/// inside a [`PayrollHistoryRecord`] snapshot.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct PayrollRow {
    pub employee_id: String,
    pub employee_no: String,
    pub name: String,

    /// Present days; half-days contribute 0.5.
    pub days: f64,

    /// Derived hourly rate used for OT and late/UT math.
    pub hourly_rate_cents: i64,

    /// Base pay: present days × daily rate.
    pub gross_cents: i64,

    /// Total manual overtime hours for the period.
    pub ot_hours: f64,
    pub ot_cents: i64,

    pub incentive_cents: i64,

    /// Full outstanding vale balance, swept every run.
    pub vale_cents: i64,

    pub loan_cents: i64,
    pub sss_cents: i64,

    pub late_minutes: i64,
    pub late_cents: i64,

    pub undertime_minutes: i64,
    pub undertime_cents: i64,

    pub net_cents: i64,
}

impl PayrollRow {
    /// Sum of all deductions: vale + loan + SSS + late + undertime.
    pub fn total_deductions(&self) -> Money {
        Money::from_cents(
            self.vale_cents
                + self.loan_cents
                + self.sss_cents
                + self.late_cents
                + self.undertime_cents,
        )
    }

    /// Returns the net pay as Money.
    #[inline]
    pub fn net(&self) -> Money {
        Money::from_cents(self.net_cents)
    }
}

// =============================================================================
// Aggregate Totals
// =============================================================================

/// Period totals across all employees in scope (the "Aggregate Totals" row).
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct PayrollTotals {
    pub days: f64,
    pub gross_cents: i64,
    pub ot_cents: i64,
    pub incentive_cents: i64,
    pub vale_cents: i64,
    pub loan_cents: i64,
    pub sss_cents: i64,
    pub late_cents: i64,
    pub undertime_cents: i64,
    pub net_cents: i64,
}

// =============================================================================
// Payroll Draft
// =============================================================================

/// A save-point for manual adjustments before finalization.
///
/// Exactly one draft may exist per (store, period) key: saving again
/// replaces, never merges. A missing draft is not an error — it simply
/// means "no manual overrides yet."
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct PayrollDraft {
    /// Deterministic key derived from (store_id, period_start, period_end).
    pub id: String,
    pub store_id: String,
    #[ts(as = "String")]
    pub period_start: NaiveDate,
    #[ts(as = "String")]
    pub period_end: NaiveDate,
    pub adjustments: AdjustmentSet,
    #[ts(as = "String")]
    pub updated_at: DateTime<Utc>,
}

impl PayrollDraft {
    /// Builds the deterministic draft key for a (store, period) tuple.
    ///
    /// The key doubles as the row id, which is what gives save-draft its
    /// upsert semantics.
    pub fn key(store_id: &str, period: &PayPeriod) -> String {
        format!("draft:{}:{}:{}", store_id, period.start, period.end)
    }

    /// Creates a draft for the given scope and adjustments.
    pub fn new(
        store_id: &str,
        period: &PayPeriod,
        adjustments: AdjustmentSet,
        updated_at: DateTime<Utc>,
    ) -> Self {
        PayrollDraft {
            id: Self::key(store_id, period),
            store_id: store_id.to_string(),
            period_start: period.start,
            period_end: period.end,
            adjustments,
            updated_at,
        }
    }
}

// =============================================================================
// Payroll History Record
// =============================================================================

/// An immutable snapshot of one finalized payroll run.
///
/// Rows are a frozen copy of the calculator output at finalization time,
/// not a live join against employees. The single sanctioned mutation is the
/// admin "modify record" path ([`crate::engine::edit_history_row`]), which
/// replaces the snapshot wholesale and never re-touches employee balances.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct PayrollHistoryRecord {
    pub id: String,
    pub store_id: String,
    #[ts(as = "String")]
    pub period_start: NaiveDate,
    #[ts(as = "String")]
    pub period_end: NaiveDate,
    #[ts(as = "String")]
    pub generated_at: DateTime<Utc>,
    /// Operator who finalized the run.
    pub generated_by: String,
    /// Sum of all row nets at time of finalization (or last admin edit).
    pub total_disbursement_cents: i64,
    /// One frozen row per employee in scope at time of finalization.
    pub rows: Vec<PayrollRow>,
}

impl PayrollHistoryRecord {
    /// Finds the frozen row for an employee, if one exists.
    pub fn row_for(&self, employee_id: &str) -> Option<&PayrollRow> {
        self.rows.iter().find(|r| r.employee_id == employee_id)
    }

    /// Whether this record covers the given (store, period) key.
    pub fn covers(&self, store_id: &str, period: &PayPeriod) -> bool {
        self.store_id == store_id
            && self.period_start == period.start
            && self.period_end == period.end
    }
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    #[test]
    fn test_pay_period_validation() {
        let period = PayPeriod::new(date(2026, 3, 2), date(2026, 3, 8)).unwrap();
        assert_eq!(period.num_days(), 7);

        // Single-day period is valid
        assert!(PayPeriod::new(date(2026, 3, 2), date(2026, 3, 2)).is_ok());

        // Inverted range rejected
        assert!(matches!(
            PayPeriod::new(date(2026, 3, 8), date(2026, 3, 2)),
            Err(PayrollError::InvalidPeriod { .. })
        ));

        // 31 days is the cap; 32 is rejected
        assert!(PayPeriod::new(date(2026, 3, 1), date(2026, 3, 31)).is_ok());
        assert!(matches!(
            PayPeriod::new(date(2026, 3, 1), date(2026, 4, 1)),
            Err(PayrollError::PeriodTooLong { days: 32, .. })
        ));
    }

    #[test]
    fn test_pay_period_days_iteration() {
        let period = PayPeriod::new(date(2026, 2, 26), date(2026, 3, 2)).unwrap();
        let days: Vec<NaiveDate> = period.days().collect();
        assert_eq!(days.len(), 5);
        assert_eq!(days[0], date(2026, 2, 26));
        // Crosses the month boundary correctly
        assert_eq!(days[3], date(2026, 3, 1));
        assert_eq!(days[4], date(2026, 3, 2));
        assert!(period.contains(date(2026, 2, 28)));
        assert!(!period.contains(date(2026, 3, 3)));
    }

    #[test]
    fn test_draft_key_is_deterministic() {
        let period = PayPeriod::new(date(2026, 3, 2), date(2026, 3, 8)).unwrap();
        let a = PayrollDraft::key("STORE-01", &period);
        let b = PayrollDraft::key("STORE-01", &period);
        assert_eq!(a, b);
        assert_eq!(a, "draft:STORE-01:2026-03-02:2026-03-08");
        // Different store → different key
        assert_ne!(a, PayrollDraft::key("STORE-02", &period));
    }

    #[test]
    fn test_employee_store_assignment() {
        let employee = Employee {
            id: "emp-1".to_string(),
            employee_no: "EMP-0001".to_string(),
            name: "Test".to_string(),
            employee_type: EmployeeType::Staff,
            store_ids: vec!["STORE-01".to_string(), "STORE-03".to_string()],
            daily_rate_cents: 61_000,
            shift_start: "08:00".to_string(),
            shift_end: "17:00".to_string(),
            pin: None,
            loan_balance_cents: 0,
            loan_weekly_cents: 0,
            sss_balance_cents: 0,
            sss_weekly_cents: 0,
            vale_balance_cents: 0,
            created_at: Utc::now(),
            updated_at: Utc::now(),
        };
        assert!(employee.is_assigned_to("STORE-01"));
        assert!(!employee.is_assigned_to("STORE-02"));
        assert_eq!(employee.shift_window().scheduled_minutes(), 540);
    }

    #[test]
    fn test_status_serde_uses_uppercase_wire_form() {
        assert_eq!(
            serde_json::to_string(&AttendanceStatus::Regular).unwrap(),
            "\"REGULAR\""
        );
        assert_eq!(
            serde_json::from_str::<AttendanceStatus>("\"PTO\"").unwrap(),
            AttendanceStatus::Pto
        );
        assert_eq!(
            serde_json::to_string(&EmployeeType::Rider).unwrap(),
            "\"RIDER\""
        );
        assert_eq!(serde_json::to_string(&CreditKind::Sss).unwrap(), "\"SSS\"");
    }
}
