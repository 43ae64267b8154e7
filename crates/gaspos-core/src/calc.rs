//! # Payroll Row Calculator & Aggregator
//!
//! Gross-to-net computation for one employee over one period, and the pure
//! reduction that produces the Aggregate Totals row.
//!
//! ## Computation Flow
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                      compute_row (one employee)                         │
//! │                                                                         │
//! │  for each date in period:                                              │
//! │      classify_day() ──► presence (½-day units), late min, UT min       │
//! │                                                                         │
//! │  hourly = daily / (shift hours − 1h unpaid break)                      │
//! │                                                                         │
//! │  EARNINGS                          DEDUCTIONS                          │
//! │  gross     = days × daily          vale = full outstanding balance     │
//! │  ot        = Σ manual OT × hourly  loan = override │ min(weekly, bal)  │
//! │  incentive = manual flat amount    sss  = override │ min(weekly, bal)  │
//! │                                    late = (late min / 60) × hourly     │
//! │                                    UT   = (UT min / 60) × hourly       │
//! │                                                                         │
//! │  net = gross + ot + incentive − (vale + loan + sss + late + UT)        │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! Every monetary step rounds to the centavo at the computation site (see
//! [`crate::money`]), so aggregation never compounds drift. The whole thing
//! re-runs on every keystroke of the adjustment fields, which is fine: it
//! is a pure fold over at most 31 days.

use std::collections::HashMap;

use chrono::NaiveDate;

use crate::adjust::ManualAdjustments;
use crate::money::Money;
use crate::shift::classify_day;
use crate::types::{AttendanceRecord, Employee, PayPeriod, PayrollRow, PayrollTotals};
use crate::UNPAID_BREAK_MINUTES;

// =============================================================================
// Row Calculator
// =============================================================================

/// Computes the full earnings/deductions breakdown for one employee.
///
/// `attendance` may contain records for any employee and any date; only
/// this employee's records inside the period are consulted. `adjustments`
/// is this employee's manual-override entry, or `None` when the operator
/// has entered nothing.
///
/// ## Clamping Guarantees
/// - Loan and SSS deductions never exceed the outstanding balance, even
///   when an explicit override asks for more.
/// - Late/undertime minutes are non-negative by construction.
/// - The vale deduction is always the entire outstanding balance.
pub fn compute_row(
    employee: &Employee,
    attendance: &[AttendanceRecord],
    period: &PayPeriod,
    adjustments: Option<&ManualAdjustments>,
) -> PayrollRow {
    let window = employee.shift_window();

    // Index this employee's records by date for the period walk.
    let by_date: HashMap<NaiveDate, &AttendanceRecord> = attendance
        .iter()
        .filter(|r| r.employee_id == employee.id)
        .map(|r| (r.date, r))
        .collect();

    let mut present_half_days: u32 = 0;
    let mut late_minutes: u32 = 0;
    let mut undertime_minutes: u32 = 0;

    for date in period.days() {
        let class = classify_day(&window, by_date.get(&date).copied());
        present_half_days += class.present_half_days();
        late_minutes += class.late_minutes();
        undertime_minutes += class.undertime_minutes();
    }

    // Hourly rate: daily salary over the payable window (one unpaid hour
    // subtracted from the scheduled shift).
    let payable_minutes = window
        .scheduled_minutes()
        .saturating_sub(UNPAID_BREAK_MINUTES);
    let hourly_rate = employee.daily_rate().hourly_from_daily(payable_minutes);

    // Earnings
    let gross = employee.daily_rate().for_half_days(present_half_days);
    let ot_hours = adjustments
        .map(|a| a.overtime_hours_within(period.start, period.end))
        .unwrap_or(0.0);
    let ot_pay = hourly_rate.for_hours(ot_hours);
    let incentive = adjustments.map(|a| a.incentive).unwrap_or_default();

    // Deductions
    let late_deduction = hourly_rate.for_minutes(late_minutes);
    let undertime_deduction = hourly_rate.for_minutes(undertime_minutes);
    let vale_pay = employee.vale_balance();
    let loan_pay = amortization(
        adjustments.and_then(|a| a.loan_payment),
        Money::from_cents(employee.loan_weekly_cents),
        employee.loan_balance(),
    );
    let sss_pay = amortization(
        adjustments.and_then(|a| a.sss_payment),
        Money::from_cents(employee.sss_weekly_cents),
        employee.sss_balance(),
    );

    let total_deductions = vale_pay + loan_pay + sss_pay + late_deduction + undertime_deduction;
    let net = gross + ot_pay + incentive - total_deductions;

    PayrollRow {
        employee_id: employee.id.clone(),
        employee_no: employee.employee_no.clone(),
        name: employee.name.clone(),
        days: present_half_days as f64 / 2.0,
        hourly_rate_cents: hourly_rate.cents(),
        gross_cents: gross.cents(),
        ot_hours,
        ot_cents: ot_pay.cents(),
        incentive_cents: incentive.cents(),
        vale_cents: vale_pay.cents(),
        loan_cents: loan_pay.cents(),
        sss_cents: sss_pay.cents(),
        late_minutes: late_minutes as i64,
        late_cents: late_deduction.cents(),
        undertime_minutes: undertime_minutes as i64,
        undertime_cents: undertime_deduction.cents(),
        net_cents: net.cents(),
    }
}

/// Resolves one loan-track deduction for this run.
///
/// The override wins when present (explicit zero suppresses the deduction
/// entirely), otherwise the fixed weekly amount applies. Either way the
/// result is capped at the outstanding balance: overpayment is impossible
/// by construction.
fn amortization(override_payment: Option<Money>, weekly: Money, balance: Money) -> Money {
    override_payment.unwrap_or(weekly).min(balance)
}

// =============================================================================
// Aggregator
// =============================================================================

/// Folds per-employee rows into period totals. Pure reduction, no side
/// effects.
pub fn aggregate(rows: &[PayrollRow]) -> PayrollTotals {
    let mut totals = PayrollTotals::default();
    for row in rows {
        totals.days += row.days;
        totals.gross_cents += row.gross_cents;
        totals.ot_cents += row.ot_cents;
        totals.incentive_cents += row.incentive_cents;
        totals.vale_cents += row.vale_cents;
        totals.loan_cents += row.loan_cents;
        totals.sss_cents += row.sss_cents;
        totals.late_cents += row.late_cents;
        totals.undertime_cents += row.undertime_cents;
        totals.net_cents += row.net_cents;
    }
    totals
}

// =============================================================================
// Unit Tests
// =============================================================================
