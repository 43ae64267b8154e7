//! # Payroll Engine
//!
//! Orchestrates a payroll run over an in-memory snapshot of employees,
//! attendance, and manual adjustments. The engine is deliberately pure:
//! it never touches storage, and finalization *describes* the state
//! transition instead of performing it.
//!
//! ## Lifecycle
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                        Payroll Run Lifecycle                            │
//! │                                                                         │
//! │   load snapshot ──► edit adjustments ──► rows()/totals()  (live view)  │
//! │        │                   │                                            │
//! │        │                   └──► draft()          save-point, replayable │
//! │        │                                                                │
//! │        └──► finalize() ──► FinalizeOutcome ──► persist ──► apply       │
//! │                  │              │                  │                    │
//! │                  │              │                  └─ on failure:       │
//! │                  │              │                     outcome dropped,  │
//! │                  │              │                     engine untouched  │
//! │                  │              └─ frozen history record +              │
//! │                  │                 decremented employee balances        │
//! │                  └─ guards: explicit confirmation,                      │
//! │                     period not already finalized                        │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! The persist-then-apply split is what makes finalization atomic from the
//! caller's point of view: if the database transaction fails, the
//! [`FinalizeOutcome`] is simply dropped and nothing in memory changed.

use chrono::{DateTime, Utc};
use uuid::Uuid;

use crate::adjust::AdjustmentSet;
use crate::calc::{aggregate, compute_row};
use crate::error::{PayrollError, PayrollResult, ValidationError};
use crate::money::Money;
use crate::types::{
    AttendanceRecord, CreditKind, Employee, PayPeriod, PayrollDraft, PayrollHistoryRecord,
    PayrollRow, PayrollTotals,
};
use crate::GLOBAL_SCOPE;

// =============================================================================
// Engine
// =============================================================================

/// A payroll run over one period, optionally scoped to one store.
///
/// Holds the working snapshot loaded by the caller. Attendance may contain
/// records for any employee and any date; the calculator filters per row.
#[derive(Debug, Clone)]
pub struct PayrollEngine {
    employees: Vec<Employee>,
    attendance: Vec<AttendanceRecord>,
    adjustments: AdjustmentSet,
    store_id: Option<String>,
    period: PayPeriod,
}

impl PayrollEngine {
    /// Creates an engine for a period, unscoped (all stores).
    pub fn new(
        employees: Vec<Employee>,
        attendance: Vec<AttendanceRecord>,
        period: PayPeriod,
    ) -> Self {
        PayrollEngine {
            employees,
            attendance,
            adjustments: AdjustmentSet::new(),
            store_id: None,
            period,
        }
    }

    /// Restricts the run to employees assigned to one store.
    pub fn scoped_to(mut self, store_id: impl Into<String>) -> Self {
        self.store_id = Some(store_id.into());
        self
    }

    /// The period this run covers.
    #[inline]
    pub fn period(&self) -> &PayPeriod {
        &self.period
    }

    /// The scope key used for draft and history identity. Unscoped runs
    /// share the [`GLOBAL_SCOPE`] key.
    pub fn scope_key(&self) -> &str {
        self.store_id.as_deref().unwrap_or(GLOBAL_SCOPE)
    }

    /// Employees in scope for this run, in load order.
    pub fn employees(&self) -> impl Iterator<Item = &Employee> {
        let store_id = self.store_id.as_deref();
        self.employees
            .iter()
            .filter(move |e| store_id.map_or(true, |s| e.is_assigned_to(s)))
    }

    /// Looks up an in-scope employee by id.
    pub fn employee(&self, employee_id: &str) -> Option<&Employee> {
        self.employees().find(|e| e.id == employee_id)
    }

    // =========================================================================
    // Live View
    // =========================================================================

    /// Computes the current per-employee breakdown. Pure and repeatable:
    /// the UI calls this after every adjustment edit.
    pub fn rows(&self) -> Vec<PayrollRow> {
        self.employees()
            .map(|employee| {
                compute_row(
                    employee,
                    &self.attendance,
                    &self.period,
                    self.adjustments.get(&employee.id),
                )
            })
            .collect()
    }

    /// Computes the Aggregate Totals row for the current state.
    pub fn totals(&self) -> PayrollTotals {
        aggregate(&self.rows())
    }

    /// Computes the breakdown for a single in-scope employee.
    pub fn row_for(&self, employee_id: &str) -> PayrollResult<PayrollRow> {
        let employee = self
            .employee(employee_id)
            .ok_or_else(|| PayrollError::EmployeeNotFound(employee_id.to_string()))?;
        Ok(compute_row(
            employee,
            &self.attendance,
            &self.period,
            self.adjustments.get(employee_id),
        ))
    }

    // =========================================================================
    // Manual Adjustments
    // =========================================================================

    /// Replaces the adjustment set wholesale, e.g. when loading a saved
    /// draft. Deliberately not a merge: the draft is the source of truth
    /// for the (store, period) it belongs to.
    pub fn load_adjustments(&mut self, adjustments: AdjustmentSet) {
        self.adjustments = adjustments;
    }

    /// Read access to the current adjustments.
    #[inline]
    pub fn adjustments(&self) -> &AdjustmentSet {
        &self.adjustments
    }

    /// Sets manual overtime hours for one employee on one date.
    pub fn set_overtime(&mut self, employee_id: &str, date: chrono::NaiveDate, hours: f64) {
        self.adjustments.set_overtime_for_date(employee_id, date, hours);
    }

    /// Sets the flat incentive for one employee.
    pub fn set_incentive(&mut self, employee_id: &str, incentive: Money) {
        self.adjustments.set_incentive(employee_id, incentive);
    }

    /// Sets or clears the company-loan payment override.
    pub fn set_loan_payment_override(&mut self, employee_id: &str, payment: Option<Money>) {
        self.adjustments.set_loan_payment_override(employee_id, payment);
    }

    /// Sets or clears the SSS payment override.
    pub fn set_sss_payment_override(&mut self, employee_id: &str, payment: Option<Money>) {
        self.adjustments.set_sss_payment_override(employee_id, payment);
    }

    /// Builds the draft save-point for the current adjustments.
    pub fn draft(&self, updated_at: DateTime<Utc>) -> PayrollDraft {
        PayrollDraft::new(
            self.scope_key(),
            &self.period,
            self.adjustments.clone(),
            updated_at,
        )
    }

    // =========================================================================
    // Finalization
    // =========================================================================

    /// Computes the finalization state transition without applying it.
    ///
    /// `history` is the already-persisted record set for duplicate
    /// detection. On success the caller persists the outcome (history
    /// insert + employee balance updates in one transaction) and then
    /// calls [`PayrollEngine::apply_finalization`]. On persistence failure
    /// the outcome is dropped and the engine state is exactly as before.
    ///
    /// ## Guards
    /// - `confirmed` must be true: balance decrements are irreversible.
    /// - The (scope, period) key must not already appear in `history`.
    pub fn finalize(
        &self,
        generated_by: &str,
        confirmed: bool,
        generated_at: DateTime<Utc>,
        history: &[PayrollHistoryRecord],
    ) -> PayrollResult<FinalizeOutcome> {
        if !confirmed {
            return Err(PayrollError::ConfirmationRequired);
        }
        let scope = self.scope_key();
        if history.iter().any(|r| r.covers(scope, &self.period)) {
            return Err(PayrollError::PeriodAlreadyFinalized {
                store_id: scope.to_string(),
                start: self.period.start,
                end: self.period.end,
            });
        }

        let rows = self.rows();
        let total_disbursement_cents = rows.iter().map(|r| r.net_cents).sum();

        // Decrement balances by exactly what each row deducts. The vale
        // column is the full balance by construction, so clamped_sub
        // zeroes it; loan/SSS land on max(balance − payment, 0).
        let updated_employees: Vec<Employee> = rows
            .iter()
            .filter_map(|row| {
                self.employee(&row.employee_id).map(|employee| {
                    let mut updated = employee.clone();
                    updated.loan_balance_cents = updated
                        .loan_balance()
                        .clamped_sub(Money::from_cents(row.loan_cents))
                        .cents();
                    updated.sss_balance_cents = updated
                        .sss_balance()
                        .clamped_sub(Money::from_cents(row.sss_cents))
                        .cents();
                    updated.vale_balance_cents = updated
                        .vale_balance()
                        .clamped_sub(Money::from_cents(row.vale_cents))
                        .cents();
                    updated.updated_at = generated_at;
                    updated
                })
            })
            .collect();

        let record = PayrollHistoryRecord {
            id: Uuid::new_v4().to_string(),
            store_id: scope.to_string(),
            period_start: self.period.start,
            period_end: self.period.end,
            generated_at,
            generated_by: generated_by.to_string(),
            total_disbursement_cents,
            rows,
        };

        Ok(FinalizeOutcome {
            record,
            updated_employees,
        })
    }

    /// Applies a persisted finalization to the in-memory snapshot: swaps in
    /// the decremented employees and clears the adjustment sheet (its
    /// values are baked into the frozen record now).
    pub fn apply_finalization(&mut self, outcome: &FinalizeOutcome) {
        for updated in &outcome.updated_employees {
            if let Some(slot) = self.employees.iter_mut().find(|e| e.id == updated.id) {
                *slot = updated.clone();
            }
        }
        self.adjustments.clear();
    }

    // =========================================================================
    // Credit Grants & Employee Updates
    // =========================================================================

    /// Computes an employee with a credit grant applied to the matching
    /// balance. Returns the updated entity for the caller to persist;
    /// the in-memory snapshot is updated via
    /// [`PayrollEngine::apply_employee_update`] afterwards.
    pub fn grant_credit(
        &self,
        employee_id: &str,
        kind: CreditKind,
        amount: Money,
        granted_at: DateTime<Utc>,
    ) -> PayrollResult<Employee> {
        if !amount.is_positive() {
            return Err(ValidationError::MustBePositive {
                field: "credit amount".to_string(),
            }
            .into());
        }
        let employee = self
            .employee(employee_id)
            .ok_or_else(|| PayrollError::EmployeeNotFound(employee_id.to_string()))?;

        let mut updated = employee.clone();
        match kind {
            CreditKind::Loan => updated.loan_balance_cents += amount.cents(),
            CreditKind::Vale => updated.vale_balance_cents += amount.cents(),
            CreditKind::Sss => updated.sss_balance_cents += amount.cents(),
        }
        updated.updated_at = granted_at;
        Ok(updated)
    }

    /// Replaces an employee in the snapshot after a persisted edit.
    pub fn apply_employee_update(&mut self, updated: Employee) -> PayrollResult<()> {
        let slot = self
            .employees
            .iter_mut()
            .find(|e| e.id == updated.id)
            .ok_or_else(|| PayrollError::EmployeeNotFound(updated.id.clone()))?;
        *slot = updated;
        Ok(())
    }
}

// =============================================================================
// Finalize Outcome
// =============================================================================

/// The complete state transition a finalization produces.
///
/// Persist both parts in one transaction, then feed the outcome back via
/// [`PayrollEngine::apply_finalization`].
#[derive(Debug, Clone, PartialEq)]
pub struct FinalizeOutcome {
    /// The frozen history record for this run.
    pub record: PayrollHistoryRecord,
    /// Employees whose balances the run decremented (every in-scope
    /// employee, including those with zero deductions).
    pub updated_employees: Vec<Employee>,
}

// =============================================================================
// Historical Edits
// =============================================================================

/// The two admin-editable fields on a frozen history row.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum HistoryEdit {
    /// Corrects the displayed day count. Display-only: pay amounts were
    /// disbursed as-is, so nothing is recomputed.
    Days(f64),
    /// Corrects the incentive amount. Recomputes the row's net and the
    /// record's total disbursement from the frozen components.
    Incentive(Money),
}

/// Applies an admin edit to a finalized record, returning the replacement.
///
/// This is the single sanctioned mutation of history. It never touches
/// employee balances: those were settled at finalization and a later
/// correction of the paper record must not re-settle them.
pub fn edit_history_row(
    record: &PayrollHistoryRecord,
    employee_id: &str,
    edit: HistoryEdit,
) -> PayrollResult<PayrollHistoryRecord> {
    let mut updated = record.clone();
    let row = updated
        .rows
        .iter_mut()
        .find(|r| r.employee_id == employee_id)
        .ok_or_else(|| PayrollError::HistoryRowNotFound {
            record_id: record.id.clone(),
            employee_id: employee_id.to_string(),
        })?;

    match edit {
        HistoryEdit::Days(days) => {
            row.days = days;
        }
        HistoryEdit::Incentive(incentive) => {
            row.incentive_cents = incentive.cents();
            row.net_cents = row.gross_cents + row.ot_cents + row.incentive_cents
                - row.total_deductions().cents();
        }
    }

    updated.total_disbursement_cents = updated.rows.iter().map(|r| r.net_cents).sum();
    Ok(updated)
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::{AttendanceStatus, EmployeeType};
    use chrono::NaiveDate;

    fn date(d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(2026, 3, d).unwrap()
    }

    fn week() -> PayPeriod {
        PayPeriod::new(date(2), date(8)).unwrap()
    }

    fn employee(id: &str, store: &str) -> Employee {
        Employee {
            id: id.to_string(),
            employee_no: format!("EMP-{id}"),
            name: format!("Employee {id}"),
            employee_type: EmployeeType::Staff,
            store_ids: vec![store.to_string()],
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
        }
    }

    fn punches(employee_id: &str) -> Vec<AttendanceRecord> {
        (2..=7)
            .map(|d| AttendanceRecord {
                id: format!("att-{employee_id}-{d}"),
                employee_id: employee_id.to_string(),
                date: date(d),
                time_in: Some("08:00".to_string()),
                time_out: Some("17:00".to_string()),
                late_minutes: 0,
                undertime_minutes: 0,
                overtime_minutes: 0,
                is_half_day: false,
                status: AttendanceStatus::Regular,
                created_at: Utc::now(),
                updated_at: Utc::now(),
            })
            .collect()
    }

    fn engine_with(employees: Vec<Employee>) -> PayrollEngine {
        let mut attendance = Vec::new();
        for e in &employees {
            attendance.extend(punches(&e.id));
        }
        PayrollEngine::new(employees, attendance, week())
    }

    #[test]
    fn test_store_scoping_filters_rows() {
        let engine = engine_with(vec![
            employee("a", "STORE-01"),
            employee("b", "STORE-02"),
            employee("c", "STORE-01"),
        ])
        .scoped_to("STORE-01");

        let rows = engine.rows();
        assert_eq!(rows.len(), 2);
        assert!(rows.iter().all(|r| r.employee_id != "b"));
        assert_eq!(engine.scope_key(), "STORE-01");
    }

    #[test]
    fn test_unscoped_run_uses_global_scope() {
        let engine = engine_with(vec![employee("a", "STORE-01"), employee("b", "STORE-02")]);
        assert_eq!(engine.scope_key(), GLOBAL_SCOPE);
        assert_eq!(engine.rows().len(), 2);

        let draft = engine.draft(Utc::now());
        assert_eq!(draft.store_id, GLOBAL_SCOPE);
        assert_eq!(draft.id, "draft:ALL:2026-03-02:2026-03-08");
    }

    #[test]
    fn test_totals_match_rows() {
        let mut engine = engine_with(vec![employee("a", "STORE-01"), employee("b", "STORE-01")]);
        engine.set_incentive("a", Money::from_cents(10_000));

        let rows = engine.rows();
        let totals = engine.totals();
        assert_eq!(totals.days, 12.0);
        assert_eq!(totals.incentive_cents, 10_000);
        assert_eq!(
            totals.net_cents,
            rows.iter().map(|r| r.net_cents).sum::<i64>()
        );
    }

    #[test]
    fn test_load_adjustments_replaces_not_merges() {
        let mut engine = engine_with(vec![employee("a", "STORE-01")]);
        engine.set_incentive("a", Money::from_cents(10_000));

        let mut replacement = AdjustmentSet::new();
        replacement.set_overtime_for_date("a", date(3), 2.0);
        engine.load_adjustments(replacement);

        let adj = engine.adjustments().get("a").unwrap();
        assert!(adj.incentive.is_zero());
        assert_eq!(adj.overtime.len(), 1);
    }

    #[test]
    fn test_finalize_requires_confirmation() {
        let engine = engine_with(vec![employee("a", "STORE-01")]);
        let err = engine
            .finalize("admin", false, Utc::now(), &[])
            .unwrap_err();
        assert!(matches!(err, PayrollError::ConfirmationRequired));
    }

    #[test]
    fn test_finalize_decrements_balances() {
        let mut emp = employee("a", "STORE-01");
        emp.loan_balance_cents = 50_000;
        emp.loan_weekly_cents = 20_000;
        emp.sss_balance_cents = 10_000;
        emp.sss_weekly_cents = 12_500; // weekly above balance
        emp.vale_balance_cents = 7_500;

        let engine = engine_with(vec![emp]).scoped_to("STORE-01");
        let outcome = engine.finalize("admin", true, Utc::now(), &[]).unwrap();

        let updated = &outcome.updated_employees[0];
        assert_eq!(updated.loan_balance_cents, 30_000);
        // SSS deduction was clamped to the balance, which is now settled
        assert_eq!(updated.sss_balance_cents, 0);
        assert_eq!(updated.vale_balance_cents, 0);

        let row = &outcome.record.rows[0];
        assert_eq!(row.loan_cents, 20_000);
        assert_eq!(row.sss_cents, 10_000);
        assert_eq!(row.vale_cents, 7_500);
        assert_eq!(outcome.record.total_disbursement_cents, row.net_cents);
        assert_eq!(outcome.record.store_id, "STORE-01");
    }

    #[test]
    fn test_finalize_rejects_duplicate_period() {
        let engine = engine_with(vec![employee("a", "STORE-01")]).scoped_to("STORE-01");
        let first = engine.finalize("admin", true, Utc::now(), &[]).unwrap();

        let err = engine
            .finalize("admin", true, Utc::now(), std::slice::from_ref(&first.record))
            .unwrap_err();
        assert!(matches!(err, PayrollError::PeriodAlreadyFinalized { .. }));

        // A record for a different store does not block this one
        let mut other = first.record.clone();
        other.store_id = "STORE-02".to_string();
        assert!(engine.finalize("admin", true, Utc::now(), &[other]).is_ok());
    }

    #[test]
    fn test_finalize_does_not_mutate_until_applied() {
        let mut emp = employee("a", "STORE-01");
        emp.vale_balance_cents = 5_000;
        let mut engine = engine_with(vec![emp]);
        engine.set_incentive("a", Money::from_cents(1_000));

        let outcome = engine.finalize("admin", true, Utc::now(), &[]).unwrap();

        // Persist pending: snapshot still shows the old balance and the
        // adjustment sheet is intact.
        assert_eq!(engine.employee("a").unwrap().vale_balance_cents, 5_000);
        assert!(!engine.adjustments().is_empty());

        engine.apply_finalization(&outcome);
        assert_eq!(engine.employee("a").unwrap().vale_balance_cents, 0);
        assert!(engine.adjustments().is_empty());
    }

    #[test]
    fn test_grant_credit() {
        let engine = engine_with(vec![employee("a", "STORE-01")]);

        let updated = engine
            .grant_credit("a", CreditKind::Vale, Money::from_cents(25_000), Utc::now())
            .unwrap();
        assert_eq!(updated.vale_balance_cents, 25_000);

        let updated = engine
            .grant_credit("a", CreditKind::Loan, Money::from_cents(100_000), Utc::now())
            .unwrap();
        assert_eq!(updated.loan_balance_cents, 100_000);

        // Non-positive amounts are rejected
        let err = engine
            .grant_credit("a", CreditKind::Sss, Money::zero(), Utc::now())
            .unwrap_err();
        assert!(matches!(err, PayrollError::Validation(_)));

        let err = engine
            .grant_credit("missing", CreditKind::Vale, Money::from_cents(100), Utc::now())
            .unwrap_err();
        assert!(matches!(err, PayrollError::EmployeeNotFound(_)));
    }

    #[test]
    fn test_apply_employee_update() {
        let mut engine = engine_with(vec![employee("a", "STORE-01")]);
        let mut updated = engine.employee("a").unwrap().clone();
        updated.daily_rate_cents = 70_000;
        engine.apply_employee_update(updated).unwrap();
        assert_eq!(engine.employee("a").unwrap().daily_rate_cents, 70_000);

        let err = engine
            .apply_employee_update(employee("ghost", "STORE-01"))
            .unwrap_err();
        assert!(matches!(err, PayrollError::EmployeeNotFound(_)));
    }

    #[test]
    fn test_edit_history_days_changes_display_only() {
        let engine = engine_with(vec![employee("a", "STORE-01")]);
        let record = engine.finalize("admin", true, Utc::now(), &[]).unwrap().record;
        let original_net = record.rows[0].net_cents;

        let edited = edit_history_row(&record, "a", HistoryEdit::Days(5.5)).unwrap();
        assert_eq!(edited.rows[0].days, 5.5);
        // Pay amounts untouched: the money already went out
        assert_eq!(edited.rows[0].net_cents, original_net);
        assert_eq!(edited.total_disbursement_cents, original_net);
    }

    #[test]
    fn test_edit_history_incentive_recomputes_net() {
        let engine = engine_with(vec![employee("a", "STORE-01"), employee("b", "STORE-01")]);
        let record = engine.finalize("admin", true, Utc::now(), &[]).unwrap().record;

        let edited =
            edit_history_row(&record, "a", HistoryEdit::Incentive(Money::from_cents(15_000)))
                .unwrap();
        let row = edited.row_for("a").unwrap();
        assert_eq!(row.incentive_cents, 15_000);
        assert_eq!(row.net_cents, row.gross_cents + 15_000);
        // The other row is untouched; the total re-sums both
        assert_eq!(
            edited.total_disbursement_cents,
            edited.rows.iter().map(|r| r.net_cents).sum::<i64>()
        );
        // The input record itself is never mutated
        assert_eq!(record.row_for("a").unwrap().incentive_cents, 0);
    }

    #[test]
    fn test_edit_history_unknown_employee() {
        let engine = engine_with(vec![employee("a", "STORE-01")]);
        let record = engine.finalize("admin", true, Utc::now(), &[]).unwrap().record;
        let err = edit_history_row(&record, "ghost", HistoryEdit::Days(1.0)).unwrap_err();
        assert!(matches!(err, PayrollError::HistoryRowNotFound { .. }));
    }
}
