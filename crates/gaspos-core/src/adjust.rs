//! # Manual Payroll Adjustments
//!
//! Operator-entered overrides that cannot be derived from attendance:
//! per-date overtime hours, a flat incentive, and optional loan/SSS payment
//! overrides.
//!
//! ## Null vs Explicit Zero
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  loan_payment = None        → deduct min(weekly deduction, balance)    │
//! │  loan_payment = Some(₱0)    → deduct NOTHING this run                  │
//! │  loan_payment = Some(₱150)  → deduct exactly ₱150 (capped at balance)  │
//! │                                                                         │
//! │  The UI sends strings; `Money::from_pesos_str` preserves the           │
//! │  distinction: "" → None, "0" → Some(zero).                             │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Legacy Overtime Shapes
//! Old drafts stored overtime as a single scalar instead of a per-date map.
//! A scalar cannot be attributed to a date, so it is dropped during
//! deserialization; only per-date maps survive. Normalization happens once,
//! here, at the serde boundary — use sites never branch on shape.

use std::collections::BTreeMap;

use chrono::NaiveDate;
use serde::{Deserialize, Deserializer, Serialize};
use ts_rs::TS;

use crate::money::Money;

// =============================================================================
// Per-Employee Adjustments
// =============================================================================

/// Manual overrides for one employee within one period.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct ManualAdjustments {
    /// Override for the company-loan deduction. `None` falls back to the
    /// computed default; `Some(zero)` suppresses the deduction.
    #[serde(default)]
    pub loan_payment: Option<Money>,

    /// Override for the SSS-loan deduction. Same null-vs-zero semantics.
    #[serde(default)]
    pub sss_payment: Option<Money>,

    /// Manual overtime hours, entered per date.
    #[serde(default, deserialize_with = "deserialize_overtime")]
    #[ts(as = "BTreeMap<String, f64>")]
    pub overtime: BTreeMap<NaiveDate, f64>,

    /// Flat incentive amount for the period.
    #[serde(default)]
    pub incentive: Money,
}

impl ManualAdjustments {
    /// Whether every field is at its default (nothing to persist).
    pub fn is_empty(&self) -> bool {
        self.loan_payment.is_none()
            && self.sss_payment.is_none()
            && self.overtime.is_empty()
            && self.incentive.is_zero()
    }

    /// Sums overtime hours for dates inside `[start, end]` inclusive.
    pub fn overtime_hours_within(&self, start: NaiveDate, end: NaiveDate) -> f64 {
        self.overtime
            .range(start..=end)
            .map(|(_, hours)| hours)
            .sum()
    }
}

/// Deserializes the overtime field, tolerating legacy shapes.
///
/// Accepted: a map of `YYYY-MM-DD` → hours, where hours may be a number or
/// a numeric string (the UI historically sent both). Anything else — in
/// particular the legacy bare scalar — normalizes to an empty map.
fn deserialize_overtime<'de, D>(deserializer: D) -> Result<BTreeMap<NaiveDate, f64>, D::Error>
where
    D: Deserializer<'de>,
{
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum RawHours {
        Number(f64),
        Text(String),
    }

    #[derive(Deserialize)]
    #[serde(untagged)]
    enum RawOvertime {
        PerDate(BTreeMap<NaiveDate, RawHours>),
        Legacy(serde_json::Value),
    }

    let raw = RawOvertime::deserialize(deserializer)?;
    let map = match raw {
        RawOvertime::PerDate(entries) => entries
            .into_iter()
            .map(|(date, hours)| {
                let hours = match hours {
                    RawHours::Number(n) => n,
                    RawHours::Text(s) => s.trim().parse::<f64>().unwrap_or(0.0),
                };
                (date, hours)
            })
            .filter(|(_, hours)| hours.is_finite())
            .collect(),
        // Legacy scalar: unattributable to a date, dropped by design.
        RawOvertime::Legacy(_) => BTreeMap::new(),
    };
    Ok(map)
}

// =============================================================================
// Adjustment Set
// =============================================================================

/// All manual adjustments for a payroll run, keyed by employee id.
///
/// This is the ephemeral, operator-edited state behind the payroll screen.
/// The engine reads it on every recomputation; "Save Draft" serializes it
/// verbatim; loading a draft replaces it wholesale (never merges).
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize, TS)]
#[serde(transparent)]
#[ts(export)]
pub struct AdjustmentSet {
    #[ts(as = "BTreeMap<String, ManualAdjustments>")]
    entries: BTreeMap<String, ManualAdjustments>,
}

impl AdjustmentSet {
    /// Creates an empty adjustment set.
    pub fn new() -> Self {
        AdjustmentSet::default()
    }

    /// Returns the adjustments for an employee, if any were entered.
    pub fn get(&self, employee_id: &str) -> Option<&ManualAdjustments> {
        self.entries.get(employee_id)
    }

    /// Whether no employee has any adjustment entered.
    pub fn is_empty(&self) -> bool {
        self.entries.values().all(ManualAdjustments::is_empty)
    }

    /// Removes every entry. Called after a period is finalized (the values
    /// are baked into the frozen snapshot at that point).
    pub fn clear(&mut self) {
        self.entries.clear();
    }

    /// Sets the manual overtime hours for one employee on one date.
    /// Zero or negative hours remove the entry.
    pub fn set_overtime_for_date(&mut self, employee_id: &str, date: NaiveDate, hours: f64) {
        let entry = self.entry(employee_id);
        if hours > 0.0 && hours.is_finite() {
            entry.overtime.insert(date, hours);
        } else {
            entry.overtime.remove(&date);
        }
    }

    /// Sets the flat incentive for one employee.
    pub fn set_incentive(&mut self, employee_id: &str, incentive: Money) {
        self.entry(employee_id).incentive = incentive;
    }

    /// Sets or clears the company-loan payment override.
    pub fn set_loan_payment_override(&mut self, employee_id: &str, payment: Option<Money>) {
        self.entry(employee_id).loan_payment = payment;
    }

    /// Sets or clears the SSS payment override.
    pub fn set_sss_payment_override(&mut self, employee_id: &str, payment: Option<Money>) {
        self.entry(employee_id).sss_payment = payment;
    }

    fn entry(&mut self, employee_id: &str) -> &mut ManualAdjustments {
        self.entries.entry(employee_id.to_string()).or_default()
    }
}

// =============================================================================
// Unit Tests
// =============================================================================
