//! # Shift & Attendance Classification
//!
//! Converts `HH:MM` clock values to minutes-of-day and classifies one
//! employee-day of attendance against the scheduled shift window.
//!
//! ## The Half-Day Band
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  Shift 08:00–17:00 (540 scheduled minutes, +30 grace since < 12h)      │
//! │                                                                         │
//! │  worked minutes:  0 ......... 300 ............. 405 ............ 540   │
//! │                   │            │                 │                │    │
//! │                   │  FULL DAY  │    HALF-DAY     │    FULL DAY    │    │
//! │                   │  (late/UT  │  presence 0.5   │  (late/UT      │    │
//! │                   │   accrue)  │  late = UT = 0  │   accrue)      │    │
//! │                                                                         │
//! │  band = [scheduled/2 + grace, scheduled × 0.75]                        │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## One Classifier, Every Call Site
//! Manual-override authorization, the weekly attendance grid, and the row
//! calculator all need the same half-day decision. [`classify_day`] is the
//! single implementation they all call; nothing else in the workspace
//! recomputes this arithmetic.

use serde::{Deserialize, Serialize};
use ts_rs::TS;

use crate::types::{AttendanceRecord, AttendanceStatus};
use crate::{HALF_DAY_GRACE_MINUTES, LONG_SHIFT_MINUTES};

// =============================================================================
// Time Parsing
// =============================================================================

/// Parses an `"HH:MM"` string into total minutes since midnight.
///
/// ## Contract
/// - `"08:30"` → 510
/// - Empty, whitespace, or malformed input → 0
///
/// The zero default is deliberate: a missing punch must never produce a
/// negative or nonsensical result downstream, at the cost of masking
/// data-entry errors. All times are naive local clock values; there is no
/// timezone handling anywhere in the payroll engine.
pub fn time_to_minutes(hhmm: &str) -> u32 {
    let trimmed = hhmm.trim();
    if trimmed.is_empty() {
        return 0;
    }

    let mut parts = trimmed.splitn(2, ':');
    let hours = parts.next().and_then(|p| p.trim().parse::<u32>().ok());
    let minutes = parts.next().and_then(|p| p.trim().parse::<u32>().ok());

    match (hours, minutes) {
        (Some(h), Some(m)) => h * 60 + m,
        _ => 0,
    }
}

// =============================================================================
// Shift Window
// =============================================================================

/// An employee's scheduled shift, in minutes-of-day.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct ShiftWindow {
    /// Scheduled start, minutes since midnight.
    pub start_minutes: u32,
    /// Scheduled end, minutes since midnight.
    pub end_minutes: u32,
}

impl ShiftWindow {
    /// Builds a window from `"HH:MM"` shift strings (zero-defaulting).
    pub fn from_strings(shift_start: &str, shift_end: &str) -> Self {
        ShiftWindow {
            start_minutes: time_to_minutes(shift_start),
            end_minutes: time_to_minutes(shift_end),
        }
    }

    /// Total scheduled minutes. Clamped to zero if the window is inverted
    /// (overnight shifts are not modeled).
    #[inline]
    pub fn scheduled_minutes(&self) -> u32 {
        self.end_minutes.saturating_sub(self.start_minutes)
    }

    /// Whether the half-day cutoff gets the 30-minute grace.
    ///
    /// Shifts of 12 hours or more get no grace; everything shorter does.
    #[inline]
    fn half_day_grace(&self) -> u32 {
        if self.scheduled_minutes() < LONG_SHIFT_MINUTES {
            HALF_DAY_GRACE_MINUTES
        } else {
            0
        }
    }

    /// Whether `worked_minutes` falls inside the half-day band
    /// `[scheduled/2 + grace, scheduled × 0.75]`.
    ///
    /// Comparisons are scaled (×2 and ×4) so the band bounds are exact even
    /// for odd scheduled lengths, with no float arithmetic.
    pub fn is_half_day(&self, worked_minutes: u32) -> bool {
        let scheduled = self.scheduled_minutes();
        if scheduled == 0 {
            return false;
        }
        let worked = worked_minutes as u64;
        let scheduled = scheduled as u64;
        let grace = self.half_day_grace() as u64;

        // worked >= scheduled/2 + grace
        let above_threshold = worked * 2 >= scheduled + grace * 2;
        // worked <= scheduled * 0.75
        let below_ceiling = worked * 4 <= scheduled * 3;

        above_threshold && below_ceiling
    }
}

// =============================================================================
// Day Classification
// =============================================================================

/// The payroll classification of one employee-day.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export)]
#[serde(rename_all = "snake_case", tag = "kind")]
pub enum DayClass {
    /// No attendance record, or an explicit ABSENT status.
    /// Contributes nothing: no presence, no late, no undertime.
    Absent,
    /// Official business or paid time off. A full paid present day that
    /// never accrues late/undertime, regardless of any recorded punches.
    Excused,
    /// Worked time fell inside the half-day band. Presence is 0.5 and
    /// late/undertime are suppressed irrespective of actual punch times.
    HalfDay,
    /// A regular full day. Presence is 1.0; late/undertime accrue only
    /// from punches that were actually made.
    Full {
        late_minutes: u32,
        undertime_minutes: u32,
    },
}

impl DayClass {
    /// Presence contribution in half-day units (0, 1, or 2).
    ///
    /// Half-day units keep presence math in integers; the row calculator
    /// converts to days only at the display boundary.
    #[inline]
    pub fn present_half_days(&self) -> u32 {
        match self {
            DayClass::Absent => 0,
            DayClass::HalfDay => 1,
            DayClass::Excused | DayClass::Full { .. } => 2,
        }
    }

    /// Late minutes contributed by this day.
    #[inline]
    pub fn late_minutes(&self) -> u32 {
        match self {
            DayClass::Full { late_minutes, .. } => *late_minutes,
            _ => 0,
        }
    }

    /// Undertime minutes contributed by this day.
    #[inline]
    pub fn undertime_minutes(&self) -> u32 {
        match self {
            DayClass::Full {
                undertime_minutes, ..
            } => *undertime_minutes,
            _ => 0,
        }
    }
}

/// Classifies one employee-day against the scheduled shift window.
///
/// This is the shared half-day rule: every consumer (override authorization,
/// weekly grid, row calculator) goes through this function.
///
/// ## Rules
/// 1. Missing record or status ABSENT → [`DayClass::Absent`]
/// 2. Status OB/PTO → [`DayClass::Excused`] (punches ignored entirely)
/// 3. REGULAR: `worked = time_out − time_in` (0 if either punch missing,
///    clamped at 0 if inverted). Inside the half-day band →
///    [`DayClass::HalfDay`]; otherwise [`DayClass::Full`] with
///    `late = max(0, time_in − shift_start)` only when a time-in was
///    punched, and `undertime = max(0, shift_end − time_out)` only when a
///    time-out was punched.
///
/// A REGULAR record with no punches at all is still a full present day with
/// zero late/undertime: the terminal creates the record at clock-in, so its
/// existence is the presence signal.
pub fn classify_day(window: &ShiftWindow, record: Option<&AttendanceRecord>) -> DayClass {
    let record = match record {
        Some(r) => r,
        None => return DayClass::Absent,
    };

    match record.status {
        AttendanceStatus::Absent => return DayClass::Absent,
        AttendanceStatus::Ob | AttendanceStatus::Pto => return DayClass::Excused,
        AttendanceStatus::Regular => {}
    }

    let punched_in = record.punched_in();
    let punched_out = record.punched_out();

    let in_minutes = record
        .time_in
        .as_deref()
        .map(time_to_minutes)
        .unwrap_or(0);
    let out_minutes = record
        .time_out
        .as_deref()
        .map(time_to_minutes)
        .unwrap_or(0);

    let worked_minutes = if punched_in && punched_out {
        out_minutes.saturating_sub(in_minutes)
    } else {
        0
    };

    if window.is_half_day(worked_minutes) {
        return DayClass::HalfDay;
    }

    let late_minutes = if punched_in {
        in_minutes.saturating_sub(window.start_minutes)
    } else {
        0
    };
    let undertime_minutes = if punched_out {
        window.end_minutes.saturating_sub(out_minutes)
    } else {
        0
    };

    DayClass::Full {
        late_minutes,
        undertime_minutes,
    }
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::AttendanceRecord;
    use chrono::NaiveDate;

    fn record(time_in: Option<&str>, time_out: Option<&str>, status: AttendanceStatus) -> AttendanceRecord {
        AttendanceRecord {
            id: "att-1".to_string(),
            employee_id: "emp-1".to_string(),
            date: NaiveDate::from_ymd_opt(2026, 3, 2).unwrap(),
            time_in: time_in.map(String::from),
            time_out: time_out.map(String::from),
            late_minutes: 0,
            undertime_minutes: 0,
            overtime_minutes: 0,
            is_half_day: false,
            status,
            created_at: chrono::Utc::now(),
            updated_at: chrono::Utc::now(),
        }
    }

    fn day_shift() -> ShiftWindow {
        // 08:00–17:00: 540 scheduled minutes
        ShiftWindow::from_strings("08:00", "17:00")
    }

    #[test]
    fn test_time_to_minutes() {
        assert_eq!(time_to_minutes("08:30"), 510);
        assert_eq!(time_to_minutes("00:00"), 0);
        assert_eq!(time_to_minutes("17:05"), 1025);
        // Zero defaults, never errors
        assert_eq!(time_to_minutes(""), 0);
        assert_eq!(time_to_minutes("   "), 0);
        assert_eq!(time_to_minutes("8"), 0);
        assert_eq!(time_to_minutes("ab:cd"), 0);
    }

    #[test]
    fn test_scheduled_minutes() {
        assert_eq!(day_shift().scheduled_minutes(), 540);
        // Inverted window clamps to zero rather than going negative
        let inverted = ShiftWindow::from_strings("17:00", "08:00");
        assert_eq!(inverted.scheduled_minutes(), 0);
    }

    #[test]
    fn test_half_day_band_bounds() {
        let window = day_shift();
        // threshold = 540/2 + 30 = 300, ceiling = 540 × 0.75 = 405
        assert!(!window.is_half_day(299));
        assert!(window.is_half_day(300));
        assert!(window.is_half_day(405));
        assert!(!window.is_half_day(406));
    }

    #[test]
    fn test_long_shift_gets_no_grace() {
        // 06:00–18:00: exactly 720 minutes, threshold is 360 with no grace
        let window = ShiftWindow::from_strings("06:00", "18:00");
        assert!(window.is_half_day(360));
        assert!(!window.is_half_day(359));
    }

    #[test]
    fn test_classify_half_day_example() {
        // 08:00 in, 13:00 out = 300 worked, inside [300, 405]
        let window = day_shift();
        let rec = record(Some("08:00"), Some("13:00"), AttendanceStatus::Regular);
        let class = classify_day(&window, Some(&rec));
        assert_eq!(class, DayClass::HalfDay);
        assert_eq!(class.present_half_days(), 1);
        assert_eq!(class.late_minutes(), 0);
        assert_eq!(class.undertime_minutes(), 0);
    }

    #[test]
    fn test_classify_short_day_is_full_with_undertime() {
        // 08:00 in, 11:00 out = 180 worked — below the band, so NOT a
        // half-day: full presence plus undertime counted from 17:00.
        let window = day_shift();
        let rec = record(Some("08:00"), Some("11:00"), AttendanceStatus::Regular);
        let class = classify_day(&window, Some(&rec));
        assert_eq!(
            class,
            DayClass::Full {
                late_minutes: 0,
                undertime_minutes: 360,
            }
        );
        assert_eq!(class.present_half_days(), 2);
    }

    #[test]
    fn test_classify_late_arrival() {
        let window = day_shift();
        let rec = record(Some("08:45"), Some("17:00"), AttendanceStatus::Regular);
        assert_eq!(
            classify_day(&window, Some(&rec)),
            DayClass::Full {
                late_minutes: 45,
                undertime_minutes: 0,
            }
        );
    }

    #[test]
    fn test_missing_punches_never_penalize() {
        let window = day_shift();
        // No punches at all: full day, zero late/undertime
        let rec = record(None, None, AttendanceStatus::Regular);
        assert_eq!(
            classify_day(&window, Some(&rec)),
            DayClass::Full {
                late_minutes: 0,
                undertime_minutes: 0,
            }
        );
        // Only a time-in: undertime must not accrue from the missing out
        let rec = record(Some("09:00"), None, AttendanceStatus::Regular);
        assert_eq!(
            classify_day(&window, Some(&rec)),
            DayClass::Full {
                late_minutes: 60,
                undertime_minutes: 0,
            }
        );
        // Empty-string punches behave like missing punches
        let rec = record(Some(""), Some(""), AttendanceStatus::Regular);
        assert_eq!(
            classify_day(&window, Some(&rec)),
            DayClass::Full {
                late_minutes: 0,
                undertime_minutes: 0,
            }
        );
    }

    #[test]
    fn test_classify_absent_and_missing() {
        let window = day_shift();
        assert_eq!(classify_day(&window, None), DayClass::Absent);
        let rec = record(Some("08:00"), Some("17:00"), AttendanceStatus::Absent);
        assert_eq!(classify_day(&window, Some(&rec)), DayClass::Absent);
    }

    #[test]
    fn test_classify_excused_ignores_punches() {
        let window = day_shift();
        // Even with punches that would otherwise be late + undertime,
        // OB/PTO days never accrue penalties.
        let rec = record(Some("10:00"), Some("12:00"), AttendanceStatus::Ob);
        let class = classify_day(&window, Some(&rec));
        assert_eq!(class, DayClass::Excused);
        assert_eq!(class.present_half_days(), 2);
        assert_eq!(class.late_minutes(), 0);

        let rec = record(None, None, AttendanceStatus::Pto);
        assert_eq!(classify_day(&window, Some(&rec)), DayClass::Excused);
    }
}
