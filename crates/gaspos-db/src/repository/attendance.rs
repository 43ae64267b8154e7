//! # Attendance Repository
//!
//! Database operations for attendance records.
//!
//! ## One Record Per Employee-Day
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  The terminal creates the record at clock-in and completes it at       │
//! │  clock-out; back-office corrections rewrite the same record.           │
//! │                                                                         │
//! │  upsert() ──► INSERT ... ON CONFLICT (employee_id, date) DO UPDATE     │
//! │                                                                         │
//! │  Whoever writes last wins the whole row. The UNIQUE index is the       │
//! │  invariant the payroll calculator relies on when it builds its         │
//! │  per-date map.                                                          │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

use chrono::NaiveDate;
use sqlx::SqlitePool;
use tracing::debug;

use crate::error::DbResult;
use gaspos_core::{AttendanceRecord, AttendanceStatus};

// =============================================================================
// Row Mapping
// =============================================================================

#[derive(Debug, sqlx::FromRow)]
struct AttendanceRow {
    id: String,
    employee_id: String,
    date: NaiveDate,
    time_in: Option<String>,
    time_out: Option<String>,
    late_minutes: i64,
    undertime_minutes: i64,
    overtime_minutes: i64,
    is_half_day: bool,
    status: AttendanceStatus,
    created_at: chrono::DateTime<chrono::Utc>,
    updated_at: chrono::DateTime<chrono::Utc>,
}

impl From<AttendanceRow> for AttendanceRecord {
    fn from(row: AttendanceRow) -> Self {
        AttendanceRecord {
            id: row.id,
            employee_id: row.employee_id,
            date: row.date,
            time_in: row.time_in,
            time_out: row.time_out,
            late_minutes: row.late_minutes,
            undertime_minutes: row.undertime_minutes,
            overtime_minutes: row.overtime_minutes,
            is_half_day: row.is_half_day,
            status: row.status,
            created_at: row.created_at,
            updated_at: row.updated_at,
        }
    }
}

const SELECT_COLUMNS: &str = r#"
    id, employee_id, date, time_in, time_out,
    late_minutes, undertime_minutes, overtime_minutes,
    is_half_day, status, created_at, updated_at
"#;

// =============================================================================
// Repository
// =============================================================================

/// Repository for attendance database operations.
#[derive(Debug, Clone)]
pub struct AttendanceRepository {
    pool: SqlitePool,
}

impl AttendanceRepository {
    /// Creates a new AttendanceRepository.
    pub fn new(pool: SqlitePool) -> Self {
        AttendanceRepository { pool }
    }

    /// Inserts or replaces the record for this (employee, date).
    ///
    /// On conflict everything except `id` and `created_at` is overwritten:
    /// the stored row always reflects the latest write in full, there is no
    /// field-level merging.
    pub async fn upsert(&self, record: &AttendanceRecord) -> DbResult<()> {
        debug!(
            employee_id = %record.employee_id,
            date = %record.date,
            "Upserting attendance record"
        );

        sqlx::query(
            r#"
            INSERT INTO attendance (
                id, employee_id, date, time_in, time_out,
                late_minutes, undertime_minutes, overtime_minutes,
                is_half_day, status, created_at, updated_at
            ) VALUES (
                ?1, ?2, ?3, ?4, ?5,
                ?6, ?7, ?8,
                ?9, ?10, ?11, ?12
            )
            ON CONFLICT (employee_id, date) DO UPDATE SET
                time_in = excluded.time_in,
                time_out = excluded.time_out,
                late_minutes = excluded.late_minutes,
                undertime_minutes = excluded.undertime_minutes,
                overtime_minutes = excluded.overtime_minutes,
                is_half_day = excluded.is_half_day,
                status = excluded.status,
                updated_at = excluded.updated_at
            "#,
        )
        .bind(&record.id)
        .bind(&record.employee_id)
        .bind(record.date)
        .bind(&record.time_in)
        .bind(&record.time_out)
        .bind(record.late_minutes)
        .bind(record.undertime_minutes)
        .bind(record.overtime_minutes)
        .bind(record.is_half_day)
        .bind(record.status)
        .bind(record.created_at)
        .bind(record.updated_at)
        .execute(&self.pool)
        .await?;

        Ok(())
    }

    /// Gets the record for one employee on one date.
    pub async fn get(
        &self,
        employee_id: &str,
        date: NaiveDate,
    ) -> DbResult<Option<AttendanceRecord>> {
        let row: Option<AttendanceRow> = sqlx::query_as(&format!(
            "SELECT {SELECT_COLUMNS} FROM attendance WHERE employee_id = ?1 AND date = ?2"
        ))
        .bind(employee_id)
        .bind(date)
        .fetch_optional(&self.pool)
        .await?;

        Ok(row.map(AttendanceRecord::from))
    }

    /// Lists all records inside `[start, end]` inclusive, for all employees.
    ///
    /// This is the payroll engine's snapshot load: one query per run.
    pub async fn list_between(
        &self,
        start: NaiveDate,
        end: NaiveDate,
    ) -> DbResult<Vec<AttendanceRecord>> {
        let rows: Vec<AttendanceRow> = sqlx::query_as(&format!(
            r#"
            SELECT {SELECT_COLUMNS} FROM attendance
            WHERE date >= ?1 AND date <= ?2
            ORDER BY employee_id, date
            "#
        ))
        .bind(start)
        .bind(end)
        .fetch_all(&self.pool)
        .await?;

        Ok(rows.into_iter().map(AttendanceRecord::from).collect())
    }

    /// Lists one employee's records inside `[start, end]` inclusive.
    pub async fn list_for_employee(
        &self,
        employee_id: &str,
        start: NaiveDate,
        end: NaiveDate,
    ) -> DbResult<Vec<AttendanceRecord>> {
        let rows: Vec<AttendanceRow> = sqlx::query_as(&format!(
            r#"
            SELECT {SELECT_COLUMNS} FROM attendance
            WHERE employee_id = ?1 AND date >= ?2 AND date <= ?3
            ORDER BY date
            "#
        ))
        .bind(employee_id)
        .bind(start)
        .bind(end)
        .fetch_all(&self.pool)
        .await?;

        Ok(rows.into_iter().map(AttendanceRecord::from).collect())
    }
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::pool::{Database, DbConfig};
    use chrono::Utc;
    use gaspos_core::{Employee, EmployeeType};

    fn date(d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(2026, 3, d).unwrap()
    }

    fn record(id: &str, employee_id: &str, d: u32) -> AttendanceRecord {
        AttendanceRecord {
            id: id.to_string(),
            employee_id: employee_id.to_string(),
            date: date(d),
            time_in: Some("08:00".to_string()),
            time_out: None,
            late_minutes: 0,
            undertime_minutes: 0,
            overtime_minutes: 0,
            is_half_day: false,
            status: AttendanceStatus::Regular,
            created_at: Utc::now(),
            updated_at: Utc::now(),
        }
    }

    async fn test_db_with_employee(employee_id: &str) -> Database {
        let db = Database::new(DbConfig::in_memory()).await.unwrap();
        let employee = Employee {
            id: employee_id.to_string(),
            employee_no: format!("EMP-{employee_id}"),
            name: "Test".to_string(),
            employee_type: EmployeeType::Staff,
            store_ids: vec!["STORE-01".to_string()],
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
        db.employees().insert(&employee).await.unwrap();
        db
    }

    #[tokio::test]
    async fn test_upsert_replaces_same_day() {
        let db = test_db_with_employee("emp-1").await;
        let repo = db.attendance();

        // Clock-in creates the record
        repo.upsert(&record("att-1", "emp-1", 2)).await.unwrap();

        // Clock-out rewrites the same (employee, date) row
        let mut completed = record("att-1", "emp-1", 2);
        completed.time_out = Some("17:00".to_string());
        completed.status = AttendanceStatus::Regular;
        repo.upsert(&completed).await.unwrap();

        let loaded = repo.get("emp-1", date(2)).await.unwrap().unwrap();
        assert_eq!(loaded.time_out.as_deref(), Some("17:00"));

        // Still exactly one record for the day
        let all = repo.list_between(date(1), date(31)).await.unwrap();
        assert_eq!(all.len(), 1);
    }

    #[tokio::test]
    async fn test_list_between_is_inclusive() {
        let db = test_db_with_employee("emp-1").await;
        let repo = db.attendance();

        for d in 2..=8 {
            repo.upsert(&record(&format!("att-{d}"), "emp-1", d))
                .await
                .unwrap();
        }

        let rows = repo.list_between(date(3), date(5)).await.unwrap();
        assert_eq!(rows.len(), 3);
        assert_eq!(rows[0].date, date(3));
        assert_eq!(rows[2].date, date(5));
    }

    #[tokio::test]
    async fn test_status_round_trip() {
        let db = test_db_with_employee("emp-1").await;
        let repo = db.attendance();

        let mut rec = record("att-1", "emp-1", 2);
        rec.status = AttendanceStatus::Pto;
        rec.time_in = None;
        repo.upsert(&rec).await.unwrap();

        let loaded = repo
            .list_for_employee("emp-1", date(1), date(31))
            .await
            .unwrap();
        assert_eq!(loaded.len(), 1);
        assert_eq!(loaded[0].status, AttendanceStatus::Pto);
        assert!(loaded[0].time_in.is_none());
    }

    #[tokio::test]
    async fn test_foreign_key_enforced() {
        let db = Database::new(DbConfig::in_memory()).await.unwrap();
        let err = db
            .attendance()
            .upsert(&record("att-1", "ghost", 2))
            .await
            .unwrap_err();
        assert!(matches!(
            err,
            crate::error::DbError::ForeignKeyViolation { .. }
        ));
    }
}
