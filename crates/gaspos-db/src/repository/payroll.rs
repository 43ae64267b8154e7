//! # Payroll Repository
//!
//! Database operations for payroll drafts, finalized history, and the
//! finalization transaction itself.
//!
//! ## Payroll Lifecycle
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                      Payroll Lifecycle                                  │
//! │                                                                         │
//! │  1. DRAFT                                                              │
//! │     └── save_draft() → upsert keyed by (store, period)                 │
//! │     └── load_draft() → replay adjustments into the engine              │
//! │                                                                         │
//! │  2. FINALIZE (single transaction)                                      │
//! │     └── commit_finalization(outcome):                                  │
//! │         a. UPDATE each employee's loan/SSS/vale balances               │
//! │         b. INSERT the frozen history record                            │
//! │         c. INSERT INTO sync_outbox ('PAYROLL', record JSON)            │
//! │         d. DELETE the draft for this (store, period)                   │
//! │         ← All four succeed or all four roll back                       │
//! │                                                                         │
//! │  3. HISTORY                                                            │
//! │     └── list_history() / get_history() → read-only archive             │
//! │     └── replace_history() → admin edit swaps the snapshot wholesale    │
//! │                                                                         │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! The engine's duplicate-period check reads `period_is_finalized` first;
//! the UNIQUE index on (store_id, period_start, period_end) is the backstop
//! for two operators racing to finalize the same week.

use chrono::NaiveDate;
use sqlx::SqlitePool;
use tracing::{debug, info};
use uuid::Uuid;

use crate::error::{DbError, DbResult};
use gaspos_core::engine::FinalizeOutcome;
use gaspos_core::{PayPeriod, PayrollDraft, PayrollHistoryRecord};

// =============================================================================
// Row Mapping
// =============================================================================

#[derive(Debug, sqlx::FromRow)]
struct DraftRow {
    id: String,
    store_id: String,
    period_start: NaiveDate,
    period_end: NaiveDate,
    adjustments: String,
    updated_at: chrono::DateTime<chrono::Utc>,
}

impl DraftRow {
    fn into_draft(self) -> DbResult<PayrollDraft> {
        Ok(PayrollDraft {
            id: self.id,
            store_id: self.store_id,
            period_start: self.period_start,
            period_end: self.period_end,
            adjustments: serde_json::from_str(&self.adjustments)?,
            updated_at: self.updated_at,
        })
    }
}

#[derive(Debug, sqlx::FromRow)]
struct HistoryRow {
    id: String,
    store_id: String,
    period_start: NaiveDate,
    period_end: NaiveDate,
    generated_at: chrono::DateTime<chrono::Utc>,
    generated_by: String,
    total_disbursement_cents: i64,
    rows: String,
}

impl HistoryRow {
    fn into_record(self) -> DbResult<PayrollHistoryRecord> {
        Ok(PayrollHistoryRecord {
            id: self.id,
            store_id: self.store_id,
            period_start: self.period_start,
            period_end: self.period_end,
            generated_at: self.generated_at,
            generated_by: self.generated_by,
            total_disbursement_cents: self.total_disbursement_cents,
            rows: serde_json::from_str(&self.rows)?,
        })
    }
}

const HISTORY_COLUMNS: &str = r#"
    id, store_id, period_start, period_end,
    generated_at, generated_by, total_disbursement_cents, rows
"#;

// =============================================================================
// Repository
// =============================================================================

/// Repository for payroll draft and history operations.
#[derive(Debug, Clone)]
pub struct PayrollRepository {
    pool: SqlitePool,
}

impl PayrollRepository {
    /// Creates a new PayrollRepository.
    pub fn new(pool: SqlitePool) -> Self {
        PayrollRepository { pool }
    }

    // =========================================================================
    // Drafts
    // =========================================================================

    /// Saves a draft, replacing any existing draft for its (store, period).
    pub async fn save_draft(&self, draft: &PayrollDraft) -> DbResult<()> {
        debug!(id = %draft.id, "Saving payroll draft");

        let adjustments = serde_json::to_string(&draft.adjustments)?;

        sqlx::query(
            r#"
            INSERT INTO payroll_drafts (
                id, store_id, period_start, period_end, adjustments, updated_at
            ) VALUES (?1, ?2, ?3, ?4, ?5, ?6)
            ON CONFLICT (id) DO UPDATE SET
                adjustments = excluded.adjustments,
                updated_at = excluded.updated_at
            "#,
        )
        .bind(&draft.id)
        .bind(&draft.store_id)
        .bind(draft.period_start)
        .bind(draft.period_end)
        .bind(adjustments)
        .bind(draft.updated_at)
        .execute(&self.pool)
        .await?;

        Ok(())
    }

    /// Loads the draft for a (store, period), if one was saved.
    ///
    /// A missing draft is not an error: it means no manual overrides yet.
    pub async fn load_draft(
        &self,
        store_id: &str,
        period: &PayPeriod,
    ) -> DbResult<Option<PayrollDraft>> {
        let row: Option<DraftRow> = sqlx::query_as(
            r#"
            SELECT id, store_id, period_start, period_end, adjustments, updated_at
            FROM payroll_drafts
            WHERE store_id = ?1 AND period_start = ?2 AND period_end = ?3
            "#,
        )
        .bind(store_id)
        .bind(period.start)
        .bind(period.end)
        .fetch_optional(&self.pool)
        .await?;

        row.map(DraftRow::into_draft).transpose()
    }

    /// Deletes the draft for a (store, period). No-op if none exists.
    pub async fn delete_draft(&self, store_id: &str, period: &PayPeriod) -> DbResult<()> {
        sqlx::query(
            "DELETE FROM payroll_drafts WHERE store_id = ?1 AND period_start = ?2 AND period_end = ?3",
        )
        .bind(store_id)
        .bind(period.start)
        .bind(period.end)
        .execute(&self.pool)
        .await?;

        Ok(())
    }

    // =========================================================================
    // Finalization
    // =========================================================================

    /// Whether a history record already exists for this (store, period).
    ///
    /// The engine consults this before computing a finalization.
    pub async fn period_is_finalized(
        &self,
        store_id: &str,
        period: &PayPeriod,
    ) -> DbResult<bool> {
        let count: i64 = sqlx::query_scalar(
            r#"
            SELECT COUNT(*) FROM payroll_history
            WHERE store_id = ?1 AND period_start = ?2 AND period_end = ?3
            "#,
        )
        .bind(store_id)
        .bind(period.start)
        .bind(period.end)
        .fetch_one(&self.pool)
        .await?;

        Ok(count > 0)
    }

    /// Persists a finalization atomically.
    ///
    /// Employee balance updates, the frozen history record, the outbox
    /// entry, and the draft cleanup all commit together. If any statement
    /// fails the transaction rolls back and the caller must NOT apply the
    /// outcome to its in-memory engine.
    pub async fn commit_finalization(&self, outcome: &FinalizeOutcome) -> DbResult<()> {
        let record = &outcome.record;
        info!(
            record_id = %record.id,
            store_id = %record.store_id,
            period_start = %record.period_start,
            period_end = %record.period_end,
            employees = outcome.updated_employees.len(),
            "Committing payroll finalization"
        );

        let rows_json = serde_json::to_string(&record.rows)?;
        let payload = serde_json::to_string(record)?;

        let mut tx = self.pool.begin().await?;

        // 1. Settle every in-scope employee's balances
        for employee in &outcome.updated_employees {
            let result = sqlx::query(
                r#"
                UPDATE employees SET
                    loan_balance_cents = ?2,
                    sss_balance_cents = ?3,
                    vale_balance_cents = ?4,
                    updated_at = ?5
                WHERE id = ?1
                "#,
            )
            .bind(&employee.id)
            .bind(employee.loan_balance_cents)
            .bind(employee.sss_balance_cents)
            .bind(employee.vale_balance_cents)
            .bind(employee.updated_at)
            .execute(&mut *tx)
            .await?;

            if result.rows_affected() == 0 {
                return Err(DbError::not_found("Employee", &employee.id));
            }
        }

        // 2. Freeze the history record (UNIQUE index rejects a duplicate
        //    period here, rolling back the balance updates above)
        sqlx::query(
            r#"
            INSERT INTO payroll_history (
                id, store_id, period_start, period_end,
                generated_at, generated_by, total_disbursement_cents, rows
            ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8)
            "#,
        )
        .bind(&record.id)
        .bind(&record.store_id)
        .bind(record.period_start)
        .bind(record.period_end)
        .bind(record.generated_at)
        .bind(&record.generated_by)
        .bind(record.total_disbursement_cents)
        .bind(rows_json)
        .execute(&mut *tx)
        .await?;

        // 3. Queue the run for upstream sync in the same transaction
        sqlx::query(
            r#"
            INSERT INTO sync_outbox (
                id, entity_type, entity_id, payload, attempts, created_at
            ) VALUES (?1, 'PAYROLL', ?2, ?3, 0, ?4)
            "#,
        )
        .bind(Uuid::new_v4().to_string())
        .bind(&record.id)
        .bind(payload)
        .bind(record.generated_at)
        .execute(&mut *tx)
        .await?;

        // 4. The draft served its purpose
        sqlx::query(
            "DELETE FROM payroll_drafts WHERE store_id = ?1 AND period_start = ?2 AND period_end = ?3",
        )
        .bind(&record.store_id)
        .bind(record.period_start)
        .bind(record.period_end)
        .execute(&mut *tx)
        .await?;

        tx.commit().await?;

        info!(record_id = %record.id, "Finalization committed");
        Ok(())
    }

    // =========================================================================
    // History
    // =========================================================================

    /// Lists finalized records, most recent first.
    pub async fn list_history(&self, limit: i64) -> DbResult<Vec<PayrollHistoryRecord>> {
        let rows: Vec<HistoryRow> = sqlx::query_as(&format!(
            r#"
            SELECT {HISTORY_COLUMNS} FROM payroll_history
            ORDER BY generated_at DESC
            LIMIT ?1
            "#
        ))
        .bind(limit)
        .fetch_all(&self.pool)
        .await?;

        rows.into_iter().map(HistoryRow::into_record).collect()
    }

    /// Gets one finalized record by ID.
    pub async fn get_history(&self, id: &str) -> DbResult<Option<PayrollHistoryRecord>> {
        let row: Option<HistoryRow> = sqlx::query_as(&format!(
            "SELECT {HISTORY_COLUMNS} FROM payroll_history WHERE id = ?1"
        ))
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;

        row.map(HistoryRow::into_record).transpose()
    }

    /// Replaces a finalized record after an admin edit.
    ///
    /// Only the snapshot fields change; identity and period stay fixed.
    /// Employee balances are never touched here.
    pub async fn replace_history(&self, record: &PayrollHistoryRecord) -> DbResult<()> {
        debug!(id = %record.id, "Replacing history record");

        let rows_json = serde_json::to_string(&record.rows)?;

        let result = sqlx::query(
            r#"
            UPDATE payroll_history SET
                total_disbursement_cents = ?2,
                rows = ?3
            WHERE id = ?1
            "#,
        )
        .bind(&record.id)
        .bind(record.total_disbursement_cents)
        .bind(rows_json)
        .execute(&self.pool)
        .await?;

        if result.rows_affected() == 0 {
            return Err(DbError::not_found("Payroll history record", &record.id));
        }

        Ok(())
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
    use gaspos_core::engine::{edit_history_row, HistoryEdit, PayrollEngine};
    use gaspos_core::{
        AdjustmentSet, AttendanceRecord, AttendanceStatus, Employee, EmployeeType, Money,
    };

    fn date(d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(2026, 3, d).unwrap()
    }

    fn week() -> PayPeriod {
        PayPeriod::new(date(2), date(8)).unwrap()
    }

    fn employee(id: &str) -> Employee {
        Employee {
            id: id.to_string(),
            employee_no: format!("EMP-{id}"),
            name: format!("Employee {id}"),
            employee_type: EmployeeType::Staff,
            store_ids: vec!["STORE-01".to_string()],
            daily_rate_cents: 61_000,
            shift_start: "08:00".to_string(),
            shift_end: "17:00".to_string(),
            pin: None,
            loan_balance_cents: 50_000,
            loan_weekly_cents: 20_000,
            sss_balance_cents: 0,
            sss_weekly_cents: 0,
            vale_balance_cents: 7_500,
            created_at: Utc::now(),
            updated_at: Utc::now(),
        }
    }

    fn punches(employee_id: &str) -> Vec<AttendanceRecord> {
        (2..=7)
            .map(|d| AttendanceRecord {
                id: Uuid::new_v4().to_string(),
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

    /// Seeds a database and returns an engine loaded from it, mirroring the
    /// host app's payroll-screen flow.
    async fn seeded() -> (Database, PayrollEngine) {
        let db = Database::new(DbConfig::in_memory()).await.unwrap();
        db.employees().insert(&employee("emp-1")).await.unwrap();
        for rec in punches("emp-1") {
            db.attendance().upsert(&rec).await.unwrap();
        }

        let employees = db.employees().list().await.unwrap();
        let attendance = db
            .attendance()
            .list_between(week().start, week().end)
            .await
            .unwrap();
        let engine =
            PayrollEngine::new(employees, attendance, week()).scoped_to("STORE-01");
        (db, engine)
    }

    #[tokio::test]
    async fn test_draft_save_load_replace() {
        let (db, mut engine) = seeded().await;

        engine.set_incentive("emp-1", Money::from_cents(10_000));
        db.payroll().save_draft(&engine.draft(Utc::now())).await.unwrap();

        // Saving again replaces, never merges
        let mut replacement = AdjustmentSet::new();
        replacement.set_overtime_for_date("emp-1", date(3), 2.0);
        engine.load_adjustments(replacement);
        db.payroll().save_draft(&engine.draft(Utc::now())).await.unwrap();

        let loaded = db
            .payroll()
            .load_draft("STORE-01", &week())
            .await
            .unwrap()
            .unwrap();
        let adj = loaded.adjustments.get("emp-1").unwrap();
        assert!(adj.incentive.is_zero());
        assert_eq!(adj.overtime.len(), 1);

        // Unknown scope has no draft, and that's not an error
        assert!(db
            .payroll()
            .load_draft("STORE-02", &week())
            .await
            .unwrap()
            .is_none());
    }

    #[tokio::test]
    async fn test_finalization_commits_all_effects() {
        let (db, mut engine) = seeded().await;

        engine.set_incentive("emp-1", Money::from_cents(10_000));
        db.payroll().save_draft(&engine.draft(Utc::now())).await.unwrap();

        let outcome = engine.finalize("admin", true, Utc::now(), &[]).unwrap();
        db.payroll().commit_finalization(&outcome).await.unwrap();
        engine.apply_finalization(&outcome);

        // Balances settled on disk
        let settled = db.employees().get_by_id("emp-1").await.unwrap().unwrap();
        assert_eq!(settled.loan_balance_cents, 30_000);
        assert_eq!(settled.vale_balance_cents, 0);

        // History frozen
        assert!(db
            .payroll()
            .period_is_finalized("STORE-01", &week())
            .await
            .unwrap());
        let history = db.payroll().list_history(10).await.unwrap();
        assert_eq!(history.len(), 1);
        assert_eq!(history[0].rows.len(), 1);
        assert_eq!(history[0].rows[0].incentive_cents, 10_000);
        assert_eq!(
            history[0].total_disbursement_cents,
            history[0].rows[0].net_cents
        );

        // Outbox queued
        let pending = db.outbox().pending(10).await.unwrap();
        assert_eq!(pending.len(), 1);
        assert_eq!(pending[0].entity_type, "PAYROLL");
        assert_eq!(pending[0].entity_id, outcome.record.id);

        // Draft consumed
        assert!(db
            .payroll()
            .load_draft("STORE-01", &week())
            .await
            .unwrap()
            .is_none());
    }

    #[tokio::test]
    async fn test_duplicate_finalization_rolls_back() {
        let (db, engine) = seeded().await;

        let first = engine.finalize("admin", true, Utc::now(), &[]).unwrap();
        db.payroll().commit_finalization(&first).await.unwrap();

        // A second outcome for the same period (engine bypassed its own
        // guard by being handed stale history) must hit the UNIQUE index
        // and roll back its balance updates.
        let second = engine.finalize("admin", true, Utc::now(), &[]).unwrap();
        let err = db.payroll().commit_finalization(&second).await.unwrap_err();
        assert!(matches!(err, DbError::UniqueViolation { .. }));

        // Balances reflect exactly one finalization
        let settled = db.employees().get_by_id("emp-1").await.unwrap().unwrap();
        assert_eq!(settled.loan_balance_cents, 30_000);
        assert_eq!(db.payroll().list_history(10).await.unwrap().len(), 1);
    }

    #[tokio::test]
    async fn test_history_admin_edit_round_trip() {
        let (db, engine) = seeded().await;

        let outcome = engine.finalize("admin", true, Utc::now(), &[]).unwrap();
        db.payroll().commit_finalization(&outcome).await.unwrap();

        let record = db
            .payroll()
            .get_history(&outcome.record.id)
            .await
            .unwrap()
            .unwrap();
        let edited = edit_history_row(
            &record,
            "emp-1",
            HistoryEdit::Incentive(Money::from_cents(15_000)),
        )
        .unwrap();
        db.payroll().replace_history(&edited).await.unwrap();

        let reloaded = db
            .payroll()
            .get_history(&outcome.record.id)
            .await
            .unwrap()
            .unwrap();
        assert_eq!(reloaded.rows[0].incentive_cents, 15_000);
        assert_eq!(
            reloaded.total_disbursement_cents,
            edited.total_disbursement_cents
        );

        // Balances untouched by the paper correction
        let settled = db.employees().get_by_id("emp-1").await.unwrap().unwrap();
        assert_eq!(settled.loan_balance_cents, 30_000);
    }
}
