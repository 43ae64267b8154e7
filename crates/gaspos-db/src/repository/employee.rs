//! # Employee Repository
//!
//! Database operations for employees.
//!
//! ## JSON Column: store_ids
//! Store assignments are a small, single-writer list read back in full every
//! time, so they live in a JSON text column rather than a join table. The
//! row struct carries the raw text; decoding happens once in
//! `EmployeeRow::into_employee`.

use sqlx::SqlitePool;
use tracing::debug;

use crate::error::{DbError, DbResult};
use gaspos_core::{Employee, EmployeeType};

// =============================================================================
// Row Mapping
// =============================================================================

/// Raw employee row as stored; JSON columns still encoded.
#[derive(Debug, sqlx::FromRow)]
struct EmployeeRow {
    id: String,
    employee_no: String,
    name: String,
    employee_type: EmployeeType,
    store_ids: String,
    daily_rate_cents: i64,
    shift_start: String,
    shift_end: String,
    pin: Option<String>,
    loan_balance_cents: i64,
    loan_weekly_cents: i64,
    sss_balance_cents: i64,
    sss_weekly_cents: i64,
    vale_balance_cents: i64,
    created_at: chrono::DateTime<chrono::Utc>,
    updated_at: chrono::DateTime<chrono::Utc>,
}

impl EmployeeRow {
    fn into_employee(self) -> DbResult<Employee> {
        Ok(Employee {
            id: self.id,
            employee_no: self.employee_no,
            name: self.name,
            employee_type: self.employee_type,
            store_ids: serde_json::from_str(&self.store_ids)?,
            daily_rate_cents: self.daily_rate_cents,
            shift_start: self.shift_start,
            shift_end: self.shift_end,
            pin: self.pin,
            loan_balance_cents: self.loan_balance_cents,
            loan_weekly_cents: self.loan_weekly_cents,
            sss_balance_cents: self.sss_balance_cents,
            sss_weekly_cents: self.sss_weekly_cents,
            vale_balance_cents: self.vale_balance_cents,
            created_at: self.created_at,
            updated_at: self.updated_at,
        })
    }
}

const SELECT_COLUMNS: &str = r#"
    id, employee_no, name, employee_type, store_ids,
    daily_rate_cents, shift_start, shift_end, pin,
    loan_balance_cents, loan_weekly_cents,
    sss_balance_cents, sss_weekly_cents, vale_balance_cents,
    created_at, updated_at
"#;

// =============================================================================
// Repository
// =============================================================================

/// Repository for employee database operations.
#[derive(Debug, Clone)]
pub struct EmployeeRepository {
    pool: SqlitePool,
}

impl EmployeeRepository {
    /// Creates a new EmployeeRepository.
    pub fn new(pool: SqlitePool) -> Self {
        EmployeeRepository { pool }
    }

    /// Inserts a new employee.
    ///
    /// ## Errors
    /// [`DbError::UniqueViolation`] when the employee_no is already taken.
    pub async fn insert(&self, employee: &Employee) -> DbResult<()> {
        debug!(id = %employee.id, employee_no = %employee.employee_no, "Inserting employee");

        let store_ids = serde_json::to_string(&employee.store_ids)?;

        sqlx::query(
            r#"
            INSERT INTO employees (
                id, employee_no, name, employee_type, store_ids,
                daily_rate_cents, shift_start, shift_end, pin,
                loan_balance_cents, loan_weekly_cents,
                sss_balance_cents, sss_weekly_cents, vale_balance_cents,
                created_at, updated_at
            ) VALUES (
                ?1, ?2, ?3, ?4, ?5,
                ?6, ?7, ?8, ?9,
                ?10, ?11,
                ?12, ?13, ?14,
                ?15, ?16
            )
            "#,
        )
        .bind(&employee.id)
        .bind(&employee.employee_no)
        .bind(&employee.name)
        .bind(employee.employee_type)
        .bind(store_ids)
        .bind(employee.daily_rate_cents)
        .bind(&employee.shift_start)
        .bind(&employee.shift_end)
        .bind(&employee.pin)
        .bind(employee.loan_balance_cents)
        .bind(employee.loan_weekly_cents)
        .bind(employee.sss_balance_cents)
        .bind(employee.sss_weekly_cents)
        .bind(employee.vale_balance_cents)
        .bind(employee.created_at)
        .bind(employee.updated_at)
        .execute(&self.pool)
        .await?;

        Ok(())
    }

    /// Updates an existing employee (full row, including balances).
    pub async fn update(&self, employee: &Employee) -> DbResult<()> {
        debug!(id = %employee.id, "Updating employee");

        let store_ids = serde_json::to_string(&employee.store_ids)?;

        let result = sqlx::query(
            r#"
            UPDATE employees SET
                employee_no = ?2,
                name = ?3,
                employee_type = ?4,
                store_ids = ?5,
                daily_rate_cents = ?6,
                shift_start = ?7,
                shift_end = ?8,
                pin = ?9,
                loan_balance_cents = ?10,
                loan_weekly_cents = ?11,
                sss_balance_cents = ?12,
                sss_weekly_cents = ?13,
                vale_balance_cents = ?14,
                updated_at = ?15
            WHERE id = ?1
            "#,
        )
        .bind(&employee.id)
        .bind(&employee.employee_no)
        .bind(&employee.name)
        .bind(employee.employee_type)
        .bind(store_ids)
        .bind(employee.daily_rate_cents)
        .bind(&employee.shift_start)
        .bind(&employee.shift_end)
        .bind(&employee.pin)
        .bind(employee.loan_balance_cents)
        .bind(employee.loan_weekly_cents)
        .bind(employee.sss_balance_cents)
        .bind(employee.sss_weekly_cents)
        .bind(employee.vale_balance_cents)
        .bind(employee.updated_at)
        .execute(&self.pool)
        .await?;

        if result.rows_affected() == 0 {
            return Err(DbError::not_found("Employee", &employee.id));
        }

        Ok(())
    }

    /// Gets an employee by ID.
    pub async fn get_by_id(&self, id: &str) -> DbResult<Option<Employee>> {
        let row: Option<EmployeeRow> = sqlx::query_as(&format!(
            "SELECT {SELECT_COLUMNS} FROM employees WHERE id = ?1"
        ))
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;

        row.map(EmployeeRow::into_employee).transpose()
    }

    /// Gets an employee by business number (e.g. "EMP-0012").
    pub async fn get_by_employee_no(&self, employee_no: &str) -> DbResult<Option<Employee>> {
        let row: Option<EmployeeRow> = sqlx::query_as(&format!(
            "SELECT {SELECT_COLUMNS} FROM employees WHERE employee_no = ?1"
        ))
        .bind(employee_no)
        .fetch_optional(&self.pool)
        .await?;

        row.map(EmployeeRow::into_employee).transpose()
    }

    /// Lists all employees ordered by employee number.
    ///
    /// The fleet is small (tens of people); store-scope filtering happens
    /// in the engine, not in SQL.
    pub async fn list(&self) -> DbResult<Vec<Employee>> {
        let rows: Vec<EmployeeRow> = sqlx::query_as(&format!(
            "SELECT {SELECT_COLUMNS} FROM employees ORDER BY employee_no"
        ))
        .fetch_all(&self.pool)
        .await?;

        rows.into_iter().map(EmployeeRow::into_employee).collect()
    }

    /// Lists employees assigned to one store, ordered by employee number.
    ///
    /// Assignments live in a JSON column, so the filter runs in Rust after
    /// the fetch; the table is tens of rows, not thousands.
    pub async fn list_for_store(&self, store_id: &str) -> DbResult<Vec<Employee>> {
        let all = self.list().await?;
        Ok(all
            .into_iter()
            .filter(|e| e.is_assigned_to(store_id))
            .collect())
    }

    /// Deletes an employee. Attendance cascades via the foreign key.
    pub async fn delete(&self, id: &str) -> DbResult<()> {
        debug!(id = %id, "Deleting employee");

        let result = sqlx::query("DELETE FROM employees WHERE id = ?1")
            .bind(id)
            .execute(&self.pool)
            .await?;

        if result.rows_affected() == 0 {
            return Err(DbError::not_found("Employee", id));
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

    fn sample_employee(id: &str, employee_no: &str) -> Employee {
        Employee {
            id: id.to_string(),
            employee_no: employee_no.to_string(),
            name: "Dela Cruz, Juan".to_string(),
            employee_type: EmployeeType::Rider,
            store_ids: vec!["STORE-01".to_string(), "STORE-02".to_string()],
            daily_rate_cents: 61_000,
            shift_start: "08:00".to_string(),
            shift_end: "17:00".to_string(),
            pin: Some("1234".to_string()),
            loan_balance_cents: 50_000,
            loan_weekly_cents: 20_000,
            sss_balance_cents: 0,
            sss_weekly_cents: 0,
            vale_balance_cents: 7_500,
            created_at: Utc::now(),
            updated_at: Utc::now(),
        }
    }

    async fn test_db() -> Database {
        Database::new(DbConfig::in_memory()).await.unwrap()
    }

    #[tokio::test]
    async fn test_insert_and_get_round_trip() {
        let db = test_db().await;
        let repo = db.employees();

        let employee = sample_employee("emp-1", "EMP-0001");
        repo.insert(&employee).await.unwrap();

        let loaded = repo.get_by_id("emp-1").await.unwrap().unwrap();
        assert_eq!(loaded.employee_no, "EMP-0001");
        assert_eq!(loaded.employee_type, EmployeeType::Rider);
        assert_eq!(loaded.store_ids, vec!["STORE-01", "STORE-02"]);
        assert_eq!(loaded.loan_balance_cents, 50_000);
        assert_eq!(loaded.pin.as_deref(), Some("1234"));

        let by_no = repo.get_by_employee_no("EMP-0001").await.unwrap().unwrap();
        assert_eq!(by_no.id, "emp-1");

        assert!(repo.get_by_id("missing").await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_duplicate_employee_no_rejected() {
        let db = test_db().await;
        let repo = db.employees();

        repo.insert(&sample_employee("emp-1", "EMP-0001"))
            .await
            .unwrap();
        let err = repo
            .insert(&sample_employee("emp-2", "EMP-0001"))
            .await
            .unwrap_err();
        assert!(matches!(err, DbError::UniqueViolation { .. }));
    }

    #[tokio::test]
    async fn test_update_and_list() {
        let db = test_db().await;
        let repo = db.employees();

        repo.insert(&sample_employee("emp-2", "EMP-0002"))
            .await
            .unwrap();
        repo.insert(&sample_employee("emp-1", "EMP-0001"))
            .await
            .unwrap();

        let mut employee = repo.get_by_id("emp-1").await.unwrap().unwrap();
        employee.daily_rate_cents = 70_000;
        employee.vale_balance_cents = 0;
        repo.update(&employee).await.unwrap();

        let list = repo.list().await.unwrap();
        assert_eq!(list.len(), 2);
        // Ordered by employee_no
        assert_eq!(list[0].employee_no, "EMP-0001");
        assert_eq!(list[0].daily_rate_cents, 70_000);
        assert_eq!(list[0].vale_balance_cents, 0);

        let err = repo
            .update(&sample_employee("ghost", "EMP-9999"))
            .await
            .unwrap_err();
        assert!(matches!(err, DbError::NotFound { .. }));
    }

    #[tokio::test]
    async fn test_list_for_store() {
        let db = test_db().await;
        let repo = db.employees();

        repo.insert(&sample_employee("emp-1", "EMP-0001"))
            .await
            .unwrap();
        let mut other = sample_employee("emp-2", "EMP-0002");
        other.store_ids = vec!["STORE-09".to_string()];
        repo.insert(&other).await.unwrap();

        let scoped = repo.list_for_store("STORE-01").await.unwrap();
        assert_eq!(scoped.len(), 1);
        assert_eq!(scoped[0].id, "emp-1");

        assert!(repo.list_for_store("STORE-42").await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_delete() {
        let db = test_db().await;
        let repo = db.employees();

        repo.insert(&sample_employee("emp-1", "EMP-0001"))
            .await
            .unwrap();
        repo.delete("emp-1").await.unwrap();
        assert!(repo.get_by_id("emp-1").await.unwrap().is_none());

        let err = repo.delete("emp-1").await.unwrap_err();
        assert!(matches!(err, DbError::NotFound { .. }));
    }
}
