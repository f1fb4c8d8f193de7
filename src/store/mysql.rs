use async_trait::async_trait;
use chrono::{NaiveDate, NaiveDateTime};
use rust_decimal::Decimal;
use sqlx::{FromRow, MySqlPool};

use super::{AttendanceStore, EmployeeDirectory, EntryWindow, PayrollStore, StoreError};
use crate::model::{
    attendance::{AttendanceEntry, NewAttendanceEntry},
    employee::{EmployeeRef, EmployeeStatus},
    payroll::{NewPayrollRecord, PayrollRecord},
};

const ENTRY_COLUMNS: &str =
    "id, employee_id, date, clock_in, clock_out, worked_hours, month, year";

const PAYROLL_COLUMNS: &str = "id, employee_id, month, year, basic_salary, allowances, \
     deductions, net_salary, disbursed_at, disbursed_by";

/// MySQL backend. Relies on the `uq_attendance_employee_date` and
/// `uq_payroll_employee_period` keys from `migrations/`.
#[derive(Clone)]
pub struct MySqlStore {
    pool: MySqlPool,
}

impl MySqlStore {
    pub fn new(pool: MySqlPool) -> Self {
        Self { pool }
    }

    pub fn pool(&self) -> &MySqlPool {
        &self.pool
    }
}

#[async_trait]
impl AttendanceStore for MySqlStore {
    async fn insert_entry(
        &self,
        entry: NewAttendanceEntry,
    ) -> Result<AttendanceEntry, StoreError> {
        let result = sqlx::query(
            r#"
            INSERT INTO attendance_entries (employee_id, date, clock_in, worked_hours, month, year)
            VALUES (?, ?, ?, 0, ?, ?)
            "#,
        )
        .bind(entry.employee_id)
        .bind(entry.date)
        .bind(entry.clock_in)
        .bind(entry.month)
        .bind(entry.year)
        .execute(&self.pool)
        .await?;

        Ok(AttendanceEntry {
            id: result.last_insert_id(),
            employee_id: entry.employee_id,
            date: entry.date,
            clock_in: entry.clock_in,
            clock_out: None,
            worked_hours: Decimal::ZERO,
            month: entry.month,
            year: entry.year,
        })
    }

    async fn find_entry(
        &self,
        employee_id: u64,
        date: NaiveDate,
    ) -> Result<Option<AttendanceEntry>, StoreError> {
        let sql = format!(
            "SELECT {ENTRY_COLUMNS} FROM attendance_entries WHERE employee_id = ? AND date = ?"
        );
        let entry = sqlx::query_as::<_, AttendanceEntry>(&sql)
            .bind(employee_id)
            .bind(date)
            .fetch_optional(&self.pool)
            .await?;
        Ok(entry)
    }

    async fn close_entry(
        &self,
        id: u64,
        clock_out: NaiveDateTime,
        worked_hours: Decimal,
    ) -> Result<bool, StoreError> {
        let result = sqlx::query(
            r#"
            UPDATE attendance_entries
            SET clock_out = ?, worked_hours = ?
            WHERE id = ?
            AND clock_out IS NULL
            "#,
        )
        .bind(clock_out)
        .bind(worked_hours)
        .bind(id)
        .execute(&self.pool)
        .await?;

        Ok(result.rows_affected() == 1)
    }

    async fn entries_for_employee(
        &self,
        employee_id: u64,
        window: EntryWindow,
    ) -> Result<Vec<AttendanceEntry>, StoreError> {
        let entries = match window {
            EntryWindow::Month { month, year } => {
                let sql = format!(
                    "SELECT {ENTRY_COLUMNS} FROM attendance_entries \
                     WHERE employee_id = ? AND month = ? AND year = ? ORDER BY date ASC"
                );
                sqlx::query_as::<_, AttendanceEntry>(&sql)
                    .bind(employee_id)
                    .bind(month)
                    .bind(year)
                    .fetch_all(&self.pool)
                    .await?
            }
            EntryWindow::Dates { start, end } => {
                let sql = format!(
                    "SELECT {ENTRY_COLUMNS} FROM attendance_entries \
                     WHERE employee_id = ? AND date BETWEEN ? AND ? ORDER BY date ASC"
                );
                sqlx::query_as::<_, AttendanceEntry>(&sql)
                    .bind(employee_id)
                    .bind(start)
                    .bind(end)
                    .fetch_all(&self.pool)
                    .await?
            }
        };
        Ok(entries)
    }

    async fn entries_on(&self, date: NaiveDate) -> Result<Vec<AttendanceEntry>, StoreError> {
        let sql = format!("SELECT {ENTRY_COLUMNS} FROM attendance_entries WHERE date = ?");
        let entries = sqlx::query_as::<_, AttendanceEntry>(&sql)
            .bind(date)
            .fetch_all(&self.pool)
            .await?;
        Ok(entries)
    }

    async fn entries_for_month(
        &self,
        month: u32,
        year: i32,
    ) -> Result<Vec<AttendanceEntry>, StoreError> {
        let sql = format!(
            "SELECT {ENTRY_COLUMNS} FROM attendance_entries \
             WHERE month = ? AND year = ? ORDER BY date ASC"
        );
        let entries = sqlx::query_as::<_, AttendanceEntry>(&sql)
            .bind(month)
            .bind(year)
            .fetch_all(&self.pool)
            .await?;
        Ok(entries)
    }
}

#[async_trait]
impl PayrollStore for MySqlStore {
    async fn insert_record(&self, record: NewPayrollRecord) -> Result<PayrollRecord, StoreError> {
        let result = sqlx::query(
            r#"
            INSERT INTO payroll_records
            (employee_id, month, year, basic_salary, allowances, deductions, net_salary,
             disbursed_at, disbursed_by)
            VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?)
            "#,
        )
        .bind(record.employee_id)
        .bind(record.month)
        .bind(record.year)
        .bind(record.basic_salary)
        .bind(record.allowances)
        .bind(record.deductions)
        .bind(record.net_salary)
        .bind(record.disbursed_at)
        .bind(record.disbursed_by)
        .execute(&self.pool)
        .await?;

        Ok(PayrollRecord {
            id: result.last_insert_id(),
            employee_id: record.employee_id,
            month: record.month,
            year: record.year,
            basic_salary: record.basic_salary,
            allowances: record.allowances,
            deductions: record.deductions,
            net_salary: record.net_salary,
            disbursed_at: record.disbursed_at,
            disbursed_by: record.disbursed_by,
        })
    }

    async fn find_record(
        &self,
        employee_id: u64,
        month: u32,
        year: i32,
    ) -> Result<Option<PayrollRecord>, StoreError> {
        let sql = format!(
            "SELECT {PAYROLL_COLUMNS} FROM payroll_records \
             WHERE employee_id = ? AND month = ? AND year = ?"
        );
        let record = sqlx::query_as::<_, PayrollRecord>(&sql)
            .bind(employee_id)
            .bind(month)
            .bind(year)
            .fetch_optional(&self.pool)
            .await?;
        Ok(record)
    }

    async fn records_for_period(
        &self,
        month: u32,
        year: i32,
    ) -> Result<Vec<PayrollRecord>, StoreError> {
        let sql = format!(
            "SELECT {PAYROLL_COLUMNS} FROM payroll_records WHERE month = ? AND year = ?"
        );
        let records = sqlx::query_as::<_, PayrollRecord>(&sql)
            .bind(month)
            .bind(year)
            .fetch_all(&self.pool)
            .await?;
        Ok(records)
    }

    async fn records_for_employee(
        &self,
        employee_id: u64,
    ) -> Result<Vec<PayrollRecord>, StoreError> {
        let sql = format!(
            "SELECT {PAYROLL_COLUMNS} FROM payroll_records \
             WHERE employee_id = ? ORDER BY year DESC, month DESC"
        );
        let records = sqlx::query_as::<_, PayrollRecord>(&sql)
            .bind(employee_id)
            .fetch_all(&self.pool)
            .await?;
        Ok(records)
    }
}

#[derive(FromRow)]
struct EmployeeRow {
    id: u64,
    status: String,
    user_id: Option<u64>,
}

#[async_trait]
impl EmployeeDirectory for MySqlStore {
    async fn find_employee(&self, employee_id: u64) -> Result<Option<EmployeeRef>, StoreError> {
        let row = sqlx::query_as::<_, EmployeeRow>(
            r#"
            SELECT e.id, e.status, u.id AS user_id
            FROM employees e
            LEFT JOIN users u ON u.employee_id = e.id
            WHERE e.id = ?
            LIMIT 1
            "#,
        )
        .bind(employee_id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(row.map(|row| {
            let status = EmployeeStatus::parse(&row.status).unwrap_or_else(|| {
                tracing::warn!(
                    employee_id = row.id,
                    status = %row.status,
                    "Unknown employee status"
                );
                EmployeeStatus::Terminated
            });
            EmployeeRef {
                id: row.id,
                user_id: row.user_id,
                status,
            }
        }))
    }

    async fn active_employee_ids(&self) -> Result<Vec<u64>, StoreError> {
        let ids = sqlx::query_scalar::<_, u64>("SELECT id FROM employees WHERE status = ?")
            .bind(EmployeeStatus::Active.as_str())
            .fetch_all(&self.pool)
            .await?;
        Ok(ids)
    }
}
