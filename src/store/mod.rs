//! Persistence seams for the attendance and payroll core.
//!
//! Uniqueness of `(employee_id, date)` attendance entries and of
//! `(employee_id, month, year)` payroll records is enforced here, by the
//! backend, and reported as [`StoreError::UniqueViolation`]. Callers never
//! check-then-insert on their own.

use async_trait::async_trait;
use chrono::{NaiveDate, NaiveDateTime};
use rust_decimal::Decimal;
use thiserror::Error;

use crate::model::{
    attendance::{AttendanceEntry, NewAttendanceEntry},
    employee::EmployeeRef,
    payroll::{NewPayrollRecord, PayrollRecord},
};

pub mod memory;
pub mod mysql;

pub use memory::MemoryStore;
pub use mysql::MySqlStore;

#[derive(Debug, Error)]
pub enum StoreError {
    /// A unique key rejected the write.
    #[error("unique constraint violated")]
    UniqueViolation,

    #[error("database error: {0}")]
    Database(sqlx::Error),

    #[error("storage unavailable: {0}")]
    Unavailable(String),
}

impl From<sqlx::Error> for StoreError {
    fn from(e: sqlx::Error) -> Self {
        if let sqlx::Error::Database(db_err) = &e {
            if db_err.is_unique_violation() {
                return StoreError::UniqueViolation;
            }
        }
        StoreError::Database(e)
    }
}

/// Which entries of one employee to read.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EntryWindow {
    Month { month: u32, year: i32 },
    /// Inclusive on both ends.
    Dates { start: NaiveDate, end: NaiveDate },
}

impl EntryWindow {
    pub fn contains(&self, entry: &AttendanceEntry) -> bool {
        match *self {
            EntryWindow::Month { month, year } => entry.month == month && entry.year == year,
            EntryWindow::Dates { start, end } => entry.date >= start && entry.date <= end,
        }
    }
}

#[async_trait]
pub trait AttendanceStore: Send + Sync {
    /// Atomically creates the entry or fails with `UniqueViolation` when the
    /// employee already has one for that date.
    async fn insert_entry(&self, entry: NewAttendanceEntry)
    -> Result<AttendanceEntry, StoreError>;

    async fn find_entry(
        &self,
        employee_id: u64,
        date: NaiveDate,
    ) -> Result<Option<AttendanceEntry>, StoreError>;

    /// Sets the clock-out of entry `id` only if it is still open.
    /// Returns `false` when nothing was updated.
    async fn close_entry(
        &self,
        id: u64,
        clock_out: NaiveDateTime,
        worked_hours: Decimal,
    ) -> Result<bool, StoreError>;

    /// Sorted by date ascending.
    async fn entries_for_employee(
        &self,
        employee_id: u64,
        window: EntryWindow,
    ) -> Result<Vec<AttendanceEntry>, StoreError>;

    async fn entries_on(&self, date: NaiveDate) -> Result<Vec<AttendanceEntry>, StoreError>;

    async fn entries_for_month(
        &self,
        month: u32,
        year: i32,
    ) -> Result<Vec<AttendanceEntry>, StoreError>;
}

#[async_trait]
pub trait PayrollStore: Send + Sync {
    /// Atomically creates the record or fails with `UniqueViolation` when the
    /// employee was already paid for that month.
    async fn insert_record(&self, record: NewPayrollRecord) -> Result<PayrollRecord, StoreError>;

    async fn find_record(
        &self,
        employee_id: u64,
        month: u32,
        year: i32,
    ) -> Result<Option<PayrollRecord>, StoreError>;

    async fn records_for_period(
        &self,
        month: u32,
        year: i32,
    ) -> Result<Vec<PayrollRecord>, StoreError>;

    /// Newest period first.
    async fn records_for_employee(&self, employee_id: u64)
    -> Result<Vec<PayrollRecord>, StoreError>;
}

/// Read-only view of the employee directory, owned elsewhere.
#[async_trait]
pub trait EmployeeDirectory: Send + Sync {
    async fn find_employee(&self, employee_id: u64) -> Result<Option<EmployeeRef>, StoreError>;

    async fn active_employee_ids(&self) -> Result<Vec<u64>, StoreError>;
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::CoreError;
    use sqlx::error::{DatabaseError, ErrorKind};
    use std::borrow::Cow;
    use std::error::Error as StdError;
    use std::fmt;

    /// Driver error as MySQL reports a key collision (`23000`).
    #[derive(Debug)]
    struct KeyError {
        unique: bool,
    }

    impl fmt::Display for KeyError {
        fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
            f.write_str("Duplicate entry '70-2026-01-05' for key 'uq_attendance_employee_date'")
        }
    }

    impl StdError for KeyError {}

    impl DatabaseError for KeyError {
        fn message(&self) -> &str {
            "Duplicate entry '70-2026-01-05' for key 'uq_attendance_employee_date'"
        }

        fn code(&self) -> Option<Cow<'_, str>> {
            Some(Cow::Borrowed("23000"))
        }

        fn as_error(&self) -> &(dyn StdError + Send + Sync + 'static) {
            self
        }

        fn as_error_mut(&mut self) -> &mut (dyn StdError + Send + Sync + 'static) {
            self
        }

        fn into_error(self: Box<Self>) -> Box<dyn StdError + Send + Sync + 'static> {
            self
        }

        fn kind(&self) -> ErrorKind {
            if self.unique {
                ErrorKind::UniqueViolation
            } else {
                ErrorKind::ForeignKeyViolation
            }
        }
    }

    fn db_error(unique: bool) -> sqlx::Error {
        sqlx::Error::Database(Box::new(KeyError { unique }))
    }

    #[test]
    fn unique_key_collision_is_a_unique_violation() {
        let err = StoreError::from(db_error(true));
        assert!(matches!(err, StoreError::UniqueViolation));
    }

    #[test]
    fn other_database_errors_stay_storage_failures() {
        let err = StoreError::from(db_error(false));
        assert!(matches!(err, StoreError::Database(sqlx::Error::Database(_))));

        let err = StoreError::from(sqlx::Error::PoolTimedOut);
        assert!(matches!(err, StoreError::Database(sqlx::Error::PoolTimedOut)));

        let core: CoreError = err.into();
        assert!(!core.is_domain());
        assert!(matches!(core, CoreError::Storage(StoreError::Database(_))));
    }
}
