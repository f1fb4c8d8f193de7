//! Attendance and payroll operations on top of the storage seams.

pub mod aggregator;
pub mod clock_store;
pub mod payroll_ledger;

pub use aggregator::{AttendanceAggregator, DailySnapshot, DayHours, EmployeeSummary};
pub use clock_store::{ClockStore, EntryFilter};
pub use payroll_ledger::{Disbursement, PayrollLedger};

use crate::error::CoreError;
use crate::model::employee::EmployeeRef;
use crate::store::EmployeeDirectory;

pub(crate) fn validate_month(month: u32) -> Result<(), CoreError> {
    if (1..=12).contains(&month) {
        Ok(())
    } else {
        Err(CoreError::InvalidPeriod(format!("month must be 1-12, got {month}")))
    }
}

pub(crate) fn validate_year(year: i32) -> Result<(), CoreError> {
    if (1970..=9999).contains(&year) {
        Ok(())
    } else {
        Err(CoreError::InvalidPeriod(format!("year {year} is out of range")))
    }
}

/// Looks up an employee, any status. Unknown ids are `NotFound`.
pub(crate) async fn resolve_employee(
    directory: &dyn EmployeeDirectory,
    employee_id: u64,
) -> Result<EmployeeRef, CoreError> {
    directory
        .find_employee(employee_id)
        .await?
        .ok_or_else(|| CoreError::NotFound(format!("Employee {employee_id}")))
}
