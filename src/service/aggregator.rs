use std::collections::{BTreeMap, HashSet};
use std::sync::Arc;

use rust_decimal::Decimal;
use serde::Serialize;
use utoipa::ToSchema;

use super::{resolve_employee, validate_month, validate_year};
use crate::error::CoreError;
use crate::model::attendance::AttendanceEntry;
use crate::store::{AttendanceStore, EmployeeDirectory, EntryWindow};
use crate::time::TimeSource;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, ToSchema)]
pub struct DailySnapshot {
    #[schema(example = 25)]
    pub total_active_employees: usize,
    #[schema(example = 21)]
    pub present_count: usize,
    #[schema(example = 4)]
    pub absent_count: usize,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, ToSchema)]
pub struct DayHours {
    #[schema(example = 5)]
    pub day: u32,
    #[schema(example = "164.25", value_type = String)]
    pub total_hours: Decimal,
    #[schema(example = 21)]
    pub distinct_employee_count: usize,
}

/// Current-month view for one employee's dashboard.
#[derive(Debug, Clone, PartialEq, Serialize, ToSchema)]
pub struct EmployeeSummary {
    #[schema(example = 1)]
    pub month: u32,
    #[schema(example = 2026)]
    pub year: i32,
    #[schema(example = "96.50", value_type = String)]
    pub total_hours: Decimal,
    #[schema(example = 12)]
    pub days_worked: usize,
    /// Today's entry, open or closed.
    pub today: Option<AttendanceEntry>,
}

/// Read-side projections over the attendance entries, recomputed per call.
pub struct AttendanceAggregator {
    store: Arc<dyn AttendanceStore>,
    directory: Arc<dyn EmployeeDirectory>,
    time: Arc<dyn TimeSource>,
}

impl AttendanceAggregator {
    pub fn new(
        store: Arc<dyn AttendanceStore>,
        directory: Arc<dyn EmployeeDirectory>,
        time: Arc<dyn TimeSource>,
    ) -> Self {
        Self {
            store,
            directory,
            time,
        }
    }

    /// Present means an entry dated today, clocked out or not. Only active
    /// employees count, so present + absent always equals the total.
    pub async fn daily_snapshot(&self) -> Result<DailySnapshot, CoreError> {
        let today = self.time.today();
        let active: HashSet<u64> = self
            .directory
            .active_employee_ids()
            .await?
            .into_iter()
            .collect();

        let present = self
            .store
            .entries_on(today)
            .await?
            .into_iter()
            .map(|entry| entry.employee_id)
            .filter(|id| active.contains(id))
            .collect::<HashSet<_>>()
            .len();

        Ok(DailySnapshot {
            total_active_employees: active.len(),
            present_count: present,
            absent_count: active.len() - present,
        })
    }

    /// Days without any entry are left out.
    pub async fn monthly_hours_by_day(
        &self,
        month: u32,
        year: i32,
    ) -> Result<Vec<DayHours>, CoreError> {
        validate_month(month)?;
        validate_year(year)?;

        let entries = self.store.entries_for_month(month, year).await?;
        Ok(group_by_day(&entries))
    }

    pub async fn employee_summary(&self, employee_id: u64) -> Result<EmployeeSummary, CoreError> {
        resolve_employee(&*self.directory, employee_id).await?;
        let today = self.time.today();
        let (month, year) = self.time.current_month_year();

        let entries = self
            .store
            .entries_for_employee(employee_id, EntryWindow::Month { month, year })
            .await?;

        let total_hours = entries
            .iter()
            .map(|entry| entry.worked_hours)
            .sum::<Decimal>()
            .round_dp(2);

        Ok(EmployeeSummary {
            month,
            year,
            total_hours,
            days_worked: entries.len(),
            today: entries.into_iter().find(|entry| entry.date == today),
        })
    }
}

fn group_by_day(entries: &[AttendanceEntry]) -> Vec<DayHours> {
    use chrono::Datelike;

    let mut days: BTreeMap<u32, (Decimal, HashSet<u64>)> = BTreeMap::new();
    for entry in entries {
        let (hours, employees) = days.entry(entry.date.day()).or_default();
        *hours += entry.worked_hours;
        employees.insert(entry.employee_id);
    }

    days.into_iter()
        .map(|(day, (total_hours, employees))| DayHours {
            day,
            total_hours,
            distinct_employee_count: employees.len(),
        })
        .collect()
}
