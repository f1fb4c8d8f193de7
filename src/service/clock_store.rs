use std::sync::Arc;

use chrono::NaiveDate;

use super::{resolve_employee, validate_month, validate_year};
use crate::error::CoreError;
use crate::model::attendance::{AttendanceEntry, ClockKind, NewAttendanceEntry, worked_hours};
use crate::notify::{DomainEvent, EventBus};
use crate::store::{AttendanceStore, EmployeeDirectory, EntryWindow, StoreError};
use crate::time::TimeSource;

/// Selects which attendance entries of one employee to return.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EntryFilter {
    CurrentMonth,
    Period { month: u32, year: i32 },
    /// Inclusive on both ends.
    Range { start: NaiveDate, end: NaiveDate },
}

impl EntryFilter {
    /// Builds a filter from optional query parameters. Month/year and an
    /// explicit date range are mutually exclusive, and each comes as a pair.
    pub fn from_parts(
        month: Option<u32>,
        year: Option<i32>,
        start_date: Option<NaiveDate>,
        end_date: Option<NaiveDate>,
    ) -> Result<Self, CoreError> {
        let has_period = month.is_some() || year.is_some();
        let has_range = start_date.is_some() || end_date.is_some();

        match (month, year, start_date, end_date) {
            _ if has_period && has_range => Err(CoreError::InvalidPeriod(
                "use either month/year or start_date/end_date, not both".into(),
            )),
            (None, None, None, None) => Ok(EntryFilter::CurrentMonth),
            (Some(month), Some(year), None, None) => Ok(EntryFilter::Period { month, year }),
            (None, None, Some(start), Some(end)) => Ok(EntryFilter::Range { start, end }),
            _ if has_period => Err(CoreError::InvalidPeriod(
                "month and year must be given together".into(),
            )),
            _ => Err(CoreError::InvalidPeriod(
                "start_date and end_date must be given together".into(),
            )),
        }
    }
}

/// Owns the daily attendance entries: one per employee per local day.
pub struct ClockStore {
    store: Arc<dyn AttendanceStore>,
    directory: Arc<dyn EmployeeDirectory>,
    bus: Arc<EventBus>,
    time: Arc<dyn TimeSource>,
}

impl ClockStore {
    pub fn new(
        store: Arc<dyn AttendanceStore>,
        directory: Arc<dyn EmployeeDirectory>,
        bus: Arc<EventBus>,
        time: Arc<dyn TimeSource>,
    ) -> Self {
        Self {
            store,
            directory,
            bus,
            time,
        }
    }

    pub async fn record_clock_in(&self, employee_id: u64) -> Result<AttendanceEntry, CoreError> {
        let now = self.time.now();

        let entry = match self
            .store
            .insert_entry(NewAttendanceEntry::opened_at(employee_id, now))
            .await
        {
            Ok(entry) => entry,
            Err(StoreError::UniqueViolation) => {
                tracing::info!(employee_id, date = %now.date(), "Duplicate clock-in rejected");
                return Err(CoreError::AlreadyClockedIn);
            }
            Err(e) => return Err(e.into()),
        };

        tracing::info!(employee_id, entry_id = entry.id, "Clocked in");
        self.announce(ClockKind::ClockIn, &entry).await;
        Ok(entry)
    }

    pub async fn record_clock_out(&self, employee_id: u64) -> Result<AttendanceEntry, CoreError> {
        let now = self.time.now();
        let today = now.date();

        let mut entry = match self.store.find_entry(employee_id, today).await? {
            Some(entry) if entry.is_open() => entry,
            _ => return Err(CoreError::NoActiveSession),
        };

        let hours = worked_hours(entry.clock_in, now);
        // another request may have closed it since the read
        if !self.store.close_entry(entry.id, now, hours).await? {
            return Err(CoreError::NoActiveSession);
        }

        entry.clock_out = Some(now);
        entry.worked_hours = hours;

        tracing::info!(employee_id, entry_id = entry.id, worked_hours = %hours, "Clocked out");
        self.announce(ClockKind::ClockOut, &entry).await;
        Ok(entry)
    }

    pub async fn query_entries(
        &self,
        employee_id: u64,
        filter: EntryFilter,
    ) -> Result<Vec<AttendanceEntry>, CoreError> {
        let window = match filter {
            EntryFilter::CurrentMonth => {
                let (month, year) = self.time.current_month_year();
                EntryWindow::Month { month, year }
            }
            EntryFilter::Period { month, year } => {
                validate_month(month)?;
                validate_year(year)?;
                EntryWindow::Month { month, year }
            }
            EntryFilter::Range { start, end } => {
                if start > end {
                    return Err(CoreError::InvalidPeriod(format!(
                        "start_date {start} is after end_date {end}"
                    )));
                }
                EntryWindow::Dates { start, end }
            }
        };

        resolve_employee(&*self.directory, employee_id).await?;
        Ok(self.store.entries_for_employee(employee_id, window).await?)
    }

    /// Publishes `ClockRecorded` to the employee's own login. The entry is
    /// already committed, so nothing here can fail the caller.
    async fn announce(&self, kind: ClockKind, entry: &AttendanceEntry) {
        let recipient = match self.directory.find_employee(entry.employee_id).await {
            Ok(Some(employee)) => employee.user_id,
            Ok(None) => None,
            Err(e) => {
                tracing::warn!(
                    employee_id = entry.employee_id,
                    error = %e,
                    "Recipient lookup failed"
                );
                None
            }
        };

        match recipient {
            Some(recipient) => self.bus.publish(&DomainEvent::ClockRecorded {
                kind,
                entry: entry.clone(),
                recipient,
            }),
            None => tracing::debug!(
                employee_id = entry.employee_id,
                "No linked user, clock event not published"
            ),
        }
    }
}
