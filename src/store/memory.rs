use std::collections::{BTreeMap, HashMap};
use std::sync::{Mutex, MutexGuard, PoisonError};

use async_trait::async_trait;
use chrono::{NaiveDate, NaiveDateTime};
use rust_decimal::Decimal;

use super::{AttendanceStore, EmployeeDirectory, EntryWindow, PayrollStore, StoreError};
use crate::model::{
    attendance::{AttendanceEntry, NewAttendanceEntry},
    employee::EmployeeRef,
    payroll::{NewPayrollRecord, PayrollRecord},
};

#[derive(Default)]
struct MemoryState {
    next_entry_id: u64,
    entries: BTreeMap<(u64, NaiveDate), AttendanceEntry>,
    next_record_id: u64,
    records: BTreeMap<(u64, i32, u32), PayrollRecord>,
    employees: HashMap<u64, EmployeeRef>,
}

/// Process-local backend. Every operation runs under one lock, so the
/// existence check and the insert of a write are a single step, the same
/// guarantee the MySQL unique keys give.
#[derive(Default)]
pub struct MemoryStore {
    state: Mutex<MemoryState>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds or replaces a directory entry.
    pub fn put_employee(&self, employee: EmployeeRef) {
        self.state().employees.insert(employee.id, employee);
    }

    fn state(&self) -> MutexGuard<'_, MemoryState> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

#[async_trait]
impl AttendanceStore for MemoryStore {
    async fn insert_entry(
        &self,
        entry: NewAttendanceEntry,
    ) -> Result<AttendanceEntry, StoreError> {
        let mut state = self.state();
        let key = (entry.employee_id, entry.date);
        if state.entries.contains_key(&key) {
            return Err(StoreError::UniqueViolation);
        }

        state.next_entry_id += 1;
        let created = AttendanceEntry {
            id: state.next_entry_id,
            employee_id: entry.employee_id,
            date: entry.date,
            clock_in: entry.clock_in,
            clock_out: None,
            worked_hours: Decimal::ZERO,
            month: entry.month,
            year: entry.year,
        };
        state.entries.insert(key, created.clone());
        Ok(created)
    }

    async fn find_entry(
        &self,
        employee_id: u64,
        date: NaiveDate,
    ) -> Result<Option<AttendanceEntry>, StoreError> {
        Ok(self.state().entries.get(&(employee_id, date)).cloned())
    }

    async fn close_entry(
        &self,
        id: u64,
        clock_out: NaiveDateTime,
        worked_hours: Decimal,
    ) -> Result<bool, StoreError> {
        let mut state = self.state();
        match state
            .entries
            .values_mut()
            .find(|entry| entry.id == id && entry.is_open())
        {
            Some(entry) => {
                entry.clock_out = Some(clock_out);
                entry.worked_hours = worked_hours;
                Ok(true)
            }
            None => Ok(false),
        }
    }

    async fn entries_for_employee(
        &self,
        employee_id: u64,
        window: EntryWindow,
    ) -> Result<Vec<AttendanceEntry>, StoreError> {
        // keys are (employee_id, date), so the range is already date-ordered
        let from = (employee_id, NaiveDate::MIN);
        let to = (employee_id, NaiveDate::MAX);
        Ok(self
            .state()
            .entries
            .range(from..=to)
            .map(|(_, entry)| entry)
            .filter(|entry| window.contains(entry))
            .cloned()
            .collect())
    }

    async fn entries_on(&self, date: NaiveDate) -> Result<Vec<AttendanceEntry>, StoreError> {
        Ok(self
            .state()
            .entries
            .values()
            .filter(|entry| entry.date == date)
            .cloned()
            .collect())
    }

    async fn entries_for_month(
        &self,
        month: u32,
        year: i32,
    ) -> Result<Vec<AttendanceEntry>, StoreError> {
        let mut entries: Vec<_> = self
            .state()
            .entries
            .values()
            .filter(|entry| entry.month == month && entry.year == year)
            .cloned()
            .collect();
        entries.sort_by_key(|entry| entry.date);
        Ok(entries)
    }
}

#[async_trait]
impl PayrollStore for MemoryStore {
    async fn insert_record(&self, record: NewPayrollRecord) -> Result<PayrollRecord, StoreError> {
        let mut state = self.state();
        let key = (record.employee_id, record.year, record.month);
        if state.records.contains_key(&key) {
            return Err(StoreError::UniqueViolation);
        }

        state.next_record_id += 1;
        let created = PayrollRecord {
            id: state.next_record_id,
            employee_id: record.employee_id,
            month: record.month,
            year: record.year,
            basic_salary: record.basic_salary,
            allowances: record.allowances,
            deductions: record.deductions,
            net_salary: record.net_salary,
            disbursed_at: record.disbursed_at,
            disbursed_by: record.disbursed_by,
        };
        state.records.insert(key, created.clone());
        Ok(created)
    }

    async fn find_record(
        &self,
        employee_id: u64,
        month: u32,
        year: i32,
    ) -> Result<Option<PayrollRecord>, StoreError> {
        Ok(self.state().records.get(&(employee_id, year, month)).cloned())
    }

    async fn records_for_period(
        &self,
        month: u32,
        year: i32,
    ) -> Result<Vec<PayrollRecord>, StoreError> {
        Ok(self
            .state()
            .records
            .values()
            .filter(|record| record.month == month && record.year == year)
            .cloned()
            .collect())
    }

    async fn records_for_employee(
        &self,
        employee_id: u64,
    ) -> Result<Vec<PayrollRecord>, StoreError> {
        let from = (employee_id, i32::MIN, u32::MIN);
        let to = (employee_id, i32::MAX, u32::MAX);
        Ok(self
            .state()
            .records
            .range(from..=to)
            .rev()
            .map(|(_, record)| record.clone())
            .collect())
    }
}

#[async_trait]
impl EmployeeDirectory for MemoryStore {
    async fn find_employee(&self, employee_id: u64) -> Result<Option<EmployeeRef>, StoreError> {
        Ok(self.state().employees.get(&employee_id).cloned())
    }

    async fn active_employee_ids(&self) -> Result<Vec<u64>, StoreError> {
        let mut ids: Vec<u64> = self
            .state()
            .employees
            .values()
            .filter(|employee| employee.is_active())
            .map(|employee| employee.id)
            .collect();
        ids.sort_unstable();
        Ok(ids)
    }
}
