use std::sync::{Mutex, PoisonError};

use chrono::{Datelike, Duration, Local, NaiveDate, NaiveDateTime, Timelike};

/// Source of "now" in process-local wall-clock time.
///
/// The local calendar day is authoritative for attendance; no timezone is
/// stored alongside the timestamps.
pub trait TimeSource: Send + Sync {
    fn now(&self) -> NaiveDateTime;

    fn today(&self) -> NaiveDate {
        self.now().date()
    }

    fn current_month_year(&self) -> (u32, i32) {
        let today = self.today();
        (today.month(), today.year())
    }
}

#[derive(Debug, Default, Clone, Copy)]
pub struct LocalTime;

impl TimeSource for LocalTime {
    fn now(&self) -> NaiveDateTime {
        let now = Local::now().naive_local();
        // DATETIME(3) keeps milliseconds
        let millis = now.nanosecond() / 1_000_000 * 1_000_000;
        now.with_nanosecond(millis).unwrap_or(now)
    }
}

/// Settable clock for tests and replays.
#[derive(Debug)]
pub struct ManualTime {
    now: Mutex<NaiveDateTime>,
}

impl ManualTime {
    pub fn new(now: NaiveDateTime) -> Self {
        Self {
            now: Mutex::new(now),
        }
    }

    pub fn set(&self, now: NaiveDateTime) {
        *self.now.lock().unwrap_or_else(PoisonError::into_inner) = now;
    }

    pub fn advance(&self, by: Duration) {
        let mut now = self.now.lock().unwrap_or_else(PoisonError::into_inner);
        *now += by;
    }
}

impl TimeSource for ManualTime {
    fn now(&self) -> NaiveDateTime {
        *self.now.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn manual_time_crosses_midnight() {
        let clock = ManualTime::new(
            NaiveDate::from_ymd_opt(2026, 1, 31)
                .unwrap()
                .and_hms_opt(23, 59, 0)
                .unwrap(),
        );
        assert_eq!(clock.current_month_year(), (1, 2026));

        clock.advance(Duration::minutes(2));
        assert_eq!(clock.today(), NaiveDate::from_ymd_opt(2026, 2, 1).unwrap());
        assert_eq!(clock.current_month_year(), (2, 2026));
    }

    #[test]
    fn local_time_is_millisecond_aligned() {
        assert_eq!(LocalTime.now().nanosecond() % 1_000_000, 0);
    }
}
