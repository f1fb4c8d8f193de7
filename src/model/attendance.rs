use chrono::{Datelike, NaiveDate, NaiveDateTime};
use rust_decimal::{Decimal, RoundingStrategy};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

/// One employee's clock-in/clock-out record for one local calendar day.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, sqlx::FromRow, ToSchema)]
pub struct AttendanceEntry {
    #[schema(example = 1)]
    pub id: u64,
    #[schema(example = 1001)]
    pub employee_id: u64,
    #[schema(example = "2026-01-05", value_type = String, format = "date")]
    pub date: NaiveDate,
    #[schema(example = "2026-01-05T09:00:00", value_type = String, format = "date-time")]
    pub clock_in: NaiveDateTime,
    #[schema(example = "2026-01-05T17:30:00", value_type = String, format = "date-time", nullable = true)]
    pub clock_out: Option<NaiveDateTime>,
    #[schema(example = "8.50", value_type = String)]
    pub worked_hours: Decimal,
    #[schema(example = 1)]
    pub month: u32,
    #[schema(example = 2026)]
    pub year: i32,
}

impl AttendanceEntry {
    pub fn is_open(&self) -> bool {
        self.clock_out.is_none()
    }
}

/// Insert payload; the store assigns the id.
#[derive(Debug, Clone)]
pub struct NewAttendanceEntry {
    pub employee_id: u64,
    pub date: NaiveDate,
    pub clock_in: NaiveDateTime,
    pub month: u32,
    pub year: i32,
}

impl NewAttendanceEntry {
    pub fn opened_at(employee_id: u64, clock_in: NaiveDateTime) -> Self {
        let date = clock_in.date();
        Self {
            employee_id,
            date,
            clock_in,
            month: date.month(),
            year: date.year(),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "snake_case")]
pub enum ClockKind {
    ClockIn,
    ClockOut,
}

/// Elapsed hours between two instants, rounded to 2 decimal places.
///
/// A clock-out earlier than the clock-in (wall clock stepped back) yields zero.
pub fn worked_hours(clock_in: NaiveDateTime, clock_out: NaiveDateTime) -> Decimal {
    let millis = (clock_out - clock_in).num_milliseconds().max(0);
    (Decimal::from(millis) / Decimal::from(3_600_000u32))
        .round_dp_with_strategy(2, RoundingStrategy::MidpointAwayFromZero)
}
