use crate::auth::AuthUser;
use crate::model::attendance::AttendanceEntry;
use crate::service::{
    AttendanceAggregator, ClockStore, DailySnapshot, DayHours, EmployeeSummary, EntryFilter,
};
use actix_web::{HttpResponse, Responder, web};
use chrono::NaiveDate;
use serde::Deserialize;
use serde_json::json;
use tracing::instrument;
use utoipa::{IntoParams, ToSchema};

#[derive(Debug, Deserialize, IntoParams, ToSchema)]
pub struct AttendanceQuery {
    /// Month 1-12, together with `year`
    #[schema(example = 1)]
    pub month: Option<u32>,
    #[schema(example = 2026)]
    pub year: Option<i32>,
    /// Inclusive range start, together with `end_date`
    #[schema(example = "2026-01-01", format = "date", value_type = String)]
    pub start_date: Option<NaiveDate>,
    #[schema(example = "2026-01-31", format = "date", value_type = String)]
    pub end_date: Option<NaiveDate>,
}

impl AttendanceQuery {
    fn filter(&self) -> Result<EntryFilter, crate::error::CoreError> {
        EntryFilter::from_parts(self.month, self.year, self.start_date, self.end_date)
    }
}

#[derive(Debug, Deserialize, IntoParams, ToSchema)]
pub struct PeriodQuery {
    #[schema(example = 1)]
    pub month: u32,
    #[schema(example = 2026)]
    pub year: i32,
}

/// Clock-in endpoint
#[utoipa::path(
    post,
    path = "/api/attendance/clock-in",
    responses(
        (status = 200, description = "Clocked in successfully", body = AttendanceEntry),
        (status = 400, description = "Already clocked in today", body = Object, example = json!({
            "message": "Already clocked in today"
        })),
        (status = 401, description = "Unauthorized"),
        (status = 403, description = "Forbidden"),
        (status = 500, description = "Internal server error")
    ),
    security(("bearer_auth" = [])),
    tag = "Attendance"
)]
#[instrument(name = "attendance_clock_in", skip(auth, clock), fields(user_id = auth.user_id))]
pub async fn clock_in(
    auth: AuthUser,
    clock: web::Data<ClockStore>,
) -> actix_web::Result<impl Responder> {
    let employee_id = auth.require_employee()?;
    let entry = clock.record_clock_in(employee_id).await?;

    Ok(HttpResponse::Ok().json(json!({
        "message": "Clocked in successfully",
        "entry": entry
    })))
}

/// Clock-out endpoint
#[utoipa::path(
    post,
    path = "/api/attendance/clock-out",
    responses(
        (status = 200, description = "Clocked out successfully", body = AttendanceEntry),
        (status = 400, description = "No active clock-in found for today", body = Object, example = json!({
            "message": "No active clock-in found for today"
        })),
        (status = 401, description = "Unauthorized"),
        (status = 403, description = "Forbidden"),
        (status = 500, description = "Internal server error")
    ),
    security(("bearer_auth" = [])),
    tag = "Attendance"
)]
#[instrument(name = "attendance_clock_out", skip(auth, clock), fields(user_id = auth.user_id))]
pub async fn clock_out(
    auth: AuthUser,
    clock: web::Data<ClockStore>,
) -> actix_web::Result<impl Responder> {
    let employee_id = auth.require_employee()?;
    let entry = clock.record_clock_out(employee_id).await?;

    Ok(HttpResponse::Ok().json(json!({
        "message": "Clocked out successfully",
        "entry": entry
    })))
}

/// Own attendance entries, oldest first
#[utoipa::path(
    get,
    path = "/api/attendance",
    params(AttendanceQuery),
    responses(
        (status = 200, body = Vec<AttendanceEntry>),
        (status = 400, description = "Malformed period")
    ),
    security(("bearer_auth" = [])),
    tag = "Attendance"
)]
pub async fn my_entries(
    auth: AuthUser,
    clock: web::Data<ClockStore>,
    query: web::Query<AttendanceQuery>,
) -> actix_web::Result<impl Responder> {
    let employee_id = auth.require_employee()?;
    let entries = clock.query_entries(employee_id, query.filter()?).await?;
    Ok(HttpResponse::Ok().json(entries))
}

/// Current-month dashboard figures
#[utoipa::path(
    get,
    path = "/api/attendance/summary",
    responses((status = 200, body = EmployeeSummary)),
    security(("bearer_auth" = [])),
    tag = "Attendance"
)]
pub async fn my_summary(
    auth: AuthUser,
    stats: web::Data<AttendanceAggregator>,
) -> actix_web::Result<impl Responder> {
    let employee_id = auth.require_employee()?;
    Ok(HttpResponse::Ok().json(stats.employee_summary(employee_id).await?))
}

/// Attendance entries of any employee (HR/Admin)
#[utoipa::path(
    get,
    path = "/api/attendance/employee/{employee_id}",
    params(
        ("employee_id" = u64, Path, description = "Employee ID"),
        AttendanceQuery
    ),
    responses(
        (status = 200, body = Vec<AttendanceEntry>),
        (status = 403, description = "HR/Admin only")
    ),
    security(("bearer_auth" = [])),
    tag = "Attendance"
)]
pub async fn employee_entries(
    auth: AuthUser,
    clock: web::Data<ClockStore>,
    path: web::Path<u64>,
    query: web::Query<AttendanceQuery>,
) -> actix_web::Result<impl Responder> {
    auth.require_hr_or_admin()?;

    let employee_id = path.into_inner();
    let entries = clock.query_entries(employee_id, query.filter()?).await?;
    Ok(HttpResponse::Ok().json(entries))
}

/// Today's present/absent counts (HR/Admin)
#[utoipa::path(
    get,
    path = "/api/attendance/stats/daily",
    responses((status = 200, body = DailySnapshot)),
    security(("bearer_auth" = [])),
    tag = "Attendance"
)]
pub async fn daily_stats(
    auth: AuthUser,
    stats: web::Data<AttendanceAggregator>,
) -> actix_web::Result<impl Responder> {
    auth.require_hr_or_admin()?;
    Ok(HttpResponse::Ok().json(stats.daily_snapshot().await?))
}

/// Hours worked per day of a month, days without entries omitted (HR/Admin)
#[utoipa::path(
    get,
    path = "/api/attendance/stats/monthly",
    params(PeriodQuery),
    responses((status = 200, body = Vec<DayHours>)),
    security(("bearer_auth" = [])),
    tag = "Attendance"
)]
pub async fn monthly_stats(
    auth: AuthUser,
    stats: web::Data<AttendanceAggregator>,
    query: web::Query<PeriodQuery>,
) -> actix_web::Result<impl Responder> {
    auth.require_hr_or_admin()?;
    Ok(HttpResponse::Ok().json(stats.monthly_hours_by_day(query.month, query.year).await?))
}
