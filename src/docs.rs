use crate::api::attendance::{AttendanceQuery, PeriodQuery};
use crate::api::payroll::PayrollPeriodQuery;
use crate::model::attendance::AttendanceEntry;
use crate::model::payroll::PayrollRecord;
use crate::service::{DailySnapshot, DayHours, Disbursement, EmployeeSummary};
use utoipa::openapi::security::{HttpAuthScheme, HttpBuilder, SecurityScheme};
use utoipa::{Modify, OpenApi, openapi};

#[derive(OpenApi)]
#[openapi(
    info(
        title = "HRM Attendance & Payroll API",
        version = "0.1.0",
        description = r#"
## Attendance, payroll and live notifications

### Key Features
- **Attendance**
  - One clock-in and one clock-out per employee per day
  - Own history by month or date range, dashboard summary
  - Daily presence and monthly hours reports for HR/Admin
- **Payroll**
  - At most one disbursement per employee per month
  - Period status, per-employee history and payslips
- **Live**
  - Server-sent events pushed to every open connection of the recipient

### Security
All endpoints require a **JWT Bearer** access token.
Reports are limited to **HR** and **Admin**; disbursement to **Admin**.

---
Built with **Rust**, **Actix Web**, **SQLx**, and **Utoipa**.
"#,
    ),
    paths(
        crate::api::attendance::clock_in,
        crate::api::attendance::clock_out,
        crate::api::attendance::my_entries,
        crate::api::attendance::my_summary,
        crate::api::attendance::employee_entries,
        crate::api::attendance::daily_stats,
        crate::api::attendance::monthly_stats,

        crate::api::payroll::disburse,
        crate::api::payroll::period_status,
        crate::api::payroll::employee_history,
        crate::api::payroll::my_history,
        crate::api::payroll::my_payslip,

        crate::api::live::connect
    ),
    components(
        schemas(
            AttendanceEntry,
            AttendanceQuery,
            PeriodQuery,
            DailySnapshot,
            DayHours,
            EmployeeSummary,
            PayrollRecord,
            Disbursement,
            PayrollPeriodQuery
        )
    ),
    modifiers(&SecurityAddon),
    tags(
        (name = "Attendance", description = "Clock-in/out and attendance reports"),
        (name = "Payroll", description = "Salary disbursement and payslips"),
        (name = "Live", description = "Live notification stream"),
    )
)]
pub struct ApiDoc;

struct SecurityAddon;

impl Modify for SecurityAddon {
    fn modify(&self, openapi: &mut openapi::OpenApi) {
        let components = openapi.components.get_or_insert_with(Default::default);
        components.add_security_scheme(
            "bearer_auth",
            SecurityScheme::Http(
                HttpBuilder::new()
                    .scheme(HttpAuthScheme::Bearer)
                    .bearer_format("JWT")
                    .build(),
            ),
        );
    }
}
