use actix_web::{HttpResponse, Responder, web};
use serde::Deserialize;
use serde_json::json;
use tracing::instrument;
use utoipa::{IntoParams, ToSchema};

use crate::auth::AuthUser;
use crate::model::payroll::PayrollRecord;
use crate::service::{Disbursement, PayrollLedger};

#[derive(Debug, Deserialize, IntoParams, ToSchema)]
pub struct PayrollPeriodQuery {
    #[schema(example = 1)]
    pub month: u32,

    #[schema(example = 2026)]
    pub year: i32,
}

#[utoipa::path(
    post,
    path = "/api/payroll",
    request_body = Disbursement,
    responses(
        (status = 201, description = "Salary disbursed", body = PayrollRecord),
        (status = 400, description = "Invalid period or amount"),
        (status = 404, description = "Employee not found"),
        (status = 409, description = "Already paid for this month", body = Object, example = json!({
            "message": "Salary already paid for this period"
        })),
        (status = 401),
        (status = 403)
    ),
    security(("bearer_auth" = [])),
    tag = "Payroll"
)]
#[instrument(
    name = "payroll_disburse",
    skip(auth, ledger, payload),
    fields(admin_id = auth.user_id, employee_id = payload.employee_id)
)]
pub async fn disburse(
    auth: AuthUser,
    ledger: web::Data<PayrollLedger>,
    payload: web::Json<Disbursement>,
) -> actix_web::Result<impl Responder> {
    auth.require_admin()?;

    let record = ledger.disburse(payload.into_inner(), auth.user_id).await?;

    Ok(HttpResponse::Created().json(json!({
        "message": "Salary disbursed successfully",
        "record": record
    })))
}

/// Records disbursed for one month (HR/Admin)
#[utoipa::path(
    get,
    path = "/api/payroll",
    params(PayrollPeriodQuery),
    responses(
        (status = 200, body = Vec<PayrollRecord>),
        (status = 400, description = "Invalid period"),
        (status = 403)
    ),
    security(("bearer_auth" = [])),
    tag = "Payroll"
)]
pub async fn period_status(
    auth: AuthUser,
    ledger: web::Data<PayrollLedger>,
    query: web::Query<PayrollPeriodQuery>,
) -> actix_web::Result<impl Responder> {
    auth.require_hr_or_admin()?;

    let records = ledger.status_for_period(query.month, query.year).await?;
    Ok(HttpResponse::Ok().json(records))
}

#[utoipa::path(
    get,
    path = "/api/payroll/employee/{employee_id}",
    params(
        ("employee_id" = u64, Path, description = "Employee ID")
    ),
    responses(
        (status = 200, description = "Newest period first", body = Vec<PayrollRecord>),
        (status = 403)
    ),
    security(("bearer_auth" = [])),
    tag = "Payroll"
)]
pub async fn employee_history(
    auth: AuthUser,
    ledger: web::Data<PayrollLedger>,
    path: web::Path<u64>,
) -> actix_web::Result<impl Responder> {
    auth.require_hr_or_admin()?;

    let records = ledger.history_for_employee(path.into_inner()).await?;
    Ok(HttpResponse::Ok().json(records))
}

#[utoipa::path(
    get,
    path = "/api/payroll/me",
    responses(
        (status = 200, description = "Newest period first", body = Vec<PayrollRecord>),
        (status = 403, description = "No employee profile")
    ),
    security(("bearer_auth" = [])),
    tag = "Payroll"
)]
pub async fn my_history(
    auth: AuthUser,
    ledger: web::Data<PayrollLedger>,
) -> actix_web::Result<impl Responder> {
    let employee_id = auth.require_employee()?;

    let records = ledger.history_for_employee(employee_id).await?;
    Ok(HttpResponse::Ok().json(records))
}

#[utoipa::path(
    get,
    path = "/api/payroll/me/{year}/{month}",
    params(
        ("year" = i32, Path, description = "Year"),
        ("month" = u32, Path, description = "Month 1-12")
    ),
    responses(
        (status = 200, body = PayrollRecord),
        (status = 404, description = "Payslip not found")
    ),
    security(("bearer_auth" = [])),
    tag = "Payroll"
)]
pub async fn my_payslip(
    auth: AuthUser,
    ledger: web::Data<PayrollLedger>,
    path: web::Path<(i32, u32)>,
) -> actix_web::Result<impl Responder> {
    let employee_id = auth.require_employee()?;
    let (year, month) = path.into_inner();

    let record = ledger.payslip(employee_id, month, year).await?;
    Ok(HttpResponse::Ok().json(record))
}
