use std::sync::Arc;

use rust_decimal::Decimal;
use serde::Deserialize;
use utoipa::ToSchema;

use super::{resolve_employee, validate_month, validate_year};
use crate::error::CoreError;
use crate::model::payroll::{NewPayrollRecord, PayrollRecord, net_salary};
use crate::notify::{DomainEvent, EventBus};
use crate::store::{EmployeeDirectory, PayrollStore, StoreError};
use crate::time::TimeSource;

/// Largest amount a `DECIMAL(14, 2)` column holds.
// 99_999_999_999_999 with scale 2; `Decimal::new` is not `const`.
const MAX_AMOUNT: Decimal = Decimal::from_parts(0x107A_3FFF, 0x5AF3, 0, false, 2);

/// A request to pay one employee for one period.
#[derive(Debug, Clone, Deserialize, ToSchema)]
pub struct Disbursement {
    #[schema(example = 1001)]
    pub employee_id: u64,
    #[schema(example = 1)]
    pub month: u32,
    #[schema(example = 2026)]
    pub year: i32,
    #[schema(example = "50000", value_type = String)]
    pub basic_salary: Decimal,
    #[serde(default)]
    #[schema(example = "2000", value_type = String)]
    pub allowances: Decimal,
    #[serde(default)]
    #[schema(example = "500", value_type = String)]
    pub deductions: Decimal,
}

impl Disbursement {
    fn validate(&self) -> Result<Decimal, CoreError> {
        validate_month(self.month)?;
        validate_year(self.year)?;

        for (field, value) in [
            ("basic_salary", self.basic_salary),
            ("allowances", self.allowances),
            ("deductions", self.deductions),
        ] {
            if value.is_sign_negative() && !value.is_zero() {
                return Err(CoreError::InvalidAmount(format!("{field} must not be negative")));
            }
            check_storable(field, value)?;
        }

        let net = net_salary(self.basic_salary, self.allowances, self.deductions);
        if net.is_sign_negative() && !net.is_zero() {
            return Err(CoreError::InvalidAmount(
                "deductions exceed basic salary plus allowances".into(),
            ));
        }
        check_storable("net_salary", net)?;
        Ok(net)
    }
}

/// Amounts are kept to the cent; anything the column would round or reject is refused.
fn check_storable(field: &str, value: Decimal) -> Result<(), CoreError> {
    if value.normalize().scale() > 2 {
        return Err(CoreError::InvalidAmount(format!(
            "{field} has more than 2 decimal places"
        )));
    }
    if value > MAX_AMOUNT {
        return Err(CoreError::InvalidAmount(format!("{field} exceeds {MAX_AMOUNT}")));
    }
    Ok(())
}

/// Owns payroll disbursements: at most one per employee per month.
pub struct PayrollLedger {
    store: Arc<dyn PayrollStore>,
    directory: Arc<dyn EmployeeDirectory>,
    bus: Arc<EventBus>,
    time: Arc<dyn TimeSource>,
}

impl PayrollLedger {
    pub fn new(
        store: Arc<dyn PayrollStore>,
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

    pub async fn disburse(
        &self,
        request: Disbursement,
        admin_id: u64,
    ) -> Result<PayrollRecord, CoreError> {
        let net = request.validate()?;

        let employee = resolve_employee(&*self.directory, request.employee_id).await?;

        let new_record = NewPayrollRecord {
            employee_id: request.employee_id,
            month: request.month,
            year: request.year,
            basic_salary: request.basic_salary,
            allowances: request.allowances,
            deductions: request.deductions,
            net_salary: net,
            disbursed_at: self.time.now(),
            disbursed_by: admin_id,
        };

        let record = match self.store.insert_record(new_record).await {
            Ok(record) => record,
            Err(StoreError::UniqueViolation) => {
                tracing::info!(
                    employee_id = request.employee_id,
                    month = request.month,
                    year = request.year,
                    "Duplicate disbursement rejected"
                );
                return Err(CoreError::AlreadyPaid);
            }
            Err(e) => return Err(e.into()),
        };

        tracing::info!(
            employee_id = record.employee_id,
            month = record.month,
            year = record.year,
            net_salary = %record.net_salary,
            admin_id,
            "Salary disbursed"
        );

        match employee.user_id {
            Some(recipient) => self.bus.publish(&DomainEvent::PayrollDisbursed {
                record: record.clone(),
                recipient,
            }),
            None => tracing::debug!(
                employee_id = record.employee_id,
                "No linked user, payroll event not published"
            ),
        }

        Ok(record)
    }

    pub async fn status_for_period(
        &self,
        month: u32,
        year: i32,
    ) -> Result<Vec<PayrollRecord>, CoreError> {
        validate_month(month)?;
        validate_year(year)?;
        Ok(self.store.records_for_period(month, year).await?)
    }

    pub async fn history_for_employee(
        &self,
        employee_id: u64,
    ) -> Result<Vec<PayrollRecord>, CoreError> {
        resolve_employee(&*self.directory, employee_id).await?;
        Ok(self.store.records_for_employee(employee_id).await?)
    }

    pub async fn payslip(
        &self,
        employee_id: u64,
        month: u32,
        year: i32,
    ) -> Result<PayrollRecord, CoreError> {
        validate_month(month)?;
        validate_year(year)?;
        resolve_employee(&*self.directory, employee_id).await?;
        self.store
            .find_record(employee_id, month, year)
            .await?
            .ok_or_else(|| CoreError::NotFound(format!("Payslip for {month}/{year}")))
    }
}
