use chrono::NaiveDateTime;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

/// Immutable disbursement record, one per (employee, month, year).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, sqlx::FromRow, ToSchema)]
pub struct PayrollRecord {
    #[schema(example = 1)]
    pub id: u64,
    #[schema(example = 1001)]
    pub employee_id: u64,
    #[schema(example = 1)]
    pub month: u32,
    #[schema(example = 2026)]
    pub year: i32,
    #[schema(example = "50000", value_type = String)]
    pub basic_salary: Decimal,
    #[schema(example = "2000", value_type = String)]
    pub allowances: Decimal,
    #[schema(example = "500", value_type = String)]
    pub deductions: Decimal,
    #[schema(example = "51500", value_type = String)]
    pub net_salary: Decimal,
    #[schema(example = "2026-01-31T10:00:00", value_type = String, format = "date-time")]
    pub disbursed_at: NaiveDateTime,
    #[schema(example = 1)]
    pub disbursed_by: u64,
}

#[derive(Debug, Clone)]
pub struct NewPayrollRecord {
    pub employee_id: u64,
    pub month: u32,
    pub year: i32,
    pub basic_salary: Decimal,
    pub allowances: Decimal,
    pub deductions: Decimal,
    pub net_salary: Decimal,
    pub disbursed_at: NaiveDateTime,
    pub disbursed_by: u64,
}

pub fn net_salary(basic_salary: Decimal, allowances: Decimal, deductions: Decimal) -> Decimal {
    basic_salary + allowances - deductions
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn net_is_exact() {
        let net = net_salary(Decimal::from(50_000), Decimal::from(2_000), Decimal::from(500));
        assert_eq!(net, Decimal::from(51_500));
    }

    #[test]
    fn fractional_amounts_do_not_drift() {
        let net = net_salary(
            Decimal::new(1_000_010, 2),
            Decimal::new(20, 2),
            Decimal::new(30, 2),
        );
        assert_eq!(net, Decimal::new(1_000_000, 2));
    }
}
