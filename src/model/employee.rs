use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum EmployeeStatus {
    Active,
    Terminated,
}

impl EmployeeStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            EmployeeStatus::Active => "active",
            EmployeeStatus::Terminated => "terminated",
        }
    }

    pub fn parse(value: &str) -> Option<Self> {
        match value {
            "active" => Some(EmployeeStatus::Active),
            "terminated" => Some(EmployeeStatus::Terminated),
            _ => None,
        }
    }
}

/// Directory view of an employee: just what the attendance and payroll core needs.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EmployeeRef {
    pub id: u64,
    /// Login linked to this employee, if any. Notifications go to this user.
    pub user_id: Option<u64>,
    pub status: EmployeeStatus,
}

impl EmployeeRef {
    pub fn is_active(&self) -> bool {
        self.status == EmployeeStatus::Active
    }
}
