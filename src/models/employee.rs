//! Employee model.
//!
//! The engine reads a snapshot of the employee directory and never mutates
//! it. Salary and joining date drive pro-ration; office and position resolve
//! the work schedule.

use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::error::{EngineError, EngineResult};

use super::PayrollMonth;

fn default_active() -> bool {
    true
}

/// Represents an employee subject to payroll generation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Employee {
    /// Stable external code (e.g., "EMP001").
    pub employee_id: String,
    /// Display name.
    #[serde(default)]
    pub name: String,
    /// The office the employee is assigned to.
    pub office_id: String,
    /// The employee's position within the office.
    pub position_id: String,
    /// Fixed monthly salary.
    pub monthly_salary: Decimal,
    /// Fixed monthly allowances added on top of gross salary.
    #[serde(default)]
    pub allowances: Decimal,
    /// The first day of employment.
    pub joining_date: NaiveDate,
    /// Whether the employee is currently active.
    #[serde(default = "default_active")]
    pub active: bool,
}

impl Employee {
    /// Checks the fields the engine relies on.
    pub fn validate(&self) -> EngineResult<()> {
        if self.employee_id.trim().is_empty() {
            return Err(EngineError::InputData {
                field: "employee_id".to_string(),
                message: "must not be empty".to_string(),
            });
        }
        if self.monthly_salary.is_sign_negative() {
            return Err(EngineError::InputData {
                field: "monthly_salary".to_string(),
                message: format!("must not be negative, got {}", self.monthly_salary),
            });
        }
        if self.allowances.is_sign_negative() {
            return Err(EngineError::InputData {
                field: "allowances".to_string(),
                message: format!("must not be negative, got {}", self.allowances),
            });
        }
        Ok(())
    }

    /// Returns true if the employee had joined by the end of `month`.
    ///
    /// # Examples
    ///
    /// ```
    /// use payroll_engine::models::{Employee, PayrollMonth};
    /// use chrono::NaiveDate;
    /// use rust_decimal::Decimal;
    ///
    /// let employee = Employee {
    ///     employee_id: "EMP001".to_string(),
    ///     name: "Amina".to_string(),
    ///     office_id: "DXB".to_string(),
    ///     position_id: "AGENT".to_string(),
    ///     monthly_salary: Decimal::new(22000, 0),
    ///     allowances: Decimal::ZERO,
    ///     joining_date: NaiveDate::from_ymd_opt(2026, 3, 15).unwrap(),
    ///     active: true,
    /// };
    /// assert!(employee.is_employed_during(PayrollMonth::new(2026, 3).unwrap()));
    /// assert!(!employee.is_employed_during(PayrollMonth::new(2026, 2).unwrap()));
    /// ```
    pub fn is_employed_during(&self, month: PayrollMonth) -> bool {
        self.joining_date <= month.last_day()
    }

    /// The first date within `month` that the employee was employed.
    pub fn employment_start_in(&self, month: PayrollMonth) -> Option<NaiveDate> {
        if !self.is_employed_during(month) {
            return None;
        }
        Some(self.joining_date.max(month.first_day()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn create_test_employee() -> Employee {
        Employee {
            employee_id: "EMP001".to_string(),
            name: "Amina Khan".to_string(),
            office_id: "DXB".to_string(),
            position_id: "AGENT".to_string(),
            monthly_salary: Decimal::new(22000, 0),
            allowances: Decimal::ZERO,
            joining_date: NaiveDate::from_ymd_opt(2024, 6, 1).unwrap(),
            active: true,
        }
    }

    #[test]
    fn test_deserialize_employee_with_defaults() {
        let json = r#"{
            "employee_id": "EMP002",
            "office_id": "AUH",
            "position_id": "LEAD",
            "monthly_salary": "15000.50",
            "joining_date": "2025-01-15"
        }"#;

        let employee: Employee = serde_json::from_str(json).unwrap();
        assert_eq!(employee.employee_id, "EMP002");
        assert_eq!(employee.monthly_salary, Decimal::new(1500050, 2));
        assert_eq!(employee.allowances, Decimal::ZERO);
        assert!(employee.active);
        assert!(employee.name.is_empty());
    }

    #[test]
    fn test_validate_accepts_valid_employee() {
        assert!(create_test_employee().validate().is_ok());
    }

    #[test]
    fn test_validate_rejects_blank_id() {
        let mut employee = create_test_employee();
        employee.employee_id = "  ".to_string();
        match employee.validate() {
            Err(EngineError::InputData { field, .. }) => assert_eq!(field, "employee_id"),
            other => panic!("Expected InputData error, got {:?}", other),
        }
    }

    #[test]
    fn test_validate_rejects_negative_salary() {
        let mut employee = create_test_employee();
        employee.monthly_salary = Decimal::new(-1, 0);
        assert!(employee.validate().is_err());
    }

    #[test]
    fn test_employment_start_clamps_to_month() {
        let employee = create_test_employee();
        let month = PayrollMonth::new(2026, 3).unwrap();
        assert_eq!(
            employee.employment_start_in(month),
            Some(NaiveDate::from_ymd_opt(2026, 3, 1).unwrap())
        );
    }

    #[test]
    fn test_employment_start_mid_month() {
        let mut employee = create_test_employee();
        employee.joining_date = NaiveDate::from_ymd_opt(2026, 3, 15).unwrap();
        let month = PayrollMonth::new(2026, 3).unwrap();
        assert_eq!(employee.employment_start_in(month), Some(employee.joining_date));
    }

    #[test]
    fn test_employment_start_none_before_joining() {
        let mut employee = create_test_employee();
        employee.joining_date = NaiveDate::from_ymd_opt(2026, 4, 1).unwrap();
        let month = PayrollMonth::new(2026, 3).unwrap();
        assert_eq!(employee.employment_start_in(month), None);
    }
}
