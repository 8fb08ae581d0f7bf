//! Payroll record model.
//!
//! One [`PayrollRecord`] exists per (employee, month). The engine owns its
//! computed fields; only the status may be moved by outside collaborators.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use super::PayrollMonth;

/// Lifecycle status of a payroll record.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PayrollStatus {
    /// Computed by the engine and open to regeneration.
    #[default]
    Calculated,
    /// Awaiting payment; still open to regeneration.
    Pending,
    /// Finalized by the payment process; immutable to the engine.
    Paid,
}

impl PayrollStatus {
    /// Returns true if the record may no longer be recomputed.
    pub fn is_paid(&self) -> bool {
        matches!(self, PayrollStatus::Paid)
    }
}

/// A data-quality or policy flag attached to a generated record.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PayrollAnomaly {
    /// No schedule row existed for the office/position; the default was used.
    ScheduleDefaulted,
    /// The month had no working days for the employee.
    ZeroWorkingDays,
    /// Deductions exceeded gross pay and net salary was clamped to zero.
    NetSalaryClamped,
}

/// The monthly payroll outcome for one employee.
///
/// Contains no timestamps: generating the same month twice from unchanged
/// inputs yields an identical value.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PayrollRecord {
    /// The employee this record belongs to.
    pub employee_id: String,
    /// The payroll month.
    pub period: PayrollMonth,
    /// Working days in the employee's employment window this month.
    pub working_days: u32,
    /// Days credited as present, including late days.
    pub present_days: u32,
    /// Days credited as half days.
    pub half_days: u32,
    /// Present days with a late punch-in (subset of `present_days`).
    pub late_days: u32,
    /// Working days with no usable attendance.
    pub absent_days: u32,
    /// Approved leave days.
    pub leaves: u32,
    /// Absent days beyond the consecutive-absence allowance.
    pub excess_leaves: u32,
    /// Working days not credited, counting each half day as 0.5.
    pub deduction_days: Decimal,
    /// Hours worked beyond duty hours across the month.
    pub overtime_hours: Decimal,
    /// Salary value of one working day.
    pub per_day_rate: Decimal,
    /// Total attendance deductions.
    pub deductions: Decimal,
    /// Allowances added on top of gross salary.
    pub allowances: Decimal,
    /// Salary before deductions and allowances.
    pub gross_salary: Decimal,
    /// Salary payable, never negative.
    pub net_salary: Decimal,
    /// Lifecycle status.
    pub status: PayrollStatus,
    /// Data-quality flags raised while generating the record.
    #[serde(default)]
    pub anomalies: Vec<PayrollAnomaly>,
}

impl PayrollRecord {
    /// Returns true if the record is paid and therefore immutable.
    pub fn is_paid(&self) -> bool {
        self.status.is_paid()
    }

    /// Returns true if the record carries `anomaly`.
    pub fn has_anomaly(&self, anomaly: PayrollAnomaly) -> bool {
        self.anomalies.contains(&anomaly)
    }
}
