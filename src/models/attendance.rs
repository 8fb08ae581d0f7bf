//! Attendance punch and approved leave models.

use chrono::{NaiveDate, NaiveTime};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::error::{EngineError, EngineResult};

/// One employee's punch record for one calendar date.
///
/// At most one record exists per (employee, date). Either time may be
/// missing: a record without a punch-in is an absence, a record with a
/// punch-in but no punch-out is handled by policy.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AttendancePunch {
    /// The employee the punch belongs to.
    pub employee_id: String,
    /// The calendar date of the punch.
    pub date: NaiveDate,
    /// Time the employee punched in.
    #[serde(default)]
    pub punch_in: Option<NaiveTime>,
    /// Time the employee punched out.
    #[serde(default)]
    pub punch_out: Option<NaiveTime>,
}

impl AttendancePunch {
    /// Creates a punch record after checking the pair is consistent.
    ///
    /// # Example
    ///
    /// ```
    /// use payroll_engine::models::AttendancePunch;
    /// use chrono::{NaiveDate, NaiveTime};
    /// use rust_decimal::Decimal;
    ///
    /// let punch = AttendancePunch::new(
    ///     "EMP001",
    ///     NaiveDate::from_ymd_opt(2026, 3, 2).unwrap(),
    ///     NaiveTime::from_hms_opt(9, 0, 0),
    ///     NaiveTime::from_hms_opt(17, 30, 0),
    /// )
    /// .unwrap();
    /// assert_eq!(punch.worked_hours(), Some(Decimal::new(85, 1)));
    /// ```
    pub fn new(
        employee_id: impl Into<String>,
        date: NaiveDate,
        punch_in: Option<NaiveTime>,
        punch_out: Option<NaiveTime>,
    ) -> EngineResult<Self> {
        let punch = Self {
            employee_id: employee_id.into(),
            date,
            punch_in,
            punch_out,
        };
        punch.validate()?;
        Ok(punch)
    }

    /// Checks the record's invariants.
    pub fn validate(&self) -> EngineResult<()> {
        if self.employee_id.trim().is_empty() {
            return Err(EngineError::InputData {
                field: "employee_id".to_string(),
                message: "must not be empty".to_string(),
            });
        }
        match (self.punch_in, self.punch_out) {
            (None, Some(_)) => Err(EngineError::InvalidPunch {
                employee_id: self.employee_id.clone(),
                date: self.date,
                message: "punch-out recorded without a punch-in".to_string(),
            }),
            (Some(punch_in), Some(punch_out)) if punch_out < punch_in => {
                Err(EngineError::InvalidPunch {
                    employee_id: self.employee_id.clone(),
                    date: self.date,
                    message: format!("punch-out {punch_out} is before punch-in {punch_in}"),
                })
            }
            _ => Ok(()),
        }
    }

    /// Minutes between punch-in and punch-out, if both are present.
    pub fn worked_minutes(&self) -> Option<i64> {
        match (self.punch_in, self.punch_out) {
            (Some(punch_in), Some(punch_out)) => Some((punch_out - punch_in).num_minutes()),
            _ => None,
        }
    }

    /// Hours between punch-in and punch-out, if both are present.
    pub fn worked_hours(&self) -> Option<Decimal> {
        self.worked_minutes()
            .map(|minutes| Decimal::new(minutes, 0) / Decimal::new(60, 0))
    }
}

/// An approved leave day for an employee.
///
/// Presence of a row forces the day's status to approved leave regardless of
/// any punches on that date.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ApprovedLeave {
    /// The employee on leave.
    pub employee_id: String,
    /// The leave date.
    pub date: NaiveDate,
    /// Who approved the leave.
    #[serde(default)]
    pub approved_by: Option<String>,
    /// Free-text reason.
    #[serde(default)]
    pub reason: Option<String>,
}
