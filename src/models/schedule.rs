//! Office/position work schedule model.

use chrono::NaiveTime;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::error::{EngineError, EngineResult};

/// The reporting time and duty length configured for an office/position pair.
///
/// At most one schedule exists per (office, position). Pairs without a row
/// fall back to the policy default (see
/// [`crate::calculation::resolve_schedule`]).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OfficePositionSchedule {
    /// The office this schedule applies to.
    pub office_id: String,
    /// The position this schedule applies to.
    pub position_id: String,
    /// Time-of-day the employee is expected to punch in.
    pub reporting_time: NaiveTime,
    /// Expected hours of duty per working day.
    pub duty_hours: Decimal,
}

impl OfficePositionSchedule {
    /// Creates a schedule, rejecting non-positive or impossible duty lengths.
    ///
    /// # Example
    ///
    /// ```
    /// use payroll_engine::models::OfficePositionSchedule;
    /// use chrono::NaiveTime;
    /// use rust_decimal::Decimal;
    ///
    /// let schedule = OfficePositionSchedule::new(
    ///     "DXB",
    ///     "AGENT",
    ///     NaiveTime::from_hms_opt(8, 30, 0).unwrap(),
    ///     Decimal::new(9, 0),
    /// )
    /// .unwrap();
    /// assert_eq!(schedule.duty_hours, Decimal::new(9, 0));
    ///
    /// let invalid = OfficePositionSchedule::new(
    ///     "DXB",
    ///     "AGENT",
    ///     NaiveTime::from_hms_opt(8, 30, 0).unwrap(),
    ///     Decimal::ZERO,
    /// );
    /// assert!(invalid.is_err());
    /// ```
    pub fn new(
        office_id: impl Into<String>,
        position_id: impl Into<String>,
        reporting_time: NaiveTime,
        duty_hours: Decimal,
    ) -> EngineResult<Self> {
        let schedule = Self {
            office_id: office_id.into(),
            position_id: position_id.into(),
            reporting_time,
            duty_hours,
        };
        schedule.validate()?;
        Ok(schedule)
    }

    /// Checks the duty length is within (0, 24] hours.
    pub fn validate(&self) -> EngineResult<()> {
        if self.duty_hours <= Decimal::ZERO || self.duty_hours > Decimal::new(24, 0) {
            return Err(EngineError::InputData {
                field: "duty_hours".to_string(),
                message: format!(
                    "must be greater than 0 and at most 24, got {} for {}/{}",
                    self.duty_hours, self.office_id, self.position_id
                ),
            });
        }
        Ok(())
    }
}
