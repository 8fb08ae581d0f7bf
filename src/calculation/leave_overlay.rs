//! Approved leave overlay.
//!
//! An approved leave dominates whatever the punches say: the day becomes
//! approved leave and contributes no worked hours, overtime or lateness.

use rust_decimal::Decimal;

use crate::models::{ApprovedLeave, AuditStep};

use super::classifier::{DayClassification, DayStatus};

/// The result of applying the leave overlay to a classified day.
#[derive(Debug, Clone)]
pub struct LeaveOverlayResult {
    /// The day after the overlay.
    pub day: DayClassification,
    /// Present only when a leave replaced the classification.
    pub audit_step: Option<AuditStep>,
}

/// Applies an approved leave to a classified working day.
///
/// Without a leave for the day, the classification is returned unchanged.
///
/// # Example
///
/// ```
/// use payroll_engine::calculation::{DayStatus, ResolvedSchedule, ScheduleSource, apply_leave_overlay, classify_day};
/// use payroll_engine::config::PayrollPolicy;
/// use payroll_engine::models::ApprovedLeave;
/// use chrono::{NaiveDate, NaiveTime};
/// use rust_decimal::Decimal;
///
/// let date = NaiveDate::from_ymd_opt(2026, 3, 4).unwrap();
/// let schedule = ResolvedSchedule {
///     reporting_time: NaiveTime::from_hms_opt(9, 0, 0).unwrap(),
///     duty_hours: Decimal::new(8, 0),
///     source: ScheduleSource::Default,
/// };
/// let absent = classify_day(date, &schedule, None, &PayrollPolicy::default(), 1).unwrap().day;
/// let leave = ApprovedLeave {
///     employee_id: "EMP001".to_string(),
///     date,
///     approved_by: None,
///     reason: None,
/// };
///
/// let result = apply_leave_overlay(absent, Some(&leave), 2);
/// assert_eq!(result.day.status, DayStatus::ApprovedLeave);
/// ```
pub fn apply_leave_overlay(
    day: DayClassification,
    leave: Option<&ApprovedLeave>,
    step_number: u32,
) -> LeaveOverlayResult {
    let Some(leave) = leave else {
        return LeaveOverlayResult {
            day,
            audit_step: None,
        };
    };

    let previous = day.status;
    let overlaid = DayClassification {
        status: DayStatus::ApprovedLeave,
        worked_hours: Decimal::ZERO,
        overtime_hours: Decimal::ZERO,
        lateness_minutes: 0,
        is_late: false,
        excess_leave: false,
        ..day
    };

    let audit_step = AuditStep {
        step_number,
        rule_id: "approved_leave".to_string(),
        rule_name: "Approved Leave Overlay".to_string(),
        date: Some(overlaid.date),
        input: serde_json::json!({
            "classified_as": previous,
            "approved_by": leave.approved_by,
            "reason": leave.reason,
        }),
        output: serde_json::json!({
            "status": overlaid.status,
        }),
        reasoning: format!("Approved leave replaces {:?} classification", previous),
    };

    LeaveOverlayResult {
        day: overlaid,
        audit_step: Some(audit_step),
    }
}
