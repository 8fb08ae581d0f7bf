//! Attendance classification functionality.
//!
//! Classifies a single working day from its punch record against the
//! employee's resolved schedule, and measures work done on days that are not
//! working days.

use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::config::{MissingPunchOut, PayrollPolicy};
use crate::error::EngineResult;
use crate::models::{AttendancePunch, AuditStep};

use super::schedule::ResolvedSchedule;

/// The attendance outcome of one working day.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DayStatus {
    /// Full duty served on time.
    Present,
    /// Full duty served with a late punch-in.
    Late,
    /// Worked less than the half-day threshold, or left without punching out.
    HalfDay,
    /// No punch-in recorded.
    Absent,
    /// Covered by an approved leave.
    ApprovedLeave,
}

impl DayStatus {
    /// Returns true for statuses credited as a full day present.
    pub fn is_present(&self) -> bool {
        matches!(self, DayStatus::Present | DayStatus::Late)
    }
}

/// The classification of one working day.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DayClassification {
    /// The working day.
    pub date: NaiveDate,
    /// The day's status.
    pub status: DayStatus,
    /// Hours between punch-in and punch-out; zero when either is missing.
    pub worked_hours: Decimal,
    /// Hours worked beyond duty hours.
    pub overtime_hours: Decimal,
    /// Whole minutes between reporting time and punch-in.
    pub lateness_minutes: u32,
    /// Whether the punch-in was beyond the grace window.
    pub is_late: bool,
    /// Set when the day is an absence beyond the tolerated streak.
    pub excess_leave: bool,
}

impl DayClassification {
    fn absent(date: NaiveDate) -> Self {
        Self {
            date,
            status: DayStatus::Absent,
            worked_hours: Decimal::ZERO,
            overtime_hours: Decimal::ZERO,
            lateness_minutes: 0,
            is_late: false,
            excess_leave: false,
        }
    }
}

/// The result of classifying a working day.
#[derive(Debug, Clone)]
pub struct ClassificationResult {
    /// The classified day.
    pub day: DayClassification,
    /// The audit step recording the decision.
    pub audit_step: AuditStep,
}

/// Classifies a working day.
///
/// The rules are applied in order:
/// 1. No punch record, or no punch-in: absent
/// 2. Punch-in without punch-out: half day or absent depending on
///    [`PayrollPolicy::missing_punch_out`], with zero worked hours
/// 3. Worked hours below `duty_hours * half_day_threshold`: half day
/// 4. Punch-in more than `grace_minutes` after reporting time: late
/// 5. Otherwise present
///
/// A half day that was also late keeps its lateness minutes and `is_late`
/// flag for the record, but it is counted as a half day only.
///
/// # Errors
///
/// Returns `InvalidPunch` when punch-out is earlier than punch-in.
///
/// # Example
///
/// ```
/// use payroll_engine::calculation::{DayStatus, ResolvedSchedule, ScheduleSource, classify_day};
/// use payroll_engine::config::PayrollPolicy;
/// use payroll_engine::models::AttendancePunch;
/// use chrono::{NaiveDate, NaiveTime};
/// use rust_decimal::Decimal;
///
/// let date = NaiveDate::from_ymd_opt(2026, 3, 2).unwrap();
/// let schedule = ResolvedSchedule {
///     reporting_time: NaiveTime::from_hms_opt(9, 0, 0).unwrap(),
///     duty_hours: Decimal::new(8, 0),
///     source: ScheduleSource::Configured,
/// };
/// let punch = AttendancePunch::new(
///     "EMP001",
///     date,
///     NaiveTime::from_hms_opt(9, 20, 0),
///     NaiveTime::from_hms_opt(17, 30, 0),
/// )
/// .unwrap();
///
/// let result = classify_day(date, &schedule, Some(&punch), &PayrollPolicy::default(), 1).unwrap();
/// assert_eq!(result.day.status, DayStatus::Late);
/// assert_eq!(result.day.lateness_minutes, 20);
/// ```
pub fn classify_day(
    date: NaiveDate,
    schedule: &ResolvedSchedule,
    punch: Option<&AttendancePunch>,
    policy: &PayrollPolicy,
    step_number: u32,
) -> EngineResult<ClassificationResult> {
    if let Some(punch) = punch {
        punch.validate()?;
    }

    let half_day_hours = schedule.duty_hours * policy.half_day_threshold;
    let punch_in = punch.and_then(|p| p.punch_in);
    let punch_out = punch.and_then(|p| p.punch_out);

    let (day, reasoning) = match punch_in {
        None => (
            DayClassification::absent(date),
            "No punch-in recorded, day is absent".to_string(),
        ),
        Some(punch_in) => {
            let lateness_minutes = (punch_in - schedule.reporting_time).num_minutes().max(0) as u32;
            let is_late = lateness_minutes > policy.grace_minutes;

            match (punch, punch_out) {
                (Some(punch), Some(_)) => {
                    let worked_hours = punch.worked_hours().unwrap_or(Decimal::ZERO);
                    let overtime_hours = (worked_hours - schedule.duty_hours).max(Decimal::ZERO);

                    let (status, reasoning) = if worked_hours < half_day_hours {
                        (
                            DayStatus::HalfDay,
                            format!(
                                "Worked {}h, below half-day threshold of {}h",
                                worked_hours.round_dp(2).normalize(),
                                half_day_hours.normalize()
                            ),
                        )
                    } else if is_late {
                        (
                            DayStatus::Late,
                            format!(
                                "Punched in {} minutes after reporting time {} (grace {})",
                                lateness_minutes, schedule.reporting_time, policy.grace_minutes
                            ),
                        )
                    } else {
                        (
                            DayStatus::Present,
                            format!(
                                "Worked {}h, punched in within grace window",
                                worked_hours.round_dp(2).normalize()
                            ),
                        )
                    };

                    (
                        DayClassification {
                            date,
                            status,
                            worked_hours,
                            overtime_hours,
                            lateness_minutes,
                            is_late,
                            excess_leave: false,
                        },
                        reasoning,
                    )
                }
                _ => match policy.missing_punch_out {
                    MissingPunchOut::HalfDay => (
                        DayClassification {
                            date,
                            status: DayStatus::HalfDay,
                            worked_hours: Decimal::ZERO,
                            overtime_hours: Decimal::ZERO,
                            lateness_minutes,
                            is_late,
                            excess_leave: false,
                        },
                        "Punch-in without punch-out, credited as half day".to_string(),
                    ),
                    MissingPunchOut::Absent => (
                        DayClassification::absent(date),
                        "Punch-in without punch-out, treated as absent".to_string(),
                    ),
                },
            }
        }
    };

    let audit_step = AuditStep {
        step_number,
        rule_id: "day_classification".to_string(),
        rule_name: "Day Classification".to_string(),
        date: Some(date),
        input: serde_json::json!({
            "punch_in": punch_in.map(|t| t.to_string()),
            "punch_out": punch_out.map(|t| t.to_string()),
            "reporting_time": schedule.reporting_time.to_string(),
            "duty_hours": schedule.duty_hours.normalize().to_string(),
        }),
        output: serde_json::json!({
            "status": day.status,
            "worked_hours": day.worked_hours.round_dp(2).normalize().to_string(),
            "overtime_hours": day.overtime_hours.round_dp(2).normalize().to_string(),
            "lateness_minutes": day.lateness_minutes,
        }),
        reasoning,
    };

    Ok(ClassificationResult { day, audit_step })
}

/// Work recorded on a holiday or weekly off day.
#[derive(Debug, Clone)]
pub struct OffDayWork {
    /// Hours credited as overtime.
    pub overtime_hours: Decimal,
    /// The audit step recording the credit.
    pub audit_step: AuditStep,
}

/// Measures work punched on a day that is not a working day.
///
/// Such days never change day counts. When
/// [`PayrollPolicy::count_off_day_work_as_overtime`] is set, every worked hour
/// is overtime; otherwise nothing is credited. A punch without both times
/// contributes nothing.
///
/// # Errors
///
/// Returns `InvalidPunch` when punch-out is earlier than punch-in.
pub fn off_day_overtime(
    punch: &AttendancePunch,
    policy: &PayrollPolicy,
    step_number: u32,
) -> EngineResult<OffDayWork> {
    punch.validate()?;

    let worked_hours = punch.worked_hours().unwrap_or(Decimal::ZERO);
    let overtime_hours = if policy.count_off_day_work_as_overtime {
        worked_hours
    } else {
        Decimal::ZERO
    };

    let reasoning = if policy.count_off_day_work_as_overtime {
        format!(
            "Worked {}h on a non-working day, all credited as overtime",
            worked_hours.round_dp(2).normalize()
        )
    } else {
        "Work on non-working days is not credited".to_string()
    };

    let audit_step = AuditStep {
        step_number,
        rule_id: "off_day_work".to_string(),
        rule_name: "Non-Working Day Work".to_string(),
        date: Some(punch.date),
        input: serde_json::json!({
            "punch_in": punch.punch_in.map(|t| t.to_string()),
            "punch_out": punch.punch_out.map(|t| t.to_string()),
        }),
        output: serde_json::json!({
            "overtime_hours": overtime_hours.round_dp(2).normalize().to_string(),
        }),
        reasoning,
    };

    Ok(OffDayWork {
        overtime_hours,
        audit_step,
    })
}
