//! Employee-month payroll computation.
//!
//! Runs the full pipeline for one employee and one month on data already
//! fetched from the store: schedule resolution, working calendar, day
//! classification, leave overlay, penalties and aggregation. The function is
//! pure; identical inputs always produce an identical record.

use std::collections::BTreeMap;
use std::time::Instant;

use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use tracing::warn;

use crate::config::PayrollPolicy;
use crate::error::{EngineError, EngineResult};
use crate::models::{
    ApprovedLeave, AttendancePunch, AuditTrace, AuditWarning, Employee, PayrollAnomaly,
    PayrollRecord, WarningSeverity,
};

use super::aggregator::{AggregationInput, aggregate_payroll};
use super::calendar::{MonthCalendar, employee_working_days};
use super::classifier::{DayClassification, classify_day, off_day_overtime};
use super::leave_overlay::apply_leave_overlay;
use super::penalties::{apply_late_allowance, mark_excess_absences};
use super::schedule::{ScheduleSource, ScheduleTable, resolve_schedule};

/// Warning code for punches dated before the employee joined.
pub const PUNCH_BEFORE_JOINING_WARNING: &str = "PUNCH_BEFORE_JOINING";

/// Warning code for an inconsistent punch on an approved-leave day.
pub const INVALID_PUNCH_ON_LEAVE_WARNING: &str = "INVALID_PUNCH_ON_LEAVE";

/// Everything needed to compute one employee's month.
#[derive(Debug, Clone, Copy)]
pub struct EmployeeMonthInput<'a> {
    /// The employee.
    pub employee: &'a Employee,
    /// The working calendar of the employee's office for the month.
    pub calendar: &'a MonthCalendar,
    /// Configured schedules.
    pub schedules: &'a ScheduleTable,
    /// The employee's punches within the month, in any order.
    pub punches: &'a [AttendancePunch],
    /// The employee's approved leaves within the month.
    pub leaves: &'a [ApprovedLeave],
    /// The payroll policy.
    pub policy: &'a PayrollPolicy,
}

/// A computed payroll record plus the trace explaining it.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PayrollComputation {
    /// The record to persist.
    pub record: PayrollRecord,
    /// Every step and warning of the computation.
    pub trace: AuditTrace,
    /// The per-day classifications, ascending.
    pub days: Vec<DayClassification>,
}

/// Computes the payroll record for one employee and month.
///
/// # Errors
///
/// - `InputData` if the employee is invalid, has not joined by the end of
///   the month, or a punch or leave belongs to another employee
/// - `InvalidPunch` if two punches share a date or a punch-out precedes
///   its punch-in
pub fn compute_employee_month(input: EmployeeMonthInput<'_>) -> EngineResult<PayrollComputation> {
    let start_time = Instant::now();
    let EmployeeMonthInput {
        employee,
        calendar,
        schedules,
        punches,
        leaves,
        policy,
    } = input;
    let period = calendar.month();

    employee.validate()?;
    let employment_start =
        employee
            .employment_start_in(period)
            .ok_or_else(|| EngineError::InputData {
                field: "joining_date".to_string(),
                message: format!(
                    "employee '{}' joins {} after {}",
                    employee.employee_id, employee.joining_date, period
                ),
            })?;

    let punches_by_date = index_punches(employee, punches)?;
    let leaves_by_date = index_leaves(employee, leaves)?;

    let mut trace = AuditTrace::default();
    let mut anomalies = Vec::new();

    let resolution = resolve_schedule(
        schedules,
        &employee.office_id,
        &employee.position_id,
        policy,
        trace.next_step_number(),
    );
    trace.push_step(resolution.audit_step);
    if let Some(warning) = resolution.warning {
        warn!(
            employee_id = %employee.employee_id,
            office_id = %employee.office_id,
            position_id = %employee.position_id,
            "Schedule missing, using defaults"
        );
        trace.warn(warning);
    }
    if resolution.schedule.source == ScheduleSource::Default {
        anomalies.push(PayrollAnomaly::ScheduleDefaulted);
    }
    let schedule = resolution.schedule;

    let window = employee_working_days(calendar, employment_start, trace.next_step_number());
    trace.push_step(window.audit_step);

    let mut days = Vec::with_capacity(window.days.len());
    let mut off_day_hours = Decimal::ZERO;

    for date in period.dates() {
        let punch = punches_by_date.get(&date).copied();

        if date < employment_start {
            if punch.is_some() {
                trace.warn(AuditWarning::new(
                    PUNCH_BEFORE_JOINING_WARNING,
                    format!("Ignoring punch on {} before employment start {}", date, employment_start),
                    WarningSeverity::Low,
                ));
            }
            continue;
        }

        if calendar.is_working_day(date) {
            let leave = leaves_by_date.get(&date).copied();
            // Approved leave overrides the day, so a broken punch under it is ignored.
            let punch = match (punch, leave) {
                (Some(p), Some(_)) if p.validate().is_err() => {
                    trace.warn(AuditWarning::new(
                        INVALID_PUNCH_ON_LEAVE_WARNING,
                        format!("Ignoring inconsistent punch on {} covered by approved leave", date),
                        WarningSeverity::Low,
                    ));
                    None
                }
                _ => punch,
            };
            let classified = classify_day(date, &schedule, punch, policy, trace.next_step_number())?;
            trace.push_step(classified.audit_step);

            let overlay = apply_leave_overlay(classified.day, leave, trace.next_step_number());
            if let Some(step) = overlay.audit_step {
                trace.push_step(step);
            }
            days.push(overlay.day);
        } else if let Some(punch) = punch {
            let work = off_day_overtime(punch, policy, trace.next_step_number())?;
            off_day_hours += work.overtime_hours;
            trace.push_step(work.audit_step);
        }
    }

    let late = apply_late_allowance(&mut days, policy.late_days_allowed, trace.next_step_number());
    if let Some(step) = late.audit_step {
        trace.push_step(step);
    }

    let excess = mark_excess_absences(
        &mut days,
        policy.absence_streak_allowance,
        trace.next_step_number(),
    );
    if let Some(step) = excess.audit_step {
        trace.push_step(step);
    }

    let aggregation = aggregate_payroll(
        &AggregationInput {
            employee,
            period,
            employment_start,
            days: &days,
            off_day_overtime: off_day_hours,
            month_working_days: window.month_working_days,
        },
        policy,
        trace.next_step_number(),
    );
    trace.push_step(aggregation.audit_step);
    for warning in aggregation.warnings {
        trace.warn(warning);
    }

    let mut record = aggregation.record;
    anomalies.extend(record.anomalies.drain(..));
    anomalies.sort();
    anomalies.dedup();
    record.anomalies = anomalies;

    trace.duration_us = start_time.elapsed().as_micros() as u64;

    Ok(PayrollComputation {
        record,
        trace,
        days,
    })
}

fn index_punches<'a>(
    employee: &Employee,
    punches: &'a [AttendancePunch],
) -> EngineResult<BTreeMap<NaiveDate, &'a AttendancePunch>> {
    let mut by_date = BTreeMap::new();

    for punch in punches {
        if punch.employee_id != employee.employee_id {
            return Err(EngineError::InputData {
                field: "punches".to_string(),
                message: format!(
                    "punch for '{}' passed while computing '{}'",
                    punch.employee_id, employee.employee_id
                ),
            });
        }
        if by_date.insert(punch.date, punch).is_some() {
            return Err(EngineError::InvalidPunch {
                employee_id: employee.employee_id.clone(),
                date: punch.date,
                message: "more than one punch record for the date".to_string(),
            });
        }
    }

    Ok(by_date)
}

fn index_leaves<'a>(
    employee: &Employee,
    leaves: &'a [ApprovedLeave],
) -> EngineResult<BTreeMap<NaiveDate, &'a ApprovedLeave>> {
    let mut by_date = BTreeMap::new();

    for leave in leaves {
        if leave.employee_id != employee.employee_id {
            return Err(EngineError::InputData {
                field: "leaves".to_string(),
                message: format!(
                    "leave for '{}' passed while computing '{}'",
                    leave.employee_id, employee.employee_id
                ),
            });
        }
        by_date.entry(leave.date).or_insert(leave);
    }

    Ok(by_date)
}
