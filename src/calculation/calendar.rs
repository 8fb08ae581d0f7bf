//! Working-day calendar construction.
//!
//! This module enumerates the working days of a month for an office: every
//! calendar day minus the policy's weekly off days minus holidays that apply
//! to the office. The per-employee view further restricts the days to the
//! employee's employment window.

use std::collections::BTreeMap;

use chrono::{Datelike, NaiveDate};
use serde::{Deserialize, Serialize};

use crate::config::PayrollPolicy;
use crate::models::{AuditStep, Holiday, PayrollMonth};

/// Why a calendar day is not a working day.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum NonWorkingReason {
    /// The weekday is configured as a weekly off day.
    WeeklyOff,
    /// A holiday falls on the date.
    Holiday,
}

/// The working-day calendar of one month for one office.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MonthCalendar {
    month: PayrollMonth,
    office_id: Option<String>,
    working_days: Vec<NaiveDate>,
    non_working: BTreeMap<NaiveDate, NonWorkingReason>,
    holiday_count: u32,
}

impl MonthCalendar {
    /// The month this calendar covers.
    pub fn month(&self) -> PayrollMonth {
        self.month
    }

    /// The office whose holidays were applied, if any.
    pub fn office_id(&self) -> Option<&str> {
        self.office_id.as_deref()
    }

    /// Working days in ascending order.
    pub fn working_days(&self) -> &[NaiveDate] {
        &self.working_days
    }

    /// Number of working days in the whole month.
    pub fn working_day_count(&self) -> u32 {
        self.working_days.len() as u32
    }

    /// Returns true if `date` is a working day of this calendar.
    pub fn is_working_day(&self, date: NaiveDate) -> bool {
        self.working_days.binary_search(&date).is_ok()
    }

    /// Returns why `date` is not a working day, or `None` for working days
    /// and dates outside the month.
    pub fn non_working_reason(&self, date: NaiveDate) -> Option<NonWorkingReason> {
        self.non_working.get(&date).copied()
    }

    /// Working days on or after `start`.
    pub fn working_days_from(&self, start: NaiveDate) -> &[NaiveDate] {
        let index = self.working_days.partition_point(|d| *d < start);
        &self.working_days[index..]
    }

    /// Summarizes the calendar.
    pub fn summary(&self) -> WorkingDaysSummary {
        let weekly_off_days = self
            .non_working
            .values()
            .filter(|reason| **reason == NonWorkingReason::WeeklyOff)
            .count() as u32;

        WorkingDaysSummary {
            year: self.month.year(),
            month: self.month.month(),
            office_id: self.office_id.clone(),
            total_days: self.month.days_in_month(),
            weekly_off_days,
            holidays: self.holiday_count,
            working_days: self.working_day_count(),
            days: self.working_days.clone(),
        }
    }
}

/// Counts describing a month's working-day calendar.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct WorkingDaysSummary {
    /// The calendar year.
    pub year: i32,
    /// The calendar month.
    pub month: u32,
    /// The office whose holidays were applied.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub office_id: Option<String>,
    /// Calendar days in the month.
    pub total_days: u32,
    /// Days removed as weekly off days.
    pub weekly_off_days: u32,
    /// Holidays falling inside the month for the office.
    pub holidays: u32,
    /// Remaining working days.
    pub working_days: u32,
    /// The working dates in ascending order.
    pub days: Vec<NaiveDate>,
}

/// Builds the working-day calendar of `month` for `office_id`.
///
/// With `office_id` set to `None` only company-wide holidays are applied.
/// Holidays outside the month are ignored. A holiday that falls on a weekly
/// off day still counts towards the holiday total but removes nothing extra.
///
/// # Example
///
/// ```
/// use payroll_engine::calculation::build_month_calendar;
/// use payroll_engine::config::PayrollPolicy;
/// use payroll_engine::models::PayrollMonth;
///
/// // March 2026 has 31 days, 5 of them Sundays.
/// let month = PayrollMonth::new(2026, 3).unwrap();
/// let calendar = build_month_calendar(month, Some("DXB"), &[], &PayrollPolicy::default());
/// assert_eq!(calendar.working_day_count(), 26);
/// ```
pub fn build_month_calendar(
    month: PayrollMonth,
    office_id: Option<&str>,
    holidays: &[Holiday],
    policy: &PayrollPolicy,
) -> MonthCalendar {
    let holiday_dates: BTreeMap<NaiveDate, &Holiday> = holidays
        .iter()
        .filter(|h| month.contains(h.date))
        .filter(|h| match office_id {
            Some(office) => h.applies_to(office),
            None => h.office_id.is_none(),
        })
        .map(|h| (h.date, h))
        .collect();

    let mut working_days = Vec::new();
    let mut non_working = BTreeMap::new();

    for date in month.dates() {
        if policy.is_weekly_off(date.weekday()) {
            non_working.insert(date, NonWorkingReason::WeeklyOff);
        } else if holiday_dates.contains_key(&date) {
            non_working.insert(date, NonWorkingReason::Holiday);
        } else {
            working_days.push(date);
        }
    }

    MonthCalendar {
        month,
        office_id: office_id.map(str::to_string),
        working_days,
        non_working,
        holiday_count: holiday_dates.len() as u32,
    }
}

/// The working days of one employee within a month.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EmployeeWorkingDays {
    /// Candidate working days on or after the employment start, ascending.
    pub days: Vec<NaiveDate>,
    /// Working days of the whole month, used as the per-day-rate basis.
    pub month_working_days: u32,
    /// The audit step recording the restriction.
    pub audit_step: AuditStep,
}

/// Restricts a month calendar to the employee's employment window.
///
/// Days before `employment_start` are excluded entirely; they are neither
/// working days nor absences.
pub fn employee_working_days(
    calendar: &MonthCalendar,
    employment_start: NaiveDate,
    step_number: u32,
) -> EmployeeWorkingDays {
    let days = calendar.working_days_from(employment_start).to_vec();
    let month_working_days = calendar.working_day_count();
    let excluded = month_working_days - days.len() as u32;

    let reasoning = if month_working_days == 0 {
        format!("{} has no working days", calendar.month())
    } else if excluded > 0 {
        format!(
            "Employment starts {}, excluding {} of {} working days",
            employment_start, excluded, month_working_days
        )
    } else {
        format!(
            "Employed for the whole month, all {} working days apply",
            month_working_days
        )
    };

    let audit_step = AuditStep {
        step_number,
        rule_id: "working_calendar".to_string(),
        rule_name: "Working Calendar".to_string(),
        date: None,
        input: serde_json::json!({
            "month": calendar.month().to_string(),
            "office_id": calendar.office_id(),
            "employment_start": employment_start.to_string(),
        }),
        output: serde_json::json!({
            "month_working_days": month_working_days,
            "employee_working_days": days.len(),
        }),
        reasoning,
    };

    EmployeeWorkingDays {
        days,
        month_working_days,
        audit_step,
    }
}
