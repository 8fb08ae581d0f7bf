//! Attendance penalty rules.
//!
//! Two optional month-level rules run after every day has been classified
//! and the leave overlay applied. Both are disabled unless the policy sets
//! an allowance:
//!
//! - late days beyond `late_days_allowed` are downgraded to half days
//! - absences beyond `absence_streak_allowance` within a run of consecutive
//!   absent working days are marked as excess leave

use chrono::NaiveDate;

use crate::models::AuditStep;

use super::classifier::{DayClassification, DayStatus};

/// The result of applying a penalty rule to a month of days.
#[derive(Debug, Clone, Default)]
pub struct PenaltyResult {
    /// Dates the rule changed.
    pub affected: Vec<NaiveDate>,
    /// Present only when the rule is enabled.
    pub audit_step: Option<AuditStep>,
}

/// Downgrades late days beyond the allowance to half days.
///
/// Days must be in ascending date order; the first `allowed` late days are
/// kept and every later one becomes a half day with its late flag intact.
///
/// # Example
///
/// ```
/// use payroll_engine::calculation::{DayClassification, DayStatus, apply_late_allowance};
/// use chrono::NaiveDate;
/// use rust_decimal::Decimal;
///
/// let mut days: Vec<DayClassification> = (2..=6)
///     .map(|d| DayClassification {
///         date: NaiveDate::from_ymd_opt(2026, 3, d).unwrap(),
///         status: DayStatus::Late,
///         worked_hours: Decimal::new(8, 0),
///         overtime_hours: Decimal::ZERO,
///         lateness_minutes: 10,
///         is_late: true,
///         excess_leave: false,
///     })
///     .collect();
///
/// let result = apply_late_allowance(&mut days, Some(3), 1);
/// assert_eq!(result.affected.len(), 2);
/// assert_eq!(days[4].status, DayStatus::HalfDay);
/// ```
pub fn apply_late_allowance(
    days: &mut [DayClassification],
    allowed: Option<u32>,
    step_number: u32,
) -> PenaltyResult {
    let Some(allowed) = allowed else {
        return PenaltyResult::default();
    };

    let mut late_seen = 0u32;
    let mut affected = Vec::new();

    for day in days.iter_mut().filter(|d| d.status == DayStatus::Late) {
        late_seen += 1;
        if late_seen > allowed {
            day.status = DayStatus::HalfDay;
            affected.push(day.date);
        }
    }

    let audit_step = AuditStep {
        step_number,
        rule_id: "late_allowance".to_string(),
        rule_name: "Late Day Allowance".to_string(),
        date: None,
        input: serde_json::json!({
            "late_days": late_seen,
            "late_days_allowed": allowed,
        }),
        output: serde_json::json!({
            "converted_to_half_day": affected.iter().map(|d| d.to_string()).collect::<Vec<_>>(),
        }),
        reasoning: if affected.is_empty() {
            format!("{} late days within allowance of {}", late_seen, allowed)
        } else {
            format!(
                "{} late days exceed allowance of {}, {} converted to half days",
                late_seen,
                allowed,
                affected.len()
            )
        },
    };

    PenaltyResult {
        affected,
        audit_step: Some(audit_step),
    }
}

/// Marks absences beyond the streak allowance as excess leave.
///
/// Days must be in ascending date order and contain only working days, so
/// that neighbouring entries are consecutive working days. Any non-absent
/// day, approved leave included, ends a streak.
pub fn mark_excess_absences(
    days: &mut [DayClassification],
    allowance: Option<u32>,
    step_number: u32,
) -> PenaltyResult {
    let Some(allowance) = allowance else {
        return PenaltyResult::default();
    };

    let mut streak = 0u32;
    let mut longest = 0u32;
    let mut affected = Vec::new();

    for day in days.iter_mut() {
        if day.status == DayStatus::Absent {
            streak += 1;
            longest = longest.max(streak);
            if streak > allowance {
                day.excess_leave = true;
                affected.push(day.date);
            }
        } else {
            streak = 0;
        }
    }

    let audit_step = AuditStep {
        step_number,
        rule_id: "absence_streak".to_string(),
        rule_name: "Consecutive Absence Allowance".to_string(),
        date: None,
        input: serde_json::json!({
            "absence_streak_allowance": allowance,
            "longest_streak": longest,
        }),
        output: serde_json::json!({
            "excess_leaves": affected.iter().map(|d| d.to_string()).collect::<Vec<_>>(),
        }),
        reasoning: format!(
            "Longest absence streak {} against allowance {}, {} excess leave days",
            longest,
            allowance,
            affected.len()
        ),
    };

    PenaltyResult {
        affected,
        audit_step: Some(audit_step),
    }
}
