//! Schedule resolution functionality.
//!
//! Each (office, position) pair may carry a configured reporting time and
//! duty length. Pairs without a valid row fall back to the policy defaults,
//! and the fallback is surfaced as a warning rather than an error.

use std::collections::HashMap;

use chrono::NaiveTime;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use tracing::warn;

use crate::config::PayrollPolicy;
use crate::models::{AuditStep, AuditWarning, OfficePositionSchedule, WarningSeverity};

/// Warning code emitted when an employee's schedule was defaulted.
pub const SCHEDULE_MISSING_WARNING: &str = "SCHEDULE_MISSING";

/// Where a resolved schedule came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ScheduleSource {
    /// A configured office/position row.
    Configured,
    /// The policy defaults.
    Default,
}

/// The reporting time and duty length that apply to an employee.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ResolvedSchedule {
    /// Expected punch-in time.
    pub reporting_time: NaiveTime,
    /// Expected working hours per day.
    pub duty_hours: Decimal,
    /// Whether the schedule was configured or defaulted.
    pub source: ScheduleSource,
}

/// Lookup table of configured schedules keyed by (office, position).
#[derive(Debug, Clone, Default)]
pub struct ScheduleTable {
    rows: HashMap<(String, String), OfficePositionSchedule>,
}

impl ScheduleTable {
    /// Builds a table from stored rows.
    ///
    /// Rows that fail validation are dropped with a log line so the affected
    /// employees fall back to the defaults. When a pair appears twice the
    /// first valid row wins.
    pub fn from_rows(rows: impl IntoIterator<Item = OfficePositionSchedule>) -> Self {
        let mut table = HashMap::new();

        for row in rows {
            if let Err(e) = row.validate() {
                warn!(
                    office_id = %row.office_id,
                    position_id = %row.position_id,
                    error = %e,
                    "Ignoring invalid schedule row"
                );
                continue;
            }
            let key = (row.office_id.clone(), row.position_id.clone());
            if table.contains_key(&key) {
                warn!(
                    office_id = %row.office_id,
                    position_id = %row.position_id,
                    "Ignoring duplicate schedule row"
                );
                continue;
            }
            table.insert(key, row);
        }

        Self { rows: table }
    }

    /// Returns the configured row for a pair.
    pub fn get(&self, office_id: &str, position_id: &str) -> Option<&OfficePositionSchedule> {
        self.rows
            .get(&(office_id.to_string(), position_id.to_string()))
    }

    /// Number of usable rows.
    pub fn len(&self) -> usize {
        self.rows.len()
    }

    /// Returns true if no rows are configured.
    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }
}

/// The result of resolving an employee's schedule.
#[derive(Debug, Clone)]
pub struct ScheduleResolution {
    /// The schedule to classify days against.
    pub schedule: ResolvedSchedule,
    /// The audit step recording the lookup.
    pub audit_step: AuditStep,
    /// Set when the defaults were used.
    pub warning: Option<AuditWarning>,
}

/// Resolves the schedule for an office/position pair.
///
/// # Example
///
/// ```
/// use payroll_engine::calculation::{ScheduleSource, ScheduleTable, resolve_schedule};
/// use payroll_engine::config::PayrollPolicy;
///
/// let table = ScheduleTable::default();
/// let resolution = resolve_schedule(&table, "DXB", "ENG", &PayrollPolicy::default(), 1);
/// assert_eq!(resolution.schedule.source, ScheduleSource::Default);
/// assert!(resolution.warning.is_some());
/// ```
pub fn resolve_schedule(
    table: &ScheduleTable,
    office_id: &str,
    position_id: &str,
    policy: &PayrollPolicy,
    step_number: u32,
) -> ScheduleResolution {
    let (schedule, warning, reasoning) = match table.get(office_id, position_id) {
        Some(row) => (
            ResolvedSchedule {
                reporting_time: row.reporting_time,
                duty_hours: row.duty_hours,
                source: ScheduleSource::Configured,
            },
            None,
            format!(
                "Configured schedule for {}/{}: report at {}, {} duty hours",
                office_id,
                position_id,
                row.reporting_time,
                row.duty_hours.normalize()
            ),
        ),
        None => {
            let message = format!(
                "No schedule configured for office '{}' and position '{}', using {} and {} duty hours",
                office_id,
                position_id,
                policy.default_reporting_time,
                policy.default_duty_hours.normalize()
            );
            (
                ResolvedSchedule {
                    reporting_time: policy.default_reporting_time,
                    duty_hours: policy.default_duty_hours,
                    source: ScheduleSource::Default,
                },
                Some(AuditWarning::new(
                    SCHEDULE_MISSING_WARNING,
                    message.clone(),
                    WarningSeverity::Medium,
                )),
                message,
            )
        }
    };

    let audit_step = AuditStep {
        step_number,
        rule_id: "schedule_resolution".to_string(),
        rule_name: "Schedule Resolution".to_string(),
        date: None,
        input: serde_json::json!({
            "office_id": office_id,
            "position_id": position_id,
        }),
        output: serde_json::json!({
            "reporting_time": schedule.reporting_time.to_string(),
            "duty_hours": schedule.duty_hours.normalize().to_string(),
            "source": schedule.source,
        }),
        reasoning,
    };

    ScheduleResolution {
        schedule,
        audit_step,
        warning,
    }
}
