//! Request and report types for the generation orchestrator.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::error::{EngineError, EngineResult};
use crate::models::{AuditWarning, PayrollMonth, PayrollRecord};
use crate::store::EmployeeScope;

/// The months a generation run covers.
///
/// Deserializes from either `{"year": 2026, "month": 3}` or
/// `{"from": "2026-01-15", "to": "2026-03-10"}`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum GenerationPeriod {
    /// A single calendar month.
    Month {
        /// The calendar year.
        year: i32,
        /// The calendar month.
        month: u32,
    },
    /// Every month touched by an inclusive date range.
    Range {
        /// First date of the range.
        from: NaiveDate,
        /// Last date of the range.
        to: NaiveDate,
    },
}

impl GenerationPeriod {
    /// Expands the period into validated months, ascending.
    ///
    /// # Example
    ///
    /// ```
    /// use payroll_engine::engine::GenerationPeriod;
    /// use chrono::NaiveDate;
    ///
    /// let period = GenerationPeriod::Range {
    ///     from: NaiveDate::from_ymd_opt(2026, 1, 15).unwrap(),
    ///     to: NaiveDate::from_ymd_opt(2026, 3, 10).unwrap(),
    /// };
    /// assert_eq!(period.months().unwrap().len(), 3);
    /// ```
    pub fn months(&self) -> EngineResult<Vec<PayrollMonth>> {
        match *self {
            GenerationPeriod::Month { year, month } => Ok(vec![PayrollMonth::new(year, month)?]),
            GenerationPeriod::Range { from, to } => PayrollMonth::months_between(from, to),
        }
    }
}

impl From<PayrollMonth> for GenerationPeriod {
    fn from(month: PayrollMonth) -> Self {
        GenerationPeriod::Month {
            year: month.year(),
            month: month.month(),
        }
    }
}

/// A request to generate payroll.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GenerationRequest {
    /// The months to generate.
    pub period: GenerationPeriod,
    /// The employees to generate for; everyone when omitted.
    #[serde(default = "default_scope")]
    pub scope: EmployeeScope,
}

fn default_scope() -> EmployeeScope {
    EmployeeScope::All
}

impl GenerationRequest {
    /// Generates one month for everyone.
    pub fn for_month(month: PayrollMonth) -> Self {
        Self {
            period: month.into(),
            scope: EmployeeScope::All,
        }
    }

    /// Narrows the request to a scope.
    pub fn with_scope(mut self, scope: EmployeeScope) -> Self {
        self.scope = scope;
        self
    }
}

/// How one employee-month ended.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum OutcomeStatus {
    /// A record was computed and persisted.
    Succeeded,
    /// The employee-month failed; see the error.
    Failed,
    /// Not eligible: inactive, or not yet joined by the end of the month.
    Skipped,
    /// Not started because the run was cancelled.
    Cancelled,
}

/// The error attached to a failed outcome.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OutcomeError {
    /// Stable error code, see [`EngineError::code`].
    pub code: String,
    /// Human-readable description.
    pub message: String,
}

impl From<&EngineError> for OutcomeError {
    fn from(error: &EngineError) -> Self {
        Self {
            code: error.code().to_string(),
            message: error.to_string(),
        }
    }
}

/// The outcome of one employee-month within a run.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EmployeeOutcome {
    /// The employee.
    pub employee_id: String,
    /// The month.
    pub period: PayrollMonth,
    /// How it ended.
    pub status: OutcomeStatus,
    /// The persisted record, on success.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub record: Option<PayrollRecord>,
    /// The failure, if any.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<OutcomeError>,
    /// Explanation for skipped outcomes.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub reason: Option<String>,
    /// Warnings raised while computing.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub warnings: Vec<AuditWarning>,
}

impl EmployeeOutcome {
    pub(crate) fn succeeded(record: PayrollRecord, warnings: Vec<AuditWarning>) -> Self {
        Self {
            employee_id: record.employee_id.clone(),
            period: record.period,
            status: OutcomeStatus::Succeeded,
            record: Some(record),
            error: None,
            reason: None,
            warnings,
        }
    }

    pub(crate) fn failed(employee_id: impl Into<String>, period: PayrollMonth, error: &EngineError) -> Self {
        Self {
            employee_id: employee_id.into(),
            period,
            status: OutcomeStatus::Failed,
            record: None,
            error: Some(error.into()),
            reason: None,
            warnings: Vec::new(),
        }
    }

    pub(crate) fn skipped(employee_id: impl Into<String>, period: PayrollMonth, reason: impl Into<String>) -> Self {
        Self {
            employee_id: employee_id.into(),
            period,
            status: OutcomeStatus::Skipped,
            record: None,
            error: None,
            reason: Some(reason.into()),
            warnings: Vec::new(),
        }
    }

    pub(crate) fn cancelled(employee_id: impl Into<String>, period: PayrollMonth) -> Self {
        Self {
            employee_id: employee_id.into(),
            period,
            status: OutcomeStatus::Cancelled,
            record: None,
            error: None,
            reason: None,
            warnings: Vec::new(),
        }
    }

    /// Returns true if this outcome failed because the record is paid.
    pub fn is_already_paid(&self) -> bool {
        self.error
            .as_ref()
            .is_some_and(|e| e.code == "IMMUTABLE_RECORD_CONFLICT")
    }
}

/// The result of a generation run.
///
/// `already_paid` counts the failures caused by paid records; they are also
/// included in `failed`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GenerationReport {
    /// Identifier of the run, also present in the logs.
    pub run_id: Uuid,
    /// Per employee-month outcomes sorted by (year, month, employee_id).
    pub outcomes: Vec<EmployeeOutcome>,
    /// Number of persisted records.
    pub succeeded: usize,
    /// Number of failed employee-months.
    pub failed: usize,
    /// Number of ineligible employee-months.
    pub skipped: usize,
    /// Number of failures caused by paid records.
    pub already_paid: usize,
    /// Number of employee-months not started due to cancellation.
    pub cancelled: usize,
}

impl GenerationReport {
    pub(crate) fn from_outcomes(run_id: Uuid, mut outcomes: Vec<EmployeeOutcome>) -> Self {
        outcomes.sort_by(|a, b| {
            a.period
                .cmp(&b.period)
                .then_with(|| a.employee_id.cmp(&b.employee_id))
        });

        let count = |status: OutcomeStatus| outcomes.iter().filter(|o| o.status == status).count();
        let succeeded = count(OutcomeStatus::Succeeded);
        let failed = count(OutcomeStatus::Failed);
        let skipped = count(OutcomeStatus::Skipped);
        let cancelled = count(OutcomeStatus::Cancelled);
        let already_paid = outcomes.iter().filter(|o| o.is_already_paid()).count();

        Self {
            run_id,
            outcomes,
            succeeded,
            failed,
            skipped,
            already_paid,
            cancelled,
        }
    }

    /// Finds the outcome for an employee-month.
    pub fn outcome(&self, employee_id: &str, period: PayrollMonth) -> Option<&EmployeeOutcome> {
        self.outcomes
            .iter()
            .find(|o| o.employee_id == employee_id && o.period == period)
    }
}

/// Working days of an employee's month that have no punch record.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PendingAttendance {
    /// The employee.
    pub employee_id: String,
    /// The month.
    pub period: PayrollMonth,
    /// Working days within the employee's window.
    pub working_days: u32,
    /// Working days with a punch record.
    pub recorded_days: u32,
    /// Working days covered by approved leave.
    pub leave_days: u32,
    /// Working days with neither a punch record nor leave, ascending.
    pub pending_dates: Vec<NaiveDate>,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn march() -> PayrollMonth {
        PayrollMonth::new(2026, 3).unwrap()
    }

    #[test]
    fn test_deserialize_month_request() {
        let json = r#"{"period": {"year": 2026, "month": 3}}"#;
        let request: GenerationRequest = serde_json::from_str(json).unwrap();
        assert_eq!(request.period.months().unwrap(), vec![march()]);
        assert_eq!(request.scope, EmployeeScope::All);
    }

    #[test]
    fn test_deserialize_range_request_with_scope() {
        let json = r#"{
            "period": {"from": "2026-02-20", "to": "2026-03-05"},
            "scope": {"type": "employees", "value": ["EMP001"]}
        }"#;
        let request: GenerationRequest = serde_json::from_str(json).unwrap();
        assert_eq!(request.period.months().unwrap().len(), 2);
        assert_eq!(
            request.scope,
            EmployeeScope::Employees(vec!["EMP001".to_string()])
        );
    }

    #[test]
    fn test_invalid_month_is_rejected() {
        let period = GenerationPeriod::Month { year: 2026, month: 13 };
        assert!(matches!(period.months(), Err(EngineError::InvalidPeriod { .. })));
    }

    #[test]
    fn test_report_sorts_and_counts() {
        let april = PayrollMonth::new(2026, 4).unwrap();
        let paid = EngineError::ImmutableRecordConflict {
            employee_id: "EMP003".to_string(),
            year: 2026,
            month: 3,
        };
        let outcomes = vec![
            EmployeeOutcome::skipped("EMP001", april, "inactive"),
            EmployeeOutcome::failed("EMP003", march(), &paid),
            EmployeeOutcome::cancelled("EMP002", march()),
        ];

        let report = GenerationReport::from_outcomes(Uuid::nil(), outcomes);
        let order: Vec<_> = report
            .outcomes
            .iter()
            .map(|o| (o.period.month(), o.employee_id.as_str()))
            .collect();
        assert_eq!(order, vec![(3, "EMP002"), (3, "EMP003"), (4, "EMP001")]);
        assert_eq!(report.failed, 1);
        assert_eq!(report.already_paid, 1);
        assert_eq!(report.skipped, 1);
        assert_eq!(report.cancelled, 1);
        assert_eq!(report.succeeded, 0);
    }
}
