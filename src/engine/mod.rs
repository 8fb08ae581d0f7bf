//! The payroll generation engine.
//!
//! [`PayrollEngine`] ties the calculation modules to a [`PayrollStore`]. It
//! is constructed explicitly from a store and a [`PayrollConfig`] and holds
//! no other state, so any number of engines can share one store.
//!
//! # Example
//!
//! ```
//! use std::sync::Arc;
//!
//! use payroll_engine::config::PayrollConfig;
//! use payroll_engine::engine::{GenerationRequest, PayrollEngine};
//! use payroll_engine::models::PayrollMonth;
//! use payroll_engine::store::InMemoryStore;
//!
//! let rt = tokio::runtime::Runtime::new().unwrap();
//! rt.block_on(async {
//!     let engine = PayrollEngine::new(Arc::new(InMemoryStore::new()), PayrollConfig::default());
//!     let month = PayrollMonth::new(2026, 3).unwrap();
//!     let report = engine.generate(GenerationRequest::for_month(month)).await.unwrap();
//!     assert_eq!(report.succeeded, 0);
//! });
//! ```

mod generation;
mod types;

use std::collections::BTreeSet;
use std::sync::Arc;

use tokio_util::sync::CancellationToken;
use tracing::info;

use crate::calculation::{WorkingDaysSummary, build_month_calendar};
use crate::config::PayrollConfig;
use crate::error::{EngineError, EngineResult};
use crate::ingest::{ImportReport, RawPunchRow, RowError, parse_rows};
use crate::models::{PayrollMonth, PayrollRecord, PayrollStatus};
use crate::store::PayrollStore;

pub use types::{
    EmployeeOutcome, GenerationPeriod, GenerationReport, GenerationRequest, OutcomeError,
    OutcomeStatus, PendingAttendance,
};

/// Generates and serves payroll records from a [`PayrollStore`].
pub struct PayrollEngine<S> {
    store: Arc<S>,
    config: Arc<PayrollConfig>,
}

impl<S> Clone for PayrollEngine<S> {
    fn clone(&self) -> Self {
        Self {
            store: Arc::clone(&self.store),
            config: Arc::clone(&self.config),
        }
    }
}

impl<S> PayrollEngine<S>
where
    S: PayrollStore + 'static,
{
    /// Creates an engine over `store` using `config`.
    pub fn new(store: Arc<S>, config: PayrollConfig) -> Self {
        Self {
            store,
            config: Arc::new(config),
        }
    }

    /// The underlying store.
    pub fn store(&self) -> &Arc<S> {
        &self.store
    }

    /// The engine configuration.
    pub fn config(&self) -> &PayrollConfig {
        &self.config
    }

    /// Generates payroll for every employee-month the request covers.
    ///
    /// Per-employee failures are reported in the returned
    /// [`GenerationReport`], including a month whose holiday calendar cannot
    /// be read. The call itself fails only when the period is invalid or the
    /// employee directory or schedules cannot be read.
    pub async fn generate(&self, request: GenerationRequest) -> EngineResult<GenerationReport> {
        self.generate_with_cancellation(request, CancellationToken::new())
            .await
    }

    /// Like [`PayrollEngine::generate`], stopping early once `cancel` fires.
    ///
    /// No employee-month starts after cancellation; those already running
    /// finish their write. Units that never started are reported as
    /// cancelled.
    pub async fn generate_with_cancellation(
        &self,
        request: GenerationRequest,
        cancel: CancellationToken,
    ) -> EngineResult<GenerationReport> {
        generation::run_generation(
            Arc::clone(&self.store),
            Arc::clone(&self.config),
            request,
            cancel,
        )
        .await
    }

    /// Fetches a stored payroll record.
    pub async fn get_payroll_record(
        &self,
        employee_id: &str,
        period: PayrollMonth,
    ) -> EngineResult<PayrollRecord> {
        self.store
            .find_payroll_record(employee_id, period)
            .await?
            .ok_or_else(|| EngineError::PayrollRecordNotFound {
                employee_id: employee_id.to_string(),
                year: period.year(),
                month: period.month(),
            })
    }

    /// Moves a stored record to a new status, e.g. to `paid` once payment
    /// has been made.
    pub async fn set_payroll_status(
        &self,
        employee_id: &str,
        period: PayrollMonth,
        status: PayrollStatus,
    ) -> EngineResult<PayrollRecord> {
        let record = self
            .store
            .set_payroll_status(employee_id, period, status)
            .await?;
        info!(employee_id = %employee_id, period = %period, status = ?status, "Payroll status changed");
        Ok(record)
    }

    /// Deletes a month of attendance, for one employee or everyone, together
    /// with the payroll records of that month that are not paid.
    ///
    /// Returns the number of punch records removed.
    pub async fn delete_attendance(
        &self,
        period: PayrollMonth,
        employee_id: Option<&str>,
    ) -> EngineResult<u64> {
        let removed = self.store.delete_attendance(period, employee_id).await?;
        info!(
            period = %period,
            employee_id = employee_id.unwrap_or("*"),
            removed,
            "Attendance deleted"
        );
        Ok(removed)
    }

    /// Summarizes the working-day calendar of a month.
    ///
    /// Without an office only company-wide holidays are applied.
    pub async fn working_days(
        &self,
        period: PayrollMonth,
        office_id: Option<&str>,
    ) -> EngineResult<WorkingDaysSummary> {
        let holidays = self
            .store
            .holidays_between(period.first_day(), period.last_day())
            .await?;
        Ok(build_month_calendar(period, office_id, &holidays, &self.config.policy).summary())
    }

    /// Lists the working days of an employee's month that have neither a
    /// punch record nor an approved leave.
    pub async fn pending_attendance(
        &self,
        employee_id: &str,
        period: PayrollMonth,
    ) -> EngineResult<PendingAttendance> {
        let employee = self
            .store
            .find_employee(employee_id)
            .await?
            .ok_or_else(|| EngineError::EmployeeNotFound {
                employee_id: employee_id.to_string(),
            })?;

        let Some(start) = employee.employment_start_in(period) else {
            return Ok(PendingAttendance {
                employee_id: employee.employee_id,
                period,
                working_days: 0,
                recorded_days: 0,
                leave_days: 0,
                pending_dates: Vec::new(),
            });
        };

        let holidays = self
            .store
            .holidays_between(period.first_day(), period.last_day())
            .await?;
        let calendar = build_month_calendar(
            period,
            Some(employee.office_id.as_str()),
            &holidays,
            &self.config.policy,
        );

        let punched: BTreeSet<_> = self
            .store
            .punches_between(employee_id, start, period.last_day())
            .await?
            .into_iter()
            .map(|p| p.date)
            .collect();
        let on_leave: BTreeSet<_> = self
            .store
            .approved_leaves_between(employee_id, start, period.last_day())
            .await?
            .into_iter()
            .map(|l| l.date)
            .collect();

        let days = calendar.working_days_from(start);
        let pending_dates = days
            .iter()
            .filter(|d| !punched.contains(*d) && !on_leave.contains(*d))
            .copied()
            .collect();

        Ok(PendingAttendance {
            employee_id: employee.employee_id,
            period,
            working_days: days.len() as u32,
            recorded_days: days.iter().filter(|d| punched.contains(*d)).count() as u32,
            leave_days: days
                .iter()
                .filter(|d| on_leave.contains(*d) && !punched.contains(*d))
                .count() as u32,
            pending_dates,
        })
    }

    /// Validates raw punch rows and stores the valid ones.
    ///
    /// Rows are rejected individually: a malformed row, an unknown employee
    /// or a second row for the same (employee, date) never blocks the rest
    /// of the batch.
    pub async fn import_punches(&self, rows: Vec<RawPunchRow>) -> EngineResult<ImportReport> {
        let received = rows.len();
        let parsed = parse_rows(rows);
        let mut rejected = parsed.rejected;

        let mut known = BTreeSet::new();
        let mut unknown = BTreeSet::new();
        let mut accepted = Vec::with_capacity(parsed.punches.len());

        for (row, punch) in parsed.punches {
            if !known.contains(&punch.employee_id) && !unknown.contains(&punch.employee_id) {
                if self.store.find_employee(&punch.employee_id).await?.is_some() {
                    known.insert(punch.employee_id.clone());
                } else {
                    unknown.insert(punch.employee_id.clone());
                }
            }
            if unknown.contains(&punch.employee_id) {
                let error = EngineError::EmployeeNotFound {
                    employee_id: punch.employee_id.clone(),
                };
                rejected.push(RowError::new(row, &error));
                continue;
            }
            accepted.push(punch);
        }

        let imported = self.store.upsert_punches(&accepted).await?;
        rejected.sort_by_key(|e| e.row);

        info!(
            received,
            imported,
            rejected = rejected.len(),
            "Attendance import finished"
        );

        Ok(ImportReport {
            received,
            imported,
            rejected,
        })
    }
}
