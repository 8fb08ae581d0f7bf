//! Batch generation of payroll records.
//!
//! Every (employee, month) pair in a request is an independent unit of work.
//! Units run on the tokio runtime bounded by a semaphore; a failure in one
//! unit is recorded in the report and never aborts the others.

use std::collections::{BTreeSet, HashMap};
use std::sync::Arc;
use std::time::Duration;

use tokio::sync::Semaphore;
use tokio::task::JoinSet;
use tokio_util::sync::CancellationToken;
use tracing::{debug, error, info, warn};
use uuid::Uuid;

use crate::calculation::{
    EmployeeMonthInput, MonthCalendar, ScheduleTable, build_month_calendar, compute_employee_month,
};
use crate::config::{GenerationConfig, PayrollConfig};
use crate::error::{EngineError, EngineResult};
use crate::models::{AuditWarning, Employee, PayrollMonth, PayrollRecord};
use crate::store::{EmployeeScope, PayrollStore};

use super::types::{EmployeeOutcome, GenerationReport, GenerationRequest};

/// One employee-month waiting to be processed.
struct WorkUnit {
    employee: Employee,
    period: PayrollMonth,
    calendar: Arc<MonthCalendar>,
}

/// Shared, read-only state handed to every unit.
struct UnitContext<S> {
    run_id: Uuid,
    store: Arc<S>,
    config: Arc<PayrollConfig>,
    schedules: Arc<ScheduleTable>,
}

impl<S> Clone for UnitContext<S> {
    fn clone(&self) -> Self {
        Self {
            run_id: self.run_id,
            store: Arc::clone(&self.store),
            config: Arc::clone(&self.config),
            schedules: Arc::clone(&self.schedules),
        }
    }
}

pub(super) async fn run_generation<S>(
    store: Arc<S>,
    config: Arc<PayrollConfig>,
    request: GenerationRequest,
    cancel: CancellationToken,
) -> EngineResult<GenerationReport>
where
    S: PayrollStore + 'static,
{
    let run_id = Uuid::new_v4();
    let months = request.period.months()?;

    info!(
        run_id = %run_id,
        months = months.len(),
        scope = ?request.scope,
        "Starting payroll generation"
    );

    let employees = store.list_employees(&request.scope).await?;
    let schedules = Arc::new(ScheduleTable::from_rows(store.list_schedules().await?));

    let mut outcomes = Vec::new();

    if let EmployeeScope::Employees(ids) = &request.scope {
        let known: BTreeSet<&str> = employees.iter().map(|e| e.employee_id.as_str()).collect();
        let unknown: BTreeSet<&str> = ids
            .iter()
            .map(String::as_str)
            .filter(|id| !known.contains(id))
            .collect();
        for id in unknown {
            warn!(run_id = %run_id, employee_id = %id, "Employee not found");
            let error = EngineError::EmployeeNotFound {
                employee_id: id.to_string(),
            };
            for period in &months {
                outcomes.push(EmployeeOutcome::failed(id, *period, &error));
            }
        }
    }

    let mut units = Vec::new();
    for period in &months {
        let holidays = store
            .holidays_between(period.first_day(), period.last_day())
            .await;
        if let Err(e) = &holidays {
            warn!(run_id = %run_id, period = %period, error = %e, "Holiday calendar unavailable");
        }
        let mut calendars: HashMap<&str, Arc<MonthCalendar>> = HashMap::new();

        for employee in &employees {
            if !employee.active {
                outcomes.push(EmployeeOutcome::skipped(
                    employee.employee_id.as_str(),
                    *period,
                    "employee is inactive",
                ));
                continue;
            }
            if !employee.is_employed_during(*period) {
                outcomes.push(EmployeeOutcome::skipped(
                    employee.employee_id.as_str(),
                    *period,
                    format!("joins on {}", employee.joining_date),
                ));
                continue;
            }

            let holidays = match &holidays {
                Ok(holidays) => holidays,
                Err(e) => {
                    outcomes.push(EmployeeOutcome::failed(
                        employee.employee_id.as_str(),
                        *period,
                        e,
                    ));
                    continue;
                }
            };

            let calendar = calendars
                .entry(employee.office_id.as_str())
                .or_insert_with(|| {
                    Arc::new(build_month_calendar(
                        *period,
                        Some(employee.office_id.as_str()),
                        holidays,
                        &config.policy,
                    ))
                })
                .clone();

            units.push(WorkUnit {
                employee: employee.clone(),
                period: *period,
                calendar,
            });
        }
    }

    let context = UnitContext {
        run_id,
        store,
        config: Arc::clone(&config),
        schedules,
    };
    outcomes.extend(process_units(context, units, &config.generation, &cancel).await);

    let report = GenerationReport::from_outcomes(run_id, outcomes);
    info!(
        run_id = %run_id,
        succeeded = report.succeeded,
        failed = report.failed,
        skipped = report.skipped,
        already_paid = report.already_paid,
        cancelled = report.cancelled,
        "Payroll generation finished"
    );

    Ok(report)
}

async fn process_units<S>(
    context: UnitContext<S>,
    units: Vec<WorkUnit>,
    generation: &GenerationConfig,
    cancel: &CancellationToken,
) -> Vec<EmployeeOutcome>
where
    S: PayrollStore + 'static,
{
    let semaphore = Arc::new(Semaphore::new(generation.max_concurrency.max(1)));
    let mut join_set = JoinSet::new();
    let mut in_flight: BTreeSet<(PayrollMonth, String)> = BTreeSet::new();
    let mut outcomes = Vec::with_capacity(units.len());

    for unit in units {
        let employee_id = unit.employee.employee_id.clone();

        let permit = tokio::select! {
            biased;
            _ = cancel.cancelled() => None,
            permit = Arc::clone(&semaphore).acquire_owned() => permit.ok(),
        };
        let Some(permit) = permit else {
            outcomes.push(EmployeeOutcome::cancelled(employee_id, unit.period));
            continue;
        };
        if cancel.is_cancelled() {
            outcomes.push(EmployeeOutcome::cancelled(employee_id, unit.period));
            continue;
        }

        in_flight.insert((unit.period, employee_id));
        let context = context.clone();
        let retry = generation.clone();
        join_set.spawn(async move {
            let _permit = permit;
            process_unit(context, unit, retry).await
        });
    }

    while let Some(joined) = join_set.join_next().await {
        match joined {
            Ok(outcome) => {
                in_flight.remove(&(outcome.period, outcome.employee_id.clone()));
                outcomes.push(outcome);
            }
            Err(e) => error!(run_id = %context.run_id, error = %e, "Payroll task did not complete"),
        }
    }

    for (period, employee_id) in in_flight {
        let error = EngineError::Persistence {
            message: "payroll task aborted before completing".to_string(),
        };
        outcomes.push(EmployeeOutcome::failed(employee_id, period, &error));
    }

    outcomes
}

async fn process_unit<S>(
    context: UnitContext<S>,
    unit: WorkUnit,
    retry: GenerationConfig,
) -> EmployeeOutcome
where
    S: PayrollStore + 'static,
{
    let employee_id = unit.employee.employee_id.clone();
    let period = unit.period;

    match compute_and_store(&context, &unit, &retry).await {
        Ok((record, warnings)) => {
            info!(
                run_id = %context.run_id,
                employee_id = %employee_id,
                period = %period,
                net_salary = %record.net_salary,
                "Payroll record generated"
            );
            EmployeeOutcome::succeeded(record, warnings)
        }
        Err(e) => {
            warn!(
                run_id = %context.run_id,
                employee_id = %employee_id,
                period = %period,
                code = e.code(),
                error = %e,
                "Payroll generation failed for employee"
            );
            EmployeeOutcome::failed(employee_id, period, &e)
        }
    }
}

async fn compute_and_store<S>(
    context: &UnitContext<S>,
    unit: &WorkUnit,
    retry: &GenerationConfig,
) -> EngineResult<(PayrollRecord, Vec<AuditWarning>)>
where
    S: PayrollStore + 'static,
{
    let employee = &unit.employee;
    let period = unit.period;

    let existing = context
        .store
        .find_payroll_record(&employee.employee_id, period)
        .await?;
    if existing.is_some_and(|record| record.is_paid()) {
        return Err(EngineError::ImmutableRecordConflict {
            employee_id: employee.employee_id.clone(),
            year: period.year(),
            month: period.month(),
        });
    }

    let punches = context
        .store
        .punches_between(&employee.employee_id, period.first_day(), period.last_day())
        .await?;
    let leaves = context
        .store
        .approved_leaves_between(&employee.employee_id, period.first_day(), period.last_day())
        .await?;

    let computation = compute_employee_month(EmployeeMonthInput {
        employee,
        calendar: &unit.calendar,
        schedules: &context.schedules,
        punches: &punches,
        leaves: &leaves,
        policy: &context.config.policy,
    })?;
    debug!(
        run_id = %context.run_id,
        employee_id = %employee.employee_id,
        steps = computation.trace.steps.len(),
        duration_us = computation.trace.duration_us,
        "Computed payroll"
    );

    persist_with_retry(context, &computation.record, retry).await?;
    Ok((computation.record, computation.trace.warnings))
}

async fn persist_with_retry<S>(
    context: &UnitContext<S>,
    record: &PayrollRecord,
    retry: &GenerationConfig,
) -> EngineResult<()>
where
    S: PayrollStore + 'static,
{
    let mut attempt = 0u32;
    loop {
        match context.store.upsert_payroll_record(record).await {
            Ok(()) => return Ok(()),
            Err(e) if e.is_retryable() && attempt < retry.persistence_retries => {
                attempt += 1;
                warn!(
                    run_id = %context.run_id,
                    employee_id = %record.employee_id,
                    attempt,
                    backoff_ms = retry.retry_backoff_ms,
                    error = %e,
                    "Retrying payroll write"
                );
                tokio::time::sleep(Duration::from_millis(retry.retry_backoff_ms)).await;
            }
            Err(e) => return Err(e),
        }
    }
}
