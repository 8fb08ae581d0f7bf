//! Integration tests for the Payroll Generation Engine.
//!
//! This suite covers:
//! - Generation scenarios driven through the engine (attendance, leave,
//!   joining dates, paid records, idempotence)
//! - Persistence retry and cooperative cancellation
//! - Attendance import, pending attendance and working-day endpoints
//! - HTTP error mapping

use std::str::FromStr;
use std::sync::Arc;
use std::sync::atomic::{AtomicU32, Ordering};

use async_trait::async_trait;
use axum::{
    Router,
    body::Body,
    http::{Request, StatusCode},
};
use chrono::{Datelike, NaiveDate, NaiveTime, Weekday};
use rust_decimal::Decimal;
use serde_json::{Value, json};
use tokio_util::sync::CancellationToken;
use tower::ServiceExt;

use payroll_engine::api::{AppState, create_router};
use payroll_engine::config::PayrollConfig;
use payroll_engine::engine::{GenerationRequest, OutcomeStatus, PayrollEngine};
use payroll_engine::error::{EngineError, EngineResult};
use payroll_engine::models::{
    ApprovedLeave, AttendancePunch, Employee, Holiday, HolidayCategory, OfficePositionSchedule,
    PayrollMonth, PayrollRecord, PayrollStatus,
};
use payroll_engine::store::{EmployeeScope, InMemoryStore, PayrollStore};

// =============================================================================
// Test Helpers
// =============================================================================

fn dec(s: &str) -> Decimal {
    Decimal::from_str(s).unwrap()
}

/// Normalize decimal string by removing trailing zeros after decimal point
fn normalize_decimal(s: &str) -> String {
    Decimal::from_str(s).unwrap().normalize().to_string()
}

fn date(day: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(2026, 3, day).unwrap()
}

fn time(h: u32, m: u32) -> Option<NaiveTime> {
    NaiveTime::from_hms_opt(h, m, 0)
}

/// March 2026: 31 days, starting on a Sunday. With Saturdays and Sundays
/// off it has 22 working days.
fn march() -> PayrollMonth {
    PayrollMonth::new(2026, 3).unwrap()
}

fn test_config() -> PayrollConfig {
    let mut config = PayrollConfig::default();
    config.policy.weekly_off_days = vec![Weekday::Sat, Weekday::Sun];
    config.generation.retry_backoff_ms = 1;
    config
}

fn employee(id: &str, salary: &str, joining_date: NaiveDate) -> Employee {
    Employee {
        employee_id: id.to_string(),
        name: format!("Employee {}", id),
        office_id: "DXB".to_string(),
        position_id: "AGENT".to_string(),
        monthly_salary: dec(salary),
        allowances: Decimal::ZERO,
        joining_date,
        active: true,
    }
}

fn is_weekday(d: NaiveDate) -> bool {
    !matches!(d.weekday(), Weekday::Sat | Weekday::Sun)
}

/// Punches 09:00-17:00 on every March weekday from `from_day`, except the
/// `absent` days. `late` days are punched 09:30-17:30.
fn month_of_punches(id: &str, from_day: u32, absent: &[u32], late: &[u32]) -> Vec<AttendancePunch> {
    (from_day..=31)
        .map(date)
        .filter(|d| is_weekday(*d) && !absent.contains(&d.day()))
        .map(|d| {
            let (punch_in, punch_out) = if late.contains(&d.day()) {
                (time(9, 30), time(17, 30))
            } else {
                (time(9, 0), time(17, 0))
            };
            AttendancePunch::new(id, d, punch_in, punch_out).unwrap()
        })
        .collect()
}

async fn seeded_store(employees: &[Employee]) -> Arc<InMemoryStore> {
    let store = Arc::new(InMemoryStore::new());
    store
        .insert_schedule(
            OfficePositionSchedule::new("DXB", "AGENT", time(9, 0).unwrap(), dec("8")).unwrap(),
        )
        .await;
    for employee in employees {
        store.insert_employee(employee.clone()).await;
    }
    store
}

fn engine_over<S: PayrollStore + 'static>(store: Arc<S>, config: PayrollConfig) -> PayrollEngine<S> {
    PayrollEngine::new(store, config)
}

fn succeeded_record(report: &payroll_engine::engine::GenerationReport, id: &str) -> PayrollRecord {
    let outcome = report.outcome(id, march()).unwrap();
    assert_eq!(outcome.status, OutcomeStatus::Succeeded, "outcome: {:?}", outcome);
    outcome.record.clone().unwrap()
}

async fn send(router: Router, request: Request<Body>) -> (StatusCode, Value) {
    let response = router.oneshot(request).await.unwrap();

    let status = response.status();
    let body_bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    let json: Value = serde_json::from_slice(&body_bytes).unwrap();

    (status, json)
}

fn post_json(uri: &str, body: Value) -> Request<Body> {
    Request::builder()
        .method("POST")
        .uri(uri)
        .header("Content-Type", "application/json")
        .body(Body::from(body.to_string()))
        .unwrap()
}

fn get(uri: &str) -> Request<Body> {
    Request::builder()
        .method("GET")
        .uri(uri)
        .body(Body::empty())
        .unwrap()
}

/// Delegates to an [`InMemoryStore`], failing the first `failures` payroll
/// writes, optionally cancelling a token on the first write and optionally
/// failing holiday reads for one month.
struct FlakyStore {
    inner: InMemoryStore,
    failures: AtomicU32,
    upserts: AtomicU32,
    cancel_on_upsert: Option<CancellationToken>,
    holidays_down_in: Option<u32>,
}

impl FlakyStore {
    fn new(inner: InMemoryStore, failures: u32) -> Self {
        Self {
            inner,
            failures: AtomicU32::new(failures),
            upserts: AtomicU32::new(0),
            cancel_on_upsert: None,
            holidays_down_in: None,
        }
    }
}

#[async_trait]
impl PayrollStore for FlakyStore {
    async fn list_employees(&self, scope: &EmployeeScope) -> EngineResult<Vec<Employee>> {
        self.inner.list_employees(scope).await
    }

    async fn find_employee(&self, employee_id: &str) -> EngineResult<Option<Employee>> {
        self.inner.find_employee(employee_id).await
    }

    async fn list_schedules(&self) -> EngineResult<Vec<OfficePositionSchedule>> {
        self.inner.list_schedules().await
    }

    async fn holidays_between(&self, from: NaiveDate, to: NaiveDate) -> EngineResult<Vec<Holiday>> {
        if self.holidays_down_in == Some(from.month()) {
            return Err(EngineError::Persistence {
                message: "holiday table unavailable".to_string(),
            });
        }
        self.inner.holidays_between(from, to).await
    }

    async fn punches_between(
        &self,
        employee_id: &str,
        from: NaiveDate,
        to: NaiveDate,
    ) -> EngineResult<Vec<AttendancePunch>> {
        self.inner.punches_between(employee_id, from, to).await
    }

    async fn approved_leaves_between(
        &self,
        employee_id: &str,
        from: NaiveDate,
        to: NaiveDate,
    ) -> EngineResult<Vec<ApprovedLeave>> {
        self.inner.approved_leaves_between(employee_id, from, to).await
    }

    async fn find_payroll_record(
        &self,
        employee_id: &str,
        period: PayrollMonth,
    ) -> EngineResult<Option<PayrollRecord>> {
        self.inner.find_payroll_record(employee_id, period).await
    }

    async fn upsert_payroll_record(&self, record: &PayrollRecord) -> EngineResult<()> {
        self.upserts.fetch_add(1, Ordering::SeqCst);
        if let Some(token) = &self.cancel_on_upsert {
            token.cancel();
        }
        let remaining = self.failures.load(Ordering::SeqCst);
        if remaining > 0 {
            self.failures.store(remaining - 1, Ordering::SeqCst);
            return Err(EngineError::Persistence {
                message: "connection reset".to_string(),
            });
        }
        self.inner.upsert_payroll_record(record).await
    }

    async fn set_payroll_status(
        &self,
        employee_id: &str,
        period: PayrollMonth,
        status: PayrollStatus,
    ) -> EngineResult<PayrollRecord> {
        self.inner.set_payroll_status(employee_id, period, status).await
    }

    async fn upsert_punches(&self, punches: &[AttendancePunch]) -> EngineResult<u64> {
        self.inner.upsert_punches(punches).await
    }

    async fn delete_attendance(
        &self,
        period: PayrollMonth,
        employee_id: Option<&str>,
    ) -> EngineResult<u64> {
        self.inner.delete_attendance(period, employee_id).await
    }
}

// =============================================================================
// SECTION 1: Generation Scenarios
// =============================================================================

#[tokio::test]
async fn test_one_late_day_and_one_absence_in_22_day_month() {
    let store = seeded_store(&[employee("EMP001", "22000", date(1))]).await;
    store
        .upsert_punches(&month_of_punches("EMP001", 1, &[10], &[4]))
        .await
        .unwrap();
    let engine = engine_over(Arc::clone(&store), test_config());

    let report = engine.generate(GenerationRequest::for_month(march())).await.unwrap();
    let record = succeeded_record(&report, "EMP001");

    assert_eq!(record.working_days, 22);
    assert_eq!(record.present_days, 21);
    assert_eq!(record.late_days, 1);
    assert_eq!(record.half_days, 0);
    assert_eq!(record.absent_days, 1);
    assert_eq!(record.deduction_days, dec("1"));
    assert_eq!(record.per_day_rate, dec("1000"));
    assert_eq!(record.deductions, dec("1000"));
    assert_eq!(record.gross_salary, dec("22000"));
    assert_eq!(record.net_salary, dec("21000"));
    assert_eq!(record.status, PayrollStatus::Calculated);
    assert!(record.anomalies.is_empty());
}

#[tokio::test]
async fn test_approved_leave_dominates_punches() {
    let store = seeded_store(&[employee("EMP001", "22000", date(1))]).await;
    // A punched late day and an unpunched day, both on approved leave.
    store
        .upsert_punches(&month_of_punches("EMP001", 1, &[12], &[11]))
        .await
        .unwrap();
    for day in [11, 12] {
        store
            .insert_leave(ApprovedLeave {
                employee_id: "EMP001".to_string(),
                date: date(day),
                approved_by: Some("MGR01".to_string()),
                reason: None,
            })
            .await;
    }
    let engine = engine_over(Arc::clone(&store), test_config());

    let report = engine.generate(GenerationRequest::for_month(march())).await.unwrap();
    let record = succeeded_record(&report, "EMP001");

    assert_eq!(record.leaves, 2);
    assert_eq!(record.late_days, 0);
    assert_eq!(record.absent_days, 0);
    assert_eq!(record.present_days, 20);
    assert_eq!(record.deduction_days, Decimal::ZERO);
    assert_eq!(record.net_salary, dec("22000"));
}

#[tokio::test]
async fn test_joining_mid_month_is_pro_rated() {
    // Joins Monday 16 March: 12 working days of the month's 22.
    let store = seeded_store(&[employee("EMP001", "22000", date(16))]).await;
    store
        .upsert_punches(&month_of_punches("EMP001", 16, &[], &[]))
        .await
        .unwrap();
    let engine = engine_over(Arc::clone(&store), test_config());

    let report = engine.generate(GenerationRequest::for_month(march())).await.unwrap();
    let record = succeeded_record(&report, "EMP001");

    assert_eq!(record.working_days, 12);
    assert_eq!(record.present_days, 12);
    assert_eq!(record.absent_days, 0);
    assert_eq!(record.gross_salary, dec("12000"));
    assert_eq!(record.net_salary, dec("12000"));
}

#[tokio::test]
async fn test_employee_joining_after_month_is_skipped() {
    let store = seeded_store(&[
        employee("EMP001", "22000", date(1)),
        employee("EMP002", "22000", NaiveDate::from_ymd_opt(2026, 4, 1).unwrap()),
    ])
    .await;
    let engine = engine_over(Arc::clone(&store), test_config());

    let report = engine.generate(GenerationRequest::for_month(march())).await.unwrap();

    assert_eq!(report.succeeded, 1);
    assert_eq!(report.skipped, 1);
    assert_eq!(
        report.outcome("EMP002", march()).unwrap().status,
        OutcomeStatus::Skipped
    );
    assert_eq!(store.payroll_record_count().await, 1);
}

#[tokio::test]
async fn test_office_holiday_removes_working_day() {
    let store = seeded_store(&[employee("EMP001", "21000", date(1))]).await;
    store
        .insert_holiday(Holiday {
            date: date(20),
            name: "Eid al-Fitr".to_string(),
            category: HolidayCategory::Religious,
            office_id: Some("DXB".to_string()),
        })
        .await;
    store
        .upsert_punches(&month_of_punches("EMP001", 1, &[20], &[]))
        .await
        .unwrap();
    let engine = engine_over(Arc::clone(&store), test_config());

    let report = engine.generate(GenerationRequest::for_month(march())).await.unwrap();
    let record = succeeded_record(&report, "EMP001");

    assert_eq!(record.working_days, 21);
    assert_eq!(record.absent_days, 0);
    assert_eq!(record.per_day_rate, dec("1000"));
}

#[tokio::test]
async fn test_generation_is_idempotent() {
    let store = seeded_store(&[employee("EMP001", "22000", date(1))]).await;
    store
        .upsert_punches(&month_of_punches("EMP001", 1, &[3, 17], &[5, 6]))
        .await
        .unwrap();
    let engine = engine_over(Arc::clone(&store), test_config());

    let first = engine.generate(GenerationRequest::for_month(march())).await.unwrap();
    let second = engine.generate(GenerationRequest::for_month(march())).await.unwrap();

    assert_eq!(
        succeeded_record(&first, "EMP001"),
        succeeded_record(&second, "EMP001")
    );
    assert_ne!(first.run_id, second.run_id);
    assert_eq!(store.payroll_record_count().await, 1);
}

#[tokio::test]
async fn test_paid_record_is_rejected_while_others_succeed() {
    let store = seeded_store(&[
        employee("EMP001", "22000", date(1)),
        employee("EMP002", "22000", date(1)),
    ])
    .await;
    store
        .upsert_punches(&month_of_punches("EMP001", 1, &[], &[]))
        .await
        .unwrap();
    let engine = engine_over(Arc::clone(&store), test_config());

    engine.generate(GenerationRequest::for_month(march())).await.unwrap();
    let paid = engine
        .set_payroll_status("EMP001", march(), PayrollStatus::Paid)
        .await
        .unwrap();

    // New absences must not reach the paid record.
    engine.delete_attendance(march(), Some("EMP001")).await.unwrap();
    let report = engine.generate(GenerationRequest::for_month(march())).await.unwrap();

    let outcome = report.outcome("EMP001", march()).unwrap();
    assert_eq!(outcome.status, OutcomeStatus::Failed);
    assert!(outcome.is_already_paid());
    assert_eq!(report.already_paid, 1);
    assert_eq!(report.failed, 1);
    assert_eq!(report.succeeded, 1);
    assert_eq!(
        report.outcome("EMP002", march()).unwrap().status,
        OutcomeStatus::Succeeded
    );
    assert_eq!(engine.get_payroll_record("EMP001", march()).await.unwrap(), paid);
}

#[tokio::test]
async fn test_unknown_employee_in_scope_is_reported() {
    let store = seeded_store(&[employee("EMP001", "22000", date(1))]).await;
    let engine = engine_over(Arc::clone(&store), test_config());

    let request = GenerationRequest::for_month(march()).with_scope(EmployeeScope::Employees(vec![
        "EMP001".to_string(),
        "EMP404".to_string(),
    ]));
    let report = engine.generate(request).await.unwrap();

    assert_eq!(report.outcomes.len(), 2);
    let missing = report.outcome("EMP404", march()).unwrap();
    assert_eq!(missing.status, OutcomeStatus::Failed);
    assert_eq!(missing.error.as_ref().unwrap().code, "EMPLOYEE_NOT_FOUND");
    assert_eq!(report.succeeded, 1);
}

#[tokio::test]
async fn test_outcomes_sorted_by_period_then_employee() {
    let store = seeded_store(&[
        employee("EMP002", "22000", NaiveDate::from_ymd_opt(2026, 1, 1).unwrap()),
        employee("EMP001", "22000", NaiveDate::from_ymd_opt(2026, 1, 1).unwrap()),
    ])
    .await;
    let engine = engine_over(Arc::clone(&store), test_config());

    let request: GenerationRequest = serde_json::from_value(json!({
        "period": {"from": "2026-02-10", "to": "2026-03-05"}
    }))
    .unwrap();
    let report = engine.generate(request).await.unwrap();

    let keys: Vec<(u32, &str)> = report
        .outcomes
        .iter()
        .map(|o| (o.period.month(), o.employee_id.as_str()))
        .collect();
    assert_eq!(
        keys,
        vec![(2, "EMP001"), (2, "EMP002"), (3, "EMP001"), (3, "EMP002")]
    );
    assert_eq!(report.succeeded, 4);
}

// =============================================================================
// SECTION 2: Persistence Retry and Cancellation
// =============================================================================

#[tokio::test]
async fn test_persistence_error_is_retried_once() {
    let inner = InMemoryStore::new();
    inner.insert_employee(employee("EMP001", "22000", date(1))).await;
    let store = Arc::new(FlakyStore::new(inner, 1));
    let engine = engine_over(Arc::clone(&store), test_config());

    let report = engine.generate(GenerationRequest::for_month(march())).await.unwrap();

    assert_eq!(report.succeeded, 1);
    assert_eq!(store.upserts.load(Ordering::SeqCst), 2);
    assert!(engine.get_payroll_record("EMP001", march()).await.is_ok());
}

#[tokio::test]
async fn test_persistence_error_fails_employee_after_retries() {
    let inner = InMemoryStore::new();
    inner.insert_employee(employee("EMP001", "22000", date(1))).await;
    inner.insert_employee(employee("EMP002", "22000", date(1))).await;
    let store = Arc::new(FlakyStore::new(inner, 2));
    let mut config = test_config();
    config.generation.max_concurrency = 1;
    let engine = engine_over(Arc::clone(&store), config);

    let report = engine.generate(GenerationRequest::for_month(march())).await.unwrap();

    let failed = report.outcome("EMP001", march()).unwrap();
    assert_eq!(failed.status, OutcomeStatus::Failed);
    assert_eq!(failed.error.as_ref().unwrap().code, "PERSISTENCE_ERROR");
    assert_eq!(
        report.outcome("EMP002", march()).unwrap().status,
        OutcomeStatus::Succeeded
    );
}

#[tokio::test]
async fn test_cancelled_before_start_generates_nothing() {
    let store = seeded_store(&[
        employee("EMP001", "22000", date(1)),
        employee("EMP002", "22000", date(1)),
    ])
    .await;
    let engine = engine_over(Arc::clone(&store), test_config());
    let cancel = CancellationToken::new();
    cancel.cancel();

    let report = engine
        .generate_with_cancellation(GenerationRequest::for_month(march()), cancel)
        .await
        .unwrap();

    assert_eq!(report.cancelled, 2);
    assert_eq!(report.succeeded, 0);
    assert_eq!(store.payroll_record_count().await, 0);
}

#[tokio::test]
async fn test_cancellation_lets_in_flight_employee_finish() {
    let inner = InMemoryStore::new();
    for id in ["EMP001", "EMP002", "EMP003"] {
        inner.insert_employee(employee(id, "22000", date(1))).await;
    }
    let cancel = CancellationToken::new();
    let mut flaky = FlakyStore::new(inner, 0);
    flaky.cancel_on_upsert = Some(cancel.clone());
    let store = Arc::new(flaky);

    let mut config = test_config();
    config.generation.max_concurrency = 1;
    let engine = engine_over(Arc::clone(&store), config);

    let report = engine
        .generate_with_cancellation(GenerationRequest::for_month(march()), cancel)
        .await
        .unwrap();

    assert_eq!(
        report.outcome("EMP001", march()).unwrap().status,
        OutcomeStatus::Succeeded
    );
    assert_eq!(report.cancelled, 2);
    assert_eq!(store.upserts.load(Ordering::SeqCst), 1);
}

#[tokio::test]
async fn test_holiday_read_failure_fails_only_that_month() {
    let inner = InMemoryStore::new();
    inner
        .insert_employee(employee("EMP001", "22000", NaiveDate::from_ymd_opt(2026, 1, 1).unwrap()))
        .await;
    let mut flaky = FlakyStore::new(inner, 0);
    flaky.holidays_down_in = Some(2);
    let store = Arc::new(flaky);
    let engine = engine_over(Arc::clone(&store), test_config());

    let request: GenerationRequest = serde_json::from_value(json!({
        "period": {"from": "2026-02-01", "to": "2026-03-31"}
    }))
    .unwrap();
    let report = engine.generate(request).await.unwrap();

    let february = PayrollMonth::new(2026, 2).unwrap();
    let failed = report.outcome("EMP001", february).unwrap();
    assert_eq!(failed.status, OutcomeStatus::Failed);
    assert_eq!(failed.error.as_ref().unwrap().code, "PERSISTENCE_ERROR");
    assert_eq!(
        report.outcome("EMP001", march()).unwrap().status,
        OutcomeStatus::Succeeded
    );
    assert_eq!(report.failed, 1);
    assert_eq!(report.succeeded, 1);
}

// =============================================================================
// SECTION 3: Attendance Maintenance
// =============================================================================

#[tokio::test]
async fn test_delete_attendance_keeps_paid_records() {
    let store = seeded_store(&[
        employee("EMP001", "22000", date(1)),
        employee("EMP002", "22000", date(1)),
    ])
    .await;
    store
        .upsert_punches(&month_of_punches("EMP001", 1, &[], &[]))
        .await
        .unwrap();
    store
        .upsert_punches(&month_of_punches("EMP002", 1, &[], &[]))
        .await
        .unwrap();
    let engine = engine_over(Arc::clone(&store), test_config());
    engine.generate(GenerationRequest::for_month(march())).await.unwrap();
    engine
        .set_payroll_status("EMP001", march(), PayrollStatus::Paid)
        .await
        .unwrap();

    let removed = engine.delete_attendance(march(), None).await.unwrap();

    assert_eq!(removed, 44);
    assert!(engine.get_payroll_record("EMP001", march()).await.is_ok());
    assert!(matches!(
        engine.get_payroll_record("EMP002", march()).await,
        Err(EngineError::PayrollRecordNotFound { .. })
    ));
}

#[tokio::test]
async fn test_pending_attendance_lists_unrecorded_days() {
    let store = seeded_store(&[employee("EMP001", "22000", date(1))]).await;
    store
        .upsert_punches(&month_of_punches("EMP001", 1, &[2, 3, 4], &[]))
        .await
        .unwrap();
    store
        .insert_leave(ApprovedLeave {
            employee_id: "EMP001".to_string(),
            date: date(3),
            approved_by: None,
            reason: Some("Medical".to_string()),
        })
        .await;
    let engine = engine_over(Arc::clone(&store), test_config());

    let pending = engine.pending_attendance("EMP001", march()).await.unwrap();

    assert_eq!(pending.working_days, 22);
    assert_eq!(pending.recorded_days, 19);
    assert_eq!(pending.leave_days, 1);
    assert_eq!(pending.pending_dates, vec![date(2), date(4)]);
}

#[tokio::test]
async fn test_pending_attendance_unknown_employee() {
    let store = seeded_store(&[]).await;
    let engine = engine_over(Arc::clone(&store), test_config());

    let result = engine.pending_attendance("EMP404", march()).await;
    assert!(matches!(result, Err(EngineError::EmployeeNotFound { .. })));
}

// =============================================================================
// SECTION 4: HTTP Endpoints
// =============================================================================

async fn http_fixture() -> (Arc<InMemoryStore>, Router) {
    let store = seeded_store(&[employee("EMP001", "22000", date(1))]).await;
    let engine = engine_over(Arc::clone(&store), test_config());
    (store, create_router(AppState::new(engine)))
}

#[tokio::test]
async fn test_http_import_then_generate_then_fetch() {
    let (_store, router) = http_fixture().await;

    let (status, import) = send(
        router.clone(),
        post_json(
            "/attendance/import",
            json!({
                "rows": [
                    {"employee_id": "EMP001", "date": "2026-03-02", "punch_in": "09:00", "punch_out": "17:00"},
                    {"employee_id": "EMP001", "date": "03/03/2026", "punch_in": "09:45:00", "punch_out": "18:00"},
                    {"employee_id": "EMP001", "date": "2026-03-02", "punch_in": "09:00", "punch_out": "17:00"},
                    {"employee_id": "EMP404", "date": "2026-03-04", "punch_in": "09:00", "punch_out": "17:00"},
                    {"employee_id": "EMP001", "date": "2026-03-05", "punch_in": "17:00", "punch_out": "09:00"}
                ]
            }),
        ),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(import["received"], 5);
    assert_eq!(import["imported"], 2);
    let rejected_rows: Vec<u64> = import["rejected"]
        .as_array()
        .unwrap()
        .iter()
        .map(|r| r["row"].as_u64().unwrap())
        .collect();
    assert_eq!(rejected_rows, vec![3, 4, 5]);
    assert_eq!(import["rejected"][1]["code"], "EMPLOYEE_NOT_FOUND");

    let (status, report) = send(
        router.clone(),
        post_json("/payroll/generate", json!({"period": {"year": 2026, "month": 3}})),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(report["succeeded"], 1);

    let (status, record) = send(router, get("/payroll/EMP001/2026/3")).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(record["present_days"], 2);
    assert_eq!(record["late_days"], 1);
    assert_eq!(record["absent_days"], 20);
    assert_eq!(
        normalize_decimal(record["net_salary"].as_str().unwrap()),
        normalize_decimal("2000")
    );
}

#[tokio::test]
async fn test_http_missing_record_returns_404() {
    let (_store, router) = http_fixture().await;

    let (status, body) = send(router, get("/payroll/EMP001/2026/3")).await;

    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body["code"], "PAYROLL_RECORD_NOT_FOUND");
}

#[tokio::test]
async fn test_http_invalid_month_returns_400() {
    let (_store, router) = http_fixture().await;

    let (status, body) = send(
        router,
        post_json("/payroll/generate", json!({"period": {"year": 2026, "month": 13}})),
    )
    .await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["code"], "INVALID_PERIOD");
}

#[tokio::test]
async fn test_http_malformed_json_returns_400() {
    let (_store, router) = http_fixture().await;

    let request = Request::builder()
        .method("POST")
        .uri("/payroll/generate")
        .header("Content-Type", "application/json")
        .body(Body::from("{\"period\": "))
        .unwrap();
    let (status, body) = send(router, request).await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["code"], "MALFORMED_JSON");
}

#[tokio::test]
async fn test_http_working_days_for_office() {
    let (store, router) = http_fixture().await;
    store
        .insert_holiday(Holiday {
            date: date(20),
            name: "Eid al-Fitr".to_string(),
            category: HolidayCategory::Religious,
            office_id: Some("DXB".to_string()),
        })
        .await;

    let (status, company) = send(
        router.clone(),
        get("/calendar/working-days?year=2026&month=3"),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(company["working_days"], 22);
    assert_eq!(company["total_days"], 31);

    let (status, office) = send(
        router,
        get("/calendar/working-days?year=2026&month=3&office_id=DXB"),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(office["working_days"], 21);
    assert_eq!(office["holidays"], 1);
}

#[tokio::test]
async fn test_http_pending_attendance_requires_query() {
    let (_store, router) = http_fixture().await;

    let (status, body) = send(router.clone(), get("/attendance/pending?year=2026&month=3")).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["code"], "VALIDATION_ERROR");

    let (status, pending) = send(
        router,
        get("/attendance/pending?employee_id=EMP001&year=2026&month=3"),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(pending["pending_dates"].as_array().unwrap().len(), 22);
}

#[tokio::test]
async fn test_http_delete_attendance() {
    let (store, router) = http_fixture().await;
    store
        .upsert_punches(&month_of_punches("EMP001", 1, &[], &[]))
        .await
        .unwrap();

    let (status, body) = send(
        router,
        post_json(
            "/attendance/delete",
            json!({"year": 2026, "month": 3, "employee_id": "EMP001"}),
        ),
    )
    .await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["deleted_records"], 22);
}
