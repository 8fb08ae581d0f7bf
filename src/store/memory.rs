//! In-memory [`PayrollStore`] implementation.

use std::collections::BTreeMap;
use std::sync::Arc;

use async_trait::async_trait;
use chrono::NaiveDate;
use tokio::sync::RwLock;
use tracing::debug;

use crate::error::{EngineError, EngineResult};
use crate::models::{
    ApprovedLeave, AttendancePunch, Employee, Holiday, OfficePositionSchedule, PayrollMonth,
    PayrollRecord, PayrollStatus,
};

use super::{EmployeeScope, PayrollStore};

type DayKey = (String, NaiveDate);
type MonthKey = (String, PayrollMonth);

#[derive(Debug, Default)]
struct Tables {
    employees: BTreeMap<String, Employee>,
    schedules: Vec<OfficePositionSchedule>,
    holidays: Vec<Holiday>,
    punches: BTreeMap<DayKey, AttendancePunch>,
    leaves: BTreeMap<DayKey, ApprovedLeave>,
    payroll: BTreeMap<MonthKey, PayrollRecord>,
}

/// A [`PayrollStore`] backed by ordered maps behind an async lock.
///
/// Punches and leaves are keyed by (employee, date) and payroll records by
/// (employee, month), which gives the store the same uniqueness guarantees a
/// database would enforce. Clones share the same tables.
///
/// # Example
///
/// ```
/// use payroll_engine::models::Employee;
/// use payroll_engine::store::{EmployeeScope, InMemoryStore, PayrollStore};
/// use chrono::NaiveDate;
/// use rust_decimal::Decimal;
///
/// let rt = tokio::runtime::Runtime::new().unwrap();
/// rt.block_on(async {
///     let store = InMemoryStore::new();
///     store
///         .insert_employee(Employee {
///             employee_id: "EMP001".to_string(),
///             name: "Asha".to_string(),
///             office_id: "DXB".to_string(),
///             position_id: "ENG".to_string(),
///             monthly_salary: Decimal::new(22000, 0),
///             allowances: Decimal::ZERO,
///             joining_date: NaiveDate::from_ymd_opt(2024, 1, 1).unwrap(),
///             active: true,
///         })
///         .await;
///     let employees = store.list_employees(&EmployeeScope::All).await.unwrap();
///     assert_eq!(employees.len(), 1);
/// });
/// ```
#[derive(Debug, Clone, Default)]
pub struct InMemoryStore {
    tables: Arc<RwLock<Tables>>,
}

impl InMemoryStore {
    /// Creates an empty store.
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds or replaces an employee.
    pub async fn insert_employee(&self, employee: Employee) {
        let mut tables = self.tables.write().await;
        tables.employees.insert(employee.employee_id.clone(), employee);
    }

    /// Adds a schedule row, replacing any row for the same office/position.
    pub async fn insert_schedule(&self, schedule: OfficePositionSchedule) {
        let mut tables = self.tables.write().await;
        tables
            .schedules
            .retain(|s| !(s.office_id == schedule.office_id && s.position_id == schedule.position_id));
        tables.schedules.push(schedule);
    }

    /// Adds a holiday.
    pub async fn insert_holiday(&self, holiday: Holiday) {
        self.tables.write().await.holidays.push(holiday);
    }

    /// Adds or replaces an approved leave.
    pub async fn insert_leave(&self, leave: ApprovedLeave) {
        let mut tables = self.tables.write().await;
        tables
            .leaves
            .insert((leave.employee_id.clone(), leave.date), leave);
    }

    /// Number of stored payroll records.
    pub async fn payroll_record_count(&self) -> usize {
        self.tables.read().await.payroll.len()
    }
}

#[async_trait]
impl PayrollStore for InMemoryStore {
    async fn list_employees(&self, scope: &EmployeeScope) -> EngineResult<Vec<Employee>> {
        let tables = self.tables.read().await;
        Ok(tables
            .employees
            .values()
            .filter(|e| scope.includes(e))
            .cloned()
            .collect())
    }

    async fn find_employee(&self, employee_id: &str) -> EngineResult<Option<Employee>> {
        Ok(self.tables.read().await.employees.get(employee_id).cloned())
    }

    async fn list_schedules(&self) -> EngineResult<Vec<OfficePositionSchedule>> {
        Ok(self.tables.read().await.schedules.clone())
    }

    async fn holidays_between(&self, from: NaiveDate, to: NaiveDate) -> EngineResult<Vec<Holiday>> {
        let tables = self.tables.read().await;
        let mut holidays: Vec<Holiday> = tables
            .holidays
            .iter()
            .filter(|h| h.date >= from && h.date <= to)
            .cloned()
            .collect();
        holidays.sort_by_key(|h| h.date);
        Ok(holidays)
    }

    async fn punches_between(
        &self,
        employee_id: &str,
        from: NaiveDate,
        to: NaiveDate,
    ) -> EngineResult<Vec<AttendancePunch>> {
        if from > to {
            return Ok(Vec::new());
        }
        let tables = self.tables.read().await;
        let range = (employee_id.to_string(), from)..=(employee_id.to_string(), to);
        Ok(tables.punches.range(range).map(|(_, p)| p.clone()).collect())
    }

    async fn approved_leaves_between(
        &self,
        employee_id: &str,
        from: NaiveDate,
        to: NaiveDate,
    ) -> EngineResult<Vec<ApprovedLeave>> {
        if from > to {
            return Ok(Vec::new());
        }
        let tables = self.tables.read().await;
        let range = (employee_id.to_string(), from)..=(employee_id.to_string(), to);
        Ok(tables.leaves.range(range).map(|(_, l)| l.clone()).collect())
    }

    async fn find_payroll_record(
        &self,
        employee_id: &str,
        period: PayrollMonth,
    ) -> EngineResult<Option<PayrollRecord>> {
        let tables = self.tables.read().await;
        Ok(tables
            .payroll
            .get(&(employee_id.to_string(), period))
            .cloned())
    }

    async fn upsert_payroll_record(&self, record: &PayrollRecord) -> EngineResult<()> {
        let mut tables = self.tables.write().await;
        let key = (record.employee_id.clone(), record.period);

        if tables.payroll.get(&key).is_some_and(|existing| existing.is_paid()) {
            return Err(EngineError::ImmutableRecordConflict {
                employee_id: record.employee_id.clone(),
                year: record.period.year(),
                month: record.period.month(),
            });
        }

        debug!(
            employee_id = %record.employee_id,
            period = %record.period,
            "Upserting payroll record"
        );
        tables.payroll.insert(key, record.clone());
        Ok(())
    }

    async fn set_payroll_status(
        &self,
        employee_id: &str,
        period: PayrollMonth,
        status: PayrollStatus,
    ) -> EngineResult<PayrollRecord> {
        let mut tables = self.tables.write().await;
        let record = tables
            .payroll
            .get_mut(&(employee_id.to_string(), period))
            .ok_or_else(|| EngineError::PayrollRecordNotFound {
                employee_id: employee_id.to_string(),
                year: period.year(),
                month: period.month(),
            })?;
        record.status = status;
        Ok(record.clone())
    }

    async fn upsert_punches(&self, punches: &[AttendancePunch]) -> EngineResult<u64> {
        let mut tables = self.tables.write().await;
        for punch in punches {
            tables
                .punches
                .insert((punch.employee_id.clone(), punch.date), punch.clone());
        }
        Ok(punches.len() as u64)
    }

    async fn delete_attendance(
        &self,
        period: PayrollMonth,
        employee_id: Option<&str>,
    ) -> EngineResult<u64> {
        let mut tables = self.tables.write().await;
        let matches = |id: &str| employee_id.is_none_or(|wanted| wanted == id);

        let before = tables.punches.len();
        tables
            .punches
            .retain(|(id, date), _| !(matches(id.as_str()) && period.contains(*date)));
        let removed = (before - tables.punches.len()) as u64;

        tables.payroll.retain(|(id, month), record| {
            !(matches(id.as_str()) && *month == period && !record.is_paid())
        });

        Ok(removed)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal::Decimal;

    fn date(d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(2026, 3, d).unwrap()
    }

    fn march() -> PayrollMonth {
        PayrollMonth::new(2026, 3).unwrap()
    }

    fn employee(id: &str, office: &str) -> Employee {
        Employee {
            employee_id: id.to_string(),
            name: String::new(),
            office_id: office.to_string(),
            position_id: "ENG".to_string(),
            monthly_salary: Decimal::new(22000, 0),
            allowances: Decimal::ZERO,
            joining_date: date(1),
            active: true,
        }
    }

    fn punch(id: &str, d: NaiveDate) -> AttendancePunch {
        AttendancePunch {
            employee_id: id.to_string(),
            date: d,
            punch_in: None,
            punch_out: None,
        }
    }

    fn record(id: &str, status: PayrollStatus) -> PayrollRecord {
        PayrollRecord {
            employee_id: id.to_string(),
            period: march(),
            working_days: 26,
            present_days: 26,
            half_days: 0,
            late_days: 0,
            absent_days: 0,
            leaves: 0,
            excess_leaves: 0,
            deduction_days: Decimal::ZERO,
            overtime_hours: Decimal::ZERO,
            per_day_rate: Decimal::ZERO,
            deductions: Decimal::ZERO,
            allowances: Decimal::ZERO,
            gross_salary: Decimal::ZERO,
            net_salary: Decimal::ZERO,
            status,
            anomalies: Vec::new(),
        }
    }

    #[tokio::test]
    async fn test_list_employees_by_scope() {
        let store = InMemoryStore::new();
        store.insert_employee(employee("EMP002", "AUH")).await;
        store.insert_employee(employee("EMP001", "DXB")).await;

        let all = store.list_employees(&EmployeeScope::All).await.unwrap();
        assert_eq!(all[0].employee_id, "EMP001");
        assert_eq!(all.len(), 2);

        let office = store
            .list_employees(&EmployeeScope::Office("AUH".to_string()))
            .await
            .unwrap();
        assert_eq!(office.len(), 1);
        assert_eq!(office[0].employee_id, "EMP002");
    }

    #[tokio::test]
    async fn test_punches_between_is_per_employee_and_ranged() {
        let store = InMemoryStore::new();
        store
            .upsert_punches(&[punch("EMP001", date(2)), punch("EMP001", date(20)), punch("EMP002", date(3))])
            .await
            .unwrap();

        let punches = store.punches_between("EMP001", date(1), date(10)).await.unwrap();
        assert_eq!(punches.len(), 1);
        assert_eq!(punches[0].date, date(2));
    }

    #[tokio::test]
    async fn test_upsert_punch_replaces_same_day() {
        let store = InMemoryStore::new();
        store.upsert_punches(&[punch("EMP001", date(2))]).await.unwrap();
        let mut updated = punch("EMP001", date(2));
        updated.punch_in = chrono::NaiveTime::from_hms_opt(9, 0, 0);
        store.upsert_punches(&[updated.clone()]).await.unwrap();

        let punches = store.punches_between("EMP001", date(1), date(31)).await.unwrap();
        assert_eq!(punches, vec![updated]);
    }

    #[tokio::test]
    async fn test_upsert_refuses_to_overwrite_paid_record() {
        let store = InMemoryStore::new();
        store.upsert_payroll_record(&record("EMP001", PayrollStatus::Paid)).await.unwrap();

        let result = store
            .upsert_payroll_record(&record("EMP001", PayrollStatus::Calculated))
            .await;
        assert!(matches!(result, Err(EngineError::ImmutableRecordConflict { .. })));
    }

    #[tokio::test]
    async fn test_set_status_on_missing_record() {
        let store = InMemoryStore::new();
        let result = store
            .set_payroll_status("EMP001", march(), PayrollStatus::Paid)
            .await;
        assert!(matches!(result, Err(EngineError::PayrollRecordNotFound { .. })));
    }

    #[tokio::test]
    async fn test_delete_attendance_keeps_paid_payroll() {
        let store = InMemoryStore::new();
        store
            .upsert_punches(&[punch("EMP001", date(2)), punch("EMP002", date(2))])
            .await
            .unwrap();
        store.upsert_payroll_record(&record("EMP001", PayrollStatus::Calculated)).await.unwrap();
        store.upsert_payroll_record(&record("EMP002", PayrollStatus::Paid)).await.unwrap();

        let removed = store.delete_attendance(march(), None).await.unwrap();
        assert_eq!(removed, 2);
        assert!(store.find_payroll_record("EMP001", march()).await.unwrap().is_none());
        assert!(store.find_payroll_record("EMP002", march()).await.unwrap().is_some());
    }

    #[tokio::test]
    async fn test_delete_attendance_for_one_employee() {
        let store = InMemoryStore::new();
        store
            .upsert_punches(&[punch("EMP001", date(2)), punch("EMP002", date(2))])
            .await
            .unwrap();

        let removed = store.delete_attendance(march(), Some("EMP001")).await.unwrap();
        assert_eq!(removed, 1);
        assert_eq!(
            store.punches_between("EMP002", date(1), date(31)).await.unwrap().len(),
            1
        );
    }
}
