//! Persistence boundary for the Payroll Generation Engine.
//!
//! The engine reads master data and attendance through [`PayrollStore`] and
//! writes payroll records back through it. [`InMemoryStore`] is the bundled
//! implementation used by the service binary and the tests.

mod memory;

use async_trait::async_trait;
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use crate::error::EngineResult;
use crate::models::{
    ApprovedLeave, AttendancePunch, Employee, Holiday, OfficePositionSchedule, PayrollMonth,
    PayrollRecord, PayrollStatus,
};

pub use memory::InMemoryStore;

/// Which employees a generation run covers.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", content = "value", rename_all = "snake_case")]
pub enum EmployeeScope {
    /// Every employee.
    All,
    /// Employees of one office.
    Office(String),
    /// An explicit list of employee ids.
    Employees(Vec<String>),
}

impl EmployeeScope {
    /// Returns true if `employee` falls within the scope.
    pub fn includes(&self, employee: &Employee) -> bool {
        match self {
            EmployeeScope::All => true,
            EmployeeScope::Office(office_id) => employee.office_id == *office_id,
            EmployeeScope::Employees(ids) => ids.contains(&employee.employee_id),
        }
    }
}

/// Storage operations the engine depends on.
///
/// Implementations must make [`PayrollStore::upsert_payroll_record`] refuse
/// to overwrite a record whose status is `paid`, returning
/// `ImmutableRecordConflict`. Transient failures are reported as
/// `Persistence` errors so the caller can retry them.
#[async_trait]
pub trait PayrollStore: Send + Sync {
    /// Lists employees within `scope`, ordered by employee id.
    async fn list_employees(&self, scope: &EmployeeScope) -> EngineResult<Vec<Employee>>;

    /// Looks up one employee.
    async fn find_employee(&self, employee_id: &str) -> EngineResult<Option<Employee>>;

    /// Lists every configured office/position schedule.
    async fn list_schedules(&self) -> EngineResult<Vec<OfficePositionSchedule>>;

    /// Lists holidays dated within `from..=to`.
    async fn holidays_between(&self, from: NaiveDate, to: NaiveDate) -> EngineResult<Vec<Holiday>>;

    /// Lists an employee's punches dated within `from..=to`, ascending.
    async fn punches_between(
        &self,
        employee_id: &str,
        from: NaiveDate,
        to: NaiveDate,
    ) -> EngineResult<Vec<AttendancePunch>>;

    /// Lists an employee's approved leaves dated within `from..=to`, ascending.
    async fn approved_leaves_between(
        &self,
        employee_id: &str,
        from: NaiveDate,
        to: NaiveDate,
    ) -> EngineResult<Vec<ApprovedLeave>>;

    /// Looks up the payroll record of an employee for a month.
    async fn find_payroll_record(
        &self,
        employee_id: &str,
        period: PayrollMonth,
    ) -> EngineResult<Option<PayrollRecord>>;

    /// Inserts or replaces the record keyed by (employee, month).
    async fn upsert_payroll_record(&self, record: &PayrollRecord) -> EngineResult<()>;

    /// Changes the status of an existing record.
    async fn set_payroll_status(
        &self,
        employee_id: &str,
        period: PayrollMonth,
        status: PayrollStatus,
    ) -> EngineResult<PayrollRecord>;

    /// Inserts or replaces punches keyed by (employee, date), returning how
    /// many rows were written.
    async fn upsert_punches(&self, punches: &[AttendancePunch]) -> EngineResult<u64>;

    /// Deletes the month's punches, for one employee or for everyone, along
    /// with the matching payroll records that are not paid. Returns the
    /// number of punches removed.
    async fn delete_attendance(
        &self,
        period: PayrollMonth,
        employee_id: Option<&str>,
    ) -> EngineResult<u64>;
}
