//! Core data models for the Payroll Generation Engine.
//!
//! These are the typed records exchanged with the storage layer and the
//! HTTP surface. Constructors validate required fields at the boundary so
//! the calculation modules can trust their inputs.

mod attendance;
mod audit;
mod employee;
mod holiday;
mod payroll_record;
mod period;
mod schedule;

pub use attendance::{ApprovedLeave, AttendancePunch};
pub use audit::{AuditStep, AuditTrace, AuditWarning, WarningSeverity};
pub use employee::Employee;
pub use holiday::{Holiday, HolidayCategory};
pub use payroll_record::{PayrollAnomaly, PayrollRecord, PayrollStatus};
pub use period::{MAX_PAYROLL_YEAR, MIN_PAYROLL_YEAR, PayrollMonth};
pub use schedule::OfficePositionSchedule;
