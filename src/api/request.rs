//! Request types for the Payroll Generation Engine API.
//!
//! Generation requests reuse [`crate::engine::GenerationRequest`] directly;
//! the types here cover the attendance and calendar endpoints.

use serde::{Deserialize, Serialize};

use crate::error::EngineResult;
use crate::ingest::RawPunchRow;
use crate::models::PayrollMonth;

/// Body of `POST /attendance/delete`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DeleteAttendanceRequest {
    /// The calendar year.
    pub year: i32,
    /// The calendar month.
    pub month: u32,
    /// Restricts the deletion to one employee.
    #[serde(default)]
    pub employee_id: Option<String>,
}

impl DeleteAttendanceRequest {
    /// The validated month.
    pub fn period(&self) -> EngineResult<PayrollMonth> {
        PayrollMonth::new(self.year, self.month)
    }
}

/// Body of `POST /attendance/import`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ImportAttendanceRequest {
    /// The rows to import.
    pub rows: Vec<RawPunchRow>,
}

/// Query of `GET /attendance/pending`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PendingAttendanceQuery {
    /// The employee.
    pub employee_id: String,
    /// The calendar year.
    pub year: i32,
    /// The calendar month.
    pub month: u32,
}

impl PendingAttendanceQuery {
    /// The validated month.
    pub fn period(&self) -> EngineResult<PayrollMonth> {
        PayrollMonth::new(self.year, self.month)
    }
}

/// Query of `GET /calendar/working-days`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WorkingDaysQuery {
    /// The calendar year.
    pub year: i32,
    /// The calendar month.
    pub month: u32,
    /// Applies the office's holidays as well as company-wide ones.
    #[serde(default)]
    pub office_id: Option<String>,
}

impl WorkingDaysQuery {
    /// The validated month.
    pub fn period(&self) -> EngineResult<PayrollMonth> {
        PayrollMonth::new(self.year, self.month)
    }
}

/// Response of `POST /attendance/delete`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DeleteAttendanceResponse {
    /// Punch records removed.
    pub deleted_records: u64,
}
