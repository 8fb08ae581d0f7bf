//! Attendance ingestion.
//!
//! Converts loosely formatted punch rows, as exported by attendance devices
//! and spreadsheets, into validated [`AttendancePunch`] records. Each row is
//! validated independently so one bad row never rejects a whole batch.

use std::collections::BTreeSet;

use chrono::{NaiveDate, NaiveTime};
use serde::{Deserialize, Serialize};

use crate::error::{EngineError, EngineResult};
use crate::models::AttendancePunch;

/// Accepted date layouts, tried in order.
const DATE_FORMATS: [&str; 4] = ["%Y-%m-%d", "%d/%m/%Y", "%d-%m-%Y", "%Y/%m/%d"];

/// Accepted time layouts, tried in order.
const TIME_FORMATS: [&str; 2] = ["%H:%M:%S", "%H:%M"];

/// One unvalidated punch row.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RawPunchRow {
    /// Employee code as written in the source.
    pub employee_id: String,
    /// Date in one of the accepted layouts.
    pub date: String,
    /// Punch-in time; empty or `00:00` means missing.
    #[serde(default)]
    pub punch_in: Option<String>,
    /// Punch-out time; empty or `00:00` means missing.
    #[serde(default)]
    pub punch_out: Option<String>,
}

impl RawPunchRow {
    /// Validates the row into a punch record.
    ///
    /// # Example
    ///
    /// ```
    /// use payroll_engine::ingest::RawPunchRow;
    ///
    /// let row = RawPunchRow {
    ///     employee_id: " EMP001 ".to_string(),
    ///     date: "02/03/2026".to_string(),
    ///     punch_in: Some("09:05".to_string()),
    ///     punch_out: Some("00:00".to_string()),
    /// };
    /// let punch = row.into_punch().unwrap();
    /// assert_eq!(punch.employee_id, "EMP001");
    /// assert_eq!(punch.date.to_string(), "2026-03-02");
    /// assert!(punch.punch_out.is_none());
    /// ```
    pub fn into_punch(self) -> EngineResult<AttendancePunch> {
        let date = parse_date(&self.date)?;
        let punch_in = parse_time("punch_in", self.punch_in.as_deref())?;
        let punch_out = parse_time("punch_out", self.punch_out.as_deref())?;
        AttendancePunch::new(self.employee_id.trim(), date, punch_in, punch_out)
    }
}

/// Parses a date in any accepted layout.
pub fn parse_date(value: &str) -> EngineResult<NaiveDate> {
    let value = value.trim();
    DATE_FORMATS
        .iter()
        .find_map(|format| NaiveDate::parse_from_str(value, format).ok())
        .ok_or_else(|| EngineError::InputData {
            field: "date".to_string(),
            message: format!("unrecognized date '{value}'"),
        })
}

/// Parses an optional punch time.
///
/// Blank values and midnight (`00:00`) are device placeholders for a
/// missing punch and yield `None`.
pub fn parse_time(field: &str, value: Option<&str>) -> EngineResult<Option<NaiveTime>> {
    let Some(value) = value.map(str::trim).filter(|v| !v.is_empty()) else {
        return Ok(None);
    };

    let time = TIME_FORMATS
        .iter()
        .find_map(|format| NaiveTime::parse_from_str(value, format).ok())
        .ok_or_else(|| EngineError::InputData {
            field: field.to_string(),
            message: format!("unrecognized time '{value}'"),
        })?;

    Ok((Some(time) != NaiveTime::from_hms_opt(0, 0, 0)).then_some(time))
}

/// A rejected row.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RowError {
    /// 1-based position of the row in the submitted batch.
    pub row: usize,
    /// Stable error code, see [`EngineError::code`].
    pub code: String,
    /// Human-readable description.
    pub message: String,
}

impl RowError {
    /// Builds a row error from an engine error.
    pub fn new(row: usize, error: &EngineError) -> Self {
        Self {
            row,
            code: error.code().to_string(),
            message: error.to_string(),
        }
    }
}

/// The outcome of parsing a batch.
#[derive(Debug, Clone, Default)]
pub struct ParsedRows {
    /// Valid punches with their 1-based row numbers.
    pub punches: Vec<(usize, AttendancePunch)>,
    /// Rows that failed validation.
    pub rejected: Vec<RowError>,
}

/// Parses a batch of rows.
///
/// A second row for an (employee, date) already seen in the batch is
/// rejected as an invalid punch.
pub fn parse_rows(rows: Vec<RawPunchRow>) -> ParsedRows {
    let mut parsed = ParsedRows::default();
    let mut seen = BTreeSet::new();

    for (index, raw) in rows.into_iter().enumerate() {
        let row = index + 1;
        match raw.into_punch() {
            Ok(punch) => {
                if !seen.insert((punch.employee_id.clone(), punch.date)) {
                    let error = EngineError::InvalidPunch {
                        employee_id: punch.employee_id.clone(),
                        date: punch.date,
                        message: "duplicate row for the same date".to_string(),
                    };
                    parsed.rejected.push(RowError::new(row, &error));
                    continue;
                }
                parsed.punches.push((row, punch));
            }
            Err(e) => parsed.rejected.push(RowError::new(row, &e)),
        }
    }

    parsed
}

/// Summary of an import.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ImportReport {
    /// Rows submitted.
    pub received: usize,
    /// Punches written.
    pub imported: u64,
    /// Rows rejected, in row order.
    pub rejected: Vec<RowError>,
}
