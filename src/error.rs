//! Error types for the Payroll Generation Engine.
//!
//! This module provides the closed set of error kinds that the engine's
//! components return. They are mapped to transport-level responses only at
//! the outer boundary (see [`crate::api`]).

use chrono::NaiveDate;
use thiserror::Error;

/// The main error type for the Payroll Generation Engine.
///
/// A missing schedule and a month with zero working days are deliberately
/// absent from this enum: both are valid, if degenerate, inputs and surface
/// as audit warnings and record anomalies instead.
///
/// # Example
///
/// ```
/// use payroll_engine::error::EngineError;
///
/// let error = EngineError::ImmutableRecordConflict {
///     employee_id: "EMP001".to_string(),
///     year: 2026,
///     month: 3,
/// };
/// assert_eq!(
///     error.to_string(),
///     "Payroll record for 'EMP001' in 2026-03 is paid and cannot be regenerated"
/// );
/// ```
#[derive(Debug, Clone, PartialEq, Error)]
pub enum EngineError {
    /// Configuration file was not found at the specified path.
    #[error("Configuration file not found: {path}")]
    ConfigNotFound {
        /// The path that was not found.
        path: String,
    },

    /// Configuration file could not be parsed.
    #[error("Failed to parse configuration file '{path}': {message}")]
    ConfigParseError {
        /// The path to the file that failed to parse.
        path: String,
        /// A description of the parse error.
        message: String,
    },

    /// Configuration parsed but holds values the engine cannot work with.
    #[error("Invalid configuration: {message}")]
    InvalidConfig {
        /// A description of the offending value.
        message: String,
    },

    /// An input row or field was missing or malformed.
    #[error("Invalid input field '{field}': {message}")]
    InputData {
        /// The field that was invalid.
        field: String,
        /// A description of what made the field invalid.
        message: String,
    },

    /// A punch record was internally inconsistent.
    #[error("Invalid punch for '{employee_id}' on {date}: {message}")]
    InvalidPunch {
        /// The employee the punch belongs to.
        employee_id: String,
        /// The date of the punch.
        date: NaiveDate,
        /// A description of the inconsistency.
        message: String,
    },

    /// An attempt was made to regenerate a payroll record that is already paid.
    #[error("Payroll record for '{employee_id}' in {year}-{month:02} is paid and cannot be regenerated")]
    ImmutableRecordConflict {
        /// The employee whose record is paid.
        employee_id: String,
        /// The payroll year.
        year: i32,
        /// The payroll month (1-12).
        month: u32,
    },

    /// The storage layer failed.
    #[error("Persistence error: {message}")]
    Persistence {
        /// A description of the storage failure.
        message: String,
    },

    /// The employee does not exist in the directory.
    #[error("Employee not found: {employee_id}")]
    EmployeeNotFound {
        /// The employee identifier that was not found.
        employee_id: String,
    },

    /// No payroll record exists for the employee and month.
    #[error("Payroll record not found for '{employee_id}' in {year}-{month:02}")]
    PayrollRecordNotFound {
        /// The employee identifier.
        employee_id: String,
        /// The payroll year.
        year: i32,
        /// The payroll month (1-12).
        month: u32,
    },

    /// A month, year or date range was out of bounds.
    #[error("Invalid period: {message}")]
    InvalidPeriod {
        /// A description of what made the period invalid.
        message: String,
    },
}

impl EngineError {
    /// Returns a stable, machine-readable code for the error kind.
    pub fn code(&self) -> &'static str {
        match self {
            EngineError::ConfigNotFound { .. }
            | EngineError::ConfigParseError { .. }
            | EngineError::InvalidConfig { .. } => "CONFIG_ERROR",
            EngineError::InputData { .. } | EngineError::InvalidPunch { .. } => "INPUT_DATA_ERROR",
            EngineError::ImmutableRecordConflict { .. } => "IMMUTABLE_RECORD_CONFLICT",
            EngineError::Persistence { .. } => "PERSISTENCE_ERROR",
            EngineError::EmployeeNotFound { .. } => "EMPLOYEE_NOT_FOUND",
            EngineError::PayrollRecordNotFound { .. } => "PAYROLL_RECORD_NOT_FOUND",
            EngineError::InvalidPeriod { .. } => "INVALID_PERIOD",
        }
    }

    /// Returns true for storage failures worth a retry.
    pub fn is_retryable(&self) -> bool {
        matches!(self, EngineError::Persistence { .. })
    }
}

/// A type alias for Results that return EngineError.
pub type EngineResult<T> = Result<T, EngineError>;
