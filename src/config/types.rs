//! Configuration types for payroll generation.
//!
//! This module contains the strongly-typed configuration structures that
//! are deserialized from the YAML configuration file. Every field has a
//! documented default so a partial file is valid.

use chrono::{NaiveTime, Weekday};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::error::{EngineError, EngineResult};

/// Reporting time used when an office/position pair has no schedule row (09:00).
pub fn default_reporting_time() -> NaiveTime {
    NaiveTime::from_hms_opt(9, 0, 0).unwrap_or_default()
}

/// Duty length used when an office/position pair has no schedule row.
pub const DEFAULT_DUTY_HOURS: Decimal = Decimal::from_parts(8, 0, 0, false, 0);

/// Fraction of duty hours below which a worked day is a half day.
pub const DEFAULT_HALF_DAY_THRESHOLD: Decimal = Decimal::from_parts(5, 0, 0, false, 1);

/// How a day with a punch-in but no punch-out is classified.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MissingPunchOut {
    /// Credit the day as a half day with zero worked hours.
    #[default]
    HalfDay,
    /// Treat the day as absent.
    Absent,
}

/// Attendance and salary policy constants.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PayrollPolicy {
    /// Reporting time applied when no schedule row exists.
    pub default_reporting_time: NaiveTime,
    /// Duty hours applied when no schedule row exists.
    pub default_duty_hours: Decimal,
    /// Minutes after reporting time before a punch-in counts as late.
    pub grace_minutes: u32,
    /// Fraction of duty hours below which a worked day is a half day.
    pub half_day_threshold: Decimal,
    /// Days of the week that are never working days.
    pub weekly_off_days: Vec<Weekday>,
    /// Classification of a punch-in without a punch-out.
    pub missing_punch_out: MissingPunchOut,
    /// Count hours punched on holidays and weekly off days as overtime.
    pub count_off_day_work_as_overtime: bool,
    /// Late days tolerated per month before further late days become half days.
    pub late_days_allowed: Option<u32>,
    /// Consecutive absent days tolerated before further days are excess leave.
    pub absence_streak_allowance: Option<u32>,
    /// Per-day-rate multiple charged for each excess leave day.
    pub excess_absence_multiplier: Decimal,
}

impl Default for PayrollPolicy {
    fn default() -> Self {
        Self {
            default_reporting_time: default_reporting_time(),
            default_duty_hours: DEFAULT_DUTY_HOURS,
            grace_minutes: 0,
            half_day_threshold: DEFAULT_HALF_DAY_THRESHOLD,
            weekly_off_days: vec![Weekday::Sun],
            missing_punch_out: MissingPunchOut::default(),
            count_off_day_work_as_overtime: true,
            late_days_allowed: None,
            absence_streak_allowance: None,
            excess_absence_multiplier: Decimal::new(2, 0),
        }
    }
}

impl PayrollPolicy {
    /// Checks the policy values are usable.
    pub fn validate(&self) -> EngineResult<()> {
        if self.default_duty_hours <= Decimal::ZERO || self.default_duty_hours > Decimal::new(24, 0) {
            return Err(invalid(format!(
                "default_duty_hours must be within (0, 24], got {}",
                self.default_duty_hours
            )));
        }
        if self.half_day_threshold < Decimal::ZERO || self.half_day_threshold > Decimal::ONE {
            return Err(invalid(format!(
                "half_day_threshold must be within [0, 1], got {}",
                self.half_day_threshold
            )));
        }
        if self.weekly_off_days.len() >= 7 {
            return Err(invalid("weekly_off_days leaves no working day in the week"));
        }
        if self.excess_absence_multiplier < Decimal::ONE {
            return Err(invalid(format!(
                "excess_absence_multiplier must be at least 1, got {}",
                self.excess_absence_multiplier
            )));
        }
        Ok(())
    }

    /// Returns true if `weekday` is a weekly off day.
    pub fn is_weekly_off(&self, weekday: Weekday) -> bool {
        self.weekly_off_days.contains(&weekday)
    }
}

/// Batch execution settings for the generation orchestrator.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct GenerationConfig {
    /// Maximum number of employees computed concurrently.
    pub max_concurrency: usize,
    /// Extra attempts made after a persistence failure.
    pub persistence_retries: u32,
    /// Delay before each persistence retry, in milliseconds.
    pub retry_backoff_ms: u64,
}

impl Default for GenerationConfig {
    fn default() -> Self {
        Self {
            max_concurrency: 8,
            persistence_retries: 1,
            retry_backoff_ms: 200,
        }
    }
}

/// HTTP server settings for the service binary.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ServerConfig {
    /// Address the HTTP server binds to.
    pub bind_address: String,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            bind_address: "127.0.0.1:8080".to_string(),
        }
    }
}

/// The complete engine configuration.
///
/// Constructed explicitly and handed to [`crate::engine::PayrollEngine`];
/// nothing in the engine reads process-wide state.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct PayrollConfig {
    /// Attendance and salary policy.
    pub policy: PayrollPolicy,
    /// Batch execution settings.
    pub generation: GenerationConfig,
    /// HTTP server settings.
    pub server: ServerConfig,
}

impl PayrollConfig {
    /// Checks every section.
    pub fn validate(&self) -> EngineResult<()> {
        self.policy.validate()?;
        if self.generation.max_concurrency == 0 {
            return Err(invalid("generation.max_concurrency must be at least 1"));
        }
        Ok(())
    }
}

fn invalid(message: impl Into<String>) -> EngineError {
    EngineError::InvalidConfig {
        message: message.into(),
    }
}
