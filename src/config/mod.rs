//! Configuration loading and management for the Payroll Generation Engine.
//!
//! This module loads the payroll policy (reporting-time defaults, grace
//! window, half-day threshold, weekly off days and the optional penalty
//! rules), batch generation settings and server settings from a YAML file.
//!
//! # Example
//!
//! ```no_run
//! use payroll_engine::config::ConfigLoader;
//!
//! let config = ConfigLoader::load("./config/payroll.yaml").unwrap();
//! println!("Half-day threshold: {}", config.policy().half_day_threshold);
//! ```

mod loader;
mod types;

pub use loader::ConfigLoader;
pub use types::{
    DEFAULT_DUTY_HOURS, DEFAULT_HALF_DAY_THRESHOLD, GenerationConfig, MissingPunchOut,
    PayrollConfig, PayrollPolicy, ServerConfig, default_reporting_time,
};
