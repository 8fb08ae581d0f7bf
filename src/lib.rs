//! Payroll Generation Engine
//!
//! This crate computes monthly payroll for fixed-salary employees from
//! punch attendance, office/position work schedules, holidays and approved
//! leave. Each working day is classified as present, late, half day, absent
//! or approved leave; the month is then rolled into a persisted payroll
//! record with deductions, overtime and an audit trace.

#![warn(missing_docs)]

pub mod api;
pub mod calculation;
pub mod config;
pub mod engine;
pub mod error;
pub mod ingest;
pub mod models;
pub mod store;
