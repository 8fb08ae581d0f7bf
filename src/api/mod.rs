//! HTTP API module for the Payroll Generation Engine.
//!
//! This module exposes payroll generation, payroll lookup, attendance
//! maintenance and the working-day calendar over JSON endpoints. Engine
//! errors are translated to HTTP responses here and nowhere else.

mod handlers;
mod request;
mod response;
mod state;

pub use handlers::create_router;
pub use request::{
    DeleteAttendanceRequest, DeleteAttendanceResponse, ImportAttendanceRequest,
    PendingAttendanceQuery, WorkingDaysQuery,
};
pub use response::{ApiError, ApiErrorResponse};
pub use state::AppState;
