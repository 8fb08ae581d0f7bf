//! Calculation logic for the Payroll Generation Engine.
//!
//! This module contains the per-employee pipeline: schedule resolution,
//! working calendar construction, day classification, the approved leave
//! overlay, the optional attendance penalties and payroll aggregation.
//! [`compute_employee_month`] runs them in order on prefetched data.

mod aggregator;
mod calendar;
mod classifier;
mod leave_overlay;
mod monthly;
mod penalties;
mod schedule;

pub use aggregator::{
    AggregationInput, AggregationResult, NET_SALARY_CLAMPED_WARNING, PER_DAY_RATE_BASIS,
    RateBasis, ZERO_WORKING_DAYS_WARNING, aggregate_payroll, per_day_rate, round_2dp,
};
pub use calendar::{
    EmployeeWorkingDays, MonthCalendar, NonWorkingReason, WorkingDaysSummary,
    build_month_calendar, employee_working_days,
};
pub use classifier::{
    ClassificationResult, DayClassification, DayStatus, OffDayWork, classify_day,
    off_day_overtime,
};
pub use leave_overlay::{LeaveOverlayResult, apply_leave_overlay};
pub use monthly::{
    EmployeeMonthInput, INVALID_PUNCH_ON_LEAVE_WARNING, PUNCH_BEFORE_JOINING_WARNING,
    PayrollComputation, compute_employee_month,
};
pub use penalties::{PenaltyResult, apply_late_allowance, mark_excess_absences};
pub use schedule::{
    ResolvedSchedule, SCHEDULE_MISSING_WARNING, ScheduleResolution, ScheduleSource, ScheduleTable,
    resolve_schedule,
};
