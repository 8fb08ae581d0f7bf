//! Payroll aggregation functionality.
//!
//! This module folds a month of classified days into the persisted
//! [`PayrollRecord`]: day counts, deduction days, overtime, the per-day rate
//! and the salary figures.

use chrono::NaiveDate;
use rust_decimal::{Decimal, RoundingStrategy};
use serde::{Deserialize, Serialize};

use crate::config::PayrollPolicy;
use crate::models::{
    AuditStep, AuditWarning, Employee, PayrollAnomaly, PayrollMonth, PayrollRecord, PayrollStatus,
    WarningSeverity,
};

use super::classifier::{DayClassification, DayStatus};

/// Warning code emitted when the net salary had to be clamped at zero.
pub const NET_SALARY_CLAMPED_WARNING: &str = "NET_SALARY_CLAMPED";

/// Warning code emitted when the month has no working days.
pub const ZERO_WORKING_DAYS_WARNING: &str = "ZERO_WORKING_DAYS";

/// The divisor used to derive a per-day rate from the monthly salary.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RateBasis {
    /// Working days of the full month for the employee's office.
    MonthWorkingDays,
    /// Calendar days of the month.
    ///
    /// Available to [`per_day_rate`] callers; generation always uses
    /// [`PER_DAY_RATE_BASIS`].
    CalendarDays,
}

/// The rate basis every generation run uses.
pub const PER_DAY_RATE_BASIS: RateBasis = RateBasis::MonthWorkingDays;

/// Rounds a money or hours figure to 2 decimal places, midpoint away from zero.
pub fn round_2dp(value: Decimal) -> Decimal {
    value.round_dp_with_strategy(2, RoundingStrategy::MidpointAwayFromZero)
}

/// Derives the unrounded per-day rate for `monthly_salary`.
///
/// Returns zero when the divisor is zero.
///
/// # Example
///
/// ```
/// use payroll_engine::calculation::{RateBasis, per_day_rate};
/// use payroll_engine::models::PayrollMonth;
/// use rust_decimal::Decimal;
///
/// let month = PayrollMonth::new(2026, 3).unwrap();
/// let rate = per_day_rate(Decimal::new(26000, 0), RateBasis::MonthWorkingDays, 26, month);
/// assert_eq!(rate, Decimal::new(1000, 0));
/// ```
pub fn per_day_rate(
    monthly_salary: Decimal,
    basis: RateBasis,
    month_working_days: u32,
    period: PayrollMonth,
) -> Decimal {
    let divisor = match basis {
        RateBasis::MonthWorkingDays => month_working_days,
        RateBasis::CalendarDays => period.days_in_month(),
    };
    if divisor == 0 {
        Decimal::ZERO
    } else {
        monthly_salary / Decimal::from(divisor)
    }
}

/// Inputs to [`aggregate_payroll`].
#[derive(Debug, Clone)]
pub struct AggregationInput<'a> {
    /// The employee being paid.
    pub employee: &'a Employee,
    /// The payroll month.
    pub period: PayrollMonth,
    /// First day of the employee's window within the month.
    pub employment_start: NaiveDate,
    /// Classified working days of the employee's window, ascending.
    pub days: &'a [DayClassification],
    /// Overtime earned on non-working days.
    pub off_day_overtime: Decimal,
    /// Working days of the full month for the employee's office.
    pub month_working_days: u32,
}

/// The result of aggregating a month.
#[derive(Debug, Clone)]
pub struct AggregationResult {
    /// The payroll record, with status `calculated`.
    pub record: PayrollRecord,
    /// The audit step recording the figures.
    pub audit_step: AuditStep,
    /// Warnings raised while aggregating.
    pub warnings: Vec<AuditWarning>,
}

/// Aggregates classified days into a payroll record.
///
/// The figures satisfy
/// `present_days + 0.5 * half_days + leaves + deduction_days == working_days`
/// and the net salary is never negative.
pub fn aggregate_payroll(
    input: &AggregationInput<'_>,
    policy: &PayrollPolicy,
    step_number: u32,
) -> AggregationResult {
    let half = Decimal::new(5, 1);
    let count = |status: DayStatus| input.days.iter().filter(|d| d.status == status).count() as u32;

    let working_days = input.days.len() as u32;
    let present_days = input.days.iter().filter(|d| d.status.is_present()).count() as u32;
    let late_days = count(DayStatus::Late);
    let half_days = count(DayStatus::HalfDay);
    let absent_days = count(DayStatus::Absent);
    let leaves = count(DayStatus::ApprovedLeave);
    let excess_leaves = input.days.iter().filter(|d| d.excess_leave).count() as u32;

    let mut anomalies = Vec::new();
    let mut warnings = Vec::new();

    let credited =
        Decimal::from(present_days) + half * Decimal::from(half_days) + Decimal::from(leaves);
    let deduction_days = (Decimal::from(working_days) - credited).max(Decimal::ZERO);

    let overtime_hours = round_2dp(
        input.days.iter().map(|d| d.overtime_hours).sum::<Decimal>() + input.off_day_overtime,
    );

    let salary = input.employee.monthly_salary;
    let rate = per_day_rate(salary, PER_DAY_RATE_BASIS, input.month_working_days, input.period);

    let gross_salary = if input.month_working_days == 0 {
        anomalies.push(PayrollAnomaly::ZeroWorkingDays);
        warnings.push(AuditWarning::new(
            ZERO_WORKING_DAYS_WARNING,
            format!("{} has no working days, paying the full salary", input.period),
            WarningSeverity::Medium,
        ));
        salary
    } else if input.employment_start > input.period.first_day() {
        round_2dp(salary * Decimal::from(working_days) / Decimal::from(input.month_working_days))
    } else {
        salary
    };

    let excess_charge = Decimal::from(excess_leaves) * (policy.excess_absence_multiplier - Decimal::ONE);
    let deductions = round_2dp((deduction_days + excess_charge) * rate);
    let allowances = input.employee.allowances;

    let unclamped = gross_salary + allowances - deductions;
    let net_salary = if unclamped < Decimal::ZERO {
        anomalies.push(PayrollAnomaly::NetSalaryClamped);
        warnings.push(AuditWarning::new(
            NET_SALARY_CLAMPED_WARNING,
            format!(
                "Deductions of {} exceed gross {} plus allowances {}, net salary clamped to 0",
                deductions, gross_salary, allowances
            ),
            WarningSeverity::High,
        ));
        Decimal::ZERO
    } else {
        unclamped
    };

    let record = PayrollRecord {
        employee_id: input.employee.employee_id.clone(),
        period: input.period,
        working_days,
        present_days,
        half_days,
        late_days,
        absent_days,
        leaves,
        excess_leaves,
        deduction_days,
        overtime_hours,
        per_day_rate: round_2dp(rate),
        deductions,
        allowances: round_2dp(allowances),
        gross_salary: round_2dp(gross_salary),
        net_salary: round_2dp(net_salary),
        status: PayrollStatus::Calculated,
        anomalies,
    };

    let audit_step = AuditStep {
        step_number,
        rule_id: "payroll_aggregation".to_string(),
        rule_name: "Payroll Aggregation".to_string(),
        date: None,
        input: serde_json::json!({
            "monthly_salary": salary.normalize().to_string(),
            "allowances": allowances.normalize().to_string(),
            "working_days": working_days,
            "month_working_days": input.month_working_days,
            "rate_basis": PER_DAY_RATE_BASIS,
            "excess_absence_multiplier": policy.excess_absence_multiplier.normalize().to_string(),
        }),
        output: serde_json::json!({
            "present_days": present_days,
            "half_days": half_days,
            "late_days": late_days,
            "absent_days": absent_days,
            "leaves": leaves,
            "excess_leaves": excess_leaves,
            "deduction_days": deduction_days.normalize().to_string(),
            "per_day_rate": record.per_day_rate.to_string(),
            "deductions": record.deductions.to_string(),
            "gross_salary": record.gross_salary.to_string(),
            "net_salary": record.net_salary.to_string(),
        }),
        reasoning: format!(
            "{} deduction days at {} per day, net {} = gross {} + allowances {} - deductions {}",
            deduction_days.normalize(),
            record.per_day_rate,
            record.net_salary,
            record.gross_salary,
            record.allowances,
            record.deductions
        ),
    };

    AggregationResult {
        record,
        audit_step,
        warnings,
    }
}
