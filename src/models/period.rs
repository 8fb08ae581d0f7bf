//! Payroll month model.
//!
//! A [`PayrollMonth`] is the unit of payroll generation. It is validated on
//! construction so downstream date arithmetic never has to re-check bounds.

use std::fmt;

use chrono::{Datelike, Days, NaiveDate};
use serde::{Deserialize, Serialize};

use crate::error::{EngineError, EngineResult};

/// Earliest year accepted for payroll processing.
pub const MIN_PAYROLL_YEAR: i32 = 2000;

/// Latest year accepted for payroll processing.
pub const MAX_PAYROLL_YEAR: i32 = 2100;

/// Wire shape of a [`PayrollMonth`].
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
struct MonthParts {
    year: i32,
    month: u32,
}

/// A validated calendar month (year 2000-2100, month 1-12).
///
/// # Example
///
/// ```
/// use payroll_engine::models::PayrollMonth;
/// use chrono::NaiveDate;
///
/// let month = PayrollMonth::new(2026, 2).unwrap();
/// assert_eq!(month.days_in_month(), 28);
/// assert_eq!(month.last_day(), NaiveDate::from_ymd_opt(2026, 2, 28).unwrap());
/// assert_eq!(month.to_string(), "2026-02");
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "MonthParts", into = "MonthParts")]
pub struct PayrollMonth {
    year: i32,
    month: u32,
    first_day: NaiveDate,
    last_day: NaiveDate,
}

impl PayrollMonth {
    /// Creates a payroll month, rejecting out-of-range years and months.
    pub fn new(year: i32, month: u32) -> EngineResult<Self> {
        if !(MIN_PAYROLL_YEAR..=MAX_PAYROLL_YEAR).contains(&year) || !(1..=12).contains(&month) {
            return Err(EngineError::InvalidPeriod {
                message: format!("invalid year or month: {year}-{month:02}"),
            });
        }

        let invalid = || EngineError::InvalidPeriod {
            message: format!("cannot resolve calendar for {year}-{month:02}"),
        };
        let first_day = NaiveDate::from_ymd_opt(year, month, 1).ok_or_else(invalid)?;
        let next_first = if month == 12 {
            NaiveDate::from_ymd_opt(year + 1, 1, 1)
        } else {
            NaiveDate::from_ymd_opt(year, month + 1, 1)
        }
        .ok_or_else(invalid)?;
        let last_day = next_first.pred_opt().ok_or_else(invalid)?;

        Ok(Self {
            year,
            month,
            first_day,
            last_day,
        })
    }

    /// Returns the month containing `date`.
    pub fn containing(date: NaiveDate) -> EngineResult<Self> {
        Self::new(date.year(), date.month())
    }

    /// Returns every month touched by the inclusive range `from..=to`.
    pub fn months_between(from: NaiveDate, to: NaiveDate) -> EngineResult<Vec<Self>> {
        if to < from {
            return Err(EngineError::InvalidPeriod {
                message: format!("range end {to} is before range start {from}"),
            });
        }

        let last = Self::containing(to)?;
        let mut current = Self::containing(from)?;
        let mut months = vec![current];
        while current < last {
            current = current.next()?;
            months.push(current);
        }
        Ok(months)
    }

    /// The calendar year.
    pub fn year(&self) -> i32 {
        self.year
    }

    /// The calendar month (1-12).
    pub fn month(&self) -> u32 {
        self.month
    }

    /// The first day of the month.
    pub fn first_day(&self) -> NaiveDate {
        self.first_day
    }

    /// The last day of the month.
    pub fn last_day(&self) -> NaiveDate {
        self.last_day
    }

    /// Number of calendar days in the month.
    pub fn days_in_month(&self) -> u32 {
        self.last_day.day()
    }

    /// Returns true if `date` falls inside this month.
    pub fn contains(&self, date: NaiveDate) -> bool {
        date >= self.first_day && date <= self.last_day
    }

    /// Iterates every calendar date of the month in ascending order.
    pub fn dates(&self) -> impl Iterator<Item = NaiveDate> + use<> {
        let first = self.first_day;
        (0..u64::from(self.days_in_month())).filter_map(move |offset| first.checked_add_days(Days::new(offset)))
    }

    /// Returns the following month.
    pub fn next(&self) -> EngineResult<Self> {
        if self.month == 12 {
            Self::new(self.year + 1, 1)
        } else {
            Self::new(self.year, self.month + 1)
        }
    }
}

impl fmt::Display for PayrollMonth {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}-{:02}", self.year, self.month)
    }
}

impl TryFrom<MonthParts> for PayrollMonth {
    type Error = EngineError;

    fn try_from(parts: MonthParts) -> Result<Self, Self::Error> {
        Self::new(parts.year, parts.month)
    }
}

impl From<PayrollMonth> for MonthParts {
    fn from(month: PayrollMonth) -> Self {
        MonthParts {
            year: month.year,
            month: month.month,
        }
    }
}
