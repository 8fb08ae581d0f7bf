//! Holiday calendar model.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

/// The kind of holiday.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum HolidayCategory {
    /// A public or national holiday.
    Public,
    /// A company-declared day off.
    Company,
    /// A religious observance.
    Religious,
}

/// A non-working date.
///
/// Holidays without an office apply to every office; office-scoped holidays
/// only remove the date from that office's calendar.
///
/// # Example
///
/// ```
/// use payroll_engine::models::{Holiday, HolidayCategory};
/// use chrono::NaiveDate;
///
/// let holiday = Holiday {
///     date: NaiveDate::from_ymd_opt(2026, 12, 2).unwrap(),
///     name: "National Day".to_string(),
///     category: HolidayCategory::Public,
///     office_id: None,
/// };
/// assert!(holiday.applies_to("DXB"));
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Holiday {
    /// The holiday date.
    pub date: NaiveDate,
    /// The holiday name.
    pub name: String,
    /// The holiday category.
    pub category: HolidayCategory,
    /// Restricts the holiday to one office when set.
    #[serde(default)]
    pub office_id: Option<String>,
}

impl Holiday {
    /// Returns true if the holiday removes its date from `office_id`'s calendar.
    pub fn applies_to(&self, office_id: &str) -> bool {
        self.office_id.as_deref().is_none_or(|scoped| scoped == office_id)
    }
}
