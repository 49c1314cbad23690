//! Named date ranges relative to a reference day.

use crate::aggregate::granularity::{
    end_of_month, end_of_week, end_of_year, start_of_month, start_of_week, start_of_year,
};
use chrono::{Days, Months, NaiveDate};
use serde::{Deserialize, Serialize};

/// Preset aggregation range.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PeriodTemplate {
    #[default]
    Last7Days,
    ThisWeek,
    LastWeek,
    ThisMonth,
    LastMonth,
    ThisYear,
    LastYear,
    /// User-picked range; has no preset bounds.
    Custom,
}

impl PeriodTemplate {
    /// Inclusive `(start, end)` for `today`; `None` for `Custom`.
    pub fn resolve(self, today: NaiveDate) -> Option<(NaiveDate, NaiveDate)> {
        let range = match self {
            Self::Last7Days => (today.checked_sub_days(Days::new(7))?, today),
            Self::ThisWeek => (start_of_week(today), end_of_week(today)),
            Self::LastWeek => {
                let day = today.checked_sub_days(Days::new(7))?;
                (start_of_week(day), end_of_week(day))
            }
            Self::ThisMonth => (start_of_month(today), end_of_month(today)),
            Self::LastMonth => {
                let day = start_of_month(today).checked_sub_months(Months::new(1))?;
                (day, end_of_month(day))
            }
            Self::ThisYear => (start_of_year(today), end_of_year(today)),
            Self::LastYear => {
                let day = start_of_year(today).checked_sub_months(Months::new(12))?;
                (day, end_of_year(day))
            }
            Self::Custom => return None,
        };
        Some(range)
    }
}
