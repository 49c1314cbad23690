//! Bucket sizes and calendar helpers.
//!
//! Weeks are ISO weeks (Monday through Sunday).

use chrono::{Datelike, Days, Months, NaiveDate};
use serde::{Deserialize, Serialize};

/// Bucket size of an aggregated series.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Granularity {
    #[default]
    Day,
    Week,
    Month,
    Year,
}

/// Identity of the bucket a day falls into.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub(crate) struct BucketKey(i32, u32);

impl Granularity {
    /// Widens `[start, end]` to whole buckets.
    pub fn snap(self, start: NaiveDate, end: NaiveDate) -> (NaiveDate, NaiveDate) {
        match self {
            Self::Day => (start, end),
            Self::Week => (start_of_week(start), end_of_week(end)),
            Self::Month => (start_of_month(start), end_of_month(end)),
            Self::Year => (start_of_year(start), end_of_year(end)),
        }
    }

    pub(crate) fn bucket_key(self, day: NaiveDate) -> BucketKey {
        match self {
            Self::Day => BucketKey(day.year(), day.ordinal()),
            Self::Week => {
                let week = day.iso_week();
                BucketKey(week.year(), week.week())
            }
            Self::Month => BucketKey(day.year(), day.month()),
            Self::Year => BucketKey(day.year(), 0),
        }
    }

    /// Label of the bucket whose last walked day is `day`.
    ///
    /// Day `dd.mm`, week `dd.mm-dd` (Monday to Sunday), month `mm.yy`,
    /// year `yyyy`.
    pub fn label(self, day: NaiveDate) -> String {
        match self {
            Self::Day => day.format("%d.%m").to_string(),
            Self::Week => format!(
                "{}-{}",
                start_of_week(day).format("%d.%m"),
                end_of_week(day).format("%d")
            ),
            Self::Month => day.format("%m.%y").to_string(),
            Self::Year => day.format("%Y").to_string(),
        }
    }
}

pub fn start_of_week(day: NaiveDate) -> NaiveDate {
    let offset = u64::from(day.weekday().num_days_from_monday());
    day.checked_sub_days(Days::new(offset)).unwrap_or(day)
}

pub fn end_of_week(day: NaiveDate) -> NaiveDate {
    let start = start_of_week(day);
    start.checked_add_days(Days::new(6)).unwrap_or(start)
}

pub fn start_of_month(day: NaiveDate) -> NaiveDate {
    day.with_day(1).unwrap_or(day)
}

pub fn end_of_month(day: NaiveDate) -> NaiveDate {
    start_of_month(day)
        .checked_add_months(Months::new(1))
        .and_then(|next| next.pred_opt())
        .unwrap_or(day)
}

pub fn start_of_year(day: NaiveDate) -> NaiveDate {
    NaiveDate::from_ymd_opt(day.year(), 1, 1).unwrap_or(day)
}

pub fn end_of_year(day: NaiveDate) -> NaiveDate {
    NaiveDate::from_ymd_opt(day.year(), 12, 31).unwrap_or(day)
}
