//! Calendar date parsing and the reporting windows used by the dashboard.

use anyhow::bail;
use chrono::{Datelike, Days, Local, NaiveDate};
use schemars::JsonSchema;
use serde::{Deserialize, Deserializer, Serialize};

use crate::Result;

const ISO_FORMAT: &str = "%Y-%m-%d";
const DAY_MONTH_YEAR_FORMAT: &str = "%d/%m/%Y";

/// Parses a date written either as `2025-01-31` or as `31/1/2025`.
pub fn parse_date(s: &str) -> Result<NaiveDate> {
    let s = s.trim();
    if let Ok(date) = NaiveDate::parse_from_str(s, ISO_FORMAT) {
        return Ok(date);
    }
    if let Ok(date) = NaiveDate::parse_from_str(s, DAY_MONTH_YEAR_FORMAT) {
        return Ok(date);
    }
    bail!("Unable to parse '{s}' as a date, expected YYYY-MM-DD or D/M/YYYY")
}

/// Deserializes a date with `parse_date`, so that tool parameters accept the same forms as the
/// command line.
pub(crate) fn deserialize_date<'de, D>(
    deserializer: D,
) -> std::result::Result<NaiveDate, D::Error>
where
    D: Deserializer<'de>,
{
    let s = String::deserialize(deserializer)?;
    parse_date(&s).map_err(|e| serde::de::Error::custom(format!("{e:#}")))
}

pub(crate) fn deserialize_optional_date<'de, D>(
    deserializer: D,
) -> std::result::Result<Option<NaiveDate>, D::Error>
where
    D: Deserializer<'de>,
{
    match Option::<String>::deserialize(deserializer)? {
        Some(s) if !s.trim().is_empty() => parse_date(&s)
            .map(Some)
            .map_err(|e| serde::de::Error::custom(format!("{e:#}"))),
        _ => Ok(None),
    }
}

/// Formats a date the way it is stored in the database.
pub(crate) fn format_date(date: NaiveDate) -> String {
    date.format(ISO_FORMAT).to_string()
}

/// Today's date in the local timezone.
pub fn today() -> NaiveDate {
    Local::now().date_naive()
}

/// A reporting window relative to today.
#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    Hash,
    Default,
    Serialize,
    Deserialize,
    JsonSchema,
    clap::ValueEnum,
)]
#[serde(rename_all = "snake_case")]
pub enum TimeRange {
    Day,
    /// Monday through Sunday of the current week.
    Week,
    Month,
    Year,
    #[default]
    All,
}

serde_plain::derive_display_from_serialize!(TimeRange);
serde_plain::derive_fromstr_from_deserialize!(TimeRange);

impl TimeRange {
    /// Returns the inclusive `(first, last)` days of the window containing `today`, or `None` for
    /// an unbounded window.
    pub fn bounds(&self, today: NaiveDate) -> Option<(NaiveDate, NaiveDate)> {
        match self {
            TimeRange::Day => Some((today, today)),
            TimeRange::Week => {
                let offset = u64::from(today.weekday().num_days_from_monday());
                let monday = today.checked_sub_days(Days::new(offset))?;
                let sunday = monday.checked_add_days(Days::new(6))?;
                Some((monday, sunday))
            }
            TimeRange::Month => {
                let first = today.with_day(1)?;
                let next_month = if today.month() == 12 {
                    NaiveDate::from_ymd_opt(today.year() + 1, 1, 1)?
                } else {
                    NaiveDate::from_ymd_opt(today.year(), today.month() + 1, 1)?
                };
                Some((first, next_month.pred_opt()?))
            }
            TimeRange::Year => Some((
                NaiveDate::from_ymd_opt(today.year(), 1, 1)?,
                NaiveDate::from_ymd_opt(today.year(), 12, 31)?,
            )),
            TimeRange::All => None,
        }
    }

    /// Returns true if `date` falls within the window containing `today`.
    pub fn contains(&self, date: NaiveDate, today: NaiveDate) -> bool {
        match self.bounds(today) {
            Some((first, last)) => first <= date && date <= last,
            None => true,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ymd(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    #[test]
    fn test_parse_iso() {
        assert_eq!(parse_date("2025-01-31").unwrap(), ymd(2025, 1, 31));
    }

    #[test]
    fn test_parse_day_month_year() {
        assert_eq!(parse_date("5/3/2025").unwrap(), ymd(2025, 3, 5));
        assert_eq!(parse_date(" 15/12/2024 ").unwrap(), ymd(2024, 12, 15));
    }

    #[test]
    fn test_parse_invalid() {
        assert!(parse_date("Pilih Tanggal").is_err());
        assert!(parse_date("2025-02-30").is_err());
    }

    #[test]
    fn test_week_bounds() {
        // 2025-01-15 is a Wednesday
        let (first, last) = TimeRange::Week.bounds(ymd(2025, 1, 15)).unwrap();
        assert_eq!(first, ymd(2025, 1, 13));
        assert_eq!(last, ymd(2025, 1, 19));
    }

    #[test]
    fn test_month_bounds_december() {
        let (first, last) = TimeRange::Month.bounds(ymd(2024, 12, 10)).unwrap();
        assert_eq!(first, ymd(2024, 12, 1));
        assert_eq!(last, ymd(2024, 12, 31));
    }

    #[test]
    fn test_month_bounds_leap_february() {
        let (_, last) = TimeRange::Month.bounds(ymd(2024, 2, 10)).unwrap();
        assert_eq!(last, ymd(2024, 2, 29));
    }

    #[test]
    fn test_contains() {
        let today = ymd(2025, 6, 15);
        assert!(TimeRange::Day.contains(today, today));
        assert!(!TimeRange::Day.contains(ymd(2025, 6, 14), today));
        assert!(TimeRange::Year.contains(ymd(2025, 1, 1), today));
        assert!(!TimeRange::Year.contains(ymd(2024, 12, 31), today));
        assert!(TimeRange::All.contains(ymd(1999, 1, 1), today));
    }

    #[test]
    fn test_range_from_str() {
        assert_eq!("month".parse::<TimeRange>().unwrap(), TimeRange::Month);
        assert_eq!(TimeRange::All.to_string(), "all");
    }
}
