use crate::error::{AppError, Result};
use chrono::{DateTime, Datelike, Duration, NaiveDate, TimeZone, Timelike, Utc};
use std::str::FromStr;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Level {
    Hour,
    Day,
    Week,
}

impl FromStr for Level {
    type Err = AppError;

    fn from_str(s: &str) -> Result<Self> {
        match s {
            "hour" => Ok(Level::Hour),
            "day" => Ok(Level::Day),
            "week" => Ok(Level::Week),
            other => Err(AppError::InvalidArgument(format!(
                "normalize level must be one of hour, day, week; got {:?}",
                other
            ))),
        }
    }
}

/// Floor `date` to the start of its hour, day or week in the date's own
/// time zone. Weeks start on Sunday.
pub fn normalize_date<Tz: TimeZone>(date: &DateTime<Tz>, level: Level) -> Result<DateTime<Tz>> {
    let local = date.naive_local();
    let hour = match level {
        Level::Hour => local.hour(),
        Level::Day | Level::Week => 0,
    };

    let mut floored = local
        .date()
        .and_hms_opt(hour, 0, 0)
        .ok_or_else(|| AppError::OutOfRange(format!("cannot floor {}", local)))?;

    if level == Level::Week {
        let back = floored.weekday().num_days_from_sunday();
        floored -= Duration::days(i64::from(back));
    }

    date.timezone()
        .from_local_datetime(&floored)
        .earliest()
        .ok_or_else(|| {
            AppError::OutOfRange(format!("{} does not exist in the local time zone", floored))
        })
}

/// Calendar day a stored day record describes. Records are stamped at the
/// start of the following day, so the stamp is moved back one day in the
/// meter's local time before taking the date.
pub fn described_date<Tz: TimeZone>(timestamp: &DateTime<Utc>, tz: &Tz) -> NaiveDate {
    (timestamp.with_timezone(tz) - Duration::days(1)).date_naive()
}

pub fn month_name(month: u32) -> &'static str {
    const NAMES: [&str; 12] = [
        "January",
        "February",
        "March",
        "April",
        "May",
        "June",
        "July",
        "August",
        "September",
        "October",
        "November",
        "December",
    ];
    month
        .checked_sub(1)
        .and_then(|i| NAMES.get(i as usize))
        .copied()
        .unwrap_or("Unknown")
}
