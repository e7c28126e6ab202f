//! Calendar helpers for report filters
//!
//! All boundaries are UTC and half-open: `start <= t < end`.

use chrono::{DateTime, Datelike, Duration, NaiveDate, TimeZone, Utc};

use super::{AppError, AppResult};

/// First instant of `year-month`
fn month_start(year: i32, month: u32) -> AppResult<DateTime<Utc>> {
    let date = NaiveDate::from_ymd_opt(year, month, 1)
        .ok_or_else(|| AppError::validation(format!("Invalid month: {}-{}", year, month)))?;
    Ok(Utc.from_utc_datetime(&date.and_time(chrono::NaiveTime::MIN)))
}

/// `[start, end)` covering a calendar month
pub fn month_range(year: i32, month: u32) -> AppResult<(DateTime<Utc>, DateTime<Utc>)> {
    let start = month_start(year, month)?;
    let end = if month == 12 {
        month_start(year + 1, 1)?
    } else {
        month_start(year, month + 1)?
    };
    Ok((start, end))
}

/// `[start, end)` covering a calendar year
pub fn year_range(year: i32) -> AppResult<(DateTime<Utc>, DateTime<Utc>)> {
    Ok((month_start(year, 1)?, month_start(year + 1, 1)?))
}

/// Range for optional `year` / `month` query filters
///
/// A month without a year uses the current year; no filters means no range.
pub fn period_range(
    year: Option<i32>,
    month: Option<u32>,
    now: DateTime<Utc>,
) -> AppResult<Option<(DateTime<Utc>, DateTime<Utc>)>> {
    match (year, month) {
        (None, None) => Ok(None),
        (Some(y), None) => year_range(y).map(Some),
        (y, Some(m)) => month_range(y.unwrap_or_else(|| now.year()), m).map(Some),
    }
}

/// Start of a trailing window of `days` ending at `now`
pub fn window_start(now: DateTime<Utc>, days: u32) -> DateTime<Utc> {
    now - Duration::days(i64::from(days))
}

/// Calendar month bucket key (`YYYY-MM`)
pub fn month_key(at: DateTime<Utc>) -> String {
    format!("{:04}-{:02}", at.year(), at.month())
}
