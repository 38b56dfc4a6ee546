//! Gregorian calendar helpers for month and year steps.

use chrono::{Datelike, NaiveDate};

/// Returns true for leap years in the proleptic Gregorian calendar.
#[allow(clippy::cast_lossless)]
pub const fn is_leap_year(year: i32) -> bool {
    is_leap(year as i64)
}

const fn is_leap(year: i64) -> bool {
    (year % 4 == 0 && year % 100 != 0) || year % 400 == 0
}

/// Number of days in a month. January is month `0`.
///
/// Months past December roll over into the following years, which may lie
/// beyond `i32::MAX`.
#[allow(clippy::cast_lossless)]
pub const fn last_day_of_month(year: i32, month0: u32) -> u32 {
    let year = year as i64 + (month0 / 12) as i64;
    match month0 % 12 {
        1 if is_leap(year) => 29,
        1 => 28,
        3 | 5 | 8 | 10 => 30,
        _ => 31,
    }
}

/// Moves `date` by `months` calendar months, using `anchor_day` as the day of month.
///
/// If the target month is too short for `anchor_day`, the result is clamped to
/// the month's last day. Callers stepping repeatedly pass the same anchor each
/// time so that Jan 31 → Feb 28 → Mar 31 rather than drifting to Mar 28.
///
/// Returns `None` when the result is outside chrono's supported range.
pub fn add_months_anchored(date: NaiveDate, months: i64, anchor_day: u32) -> Option<NaiveDate> {
    let index = i64::from(date.year()) * 12 + i64::from(date.month0()) + months;
    let year = i32::try_from(index.div_euclid(12)).ok()?;
    let month0 = u32::try_from(index.rem_euclid(12)).ok()?;
    let day = anchor_day.clamp(1, last_day_of_month(year, month0));
    NaiveDate::from_ymd_opt(year, month0 + 1, day)
}
