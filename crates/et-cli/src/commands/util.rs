//! Shared utilities for CLI commands.

use std::sync::LazyLock;

use anyhow::{Context, Result};
use chrono::{DateTime, Datelike, Days, NaiveDate, NaiveTime, TimeZone, Utc};
use et_core::calendar::add_months_anchored;
use et_core::resolve_local;
use regex::Regex;

/// Pre-compiled regex for relative date parsing.
static RELATIVE_DATE_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^(\d+)\s+(day|week|month|year)s?\s+ago$").unwrap());

/// Parse a date as ISO 8601 or relative to `today`.
///
/// Supports:
/// - ISO 8601: "2025-09-22"
/// - Named: "today", "yesterday"
/// - Relative: "3 days ago", "2 weeks ago", "1 month ago", "1 year ago"
///
/// Month and year offsets clamp to the end of short months, so "1 month ago"
/// on Mar 31 is Feb 28 (or 29).
pub fn parse_date(s: &str, today: NaiveDate) -> Result<NaiveDate> {
    let s = s.trim().to_ascii_lowercase();
    match s.as_str() {
        "today" => return Ok(today),
        "yesterday" => {
            return today
                .checked_sub_days(Days::new(1))
                .context("date out of range");
        }
        _ => {}
    }

    if let Ok(date) = NaiveDate::parse_from_str(&s, "%Y-%m-%d") {
        return Ok(date);
    }

    let Some(caps) = RELATIVE_DATE_RE.captures(&s) else {
        anyhow::bail!(
            "Invalid date: {s}. Use YYYY-MM-DD (e.g., 2025-09-22), 'today', or relative (e.g., '2 weeks ago')"
        );
    };

    let n: u32 = caps[1]
        .parse()
        .context("failed to parse number in relative date")?;

    let date = match &caps[2] {
        "day" => today.checked_sub_days(Days::new(u64::from(n))),
        "week" => today.checked_sub_days(Days::new(u64::from(n) * 7)),
        "month" => add_months_anchored(today, -i64::from(n), today.day()),
        "year" => add_months_anchored(today, -i64::from(n) * 12, today.day()),
        unit => anyhow::bail!("Unknown date unit: {unit}"),
    };
    date.with_context(|| format!("Relative date too far in the past: {s}"))
}

/// Today's date in `tz`.
pub fn today_in<Tz: TimeZone>(tz: &Tz) -> NaiveDate {
    Utc::now().with_timezone(tz).date_naive()
}

/// Midnight at the start of `date` in `tz`.
///
/// A midnight skipped by a DST change moves to the first valid time after it.
pub fn local_midnight<Tz: TimeZone>(tz: &Tz, date: NaiveDate) -> Result<DateTime<Tz>> {
    let instant = resolve_local(tz, date.and_time(NaiveTime::MIN))?;
    Ok(instant.with_timezone(tz))
}

/// Formats hours with up to two decimals, trimming trailing zeros.
pub fn format_hours(hours: f64) -> String {
    let formatted = format!("{hours:.2}");
    let trimmed = formatted.trim_end_matches('0').trim_end_matches('.');
    if trimmed == "-0" {
        "0".to_string()
    } else {
        trimmed.to_string()
    }
}
