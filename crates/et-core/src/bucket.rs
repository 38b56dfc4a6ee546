//! Time bucket generation.
//!
//! Buckets are contiguous half-open intervals covering a date range. Day steps
//! advance the wall clock literally; month and year steps clamp to the end of
//! short months and always re-anchor to the day-of-month of the range start.
//!
//! Calendar arithmetic happens on local wall-clock time in the time zone of the
//! range start. Each boundary is then resolved back to an instant, so a daily
//! bucket spanning a DST change is 23 or 25 hours long.

use std::fmt;
use std::num::NonZeroU32;
use std::str::FromStr;

use chrono::{DateTime, Datelike, Days, LocalResult, NaiveDateTime, TimeDelta, TimeZone, Utc};
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::calendar::add_months_anchored;
use crate::types::ValidationError;

/// Errors from bucket generation.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum BucketError {
    /// A year, month or day delta was negative.
    #[error("all deltas must be nonnegative (years={years}, months={months}, days={days})")]
    NegativeDelta { years: i32, months: i32, days: i32 },

    /// Zero, two or three deltas were nonzero.
    #[error("exactly one of the year, month and day deltas must be nonzero")]
    AmbiguousGranularity,

    /// The range ends before it starts.
    #[error("end {end} must be later than or equal to start {start}")]
    InvertedRange {
        start: DateTime<Utc>,
        end: DateTime<Utc>,
    },

    /// A bucket boundary falls outside the representable date range.
    #[error("bucket boundary after {after} is out of range")]
    DateOutOfRange { after: NaiveDateTime },

    /// A bucket boundary does not exist in the time zone (DST gap).
    #[error("local time {time} does not exist in the time zone")]
    NonexistentLocalTime { time: NaiveDateTime },
}

/// A half-open time interval `[start, end)`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct TimeBucket {
    pub start: DateTime<Utc>,
    pub end: DateTime<Utc>,
}

/// The length of one bucket.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Step {
    Days(NonZeroU32),
    Months(NonZeroU32),
    Years(NonZeroU32),
}

impl Step {
    /// Builds a step from three deltas of which exactly one must be nonzero.
    pub fn from_deltas(years: i32, months: i32, days: i32) -> Result<Self, BucketError> {
        let (Ok(y), Ok(m), Ok(d)) = (
            u32::try_from(years),
            u32::try_from(months),
            u32::try_from(days),
        ) else {
            return Err(BucketError::NegativeDelta {
                years,
                months,
                days,
            });
        };

        match (NonZeroU32::new(y), NonZeroU32::new(m), NonZeroU32::new(d)) {
            (Some(n), None, None) => Ok(Self::Years(n)),
            (None, Some(n), None) => Ok(Self::Months(n)),
            (None, None, Some(n)) => Ok(Self::Days(n)),
            _ => Err(BucketError::AmbiguousGranularity),
        }
    }

    /// Advances `from` by one step, clamping month/year steps against `anchor_day`.
    fn advance(self, from: NaiveDateTime, anchor_day: u32) -> Option<NaiveDateTime> {
        let months = match self {
            Self::Days(n) => return from.checked_add_days(Days::new(u64::from(n.get()))),
            Self::Months(n) => i64::from(n.get()),
            Self::Years(n) => i64::from(n.get()) * 12,
        };
        add_months_anchored(from.date(), months, anchor_day).map(|date| date.and_time(from.time()))
    }
}

impl fmt::Display for Step {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Days(n) => write!(f, "{n} day(s)"),
            Self::Months(n) => write!(f, "{n} month(s)"),
            Self::Years(n) => write!(f, "{n} year(s)"),
        }
    }
}

/// Named bucket sizes offered to users.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Granularity {
    #[default]
    Day,
    Week,
    Month,
    Quarter,
    Year,
}

impl Granularity {
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Day => "day",
            Self::Week => "week",
            Self::Month => "month",
            Self::Quarter => "quarter",
            Self::Year => "year",
        }
    }

    /// The step that produces buckets of this size.
    #[must_use]
    pub const fn step(self) -> Step {
        match self {
            Self::Day => Step::Days(NonZeroU32::MIN),
            Self::Week => Step::Days(NonZeroU32::new(7).unwrap()),
            Self::Month => Step::Months(NonZeroU32::MIN),
            Self::Quarter => Step::Months(NonZeroU32::new(3).unwrap()),
            Self::Year => Step::Years(NonZeroU32::MIN),
        }
    }
}

impl fmt::Display for Granularity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl FromStr for Granularity {
    type Err = ValidationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "day" => Ok(Self::Day),
            "week" => Ok(Self::Week),
            "month" => Ok(Self::Month),
            "quarter" => Ok(Self::Quarter),
            "year" => Ok(Self::Year),
            _ => Err(ValidationError::InvalidGranularity {
                value: s.to_string(),
            }),
        }
    }
}

/// Resolves a local wall-clock time to an instant.
///
/// Ambiguous times (DST fall-back) take the earlier instant; times inside a
/// spring-forward gap move one hour later.
pub fn resolve_local<Tz: TimeZone>(
    tz: &Tz,
    local: NaiveDateTime,
) -> Result<DateTime<Utc>, BucketError> {
    match tz.from_local_datetime(&local) {
        LocalResult::Single(dt) | LocalResult::Ambiguous(dt, _) => Ok(dt.with_timezone(&Utc)),
        LocalResult::None => local
            .checked_add_signed(TimeDelta::hours(1))
            .and_then(|shifted| tz.from_local_datetime(&shifted).earliest())
            .map(|dt| dt.with_timezone(&Utc))
            .ok_or(BucketError::NonexistentLocalTime { time: local }),
    }
}

/// Generates contiguous buckets from `start` until one begins after `end`.
///
/// `end` is inclusive: `start == end` yields exactly one bucket. The last bucket
/// is not truncated and may extend past `end`.
pub fn generate_buckets<Tz: TimeZone>(
    start: &DateTime<Tz>,
    end: &DateTime<Tz>,
    step: Step,
) -> Result<Vec<TimeBucket>, BucketError> {
    let start_utc = start.with_timezone(&Utc);
    let end_utc = end.with_timezone(&Utc);
    if end_utc < start_utc {
        return Err(BucketError::InvertedRange {
            start: start_utc,
            end: end_utc,
        });
    }

    let tz = start.timezone();
    let origin = start.naive_local();
    let anchor_day = origin.day();

    let mut buckets = Vec::new();
    let mut cursor_local = origin;
    let mut cursor = start_utc;
    while cursor <= end_utc {
        let next_local = step
            .advance(cursor_local, anchor_day)
            .ok_or(BucketError::DateOutOfRange {
                after: cursor_local,
            })?;
        let next = resolve_local(&tz, next_local)?;
        buckets.push(TimeBucket {
            start: cursor,
            end: next,
        });
        cursor_local = next_local;
        cursor = next;
    }

    tracing::debug!(count = buckets.len(), %step, "generated time buckets");
    Ok(buckets)
}

/// Generates buckets from a year/month/day delta triple.
///
/// Exactly one delta must be positive; see [`Step::from_deltas`].
pub fn generate_buckets_from_deltas<Tz: TimeZone>(
    start: &DateTime<Tz>,
    end: &DateTime<Tz>,
    years: i32,
    months: i32,
    days: i32,
) -> Result<Vec<TimeBucket>, BucketError> {
    let step = Step::from_deltas(years, months, days)?;
    generate_buckets(start, end, step)
}
