//! Overlap math between two time intervals.
//!
//! Both intervals must be non-empty (`start < end`). The overlap is measured in
//! fractional hours with millisecond resolution.

use chrono::{DateTime, Utc};
use thiserror::Error;

const MILLIS_PER_HOUR: f64 = 3_600_000.0;

/// Errors from interval math.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum IntervalError {
    /// An interval's start is not strictly before its end.
    #[error("invalid interval: start {start} must be strictly earlier than end {end}")]
    InvalidInterval {
        start: DateTime<Utc>,
        end: DateTime<Utc>,
    },
}

fn check(start: DateTime<Utc>, end: DateTime<Utc>) -> Result<(), IntervalError> {
    if start >= end {
        return Err(IntervalError::InvalidInterval { start, end });
    }
    Ok(())
}

/// Returns how many hours the two intervals share, or `0.0` if they are disjoint.
///
/// Intervals that only touch at an instant share zero hours.
#[allow(clippy::cast_precision_loss)]
pub fn overlap_hours(
    a_start: DateTime<Utc>,
    a_end: DateTime<Utc>,
    b_start: DateTime<Utc>,
    b_end: DateTime<Utc>,
) -> Result<f64, IntervalError> {
    check(a_start, a_end)?;
    check(b_start, b_end)?;

    let later_start = a_start.max(b_start);
    let earlier_end = a_end.min(b_end);
    if earlier_end <= later_start {
        return Ok(0.0);
    }
    let millis = (earlier_end - later_start).num_milliseconds();
    Ok(millis as f64 / MILLIS_PER_HOUR)
}

/// Returns true if the two intervals overlap for a positive duration.
pub fn has_nontrivial_overlap(
    a_start: DateTime<Utc>,
    a_end: DateTime<Utc>,
    b_start: DateTime<Utc>,
    b_end: DateTime<Utc>,
) -> Result<bool, IntervalError> {
    Ok(overlap_hours(a_start, a_end, b_start, b_end)? > 0.0)
}
