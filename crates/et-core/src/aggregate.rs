//! Hours per epic per bucket.
//!
//! All epic keywords are compiled before any hours are summed, so an invalid
//! pattern fails the whole computation. Epics are then summed in parallel;
//! rows come back in epic order.

use rayon::prelude::*;
use serde::Serialize;
use thiserror::Error;

use crate::bucketize::BucketedEvents;
use crate::epic::{Epic, EpicError, EpicMatcher};
use crate::interval::{IntervalError, overlap_hours};
use crate::types::EpicName;

/// Errors from aggregation.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum AggregateError {
    #[error(transparent)]
    Epic(#[from] EpicError),

    #[error(transparent)]
    Interval(#[from] IntervalError),
}

/// Hours for one epic, one entry per bucket.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct EpicHours {
    pub name: EpicName,
    pub hours: Vec<f64>,
}

impl EpicHours {
    /// Sum over all buckets.
    pub fn total(&self) -> f64 {
        self.hours.iter().sum()
    }

    /// Largest single-bucket value, `0.0` when there are no buckets.
    pub fn max(&self) -> f64 {
        self.hours.iter().copied().fold(0.0, f64::max)
    }
}

/// The epic × bucket hour table.
///
/// Rows are in the order of the epics it was computed from. Epics sharing a
/// name each keep their own row; [`EpicBucketHours::get`] returns the first.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(transparent)]
pub struct EpicBucketHours {
    rows: Vec<EpicHours>,
}

impl EpicBucketHours {
    pub fn get(&self, name: &str) -> Option<&[f64]> {
        self.rows
            .iter()
            .find(|row| row.name == *name)
            .map(|row| row.hours.as_slice())
    }

    pub fn rows(&self) -> &[EpicHours] {
        &self.rows
    }

    pub fn iter(&self) -> std::slice::Iter<'_, EpicHours> {
        self.rows.iter()
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }
}

impl<'a> IntoIterator for &'a EpicBucketHours {
    type Item = &'a EpicHours;
    type IntoIter = std::slice::Iter<'a, EpicHours>;

    fn into_iter(self) -> Self::IntoIter {
        self.rows.iter()
    }
}

fn sum_bucket(matcher: &EpicMatcher<'_>, group: &BucketedEvents<'_>) -> Result<f64, IntervalError> {
    let mut hours = 0.0;
    for event in group.events.iter().filter(|e| matcher.matches(e)) {
        hours += overlap_hours(event.start, event.end, group.bucket.start, group.bucket.end)?;
    }
    Ok(hours)
}

fn epic_row(
    matcher: &EpicMatcher<'_>,
    bucketed: &[BucketedEvents<'_>],
) -> Result<EpicHours, IntervalError> {
    let hours = bucketed
        .iter()
        .map(|group| sum_bucket(matcher, group))
        .collect::<Result<Vec<_>, _>>()?;
    Ok(EpicHours {
        name: matcher.epic().name.clone(),
        hours,
    })
}

/// Sums, per epic and bucket, the overlap hours of the bucket's matching events.
///
/// Each row has one entry per group in `bucketed`, `0.0` where nothing matched.
pub fn aggregate(
    epics: &[Epic],
    bucketed: &[BucketedEvents<'_>],
) -> Result<EpicBucketHours, AggregateError> {
    let matchers = epics
        .iter()
        .map(EpicMatcher::new)
        .collect::<Result<Vec<_>, _>>()?;

    let rows = matchers
        .par_iter()
        .map(|matcher| epic_row(matcher, bucketed))
        .collect::<Result<Vec<_>, _>>()?;

    tracing::debug!(
        epics = rows.len(),
        buckets = bucketed.len(),
        "aggregated epic hours"
    );
    Ok(EpicBucketHours { rows })
}
