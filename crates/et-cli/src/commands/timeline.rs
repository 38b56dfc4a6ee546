//! Date range resolution and bucket layout shared by the reporting commands.

use std::fmt;

use anyhow::{Context, Result};
use chrono::{NaiveDate, TimeDelta, TimeZone};
use et_core::{CalendarEvent, Granularity, TimeBucket, generate_buckets};

use super::util::{local_midnight, parse_date};
use crate::cli::RangeArgs;

/// The buckets a command reports on.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Timeline {
    pub granularity: Granularity,
    pub from: NaiveDate,
    pub to: NaiveDate,
    pub buckets: Vec<TimeBucket>,
    /// Local start date of each bucket.
    pub labels: Vec<String>,
}

impl Timeline {
    /// Lays out buckets from midnight of `from` through the bucket containing
    /// midnight of `to`, both in `tz`.
    ///
    /// Dates missing from `range` default to the days of the earliest event
    /// start and latest event end, or `today` when there are no events.
    pub fn build<Tz: TimeZone>(
        range: &RangeArgs,
        default_granularity: Granularity,
        events: &[CalendarEvent],
        tz: &Tz,
        today: NaiveDate,
    ) -> Result<Self>
    where
        Tz::Offset: fmt::Display,
    {
        let granularity = range.granularity.unwrap_or(default_granularity);

        let from = match &range.from {
            Some(s) => parse_date(s, today)?,
            None => events
                .iter()
                .map(|e| e.start.with_timezone(tz).date_naive())
                .min()
                .unwrap_or(today),
        };
        // An event ending exactly at midnight belongs to the previous day.
        let to = match &range.to {
            Some(s) => parse_date(s, today)?,
            None => events
                .iter()
                .map(|e| (e.end - TimeDelta::milliseconds(1)).with_timezone(tz).date_naive())
                .max()
                .unwrap_or(today),
        };

        let start = local_midnight(tz, from)?;
        let end = local_midnight(tz, to)?;
        let buckets = generate_buckets(&start, &end, granularity.step())
            .with_context(|| format!("invalid date range {from} to {to}"))?;
        let labels = buckets
            .iter()
            .map(|b| b.start.with_timezone(tz).format("%Y-%m-%d").to_string())
            .collect();

        tracing::debug!(%from, %to, %granularity, buckets = buckets.len(), "built timeline");
        Ok(Self {
            granularity,
            from,
            to,
            buckets,
            labels,
        })
    }
}
