//! Buckets command: preview the time buckets for a date range.

use std::fmt::{self, Write as _};
use std::io;

use anyhow::Result;
use chrono::{Local, SecondsFormat, TimeZone};

use super::timeline::Timeline;
use super::util::today_in;
use crate::cli::{BucketsArgs, RangeArgs};
use crate::config::Config;

/// Formats one line per bucket: local start date, then the UTC interval.
pub fn format_buckets(timeline: &Timeline, timezone: &str) -> String {
    let mut output = String::new();
    writeln!(
        output,
        "{} {} bucket(s) from {} to {} ({timezone})",
        timeline.buckets.len(),
        timeline.granularity,
        timeline.from,
        timeline.to
    )
    .unwrap();
    writeln!(output).unwrap();

    for (bucket, label) in timeline.buckets.iter().zip(&timeline.labels) {
        writeln!(
            output,
            "{label}  {}  {}",
            bucket.start.to_rfc3339_opts(SecondsFormat::Secs, true),
            bucket.end.to_rfc3339_opts(SecondsFormat::Secs, true)
        )
        .unwrap();
    }
    output
}

fn build<Tz: TimeZone>(range: &RangeArgs, config: &Config, tz: &Tz) -> Result<Timeline>
where
    Tz::Offset: fmt::Display,
{
    Timeline::build(range, config.granularity, &[], tz, today_in(tz))
}

/// Runs the buckets command.
pub fn run(out: &mut impl io::Write, args: &BucketsArgs, config: &Config) -> Result<()> {
    let timeline = match config.fixed_offset()? {
        Some(offset) => build(&args.range, config, &offset)?,
        None => build(&args.range, config, &Local)?,
    };

    if args.json {
        writeln!(out, "{}", serde_json::to_string_pretty(&timeline.buckets)?)?;
    } else {
        write!(out, "{}", format_buckets(&timeline, &config.zone_label()?))?;
    }
    Ok(())
}
