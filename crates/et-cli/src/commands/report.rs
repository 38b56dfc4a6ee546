//! Report command: hours per epic per bucket.
//!
//! This module implements `et report` with human-readable table and JSON output.

use std::fmt::{self, Write as _};
use std::io;

use anyhow::{Context, Result};
use chrono::{Local, NaiveDate, TimeZone};
use et_core::{
    CalendarEvent, EpicBucketHours, EpicSet, Granularity, TimeBucket, aggregate, bucketize,
};
use serde::Serialize;

use super::timeline::Timeline;
use super::util::{format_hours, today_in};
use crate::cli::{RangeArgs, ReportArgs};
use crate::config::Config;
use crate::ics::load_events;

/// Computed report data.
#[derive(Debug)]
pub struct ReportData {
    pub timezone: String,
    pub timeline: Timeline,
    pub epics: EpicSet,
    pub hours: EpicBucketHours,
    pub event_count: usize,
}

// ========== Report Generation ==========

/// Buckets `events` and sums each epic's hours per bucket.
pub fn generate_report_data<Tz: TimeZone>(
    events: &[CalendarEvent],
    range: &RangeArgs,
    config: &Config,
    tz: &Tz,
    today: NaiveDate,
) -> Result<ReportData>
where
    Tz::Offset: fmt::Display,
{
    let epics = config.epic_set().context("invalid epic configuration")?;
    let timeline = Timeline::build(range, config.granularity, events, tz, today)?;
    let bucketed = bucketize(events, &timeline.buckets)?;
    let hours = aggregate(epics.as_slice(), &bucketed)?;

    Ok(ReportData {
        timezone: config.zone_label()?,
        timeline,
        epics,
        hours,
        event_count: events.len(),
    })
}

/// Formats the human-readable report output.
///
/// One row per bucket and one right-aligned column per epic, followed by a
/// totals row.
pub fn format_report(data: &ReportData) -> String {
    let mut output = String::new();
    let timeline = &data.timeline;

    writeln!(
        output,
        "EPIC REPORT: {} to {} (by {}, {})",
        timeline.from, timeline.to, timeline.granularity, data.timezone
    )
    .unwrap();
    writeln!(output, "{} events", data.event_count).unwrap();

    if data.hours.is_empty() {
        writeln!(output).unwrap();
        writeln!(output, "No epics configured.").unwrap();
        writeln!(output).unwrap();
        writeln!(
            output,
            "Hint: Add [[epics]] entries with a name and keyword to config.toml."
        )
        .unwrap();
        return output;
    }

    let label_width = timeline
        .labels
        .iter()
        .map(String::len)
        .chain(["Bucket".len(), "Total".len()])
        .max()
        .unwrap_or_default();

    // Cells are pre-formatted so every column can be sized to its widest value.
    let columns: Vec<(String, Vec<String>, String)> = data
        .hours
        .iter()
        .map(|row| {
            let cells = row.hours.iter().copied().map(format_hours).collect();
            (row.name.to_string(), cells, format_hours(row.total()))
        })
        .collect();
    let widths: Vec<usize> = columns
        .iter()
        .map(|(name, cells, total)| {
            cells
                .iter()
                .map(String::len)
                .chain([name.len(), total.len()])
                .max()
                .unwrap_or_default()
        })
        .collect();

    writeln!(output).unwrap();
    write!(output, "{:<label_width$}", "Bucket").unwrap();
    for ((name, _, _), width) in columns.iter().zip(&widths) {
        write!(output, "  {name:>width$}").unwrap();
    }
    writeln!(output).unwrap();

    for (i, label) in timeline.labels.iter().enumerate() {
        write!(output, "{label:<label_width$}").unwrap();
        for ((_, cells, _), width) in columns.iter().zip(&widths) {
            write!(output, "  {:>width$}", cells[i]).unwrap();
        }
        writeln!(output).unwrap();
    }

    writeln!(output).unwrap();
    write!(output, "{:<label_width$}", "Total").unwrap();
    for ((_, _, total), width) in columns.iter().zip(&widths) {
        write!(output, "  {total:>width$}").unwrap();
    }
    writeln!(output).unwrap();

    output
}

// ========== JSON Output ==========

/// JSON report structure.
#[derive(Debug, Serialize)]
pub struct JsonReport<'a> {
    pub timezone: &'a str,
    pub granularity: Granularity,
    pub from: NaiveDate,
    pub to: NaiveDate,
    pub event_count: usize,
    pub buckets: &'a [TimeBucket],
    pub epics: Vec<JsonEpic<'a>>,
}

#[derive(Debug, Serialize)]
pub struct JsonEpic<'a> {
    pub name: &'a str,
    pub color: &'a str,
    pub hours: &'a [f64],
    pub total: f64,
    /// Largest single bucket, for scaling cell shading.
    pub max: f64,
}

/// Formats report data as JSON.
pub fn format_report_json(data: &ReportData) -> Result<String> {
    let epics = data
        .epics
        .iter()
        .zip(&data.hours)
        .map(|(epic, row)| JsonEpic {
            name: row.name.as_str(),
            color: &epic.color,
            hours: &row.hours,
            total: row.total(),
            max: row.max(),
        })
        .collect();

    let report = JsonReport {
        timezone: &data.timezone,
        granularity: data.timeline.granularity,
        from: data.timeline.from,
        to: data.timeline.to,
        event_count: data.event_count,
        buckets: &data.timeline.buckets,
        epics,
    };

    Ok(serde_json::to_string_pretty(&report)?)
}

// ========== Public Interface ==========

fn load_and_generate<Tz: TimeZone>(args: &ReportArgs, config: &Config, tz: &Tz) -> Result<ReportData>
where
    Tz::Offset: fmt::Display,
{
    let events = load_events(&args.input, tz)?;
    tracing::debug!(events = events.len(), "loaded calendar events");
    generate_report_data(&events, &args.range, config, tz, today_in(tz))
}

/// Runs the report command.
pub fn run(out: &mut impl io::Write, args: &ReportArgs, config: &Config) -> Result<()> {
    let data = match config.fixed_offset()? {
        Some(offset) => load_and_generate(args, config, &offset)?,
        None => load_and_generate(args, config, &Local)?,
    };

    if args.json {
        let output = format_report_json(&data)?;
        writeln!(out, "{output}")?;
    } else {
        let output = format_report(&data);
        write!(out, "{output}")?;
    }

    Ok(())
}
