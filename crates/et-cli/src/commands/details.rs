//! Details command: the events behind one epic's hours.

use std::fmt::{self, Write as _};
use std::io;

use anyhow::{Context, Result};
use chrono::{DateTime, Local, NaiveDate, TimeZone, Utc};
use et_core::{CalendarEvent, EpicError, EventId, TimeBucket, bucketize, overlap_hours};
use serde::Serialize;

use super::timeline::Timeline;
use super::util::{format_hours, today_in};
use crate::cli::{DetailsArgs, RangeArgs};
use crate::config::Config;
use crate::ics::load_events;

/// One matched event and the hours it contributes to a bucket.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct MatchedEvent {
    pub id: EventId,
    pub title: String,
    pub start: DateTime<Utc>,
    pub end: DateTime<Utc>,
    /// Start and end in the report time zone, for display.
    #[serde(skip)]
    pub local_span: String,
    pub hours: f64,
}

/// A bucket with at least one matched event.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct BucketDetails {
    pub label: String,
    #[serde(flatten)]
    pub bucket: TimeBucket,
    pub hours: f64,
    pub events: Vec<MatchedEvent>,
}

/// Drill-down for one epic.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DetailsData {
    pub epic: String,
    pub keyword: String,
    pub from: NaiveDate,
    pub to: NaiveDate,
    pub total: f64,
    pub buckets: Vec<BucketDetails>,
}

fn local_span<Tz: TimeZone>(event: &CalendarEvent, tz: &Tz) -> String
where
    Tz::Offset: fmt::Display,
{
    let start = event.start.with_timezone(tz);
    let end = event.end.with_timezone(tz);
    if start.date_naive() == end.date_naive() {
        format!("{}-{}", start.format("%H:%M"), end.format("%H:%M"))
    } else {
        format!("{} - {}", start.format("%m-%d %H:%M"), end.format("%m-%d %H:%M"))
    }
}

/// Lists, per bucket, the events `epic_name` matches and their overlap hours.
///
/// Buckets where the epic matched nothing are omitted.
pub fn generate_details<Tz: TimeZone>(
    events: &[CalendarEvent],
    epic_name: &str,
    range: &RangeArgs,
    config: &Config,
    tz: &Tz,
    today: NaiveDate,
) -> Result<DetailsData>
where
    Tz::Offset: fmt::Display,
{
    let epics = config.epic_set().context("invalid epic configuration")?;
    let epic = epics.get(epic_name).ok_or_else(|| EpicError::UnknownEpic {
        name: epic_name.to_string(),
    })?;
    let matcher = epic.matcher()?;

    let timeline = Timeline::build(range, config.granularity, events, tz, today)?;
    let bucketed = bucketize(events, &timeline.buckets)?;

    let mut buckets = Vec::new();
    for (group, label) in bucketed.iter().zip(&timeline.labels) {
        let matched = matcher.matching_events(group);
        if matched.is_empty() {
            continue;
        }
        let matched = matched
            .into_iter()
            .map(|event| {
                let hours =
                    overlap_hours(event.start, event.end, group.bucket.start, group.bucket.end)?;
                Ok(MatchedEvent {
                    id: event.id.clone(),
                    title: event.title.clone(),
                    start: event.start,
                    end: event.end,
                    local_span: local_span(event, tz),
                    hours,
                })
            })
            .collect::<Result<Vec<_>>>()?;
        buckets.push(BucketDetails {
            label: label.clone(),
            bucket: group.bucket,
            hours: matched.iter().map(|e| e.hours).sum(),
            events: matched,
        });
    }

    Ok(DetailsData {
        epic: epic.name.to_string(),
        keyword: epic.keyword.clone(),
        from: timeline.from,
        to: timeline.to,
        total: buckets.iter().map(|b| b.hours).sum(),
        buckets,
    })
}

/// Formats the human-readable drill-down.
pub fn format_details(data: &DetailsData) -> String {
    let mut output = String::new();

    writeln!(
        output,
        "EPIC: {} /{}/ ({} to {})",
        data.epic, data.keyword, data.from, data.to
    )
    .unwrap();

    if data.buckets.is_empty() {
        writeln!(output).unwrap();
        writeln!(output, "No matching events in this range.").unwrap();
        return output;
    }

    for bucket in &data.buckets {
        writeln!(output).unwrap();
        writeln!(output, "{}  {}h", bucket.label, format_hours(bucket.hours)).unwrap();
        for event in &bucket.events {
            writeln!(
                output,
                "  {:>6}h  {}  {}",
                format_hours(event.hours),
                event.local_span,
                event.title
            )
            .unwrap();
        }
    }

    writeln!(output).unwrap();
    writeln!(output, "Total: {}h", format_hours(data.total)).unwrap();
    output
}

fn load_and_generate<Tz: TimeZone>(
    args: &DetailsArgs,
    config: &Config,
    tz: &Tz,
) -> Result<DetailsData>
where
    Tz::Offset: fmt::Display,
{
    let events = load_events(&args.input, tz)?;
    tracing::debug!(events = events.len(), epic = %args.epic, "loaded calendar events");
    generate_details(&events, &args.epic, &args.range, config, tz, today_in(tz))
}

/// Runs the details command.
pub fn run(out: &mut impl io::Write, args: &DetailsArgs, config: &Config) -> Result<()> {
    let data = match config.fixed_offset()? {
        Some(offset) => load_and_generate(args, config, &offset)?,
        None => load_and_generate(args, config, &Local)?,
    };

    if args.json {
        writeln!(out, "{}", serde_json::to_string_pretty(&data)?)?;
    } else {
        write!(out, "{}", format_details(&data))?;
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use chrono::FixedOffset;
    use et_core::{Epic, EpicName, Granularity};
    use insta::assert_snapshot;

    use super::*;

    fn utc(d: u32, h: u32, m: u32) -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2025, 9, d, h, m, 0).unwrap()
    }

    fn event(id: &str, title: &str, start: DateTime<Utc>, end: DateTime<Utc>) -> CalendarEvent {
        CalendarEvent::new(EventId::new(id).unwrap(), title, start, end).unwrap()
    }

    fn config() -> Config {
        Config {
            granularity: Granularity::Day,
            utc_offset: None,
            epics: vec![
                Epic::new(EpicName::new("Alpha").unwrap(), "alpha"),
                Epic::new(EpicName::new("Offsite").unwrap(), "offsite").targets(false, false, true),
            ],
        }
    }

    fn range(from: &str, to: &str) -> RangeArgs {
        RangeArgs {
            from: Some(from.to_string()),
            to: Some(to.to_string()),
            granularity: None,
        }
    }

    fn sample_events() -> Vec<CalendarEvent> {
        vec![
            event("1", "Alpha planning", utc(22, 9, 0), utc(22, 10, 30)),
            event("2", "Lunch", utc(22, 12, 0), utc(22, 13, 0)).with_location("Offsite cafe"),
            event("3", "alpha deploy", utc(23, 23, 0), utc(24, 1, 0)),
        ]
    }

    fn today() -> NaiveDate {
        NaiveDate::from_ymd_opt(2025, 10, 1).unwrap()
    }

    #[test]
    fn test_details_split_across_buckets() {
        let data = generate_details(
            &sample_events(),
            "Alpha",
            &range("2025-09-22", "2025-09-25"),
            &config(),
            &Utc,
            today(),
        )
        .unwrap();

        assert_eq!(data.total, 3.5);
        assert_eq!(data.buckets.len(), 3);
        assert_eq!(data.buckets[1].events[0].hours, 1.0);
        assert_eq!(data.buckets[2].events[0].id.as_str(), "3");

        let output = format_details(&data);
        assert_snapshot!(output, @r"
        EPIC: Alpha /alpha/ (2025-09-22 to 2025-09-25)

        2025-09-22  1.5h
             1.5h  09:00-10:30  Alpha planning

        2025-09-23  1h
               1h  09-23 23:00 - 09-24 01:00  alpha deploy

        2025-09-24  1h
               1h  09-23 23:00 - 09-24 01:00  alpha deploy

        Total: 3.5h
        ");
    }

    #[test]
    fn test_details_location_match_in_offset() {
        let pst = FixedOffset::west_opt(8 * 3600).unwrap();
        let data = generate_details(
            &sample_events(),
            "Offsite",
            &range("2025-09-22", "2025-09-22"),
            &config(),
            &pst,
            today(),
        )
        .unwrap();

        assert_eq!(data.buckets.len(), 1);
        assert_eq!(data.buckets[0].events[0].local_span, "04:00-05:00");
    }

    #[test]
    fn test_details_no_matches() {
        let data = generate_details(
            &sample_events(),
            "Offsite",
            &range("2025-09-23", "2025-09-24"),
            &config(),
            &Utc,
            today(),
        )
        .unwrap();

        assert_snapshot!(format_details(&data), @r"
        EPIC: Offsite /offsite/ (2025-09-23 to 2025-09-24)

        No matching events in this range.
        ");
    }

    #[test]
    fn test_details_unknown_epic() {
        let err = generate_details(
            &sample_events(),
            "Gamma",
            &range("2025-09-22", "2025-09-22"),
            &config(),
            &Utc,
            today(),
        )
        .unwrap_err();
        assert!(err.to_string().contains("Gamma"));
    }
}
