//! Calendar export import.
//!
//! Reads `.ics` files with the `ical` crate, or JSON arrays of events, into
//! [`CalendarEvent`]s. Every imported event satisfies `start < end`; entries
//! that cannot be turned into such an event are skipped with a warning.
//!
//! `TZID` parameters are not looked up: any date-time without a trailing `Z`
//! is read as wall-clock time in the report time zone. Recurrence rules are
//! ignored.

use std::fs::File;
use std::io::{BufRead, BufReader};
use std::path::Path;
use std::sync::LazyLock;

use anyhow::{Context, Result};
use chrono::{DateTime, Days, NaiveDate, NaiveDateTime, NaiveTime, TimeDelta, TimeZone, Utc};
use et_core::{CalendarEvent, EventId, resolve_local};
use ical::parser::ical::component::IcalEvent;
use regex::Regex;

/// Pre-compiled regex for RFC 5545 `DURATION` values (`P1W`, `P1DT2H30M`, `PT45M`).
static DURATION_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^\+?P(?:(\d+)W|(?:(\d+)D)?(?:T(?:(\d+)H)?(?:(\d+)M)?(?:(\d+)S)?)?)$").unwrap()
});

/// A parsed `DTSTART`/`DTEND` value.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum IcsTime {
    /// A date-time, resolved to an instant.
    Instant(DateTime<Utc>),
    /// An all-day date.
    Date(NaiveDate),
}

/// A raw time value before the report time zone is applied.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum ParsedTime {
    Utc(DateTime<Utc>),
    Floating(NaiveDateTime),
    Date(NaiveDate),
}

fn parse_ics_time(value: &str) -> Option<ParsedTime> {
    let value = value.trim();
    if let Some(utc) = value.strip_suffix('Z') {
        let naive = NaiveDateTime::parse_from_str(utc, "%Y%m%dT%H%M%S").ok()?;
        return Some(ParsedTime::Utc(naive.and_utc()));
    }
    if value.len() == 8 {
        return NaiveDate::parse_from_str(value, "%Y%m%d")
            .ok()
            .map(ParsedTime::Date);
    }
    NaiveDateTime::parse_from_str(value, "%Y%m%dT%H%M%S")
        .ok()
        .map(ParsedTime::Floating)
}

impl ParsedTime {
    fn resolve<Tz: TimeZone>(self, tz: &Tz) -> Option<IcsTime> {
        match self {
            Self::Utc(dt) => Some(IcsTime::Instant(dt)),
            Self::Floating(naive) => resolve_local(tz, naive).ok().map(IcsTime::Instant),
            Self::Date(date) => Some(IcsTime::Date(date)),
        }
    }
}

fn date_start<Tz: TimeZone>(tz: &Tz, date: NaiveDate) -> Option<DateTime<Utc>> {
    resolve_local(tz, date.and_time(NaiveTime::MIN)).ok()
}

impl IcsTime {
    fn instant<Tz: TimeZone>(self, tz: &Tz) -> Option<DateTime<Utc>> {
        match self {
            Self::Instant(dt) => Some(dt),
            Self::Date(date) => date_start(tz, date),
        }
    }
}

/// A nonnegative `DURATION`: whole days (weeks folded in) plus exact seconds.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
struct IcsDuration {
    days: u64,
    seconds: i64,
}

fn parse_ics_duration(value: &str) -> Option<IcsDuration> {
    let value = value.trim();
    let caps = DURATION_RE.captures(value)?;
    if caps.iter().skip(1).all(|group| group.is_none()) {
        return None;
    }
    let number = |i: usize| -> Option<u64> {
        caps.get(i).map_or(Some(0), |m| m.as_str().parse().ok())
    };

    let days = number(1)?.checked_mul(7)?.checked_add(number(2)?)?;
    let seconds = number(3)?
        .checked_mul(3600)?
        .checked_add(number(4)?.checked_mul(60)?)?
        .checked_add(number(5)?)?;
    Some(IcsDuration {
        days,
        seconds: i64::try_from(seconds).ok()?,
    })
}

impl IcsTime {
    /// The end of an event starting at `self` and lasting `duration`.
    ///
    /// Days are calendar days in `tz`; hours, minutes and seconds are exact.
    fn plus<Tz: TimeZone>(self, duration: IcsDuration, tz: &Tz) -> Option<Self> {
        if let (Self::Date(date), 0) = (self, duration.seconds) {
            return date.checked_add_days(Days::new(duration.days)).map(Self::Date);
        }
        let local = self.instant(tz)?.with_timezone(tz).naive_local();
        let shifted = local.checked_add_days(Days::new(duration.days))?;
        let end = resolve_local(tz, shifted).ok()?;
        end.checked_add_signed(TimeDelta::try_seconds(duration.seconds)?)
            .map(Self::Instant)
    }
}

/// Undoes RFC 5545 text escaping.
fn unescape_text(value: &str) -> String {
    let mut out = String::with_capacity(value.len());
    let mut chars = value.chars();
    while let Some(c) = chars.next() {
        if c != '\\' {
            out.push(c);
            continue;
        }
        match chars.next() {
            Some('n' | 'N') => out.push('\n'),
            Some(other) => out.push(other),
            None => out.push('\\'),
        }
    }
    out
}

/// Converts one `VEVENT`, returning why it was skipped on failure.
fn convert_event<Tz: TimeZone>(
    event: &IcalEvent,
    index: usize,
    tz: &Tz,
) -> Result<CalendarEvent, &'static str> {
    let mut uid = None;
    let mut title = String::new();
    let mut description = None;
    let mut location = None;
    let mut start = None;
    let mut end = None;
    let mut duration = None;

    for property in &event.properties {
        let Some(value) = property.value.as_deref() else {
            continue;
        };
        match property.name.as_str() {
            "UID" => uid = Some(value.to_string()),
            "SUMMARY" => title = unescape_text(value),
            "DESCRIPTION" => description = Some(unescape_text(value)),
            "LOCATION" => location = Some(unescape_text(value)),
            "DTSTART" => start = Some(parse_ics_time(value).ok_or("unparseable DTSTART")?),
            "DTEND" => end = Some(parse_ics_time(value).ok_or("unparseable DTEND")?),
            "DURATION" => {
                duration = Some(parse_ics_duration(value).ok_or("unparseable DURATION")?);
            }
            _ => {}
        }
    }

    let start = start
        .ok_or("missing DTSTART")?
        .resolve(tz)
        .ok_or("DTSTART does not exist in the time zone")?;
    let end = match (end, duration, start) {
        (Some(end), _, _) => end
            .resolve(tz)
            .ok_or("DTEND does not exist in the time zone")?,
        (None, Some(duration), _) => start.plus(duration, tz).ok_or("DURATION out of range")?,
        // An all-day event without DTEND or DURATION lasts one day.
        (None, None, IcsTime::Date(date)) => IcsTime::Date(
            date.checked_add_days(Days::new(1))
                .ok_or("DTSTART out of range")?,
        ),
        (None, None, IcsTime::Instant(_)) => return Err("missing DTEND"),
    };

    let start = start.instant(tz).ok_or("DTSTART out of range")?;
    let end = end.instant(tz).ok_or("DTEND out of range")?;

    let id = match uid.map(EventId::new) {
        Some(Ok(id)) => id,
        _ => EventId::new(format!("event-{index}")).map_err(|_| "invalid event ID")?,
    };
    let mut converted =
        CalendarEvent::new(id, title, start, end).map_err(|_| "event does not end after it starts")?;
    converted.description = description;
    converted.location = location;
    Ok(converted)
}

/// Parses an ICS stream. Floating and all-day times are read in `tz`.
pub fn parse_ics<R: BufRead, Tz: TimeZone>(reader: R, tz: &Tz) -> Result<Vec<CalendarEvent>> {
    let mut events = Vec::new();
    let mut index = 0;
    for calendar in ical::IcalParser::new(reader) {
        let calendar = calendar.context("invalid ICS data")?;
        for event in &calendar.events {
            index += 1;
            match convert_event(event, index, tz) {
                Ok(event) => events.push(event),
                Err(reason) => tracing::warn!(index, reason, "skipping calendar entry"),
            }
        }
    }
    tracing::debug!(count = events.len(), "parsed ICS events");
    Ok(events)
}

/// Parses a JSON array of events, rejecting any that do not end after they start.
pub fn parse_json<R: BufRead>(reader: R) -> Result<Vec<CalendarEvent>> {
    let events: Vec<CalendarEvent> =
        serde_json::from_reader(reader).context("invalid JSON event list")?;
    for event in &events {
        anyhow::ensure!(
            event.start < event.end,
            "event {} must end after it starts",
            event.id
        );
    }
    Ok(events)
}

/// Loads events from a `.ics` or `.json` file.
pub fn load_events<Tz: TimeZone>(path: &Path, tz: &Tz) -> Result<Vec<CalendarEvent>> {
    let file =
        File::open(path).with_context(|| format!("failed to open {}", path.display()))?;
    let reader = BufReader::new(file);
    let is_json = path
        .extension()
        .is_some_and(|ext| ext.eq_ignore_ascii_case("json"));

    if is_json {
        parse_json(reader).with_context(|| format!("failed to read {}", path.display()))
    } else {
        parse_ics(reader, tz).with_context(|| format!("failed to read {}", path.display()))
    }
}
