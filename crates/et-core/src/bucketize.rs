//! Grouping calendar events by time bucket.

use serde::Serialize;

use crate::bucket::TimeBucket;
use crate::event::CalendarEvent;
use crate::interval::{IntervalError, has_nontrivial_overlap};

/// The events that overlap one bucket, in input order.
///
/// Events are borrowed, so an event spanning several buckets is shared rather
/// than copied into each group.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct BucketedEvents<'a> {
    pub bucket: TimeBucket,
    pub events: Vec<&'a CalendarEvent>,
}

/// Assigns events to every bucket they overlap for a positive duration.
///
/// Returns one group per bucket, in bucket order. An event that only touches a
/// bucket at its boundary is not included in that bucket.
pub fn bucketize<'a>(
    events: &'a [CalendarEvent],
    buckets: &[TimeBucket],
) -> Result<Vec<BucketedEvents<'a>>, IntervalError> {
    let mut result = Vec::with_capacity(buckets.len());
    for bucket in buckets {
        let mut matched = Vec::new();
        for event in events {
            if has_nontrivial_overlap(bucket.start, bucket.end, event.start, event.end)? {
                matched.push(event);
            }
        }
        result.push(BucketedEvents {
            bucket: *bucket,
            events: matched,
        });
    }

    tracing::debug!(
        buckets = buckets.len(),
        events = events.len(),
        "bucketized calendar events"
    );
    Ok(result)
}

#[cfg(test)]
mod tests {
    use chrono::{DateTime, TimeZone, Utc};

    use super::*;
    use crate::types::EventId;

    fn at(day: u32, hour: u32, min: u32) -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2025, 9, day, hour, min, 0).unwrap()
    }

    fn event(id: &str, start: DateTime<Utc>, end: DateTime<Utc>) -> CalendarEvent {
        CalendarEvent::new(EventId::new(id).unwrap(), id.to_uppercase(), start, end).unwrap()
    }

    fn four_days() -> Vec<TimeBucket> {
        (22..26)
            .map(|d| TimeBucket {
                start: at(d, 0, 0),
                end: at(d + 1, 0, 0),
            })
            .collect()
    }

    fn ids<'a>(group: &BucketedEvents<'a>) -> Vec<&'a str> {
        group.events.iter().map(|e| e.id.as_str()).collect()
    }

    #[test]
    fn single_day_events() {
        let events = vec![
            event("id1", at(22, 8, 0), at(22, 9, 0)),
            event("id2", at(23, 8, 0), at(23, 10, 0)),
            event("id3", at(23, 15, 0), at(23, 17, 0)),
            event("id4", at(25, 8, 0), at(25, 20, 0)),
            event("id5", at(26, 6, 0), at(26, 7, 30)),
        ];
        let buckets = four_days();

        let grouped = bucketize(&events, &buckets).unwrap();

        assert_eq!(grouped.len(), 4);
        assert_eq!(ids(&grouped[0]), vec!["id1"]);
        assert_eq!(ids(&grouped[1]), vec!["id2", "id3"]);
        assert!(grouped[2].events.is_empty());
        assert_eq!(ids(&grouped[3]), vec!["id4"]);
        for (group, bucket) in grouped.iter().zip(&buckets) {
            assert_eq!(group.bucket, *bucket);
        }
    }

    #[test]
    fn multi_day_events_repeat_and_boundaries_are_excluded() {
        let events = vec![
            event("id1", at(21, 22, 30), at(22, 1, 0)),
            event("id2", at(22, 8, 0), at(23, 10, 0)),
            // Exactly covers the third bucket: touches the second and fourth only at instants.
            event("id3", at(24, 0, 0), at(25, 0, 0)),
            event("id4", at(25, 8, 0), at(26, 8, 0)),
        ];

        let grouped = bucketize(&events, &four_days()).unwrap();

        assert_eq!(ids(&grouped[0]), vec!["id1", "id2"]);
        assert_eq!(ids(&grouped[1]), vec!["id2"]);
        assert_eq!(ids(&grouped[2]), vec!["id3"]);
        assert_eq!(ids(&grouped[3]), vec!["id4"]);
        assert!(std::ptr::eq(grouped[0].events[1], grouped[1].events[0]));
    }

    #[test]
    fn malformed_event_fails() {
        let mut bad = event("bad", at(22, 8, 0), at(22, 9, 0));
        bad.end = bad.start;
        let events = vec![bad];

        let result = bucketize(&events, &four_days());
        assert!(matches!(result, Err(IntervalError::InvalidInterval { .. })));
    }

    #[test]
    fn no_buckets_yields_no_groups() {
        let events = vec![event("id1", at(22, 8, 0), at(22, 9, 0))];
        assert!(bucketize(&events, &[]).unwrap().is_empty());
    }

    #[test]
    fn bucketize_is_idempotent() {
        let events = vec![
            event("id1", at(22, 8, 0), at(24, 9, 0)),
            event("id2", at(25, 8, 0), at(25, 10, 0)),
        ];
        let buckets = four_days();
        assert_eq!(bucketize(&events, &buckets), bucketize(&events, &buckets));
    }
}
