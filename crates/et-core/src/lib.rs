//! Core engine for epic timelines.
//!
//! This crate contains the logic for:
//! - Interval math: overlap hours between two time intervals
//! - Calendar arithmetic: month lengths and anchor-day clamping
//! - Bucket generation: contiguous day/week/month/quarter/year buckets
//! - Bucketization: grouping calendar events by the buckets they overlap
//! - Epics: keyword matching and per-bucket hour aggregation

mod aggregate;
pub mod bucket;
mod bucketize;
pub mod calendar;
pub mod epic;
mod event;
pub mod interval;
pub mod types;

pub use aggregate::{AggregateError, EpicBucketHours, EpicHours, aggregate};
pub use bucket::{
    BucketError, Granularity, Step, TimeBucket, generate_buckets, generate_buckets_from_deltas,
    resolve_local,
};
pub use bucketize::{BucketedEvents, bucketize};
pub use epic::{Epic, EpicError, EpicMatcher, EpicSet, matches};
pub use event::CalendarEvent;
pub use interval::{IntervalError, has_nontrivial_overlap, overlap_hours};
pub use types::{EpicName, EventId, ValidationError};
