//! Calendar events as produced by a calendar export.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::interval::IntervalError;
use crate::types::EventId;

/// A single calendar entry.
///
/// `start < end` is expected; events that violate it are rejected by
/// [`CalendarEvent::new`] and fail any overlap computation made against them.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CalendarEvent {
    /// Opaque identifier (the ICS `UID`).
    pub id: EventId,
    /// Event summary.
    pub title: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub location: Option<String>,
    pub start: DateTime<Utc>,
    pub end: DateTime<Utc>,
}

impl CalendarEvent {
    /// Creates an event without description or location.
    pub fn new(
        id: EventId,
        title: impl Into<String>,
        start: DateTime<Utc>,
        end: DateTime<Utc>,
    ) -> Result<Self, IntervalError> {
        if start >= end {
            return Err(IntervalError::InvalidInterval { start, end });
        }
        Ok(Self {
            id,
            title: title.into(),
            description: None,
            location: None,
            start,
            end,
        })
    }

    #[must_use]
    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }

    #[must_use]
    pub fn with_location(mut self, location: impl Into<String>) -> Self {
        self.location = Some(location.into());
        self
    }
}
