//! Epics: keyword categories that calendar events are classified into.
//!
//! An epic's keyword is a regular expression in the `regex` crate dialect. It
//! is searched (not anchored) in the event fields the epic targets.

use regex::{Regex, RegexBuilder};
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::bucketize::BucketedEvents;
use crate::event::CalendarEvent;
use crate::types::EpicName;

/// Display color used when an epic does not specify one.
pub const DEFAULT_COLOR: &str = "#7799ff";

/// Errors from compiling or managing epics.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum EpicError {
    /// The keyword is not a valid regular expression.
    #[error("keyword {keyword:?} of epic {name} is not a valid pattern: {reason}")]
    PatternCompilation {
        name: EpicName,
        keyword: String,
        reason: String,
    },

    /// Another epic already uses this name.
    #[error("an epic named {name} already exists")]
    DuplicateName { name: EpicName },

    /// No epic with this name exists.
    #[error("no epic named {name}")]
    UnknownEpic { name: String },

    /// The keyword is blank.
    #[error("epic {name} must have a keyword to match")]
    EmptyKeyword { name: EpicName },

    /// The epic matches against no event field.
    #[error("epic {name} must match at least one of title, description or location")]
    NoMatchTarget { name: EpicName },
}

const fn default_true() -> bool {
    true
}

fn default_color() -> String {
    DEFAULT_COLOR.to_string()
}

/// A named keyword category.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Epic {
    pub name: EpicName,
    /// Regular expression searched in the targeted fields.
    pub keyword: String,
    #[serde(default)]
    pub case_sensitive: bool,
    #[serde(default = "default_true")]
    pub match_title: bool,
    #[serde(default = "default_true")]
    pub match_description: bool,
    #[serde(default)]
    pub match_location: bool,
    /// Opaque display attribute.
    #[serde(default = "default_color")]
    pub color: String,
}

impl Epic {
    /// Creates a case-insensitive epic matching titles and descriptions.
    pub fn new(name: EpicName, keyword: impl Into<String>) -> Self {
        Self {
            name,
            keyword: keyword.into(),
            case_sensitive: false,
            match_title: true,
            match_description: true,
            match_location: false,
            color: default_color(),
        }
    }

    #[must_use]
    pub fn case_sensitive(mut self, case_sensitive: bool) -> Self {
        self.case_sensitive = case_sensitive;
        self
    }

    /// Sets which event fields are searched.
    #[must_use]
    pub fn targets(mut self, title: bool, description: bool, location: bool) -> Self {
        self.match_title = title;
        self.match_description = description;
        self.match_location = location;
        self
    }

    #[must_use]
    pub fn color(mut self, color: impl Into<String>) -> Self {
        self.color = color.into();
        self
    }

    /// Compiles the keyword into a matcher.
    pub fn matcher(&self) -> Result<EpicMatcher<'_>, EpicError> {
        EpicMatcher::new(self)
    }
}

/// An epic with its keyword compiled, ready to test events.
#[derive(Debug, Clone)]
pub struct EpicMatcher<'a> {
    epic: &'a Epic,
    regex: Regex,
}

impl<'a> EpicMatcher<'a> {
    pub fn new(epic: &'a Epic) -> Result<Self, EpicError> {
        let regex = RegexBuilder::new(&epic.keyword)
            .case_insensitive(!epic.case_sensitive)
            .build()
            .map_err(|e| EpicError::PatternCompilation {
                name: epic.name.clone(),
                keyword: epic.keyword.clone(),
                reason: e.to_string(),
            })?;
        Ok(Self { epic, regex })
    }

    pub const fn epic(&self) -> &'a Epic {
        self.epic
    }

    /// Returns true if the keyword occurs anywhere in `field`.
    pub fn test(&self, field: &str) -> bool {
        self.regex.is_match(field)
    }

    /// Returns true if any targeted field of `event` matches.
    ///
    /// Missing description or location never match.
    pub fn matches(&self, event: &CalendarEvent) -> bool {
        let epic = self.epic;
        (epic.match_title && self.test(&event.title))
            || (epic.match_description && event.description.as_deref().is_some_and(|d| self.test(d)))
            || (epic.match_location && event.location.as_deref().is_some_and(|l| self.test(l)))
    }

    /// The events of one bucket group that this epic matches, in group order.
    pub fn matching_events<'e>(&self, group: &BucketedEvents<'e>) -> Vec<&'e CalendarEvent> {
        group
            .events
            .iter()
            .copied()
            .filter(|event| self.matches(event))
            .collect()
    }
}

/// One-off check of a single event against an epic.
///
/// Prefer [`EpicMatcher`] when testing many events.
pub fn matches(epic: &Epic, event: &CalendarEvent) -> Result<bool, EpicError> {
    Ok(EpicMatcher::new(epic)?.matches(event))
}

/// The active epics, with unique names and valid keywords.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct EpicSet {
    epics: Vec<Epic>,
}

impl EpicSet {
    pub const fn new() -> Self {
        Self { epics: Vec::new() }
    }

    fn validate(epic: &Epic) -> Result<(), EpicError> {
        if epic.keyword.trim().is_empty() {
            return Err(EpicError::EmptyKeyword {
                name: epic.name.clone(),
            });
        }
        if !(epic.match_title || epic.match_description || epic.match_location) {
            return Err(EpicError::NoMatchTarget {
                name: epic.name.clone(),
            });
        }
        EpicMatcher::new(epic)?;
        Ok(())
    }

    fn position(&self, name: &str) -> Option<usize> {
        self.epics.iter().position(|e| e.name == *name)
    }

    /// Appends an epic.
    pub fn add(&mut self, epic: Epic) -> Result<(), EpicError> {
        if self.position(epic.name.as_str()).is_some() {
            return Err(EpicError::DuplicateName { name: epic.name });
        }
        Self::validate(&epic)?;
        self.epics.push(epic);
        Ok(())
    }

    /// Replaces the epic named `old_name`, keeping its position.
    ///
    /// The new epic may keep the old name or take a name no other epic uses.
    pub fn replace(&mut self, old_name: &str, epic: Epic) -> Result<(), EpicError> {
        let index = self
            .position(old_name)
            .ok_or_else(|| EpicError::UnknownEpic {
                name: old_name.to_string(),
            })?;
        if self
            .position(epic.name.as_str())
            .is_some_and(|other| other != index)
        {
            return Err(EpicError::DuplicateName { name: epic.name });
        }
        Self::validate(&epic)?;
        self.epics[index] = epic;
        Ok(())
    }

    /// Removes and returns the epic named `name`.
    pub fn remove(&mut self, name: &str) -> Result<Epic, EpicError> {
        let index = self.position(name).ok_or_else(|| EpicError::UnknownEpic {
            name: name.to_string(),
        })?;
        Ok(self.epics.remove(index))
    }

    pub fn get(&self, name: &str) -> Option<&Epic> {
        self.position(name).map(|i| &self.epics[i])
    }

    pub fn as_slice(&self) -> &[Epic] {
        &self.epics
    }

    pub fn iter(&self) -> std::slice::Iter<'_, Epic> {
        self.epics.iter()
    }

    pub fn len(&self) -> usize {
        self.epics.len()
    }

    pub fn is_empty(&self) -> bool {
        self.epics.is_empty()
    }
}

impl TryFrom<Vec<Epic>> for EpicSet {
    type Error = EpicError;

    fn try_from(epics: Vec<Epic>) -> Result<Self, Self::Error> {
        let mut set = Self::new();
        for epic in epics {
            set.add(epic)?;
        }
        Ok(set)
    }
}

impl<'a> IntoIterator for &'a EpicSet {
    type Item = &'a Epic;
    type IntoIter = std::slice::Iter<'a, Epic>;

    fn into_iter(self) -> Self::IntoIter {
        self.epics.iter()
    }
}

#[cfg(test)]
mod tests {
    use chrono::{TimeZone, Utc};

    use super::*;
    use crate::types::EventId;

    fn name(s: &str) -> EpicName {
        EpicName::new(s).unwrap()
    }

    fn titled(title: &str) -> CalendarEvent {
        CalendarEvent::new(
            EventId::new("id").unwrap(),
            title,
            Utc.with_ymd_and_hms(2025, 9, 22, 8, 0, 0).unwrap(),
            Utc.with_ymd_and_hms(2025, 9, 22, 9, 0, 0).unwrap(),
        )
        .unwrap()
    }

    #[test]
    fn case_sensitive_epic() {
        let delta = Epic::new(name("Delta"), "Delta").case_sensitive(true);
        assert_eq!(matches(&delta, &titled("Delta Review")), Ok(true));
        assert_eq!(matches(&delta, &titled("delta review")), Ok(false));
    }

    #[test]
    fn case_insensitive_epic() {
        let delta = Epic::new(name("Delta"), "Delta");
        assert_eq!(matches(&delta, &titled("Delta Review")), Ok(true));
        assert_eq!(matches(&delta, &titled("delta review")), Ok(true));
    }

    #[test]
    fn keyword_is_searched_not_anchored() {
        let epic = Epic::new(name("Sync"), "sync");
        assert_eq!(matches(&epic, &titled("Weekly sync with design")), Ok(true));
    }

    #[test]
    fn keyword_is_a_regex() {
        let epic = Epic::new(name("Reviews"), r"^(code|design) review\b");
        assert_eq!(matches(&epic, &titled("Design review: onboarding")), Ok(true));
        assert_eq!(matches(&epic, &titled("Prep for design review")), Ok(false));
    }

    #[test]
    fn only_enabled_fields_are_searched() {
        let event = titled("Standup")
            .with_description("daily alpha sync")
            .with_location("Alpha room");

        let title_only = Epic::new(name("Alpha"), "alpha").targets(true, false, false);
        assert_eq!(matches(&title_only, &event), Ok(false));

        let description = Epic::new(name("Alpha"), "alpha").targets(false, true, false);
        assert_eq!(matches(&description, &event), Ok(true));

        let location = Epic::new(name("Room"), "room").targets(false, false, true);
        assert_eq!(matches(&location, &event), Ok(true));
    }

    #[test]
    fn missing_fields_do_not_match() {
        let epic = Epic::new(name("Anything"), ".*").targets(false, true, true);
        assert_eq!(matches(&epic, &titled("No details")), Ok(false));
    }

    #[test]
    fn invalid_pattern_fails_compilation() {
        let epic = Epic::new(name("Broken"), "(unclosed");
        let err = EpicMatcher::new(&epic).unwrap_err();
        assert!(matches!(err, EpicError::PatternCompilation { ref keyword, .. } if keyword == "(unclosed"));
    }

    #[test]
    fn matching_events_filters_a_group() {
        let events = [titled("Alpha kickoff"), titled("Beta"), titled("alpha retro")];
        let group = BucketedEvents {
            bucket: crate::bucket::TimeBucket {
                start: Utc.with_ymd_and_hms(2025, 9, 22, 0, 0, 0).unwrap(),
                end: Utc.with_ymd_and_hms(2025, 9, 23, 0, 0, 0).unwrap(),
            },
            events: events.iter().collect(),
        };
        let epic = Epic::new(name("Alpha"), "alpha");
        let matched = epic.matcher().unwrap().matching_events(&group);
        let titles: Vec<_> = matched.iter().map(|e| e.title.as_str()).collect();
        assert_eq!(titles, vec!["Alpha kickoff", "alpha retro"]);
    }

    #[test]
    fn epic_deserializes_with_defaults() {
        let epic: Epic = serde_json::from_str(r#"{"name":"Alpha","keyword":"alpha"}"#).unwrap();
        assert_eq!(epic, Epic::new(name("Alpha"), "alpha"));
        assert_eq!(epic.color, DEFAULT_COLOR);
    }

    // ========== EpicSet Tests ==========

    #[test]
    fn set_rejects_duplicate_names() {
        let mut set = EpicSet::new();
        set.add(Epic::new(name("Alpha"), "alpha")).unwrap();
        assert_eq!(
            set.add(Epic::new(name("Alpha"), "other")),
            Err(EpicError::DuplicateName { name: name("Alpha") })
        );
        assert_eq!(set.len(), 1);
    }

    #[test]
    fn set_validates_epics() {
        let mut set = EpicSet::new();
        assert!(matches!(
            set.add(Epic::new(name("Blank"), "  ")),
            Err(EpicError::EmptyKeyword { .. })
        ));
        assert!(matches!(
            set.add(Epic::new(name("Blind"), "x").targets(false, false, false)),
            Err(EpicError::NoMatchTarget { .. })
        ));
        assert!(matches!(
            set.add(Epic::new(name("Broken"), "[")),
            Err(EpicError::PatternCompilation { .. })
        ));
        assert!(set.is_empty());
    }

    #[test]
    fn set_replace_keeps_position() {
        let mut set =
            EpicSet::try_from(vec![Epic::new(name("Alpha"), "a"), Epic::new(name("Beta"), "b")])
                .unwrap();

        set.replace("Alpha", Epic::new(name("Alpha"), "alpha")).unwrap();
        set.replace("Alpha", Epic::new(name("Gamma"), "gamma")).unwrap();
        let names: Vec<_> = set.iter().map(|e| e.name.as_str()).collect();
        assert_eq!(names, vec!["Gamma", "Beta"]);

        assert_eq!(
            set.replace("Gamma", Epic::new(name("Beta"), "b")),
            Err(EpicError::DuplicateName { name: name("Beta") })
        );
        assert!(matches!(
            set.replace("Alpha", Epic::new(name("Alpha"), "a")),
            Err(EpicError::UnknownEpic { .. })
        ));
    }

    #[test]
    fn set_remove() {
        let mut set = EpicSet::try_from(vec![Epic::new(name("Alpha"), "a")]).unwrap();
        assert!(matches!(set.remove("Beta"), Err(EpicError::UnknownEpic { .. })));
        assert_eq!(set.remove("Alpha").unwrap().keyword, "a");
        assert!(set.get("Alpha").is_none());
    }
}
