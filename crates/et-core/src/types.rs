//! Core type definitions with validation.

use std::fmt;

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Validation errors for core types.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ValidationError {
    /// The provided value was empty.
    #[error("{field} cannot be empty")]
    Empty { field: &'static str },

    /// Unknown granularity name.
    #[error("invalid granularity: {value} (expected day, week, month, quarter or year)")]
    InvalidGranularity { value: String },
}

/// Generates a validated string ID newtype with common trait implementations.
macro_rules! define_string_id {
    (
        $(#[$meta:meta])*
        $name:ident, $field_name:literal
    ) => {
        $(#[$meta])*
        #[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
        #[serde(try_from = "String", into = "String")]
        pub struct $name(String);

        impl $name {
            /// Creates a new value after validation.
            pub fn new(id: impl Into<String>) -> Result<Self, ValidationError> {
                let id = id.into();
                if id.trim().is_empty() {
                    return Err(ValidationError::Empty { field: $field_name });
                }
                Ok(Self(id))
            }

            /// Returns the value as a string slice.
            pub fn as_str(&self) -> &str {
                &self.0
            }
        }

        impl TryFrom<String> for $name {
            type Error = ValidationError;

            fn try_from(value: String) -> Result<Self, Self::Error> {
                Self::new(value)
            }
        }

        impl From<$name> for String {
            fn from(id: $name) -> Self {
                id.0
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                write!(f, "{}", self.0)
            }
        }

        impl AsRef<str> for $name {
            fn as_ref(&self) -> &str {
                &self.0
            }
        }

        impl PartialEq<str> for $name {
            fn eq(&self, other: &str) -> bool {
                self.0 == other
            }
        }
    };
}

define_string_id!(
    /// A validated calendar event identifier.
    ///
    /// Event IDs are opaque, non-empty strings (the `UID` of an ICS entry).
    /// They are presumed unique but nothing here relies on it.
    EventId, "event ID"
);

define_string_id!(
    /// A validated epic name.
    ///
    /// Names key the hour table, so an [`crate::EpicSet`] keeps them unique.
    EpicName, "epic name"
);

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn event_id_rejects_empty() {
        assert!(EventId::new("").is_err());
        assert!(EventId::new("abc@google.com").is_ok());
    }

    #[test]
    fn epic_name_rejects_blank() {
        assert_eq!(
            EpicName::new("   "),
            Err(ValidationError::Empty {
                field: "epic name"
            })
        );
        assert!(EpicName::new("Alpha").is_ok());
    }

    #[test]
    fn epic_name_serde_roundtrip() {
        let name = EpicName::new("Alpha").unwrap();
        let json = serde_json::to_string(&name).unwrap();
        assert_eq!(json, "\"Alpha\"");
        let parsed: EpicName = serde_json::from_str(&json).unwrap();
        assert_eq!(parsed, name);
    }

    #[test]
    fn event_id_serde_rejects_empty() {
        let result: Result<EventId, _> = serde_json::from_str("\"\"");
        assert!(result.is_err());
    }

    #[test]
    fn epic_name_compares_with_str() {
        let name = EpicName::new("Beta").unwrap();
        assert!(name == *"Beta");
        assert_eq!(name.as_ref(), "Beta");
    }
}
