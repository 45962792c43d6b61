//! The ticket metadata bag.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Metadata attached to a ticket: issuance and expiry instants plus a
/// string-to-string bag mixing reserved protocol names with custom
/// entries.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Properties {
    /// When the ticket was issued.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub issued_at: Option<DateTime<Utc>>,

    /// When the ticket expires.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub expires_at: Option<DateTime<Utc>>,

    /// Named entries, in sorted order.
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub items: BTreeMap<String, String>,
}

impl Properties {
    /// Creates an empty bag.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns the value of the given entry, if present.
    #[must_use]
    pub fn get(&self, name: &str) -> Option<&str> {
        self.items.get(name).map(String::as_str)
    }

    /// Adds, updates or removes an entry.
    ///
    /// A `None` or empty value removes the entry; empty strings are never
    /// stored. Removing an absent entry is a no-op.
    pub fn set(&mut self, name: &str, value: Option<&str>) {
        match value {
            Some(value) if !value.is_empty() => {
                self.items.insert(name.to_string(), value.to_string());
            }
            _ => {
                self.items.remove(name);
            }
        }
    }

    /// Determines whether the given entry exists with a non-empty value.
    #[must_use]
    pub fn has(&self, name: &str) -> bool {
        self.get(name).is_some_and(|value| !value.is_empty())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn set_and_get() {
        let mut properties = Properties::new();
        properties.set("usage", Some("access_token"));

        assert_eq!(properties.get("usage"), Some("access_token"));
        assert!(properties.has("usage"));
        assert!(!properties.has("ticket_id"));
    }

    #[test]
    fn empty_value_removes_the_entry() {
        let mut properties = Properties::new();
        properties.set("usage", Some("access_token"));
        properties.set("usage", Some(""));

        assert_eq!(properties.get("usage"), None);
        assert!(!properties.has("usage"));
    }

    #[test]
    fn removing_twice_is_idempotent() {
        let mut properties = Properties::new();
        properties.set("usage", Some("access_token"));
        properties.set("usage", None);
        properties.set("usage", None);

        assert_eq!(properties.get("usage"), None);
    }

    #[test]
    fn instants_round_trip_through_serde() {
        let mut properties = Properties::new();
        properties.issued_at = Some(Utc::now());
        properties.expires_at = Some(Utc::now());
        properties.set("custom", Some("value"));

        let json = serde_json::to_string(&properties).unwrap();
        let restored: Properties = serde_json::from_str(&json).unwrap();
        assert_eq!(restored, properties);
    }
}
