//! Claims and the per-claim destination filter.
//!
//! A claim may carry a `destinations` property naming the token kinds its
//! serialized forms are allowed to appear in. A claim without the property
//! has no declared destination and is excluded from destination-filtered
//! serialization.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

use crate::error::{Error, Result};
use crate::types::properties;

/// A typed fact about a principal.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Claim {
    /// Claim type (e.g. `sub`, `email`).
    pub claim_type: String,

    /// Claim value.
    pub value: String,

    /// Claim-level properties, including the optional destinations list.
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub properties: BTreeMap<String, String>,
}

impl Claim {
    /// Creates a claim with no properties.
    pub fn new(claim_type: impl Into<String>, value: impl Into<String>) -> Self {
        Self {
            claim_type: claim_type.into(),
            value: value.into(),
            properties: BTreeMap::new(),
        }
    }

    /// Returns the destinations associated with this claim.
    ///
    /// Duplicates are excluded case-insensitively, keeping the first
    /// occurrence; an absent property yields an empty list.
    #[must_use]
    pub fn destinations(&self) -> Vec<String> {
        let Some(value) = self.properties.get(properties::DESTINATIONS) else {
            return Vec::new();
        };

        let mut seen: Vec<String> = Vec::new();
        let mut destinations = Vec::new();
        for entry in value.split_whitespace() {
            let folded = entry.to_ascii_lowercase();
            if !seen.contains(&folded) {
                seen.push(folded);
                destinations.push(entry.to_string());
            }
        }

        destinations
    }

    /// Determines whether this claim carries the given destination,
    /// compared case-insensitively.
    #[must_use]
    pub fn has_destination(&self, destination: &str) -> bool {
        self.properties
            .get(properties::DESTINATIONS)
            .is_some_and(|value| {
                value
                    .split_whitespace()
                    .any(|entry| entry.eq_ignore_ascii_case(destination))
            })
    }

    /// Replaces the destinations associated with this claim.
    ///
    /// An empty list removes the property entirely. Duplicates are
    /// excluded case-insensitively before the space-separated join.
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidArgument`] if any destination contains a
    /// space; the claim is left unchanged in that case.
    pub fn set_destinations<I, S>(&mut self, destinations: I) -> Result<()>
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let mut folded: Vec<String> = Vec::new();
        let mut deduplicated: Vec<String> = Vec::new();
        for destination in destinations {
            let destination = destination.as_ref();
            if destination.contains(' ') {
                return Err(Error::InvalidArgument(
                    "destinations cannot contain spaces".to_string(),
                ));
            }

            let key = destination.to_ascii_lowercase();
            if !folded.contains(&key) {
                folded.push(key);
                deduplicated.push(destination.to_string());
            }
        }

        if deduplicated.is_empty() {
            self.properties.remove(properties::DESTINATIONS);
            return Ok(());
        }

        self.properties
            .insert(properties::DESTINATIONS.to_string(), deduplicated.join(" "));

        Ok(())
    }
}
