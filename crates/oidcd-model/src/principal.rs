//! Identities and principals.
//!
//! An identity owns an ordered list of claims and, optionally, an actor
//! identity representing a delegation chain (the party acting on the
//! subject's behalf). A principal owns one or more identities.

use serde::{Deserialize, Serialize};

use crate::claim::Claim;
use crate::error::{Error, Result};

/// A set of claims describing one authenticated identity.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Identity {
    /// Claims, in insertion order.
    pub claims: Vec<Claim>,

    /// The identity acting on this identity's behalf, if any.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub actor: Option<Box<Identity>>,
}

impl Identity {
    /// Creates an empty identity.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds a claim with no destinations.
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidArgument`] if the type or value is empty.
    pub fn add_claim(
        &mut self,
        claim_type: impl Into<String>,
        value: impl Into<String>,
    ) -> Result<()> {
        let claim_type = claim_type.into();
        let value = value.into();
        if claim_type.is_empty() {
            return Err(Error::InvalidArgument(
                "the claim type cannot be empty".to_string(),
            ));
        }
        if value.is_empty() {
            return Err(Error::InvalidArgument(
                "the claim value cannot be empty".to_string(),
            ));
        }

        self.claims.push(Claim::new(claim_type, value));
        Ok(())
    }

    /// Adds a claim tagged with one or more destinations.
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidArgument`] if the type or value is empty,
    /// or if any destination contains a space.
    pub fn add_claim_with_destinations<I, S>(
        &mut self,
        claim_type: impl Into<String>,
        value: impl Into<String>,
        destinations: I,
    ) -> Result<()>
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        self.add_claim(claim_type, value)?;

        if let Some(claim) = self.claims.last_mut() {
            if let Err(error) = claim.set_destinations(destinations) {
                self.claims.pop();
                return Err(error);
            }
        }

        Ok(())
    }

    /// Returns the first claim of the given type.
    #[must_use]
    pub fn find_first(&self, claim_type: &str) -> Option<&Claim> {
        self.claims.iter().find(|claim| claim.claim_type == claim_type)
    }

    /// Returns the value of the first claim of the given type.
    #[must_use]
    pub fn claim_value(&self, claim_type: &str) -> Option<&str> {
        self.find_first(claim_type).map(|claim| claim.value.as_str())
    }

    /// Deep-copies this identity, keeping only the claims accepted by
    /// `filter` and recursing into the actor chain with the same filter.
    #[must_use]
    pub fn clone_filtered(&self, filter: &dyn Fn(&Claim) -> bool) -> Self {
        Self {
            claims: self
                .claims
                .iter()
                .filter(|claim| filter(claim))
                .cloned()
                .collect(),
            actor: self
                .actor
                .as_ref()
                .map(|actor| Box::new(actor.clone_filtered(filter))),
        }
    }
}

/// The authenticated principal carried by a ticket.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Principal {
    /// Identities, in insertion order.
    pub identities: Vec<Identity>,
}

impl Principal {
    /// Creates an empty principal.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a principal owning a single identity.
    #[must_use]
    pub fn from_identity(identity: Identity) -> Self {
        Self {
            identities: vec![identity],
        }
    }

    /// Returns the first claim of the given type across all identities.
    #[must_use]
    pub fn find_first(&self, claim_type: &str) -> Option<&Claim> {
        self.identities
            .iter()
            .find_map(|identity| identity.find_first(claim_type))
    }

    /// Returns the value of the first claim of the given type.
    #[must_use]
    pub fn claim_value(&self, claim_type: &str) -> Option<&str> {
        self.find_first(claim_type).map(|claim| claim.value.as_str())
    }

    /// Iterates over every claim of every identity, in order.
    pub fn claims(&self) -> impl Iterator<Item = &Claim> {
        self.identities.iter().flat_map(|identity| identity.claims.iter())
    }

    /// Deep-copies this principal, filtering the claims of every identity
    /// (actor chains included).
    #[must_use]
    pub fn clone_filtered(&self, filter: &dyn Fn(&Claim) -> bool) -> Self {
        Self {
            identities: self
                .identities
                .iter()
                .map(|identity| identity.clone_filtered(filter))
                .collect(),
        }
    }
}
