//! The authentication ticket and its reserved property accessors.
//!
//! Multi-valued properties (audiences, presenters, resources, scopes) are
//! stored as a single space-separated string with no entry containing a
//! space. That encoding is part of the token-compatibility contract with
//! deployed tokens and must not change without a version marker.

use chrono::Duration;
use serde::{Deserialize, Serialize};

use crate::claim::Claim;
use crate::error::{Error, Result};
use crate::principal::Principal;
use crate::properties::Properties;
use crate::types::{properties, ConfidentialityLevel, TokenKind};

/// The authenticated principal plus metadata that every token kind
/// serializes.
///
/// A ticket is owned exclusively by the request that created it; use
/// [`Ticket::filtered`] to branch its lifetime.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Ticket {
    /// The authenticated principal.
    pub principal: Principal,

    /// Ticket metadata.
    pub properties: Properties,

    /// Authentication scheme name.
    pub scheme: String,
}

impl Ticket {
    /// Creates a ticket.
    #[must_use]
    pub fn new(principal: Principal, properties: Properties, scheme: impl Into<String>) -> Self {
        Self {
            principal,
            properties,
            scheme: scheme.into(),
        }
    }

    /// Returns the value of the given property, if present.
    #[must_use]
    pub fn get_property(&self, name: &str) -> Option<&str> {
        self.properties.get(name)
    }

    /// Adds, updates or removes a property; empty values remove it.
    pub fn set_property(&mut self, name: &str, value: Option<&str>) {
        self.properties.set(name, value);
    }

    /// Determines whether the given property exists with a non-empty
    /// value.
    #[must_use]
    pub fn has_property(&self, name: &str) -> bool {
        self.properties.has(name)
    }

    // ------------------------------------------------------------------
    // Multi-valued properties
    // ------------------------------------------------------------------

    /// Returns the audiences list, duplicates excluded.
    #[must_use]
    pub fn audiences(&self) -> Vec<String> {
        self.get_list(properties::AUDIENCES)
    }

    /// Replaces the audiences list.
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidArgument`] if any audience is empty or
    /// contains a space; the ticket is left unchanged in that case.
    pub fn set_audiences<I, S>(&mut self, audiences: I) -> Result<()>
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        self.set_list(properties::AUDIENCES, audiences, "audiences")
    }

    /// Determines whether the ticket contains at least one audience.
    #[must_use]
    pub fn has_audiences(&self) -> bool {
        self.has_property(properties::AUDIENCES)
    }

    /// Determines whether the ticket contains the given audience.
    #[must_use]
    pub fn has_audience(&self, audience: &str) -> bool {
        self.list_contains(properties::AUDIENCES, audience)
    }

    /// Returns the presenters list, duplicates excluded.
    #[must_use]
    pub fn presenters(&self) -> Vec<String> {
        self.get_list(properties::PRESENTERS)
    }

    /// Replaces the presenters list.
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidArgument`] if any presenter is empty or
    /// contains a space; the ticket is left unchanged in that case.
    pub fn set_presenters<I, S>(&mut self, presenters: I) -> Result<()>
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        self.set_list(properties::PRESENTERS, presenters, "presenters")
    }

    /// Determines whether the ticket contains at least one presenter.
    #[must_use]
    pub fn has_presenters(&self) -> bool {
        self.has_property(properties::PRESENTERS)
    }

    /// Determines whether the ticket contains the given presenter.
    #[must_use]
    pub fn has_presenter(&self, presenter: &str) -> bool {
        self.list_contains(properties::PRESENTERS, presenter)
    }

    /// Returns the resources list, duplicates excluded.
    #[must_use]
    pub fn resources(&self) -> Vec<String> {
        self.get_list(properties::RESOURCES)
    }

    /// Replaces the resources list.
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidArgument`] if any resource is empty or
    /// contains a space; the ticket is left unchanged in that case.
    pub fn set_resources<I, S>(&mut self, resources: I) -> Result<()>
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        self.set_list(properties::RESOURCES, resources, "resources")
    }

    /// Determines whether the ticket contains at least one resource.
    #[must_use]
    pub fn has_resources(&self) -> bool {
        self.has_property(properties::RESOURCES)
    }

    /// Determines whether the ticket contains the given resource.
    #[must_use]
    pub fn has_resource(&self, resource: &str) -> bool {
        self.list_contains(properties::RESOURCES, resource)
    }

    /// Returns the scopes list, duplicates excluded.
    #[must_use]
    pub fn scopes(&self) -> Vec<String> {
        self.get_list(properties::SCOPES)
    }

    /// Replaces the scopes list.
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidArgument`] if any scope is empty or
    /// contains a space; the ticket is left unchanged in that case.
    pub fn set_scopes<I, S>(&mut self, scopes: I) -> Result<()>
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        self.set_list(properties::SCOPES, scopes, "scopes")
    }

    /// Determines whether the ticket contains at least one scope.
    #[must_use]
    pub fn has_scopes(&self) -> bool {
        self.has_property(properties::SCOPES)
    }

    /// Determines whether the ticket contains the given scope.
    #[must_use]
    pub fn has_scope(&self, scope: &str) -> bool {
        self.list_contains(properties::SCOPES, scope)
    }

    // ------------------------------------------------------------------
    // Lifetimes
    // ------------------------------------------------------------------

    /// Returns the authorization code lifetime override, if present and
    /// parsable.
    #[must_use]
    pub fn authorization_code_lifetime(&self) -> Option<Duration> {
        self.lifetime(properties::AUTHORIZATION_CODE_LIFETIME)
    }

    /// Sets or removes the authorization code lifetime override.
    pub fn set_authorization_code_lifetime(&mut self, lifetime: Option<Duration>) {
        self.set_lifetime(properties::AUTHORIZATION_CODE_LIFETIME, lifetime);
    }

    /// Returns the access token lifetime override, if present and
    /// parsable.
    #[must_use]
    pub fn access_token_lifetime(&self) -> Option<Duration> {
        self.lifetime(properties::ACCESS_TOKEN_LIFETIME)
    }

    /// Sets or removes the access token lifetime override.
    pub fn set_access_token_lifetime(&mut self, lifetime: Option<Duration>) {
        self.set_lifetime(properties::ACCESS_TOKEN_LIFETIME, lifetime);
    }

    /// Returns the identity token lifetime override, if present and
    /// parsable.
    #[must_use]
    pub fn identity_token_lifetime(&self) -> Option<Duration> {
        self.lifetime(properties::IDENTITY_TOKEN_LIFETIME)
    }

    /// Sets or removes the identity token lifetime override.
    pub fn set_identity_token_lifetime(&mut self, lifetime: Option<Duration>) {
        self.set_lifetime(properties::IDENTITY_TOKEN_LIFETIME, lifetime);
    }

    /// Returns the refresh token lifetime override, if present and
    /// parsable.
    #[must_use]
    pub fn refresh_token_lifetime(&self) -> Option<Duration> {
        self.lifetime(properties::REFRESH_TOKEN_LIFETIME)
    }

    /// Sets or removes the refresh token lifetime override.
    pub fn set_refresh_token_lifetime(&mut self, lifetime: Option<Duration>) {
        self.set_lifetime(properties::REFRESH_TOKEN_LIFETIME, lifetime);
    }

    /// Returns the lifetime override for the given kind, if present and
    /// parsable.
    #[must_use]
    pub fn token_lifetime(&self, kind: TokenKind) -> Option<Duration> {
        match kind {
            TokenKind::AuthorizationCode => self.authorization_code_lifetime(),
            TokenKind::AccessToken => self.access_token_lifetime(),
            TokenKind::IdentityToken => self.identity_token_lifetime(),
            TokenKind::RefreshToken => self.refresh_token_lifetime(),
        }
    }

    // ------------------------------------------------------------------
    // Usage, identity and confidentiality
    // ------------------------------------------------------------------

    /// Returns the unique identifier of this ticket, if any.
    #[must_use]
    pub fn ticket_id(&self) -> Option<&str> {
        self.get_property(properties::TICKET_ID)
    }

    /// Sets the unique identifier of this ticket; an empty value removes
    /// it.
    pub fn set_ticket_id(&mut self, identifier: &str) {
        self.set_property(properties::TICKET_ID, Some(identifier));
    }

    /// Returns the usage tag of this ticket, if any.
    #[must_use]
    pub fn usage(&self) -> Option<&str> {
        self.get_property(properties::USAGE)
    }

    /// Sets the usage tag of this ticket.
    pub fn set_usage(&mut self, usage: TokenKind) {
        self.set_property(properties::USAGE, Some(usage.as_str()));
    }

    /// Determines whether this ticket corresponds to an access token.
    ///
    /// A ticket with no usage tag matches none of the kind predicates.
    #[must_use]
    pub fn is_access_token(&self) -> bool {
        self.usage_matches(TokenKind::AccessToken)
    }

    /// Determines whether this ticket corresponds to an authorization
    /// code.
    #[must_use]
    pub fn is_authorization_code(&self) -> bool {
        self.usage_matches(TokenKind::AuthorizationCode)
    }

    /// Determines whether this ticket corresponds to an identity token.
    #[must_use]
    pub fn is_identity_token(&self) -> bool {
        self.usage_matches(TokenKind::IdentityToken)
    }

    /// Determines whether this ticket corresponds to a refresh token.
    #[must_use]
    pub fn is_refresh_token(&self) -> bool {
        self.usage_matches(TokenKind::RefreshToken)
    }

    /// Determines whether this ticket's usage tag matches the given kind,
    /// compared case-insensitively.
    #[must_use]
    pub fn usage_matches(&self, kind: TokenKind) -> bool {
        self.usage()
            .is_some_and(|usage| usage.eq_ignore_ascii_case(kind.as_str()))
    }

    /// Determines whether this ticket is marked confidential.
    ///
    /// Only an explicit `private` marker (compared case-insensitively)
    /// counts; any other stored value reads as public.
    #[must_use]
    pub fn is_confidential(&self) -> bool {
        self.get_property(properties::CONFIDENTIALITY_LEVEL)
            .is_some_and(|level| {
                level.eq_ignore_ascii_case(ConfidentialityLevel::Private.as_str())
            })
    }

    /// Sets or removes the confidentiality level.
    pub fn set_confidentiality_level(&mut self, level: Option<ConfidentialityLevel>) {
        self.set_property(
            properties::CONFIDENTIALITY_LEVEL,
            level.map(ConfidentialityLevel::as_str),
        );
    }

    // ------------------------------------------------------------------
    // Cloning
    // ------------------------------------------------------------------

    /// Deep-copies this ticket, keeping only the claims accepted by
    /// `filter`.
    ///
    /// The filter recurses into actor identities; properties and scheme
    /// are copied verbatim. Passing a filter that accepts everything
    /// yields a plain duplicate.
    #[must_use]
    pub fn filtered(&self, filter: &dyn Fn(&Claim) -> bool) -> Self {
        Self {
            principal: self.principal.clone_filtered(filter),
            properties: self.properties.clone(),
            scheme: self.scheme.clone(),
        }
    }

    fn get_list(&self, name: &str) -> Vec<String> {
        let Some(value) = self.get_property(name) else {
            return Vec::new();
        };

        let mut entries: Vec<String> = Vec::new();
        for entry in value.split_whitespace() {
            if !entries.iter().any(|existing| existing == entry) {
                entries.push(entry.to_string());
            }
        }

        entries
    }

    fn set_list<I, S>(&mut self, name: &str, values: I, what: &str) -> Result<()>
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let mut entries: Vec<String> = Vec::new();
        for value in values {
            let value = value.as_ref();
            if value.is_empty() || value.contains(' ') {
                return Err(Error::InvalidArgument(format!(
                    "the {what} cannot be empty or contain spaces"
                )));
            }

            if !entries.iter().any(|existing| existing == value) {
                entries.push(value.to_string());
            }
        }

        if entries.is_empty() {
            self.set_property(name, None);
            return Ok(());
        }

        self.set_property(name, Some(&entries.join(" ")));
        Ok(())
    }

    fn list_contains(&self, name: &str, value: &str) -> bool {
        self.get_property(name)
            .is_some_and(|list| list.split_whitespace().any(|entry| entry == value))
    }

    fn lifetime(&self, name: &str) -> Option<Duration> {
        self.get_property(name)
            .and_then(|value| value.parse::<i64>().ok())
            .filter(|seconds| *seconds >= 0)
            .map(Duration::seconds)
    }

    fn set_lifetime(&mut self, name: &str, lifetime: Option<Duration>) {
        let value = lifetime.map(|lifetime| lifetime.num_seconds().to_string());
        self.set_property(name, value.as_deref());
    }
}
