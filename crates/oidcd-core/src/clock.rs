//! Current-time source.
//!
//! Token expiry is always evaluated against a [`Clock`] supplied by the
//! host rather than ambient system time, so expiry behavior is
//! deterministic under test.

use chrono::{DateTime, Utc};
use std::fmt::Debug;

/// Supplies the current instant to the token lifecycle manager.
pub trait Clock: Send + Sync + Debug {
    /// Returns the current UTC instant.
    fn now(&self) -> DateTime<Utc>;
}

/// Clock backed by the operating system.
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> DateTime<Utc> {
        Utc::now()
    }
}

/// Clock pinned to a fixed instant.
///
/// Intended for tests that need reproducible expiry decisions.
#[derive(Debug, Clone, Copy)]
pub struct FixedClock(DateTime<Utc>);

impl FixedClock {
    /// Creates a clock that always reports `instant`.
    #[must_use]
    pub const fn new(instant: DateTime<Utc>) -> Self {
        Self(instant)
    }
}

impl Clock for FixedClock {
    fn now(&self) -> DateTime<Utc> {
        self.0
    }
}
