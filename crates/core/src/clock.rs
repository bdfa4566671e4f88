//! Clock abstraction: the only source of "now" for time-window checks.

use chrono::{DateTime, Utc};

/// Source of the current instant.
///
/// Production code uses [`SystemClock`]; tests pin time with [`FixedClock`]
/// so expiry arithmetic stays deterministic.
pub trait Clock {
    fn now(&self) -> DateTime<Utc>;
}

/// Wall-clock time (`Utc::now()`).
#[derive(Debug, Default, Copy, Clone, PartialEq, Eq)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> DateTime<Utc> {
        Utc::now()
    }
}

/// A clock frozen at a single instant.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub struct FixedClock(DateTime<Utc>);

impl FixedClock {
    pub fn new(at: DateTime<Utc>) -> Self {
        Self(at)
    }

    pub fn at(&self) -> DateTime<Utc> {
        self.0
    }
}

impl Clock for FixedClock {
    fn now(&self) -> DateTime<Utc> {
        self.0
    }
}

impl<C: Clock + ?Sized> Clock for &C {
    fn now(&self) -> DateTime<Utc> {
        (**self).now()
    }
}
