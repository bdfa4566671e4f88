use chrono::{DateTime, TimeDelta, Utc};

use authcore_core::{Clock, SystemClock};

/// Token lifetime arithmetic (transport-agnostic).
///
/// Holds a default lifetime and a clock, nothing else: extending a lifetime
/// returns the new duration for the caller to pass back in, the service does
/// not remember it. Decoding and signature checks happen elsewhere.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TokenExpiryService<C = SystemClock> {
    default_lifetime: TimeDelta,
    clock: C,
}

impl TokenExpiryService<SystemClock> {
    /// Service on the wall clock. Negative lifetimes are clamped to zero.
    pub fn new(default_lifetime: TimeDelta) -> Self {
        Self::with_clock(default_lifetime, SystemClock)
    }

    pub fn from_millis(default_lifetime_ms: u64) -> Self {
        Self::new(millis(default_lifetime_ms))
    }
}

impl<C: Clock> TokenExpiryService<C> {
    pub fn with_clock(default_lifetime: TimeDelta, clock: C) -> Self {
        Self {
            default_lifetime: default_lifetime.max(TimeDelta::zero()),
            clock,
        }
    }

    pub fn default_lifetime(&self) -> TimeDelta {
        self.default_lifetime
    }

    pub fn clock(&self) -> &C {
        &self.clock
    }

    /// `now - created_at < lifetime`.
    ///
    /// Strict: a token whose lifetime ends exactly now is expired. A
    /// `created_at` in the future counts as valid.
    pub fn is_valid(&self, created_at: DateTime<Utc>, lifetime: Option<TimeDelta>) -> bool {
        let lifetime = lifetime.unwrap_or(self.default_lifetime);
        let elapsed = self.clock.now().signed_duration_since(created_at);
        let valid = elapsed < lifetime;
        tracing::trace!(
            elapsed_ms = elapsed.num_milliseconds(),
            lifetime_ms = lifetime.num_milliseconds(),
            valid,
            "evaluated token lifetime"
        );
        valid
    }

    /// `issued_at + lifetime`, defaulting to now and the default lifetime.
    ///
    /// Saturates at the latest representable instant.
    pub fn expiry_date(
        &self,
        issued_at: Option<DateTime<Utc>>,
        lifetime: Option<TimeDelta>,
    ) -> DateTime<Utc> {
        let issued_at = issued_at.unwrap_or_else(|| self.clock.now());
        let lifetime = lifetime.unwrap_or(self.default_lifetime);
        issued_at
            .checked_add_signed(lifetime)
            .unwrap_or(DateTime::<Utc>::MAX_UTC)
    }

    /// New lifetime after extending: `(now - created_at) + extension`,
    /// capped at `max_lifetime` when given.
    pub fn extend_lifetime(
        &self,
        created_at: DateTime<Utc>,
        extension: TimeDelta,
        max_lifetime: Option<TimeDelta>,
    ) -> TimeDelta {
        let elapsed = self.clock.now().signed_duration_since(created_at);
        // Overflow can only happen in the direction of the extension.
        let extended = elapsed.checked_add(&extension).unwrap_or(if extension < TimeDelta::zero() {
            TimeDelta::MIN
        } else {
            TimeDelta::MAX
        });
        match max_lifetime {
            Some(max) if extended > max => max,
            _ => extended,
        }
    }
}

/// Millisecond count as a [`TimeDelta`], saturating at its maximum.
pub fn millis(ms: u64) -> TimeDelta {
    i64::try_from(ms)
        .ok()
        .and_then(TimeDelta::try_milliseconds)
        .unwrap_or(TimeDelta::MAX)
}
