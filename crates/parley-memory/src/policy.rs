//! Store limits and the expiry predicate.

use crate::error::MemoryError;
use chrono::{DateTime, TimeDelta, Utc};

/// Default maximum number of sessions held at once.
pub const DEFAULT_MAX_ENTRIES: usize = 1000;
/// Default idle time before a session expires.
pub const DEFAULT_TTL_SECONDS: u64 = 3600;

/// Capacity and time-to-live fixed at store construction.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct StoreLimits {
    max_entries: usize,
    ttl_seconds: u64,
}

impl StoreLimits {
    /// Validate and build limits; both values must be positive.
    pub fn new(max_entries: usize, ttl_seconds: u64) -> Result<Self, MemoryError> {
        if max_entries == 0 {
            return Err(MemoryError::InvalidLimits(
                "max_entries must be greater than zero".to_string(),
            ));
        }
        if ttl_seconds == 0 {
            return Err(MemoryError::InvalidLimits(
                "ttl_seconds must be greater than zero".to_string(),
            ));
        }
        Ok(Self {
            max_entries,
            ttl_seconds,
        })
    }

    pub fn max_entries(&self) -> usize {
        self.max_entries
    }

    pub fn ttl_seconds(&self) -> u64 {
        self.ttl_seconds
    }

    /// TTL as a signed delta, saturating for values chrono cannot represent.
    pub fn ttl(&self) -> TimeDelta {
        i64::try_from(self.ttl_seconds)
            .ok()
            .and_then(TimeDelta::try_seconds)
            .unwrap_or(TimeDelta::MAX)
    }
}

impl Default for StoreLimits {
    fn default() -> Self {
        Self {
            max_entries: DEFAULT_MAX_ENTRIES,
            ttl_seconds: DEFAULT_TTL_SECONDS,
        }
    }
}

/// Whether an entry last touched at `last_accessed_at` is expired at `now`.
///
/// An entry is live for `ttl` after its last access and expired from that
/// instant on. A clock that moved backwards never expires an entry.
pub fn is_expired(last_accessed_at: DateTime<Utc>, now: DateTime<Utc>, ttl: TimeDelta) -> bool {
    now.signed_duration_since(last_accessed_at) >= ttl
}

#[cfg(test)]
mod tests {
    use super::{StoreLimits, is_expired};
    use crate::MemoryError;
    use chrono::{DateTime, TimeDelta, Utc};
    use pretty_assertions::assert_eq;

    #[test]
    fn limits_reject_zero_values() {
        assert!(matches!(
            StoreLimits::new(0, 10),
            Err(MemoryError::InvalidLimits(_))
        ));
        assert!(matches!(
            StoreLimits::new(10, 0),
            Err(MemoryError::InvalidLimits(_))
        ));
        let limits = StoreLimits::new(2, 30).expect("limits");
        assert_eq!(limits.max_entries(), 2);
        assert_eq!(limits.ttl(), TimeDelta::seconds(30));
    }

    #[test]
    fn huge_ttl_saturates() {
        let limits = StoreLimits::new(1, u64::MAX).expect("limits");
        assert_eq!(limits.ttl(), TimeDelta::MAX);
    }

    #[test]
    fn expiry_boundary_is_inclusive() {
        let start = DateTime::<Utc>::UNIX_EPOCH;
        let ttl = TimeDelta::seconds(10);
        assert!(!is_expired(start, start, ttl));
        assert!(!is_expired(start, start + TimeDelta::seconds(9), ttl));
        assert!(is_expired(start, start + TimeDelta::seconds(10), ttl));
        assert!(is_expired(start, start + TimeDelta::seconds(11), ttl));
    }

    #[test]
    fn backwards_clock_does_not_expire() {
        let start = DateTime::<Utc>::UNIX_EPOCH + TimeDelta::seconds(100);
        assert!(!is_expired(
            start,
            start - TimeDelta::seconds(50),
            TimeDelta::seconds(10)
        ));
    }
}
