//! Seconds-resolution clock readings.

use core::fmt;

/// A point in time in whole seconds since the environment's epoch.
///
/// Used for command deadlines and for staking reward accrual.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default)]
#[cfg_attr(
    feature = "serde",
    derive(serde::Serialize, serde::Deserialize),
    serde(transparent)
)]
pub struct Timestamp(u64);

impl Timestamp {
    /// The epoch.
    pub const ZERO: Self = Self(0);

    /// The far future; a deadline that never expires.
    pub const NEVER: Self = Self(u64::MAX);

    /// Wraps a raw seconds value.
    #[must_use]
    pub const fn new(secs: u64) -> Self {
        Self(secs)
    }

    /// Returns the raw seconds value.
    #[must_use]
    pub const fn get(&self) -> u64 {
        self.0
    }

    /// Adds `secs`, saturating at [`Timestamp::NEVER`].
    #[must_use]
    pub const fn plus(&self, secs: u64) -> Self {
        Self(self.0.saturating_add(secs))
    }

    /// Seconds elapsed since `earlier`, zero if `earlier` is later.
    #[must_use]
    pub const fn since(&self, earlier: Self) -> u64 {
        self.0.saturating_sub(earlier.0)
    }

    /// Returns `true` if a deadline of `self` has passed at `now`.
    #[must_use]
    pub const fn has_expired(&self, now: Self) -> bool {
        now.0 > self.0
    }
}

impl fmt::Display for Timestamp {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "t={}", self.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn deadline_is_inclusive() {
        let deadline = Timestamp::new(100);
        assert!(!deadline.has_expired(Timestamp::new(100)));
        assert!(deadline.has_expired(Timestamp::new(101)));
        assert!(!Timestamp::NEVER.has_expired(Timestamp::new(u64::MAX)));
    }

    #[test]
    fn arithmetic_saturates() {
        assert_eq!(Timestamp::NEVER.plus(1), Timestamp::NEVER);
        assert_eq!(Timestamp::new(5).since(Timestamp::new(9)), 0);
        assert_eq!(Timestamp::new(9).since(Timestamp::new(5)), 4);
    }
}
