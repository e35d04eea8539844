//! The full collaborator bundle a vault runs against.

use crate::domain::Timestamp;

use super::{AmmAdapter, PriceOracle, StakingAdapter, TokenBank};

/// Source of the current time for deadline checks.
pub trait Clock {
    /// Current time.
    #[must_use]
    fn now(&self) -> Timestamp;
}

/// Everything a [`Vault`](crate::vault::Vault) needs from the outside
/// world.
///
/// `Clone` must yield an independent snapshot: the vault runs each command
/// against a clone and keeps it only if the command succeeds.
pub trait Environment:
    AmmAdapter + PriceOracle + StakingAdapter + TokenBank + Clock + Clone
{
}

impl<T> Environment for T where
    T: AmmAdapter + PriceOracle + StakingAdapter + TokenBank + Clock + Clone
{
}
