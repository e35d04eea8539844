//! Global vault state.

use core::fmt;

use super::{Amount, Liquidity, Shares};
use crate::config::GuardConfig;

/// Whether the price guard is evaluated on capital-moving commands.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum GuardState {
    /// Every deposit and withdrawal is checked against the oracle.
    #[default]
    Active,
    /// Checks are skipped until the owner re-activates the guard.
    Paused,
}

impl GuardState {
    /// Returns `true` for [`GuardState::Active`].
    #[must_use]
    pub const fn is_active(&self) -> bool {
        matches!(self, Self::Active)
    }
}

impl fmt::Display for GuardState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::Active => "active",
            Self::Paused => "paused",
        })
    }
}

/// Aggregate ledger state, owned by the
/// [`CapitalLedger`](crate::ledger::CapitalLedger).
///
/// | Field | Meaning |
/// |-------|---------|
/// | `total_shares` | Outstanding claim units |
/// | `total_pooled_value` | AMM position owned (and staked) by the vault |
/// | `reserve_stable` | Unpaired stablecoin: deposit capacity and owner capital |
/// | `total_paired_stable` | Stablecoin principal lent to depositors |
/// | `unallocated_base` | Compounding dust carried to the next round |
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PoolState {
    pub(crate) total_shares: Shares,
    pub(crate) total_pooled_value: Liquidity,
    pub(crate) reserve_stable: Amount,
    pub(crate) total_paired_stable: Amount,
    pub(crate) unallocated_base: Amount,
    pub(crate) paused: bool,
    pub(crate) guard_state: GuardState,
    pub(crate) guard: GuardConfig,
}

impl PoolState {
    /// Empty state with the given guard configuration.
    #[must_use]
    pub const fn new(guard: GuardConfig) -> Self {
        Self {
            total_shares: Shares::ZERO,
            total_pooled_value: Liquidity::ZERO,
            reserve_stable: Amount::ZERO,
            total_paired_stable: Amount::ZERO,
            unallocated_base: Amount::ZERO,
            paused: false,
            guard_state: GuardState::Active,
            guard,
        }
    }

    /// Outstanding shares.
    pub const fn total_shares(&self) -> Shares {
        self.total_shares
    }

    /// AMM position attributable to the vault.
    pub const fn total_pooled_value(&self) -> Liquidity {
        self.total_pooled_value
    }

    /// Unpaired stablecoin.
    pub const fn reserve_stable(&self) -> Amount {
        self.reserve_stable
    }

    /// Stablecoin currently paired on depositors' behalf.
    pub const fn total_paired_stable(&self) -> Amount {
        self.total_paired_stable
    }

    /// Base asset awaiting the next compounding round.
    pub const fn unallocated_base(&self) -> Amount {
        self.unallocated_base
    }

    /// Returns `true` if new deposits are refused.
    #[must_use]
    pub const fn is_paused(&self) -> bool {
        self.paused
    }

    /// Price guard state.
    #[must_use]
    pub const fn guard_state(&self) -> GuardState {
        self.guard_state
    }

    /// Active guard configuration.
    #[must_use]
    pub const fn guard(&self) -> &GuardConfig {
        &self.guard
    }
}
