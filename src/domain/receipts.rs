//! Outcome records returned by vault commands.

use alloy_primitives::Address;

use super::{Amount, Liquidity, Shares};

/// Outcome of a base-asset deposit.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DepositReceipt {
    /// Account credited with the shares.
    pub beneficiary: Address,
    /// Base asset taken into the pool.
    pub base_deposited: Amount,
    /// Base returned to the caller because the router did not need it.
    pub base_refunded: Amount,
    /// Stablecoin paired from the vault reserve.
    pub stable_paired: Amount,
    /// AMM position minted and staked.
    pub liquidity: Liquidity,
    /// Shares issued.
    pub shares: Shares,
}

/// How the withdrawal rebalanced the assets the AMM returned.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RebalanceLeg {
    /// No swap was needed or the swap would have produced nothing.
    Flat,
    /// Stablecoin above the principal was sold for base (price rose).
    SoldExcessStable {
        /// Stablecoin sold.
        stable_in: Amount,
        /// Base bought.
        base_out: Amount,
    },
    /// Base was sold to restore the principal (price fell).
    CoveredShortfall {
        /// Base sold.
        base_in: Amount,
        /// Stablecoin bought.
        stable_out: Amount,
    },
}

/// Outcome of a withdrawal (or a forced exit).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct WithdrawReceipt {
    /// Account whose shares were burnt.
    pub beneficiary: Address,
    /// Shares burnt, after clamping to the account balance.
    pub shares_burned: Shares,
    /// AMM position unstaked and removed.
    pub liquidity: Liquidity,
    /// Base returned by the AMM.
    pub removed_base: Amount,
    /// Stablecoin returned by the AMM.
    pub removed_stable: Amount,
    /// Rebalancing swap.
    pub leg: RebalanceLeg,
    /// Stablecoin returned to the reserve.
    pub stable_recovered: Amount,
    /// Base paid out.
    pub payout: Amount,
}

impl WithdrawReceipt {
    /// Returns `true` if the exit needed no swap.
    #[must_use]
    pub const fn is_flat(&self) -> bool {
        matches!(self.leg, RebalanceLeg::Flat)
    }
}

/// Outcome of a compounding round.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct CompoundReceipt {
    /// Base asset contributed by the caller or the harvest.
    pub harvested: Amount,
    /// Base skimmed as the owner fee.
    pub owner_fee_base: Amount,
    /// Stablecoin the owner fee was converted into.
    pub owner_fee_stable: Amount,
    /// AMM position added without minting shares.
    pub liquidity: Liquidity,
    /// Leftover stablecoin credited to the reserve.
    pub stable_to_reserve: Amount,
    /// Base carried into the next round.
    pub unallocated_base: Amount,
}

/// Outcome of a self-contained harvest.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct HarvestReceipt {
    /// Reward tokens sold.
    pub rewards: Amount,
    /// Base asset the rewards fetched.
    pub base_harvested: Amount,
    /// The compounding round fed with that base.
    pub compound: CompoundReceipt,
}

/// Outcome of an emergency exit.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct EmergencyExitReport {
    /// Force-exited accounts and the base escrowed for each.
    pub exited: Vec<(Address, Amount)>,
    /// Stablecoin reserve swept to the owner.
    pub capital_swept: Amount,
}
