//! Journal entries emitted by committed commands.

use alloy_primitives::Address;

use super::{Amount, BasisPoints, Liquidity, OracleSource, Shares};

/// A committed state change.
///
/// Events are journaled inside the vault and roll back together with the
/// command that produced them.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum VaultEvent {
    /// Shares minted against a base deposit.
    Mint {
        caller: Address,
        beneficiary: Address,
        base: Amount,
        stable: Amount,
        liquidity: Liquidity,
        shares: Shares,
    },
    /// Shares burnt and base paid out.
    Burn {
        caller: Address,
        beneficiary: Address,
        shares: Shares,
        liquidity: Liquidity,
        payout: Amount,
    },
    /// Yield folded into the pool without minting shares.
    Compounded {
        harvested: Amount,
        owner_fee_stable: Amount,
        liquidity: Liquidity,
    },
    /// Staking rewards sent to the operator.
    RewardsClaimed { recipient: Address, amount: Amount },
    /// Owner stablecoin added to the reserve.
    CapitalDeposited { amount: Amount },
    /// Owner stablecoin taken from the reserve.
    CapitalWithdrawn { amount: Amount },
    /// Oracle feed changed.
    OracleChanged { source: OracleSource },
    /// Guard tolerance changed.
    ToleranceChanged { tolerance: BasisPoints },
    /// Guard checks suspended.
    GuardPaused,
    /// Guard checks resumed.
    GuardUnpaused,
    /// New deposits refused.
    Paused,
    /// New deposits accepted again.
    Unpaused,
    /// An account was force-exited and its payout escrowed.
    ForcedExit { account: Address, escrowed: Amount },
    /// Free capital returned to the owner during an emergency.
    CapitalSwept { amount: Amount },
    /// Escrowed base released to its account.
    RecoveredReleased { account: Address, amount: Amount },
    /// Stray token balance sent to the owner.
    Salvaged { token: Address, amount: Amount },
    /// Ownership moved.
    OwnerChanged { previous: Address, current: Address },
    /// Operator moved.
    GovernanceChanged { previous: Address, current: Address },
}
