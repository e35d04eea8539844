//! Reward-program seam for the vault's AMM position.

use alloy_primitives::Address;

use crate::domain::{Amount, Liquidity};
use crate::error::AdapterError;

/// Staking program that holds the vault's position and emits rewards.
///
/// Claiming never touches the staked principal.
pub trait StakingAdapter {
    /// Address the vault approves before staking.
    #[must_use]
    fn farm(&self) -> Address;

    /// Moves `liquidity` from the vault into the program.
    ///
    /// # Errors
    ///
    /// [`AdapterError::InsufficientAllowance`] or
    /// [`AdapterError::InsufficientBalance`] if the vault cannot fund it.
    fn stake(&mut self, liquidity: Liquidity) -> Result<(), AdapterError>;

    /// Returns `liquidity` from the program to the vault.
    ///
    /// # Errors
    ///
    /// [`AdapterError::InsufficientStake`] beyond the staked amount.
    fn unstake(&mut self, liquidity: Liquidity) -> Result<(), AdapterError>;

    /// Rewards accrued and not yet claimed.
    ///
    /// # Errors
    ///
    /// Adapter-specific.
    fn pending_rewards(&self) -> Result<Amount, AdapterError>;

    /// Pays accrued rewards to the vault and returns the amount.
    ///
    /// # Errors
    ///
    /// Adapter-specific.
    fn claim(&mut self) -> Result<Amount, AdapterError>;

    /// Position currently staked by the vault.
    #[must_use]
    fn staked(&self) -> Liquidity;
}
