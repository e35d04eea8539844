//! Time-based reward emission for staked positions (MasterChef style).

use std::collections::BTreeMap;

use alloy_primitives::{Address, U256};

use crate::domain::{Amount, Liquidity, Timestamp};
use crate::error::AdapterError;

/// Fixed-point scale of the per-unit reward accumulator.
const ACC_PRECISION: u128 = 1_000_000_000_000;

#[derive(Debug, Clone, Default, PartialEq, Eq)]
struct Staker {
    amount: Liquidity,
    acc_snapshot: U256,
    owed: Amount,
}

/// Emits `reward_per_second` split pro rata across all staked units.
///
/// Emission during periods with nothing staked is forfeited.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RewardFarm {
    reward_per_second: Amount,
    last_update: Timestamp,
    acc_reward_per_unit: U256,
    total_staked: Liquidity,
    stakers: BTreeMap<Address, Staker>,
}

impl RewardFarm {
    /// Creates a farm emitting `reward_per_second` from `start`.
    pub fn new(reward_per_second: Amount, start: Timestamp) -> Self {
        Self {
            reward_per_second,
            last_update: start,
            acc_reward_per_unit: U256::ZERO,
            total_staked: Liquidity::ZERO,
            stakers: BTreeMap::new(),
        }
    }

    /// Units staked by `who`.
    pub fn staked(&self, who: Address) -> Liquidity {
        self.stakers.get(&who).map(|s| s.amount).unwrap_or_default()
    }

    /// Units staked by everyone.
    pub const fn total_staked(&self) -> Liquidity {
        self.total_staked
    }

    fn accumulator_at(&self, now: Timestamp) -> U256 {
        if self.total_staked.is_zero() {
            return self.acc_reward_per_unit;
        }
        let emitted = U256::from(self.reward_per_second.get())
            * U256::from(now.since(self.last_update));
        self.acc_reward_per_unit
            + emitted * U256::from(ACC_PRECISION) / U256::from(self.total_staked.get())
    }

    fn accrued(staker: &Staker, acc: U256) -> Result<Amount, AdapterError> {
        let fresh = U256::from(staker.amount.get()) * (acc - staker.acc_snapshot)
            / U256::from(ACC_PRECISION);
        let fresh = u128::try_from(fresh).map_err(|_| AdapterError::Overflow("farm reward"))?;
        staker
            .owed
            .checked_add(&Amount::new(fresh))
            .ok_or(AdapterError::Overflow("farm reward"))
    }

    fn settle(&mut self, who: Address, now: Timestamp) -> Result<&mut Staker, AdapterError> {
        let acc = self.accumulator_at(now);
        self.acc_reward_per_unit = acc;
        self.last_update = now;
        let staker = self.stakers.entry(who).or_default();
        staker.owed = Self::accrued(staker, acc)?;
        staker.acc_snapshot = acc;
        Ok(staker)
    }

    /// Rewards `who` could claim at `now`.
    ///
    /// # Errors
    ///
    /// Returns [`AdapterError::Overflow`] if the accrual overflows.
    pub fn pending(&self, who: Address, now: Timestamp) -> Result<Amount, AdapterError> {
        match self.stakers.get(&who) {
            Some(staker) => Self::accrued(staker, self.accumulator_at(now)),
            None => Ok(Amount::ZERO),
        }
    }

    /// Adds `amount` to `who`'s stake.
    ///
    /// # Errors
    ///
    /// - [`AdapterError::InvalidQuantity`] for zero.
    /// - [`AdapterError::Overflow`] if a total overflows.
    pub fn deposit(
        &mut self,
        who: Address,
        amount: Liquidity,
        now: Timestamp,
    ) -> Result<(), AdapterError> {
        if amount.is_zero() {
            return Err(AdapterError::InvalidQuantity("stake of zero liquidity"));
        }
        let total = self
            .total_staked
            .checked_add(&amount)
            .ok_or(AdapterError::Overflow("farm total stake"))?;
        let staker = self.settle(who, now)?;
        staker.amount = staker
            .amount
            .checked_add(&amount)
            .ok_or(AdapterError::Overflow("farm stake"))?;
        self.total_staked = total;
        Ok(())
    }

    /// Removes `amount` from `who`'s stake; accrued rewards are kept.
    ///
    /// # Errors
    ///
    /// Returns [`AdapterError::InsufficientStake`] beyond the stake.
    pub fn withdraw(
        &mut self,
        who: Address,
        amount: Liquidity,
        now: Timestamp,
    ) -> Result<(), AdapterError> {
        let staked = self.staked(who);
        if amount > staked {
            return Err(AdapterError::InsufficientStake {
                staked,
                requested: amount,
            });
        }
        let staker = self.settle(who, now)?;
        staker.amount = staked.saturating_sub(&amount);
        self.total_staked = self.total_staked.saturating_sub(&amount);
        Ok(())
    }

    /// Settles and zeroes `who`'s rewards, returning the amount to pay.
    ///
    /// # Errors
    ///
    /// Returns [`AdapterError::Overflow`] if the accrual overflows.
    pub fn harvest(&mut self, who: Address, now: Timestamp) -> Result<Amount, AdapterError> {
        let staker = self.settle(who, now)?;
        Ok(core::mem::take(&mut staker.owed))
    }
}
