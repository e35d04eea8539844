//! Yield compounding.
//!
//! A compounding round takes base asset (paid in by the operator, or
//! bought with harvested rewards) and folds it back into the pool without
//! minting shares:
//!
//! 1. Skim the owner fee (`harvested × fee / 100 000`), sell it for
//!    stablecoin and credit the reserve.
//! 2. Add the carried `unallocated_base` to what remains and sell half of
//!    it for stablecoin.
//! 3. Add both halves as liquidity and stake the position.
//! 4. Leftover stablecoin joins the reserve; leftover base is carried to
//!    the next round.
//!
//! Every swap whose quote rounds to zero is skipped, and a pairing too small
//! to mint liquidity leaves its inputs as leftovers.

use alloy_primitives::Address;
use tracing::{debug, info};

use crate::config::VaultTokens;
use crate::domain::{Amount, Asset, CompoundReceipt, Liquidity, PercentMil, Timestamp};
use crate::error::{AdapterError, Result};
use crate::ledger::CapitalLedger;
use crate::traits::{AmmAdapter, StakingAdapter, TokenBank};

/// Runs compounding rounds against one environment.
#[derive(Debug, Clone, Copy)]
pub struct Compounder<'a> {
    tokens: &'a VaultTokens,
    deadline: Timestamp,
}

impl<'a> Compounder<'a> {
    /// Compounder swapping and adding liquidity with `deadline`.
    #[must_use]
    pub const fn new(tokens: &'a VaultTokens, deadline: Timestamp) -> Self {
        Self { tokens, deadline }
    }

    /// Sells `rewards` reward tokens held by the vault for base asset.
    ///
    /// # Errors
    ///
    /// Any adapter failure.
    pub fn convert_rewards<E: AmmAdapter + TokenBank>(
        &self,
        env: &mut E,
        rewards: Amount,
    ) -> Result<Amount> {
        self.sell(env, rewards, Asset::Reward, Asset::Base)
    }

    /// Folds `harvested` base already held by the vault into the pool.
    ///
    /// # Errors
    ///
    /// Any adapter failure, or [`VaultError::Overflow`](crate::error::VaultError::Overflow).
    pub fn compound<E: AmmAdapter + StakingAdapter + TokenBank>(
        &self,
        env: &mut E,
        ledger: &mut CapitalLedger,
        harvested: Amount,
        fee: PercentMil,
    ) -> Result<CompoundReceipt> {
        let mut owner_fee_base = fee.apply(harvested)?;
        let owner_fee_stable = self.sell(env, owner_fee_base, Asset::Base, Asset::Stable)?;
        if owner_fee_stable.is_zero() {
            owner_fee_base = Amount::ZERO;
        }
        ledger.credit_reserve(owner_fee_stable)?;

        let pairable = harvested
            .safe_sub(&owner_fee_base, "compound remainder")?
            .safe_add(&ledger.state().unallocated_base(), "compound remainder")?;
        let mut half = Amount::new(pairable.get() / 2);
        let stable = self.sell(env, half, Asset::Base, Asset::Stable)?;
        if stable.is_zero() {
            half = Amount::ZERO;
        }
        let base = pairable.saturating_sub(&half);

        let (liquidity, base_used, stable_used) = self.pair(env, base, stable)?;
        if !liquidity.is_zero() {
            ledger.accrue(liquidity)?;
        }
        let stable_to_reserve = stable.saturating_sub(&stable_used);
        let unallocated_base = base.saturating_sub(&base_used);
        ledger.credit_reserve(stable_to_reserve)?;
        ledger.set_unallocated_base(unallocated_base);

        let receipt = CompoundReceipt {
            harvested,
            owner_fee_base,
            owner_fee_stable,
            liquidity,
            stable_to_reserve,
            unallocated_base,
        };
        info!(
            target: "compounder",
            %harvested,
            %owner_fee_stable,
            %liquidity,
            %unallocated_base,
            "profits compounded"
        );
        Ok(receipt)
    }

    /// Sells `amount` of `from`, returning zero if nothing would come back.
    fn sell<E: AmmAdapter + TokenBank>(
        &self,
        env: &mut E,
        amount: Amount,
        from: Asset,
        to: Asset,
    ) -> Result<Amount> {
        if amount.is_zero() {
            return Ok(Amount::ZERO);
        }
        let quoted = env.quote_out(amount, from, to)?;
        if quoted.is_zero() {
            debug!(target: "compounder", %amount, %from, %to, "dust swap skipped");
            return Ok(Amount::ZERO);
        }
        let router = env.router();
        env.approve(self.token(from), router, amount)?;
        Ok(env.swap_exact(amount, from, to, quoted, self.deadline)?)
    }

    /// Adds and stakes liquidity; returns `(liquidity, base_used, stable_used)`.
    fn pair<E: AmmAdapter + StakingAdapter + TokenBank>(
        &self,
        env: &mut E,
        base: Amount,
        stable: Amount,
    ) -> Result<(Liquidity, Amount, Amount)> {
        if base.is_zero() || stable.is_zero() {
            return Ok((Liquidity::ZERO, Amount::ZERO, Amount::ZERO));
        }
        let router = env.router();
        env.approve(self.tokens.base, router, base)?;
        env.approve(self.tokens.stable, router, stable)?;
        let added = env.add_liquidity(base, stable, self.deadline);
        // the router may take less than approved
        env.approve(self.tokens.base, router, Amount::ZERO)?;
        env.approve(self.tokens.stable, router, Amount::ZERO)?;
        let delta = match added {
            Ok(delta) => delta,
            Err(AdapterError::InvalidQuantity(reason)) => {
                debug!(target: "compounder", reason, "pairing too small to mint");
                return Ok((Liquidity::ZERO, Amount::ZERO, Amount::ZERO));
            }
            Err(err) => return Err(err.into()),
        };
        let farm = env.farm();
        env.approve(self.tokens.position, farm, delta.liquidity().into())?;
        env.stake(delta.liquidity())?;
        Ok((delta.liquidity(), delta.base_used(), delta.stable_used()))
    }

    const fn token(&self, asset: Asset) -> Address {
        match asset {
            Asset::Base => self.tokens.base,
            Asset::Stable => self.tokens.stable,
            Asset::Reward => self.tokens.reward,
        }
    }
}
