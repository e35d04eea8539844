//! Depositor and operator commands.

use alloy_primitives::Address;
use tracing::info;

use super::Vault;
use crate::access::Role;
use crate::compounder::Compounder;
use crate::domain::{
    Amount, CompoundReceipt, DepositReceipt, HarvestReceipt, PercentMil, Shares, Timestamp,
    VaultEvent, WithdrawReceipt,
};
use crate::error::{Result, VaultError};
use crate::traits::Environment;

impl<E: Environment> Vault<E> {
    /// Deposits `amount` base from `caller`, pairs it with reserve
    /// stablecoin at the spot ratio, stakes the minted position and credits
    /// the shares to `beneficiary`.
    ///
    /// `caller` must have approved the vault for `amount`.  Base the router
    /// does not use is refunded to `caller`.
    ///
    /// # Errors
    ///
    /// - [`VaultError::InvalidQuantity`] for a zero or dust deposit.
    /// - [`VaultError::DeadlineExpired`] past `deadline`.
    /// - [`VaultError::Paused`] while the vault is paused.
    /// - [`VaultError::PriceGuardTriggered`] if spot and oracle disagree.
    /// - [`VaultError::CapacityExceeded`] if the reserve cannot match it.
    /// - [`VaultError::ExternalAdapterFailure`] on any adapter failure.
    pub fn deposit_base(
        &mut self,
        caller: Address,
        beneficiary: Address,
        amount: Amount,
        deadline: Timestamp,
    ) -> Result<DepositReceipt> {
        self.transact("deposit", |vault| {
            vault.deposit_inner(caller, beneficiary, amount, deadline)
        })
    }

    fn deposit_inner(
        &mut self,
        caller: Address,
        beneficiary: Address,
        amount: Amount,
        deadline: Timestamp,
    ) -> Result<DepositReceipt> {
        if amount.is_zero() {
            return Err(VaultError::InvalidQuantity("deposit of zero base"));
        }
        self.check_deadline(deadline)?;
        if self.ledger.state().is_paused() {
            return Err(VaultError::Paused);
        }
        self.check_price()?;

        let reserves = self.env.reserves()?;
        let stable_needed = reserves.quote_base(amount)?;
        if stable_needed > self.ledger.state().reserve_stable() {
            return Err(VaultError::CapacityExceeded {
                requested: amount,
                available: self.ledger.available_capacity(&reserves)?,
            });
        }
        if stable_needed.is_zero() {
            return Err(VaultError::InvalidQuantity("deposit too small to pair"));
        }

        let tokens = *self.config.tokens();
        self.env.transfer_from(tokens.base, caller, amount)?;
        let router = self.env.router();
        self.env.approve(tokens.base, router, amount)?;
        self.env.approve(tokens.stable, router, stable_needed)?;
        let delta = self.env.add_liquidity(amount, stable_needed, deadline)?;
        self.env.approve(tokens.base, router, Amount::ZERO)?;
        self.env.approve(tokens.stable, router, Amount::ZERO)?;

        let base_refunded = amount.saturating_sub(&delta.base_used());
        if !base_refunded.is_zero() {
            self.env.transfer(tokens.base, caller, base_refunded)?;
        }
        let farm = self.env.farm();
        self.env
            .approve(tokens.position, farm, delta.liquidity().into())?;
        self.env.stake(delta.liquidity())?;

        let shares = self.ledger.issue(
            beneficiary,
            delta.liquidity(),
            delta.base_used(),
            delta.stable_used(),
        )?;
        self.emit(VaultEvent::Mint {
            caller,
            beneficiary,
            base: delta.base_used(),
            stable: delta.stable_used(),
            liquidity: delta.liquidity(),
            shares,
        });
        info!(
            target: "vault",
            %caller,
            %beneficiary,
            base = %delta.base_used(),
            stable = %delta.stable_used(),
            %shares,
            "deposit"
        );
        Ok(DepositReceipt {
            beneficiary,
            base_deposited: delta.base_used(),
            base_refunded,
            stable_paired: delta.stable_used(),
            liquidity: delta.liquidity(),
            shares,
        })
    }

    /// Burns up to `shares` of `beneficiary`'s shares and pays the
    /// rebalanced base to `beneficiary`.
    ///
    /// Requests above the balance are clamped, and a remainder too small to
    /// burn is withdrawn with the rest.  `caller` must be `beneficiary` or
    /// hold [`Role::Governance`].
    ///
    /// Governance can therefore exit any depositor at any time.  It cannot
    /// redirect the payout: base always goes to `beneficiary`, and the
    /// price guard and `deadline` apply as for the depositor's own call.
    ///
    /// # Errors
    ///
    /// - [`VaultError::AccessDenied`] for anyone else.
    /// - [`VaultError::InvalidQuantity`] for zero shares or an empty account.
    /// - [`VaultError::DeadlineExpired`] past `deadline`.
    /// - [`VaultError::PriceGuardTriggered`] if spot and oracle disagree.
    /// - [`VaultError::ExternalAdapterFailure`] on any adapter failure.
    pub fn withdraw_base(
        &mut self,
        caller: Address,
        beneficiary: Address,
        shares: Shares,
        deadline: Timestamp,
    ) -> Result<WithdrawReceipt> {
        self.transact("withdraw", |vault| {
            vault.access.require_self_or_governance(caller, beneficiary)?;
            vault.check_deadline(deadline)?;
            vault.check_price()?;

            let redemption = vault.redemption(beneficiary, shares)?;
            let receipt = vault.unwind(beneficiary, &redemption, deadline)?;
            let base = vault.config.tokens().base;
            vault.env.transfer(base, beneficiary, receipt.payout)?;

            vault.emit(VaultEvent::Burn {
                caller,
                beneficiary,
                shares: receipt.shares_burned,
                liquidity: receipt.liquidity,
                payout: receipt.payout,
            });
            info!(
                target: "vault",
                %caller,
                %beneficiary,
                shares = %receipt.shares_burned,
                payout = %receipt.payout,
                leg = ?receipt.leg,
                "withdraw"
            );
            Ok(receipt)
        })
    }

    /// Withdraws every share `beneficiary` holds.
    ///
    /// # Errors
    ///
    /// As [`withdraw_base`](Self::withdraw_base).
    pub fn withdraw_all_base(
        &mut self,
        caller: Address,
        beneficiary: Address,
        deadline: Timestamp,
    ) -> Result<WithdrawReceipt> {
        self.withdraw_base(caller, beneficiary, Shares::MAX, deadline)
    }

    /// Pulls `harvested` base from `caller` and compounds it, skimming
    /// `fee` for the owner.  Mints no shares.
    ///
    /// # Errors
    ///
    /// - [`VaultError::AccessDenied`] unless `caller` holds governance.
    /// - [`VaultError::InvalidQuantity`] for zero.
    /// - [`VaultError::ExternalAdapterFailure`] on any adapter failure.
    pub fn compound_profits(
        &mut self,
        caller: Address,
        harvested: Amount,
        fee: PercentMil,
    ) -> Result<CompoundReceipt> {
        self.transact("compound", |vault| {
            vault.access.require(caller, Role::Governance)?;
            if harvested.is_zero() {
                return Err(VaultError::InvalidQuantity("nothing to compound"));
            }
            let base = vault.config.tokens().base;
            vault.env.transfer_from(base, caller, harvested)?;
            let deadline = vault.env.now();
            let receipt = Compounder::new(vault.config.tokens(), deadline).compound(
                &mut vault.env,
                &mut vault.ledger,
                harvested,
                fee,
            )?;
            vault.emit(VaultEvent::Compounded {
                harvested,
                owner_fee_stable: receipt.owner_fee_stable,
                liquidity: receipt.liquidity,
            });
            Ok(receipt)
        })
    }

    /// Claims staking rewards and forwards them to the governance address.
    /// Anyone may call it; nothing accrued is a no-op returning zero.
    ///
    /// # Errors
    ///
    /// [`VaultError::ExternalAdapterFailure`] on any adapter failure.
    pub fn claim_rewards(&mut self, caller: Address) -> Result<Amount> {
        self.transact("claim", |vault| {
            let claimed = vault.env.claim()?;
            if claimed.is_zero() {
                return Ok(Amount::ZERO);
            }
            let recipient = vault.access.governance();
            let reward = vault.config.tokens().reward;
            vault.env.transfer(reward, recipient, claimed)?;
            vault.emit(VaultEvent::RewardsClaimed {
                recipient,
                amount: claimed,
            });
            info!(target: "vault", %caller, %recipient, amount = %claimed, "rewards claimed");
            Ok(claimed)
        })
    }

    /// Claims staking rewards into the vault, sells them for base and
    /// compounds the proceeds, skimming `fee` for the owner.  Nothing
    /// accrued is a no-op.
    ///
    /// # Errors
    ///
    /// - [`VaultError::AccessDenied`] unless `caller` holds governance.
    /// - [`VaultError::DeadlineExpired`] past `deadline`.
    /// - [`VaultError::ExternalAdapterFailure`] on any adapter failure.
    pub fn harvest(
        &mut self,
        caller: Address,
        fee: PercentMil,
        deadline: Timestamp,
    ) -> Result<HarvestReceipt> {
        self.transact("harvest", |vault| {
            vault.access.require(caller, Role::Governance)?;
            vault.check_deadline(deadline)?;
            let rewards = vault.env.claim()?;
            if rewards.is_zero() {
                return Ok(HarvestReceipt::default());
            }
            let compounder = Compounder::new(vault.config.tokens(), deadline);
            let base_harvested = compounder.convert_rewards(&mut vault.env, rewards)?;
            let compound =
                compounder.compound(&mut vault.env, &mut vault.ledger, base_harvested, fee)?;
            vault.emit(VaultEvent::Compounded {
                harvested: base_harvested,
                owner_fee_stable: compound.owner_fee_stable,
                liquidity: compound.liquidity,
            });
            info!(
                target: "vault",
                %caller,
                %rewards,
                base = %base_harvested,
                liquidity = %compound.liquidity,
                "harvest"
            );
            Ok(HarvestReceipt {
                rewards,
                base_harvested,
                compound,
            })
        })
    }
}
