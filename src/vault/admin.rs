//! Owner-gated configuration, capital, emergency and salvage commands.

use alloy_primitives::Address;
use tracing::info;

use super::Vault;
use crate::access::Role;
use crate::domain::{
    Amount, BasisPoints, EmergencyExitReport, GuardState, OracleSource, Shares, Timestamp,
    VaultEvent,
};
use crate::error::{Result, VaultError};
use crate::traits::Environment;

impl<E: Environment> Vault<E> {
    /// Pulls `amount` stablecoin from the owner into the free reserve.
    ///
    /// # Errors
    ///
    /// - [`VaultError::AccessDenied`] unless `caller` is the owner.
    /// - [`VaultError::InvalidQuantity`] for zero.
    /// - [`VaultError::ExternalAdapterFailure`] if the transfer fails.
    pub fn deposit_capital(&mut self, caller: Address, amount: Amount) -> Result<()> {
        self.transact("deposit_capital", |vault| {
            vault.access.require(caller, Role::Owner)?;
            if amount.is_zero() {
                return Err(VaultError::InvalidQuantity("capital of zero"));
            }
            let stable = vault.config.tokens().stable;
            vault.env.transfer_from(stable, caller, amount)?;
            vault.ledger.credit_reserve(amount)?;
            vault.emit(VaultEvent::CapitalDeposited { amount });
            info!(target: "vault", %amount, "capital deposited");
            Ok(())
        })
    }

    /// Sends `amount` of the free reserve to the owner.  Stablecoin paired
    /// in the pool cannot be withdrawn.
    ///
    /// # Errors
    ///
    /// - [`VaultError::AccessDenied`] unless `caller` is the owner.
    /// - [`VaultError::CapacityExceeded`] beyond the free reserve.
    pub fn withdraw_capital(&mut self, caller: Address, amount: Amount) -> Result<()> {
        self.transact("withdraw_capital", |vault| {
            vault.access.require(caller, Role::Owner)?;
            if amount.is_zero() {
                return Err(VaultError::InvalidQuantity("capital of zero"));
            }
            vault.ledger.debit_reserve(amount)?;
            let stable = vault.config.tokens().stable;
            vault.env.transfer(stable, caller, amount)?;
            vault.emit(VaultEvent::CapitalWithdrawn { amount });
            info!(target: "vault", %amount, "capital withdrawn");
            Ok(())
        })
    }

    /// Switches the guard to another oracle feed.
    ///
    /// # Errors
    ///
    /// [`VaultError::AccessDenied`] unless `caller` is the owner.
    pub fn set_price_oracle(&mut self, caller: Address, source: OracleSource) -> Result<()> {
        self.transact("set_price_oracle", |vault| {
            vault.access.require(caller, Role::Owner)?;
            vault.ledger.state_mut().guard.set_oracle_source(source);
            vault.emit(VaultEvent::OracleChanged { source });
            info!(target: "vault", %source, "oracle changed");
            Ok(())
        })
    }

    /// Sets the maximum tolerated spot/oracle deviation.
    ///
    /// # Errors
    ///
    /// - [`VaultError::AccessDenied`] unless `caller` is the owner.
    /// - [`VaultError::InvalidConfiguration`] for an out-of-range tolerance.
    pub fn set_guard_tolerance(&mut self, caller: Address, tolerance: BasisPoints) -> Result<()> {
        self.transact("set_guard_tolerance", |vault| {
            vault.access.require(caller, Role::Owner)?;
            vault.ledger.state_mut().guard.set_tolerance(tolerance)?;
            vault.emit(VaultEvent::ToleranceChanged { tolerance });
            info!(target: "vault", %tolerance, "guard tolerance changed");
            Ok(())
        })
    }

    /// Suspends the price guard.
    ///
    /// # Errors
    ///
    /// [`VaultError::AccessDenied`] unless `caller` is the owner.
    pub fn pause_guard(&mut self, caller: Address) -> Result<()> {
        self.set_guard_state(caller, GuardState::Paused)
    }

    /// Resumes the price guard.
    ///
    /// # Errors
    ///
    /// [`VaultError::AccessDenied`] unless `caller` is the owner.
    pub fn unpause_guard(&mut self, caller: Address) -> Result<()> {
        self.set_guard_state(caller, GuardState::Active)
    }

    fn set_guard_state(&mut self, caller: Address, state: GuardState) -> Result<()> {
        self.transact("set_guard_state", |vault| {
            vault.access.require(caller, Role::Owner)?;
            vault.ledger.state_mut().guard_state = state;
            vault.emit(match state {
                GuardState::Active => VaultEvent::GuardUnpaused,
                GuardState::Paused => VaultEvent::GuardPaused,
            });
            info!(target: "vault", %state, "guard state changed");
            Ok(())
        })
    }

    /// Refuses new deposits.  Withdrawals stay open.
    ///
    /// # Errors
    ///
    /// [`VaultError::AccessDenied`] unless `caller` is the owner.
    pub fn pause(&mut self, caller: Address) -> Result<()> {
        self.set_paused(caller, true)
    }

    /// Accepts deposits again.
    ///
    /// # Errors
    ///
    /// [`VaultError::AccessDenied`] unless `caller` is the owner.
    pub fn unpause(&mut self, caller: Address) -> Result<()> {
        self.set_paused(caller, false)
    }

    fn set_paused(&mut self, caller: Address, paused: bool) -> Result<()> {
        self.transact("set_paused", |vault| {
            vault.access.require(caller, Role::Owner)?;
            vault.ledger.state_mut().paused = paused;
            vault.emit(if paused {
                VaultEvent::Paused
            } else {
                VaultEvent::Unpaused
            });
            info!(target: "vault", paused, "pause flag changed");
            Ok(())
        })
    }

    /// Hands ownership to `new_owner`.
    ///
    /// # Errors
    ///
    /// - [`VaultError::AccessDenied`] unless `caller` is the owner.
    /// - [`VaultError::InvalidConfiguration`] for the zero address.
    pub fn set_owner(&mut self, caller: Address, new_owner: Address) -> Result<()> {
        self.transact("set_owner", |vault| {
            vault.access.require(caller, Role::Owner)?;
            let previous = vault.access.assign(Role::Owner, new_owner)?;
            vault.emit(VaultEvent::OwnerChanged {
                previous,
                current: new_owner,
            });
            info!(target: "vault", %previous, current = %new_owner, "owner changed");
            Ok(())
        })
    }

    /// Hands the operator role to `new_governance`.
    ///
    /// # Errors
    ///
    /// - [`VaultError::AccessDenied`] unless `caller` is the owner.
    /// - [`VaultError::InvalidConfiguration`] for the zero address.
    pub fn set_governance(&mut self, caller: Address, new_governance: Address) -> Result<()> {
        self.transact("set_governance", |vault| {
            vault.access.require(caller, Role::Owner)?;
            let previous = vault.access.assign(Role::Governance, new_governance)?;
            vault.emit(VaultEvent::GovernanceChanged {
                previous,
                current: new_governance,
            });
            info!(target: "vault", %previous, current = %new_governance, "governance changed");
            Ok(())
        })
    }

    /// Pauses the vault, force-exits every listed account that holds shares
    /// and sweeps the free reserve to the owner.
    ///
    /// Exits skip the price guard and the deadline.  Each payout is
    /// escrowed in the vault until [`release_recovered`](Self::release_recovered).
    /// Accounts without shares are skipped.
    ///
    /// # Errors
    ///
    /// - [`VaultError::AccessDenied`] unless `caller` is the owner.
    /// - [`VaultError::ExternalAdapterFailure`] if an unwind fails; nothing
    ///   is exited then.
    pub fn emergency_exit(
        &mut self,
        caller: Address,
        targets: &[Address],
    ) -> Result<EmergencyExitReport> {
        self.transact("emergency_exit", |vault| {
            vault.access.require(caller, Role::Owner)?;
            if !vault.ledger.state().is_paused() {
                vault.ledger.state_mut().paused = true;
                vault.emit(VaultEvent::Paused);
            }

            let mut report = EmergencyExitReport::default();
            for &account in targets {
                if vault.ledger.account(account).is_empty() {
                    continue;
                }
                let redemption = vault.redemption(account, Shares::MAX)?;
                let receipt = vault.unwind(account, &redemption, Timestamp::NEVER)?;
                vault.ledger.escrow(account, receipt.payout)?;
                vault.emit(VaultEvent::ForcedExit {
                    account,
                    escrowed: receipt.payout,
                });
                info!(
                    target: "vault",
                    %account,
                    escrowed = %receipt.payout,
                    "account force-exited"
                );
                report.exited.push((account, receipt.payout));
            }

            let swept = vault.ledger.state().reserve_stable();
            if !swept.is_zero() {
                vault.ledger.debit_reserve(swept)?;
                let stable = vault.config.tokens().stable;
                let owner = vault.access.owner();
                vault.env.transfer(stable, owner, swept)?;
                vault.emit(VaultEvent::CapitalSwept { amount: swept });
            }
            report.capital_swept = swept;
            info!(
                target: "vault",
                exited = report.exited.len(),
                %swept,
                "emergency exit"
            );
            Ok(report)
        })
    }

    /// Pays `account` the base escrowed for it by an emergency exit.
    ///
    /// # Errors
    ///
    /// - [`VaultError::AccessDenied`] unless `caller` is the owner.
    /// - [`VaultError::InvalidQuantity`] if nothing is escrowed.
    pub fn release_recovered(&mut self, caller: Address, account: Address) -> Result<Amount> {
        self.transact("release_recovered", |vault| {
            vault.access.require(caller, Role::Owner)?;
            let amount = vault.ledger.release(account);
            if amount.is_zero() {
                return Err(VaultError::InvalidQuantity("nothing escrowed"));
            }
            let base = vault.config.tokens().base;
            vault.env.transfer(base, account, amount)?;
            vault.emit(VaultEvent::RecoveredReleased { account, amount });
            info!(target: "vault", %account, %amount, "escrow released");
            Ok(amount)
        })
    }

    /// Sends the vault's whole balance of each listed token to the owner.
    /// Zero balances are skipped.
    ///
    /// # Errors
    ///
    /// - [`VaultError::AccessDenied`] unless `caller` is the owner.
    /// - [`VaultError::SalvageForbidden`] if any token is protected; nothing
    ///   is moved then.
    pub fn salvage(
        &mut self,
        caller: Address,
        tokens: &[Address],
    ) -> Result<Vec<(Address, Amount)>> {
        self.transact("salvage", |vault| {
            vault.access.require(caller, Role::Owner)?;
            if let Some(&token) = tokens.iter().find(|t| vault.config.tokens().is_protected(**t)) {
                return Err(VaultError::SalvageForbidden(token));
            }
            let owner = vault.access.owner();
            let holder = vault.address();
            let mut moved = Vec::with_capacity(tokens.len());
            for &token in tokens {
                let amount = vault.env.balance_of(token, holder);
                if amount.is_zero() {
                    continue;
                }
                vault.env.transfer(token, owner, amount)?;
                vault.emit(VaultEvent::Salvaged { token, amount });
                info!(target: "vault", %token, %amount, "token salvaged");
                moved.push((token, amount));
            }
            Ok(moved)
        })
    }
}
