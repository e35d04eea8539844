//! The vault command surface.
//!
//! [`Vault`] ties the [`CapitalLedger`], [`AccessControl`], the
//! [`PriceGuard`](crate::guard::PriceGuard) and the
//! [`Compounder`](crate::compounder::Compounder) to one [`Environment`].
//!
//! # Transactions
//!
//! Every command runs against a copy of the vault, environment included.
//! The copy replaces the live vault only if the command succeeds and the
//! post-state passes [`Vault::check_invariants`]; otherwise it is dropped,
//! so a failed command leaves ledger, journal and environment untouched.
//! The journal is not copied: the draft starts with an empty one and its
//! events are appended to the live journal on commit.
//!
//! # Commands
//!
//! | Command | Caller | Guarded |
//! |---------|--------|---------|
//! | [`deposit_base`](Vault::deposit_base) | anyone | yes |
//! | [`withdraw_base`](Vault::withdraw_base), [`withdraw_all_base`](Vault::withdraw_all_base) | beneficiary or governance | yes |
//! | [`compound_profits`](Vault::compound_profits), [`harvest`](Vault::harvest) | governance | no |
//! | [`claim_rewards`](Vault::claim_rewards) | anyone | no |
//! | configuration, capital, emergency, salvage | owner | no |

mod admin;
mod commands;

use alloy_primitives::Address;
use tracing::{debug, warn};

use crate::access::AccessControl;
use crate::config::{VaultConfig, VaultTokens};
use crate::domain::{
    Account, Amount, Liquidity, PoolState, RebalanceLeg, Shares, Timestamp, VaultEvent,
    WithdrawReceipt,
};
use crate::error::{Result, VaultError};
use crate::guard::{GuardOutcome, PriceGuard};
use crate::ledger::{settle_exit, CapitalLedger, ExitSettlement, Redemption};
use crate::traits::Environment;

/// A single-sided liquidity vault over one environment.
#[derive(Debug, Clone)]
pub struct Vault<E: Environment> {
    config: VaultConfig,
    access: AccessControl,
    ledger: CapitalLedger,
    events: Vec<VaultEvent>,
    env: E,
}

impl<E: Environment> Vault<E> {
    /// Creates an empty vault.  The reserve starts at zero; the owner funds
    /// it with [`deposit_capital`](Self::deposit_capital).
    ///
    /// # Errors
    ///
    /// Returns [`VaultError::InvalidConfiguration`] if `config` is invalid.
    pub fn new(config: VaultConfig, env: E) -> Result<Self> {
        config.validate()?;
        Ok(Self {
            access: AccessControl::new(config.owner(), config.governance()),
            ledger: CapitalLedger::new(*config.guard()),
            events: Vec::new(),
            config,
            env,
        })
    }

    // -- views ------------------------------------------------------------------

    /// The deployment configuration.
    #[must_use]
    pub const fn config(&self) -> &VaultConfig {
        &self.config
    }

    /// The vault's address.
    #[must_use]
    pub const fn address(&self) -> Address {
        self.config.vault()
    }

    /// Protected token contracts.
    #[must_use]
    pub const fn tokens(&self) -> &VaultTokens {
        self.config.tokens()
    }

    /// The environment.
    #[must_use]
    pub const fn env(&self) -> &E {
        &self.env
    }

    /// Mutable access to the environment, for driving the market around the
    /// vault.  Vault state is only ever changed through commands.
    pub fn env_mut(&mut self) -> &mut E {
        &mut self.env
    }

    /// The ledger.
    #[must_use]
    pub const fn ledger(&self) -> &CapitalLedger {
        &self.ledger
    }

    /// Global state.
    #[must_use]
    pub const fn pool_state(&self) -> &PoolState {
        self.ledger.state()
    }

    /// Outstanding shares.
    #[must_use]
    pub const fn total_shares(&self) -> Shares {
        self.ledger.state().total_shares()
    }

    /// Position held (and staked) for depositors.
    #[must_use]
    pub const fn total_pooled_value(&self) -> Liquidity {
        self.ledger.state().total_pooled_value()
    }

    /// `who`'s account.
    #[must_use]
    pub fn account(&self, who: Address) -> Account {
        self.ledger.account(who)
    }

    /// Base escrowed for `who` by an emergency exit.
    #[must_use]
    pub fn recoverable(&self, who: Address) -> Amount {
        self.ledger.recoverable(who)
    }

    /// Pooled value per share, scaled by 10¹⁸; zero with no shares.
    ///
    /// # Errors
    ///
    /// Returns [`VaultError::Overflow`] if the quotient exceeds `u128`.
    pub fn price_per_full_share(&self) -> Result<u128> {
        self.ledger.price_per_full_share()
    }

    /// Largest base deposit the reserve can currently match.
    ///
    /// # Errors
    ///
    /// Fails if the pool has no reserves.
    pub fn available_capacity(&self) -> Result<Amount> {
        let reserves = self.env.reserves()?;
        self.ledger.available_capacity(&reserves)
    }

    /// Stablecoin value of `base` at the pool's spot ratio.
    ///
    /// # Errors
    ///
    /// Fails if the pool has no reserves.
    pub fn spot_quote(&self, base: Amount) -> Result<Amount> {
        self.env.reserves()?.quote_base(base)
    }

    /// Current owner.
    #[must_use]
    pub const fn owner(&self) -> Address {
        self.access.owner()
    }

    /// Current governance (operator).
    #[must_use]
    pub const fn governance(&self) -> Address {
        self.access.governance()
    }

    /// Journal of committed changes, oldest first.
    #[must_use]
    pub fn events(&self) -> &[VaultEvent] {
        &self.events
    }

    /// Drains the journal, oldest first.  Hosts that forward events
    /// elsewhere call this to keep the journal short.
    pub fn take_events(&mut self) -> Vec<VaultEvent> {
        core::mem::take(&mut self.events)
    }

    /// Checks ledger consistency and that the environment backs it: the
    /// staked position equals the pooled value, the vault holds the free
    /// reserve, and it holds the carried and escrowed base.
    ///
    /// # Errors
    ///
    /// Returns [`VaultError::InvariantViolation`] naming the failed check.
    pub fn check_invariants(&self) -> Result<()> {
        self.ledger.check_invariants()?;
        let state = self.ledger.state();
        if self.env.staked() != state.total_pooled_value() {
            return Err(VaultError::InvariantViolation(
                "staked position differs from pooled value",
            ));
        }
        let vault = self.address();
        let tokens = self.config.tokens();
        if self.env.balance_of(tokens.stable, vault) < state.reserve_stable() {
            return Err(VaultError::InvariantViolation(
                "stable balance below free reserve",
            ));
        }
        let owed_base = state
            .unallocated_base()
            .safe_add(&self.ledger.total_recoverable()?, "owed base")?;
        if self.env.balance_of(tokens.base, vault) < owed_base {
            return Err(VaultError::InvariantViolation(
                "base balance below carried and escrowed base",
            ));
        }
        Ok(())
    }

    // -- plumbing -----------------------------------------------------------------

    /// Runs `op` on a draft and commits it only if it succeeds and the
    /// draft passes [`check_invariants`](Self::check_invariants).
    fn transact<T>(
        &mut self,
        command: &'static str,
        op: impl FnOnce(&mut Self) -> Result<T>,
    ) -> Result<T> {
        let journal = core::mem::take(&mut self.events);
        let mut draft = self.clone();
        match op(&mut draft).and_then(|value| draft.check_invariants().map(|()| value)) {
            Ok(value) => {
                let fresh = core::mem::replace(&mut draft.events, journal);
                *self = draft;
                self.events.extend(fresh);
                Ok(value)
            }
            Err(err) => {
                self.events = journal;
                warn!(target: "vault", command, error = %err, "command rolled back");
                Err(err)
            }
        }
    }

    fn emit(&mut self, event: VaultEvent) {
        self.events.push(event);
    }

    fn check_deadline(&self, deadline: Timestamp) -> Result<()> {
        let now = self.env.now();
        if deadline.has_expired(now) {
            return Err(VaultError::DeadlineExpired { deadline, now });
        }
        Ok(())
    }

    fn check_price(&self) -> Result<GuardOutcome> {
        let state = self.ledger.state();
        PriceGuard::new(state.guard(), state.guard_state()).check(&self.env)
    }

    /// Sizes a withdrawal, sweeping a remainder too small to burn.
    fn redemption(&self, beneficiary: Address, requested: Shares) -> Result<Redemption> {
        self.ledger
            .redemption(beneficiary, requested, |liquidity| is_dust(&self.env, liquidity))
    }

    /// Unstakes and removes a redemption's position, rebalances what comes
    /// back and burns the shares.  The payout stays in the vault.
    ///
    /// A position too small to burn is unstaked but not removed; its shares
    /// burn for nothing and the reserve writes off their paired principal.
    fn unwind(
        &mut self,
        beneficiary: Address,
        redemption: &Redemption,
        deadline: Timestamp,
    ) -> Result<WithdrawReceipt> {
        let dust = is_dust(&self.env, redemption.liquidity)?;
        if !redemption.liquidity.is_zero() {
            self.env.unstake(redemption.liquidity)?;
        }
        let (removed_base, removed_stable, settlement) = if dust {
            debug!(
                target: "vault",
                %beneficiary,
                liquidity = %redemption.liquidity,
                written_off = %redemption.portion.stable,
                "dust position burnt without removal"
            );
            let settlement = ExitSettlement {
                leg: RebalanceLeg::Flat,
                payout: Amount::ZERO,
                stable_recovered: Amount::ZERO,
            };
            (Amount::ZERO, Amount::ZERO, settlement)
        } else {
            let router = self.env.router();
            self.env
                .approve(self.config.tokens().position, router, redemption.liquidity.into())?;
            let (removed_base, removed_stable) =
                self.env.remove_liquidity(redemption.liquidity, deadline)?;
            let settlement = settle_exit(
                &mut self.env,
                self.config.tokens(),
                removed_base,
                removed_stable,
                redemption.portion.stable,
                deadline,
            )?;
            (removed_base, removed_stable, settlement)
        };
        self.ledger
            .redeem(beneficiary, redemption, settlement.stable_recovered)?;
        Ok(WithdrawReceipt {
            beneficiary,
            shares_burned: redemption.shares,
            liquidity: redemption.liquidity,
            removed_base,
            removed_stable,
            leg: settlement.leg,
            stable_recovered: settlement.stable_recovered,
            payout: settlement.payout,
        })
    }
}

/// `true` if burning `liquidity` would return zero of either asset.
fn is_dust<E: Environment>(env: &E, liquidity: Liquidity) -> Result<bool> {
    if liquidity.is_zero() {
        return Ok(true);
    }
    let (base, stable) = env.quote_remove(liquidity)?;
    Ok(base.is_zero() || stable.is_zero())
}
