//! Capital ledger: global pool state, per-depositor accounts and share
//! math.
//!
//! The ledger owns [`PoolState`] and the account map exclusively.  It never
//! talks to the environment; the [`Vault`](crate::vault::Vault) performs
//! the external calls and records their outcome here.
//!
//! # Share math
//!
//! | Operation | Formula | Rounding |
//! |-----------|---------|----------|
//! | Issue | `liquidity × total_shares / total_pooled_value` (first deposit: `liquidity`) | down |
//! | Redeem | `shares × total_pooled_value / total_shares` | down |
//! | Price per full share | `total_pooled_value × 10¹⁸ / total_shares` | down |
//!
//! Compounding adds liquidity without issuing shares, so the price per full
//! share only grows between deposits and withdrawals.

mod rebalance;

#[cfg(all(test, feature = "sandbox"))]
mod proptest_properties;

pub use rebalance::{settle_exit, ExitSettlement};

use std::collections::BTreeMap;

use alloy_primitives::Address;
use tracing::debug;

use crate::config::GuardConfig;
use crate::domain::{
    Account, Amount, EntryPortion, Liquidity, PoolState, Reserves, Rounding, Shares,
};
use crate::error::{Result, VaultError};

/// Fixed-point scale of [`CapitalLedger::price_per_full_share`].
pub const PRICE_PER_SHARE_SCALE: u128 = 1_000_000_000_000_000_000;

/// A withdrawal sized against the current ledger.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Redemption {
    /// Shares to burn, clamped to the account balance.
    pub shares: Shares,
    /// Position to unstake and remove.
    pub liquidity: Liquidity,
    /// Entry amounts released with the shares.
    pub portion: EntryPortion,
}

/// Global state plus per-depositor accounts.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CapitalLedger {
    state: PoolState,
    accounts: BTreeMap<Address, Account>,
    recoverable: BTreeMap<Address, Amount>,
}

impl CapitalLedger {
    /// Empty ledger.
    #[must_use]
    pub const fn new(guard: GuardConfig) -> Self {
        Self {
            state: PoolState::new(guard),
            accounts: BTreeMap::new(),
            recoverable: BTreeMap::new(),
        }
    }

    // -- views ------------------------------------------------------------------

    /// Global state.
    #[must_use]
    pub const fn state(&self) -> &PoolState {
        &self.state
    }

    pub(crate) fn state_mut(&mut self) -> &mut PoolState {
        &mut self.state
    }

    /// `who`'s account; an empty record if it never deposited.
    #[must_use]
    pub fn account(&self, who: Address) -> Account {
        self.accounts.get(&who).copied().unwrap_or_default()
    }

    /// Every account ever credited, zeroed ones included.
    pub fn accounts(&self) -> impl Iterator<Item = (&Address, &Account)> {
        self.accounts.iter()
    }

    /// Base escrowed for `who` by an emergency exit.
    pub fn recoverable(&self, who: Address) -> Amount {
        self.recoverable.get(&who).copied().unwrap_or_default()
    }

    /// Base escrowed across all accounts.
    ///
    /// # Errors
    ///
    /// Returns [`VaultError::Overflow`] if the sum overflows.
    pub fn total_recoverable(&self) -> Result<Amount> {
        self.recoverable
            .values()
            .try_fold(Amount::ZERO, |acc, v| acc.safe_add(v, "total recoverable"))
    }

    /// `total_pooled_value × 10¹⁸ / total_shares`, or zero with no shares.
    ///
    /// # Errors
    ///
    /// Returns [`VaultError::Overflow`] if the quotient exceeds `u128`.
    pub fn price_per_full_share(&self) -> Result<u128> {
        if self.state.total_shares.is_zero() {
            return Ok(0);
        }
        crate::math::mul_div(
            self.state.total_pooled_value.get(),
            PRICE_PER_SHARE_SCALE,
            self.state.total_shares.get(),
            Rounding::Down,
        )
    }

    /// Base the free stablecoin reserve can match at `reserves`' spot ratio.
    ///
    /// # Errors
    ///
    /// Returns an adapter `ZeroReserve` failure on an empty pool.
    pub fn available_capacity(&self, reserves: &Reserves) -> Result<Amount> {
        reserves.quote_stable(self.state.reserve_stable)
    }

    /// Shares `liquidity` is worth.
    ///
    /// # Errors
    ///
    /// - [`VaultError::DivisionByZero`] if shares exist without pooled value.
    /// - [`VaultError::Overflow`] if the quotient exceeds `u128`.
    pub fn shares_for(&self, liquidity: Liquidity) -> Result<Shares> {
        if self.state.total_shares.is_zero() {
            return Ok(Shares::new(liquidity.get()));
        }
        crate::math::mul_div(
            liquidity.get(),
            self.state.total_shares.get(),
            self.state.total_pooled_value.get(),
            Rounding::Down,
        )
        .map(Shares::new)
    }

    /// Position `shares` are worth.
    ///
    /// # Errors
    ///
    /// - [`VaultError::DivisionByZero`] with no shares outstanding.
    /// - [`VaultError::Overflow`] if the quotient exceeds `u128`.
    pub fn liquidity_for(&self, shares: Shares) -> Result<Liquidity> {
        self.state
            .total_pooled_value
            .scale(shares.get(), self.state.total_shares.get(), Rounding::Down)
    }

    // -- mutations ----------------------------------------------------------------

    /// Records a deposit that minted `liquidity` from `base` and `stable`,
    /// issuing shares to `beneficiary`.
    ///
    /// # Errors
    ///
    /// - [`VaultError::InvalidQuantity`] if the deposit is worth no shares.
    /// - [`VaultError::CapacityExceeded`] if `stable` exceeds the reserve.
    /// - [`VaultError::Overflow`] if a total overflows.
    pub fn issue(
        &mut self,
        beneficiary: Address,
        liquidity: Liquidity,
        base: Amount,
        stable: Amount,
    ) -> Result<Shares> {
        let shares = self.shares_for(liquidity)?;
        if shares.is_zero() {
            return Err(VaultError::InvalidQuantity("deposit too small to mint shares"));
        }
        self.debit_reserve(stable)?;
        self.state.total_paired_stable = self
            .state
            .total_paired_stable
            .safe_add(&stable, "total paired stable")?;
        self.state.total_pooled_value = self
            .state
            .total_pooled_value
            .safe_add(&liquidity, "total pooled value")?;
        self.state.total_shares = self.state.total_shares.safe_add(&shares, "total shares")?;
        self.accounts
            .entry(beneficiary)
            .or_default()
            .credit(base, stable, shares)?;
        debug!(target: "ledger", %beneficiary, %shares, %liquidity, "shares issued");
        Ok(shares)
    }

    /// Sizes a withdrawal of up to `requested` shares from `beneficiary`.
    ///
    /// Requests above the balance are clamped.  If the shares left behind
    /// would be worth a position `is_dust` rejects, the whole balance is
    /// redeemed instead.
    ///
    /// # Errors
    ///
    /// - [`VaultError::InvalidQuantity`] for a zero request or an empty
    ///   account.
    /// - Whatever `is_dust` returns.
    pub fn redemption(
        &self,
        beneficiary: Address,
        requested: Shares,
        is_dust: impl Fn(Liquidity) -> Result<bool>,
    ) -> Result<Redemption> {
        if requested.is_zero() {
            return Err(VaultError::InvalidQuantity("withdrawal of zero shares"));
        }
        let account = self.account(beneficiary);
        if account.is_empty() {
            return Err(VaultError::InvalidQuantity("account holds no shares"));
        }
        let mut shares = requested.min(account.shares());
        let left = account.shares().saturating_sub(&shares);
        if !left.is_zero() && is_dust(self.liquidity_for(left)?)? {
            debug!(target: "ledger", %beneficiary, %left, "dust remainder swept into withdrawal");
            shares = account.shares();
        }
        Ok(Redemption {
            shares,
            liquidity: self.liquidity_for(shares)?,
            portion: account.portion(shares)?,
        })
    }

    /// Burns a sized redemption and returns `stable_recovered` to the
    /// reserve.
    ///
    /// # Errors
    ///
    /// Returns [`VaultError::Overflow`] if any balance would underflow.
    pub fn redeem(
        &mut self,
        beneficiary: Address,
        redemption: &Redemption,
        stable_recovered: Amount,
    ) -> Result<()> {
        let account = self
            .accounts
            .get_mut(&beneficiary)
            .ok_or(VaultError::InvalidQuantity("account holds no shares"))?;
        account.debit(redemption.shares, redemption.portion)?;
        self.state.total_shares = self
            .state
            .total_shares
            .safe_sub(&redemption.shares, "total shares")?;
        self.state.total_pooled_value = self
            .state
            .total_pooled_value
            .safe_sub(&redemption.liquidity, "total pooled value")?;
        self.state.total_paired_stable = self
            .state
            .total_paired_stable
            .safe_sub(&redemption.portion.stable, "total paired stable")?;
        self.credit_reserve(stable_recovered)?;
        debug!(
            target: "ledger",
            %beneficiary,
            shares = %redemption.shares,
            liquidity = %redemption.liquidity,
            %stable_recovered,
            "shares redeemed"
        );
        Ok(())
    }

    /// Adds compounded liquidity without issuing shares.
    ///
    /// # Errors
    ///
    /// Returns [`VaultError::Overflow`] if the total overflows.
    pub fn accrue(&mut self, liquidity: Liquidity) -> Result<()> {
        self.state.total_pooled_value = self
            .state
            .total_pooled_value
            .safe_add(&liquidity, "total pooled value")?;
        Ok(())
    }

    /// Adds stablecoin to the free reserve.
    ///
    /// # Errors
    ///
    /// Returns [`VaultError::Overflow`] if the reserve overflows.
    pub fn credit_reserve(&mut self, amount: Amount) -> Result<()> {
        self.state.reserve_stable = self
            .state
            .reserve_stable
            .safe_add(&amount, "reserve stable")?;
        Ok(())
    }

    /// Takes stablecoin from the free reserve.
    ///
    /// # Errors
    ///
    /// Returns [`VaultError::CapacityExceeded`] if the reserve is short.
    pub fn debit_reserve(&mut self, amount: Amount) -> Result<()> {
        let available = self.state.reserve_stable;
        self.state.reserve_stable =
            available
                .checked_sub(&amount)
                .ok_or(VaultError::CapacityExceeded {
                    requested: amount,
                    available,
                })?;
        Ok(())
    }

    pub(crate) fn set_unallocated_base(&mut self, amount: Amount) {
        self.state.unallocated_base = amount;
    }

    pub(crate) fn escrow(&mut self, who: Address, amount: Amount) -> Result<()> {
        let next = self.recoverable(who).safe_add(&amount, "recoverable")?;
        self.recoverable.insert(who, next);
        Ok(())
    }

    pub(crate) fn release(&mut self, who: Address) -> Amount {
        self.recoverable.remove(&who).unwrap_or_default()
    }

    // -- invariants ---------------------------------------------------------------

    /// Validates the ledger's internal consistency.
    ///
    /// # Errors
    ///
    /// Returns [`VaultError::InvariantViolation`] naming the failed check.
    pub fn check_invariants(&self) -> Result<()> {
        let mut shares = Shares::ZERO;
        let mut paired = Amount::ZERO;
        for account in self.accounts.values() {
            if account.is_empty() && *account != Account::default() {
                return Err(VaultError::InvariantViolation(
                    "empty account carries entry amounts",
                ));
            }
            if account.shares() > self.state.total_shares {
                return Err(VaultError::InvariantViolation(
                    "account shares exceed total shares",
                ));
            }
            shares = shares
                .checked_add(&account.shares())
                .ok_or(VaultError::InvariantViolation("share sum overflows"))?;
            paired = paired
                .checked_add(&account.entry_stable())
                .ok_or(VaultError::InvariantViolation("paired sum overflows"))?;
        }
        if shares != self.state.total_shares {
            return Err(VaultError::InvariantViolation(
                "total shares differ from account sum",
            ));
        }
        if paired != self.state.total_paired_stable {
            return Err(VaultError::InvariantViolation(
                "total paired stable differs from account sum",
            ));
        }
        if !self.state.total_shares.is_zero() && self.state.total_pooled_value.is_zero() {
            return Err(VaultError::InvariantViolation(
                "shares outstanding without pooled value",
            ));
        }
        Ok(())
    }
}

#[cfg(test)]
#[allow(clippy::panic)]
mod tests {
    use super::*;

    const STABLE: u128 = 1_000_000;

    fn alice() -> Address {
        Address::with_last_byte(0xa1)
    }

    fn bob() -> Address {
        Address::with_last_byte(0xb0)
    }

    fn never_dust(_: Liquidity) -> Result<bool> {
        Ok(false)
    }

    fn funded() -> CapitalLedger {
        let mut ledger = CapitalLedger::new(GuardConfig::default());
        let Ok(()) = ledger.credit_reserve(Amount::new(1_000_000 * STABLE)) else {
            panic!("credit");
        };
        ledger
    }

    // -- issue --------------------------------------------------------------------

    #[test]
    fn first_deposit_issues_liquidity_one_to_one() {
        let mut ledger = funded();
        let Ok(shares) =
            ledger.issue(alice(), Liquidity::new(500), Amount::new(10), Amount::new(25_000))
        else {
            panic!("issue");
        };
        assert_eq!(shares, Shares::new(500));
        assert_eq!(ledger.state().total_pooled_value(), Liquidity::new(500));
        assert_eq!(ledger.state().total_paired_stable(), Amount::new(25_000));
        assert_eq!(
            ledger.state().reserve_stable(),
            Amount::new(1_000_000 * STABLE - 25_000)
        );
        assert_eq!(ledger.price_per_full_share(), Ok(PRICE_PER_SHARE_SCALE));
        assert!(ledger.check_invariants().is_ok());
    }

    #[test]
    fn later_deposits_are_priced_by_pooled_value() {
        let mut ledger = funded();
        let Ok(_) =
            ledger.issue(alice(), Liquidity::new(1_000), Amount::new(1), Amount::new(1))
        else {
            panic!("issue");
        };
        let Ok(()) = ledger.accrue(Liquidity::new(1_000)) else {
            panic!("accrue");
        };
        assert_eq!(ledger.price_per_full_share(), Ok(2 * PRICE_PER_SHARE_SCALE));
        let Ok(shares) =
            ledger.issue(bob(), Liquidity::new(1_000), Amount::new(1), Amount::new(1))
        else {
            panic!("issue");
        };
        assert_eq!(shares, Shares::new(500));
        assert!(ledger.check_invariants().is_ok());
    }

    #[test]
    fn dust_deposit_rejected() {
        let mut ledger = funded();
        let Ok(_) = ledger.issue(alice(), Liquidity::new(10), Amount::new(1), Amount::new(1)) else {
            panic!("issue");
        };
        let Ok(()) = ledger.accrue(Liquidity::new(100)) else {
            panic!("accrue");
        };
        assert!(matches!(
            ledger.issue(bob(), Liquidity::new(5), Amount::new(1), Amount::new(1)),
            Err(VaultError::InvalidQuantity(_))
        ));
    }

    #[test]
    fn issue_beyond_reserve_is_capacity_error() {
        let mut ledger = CapitalLedger::new(GuardConfig::default());
        assert_eq!(
            ledger.issue(alice(), Liquidity::new(10), Amount::new(1), Amount::new(5)),
            Err(VaultError::CapacityExceeded {
                requested: Amount::new(5),
                available: Amount::ZERO,
            })
        );
    }

    // -- redeem -------------------------------------------------------------------

    #[test]
    fn over_request_is_clamped() {
        let mut ledger = funded();
        let Ok(shares) =
            ledger.issue(alice(), Liquidity::new(700), Amount::new(7), Amount::new(70))
        else {
            panic!("issue");
        };
        let Ok(r) = ledger.redemption(alice(), Shares::new(shares.get() * 10), never_dust) else {
            panic!("redemption");
        };
        assert_eq!(r.shares, shares);
        assert_eq!(r.liquidity, Liquidity::new(700));
        assert_eq!(r.portion.stable, Amount::new(70));
    }

    #[test]
    fn zero_and_empty_redemptions_rejected() {
        let mut ledger = funded();
        let Ok(_) =
            ledger.issue(alice(), Liquidity::new(700), Amount::new(7), Amount::new(70))
        else {
            panic!("issue");
        };
        assert!(matches!(
            ledger.redemption(alice(), Shares::ZERO, never_dust),
            Err(VaultError::InvalidQuantity(_))
        ));
        assert!(matches!(
            ledger.redemption(bob(), Shares::new(1), never_dust),
            Err(VaultError::InvalidQuantity(_))
        ));
    }

    #[test]
    fn full_redeem_zeroes_account_and_totals() {
        let mut ledger = funded();
        let Ok(_) =
            ledger.issue(alice(), Liquidity::new(700), Amount::new(7), Amount::new(70))
        else {
            panic!("issue");
        };
        let Ok(r) = ledger.redemption(alice(), Shares::MAX, never_dust) else {
            panic!("redemption");
        };
        let Ok(()) = ledger.redeem(alice(), &r, Amount::new(70)) else {
            panic!("redeem");
        };
        assert_eq!(ledger.account(alice()), Account::default());
        assert!(ledger.state().total_shares().is_zero());
        assert!(ledger.state().total_pooled_value().is_zero());
        assert!(ledger.state().total_paired_stable().is_zero());
        assert_eq!(ledger.state().reserve_stable(), Amount::new(1_000_000 * STABLE));
        assert_eq!(ledger.price_per_full_share(), Ok(0));
        assert!(ledger.check_invariants().is_ok());
    }

    #[test]
    fn partial_redeem_is_proportional() {
        let mut ledger = funded();
        let Ok(_) =
            ledger.issue(alice(), Liquidity::new(1_000), Amount::new(100), Amount::new(200))
        else {
            panic!("issue");
        };
        let Ok(_) =
            ledger.issue(bob(), Liquidity::new(1_000), Amount::new(100), Amount::new(200))
        else {
            panic!("issue");
        };
        let Ok(r) = ledger.redemption(alice(), Shares::new(250), never_dust) else {
            panic!("redemption");
        };
        assert_eq!(r.liquidity, Liquidity::new(250));
        assert_eq!(r.portion.stable, Amount::new(50));
        let Ok(()) = ledger.redeem(alice(), &r, Amount::new(50)) else {
            panic!("redeem");
        };
        assert_eq!(ledger.account(alice()).shares(), Shares::new(750));
        assert_eq!(ledger.state().total_paired_stable(), Amount::new(350));
        assert!(ledger.check_invariants().is_ok());
    }

    #[test]
    fn dust_remainder_is_swept_into_the_withdrawal() {
        let mut ledger = funded();
        let Ok(shares) =
            ledger.issue(alice(), Liquidity::new(1_000), Amount::new(100), Amount::new(200))
        else {
            panic!("issue");
        };
        let below_ten = |liquidity: Liquidity| -> Result<bool> { Ok(liquidity.get() < 10) };

        let Ok(r) = ledger.redemption(alice(), Shares::new(shares.get() - 5), below_ten) else {
            panic!("redemption");
        };
        assert_eq!(r.shares, shares);
        assert_eq!(r.liquidity, Liquidity::new(1_000));
        assert_eq!(r.portion.stable, Amount::new(200));

        let Ok(r) = ledger.redemption(alice(), Shares::new(shares.get() - 10), below_ten) else {
            panic!("redemption");
        };
        assert_eq!(r.shares, Shares::new(shares.get() - 10));
    }

    // -- capacity and escrow --------------------------------------------------------

    #[test]
    fn capacity_follows_spot_ratio() {
        let ledger = funded();
        let reserves = Reserves::new(Amount::new(1_000), Amount::new(2_500_000));
        assert_eq!(
            ledger.available_capacity(&reserves),
            Ok(Amount::new(400_000))
        );
    }

    #[test]
    fn escrow_and_release() {
        let mut ledger = funded();
        let Ok(()) = ledger.escrow(alice(), Amount::new(5)) else {
            panic!("escrow");
        };
        let Ok(()) = ledger.escrow(alice(), Amount::new(3)) else {
            panic!("escrow");
        };
        assert_eq!(ledger.total_recoverable(), Ok(Amount::new(8)));
        assert_eq!(ledger.release(alice()), Amount::new(8));
        assert_eq!(ledger.release(alice()), Amount::ZERO);
    }

    #[test]
    fn invariant_check_detects_drift() {
        let mut ledger = funded();
        let Ok(_) = ledger.issue(alice(), Liquidity::new(10), Amount::new(1), Amount::new(1)) else {
            panic!("issue");
        };
        ledger.state_mut().total_shares = Shares::new(11);
        assert!(matches!(
            ledger.check_invariants(),
            Err(VaultError::InvariantViolation(_))
        ));
    }
}
