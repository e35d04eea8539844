//! Per-depositor position record.

use super::{Amount, Rounding, Shares};
use crate::error::{Result, VaultError};

/// A depositor's position in the vault.
///
/// `entry_base` and `entry_stable` record what was matched when the shares
/// were issued; `entry_stable` is the stablecoin principal the vault must
/// recover when the shares are redeemed.
///
/// An account whose shares reach zero is zeroed, never removed, so a
/// returning depositor starts from a clean record.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Account {
    entry_base: Amount,
    entry_stable: Amount,
    shares: Shares,
}

/// The part of an account's entry amounts attributable to a share slice.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct EntryPortion {
    /// Base matched for the slice.
    pub base: Amount,
    /// Stablecoin principal for the slice.
    pub stable: Amount,
}

impl Account {
    /// Base asset contributed, net of redemptions.
    pub const fn entry_base(&self) -> Amount {
        self.entry_base
    }

    /// Stablecoin principal paired on the depositor's behalf.
    pub const fn entry_stable(&self) -> Amount {
        self.entry_stable
    }

    /// Outstanding shares.
    pub const fn shares(&self) -> Shares {
        self.shares
    }

    /// Returns `true` if the account holds no shares.
    #[must_use]
    pub const fn is_empty(&self) -> bool {
        self.shares.is_zero()
    }

    /// Entry amounts proportional to `shares / self.shares`, rounded down.
    /// Redeeming every share returns the full entry amounts.
    ///
    /// # Errors
    ///
    /// - [`VaultError::InvalidQuantity`] if `shares` exceeds the balance.
    /// - [`VaultError::DivisionByZero`] on an empty account.
    pub fn portion(&self, shares: Shares) -> Result<EntryPortion> {
        if shares > self.shares {
            return Err(VaultError::InvalidQuantity("portion exceeds account shares"));
        }
        if shares == self.shares {
            return Ok(EntryPortion {
                base: self.entry_base,
                stable: self.entry_stable,
            });
        }
        Ok(EntryPortion {
            base: self
                .entry_base
                .scale(shares.get(), self.shares.get(), Rounding::Down)?,
            stable: self
                .entry_stable
                .scale(shares.get(), self.shares.get(), Rounding::Down)?,
        })
    }

    pub(crate) fn credit(&mut self, base: Amount, stable: Amount, shares: Shares) -> Result<()> {
        self.entry_base = self.entry_base.safe_add(&base, "account entry base")?;
        self.entry_stable = self.entry_stable.safe_add(&stable, "account entry stable")?;
        self.shares = self.shares.safe_add(&shares, "account shares")?;
        Ok(())
    }

    pub(crate) fn debit(&mut self, shares: Shares, portion: EntryPortion) -> Result<()> {
        self.shares = self.shares.safe_sub(&shares, "account shares")?;
        if self.shares.is_zero() {
            *self = Self::default();
            return Ok(());
        }
        self.entry_base = self.entry_base.safe_sub(&portion.base, "account entry base")?;
        self.entry_stable = self
            .entry_stable
            .safe_sub(&portion.stable, "account entry stable")?;
        Ok(())
    }
}
