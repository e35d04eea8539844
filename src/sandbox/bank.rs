//! In-memory ERC-20 ledger covering every sandbox token.

use std::collections::BTreeMap;

use alloy_primitives::Address;

use crate::domain::Amount;
use crate::error::AdapterError;

/// Balances keyed by `(token, holder)` and allowances keyed by
/// `(token, owner, spender)`.
///
/// An allowance of [`Amount::MAX`] is treated as unlimited and never
/// decremented.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TokenBalances {
    balances: BTreeMap<(Address, Address), Amount>,
    allowances: BTreeMap<(Address, Address, Address), Amount>,
}

impl TokenBalances {
    /// Balance of `holder`.
    pub fn balance_of(&self, token: Address, holder: Address) -> Amount {
        self.balances
            .get(&(token, holder))
            .copied()
            .unwrap_or_default()
    }

    /// Allowance `owner` granted `spender`.
    pub fn allowance(&self, token: Address, owner: Address, spender: Address) -> Amount {
        self.allowances
            .get(&(token, owner, spender))
            .copied()
            .unwrap_or_default()
    }

    /// Creates `amount` out of thin air for `to`.
    ///
    /// # Errors
    ///
    /// Returns [`AdapterError::Overflow`] if the balance overflows.
    pub fn mint(
        &mut self,
        token: Address,
        to: Address,
        amount: Amount,
    ) -> Result<(), AdapterError> {
        let next = self
            .balance_of(token, to)
            .checked_add(&amount)
            .ok_or(AdapterError::Overflow("token balance"))?;
        self.balances.insert((token, to), next);
        Ok(())
    }

    /// Destroys `amount` held by `from`.
    ///
    /// # Errors
    ///
    /// Returns [`AdapterError::InsufficientBalance`].
    pub fn burn(
        &mut self,
        token: Address,
        from: Address,
        amount: Amount,
    ) -> Result<(), AdapterError> {
        let next = self.debited(token, from, amount)?;
        self.balances.insert((token, from), next);
        Ok(())
    }

    /// Sets `owner`'s allowance for `spender`.
    pub fn approve(&mut self, token: Address, owner: Address, spender: Address, amount: Amount) {
        self.allowances.insert((token, owner, spender), amount);
    }

    /// Moves `amount` from `from` to `to`.
    ///
    /// # Errors
    ///
    /// - [`AdapterError::InsufficientBalance`] if `from` holds less.
    /// - [`AdapterError::Overflow`] if `to`'s balance overflows.
    pub fn transfer(
        &mut self,
        token: Address,
        from: Address,
        to: Address,
        amount: Amount,
    ) -> Result<(), AdapterError> {
        if amount.is_zero() || from == to {
            return Ok(());
        }
        let debited = self.debited(token, from, amount)?;
        let credited = self
            .balance_of(token, to)
            .checked_add(&amount)
            .ok_or(AdapterError::Overflow("token balance"))?;
        self.balances.insert((token, from), debited);
        self.balances.insert((token, to), credited);
        Ok(())
    }

    /// Moves `amount` from `from` to `to`, spending the allowance `from`
    /// granted `spender`.
    ///
    /// # Errors
    ///
    /// - [`AdapterError::InsufficientAllowance`] if the allowance is short.
    /// - Anything [`transfer`](Self::transfer) returns.
    pub fn transfer_from(
        &mut self,
        token: Address,
        spender: Address,
        from: Address,
        to: Address,
        amount: Amount,
    ) -> Result<(), AdapterError> {
        let allowance = self.allowance(token, from, spender);
        if allowance < amount {
            return Err(AdapterError::InsufficientAllowance {
                token,
                owner: from,
                spender,
                available: allowance,
                required: amount,
            });
        }
        self.transfer(token, from, to, amount)?;
        if allowance != Amount::MAX {
            self.approve(token, from, spender, allowance.saturating_sub(&amount));
        }
        Ok(())
    }

    fn debited(
        &self,
        token: Address,
        holder: Address,
        amount: Amount,
    ) -> Result<Amount, AdapterError> {
        let available = self.balance_of(token, holder);
        available
            .checked_sub(&amount)
            .ok_or(AdapterError::InsufficientBalance {
                token,
                holder,
                available,
                required: amount,
            })
    }
}
