//! ERC-20 style token seam.

use alloy_primitives::Address;

use crate::domain::Amount;
use crate::error::AdapterError;

/// Balances and allowances, with mutations issued by the vault.
///
/// `approve` and `transfer` debit the vault; `transfer_from` credits the
/// vault by spending an allowance `from` granted to it.
pub trait TokenBank {
    /// Balance of `holder` in `token`.
    #[must_use]
    fn balance_of(&self, token: Address, holder: Address) -> Amount;

    /// Remaining allowance `owner` granted `spender` in `token`.
    #[must_use]
    fn allowance(&self, token: Address, owner: Address, spender: Address) -> Amount;

    /// Sets the vault's allowance for `spender`.
    ///
    /// # Errors
    ///
    /// Adapter-specific.
    fn approve(&mut self, token: Address, spender: Address, amount: Amount)
        -> Result<(), AdapterError>;

    /// Sends `amount` of `token` from the vault to `to`.
    ///
    /// # Errors
    ///
    /// [`AdapterError::InsufficientBalance`] if the vault holds less.
    fn transfer(&mut self, token: Address, to: Address, amount: Amount)
        -> Result<(), AdapterError>;

    /// Pulls `amount` of `token` from `from` into the vault.
    ///
    /// # Errors
    ///
    /// [`AdapterError::InsufficientAllowance`] or
    /// [`AdapterError::InsufficientBalance`].
    fn transfer_from(
        &mut self,
        token: Address,
        from: Address,
        amount: Amount,
    ) -> Result<(), AdapterError>;
}
