//! Constant-product AMM seam.
//!
//! [`AmmAdapter`] is the vault's view of a two-asset `x · y = k` pool and
//! its router.  Every state-changing call acts on behalf of the vault: input
//! tokens are pulled from the vault through the allowance it granted to
//! [`router`](AmmAdapter::router), and outputs (tokens or position units)
//! are credited back to the vault.
//!
//! # Quotes
//!
//! [`quote_out`](AmmAdapter::quote_out) and
//! [`amount_in_for`](AmmAdapter::amount_in_for) mirror a router's
//! `getAmountsOut` / `getAmountsIn`: they are pure and reflect the reserves
//! at call time, fee included.  A swap issued immediately after a quote
//! fills at exactly the quoted amount.

use alloy_primitives::Address;

use crate::domain::{Amount, Asset, Liquidity, LiquidityDelta, Reserves, Timestamp};
use crate::error::AdapterError;

/// Add/remove/swap/reserve operations over the base/stable pool.
pub trait AmmAdapter {
    /// Address the vault approves before add-liquidity and swap calls.
    #[must_use]
    fn router(&self) -> Address;

    /// Current base/stable reserves.
    ///
    /// # Errors
    ///
    /// Adapter-specific; typically infallible for in-memory pools.
    fn reserves(&self) -> Result<Reserves, AdapterError>;

    /// Output for selling `amount_in` of `asset_in`, fee included.
    ///
    /// # Errors
    ///
    /// - [`AdapterError::UnsupportedRoute`] if no pool connects the assets.
    /// - [`AdapterError::ZeroReserve`] if the pool is empty.
    fn quote_out(
        &self,
        amount_in: Amount,
        asset_in: Asset,
        asset_out: Asset,
    ) -> Result<Amount, AdapterError>;

    /// Input of `asset_in` needed to receive exactly `amount_out`.
    ///
    /// # Errors
    ///
    /// - [`AdapterError::InsufficientLiquidity`] if `amount_out` is not
    ///   below the output reserve.
    /// - [`AdapterError::UnsupportedRoute`] if no pool connects the assets.
    fn amount_in_for(
        &self,
        amount_out: Amount,
        asset_in: Asset,
        asset_out: Asset,
    ) -> Result<Amount, AdapterError>;

    /// Adds up to `base` / `stable` at the current ratio and mints the
    /// position to the vault.  Unused amounts stay with the vault.
    ///
    /// # Errors
    ///
    /// - [`AdapterError::DeadlineExpired`] past `deadline`.
    /// - [`AdapterError::InsufficientAllowance`] /
    ///   [`AdapterError::InsufficientBalance`] if the vault cannot fund it.
    /// - [`AdapterError::InvalidQuantity`] if nothing would be minted.
    fn add_liquidity(
        &mut self,
        base: Amount,
        stable: Amount,
        deadline: Timestamp,
    ) -> Result<LiquidityDelta, AdapterError>;

    /// `(base, stable)` that burning `liquidity` would return now.  Either
    /// side may be zero for a dust position.
    ///
    /// # Errors
    ///
    /// - [`AdapterError::InvalidQuantity`] for zero.
    /// - [`AdapterError::InsufficientLiquidity`] beyond the position supply.
    fn quote_remove(&self, liquidity: Liquidity) -> Result<(Amount, Amount), AdapterError>;

    /// Burns `liquidity` held by the vault and returns `(base, stable)`.
    ///
    /// # Errors
    ///
    /// - [`AdapterError::DeadlineExpired`] past `deadline`.
    /// - [`AdapterError::InsufficientBalance`] if the vault does not hold
    ///   the position.
    fn remove_liquidity(
        &mut self,
        liquidity: Liquidity,
        deadline: Timestamp,
    ) -> Result<(Amount, Amount), AdapterError>;

    /// Sells exactly `amount_in` of `asset_in` for at least `min_out` of
    /// `asset_out`.
    ///
    /// # Errors
    ///
    /// - [`AdapterError::SlippageExceeded`] below `min_out`.
    /// - [`AdapterError::DeadlineExpired`] past `deadline`.
    /// - [`AdapterError::UnsupportedRoute`] if no pool connects the assets.
    fn swap_exact(
        &mut self,
        amount_in: Amount,
        asset_in: Asset,
        asset_out: Asset,
        min_out: Amount,
        deadline: Timestamp,
    ) -> Result<Amount, AdapterError>;
}
