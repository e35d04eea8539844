//! Constant Product pool (Uniswap V2 pair semantics).
//!
//! The swap invariant is `x × y = k`.  The fee is taken from the input by
//! scaling it with `(10 000 − fee_bps)` before the pricing formula, exactly
//! as a V2 router quotes:
//!
//! ```text
//! amount_out = amount_in·(10 000 − fee)·reserve_out
//!            / (reserve_in·10 000 + amount_in·(10 000 − fee))
//! amount_in  = reserve_in·amount_out·10 000
//!            / ((reserve_out − amount_out)·(10 000 − fee)) + 1
//! ```
//!
//! # Protocol fee
//!
//! With the protocol fee switched on, every mint and burn first mints
//! `supply·(√k − √k_last) / (5·√k + √k_last)` position units to the fee
//! recipient: one sixth of the fee growth since the last liquidity event.
//!
//! # Invariant
//!
//! `k` never decreases across a swap; fees stay in the reserves.

use alloy_primitives::U256;

use crate::domain::{Amount, BasisPoints, Liquidity, Rounding};
use crate::error::AdapterError;
use crate::math::{isqrt, mul_div};

/// Basis-point denominator (10 000 = 100%).
const BPS_DENOMINATOR: u128 = 10_000;

/// Position units locked forever by the first mint.
pub const MINIMUM_LIQUIDITY: u128 = 1_000;

/// Outcome of [`ConstantProductPool::mint`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Mint {
    /// Units owed to the provider.
    pub liquidity: Liquidity,
    /// Units owed to the protocol fee recipient.
    pub protocol_fee: Liquidity,
    /// Units locked on the first mint.
    pub locked: Liquidity,
}

/// Outcome of [`ConstantProductPool::burn`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Burn {
    /// Token 0 returned.
    pub amount0: Amount,
    /// Token 1 returned.
    pub amount1: Amount,
    /// Units owed to the protocol fee recipient.
    pub protocol_fee: Liquidity,
}

struct BurnShare {
    amount0: Amount,
    amount1: Amount,
    protocol_fee: Liquidity,
    supply: Liquidity,
}

/// Reserve and supply state of a two-token `x · y = k` pool.
///
/// The pool does not hold tokens itself; the [`Sandbox`](super::Sandbox)
/// moves balances and calls into the pool for the accounting.
///
/// # Example
///
/// ```rust
/// use hydra_vault::domain::{Amount, BasisPoints};
/// use hydra_vault::sandbox::ConstantProductPool;
///
/// let mut pool = ConstantProductPool::new(BasisPoints::new(30), false).expect("valid fee");
/// pool.mint(Amount::new(1_000_000), Amount::new(2_000_000)).expect("seeded");
///
/// let out = pool.swap_exact_in(Amount::new(1_000), true).expect("swap ok");
/// assert!(out.get() > 0);
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ConstantProductPool {
    reserve0: Amount,
    reserve1: Amount,
    total_supply: Liquidity,
    fee: BasisPoints,
    protocol_fee_on: bool,
    k_last: U256,
}

impl ConstantProductPool {
    /// Creates an empty pool.
    ///
    /// # Errors
    ///
    /// Returns [`AdapterError::InvalidQuantity`] for a fee of 100% or more.
    pub fn new(fee: BasisPoints, protocol_fee_on: bool) -> Result<Self, AdapterError> {
        if u128::from(fee.get()) >= BPS_DENOMINATOR {
            return Err(AdapterError::InvalidQuantity("swap fee must be below 100%"));
        }
        Ok(Self {
            reserve0: Amount::ZERO,
            reserve1: Amount::ZERO,
            total_supply: Liquidity::ZERO,
            fee,
            protocol_fee_on,
            k_last: U256::ZERO,
        })
    }

    /// Returns `(reserve0, reserve1)`.
    pub const fn reserves(&self) -> (Amount, Amount) {
        (self.reserve0, self.reserve1)
    }

    /// Outstanding position units, locked units included.
    pub const fn total_supply(&self) -> Liquidity {
        self.total_supply
    }

    /// Swap fee.
    #[must_use]
    pub const fn fee(&self) -> BasisPoints {
        self.fee
    }

    const fn oriented(&self, zero_for_one: bool) -> (Amount, Amount) {
        if zero_for_one {
            (self.reserve0, self.reserve1)
        } else {
            (self.reserve1, self.reserve0)
        }
    }

    fn fee_complement(&self) -> u128 {
        BPS_DENOMINATOR - u128::from(self.fee.get())
    }

    /// Exact-in output quote.
    ///
    /// # Errors
    ///
    /// - [`AdapterError::InvalidQuantity`] for a zero input.
    /// - [`AdapterError::ZeroReserve`] on an empty pool.
    pub fn quote_out(&self, amount_in: Amount, zero_for_one: bool) -> Result<Amount, AdapterError> {
        if amount_in.is_zero() {
            return Err(AdapterError::InvalidQuantity("swap input is zero"));
        }
        let (reserve_in, reserve_out) = self.oriented(zero_for_one);
        if reserve_in.is_zero() || reserve_out.is_zero() {
            return Err(AdapterError::ZeroReserve);
        }
        // amount_in·(1e4 − fee)·reserve_out / (reserve_in·1e4 + amount_in·(1e4 − fee))
        let in_with_fee = U256::from(amount_in.get()) * U256::from(self.fee_complement());
        let numerator = in_with_fee * U256::from(reserve_out.get());
        let denominator = U256::from(reserve_in.get()) * U256::from(BPS_DENOMINATOR) + in_with_fee;
        u128::try_from(numerator / denominator)
            .map(Amount::new)
            .map_err(|_| AdapterError::Overflow("swap output"))
    }

    /// Exact-out input quote.
    ///
    /// # Errors
    ///
    /// - [`AdapterError::InvalidQuantity`] for a zero output.
    /// - [`AdapterError::InsufficientLiquidity`] if `amount_out` is not
    ///   below the output reserve.
    pub fn quote_in(&self, amount_out: Amount, zero_for_one: bool) -> Result<Amount, AdapterError> {
        if amount_out.is_zero() {
            return Err(AdapterError::InvalidQuantity("swap output is zero"));
        }
        let (reserve_in, reserve_out) = self.oriented(zero_for_one);
        if reserve_in.is_zero() || reserve_out.is_zero() {
            return Err(AdapterError::ZeroReserve);
        }
        if amount_out >= reserve_out {
            return Err(AdapterError::InsufficientLiquidity);
        }
        let numerator = U256::from(reserve_in.get())
            * U256::from(amount_out.get())
            * U256::from(BPS_DENOMINATOR);
        let denominator =
            U256::from(reserve_out.get() - amount_out.get()) * U256::from(self.fee_complement());
        let amount_in = numerator / denominator + U256::from(1u8);
        u128::try_from(amount_in)
            .map(Amount::new)
            .map_err(|_| AdapterError::Overflow("swap input"))
    }

    /// Sells exactly `amount_in` and returns the output.
    ///
    /// # Errors
    ///
    /// Anything [`quote_out`](Self::quote_out) returns, plus
    /// [`AdapterError::InsufficientLiquidity`] for a zero output.
    pub fn swap_exact_in(
        &mut self,
        amount_in: Amount,
        zero_for_one: bool,
    ) -> Result<Amount, AdapterError> {
        let amount_out = self.quote_out(amount_in, zero_for_one)?;
        if amount_out.is_zero() {
            return Err(AdapterError::InsufficientLiquidity);
        }
        self.settle_swap(amount_in, amount_out, zero_for_one)?;
        Ok(amount_out)
    }

    /// Buys exactly `amount_out` and returns the input charged.
    ///
    /// # Errors
    ///
    /// Anything [`quote_in`](Self::quote_in) returns.
    pub fn swap_exact_out(
        &mut self,
        amount_out: Amount,
        zero_for_one: bool,
    ) -> Result<Amount, AdapterError> {
        let amount_in = self.quote_in(amount_out, zero_for_one)?;
        self.settle_swap(amount_in, amount_out, zero_for_one)?;
        Ok(amount_in)
    }

    fn settle_swap(
        &mut self,
        amount_in: Amount,
        amount_out: Amount,
        zero_for_one: bool,
    ) -> Result<(), AdapterError> {
        let (reserve_in, reserve_out) = self.oriented(zero_for_one);
        let new_in = reserve_in
            .checked_add(&amount_in)
            .ok_or(AdapterError::Overflow("reserve_in after swap"))?;
        let new_out = reserve_out
            .checked_sub(&amount_out)
            .ok_or(AdapterError::InsufficientLiquidity)?;
        if zero_for_one {
            self.reserve0 = new_in;
            self.reserve1 = new_out;
        } else {
            self.reserve1 = new_in;
            self.reserve0 = new_out;
        }
        Ok(())
    }

    /// Router-optimal amounts for adding up to `desired0` / `desired1` at
    /// the current ratio.  An empty pool accepts both as given.
    ///
    /// # Errors
    ///
    /// Returns [`AdapterError::Overflow`] if a quote overflows.
    pub fn optimal_amounts(
        &self,
        desired0: Amount,
        desired1: Amount,
    ) -> Result<(Amount, Amount), AdapterError> {
        if self.reserve0.is_zero() && self.reserve1.is_zero() {
            return Ok((desired0, desired1));
        }
        let ratio = |amount: Amount, from: Amount, to: Amount| {
            mul_div(amount.get(), to.get(), from.get(), Rounding::Down)
                .map(Amount::new)
                .map_err(|_| AdapterError::Overflow("optimal amount"))
        };
        let optimal1 = ratio(desired0, self.reserve0, self.reserve1)?;
        if optimal1 <= desired1 {
            return Ok((desired0, optimal1));
        }
        let optimal0 = ratio(desired1, self.reserve1, self.reserve0)?;
        Ok((optimal0, desired1))
    }

    /// Adds `amount0` / `amount1` to the reserves and mints position units.
    ///
    /// The first mint issues `√(amount0 × amount1)` units, of which
    /// [`MINIMUM_LIQUIDITY`] are locked.  Later mints issue
    /// `min(amount0 / reserve0, amount1 / reserve1) × supply`.
    ///
    /// # Errors
    ///
    /// Returns [`AdapterError::InvalidQuantity`] if nothing would be minted.
    pub fn mint(&mut self, amount0: Amount, amount1: Amount) -> Result<Mint, AdapterError> {
        let protocol_fee = self.protocol_fee()?;
        let supply = self
            .total_supply
            .checked_add(&protocol_fee)
            .ok_or(AdapterError::Overflow("supply with protocol fee"))?;

        let (liquidity, locked) = if supply.is_zero() {
            let root = isqrt(U256::from(amount0.get()) * U256::from(amount1.get()));
            let root =
                u128::try_from(root).map_err(|_| AdapterError::Overflow("initial liquidity"))?;
            if root <= MINIMUM_LIQUIDITY {
                return Err(AdapterError::InvalidQuantity("initial deposit too small"));
            }
            (root - MINIMUM_LIQUIDITY, MINIMUM_LIQUIDITY)
        } else {
            let share = |amount: Amount, reserve: Amount| {
                mul_div(amount.get(), supply.get(), reserve.get(), Rounding::Down)
                    .map_err(|_| AdapterError::Overflow("mint share"))
            };
            (
                core::cmp::min(share(amount0, self.reserve0)?, share(amount1, self.reserve1)?),
                0,
            )
        };
        if liquidity == 0 {
            return Err(AdapterError::InvalidQuantity("deposit too small to mint liquidity"));
        }

        self.reserve0 = self
            .reserve0
            .checked_add(&amount0)
            .ok_or(AdapterError::Overflow("reserve0 on mint"))?;
        self.reserve1 = self
            .reserve1
            .checked_add(&amount1)
            .ok_or(AdapterError::Overflow("reserve1 on mint"))?;
        self.total_supply = supply
            .checked_add(&Liquidity::new(liquidity + locked))
            .ok_or(AdapterError::Overflow("total supply on mint"))?;
        self.snapshot_k();

        Ok(Mint {
            liquidity: Liquidity::new(liquidity),
            protocol_fee,
            locked: Liquidity::new(locked),
        })
    }

    /// Reserves burning `liquidity` would return now, protocol fee
    /// included.  Either side may round to zero.
    ///
    /// # Errors
    ///
    /// - [`AdapterError::InvalidQuantity`] for zero.
    /// - [`AdapterError::InsufficientLiquidity`] beyond the supply.
    pub fn quote_burn(&self, liquidity: Liquidity) -> Result<(Amount, Amount), AdapterError> {
        let share = self.burn_share(liquidity)?;
        Ok((share.amount0, share.amount1))
    }

    fn burn_share(&self, liquidity: Liquidity) -> Result<BurnShare, AdapterError> {
        if liquidity.is_zero() {
            return Err(AdapterError::InvalidQuantity("burn of zero liquidity"));
        }
        let protocol_fee = self.protocol_fee()?;
        let supply = self
            .total_supply
            .checked_add(&protocol_fee)
            .ok_or(AdapterError::Overflow("supply with protocol fee"))?;
        if liquidity > supply {
            return Err(AdapterError::InsufficientLiquidity);
        }
        let pro_rata = |reserve: Amount| {
            mul_div(liquidity.get(), reserve.get(), supply.get(), Rounding::Down)
                .map(Amount::new)
                .map_err(|_| AdapterError::Overflow("burn share"))
        };
        Ok(BurnShare {
            amount0: pro_rata(self.reserve0)?,
            amount1: pro_rata(self.reserve1)?,
            protocol_fee,
            supply,
        })
    }

    /// Burns `liquidity` units and returns the proportional reserves.
    ///
    /// # Errors
    ///
    /// - [`AdapterError::InsufficientLiquidity`] if `liquidity` exceeds the
    ///   supply or either output rounds to zero.
    pub fn burn(&mut self, liquidity: Liquidity) -> Result<Burn, AdapterError> {
        let BurnShare {
            amount0,
            amount1,
            protocol_fee,
            supply,
        } = self.burn_share(liquidity)?;
        if amount0.is_zero() || amount1.is_zero() {
            return Err(AdapterError::InsufficientLiquidity);
        }

        self.reserve0 = self.reserve0.saturating_sub(&amount0);
        self.reserve1 = self.reserve1.saturating_sub(&amount1);
        self.total_supply = supply.saturating_sub(&liquidity);
        self.snapshot_k();

        Ok(Burn {
            amount0,
            amount1,
            protocol_fee,
        })
    }

    /// Units the protocol fee recipient is owed for fee growth since the
    /// last mint or burn.
    fn protocol_fee(&self) -> Result<Liquidity, AdapterError> {
        if !self.protocol_fee_on || self.k_last.is_zero() {
            return Ok(Liquidity::ZERO);
        }
        let root_k = isqrt(U256::from(self.reserve0.get()) * U256::from(self.reserve1.get()));
        let root_k_last = isqrt(self.k_last);
        if root_k <= root_k_last {
            return Ok(Liquidity::ZERO);
        }
        let numerator = U256::from(self.total_supply.get()) * (root_k - root_k_last);
        let denominator = root_k * U256::from(5u8) + root_k_last;
        u128::try_from(numerator / denominator)
            .map(Liquidity::new)
            .map_err(|_| AdapterError::Overflow("protocol fee"))
    }

    fn snapshot_k(&mut self) {
        self.k_last = if self.protocol_fee_on {
            U256::from(self.reserve0.get()) * U256::from(self.reserve1.get())
        } else {
            U256::ZERO
        };
    }
}
