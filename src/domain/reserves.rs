//! AMM reserve snapshot and spot quoting.

use super::{Amount, Rounding};
use crate::error::{AdapterError, Result};

/// Reserves of the base/stable pool at one instant.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Reserves {
    /// Base-asset reserve.
    pub base: Amount,
    /// Stablecoin reserve.
    pub stable: Amount,
}

impl Reserves {
    /// Creates a snapshot.
    #[must_use]
    pub const fn new(base: Amount, stable: Amount) -> Self {
        Self { base, stable }
    }

    fn ensure_priced(&self) -> Result<()> {
        if self.base.is_zero() || self.stable.is_zero() {
            return Err(AdapterError::ZeroReserve.into());
        }
        Ok(())
    }

    /// Stablecoin value of `base` at the spot ratio, rounded down.
    ///
    /// # Errors
    ///
    /// Returns [`AdapterError::ZeroReserve`] (wrapped) if either reserve is
    /// empty.
    pub fn quote_base(&self, base: Amount) -> Result<Amount> {
        self.ensure_priced()?;
        base.scale(self.stable.get(), self.base.get(), Rounding::Down)
    }

    /// Base value of `stable` at the spot ratio, rounded down.
    ///
    /// # Errors
    ///
    /// Returns [`AdapterError::ZeroReserve`] (wrapped) if either reserve is
    /// empty.
    pub fn quote_stable(&self, stable: Amount) -> Result<Amount> {
        self.ensure_priced()?;
        stable.scale(self.base.get(), self.stable.get(), Rounding::Down)
    }
}

#[cfg(test)]
#[allow(clippy::panic)]
mod tests {
    use super::*;
    use crate::error::VaultError;

    const ETH: u128 = 1_000_000_000_000_000_000;
    const USDC: u128 = 1_000_000;

    fn pool() -> Reserves {
        Reserves::new(Amount::new(100_000 * ETH), Amount::new(250_000_000 * USDC))
    }

    #[test]
    fn quotes_follow_the_reserve_ratio() {
        let Ok(stable) = pool().quote_base(Amount::new(ETH)) else {
            panic!("expected Ok");
        };
        assert_eq!(stable, Amount::new(2_500 * USDC));
        let Ok(base) = pool().quote_stable(Amount::new(5_000 * USDC)) else {
            panic!("expected Ok");
        };
        assert_eq!(base, Amount::new(2 * ETH));
    }

    #[test]
    fn empty_pool_cannot_price() {
        let empty = Reserves::new(Amount::ZERO, Amount::new(1));
        assert_eq!(
            empty.quote_base(Amount::new(1)),
            Err(VaultError::ExternalAdapterFailure(AdapterError::ZeroReserve))
        );
    }
}
