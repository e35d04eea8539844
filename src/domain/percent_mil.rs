//! Owner fee rate in parts per hundred thousand.

use core::fmt;

use super::{Amount, Rounding};
use crate::error::{Result, VaultError};

/// Denominator representing 100%.
const MAX_PERCENT_MIL: u32 = 100_000;

/// A fee rate in parts per 100 000 (1 000 = 1%, 100 000 = 100%).
///
/// Construction rejects values above 100%.
///
/// # Examples
///
/// ```
/// use hydra_vault::domain::{Amount, PercentMil};
///
/// let fee = PercentMil::new(30_000).expect("at most 100%");
/// assert_eq!(fee.apply(Amount::new(1_000)).expect("fits"), Amount::new(300));
/// assert!(PercentMil::new(100_001).is_err());
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default)]
pub struct PercentMil(u32);

impl PercentMil {
    /// No fee.
    pub const ZERO: Self = Self(0);

    /// The whole amount.
    pub const FULL: Self = Self(MAX_PERCENT_MIL);

    /// Creates a fee rate.
    ///
    /// # Errors
    ///
    /// Returns [`VaultError::InvalidQuantity`] above 100 000.
    pub fn new(value: u32) -> Result<Self> {
        if value > MAX_PERCENT_MIL {
            return Err(VaultError::InvalidQuantity("fee exceeds 100000 percent-mil"));
        }
        Ok(Self(value))
    }

    /// Returns the raw value.
    #[must_use]
    pub const fn get(&self) -> u32 {
        self.0
    }

    /// Returns `true` for a zero rate.
    #[must_use]
    pub const fn is_zero(&self) -> bool {
        self.0 == 0
    }

    /// Computes `amount × self / 100 000`, rounded down.
    ///
    /// # Errors
    ///
    /// Returns [`VaultError::Overflow`] if the result exceeds `u128`.
    pub fn apply(&self, amount: Amount) -> Result<Amount> {
        amount.scale(u128::from(self.0), u128::from(MAX_PERCENT_MIL), Rounding::Down)
    }
}

impl fmt::Display for PercentMil {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}pcm", self.0)
    }
}
