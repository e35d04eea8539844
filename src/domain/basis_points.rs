//! Basis-point percentages used for the price-guard tolerance.

use core::fmt;

use super::{Amount, Rounding};
use crate::error::{Result, VaultError};
use crate::math::mul_div;

/// Denominator representing 100%.
const MAX_BPS: u32 = 10_000;

/// A percentage in basis points (1 bp = 0.01%, 10 000 bp = 100%).
///
/// Values above 10 000 are representable (a measured deviation can exceed
/// 100%) but are not valid as a configured percentage; see
/// [`is_valid_percent`](Self::is_valid_percent).
///
/// # Examples
///
/// ```
/// use hydra_vault::domain::{Amount, BasisPoints};
///
/// let d = BasisPoints::deviation(Amount::new(2_550), Amount::new(2_500)).expect("non-zero oracle");
/// assert_eq!(d, BasisPoints::new(200));
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default)]
#[cfg_attr(
    feature = "serde",
    derive(serde::Serialize, serde::Deserialize),
    serde(transparent)
)]
pub struct BasisPoints(u32);

impl BasisPoints {
    /// 0%.
    pub const ZERO: Self = Self(0);

    /// 100%.
    pub const MAX_PERCENT: Self = Self(MAX_BPS);

    /// Wraps a raw basis-point value.
    #[must_use]
    pub const fn new(value: u32) -> Self {
        Self(value)
    }

    /// Returns the raw value.
    #[must_use]
    pub const fn get(&self) -> u32 {
        self.0
    }

    /// Returns `true` if the value lies in `0..=10_000`.
    #[must_use]
    pub const fn is_valid_percent(&self) -> bool {
        self.0 <= MAX_BPS
    }

    /// Computes `amount × self / 10 000`.
    ///
    /// # Errors
    ///
    /// Returns [`VaultError::Overflow`] if the result exceeds `u128`.
    pub fn apply(&self, amount: Amount, rounding: Rounding) -> Result<Amount> {
        amount.scale(u128::from(self.0), u128::from(MAX_BPS), rounding)
    }

    /// Relative distance of `observed` from `reference`:
    /// `|observed − reference| × 10 000 / reference`, rounded up.
    ///
    /// Deviations too large for `u32` saturate.
    ///
    /// # Errors
    ///
    /// Returns [`VaultError::DivisionByZero`] if `reference` is zero.
    pub fn deviation(observed: Amount, reference: Amount) -> Result<Self> {
        if reference.is_zero() {
            return Err(VaultError::DivisionByZero);
        }
        let gap = observed.get().abs_diff(reference.get());
        let bps = match mul_div(gap, u128::from(MAX_BPS), reference.get(), Rounding::Up) {
            Ok(v) => u32::try_from(v).unwrap_or(u32::MAX),
            Err(VaultError::Overflow(_)) => u32::MAX,
            Err(err) => return Err(err),
        };
        Ok(Self(bps))
    }
}

impl fmt::Display for BasisPoints {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}bp", self.0)
    }
}
