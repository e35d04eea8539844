//! Unsigned `u128` quantities: token amounts, vault shares and AMM
//! liquidity.
//!
//! The three types share the same shape but are deliberately distinct so a
//! share count can never be passed where a token amount is expected.
//! Conversion between them is explicit (`Shares::new(liquidity.get())`).

use core::fmt;

use crate::error::{Result, VaultError};
use crate::math::mul_div;

use super::Rounding;

macro_rules! quantity {
    ($(#[$meta:meta])* $name:ident, $label:literal) => {
        $(#[$meta])*
        #[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default)]
        #[cfg_attr(
            feature = "serde",
            derive(serde::Serialize, serde::Deserialize),
            serde(transparent)
        )]
        #[must_use]
        pub struct $name(u128);

        impl $name {
            /// Zero.
            pub const ZERO: Self = Self(0);

            /// Largest representable value.
            pub const MAX: Self = Self(u128::MAX);

            /// Wraps a raw `u128` value.
            pub const fn new(value: u128) -> Self {
                Self(value)
            }

            /// Returns the raw `u128` value.
            #[must_use]
            pub const fn get(&self) -> u128 {
                self.0
            }

            /// Returns `true` if the value is zero.
            #[must_use]
            pub const fn is_zero(&self) -> bool {
                self.0 == 0
            }

            /// Checked addition. Returns `None` on overflow.
            #[must_use]
            pub const fn checked_add(&self, other: &Self) -> Option<Self> {
                match self.0.checked_add(other.0) {
                    Some(v) => Some(Self(v)),
                    None => None,
                }
            }

            /// Checked subtraction. Returns `None` on underflow.
            #[must_use]
            pub const fn checked_sub(&self, other: &Self) -> Option<Self> {
                match self.0.checked_sub(other.0) {
                    Some(v) => Some(Self(v)),
                    None => None,
                }
            }

            /// Addition that reports overflow as [`VaultError::Overflow`]
            /// labelled with `site`.
            ///
            /// # Errors
            ///
            /// Returns [`VaultError::Overflow`] on overflow.
            pub fn safe_add(&self, other: &Self, site: &'static str) -> Result<Self> {
                self.checked_add(other).ok_or(VaultError::Overflow(site))
            }

            /// Subtraction that reports underflow as [`VaultError::Overflow`]
            /// labelled with `site`.
            ///
            /// # Errors
            ///
            /// Returns [`VaultError::Overflow`] on underflow.
            pub fn safe_sub(&self, other: &Self, site: &'static str) -> Result<Self> {
                self.checked_sub(other).ok_or(VaultError::Overflow(site))
            }

            /// Subtraction clamped at zero.
            pub const fn saturating_sub(&self, other: &Self) -> Self {
                Self(self.0.saturating_sub(other.0))
            }

            /// Computes `self × numerator / denominator` with a 256-bit
            /// intermediate product.
            ///
            /// # Errors
            ///
            /// - [`VaultError::DivisionByZero`] if `denominator` is zero.
            /// - [`VaultError::Overflow`] if the quotient exceeds `u128`.
            pub fn scale(
                &self,
                numerator: u128,
                denominator: u128,
                rounding: Rounding,
            ) -> Result<Self> {
                mul_div(self.0, numerator, denominator, rounding).map(Self)
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                write!(f, concat!("{}", $label), self.0)
            }
        }
    };
}

quantity!(
    /// A raw token amount in the token's smallest unit (wei, micro-USDC, ...).
    ///
    /// `Amount` never interprets decimals.
    ///
    /// # Examples
    ///
    /// ```
    /// use hydra_vault::domain::Amount;
    ///
    /// let a = Amount::new(100);
    /// assert_eq!(a.checked_add(&Amount::new(50)), Some(Amount::new(150)));
    /// assert_eq!(a.checked_sub(&Amount::new(101)), None);
    /// ```
    Amount,
    ""
);

quantity!(
    /// Claim units on the vault's pooled value.
    ///
    /// Shares are minted on deposit and burnt on withdrawal; compounding
    /// grows the value behind each share without minting new ones.
    Shares,
    " shares"
);

quantity!(
    /// AMM position units (LP tokens).
    Liquidity,
    " liq"
);

impl From<Liquidity> for Amount {
    /// Position units as a balance of the position token.
    fn from(value: Liquidity) -> Self {
        Self(value.0)
    }
}
