//! 256-bit intermediate arithmetic.
//!
//! Reserve × liquidity and reserve × amount × fee products routinely exceed
//! `u128` for 18-decimal tokens, so every scaled quantity in the crate goes
//! through [`mul_div`], which multiplies in [`U256`] and narrows the
//! quotient back to `u128`.

use alloy_primitives::U256;

use crate::domain::Rounding;
use crate::error::{Result, VaultError};

/// Computes `a × b / denominator` with a 256-bit product.
///
/// # Errors
///
/// - [`VaultError::DivisionByZero`] if `denominator` is zero.
/// - [`VaultError::Overflow`] if the quotient does not fit in `u128`.
///
/// # Examples
///
/// ```
/// use hydra_vault::domain::Rounding;
/// use hydra_vault::math::mul_div;
///
/// let big = u128::MAX / 2;
/// assert_eq!(mul_div(big, 4, 8, Rounding::Down).expect("fits"), big / 2);
/// assert_eq!(mul_div(10, 1, 3, Rounding::Up).expect("fits"), 4);
/// ```
pub fn mul_div(a: u128, b: u128, denominator: u128, rounding: Rounding) -> Result<u128> {
    if denominator == 0 {
        return Err(VaultError::DivisionByZero);
    }
    let product = U256::from(a) * U256::from(b);
    let denominator = U256::from(denominator);
    let mut quotient = product / denominator;
    if rounding.is_up() && !(product % denominator).is_zero() {
        quotient += U256::from(1u8);
    }
    u128::try_from(quotient).map_err(|_| VaultError::Overflow("mul_div quotient exceeds u128"))
}

/// Integer square root (floor) of a 256-bit value, Babylonian method.
#[must_use]
pub fn isqrt(value: U256) -> U256 {
    if value > U256::from(3u8) {
        let mut root = value;
        let mut next = (value >> 1) + U256::from(1u8);
        while next < root {
            root = next;
            next = (value / next + next) >> 1;
        }
        root
    } else if value.is_zero() {
        U256::ZERO
    } else {
        U256::from(1u8)
    }
}

/// `⌊√(a × b)⌋`, the geometric mean used for initial LP supply and the
/// protocol fee.
///
/// # Errors
///
/// Never fails for `u128` inputs; the `Result` keeps the call sites uniform.
pub fn sqrt_product(a: u128, b: u128) -> Result<u128> {
    u128::try_from(isqrt(U256::from(a) * U256::from(b)))
        .map_err(|_| VaultError::Overflow("sqrt_product exceeds u128"))
}

#[cfg(test)]
#[allow(clippy::panic)]
mod tests {
    use super::*;

    // -- mul_div --------------------------------------------------------------

    #[test]
    fn mul_div_by_zero() {
        assert_eq!(mul_div(1, 1, 0, Rounding::Down), Err(VaultError::DivisionByZero));
    }

    #[test]
    fn mul_div_wide_product() {
        let Ok(v) = mul_div(u128::MAX, u128::MAX, u128::MAX, Rounding::Down) else {
            panic!("expected Ok");
        };
        assert_eq!(v, u128::MAX);
    }

    #[test]
    fn mul_div_overflowing_quotient() {
        assert!(matches!(
            mul_div(u128::MAX, 2, 1, Rounding::Down),
            Err(VaultError::Overflow(_))
        ));
    }

    #[test]
    fn mul_div_rounding() {
        assert_eq!(mul_div(7, 1, 2, Rounding::Down), Ok(3));
        assert_eq!(mul_div(7, 1, 2, Rounding::Up), Ok(4));
        assert_eq!(mul_div(8, 1, 2, Rounding::Up), Ok(4));
        assert_eq!(mul_div(0, 5, 3, Rounding::Up), Ok(0));
    }

    // -- isqrt ----------------------------------------------------------------

    #[test]
    fn isqrt_small_values() {
        let expect = [0u8, 1, 1, 1, 2, 2, 2, 2, 2, 3];
        for (n, root) in expect.iter().enumerate() {
            assert_eq!(isqrt(U256::from(n)), U256::from(*root), "isqrt({n})");
        }
    }

    #[test]
    fn isqrt_perfect_square() {
        let n = U256::from(1_000_000_007u128) * U256::from(1_000_000_007u128);
        assert_eq!(isqrt(n), U256::from(1_000_000_007u128));
        assert_eq!(isqrt(n - U256::from(1u8)), U256::from(1_000_000_006u128));
    }

    #[test]
    fn sqrt_product_of_pool_reserves() {
        // 100k ETH (18 dp) against 250M USDC (6 dp).
        let Ok(root) = sqrt_product(100_000 * 10u128.pow(18), 250_000_000 * 10u128.pow(6)) else {
            panic!("expected Ok");
        };
        assert_eq!(root, 5 * 10u128.pow(18));
    }

    #[test]
    fn sqrt_product_max() {
        let Ok(root) = sqrt_product(u128::MAX, u128::MAX) else {
            panic!("expected Ok");
        };
        assert_eq!(root, u128::MAX);
    }
}
