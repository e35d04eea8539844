//! Result of adding liquidity to the AMM.

use super::{Amount, Liquidity};

/// Position minted by an add-liquidity call and the amounts the router
/// actually consumed.
///
/// The router matches the current reserve ratio, so one side is usually
/// used in full and the other leaves a small remainder with the caller.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LiquidityDelta {
    liquidity: Liquidity,
    base_used: Amount,
    stable_used: Amount,
}

impl LiquidityDelta {
    /// Creates a delta.
    pub const fn new(liquidity: Liquidity, base_used: Amount, stable_used: Amount) -> Self {
        Self {
            liquidity,
            base_used,
            stable_used,
        }
    }

    /// Position units minted to the caller.
    pub const fn liquidity(&self) -> Liquidity {
        self.liquidity
    }

    /// Base asset taken by the pool.
    pub const fn base_used(&self) -> Amount {
        self.base_used
    }

    /// Stablecoin taken by the pool.
    pub const fn stable_used(&self) -> Amount {
        self.stable_used
    }
}
