//! Convenience re-exports for common types and traits.
//!
//! ```rust
//! use hydra_vault::prelude::*;
//! ```

pub use crate::access::{AccessControl, Role};
pub use crate::config::{GuardConfig, VaultConfig, VaultTokens};
pub use crate::domain::{
    Account, Amount, Asset, BasisPoints, CompoundReceipt, DepositReceipt, EmergencyExitReport,
    GuardState, HarvestReceipt, Liquidity, OracleSource, PercentMil, PoolState, RebalanceLeg,
    Shares, Timestamp, VaultEvent, WithdrawReceipt,
};
pub use crate::error::{AdapterError, Result, VaultError};
pub use crate::traits::{AmmAdapter, Clock, Environment, PriceOracle, StakingAdapter, TokenBank};
pub use crate::vault::Vault;
