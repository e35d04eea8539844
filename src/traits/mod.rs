//! Collaborator seams.
//!
//! The vault core never talks to a concrete AMM, oracle, staking program or
//! token ledger.  It is generic over [`Environment`], the bundle of the
//! narrow traits below; the [`sandbox`](crate::sandbox) module provides a
//! deterministic in-memory implementation.

mod amm_adapter;
mod environment;
mod price_oracle;
mod staking_adapter;
mod token_bank;

pub use amm_adapter::AmmAdapter;
pub use environment::{Clock, Environment};
pub use price_oracle::PriceOracle;
pub use staking_adapter::StakingAdapter;
pub use token_bank::TokenBank;
