//! Value types used throughout the vault.
//!
//! Quantities are `u128` newtypes ([`Amount`], [`Shares`], [`Liquidity`])
//! with checked arithmetic; percentages carry their scale in the type
//! ([`BasisPoints`], [`PercentMil`]).  Ledger records ([`Account`],
//! [`PoolState`]) expose read accessors only; mutation goes through the
//! [`CapitalLedger`](crate::ledger::CapitalLedger).

mod account;
mod asset;
mod basis_points;
mod event;
mod liquidity_delta;
mod oracle_source;
mod percent_mil;
mod pool_state;
mod quantity;
mod receipts;
mod reserves;
mod rounding;
mod timestamp;

pub use account::{Account, EntryPortion};
pub use asset::Asset;
pub use basis_points::BasisPoints;
pub use event::VaultEvent;
pub use liquidity_delta::LiquidityDelta;
pub use oracle_source::OracleSource;
pub use percent_mil::PercentMil;
pub use pool_state::{GuardState, PoolState};
pub use quantity::{Amount, Liquidity, Shares};
pub use receipts::{
    CompoundReceipt, DepositReceipt, EmergencyExitReport, HarvestReceipt, RebalanceLeg,
    WithdrawReceipt,
};
pub use reserves::Reserves;
pub use rounding::Rounding;
pub use timestamp::Timestamp;
