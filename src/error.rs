//! Error types for the vault and its external collaborators.
//!
//! Every fallible vault command returns [`VaultError`].  Failures raised by
//! the AMM, oracle, staking or token adapters are reported as
//! [`AdapterError`] and surface through
//! [`VaultError::ExternalAdapterFailure`]; they are never retried.
//!
//! A command that returns `Err` leaves the vault and its environment exactly
//! as they were before the call.

use alloy_primitives::Address;
use thiserror::Error;

use crate::access::Role;
use crate::domain::{Amount, Asset, BasisPoints, Liquidity, OracleSource, Timestamp};

/// Failure reported by an external collaborator (AMM, oracle, staking
/// program or token ledger).
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum AdapterError {
    /// The pool cannot satisfy the requested amounts.
    #[error("insufficient pool liquidity")]
    InsufficientLiquidity,

    /// A pool reserve is zero, so no price or swap can be computed.
    #[error("pool reserve is zero")]
    ZeroReserve,

    /// The swap would return less than the caller's minimum.
    #[error("slippage exceeded: quoted {quoted}, minimum {minimum}")]
    SlippageExceeded {
        /// Amount the pool would deliver.
        quoted: Amount,
        /// Minimum the caller accepts.
        minimum: Amount,
    },

    /// A holder does not own enough of a token.
    #[error("insufficient {token} balance for {holder}: has {available}, needs {required}")]
    InsufficientBalance {
        /// Token contract.
        token: Address,
        /// Account being debited.
        holder: Address,
        /// Current balance.
        available: Amount,
        /// Amount requested.
        required: Amount,
    },

    /// A spender has not been approved for enough of a token.
    #[error("insufficient {token} allowance from {owner} to {spender}: has {available}, needs {required}")]
    InsufficientAllowance {
        /// Token contract.
        token: Address,
        /// Account that granted the allowance.
        owner: Address,
        /// Account spending the allowance.
        spender: Address,
        /// Remaining allowance.
        available: Amount,
        /// Amount requested.
        required: Amount,
    },

    /// The selected oracle feed cannot produce a quote.
    #[error("oracle {0} unavailable")]
    OracleUnavailable(OracleSource),

    /// The adapter has no route between the two assets.
    #[error("no route from {from} to {to}")]
    UnsupportedRoute {
        /// Asset sold.
        from: Asset,
        /// Asset bought.
        to: Asset,
    },

    /// The adapter refused a stale request.
    #[error("adapter deadline {deadline} expired at {now}")]
    DeadlineExpired {
        /// Deadline supplied by the caller.
        deadline: Timestamp,
        /// Adapter clock at rejection.
        now: Timestamp,
    },

    /// Unstake request exceeds the staked position.
    #[error("insufficient stake: staked {staked}, requested {requested}")]
    InsufficientStake {
        /// Position currently staked.
        staked: Liquidity,
        /// Position requested back.
        requested: Liquidity,
    },

    /// A zero or otherwise unusable quantity reached the adapter.
    #[error("invalid adapter quantity: {0}")]
    InvalidQuantity(&'static str),

    /// Arithmetic overflow inside the adapter.
    #[error("adapter arithmetic overflow: {0}")]
    Overflow(&'static str),
}

/// Unified error type for vault commands.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum VaultError {
    /// Caller lacks the role the command requires.
    #[error("access denied: {caller} does not hold the {role} role")]
    AccessDenied {
        /// Address that issued the command.
        caller: Address,
        /// Role the command requires.
        role: Role,
    },

    /// AMM spot price deviates from the oracle by more than the tolerance.
    #[error("price guard triggered: spot {spot} vs oracle {oracle} deviates {deviation} (tolerance {tolerance})")]
    PriceGuardTriggered {
        /// Spot quote of the reference amount.
        spot: Amount,
        /// Oracle quote of the reference amount.
        oracle: Amount,
        /// Measured deviation.
        deviation: BasisPoints,
        /// Configured tolerance.
        tolerance: BasisPoints,
    },

    /// The caller's deadline has already elapsed.
    #[error("deadline {deadline} expired at {now}")]
    DeadlineExpired {
        /// Deadline supplied by the caller.
        deadline: Timestamp,
        /// Vault clock at rejection.
        now: Timestamp,
    },

    /// Not enough unpaired stablecoin to match the deposit.
    #[error("capacity exceeded: requested {requested}, available {available}")]
    CapacityExceeded {
        /// Amount requested.
        requested: Amount,
        /// Amount the vault can currently accept or release.
        available: Amount,
    },

    /// The token is protected and cannot be salvaged.
    #[error("token {0} is protected and cannot be salvaged")]
    SalvageForbidden(Address),

    /// The vault is paused and refuses new deposits.
    #[error("vault is paused")]
    Paused,

    /// An external collaborator failed.
    #[error("external adapter failure: {0}")]
    ExternalAdapterFailure(#[from] AdapterError),

    /// A zero or otherwise unusable quantity.
    #[error("invalid quantity: {0}")]
    InvalidQuantity(&'static str),

    /// A configuration value failed validation.
    #[error("invalid configuration: {0}")]
    InvalidConfiguration(&'static str),

    /// Checked arithmetic overflowed or underflowed.
    #[error("arithmetic overflow: {0}")]
    Overflow(&'static str),

    /// Division by zero.
    #[error("division by zero")]
    DivisionByZero,

    /// Ledger state failed validation before commit.
    #[error("ledger invariant violated: {0}")]
    InvariantViolation(&'static str),

    /// Configuration text could not be parsed.
    #[error("configuration parse error: {0}")]
    ConfigParse(String),

    /// The global tracing subscriber could not be installed.
    #[error("logging setup failed: {0}")]
    Logging(String),
}

/// Convenience alias for results produced by this crate.
pub type Result<T, E = VaultError> = core::result::Result<T, E>;
