//! Spot-versus-oracle price guard.
//!
//! Every deposit and withdrawal first asks the guard whether the AMM price
//! can be trusted.  Both sides quote the configured reference amount of
//! base asset in stablecoin:
//!
//! ```text
//! spot      = reference × reserve_stable / reserve_base
//! oracle    = oracle.quote(source, reference)
//! deviation = |spot − oracle| × 10 000 / oracle      (rounded up)
//! ```
//!
//! The guard trips when `deviation > tolerance`.  It fails closed: an
//! oracle error or a zero oracle quote aborts the command.  A paused guard
//! or the [`Disabled`](crate::domain::OracleSource::Disabled) source skips
//! the comparison.

use tracing::{trace, warn};

use crate::config::GuardConfig;
use crate::domain::{Amount, BasisPoints, GuardState};
use crate::error::{AdapterError, Result, VaultError};
use crate::traits::{AmmAdapter, PriceOracle};

/// What the guard concluded.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GuardOutcome {
    /// The guard is paused.
    Paused,
    /// The oracle source is disabled.
    Disabled,
    /// Both prices were compared and agree within tolerance.
    Within {
        /// Spot quote of the reference amount.
        spot: Amount,
        /// Oracle quote of the reference amount.
        oracle: Amount,
        /// Measured deviation.
        deviation: BasisPoints,
    },
}

/// Evaluates the guard for one command.
#[derive(Debug, Clone, Copy)]
pub struct PriceGuard<'a> {
    config: &'a GuardConfig,
    state: GuardState,
}

impl<'a> PriceGuard<'a> {
    /// Creates an evaluator over `config` in `state`.
    #[must_use]
    pub const fn new(config: &'a GuardConfig, state: GuardState) -> Self {
        Self { config, state }
    }

    /// Compares spot and oracle prices.
    ///
    /// # Errors
    ///
    /// - [`VaultError::PriceGuardTriggered`] beyond tolerance.
    /// - [`VaultError::ExternalAdapterFailure`] if the oracle is unavailable
    ///   or quotes zero, or the pool is empty.
    pub fn check<E: AmmAdapter + PriceOracle>(&self, env: &E) -> Result<GuardOutcome> {
        if !self.state.is_active() {
            return Ok(GuardOutcome::Paused);
        }
        let source = self.config.oracle_source();
        if source.is_disabled() {
            return Ok(GuardOutcome::Disabled);
        }

        let reference = self.config.reference_amount();
        let oracle = env.quote(source, reference)?;
        if oracle.is_zero() {
            warn!(target: "guard", %source, "oracle quoted zero");
            return Err(AdapterError::OracleUnavailable(source).into());
        }
        let spot = env.reserves()?.quote_base(reference)?;
        let deviation = BasisPoints::deviation(spot, oracle)?;
        let tolerance = self.config.tolerance();

        if deviation > tolerance {
            warn!(
                target: "guard",
                %spot,
                %oracle,
                %deviation,
                %tolerance,
                "price guard triggered"
            );
            return Err(VaultError::PriceGuardTriggered {
                spot,
                oracle,
                deviation,
                tolerance,
            });
        }
        trace!(target: "guard", %spot, %oracle, %deviation, "price within tolerance");
        Ok(GuardOutcome::Within {
            spot,
            oracle,
            deviation,
        })
    }
}
