//! Price-guard parameters.

use crate::domain::{Amount, BasisPoints, OracleSource};
use crate::error::{Result, VaultError};

/// One whole base unit at 18 decimals.
const DEFAULT_REFERENCE_AMOUNT: u128 = 1_000_000_000_000_000_000;

/// Default maximum spot/oracle deviation: 1%.
const DEFAULT_TOLERANCE_BPS: u32 = 100;

/// Parameters of the spot-versus-oracle comparison.
///
/// Both sides quote `reference_amount` of base asset in stablecoin; the
/// guard trips when they differ by more than `tolerance`.
///
/// # Validation
///
/// - `tolerance` must be a valid percentage (≤ 10 000 bp).
/// - `reference_amount` must be non-zero.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(
    feature = "serde",
    derive(serde::Serialize, serde::Deserialize),
    serde(default, deny_unknown_fields)
)]
pub struct GuardConfig {
    tolerance: BasisPoints,
    oracle_source: OracleSource,
    reference_amount: Amount,
}

impl Default for GuardConfig {
    fn default() -> Self {
        Self {
            tolerance: BasisPoints::new(DEFAULT_TOLERANCE_BPS),
            oracle_source: OracleSource::default(),
            reference_amount: Amount::new(DEFAULT_REFERENCE_AMOUNT),
        }
    }
}

impl GuardConfig {
    /// Creates a validated guard configuration.
    ///
    /// # Errors
    ///
    /// Returns [`VaultError::InvalidConfiguration`] if validation fails.
    pub fn new(
        tolerance: BasisPoints,
        oracle_source: OracleSource,
        reference_amount: Amount,
    ) -> Result<Self> {
        let config = Self {
            tolerance,
            oracle_source,
            reference_amount,
        };
        config.validate()?;
        Ok(config)
    }

    /// Checks the configuration invariants.
    ///
    /// # Errors
    ///
    /// Returns [`VaultError::InvalidConfiguration`] naming the failed check.
    pub fn validate(&self) -> Result<()> {
        if !self.tolerance.is_valid_percent() {
            return Err(VaultError::InvalidConfiguration(
                "guard tolerance exceeds 10000 bp",
            ));
        }
        if self.reference_amount.is_zero() {
            return Err(VaultError::InvalidConfiguration(
                "guard reference amount is zero",
            ));
        }
        Ok(())
    }

    /// Maximum tolerated deviation.
    #[must_use]
    pub const fn tolerance(&self) -> BasisPoints {
        self.tolerance
    }

    /// Feed compared against the AMM.
    #[must_use]
    pub const fn oracle_source(&self) -> OracleSource {
        self.oracle_source
    }

    /// Base amount quoted on both sides.
    pub const fn reference_amount(&self) -> Amount {
        self.reference_amount
    }

    pub(crate) fn set_tolerance(&mut self, tolerance: BasisPoints) -> Result<()> {
        let mut next = *self;
        next.tolerance = tolerance;
        next.validate()?;
        *self = next;
        Ok(())
    }

    pub(crate) fn set_oracle_source(&mut self, source: OracleSource) {
        self.oracle_source = source;
    }
}
