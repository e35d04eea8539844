//! Reference price seam.

use crate::domain::{Amount, OracleSource};
use crate::error::AdapterError;

/// A set of named reference feeds for the base/stable rate.
pub trait PriceOracle {
    /// Stablecoin value of `base_amount` according to `source`.
    ///
    /// # Errors
    ///
    /// Returns [`AdapterError::OracleUnavailable`] if the feed has no
    /// answer.
    fn quote(&self, source: OracleSource, base_amount: Amount) -> Result<Amount, AdapterError>;
}
