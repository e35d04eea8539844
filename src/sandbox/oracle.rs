//! Fixed-answer reference feeds.

use std::collections::BTreeMap;

use crate::domain::{Amount, OracleSource, Rounding};
use crate::error::AdapterError;
use crate::math::mul_div;

/// One whole base unit at 18 decimals; feeds answer per this amount.
pub const BASE_UNIT: u128 = 1_000_000_000_000_000_000;

/// Per-source answers, each the stablecoin price of [`BASE_UNIT`] base.
///
/// A source with no answer, and [`OracleSource::Disabled`] always, report
/// [`AdapterError::OracleUnavailable`].
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ReferenceOracle {
    answers: BTreeMap<OracleSource, Amount>,
}

impl ReferenceOracle {
    /// Sets `source`'s answer.  Setting [`Amount::ZERO`] keeps the feed
    /// live but worthless, which the guard must reject.
    pub fn set(&mut self, source: OracleSource, price_per_unit: Amount) {
        self.answers.insert(source, price_per_unit);
    }

    /// Removes `source`'s answer.
    pub fn clear(&mut self, source: OracleSource) {
        self.answers.remove(&source);
    }

    /// Current answer for `source`, if any.
    pub fn answer(&self, source: OracleSource) -> Option<Amount> {
        self.answers.get(&source).copied()
    }

    /// Stablecoin value of `base_amount`.
    ///
    /// # Errors
    ///
    /// - [`AdapterError::OracleUnavailable`] if the feed has no answer.
    /// - [`AdapterError::Overflow`] if the quote overflows.
    pub fn quote(&self, source: OracleSource, base_amount: Amount) -> Result<Amount, AdapterError> {
        if source.is_disabled() {
            return Err(AdapterError::OracleUnavailable(source));
        }
        let price = self
            .answer(source)
            .ok_or(AdapterError::OracleUnavailable(source))?;
        mul_div(base_amount.get(), price.get(), BASE_UNIT, Rounding::Down)
            .map(Amount::new)
            .map_err(|_| AdapterError::Overflow("oracle quote"))
    }
}
