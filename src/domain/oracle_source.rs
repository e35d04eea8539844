//! Named reference-price feeds.

use core::fmt;
use core::str::FromStr;

use crate::error::VaultError;

/// Which reference feed the price guard compares the AMM spot price with.
///
/// [`Disabled`](Self::Disabled) turns the comparison into a no-op; the guard
/// state machine is unaffected.
///
/// # Examples
///
/// ```
/// use hydra_vault::domain::OracleSource;
///
/// let src: OracleSource = "chainlink".parse().expect("known feed");
/// assert_eq!(src, OracleSource::Chainlink);
/// assert!(!src.is_disabled());
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default)]
#[cfg_attr(
    feature = "serde",
    derive(serde::Serialize, serde::Deserialize),
    serde(rename_all = "lowercase")
)]
pub enum OracleSource {
    /// No oracle comparison.
    Disabled,
    /// Chainlink-style aggregator feed.
    #[default]
    Chainlink,
    /// Compound-style open price feed.
    Compound,
}

impl OracleSource {
    /// Returns `true` for [`OracleSource::Disabled`].
    #[must_use]
    pub const fn is_disabled(&self) -> bool {
        matches!(self, Self::Disabled)
    }

    /// Lowercase feed name.
    #[must_use]
    pub const fn name(&self) -> &'static str {
        match self {
            Self::Disabled => "disabled",
            Self::Chainlink => "chainlink",
            Self::Compound => "compound",
        }
    }
}

impl fmt::Display for OracleSource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for OracleSource {
    type Err = VaultError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "disabled" | "none" => Ok(Self::Disabled),
            "chainlink" => Ok(Self::Chainlink),
            "compound" => Ok(Self::Compound),
            _ => Err(VaultError::InvalidConfiguration("unknown oracle source")),
        }
    }
}
