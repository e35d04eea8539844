//! The assets the vault moves.

use core::fmt;

/// Role of a token inside the vault.
///
/// Adapters map each role onto a concrete token contract; the vault itself
/// only reasons in roles.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum Asset {
    /// The volatile asset depositors contribute (e.g. the native coin).
    Base,
    /// The stablecoin the vault pairs deposits with.
    Stable,
    /// The token emitted by the staking program.
    Reward,
}

impl fmt::Display for Asset {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::Base => "base",
            Self::Stable => "stable",
            Self::Reward => "reward",
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn display() {
        assert_eq!(Asset::Base.to_string(), "base");
        assert_eq!(Asset::Stable.to_string(), "stable");
        assert_eq!(Asset::Reward.to_string(), "reward");
    }
}
