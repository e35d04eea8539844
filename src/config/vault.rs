//! Vault deployment configuration.

use alloy_primitives::Address;

use super::GuardConfig;
use crate::error::{Result, VaultError};

/// Token contracts the vault works with.
///
/// All four are *protected*: [`salvage`](crate::vault::Vault::salvage)
/// refuses them.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(
    feature = "serde",
    derive(serde::Serialize, serde::Deserialize),
    serde(deny_unknown_fields)
)]
pub struct VaultTokens {
    /// Asset depositors contribute.
    pub base: Address,
    /// Stablecoin the vault pairs with.
    pub stable: Address,
    /// Staking reward token.
    pub reward: Address,
    /// AMM position (LP) token.
    pub position: Address,
}

impl VaultTokens {
    /// The protected token set.
    #[must_use]
    pub const fn protected(&self) -> [Address; 4] {
        [self.base, self.stable, self.reward, self.position]
    }

    /// Returns `true` if `token` is one of the protected tokens.
    #[must_use]
    pub fn is_protected(&self, token: Address) -> bool {
        self.protected().contains(&token)
    }

    fn validate(&self) -> Result<()> {
        let set = self.protected();
        if set.iter().any(|a| a.is_zero()) {
            return Err(VaultError::InvalidConfiguration("token address is zero"));
        }
        for (i, a) in set.iter().enumerate() {
            if set[i + 1..].contains(a) {
                return Err(VaultError::InvalidConfiguration(
                    "token addresses must be distinct",
                ));
            }
        }
        Ok(())
    }
}

/// Everything needed to stand up a [`Vault`](crate::vault::Vault).
///
/// `governance` defaults to `owner` when omitted.
///
/// # Validation
///
/// - `vault` and `owner` are non-zero, and so is `governance` if given.
/// - The four tokens are non-zero and distinct, and none is the vault.
/// - The guard configuration is valid.
///
/// # Examples
///
/// ```
/// # #[cfg(feature = "serde")] {
/// use hydra_vault::config::VaultConfig;
///
/// let cfg = VaultConfig::from_toml_str(r#"
///     vault = "0x00000000000000000000000000000000000000aa"
///     owner = "0x00000000000000000000000000000000000000bb"
///
///     [tokens]
///     base = "0x0000000000000000000000000000000000000001"
///     stable = "0x0000000000000000000000000000000000000002"
///     reward = "0x0000000000000000000000000000000000000003"
///     position = "0x0000000000000000000000000000000000000004"
/// "#).expect("valid config");
/// assert_eq!(cfg.governance(), cfg.owner());
/// # }
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(
    feature = "serde",
    derive(serde::Serialize, serde::Deserialize),
    serde(deny_unknown_fields)
)]
pub struct VaultConfig {
    vault: Address,
    owner: Address,
    #[cfg_attr(feature = "serde", serde(default))]
    governance: Option<Address>,
    tokens: VaultTokens,
    #[cfg_attr(feature = "serde", serde(default))]
    guard: GuardConfig,
}

impl VaultConfig {
    /// Creates a validated configuration.
    ///
    /// # Errors
    ///
    /// Returns [`VaultError::InvalidConfiguration`] if validation fails.
    pub fn new(
        vault: Address,
        owner: Address,
        governance: Option<Address>,
        tokens: VaultTokens,
        guard: GuardConfig,
    ) -> Result<Self> {
        let config = Self {
            vault,
            owner,
            governance,
            tokens,
            guard,
        };
        config.validate()?;
        Ok(config)
    }

    /// Parses and validates a TOML document.
    ///
    /// # Errors
    ///
    /// - [`VaultError::ConfigParse`] on malformed TOML or unknown keys.
    /// - [`VaultError::InvalidConfiguration`] if validation fails.
    #[cfg(feature = "serde")]
    pub fn from_toml_str(text: &str) -> Result<Self> {
        let config: Self =
            toml::from_str(text).map_err(|err| VaultError::ConfigParse(err.to_string()))?;
        config.validate()?;
        Ok(config)
    }

    /// Checks every configuration invariant.
    ///
    /// # Errors
    ///
    /// Returns [`VaultError::InvalidConfiguration`] naming the failed check.
    pub fn validate(&self) -> Result<()> {
        if self.vault.is_zero() {
            return Err(VaultError::InvalidConfiguration("vault address is zero"));
        }
        if self.owner.is_zero() {
            return Err(VaultError::InvalidConfiguration("owner address is zero"));
        }
        if self.governance.is_some_and(|g| g.is_zero()) {
            return Err(VaultError::InvalidConfiguration("governance address is zero"));
        }
        self.tokens.validate()?;
        if self.tokens.is_protected(self.vault) {
            return Err(VaultError::InvalidConfiguration(
                "vault address collides with a token",
            ));
        }
        self.guard.validate()
    }

    /// The vault's own address (token holder of record).
    #[must_use]
    pub const fn vault(&self) -> Address {
        self.vault
    }

    /// Initial owner.
    #[must_use]
    pub const fn owner(&self) -> Address {
        self.owner
    }

    /// Initial governance (operator); the owner unless set.
    #[must_use]
    pub fn governance(&self) -> Address {
        self.governance.unwrap_or(self.owner)
    }

    /// Token contracts.
    #[must_use]
    pub const fn tokens(&self) -> &VaultTokens {
        &self.tokens
    }

    /// Initial guard configuration.
    #[must_use]
    pub const fn guard(&self) -> &GuardConfig {
        &self.guard
    }
}

#[cfg(test)]
#[allow(clippy::panic)]
mod tests {
    use super::*;
    use crate::domain::{BasisPoints, OracleSource};

    fn tokens() -> VaultTokens {
        VaultTokens {
            base: Address::with_last_byte(1),
            stable: Address::with_last_byte(2),
            reward: Address::with_last_byte(3),
            position: Address::with_last_byte(4),
        }
    }

    fn build(tokens: VaultTokens) -> Result<VaultConfig> {
        VaultConfig::new(
            Address::with_last_byte(0xaa),
            Address::with_last_byte(0xbb),
            None,
            tokens,
            GuardConfig::default(),
        )
    }

    #[test]
    fn valid_config() {
        let Ok(cfg) = build(tokens()) else {
            panic!("expected valid config");
        };
        assert_eq!(cfg.governance(), cfg.owner());
        assert!(cfg.tokens().is_protected(Address::with_last_byte(4)));
        assert!(!cfg.tokens().is_protected(Address::with_last_byte(5)));
    }

    #[test]
    fn duplicate_tokens_rejected() {
        let mut t = tokens();
        t.reward = t.base;
        assert!(matches!(build(t), Err(VaultError::InvalidConfiguration(_))));
    }

    #[test]
    fn zero_token_rejected() {
        let mut t = tokens();
        t.position = Address::ZERO;
        assert!(matches!(build(t), Err(VaultError::InvalidConfiguration(_))));
    }

    #[test]
    fn vault_cannot_be_a_token() {
        let result = VaultConfig::new(
            Address::with_last_byte(1),
            Address::with_last_byte(0xbb),
            None,
            tokens(),
            GuardConfig::default(),
        );
        assert!(matches!(result, Err(VaultError::InvalidConfiguration(_))));
    }

    #[test]
    fn zero_governance_rejected() {
        let result = VaultConfig::new(
            Address::with_last_byte(0xaa),
            Address::with_last_byte(0xbb),
            Some(Address::ZERO),
            tokens(),
            GuardConfig::default(),
        );
        assert!(matches!(result, Err(VaultError::InvalidConfiguration(_))));
    }

    #[cfg(feature = "serde")]
    mod toml_loading {
        use super::*;

        const DOC: &str = r#"
            vault = "0x00000000000000000000000000000000000000aa"
            owner = "0x00000000000000000000000000000000000000bb"
            governance = "0x00000000000000000000000000000000000000cc"

            [tokens]
            base = "0x0000000000000000000000000000000000000001"
            stable = "0x0000000000000000000000000000000000000002"
            reward = "0x0000000000000000000000000000000000000003"
            position = "0x0000000000000000000000000000000000000004"

            [guard]
            tolerance = 250
            oracle_source = "compound"
        "#;

        #[test]
        fn parses_full_document() {
            let Ok(cfg) = VaultConfig::from_toml_str(DOC) else {
                panic!("expected config to parse");
            };
            assert_eq!(cfg.governance(), Address::with_last_byte(0xcc));
            assert_eq!(cfg.guard().tolerance(), BasisPoints::new(250));
            assert_eq!(cfg.guard().oracle_source(), OracleSource::Compound);
            assert_eq!(cfg.tokens(), &tokens());
        }

        #[test]
        fn malformed_document_is_a_parse_error() {
            assert!(matches!(
                VaultConfig::from_toml_str("vault = 12"),
                Err(VaultError::ConfigParse(_))
            ));
        }

        #[test]
        fn unknown_guard_key_is_rejected() {
            let doc = DOC.replace("tolerance = 250", "tolerence = 250");
            assert!(matches!(
                VaultConfig::from_toml_str(&doc),
                Err(VaultError::ConfigParse(_))
            ));
        }

        #[test]
        fn parsed_config_is_validated() {
            let doc = DOC.replace("tolerance = 250", "tolerance = 20000");
            assert!(matches!(
                VaultConfig::from_toml_str(&doc),
                Err(VaultError::InvalidConfiguration(_))
            ));
        }
    }
}
