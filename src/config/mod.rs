//! Declarative vault configuration.
//!
//! [`VaultConfig`] names the vault, its roles and its tokens;
//! [`GuardConfig`] holds the price-guard parameters.  Both validate on
//! construction and, with the `serde` feature, load from TOML.

mod guard;
mod vault;

pub use guard::GuardConfig;
pub use vault::{VaultConfig, VaultTokens};
