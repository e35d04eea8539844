//! # Hydra Vault
//!
//! Single-sided liquidity vault over a constant-product AMM.
//!
//! Depositors contribute only the base asset.  The vault pairs each deposit
//! with stablecoin from an owner-funded reserve, provides both to the AMM,
//! stakes the position in a reward program and issues shares.  On exit the
//! vault restores the reserve's stablecoin principal and pays the depositor
//! in base asset, so impermanent loss lands on the depositor while the
//! stablecoin side is held flat.
//!
//! The crate provides:
//!
//! - **Capital ledger**: share issuance and redemption over the staked
//!   position, per-depositor entry records, the IL-allocating exit
//!   rebalancer.
//! - **Price guard**: every deposit and withdrawal first compares the AMM
//!   spot price with a reference oracle.
//! - **Compounder**: harvested rewards are sold, re-paired and re-staked
//!   without minting shares, with an optional owner fee.
//! - **Access and emergency control**: owner and governance roles, pause,
//!   forced exit with escrow, stray-token salvage.
//!
//! # Feature Flags
//!
//! | Feature | Default | Description |
//! |---------|---------|-------------|
//! | `sandbox` | yes | Deterministic in-memory AMM, oracle, farm, token bank and clock |
//! | `serde` | yes | TOML configuration loading |
//! | `logging` | yes | `tracing-subscriber` initialisation helper |
//!
//! # Quick Start
//!
//! ```rust
//! # #[cfg(feature = "sandbox")] {
//! use alloy_primitives::Address;
//! use hydra_vault::prelude::*;
//! use hydra_vault::sandbox::{Sandbox, SandboxParams, BASE_TOKEN, STABLE_TOKEN};
//!
//! let vault_address = Address::with_last_byte(0xaa);
//! let owner = Address::with_last_byte(0xbb);
//! let alice = Address::with_last_byte(0xa1);
//!
//! // 1. Stand the vault up over a sandboxed market
//! let env = Sandbox::new(vault_address, SandboxParams::default()).expect("sandbox");
//! let config = env.vault_config(owner, None).expect("valid config");
//! let mut vault = Vault::new(config, env).expect("vault");
//!
//! // 2. The owner funds the stablecoin reserve
//! let capital = Amount::new(1_000_000 * 1_000_000);
//! vault.env_mut().mint(STABLE_TOKEN, owner, capital).expect("mint");
//! vault.env_mut().approve_as(owner, STABLE_TOKEN, vault_address, capital);
//! vault.deposit_capital(owner, capital).expect("capital");
//!
//! // 3. Alice deposits one base unit...
//! let one = Amount::new(1_000_000_000_000_000_000);
//! vault.env_mut().mint(BASE_TOKEN, alice, one).expect("mint");
//! vault.env_mut().approve_as(alice, BASE_TOKEN, vault_address, one);
//! let receipt = vault.deposit_base(alice, alice, one, Timestamp::NEVER).expect("deposit");
//! assert_eq!(vault.account(alice).shares(), receipt.shares);
//!
//! // 4. ...and takes it back out
//! let exit = vault.withdraw_all_base(alice, alice, Timestamp::NEVER).expect("withdraw");
//! assert!(exit.payout.get() > 990_000_000_000_000_000);
//! assert!(vault.account(alice).is_empty());
//! # }
//! ```
//!
//! # Architecture
//!
//! ```text
//! ┌──────────────┐
//! │    Vault     │  access control, transactional commit, journal
//! └──────┬───────┘
//!        │ guard check, then ledger + compounder
//!        ▼
//! ┌──────────────┐
//! │ PriceGuard / │
//! │ CapitalLedger│  share math, entry records, exit rebalancing
//! │ / Compounder │
//! └──────┬───────┘
//!        │ Environment (AMM, oracle, staking, tokens, clock)
//!        ▼
//! ┌──────────────┐
//! │   Adapters   │  sandbox, or any implementation of the traits
//! └──────────────┘
//! ```
//!
//! # Module Guide
//!
//! | Module | Purpose |
//! |--------|---------|
//! | [`domain`] | Value types: [`Amount`](domain::Amount), [`Shares`](domain::Shares), [`Liquidity`](domain::Liquidity), receipts, events |
//! | [`traits`] | Collaborator seams bundled as [`Environment`](traits::Environment) |
//! | [`config`] | [`VaultConfig`](config::VaultConfig) and [`GuardConfig`](config::GuardConfig) |
//! | [`ledger`] | [`CapitalLedger`](ledger::CapitalLedger) and exit rebalancing |
//! | [`guard`] | [`PriceGuard`](guard::PriceGuard) |
//! | [`compounder`] | [`Compounder`](compounder::Compounder) |
//! | [`access`] | [`AccessControl`](access::AccessControl) and [`Role`](access::Role) |
//! | [`vault`] | [`Vault`](vault::Vault) command surface |
//! | [`math`] | Wide multiply-divide and square roots |
//! | [`error`] | [`VaultError`](error::VaultError) and [`AdapterError`](error::AdapterError) |
//! | `sandbox` | In-memory environment (feature `sandbox`) |
//! | `logging` | Subscriber setup (feature `logging`) |
//! | [`prelude`] | Convenience re-exports |

pub mod access;
pub mod compounder;
pub mod config;
pub mod domain;
pub mod error;
pub mod guard;
pub mod ledger;
pub mod math;
pub mod prelude;
pub mod traits;
pub mod vault;

// Feature-gated modules
#[cfg(feature = "logging")]
pub mod logging;
#[cfg(feature = "sandbox")]
pub mod sandbox;
