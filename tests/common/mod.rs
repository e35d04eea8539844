//! Shared fixtures for the integration suites.
//!
//! Every suite starts from the default sandbox market (100 000 base against
//! 250 000 000 stable) with the owner's 10 000 000 stable reserve deposited.
//! Market moves are made by a whale trading directly against the pair, and
//! the oracle feeds are re-pointed at the new spot so the guard follows the
//! market unless a test says otherwise.

#![allow(dead_code)]

use alloy_primitives::Address;
use hydra_vault::prelude::*;
use hydra_vault::sandbox::{Sandbox, SandboxParams, BASE_TOKEN, STABLE_TOKEN};

pub const E18: u128 = 1_000_000_000_000_000_000;
pub const E6: u128 = 1_000_000;

/// Owner reserve deposited by [`setup`].
pub const CAPITAL: u128 = 10_000_000 * E6;

pub fn vault_address() -> Address {
    Address::with_last_byte(0xaa)
}

pub fn owner() -> Address {
    Address::with_last_byte(0xbb)
}

pub fn whale() -> Address {
    Address::with_last_byte(0xee)
}

pub fn user(i: u8) -> Address {
    Address::with_last_byte(0xd0 + i)
}

pub fn base(units: u128) -> Amount {
    Amount::new(units * E18)
}

pub fn stable(units: u128) -> Amount {
    Amount::new(units * E6)
}

/// A vault whose owner is also governance, funded with [`CAPITAL`].
pub fn setup() -> Vault<Sandbox> {
    setup_with_governance(None)
}

/// As [`setup`], with the price guard paused.
pub fn setup_unguarded() -> Vault<Sandbox> {
    let mut vault = setup();
    let Ok(()) = vault.pause_guard(owner()) else {
        panic!("pause guard");
    };
    vault
}

pub fn setup_with_governance(governance: Option<Address>) -> Vault<Sandbox> {
    let Ok(env) = Sandbox::new(vault_address(), SandboxParams::default()) else {
        panic!("sandbox");
    };
    let Ok(config) = env.vault_config(owner(), governance) else {
        panic!("config");
    };
    let Ok(mut vault) = Vault::new(config, env) else {
        panic!("vault");
    };
    fund(&mut vault, owner(), STABLE_TOKEN, Amount::new(CAPITAL));
    let Ok(()) = vault.deposit_capital(owner(), Amount::new(CAPITAL)) else {
        panic!("capital");
    };
    vault
}

/// Mints `amount` of `token` to `who` and approves the vault for it.
pub fn fund(vault: &mut Vault<Sandbox>, who: Address, token: Address, amount: Amount) {
    let spender = vault.address();
    let env = vault.env_mut();
    let Ok(()) = env.mint(token, who, amount) else {
        panic!("mint");
    };
    env.approve_as(who, token, spender, amount);
}

/// `who` deposits `amount` base for themselves.
pub fn deposit(vault: &mut Vault<Sandbox>, who: Address, amount: Amount) -> DepositReceipt {
    fund(vault, who, BASE_TOKEN, amount);
    let Ok(receipt) = vault.deposit_base(who, who, amount, Timestamp::NEVER) else {
        panic!("deposit of {amount} by {who}");
    };
    receipt
}

/// `who` withdraws every share; returns the base paid out.
pub fn withdraw_all(vault: &mut Vault<Sandbox>, who: Address) -> Amount {
    let Ok(receipt) = vault.withdraw_all_base(who, who, Timestamp::NEVER) else {
        panic!("withdraw by {who}");
    };
    receipt.payout
}

/// What [`withdraw_all`] would pay right now, without committing it.
pub fn preview_withdraw_all(vault: &Vault<Sandbox>, who: Address) -> Amount {
    let mut scratch = vault.clone();
    withdraw_all(&mut scratch, who)
}

pub fn base_balance(vault: &Vault<Sandbox>, who: Address) -> Amount {
    vault.env().balance_of(BASE_TOKEN, who)
}

pub fn stable_balance(vault: &Vault<Sandbox>, who: Address) -> Amount {
    vault.env().balance_of(STABLE_TOKEN, who)
}

/// Moves the pair's spot price by roughly `percent` with a single whale
/// trade, then syncs the oracle feeds to the new spot.
#[allow(clippy::cast_precision_loss, clippy::cast_possible_truncation, clippy::cast_sign_loss)]
pub fn change_price_by_percent(vault: &mut Vault<Sandbox>, percent: f64) {
    let env = vault.env_mut();
    let (_, stable_reserve) = env.pool().reserves();
    let factor = ((1.0 + percent / 100.0).sqrt() - 1.0).abs();
    let delta = (stable_reserve.get() as f64 * factor) as u128;
    let moved = if percent > 0.0 {
        let Ok(()) = env.mint(STABLE_TOKEN, whale(), Amount::new(delta)) else {
            panic!("mint");
        };
        env.swap_as(whale(), Amount::new(delta), Asset::Stable, Asset::Base)
    } else {
        let Ok(()) = env.mint(BASE_TOKEN, whale(), base(1_000_000)) else {
            panic!("mint");
        };
        env.swap_exact_out_as(whale(), Amount::new(delta * 997 / 1_000), Asset::Base, Asset::Stable)
    };
    let Ok(_) = moved else {
        panic!("price move of {percent}%");
    };
    let Ok(()) = env.sync_oracles_to_spot() else {
        panic!("oracle sync");
    };
}

/// Fifty up-and-down cycles that leave the price near where it started
/// while the pair collects swap fees.
pub fn simulate_interest(vault: &mut Vault<Sandbox>) {
    for _ in 0..50 {
        change_price_by_percent(vault, 300.0);
        change_price_by_percent(vault, -75.0);
    }
}

/// `actual` is within `tolerance` of `expected` (all raw units).
pub fn close_to(actual: Amount, expected: u128, tolerance: u128) -> bool {
    actual.get().abs_diff(expected) <= tolerance
}
