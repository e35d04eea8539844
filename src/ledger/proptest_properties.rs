//! Property-based tests over random command sequences.
//!
//! Each case drives a sandboxed vault through deposits, withdrawals,
//! compounding rounds and external price moves, and checks after every
//! step:
//!
//! 1. **Consistency**: the vault's invariants hold, whether the step
//!    succeeded or not.
//! 2. **Atomicity**: a failed step leaves ledger, environment and journal
//!    untouched.
//! 3. **Share price**: compounding never lowers the price per full share
//!    and deposits or withdrawals never move it by more than rounding.
//! 4. **Clamping**: an oversized withdrawal burns exactly the balance.

use alloy_primitives::Address;
use proptest::prelude::*;

use crate::domain::{Amount, Asset, PercentMil, Shares, Timestamp};
use crate::sandbox::{Sandbox, SandboxParams, BASE_TOKEN, STABLE_TOKEN};
use crate::vault::Vault;

const E18: u128 = 1_000_000_000_000_000_000;
const E6: u128 = 1_000_000;

fn vault_address() -> Address {
    Address::with_last_byte(0xaa)
}

fn owner() -> Address {
    Address::with_last_byte(0xbb)
}

fn trader() -> Address {
    Address::with_last_byte(0xcc)
}

fn depositor(i: u8) -> Address {
    Address::with_last_byte(0xd0 + i)
}

#[derive(Debug, Clone)]
enum Step {
    Deposit { who: u8, milli_base: u128 },
    Withdraw { who: u8, percent: u128 },
    WithdrawTooMuch { who: u8 },
    Compound { milli_base: u128 },
    MovePrice { up: bool, milli_stable: u128 },
}

fn step() -> impl Strategy<Value = Step> {
    prop_oneof![
        4 => (0u8..3, 1u128..50_000)
            .prop_map(|(who, milli_base)| Step::Deposit { who, milli_base }),
        3 => (0u8..3, 1u128..=100).prop_map(|(who, percent)| Step::Withdraw { who, percent }),
        1 => (0u8..3).prop_map(|who| Step::WithdrawTooMuch { who }),
        1 => (1u128..5_000).prop_map(|milli_base| Step::Compound { milli_base }),
        2 => (any::<bool>(), 1u128..50_000_000_000)
            .prop_map(|(up, milli_stable)| Step::MovePrice { up, milli_stable }),
    ]
}

fn setup() -> Vault<Sandbox> {
    let Ok(env) = Sandbox::new(vault_address(), SandboxParams::default()) else {
        panic!("sandbox");
    };
    let Ok(config) = env.vault_config(owner(), None) else {
        panic!("config");
    };
    let Ok(mut vault) = Vault::new(config, env) else {
        panic!("vault");
    };
    let capital = Amount::new(5_000_000 * E6);
    let env = vault.env_mut();
    let Ok(()) = env.mint(STABLE_TOKEN, owner(), capital) else {
        panic!("mint");
    };
    env.approve_as(owner(), STABLE_TOKEN, vault_address(), capital);
    let Ok(()) = vault.deposit_capital(owner(), capital) else {
        panic!("capital");
    };
    vault
}

/// Applies one step; price moves are external and always succeed.
fn apply(vault: &mut Vault<Sandbox>, step: &Step) -> bool {
    match *step {
        Step::Deposit { who, milli_base } => {
            let who = depositor(who);
            let amount = Amount::new(milli_base * E18 / 1_000);
            let env = vault.env_mut();
            let Ok(()) = env.mint(BASE_TOKEN, who, amount) else {
                panic!("mint");
            };
            env.approve_as(who, BASE_TOKEN, vault_address(), amount);
            vault.deposit_base(who, who, amount, Timestamp::NEVER).is_ok()
        }
        Step::Withdraw { who, percent } => {
            let who = depositor(who);
            let shares = Shares::new(vault.account(who).shares().get() * percent / 100);
            vault.withdraw_base(who, who, shares, Timestamp::NEVER).is_ok()
        }
        Step::WithdrawTooMuch { who } => {
            let who = depositor(who);
            let held = vault.account(who).shares();
            let doubled = Shares::new(held.get().saturating_mul(2));
            match vault.withdraw_base(who, who, doubled, Timestamp::NEVER) {
                Ok(receipt) => {
                    assert_eq!(receipt.shares_burned, held);
                    assert!(vault.account(who).is_empty());
                    true
                }
                Err(_) => false,
            }
        }
        Step::Compound { milli_base } => {
            let amount = Amount::new(milli_base * E18 / 1_000);
            let env = vault.env_mut();
            let Ok(()) = env.mint(BASE_TOKEN, owner(), amount) else {
                panic!("mint");
            };
            env.approve_as(owner(), BASE_TOKEN, vault_address(), amount);
            vault.compound_profits(owner(), amount, PercentMil::ZERO).is_ok()
        }
        Step::MovePrice { up, milli_stable } => {
            let env = vault.env_mut();
            let amount = Amount::new(milli_stable * E6 / 1_000);
            let result = if up {
                let Ok(()) = env.mint(STABLE_TOKEN, trader(), amount) else {
                    panic!("mint");
                };
                env.swap_as(trader(), amount, Asset::Stable, Asset::Base)
            } else {
                let Ok(()) = env.mint(BASE_TOKEN, trader(), Amount::new(1_000_000 * E18)) else {
                    panic!("mint");
                };
                env.swap_exact_out_as(trader(), amount, Asset::Base, Asset::Stable)
            };
            let Ok(_) = result else {
                panic!("price move");
            };
            let Ok(()) = env.sync_oracles_to_spot() else {
                panic!("oracle sync");
            };
            true
        }
    }
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(64))]

    #[test]
    fn invariants_hold_and_failures_roll_back(steps in prop::collection::vec(step(), 1..24)) {
        let mut vault = setup();
        for step in &steps {
            let ledger_before = vault.ledger().clone();
            let env_before = vault.env().clone();
            let events_before = vault.events().len();
            let moves_market = matches!(step, Step::MovePrice { .. });

            let ok = apply(&mut vault, step);
            prop_assert!(vault.check_invariants().is_ok(), "invariants broken after {:?}", step);
            let held = vault
                .ledger()
                .accounts()
                .try_fold(Shares::ZERO, |sum, (_, account)| sum.checked_add(&account.shares()));
            prop_assert_eq!(held, Some(vault.total_shares()));
            if !ok {
                prop_assert_eq!(vault.ledger(), &ledger_before);
                prop_assert_eq!(vault.events().len(), events_before);
                // The mint and approval of a failed deposit stay; pool and farm do not move.
                prop_assert_eq!(vault.env().pool(), env_before.pool());
                prop_assert_eq!(vault.env().farm_state(), env_before.farm_state());
            }
            if moves_market {
                prop_assert_eq!(vault.ledger(), &ledger_before);
            }
        }
    }

    #[test]
    fn compounding_never_lowers_share_price(
        deposits in prop::collection::vec(1u128..20_000, 1..4),
        harvest in 10u128..5_000,
    ) {
        let mut vault = setup();
        for (i, milli_base) in deposits.iter().enumerate() {
            let Ok(who) = u8::try_from(i) else {
                panic!("index");
            };
            let step = Step::Deposit { who, milli_base: *milli_base };
            prop_assert!(apply(&mut vault, &step));
        }
        let Ok(before) = vault.price_per_full_share() else {
            panic!("ppfs");
        };
        let step = Step::Compound { milli_base: harvest };
        prop_assert!(apply(&mut vault, &step));
        let Ok(after) = vault.price_per_full_share() else {
            panic!("ppfs");
        };
        prop_assert!(after >= before);
    }

    #[test]
    fn deposits_and_withdrawals_keep_share_price(
        first in 1_000u128..20_000,
        second in 1_000u128..20_000,
        percent in 1u128..=100,
    ) {
        let mut vault = setup();
        let step = Step::Deposit { who: 0, milli_base: first };
        prop_assert!(apply(&mut vault, &step));
        let step = Step::Compound { milli_base: 500 };
        prop_assert!(apply(&mut vault, &step));
        let Ok(reference) = vault.price_per_full_share() else {
            panic!("ppfs");
        };
        let step = Step::Deposit { who: 1, milli_base: second };
        prop_assert!(apply(&mut vault, &step));
        let Ok(after_deposit) = vault.price_per_full_share() else {
            panic!("ppfs");
        };
        // Shares round down, so the price can only tick upward.
        prop_assert!(after_deposit >= reference);
        prop_assert!(after_deposit - reference <= reference / 1_000_000_000 + 1);

        let step = Step::Withdraw { who: 0, percent };

        prop_assert!(apply(&mut vault, &step));
        if !vault.total_shares().is_zero() {
            let Ok(after_withdraw) = vault.price_per_full_share() else {
                panic!("ppfs");
            };
            prop_assert!(after_withdraw + 1 >= after_deposit);
        }
    }
}
