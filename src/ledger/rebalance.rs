//! Exit rebalancing: turn the `(base, stable)` pair the AMM returns into a
//! base-only payout while restoring the stablecoin principal.
//!
//! Let `entry` be the principal attributable to the redeemed shares.
//!
//! - **Price rose** (`removed_stable ≥ entry`): the stablecoin above
//!   `entry` is sold for base and paid out with the removed base; `entry`
//!   returns to the reserve.  The depositor bears the impermanent loss but
//!   keeps every unit of upside.
//! - **Price fell** (`removed_stable < entry`): just enough base is sold to
//!   buy back the shortfall, capped at the removed base.  The reserve gets
//!   `removed_stable` plus the proceeds; the depositor gets the rest of the
//!   base.
//!
//! A swap whose quote rounds to zero is skipped.  Stablecoin that could not
//! be sold stays with the reserve.

use tracing::debug;

use crate::config::VaultTokens;
use crate::domain::{Amount, Asset, RebalanceLeg, Timestamp};
use crate::error::{AdapterError, Result};
use crate::traits::{AmmAdapter, TokenBank};

/// Outcome of [`settle_exit`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ExitSettlement {
    /// Swap executed, if any.
    pub leg: RebalanceLeg,
    /// Base owed to the depositor.
    pub payout: Amount,
    /// Stablecoin owed back to the reserve.
    pub stable_recovered: Amount,
}

impl ExitSettlement {
    const fn flat(payout: Amount, stable_recovered: Amount) -> Self {
        Self {
            leg: RebalanceLeg::Flat,
            payout,
            stable_recovered,
        }
    }
}

/// Rebalances the assets removed for an exit.
///
/// Approves the router for exactly the swap input before swapping, with
/// the fresh quote as the minimum output.
///
/// # Errors
///
/// Any adapter failure, wrapped in
/// [`VaultError::ExternalAdapterFailure`](crate::error::VaultError::ExternalAdapterFailure),
/// or [`VaultError::Overflow`](crate::error::VaultError::Overflow).
pub fn settle_exit<E: AmmAdapter + TokenBank>(
    env: &mut E,
    tokens: &VaultTokens,
    removed_base: Amount,
    removed_stable: Amount,
    entry_stable: Amount,
    deadline: Timestamp,
) -> Result<ExitSettlement> {
    let settlement = if removed_stable >= entry_stable {
        sell_excess(env, tokens, removed_base, removed_stable, entry_stable, deadline)?
    } else {
        cover_shortfall(env, tokens, removed_base, removed_stable, entry_stable, deadline)?
    };
    debug!(
        target: "ledger",
        %removed_base,
        %removed_stable,
        %entry_stable,
        leg = ?settlement.leg,
        payout = %settlement.payout,
        "exit rebalanced"
    );
    Ok(settlement)
}

fn sell_excess<E: AmmAdapter + TokenBank>(
    env: &mut E,
    tokens: &VaultTokens,
    removed_base: Amount,
    removed_stable: Amount,
    entry_stable: Amount,
    deadline: Timestamp,
) -> Result<ExitSettlement> {
    let excess = removed_stable.saturating_sub(&entry_stable);
    if excess.is_zero() {
        return Ok(ExitSettlement::flat(removed_base, removed_stable));
    }
    let quoted = env.quote_out(excess, Asset::Stable, Asset::Base)?;
    if quoted.is_zero() {
        return Ok(ExitSettlement::flat(removed_base, removed_stable));
    }
    let router = env.router();
    env.approve(tokens.stable, router, excess)?;
    let bought = env.swap_exact(excess, Asset::Stable, Asset::Base, quoted, deadline)?;
    Ok(ExitSettlement {
        leg: RebalanceLeg::SoldExcessStable {
            stable_in: excess,
            base_out: bought,
        },
        payout: removed_base.safe_add(&bought, "exit payout")?,
        stable_recovered: entry_stable,
    })
}

fn cover_shortfall<E: AmmAdapter + TokenBank>(
    env: &mut E,
    tokens: &VaultTokens,
    removed_base: Amount,
    removed_stable: Amount,
    entry_stable: Amount,
    deadline: Timestamp,
) -> Result<ExitSettlement> {
    let shortfall = entry_stable.saturating_sub(&removed_stable);
    let needed = match env.amount_in_for(shortfall, Asset::Base, Asset::Stable) {
        Ok(needed) => needed,
        Err(AdapterError::InsufficientLiquidity) => removed_base,
        Err(err) => return Err(err.into()),
    };
    let sold = removed_base.min(needed);
    if sold.is_zero() {
        return Ok(ExitSettlement::flat(removed_base, removed_stable));
    }
    let quoted = env.quote_out(sold, Asset::Base, Asset::Stable)?;
    if quoted.is_zero() {
        return Ok(ExitSettlement::flat(removed_base, removed_stable));
    }
    let router = env.router();
    env.approve(tokens.base, router, sold)?;
    let bought = env.swap_exact(sold, Asset::Base, Asset::Stable, quoted, deadline)?;
    Ok(ExitSettlement {
        leg: RebalanceLeg::CoveredShortfall {
            base_in: sold,
            stable_out: bought,
        },
        payout: removed_base.saturating_sub(&sold),
        stable_recovered: removed_stable.safe_add(&bought, "recovered stable")?,
    })
}

#[cfg(all(test, feature = "sandbox"))]
#[allow(clippy::panic)]
mod tests {
    use alloy_primitives::Address;

    use super::*;
    use crate::sandbox::{Sandbox, SandboxParams, BASE_TOKEN, STABLE_TOKEN};

    const E18: u128 = 1_000_000_000_000_000_000;
    const E6: u128 = 1_000_000;

    fn vault() -> Address {
        Address::with_last_byte(0xaa)
    }

    /// A sandbox where the vault already holds what the AMM returned.
    fn holding(base: u128, stable: u128) -> Sandbox {
        let Ok(mut env) = Sandbox::new(vault(), SandboxParams::default()) else {
            panic!("sandbox");
        };
        let Ok(()) = env.mint(BASE_TOKEN, vault(), Amount::new(base)) else {
            panic!("mint base");
        };
        let Ok(()) = env.mint(STABLE_TOKEN, vault(), Amount::new(stable)) else {
            panic!("mint stable");
        };
        env
    }

    #[test]
    fn exact_principal_is_flat() {
        let mut env = holding(E18, 2_500 * E6);
        let tokens = env.tokens();
        let Ok(s) = settle_exit(
            &mut env,
            &tokens,
            Amount::new(E18),
            Amount::new(2_500 * E6),
            Amount::new(2_500 * E6),
            Timestamp::NEVER,
        ) else {
            panic!("settle");
        };
        assert_eq!(s, ExitSettlement::flat(Amount::new(E18), Amount::new(2_500 * E6)));
    }

    #[test]
    fn excess_stable_is_sold_for_base() {
        let mut env = holding(E18, 3_000 * E6);
        let tokens = env.tokens();
        let Ok(quote) = env.quote_out(Amount::new(500 * E6), Asset::Stable, Asset::Base) else {
            panic!("quote");
        };
        let Ok(s) = settle_exit(
            &mut env,
            &tokens,
            Amount::new(E18),
            Amount::new(3_000 * E6),
            Amount::new(2_500 * E6),
            Timestamp::NEVER,
        ) else {
            panic!("settle");
        };
        assert_eq!(
            s.leg,
            RebalanceLeg::SoldExcessStable {
                stable_in: Amount::new(500 * E6),
                base_out: quote,
            }
        );
        assert_eq!(s.payout, Amount::new(E18 + quote.get()));
        assert_eq!(s.stable_recovered, Amount::new(2_500 * E6));
        assert_eq!(env.balance_of(STABLE_TOKEN, vault()), Amount::new(2_500 * E6));
    }

    #[test]
    fn shortfall_is_bought_back_with_base() {
        let mut env = holding(2 * E18, 2_000 * E6);
        let tokens = env.tokens();
        let Ok(s) = settle_exit(
            &mut env,
            &tokens,
            Amount::new(2 * E18),
            Amount::new(2_000 * E6),
            Amount::new(2_500 * E6),
            Timestamp::NEVER,
        ) else {
            panic!("settle");
        };
        let RebalanceLeg::CoveredShortfall { base_in, stable_out } = s.leg else {
            panic!("expected shortfall leg, got {:?}", s.leg);
        };
        assert!(stable_out >= Amount::new(500 * E6));
        assert_eq!(s.payout, Amount::new(2 * E18 - base_in.get()));
        assert_eq!(s.stable_recovered, Amount::new(2_000 * E6 + stable_out.get()));
        // 500 stable at ~2 500 per base, plus fee.
        assert!(base_in.get() > E18 / 5 && base_in.get() < E18 / 5 * 101 / 100);
    }

    #[test]
    fn shortfall_beyond_removed_base_sells_everything() {
        let mut env = holding(E18 / 10, 100 * E6);
        let tokens = env.tokens();
        let Ok(s) = settle_exit(
            &mut env,
            &tokens,
            Amount::new(E18 / 10),
            Amount::new(100 * E6),
            Amount::new(2_500 * E6),
            Timestamp::NEVER,
        ) else {
            panic!("settle");
        };
        assert!(s.payout.is_zero());
        assert!(matches!(s.leg, RebalanceLeg::CoveredShortfall { .. }));
        assert!(s.stable_recovered < Amount::new(2_500 * E6));
    }

    #[test]
    fn zero_quote_swap_is_skipped() {
        let mut env = holding(1, 100 * E6);
        let tokens = env.tokens();
        let Ok(s) = settle_exit(
            &mut env,
            &tokens,
            Amount::new(1),
            Amount::new(100 * E6),
            Amount::new(2_500 * E6),
            Timestamp::NEVER,
        ) else {
            panic!("settle");
        };
        assert_eq!(s, ExitSettlement::flat(Amount::new(1), Amount::new(100 * E6)));
        assert_eq!(env.balance_of(BASE_TOKEN, vault()), Amount::new(1));
    }
}
