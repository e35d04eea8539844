//! Deterministic in-memory environment.
//!
//! [`Sandbox`] implements every collaborator trait a
//! [`Vault`](crate::vault::Vault) needs:
//!
//! | Trait | Backed by |
//! |-------|-----------|
//! | [`AmmAdapter`] | [`ConstantProductPool`] for base/stable, plus a reward/base pool |
//! | [`PriceOracle`] | [`ReferenceOracle`] |
//! | [`StakingAdapter`] | [`RewardFarm`] |
//! | [`TokenBank`] | [`TokenBalances`] |
//! | [`Clock`] | a manual clock ([`Sandbox::advance_time`]) |
//!
//! Pool custody is modelled the way an on-chain pair holds it: the reserves
//! are bank balances of the pair address.  Vault-initiated calls pull their
//! inputs through allowances granted to [`ROUTER`] (liquidity and swaps) and
//! [`FARM`] (staking), so a missing `approve` fails exactly as it would on
//! chain.  Every adapter call is atomic.
//!
//! The trader helpers ([`swap_as`](Sandbox::swap_as),
//! [`swap_exact_out_as`](Sandbox::swap_exact_out_as), [`mint`](Sandbox::mint))
//! let tests move prices and fund actors.
//!
//! # Example
//!
//! ```rust
//! use hydra_vault::domain::{Amount, Asset};
//! use hydra_vault::sandbox::{Sandbox, SandboxParams, BASE_TOKEN};
//! use hydra_vault::traits::AmmAdapter;
//! use alloy_primitives::Address;
//!
//! let vault = Address::with_last_byte(0xaa);
//! let trader = Address::with_last_byte(0xcc);
//! let mut env = Sandbox::new(vault, SandboxParams::default()).expect("seeded");
//!
//! let before = env.spot_price().expect("priced");
//! env.mint(BASE_TOKEN, trader, Amount::new(10u128.pow(21))).expect("funded");
//! env.swap_as(trader, Amount::new(10u128.pow(21)), Asset::Base, Asset::Stable)
//!     .expect("swap");
//! assert!(env.spot_price().expect("priced") < before);
//! assert!(env.reserves().is_ok());
//! ```

mod bank;
mod farm;
mod oracle;
mod pool;

pub use bank::TokenBalances;
pub use farm::RewardFarm;
pub use oracle::{ReferenceOracle, BASE_UNIT};
pub use pool::{Burn, ConstantProductPool, Mint, MINIMUM_LIQUIDITY};

use alloy_primitives::Address;

use crate::config::{GuardConfig, VaultConfig, VaultTokens};
use crate::domain::{
    Amount, Asset, BasisPoints, Liquidity, LiquidityDelta, OracleSource, Reserves, Rounding,
    Timestamp,
};
use crate::error::{AdapterError, Result as VaultResult};
use crate::math::mul_div;
use crate::traits::{AmmAdapter, Clock, PriceOracle, StakingAdapter, TokenBank};

/// Base asset (18 decimals).
pub const BASE_TOKEN: Address = Address::with_last_byte(0x11);
/// Stablecoin (6 decimals).
pub const STABLE_TOKEN: Address = Address::with_last_byte(0x12);
/// Staking reward token (18 decimals).
pub const REWARD_TOKEN: Address = Address::with_last_byte(0x13);
/// Base/stable pair; also the position (LP) token.
pub const MAIN_PAIR: Address = Address::with_last_byte(0x21);
/// Reward/base pair.
pub const REWARD_PAIR: Address = Address::with_last_byte(0x22);
/// Router spender for liquidity and swap calls.
pub const ROUTER: Address = Address::with_last_byte(0x31);
/// Staking program; holds staked positions.
pub const FARM: Address = Address::with_last_byte(0x32);
/// Protocol fee recipient of the main pair.
pub const FEE_TO: Address = Address::with_last_byte(0x33);
/// Provider of the seed liquidity.
pub const SEEDER: Address = Address::with_last_byte(0x34);

/// Initial market state of a [`Sandbox`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SandboxParams {
    /// Base seeded into the main pair.
    pub base_reserve: Amount,
    /// Stablecoin seeded into the main pair.
    pub stable_reserve: Amount,
    /// Reward tokens seeded into the reward pair.
    pub reward_reserve: Amount,
    /// Base seeded into the reward pair.
    pub reward_base_reserve: Amount,
    /// Swap fee of both pairs.
    pub swap_fee: BasisPoints,
    /// Whether the main pair mints the protocol fee to [`FEE_TO`].
    pub protocol_fee_on: bool,
    /// Farm emission rate.
    pub reward_per_second: Amount,
    /// Clock reading at construction.
    pub start: Timestamp,
}

impl Default for SandboxParams {
    /// 100 000 base against 250 000 000 stable (spot 2 500), a
    /// 1 000 000 reward / 500 base reward pair, 0.3% fee.
    fn default() -> Self {
        const E18: u128 = 1_000_000_000_000_000_000;
        const E6: u128 = 1_000_000;
        Self {
            base_reserve: Amount::new(100_000 * E18),
            stable_reserve: Amount::new(250_000_000 * E6),
            reward_reserve: Amount::new(1_000_000 * E18),
            reward_base_reserve: Amount::new(500 * E18),
            swap_fee: BasisPoints::new(30),
            protocol_fee_on: true,
            reward_per_second: Amount::new(E18 / 100),
            start: Timestamp::new(1_700_000_000),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Route {
    Main { zero_for_one: bool },
    Reward { zero_for_one: bool },
}

impl Route {
    const fn pair(self) -> Address {
        match self {
            Self::Main { .. } => MAIN_PAIR,
            Self::Reward { .. } => REWARD_PAIR,
        }
    }

    const fn zero_for_one(self) -> bool {
        match self {
            Self::Main { zero_for_one } | Self::Reward { zero_for_one } => zero_for_one,
        }
    }
}

/// In-memory environment for a single vault.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Sandbox {
    vault: Address,
    pool: ConstantProductPool,
    reward_pool: ConstantProductPool,
    bank: TokenBalances,
    farm: RewardFarm,
    oracle: ReferenceOracle,
    now: Timestamp,
}

impl Sandbox {
    /// Seeds both pairs, points every oracle feed at the seeded spot price
    /// and starts the clock.
    ///
    /// # Errors
    ///
    /// Returns an [`AdapterError`] if the seed amounts are unusable.
    pub fn new(vault: Address, params: SandboxParams) -> Result<Self, AdapterError> {
        let mut sandbox = Self {
            vault,
            pool: ConstantProductPool::new(params.swap_fee, params.protocol_fee_on)?,
            reward_pool: ConstantProductPool::new(params.swap_fee, false)?,
            bank: TokenBalances::default(),
            farm: RewardFarm::new(params.reward_per_second, params.start),
            oracle: ReferenceOracle::default(),
            now: params.start,
        };

        sandbox.bank.mint(BASE_TOKEN, MAIN_PAIR, params.base_reserve)?;
        sandbox.bank.mint(STABLE_TOKEN, MAIN_PAIR, params.stable_reserve)?;
        let seeded = sandbox.pool.mint(params.base_reserve, params.stable_reserve)?;
        sandbox.bank.mint(MAIN_PAIR, SEEDER, seeded.liquidity.into())?;
        sandbox.bank.mint(MAIN_PAIR, Address::ZERO, seeded.locked.into())?;

        sandbox.bank.mint(REWARD_TOKEN, REWARD_PAIR, params.reward_reserve)?;
        sandbox.bank.mint(BASE_TOKEN, REWARD_PAIR, params.reward_base_reserve)?;
        sandbox
            .reward_pool
            .mint(params.reward_reserve, params.reward_base_reserve)?;

        sandbox.sync_oracles_to_spot()?;
        Ok(sandbox)
    }

    // -- addresses and configuration ----------------------------------------

    /// The vault this environment serves.
    #[must_use]
    pub const fn vault(&self) -> Address {
        self.vault
    }

    /// The four protected tokens.
    #[must_use]
    pub const fn tokens(&self) -> VaultTokens {
        VaultTokens {
            base: BASE_TOKEN,
            stable: STABLE_TOKEN,
            reward: REWARD_TOKEN,
            position: MAIN_PAIR,
        }
    }

    /// Token contract of `asset`.
    #[must_use]
    pub const fn token(&self, asset: Asset) -> Address {
        match asset {
            Asset::Base => BASE_TOKEN,
            Asset::Stable => STABLE_TOKEN,
            Asset::Reward => REWARD_TOKEN,
        }
    }

    /// A validated [`VaultConfig`] wired to this environment, with the
    /// default guard.
    ///
    /// # Errors
    ///
    /// Returns [`VaultError::InvalidConfiguration`](crate::error::VaultError::InvalidConfiguration)
    /// for zero or colliding addresses.
    pub fn vault_config(
        &self,
        owner: Address,
        governance: Option<Address>,
    ) -> VaultResult<VaultConfig> {
        VaultConfig::new(
            self.vault,
            owner,
            governance,
            self.tokens(),
            GuardConfig::default(),
        )
    }

    /// The base/stable pool.
    #[must_use]
    pub const fn pool(&self) -> &ConstantProductPool {
        &self.pool
    }

    /// The reward/base pool.
    #[must_use]
    pub const fn reward_pool(&self) -> &ConstantProductPool {
        &self.reward_pool
    }

    /// The staking farm.
    #[must_use]
    pub const fn farm_state(&self) -> &RewardFarm {
        &self.farm
    }

    // -- market helpers -------------------------------------------------------

    /// Stablecoin price of [`BASE_UNIT`] base at the main pair's reserve
    /// ratio.
    ///
    /// # Errors
    ///
    /// Returns [`AdapterError::ZeroReserve`] on an empty pair.
    pub fn spot_price(&self) -> Result<Amount, AdapterError> {
        let (base, stable) = self.pool.reserves();
        if base.is_zero() || stable.is_zero() {
            return Err(AdapterError::ZeroReserve);
        }
        mul_div(BASE_UNIT, stable.get(), base.get(), Rounding::Down)
            .map(Amount::new)
            .map_err(|_| AdapterError::Overflow("spot price"))
    }

    /// Sets `source`'s answer (stablecoin per [`BASE_UNIT`] base).
    pub fn set_oracle_price(&mut self, source: OracleSource, price_per_unit: Amount) {
        self.oracle.set(source, price_per_unit);
    }

    /// Takes `source` offline.
    pub fn clear_oracle(&mut self, source: OracleSource) {
        self.oracle.clear(source);
    }

    /// Points every live feed at the current spot price.
    ///
    /// # Errors
    ///
    /// Returns [`AdapterError::ZeroReserve`] on an empty pair.
    pub fn sync_oracles_to_spot(&mut self) -> Result<(), AdapterError> {
        let spot = self.spot_price()?;
        self.oracle.set(OracleSource::Chainlink, spot);
        self.oracle.set(OracleSource::Compound, spot);
        Ok(())
    }

    /// Moves the clock forward.
    pub fn advance_time(&mut self, secs: u64) {
        self.now = self.now.plus(secs);
    }

    // -- actor helpers ----------------------------------------------------------

    /// Creates `amount` of `token` for `to`.
    ///
    /// # Errors
    ///
    /// Returns [`AdapterError::Overflow`] if the balance overflows.
    pub fn mint(
        &mut self,
        token: Address,
        to: Address,
        amount: Amount,
    ) -> Result<(), AdapterError> {
        self.bank.mint(token, to, amount)
    }

    /// Sets `owner`'s allowance for `spender`.
    pub fn approve_as(&mut self, owner: Address, token: Address, spender: Address, amount: Amount) {
        self.bank.approve(token, owner, spender, amount);
    }

    /// Transfers from an arbitrary holder.
    ///
    /// # Errors
    ///
    /// Returns [`AdapterError::InsufficientBalance`].
    pub fn transfer_as(
        &mut self,
        from: Address,
        token: Address,
        to: Address,
        amount: Amount,
    ) -> Result<(), AdapterError> {
        self.bank.transfer(token, from, to, amount)
    }

    /// `trader` sells exactly `amount_in` of `from` for `to`.
    ///
    /// # Errors
    ///
    /// Anything the pool or the bank reports; state is unchanged on error.
    pub fn swap_as(
        &mut self,
        trader: Address,
        amount_in: Amount,
        from: Asset,
        to: Asset,
    ) -> Result<Amount, AdapterError> {
        let route = Self::route(from, to)?;
        let (token_in, token_out) = (self.token(from), self.token(to));
        self.atomically(|env| {
            let out = env.pool_mut(route).swap_exact_in(amount_in, route.zero_for_one())?;
            env.bank.transfer(token_in, trader, route.pair(), amount_in)?;
            env.bank.transfer(token_out, route.pair(), trader, out)?;
            Ok(out)
        })
    }

    /// `trader` buys exactly `amount_out` of `to` with `from`; returns the
    /// input charged.
    ///
    /// # Errors
    ///
    /// Anything the pool or the bank reports; state is unchanged on error.
    pub fn swap_exact_out_as(
        &mut self,
        trader: Address,
        amount_out: Amount,
        from: Asset,
        to: Asset,
    ) -> Result<Amount, AdapterError> {
        let route = Self::route(from, to)?;
        let (token_in, token_out) = (self.token(from), self.token(to));
        self.atomically(|env| {
            let input = env
                .pool_mut(route)
                .swap_exact_out(amount_out, route.zero_for_one())?;
            env.bank.transfer(token_in, trader, route.pair(), input)?;
            env.bank.transfer(token_out, route.pair(), trader, amount_out)?;
            Ok(input)
        })
    }

    // -- internals ------------------------------------------------------------

    fn route(from: Asset, to: Asset) -> Result<Route, AdapterError> {
        match (from, to) {
            (Asset::Base, Asset::Stable) => Ok(Route::Main { zero_for_one: true }),
            (Asset::Stable, Asset::Base) => Ok(Route::Main { zero_for_one: false }),
            (Asset::Reward, Asset::Base) => Ok(Route::Reward { zero_for_one: true }),
            (Asset::Base, Asset::Reward) => Ok(Route::Reward { zero_for_one: false }),
            _ => Err(AdapterError::UnsupportedRoute { from, to }),
        }
    }

    fn pool_ref(&self, route: Route) -> &ConstantProductPool {
        match route {
            Route::Main { .. } => &self.pool,
            Route::Reward { .. } => &self.reward_pool,
        }
    }

    fn pool_mut(&mut self, route: Route) -> &mut ConstantProductPool {
        match route {
            Route::Main { .. } => &mut self.pool,
            Route::Reward { .. } => &mut self.reward_pool,
        }
    }

    fn check_deadline(&self, deadline: Timestamp) -> Result<(), AdapterError> {
        if deadline.has_expired(self.now) {
            return Err(AdapterError::DeadlineExpired {
                deadline,
                now: self.now,
            });
        }
        Ok(())
    }

    /// Runs `op` against a copy and keeps the copy only on success.
    fn atomically<T>(
        &mut self,
        op: impl FnOnce(&mut Self) -> Result<T, AdapterError>,
    ) -> Result<T, AdapterError> {
        let mut draft = self.clone();
        let value = op(&mut draft)?;
        *self = draft;
        Ok(value)
    }

    /// Pulls `amount` of `token` from the vault into `pair` via the router
    /// allowance.
    fn pull_via_router(
        &mut self,
        token: Address,
        pair: Address,
        amount: Amount,
    ) -> Result<(), AdapterError> {
        if amount.is_zero() {
            return Ok(());
        }
        self.bank.transfer_from(token, ROUTER, self.vault, pair, amount)
    }
}

impl AmmAdapter for Sandbox {
    fn router(&self) -> Address {
        ROUTER
    }

    fn reserves(&self) -> Result<Reserves, AdapterError> {
        let (base, stable) = self.pool.reserves();
        Ok(Reserves::new(base, stable))
    }

    fn quote_out(
        &self,
        amount_in: Amount,
        asset_in: Asset,
        asset_out: Asset,
    ) -> Result<Amount, AdapterError> {
        let route = Self::route(asset_in, asset_out)?;
        self.pool_ref(route).quote_out(amount_in, route.zero_for_one())
    }

    fn amount_in_for(
        &self,
        amount_out: Amount,
        asset_in: Asset,
        asset_out: Asset,
    ) -> Result<Amount, AdapterError> {
        let route = Self::route(asset_in, asset_out)?;
        self.pool_ref(route).quote_in(amount_out, route.zero_for_one())
    }

    fn quote_remove(&self, liquidity: Liquidity) -> Result<(Amount, Amount), AdapterError> {
        self.pool.quote_burn(liquidity)
    }

    fn add_liquidity(
        &mut self,
        base: Amount,
        stable: Amount,
        deadline: Timestamp,
    ) -> Result<LiquidityDelta, AdapterError> {
        self.check_deadline(deadline)?;
        self.atomically(|env| {
            let (base_used, stable_used) = env.pool.optimal_amounts(base, stable)?;
            env.pull_via_router(BASE_TOKEN, MAIN_PAIR, base_used)?;
            env.pull_via_router(STABLE_TOKEN, MAIN_PAIR, stable_used)?;
            let minted = env.pool.mint(base_used, stable_used)?;
            env.bank.mint(MAIN_PAIR, env.vault, minted.liquidity.into())?;
            env.bank.mint(MAIN_PAIR, FEE_TO, minted.protocol_fee.into())?;
            env.bank.mint(MAIN_PAIR, Address::ZERO, minted.locked.into())?;
            Ok(LiquidityDelta::new(minted.liquidity, base_used, stable_used))
        })
    }

    fn remove_liquidity(
        &mut self,
        liquidity: Liquidity,
        deadline: Timestamp,
    ) -> Result<(Amount, Amount), AdapterError> {
        self.check_deadline(deadline)?;
        self.atomically(|env| {
            env.pull_via_router(MAIN_PAIR, MAIN_PAIR, liquidity.into())?;
            env.bank.burn(MAIN_PAIR, MAIN_PAIR, liquidity.into())?;
            let burnt = env.pool.burn(liquidity)?;
            env.bank.mint(MAIN_PAIR, FEE_TO, burnt.protocol_fee.into())?;
            env.bank.transfer(BASE_TOKEN, MAIN_PAIR, env.vault, burnt.amount0)?;
            env.bank.transfer(STABLE_TOKEN, MAIN_PAIR, env.vault, burnt.amount1)?;
            Ok((burnt.amount0, burnt.amount1))
        })
    }

    fn swap_exact(
        &mut self,
        amount_in: Amount,
        asset_in: Asset,
        asset_out: Asset,
        min_out: Amount,
        deadline: Timestamp,
    ) -> Result<Amount, AdapterError> {
        self.check_deadline(deadline)?;
        let route = Self::route(asset_in, asset_out)?;
        let quoted = self.pool_ref(route).quote_out(amount_in, route.zero_for_one())?;
        if quoted < min_out {
            return Err(AdapterError::SlippageExceeded {
                quoted,
                minimum: min_out,
            });
        }
        let (token_in, token_out) = (self.token(asset_in), self.token(asset_out));
        self.atomically(|env| {
            env.pull_via_router(token_in, route.pair(), amount_in)?;
            let out = env
                .pool_mut(route)
                .swap_exact_in(amount_in, route.zero_for_one())?;
            env.bank.transfer(token_out, route.pair(), env.vault, out)?;
            Ok(out)
        })
    }
}

impl PriceOracle for Sandbox {
    fn quote(&self, source: OracleSource, base_amount: Amount) -> Result<Amount, AdapterError> {
        self.oracle.quote(source, base_amount)
    }
}

impl StakingAdapter for Sandbox {
    fn farm(&self) -> Address {
        FARM
    }

    fn stake(&mut self, liquidity: Liquidity) -> Result<(), AdapterError> {
        self.atomically(|env| {
            env.bank
                .transfer_from(MAIN_PAIR, FARM, env.vault, FARM, liquidity.into())?;
            env.farm.deposit(env.vault, liquidity, env.now)
        })
    }

    fn unstake(&mut self, liquidity: Liquidity) -> Result<(), AdapterError> {
        self.atomically(|env| {
            env.farm.withdraw(env.vault, liquidity, env.now)?;
            env.bank.transfer(MAIN_PAIR, FARM, env.vault, liquidity.into())
        })
    }

    fn pending_rewards(&self) -> Result<Amount, AdapterError> {
        self.farm.pending(self.vault, self.now)
    }

    fn claim(&mut self) -> Result<Amount, AdapterError> {
        self.atomically(|env| {
            let rewards = env.farm.harvest(env.vault, env.now)?;
            env.bank.mint(REWARD_TOKEN, env.vault, rewards)?;
            Ok(rewards)
        })
    }

    fn staked(&self) -> Liquidity {
        self.farm.staked(self.vault)
    }
}

impl TokenBank for Sandbox {
    fn balance_of(&self, token: Address, holder: Address) -> Amount {
        self.bank.balance_of(token, holder)
    }

    fn allowance(&self, token: Address, owner: Address, spender: Address) -> Amount {
        self.bank.allowance(token, owner, spender)
    }

    fn approve(
        &mut self,
        token: Address,
        spender: Address,
        amount: Amount,
    ) -> Result<(), AdapterError> {
        self.bank.approve(token, self.vault, spender, amount);
        Ok(())
    }

    fn transfer(
        &mut self,
        token: Address,
        to: Address,
        amount: Amount,
    ) -> Result<(), AdapterError> {
        self.bank.transfer(token, self.vault, to, amount)
    }

    fn transfer_from(
        &mut self,
        token: Address,
        from: Address,
        amount: Amount,
    ) -> Result<(), AdapterError> {
        self.bank
            .transfer_from(token, self.vault, from, self.vault, amount)
    }
}

impl Clock for Sandbox {
    fn now(&self) -> Timestamp {
        self.now
    }
}

#[cfg(test)]
#[allow(clippy::panic)]
mod tests {
    use super::*;

    const E18: u128 = 1_000_000_000_000_000_000;
    const E6: u128 = 1_000_000;

    fn vault() -> Address {
        Address::with_last_byte(0xaa)
    }

    fn trader() -> Address {
        Address::with_last_byte(0xcc)
    }

    fn sandbox() -> Sandbox {
        let Ok(env) = Sandbox::new(vault(), SandboxParams::default()) else {
            panic!("seeded sandbox");
        };
        env
    }

    // -- construction -----------------------------------------------------------

    #[test]
    fn seeded_at_default_spot() {
        let env = sandbox();
        assert_eq!(env.spot_price(), Ok(Amount::new(2_500 * E6)));
        assert_eq!(
            env.quote(OracleSource::Chainlink, Amount::new(E18)),
            Ok(Amount::new(2_500 * E6))
        );
        assert_eq!(
            env.balance_of(BASE_TOKEN, MAIN_PAIR),
            Amount::new(100_000 * E18)
        );
        assert!(env.vault_config(Address::with_last_byte(0xbb), None).is_ok());
    }

    // -- routing ----------------------------------------------------------------

    #[test]
    fn stable_to_reward_has_no_route() {
        let env = sandbox();
        assert_eq!(
            env.quote_out(Amount::new(1), Asset::Stable, Asset::Reward),
            Err(AdapterError::UnsupportedRoute {
                from: Asset::Stable,
                to: Asset::Reward,
            })
        );
    }

    #[test]
    fn trader_swap_moves_price() {
        let mut env = sandbox();
        let Ok(()) = env.mint(STABLE_TOKEN, trader(), Amount::new(1_000_000 * E6)) else {
            panic!("mint");
        };
        let Ok(out) =
            env.swap_as(trader(), Amount::new(1_000_000 * E6), Asset::Stable, Asset::Base)
        else {
            panic!("swap");
        };
        assert_eq!(env.balance_of(BASE_TOKEN, trader()), out);
        let Ok(spot) = env.spot_price() else {
            panic!("spot");
        };
        assert!(spot > Amount::new(2_500 * E6));
    }

    #[test]
    fn failed_trader_swap_leaves_state_untouched() {
        let mut env = sandbox();
        let before = env.clone();
        assert!(env
            .swap_as(trader(), Amount::new(E18), Asset::Base, Asset::Stable)
            .is_err());
        assert_eq!(env, before);
    }

    // -- vault-facing calls -------------------------------------------------------

    #[test]
    fn vault_swap_requires_router_allowance() {
        let mut env = sandbox();
        let Ok(()) = env.mint(BASE_TOKEN, vault(), Amount::new(E18)) else {
            panic!("mint");
        };
        let result = env.swap_exact(
            Amount::new(E18),
            Asset::Base,
            Asset::Stable,
            Amount::ZERO,
            Timestamp::NEVER,
        );
        assert!(matches!(result, Err(AdapterError::InsufficientAllowance { .. })));

        let Ok(()) = TokenBank::approve(&mut env, BASE_TOKEN, ROUTER, Amount::new(E18)) else {
            panic!("approve");
        };
        let Ok(out) = env.swap_exact(
            Amount::new(E18),
            Asset::Base,
            Asset::Stable,
            Amount::ZERO,
            Timestamp::NEVER,
        ) else {
            panic!("swap");
        };
        assert_eq!(env.balance_of(STABLE_TOKEN, vault()), out);
    }

    #[test]
    fn slippage_and_deadline_enforced() {
        let mut env = sandbox();
        let Ok(quoted) = env.quote_out(Amount::new(E18), Asset::Base, Asset::Stable) else {
            panic!("quote");
        };
        let too_much = Amount::new(quoted.get() + 1);
        assert_eq!(
            env.swap_exact(
                Amount::new(E18),
                Asset::Base,
                Asset::Stable,
                too_much,
                Timestamp::NEVER
            ),
            Err(AdapterError::SlippageExceeded {
                quoted,
                minimum: too_much,
            })
        );
        let past = Timestamp::new(env.now().get() - 1);
        assert!(matches!(
            env.swap_exact(Amount::new(E18), Asset::Base, Asset::Stable, Amount::ZERO, past),
            Err(AdapterError::DeadlineExpired { .. })
        ));
    }

    #[test]
    fn liquidity_stake_and_rewards_cycle() {
        let mut env = sandbox();
        let base = Amount::new(10 * E18);
        let stable = Amount::new(25_000 * E6);
        let Ok(()) = env.mint(BASE_TOKEN, vault(), base) else {
            panic!("mint base");
        };
        let Ok(()) = env.mint(STABLE_TOKEN, vault(), stable) else {
            panic!("mint stable");
        };
        let Ok(()) = TokenBank::approve(&mut env, BASE_TOKEN, ROUTER, base) else {
            panic!("approve");
        };
        let Ok(()) = TokenBank::approve(&mut env, STABLE_TOKEN, ROUTER, stable) else {
            panic!("approve");
        };
        let Ok(delta) = env.add_liquidity(base, stable, Timestamp::NEVER) else {
            panic!("add liquidity");
        };
        assert_eq!(delta.base_used(), base);
        assert_eq!(delta.stable_used(), stable);
        assert_eq!(env.balance_of(MAIN_PAIR, vault()), Amount::from(delta.liquidity()));

        assert!(env.stake(delta.liquidity()).is_err());
        let Ok(()) = TokenBank::approve(&mut env, MAIN_PAIR, FARM, delta.liquidity().into()) else {
            panic!("approve farm");
        };
        let Ok(()) = env.stake(delta.liquidity()) else {
            panic!("stake");
        };
        assert_eq!(env.staked(), delta.liquidity());

        env.advance_time(100);
        assert_eq!(env.pending_rewards(), Ok(Amount::new(E18)));
        let Ok(claimed) = env.claim() else {
            panic!("claim");
        };
        assert_eq!(claimed, Amount::new(E18));
        assert_eq!(env.balance_of(REWARD_TOKEN, vault()), claimed);
        assert_eq!(env.staked(), delta.liquidity());

        let Ok(()) = env.unstake(delta.liquidity()) else {
            panic!("unstake");
        };
        let Ok(()) =
            TokenBank::approve(&mut env, MAIN_PAIR, ROUTER, delta.liquidity().into())
        else {
            panic!("approve router");
        };
        let Ok((b, s)) = env.remove_liquidity(delta.liquidity(), Timestamp::NEVER) else {
            panic!("remove");
        };
        assert!(b.get() <= base.get() && b.get() + 1_000 >= base.get());
        assert!(s.get() <= stable.get() && s.get() + 1 >= stable.get());
    }

    #[test]
    fn reward_route_converts_to_base() {
        let env = sandbox();
        let Ok(out) = env.quote_out(Amount::new(1_000 * E18), Asset::Reward, Asset::Base) else {
            panic!("quote");
        };
        // 1000 reward at 0.0005 base each, less fee and impact.
        assert!(out.get() < E18 / 2);
        assert!(out.get() > E18 / 2 * 99 / 100);
    }
}
