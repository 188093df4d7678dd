use {
    crate::TestSuite,
    anko_math::{Udec128, Uint128},
    anko_types::{
        AccountId, TokenId,
        lending::{AssetConfig, AssetView, Config, InterestRateModel},
    },
    std::sync::Once,
};

static TRACING: Once = Once::new();

/// The standard token set: a stablecoin pair and a volatile native token,
/// with the precisions they have in the wild.
pub struct Tokens {
    pub ndai: TokenId,
    pub nusdc: TokenId,
    pub wnear: TokenId,
}

pub struct Users {
    pub alice: AccountId,
    pub bob: AccountId,
    pub charlie: AccountId,
}

/// Scale a whole number to token smallest units.
pub fn d(value: u128, decimals: u8) -> Uint128 {
    Uint128::new(value * 10_u128.pow(decimals as u32))
}

pub fn default_config() -> Config {
    Config {
        owner_id: "owner.anko".parse().unwrap(),
        oracle_id: "oracle.anko".parse().unwrap(),
        maximum_recency_duration_sec: 90,
        maximum_staleness_duration_sec: 15,
        max_num_assets: 8,
        max_pending_executions: 4,
    }
}

fn stable_config(decimals: u8) -> AssetConfig {
    AssetConfig {
        decimals,
        collateral_factor: Udec128::new_percent(95),
        borrow_factor: Udec128::new_percent(95),
        liquidation_bonus: Udec128::new_percent(5),
        interest_rate_model: InterestRateModel::default().with_no_reserve_factor(),
        can_deposit: true,
        can_withdraw: true,
        can_borrow: true,
        deposits_are_collateral: true,
    }
}

fn volatile_config(decimals: u8) -> AssetConfig {
    AssetConfig {
        collateral_factor: Udec128::new_percent(60),
        borrow_factor: Udec128::new_percent(60),
        ..stable_config(decimals)
    }
}

/// Spin up a suite with the standard tokens listed, users funded, and base
/// liquidity supplied by charlie so that there is something to borrow.
pub fn setup_test() -> (TestSuite, Tokens, Users) {
    TRACING.call_once(|| {
        let _ = tracing_subscriber::fmt()
            .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
            .with_test_writer()
            .try_init();
    });

    let mut suite = TestSuite::new(default_config());

    let tokens = Tokens {
        ndai: "dai.token".parse().unwrap(),
        nusdc: "usdc.token".parse().unwrap(),
        wnear: "wrap.token".parse().unwrap(),
    };
    let users = Users {
        alice: "alice.anko".parse().unwrap(),
        bob: "bob.anko".parse().unwrap(),
        charlie: "charlie.anko".parse().unwrap(),
    };

    suite.list_asset(&tokens.ndai, stable_config(18));
    suite.list_asset(&tokens.nusdc, stable_config(6));
    suite.list_asset(&tokens.wnear, volatile_config(24));

    for user in [&users.alice, &users.bob, &users.charlie] {
        suite.mint(&tokens.ndai, user, d(1_000_000, 18));
        suite.mint(&tokens.nusdc, user, d(1_000_000, 6));
        suite.mint(&tokens.wnear, user, d(1_000_000, 24));
    }

    // Base liquidity, so that borrows have a reserve to draw from.
    suite
        .supply(&users.charlie, &tokens.ndai, d(10_000, 18))
        .unwrap();
    suite
        .supply(&users.charlie, &tokens.nusdc, d(10_000, 6))
        .unwrap();
    suite
        .supply(&users.charlie, &tokens.wnear, d(10_000, 24))
        .unwrap();

    (suite, tokens, users)
}

/// Shorthand for an expected (token, balance) pair.
pub fn av(token_id: TokenId, balance: Uint128) -> (TokenId, Uint128) {
    (token_id, balance)
}

pub fn find_asset<'a>(assets: &'a [AssetView], token_id: &TokenId) -> &'a AssetView {
    assets
        .iter()
        .find(|asset| &asset.token_id == token_id)
        .unwrap_or_else(|| panic!("missing asset: {token_id}"))
}

/// Compare positions by balance, ignoring order.
pub fn assert_balances(actual: &[AssetView], expected: &[(TokenId, Uint128)]) {
    assert_eq!(
        actual.len(),
        expected.len(),
        "position count mismatch: {actual:?} vs {expected:?}"
    );
    for (token_id, balance) in expected {
        assert_eq!(
            &find_asset(actual, token_id).balance,
            balance,
            "balance mismatch for {token_id}"
        );
    }
}
