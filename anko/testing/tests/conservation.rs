//! Conservation properties over randomized deposit/withdraw sequences: at
//! every step, per-account shares sum to the pool's totals, and with no
//! interest in play the balances do too.

use {
    anko_math::Uint128,
    anko_testing::{ResultExt, TestSuite, d, setup_test},
    anko_types::{AccountId, TokenId},
    proptest::prelude::*,
};

#[derive(Debug, Clone)]
enum Op {
    Deposit { user: usize, amount: u128 },
    WithdrawAll { user: usize },
}

fn op_strategy() -> impl Strategy<Value = Op> {
    prop_oneof![
        (0..2usize, 1..10_000u128).prop_map(|(user, amount)| Op::Deposit { user, amount }),
        (0..2usize).prop_map(|user| Op::WithdrawAll { user }),
    ]
}

fn assert_conservation(suite: &TestSuite, token_id: &TokenId) {
    let ledger = suite.contract.ledger();
    let asset = ledger.assets.get(token_id).unwrap();

    let mut shares_sum = asset.pending_fee_shares;
    let mut balance_sum = Uint128::ZERO;
    for account in ledger.accounts.values() {
        if let Some(shares) = account.supplied_shares(token_id) {
            shares_sum = shares_sum.checked_add(shares).unwrap();
            let balance = asset.supplied.shares_to_amount(shares, false).unwrap();
            balance_sum = balance_sum.checked_add(balance).unwrap();
        }
    }

    assert_eq!(shares_sum, asset.supplied.shares);
    // Without interest the pools stay 1:1, so balances are exact as well.
    assert_eq!(balance_sum, asset.supplied.balance);
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(32))]

    #[test]
    fn deposits_and_withdrawals_conserve_shares(ops in prop::collection::vec(op_strategy(), 1..20)) {
        let (mut suite, tokens, users) = setup_test();
        let user_ids: [AccountId; 2] = [users.alice.clone(), users.bob.clone()];

        for op in ops {
            match op {
                Op::Deposit { user, amount } => {
                    suite
                        .supply(&user_ids[user], &tokens.ndai, d(amount, 18))
                        .should_succeed();
                },
                Op::WithdrawAll { user } => {
                    let account = suite.get_account(&user_ids[user]);
                    if account
                        .supplied
                        .iter()
                        .any(|entry| entry.token_id == tokens.ndai)
                    {
                        suite
                            .withdraw(&user_ids[user], &tokens.ndai, None)
                            .should_succeed();
                    }
                },
            }

            assert_conservation(&suite, &tokens.ndai);
        }
    }
}
