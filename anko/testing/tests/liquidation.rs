use {
    anko_math::Uint128,
    anko_testing::{ResultExt, assert_balances, av, d, setup_test},
    anko_types::lending::AssetAmount,
};

/// Alice puts up 1000 USDC and borrows 50 NEAR at 10$. The price climbs to
/// 12$ and her health drops below 1. Bob liquidates part of the debt and
/// takes discounted USDC.
#[test]
fn liquidation_of_alice_by_bob() {
    let (mut suite, tokens, users) = setup_test();

    let supply_amount = d(1_000, 6);
    suite
        .supply(&users.alice, &tokens.nusdc, supply_amount)
        .should_succeed();

    let data = suite.price_data(&[(&tokens.wnear, "10"), (&tokens.nusdc, "1")]);
    let borrow_amount = d(50, 24);
    suite
        .borrow_and_withdraw(&users.alice, &tokens.wnear, data, borrow_amount)
        .should_succeed();

    let account = suite.get_account(&users.alice);
    assert_balances(&account.supplied, &[av(tokens.nusdc.clone(), supply_amount)]);
    assert_balances(&account.borrowed, &[av(tokens.wnear.clone(), borrow_amount)]);

    // Bob funds his repayment up front.
    let bobs_amount = d(100, 24);
    suite
        .supply(&users.bob, &tokens.wnear, bobs_amount)
        .should_succeed();

    // At 12$ per NEAR: collateral 1000 * 0.95 = 950, debt 600 / 0.6 = 1000,
    // health 0.95 < 1.
    let data = suite.price_data(&[(&tokens.wnear, "12"), (&tokens.nusdc, "1")]);
    let wnear_amount_in = Uint128::new(49 * 10_u128.pow(23)); // 4.9 NEAR
    suite
        .liquidate(
            &users.bob,
            &users.alice,
            data,
            &tokens.nusdc,
            AssetAmount::exact(tokens.wnear.clone(), wnear_amount_in),
        )
        .should_succeed();

    // 4.9 NEAR at 12$ is 58.8; with the 5% bonus bob takes 61.74 USDC.
    let usdc_amount_out = Uint128::new(61_740_000);

    let account = suite.get_account(&users.alice);
    assert_balances(&account.supplied, &[av(
        tokens.nusdc.clone(),
        supply_amount - usdc_amount_out,
    )]);
    assert_balances(&account.borrowed, &[av(
        tokens.wnear.clone(),
        borrow_amount - wnear_amount_in,
    )]);

    let account = suite.get_account(&users.bob);
    assert_balances(&account.supplied, &[
        av(tokens.wnear.clone(), bobs_amount - wnear_amount_in),
        av(tokens.nusdc.clone(), usdc_amount_out),
    ]);
}

/// Cross-account conservation: liquidation reassigns shares, it does not
/// move tokens, so pool totals stay put.
#[test]
fn liquidation_conserves_pool_totals() {
    let (mut suite, tokens, users) = setup_test();

    suite
        .supply(&users.alice, &tokens.nusdc, d(1_000, 6))
        .should_succeed();
    let data = suite.price_data(&[(&tokens.wnear, "10"), (&tokens.nusdc, "1")]);
    suite
        .borrow_and_withdraw(&users.alice, &tokens.wnear, data, d(50, 24))
        .should_succeed();
    suite
        .supply(&users.bob, &tokens.wnear, d(100, 24))
        .should_succeed();

    let usdc_before = suite.get_asset(&tokens.nusdc);
    let wnear_before = suite.get_asset(&tokens.wnear);

    let data = suite.price_data(&[(&tokens.wnear, "12"), (&tokens.nusdc, "1")]);
    suite
        .liquidate(
            &users.bob,
            &users.alice,
            data,
            &tokens.nusdc,
            AssetAmount::exact(tokens.wnear.clone(), Uint128::new(49 * 10_u128.pow(23))),
        )
        .should_succeed();

    // The USDC pool is untouched; the wNEAR pool shrank on both sides by
    // the repaid amount.
    let usdc_after = suite.get_asset(&tokens.nusdc);
    assert_eq!(usdc_after.supplied, usdc_before.supplied);

    let wnear_after = suite.get_asset(&tokens.wnear);
    let repaid = Uint128::new(49 * 10_u128.pow(23));
    assert_eq!(
        wnear_after.borrowed.balance,
        wnear_before.borrowed.balance - repaid,
    );
    assert_eq!(
        wnear_after.supplied.balance,
        wnear_before.supplied.balance - repaid,
    );
}

#[test]
fn healthy_accounts_cannot_be_liquidated() {
    let (mut suite, tokens, users) = setup_test();

    suite
        .supply(&users.alice, &tokens.nusdc, d(1_000, 6))
        .should_succeed();
    let data = suite.price_data(&[(&tokens.wnear, "10"), (&tokens.nusdc, "1")]);
    suite
        .borrow_and_withdraw(&users.alice, &tokens.wnear, data, d(50, 24))
        .should_succeed();
    suite
        .supply(&users.bob, &tokens.wnear, d(100, 24))
        .should_succeed();

    // Same price as at borrow time: alice is still healthy.
    let data = suite.price_data(&[(&tokens.wnear, "10"), (&tokens.nusdc, "1")]);
    suite
        .liquidate(
            &users.bob,
            &users.alice,
            data,
            &tokens.nusdc,
            AssetAmount::exact(tokens.wnear.clone(), d(1, 24)),
        )
        .should_fail_with_error("not liquidatable");
}

#[test]
fn self_liquidation_is_forbidden() {
    let (mut suite, tokens, users) = setup_test();

    suite
        .supply(&users.alice, &tokens.nusdc, d(1_000, 6))
        .should_succeed();
    let data = suite.price_data(&[(&tokens.wnear, "10"), (&tokens.nusdc, "1")]);
    suite
        .borrow_and_withdraw(&users.alice, &tokens.wnear, data, d(50, 24))
        .should_succeed();

    let data = suite.price_data(&[(&tokens.wnear, "12"), (&tokens.nusdc, "1")]);
    suite
        .liquidate(
            &users.alice,
            &users.alice,
            data,
            &tokens.nusdc,
            AssetAmount::exact(tokens.wnear.clone(), d(1, 24)),
        )
        .should_fail_with_error("cannot liquidate your own account");
}

/// Wiping the whole debt would leave the target healthy, so the liquidation
/// must be sized to keep the account at risk, so the oversized attempt
/// rolls back.
#[test]
fn oversized_liquidation_rolls_back() {
    let (mut suite, tokens, users) = setup_test();

    suite
        .supply(&users.alice, &tokens.nusdc, d(1_000, 6))
        .should_succeed();
    let data = suite.price_data(&[(&tokens.wnear, "10"), (&tokens.nusdc, "1")]);
    suite
        .borrow_and_withdraw(&users.alice, &tokens.wnear, data, d(50, 24))
        .should_succeed();
    suite
        .supply(&users.bob, &tokens.wnear, d(100, 24))
        .should_succeed();

    let alice_before = suite.get_account(&users.alice);
    let bob_before = suite.get_account(&users.bob);

    let data = suite.price_data(&[(&tokens.wnear, "12"), (&tokens.nusdc, "1")]);
    suite
        .liquidate(
            &users.bob,
            &users.alice,
            data,
            &tokens.nusdc,
            AssetAmount::exact(tokens.wnear.clone(), d(50, 24)),
        )
        .should_fail_with_error("liquidation too large");

    // All-or-nothing: neither account moved.
    assert_eq!(suite.get_account(&users.alice), alice_before);
    assert_eq!(suite.get_account(&users.bob), bob_before);
}
