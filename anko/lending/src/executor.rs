//! The action executor.
//!
//! A batch moves through `Idle -> AwaitingPrices -> Executing -> {Committed,
//! RolledBack}`. This module implements the `Executing` leg: actions run
//! strictly in submission order against a working copy of the ledger, and
//! the copy only replaces the live ledger if every action succeeds. Any
//! failure drops the copy, so a batch commits all-or-nothing and rollback
//! is the absence of a commit.

use {
    crate::{
        Contract, ContractError, ContractResult, Ledger, PendingTransfer, Prices, Response,
        TransferRequest,
        core::{Pool, assert_solvent, compute_health, is_liquidatable},
    },
    anko_math::{Udec128, Uint128},
    anko_types::{
        AccountId, PriceQuote, Timestamp, TokenId,
        lending::{Action, AssetAmount, Event},
    },
    std::collections::BTreeSet,
};

impl Contract {
    /// Run a batch for `account_id` and commit it, or fail and leave every
    /// ledger entry exactly as it was.
    pub(crate) fn execute_batch(
        &mut self,
        account_id: &AccountId,
        actions: &[Action],
        prices: &Prices,
        now: Timestamp,
    ) -> ContractResult<Response> {
        let ledger = self.ledger.clone();
        self.execute_batch_on(ledger, Response::new(), account_id, actions, prices, now)
    }

    /// Run a batch against an already-prepared working copy of the ledger,
    /// used by transfer-funded batches, whose deposit must commit or roll
    /// back together with the batch. `response` carries events accumulated
    /// while preparing the copy.
    pub(crate) fn execute_batch_on(
        &mut self,
        mut ledger: Ledger,
        mut response: Response,
        account_id: &AccountId,
        actions: &[Action],
        prices: &Prices,
        now: Timestamp,
    ) -> ContractResult<Response> {
        let mut next_request_id = self.next_request_id;
        let mut new_transfers = Vec::new();

        // Interest accrues lazily at the start of the cycle, for every asset
        // the batch can touch.
        for token_id in referenced_asset_ids(&ledger, account_id, actions) {
            if ledger.assets.contains_key(&token_id) {
                ledger.accrue(&token_id, now)?;
            }
        }

        let mut need_number_check = false;

        for action in actions {
            match action {
                Action::Withdraw(asset_amount) => {
                    let amount = withdraw(&mut ledger, account_id, asset_amount)?;

                    let request_id = next_request_id;
                    next_request_id += 1;
                    new_transfers.push(PendingTransfer {
                        request_id,
                        account_id: account_id.clone(),
                        token_id: asset_amount.token_id.clone(),
                        amount,
                    });
                    response.transfers.push(TransferRequest {
                        request_id,
                        token_id: asset_amount.token_id.clone(),
                        receiver_id: account_id.clone(),
                        amount,
                        memo: format!("withdraw #{request_id}"),
                    });
                    response.events.push(Event::withdraw_started(
                        account_id.clone(),
                        asset_amount.token_id.clone(),
                        amount,
                    ));

                    // Removing collateral; re-check health. Without debt this
                    // is a no-op and needs no prices.
                    let account = ledger.unwrap_account(account_id)?;
                    assert_solvent(&ledger, account, prices)?;
                },

                Action::Borrow(asset_amount) => {
                    need_number_check = true;

                    let amount = borrow(&mut ledger, account_id, asset_amount)?;
                    response.events.push(Event::borrow(
                        account_id.clone(),
                        asset_amount.token_id.clone(),
                        amount,
                    ));

                    let account = ledger.unwrap_account(account_id)?;
                    assert_solvent(&ledger, account, prices)?;
                },

                Action::Repay(asset_amount) => {
                    let amount = repay(&mut ledger, account_id, account_id, asset_amount)?;
                    response.events.push(Event::repay(
                        account_id.clone(),
                        asset_amount.token_id.clone(),
                        amount,
                    ));

                    // Repaying burns supplied balance as well as debt; if
                    // debt remains the ratio may have moved either way.
                    let account = ledger.unwrap_account(account_id)?;
                    assert_solvent(&ledger, account, prices)?;
                },

                Action::Liquidate {
                    account_id: target_id,
                    token_id,
                    in_assets,
                } => {
                    let (repaid, seized) =
                        liquidate(&mut ledger, account_id, target_id, token_id, in_assets, prices)?;

                    response.events.push(Event::Liquidate {
                        liquidator_id: account_id.clone(),
                        target_id: target_id.clone(),
                        repaid_token_id: in_assets.token_id.clone(),
                        repaid_amount: repaid,
                        seized_token_id: token_id.clone(),
                        seized_amount: seized,
                    });

                    // The liquidator's own health is intentionally not
                    // re-checked here: the batch is a liquidation.
                },

                Action::IncreaseCollateral { token_id } => {
                    ledger
                        .unwrap_account_mut(account_id)?
                        .set_collateral(token_id)?;
                    response.events.push(Event::IncreaseCollateral {
                        account_id: account_id.clone(),
                        token_id: token_id.clone(),
                    });
                },

                Action::ClaimProtocolFees { token_id } => {
                    self.assert_owner(account_id)?;

                    let amount = claim_protocol_fees(&mut ledger, account_id, token_id)?;
                    response.events.push(Event::ClaimProtocolFees {
                        token_id: token_id.clone(),
                        amount,
                    });
                },
            }
        }

        if need_number_check {
            let account = ledger.unwrap_account(account_id)?;
            if account.position_count() > self.config.max_num_assets as usize {
                return Err(ContractError::TooManyPositions {
                    account_id: account_id.clone(),
                    max_num_assets: self.config.max_num_assets,
                });
            }
        }

        // Commit.
        self.ledger = ledger;
        self.next_request_id = next_request_id;
        for transfer in new_transfers {
            self.pending_transfers.insert(transfer);
        }

        Ok(response)
    }
}

/// The union of asset ids referenced by the account's positions and by the
/// batch. For liquidations this includes the target's positions, since the
/// target's health must be valued.
pub fn referenced_asset_ids(
    ledger: &Ledger,
    account_id: &AccountId,
    actions: &[Action],
) -> BTreeSet<TokenId> {
    let mut ids = BTreeSet::new();

    let extend_with_positions = |ids: &mut BTreeSet<TokenId>, account_id: &AccountId| {
        if let Some(account) = ledger.get_account(account_id) {
            ids.extend(account.supplied.iter().map(|entry| entry.token_id.clone()));
            ids.extend(account.borrowed.iter().map(|entry| entry.token_id.clone()));
        }
    };

    extend_with_positions(&mut ids, account_id);

    for action in actions {
        match action {
            Action::Withdraw(asset_amount)
            | Action::Borrow(asset_amount)
            | Action::Repay(asset_amount) => {
                ids.insert(asset_amount.token_id.clone());
            },
            Action::Liquidate {
                account_id: target_id,
                token_id,
                in_assets,
            } => {
                ids.insert(token_id.clone());
                ids.insert(in_assets.token_id.clone());
                extend_with_positions(&mut ids, target_id);
            },
            Action::IncreaseCollateral { token_id } | Action::ClaimProtocolFees { token_id } => {
                ids.insert(token_id.clone());
            },
        }
    }

    ids
}

/// Whether a batch must wait for a price delivery before it can execute.
///
/// Prices are needed for any action that must validate post-action health:
/// every borrow and liquidation, and any withdraw or repay that leaves
/// outstanding debt. This is a pre-screen over the current ledger; the
/// executor's own health checks remain authoritative, and a mis-predicted
/// price-free batch fails with `MissingPrice` and rolls back.
pub fn batch_needs_prices(ledger: &Ledger, account_id: &AccountId, actions: &[Action]) -> bool {
    let account = ledger.get_account(account_id);
    let has_debt = account.is_some_and(|account| account.has_debt());

    actions.iter().any(|action| match action {
        Action::Borrow(_) | Action::Liquidate { .. } => true,
        Action::Withdraw(_) => has_debt,
        Action::Repay(asset_amount) => {
            has_debt && !repay_clears_all_debt(ledger, account_id, asset_amount)
        },
        Action::IncreaseCollateral { .. } | Action::ClaimProtocolFees { .. } => false,
    })
}

/// Whether a repay would leave the account debt-free, judged against the
/// current ledger.
fn repay_clears_all_debt(
    ledger: &Ledger,
    account_id: &AccountId,
    asset_amount: &AssetAmount,
) -> bool {
    let Some(account) = ledger.get_account(account_id) else {
        return true;
    };

    // Debt in any other token survives the repay no matter what.
    if account
        .borrowed
        .iter()
        .any(|entry| entry.token_id != asset_amount.token_id)
    {
        return false;
    }

    let Some(debt_shares) = account.borrowed_shares(&asset_amount.token_id) else {
        return true;
    };

    let Ok(asset) = ledger.unwrap_asset(&asset_amount.token_id) else {
        return false;
    };
    let Ok(debt) = asset.borrowed.shares_to_amount(debt_shares, true) else {
        return false;
    };

    let covering = match (asset_amount.amount, asset_amount.max_amount) {
        (Some(amount), _) => amount,
        (None, max_amount) => {
            // A repay without an explicit amount draws on the account's
            // supplied balance of the same token.
            let supplied = account
                .supplied_shares(&asset_amount.token_id)
                .and_then(|shares| asset.supplied.shares_to_amount(shares, false).ok())
                .unwrap_or(Uint128::ZERO);

            match max_amount {
                Some(max) => max.min(supplied),
                None => supplied,
            }
        },
    };

    covering >= debt
}

/// Resolve an [`AssetAmount`] against a pool into concrete shares and
/// amount.
///
/// With an explicit `amount`, the shares are derived from it; otherwise as
/// many of `available_shares` as allowed by `max_amount` are used. The
/// rounding direction flips between the supplied side (`inverse = false`)
/// and the borrowed side (`inverse = true`), always to the pool's advantage.
fn asset_amount_to_shares(
    pool: &Pool,
    available_shares: Uint128,
    asset_amount: &AssetAmount,
    inverse_round_direction: bool,
) -> ContractResult<(Uint128, Uint128)> {
    let (shares, amount) = if let Some(amount) = asset_amount.amount {
        (
            pool.amount_to_shares(amount, !inverse_round_direction)?,
            amount,
        )
    } else if let Some(max_amount) = asset_amount.max_amount {
        let shares = available_shares
            .min(pool.amount_to_shares(max_amount, !inverse_round_direction)?);
        let amount = pool
            .shares_to_amount(shares, inverse_round_direction)?
            .min(max_amount);
        (shares, amount)
    } else {
        (
            available_shares,
            pool.shares_to_amount(available_shares, inverse_round_direction)?,
        )
    };

    if shares.is_zero() || amount.is_zero() {
        return Err(ContractError::ZeroAmount);
    }

    Ok((shares, amount))
}

/// Credit a deposit to the account's supplied position. Assumes the asset
/// has already accrued this cycle.
pub(crate) fn deposit(
    ledger: &mut Ledger,
    account_id: &AccountId,
    token_id: &TokenId,
    amount: Uint128,
) -> ContractResult<Uint128> {
    if amount.is_zero() {
        return Err(ContractError::ZeroAmount);
    }

    let asset = ledger.unwrap_asset_mut(token_id)?;
    if !asset.config.can_deposit {
        return Err(ContractError::ActionDisabled {
            token_id: token_id.clone(),
            action: "deposit",
        });
    }

    let shares = asset.supplied.amount_to_shares(amount, false)?;
    if shares.is_zero() {
        return Err(ContractError::ZeroAmount);
    }

    asset.supplied.deposit(shares, amount)?;
    let is_collateral = asset.config.deposits_are_collateral;

    ledger
        .account_or_default(account_id)
        .increase_supplied(token_id, shares, is_collateral);

    Ok(shares)
}

/// Re-credit a withdrawn amount after the outbound transfer bounced.
///
/// Unlike [`deposit`], this ignores the `can_deposit` gate: compensation
/// must never be blocked by configuration, or the ledger would lose funds.
pub(crate) fn compensate(
    ledger: &mut Ledger,
    account_id: &AccountId,
    token_id: &TokenId,
    amount: Uint128,
) -> ContractResult<Uint128> {
    let asset = ledger.unwrap_asset_mut(token_id)?;
    let shares = asset.supplied.amount_to_shares(amount, false)?;
    asset.supplied.deposit(shares, amount)?;
    let is_collateral = asset.config.deposits_are_collateral;

    ledger
        .account_or_default(account_id)
        .increase_supplied(token_id, shares, is_collateral);

    Ok(shares)
}

/// Burn supplied shares and release the amount for an outbound transfer.
fn withdraw(
    ledger: &mut Ledger,
    account_id: &AccountId,
    asset_amount: &AssetAmount,
) -> ContractResult<Uint128> {
    let token_id = &asset_amount.token_id;
    let account_shares = ledger.unwrap_account(account_id)?.unwrap_supplied(token_id)?;

    let asset = ledger.unwrap_asset(token_id)?;
    if !asset.config.can_withdraw {
        return Err(ContractError::ActionDisabled {
            token_id: token_id.clone(),
            action: "withdraw",
        });
    }

    let (shares, amount) =
        asset_amount_to_shares(&asset.supplied, account_shares, asset_amount, false)?;

    let available = asset.available_amount();
    if amount > available {
        return Err(ContractError::InsufficientLiquidity {
            token_id: token_id.clone(),
            requested: amount,
            available,
        });
    }

    ledger
        .unwrap_account_mut(account_id)?
        .decrease_supplied(token_id, shares)?;
    ledger
        .unwrap_asset_mut(token_id)?
        .supplied
        .withdraw(shares, amount)?;

    Ok(amount)
}

/// Take on debt. The borrowed amount is simultaneously re-credited to the
/// account's supplied position, so borrowing alone moves no tokens; a
/// `Withdraw` in the same batch pays them out.
fn borrow(
    ledger: &mut Ledger,
    account_id: &AccountId,
    asset_amount: &AssetAmount,
) -> ContractResult<Uint128> {
    let token_id = &asset_amount.token_id;

    let asset = ledger.unwrap_asset(token_id)?;
    if !asset.config.can_borrow {
        return Err(ContractError::ActionDisabled {
            token_id: token_id.clone(),
            action: "borrow",
        });
    }

    let available = asset.available_amount();
    let max_borrow_shares = asset.borrowed.amount_to_shares(available, false)?;

    let (borrowed_shares, amount) =
        asset_amount_to_shares(&asset.borrowed, max_borrow_shares, asset_amount, true)?;

    if amount > available {
        return Err(ContractError::InsufficientLiquidity {
            token_id: token_id.clone(),
            requested: amount,
            available,
        });
    }

    let asset = ledger.unwrap_asset_mut(token_id)?;
    let supplied_shares = asset.supplied.amount_to_shares(amount, false)?;
    asset.borrowed.deposit(borrowed_shares, amount)?;
    asset.supplied.deposit(supplied_shares, amount)?;
    let is_collateral = asset.config.deposits_are_collateral;

    let account = ledger.account_or_default(account_id);
    account.increase_borrowed(token_id, borrowed_shares);
    account.increase_supplied(token_id, supplied_shares, is_collateral);

    Ok(amount)
}

/// Pay down `debtor_id`'s debt out of `payer_id`'s supplied balance of the
/// same token. Self-repays have `payer_id == debtor_id`; liquidations pay
/// out of the liquidator's balance.
fn repay(
    ledger: &mut Ledger,
    payer_id: &AccountId,
    debtor_id: &AccountId,
    asset_amount: &AssetAmount,
) -> ContractResult<Uint128> {
    let token_id = &asset_amount.token_id;
    let available_borrowed_shares = ledger.unwrap_account(debtor_id)?.unwrap_borrowed(token_id)?;
    let payer_shares = ledger.unwrap_account(payer_id)?.unwrap_supplied(token_id)?;

    let asset = ledger.unwrap_asset(token_id)?;
    let (mut borrowed_shares, mut amount) = asset_amount_to_shares(
        &asset.borrowed,
        available_borrowed_shares,
        asset_amount,
        true,
    )?;

    let mut supplied_shares = asset.supplied.amount_to_shares(amount, true)?;
    if supplied_shares > payer_shares {
        // The payer's supplied balance doesn't cover the requested repay;
        // shrink the repay to what the payer holds.
        supplied_shares = payer_shares;
        amount = asset.supplied.shares_to_amount(supplied_shares, false)?;

        if let Some(min_amount) = asset_amount.amount {
            if amount < min_amount {
                return Err(ContractError::NotEnoughSupplied {
                    token_id: token_id.clone(),
                });
            }
        }

        if amount.is_zero() {
            return Err(ContractError::ZeroAmount);
        }

        borrowed_shares = asset.borrowed.amount_to_shares(amount, false)?;
        if borrowed_shares.is_zero() {
            return Err(ContractError::ZeroAmount);
        }
        debug_assert!(borrowed_shares <= available_borrowed_shares);
    }

    let asset = ledger.unwrap_asset_mut(token_id)?;
    asset.supplied.withdraw(supplied_shares, amount)?;
    asset.borrowed.withdraw(borrowed_shares, amount)?;

    ledger
        .unwrap_account_mut(debtor_id)?
        .decrease_borrowed(token_id, borrowed_shares)?;
    ledger
        .unwrap_account_mut(payer_id)?
        .decrease_supplied(token_id, supplied_shares)?;

    Ok(amount)
}

/// Repay an at-risk account's debt and seize a bonus-priced amount of its
/// collateral, as a direct share reassignment. Both sides already live in
/// this ledger, so no tokens move.
fn liquidate(
    ledger: &mut Ledger,
    liquidator_id: &AccountId,
    target_id: &AccountId,
    collateral_token: &TokenId,
    in_assets: &AssetAmount,
    prices: &Prices,
) -> ContractResult<(Uint128, Uint128)> {
    if liquidator_id == target_id {
        return Err(ContractError::SelfLiquidation);
    }

    let target = ledger.unwrap_account(target_id)?;
    let health_before = compute_health(ledger, target, prices)?;
    if !is_liquidatable(health_before) {
        return Err(ContractError::NotLiquidatable {
            account_id: target_id.clone(),
        });
    }

    let debt_token = &in_assets.token_id;
    let price_debt = *prices.get(debt_token)?;
    let price_collateral = *prices.get(collateral_token)?;

    // The seizable value is bounded by the target's collateral position.
    let collateral_asset = ledger.unwrap_asset(collateral_token)?;
    let bonus = collateral_asset.config.liquidation_bonus;
    let target_entry = target
        .supplied
        .iter()
        .find(|entry| &entry.token_id == collateral_token && entry.is_collateral)
        .ok_or_else(|| ContractError::NoSuchPosition {
            account_id: target_id.clone(),
            token_id: collateral_token.clone(),
        })?;
    let collateral_balance = collateral_asset
        .supplied
        .shares_to_amount(target_entry.shares, false)?;
    let collateral_value = price_collateral.value_of_unit_amount(collateral_balance)?;

    let max_repay_value = collateral_value.checked_div(Udec128::ONE.checked_add(bonus)?)?;
    let max_repay_amount = value_to_unit_amount(max_repay_value, &price_debt)?;

    let debt_asset = ledger.unwrap_asset(debt_token)?;
    let target_debt = debt_asset
        .borrowed
        .shares_to_amount(target.unwrap_borrowed(debt_token)?, true)?;

    let repaid = match in_assets.amount {
        Some(amount) => {
            if amount > max_repay_amount {
                return Err(ContractError::LiquidationTooLarge {
                    account_id: target_id.clone(),
                });
            }
            amount
        },
        None => {
            let payer_balance = debt_asset.supplied.shares_to_amount(
                ledger.unwrap_account(liquidator_id)?.unwrap_supplied(debt_token)?,
                false,
            )?;

            let mut repaid = target_debt.min(payer_balance).min(max_repay_amount);
            if let Some(max_amount) = in_assets.max_amount {
                repaid = repaid.min(max_amount);
            }
            repaid
        },
    };

    if repaid.is_zero() {
        return Err(ContractError::ZeroAmount);
    }

    let repaid = repay(
        ledger,
        liquidator_id,
        target_id,
        &AssetAmount::exact(debt_token.clone(), repaid),
    )?;

    // Price the seizure: the repaid value plus the liquidation bonus.
    let repaid_value = price_debt.value_of_unit_amount(repaid)?;
    let seized_value = repaid_value.checked_mul(Udec128::ONE.checked_add(bonus)?)?;
    let seized_amount = value_to_unit_amount(seized_value, &price_collateral)?;

    let collateral_asset = ledger.unwrap_asset(collateral_token)?;
    let mut seized_shares = collateral_asset
        .supplied
        .amount_to_shares(seized_amount, true)?;
    let target = ledger.unwrap_account(target_id)?;
    seized_shares = seized_shares.min(target.unwrap_supplied(collateral_token)?);
    let seized_amount = ledger
        .unwrap_asset(collateral_token)?
        .supplied
        .shares_to_amount(seized_shares, false)?;

    let is_collateral = ledger
        .unwrap_asset(collateral_token)?
        .config
        .deposits_are_collateral;
    ledger
        .unwrap_account_mut(target_id)?
        .decrease_supplied(collateral_token, seized_shares)?;
    ledger
        .unwrap_account_mut(liquidator_id)?
        .increase_supplied(collateral_token, seized_shares, is_collateral);

    // The target must end up healthier, but still at risk: liquidations are
    // sized to nudge an account back toward the threshold, not to strip it.
    let target = ledger.unwrap_account(target_id)?;
    let health_after = compute_health(ledger, target, prices)?;
    match (health_before, health_after) {
        (Some(before), Some(after)) if after > before && after < Udec128::ONE => {},
        _ => {
            return Err(ContractError::LiquidationTooLarge {
                account_id: target_id.clone(),
            });
        },
    }

    Ok((repaid, seized_amount))
}

/// Move an asset's accrued protocol-fee shares into the owner's supplied
/// position.
fn claim_protocol_fees(
    ledger: &mut Ledger,
    owner_id: &AccountId,
    token_id: &TokenId,
) -> ContractResult<Uint128> {
    let asset = ledger.unwrap_asset_mut(token_id)?;
    let shares = asset.pending_fee_shares;
    if shares.is_zero() {
        return Err(ContractError::ZeroAmount);
    }

    asset.pending_fee_shares = Uint128::ZERO;
    let amount = asset.supplied.shares_to_amount(shares, false)?;
    let is_collateral = asset.config.deposits_are_collateral;

    ledger
        .account_or_default(owner_id)
        .increase_supplied(token_id, shares, is_collateral);

    Ok(amount)
}

/// Convert a value back into token smallest units at the given price:
/// `value * 10^decimals / price`, rounding down.
fn value_to_unit_amount(value: Udec128, price: &PriceQuote) -> ContractResult<Uint128> {
    let unit = Uint128::TEN.checked_pow(price.decimals as u32)?;
    Ok(value
        .into_atomics()
        .checked_multiply_ratio_floor(unit, price.price.into_atomics())?)
}
