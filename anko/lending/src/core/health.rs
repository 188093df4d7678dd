use {
    crate::{ContractError, ContractResult, Ledger, Prices, core::Account},
    anko_math::Udec128,
};

/// The risk-weighted health of an account:
///
/// ```text
/// health = Σ(collateral_value × collateral_factor)
///        / Σ(debt_value / borrow_factor)
/// ```
///
/// `None` means the account carries no debt and cannot be liquidated.
/// `Some(h)` with `h < 1` means the account is liquidatable.
///
/// Collateral balances are valued rounding down and debt balances rounding
/// up, so rounding always errs toward treating the account as riskier.
pub fn compute_health(
    ledger: &Ledger,
    account: &Account,
    prices: &Prices,
) -> ContractResult<Option<Udec128>> {
    if account.borrowed.is_empty() {
        return Ok(None);
    }

    let mut debt_sum = Udec128::ZERO;
    for entry in &account.borrowed {
        let asset = ledger.unwrap_asset(&entry.token_id)?;
        let balance = asset.borrowed.shares_to_amount(entry.shares, true)?;
        let price = prices.get(&entry.token_id)?;
        let value = price.value_of_unit_amount(balance)?;

        debt_sum.checked_add_assign(value.checked_div(asset.config.borrow_factor)?)?;
    }

    if debt_sum.is_zero() {
        return Ok(None);
    }

    let mut collateral_sum = Udec128::ZERO;
    for entry in &account.supplied {
        if !entry.is_collateral {
            continue;
        }

        let asset = ledger.unwrap_asset(&entry.token_id)?;
        let balance = asset.supplied.shares_to_amount(entry.shares, false)?;
        let price = prices.get(&entry.token_id)?;
        let value = price.value_of_unit_amount(balance)?;

        collateral_sum.checked_add_assign(value.checked_mul(asset.config.collateral_factor)?)?;
    }

    Ok(Some(collateral_sum.checked_div(debt_sum)?))
}

/// Whether a health reading permits liquidation.
pub fn is_liquidatable(health: Option<Udec128>) -> bool {
    matches!(health, Some(h) if h < Udec128::ONE)
}

/// Fail `Undercollateralized` when the account's health has dropped below 1.
pub fn assert_solvent(
    ledger: &Ledger,
    account: &Account,
    prices: &Prices,
) -> ContractResult<()> {
    if is_liquidatable(compute_health(ledger, account, prices)?) {
        return Err(ContractError::Undercollateralized {
            account_id: account.account_id.clone(),
        });
    }

    Ok(())
}
