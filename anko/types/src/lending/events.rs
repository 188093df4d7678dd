use {
    crate::{AccountId, TokenId},
    anko_math::Uint128,
    serde::{Deserialize, Serialize},
};

/// A typed event describing one ledger effect. Handlers collect these into
/// their response so the host can log them; the vocabulary matches what
/// indexers expect.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq)]
pub enum Event {
    Deposit(AccountAmountToken),
    WithdrawStarted(AccountAmountToken),
    WithdrawSucceeded(AccountAmountToken),
    WithdrawFailed(AccountAmountToken),
    Borrow(AccountAmountToken),
    Repay(AccountAmountToken),
    IncreaseCollateral {
        account_id: AccountId,
        token_id: TokenId,
    },
    Liquidate {
        liquidator_id: AccountId,
        target_id: AccountId,
        repaid_token_id: TokenId,
        repaid_amount: Uint128,
        seized_token_id: TokenId,
        seized_amount: Uint128,
    },
    ClaimProtocolFees {
        token_id: TokenId,
        amount: Uint128,
    },
}

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq)]
pub struct AccountAmountToken {
    pub account_id: AccountId,
    pub token_id: TokenId,
    pub amount: Uint128,
}

impl Event {
    pub fn deposit(account_id: AccountId, token_id: TokenId, amount: Uint128) -> Self {
        Self::Deposit(AccountAmountToken {
            account_id,
            token_id,
            amount,
        })
    }

    pub fn withdraw_started(account_id: AccountId, token_id: TokenId, amount: Uint128) -> Self {
        Self::WithdrawStarted(AccountAmountToken {
            account_id,
            token_id,
            amount,
        })
    }

    pub fn withdraw_succeeded(account_id: AccountId, token_id: TokenId, amount: Uint128) -> Self {
        Self::WithdrawSucceeded(AccountAmountToken {
            account_id,
            token_id,
            amount,
        })
    }

    pub fn withdraw_failed(account_id: AccountId, token_id: TokenId, amount: Uint128) -> Self {
        Self::WithdrawFailed(AccountAmountToken {
            account_id,
            token_id,
            amount,
        })
    }

    pub fn borrow(account_id: AccountId, token_id: TokenId, amount: Uint128) -> Self {
        Self::Borrow(AccountAmountToken {
            account_id,
            token_id,
            amount,
        })
    }

    pub fn repay(account_id: AccountId, token_id: TokenId, amount: Uint128) -> Self {
        Self::Repay(AccountAmountToken {
            account_id,
            token_id,
            amount,
        })
    }
}
