use {
    crate::{AccountId, TokenId, lending::AssetConfig},
    anko_math::{Udec128, Uint128},
    serde::{Deserialize, Serialize},
};

/// One side of an asset pool: the fungible claim total and the balance it
/// currently redeems for.
#[derive(Serialize, Deserialize, Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct PoolView {
    pub shares: Uint128,
    pub balance: Uint128,
}

/// One position of an account, supplied or borrowed.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq)]
pub struct AssetView {
    pub token_id: TokenId,
    pub balance: Uint128,
    /// The number of shares this account holds in the corresponding pool.
    pub shares: Uint128,
    /// Whether this supplied position counts as collateral. `None` on
    /// borrowed positions.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub is_collateral: Option<bool>,
    /// The current APR of the corresponding pool (supply or borrow side).
    pub apr: Udec128,
}

/// Snapshot of one account. A missing account is an empty snapshot, never
/// an error.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq)]
pub struct AccountView {
    pub account_id: AccountId,
    pub supplied: Vec<AssetView>,
    pub borrowed: Vec<AssetView>,
}

impl AccountView {
    pub fn empty(account_id: AccountId) -> Self {
        Self {
            account_id,
            supplied: vec![],
            borrowed: vec![],
        }
    }
}

/// Snapshot of one asset pool.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq)]
pub struct AssetDetailedView {
    pub token_id: TokenId,
    pub supplied: PoolView,
    pub borrowed: PoolView,
    /// Tokens held by the contract and available for withdraw/borrow:
    /// `supplied.balance - borrowed.balance`.
    pub reserve: Uint128,
    /// Protocol fee shares accrued but not yet claimed by the owner.
    pub pending_fee_shares: Uint128,
    pub borrow_apr: Udec128,
    pub supply_apr: Udec128,
    pub config: AssetConfig,
}
