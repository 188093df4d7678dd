//! Read-only queries. All of them are side-effect-free: interest is
//! projected onto a copy of the asset, never written back, so a query
//! reports the same balances a mutating call would settle at.

use {
    crate::{Contract, ContractResult, core::{Account, Asset}},
    anko_types::{
        AccountId, Timestamp, TokenId,
        lending::{AccountView, AssetDetailedView, AssetView, PoolView},
    },
};

impl Contract {
    /// Snapshot one account. An absent account yields an empty snapshot,
    /// never an error.
    pub fn get_account(
        &self,
        account_id: &AccountId,
        now: Timestamp,
    ) -> ContractResult<AccountView> {
        match self.ledger.get_account(account_id) {
            Some(account) => self.account_view(account, now),
            None => Ok(AccountView::empty(account_id.clone())),
        }
    }

    /// Snapshot one asset pool, or `None` if the token isn't listed.
    pub fn get_asset(
        &self,
        token_id: &TokenId,
        now: Timestamp,
    ) -> ContractResult<Option<AssetDetailedView>> {
        self.projected_asset(token_id, now)?
            .map(|asset| asset_view(token_id, &asset))
            .transpose()
    }

    /// Enumerate asset pools, in token-id order.
    pub fn get_assets_paged(
        &self,
        from_index: Option<u64>,
        limit: Option<u64>,
        now: Timestamp,
    ) -> ContractResult<Vec<AssetDetailedView>> {
        let from_index = from_index.unwrap_or(0) as usize;
        let limit = limit.unwrap_or(u64::MAX) as usize;

        self.ledger
            .assets
            .iter()
            .skip(from_index)
            .take(limit)
            .map(|(token_id, asset)| {
                let mut asset = asset.clone();
                asset.accrue(now)?;
                asset_view(token_id, &asset)
            })
            .collect()
    }

    /// Enumerate accounts, in account-id order. Used by liquidation bots to
    /// scan for at-risk accounts.
    pub fn get_accounts_paged(
        &self,
        from_index: Option<u64>,
        limit: Option<u64>,
        now: Timestamp,
    ) -> ContractResult<Vec<AccountView>> {
        let from_index = from_index.unwrap_or(0) as usize;
        let limit = limit.unwrap_or(u64::MAX) as usize;

        self.ledger
            .accounts
            .values()
            .skip(from_index)
            .take(limit)
            .map(|account| self.account_view(account, now))
            .collect()
    }

    fn account_view(&self, account: &Account, now: Timestamp) -> ContractResult<AccountView> {
        let mut supplied = Vec::with_capacity(account.supplied.len());
        for entry in &account.supplied {
            let Some(asset) = self.projected_asset(&entry.token_id, now)? else {
                continue;
            };

            supplied.push(AssetView {
                token_id: entry.token_id.clone(),
                balance: asset.supplied.shares_to_amount(entry.shares, false)?,
                shares: entry.shares,
                is_collateral: Some(entry.is_collateral),
                apr: asset.supply_apr()?,
            });
        }

        let mut borrowed = Vec::with_capacity(account.borrowed.len());
        for entry in &account.borrowed {
            let Some(asset) = self.projected_asset(&entry.token_id, now)? else {
                continue;
            };

            borrowed.push(AssetView {
                token_id: entry.token_id.clone(),
                balance: asset.borrowed.shares_to_amount(entry.shares, true)?,
                shares: entry.shares,
                is_collateral: None,
                apr: asset.borrow_apr()?,
            });
        }

        Ok(AccountView {
            account_id: account.account_id.clone(),
            supplied,
            borrowed,
        })
    }

    /// A copy of the asset with interest accrued up to `now`.
    fn projected_asset(
        &self,
        token_id: &TokenId,
        now: Timestamp,
    ) -> ContractResult<Option<Asset>> {
        let Some(asset) = self.ledger.assets.get(token_id) else {
            return Ok(None);
        };

        let mut asset = asset.clone();
        asset.accrue(now)?;
        Ok(Some(asset))
    }
}

fn asset_view(token_id: &TokenId, asset: &Asset) -> ContractResult<AssetDetailedView> {
    Ok(AssetDetailedView {
        token_id: token_id.clone(),
        supplied: PoolView {
            shares: asset.supplied.shares,
            balance: asset.supplied.balance,
        },
        borrowed: PoolView {
            shares: asset.borrowed.shares,
            balance: asset.borrowed.balance,
        },
        reserve: asset.available_amount(),
        pending_fee_shares: asset.pending_fee_shares,
        borrow_apr: asset.borrow_apr()?,
        supply_apr: asset.supply_apr()?,
        config: asset.config.clone(),
    })
}
