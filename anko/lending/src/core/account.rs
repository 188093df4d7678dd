use {
    crate::{ContractError, ContractResult},
    anko_math::Uint128,
    anko_types::{AccountId, TokenId},
    borsh::{BorshDeserialize, BorshSerialize},
    serde::{Deserialize, Serialize},
};

/// One supplied position of an account: a claim on the asset's supplied pool.
#[derive(Serialize, Deserialize, BorshSerialize, BorshDeserialize, Debug, Clone, PartialEq, Eq)]
pub struct SuppliedEntry {
    pub token_id: TokenId,
    pub shares: Uint128,
    /// Whether this position backs the account's debt.
    pub is_collateral: bool,
}

/// One borrowed position of an account: a claim held against it by the
/// asset's borrowed pool.
#[derive(Serialize, Deserialize, BorshSerialize, BorshDeserialize, Debug, Clone, PartialEq, Eq)]
pub struct BorrowedEntry {
    pub token_id: TokenId,
    pub shares: Uint128,
}

/// Per-account positions. Entries are kept in insertion order; an entry
/// exists iff its share balance is strictly positive; zero-share entries
/// are pruned the moment they hit zero.
#[derive(Serialize, Deserialize, BorshSerialize, BorshDeserialize, Debug, Clone, PartialEq, Eq)]
pub struct Account {
    pub account_id: AccountId,
    pub supplied: Vec<SuppliedEntry>,
    pub borrowed: Vec<BorrowedEntry>,
}

impl Account {
    pub fn new(account_id: &AccountId) -> Self {
        Self {
            account_id: account_id.clone(),
            supplied: vec![],
            borrowed: vec![],
        }
    }

    pub fn supplied_shares(&self, token_id: &TokenId) -> Option<Uint128> {
        self.supplied
            .iter()
            .find(|entry| &entry.token_id == token_id)
            .map(|entry| entry.shares)
    }

    pub fn borrowed_shares(&self, token_id: &TokenId) -> Option<Uint128> {
        self.borrowed
            .iter()
            .find(|entry| &entry.token_id == token_id)
            .map(|entry| entry.shares)
    }

    pub fn unwrap_supplied(&self, token_id: &TokenId) -> ContractResult<Uint128> {
        self.supplied_shares(token_id)
            .ok_or_else(|| ContractError::NoSuchPosition {
                account_id: self.account_id.clone(),
                token_id: token_id.clone(),
            })
    }

    pub fn unwrap_borrowed(&self, token_id: &TokenId) -> ContractResult<Uint128> {
        self.borrowed_shares(token_id)
            .ok_or_else(|| ContractError::NoSuchPosition {
                account_id: self.account_id.clone(),
                token_id: token_id.clone(),
            })
    }

    /// Credit supplied shares, inserting an entry on first contact. The
    /// collateral flag of an existing entry wins over the `is_collateral`
    /// argument, so that an explicitly flagged position stays flagged.
    pub fn increase_supplied(&mut self, token_id: &TokenId, shares: Uint128, is_collateral: bool) {
        if shares.is_zero() {
            return;
        }

        if let Some(entry) = self
            .supplied
            .iter_mut()
            .find(|entry| &entry.token_id == token_id)
        {
            entry.shares += shares;
            entry.is_collateral |= is_collateral;
        } else {
            self.supplied.push(SuppliedEntry {
                token_id: token_id.clone(),
                shares,
                is_collateral,
            });
        }
    }

    pub fn decrease_supplied(&mut self, token_id: &TokenId, shares: Uint128) -> ContractResult<()> {
        let index = self
            .supplied
            .iter()
            .position(|entry| &entry.token_id == token_id)
            .ok_or_else(|| ContractError::NoSuchPosition {
                account_id: self.account_id.clone(),
                token_id: token_id.clone(),
            })?;

        let entry = &mut self.supplied[index];
        entry.shares = entry
            .shares
            .checked_sub(shares)
            .map_err(ContractError::Math)?;

        if entry.shares.is_zero() {
            self.supplied.remove(index);
        }

        Ok(())
    }

    pub fn increase_borrowed(&mut self, token_id: &TokenId, shares: Uint128) {
        if shares.is_zero() {
            return;
        }

        if let Some(entry) = self
            .borrowed
            .iter_mut()
            .find(|entry| &entry.token_id == token_id)
        {
            entry.shares += shares;
        } else {
            self.borrowed.push(BorrowedEntry {
                token_id: token_id.clone(),
                shares,
            });
        }
    }

    pub fn decrease_borrowed(&mut self, token_id: &TokenId, shares: Uint128) -> ContractResult<()> {
        let index = self
            .borrowed
            .iter()
            .position(|entry| &entry.token_id == token_id)
            .ok_or_else(|| ContractError::NoSuchPosition {
                account_id: self.account_id.clone(),
                token_id: token_id.clone(),
            })?;

        let entry = &mut self.borrowed[index];
        entry.shares = entry
            .shares
            .checked_sub(shares)
            .map_err(ContractError::Math)?;

        if entry.shares.is_zero() {
            self.borrowed.remove(index);
        }

        Ok(())
    }

    /// Flag an existing supplied position as collateral.
    pub fn set_collateral(&mut self, token_id: &TokenId) -> ContractResult<()> {
        self.supplied
            .iter_mut()
            .find(|entry| &entry.token_id == token_id)
            .map(|entry| entry.is_collateral = true)
            .ok_or_else(|| ContractError::NoSuchPosition {
                account_id: self.account_id.clone(),
                token_id: token_id.clone(),
            })
    }

    pub fn has_debt(&self) -> bool {
        !self.borrowed.is_empty()
    }

    pub fn position_count(&self) -> usize {
        self.supplied.len() + self.borrowed.len()
    }
}

// ----------------------------------- tests -----------------------------------

#[cfg(test)]
mod tests {
    use super::*;

    fn token(id: &str) -> TokenId {
        id.parse().unwrap()
    }

    #[test]
    fn entries_are_pruned_at_zero_shares() {
        let mut account = Account::new(&"alice.near".parse().unwrap());
        account.increase_supplied(&token("dai.token"), Uint128::new(100), true);
        account.increase_borrowed(&token("dai.token"), Uint128::new(40));

        account
            .decrease_supplied(&token("dai.token"), Uint128::new(100))
            .unwrap();
        assert!(account.supplied.is_empty());

        account
            .decrease_borrowed(&token("dai.token"), Uint128::new(40))
            .unwrap();
        assert!(account.borrowed.is_empty());
        assert!(!account.has_debt());
    }

    #[test]
    fn partial_decrease_keeps_the_entry() {
        let mut account = Account::new(&"alice.near".parse().unwrap());
        account.increase_supplied(&token("dai.token"), Uint128::new(100), true);
        account
            .decrease_supplied(&token("dai.token"), Uint128::new(60))
            .unwrap();
        assert_eq!(
            account.supplied_shares(&token("dai.token")),
            Some(Uint128::new(40)),
        );
    }

    #[test]
    fn insertion_order_is_preserved() {
        let mut account = Account::new(&"alice.near".parse().unwrap());
        account.increase_supplied(&token("near.token"), Uint128::new(1), true);
        account.increase_supplied(&token("dai.token"), Uint128::new(2), true);
        account.increase_supplied(&token("usdc.token"), Uint128::new(3), true);

        account
            .decrease_supplied(&token("dai.token"), Uint128::new(2))
            .unwrap();

        let order: Vec<_> = account
            .supplied
            .iter()
            .map(|entry| entry.token_id.as_str())
            .collect();
        assert_eq!(order, ["near.token", "usdc.token"]);
    }

    #[test]
    fn collateral_flag_is_sticky() {
        let mut account = Account::new(&"alice.near".parse().unwrap());
        account.increase_supplied(&token("dai.token"), Uint128::new(1), false);
        account.set_collateral(&token("dai.token")).unwrap();
        account.increase_supplied(&token("dai.token"), Uint128::new(1), false);
        assert!(account.supplied[0].is_collateral);
    }
}
