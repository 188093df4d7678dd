use {
    crate::{
        ContractError, ContractResult, PendingExecutions, PendingTransfers, core::{Account, Asset},
    },
    anko_types::{AccountId, Timestamp, TokenId, lending::Config},
    borsh::{BorshDeserialize, BorshSerialize},
    std::collections::BTreeMap,
};

/// The balances half of the contract state: asset pools and account
/// positions. Batches execute against a working copy of this struct and
/// commit by swapping it in, which is what makes a batch all-or-nothing.
#[derive(BorshSerialize, BorshDeserialize, Debug, Clone, Default, PartialEq, Eq)]
pub struct Ledger {
    pub assets: BTreeMap<TokenId, Asset>,
    pub accounts: BTreeMap<AccountId, Account>,
}

impl Ledger {
    pub fn unwrap_asset(&self, token_id: &TokenId) -> ContractResult<&Asset> {
        self.assets
            .get(token_id)
            .ok_or_else(|| ContractError::UnknownAsset {
                token_id: token_id.clone(),
            })
    }

    pub fn unwrap_asset_mut(&mut self, token_id: &TokenId) -> ContractResult<&mut Asset> {
        self.assets
            .get_mut(token_id)
            .ok_or_else(|| ContractError::UnknownAsset {
                token_id: token_id.clone(),
            })
    }

    pub fn get_account(&self, account_id: &AccountId) -> Option<&Account> {
        self.accounts.get(account_id)
    }

    pub fn unwrap_account(&self, account_id: &AccountId) -> ContractResult<&Account> {
        self.accounts
            .get(account_id)
            .ok_or_else(|| ContractError::AccountNotRegistered {
                account_id: account_id.clone(),
            })
    }

    pub fn unwrap_account_mut(&mut self, account_id: &AccountId) -> ContractResult<&mut Account> {
        self.accounts
            .get_mut(account_id)
            .ok_or_else(|| ContractError::AccountNotRegistered {
                account_id: account_id.clone(),
            })
    }

    /// Fetch an account, creating an empty one on first contact.
    pub fn account_or_default(&mut self, account_id: &AccountId) -> &mut Account {
        self.accounts
            .entry(account_id.clone())
            .or_insert_with(|| Account::new(account_id))
    }

    /// Accrue interest on one asset. Every mutating path calls this for each
    /// asset it touches before reading the pools.
    pub fn accrue(&mut self, token_id: &TokenId, now: Timestamp) -> ContractResult<()> {
        self.unwrap_asset_mut(token_id)?.accrue(now)?;
        Ok(())
    }
}

/// The single ownership root of the protocol. Every operation is a method
/// on this struct (or takes it by reference), so the core runs and tests
/// without a host runtime.
#[derive(BorshSerialize, BorshDeserialize, Debug, Clone, PartialEq, Eq)]
pub struct Contract {
    pub(crate) config: Config,
    pub(crate) ledger: Ledger,
    pub(crate) pending_executions: PendingExecutions,
    pub(crate) pending_transfers: PendingTransfers,
    pub(crate) next_request_id: u64,
}

impl Contract {
    pub fn new(config: Config) -> ContractResult<Self> {
        config.validate()?;

        Ok(Self {
            config,
            ledger: Ledger::default(),
            pending_executions: PendingExecutions::default(),
            pending_transfers: PendingTransfers::default(),
            next_request_id: 0,
        })
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    pub fn ledger(&self) -> &Ledger {
        &self.ledger
    }

    /// How many price-gated batches are parked for this account.
    pub fn pending_execution_count(&self, account_id: &AccountId) -> usize {
        self.pending_executions.count(account_id)
    }

    /// How many outbound transfers are still awaiting their callback.
    pub fn pending_transfer_count(&self) -> usize {
        self.pending_transfers.len()
    }

    pub(crate) fn assert_owner(&self, caller_id: &AccountId) -> ContractResult<()> {
        if caller_id != &self.config.owner_id {
            return Err(ContractError::Unauthorized {
                expected: self.config.owner_id.clone(),
            });
        }

        Ok(())
    }

    pub(crate) fn assert_oracle(&self, caller_id: &AccountId) -> ContractResult<()> {
        if caller_id != &self.config.oracle_id {
            return Err(ContractError::Unauthorized {
                expected: self.config.oracle_id.clone(),
            });
        }

        Ok(())
    }
}
