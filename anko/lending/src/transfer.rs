use {
    anko_math::Uint128,
    anko_types::{AccountId, TokenId},
    borsh::{BorshDeserialize, BorshSerialize},
    std::collections::BTreeMap,
};

/// The tentative-debit record of one outbound transfer.
///
/// The shares were already burned when the transfer was requested; the
/// ledger decrease only becomes final when the token contract confirms
/// success. On failure the recorded amount is re-deposited. Each record is
/// resolved exactly once: resolution removes it, so a duplicate callback
/// cannot apply twice.
#[derive(BorshSerialize, BorshDeserialize, Debug, Clone, PartialEq, Eq)]
pub struct PendingTransfer {
    pub request_id: u64,
    pub account_id: AccountId,
    pub token_id: TokenId,
    pub amount: Uint128,
}

/// Outstanding transfer records, keyed by request id.
#[derive(BorshSerialize, BorshDeserialize, Debug, Clone, Default, PartialEq, Eq)]
pub struct PendingTransfers(BTreeMap<u64, PendingTransfer>);

impl PendingTransfers {
    pub fn insert(&mut self, transfer: PendingTransfer) {
        self.0.insert(transfer.request_id, transfer);
    }

    pub fn remove(&mut self, request_id: u64) -> Option<PendingTransfer> {
        self.0.remove(&request_id)
    }

    pub fn contains(&self, request_id: u64) -> bool {
        self.0.contains_key(&request_id)
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}
