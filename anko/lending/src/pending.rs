use {
    anko_types::{AccountId, Timestamp, TokenId, lending::Action},
    borsh::{BorshDeserialize, BorshSerialize},
    std::collections::{BTreeMap, BTreeSet},
};

/// A price-gated batch parked until the oracle delivers quotes for exactly
/// the asset set it needs. Discarded on commit, rollback, or eviction.
#[derive(BorshSerialize, BorshDeserialize, Debug, Clone, PartialEq, Eq)]
pub struct PendingExecution {
    pub account_id: AccountId,
    /// The union of the asset ids referenced by the account's positions and
    /// by the batch at registration time.
    pub asset_ids: BTreeSet<TokenId>,
    pub actions: Vec<Action>,
    pub registered_at: Timestamp,
}

/// Pending executions, keyed by originating account, oldest first.
///
/// A batch cannot be cancelled once registered; the per-account cap bounds
/// the registry instead: registering past the cap evicts the account's
/// oldest entry. An entry whose prices never arrive is simply abandoned
/// until eviction pushes it out.
#[derive(BorshSerialize, BorshDeserialize, Debug, Clone, Default, PartialEq, Eq)]
pub struct PendingExecutions(BTreeMap<AccountId, Vec<PendingExecution>>);

impl PendingExecutions {
    /// Park a batch. Returns the evicted entry, if the cap was reached.
    pub fn register(
        &mut self,
        pending: PendingExecution,
        max_per_account: u32,
    ) -> Option<PendingExecution> {
        let queue = self.0.entry(pending.account_id.clone()).or_default();
        queue.push(pending);

        if queue.len() > max_per_account as usize {
            Some(queue.remove(0))
        } else {
            None
        }
    }

    /// Remove and return the entry matching the delivered account, asset-id
    /// set, and batch. `None` leaves the registry unchanged.
    pub fn take_matching(
        &mut self,
        account_id: &AccountId,
        asset_ids: &BTreeSet<TokenId>,
        actions: &[Action],
    ) -> Option<PendingExecution> {
        let queue = self.0.get_mut(account_id)?;
        let index = queue
            .iter()
            .position(|pending| &pending.asset_ids == asset_ids && pending.actions == actions)?;
        let pending = queue.remove(index);

        if queue.is_empty() {
            self.0.remove(account_id);
        }

        Some(pending)
    }

    pub fn count(&self, account_id: &AccountId) -> usize {
        self.0.get(account_id).map_or(0, Vec::len)
    }
}

// ----------------------------------- tests -----------------------------------
