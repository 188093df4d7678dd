//! Inbound message handlers.
//!
//! Each method here is one entry point of the contract: a token's
//! transfer-with-callback, the oracle's price delivery, a direct action
//! batch, the callbacks resolving outbound transfers, and the owner-gated
//! admin operations. Every handler returns either a [`Response`] to commit
//! or a [`ContractError`](crate::ContractError); there is no partial effect.

use {
    crate::{
        Contract, ContractError, ContractResult, PendingExecution, Prices, Response,
        core::Asset,
        executor::{batch_needs_prices, compensate, deposit, referenced_asset_ids},
        validate_price_data,
    },
    anko_math::Uint128,
    anko_types::{
        AccountId, PriceData, Timestamp, TokenId,
        lending::{Action, AssetConfig, Config, Event, PriceReceiverMsg, TokenReceiverMsg},
    },
    std::collections::BTreeSet,
    tracing::{info, warn},
};

impl Contract {
    /// Handle a token transfer-with-callback: credit the deposit, then run
    /// or park the batch attached as JSON in the transfer message (an empty
    /// or missing message is a plain deposit).
    ///
    /// Returns the unused amount. It is zero whenever the call succeeds
    /// (deposits consume everything), while any error means the full amount
    /// is unused, which the token contract turns into an automatic refund.
    pub fn receive_transfer(
        &mut self,
        sender_id: &AccountId,
        token_id: &TokenId,
        amount: Uint128,
        msg: Option<&str>,
        now: Timestamp,
    ) -> ContractResult<(Uint128, Response)> {
        info!(%sender_id, %token_id, %amount, "received transfer");

        let msg: Option<TokenReceiverMsg> = msg
            .filter(|raw| !raw.is_empty())
            .map(serde_json::from_str)
            .transpose()
            .map_err(|err| ContractError::InvalidMessage {
                reason: err.to_string(),
            })?;

        // Deposit into a working copy, so that a failing same-cycle batch
        // rolls the deposit back as well and the whole transfer refunds.
        let mut ledger = self.ledger.clone();
        ledger.accrue(token_id, now)?;
        deposit(&mut ledger, sender_id, token_id, amount)?;

        let response = Response::new().add_event(Event::deposit(
            sender_id.clone(),
            token_id.clone(),
            amount,
        ));

        match msg {
            None => {
                self.ledger = ledger;
                Ok((Uint128::ZERO, response))
            },
            Some(TokenReceiverMsg::Execute { actions }) => {
                if batch_needs_prices(&ledger, sender_id, &actions) {
                    // The deposit stands on its own; the batch waits for a
                    // matching price delivery.
                    self.ledger = ledger;
                    self.register_pending(sender_id, actions, now);
                    Ok((Uint128::ZERO, response))
                } else {
                    let response = self.execute_batch_on(
                        ledger,
                        response,
                        sender_id,
                        &actions,
                        &Prices::none(),
                        now,
                    )?;
                    Ok((Uint128::ZERO, response))
                }
            },
        }
    }

    /// Handle the oracle's price delivery: validate freshness, match the
    /// delivery against a parked batch, and execute it.
    ///
    /// The matched batch is consumed whether execution commits or rolls
    /// back; the caller must resubmit after a failure, nothing retries.
    pub fn receive_prices(
        &mut self,
        caller_id: &AccountId,
        originating_account: &AccountId,
        asset_ids: &BTreeSet<TokenId>,
        data: PriceData,
        msg: &str,
        now: Timestamp,
    ) -> ContractResult<Response> {
        self.assert_oracle(caller_id)?;
        validate_price_data(&self.config, &data, now)?;

        let msg: PriceReceiverMsg =
            serde_json::from_str(msg).map_err(|err| ContractError::InvalidMessage {
                reason: err.to_string(),
            })?;

        // The delivery must quote every requested asset; otherwise the
        // parked batch stays parked for a later, complete delivery.
        for token_id in asset_ids {
            if !data.prices.contains_key(token_id) {
                return Err(ContractError::MissingPrice {
                    token_id: token_id.clone(),
                });
            }
        }

        let PriceReceiverMsg::Execute { actions } = msg;

        let pending = self
            .pending_executions
            .take_matching(originating_account, asset_ids, &actions)
            .ok_or_else(|| ContractError::NoPendingExecution {
                account_id: originating_account.clone(),
            })?;

        info!(
            account_id = %originating_account,
            num_assets = asset_ids.len(),
            "price delivery matched a pending execution",
        );

        let prices = Prices::from(data);
        let result = self.execute_batch(originating_account, &pending.actions, &prices, now);
        match &result {
            Ok(_) => info!(account_id = %originating_account, "batch committed"),
            Err(err) => warn!(account_id = %originating_account, %err, "batch rolled back"),
        }

        result
    }

    /// Handle a direct action batch, not funded by a transfer. Price-free
    /// batches run immediately; everything else is parked until the oracle
    /// delivers a matching quote set.
    pub fn execute(
        &mut self,
        sender_id: &AccountId,
        actions: Vec<Action>,
        now: Timestamp,
    ) -> ContractResult<Response> {
        if batch_needs_prices(&self.ledger, sender_id, &actions) {
            self.register_pending(sender_id, actions, now);
            return Ok(Response::new());
        }

        self.execute_batch(sender_id, &actions, &Prices::none(), now)
    }

    /// A token contract confirmed an outbound transfer. Finalizes the
    /// tentative debit by dropping its record; resolving the same request
    /// twice fails without effect.
    pub fn on_transfer_success(&mut self, request_id: u64) -> ContractResult<Response> {
        let transfer = self
            .pending_transfers
            .remove(request_id)
            .ok_or(ContractError::UnknownRequest { request_id })?;

        info!(request_id, account_id = %transfer.account_id, "outbound transfer confirmed");

        Ok(Response::new().add_event(Event::withdraw_succeeded(
            transfer.account_id,
            transfer.token_id,
            transfer.amount,
        )))
    }

    /// A token contract rejected an outbound transfer. Compensates the
    /// tentative debit by re-crediting the amount at the current share
    /// price. Idempotent per request id, like the success path.
    pub fn on_transfer_failure(
        &mut self,
        request_id: u64,
        now: Timestamp,
    ) -> ContractResult<Response> {
        let transfer = self
            .pending_transfers
            .remove(request_id)
            .ok_or(ContractError::UnknownRequest { request_id })?;

        warn!(
            request_id,
            account_id = %transfer.account_id,
            token_id = %transfer.token_id,
            amount = %transfer.amount,
            "outbound transfer rejected, compensating",
        );

        self.ledger.accrue(&transfer.token_id, now)?;
        compensate(
            &mut self.ledger,
            &transfer.account_id,
            &transfer.token_id,
            transfer.amount,
        )?;

        Ok(Response::new().add_event(Event::withdraw_failed(
            transfer.account_id,
            transfer.token_id,
            transfer.amount,
        )))
    }

    /// List a new asset. Owner only.
    pub fn add_asset(
        &mut self,
        caller_id: &AccountId,
        token_id: TokenId,
        config: AssetConfig,
        now: Timestamp,
    ) -> ContractResult<Response> {
        self.assert_owner(caller_id)?;
        config.validate()?;

        if self.ledger.assets.contains_key(&token_id) {
            return Err(ContractError::AssetAlreadyExists { token_id });
        }

        info!(%token_id, "asset listed");
        self.ledger.assets.insert(token_id, Asset::new(now, config));

        Ok(Response::new())
    }

    /// Replace an asset's configuration. Owner only. Interest accrued under
    /// the old rate model is settled first.
    pub fn update_asset(
        &mut self,
        caller_id: &AccountId,
        token_id: &TokenId,
        config: AssetConfig,
        now: Timestamp,
    ) -> ContractResult<Response> {
        self.assert_owner(caller_id)?;
        config.validate()?;

        let asset = self.ledger.unwrap_asset_mut(token_id)?;
        asset.accrue(now)?;
        asset.config = config;

        Ok(Response::new())
    }

    /// Replace the protocol configuration. Owner only.
    pub fn update_config(
        &mut self,
        caller_id: &AccountId,
        config: Config,
    ) -> ContractResult<Response> {
        self.assert_owner(caller_id)?;
        config.validate()?;

        self.config = config;

        Ok(Response::new())
    }

    /// Park a batch until its prices arrive.
    fn register_pending(&mut self, account_id: &AccountId, actions: Vec<Action>, now: Timestamp) {
        let asset_ids = referenced_asset_ids(&self.ledger, account_id, &actions);

        info!(
            %account_id,
            num_assets = asset_ids.len(),
            "batch needs prices, awaiting oracle delivery",
        );

        let evicted = self.pending_executions.register(
            PendingExecution {
                account_id: account_id.clone(),
                asset_ids,
                actions,
                registered_at: now,
            },
            self.config.max_pending_executions,
        );

        if let Some(evicted) = evicted {
            warn!(
                account_id = %evicted.account_id,
                "pending execution cap reached, evicted the oldest entry",
            );
        }
    }
}
