use {
    anko_lending::{Contract, Response, TransferRequest, referenced_asset_ids},
    anko_math::Uint128,
    anko_types::{
        AccountId, PriceData, PriceQuote, Timestamp, TokenId,
        lending::{
            AccountView, Action, AssetAmount, AssetConfig, AssetDetailedView, Config,
            PriceReceiverMsg, TokenReceiverMsg,
        },
    },
    anyhow::{Context, anyhow, bail},
    std::collections::{BTreeMap, BTreeSet, VecDeque},
};

/// A mock fungible token contract: balances per account, plus a freeze list
/// to make it reject transfers to chosen receivers, which is how tests
/// exercise the compensation path.
#[derive(Debug, Default)]
pub struct TokenContract {
    pub decimals: u8,
    pub balances: BTreeMap<AccountId, Uint128>,
    pub frozen: BTreeSet<AccountId>,
}

impl TokenContract {
    fn balance_of(&self, account_id: &AccountId) -> Uint128 {
        self.balances.get(account_id).copied().unwrap_or(Uint128::ZERO)
    }

    fn credit(&mut self, account_id: &AccountId, amount: Uint128) {
        let balance = self.balances.entry(account_id.clone()).or_default();
        *balance = balance.checked_add(amount).unwrap();
    }

    fn debit(&mut self, account_id: &AccountId, amount: Uint128) -> anyhow::Result<()> {
        let balance = self.balances.entry(account_id.clone()).or_default();
        *balance = balance
            .checked_sub(amount)
            .map_err(|_| anyhow!("`{account_id}` doesn't have enough balance"))?;
        Ok(())
    }
}

/// The outcome of routing one outbound transfer request to its token
/// contract and feeding the callback to the lending contract.
#[derive(Debug)]
pub struct Delivery {
    pub request: TransferRequest,
    /// Whether the token contract accepted the transfer.
    pub delivered: bool,
    /// The lending contract's response to the callback.
    pub response: Response,
}

/// A simulated host: the lending contract, the token contracts it talks to,
/// an oracle, and a clock. Outbound transfers are queued and only reach the
/// token contracts when a test lets them. The gap between a withdraw and
/// its callback is exactly where interleaving bugs live, so the suite makes
/// that gap explicit.
pub struct TestSuite {
    pub contract: Contract,
    pub contract_id: AccountId,
    pub tokens: BTreeMap<TokenId, TokenContract>,
    pub outbound: VecDeque<TransferRequest>,
    pub time: Timestamp,
}

impl TestSuite {
    pub fn new(config: Config) -> Self {
        Self {
            contract: Contract::new(config).unwrap(),
            contract_id: "lend.anko".parse().unwrap(),
            tokens: BTreeMap::new(),
            outbound: VecDeque::new(),
            time: Timestamp::from_seconds(1_000_000),
        }
    }

    pub fn owner_id(&self) -> AccountId {
        self.contract.config().owner_id.clone()
    }

    pub fn oracle_id(&self) -> AccountId {
        self.contract.config().oracle_id.clone()
    }

    pub fn skip_time(&mut self, seconds: u64) {
        self.time += Timestamp::from_seconds(seconds);
    }

    // ------------------------------ token side -------------------------------

    /// Deploy a mock token and list it as an asset in one go.
    pub fn list_asset(&mut self, token_id: &TokenId, config: AssetConfig) {
        self.tokens.insert(token_id.clone(), TokenContract {
            decimals: config.decimals,
            balances: BTreeMap::new(),
            frozen: BTreeSet::new(),
        });

        let owner = self.owner_id();
        self.contract
            .add_asset(&owner, token_id.clone(), config, self.time)
            .unwrap();
    }

    pub fn mint(&mut self, token_id: &TokenId, account_id: &AccountId, amount: Uint128) {
        self.tokens
            .get_mut(token_id)
            .expect("token not deployed")
            .credit(account_id, amount);
    }

    pub fn balance_of(&self, token_id: &TokenId, account_id: &AccountId) -> Uint128 {
        self.tokens
            .get(token_id)
            .expect("token not deployed")
            .balance_of(account_id)
    }

    /// Make the token contract reject transfers to this account.
    pub fn freeze(&mut self, token_id: &TokenId, account_id: &AccountId) {
        self.tokens
            .get_mut(token_id)
            .expect("token not deployed")
            .frozen
            .insert(account_id.clone());
    }

    // ---------------------------- inbound messages ---------------------------

    /// A transfer-with-callback into the lending contract. Any contract
    /// error refunds the full amount, exactly as a real token contract
    /// refunds the unused part.
    pub fn transfer_call(
        &mut self,
        sender_id: &AccountId,
        token_id: &TokenId,
        amount: Uint128,
        msg: Option<TokenReceiverMsg>,
    ) -> anyhow::Result<Response> {
        let contract_id = self.contract_id.clone();
        let token = self
            .tokens
            .get_mut(token_id)
            .with_context(|| format!("token `{token_id}` not deployed"))?;
        token.debit(sender_id, amount)?;
        token.credit(&contract_id, amount);

        // The message crosses the wire as JSON in the transfer memo.
        let msg = msg.map(|msg| serde_json::to_string(&msg).unwrap());

        match self
            .contract
            .receive_transfer(sender_id, token_id, amount, msg.as_deref(), self.time)
        {
            Ok((unused, response)) => {
                if !unused.is_zero() {
                    let token = self.tokens.get_mut(token_id).unwrap();
                    token.debit(&contract_id, unused)?;
                    token.credit(sender_id, unused);
                }
                self.outbound.extend(response.transfers.iter().cloned());
                Ok(response)
            },
            Err(err) => {
                let token = self.tokens.get_mut(token_id).unwrap();
                token.debit(&contract_id, amount)?;
                token.credit(sender_id, amount);
                Err(err.into())
            },
        }
    }

    /// A plain deposit.
    pub fn supply(
        &mut self,
        sender_id: &AccountId,
        token_id: &TokenId,
        amount: Uint128,
    ) -> anyhow::Result<Response> {
        self.transfer_call(sender_id, token_id, amount, None)
    }

    /// A direct action batch, no transfer attached.
    pub fn execute(
        &mut self,
        sender_id: &AccountId,
        actions: Vec<Action>,
    ) -> anyhow::Result<Response> {
        let response = self.contract.execute(sender_id, actions, self.time)?;
        self.outbound.extend(response.transfers.iter().cloned());
        Ok(response)
    }

    /// Submit a price-gated batch, then play the oracle delivering quotes
    /// for exactly the asset set the batch parked with.
    pub fn execute_with_prices(
        &mut self,
        sender_id: &AccountId,
        actions: Vec<Action>,
        data: PriceData,
    ) -> anyhow::Result<Response> {
        let asset_ids = referenced_asset_ids(self.contract.ledger(), sender_id, &actions);
        self.contract.execute(sender_id, actions.clone(), self.time)?;
        self.deliver_prices(sender_id, &asset_ids, actions, data)
    }

    /// The oracle's price delivery call.
    pub fn deliver_prices(
        &mut self,
        account_id: &AccountId,
        asset_ids: &BTreeSet<TokenId>,
        actions: Vec<Action>,
        data: PriceData,
    ) -> anyhow::Result<Response> {
        let oracle = self.oracle_id();
        let msg = serde_json::to_string(&PriceReceiverMsg::Execute { actions }).unwrap();
        let response = self.contract.receive_prices(
            &oracle,
            account_id,
            asset_ids,
            data,
            &msg,
            self.time,
        )?;
        self.outbound.extend(response.transfers.iter().cloned());
        Ok(response)
    }

    // --------------------------- outbound transfers --------------------------

    /// Route the oldest queued outbound transfer to its token contract and
    /// feed the resulting callback to the lending contract.
    pub fn deliver_next(&mut self) -> anyhow::Result<Delivery> {
        let request = self
            .outbound
            .pop_front()
            .context("no outbound transfer queued")?;

        let contract_id = self.contract_id.clone();
        let token = self
            .tokens
            .get_mut(&request.token_id)
            .context("token not deployed")?;

        let delivered = !token.frozen.contains(&request.receiver_id);
        let response = if delivered {
            token.debit(&contract_id, request.amount)?;
            token.credit(&request.receiver_id, request.amount);
            self.contract.on_transfer_success(request.request_id)?
        } else {
            self.contract
                .on_transfer_failure(request.request_id, self.time)?
        };

        Ok(Delivery {
            request,
            delivered,
            response,
        })
    }

    /// Deliver every queued outbound transfer; fail if any of them bounced.
    pub fn deliver_all(&mut self) -> anyhow::Result<Vec<Delivery>> {
        let mut deliveries = Vec::new();
        while !self.outbound.is_empty() {
            let delivery = self.deliver_next()?;
            if !delivery.delivered {
                bail!(anko_lending::ContractError::TransferRejected {
                    token_id: delivery.request.token_id.clone(),
                    amount: delivery.request.amount,
                });
            }
            deliveries.push(delivery);
        }
        Ok(deliveries)
    }

    // ------------------------------- scenarios -------------------------------

    /// Borrow against existing collateral; the proceeds stay supplied.
    pub fn borrow(
        &mut self,
        sender_id: &AccountId,
        token_id: &TokenId,
        data: PriceData,
        amount: Uint128,
    ) -> anyhow::Result<Response> {
        self.execute_with_prices(
            sender_id,
            vec![Action::Borrow(AssetAmount::exact(token_id.clone(), amount))],
            data,
        )
    }

    /// Borrow and pay the proceeds out in the same batch.
    pub fn borrow_and_withdraw(
        &mut self,
        sender_id: &AccountId,
        token_id: &TokenId,
        data: PriceData,
        amount: Uint128,
    ) -> anyhow::Result<Response> {
        let response = self.execute_with_prices(
            sender_id,
            vec![
                Action::Borrow(AssetAmount::exact(token_id.clone(), amount)),
                Action::Withdraw(AssetAmount::exact(token_id.clone(), amount)),
            ],
            data,
        )?;
        self.deliver_all()?;
        Ok(response)
    }

    /// Withdraw supplied balance (everything, when `amount` is `None`) and
    /// deliver the payout.
    pub fn withdraw(
        &mut self,
        sender_id: &AccountId,
        token_id: &TokenId,
        amount: Option<Uint128>,
    ) -> anyhow::Result<Response> {
        let asset_amount = match amount {
            Some(amount) => AssetAmount::exact(token_id.clone(), amount),
            None => AssetAmount::all(token_id.clone()),
        };
        let response = self.execute(sender_id, vec![Action::Withdraw(asset_amount)])?;
        self.deliver_all()?;
        Ok(response)
    }

    /// Liquidate `target_id`, repaying its debt out of the caller's supplied
    /// balance.
    pub fn liquidate(
        &mut self,
        sender_id: &AccountId,
        target_id: &AccountId,
        data: PriceData,
        collateral_token: &TokenId,
        debt: AssetAmount,
    ) -> anyhow::Result<Response> {
        self.execute_with_prices(
            sender_id,
            vec![Action::Liquidate {
                account_id: target_id.clone(),
                token_id: collateral_token.clone(),
                in_assets: debt,
            }],
            data,
        )
    }

    // -------------------------------- queries --------------------------------

    pub fn get_account(&self, account_id: &AccountId) -> AccountView {
        self.contract.get_account(account_id, self.time).unwrap()
    }

    pub fn get_asset(&self, token_id: &TokenId) -> AssetDetailedView {
        self.contract
            .get_asset(token_id, self.time)
            .unwrap()
            .expect("asset not listed")
    }

    /// Build a price delivery from humanized prices, stamped with the
    /// current time. Decimals come from the deployed token mocks.
    pub fn price_data(&self, quotes: &[(&TokenId, &str)]) -> PriceData {
        let prices = quotes
            .iter()
            .map(|(token_id, price)| {
                let decimals = self
                    .tokens
                    .get(*token_id)
                    .expect("token not deployed")
                    .decimals;
                ((*token_id).clone(), PriceQuote {
                    price: price.parse().unwrap(),
                    decimals,
                })
            })
            .collect();

        PriceData {
            timestamp: self.time,
            recency_duration_sec: 90,
            prices,
        }
    }
}
