use {
    anko_math::Uint128,
    anko_types::{AccountId, TokenId, lending::Event},
    serde::{Deserialize, Serialize},
};

/// An asynchronous transfer the host must forward to a token contract. The
/// token contract later reports the outcome through
/// [`on_transfer_success`](crate::Contract::on_transfer_success) or
/// [`on_transfer_failure`](crate::Contract::on_transfer_failure), quoting the
/// request id.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq)]
pub struct TransferRequest {
    pub request_id: u64,
    pub token_id: TokenId,
    pub receiver_id: AccountId,
    pub amount: Uint128,
    pub memo: String,
}

/// The outcome of one successfully processed inbound message: typed events
/// for the host to log, plus outbound transfer requests to dispatch.
#[derive(Serialize, Deserialize, Debug, Clone, Default, PartialEq, Eq)]
pub struct Response {
    pub events: Vec<Event>,
    pub transfers: Vec<TransferRequest>,
}

impl Response {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add_event(mut self, event: Event) -> Self {
        self.events.push(event);
        self
    }

    pub fn add_transfer(mut self, transfer: TransferRequest) -> Self {
        self.transfers.push(transfer);
        self
    }
}
