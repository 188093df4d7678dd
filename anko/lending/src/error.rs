use {
    anko_math::{MathError, Uint128},
    anko_types::{AccountId, TokenId, lending::InvalidConfig},
};

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ContractError {
    #[error(transparent)]
    Math(#[from] MathError),

    #[error(transparent)]
    InvalidConfig(#[from] InvalidConfig),

    #[error("amount resolves to zero smallest units")]
    ZeroAmount,

    #[error("insufficient liquidity: requested {requested} of `{token_id}`, available {available}")]
    InsufficientLiquidity {
        token_id: TokenId,
        requested: Uint128,
        available: Uint128,
    },

    #[error("account `{account_id}` holds no position in `{token_id}`")]
    NoSuchPosition {
        account_id: AccountId,
        token_id: TokenId,
    },

    #[error("account `{account_id}` would be under-collateralized")]
    Undercollateralized { account_id: AccountId },

    #[error("account `{account_id}` is not liquidatable")]
    NotLiquidatable { account_id: AccountId },

    #[error("liquidation too large: account `{account_id}` must remain at risk and its health must improve")]
    LiquidationTooLarge { account_id: AccountId },

    #[error("cannot liquidate your own account")]
    SelfLiquidation,

    #[error("no price for `{token_id}` in this cycle's quote set")]
    MissingPrice { token_id: TokenId },

    #[error("stale price data: {reason}")]
    StalePrice { reason: &'static str },

    #[error("unknown asset `{token_id}`")]
    UnknownAsset { token_id: TokenId },

    #[error("transfer of {amount} `{token_id}` rejected by the token contract")]
    TransferRejected {
        token_id: TokenId,
        amount: Uint128,
    },

    #[error("no pending execution matches account `{account_id}` and the delivered asset set")]
    NoPendingExecution { account_id: AccountId },

    #[error("no outstanding transfer with request id {request_id}")]
    UnknownRequest { request_id: u64 },

    #[error("account `{account_id}` is not registered")]
    AccountNotRegistered { account_id: AccountId },

    #[error("unauthorized: this method is restricted to `{expected}`")]
    Unauthorized { expected: AccountId },

    #[error("account `{account_id}` would exceed {max_num_assets} positions")]
    TooManyPositions {
        account_id: AccountId,
        max_num_assets: u32,
    },

    #[error("asset `{token_id}` is already listed")]
    AssetAlreadyExists { token_id: TokenId },

    #[error("{action} is not enabled for asset `{token_id}`")]
    ActionDisabled {
        token_id: TokenId,
        action: &'static str,
    },

    #[error("not enough supplied balance of `{token_id}` to cover the requested amount")]
    NotEnoughSupplied { token_id: TokenId },

    #[error("cannot parse the attached message: {reason}")]
    InvalidMessage { reason: String },
}

pub type ContractResult<T> = Result<T, ContractError>;
