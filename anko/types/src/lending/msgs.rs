use {
    crate::{AccountId, TokenId},
    anko_math::Uint128,
    borsh::{BorshDeserialize, BorshSerialize},
    serde::{Deserialize, Serialize},
};

/// An asset and how much of it an action should use.
#[derive(
    Serialize, Deserialize, BorshSerialize, BorshDeserialize, Debug, Clone, PartialEq, Eq,
)]
pub struct AssetAmount {
    pub token_id: TokenId,
    /// The exact amount of tokens to use for the action. If `None`, the
    /// maximum available amount is tried, subject to `max_amount`.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub amount: Option<Uint128>,
    /// A cap on the amount used when `amount` is `None`.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub max_amount: Option<Uint128>,
}

impl AssetAmount {
    /// Use exactly `amount` of the token.
    pub fn exact(token_id: TokenId, amount: Uint128) -> Self {
        Self {
            token_id,
            amount: Some(amount),
            max_amount: None,
        }
    }

    /// Use as much as available, up to `max_amount`.
    pub fn up_to(token_id: TokenId, max_amount: Uint128) -> Self {
        Self {
            token_id,
            amount: None,
            max_amount: Some(max_amount),
        }
    }

    /// Use everything available.
    pub fn all(token_id: TokenId) -> Self {
        Self {
            token_id,
            amount: None,
            max_amount: None,
        }
    }
}

/// One step of an action batch. Batches execute strictly in submission order
/// and commit all-or-nothing.
#[derive(
    Serialize, Deserialize, BorshSerialize, BorshDeserialize, Debug, Clone, PartialEq, Eq,
)]
pub enum Action {
    /// Redeem supplied shares and send the tokens back to the caller.
    Withdraw(AssetAmount),
    /// Take on debt. The borrowed amount is credited to the caller's
    /// supplied position; follow with a `Withdraw` to receive tokens.
    Borrow(AssetAmount),
    /// Pay down debt out of the caller's supplied balance of the same token.
    Repay(AssetAmount),
    /// Repay an under-collateralized account's debt and seize a discounted
    /// amount of its collateral.
    Liquidate {
        /// The account being liquidated.
        account_id: AccountId,
        /// The collateral token to seize.
        token_id: TokenId,
        /// The debt to repay on the target's behalf.
        in_assets: AssetAmount,
    },
    /// Flag an existing supplied position as collateral.
    IncreaseCollateral { token_id: TokenId },
    /// Move an asset's accrued protocol fees into the owner's supplied
    /// position. Owner only.
    ClaimProtocolFees { token_id: TokenId },
}

/// The message a token contract forwards along with a transfer-with-callback.
/// A transfer without a message is a plain deposit.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq)]
pub enum TokenReceiverMsg {
    Execute { actions: Vec<Action> },
}

/// The message the oracle forwards along with a price delivery.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq)]
pub enum PriceReceiverMsg {
    Execute { actions: Vec<Action> },
}

// ----------------------------------- tests -----------------------------------

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn batch_wire_shape() {
        let msg = TokenReceiverMsg::Execute {
            actions: vec![
                Action::Borrow(AssetAmount::exact(
                    "dai.token".parse().unwrap(),
                    Uint128::new(200),
                )),
                Action::Withdraw(AssetAmount::all("dai.token".parse().unwrap())),
            ],
        };

        let json = serde_json::to_string(&msg).unwrap();
        assert_eq!(
            json,
            r#"{"Execute":{"actions":[{"Borrow":{"token_id":"dai.token","amount":"200"}},{"Withdraw":{"token_id":"dai.token"}}]}}"#,
        );

        let parsed: TokenReceiverMsg = serde_json::from_str(&json).unwrap();
        assert_eq!(parsed, msg);
    }
}
