use {
    crate::{Timestamp, TokenId},
    anko_math::{MathResult, Udec128, Uint128},
    borsh::{BorshDeserialize, BorshSerialize},
    serde::{Deserialize, Serialize},
    std::collections::BTreeMap,
};

/// A price quote for one token, delivered by the oracle.
#[derive(
    Serialize, Deserialize, BorshSerialize, BorshDeserialize, Debug, Clone, Copy, PartialEq, Eq,
)]
pub struct PriceQuote {
    /// The price of one whole token in the oracle's quote currency. E.g. the
    /// price of 1 NEAR, not of 1 yoctoNEAR.
    pub price: Udec128,
    /// The number of decimal places that converts the token's smallest unit
    /// to its whole form. E.g. 1 NEAR is 10^24 yoctoNEAR, so 24.
    pub decimals: u8,
}

impl PriceQuote {
    pub fn new(price: Udec128, decimals: u8) -> Self {
        Self { price, decimals }
    }

    /// The value of a given amount of smallest units:
    /// `price * amount / 10^decimals`.
    pub fn value_of_unit_amount(&self, amount: Uint128) -> MathResult<Udec128> {
        let unit = Uint128::TEN.checked_pow(self.decimals as u32)?;
        amount
            .checked_multiply_ratio_floor(self.price.into_atomics(), unit)
            .map(Udec128::raw)
    }
}

/// One delivery from the oracle: a set of quotes sampled together, stamped
/// with when they were sampled and how fresh the oracle promises they are.
///
/// Quotes are only meaningful within the call that delivers them; they are
/// never persisted.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq)]
pub struct PriceData {
    /// When the quotes were sampled (nanoseconds since UNIX epoch).
    pub timestamp: Timestamp,
    /// The oracle's claimed recency window, in seconds.
    pub recency_duration_sec: u32,
    /// Quotes per token.
    pub prices: BTreeMap<TokenId, PriceQuote>,
}

// ----------------------------------- tests -----------------------------------
