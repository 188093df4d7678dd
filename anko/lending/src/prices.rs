use {
    crate::{ContractError, ContractResult},
    anko_types::{PriceData, PriceQuote, Timestamp, TokenId, lending::Config},
    std::collections::BTreeMap,
};

/// The per-cycle price table.
///
/// Built from a single validated oracle delivery at the start of a cycle and
/// dropped at its end; quotes are never carried across cycles. Price-free
/// cycles use [`Prices::none`]; any lookup then fails `MissingPrice`, which
/// rolls the acting batch back.
#[derive(Debug, Clone, Default)]
pub struct Prices(BTreeMap<TokenId, PriceQuote>);

impl Prices {
    /// An empty table, for cycles that were not opened by a price delivery.
    pub fn none() -> Self {
        Self::default()
    }

    pub fn get(&self, token_id: &TokenId) -> ContractResult<&PriceQuote> {
        self.0
            .get(token_id)
            .ok_or_else(|| ContractError::MissingPrice {
                token_id: token_id.clone(),
            })
    }

    pub fn contains(&self, token_id: &TokenId) -> bool {
        self.0.contains_key(token_id)
    }
}

impl From<PriceData> for Prices {
    fn from(data: PriceData) -> Self {
        Self(data.prices)
    }
}

/// Validate an oracle delivery against the configured staleness bounds.
///
/// The delivery carries the sampling time and the oracle's claimed recency
/// window; both are checked against the clock of the cycle that received it.
pub fn validate_price_data(
    config: &Config,
    data: &PriceData,
    now: Timestamp,
) -> ContractResult<()> {
    if data.recency_duration_sec > config.maximum_recency_duration_sec {
        return Err(ContractError::StalePrice {
            reason: "recency duration is larger than the allowed maximum",
        });
    }

    if data.timestamp > now {
        return Err(ContractError::StalePrice {
            reason: "price data timestamp is in the future",
        });
    }

    let age = now.saturating_sub(data.timestamp);
    if age > Timestamp::from_seconds(config.maximum_staleness_duration_sec as u64) {
        return Err(ContractError::StalePrice {
            reason: "price data timestamp is too old",
        });
    }

    Ok(())
}

// ----------------------------------- tests -----------------------------------

#[cfg(test)]
mod tests {
    use {super::*, std::collections::BTreeMap};

    fn config() -> Config {
        Config {
            owner_id: "owner.near".parse().unwrap(),
            oracle_id: "oracle.near".parse().unwrap(),
            maximum_recency_duration_sec: 90,
            maximum_staleness_duration_sec: 15,
            max_num_assets: 8,
            max_pending_executions: 4,
        }
    }

    fn data(timestamp: Timestamp, recency_duration_sec: u32) -> PriceData {
        PriceData {
            timestamp,
            recency_duration_sec,
            prices: BTreeMap::new(),
        }
    }

    #[test]
    fn fresh_data_passes() {
        let now = Timestamp::from_seconds(1_000);
        assert!(validate_price_data(&config(), &data(now, 90), now).is_ok());
    }

    #[test]
    fn stale_data_is_rejected() {
        let now = Timestamp::from_seconds(1_000);

        let too_old = data(Timestamp::from_seconds(984), 90);
        assert!(matches!(
            validate_price_data(&config(), &too_old, now),
            Err(ContractError::StalePrice { .. }),
        ));

        let from_the_future = data(Timestamp::from_seconds(1_001), 90);
        assert!(matches!(
            validate_price_data(&config(), &from_the_future, now),
            Err(ContractError::StalePrice { .. }),
        ));

        let too_wide = data(now, 91);
        assert!(matches!(
            validate_price_data(&config(), &too_wide, now),
            Err(ContractError::StalePrice { .. }),
        ));
    }

    #[test]
    fn missing_quote_fails() {
        let prices = Prices::none();
        let err = prices.get(&"dai.token".parse().unwrap()).unwrap_err();
        assert!(matches!(err, ContractError::MissingPrice { .. }));
    }
}
