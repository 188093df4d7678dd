use {
    crate::{AccountId, lending::InterestRateModel},
    anko_math::Udec128,
    borsh::{BorshDeserialize, BorshSerialize},
    serde::{Deserialize, Serialize},
};

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("invalid config: {reason}")]
pub struct InvalidConfig {
    pub reason: &'static str,
}

impl InvalidConfig {
    fn new(reason: &'static str) -> Self {
        Self { reason }
    }
}

/// Global protocol configuration.
#[derive(Serialize, Deserialize, BorshSerialize, BorshDeserialize, Debug, Clone, PartialEq, Eq)]
pub struct Config {
    /// The account allowed to update configuration, list assets, and claim
    /// protocol fees.
    pub owner_id: AccountId,
    /// The only account whose price deliveries are accepted.
    pub oracle_id: AccountId,
    /// The largest recency window the oracle may claim, in seconds.
    pub maximum_recency_duration_sec: u32,
    /// How old a price delivery may be before it is rejected, in seconds.
    pub maximum_staleness_duration_sec: u32,
    /// Upper bound on `supplied.len() + borrowed.len()` per account.
    pub max_num_assets: u32,
    /// Upper bound on pending price-gated batches per account; the oldest
    /// is evicted when exceeded.
    pub max_pending_executions: u32,
}

impl Config {
    pub fn validate(&self) -> Result<(), InvalidConfig> {
        if self.max_num_assets == 0 {
            return Err(InvalidConfig::new("max_num_assets must be positive"));
        }

        if self.max_pending_executions == 0 {
            return Err(InvalidConfig::new("max_pending_executions must be positive"));
        }

        if self.maximum_recency_duration_sec == 0 {
            return Err(InvalidConfig::new(
                "maximum_recency_duration_sec must be positive",
            ));
        }

        Ok(())
    }
}

/// Per-asset configuration.
#[derive(Serialize, Deserialize, BorshSerialize, BorshDeserialize, Debug, Clone, PartialEq, Eq)]
pub struct AssetConfig {
    /// The number of decimal places of the token's smallest unit.
    pub decimals: u8,
    /// Weight applied to this asset's value when counted as collateral.
    /// Must be in (0, 1].
    pub collateral_factor: Udec128,
    /// Weight dividing this asset's value when counted as debt.
    /// Must be in (0, 1].
    pub borrow_factor: Udec128,
    /// Extra collateral, as a fraction of the repaid value, granted to a
    /// liquidator. Must be in [0, 1).
    pub liquidation_bonus: Udec128,
    pub interest_rate_model: InterestRateModel,
    pub can_deposit: bool,
    pub can_withdraw: bool,
    pub can_borrow: bool,
    /// Whether deposits count as collateral immediately, or only after an
    /// explicit `IncreaseCollateral` action.
    pub deposits_are_collateral: bool,
}

impl AssetConfig {
    pub fn validate(&self) -> Result<(), InvalidConfig> {
        if self.collateral_factor.is_zero() || self.collateral_factor > Udec128::ONE {
            return Err(InvalidConfig::new("collateral_factor must be in (0, 1]"));
        }

        if self.borrow_factor.is_zero() || self.borrow_factor > Udec128::ONE {
            return Err(InvalidConfig::new("borrow_factor must be in (0, 1]"));
        }

        if self.liquidation_bonus >= Udec128::ONE {
            return Err(InvalidConfig::new("liquidation_bonus must be in [0, 1)"));
        }

        Ok(())
    }
}

// ----------------------------------- tests -----------------------------------

#[cfg(test)]
mod tests {
    use super::*;

    fn asset_config() -> AssetConfig {
        AssetConfig {
            decimals: 24,
            collateral_factor: Udec128::new_percent(60),
            borrow_factor: Udec128::ONE,
            liquidation_bonus: Udec128::new_percent(5),
            interest_rate_model: InterestRateModel::default(),
            can_deposit: true,
            can_withdraw: true,
            can_borrow: true,
            deposits_are_collateral: true,
        }
    }

    #[test]
    fn factors_are_bounded() {
        let mut config = asset_config();
        config.collateral_factor = Udec128::ZERO;
        assert!(config.validate().is_err());

        let mut config = asset_config();
        config.borrow_factor = Udec128::new_percent(101);
        assert!(config.validate().is_err());

        let mut config = asset_config();
        config.liquidation_bonus = Udec128::ONE;
        assert!(config.validate().is_err());

        assert!(asset_config().validate().is_ok());
    }
}
