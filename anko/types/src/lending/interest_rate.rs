use {
    anko_math::Udec128,
    borsh::{BorshDeserialize, BorshSerialize},
    serde::{Deserialize, Serialize},
};

/// Seconds in a year, assuming 365 days.
pub const SECONDS_PER_YEAR: u64 = 31536000;

/// Dual slope interest rate model, consisting of two linear functions.
///
/// This is based on Aave's interest rate model. The first slope applies when
/// utilization is below the optimal utilization rate, the second above it.
#[derive(
    Serialize, Deserialize, BorshSerialize, BorshDeserialize, Debug, Clone, Copy, PartialEq, Eq,
)]
pub struct InterestRateModel {
    /// The interest rate applied when utilization is 0%.
    pub base_rate: Udec128,
    /// The utilization rate after which the second slope applies.
    pub optimal_utilization: Udec128,
    /// The slope applied below the optimal utilization rate.
    pub first_slope: Udec128,
    /// The slope applied above the optimal utilization rate.
    pub second_slope: Udec128,
    /// The portion of borrow interest retained as protocol fees.
    pub reserve_factor: Udec128,
}

impl Default for InterestRateModel {
    /// Default interest rate model used for testing.
    fn default() -> Self {
        Self {
            base_rate: Udec128::new_percent(1),
            optimal_utilization: Udec128::new_percent(80),
            first_slope: Udec128::new_percent(4),
            second_slope: Udec128::new_percent(75),
            reserve_factor: Udec128::new_percent(2),
        }
    }
}

impl InterestRateModel {
    /// A model with zero reserve factor, so that all interest goes to
    /// suppliers. Used by tests that assert exact balances.
    pub fn with_no_reserve_factor(self) -> Self {
        Self {
            reserve_factor: Udec128::ZERO,
            ..self
        }
    }
}
