use {
    crate::core::{Pool, calculate_rates},
    anko_math::{MathResult, Udec128, Uint128},
    anko_types::{Timestamp, lending::{AssetConfig, SECONDS_PER_YEAR}},
    borsh::{BorshDeserialize, BorshSerialize},
    serde::{Deserialize, Serialize},
};

/// The on-contract state of one listed asset.
#[derive(Serialize, Deserialize, BorshSerialize, BorshDeserialize, Debug, Clone, PartialEq, Eq)]
pub struct Asset {
    /// Everything supplied to the pool, including the amounts re-credited by
    /// borrows.
    pub supplied: Pool,
    /// Everything borrowed from the pool.
    pub borrowed: Pool,
    /// Supplied shares minted for protocol fees, claimable by the owner.
    pub pending_fee_shares: Uint128,
    /// When interest was last accrued.
    pub last_update_timestamp: Timestamp,
    pub config: AssetConfig,
}

impl Asset {
    pub fn new(timestamp: Timestamp, config: AssetConfig) -> Self {
        Self {
            supplied: Pool::new(),
            borrowed: Pool::new(),
            pending_fee_shares: Uint128::ZERO,
            last_update_timestamp: timestamp,
            config,
        }
    }

    /// Tokens available for withdrawal or borrowing. The invariant
    /// `supplied.balance >= borrowed.balance` makes this the contract's
    /// actual reserve of the token.
    pub fn available_amount(&self) -> Uint128 {
        self.supplied.balance.saturating_sub(self.borrowed.balance)
    }

    pub fn utilization(&self) -> MathResult<Udec128> {
        if self.supplied.balance.is_zero() {
            return Ok(Udec128::ZERO);
        }

        let utilization =
            Udec128::checked_from_ratio(self.borrowed.balance, self.supplied.balance)?;

        // Interest accrual keeps the two balances in lockstep, so utilization
        // cannot exceed 100%; the cap guards against rounding on the boundary.
        if utilization > Udec128::ONE {
            return Ok(Udec128::ONE);
        }

        Ok(utilization)
    }

    pub fn borrow_apr(&self) -> MathResult<Udec128> {
        let (borrow_rate, _) = calculate_rates(&self.config.interest_rate_model, self.utilization()?)?;
        Ok(borrow_rate)
    }

    pub fn supply_apr(&self) -> MathResult<Udec128> {
        let (_, supply_rate) = calculate_rates(&self.config.interest_rate_model, self.utilization()?)?;
        Ok(supply_rate)
    }

    /// Accrue interest since the last update.
    ///
    /// There is no background timer on a ledger contract; every mutating call
    /// accrues lazily before touching the pools. Borrow interest grows the
    /// borrowed balance; the same amount, less the protocol fee, grows the
    /// supplied balance per-share, while the fee portion is minted as
    /// supplied shares held back for the owner to claim.
    pub fn accrue(&mut self, now: Timestamp) -> MathResult<()> {
        debug_assert!(
            now >= self.last_update_timestamp,
            "last update is in the future: now {now:?}, last update {:?}",
            self.last_update_timestamp,
        );

        let elapsed = now.saturating_sub(self.last_update_timestamp);
        self.last_update_timestamp = now;

        if elapsed.is_zero() || self.borrowed.balance.is_zero() || self.supplied.balance.is_zero() {
            return Ok(());
        }

        let (borrow_rate, _) =
            calculate_rates(&self.config.interest_rate_model, self.utilization()?)?;
        let time_out_of_year = Udec128::checked_from_ratio(
            Uint128::new(elapsed.into_seconds() as u128),
            Uint128::new(SECONDS_PER_YEAR as u128),
        )?;

        let interest = self
            .borrowed
            .balance
            .checked_mul_dec_floor(borrow_rate.checked_mul(time_out_of_year)?)?;
        if interest.is_zero() {
            return Ok(());
        }

        let fee = interest.checked_mul_dec_floor(self.config.interest_rate_model.reserve_factor)?;
        let supplier_interest = interest.checked_sub(fee)?;

        self.borrowed.balance.checked_add_assign(interest)?;
        self.supplied.balance.checked_add_assign(supplier_interest)?;

        // Mint the fee after crediting suppliers, so the fee shares are
        // priced at the post-accrual rate.
        if !fee.is_zero() {
            let fee_shares = self.supplied.amount_to_shares(fee, false)?;
            self.supplied.deposit(fee_shares, fee)?;
            self.pending_fee_shares.checked_add_assign(fee_shares)?;
        }

        Ok(())
    }
}

// ----------------------------------- tests -----------------------------------

#[cfg(test)]
mod tests {
    use {super::*, anko_types::lending::InterestRateModel, anko_math::Uint128, std::str::FromStr};

    fn config() -> AssetConfig {
        AssetConfig {
            decimals: 18,
            collateral_factor: Udec128::new_percent(60),
            borrow_factor: Udec128::ONE,
            liquidation_bonus: Udec128::new_percent(5),
            interest_rate_model: InterestRateModel::default().with_no_reserve_factor(),
            can_deposit: true,
            can_withdraw: true,
            can_borrow: true,
            deposits_are_collateral: true,
        }
    }

    #[test]
    fn accrual_grows_both_sides_in_lockstep() {
        let mut asset = Asset::new(Timestamp::ZERO, config());
        asset.supplied = Pool {
            shares: Uint128::new(10_000),
            balance: Uint128::new(10_000),
        };
        asset.borrowed = Pool {
            shares: Uint128::new(8_000),
            balance: Uint128::new(8_000),
        };

        // Utilization 80% => borrow rate 5%. One year of linear accrual on
        // 8000 is 400.
        asset.accrue(Timestamp::from_days(365)).unwrap();

        assert_eq!(asset.borrowed.balance, Uint128::new(8_400));
        assert_eq!(asset.supplied.balance, Uint128::new(10_400));
        assert_eq!(asset.available_amount(), Uint128::new(2_000));
    }

    #[test]
    fn reserve_factor_mints_fee_shares() {
        let mut asset = Asset::new(Timestamp::ZERO, AssetConfig {
            interest_rate_model: InterestRateModel::default(),
            ..config()
        });
        asset.supplied = Pool {
            shares: Uint128::new(10_000),
            balance: Uint128::new(10_000),
        };
        asset.borrowed = Pool {
            shares: Uint128::new(8_000),
            balance: Uint128::new(8_000),
        };

        asset.accrue(Timestamp::from_days(365)).unwrap();

        // 400 of interest, 2% of which is held back as fees.
        assert_eq!(asset.borrowed.balance, Uint128::new(8_400));
        assert_eq!(asset.supplied.balance, Uint128::new(10_400));
        assert!(!asset.pending_fee_shares.is_zero());

        // The fee shares redeem for (roughly, modulo rounding) the fee.
        let fee_value = asset
            .supplied
            .shares_to_amount(asset.pending_fee_shares, false)
            .unwrap();
        assert_eq!(fee_value, Uint128::new(7));
    }

    #[test]
    fn accrual_is_idempotent_within_a_call() {
        let mut asset = Asset::new(Timestamp::ZERO, config());
        asset.supplied = Pool {
            shares: Uint128::new(10_000),
            balance: Uint128::new(10_000),
        };
        asset.borrowed = Pool {
            shares: Uint128::new(8_000),
            balance: Uint128::new(8_000),
        };

        let now = Timestamp::from_days(365);
        asset.accrue(now).unwrap();
        let snapshot = asset.clone();
        asset.accrue(now).unwrap();
        assert_eq!(asset, snapshot);
    }

    #[test]
    fn utilization_is_capped() {
        let mut asset = Asset::new(Timestamp::ZERO, config());
        asset.supplied = Pool {
            shares: Uint128::new(100),
            balance: Uint128::new(100),
        };
        asset.borrowed = Pool {
            shares: Uint128::new(100),
            balance: Uint128::new(100),
        };
        assert_eq!(asset.utilization().unwrap(), Udec128::ONE);
        assert_eq!(
            asset.borrow_apr().unwrap(),
            Udec128::from_str("0.8").unwrap(),
        );
    }
}
