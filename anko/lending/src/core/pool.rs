//! Shares-based pool accounting.
//!
//! Each side of an asset (supplied, borrowed) is a [`Pool`]: a total balance
//! and the total number of fungible shares laying claim to it. An account's
//! claim is `shares * pool.balance / pool.shares`.
//!
//! ## On rounding errors
//!
//! Incorrect rounding is one of the most exploited vulnerabilities in lending
//! markets. Every conversion here takes an explicit rounding direction, and
//! call sites must pick the direction that favors the pool, never the
//! individual account. The two functions below are the source of truth for
//! these conversions; all other code converts through them.

use {
    anko_math::{MathResult, Uint128},
    borsh::{BorshDeserialize, BorshSerialize},
    serde::{Deserialize, Serialize},
};

#[derive(
    Serialize, Deserialize, BorshSerialize, BorshDeserialize, Debug, Clone, Copy, Default,
    PartialEq, Eq,
)]
pub struct Pool {
    pub shares: Uint128,
    pub balance: Uint128,
}

impl Pool {
    pub fn new() -> Self {
        Self::default()
    }

    /// Convert a token amount to the number of shares laying claim to it.
    /// An empty pool mints 1:1.
    pub fn amount_to_shares(&self, amount: Uint128, round_up: bool) -> MathResult<Uint128> {
        if self.shares.is_zero() || self.balance.is_zero() {
            return Ok(amount);
        }

        if round_up {
            amount.checked_multiply_ratio_ceil(self.shares, self.balance)
        } else {
            amount.checked_multiply_ratio_floor(self.shares, self.balance)
        }
    }

    /// Convert a number of shares to the token amount they lay claim to.
    pub fn shares_to_amount(&self, shares: Uint128, round_up: bool) -> MathResult<Uint128> {
        if self.shares.is_zero() || self.balance.is_zero() {
            return Ok(Uint128::ZERO);
        }

        if round_up {
            shares.checked_multiply_ratio_ceil(self.balance, self.shares)
        } else {
            shares.checked_multiply_ratio_floor(self.balance, self.shares)
        }
    }

    pub fn deposit(&mut self, shares: Uint128, amount: Uint128) -> MathResult<()> {
        self.shares.checked_add_assign(shares)?;
        self.balance.checked_add_assign(amount)?;
        Ok(())
    }

    pub fn withdraw(&mut self, shares: Uint128, amount: Uint128) -> MathResult<()> {
        self.shares.checked_sub_assign(shares)?;
        self.balance.checked_sub_assign(amount)?;

        // Burning the last shares can leave a rounding remainder with no
        // claimant. Zero it so that a later first deposit mints 1:1 again.
        if self.shares.is_zero() {
            self.balance = Uint128::ZERO;
        }

        Ok(())
    }

    pub fn is_empty(&self) -> bool {
        self.shares.is_zero() && self.balance.is_zero()
    }
}

// ----------------------------------- tests -----------------------------------

#[cfg(test)]
mod tests {
    use {super::*, proptest::prelude::*, test_case::test_case};

    fn pool(shares: u128, balance: u128) -> Pool {
        Pool {
            shares: Uint128::new(shares),
            balance: Uint128::new(balance),
        }
    }

    #[test]
    fn empty_pool_mints_one_to_one() {
        let pool = Pool::new();
        assert_eq!(
            pool.amount_to_shares(Uint128::new(100), false).unwrap(),
            Uint128::new(100),
        );
    }

    #[test_case(100, 150, 30, false, 20; "mint rounds down")]
    #[test_case(100, 150, 31, false, 20; "mint rounds down with remainder")]
    #[test_case(100, 150, 31, true, 21; "mint rounds up when asked")]
    fn amount_to_shares(shares: u128, balance: u128, amount: u128, round_up: bool, expect: u128) {
        assert_eq!(
            pool(shares, balance)
                .amount_to_shares(Uint128::new(amount), round_up)
                .unwrap(),
            Uint128::new(expect),
        );
    }

    #[test_case(100, 150, 33, false, 49; "release rounds down")]
    #[test_case(100, 150, 33, true, 50; "charge rounds up")]
    fn shares_to_amount(shares: u128, balance: u128, input: u128, round_up: bool, expect: u128) {
        assert_eq!(
            pool(shares, balance)
                .shares_to_amount(Uint128::new(input), round_up)
                .unwrap(),
            Uint128::new(expect),
        );
    }

    #[test]
    fn burning_last_shares_clears_dust() {
        let mut p = pool(3, 10);
        let amount = p.shares_to_amount(Uint128::new(3), false).unwrap();
        p.withdraw(Uint128::new(3), amount).unwrap();
        assert!(p.is_empty());
    }

    proptest! {
        /// Round-down minting never lets a depositor claim back more than
        /// they put in.
        #[test]
        fn minting_never_creates_value(
            shares in 1u128..1_000_000_000,
            balance in 1u128..1_000_000_000,
            amount in 1u128..1_000_000_000,
        ) {
            let mut p = pool(shares, balance);
            let minted = p.amount_to_shares(Uint128::new(amount), false).unwrap();
            p.deposit(minted, Uint128::new(amount)).unwrap();
            let redeemable = p.shares_to_amount(minted, false).unwrap();
            prop_assert!(redeemable.u128() <= amount);
        }
    }
}
