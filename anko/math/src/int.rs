use {
    crate::{MathError, MathResult},
    bnum::types::U256,
    borsh::{BorshDeserialize, BorshSerialize},
    serde::{de, ser},
    std::{
        fmt::{self, Display},
        ops::{Add, AddAssign, Sub, SubAssign},
        str::FromStr,
    },
};

/// An unsigned 128-bit integer, used for token amounts and pool shares.
///
/// Arithmetic is checked; products and ratios that need more than 128 bits
/// go through 256-bit intermediates. Serializes to JSON as a decimal string,
/// so that amounts survive JSON parsers that mangle big integers.
#[derive(
    BorshSerialize, BorshDeserialize, Default, Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord,
    Hash,
)]
pub struct Uint128(u128);

impl Uint128 {
    pub const MAX: Self = Self(u128::MAX);
    pub const ONE: Self = Self(1);
    pub const TEN: Self = Self(10);
    pub const ZERO: Self = Self(0);

    pub const fn new(value: u128) -> Self {
        Self(value)
    }

    pub const fn u128(self) -> u128 {
        self.0
    }

    pub const fn is_zero(self) -> bool {
        self.0 == 0
    }

    pub fn checked_add(self, other: Self) -> MathResult<Self> {
        self.0
            .checked_add(other.0)
            .map(Self)
            .ok_or_else(|| MathError::overflow_add(self, other))
    }

    pub fn checked_sub(self, other: Self) -> MathResult<Self> {
        self.0
            .checked_sub(other.0)
            .map(Self)
            .ok_or_else(|| MathError::overflow_sub(self, other))
    }

    pub fn checked_mul(self, other: Self) -> MathResult<Self> {
        self.0
            .checked_mul(other.0)
            .map(Self)
            .ok_or_else(|| MathError::overflow_mul(self, other))
    }

    pub fn checked_div(self, other: Self) -> MathResult<Self> {
        self.0
            .checked_div(other.0)
            .map(Self)
            .ok_or_else(|| MathError::division_by_zero(self))
    }

    pub fn checked_rem(self, other: Self) -> MathResult<Self> {
        self.0
            .checked_rem(other.0)
            .map(Self)
            .ok_or_else(|| MathError::division_by_zero(self))
    }

    pub fn checked_pow(self, exp: u32) -> MathResult<Self> {
        self.0
            .checked_pow(exp)
            .map(Self)
            .ok_or_else(|| MathError::overflow_pow(self, exp))
    }

    pub fn checked_add_assign(&mut self, other: Self) -> MathResult<()> {
        *self = self.checked_add(other)?;
        Ok(())
    }

    pub fn checked_sub_assign(&mut self, other: Self) -> MathResult<()> {
        *self = self.checked_sub(other)?;
        Ok(())
    }

    pub fn saturating_sub(self, other: Self) -> Self {
        Self(self.0.saturating_sub(other.0))
    }

    /// Compute `self * numerator / denominator`, rounding down, with the
    /// product taken in 256 bits so it cannot overflow prematurely.
    pub fn checked_multiply_ratio_floor(
        self,
        numerator: Self,
        denominator: Self,
    ) -> MathResult<Self> {
        if denominator.is_zero() {
            return Err(MathError::division_by_zero(self));
        }

        let numerator = U256::from(self.0) * U256::from(numerator.0);
        let floor = numerator / U256::from(denominator.0);

        u128::try_from(floor)
            .map(Self)
            .map_err(|_| MathError::overflow_conversion::<_, Uint128>(floor))
    }

    /// Compute `self * numerator / denominator`, rounding up.
    pub fn checked_multiply_ratio_ceil(
        self,
        numerator: Self,
        denominator: Self,
    ) -> MathResult<Self> {
        if denominator.is_zero() {
            return Err(MathError::division_by_zero(self));
        }

        let numerator = U256::from(self.0) * U256::from(numerator.0);
        let denominator = U256::from(denominator.0);
        let floor = numerator / denominator;
        let ceil = if numerator % denominator > U256::ZERO {
            floor + U256::ONE
        } else {
            floor
        };

        u128::try_from(ceil)
            .map(Self)
            .map_err(|_| MathError::overflow_conversion::<_, Uint128>(ceil))
    }
}

impl From<u128> for Uint128 {
    fn from(value: u128) -> Self {
        Self(value)
    }
}

impl From<Uint128> for u128 {
    fn from(value: Uint128) -> Self {
        value.0
    }
}

// Std ops panic on overflow, same as the primitive types in debug mode.
// Contract code must use the checked methods; these exist for tests and
// for places where overflow is provably impossible.
impl Add for Uint128 {
    type Output = Self;

    fn add(self, other: Self) -> Self {
        Self(self.0 + other.0)
    }
}

impl Sub for Uint128 {
    type Output = Self;

    fn sub(self, other: Self) -> Self {
        Self(self.0 - other.0)
    }
}

impl AddAssign for Uint128 {
    fn add_assign(&mut self, other: Self) {
        self.0 += other.0;
    }
}

impl SubAssign for Uint128 {
    fn sub_assign(&mut self, other: Self) {
        self.0 -= other.0;
    }
}

impl Display for Uint128 {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl FromStr for Uint128 {
    type Err = MathError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        s.parse::<u128>()
            .map(Self)
            .map_err(|err| MathError::parse_number::<Self, _, _>(s, err))
    }
}

impl ser::Serialize for Uint128 {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: ser::Serializer,
    {
        serializer.serialize_str(&self.to_string())
    }
}

impl<'de> de::Deserialize<'de> for Uint128 {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: de::Deserializer<'de>,
    {
        deserializer.deserialize_str(Uint128Visitor)
    }
}

struct Uint128Visitor;

impl de::Visitor<'_> for Uint128Visitor {
    type Value = Uint128;

    fn expecting(&self, f: &mut fmt::Formatter) -> fmt::Result {
        f.write_str("string-encoded 128-bit unsigned integer")
    }

    fn visit_str<E>(self, v: &str) -> Result<Self::Value, E>
    where
        E: de::Error,
    {
        v.parse().map_err(E::custom)
    }
}

// ----------------------------------- tests -----------------------------------

#[cfg(test)]
mod tests {
    use {super::*, proptest::prelude::*, test_case::test_case};

    #[test]
    fn serializing_to_decimal_string() {
        let value = Uint128::new(123_456_789_000_000_000_000_000);
        assert_eq!(
            serde_json::to_string(&value).unwrap(),
            "\"123456789000000000000000\""
        );
        assert_eq!(
            serde_json::from_str::<Uint128>("\"123456789000000000000000\"").unwrap(),
            value
        );
    }

    #[test_case(100, 1, 3, 33; "rounds down")]
    #[test_case(100, 2, 3, 66; "rounds down again")]
    #[test_case(100, 3, 3, 100; "exact")]
    fn multiply_ratio_floor(base: u128, num: u128, den: u128, expect: u128) {
        assert_eq!(
            Uint128::new(base)
                .checked_multiply_ratio_floor(Uint128::new(num), Uint128::new(den))
                .unwrap(),
            Uint128::new(expect),
        );
    }

    #[test_case(100, 1, 3, 34; "rounds up")]
    #[test_case(100, 3, 3, 100; "exact stays exact")]
    fn multiply_ratio_ceil(base: u128, num: u128, den: u128, expect: u128) {
        assert_eq!(
            Uint128::new(base)
                .checked_multiply_ratio_ceil(Uint128::new(num), Uint128::new(den))
                .unwrap(),
            Uint128::new(expect),
        );
    }

    #[test]
    fn multiply_ratio_survives_128_bit_products() {
        let base = Uint128::new(u128::MAX / 2);
        let out = base
            .checked_multiply_ratio_floor(Uint128::new(2), Uint128::new(2))
            .unwrap();
        assert_eq!(out, base);
    }

    #[test]
    fn division_by_zero_is_an_error() {
        assert!(matches!(
            Uint128::ONE.checked_multiply_ratio_floor(Uint128::ONE, Uint128::ZERO),
            Err(MathError::DivisionByZero { .. }),
        ));
    }

    proptest! {
        /// Ceil is never below floor, and they differ by at most one.
        #[test]
        fn ceil_dominates_floor(base in 0u128..u64::MAX as u128, num in 1u128..1_000_000, den in 1u128..1_000_000) {
            let base = Uint128::new(base);
            let floor = base
                .checked_multiply_ratio_floor(Uint128::new(num), Uint128::new(den))
                .unwrap();
            let ceil = base
                .checked_multiply_ratio_ceil(Uint128::new(num), Uint128::new(den))
                .unwrap();
            prop_assert!(floor <= ceil);
            prop_assert!(ceil.u128() - floor.u128() <= 1);
        }
    }
}
