use {
    crate::{MathError, MathResult, Uint128},
    borsh::{BorshDeserialize, BorshSerialize},
    serde::{de, ser},
    std::{
        fmt::{self, Display, Write},
        ops::{Add, Sub},
        str::FromStr,
    },
};

/// An unsigned fixed-point decimal with 18 decimal places, used for prices,
/// interest rates, and risk factors.
#[derive(
    BorshSerialize, BorshDeserialize, Default, Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord,
)]
pub struct Udec128(Uint128);

impl Udec128 {
    pub const DECIMAL_PLACES: u32 = 18;
    pub const ONE: Self = Self(Uint128::new(10_u128.pow(Self::DECIMAL_PLACES)));
    /// The denominator that scales raw atomics to whole units.
    pub const PRECISION: Uint128 = Uint128::new(10_u128.pow(Self::DECIMAL_PLACES));
    pub const ZERO: Self = Self(Uint128::ZERO);

    /// Create a [`Udec128`] from a whole number.
    pub const fn new(whole: u128) -> Self {
        Self(Uint128::new(whole * 10_u128.pow(Self::DECIMAL_PLACES)))
    }

    /// Create a [`Udec128`] from a percentage: `new_percent(75)` is 0.75.
    pub const fn new_percent(percent: u128) -> Self {
        Self(Uint128::new(percent * 10_u128.pow(Self::DECIMAL_PLACES - 2)))
    }

    /// Create a [`Udec128`] _without_ scaling: the input is raw atomics.
    pub const fn raw(atomics: Uint128) -> Self {
        Self(atomics)
    }

    pub const fn into_atomics(self) -> Uint128 {
        self.0
    }

    pub const fn is_zero(self) -> bool {
        self.0.is_zero()
    }

    pub fn checked_from_ratio(numerator: Uint128, denominator: Uint128) -> MathResult<Self> {
        numerator
            .checked_multiply_ratio_floor(Self::PRECISION, denominator)
            .map(Self)
    }

    pub fn checked_add(self, other: Self) -> MathResult<Self> {
        self.0.checked_add(other.0).map(Self)
    }

    pub fn checked_sub(self, other: Self) -> MathResult<Self> {
        self.0.checked_sub(other.0).map(Self)
    }

    pub fn checked_mul(self, other: Self) -> MathResult<Self> {
        self.0
            .checked_multiply_ratio_floor(other.0, Self::PRECISION)
            .map(Self)
    }

    pub fn checked_div(self, other: Self) -> MathResult<Self> {
        self.0
            .checked_multiply_ratio_floor(Self::PRECISION, other.0)
            .map(Self)
    }

    pub fn checked_add_assign(&mut self, other: Self) -> MathResult<()> {
        *self = self.checked_add(other)?;
        Ok(())
    }
}

impl Uint128 {
    /// Multiply an amount by a decimal factor, rounding down.
    pub fn checked_mul_dec_floor(self, dec: Udec128) -> MathResult<Self> {
        self.checked_multiply_ratio_floor(dec.0, Udec128::PRECISION)
    }

    /// Multiply an amount by a decimal factor, rounding up.
    pub fn checked_mul_dec_ceil(self, dec: Udec128) -> MathResult<Self> {
        self.checked_multiply_ratio_ceil(dec.0, Udec128::PRECISION)
    }

    /// Divide an amount by a decimal factor, rounding down.
    pub fn checked_div_dec_floor(self, dec: Udec128) -> MathResult<Self> {
        self.checked_multiply_ratio_floor(Udec128::PRECISION, dec.0)
    }

    /// Divide an amount by a decimal factor, rounding up.
    pub fn checked_div_dec_ceil(self, dec: Udec128) -> MathResult<Self> {
        self.checked_multiply_ratio_ceil(Udec128::PRECISION, dec.0)
    }
}

impl Add for Udec128 {
    type Output = Self;

    fn add(self, other: Self) -> Self {
        Self(self.0 + other.0)
    }
}

impl Sub for Udec128 {
    type Output = Self;

    fn sub(self, other: Self) -> Self {
        Self(self.0 - other.0)
    }
}

impl Display for Udec128 {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let whole = self.0.u128() / Self::PRECISION.u128();
        let fractional = self.0.u128() % Self::PRECISION.u128();

        if fractional == 0 {
            write!(f, "{whole}")
        } else {
            let fractional = format!(
                "{fractional:0>padding$}",
                padding = Self::DECIMAL_PLACES as usize
            );
            write!(f, "{whole}")?;
            f.write_char('.')?;
            f.write_str(fractional.trim_end_matches('0'))
        }
    }
}

impl FromStr for Udec128 {
    type Err = MathError;

    /// Parse a decimal string: "1.23", "1", "000012", "1.123000000".
    /// Never rounds; more than 18 fractional digits is an error.
    fn from_str(input: &str) -> Result<Self, Self::Err> {
        let mut parts = input.split('.');

        let mut atomics = parts
            .next()
            .unwrap() // split always returns at least one element
            .parse::<Uint128>()
            .map_err(|_| MathError::parse_number::<Self, _, _>(input, "error parsing whole"))?
            .checked_mul(Self::PRECISION)
            .map_err(|_| MathError::parse_number::<Self, _, _>(input, "value too big"))?;

        if let Some(fractional_part) = parts.next() {
            let fractional = fractional_part.parse::<Uint128>().map_err(|_| {
                MathError::parse_number::<Self, _, _>(input, "error parsing fractional")
            })?;

            let exp = Self::DECIMAL_PLACES
                .checked_sub(fractional_part.len() as u32)
                .ok_or_else(|| {
                    MathError::parse_number::<Self, _, _>(
                        input,
                        format!(
                            "cannot parse more than {} fractional digits",
                            Self::DECIMAL_PLACES
                        ),
                    )
                })?;

            // Can't overflow: fractional < 10^18 and the factor <= 10^18.
            let fractional = fractional.checked_mul(Uint128::TEN.checked_pow(exp)?).unwrap();

            atomics = atomics
                .checked_add(fractional)
                .map_err(|_| MathError::parse_number::<Self, _, _>(input, "value too big"))?;
        }

        if parts.next().is_some() {
            return Err(MathError::parse_number::<Self, _, _>(
                input,
                "unexpected number of dots",
            ));
        }

        Ok(Self(atomics))
    }
}

impl ser::Serialize for Udec128 {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: ser::Serializer,
    {
        serializer.serialize_str(&self.to_string())
    }
}

impl<'de> de::Deserialize<'de> for Udec128 {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: de::Deserializer<'de>,
    {
        deserializer.deserialize_str(Udec128Visitor)
    }
}

struct Udec128Visitor;

impl de::Visitor<'_> for Udec128Visitor {
    type Value = Udec128;

    fn expecting(&self, f: &mut fmt::Formatter) -> fmt::Result {
        f.write_str("string-encoded decimal")
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
    use {super::*, test_case::test_case};

    #[test_case("1.23", 1_230_000_000_000_000_000; "whole and fraction")]
    #[test_case("1", 1_000_000_000_000_000_000; "whole only")]
    #[test_case("000012", 12_000_000_000_000_000_000; "leading zeros")]
    #[test_case("1.123000000", 1_123_000_000_000_000_000; "trailing zeros")]
    #[test_case("0.000000000000000001", 1; "one atomic")]
    fn parsing(input: &str, atomics: u128) {
        assert_eq!(
            input.parse::<Udec128>().unwrap(),
            Udec128::raw(Uint128::new(atomics)),
        );
    }

    #[test_case(""; "empty")]
    #[test_case(".23"; "missing whole")]
    #[test_case("1.2.3"; "two dots")]
    #[test_case("1.1234567890123456789"; "too many fractional digits")]
    fn parsing_fails(input: &str) {
        assert!(input.parse::<Udec128>().is_err());
    }

    #[test]
    fn display_trims_trailing_zeros() {
        assert_eq!(Udec128::new_percent(50).to_string(), "0.5");
        assert_eq!(Udec128::new(7).to_string(), "7");
    }

    #[test]
    fn mul_dec_rounding_directions() {
        let amount = Uint128::new(100);
        let two_thirds = Udec128::checked_from_ratio(Uint128::new(2), Uint128::new(3)).unwrap();
        assert_eq!(amount.checked_mul_dec_floor(two_thirds).unwrap(), Uint128::new(66));
        assert_eq!(amount.checked_mul_dec_ceil(two_thirds).unwrap(), Uint128::new(67));
        assert_eq!(amount.checked_div_dec_floor(two_thirds).unwrap(), Uint128::new(150));
    }

    #[test]
    fn percent_rates_compose() {
        let base = Udec128::new_percent(1);
        let slope = Udec128::new_percent(4);
        let sum = base.checked_add(slope).unwrap();
        assert_eq!(sum, Udec128::new_percent(5));
        assert_eq!(sum.to_string(), "0.05");
    }
}
