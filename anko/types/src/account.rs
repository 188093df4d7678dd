use {
    borsh::{BorshDeserialize, BorshSerialize},
    serde::{de, ser},
    std::{
        fmt::{self, Display},
        str::FromStr,
    },
};

/// Tokens are identified by the account id of the contract that issues them.
pub type TokenId = AccountId;

/// A validated ledger account id: lowercase alphanumeric parts separated by
/// `.`, `_`, or `-`, between 2 and 64 characters.
#[derive(
    BorshSerialize, BorshDeserialize, Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash,
)]
pub struct AccountId(String);

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("invalid account id `{id}`: {reason}")]
pub struct InvalidAccountId {
    pub id: String,
    pub reason: &'static str,
}

impl AccountId {
    /// Create an account id, skipping validation.
    ///
    /// Only for ids that are known valid: constants, test fixtures, ids that
    /// have already passed through `FromStr`.
    pub fn new_unchecked<T>(id: T) -> Self
    where
        T: Into<String>,
    {
        Self(id.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl AsRef<str> for AccountId {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

impl Display for AccountId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl TryFrom<String> for AccountId {
    type Error = InvalidAccountId;

    fn try_from(id: String) -> Result<Self, Self::Error> {
        let invalid = |reason| InvalidAccountId {
            id: id.clone(),
            reason,
        };

        if id.len() < 2 || id.len() > 64 {
            return Err(invalid("length must be between 2 and 64"));
        }

        for part in id.split(['.', '_', '-']) {
            if part.is_empty() {
                return Err(invalid("empty part"));
            }

            if part
                .chars()
                .any(|ch| !ch.is_ascii_lowercase() && !ch.is_ascii_digit())
            {
                return Err(invalid("parts must be lowercase alphanumeric"));
            }
        }

        Ok(Self(id))
    }
}

impl FromStr for AccountId {
    type Err = InvalidAccountId;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::try_from(s.to_string())
    }
}

impl ser::Serialize for AccountId {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: ser::Serializer,
    {
        serializer.serialize_str(&self.0)
    }
}

impl<'de> de::Deserialize<'de> for AccountId {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: de::Deserializer<'de>,
    {
        let id = <String as de::Deserialize>::deserialize(deserializer)?;
        id.try_into().map_err(de::Error::custom)
    }
}

// ----------------------------------- tests -----------------------------------

#[cfg(test)]
mod tests {
    use {super::*, test_case::test_case};

    #[test_case("alice.near"; "dotted")]
    #[test_case("wrap-near_v2"; "mixed separators")]
    #[test_case("a1"; "shortest")]
    fn valid_ids(id: &str) {
        assert!(id.parse::<AccountId>().is_ok());
    }

    #[test_case("a"; "too short")]
    #[test_case("Alice.near"; "uppercase")]
    #[test_case("alice..near"; "empty part")]
    #[test_case("alice!near"; "punctuation")]
    fn invalid_ids(id: &str) {
        assert!(id.parse::<AccountId>().is_err());
    }
}
