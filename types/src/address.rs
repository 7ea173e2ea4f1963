//! Account address type with `0x` prefix.

use crate::error::TypesError;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// A participant's account address: `0x` followed by 40 lowercase hex digits.
///
/// Addresses are the primary key of every ledger record. They are ordered so
/// that ledger maps iterate deterministically (snapshot hashing relies on it).
#[derive(Clone, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct AccountAddress(String);

impl AccountAddress {
    /// The standard prefix for all account addresses.
    pub const PREFIX: &'static str = "0x";

    /// Number of raw bytes behind an address.
    pub const BYTE_LEN: usize = 20;

    /// Parse and normalise (lowercase) an address string.
    pub fn parse(raw: &str) -> Result<Self, TypesError> {
        let body = raw
            .strip_prefix(Self::PREFIX)
            .ok_or_else(|| TypesError::InvalidAddress(format!("{raw}: missing 0x prefix")))?;
        if body.len() != Self::BYTE_LEN * 2 {
            return Err(TypesError::InvalidAddress(format!(
                "{raw}: expected {} hex digits, got {}",
                Self::BYTE_LEN * 2,
                body.len()
            )));
        }
        if !body.bytes().all(|b| b.is_ascii_hexdigit()) {
            return Err(TypesError::InvalidAddress(format!("{raw}: non-hex digit")));
        }
        Ok(Self(format!("{}{}", Self::PREFIX, body.to_ascii_lowercase())))
    }

    /// Build an address from its 20 raw bytes.
    pub fn from_bytes(bytes: [u8; 20]) -> Self {
        Self(format!("{}{}", Self::PREFIX, hex::encode(bytes)))
    }

    /// Return the raw address string.
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Shortened form for log lines: `0x1234…abcd`.
    pub fn short(&self) -> String {
        format!("{}…{}", &self.0[..6], &self.0[self.0.len() - 4..])
    }
}

impl fmt::Display for AccountAddress {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl FromStr for AccountAddress {
    type Err = TypesError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

impl TryFrom<String> for AccountAddress {
    type Error = TypesError;

    fn try_from(s: String) -> Result<Self, Self::Error> {
        Self::parse(&s)
    }
}

impl From<AccountAddress> for String {
    fn from(addr: AccountAddress) -> Self {
        addr.0
    }
}
