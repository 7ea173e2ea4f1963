//! Externally-attested network identity.
//!
//! The identity is the 16-byte form of the client's IP address. IPv4 addresses
//! are stored as IPv4-mapped IPv6 (`::ffff:a.b.c.d`) so both families share one
//! keyspace and a v4 client reaching the attester over a dual-stack socket maps
//! to the same identity as over plain v4.

use crate::error::TypesError;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::net::{IpAddr, Ipv6Addr};
use std::str::FromStr;

/// A 128-bit network identity. Serialized as its `0x` hex string.
#[derive(Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct NetworkIdentity([u8; 16]);

impl NetworkIdentity {
    pub fn new(bytes: [u8; 16]) -> Self {
        Self(bytes)
    }

    /// Encode an IP address. Already-mapped v6 addresses collapse to their v4 form first.
    pub fn from_ip(ip: IpAddr) -> Self {
        let v6 = match ip {
            IpAddr::V4(v4) => v4.to_ipv6_mapped(),
            IpAddr::V6(v6) => match v6.to_ipv4_mapped() {
                Some(v4) => v4.to_ipv6_mapped(),
                None => v6,
            },
        };
        Self(v6.octets())
    }

    /// Parse either an IP literal or a `0x`-prefixed 32-digit hex string.
    pub fn parse(raw: &str) -> Result<Self, TypesError> {
        if let Some(body) = raw.strip_prefix("0x") {
            let bytes = hex::decode(body)
                .map_err(|e| TypesError::InvalidIdentity(format!("{raw}: {e}")))?;
            let arr: [u8; 16] = bytes
                .try_into()
                .map_err(|_| TypesError::InvalidIdentity(format!("{raw}: expected 16 bytes")))?;
            return Ok(Self(arr));
        }
        raw.parse::<IpAddr>()
            .map(Self::from_ip)
            .map_err(|e| TypesError::InvalidIdentity(format!("{raw}: {e}")))
    }

    pub fn as_bytes(&self) -> &[u8; 16] {
        &self.0
    }

    /// Recover the IP address this identity encodes.
    pub fn to_ip(&self) -> IpAddr {
        let v6 = Ipv6Addr::from(self.0);
        match v6.to_ipv4_mapped() {
            Some(v4) => IpAddr::V4(v4),
            None => IpAddr::V6(v6),
        }
    }
}

impl fmt::Debug for NetworkIdentity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "NetworkIdentity({})", self.to_ip())
    }
}

impl fmt::Display for NetworkIdentity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "0x{}", hex::encode(self.0))
    }
}

impl FromStr for NetworkIdentity {
    type Err = TypesError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

impl TryFrom<String> for NetworkIdentity {
    type Error = TypesError;

    fn try_from(s: String) -> Result<Self, Self::Error> {
        Self::parse(&s)
    }
}

impl From<NetworkIdentity> for String {
    fn from(id: NetworkIdentity) -> Self {
        id.to_string()
    }
}
