use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Deserializer, Serialize, Serializer};

use crate::error::CodecError;

/// Size of an identity in bytes.
pub const ADDRESS_SIZE: usize = 20;

/// Identity of an account: a Core, a Proxy, a Delegate or an external caller.
///
/// `Address::ZERO` is the null identity. It is used as the "from" side of a
/// mint, the "to" side of a burn, and as the implementation that clears a
/// delegate registration.
#[derive(Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Default)]
pub struct Address(pub [u8; ADDRESS_SIZE]);

impl Address {
    /// The null identity.
    pub const ZERO: Address = Address([0u8; ADDRESS_SIZE]);

    pub const fn new(bytes: [u8; ADDRESS_SIZE]) -> Self {
        Self(bytes)
    }

    /// Build an address whose low eight bytes hold `n` (big-endian).
    pub fn from_low_u64(n: u64) -> Self {
        let mut bytes = [0u8; ADDRESS_SIZE];
        bytes[ADDRESS_SIZE - 8..].copy_from_slice(&n.to_be_bytes());
        Self(bytes)
    }

    /// Derive an address from arbitrary seed material (BLAKE3, truncated).
    pub fn derive(seed: &[u8]) -> Self {
        let hash = blake3::hash(seed);
        let mut bytes = [0u8; ADDRESS_SIZE];
        bytes.copy_from_slice(&hash.as_bytes()[..ADDRESS_SIZE]);
        Self(bytes)
    }

    pub fn is_zero(&self) -> bool {
        self.0 == [0u8; ADDRESS_SIZE]
    }

    pub fn as_bytes(&self) -> &[u8; ADDRESS_SIZE] {
        &self.0
    }
}

impl fmt::Display for Address {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "0x{}", hex::encode(self.0))
    }
}

impl fmt::Debug for Address {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Address({})", self)
    }
}

impl FromStr for Address {
    type Err = CodecError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let digits = s.strip_prefix("0x").unwrap_or(s);
        let mut bytes = [0u8; ADDRESS_SIZE];
        hex::decode_to_slice(digits, &mut bytes).map_err(|_| CodecError::invalid("address"))?;
        Ok(Self(bytes))
    }
}

impl Serialize for Address {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

impl<'de> Deserialize<'de> for Address {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let s = String::deserialize(deserializer)?;
        s.parse().map_err(serde::de::Error::custom)
    }
}
