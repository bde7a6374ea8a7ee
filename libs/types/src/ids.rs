//! Identifier types for relay entities
//!
//! Pools are addressed by their on-chain contract address. WebSocket
//! connections get a UUID v7 so registry dumps sort by connect time.

use serde::{Deserialize, Deserializer, Serialize};
use std::fmt;
use std::str::FromStr;
use uuid::Uuid;

use crate::errors::ValidationError;

/// Length of a `0x`-prefixed 20-byte hex address.
pub const ADDRESS_LEN: usize = 42;

/// Address of a Uniswap V3 pool contract.
///
/// Always stored lower-cased so the same pool compares equal regardless of
/// the checksum casing a client sent.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
#[serde(transparent)]
pub struct PoolAddress(String);

impl PoolAddress {
    /// Validate and normalize a pool address.
    ///
    /// Accepts `0x`/`0X` followed by exactly 40 hex digits, in any case.
    pub fn parse(raw: &str) -> Result<Self, ValidationError> {
        let invalid = || ValidationError::InvalidPoolAddress {
            value: raw.to_string(),
        };

        if raw.len() != ADDRESS_LEN {
            return Err(invalid());
        }
        let lower = raw.to_ascii_lowercase();
        let digits = lower.strip_prefix("0x").ok_or_else(invalid)?;
        if !digits.bytes().all(|b| b.is_ascii_hexdigit()) {
            return Err(invalid());
        }

        Ok(Self(lower))
    }

    /// Lower-cased address string, including the `0x` prefix.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl FromStr for PoolAddress {
    type Err = ValidationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

impl<'de> Deserialize<'de> for PoolAddress {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let raw = String::deserialize(deserializer)?;
        Self::parse(&raw).map_err(serde::de::Error::custom)
    }
}

impl fmt::Display for PoolAddress {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Unique identifier for a WebSocket connection
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ConnectionId(Uuid);

impl ConnectionId {
    /// Create a new ConnectionId with current timestamp
    pub fn new() -> Self {
        Self(Uuid::now_v7())
    }
}

impl Default for ConnectionId {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for ConnectionId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    const USDC_WETH: &str = "0x88e6A0c2dDD26FEEb64F039a2c41296FcB3f5640";

    #[test]
    fn test_pool_address_lowercased() {
        let pool = PoolAddress::parse(USDC_WETH).unwrap();
        assert_eq!(pool.as_str(), "0x88e6a0c2ddd26feeb64f039a2c41296fcb3f5640");
    }

    #[test]
    fn test_pool_address_uppercase_prefix() {
        let raw = USDC_WETH.replacen("0x", "0X", 1);
        assert!(PoolAddress::parse(&raw).is_ok());
    }

    #[test]
    fn test_pool_address_rejects_bad_input() {
        assert!(PoolAddress::parse("").is_err());
        assert!(PoolAddress::parse("0x1234").is_err());
        // Right length, no prefix
        assert!(PoolAddress::parse(&format!("ab{}", &USDC_WETH[2..])).is_err());
        // Right length, non-hex digit
        assert!(PoolAddress::parse(&format!("{}z", &USDC_WETH[..41])).is_err());
    }

    #[test]
    fn test_pool_address_deserialize_validates() {
        let ok: Result<PoolAddress, _> = serde_json::from_str(&format!("\"{}\"", USDC_WETH));
        assert!(ok.is_ok());

        let bad: Result<PoolAddress, _> = serde_json::from_str("\"0xdeadbeef\"");
        assert!(bad.is_err());
    }

    #[test]
    fn test_connection_id_unique() {
        let id1 = ConnectionId::new();
        let id2 = ConnectionId::new();
        assert_ne!(id1, id2);
    }

    proptest! {
        #[test]
        fn prop_any_40_hex_digits_accepted(digits in "[0-9a-fA-F]{40}") {
            let raw = format!("0x{}", digits);
            let pool = PoolAddress::parse(&raw).unwrap();
            prop_assert_eq!(pool.as_str().len(), ADDRESS_LEN);
            prop_assert_eq!(pool.as_str(), format!("0x{}", digits.to_ascii_lowercase()));
        }

        #[test]
        fn prop_wrong_length_rejected(digits in "[0-9a-f]{0,60}") {
            prop_assume!(digits.len() != 40);
            let raw = format!("0x{}", digits);
            prop_assert!(PoolAddress::parse(&raw).is_err());
        }
    }
}
