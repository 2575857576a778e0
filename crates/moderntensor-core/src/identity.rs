// crates/moderntensor-core/src/identity.rs

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Deserializer, Serialize, Serializer};

/// Numeric subnet identifier. Assigned externally at subnet creation.
pub type SubnetId = u64;

/// A 32-byte account address on the underlying ledger.
///
/// Rendered as `0x`-prefixed lowercase hex in logs, JSON, and config files.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default)]
pub struct Address(pub [u8; 32]);

impl Address {
    /// The all-zero address.
    pub const ZERO: Address = Address([0u8; 32]);

    /// Build an address whose every byte is `byte`. Handy for fixtures.
    pub const fn repeat_byte(byte: u8) -> Self {
        Address([byte; 32])
    }
}

impl fmt::Display for Address {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "0x{}", hex::encode(self.0))
    }
}

/// Error returned when parsing a hex address fails.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("invalid address '{0}': expected 32 bytes of hex")]
pub struct AddressParseError(pub String);

impl FromStr for Address {
    type Err = AddressParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let trimmed = s.strip_prefix("0x").unwrap_or(s);
        // Short Move-style addresses ("0x1") are left-padded to 32 bytes.
        if trimmed.is_empty() || trimmed.len() > 64 {
            return Err(AddressParseError(s.to_string()));
        }
        let padded = format!("{:0>64}", trimmed);
        let bytes = hex::decode(&padded).map_err(|_| AddressParseError(s.to_string()))?;
        let mut out = [0u8; 32];
        out.copy_from_slice(&bytes);
        Ok(Address(out))
    }
}

impl Serialize for Address {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

impl<'de> Deserialize<'de> for Address {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let raw = String::deserialize(deserializer)?;
        raw.parse().map_err(serde::de::Error::custom)
    }
}

/// The two participant roles a node can register under.
///
/// An address may hold at most one record per role at a time.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Role {
    /// Staked, bonded participant that scores miners.
    Validator,
    /// Staked participant that performs work.
    Miner,
}

impl Role {
    pub fn as_str(&self) -> &'static str {
        match self {
            Role::Validator => "validator",
            Role::Miner => "miner",
        }
    }
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_address_display_roundtrip() {
        let addr = Address::repeat_byte(0xab);
        let shown = addr.to_string();
        assert!(shown.starts_with("0xabab"));
        assert_eq!(shown.parse::<Address>().unwrap(), addr);
    }

    #[test]
    fn test_short_address_is_left_padded() {
        let addr: Address = "0x1".parse().unwrap();
        let mut expected = [0u8; 32];
        expected[31] = 1;
        assert_eq!(addr, Address(expected));
    }

    #[test]
    fn test_invalid_address_rejected() {
        assert!("0xzz".parse::<Address>().is_err());
        assert!("".parse::<Address>().is_err());
        assert!(format!("0x{}", "1".repeat(65)).parse::<Address>().is_err());
    }

    #[test]
    fn test_address_serde_as_hex_string() {
        let addr = Address::repeat_byte(1);
        let json = serde_json::to_string(&addr).unwrap();
        assert_eq!(json, format!("\"{}\"", addr));
        let back: Address = serde_json::from_str(&json).unwrap();
        assert_eq!(back, addr);
    }

    #[test]
    fn test_role_labels() {
        assert_eq!(Role::Validator.to_string(), "validator");
        assert_eq!(Role::Miner.as_str(), "miner");
    }
}
