//! # Account Addresses
//!
//! An address is the last 20 bytes of the Keccak-256 hash of an uncompressed
//! public key (without its `0x04` prefix):
//!
//! ```text
//! public_key (65 bytes, 0x04 ‖ X ‖ Y)
//!     -> keccak256(X ‖ Y) -> 32 bytes
//!     -> last 20 bytes     -> address
//! ```
//!
//! The text form is `0x` plus 40 hex digits in ERC-55 mixed case: each letter
//! is upper-cased when the matching nibble of `keccak256(lowercase hex)` is
//! 8 or more. The case pattern catches most copy-paste typos without changing
//! the address itself. Parsing is case-insensitive; equality is on the raw
//! bytes.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::config::ADDRESS_LENGTH;
use crate::crypto::secp256k1::{inflate_public_key, PrivateKey};
use crate::crypto::keccak256;
use crate::error::{Result, ThorError};
use crate::identity::hdkey::HdKey;

/// A 20-byte account address.
#[derive(Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Default)]
pub struct Address([u8; ADDRESS_LENGTH]);

impl Address {
    /// The all-zero address.
    pub const ZERO: Address = Address([0u8; ADDRESS_LENGTH]);

    /// Wrap 20 raw bytes.
    pub const fn new(bytes: [u8; ADDRESS_LENGTH]) -> Self {
        Self(bytes)
    }

    /// Wrap a slice that must be exactly 20 bytes long.
    pub fn from_slice(bytes: &[u8]) -> Result<Self> {
        let fixed: [u8; ADDRESS_LENGTH] = bytes.try_into().map_err(|_| {
            ThorError::illegal("address", format!("expected 20 bytes, got {}", bytes.len()))
        })?;
        Ok(Self(fixed))
    }

    /// Raw bytes.
    pub fn as_bytes(&self) -> &[u8; ADDRESS_LENGTH] {
        &self.0
    }

    /// Derive the address of a public key in either SEC1 format.
    pub fn of_public_key(public_key: &[u8]) -> Result<Self> {
        let full = inflate_public_key(public_key)?;
        Ok(Self::of_uncompressed(&full))
    }

    /// Derive the address controlled by a private key.
    pub fn of_private_key(key: &PrivateKey) -> Self {
        Self::of_uncompressed(&key.public_key(false))
    }

    /// `full` is an already validated 65-byte `0x04 ‖ X ‖ Y` key.
    pub(crate) fn of_uncompressed(full: &[u8]) -> Self {
        let digest = keccak256(&full[1..]);
        let mut bytes = [0u8; ADDRESS_LENGTH];
        bytes.copy_from_slice(&digest[12..]);
        Self(bytes)
    }

    /// Derive an address from mnemonic words.
    ///
    /// The words are expanded to the account node at the default derivation
    /// path, then `path` is applied relative to it: `"m/0"` is the first
    /// address of the wallet, `"m/1"` the second, and so on.
    pub fn of_mnemonic(words: &[&str], path: &str) -> Result<Self> {
        HdKey::from_mnemonic(words, crate::config::DEFAULT_DERIVATION_PATH, None)?
            .derive(path)
            .map(|node| node.address())
    }

    /// `true` if `text` is 40 hex digits, with an optional `0x` prefix.
    /// Letter case is not checked, prefix included.
    pub fn is_valid(text: &str) -> bool {
        let digits = strip_hex_prefix(text);
        digits.len() == ADDRESS_LENGTH * 2 && digits.bytes().all(|b| b.is_ascii_hexdigit())
    }

    /// ERC-55 mixed-case text form with `0x` prefix.
    pub fn to_checksummed(&self) -> String {
        let lower = hex::encode(self.0);
        let digest = keccak256(lower.as_bytes());

        let mut out = String::with_capacity(2 + lower.len());
        out.push_str("0x");
        for (i, c) in lower.chars().enumerate() {
            let byte = digest[i / 2];
            let nibble = if i % 2 == 0 { byte >> 4 } else { byte & 0x0f };
            if nibble >= 8 {
                out.push(c.to_ascii_uppercase());
            } else {
                out.push(c);
            }
        }
        out
    }
}

fn strip_hex_prefix(text: &str) -> &str {
    text.strip_prefix("0x")
        .or_else(|| text.strip_prefix("0X"))
        .unwrap_or(text)
}

impl FromStr for Address {
    type Err = ThorError;

    fn from_str(text: &str) -> Result<Self> {
        if !Self::is_valid(text) {
            return Err(ThorError::illegal(
                "address",
                "expected 40 hex digits with optional 0x prefix",
            ));
        }
        let bytes = hex::decode(strip_hex_prefix(text))
            .map_err(|e| ThorError::illegal("address", e.to_string()))?;
        Self::from_slice(&bytes)
    }
}

impl fmt::Display for Address {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.to_checksummed())
    }
}

impl fmt::Debug for Address {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Address({})", self.to_checksummed())
    }
}

impl From<[u8; ADDRESS_LENGTH]> for Address {
    fn from(bytes: [u8; ADDRESS_LENGTH]) -> Self {
        Self(bytes)
    }
}

impl AsRef<[u8]> for Address {
    fn as_ref(&self) -> &[u8] {
        &self.0
    }
}

impl Serialize for Address {
    fn serialize<S: serde::Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        if serializer.is_human_readable() {
            serializer.serialize_str(&self.to_checksummed())
        } else {
            serializer.serialize_bytes(&self.0)
        }
    }
}

impl<'de> Deserialize<'de> for Address {
    fn deserialize<D: serde::Deserializer<'de>>(deserializer: D) -> std::result::Result<Self, D::Error> {
        if deserializer.is_human_readable() {
            let text = String::deserialize(deserializer)?;
            text.parse().map_err(serde::de::Error::custom)
        } else {
            let bytes = <Vec<u8>>::deserialize(deserializer)?;
            Self::from_slice(&bytes).map_err(serde::de::Error::custom)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn checksum_matches_erc55_vectors() {
        for expected in [
            "0x5aAeb6053F3E94C9b9A09f33669435E7Ef1BeAed",
            "0xfB6916095ca1df60bB79Ce92cE3Ea74c37c5d359",
            "0xdbF03B407c01E7cD3CBea99509d93f8DDDC8C6FB",
            "0xD1220A0cf47c7B9Be7A2E6BA89F429762e7b9aDb",
        ] {
            let parsed: Address = expected.to_lowercase().parse().unwrap();
            assert_eq!(parsed.to_string(), expected);
        }
    }

    #[test]
    fn private_key_one_maps_to_known_address() {
        let mut raw = [0u8; 32];
        raw[31] = 1;
        let key = PrivateKey::from_bytes(&raw).unwrap();
        let address = Address::of_private_key(&key);
        assert_eq!(
            address.to_string(),
            "0x7E5F4552091A69125d5DfCb7b8C2659029395Bdf"
        );
        assert_eq!(Address::of_public_key(&key.public_key(true)).unwrap(), address);
        assert_eq!(Address::of_public_key(&key.public_key(false)).unwrap(), address);
    }

    #[test]
    fn validity_ignores_case_and_prefix() {
        assert!(Address::is_valid("0x7567d83b7b8d80addcb281a71d54fc7b3364ffed"));
        assert!(Address::is_valid("7567D83B7B8D80ADDCB281A71D54FC7B3364FFED"));
        assert!(!Address::is_valid("0x7567d83b7b8d80addcb281a71d54fc7b3364ffe"));
        assert!(!Address::is_valid("0x7567d83b7b8d80addcb281a71d54fc7b3364ffez"));
        assert!(Address::is_valid("0X7567d83b7b8d80addcb281a71d54fc7b3364ffed"));
        assert!(!Address::is_valid("0x0x7567d83b7b8d80addcb281a71d54fc7b3364ff"));
        assert!(!Address::is_valid(""));
    }

    #[test]
    fn equality_is_on_bytes_not_text() {
        let lower: Address = "0x5aaeb6053f3e94c9b9a09f33669435e7ef1beaed".parse().unwrap();
        let upper: Address = "0x5AAEB6053F3E94C9B9A09F33669435E7EF1BEAED".parse().unwrap();
        assert_eq!(lower, upper);

        let checksummed = "0x5aAeb6053F3E94C9b9A09f33669435E7Ef1BeAed";
        let shouting: Address = checksummed.to_uppercase().parse().unwrap();
        assert_eq!(shouting, lower);
        assert_eq!(shouting.to_string(), checksummed);
    }

    #[test]
    fn rejects_wrong_lengths() {
        assert!(Address::from_slice(&[0u8; 19]).is_err());
        assert!("0x1234".parse::<Address>().is_err());
    }

    #[test]
    fn serde_uses_checksummed_text() {
        let address: Address = "0xfb6916095ca1df60bb79ce92ce3ea74c37c5d359".parse().unwrap();
        let json = serde_json::to_string(&address).unwrap();
        assert_eq!(json, "\"0xfB6916095ca1df60bB79Ce92cE3Ea74c37c5d359\"");
        let back: Address = serde_json::from_str(&json).unwrap();
        assert_eq!(back, address);
    }

    #[test]
    fn mnemonic_addresses_follow_child_index() {
        let words: Vec<&str> =
            "ignore empty bird silly journey junior ripple have guard waste between tenant"
                .split(' ')
                .collect();
        assert_eq!(
            Address::of_mnemonic(&words, "m/0").unwrap().to_string(),
            "0x339Fb3C438606519E2C75bbf531fb43a0F449A70"
        );
        assert_eq!(
            Address::of_mnemonic(&words, "m/1").unwrap().to_string(),
            "0x5677099D06Bc72f9da1113aFA5e022feEc424c8E"
        );
        assert!(Address::of_mnemonic(&words, "0/1/x").is_err());
    }
}
