//! # Protocol Configuration & Constants
//!
//! Every protocol number the SDK depends on lives here: signature sizes, the
//! delegation feature bit, the dynamic-fee type byte, intrinsic gas costs and
//! the fee-suggestion parameters. Changing any of these changes what goes on
//! the wire, so they must match the node byte for byte.
//!
//! [`ClientConfig`] is the only runtime-configurable piece: where the node and
//! the gas payer service live, and how long to wait for them.

use std::time::Duration;

use serde::Deserialize;

// ---------------------------------------------------------------------------
// Signatures
// ---------------------------------------------------------------------------

/// Recoverable secp256k1 signature: `r (32) ‖ s (32) ‖ v (1)`.
pub const SIGNATURE_LENGTH: usize = 65;

/// Compact signature without the recovery byte, as some external signers
/// return it.
pub const COMPACT_SIGNATURE_LENGTH: usize = 64;

/// A delegated transaction carries the sender signature followed by the gas
/// payer signature.
pub const DELEGATED_SIGNATURE_LENGTH: usize = SIGNATURE_LENGTH * 2;

/// Length of every digest the protocol signs.
pub const MESSAGE_HASH_LENGTH: usize = 32;

/// Length of a secp256k1 private key.
pub const PRIVATE_KEY_LENGTH: usize = 32;

/// SEC1 compressed public key length (`0x02`/`0x03` prefix).
pub const COMPRESSED_PUBLIC_KEY_LENGTH: usize = 33;

/// SEC1 uncompressed public key length (`0x04` prefix).
pub const UNCOMPRESSED_PUBLIC_KEY_LENGTH: usize = 65;

// ---------------------------------------------------------------------------
// Transaction Layout
// ---------------------------------------------------------------------------

/// Bit 0 of `reserved.features` requests gas delegation.
pub const DELEGATION_FEATURE: u32 = 0b1;

/// Type byte prepended to the encoding of dynamic-fee transactions.
pub const DYNAMIC_FEE_TX_TYPE: u8 = 0x51;

/// Address length in bytes.
pub const ADDRESS_LENGTH: usize = 20;

/// Block reference length in bytes.
pub const BLOCK_REF_LENGTH: usize = 8;

/// `dependsOn` is a transaction id.
pub const TX_ID_LENGTH: usize = 32;

/// Built-in VTHO (energy) token contract: `"Energy"` right-aligned in ASCII.
pub const ENERGY_ADDRESS: [u8; ADDRESS_LENGTH] = [
    0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0x45, 0x6e, 0x65, 0x72, 0x67, 0x79,
];

/// Selector of `transfer(address,uint256)`.
pub const TRANSFER_SELECTOR: [u8; 4] = [0xa9, 0x05, 0x9c, 0xbb];

/// Selector of `transferFrom(address,address,uint256)`.
pub const TRANSFER_FROM_SELECTOR: [u8; 4] = [0x23, 0xb8, 0x72, 0xdd];

// ---------------------------------------------------------------------------
// Intrinsic Gas
// ---------------------------------------------------------------------------

/// Flat cost of every transaction.
pub const TX_GAS: u64 = 5_000;

/// Cost per clause that calls an existing account.
pub const CLAUSE_GAS: u64 = 16_000;

/// Cost per clause that creates a contract (`to` absent).
pub const CLAUSE_GAS_CONTRACT_CREATION: u64 = 48_000;

/// Cost per zero byte of clause data.
pub const ZERO_GAS_DATA: u64 = 4;

/// Cost per non-zero byte of clause data.
pub const NON_ZERO_GAS_DATA: u64 = 68;

// ---------------------------------------------------------------------------
// Fee Policy
// ---------------------------------------------------------------------------

/// Upper bound of the legacy gas price coefficient.
pub const MAX_GAS_PRICE_COEF: u64 = 255;

/// The suggested priority fee is capped at `base_fee × 46 / 1000` (4.6%).
pub const PRIORITY_FEE_CAP_NUMERATOR: u64 = 46;

/// Denominator of the priority fee cap.
pub const PRIORITY_FEE_CAP_DENOMINATOR: u64 = 1_000;

/// How many blocks of history the priority fee suggestion samples.
pub const FEE_HISTORY_BLOCK_COUNT: u32 = 10;

/// Reward percentiles requested from the fee history endpoint. Only the last
/// (highest) one feeds the suggestion.
pub const FEE_HISTORY_PERCENTILES: [u8; 3] = [25, 50, 75];

// ---------------------------------------------------------------------------
// Key Derivation
// ---------------------------------------------------------------------------

/// BIP-44 path prefix for coin type 818. Account keys are children of it.
pub const DEFAULT_DERIVATION_PATH: &str = "m/44'/818'/0'/0";

// ---------------------------------------------------------------------------
// Network
// ---------------------------------------------------------------------------

/// Default upper bound for a single HTTP round trip.
pub const DEFAULT_REQUEST_TIMEOUT: Duration = Duration::from_secs(10);

/// Where the SDK talks to the outside world.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct ClientConfig {
    /// Base URL of the node REST API.
    pub node_url: String,
    /// Gas payer service endpoint, if the caller uses remote delegation.
    pub gas_payer_url: Option<String>,
    /// Bound applied to each request, in milliseconds when deserialized.
    #[serde(with = "duration_millis")]
    pub request_timeout: Duration,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            node_url: "http://localhost:8669".to_string(),
            gas_payer_url: None,
            request_timeout: DEFAULT_REQUEST_TIMEOUT,
        }
    }
}

mod duration_millis {
    use std::time::Duration;

    use serde::{Deserialize, Deserializer};

    pub fn deserialize<'de, D: Deserializer<'de>>(de: D) -> Result<Duration, D::Error> {
        u64::deserialize(de).map(Duration::from_millis)
    }
}
