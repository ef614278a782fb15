//! # Identity Module
//!
//! Who signs a transaction, and how they are named on chain.
//!
//! 1. **Address**: 20 bytes derived from a secp256k1 public key, shown as
//!    ERC-55 checksummed hex.
//! 2. **HD keys**: BIP-39 mnemonic words and BIP-32 derivation, so a single
//!    backup phrase can regenerate every account key of a wallet.

pub mod address;
pub mod hdkey;

pub use address::Address;
pub use hdkey::{generate_mnemonic, is_derivation_path_valid, mnemonic_to_seed, HdKey};
