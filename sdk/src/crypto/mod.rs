//! # Cryptographic Primitives
//!
//! Everything the SDK signs or hashes flows through here:
//!
//! - **secp256k1** ECDSA with public-key recovery, for sender and gas payer
//!   signatures. Deterministic nonces (RFC 6979), low-s normalized.
//! - **Keccak-256** for ids, signing digests and addresses.
//!
//! Both are thin wrappers over `k256` and `sha3`. The wrappers exist to pin
//! down input validation (lengths, recovery ids, key ranges) so callers get a
//! typed error instead of a panic deep inside curve arithmetic.

pub mod hash;
pub mod secp256k1;

pub use hash::{keccak256, keccak256_concat};
pub use secp256k1::{CryptoError, PrivateKey};
