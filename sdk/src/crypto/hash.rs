//! # Hashing
//!
//! One hash function for everything: Keccak-256. Transaction ids, signing
//! digests, the delegation digest, address derivation and the address
//! checksum all go through [`keccak256`].
//!
//! Note this is the pre-standard Keccak padding, not NIST SHA3-256. The two
//! produce different digests for the same input, and only Keccak matches what
//! the node computes.

use sha3::{Digest, Keccak256};

/// Keccak-256 of `data`.
///
/// # Example
///
/// ```
/// use thor_sdk::crypto::keccak256;
///
/// let digest = keccak256(b"");
/// assert_eq!(
///     hex::encode(digest),
///     "c5d2460186f7233c927e7db2dcc703c0e500b653ca82273b7bfad8045d85a470"
/// );
/// ```
pub fn keccak256(data: &[u8]) -> [u8; 32] {
    Keccak256::digest(data).into()
}

/// Keccak-256 over the concatenation of `parts`, without allocating the
/// concatenated buffer.
pub fn keccak256_concat(parts: &[&[u8]]) -> [u8; 32] {
    let mut hasher = Keccak256::new();
    for part in parts {
        hasher.update(part);
    }
    hasher.finalize().into()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn keccak_is_not_sha3() {
        // NIST SHA3-256("") starts with a7ffc6f8.
        assert_eq!(hex::encode(&keccak256(b"")[..4]), "c5d24601");
    }

    #[test]
    fn concat_matches_single_buffer() {
        let joined = keccak256(b"helloworld");
        assert_eq!(keccak256_concat(&[b"hello", b"world"]), joined);
        assert_eq!(keccak256_concat(&[b"hello", b"", b"world"]), joined);
    }
}
