//! # secp256k1 Keys & Recoverable Signatures
//!
//! Signatures are 65 bytes: `r (32) ‖ s (32) ‖ v (1)` where `v` is the
//! recovery parity, 0 or 1. Anything else is rejected before touching the
//! curve, so an attacker-supplied signature can only ever produce a typed
//! error.
//!
//! ## Security considerations
//!
//! - Keys come from `OsRng`.
//! - Nonces are deterministic (RFC 6979): signing the same digest with the
//!   same key always yields the same bytes.
//! - `s` is normalized to the lower half of the curve order, so each
//!   (key, digest) pair has exactly one valid signature.
//! - [`PrivateKey`] never prints its bytes, not even through `Debug`.

use std::fmt;

use k256::ecdsa::signature::hazmat::PrehashVerifier;
use k256::ecdsa::{RecoveryId, Signature, SigningKey, VerifyingKey};
use rand::rngs::OsRng;
use thiserror::Error;

use crate::config::{
    COMPACT_SIGNATURE_LENGTH, COMPRESSED_PUBLIC_KEY_LENGTH, MESSAGE_HASH_LENGTH,
    PRIVATE_KEY_LENGTH, SIGNATURE_LENGTH, UNCOMPRESSED_PUBLIC_KEY_LENGTH,
};

/// Errors raised by key and signature handling.
///
/// Messages describe the shape of the problem, never the key bytes.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum CryptoError {
    #[error("invalid private key: not a 32-byte scalar in [1, n)")]
    InvalidPrivateKey,

    #[error("invalid message hash: expected 32 bytes, got {0}")]
    InvalidMessageHash(usize),

    #[error("invalid signature: {0}")]
    InvalidSignature(String),

    #[error("invalid public key: {0}")]
    InvalidPublicKey(String),
}

// ---------------------------------------------------------------------------
// PrivateKey
// ---------------------------------------------------------------------------

/// A secp256k1 signing key.
///
/// Deliberately not `Serialize`: exporting key material should be an explicit
/// call to [`PrivateKey::to_bytes`], not a side effect of logging a struct.
#[derive(Clone)]
pub struct PrivateKey {
    inner: SigningKey,
}

impl PrivateKey {
    /// Fresh random key from the OS RNG.
    pub fn generate() -> Self {
        Self {
            inner: SigningKey::random(&mut OsRng),
        }
    }

    /// Parse 32 big-endian bytes. Zero and values >= the curve order fail.
    pub fn from_bytes(bytes: &[u8]) -> Result<Self, CryptoError> {
        if bytes.len() != PRIVATE_KEY_LENGTH {
            return Err(CryptoError::InvalidPrivateKey);
        }
        let inner = SigningKey::from_slice(bytes).map_err(|_| CryptoError::InvalidPrivateKey)?;
        Ok(Self { inner })
    }

    /// Parse a hex string, with or without `0x`.
    pub fn from_hex(text: &str) -> Result<Self, CryptoError> {
        let digits = text.strip_prefix("0x").unwrap_or(text);
        let bytes = hex::decode(digits).map_err(|_| CryptoError::InvalidPrivateKey)?;
        Self::from_bytes(&bytes)
    }

    /// Raw scalar bytes. Handle with care.
    pub fn to_bytes(&self) -> [u8; 32] {
        self.inner.to_bytes().into()
    }

    /// SEC1 public key, 33 bytes compressed or 65 bytes uncompressed.
    pub fn public_key(&self, compressed: bool) -> Vec<u8> {
        self.inner
            .verifying_key()
            .to_encoded_point(compressed)
            .as_bytes()
            .to_vec()
    }

    /// Sign a 32-byte digest, returning `r ‖ s ‖ v`.
    pub fn sign(&self, message_hash: &[u8]) -> Result<[u8; 65], CryptoError> {
        check_message_hash(message_hash)?;
        let (signature, recovery_id) = self
            .inner
            .sign_prehash_recoverable(message_hash)
            .map_err(|e| CryptoError::InvalidSignature(e.to_string()))?;
        // k256 already returns low-s, but normalize anyway so the parity
        // byte always matches the bytes we emit.
        let (signature, recovery_id) = match signature.normalize_s() {
            Some(low) => (
                low,
                RecoveryId::new(!recovery_id.is_y_odd(), recovery_id.is_x_reduced()),
            ),
            None => (signature, recovery_id),
        };

        let mut out = [0u8; SIGNATURE_LENGTH];
        out[..COMPACT_SIGNATURE_LENGTH].copy_from_slice(&signature.to_bytes());
        out[COMPACT_SIGNATURE_LENGTH] = recovery_id.to_byte();
        Ok(out)
    }
}

impl fmt::Debug for PrivateKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("PrivateKey(<redacted>)")
    }
}

// ---------------------------------------------------------------------------
// Byte-level operations
// ---------------------------------------------------------------------------

/// 32 random bytes that form a valid private key.
pub fn generate_private_key() -> [u8; 32] {
    PrivateKey::generate().to_bytes()
}

/// `true` if `bytes` is a 32-byte scalar in `[1, n)`.
pub fn is_valid_private_key(bytes: &[u8]) -> bool {
    PrivateKey::from_bytes(bytes).is_ok()
}

/// `true` if `bytes` has the length of a signing digest.
pub fn is_valid_message_hash(bytes: &[u8]) -> bool {
    bytes.len() == MESSAGE_HASH_LENGTH
}

/// Public key for a private key, compressed (33 bytes) or not (65 bytes).
pub fn derive_public_key(private_key: &[u8], compressed: bool) -> Result<Vec<u8>, CryptoError> {
    Ok(PrivateKey::from_bytes(private_key)?.public_key(compressed))
}

/// Re-encode any valid public key in compressed form.
pub fn compress_public_key(public_key: &[u8]) -> Result<Vec<u8>, CryptoError> {
    Ok(parse_public_key(public_key)?
        .to_encoded_point(true)
        .as_bytes()
        .to_vec())
}

/// Re-encode any valid public key in uncompressed form.
pub fn inflate_public_key(public_key: &[u8]) -> Result<Vec<u8>, CryptoError> {
    Ok(parse_public_key(public_key)?
        .to_encoded_point(false)
        .as_bytes()
        .to_vec())
}

/// Sign `message_hash` with a raw private key.
pub fn sign(message_hash: &[u8], private_key: &[u8]) -> Result<[u8; 65], CryptoError> {
    check_message_hash(message_hash)?;
    PrivateKey::from_bytes(private_key)?.sign(message_hash)
}

/// Recover the uncompressed (65-byte) public key that produced `signature`.
pub fn recover(message_hash: &[u8], signature: &[u8]) -> Result<Vec<u8>, CryptoError> {
    check_message_hash(message_hash)?;
    let (sig, recovery_id) = split_signature(signature)?;
    let key = VerifyingKey::recover_from_prehash(message_hash, &sig, recovery_id)
        .map_err(|e| CryptoError::InvalidSignature(e.to_string()))?;
    Ok(key.to_encoded_point(false).as_bytes().to_vec())
}

/// `true` if `signature` over `message_hash` was made by `public_key`.
///
/// Returns an error only for malformed inputs; a well-formed signature from
/// the wrong key is simply `false`.
pub fn verify(message_hash: &[u8], signature: &[u8], public_key: &[u8]) -> Result<bool, CryptoError> {
    check_message_hash(message_hash)?;
    let expected = parse_public_key(public_key)?;
    let (sig, recovery_id) = split_signature(signature)?;
    if expected.verify_prehash(message_hash, &sig).is_err() {
        return Ok(false);
    }
    // The parity byte is part of the signature: a flipped `v` must not pass.
    match VerifyingKey::recover_from_prehash(message_hash, &sig, recovery_id) {
        Ok(recovered) => Ok(recovered == expected),
        Err(_) => Ok(false),
    }
}

/// Find the recovery parity that makes a 64-byte `r ‖ s` signature recover
/// `expected_public_key`.
///
/// External signers (HSMs, some wallets) return signatures without `v`; this
/// lifts them into the 65-byte form the wire format needs.
pub fn recovery_id_for(
    message_hash: &[u8],
    compact_signature: &[u8],
    expected_public_key: &[u8],
) -> Result<u8, CryptoError> {
    check_message_hash(message_hash)?;
    if compact_signature.len() != COMPACT_SIGNATURE_LENGTH {
        return Err(CryptoError::InvalidSignature(format!(
            "expected {COMPACT_SIGNATURE_LENGTH} bytes, got {}",
            compact_signature.len()
        )));
    }
    let expected = parse_public_key(expected_public_key)?;
    let sig = Signature::from_slice(compact_signature)
        .map_err(|e| CryptoError::InvalidSignature(e.to_string()))?;

    for parity in 0u8..=1 {
        let Some(recovery_id) = RecoveryId::from_byte(parity) else {
            continue;
        };
        if let Ok(key) = VerifyingKey::recover_from_prehash(message_hash, &sig, recovery_id) {
            if key == expected {
                return Ok(parity);
            }
        }
    }
    Err(CryptoError::InvalidSignature(
        "no recovery id recovers the expected public key".into(),
    ))
}

// ---------------------------------------------------------------------------
// Input validation
// ---------------------------------------------------------------------------

fn check_message_hash(message_hash: &[u8]) -> Result<(), CryptoError> {
    if is_valid_message_hash(message_hash) {
        Ok(())
    } else {
        Err(CryptoError::InvalidMessageHash(message_hash.len()))
    }
}

fn split_signature(signature: &[u8]) -> Result<(Signature, RecoveryId), CryptoError> {
    if signature.len() != SIGNATURE_LENGTH {
        return Err(CryptoError::InvalidSignature(format!(
            "expected {SIGNATURE_LENGTH} bytes, got {}",
            signature.len()
        )));
    }
    let v = signature[COMPACT_SIGNATURE_LENGTH];
    if v > 1 {
        return Err(CryptoError::InvalidSignature(format!("recovery id {v} is not 0 or 1")));
    }
    let sig = Signature::from_slice(&signature[..COMPACT_SIGNATURE_LENGTH])
        .map_err(|e| CryptoError::InvalidSignature(e.to_string()))?;
    let recovery_id = RecoveryId::from_byte(v)
        .ok_or_else(|| CryptoError::InvalidSignature(format!("recovery id {v} is not 0 or 1")))?;
    Ok((sig, recovery_id))
}

fn parse_public_key(bytes: &[u8]) -> Result<VerifyingKey, CryptoError> {
    match (bytes.len(), bytes.first()) {
        (COMPRESSED_PUBLIC_KEY_LENGTH, Some(0x02 | 0x03))
        | (UNCOMPRESSED_PUBLIC_KEY_LENGTH, Some(0x04)) => {}
        (len, _) => {
            return Err(CryptoError::InvalidPublicKey(format!(
                "unrecognised {len}-byte encoding"
            )))
        }
    }
    VerifyingKey::from_sec1_bytes(bytes)
        .map_err(|_| CryptoError::InvalidPublicKey("not a point on the curve".into()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::crypto::keccak256;

    fn key_one() -> PrivateKey {
        let mut bytes = [0u8; 32];
        bytes[31] = 1;
        PrivateKey::from_bytes(&bytes).unwrap()
    }

    #[test]
    fn private_key_range_is_enforced() {
        assert!(!is_valid_private_key(&[0u8; 32]));
        assert!(!is_valid_private_key(&[0xff; 32]));
        assert!(!is_valid_private_key(&[1u8; 31]));
        assert!(is_valid_private_key(&key_one().to_bytes()));
        assert!(is_valid_private_key(&generate_private_key()));
    }

    #[test]
    fn debug_never_prints_key_material() {
        let key = key_one();
        let printed = format!("{key:?}");
        assert_eq!(printed, "PrivateKey(<redacted>)");
    }

    #[test]
    fn public_key_formats_agree() {
        let key = PrivateKey::generate();
        let compressed = key.public_key(true);
        let full = key.public_key(false);
        assert_eq!(compressed.len(), 33);
        assert_eq!(full.len(), 65);
        assert_eq!(full[0], 0x04);
        assert_eq!(inflate_public_key(&compressed).unwrap(), full);
        assert_eq!(compress_public_key(&full).unwrap(), compressed);
        assert_eq!(
            derive_public_key(&key.to_bytes(), true).unwrap(),
            compressed
        );
    }

    #[test]
    fn sign_is_deterministic_and_recoverable() {
        let key = PrivateKey::generate();
        let digest = keccak256(b"multi-clause");
        let first = key.sign(&digest).unwrap();
        let second = sign(&digest, &key.to_bytes()).unwrap();
        assert_eq!(first, second);
        assert!(first[64] <= 1);

        assert_eq!(recover(&digest, &first).unwrap(), key.public_key(false));
        assert!(verify(&digest, &first, &key.public_key(true)).unwrap());
    }

    #[test]
    fn signatures_are_low_s() {
        // Half the curve order, big-endian.
        let half_n = hex::decode("7fffffffffffffffffffffffffffffff5d576e7357a4501ddfe92f46681b20a0")
            .unwrap();
        let key = PrivateKey::generate();
        for i in 0u8..16 {
            let sig = key.sign(&keccak256(&[i])).unwrap();
            assert!(sig[32..64] <= half_n[..], "high s for message {i}");
        }
    }

    #[test]
    fn verify_rejects_wrong_key_and_flipped_parity() {
        let key = PrivateKey::generate();
        let other = PrivateKey::generate();
        let digest = keccak256(b"payload");
        let mut sig = key.sign(&digest).unwrap();

        assert!(!verify(&digest, &sig, &other.public_key(false)).unwrap());
        sig[64] ^= 1;
        assert!(!verify(&digest, &sig, &key.public_key(false)).unwrap());
    }

    #[test]
    fn malformed_inputs_fail_before_curve_math() {
        let key = key_one();
        assert_eq!(
            key.sign(&[0u8; 31]),
            Err(CryptoError::InvalidMessageHash(31))
        );
        assert!(matches!(
            recover(&[0u8; 32], &[0u8; 64]),
            Err(CryptoError::InvalidSignature(_))
        ));

        let mut sig = key.sign(&[7u8; 32]).unwrap();
        sig[64] = 2;
        assert!(matches!(
            recover(&[7u8; 32], &sig),
            Err(CryptoError::InvalidSignature(_))
        ));

        assert!(matches!(
            compress_public_key(&[0x05; 33]),
            Err(CryptoError::InvalidPublicKey(_))
        ));
        assert!(matches!(
            inflate_public_key(&[0x04; 64]),
            Err(CryptoError::InvalidPublicKey(_))
        ));
    }

    #[test]
    fn recovery_id_lifts_compact_signatures() {
        let key = PrivateKey::generate();
        let digest = keccak256(b"hsm");
        let full = key.sign(&digest).unwrap();
        let parity = recovery_id_for(&digest, &full[..64], &key.public_key(true)).unwrap();
        assert_eq!(parity, full[64]);

        let stranger = PrivateKey::generate();
        assert!(recovery_id_for(&digest, &full[..64], &stranger.public_key(true)).is_err());
    }

    #[test]
    fn hex_parsing_accepts_optional_prefix() {
        let hex_key = "0x0000000000000000000000000000000000000000000000000000000000000001";
        assert_eq!(
            PrivateKey::from_hex(hex_key).unwrap().to_bytes(),
            key_one().to_bytes()
        );
        assert_eq!(
            PrivateKey::from_hex(&hex_key[2..]).unwrap().to_bytes(),
            key_one().to_bytes()
        );
        assert!(PrivateKey::from_hex("0xzz").is_err());
    }
}
