//! Crate-wide error type.
//!
//! Module-level errors ([`RlpError`], [`CryptoError`]) stay close to the code
//! that raises them; everything that crosses a public API boundary surfaces
//! as a [`ThorError`]. Every variant carries enough context (field name, raw
//! bytes or raw response) to reproduce the failure in a test.

use thiserror::Error;

use crate::codec::RlpError;
use crate::crypto::secp256k1::CryptoError;

/// Convenience alias used across the crate.
pub type Result<T> = std::result::Result<T, ThorError>;

/// Errors surfaced by the SDK core.
#[derive(Debug, Error)]
pub enum ThorError {
    /// An invariant was violated while constructing or mutating a value.
    /// Local and non-retryable.
    #[error("illegal argument `{field}`: {reason}")]
    IllegalArgument {
        /// The offending field or parameter.
        field: &'static str,
        /// What was wrong with it.
        reason: String,
    },

    /// Binary input was truncated or not in canonical form.
    #[error("malformed encoding: {0}")]
    MalformedEncoding(#[from] RlpError),

    /// Private key is not a valid secp256k1 scalar (zero or >= curve order).
    #[error("invalid private key")]
    InvalidPrivateKey,

    /// Message digest is not exactly 32 bytes.
    #[error("invalid message hash: expected 32 bytes, got {0}")]
    InvalidMessageHash(usize),

    /// Signature has the wrong length, a bad recovery id, or does not verify.
    #[error("invalid signature: {0}")]
    InvalidSignature(String),

    /// Public key bytes are not a valid curve point in a recognised format.
    #[error("invalid public key: {0}")]
    InvalidPublicKey(String),

    /// The gas payer service returned an error status or an unusable body.
    /// `response` is the raw body, kept for diagnostics.
    #[error("remote gas signer error: {reason}")]
    RemoteGasSigner {
        /// What was wrong with the response.
        reason: String,
        /// The raw response body as received.
        response: String,
    },

    /// Timeout or connection failure talking to a collaborator.
    #[error("network error: {0}")]
    Network(String),

    /// A collaborator response (or request option) had the wrong shape.
    #[error("invalid data type: {0}")]
    InvalidDataType(String),

    /// A delegation-only operation was attempted on a non-delegated transaction.
    #[error("transaction is not delegated")]
    NotDelegated,

    /// Bytes decoded as a signed transaction carried no signature.
    #[error("transaction is not signed")]
    Unsigned,
}

impl From<CryptoError> for ThorError {
    fn from(err: CryptoError) -> Self {
        match err {
            CryptoError::InvalidPrivateKey => Self::InvalidPrivateKey,
            CryptoError::InvalidMessageHash(len) => Self::InvalidMessageHash(len),
            CryptoError::InvalidSignature(reason) => Self::InvalidSignature(reason),
            CryptoError::InvalidPublicKey(reason) => Self::InvalidPublicKey(reason),
        }
    }
}

impl ThorError {
    /// Shorthand for [`ThorError::IllegalArgument`].
    pub(crate) fn illegal(field: &'static str, reason: impl Into<String>) -> Self {
        Self::IllegalArgument {
            field,
            reason: reason.into(),
        }
    }

    /// Returns `true` for errors the caller may reasonably retry with backoff.
    pub fn is_retryable(&self) -> bool {
        matches!(self, Self::Network(_))
    }
}
