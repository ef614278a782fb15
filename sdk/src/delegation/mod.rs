//! # Gas Delegation
//!
//! A delegated transaction carries two signatures: the sender's over the
//! signing hash, and a gas payer's over `keccak256(signing_hash ‖ sender)`.
//! The gas payer is whoever holds the second key, and it is modelled as the
//! [`GasPayer`] capability so the signing state machine does not care where
//! that key lives:
//!
//! - [`LocalGasPayer`] holds the private key in process.
//! - [`RemoteGasPayer`] asks a sponsorship service over HTTP.
//!
//! Both receive exactly what a remote service would: the unsigned encoding
//! and the sender address.

pub mod remote;

use async_trait::async_trait;

use crate::crypto::{keccak256, PrivateKey};
use crate::error::Result;
use crate::identity::Address;
use crate::transaction::encoding::delegation_hash;

pub use remote::RemoteGasPayer;

/// Something that can produce the gas payer signature for a transaction.
#[async_trait]
pub trait GasPayer: Send + Sync {
    /// Sign the delegation digest of `unsigned_encoding` for `sender`,
    /// returning a 65-byte `r ‖ s ‖ v` signature.
    async fn sign(&self, unsigned_encoding: &[u8], sender: &Address) -> Result<[u8; 65]>;
}

/// Gas payer backed by a private key held in this process.
#[derive(Debug, Clone)]
pub struct LocalGasPayer {
    key: PrivateKey,
}

impl LocalGasPayer {
    pub fn new(key: PrivateKey) -> Self {
        Self { key }
    }

    /// Address that ends up paying for gas.
    pub fn address(&self) -> Address {
        Address::of_private_key(&self.key)
    }

    /// Synchronous form of [`GasPayer::sign`].
    pub fn sign_delegation(&self, unsigned_encoding: &[u8], sender: &Address) -> Result<[u8; 65]> {
        let digest = delegation_hash(&keccak256(unsigned_encoding), sender);
        Ok(self.key.sign(&digest)?)
    }
}

#[async_trait]
impl GasPayer for LocalGasPayer {
    async fn sign(&self, unsigned_encoding: &[u8], sender: &Address) -> Result<[u8; 65]> {
        self.sign_delegation(unsigned_encoding, sender)
    }
}
