//! Transaction signing, single-signer and delegated.
//!
//! ```text
//!            sign_transaction
//! Body ───────────────────────────────────────────────▶ SignedTransaction
//!   │                                                         ▲
//!   │ sign_as_sender                                          │
//!   └──────────────▶ SenderSigned ── sign_as_gas_payer ───────┤
//!                                 └─ request_gas_payer ───────┘
//! ```
//!
//! The types enforce the order: a gas payer can only sign something that
//! already carries the sender signature, and a `SignedTransaction` always has
//! the full signature its body asks for.

use tracing::{debug, warn};

use super::types::{SignedTransaction, TransactionBody};
use crate::config::{DELEGATED_SIGNATURE_LENGTH, SIGNATURE_LENGTH};
use crate::crypto::PrivateKey;
use crate::delegation::GasPayer;
use crate::error::{Result, ThorError};
use crate::identity::Address;

/// Sign a non-delegated body with the sender's key.
///
/// A delegated body needs a second signature, so it is refused here; use
/// [`sign_as_sender`] or [`sign_with_gas_payer`] instead.
pub fn sign_transaction(body: TransactionBody, sender_key: &PrivateKey) -> Result<SignedTransaction> {
    if body.is_delegated() {
        return Err(ThorError::illegal(
            "reserved.features",
            "delegated transaction needs a gas payer signature",
        ));
    }
    let signature = sender_key.sign(&body.signing_hash())?;
    debug!(sender = %Address::of_private_key(sender_key), "signed transaction");
    SignedTransaction::new(body, signature.to_vec())
}

/// First half of delegated signing: the sender signs, and the result waits
/// for a gas payer.
pub fn sign_as_sender(body: TransactionBody, sender_key: &PrivateKey) -> Result<SenderSigned> {
    if !body.is_delegated() {
        return Err(ThorError::NotDelegated);
    }
    let sender_signature = sender_key.sign(&body.signing_hash())?;
    let sender = Address::of_private_key(sender_key);
    debug!(%sender, "sender signed delegated transaction");
    Ok(SenderSigned {
        body,
        sender,
        sender_signature,
    })
}

/// Both signatures in one step, with the gas payer key at hand.
pub fn sign_with_gas_payer(
    body: TransactionBody,
    sender_key: &PrivateKey,
    gas_payer_key: &PrivateKey,
) -> Result<SignedTransaction> {
    sign_as_sender(body, sender_key)?.sign_as_gas_payer(gas_payer_key)
}

/// Both signatures, with the gas payer reached through `gas_payer`
/// (typically a [`crate::delegation::RemoteGasPayer`]).
pub async fn sign_with_remote_gas_payer(
    body: TransactionBody,
    sender_key: &PrivateKey,
    gas_payer: &dyn GasPayer,
) -> Result<SignedTransaction> {
    sign_as_sender(body, sender_key)?
        .request_gas_payer(gas_payer)
        .await
}

// ---------------------------------------------------------------------------
// SenderSigned
// ---------------------------------------------------------------------------

/// A delegated transaction carrying only the sender's signature.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SenderSigned {
    body: TransactionBody,
    sender: Address,
    sender_signature: [u8; SIGNATURE_LENGTH],
}

impl SenderSigned {
    pub fn body(&self) -> &TransactionBody {
        &self.body
    }

    /// Address that signed as sender.
    pub fn sender(&self) -> Address {
        self.sender
    }

    pub fn sender_signature(&self) -> &[u8; SIGNATURE_LENGTH] {
        &self.sender_signature
    }

    /// The digest the gas payer must sign.
    pub fn delegation_hash(&self) -> [u8; 32] {
        self.body.delegation_hash(&self.sender)
    }

    /// Sign as gas payer with a local key.
    pub fn sign_as_gas_payer(self, gas_payer_key: &PrivateKey) -> Result<SignedTransaction> {
        let signature = gas_payer_key.sign(&self.delegation_hash())?;
        debug!(
            sender = %self.sender,
            gas_payer = %Address::of_private_key(gas_payer_key),
            "gas payer signed transaction"
        );
        self.complete(signature)
    }

    /// Ask `gas_payer` for its signature.
    ///
    /// The returned signature is attached as is: it is checked for shape, not
    /// for validity, since only the node decides whether a sponsorship is
    /// acceptable. Nothing is retried.
    pub async fn request_gas_payer(self, gas_payer: &dyn GasPayer) -> Result<SignedTransaction> {
        let unsigned = self.body.encode_unsigned();
        let signature = gas_payer.sign(&unsigned, &self.sender).await.map_err(|err| {
            warn!(sender = %self.sender, error = %err, "gas payer refused to sign");
            err
        })?;
        debug!(sender = %self.sender, "received gas payer signature");
        self.complete(signature)
    }

    fn complete(self, gas_payer_signature: [u8; SIGNATURE_LENGTH]) -> Result<SignedTransaction> {
        let mut signature = Vec::with_capacity(DELEGATED_SIGNATURE_LENGTH);
        signature.extend_from_slice(&self.sender_signature);
        signature.extend_from_slice(&gas_payer_signature);
        SignedTransaction::new(self.body, signature)
    }
}

#[cfg(test)]
mod tests {
    use primitive_types::U256;

    use super::*;
    use crate::transaction::{Clause, TransactionBuilder};

    fn body(delegated: bool) -> TransactionBody {
        TransactionBuilder::new()
            .chain_tag(0x27)
            .unwrap()
            .clause(Clause::transfer(Address::new([3u8; 20]), U256::from(5u64)))
            .unwrap()
            .gas(21_000)
            .unwrap()
            .delegated(delegated)
            .unwrap()
            .build()
            .unwrap()
    }

    #[test]
    fn single_signer_produces_65_bytes() {
        let key = PrivateKey::generate();
        let signed = sign_transaction(body(false), &key).unwrap();
        assert_eq!(signed.signature().len(), 65);
        assert!(signed.gas_payer_signature().is_none());
    }

    #[test]
    fn signing_is_deterministic() {
        let key = PrivateKey::generate();
        let a = sign_transaction(body(false), &key).unwrap();
        let b = sign_transaction(body(false), &key).unwrap();
        assert_eq!(a.signature(), b.signature());
        assert_eq!(a.id(), b.id());
    }

    #[test]
    fn single_signer_refuses_delegated_body() {
        let err = sign_transaction(body(true), &PrivateKey::generate()).unwrap_err();
        assert!(matches!(err, ThorError::IllegalArgument { .. }));
    }

    #[test]
    fn sender_signing_requires_delegation() {
        let err = sign_as_sender(body(false), &PrivateKey::generate()).unwrap_err();
        assert!(matches!(err, ThorError::NotDelegated));
    }

    #[test]
    fn delegated_signature_is_sender_then_gas_payer() {
        let sender = PrivateKey::generate();
        let payer = PrivateKey::generate();
        let partial = sign_as_sender(body(true), &sender).unwrap();
        assert_eq!(partial.sender(), Address::of_private_key(&sender));
        let sender_signature = *partial.sender_signature();
        let payer_signature = payer.sign(&partial.delegation_hash()).unwrap();

        let signed = partial.sign_as_gas_payer(&payer).unwrap();
        assert_eq!(signed.signature().len(), 130);
        assert_eq!(signed.sender_signature(), &sender_signature[..]);
        assert_eq!(signed.gas_payer_signature(), Some(&payer_signature[..]));
    }

    #[test]
    fn one_step_and_two_step_agree() {
        let sender = PrivateKey::generate();
        let payer = PrivateKey::generate();
        let one = sign_with_gas_payer(body(true), &sender, &payer).unwrap();
        let two = sign_as_sender(body(true), &sender)
            .unwrap()
            .sign_as_gas_payer(&payer)
            .unwrap();
        assert_eq!(one, two);
    }
}
