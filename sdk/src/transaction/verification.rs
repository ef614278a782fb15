//! Who signed a transaction, and whether the signatures hold up.
//!
//! Signers are never stored; they are recovered from the signatures on
//! demand. The sender's key comes from the signing hash, the gas payer's
//! from the delegation hash bound to that recovered sender.

use tracing::warn;

use super::types::SignedTransaction;
use crate::crypto::secp256k1::recover;
use crate::error::{Result, ThorError};
use crate::identity::Address;

impl SignedTransaction {
    /// Address recovered from the sender signature.
    pub fn origin(&self) -> Result<Address> {
        let public_key = recover(&self.body.signing_hash(), self.sender_signature())?;
        Address::of_public_key(&public_key)
    }

    /// Address recovered from the gas payer signature. Fails with
    /// `NotDelegated` when the transaction has none.
    pub fn gas_payer(&self) -> Result<Address> {
        let signature = self.gas_payer_signature().ok_or(ThorError::NotDelegated)?;
        let origin = self.origin()?;
        let public_key = recover(&self.body.delegation_hash(&origin), signature)?;
        Address::of_public_key(&public_key)
    }

    pub fn is_delegated(&self) -> bool {
        self.body.is_delegated()
    }
}

/// Check that `tx` was signed by `expected_origin` and, when delegated, that
/// its gas is paid by `expected_gas_payer`.
///
/// Both digests are recomputed from the body. A mismatch is reported as
/// `InvalidSignature` naming the signer that did not match.
pub fn verify_signed_transaction(
    tx: &SignedTransaction,
    expected_origin: &Address,
    expected_gas_payer: Option<&Address>,
) -> Result<()> {
    let origin = tx.origin()?;
    if &origin != expected_origin {
        warn!(expected = %expected_origin, recovered = %origin, "sender signature mismatch");
        return Err(ThorError::InvalidSignature(format!(
            "sender signature recovers {origin}, expected {expected_origin}"
        )));
    }

    match (tx.is_delegated(), expected_gas_payer) {
        (false, None) => Ok(()),
        (false, Some(_)) => Err(ThorError::NotDelegated),
        (true, None) => Err(ThorError::illegal(
            "expected_gas_payer",
            "delegated transaction needs an expected gas payer",
        )),
        (true, Some(expected)) => {
            let gas_payer = tx.gas_payer()?;
            if &gas_payer != expected {
                warn!(expected = %expected, recovered = %gas_payer, "gas payer signature mismatch");
                return Err(ThorError::InvalidSignature(format!(
                    "gas payer signature recovers {gas_payer}, expected {expected}"
                )));
            }
            Ok(())
        }
    }
}
