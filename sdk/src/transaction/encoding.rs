//! Wire layout of transactions.
//!
//! ```text
//! legacy:   [chainTag, blockRef, expiration, clauses, gasPriceCoef,
//!            gas, dependsOn, nonce, reserved, (signature)]
//! dynamic:  0x51 ‖ [chainTag, blockRef, expiration, clauses,
//!            maxPriorityFeePerGas, maxFeePerGas,
//!            gas, dependsOn, nonce, reserved, (signature)]
//! clause:   [to | empty, value, data]
//! reserved: [features, unused...]   trailing empty entries trimmed
//! ```
//!
//! A legacy encoding always starts with a list header (`>= 0xc0`), so the
//! leading type byte is enough to tell the two apart.

use super::builder::TransactionBuilder;
use super::fee::FeeSpec;
use super::types::{Clause, Reserved, SignedTransaction, TransactionBody};
use crate::codec::scalar::{
    decode_compact_fixed, decode_optional_fixed, decode_u64, decode_uint, encode_compact_fixed,
    encode_optional_fixed, encode_u64, encode_uint,
};
use crate::codec::{self, Item, RlpError};
use crate::config::{ADDRESS_LENGTH, BLOCK_REF_LENGTH, DYNAMIC_FEE_TX_TYPE, TX_ID_LENGTH};
use crate::crypto::{keccak256, keccak256_concat};
use crate::error::{Result, ThorError};
use crate::identity::Address;

const LEGACY_FIELDS: usize = 9;
const DYNAMIC_FIELDS: usize = 10;

// ---------------------------------------------------------------------------
// Encoding
// ---------------------------------------------------------------------------

impl TransactionBody {
    /// Canonical encoding without a signature. This is what gets hashed for
    /// signing and what a remote gas payer receives.
    pub fn encode_unsigned(&self) -> Vec<u8> {
        self.encode_with_signature(None)
    }

    /// `keccak256(encode_unsigned())`, the digest the sender signs.
    pub fn signing_hash(&self) -> [u8; 32] {
        keccak256(&self.encode_unsigned())
    }

    /// `keccak256(signing_hash ‖ sender)`, the digest a gas payer signs.
    /// Binding the sender means a sponsorship cannot be replayed for
    /// anybody else.
    pub fn delegation_hash(&self, sender: &Address) -> [u8; 32] {
        delegation_hash(&self.signing_hash(), sender)
    }

    pub(crate) fn encode_with_signature(&self, signature: Option<&[u8]>) -> Vec<u8> {
        let mut fields = self.fields();
        if let Some(signature) = signature {
            fields.push(Item::Bytes(signature.to_vec()));
        }
        let list = codec::encode(&Item::List(fields));
        if self.is_dynamic_fee() {
            let mut out = Vec::with_capacity(list.len() + 1);
            out.push(DYNAMIC_FEE_TX_TYPE);
            out.extend_from_slice(&list);
            out
        } else {
            list
        }
    }

    fn fields(&self) -> Vec<Item> {
        let mut fields = vec![
            encode_u64(self.chain_tag as u64),
            encode_compact_fixed(&self.block_ref),
            encode_u64(self.expiration as u64),
            Item::List(self.clauses.iter().map(encode_clause).collect()),
        ];
        match self.fee {
            FeeSpec::Legacy { gas_price_coef } => fields.push(encode_u64(gas_price_coef as u64)),
            FeeSpec::Dynamic {
                max_fee_per_gas,
                max_priority_fee_per_gas,
            } => {
                fields.push(encode_uint(max_priority_fee_per_gas));
                fields.push(encode_uint(max_fee_per_gas));
            }
        }
        fields.push(encode_u64(self.gas));
        fields.push(encode_optional_fixed(
            self.depends_on.as_ref().map(|id| id.as_slice()),
        ));
        fields.push(encode_u64(self.nonce));
        fields.push(encode_reserved(&self.reserved));
        fields
    }

    /// Decode an unsigned encoding. A trailing signature is rejected.
    pub fn decode_unsigned(bytes: &[u8]) -> Result<Self> {
        match decode_parts(bytes)? {
            (body, None) => Ok(body),
            (_, Some(_)) => Err(RlpError::InvalidField {
                field: "signature",
                reason: "unsigned encoding carries a signature".into(),
            }
            .into()),
        }
    }
}

/// `keccak256(signing_hash ‖ sender)`.
pub fn delegation_hash(signing_hash: &[u8; 32], sender: &Address) -> [u8; 32] {
    keccak256_concat(&[signing_hash, sender.as_bytes()])
}

impl SignedTransaction {
    /// Canonical encoding including the signature; this is what gets
    /// broadcast.
    pub fn encode(&self) -> Vec<u8> {
        self.body.encode_with_signature(Some(&self.signature))
    }

    /// Transaction id: `keccak256(encode())`.
    pub fn id(&self) -> [u8; 32] {
        keccak256(&self.encode())
    }

    /// Decode a signed encoding. The signature length must match the
    /// delegation flag of the body.
    pub fn decode(bytes: &[u8]) -> Result<Self> {
        match decode_parts(bytes)? {
            (body, Some(signature)) => SignedTransaction::new(body, signature),
            (_, None) => Err(ThorError::Unsigned),
        }
    }

    /// Pair a body with a complete signature, checking its length.
    pub(crate) fn new(body: TransactionBody, signature: Vec<u8>) -> Result<Self> {
        let expected = body.expected_signature_length();
        if signature.len() != expected {
            return Err(ThorError::InvalidSignature(format!(
                "expected {expected} bytes for this transaction, got {}",
                signature.len()
            )));
        }
        Ok(Self { body, signature })
    }
}

fn encode_clause(clause: &Clause) -> Item {
    Item::List(vec![
        encode_optional_fixed(clause.to.as_ref().map(|to| to.as_bytes().as_slice())),
        encode_uint(clause.value),
        Item::Bytes(clause.data.clone()),
    ])
}

fn encode_reserved(reserved: &Reserved) -> Item {
    let mut entries = vec![encode_u64(reserved.features as u64)];
    entries.extend(reserved.unused.iter().cloned().map(Item::Bytes));
    while entries.last().is_some_and(Item::is_empty) {
        entries.pop();
    }
    Item::List(entries)
}

// ---------------------------------------------------------------------------
// Decoding
// ---------------------------------------------------------------------------

/// Split an encoding into its body and optional trailing signature.
///
/// Field-level problems surface as `MalformedEncoding`; a well-formed body
/// that breaks a builder invariant (no clauses, zero gas) surfaces as
/// `IllegalArgument`, exactly as if it had been built by hand.
fn decode_parts(bytes: &[u8]) -> Result<(TransactionBody, Option<Vec<u8>>)> {
    let (dynamic, list_bytes) = match bytes.first() {
        Some(&DYNAMIC_FEE_TX_TYPE) => (true, &bytes[1..]),
        _ => (false, bytes),
    };
    let item = codec::decode(list_bytes)?;
    let fields = item.as_list("transaction")?;

    let unsigned_len = if dynamic { DYNAMIC_FIELDS } else { LEGACY_FIELDS };
    let signature = match fields.len() {
        n if n == unsigned_len => None,
        n if n == unsigned_len + 1 => Some(fields[unsigned_len].as_bytes("signature")?.to_vec()),
        n => {
            return Err(RlpError::InvalidField {
                field: "transaction",
                reason: format!("expected {unsigned_len} or {} fields, got {n}", unsigned_len + 1),
            }
            .into())
        }
    };

    let mut next = fields.iter();
    let mut field = || next.next().ok_or(RlpError::Truncated);

    let chain_tag = decode_u64(field()?, "chainTag", 1)?;
    let block_ref = decode_compact_fixed::<BLOCK_REF_LENGTH>(field()?, "blockRef")?;
    let expiration = decode_u64(field()?, "expiration", 4)?;
    let clauses = field()?
        .as_list("clauses")?
        .iter()
        .map(decode_clause)
        .collect::<std::result::Result<Vec<_>, _>>()?;
    let fee = if dynamic {
        let max_priority_fee_per_gas = decode_uint(field()?, "maxPriorityFeePerGas", 32)?;
        let max_fee_per_gas = decode_uint(field()?, "maxFeePerGas", 32)?;
        FeeSpec::Dynamic {
            max_fee_per_gas,
            max_priority_fee_per_gas,
        }
    } else {
        FeeSpec::Legacy {
            gas_price_coef: decode_u64(field()?, "gasPriceCoef", 1)? as u8,
        }
    };
    let gas = decode_u64(field()?, "gas", 8)?;
    let depends_on = decode_optional_fixed::<TX_ID_LENGTH>(field()?, "dependsOn")?;
    let nonce = decode_u64(field()?, "nonce", 8)?;
    let reserved = decode_reserved(field()?)?;

    let mut builder = TransactionBuilder::new()
        .chain_tag(chain_tag)?
        .block_ref(block_ref)?
        .expiration(expiration)?
        .clauses(clauses)?
        .gas(gas)?
        .nonce(nonce)?
        .fee(fee)?
        .reserved(reserved)?;
    if let Some(id) = depends_on {
        builder = builder.depends_on(id)?;
    }
    Ok((builder.build()?, signature))
}

fn decode_clause(item: &Item) -> std::result::Result<Clause, RlpError> {
    let parts = item.as_list("clause")?;
    let [to, value, data] = parts else {
        return Err(RlpError::InvalidField {
            field: "clause",
            reason: format!("expected 3 entries, got {}", parts.len()),
        });
    };
    Ok(Clause {
        to: decode_optional_fixed::<ADDRESS_LENGTH>(to, "clause.to")?.map(Address::new),
        value: decode_uint(value, "clause.value", 32)?,
        data: data.as_bytes("clause.data")?.to_vec(),
        comment: None,
    })
}

fn decode_reserved(item: &Item) -> std::result::Result<Reserved, RlpError> {
    let entries = item.as_list("reserved")?;
    let Some((features, unused)) = entries.split_first() else {
        return Ok(Reserved::default());
    };
    if entries.last().is_some_and(Item::is_empty) {
        return Err(RlpError::InvalidField {
            field: "reserved",
            reason: "trailing empty entry must be trimmed".into(),
        });
    }
    Ok(Reserved {
        features: decode_u64(features, "reserved.features", 4)? as u32,
        unused: unused
            .iter()
            .map(|entry| entry.as_bytes("reserved.unused").map(<[u8]>::to_vec))
            .collect::<std::result::Result<_, _>>()?,
    })
}
