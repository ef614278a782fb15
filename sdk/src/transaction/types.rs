//! Core value types: clauses, the reserved field, the unsigned body and the
//! fully signed transaction.
//!
//! Bodies are immutable once built. The only ways to obtain one are
//! [`super::TransactionBuilder::build`] and decoding, and both enforce the
//! same invariants, so every `TransactionBody` in memory is valid.

use primitive_types::U256;

use super::fee::FeeSpec;
use crate::config::{
    DELEGATED_SIGNATURE_LENGTH, DELEGATION_FEATURE, ENERGY_ADDRESS, SIGNATURE_LENGTH,
    TRANSFER_FROM_SELECTOR, TRANSFER_SELECTOR,
};
use crate::identity::Address;

// ---------------------------------------------------------------------------
// Clause
// ---------------------------------------------------------------------------

/// One independent operation inside a transaction: a value transfer, a
/// contract call, or a contract deployment when `to` is absent.
///
/// `comment` is a local annotation for UIs and logs. It is never encoded and
/// does not take part in equality.
#[derive(Debug, Clone, Default)]
pub struct Clause {
    pub to: Option<Address>,
    pub value: U256,
    pub data: Vec<u8>,
    pub comment: Option<String>,
}

impl Clause {
    /// Plain value transfer.
    pub fn transfer(to: Address, value: U256) -> Self {
        Self {
            to: Some(to),
            value,
            ..Self::default()
        }
    }

    /// Call `to` with ABI-encoded `data`, optionally attaching value.
    pub fn call(to: Address, data: Vec<u8>, value: U256) -> Self {
        Self {
            to: Some(to),
            value,
            data,
            comment: None,
        }
    }

    /// Deploy a contract from its init code.
    pub fn deploy(bytecode: Vec<u8>) -> Self {
        Self {
            to: None,
            data: bytecode,
            ..Self::default()
        }
    }

    /// Deploy a contract, appending already ABI-encoded constructor
    /// arguments to its init code.
    pub fn deploy_with_args(bytecode: Vec<u8>, constructor_args: &[u8]) -> Self {
        let mut data = bytecode;
        data.extend_from_slice(constructor_args);
        Self::deploy(data)
    }

    /// ERC-20 `transfer(to, amount)` on `token`. No value is attached.
    pub fn transfer_token(token: Address, to: Address, amount: U256) -> Self {
        let data = abi_call(TRANSFER_SELECTOR, &[address_word(&to), uint_word(amount)]);
        Self::call(token, data, U256::zero())
    }

    /// [`Clause::transfer_token`] on the built-in VTHO contract.
    pub fn transfer_vtho(to: Address, amount: U256) -> Self {
        Self::transfer_token(Address::new(ENERGY_ADDRESS), to, amount)
    }

    /// ERC-721 `transferFrom(from, to, token_id)` on `contract`.
    pub fn transfer_nft(contract: Address, from: Address, to: Address, token_id: U256) -> Self {
        let data = abi_call(
            TRANSFER_FROM_SELECTOR,
            &[address_word(&from), address_word(&to), uint_word(token_id)],
        );
        Self::call(contract, data, U256::zero())
    }

    pub fn with_comment(mut self, comment: impl Into<String>) -> Self {
        self.comment = Some(comment.into());
        self
    }

    /// `true` when the clause creates a contract.
    pub fn is_contract_creation(&self) -> bool {
        self.to.is_none()
    }
}

fn abi_call(selector: [u8; 4], words: &[[u8; 32]]) -> Vec<u8> {
    let mut data = Vec::with_capacity(4 + 32 * words.len());
    data.extend_from_slice(&selector);
    for word in words {
        data.extend_from_slice(word);
    }
    data
}

fn address_word(address: &Address) -> [u8; 32] {
    let mut word = [0u8; 32];
    word[12..].copy_from_slice(address.as_bytes());
    word
}

fn uint_word(value: U256) -> [u8; 32] {
    let mut word = [0u8; 32];
    value.to_big_endian(&mut word);
    word
}

impl PartialEq for Clause {
    fn eq(&self, other: &Self) -> bool {
        self.to == other.to && self.value == other.value && self.data == other.data
    }
}

impl Eq for Clause {}

// ---------------------------------------------------------------------------
// Reserved
// ---------------------------------------------------------------------------

/// Forward-compatibility slot. `features` is a bit set (bit 0 requests gas
/// delegation); `unused` carries any trailing entries a newer protocol
/// version might add, so they survive a decode/encode round trip.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Reserved {
    pub features: u32,
    pub unused: Vec<Vec<u8>>,
}

impl Reserved {
    /// Reserved field with only the delegation bit set.
    pub fn delegated() -> Self {
        Self {
            features: DELEGATION_FEATURE,
            unused: Vec::new(),
        }
    }

    pub fn is_delegated(&self) -> bool {
        self.features & DELEGATION_FEATURE == DELEGATION_FEATURE
    }
}

// ---------------------------------------------------------------------------
// TransactionBody
// ---------------------------------------------------------------------------

/// A validated, unsigned transaction.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TransactionBody {
    pub(crate) chain_tag: u8,
    pub(crate) block_ref: [u8; 8],
    pub(crate) expiration: u32,
    pub(crate) clauses: Vec<Clause>,
    pub(crate) gas: u64,
    pub(crate) depends_on: Option<[u8; 32]>,
    pub(crate) nonce: u64,
    pub(crate) fee: FeeSpec,
    pub(crate) reserved: Reserved,
}

impl TransactionBody {
    /// Last byte of the target network's genesis block id.
    pub fn chain_tag(&self) -> u8 {
        self.chain_tag
    }

    /// First 8 bytes of a recent block id; the transaction is valid from
    /// that block on.
    pub fn block_ref(&self) -> [u8; 8] {
        self.block_ref
    }

    /// Number of blocks after `block_ref` the transaction stays valid.
    pub fn expiration(&self) -> u32 {
        self.expiration
    }

    pub fn clauses(&self) -> &[Clause] {
        &self.clauses
    }

    /// Gas ceiling for the whole transaction.
    pub fn gas(&self) -> u64 {
        self.gas
    }

    /// Id of a transaction that must be executed before this one.
    pub fn depends_on(&self) -> Option<&[u8; 32]> {
        self.depends_on.as_ref()
    }

    pub fn nonce(&self) -> u64 {
        self.nonce
    }

    pub fn fee(&self) -> &FeeSpec {
        &self.fee
    }

    pub fn reserved(&self) -> &Reserved {
        &self.reserved
    }

    /// Derived from the fee variant on every call.
    pub fn is_dynamic_fee(&self) -> bool {
        matches!(self.fee, FeeSpec::Dynamic { .. })
    }

    /// Derived from `reserved.features` on every call.
    pub fn is_delegated(&self) -> bool {
        self.reserved.is_delegated()
    }

    /// Signature length this body expects once fully signed.
    pub fn expected_signature_length(&self) -> usize {
        if self.is_delegated() {
            DELEGATED_SIGNATURE_LENGTH
        } else {
            SIGNATURE_LENGTH
        }
    }
}

// ---------------------------------------------------------------------------
// SignedTransaction
// ---------------------------------------------------------------------------

/// A body plus its complete signature: 65 bytes, or 130 when delegated.
///
/// Produced by the signing functions in [`super::signing`] or by
/// [`SignedTransaction::decode`]; its canonical encoding is what gets
/// broadcast.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SignedTransaction {
    pub(crate) body: TransactionBody,
    pub(crate) signature: Vec<u8>,
}

impl SignedTransaction {
    pub fn body(&self) -> &TransactionBody {
        &self.body
    }

    pub fn signature(&self) -> &[u8] {
        &self.signature
    }

    /// The sender's 65-byte signature.
    pub fn sender_signature(&self) -> &[u8] {
        &self.signature[..SIGNATURE_LENGTH]
    }

    /// The gas payer's 65-byte signature, when delegated.
    pub fn gas_payer_signature(&self) -> Option<&[u8]> {
        self.body
            .is_delegated()
            .then(|| &self.signature[SIGNATURE_LENGTH..])
    }
}
