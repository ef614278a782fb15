//! # Transaction Module
//!
//! Construction, canonical encoding, signing and verification of
//! multi-clause transactions.
//!
//! ## Architecture
//!
//! ```text
//! types.rs       : Clause, Reserved, TransactionBody, SignedTransaction
//! fee.rs         : FeeSpec (legacy vs dynamic) and conversions between them
//! gas.rs         : intrinsic gas of a clause list
//! builder.rs     : TransactionBuilder with eager, per-setter validation
//! encoding.rs    : wire layout, signing/delegation digests, transaction id
//! signing.rs     : single-signer and delegated signing state machine
//! verification.rs: signer recovery and signature checks
//! ```
//!
//! ## Transaction Lifecycle
//!
//! 1. **Build**: [`TransactionBuilder`] yields an immutable [`TransactionBody`].
//! 2. **Sign**: [`sign_transaction`] for a single signer, or
//!    [`sign_as_sender`] followed by a gas payer signature when the body
//!    requests delegation.
//! 3. **Broadcast**: [`SignedTransaction::encode`] is the wire form; its
//!    Keccak-256 is [`SignedTransaction::id`].
//! 4. **Verify**: [`verify_signed_transaction`] recovers and checks both
//!    signers.
//!
//! ## Design Decisions
//!
//! - Amounts and fees are `U256`. No floating point anywhere near value.
//! - Gas and nonce are `u64`; every integer field is range-checked when set.
//! - The fee scheme is a sum type, so a body with both a legacy coefficient
//!   and dynamic fields cannot exist.

pub mod builder;
pub mod encoding;
pub mod fee;
pub mod gas;
pub mod signing;
pub mod types;
pub mod verification;

pub use builder::TransactionBuilder;
pub use encoding::delegation_hash;
pub use fee::{dynamic_to_legacy, legacy_to_dynamic, FeeSpec};
pub use gas::intrinsic_gas;
pub use signing::{
    sign_as_sender, sign_transaction, sign_with_gas_payer, sign_with_remote_gas_payer,
    SenderSigned,
};
pub use types::{Clause, Reserved, SignedTransaction, TransactionBody};
pub use verification::verify_signed_transaction;
