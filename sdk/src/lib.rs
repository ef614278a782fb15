// Copyright (c) 2026 ALAS Technology. MIT License.
// See LICENSE for details.

//! # Thor SDK: Transaction Core
//!
//! Everything needed to put a transaction on a Thor chain short of talking to
//! the node about it: build the body, encode it canonically, sign it (alone
//! or with a gas payer footing the bill), and pick sensible fees.
//!
//! ## Architecture
//!
//! - **codec**: Canonical length-prefixed encoding. Strict on the way in.
//! - **crypto**: secp256k1 signing and recovery, Keccak-256.
//! - **identity**: Addresses with checksums, mnemonics, HD derivation.
//! - **transaction**: Bodies, the builder, wire layouts, signing, verification.
//! - **delegation**: The gas payer capability, local or over HTTP.
//! - **fees**: Priority fee suggestion from the node's fee history.
//! - **http**: The seam every network call goes through.
//! - **config**: Protocol constants and client settings.
//! - **logging**: Optional `tracing` subscriber setup.
//!
//! ## Quick tour
//!
//! ```
//! use primitive_types::U256;
//! use thor_sdk::crypto::PrivateKey;
//! use thor_sdk::identity::Address;
//! use thor_sdk::transaction::{sign_transaction, Clause, SignedTransaction, TransactionBuilder};
//!
//! # fn main() -> thor_sdk::Result<()> {
//! let key = PrivateKey::generate();
//! let to: Address = "0x7567d83b7b8d80addcb281a71d54fc7b3364ffed".parse()?;
//!
//! let body = TransactionBuilder::new()
//!     .chain_tag(0x27)?
//!     .clause(Clause::transfer(to, U256::from(10_000u64)))?
//!     .gas(21_000)?
//!     .build()?;
//! let signed = sign_transaction(body, &key)?;
//!
//! let decoded = SignedTransaction::decode(&signed.encode())?;
//! assert_eq!(decoded.origin()?, Address::of_private_key(&key));
//! # Ok(())
//! # }
//! ```
//!
//! ## Design Philosophy
//!
//! 1. Values are immutable once built. Changing one means building another.
//! 2. Decoding is as strict as encoding: one value, one byte string.
//! 3. Signers are recovered, never trusted from the payload.
//! 4. Nothing retries behind your back.

pub mod codec;
pub mod config;
pub mod crypto;
pub mod delegation;
pub mod error;
pub mod fees;
pub mod http;
pub mod identity;
pub mod logging;
pub mod transaction;

pub use error::{Result, ThorError};
