//! # Canonical Binary Codec
//!
//! Length-prefixed encoding of byte strings and nested lists. Everything that
//! gets hashed or signed goes through here, so the encoder only ever produces
//! the minimal form and the decoder refuses anything else: a transaction has
//! exactly one valid byte representation.
//!
//! - [`rlp`]: the item tree, encoded and decoded through the `rlp` crate.
//! - [`scalar`]: typed helpers for unsigned integers and fixed-width blobs
//!   that sit on top of raw items.

pub mod rlp;
pub mod scalar;

pub use self::rlp::{decode, encode, Item, RlpError};
