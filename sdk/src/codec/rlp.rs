//! Item tree over the `rlp` crate.
//!
//! Header layout (first byte):
//!
//! | range       | meaning                                          |
//! |-------------|--------------------------------------------------|
//! | `00..=7f`   | the byte itself                                  |
//! | `80..=b7`   | string of `b - 0x80` bytes follows               |
//! | `b8..=bf`   | `b - 0xb7` length bytes, then the string         |
//! | `c0..=f7`   | list whose payload is `b - 0xc0` bytes           |
//! | `f8..=ff`   | `b - 0xf7` length bytes, then the list payload   |
//!
//! `rlp::Rlp` reads lazily and skips malformed list children when
//! iterating, so lists are walked here one header at a time.

use rlp::{DecoderError, Rlp, RlpStream};
use thiserror::Error;

/// Reasons the decoder rejects input.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum RlpError {
    #[error("unexpected end of input")]
    Truncated,

    #[error("length header has a leading zero byte")]
    LeadingZeroLength,

    #[error("non-canonical header: long form for a short payload, or a wrapped single byte")]
    NonCanonical,

    #[error("{0} trailing bytes after the top-level item")]
    TrailingBytes(usize),

    #[error("declared length does not fit in memory")]
    LengthOverflow,

    #[error("malformed item: {0}")]
    Malformed(String),

    #[error("field `{field}`: expected {expected}")]
    UnexpectedShape {
        field: &'static str,
        expected: &'static str,
    },

    #[error("field `{field}`: {reason}")]
    InvalidField { field: &'static str, reason: String },
}

impl From<DecoderError> for RlpError {
    fn from(err: DecoderError) -> Self {
        match err {
            DecoderError::RlpIsTooShort | DecoderError::RlpInconsistentLengthAndData => {
                RlpError::Truncated
            }
            DecoderError::RlpDataLenWithZeroPrefix | DecoderError::RlpListLenWithZeroPrefix => {
                RlpError::LeadingZeroLength
            }
            DecoderError::RlpInvalidIndirection => RlpError::NonCanonical,
            DecoderError::RlpIsTooBig | DecoderError::RlpInvalidLength => RlpError::LengthOverflow,
            other => RlpError::Malformed(format!("{other:?}")),
        }
    }
}

/// A node of the encoded tree.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Item {
    Bytes(Vec<u8>),
    List(Vec<Item>),
}

impl Item {
    /// The empty byte string, which also encodes the integer zero and
    /// "absent" for optional fields.
    pub fn empty() -> Self {
        Item::Bytes(Vec::new())
    }

    /// Borrow the payload of a byte string, or fail naming `field`.
    pub fn as_bytes(&self, field: &'static str) -> Result<&[u8], RlpError> {
        match self {
            Item::Bytes(bytes) => Ok(bytes),
            Item::List(_) => Err(RlpError::UnexpectedShape {
                field,
                expected: "a byte string",
            }),
        }
    }

    /// Borrow the children of a list, or fail naming `field`.
    pub fn as_list(&self, field: &'static str) -> Result<&[Item], RlpError> {
        match self {
            Item::List(items) => Ok(items),
            Item::Bytes(_) => Err(RlpError::UnexpectedShape {
                field,
                expected: "a list",
            }),
        }
    }

    /// `true` for an empty byte string or an empty list.
    pub fn is_empty(&self) -> bool {
        match self {
            Item::Bytes(bytes) => bytes.is_empty(),
            Item::List(items) => items.is_empty(),
        }
    }
}

impl From<Vec<u8>> for Item {
    fn from(bytes: Vec<u8>) -> Self {
        Item::Bytes(bytes)
    }
}

impl From<&[u8]> for Item {
    fn from(bytes: &[u8]) -> Self {
        Item::Bytes(bytes.to_vec())
    }
}

impl From<Vec<Item>> for Item {
    fn from(items: Vec<Item>) -> Self {
        Item::List(items)
    }
}

// ---------------------------------------------------------------------------
// Encoding
// ---------------------------------------------------------------------------

/// Encode an item tree into its canonical byte form.
pub fn encode(item: &Item) -> Vec<u8> {
    let mut stream = RlpStream::new();
    append_item(&mut stream, item);
    stream.out().to_vec()
}

fn append_item(stream: &mut RlpStream, item: &Item) {
    match item {
        Item::Bytes(bytes) => {
            stream.append(bytes);
        }
        Item::List(items) => {
            stream.begin_list(items.len());
            for child in items {
                append_item(stream, child);
            }
        }
    }
}

/// Big-endian bytes of `value` with leading zeros stripped. Zero is empty.
pub fn minimal_be(value: u64) -> Vec<u8> {
    let bytes = value.to_be_bytes();
    let first = bytes.iter().position(|b| *b != 0).unwrap_or(bytes.len());
    bytes[first..].to_vec()
}

// ---------------------------------------------------------------------------
// Decoding
// ---------------------------------------------------------------------------

/// Decode exactly one item spanning all of `input`.
pub fn decode(input: &[u8]) -> Result<Item, RlpError> {
    let (item, consumed) = decode_item(input)?;
    if consumed != input.len() {
        return Err(RlpError::TrailingBytes(input.len() - consumed));
    }
    Ok(item)
}

/// Decode the item at the start of `input`, returning it with the number of
/// bytes it occupied.
fn decode_item(input: &[u8]) -> Result<(Item, usize), RlpError> {
    let info = Rlp::new(input).payload_info()?;
    let consumed = info
        .header_len
        .checked_add(info.value_len)
        .ok_or(RlpError::LengthOverflow)?;
    let own = input.get(..consumed).ok_or(RlpError::Truncated)?;

    let rlp = Rlp::new(own);
    if rlp.is_list() {
        Ok((Item::List(decode_list_payload(rlp.data()?)?), consumed))
    } else {
        // `as_val` is what rejects a single byte wrapped in a string header.
        Ok((Item::Bytes(rlp.as_val::<Vec<u8>>()?), consumed))
    }
}

fn decode_list_payload(mut payload: &[u8]) -> Result<Vec<Item>, RlpError> {
    let mut items = Vec::new();
    while !payload.is_empty() {
        let (item, consumed) = decode_item(payload)?;
        items.push(item);
        payload = &payload[consumed..];
    }
    Ok(items)
}
