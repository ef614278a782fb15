//! Typed scalar kinds layered on raw items.
//!
//! Three shapes cover every transaction field:
//!
//! - **uint**: minimal big-endian, zero is the empty string, bounded width.
//! - **compact fixed**: a fixed-width blob whose leading zero bytes are
//!   dropped on the wire (the block reference).
//! - **optional fixed**: a fixed-width blob or nothing (`to`, `dependsOn`).
//!
//! Decoders are strict: a value that the encoder would never have produced is
//! rejected, since a second spelling of the same field would yield a second
//! transaction id.

use primitive_types::U256;

use super::rlp::{minimal_be, Item, RlpError};

fn invalid(field: &'static str, reason: impl Into<String>) -> RlpError {
    RlpError::InvalidField {
        field,
        reason: reason.into(),
    }
}

fn strip_leading_zeros(bytes: &[u8]) -> &[u8] {
    let first = bytes.iter().position(|b| *b != 0).unwrap_or(bytes.len());
    &bytes[first..]
}

// ---------------------------------------------------------------------------
// uint
// ---------------------------------------------------------------------------

/// Encode a 256-bit unsigned integer.
pub fn encode_uint(value: U256) -> Item {
    let mut buf = [0u8; 32];
    value.to_big_endian(&mut buf);
    Item::Bytes(strip_leading_zeros(&buf).to_vec())
}

/// Encode a machine-word unsigned integer.
pub fn encode_u64(value: u64) -> Item {
    Item::Bytes(minimal_be(value))
}

/// Decode an unsigned integer of at most `max_bytes` bytes.
pub fn decode_uint(item: &Item, field: &'static str, max_bytes: usize) -> Result<U256, RlpError> {
    let bytes = item.as_bytes(field)?;
    if bytes.len() > max_bytes {
        return Err(invalid(
            field,
            format!("{} bytes exceed the {max_bytes}-byte limit", bytes.len()),
        ));
    }
    if bytes.first() == Some(&0) {
        return Err(invalid(field, "integer has a leading zero byte"));
    }
    Ok(U256::from_big_endian(bytes))
}

/// Decode an unsigned integer that fits a `u64`. `max_bytes` must be <= 8.
pub fn decode_u64(item: &Item, field: &'static str, max_bytes: usize) -> Result<u64, RlpError> {
    debug_assert!(max_bytes <= 8);
    Ok(decode_uint(item, field, max_bytes.min(8))?.low_u64())
}

// ---------------------------------------------------------------------------
// compact fixed blob
// ---------------------------------------------------------------------------

/// Encode a fixed-width blob with its leading zero bytes removed.
pub fn encode_compact_fixed(bytes: &[u8]) -> Item {
    Item::Bytes(strip_leading_zeros(bytes).to_vec())
}

/// Decode a compact blob back to `N` bytes, left-padding with zeros.
pub fn decode_compact_fixed<const N: usize>(
    item: &Item,
    field: &'static str,
) -> Result<[u8; N], RlpError> {
    let bytes = item.as_bytes(field)?;
    if bytes.len() > N {
        return Err(invalid(field, format!("expected at most {N} bytes, got {}", bytes.len())));
    }
    if bytes.first() == Some(&0) {
        return Err(invalid(field, "compact value has a leading zero byte"));
    }
    let mut out = [0u8; N];
    out[N - bytes.len()..].copy_from_slice(bytes);
    Ok(out)
}

// ---------------------------------------------------------------------------
// optional fixed blob
// ---------------------------------------------------------------------------

/// Encode an optional fixed-width blob; `None` becomes the empty string.
pub fn encode_optional_fixed(bytes: Option<&[u8]>) -> Item {
    match bytes {
        Some(bytes) => Item::Bytes(bytes.to_vec()),
        None => Item::empty(),
    }
}

/// Decode an optional blob that, when present, is exactly `N` bytes.
pub fn decode_optional_fixed<const N: usize>(
    item: &Item,
    field: &'static str,
) -> Result<Option<[u8; N]>, RlpError> {
    let bytes = item.as_bytes(field)?;
    if bytes.is_empty() {
        return Ok(None);
    }
    let fixed: [u8; N] = bytes
        .try_into()
        .map_err(|_| invalid(field, format!("expected {N} bytes, got {}", bytes.len())))?;
    Ok(Some(fixed))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn uint_zero_is_empty_string() {
        assert_eq!(encode_uint(U256::zero()), Item::empty());
        assert_eq!(encode_u64(0), Item::empty());
        assert_eq!(decode_uint(&Item::empty(), "value", 32).unwrap(), U256::zero());
    }

    #[test]
    fn uint_is_minimal_big_endian() {
        assert_eq!(encode_u64(21_000), Item::Bytes(vec![0x52, 0x08]));
        let big = U256::from(10u64).pow(U256::from(18u64));
        let item = encode_uint(big);
        assert_eq!(item, Item::Bytes(hex::decode("0de0b6b3a7640000").unwrap()));
        assert_eq!(decode_uint(&item, "value", 32).unwrap(), big);
    }

    #[test]
    fn uint_rejects_leading_zero_and_overflow() {
        let padded = Item::Bytes(vec![0x00, 0x01]);
        assert!(matches!(
            decode_u64(&padded, "nonce", 8),
            Err(RlpError::InvalidField { field: "nonce", .. })
        ));

        let wide = Item::Bytes(vec![0x01, 0x00]);
        assert!(decode_u64(&wide, "chainTag", 1).is_err());
        assert_eq!(decode_u64(&wide, "expiration", 4).unwrap(), 256);
    }

    #[test]
    fn uint_rejects_lists() {
        let list = Item::List(vec![]);
        assert!(matches!(
            decode_uint(&list, "gas", 8),
            Err(RlpError::UnexpectedShape { field: "gas", .. })
        ));
    }

    #[test]
    fn compact_blob_drops_and_restores_leading_zeros() {
        let block_ref = [0, 0, 0, 0x2a, 0x01, 0x02, 0x03, 0x04];
        let item = encode_compact_fixed(&block_ref);
        assert_eq!(item, Item::Bytes(vec![0x2a, 0x01, 0x02, 0x03, 0x04]));
        assert_eq!(decode_compact_fixed::<8>(&item, "blockRef").unwrap(), block_ref);

        assert_eq!(encode_compact_fixed(&[0u8; 8]), Item::empty());
        assert_eq!(decode_compact_fixed::<8>(&Item::empty(), "blockRef").unwrap(), [0u8; 8]);
    }

    #[test]
    fn compact_blob_rejects_non_canonical_forms() {
        assert!(decode_compact_fixed::<8>(&Item::Bytes(vec![0, 1]), "blockRef").is_err());
        assert!(decode_compact_fixed::<8>(&Item::Bytes(vec![1; 9]), "blockRef").is_err());
    }

    #[test]
    fn optional_blob_requires_exact_width() {
        assert_eq!(decode_optional_fixed::<20>(&Item::empty(), "to").unwrap(), None);
        let present = encode_optional_fixed(Some(&[7u8; 20]));
        assert_eq!(decode_optional_fixed::<20>(&present, "to").unwrap(), Some([7u8; 20]));
        assert!(decode_optional_fixed::<20>(&Item::Bytes(vec![7; 19]), "to").is_err());
        assert!(decode_optional_fixed::<32>(&Item::Bytes(vec![7; 33]), "dependsOn").is_err());
    }
}
