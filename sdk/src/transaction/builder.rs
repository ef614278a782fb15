//! Transaction construction via the builder pattern.
//!
//! Every setter consumes the builder, validates its input, and hands back a
//! fresh builder or an `IllegalArgument` error. Bad values are caught at the
//! call that introduced them, long before anything is hashed, signed or sent
//! over the network.
//!
//! Numeric setters are generic over `TryInto`, so callers can pass whatever
//! integer type they hold; a negative or oversized value fails the
//! conversion and is reported against the field it was meant for.
//!
//! The builder does not sign. That happens in [`super::signing`].

use primitive_types::U256;

use super::fee::FeeSpec;
use super::types::{Clause, Reserved, TransactionBody};
use crate::config::{BLOCK_REF_LENGTH, DELEGATION_FEATURE, TX_ID_LENGTH};
use crate::error::{Result, ThorError};

/// Fluent builder for [`TransactionBody`].
///
/// # Usage
///
/// ```rust
/// use primitive_types::U256;
/// use thor_sdk::identity::Address;
/// use thor_sdk::transaction::{Clause, TransactionBuilder};
///
/// # fn main() -> thor_sdk::Result<()> {
/// let to: Address = "0x7567d83b7b8d80addcb281a71d54fc7b3364ffed".parse()?;
/// let body = TransactionBuilder::new()
///     .chain_tag(0x27)?
///     .block_ref([0u8, 0, 0, 0, 0xaa, 0xbb, 0xcc, 0xdd])?
///     .expiration(32)?
///     .clause(Clause::transfer(to, U256::from(10_000u64)))?
///     .gas(21_000)?
///     .nonce(12_345_678)?
///     .build()?;
/// assert!(!body.is_dynamic_fee());
/// # Ok(())
/// # }
/// ```
///
/// Defaults: chain tag, block ref, expiration and nonce are zero, no
/// dependency, legacy fee with coefficient 0, no reserved features. Clauses
/// and gas have no usable default and must be set.
#[derive(Debug, Clone, Default)]
pub struct TransactionBuilder {
    chain_tag: u8,
    block_ref: [u8; BLOCK_REF_LENGTH],
    expiration: u32,
    clauses: Vec<Clause>,
    gas: u64,
    depends_on: Option<[u8; TX_ID_LENGTH]>,
    nonce: u64,
    gas_price_coef: Option<u8>,
    max_fee_per_gas: Option<U256>,
    max_priority_fee_per_gas: Option<U256>,
    reserved: Reserved,
}

fn narrow<T, U>(field: &'static str, value: T) -> Result<U>
where
    T: TryInto<U>,
{
    value
        .try_into()
        .map_err(|_| ThorError::illegal(field, "value is negative or out of range"))
}

impl TransactionBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    /// Start from an existing body, e.g. to re-price or re-nonce it.
    pub fn from_body(body: &TransactionBody) -> Self {
        let mut builder = Self {
            chain_tag: body.chain_tag,
            block_ref: body.block_ref,
            expiration: body.expiration,
            clauses: body.clauses.clone(),
            gas: body.gas,
            depends_on: body.depends_on,
            nonce: body.nonce,
            reserved: body.reserved.clone(),
            ..Self::default()
        };
        match body.fee {
            FeeSpec::Legacy { gas_price_coef } => builder.gas_price_coef = Some(gas_price_coef),
            FeeSpec::Dynamic {
                max_fee_per_gas,
                max_priority_fee_per_gas,
            } => {
                builder.max_fee_per_gas = Some(max_fee_per_gas);
                builder.max_priority_fee_per_gas = Some(max_priority_fee_per_gas);
            }
        }
        builder
    }

    pub fn chain_tag<T: TryInto<u8>>(mut self, chain_tag: T) -> Result<Self> {
        self.chain_tag = narrow("chain_tag", chain_tag)?;
        Ok(self)
    }

    /// Must be exactly 8 bytes.
    pub fn block_ref(mut self, block_ref: impl AsRef<[u8]>) -> Result<Self> {
        let bytes = block_ref.as_ref();
        self.block_ref = bytes.try_into().map_err(|_| {
            ThorError::illegal("block_ref", format!("expected 8 bytes, got {}", bytes.len()))
        })?;
        Ok(self)
    }

    pub fn expiration<T: TryInto<u32>>(mut self, expiration: T) -> Result<Self> {
        self.expiration = narrow("expiration", expiration)?;
        Ok(self)
    }

    /// Append one clause.
    pub fn clause(mut self, clause: Clause) -> Result<Self> {
        self.clauses.push(clause);
        Ok(self)
    }

    /// Replace all clauses. The list must not be empty.
    pub fn clauses(mut self, clauses: Vec<Clause>) -> Result<Self> {
        if clauses.is_empty() {
            return Err(ThorError::illegal("clauses", "at least one clause is required"));
        }
        self.clauses = clauses;
        Ok(self)
    }

    /// Must be greater than zero.
    pub fn gas<T: TryInto<u64>>(mut self, gas: T) -> Result<Self> {
        let gas: u64 = narrow("gas", gas)?;
        if gas == 0 {
            return Err(ThorError::illegal("gas", "must be greater than zero"));
        }
        self.gas = gas;
        Ok(self)
    }

    /// Id of a transaction that must be executed first. Must be 32 bytes.
    pub fn depends_on(mut self, tx_id: impl AsRef<[u8]>) -> Result<Self> {
        let bytes = tx_id.as_ref();
        let id: [u8; TX_ID_LENGTH] = bytes.try_into().map_err(|_| {
            ThorError::illegal("depends_on", format!("expected 32 bytes, got {}", bytes.len()))
        })?;
        self.depends_on = Some(id);
        Ok(self)
    }

    pub fn nonce<T: TryInto<u64>>(mut self, nonce: T) -> Result<Self> {
        self.nonce = narrow("nonce", nonce)?;
        Ok(self)
    }

    /// Legacy pricing. Fails if dynamic fee fields are already set.
    pub fn gas_price_coef<T: TryInto<u8>>(mut self, coef: T) -> Result<Self> {
        let coef: u8 = narrow("gas_price_coef", coef)?;
        if self.max_fee_per_gas.is_some() || self.max_priority_fee_per_gas.is_some() {
            return Err(ThorError::illegal(
                "gas_price_coef",
                "cannot be combined with dynamic fee fields",
            ));
        }
        self.gas_price_coef = Some(coef);
        Ok(self)
    }

    /// Dynamic pricing cap. Fails if a legacy coefficient is already set, or
    /// if it would fall below an already set priority fee.
    pub fn max_fee_per_gas(mut self, max_fee: U256) -> Result<Self> {
        self.reject_legacy("max_fee_per_gas")?;
        if let Some(priority) = self.max_priority_fee_per_gas {
            check_tip(max_fee, priority)?;
        }
        self.max_fee_per_gas = Some(max_fee);
        Ok(self)
    }

    /// Dynamic pricing tip. Fails if a legacy coefficient is already set, or
    /// if it would exceed an already set cap.
    pub fn max_priority_fee_per_gas(mut self, priority: U256) -> Result<Self> {
        self.reject_legacy("max_priority_fee_per_gas")?;
        if let Some(max_fee) = self.max_fee_per_gas {
            check_tip(max_fee, priority)?;
        }
        self.max_priority_fee_per_gas = Some(priority);
        Ok(self)
    }

    /// Set the fee variant wholesale, replacing whatever was set before.
    pub fn fee(mut self, fee: FeeSpec) -> Result<Self> {
        self.gas_price_coef = None;
        self.max_fee_per_gas = None;
        self.max_priority_fee_per_gas = None;
        match fee {
            FeeSpec::Legacy { gas_price_coef } => self.gas_price_coef = Some(gas_price_coef),
            FeeSpec::Dynamic {
                max_fee_per_gas,
                max_priority_fee_per_gas,
            } => {
                check_tip(max_fee_per_gas, max_priority_fee_per_gas)?;
                self.max_fee_per_gas = Some(max_fee_per_gas);
                self.max_priority_fee_per_gas = Some(max_priority_fee_per_gas);
            }
        }
        Ok(self)
    }

    /// Replace the reserved section. A trailing empty `unused` entry is
    /// rejected: the wire form trims it, so the body could not survive a
    /// round trip.
    pub fn reserved(mut self, reserved: Reserved) -> Result<Self> {
        if reserved.unused.last().is_some_and(Vec::is_empty) {
            return Err(ThorError::illegal(
                "reserved.unused",
                "trailing empty entry must be trimmed",
            ));
        }
        self.reserved = reserved;
        Ok(self)
    }

    /// Request (or drop) gas delegation, leaving other feature bits alone.
    pub fn delegated(mut self, delegated: bool) -> Result<Self> {
        if delegated {
            self.reserved.features |= DELEGATION_FEATURE;
        } else {
            self.reserved.features &= !DELEGATION_FEATURE;
        }
        Ok(self)
    }

    /// Validate the whole set and produce an immutable body.
    pub fn build(self) -> Result<TransactionBody> {
        if self.clauses.is_empty() {
            return Err(ThorError::illegal("clauses", "at least one clause is required"));
        }
        if self.gas == 0 {
            return Err(ThorError::illegal("gas", "must be greater than zero"));
        }

        let fee = if self.max_fee_per_gas.is_some() || self.max_priority_fee_per_gas.is_some() {
            FeeSpec::dynamic(
                self.max_fee_per_gas.unwrap_or_default(),
                self.max_priority_fee_per_gas.unwrap_or_default(),
            )?
        } else {
            FeeSpec::Legacy {
                gas_price_coef: self.gas_price_coef.unwrap_or(0),
            }
        };

        Ok(TransactionBody {
            chain_tag: self.chain_tag,
            block_ref: self.block_ref,
            expiration: self.expiration,
            clauses: self.clauses,
            gas: self.gas,
            depends_on: self.depends_on,
            nonce: self.nonce,
            fee,
            reserved: self.reserved,
        })
    }

    fn reject_legacy(&self, field: &'static str) -> Result<()> {
        if self.gas_price_coef.is_some() {
            return Err(ThorError::illegal(
                field,
                "cannot be combined with gas_price_coef",
            ));
        }
        Ok(())
    }
}

fn check_tip(max_fee: U256, priority: U256) -> Result<()> {
    FeeSpec::dynamic(max_fee, priority).map(|_| ())
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use crate::identity::Address;

    fn transfer() -> Clause {
        Clause::transfer(Address::new([0x42; 20]), U256::from(1_000u64))
    }

    fn base() -> TransactionBuilder {
        TransactionBuilder::new()
            .chain_tag(0x27)
            .unwrap()
            .clause(transfer())
            .unwrap()
            .gas(21_000)
            .unwrap()
    }

    fn field_of(err: ThorError) -> &'static str {
        match err {
            ThorError::IllegalArgument { field, .. } => field,
            other => panic!("expected IllegalArgument, got {other:?}"),
        }
    }

    #[test]
    fn builds_legacy_by_default() {
        let body = base().build().unwrap();
        assert_eq!(body.fee(), &FeeSpec::Legacy { gas_price_coef: 0 });
        assert!(!body.is_dynamic_fee());
        assert!(!body.is_delegated());
    }

    #[test]
    fn rejects_missing_clauses_and_gas() {
        let err = TransactionBuilder::new().gas(1).unwrap().build().unwrap_err();
        assert_eq!(field_of(err), "clauses");
        let err = TransactionBuilder::new().clauses(vec![]).unwrap_err();
        assert_eq!(field_of(err), "clauses");
        let err = TransactionBuilder::new().clause(transfer()).unwrap().build().unwrap_err();
        assert_eq!(field_of(err), "gas");
    }

    #[test]
    fn rejects_out_of_range_numbers() {
        assert_eq!(field_of(base().gas(-1i64).unwrap_err()), "gas");
        assert_eq!(field_of(base().gas(0u64).unwrap_err()), "gas");
        assert_eq!(field_of(base().nonce(-1i64).unwrap_err()), "nonce");
        assert_eq!(field_of(base().gas_price_coef(256).unwrap_err()), "gas_price_coef");
        assert_eq!(field_of(base().chain_tag(300).unwrap_err()), "chain_tag");
        assert_eq!(field_of(base().expiration(u64::MAX).unwrap_err()), "expiration");
        assert_eq!(field_of(base().block_ref([0u8; 7]).unwrap_err()), "block_ref");
        assert_eq!(field_of(base().depends_on([0u8; 31]).unwrap_err()), "depends_on");
    }

    #[test]
    fn fee_variants_are_mutually_exclusive() {
        let err = base()
            .gas_price_coef(10)
            .unwrap()
            .max_fee_per_gas(U256::from(100u64))
            .unwrap_err();
        assert_eq!(field_of(err), "max_fee_per_gas");

        let err = base()
            .max_priority_fee_per_gas(U256::from(1u64))
            .unwrap()
            .gas_price_coef(10)
            .unwrap_err();
        assert_eq!(field_of(err), "gas_price_coef");
    }

    #[test]
    fn tip_may_not_exceed_cap() {
        let err = base()
            .max_fee_per_gas(U256::from(10u64))
            .unwrap()
            .max_priority_fee_per_gas(U256::from(11u64))
            .unwrap_err();
        assert_eq!(field_of(err), "max_priority_fee_per_gas");

        // Tip alone implies a zero cap at build time.
        let err = base()
            .max_priority_fee_per_gas(U256::from(5u64))
            .unwrap()
            .build()
            .unwrap_err();
        assert_eq!(field_of(err), "max_priority_fee_per_gas");
    }

    #[test]
    fn dynamic_fields_make_a_dynamic_body() {
        let body = base()
            .max_fee_per_gas(U256::from(20u64))
            .unwrap()
            .max_priority_fee_per_gas(U256::from(5u64))
            .unwrap()
            .build()
            .unwrap();
        assert!(body.is_dynamic_fee());
        assert_eq!(
            body.fee(),
            &FeeSpec::Dynamic {
                max_fee_per_gas: U256::from(20u64),
                max_priority_fee_per_gas: U256::from(5u64)
            }
        );
    }

    #[test]
    fn delegation_toggles_only_bit_zero() {
        let body = base()
            .reserved(Reserved {
                features: 0b100,
                unused: vec![],
            })
            .unwrap()
            .delegated(true)
            .unwrap()
            .build()
            .unwrap();
        assert!(body.is_delegated());
        assert_eq!(body.reserved().features, 0b101);

        let body = TransactionBuilder::from_body(&body)
            .delegated(false)
            .unwrap()
            .build()
            .unwrap();
        assert!(!body.is_delegated());
        assert_eq!(body.reserved().features, 0b100);
    }

    #[test]
    fn reserved_rejects_trailing_empty_entry() {
        let err = base()
            .reserved(Reserved {
                features: 1,
                unused: vec![vec![]],
            })
            .unwrap_err();
        assert_eq!(field_of(err), "reserved.unused");

        let err = base()
            .reserved(Reserved {
                features: 0,
                unused: vec![vec![0xaa], vec![]],
            })
            .unwrap_err();
        assert_eq!(field_of(err), "reserved.unused");

        // Empty entries in the middle survive the wire form.
        let reserved = Reserved {
            features: 1,
            unused: vec![vec![], vec![0xaa]],
        };
        let body = base().reserved(reserved.clone()).unwrap().build().unwrap();
        let back = TransactionBody::decode_unsigned(&body.encode_unsigned()).unwrap();
        assert_eq!(back.reserved(), &reserved);
        assert_eq!(back, body);
    }

    #[test]
    fn from_body_keeps_every_field() {
        let original = base()
            .nonce(7)
            .unwrap()
            .depends_on([9u8; 32])
            .unwrap()
            .gas_price_coef(128)
            .unwrap()
            .build()
            .unwrap();
        let copy = TransactionBuilder::from_body(&original).build().unwrap();
        assert_eq!(copy, original);
    }
}
