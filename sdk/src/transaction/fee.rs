//! Fee pricing: the legacy coefficient scheme and the dynamic (base fee plus
//! priority tip) scheme, and best-effort conversion between them.
//!
//! ```text
//! legacy:   price = base × (255 + coef) / 255
//! dynamic:  price = min(max_fee, base + max_priority)
//! ```
//!
//! A body carries exactly one variant; "both set" cannot be expressed.

use primitive_types::U256;

use crate::config::MAX_GAS_PRICE_COEF;
use crate::error::{Result, ThorError};

/// How a transaction prices its gas.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FeeSpec {
    /// Price is a fixed markup of 0..=255/255 over the base fee.
    Legacy { gas_price_coef: u8 },
    /// Price is the base fee plus a tip, capped at `max_fee_per_gas`.
    /// Invariant: `max_fee_per_gas >= max_priority_fee_per_gas`.
    Dynamic {
        max_fee_per_gas: U256,
        max_priority_fee_per_gas: U256,
    },
}

impl Default for FeeSpec {
    fn default() -> Self {
        FeeSpec::Legacy { gas_price_coef: 0 }
    }
}

impl FeeSpec {
    /// Dynamic spec, checking the tip does not exceed the cap.
    pub fn dynamic(max_fee_per_gas: U256, max_priority_fee_per_gas: U256) -> Result<Self> {
        if max_priority_fee_per_gas > max_fee_per_gas {
            return Err(ThorError::illegal(
                "max_priority_fee_per_gas",
                format!(
                    "{max_priority_fee_per_gas} exceeds max_fee_per_gas {max_fee_per_gas}"
                ),
            ));
        }
        Ok(FeeSpec::Dynamic {
            max_fee_per_gas,
            max_priority_fee_per_gas,
        })
    }

    /// Price per unit of gas this spec pays at the given base fee.
    pub fn effective_gas_price(&self, base_fee: U256) -> U256 {
        match *self {
            FeeSpec::Legacy { gas_price_coef } => {
                let denominator = U256::from(MAX_GAS_PRICE_COEF);
                base_fee.saturating_mul(denominator + U256::from(gas_price_coef)) / denominator
            }
            FeeSpec::Dynamic {
                max_fee_per_gas,
                max_priority_fee_per_gas,
            } => max_fee_per_gas.min(base_fee.saturating_add(max_priority_fee_per_gas)),
        }
    }
}

/// Express a legacy coefficient as dynamic fields paying the same price at
/// `base_fee`: the tip is `base × coef / 255` and the cap is `base + tip`.
pub fn legacy_to_dynamic(gas_price_coef: u8, base_fee: U256) -> Result<FeeSpec> {
    require_base_fee(base_fee)?;
    let tip = base_fee.saturating_mul(U256::from(gas_price_coef)) / U256::from(MAX_GAS_PRICE_COEF);
    FeeSpec::dynamic(base_fee.saturating_add(tip), tip)
}

/// Express dynamic fields as the legacy coefficient closest to (not above)
/// their effective price at `base_fee`, clamped to `0..=255`.
///
/// Integer division makes this lossy: converting back and forth may lower
/// the coefficient by one.
pub fn dynamic_to_legacy(
    max_fee_per_gas: U256,
    max_priority_fee_per_gas: U256,
    base_fee: U256,
) -> Result<FeeSpec> {
    require_base_fee(base_fee)?;
    let effective =
        FeeSpec::dynamic(max_fee_per_gas, max_priority_fee_per_gas)?.effective_gas_price(base_fee);
    let coef = if effective <= base_fee {
        0
    } else {
        let markup = (effective - base_fee).saturating_mul(U256::from(MAX_GAS_PRICE_COEF)) / base_fee;
        markup.min(U256::from(MAX_GAS_PRICE_COEF)).low_u64() as u8
    };
    Ok(FeeSpec::Legacy {
        gas_price_coef: coef,
    })
}

fn require_base_fee(base_fee: U256) -> Result<()> {
    if base_fee.is_zero() {
        return Err(ThorError::illegal("base_fee", "must be greater than zero"));
    }
    Ok(())
}
