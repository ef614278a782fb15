//! Fee history request options and the parsed node response.

use primitive_types::U256;
use serde::Deserialize;

use crate::error::{Result, ThorError};

/// Symbolic revisions the node understands besides numbers and block ids.
const NAMED_REVISIONS: [&str; 4] = ["best", "next", "finalized", "justified"];

/// Query for `GET /fees/history`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FeeHistoryOptions {
    /// Number of blocks to sample, counting back from `newest_block`.
    pub block_count: u32,
    /// Revision of the newest sampled block.
    pub newest_block: String,
    /// Percentiles of effective priority fee to report per block.
    pub reward_percentiles: Option<Vec<u8>>,
}

impl FeeHistoryOptions {
    pub fn new(block_count: u32, newest_block: impl Into<String>) -> Self {
        Self {
            block_count,
            newest_block: newest_block.into(),
            reward_percentiles: None,
        }
    }

    pub fn with_reward_percentiles(mut self, percentiles: &[u8]) -> Self {
        self.reward_percentiles = Some(percentiles.to_vec());
        self
    }

    /// Reject options the node would refuse. Runs before any request.
    pub fn validate(&self) -> Result<()> {
        if self.block_count == 0 {
            return Err(ThorError::InvalidDataType(
                "block_count must be a positive integer".to_string(),
            ));
        }
        if !is_valid_revision(&self.newest_block) {
            return Err(ThorError::InvalidDataType(format!(
                "newest_block `{}` is not a valid revision",
                self.newest_block
            )));
        }
        if let Some(percentiles) = &self.reward_percentiles {
            if let Some(p) = percentiles.iter().find(|p| **p > 100) {
                return Err(ThorError::InvalidDataType(format!(
                    "reward percentile {p} is outside 0..=100"
                )));
            }
        }
        Ok(())
    }

    /// Query string pairs, in the order the node documents them.
    pub(crate) fn query(&self) -> Vec<(&'static str, String)> {
        let mut query = vec![
            ("blockCount", self.block_count.to_string()),
            ("newestBlock", self.newest_block.clone()),
        ];
        if let Some(percentiles) = &self.reward_percentiles {
            let joined = percentiles
                .iter()
                .map(u8::to_string)
                .collect::<Vec<_>>()
                .join(",");
            query.push(("rewardPercentiles", joined));
        }
        query
    }
}

/// `best`, `next`, `finalized`, `justified`, a decimal block number, or a
/// `0x`-prefixed 32-byte block id.
pub fn is_valid_revision(revision: &str) -> bool {
    if NAMED_REVISIONS.contains(&revision) {
        return true;
    }
    if let Some(id) = revision.strip_prefix("0x") {
        return id.len() == 64 && id.bytes().all(|b| b.is_ascii_hexdigit());
    }
    !revision.is_empty() && revision.parse::<u32>().is_ok()
}

/// Fee samples over a range of blocks.
#[derive(Debug, Clone, PartialEq)]
pub struct FeeHistory {
    pub oldest_block: u64,
    /// Base fee of each sampled block.
    pub base_fee_per_gas: Vec<U256>,
    pub gas_used_ratio: Vec<f64>,
    /// Per block, one reward per requested percentile. `None` when no
    /// percentiles were requested.
    pub reward: Option<Vec<Vec<U256>>>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct RawFeeHistory {
    oldest_block: serde_json::Value,
    base_fee_per_gas: Vec<String>,
    gas_used_ratio: Vec<f64>,
    #[serde(default)]
    reward: Option<Vec<Vec<String>>>,
}

impl FeeHistory {
    /// Parse the JSON body of `GET /fees/history`.
    pub fn from_json(body: &[u8]) -> Result<Self> {
        let raw: RawFeeHistory = serde_json::from_slice(body)
            .map_err(|err| ThorError::InvalidDataType(format!("malformed fee history: {err}")))?;

        let oldest_block = match &raw.oldest_block {
            serde_json::Value::Number(n) => n.as_u64(),
            serde_json::Value::String(s) => {
                let block = parse_quantity(s, "oldestBlock")?;
                (block.bits() <= 64).then(|| block.low_u64())
            }
            _ => None,
        }
        .ok_or_else(|| {
            ThorError::InvalidDataType(format!("oldestBlock `{}` is not a block number", raw.oldest_block))
        })?;

        let base_fee_per_gas = raw
            .base_fee_per_gas
            .iter()
            .map(|q| parse_quantity(q, "baseFeePerGas"))
            .collect::<Result<Vec<_>>>()?;

        let reward = raw
            .reward
            .map(|rows| {
                rows.iter()
                    .map(|row| {
                        row.iter()
                            .map(|q| parse_quantity(q, "reward"))
                            .collect::<Result<Vec<_>>>()
                    })
                    .collect::<Result<Vec<_>>>()
            })
            .transpose()?;

        Ok(Self {
            oldest_block,
            base_fee_per_gas,
            gas_used_ratio: raw.gas_used_ratio,
            reward,
        })
    }
}

/// Parse a node quantity: `0x`-prefixed hex, or plain decimal.
pub(crate) fn parse_quantity(text: &str, field: &str) -> Result<U256> {
    let parsed = match text.strip_prefix("0x") {
        Some(digits) if !digits.is_empty() => U256::from_str_radix(digits, 16).ok(),
        Some(_) => None,
        None if !text.is_empty() && text.bytes().all(|b| b.is_ascii_digit()) => {
            U256::from_dec_str(text).ok()
        }
        None => None,
    };
    parsed.ok_or_else(|| ThorError::InvalidDataType(format!("{field} `{text}` is not a quantity")))
}
