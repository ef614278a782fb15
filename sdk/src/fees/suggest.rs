//! Priority fee suggestion from fee history samples.

use primitive_types::U256;

use super::history::FeeHistory;
use crate::config::{PRIORITY_FEE_CAP_DENOMINATOR, PRIORITY_FEE_CAP_NUMERATOR};

/// Highest priority fee worth suggesting at `base_fee`: 4.6% of it.
pub fn priority_fee_cap(base_fee: U256) -> U256 {
    base_fee.saturating_mul(U256::from(PRIORITY_FEE_CAP_NUMERATOR))
        / U256::from(PRIORITY_FEE_CAP_DENOMINATOR)
}

/// Suggest a max priority fee from `history`.
///
/// Uses the last (highest requested percentile) reward of every sampled
/// block. When the samples agree that value is used, otherwise their floor
/// mean. The result never exceeds [`priority_fee_cap`]. `None` when the
/// history carries no reward samples.
pub fn suggest_priority_fee(history: &FeeHistory, base_fee: U256) -> Option<U256> {
    let samples: Vec<U256> = history
        .reward
        .as_deref()?
        .iter()
        .filter_map(|row| row.last().copied())
        .collect();
    let first = *samples.first()?;

    let suggested = if samples.iter().all(|s| *s == first) {
        first
    } else {
        let sum = samples
            .iter()
            .fold(U256::zero(), |acc, s| acc.saturating_add(*s));
        sum / U256::from(samples.len())
    };
    Some(suggested.min(priority_fee_cap(base_fee)))
}
