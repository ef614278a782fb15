//! Intrinsic gas: the cost charged before any clause executes.

use super::types::{Clause, TransactionBody};
use crate::config::{
    CLAUSE_GAS, CLAUSE_GAS_CONTRACT_CREATION, NON_ZERO_GAS_DATA, TX_GAS, ZERO_GAS_DATA,
};

/// Minimum gas a transaction with `clauses` must provide.
///
/// Each clause costs a flat fee (higher for deployments) plus a per-byte fee
/// on its data. An empty clause list is priced as one plain clause, which
/// matches what the node charges.
pub fn intrinsic_gas(clauses: &[Clause]) -> u64 {
    if clauses.is_empty() {
        return TX_GAS + CLAUSE_GAS;
    }
    clauses.iter().fold(TX_GAS, |total, clause| {
        let base = if clause.is_contract_creation() {
            CLAUSE_GAS_CONTRACT_CREATION
        } else {
            CLAUSE_GAS
        };
        total
            .saturating_add(base)
            .saturating_add(data_gas(&clause.data))
    })
}

impl TransactionBody {
    /// Intrinsic gas of this body's clauses; `gas()` must be at least this.
    pub fn intrinsic_gas(&self) -> u64 {
        intrinsic_gas(&self.clauses)
    }
}

fn data_gas(data: &[u8]) -> u64 {
    data.iter().fold(0u64, |total, byte| {
        total.saturating_add(if *byte == 0 { ZERO_GAS_DATA } else { NON_ZERO_GAS_DATA })
    })
}
