//! # Fee Suggestion
//!
//! Turns the node's fee history into a max priority fee for dynamic-fee
//! transactions.
//!
//! ```text
//! GET /fees/history?blockCount=10&newestBlock=best&rewardPercentiles=25,50,75
//!        │
//!        ▼
//!   last reward per block ──▶ equal? value : floor mean ──▶ min(·, 4.6% base fee)
//!        │ (no samples)
//!        ▼
//! GET /fees/priority ──────────────────────────────────────▶ min(·, 4.6% base fee)
//! ```
//!
//! The calculation itself ([`suggest_priority_fee`]) is pure; [`FeesClient`]
//! only adds the two requests around it.

pub mod client;
pub mod history;
pub mod suggest;

pub use client::FeesClient;
pub use history::{is_valid_revision, FeeHistory, FeeHistoryOptions};
pub use suggest::{priority_fee_cap, suggest_priority_fee};
