//! Node-backed fee queries.

use std::sync::Arc;
use std::time::Duration;

use primitive_types::U256;
use serde::Deserialize;
use tracing::{debug, warn};

use super::history::{parse_quantity, FeeHistory, FeeHistoryOptions};
use super::suggest::{priority_fee_cap, suggest_priority_fee};
use crate::config::{ClientConfig, FEE_HISTORY_BLOCK_COUNT, FEE_HISTORY_PERCENTILES};
use crate::error::{Result, ThorError};
use crate::http::{HttpClient, HttpResponse, ReqwestHttpClient};

const FEE_HISTORY_PATH: &str = "/fees/history";
const FEE_PRIORITY_PATH: &str = "/fees/priority";

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct PriorityFeeResponse {
    max_priority_fee_per_gas: Option<String>,
}

/// Fee queries against a node.
#[derive(Clone)]
pub struct FeesClient {
    client: Arc<dyn HttpClient>,
    timeout: Duration,
}

impl std::fmt::Debug for FeesClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("FeesClient")
            .field("timeout", &self.timeout)
            .finish_non_exhaustive()
    }
}

impl FeesClient {
    pub fn new(client: Arc<dyn HttpClient>, timeout: Duration) -> Self {
        Self { client, timeout }
    }

    pub fn from_config(config: &ClientConfig) -> Result<Self> {
        let client = ReqwestHttpClient::from_config(config)?;
        Ok(Self::new(Arc::new(client), config.request_timeout))
    }

    /// `GET /fees/history`. Options are validated before anything is sent.
    pub async fn fee_history(&self, options: &FeeHistoryOptions) -> Result<FeeHistory> {
        options.validate()?;
        let response = self.get(FEE_HISTORY_PATH, &options.query()).await?;
        FeeHistory::from_json(&response.body)
    }

    /// `GET /fees/priority`: the node's own priority fee suggestion, uncapped.
    pub async fn max_priority_fee_per_gas(&self) -> Result<U256> {
        let response = self.get(FEE_PRIORITY_PATH, &[]).await?;
        let parsed: Option<PriorityFeeResponse> = serde_json::from_slice(&response.body)
            .map_err(|err| ThorError::InvalidDataType(format!("malformed priority fee: {err}")))?;
        match parsed.and_then(|p| p.max_priority_fee_per_gas) {
            Some(fee) if !fee.is_empty() => parse_quantity(&fee, "maxPriorityFeePerGas"),
            _ => Err(ThorError::InvalidDataType(format!(
                "priority fee response has no maxPriorityFeePerGas: {}",
                response.text()
            ))),
        }
    }

    /// Suggested max priority fee at `base_fee`, derived from the last
    /// blocks' rewards and capped at 4.6% of `base_fee`. Falls back to the
    /// node's suggestion, capped the same way, when the history has no
    /// reward samples.
    pub async fn suggest_max_priority_fee_per_gas(&self, base_fee: U256) -> Result<U256> {
        let options = FeeHistoryOptions::new(FEE_HISTORY_BLOCK_COUNT, "best")
            .with_reward_percentiles(&FEE_HISTORY_PERCENTILES);
        let history = self.fee_history(&options).await?;

        if let Some(suggested) = suggest_priority_fee(&history, base_fee) {
            debug!(%base_fee, %suggested, "priority fee from fee history");
            return Ok(suggested);
        }

        warn!(%base_fee, "fee history has no reward samples, asking the node");
        let node_fee = self.max_priority_fee_per_gas().await?;
        let suggested = node_fee.min(priority_fee_cap(base_fee));
        debug!(%base_fee, %node_fee, %suggested, "priority fee from node");
        Ok(suggested)
    }

    /// Base fee the next block will charge, if the node reports one.
    pub async fn next_block_base_fee(&self) -> Result<Option<U256>> {
        let history = self.fee_history(&FeeHistoryOptions::new(1, "next")).await?;
        Ok(history.base_fee_per_gas.first().copied())
    }

    async fn get(&self, path: &str, query: &[(&str, String)]) -> Result<HttpResponse> {
        let response = tokio::time::timeout(self.timeout, self.client.get(path, query))
            .await
            .map_err(|_| ThorError::Network(format!("{path} timed out after {:?}", self.timeout)))??;
        if !response.is_success() {
            return Err(ThorError::Network(format!(
                "{path} returned status {}: {}",
                response.status,
                response.text()
            )));
        }
        Ok(response)
    }
}
