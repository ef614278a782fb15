//! Gas payer reached over HTTP.
//!
//! ```text
//! POST <url>  {"origin": "0x<sender>", "raw": "0x<unsigned encoding>"}
//! 200         {"signature": "0x<65 bytes>"}
//! ```
//!
//! The signature is checked for shape only. Whether it actually covers the
//! delegation digest is for the node to decide when the transaction lands.

use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use tracing::{debug, error};

use super::GasPayer;
use crate::config::{ClientConfig, DEFAULT_REQUEST_TIMEOUT, SIGNATURE_LENGTH};
use crate::error::{Result, ThorError};
use crate::http::{HttpClient, ReqwestHttpClient};
use crate::identity::Address;

#[derive(Debug, Serialize)]
struct SignRequest {
    origin: String,
    raw: String,
}

#[derive(Debug, Deserialize)]
struct SignResponse {
    signature: Option<String>,
}

/// [`GasPayer`] backed by a sponsorship service.
#[derive(Clone)]
pub struct RemoteGasPayer {
    client: Arc<dyn HttpClient>,
    url: String,
    timeout: Duration,
}

impl std::fmt::Debug for RemoteGasPayer {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RemoteGasPayer")
            .field("url", &self.url)
            .field("timeout", &self.timeout)
            .finish()
    }
}

impl RemoteGasPayer {
    /// Gas payer at `url`, reached through `client`. The whole exchange is
    /// bounded by `timeout`.
    pub fn new(client: Arc<dyn HttpClient>, url: impl Into<String>, timeout: Duration) -> Self {
        Self {
            client,
            url: url.into(),
            timeout,
        }
    }

    /// Gas payer at an absolute `url`, using a `reqwest` client and the
    /// default timeout.
    pub fn from_url(url: impl Into<String>) -> Result<Self> {
        let url = url.into();
        let client = ReqwestHttpClient::new(url.clone(), DEFAULT_REQUEST_TIMEOUT)?;
        Ok(Self::new(Arc::new(client), url, DEFAULT_REQUEST_TIMEOUT))
    }

    /// Gas payer named by `config.gas_payer_url`, with the configured timeout.
    pub fn from_config(config: &ClientConfig) -> Result<Self> {
        let url = config
            .gas_payer_url
            .clone()
            .ok_or_else(|| ThorError::illegal("gas_payer_url", "no gas payer configured"))?;
        let client = ReqwestHttpClient::new(url.clone(), config.request_timeout)?;
        Ok(Self::new(Arc::new(client), url, config.request_timeout))
    }

    pub fn url(&self) -> &str {
        &self.url
    }
}

#[async_trait]
impl GasPayer for RemoteGasPayer {
    async fn sign(&self, unsigned_encoding: &[u8], sender: &Address) -> Result<[u8; 65]> {
        let request = SignRequest {
            origin: sender.to_checksummed(),
            raw: format!("0x{}", hex::encode(unsigned_encoding)),
        };
        let body = serde_json::to_vec(&request)
            .map_err(|err| ThorError::InvalidDataType(format!("encoding gas payer request: {err}")))?;

        debug!(url = %self.url, origin = %sender, "requesting gas payer signature");
        let response = tokio::time::timeout(self.timeout, self.client.post(&self.url, body))
            .await
            .map_err(|_| {
                ThorError::Network(format!(
                    "gas payer at {} did not answer within {:?}",
                    self.url, self.timeout
                ))
            })??;

        let raw = response.text();
        let rejected = |reason: String| {
            error!(url = %self.url, %reason, response = %raw, "gas payer response rejected");
            ThorError::RemoteGasSigner {
                reason,
                response: raw.clone(),
            }
        };

        if !response.is_success() {
            return Err(rejected(format!("status {}", response.status)));
        }
        let parsed: SignResponse = serde_json::from_slice(&response.body)
            .map_err(|err| rejected(format!("response is not valid JSON: {err}")))?;
        let signature = parsed
            .signature
            .ok_or_else(|| rejected("response has no `signature` field".to_string()))?;
        let hex_digits = signature.strip_prefix("0x").unwrap_or(&signature);
        let bytes =
            hex::decode(hex_digits).map_err(|err| rejected(format!("signature is not hex: {err}")))?;
        <[u8; SIGNATURE_LENGTH]>::try_from(bytes.as_slice()).map_err(|_| {
            rejected(format!(
                "signature is {} bytes, expected {SIGNATURE_LENGTH}",
                bytes.len()
            ))
        })
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Mutex;

    use super::*;
    use crate::http::HttpResponse;

    /// Replays a canned response and records what was posted.
    struct Canned {
        response: HttpResponse,
        posted: Mutex<Vec<(String, Vec<u8>)>>,
    }

    impl Canned {
        fn new(status: u16, body: &str) -> Arc<Self> {
            Arc::new(Self {
                response: HttpResponse::new(status, body),
                posted: Mutex::new(Vec::new()),
            })
        }
    }

    #[async_trait]
    impl HttpClient for Canned {
        async fn get(&self, _path: &str, _query: &[(&str, String)]) -> Result<HttpResponse> {
            unreachable!("gas payer only posts")
        }

        async fn post(&self, path: &str, body: Vec<u8>) -> Result<HttpResponse> {
            self.posted.lock().unwrap().push((path.to_string(), body));
            Ok(self.response.clone())
        }
    }

    fn payer(client: Arc<Canned>) -> RemoteGasPayer {
        RemoteGasPayer::new(client, "https://sponsor.example/sign", Duration::from_secs(5))
    }

    async fn sign_with(status: u16, body: &str) -> Result<[u8; 65]> {
        payer(Canned::new(status, body))
            .sign(&[0xc0], &Address::new([1u8; 20]))
            .await
    }

    #[tokio::test]
    async fn posts_origin_and_raw() {
        let signature = format!("0x{}", "ab".repeat(65));
        let client = Canned::new(200, &format!(r#"{{"signature":"{signature}"}}"#));
        let sender = Address::new([1u8; 20]);

        let result = payer(client.clone()).sign(&[0xc0, 0x01], &sender).await.unwrap();
        assert_eq!(result, [0xab; 65]);

        let posted = client.posted.lock().unwrap();
        assert_eq!(posted.len(), 1);
        assert_eq!(posted[0].0, "https://sponsor.example/sign");
        let json: serde_json::Value = serde_json::from_slice(&posted[0].1).unwrap();
        assert_eq!(json["origin"], sender.to_checksummed());
        assert_eq!(json["raw"], "0xc001");
    }

    #[tokio::test]
    async fn unprefixed_hex_is_accepted() {
        let body = format!(r#"{{"signature":"{}"}}"#, "01".repeat(65));
        assert_eq!(sign_with(200, &body).await.unwrap(), [1u8; 65]);
    }

    #[tokio::test]
    async fn error_status_keeps_the_raw_body() {
        let err = sign_with(403, "sponsorship quota exceeded").await.unwrap_err();
        match err {
            ThorError::RemoteGasSigner { reason, response } => {
                assert!(reason.contains("403"));
                assert_eq!(response, "sponsorship quota exceeded");
            }
            other => panic!("unexpected error {other:?}"),
        }
    }

    #[tokio::test]
    async fn unusable_bodies_are_rejected() {
        let short = format!(r#"{{"signature":"0x{}"}}"#, "ab".repeat(64));
        for body in [
            "not json",
            r#"{"sig":"0x00"}"#,
            r#"{"signature":"0xzz"}"#,
            short.as_str(),
        ] {
            let err = sign_with(200, body).await.unwrap_err();
            assert!(
                matches!(&err, ThorError::RemoteGasSigner { response, .. } if response == body),
                "{body}: {err:?}"
            );
        }
    }

    #[test]
    fn config_must_name_a_gas_payer() {
        let mut config = ClientConfig::default();
        assert!(matches!(
            RemoteGasPayer::from_config(&config),
            Err(ThorError::IllegalArgument { field: "gas_payer_url", .. })
        ));
        config.gas_payer_url = Some("https://sponsor.example/sign".into());
        config.request_timeout = Duration::from_millis(1500);
        let payer = RemoteGasPayer::from_config(&config).unwrap();
        assert_eq!(payer.url(), "https://sponsor.example/sign");
        assert_eq!(payer.timeout, Duration::from_millis(1500));
    }

    struct Stalled;

    #[async_trait]
    impl HttpClient for Stalled {
        async fn get(&self, _path: &str, _query: &[(&str, String)]) -> Result<HttpResponse> {
            unreachable!()
        }

        async fn post(&self, _path: &str, _body: Vec<u8>) -> Result<HttpResponse> {
            std::future::pending().await
        }
    }

    #[tokio::test(start_paused = true)]
    async fn timeout_is_a_network_error() {
        let payer = RemoteGasPayer::new(Arc::new(Stalled), "https://slow.example", Duration::from_secs(3));
        let err = payer.sign(&[0xc0], &Address::ZERO).await.unwrap_err();
        assert!(matches!(err, ThorError::Network(_)));
    }
}
