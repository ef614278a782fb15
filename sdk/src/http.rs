//! HTTP seam towards the node and sponsorship services.
//!
//! Everything that talks to the outside world goes through [`HttpClient`],
//! so fee suggestion and remote delegation can be exercised against an
//! in-memory double. [`ReqwestHttpClient`] is the production implementation.

use std::time::Duration;

use async_trait::async_trait;
use tracing::debug;

use crate::config::ClientConfig;
use crate::error::{Result, ThorError};

/// Status and raw body of a completed request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HttpResponse {
    pub status: u16,
    pub body: Vec<u8>,
}

impl HttpResponse {
    pub fn new(status: u16, body: impl Into<Vec<u8>>) -> Self {
        Self {
            status,
            body: body.into(),
        }
    }

    /// 2xx.
    pub fn is_success(&self) -> bool {
        (200..300).contains(&self.status)
    }

    /// Body as text, lossy on invalid UTF-8.
    pub fn text(&self) -> String {
        String::from_utf8_lossy(&self.body).into_owned()
    }
}

/// Minimal request surface used by the SDK.
///
/// Paths may be relative to a base URL or absolute; resolution is up to the
/// implementation. Transport failures map to [`ThorError::Network`]; a
/// non-2xx status is not an error at this layer.
#[async_trait]
pub trait HttpClient: Send + Sync {
    async fn get(&self, path: &str, query: &[(&str, String)]) -> Result<HttpResponse>;

    /// POST a JSON body.
    async fn post(&self, path: &str, body: Vec<u8>) -> Result<HttpResponse>;
}

/// [`HttpClient`] over `reqwest`.
#[derive(Debug, Clone)]
pub struct ReqwestHttpClient {
    client: reqwest::Client,
    base_url: String,
    timeout: Duration,
}

impl ReqwestHttpClient {
    pub fn new(base_url: impl Into<String>, timeout: Duration) -> Result<Self> {
        let client = reqwest::Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|err| ThorError::Network(format!("building http client: {err}")))?;
        Ok(Self {
            client,
            base_url: base_url.into().trim_end_matches('/').to_string(),
            timeout,
        })
    }

    /// Client for the node configured in `config`.
    pub fn from_config(config: &ClientConfig) -> Result<Self> {
        Self::new(config.node_url.clone(), config.request_timeout)
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    fn url(&self, path: &str) -> String {
        if path.starts_with("http://") || path.starts_with("https://") {
            path.to_string()
        } else if path.is_empty() {
            self.base_url.clone()
        } else {
            format!("{}/{}", self.base_url, path.trim_start_matches('/'))
        }
    }

    async fn send(&self, request: reqwest::RequestBuilder, url: &str) -> Result<HttpResponse> {
        let exchange = async {
            let response = request.send().await?;
            let status = response.status().as_u16();
            let body = response.bytes().await?;
            Ok::<_, reqwest::Error>(HttpResponse::new(status, body.to_vec()))
        };
        let response = tokio::time::timeout(self.timeout, exchange)
            .await
            .map_err(|_| ThorError::Network(format!("request to {url} timed out after {:?}", self.timeout)))?
            .map_err(|err| ThorError::Network(format!("request to {url} failed: {err}")))?;
        debug!(%url, status = response.status, bytes = response.body.len(), "http response");
        Ok(response)
    }
}

#[async_trait]
impl HttpClient for ReqwestHttpClient {
    async fn get(&self, path: &str, query: &[(&str, String)]) -> Result<HttpResponse> {
        let url = self.url(path);
        debug!(%url, ?query, "GET");
        self.send(self.client.get(&url).query(query), &url).await
    }

    async fn post(&self, path: &str, body: Vec<u8>) -> Result<HttpResponse> {
        let url = self.url(path);
        debug!(%url, bytes = body.len(), "POST");
        let request = self
            .client
            .post(&url)
            .header(reqwest::header::CONTENT_TYPE, "application/json")
            .body(body);
        self.send(request, &url).await
    }
}
