//! # Chain API Client
//!
//! The three upstream calls the constructor makes: read chain variables,
//! read the current block height, and submit a signed transaction. Every
//! call goes to the network, with no caching and no retries.
//!
//! The Helium API wraps every response body in `{ "data": ... }`.

use async_trait::async_trait;
use reqwest::header::CONTENT_TYPE;
use serde::Deserialize;
use serde_json::{Map, Value};
use std::time::Duration;
use thiserror::Error;

use constructor_protocol::{ConstructorError, Network};

/// Upper bound on any single upstream call.
const REQUEST_TIMEOUT: Duration = Duration::from_secs(30);

// ---------------------------------------------------------------------------
// Errors
// ---------------------------------------------------------------------------

/// Failures talking to the chain API.
#[derive(Debug, Error)]
pub enum ChainError {
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("{url} returned {status}: {body}")]
    Status {
        url: String,
        status: u16,
        body: String,
    },

    #[error("unexpected response from {url}: {reason}")]
    Decode { url: String, reason: String },
}

impl From<ChainError> for ConstructorError {
    fn from(e: ChainError) -> Self {
        ConstructorError::UpstreamQueryFailed(e.to_string())
    }
}

// ---------------------------------------------------------------------------
// Trait
// ---------------------------------------------------------------------------

/// Read and submit access to the chain.
#[async_trait]
pub trait ChainClient: Send + Sync {
    /// All chain variables, keys camelCased.
    async fn chain_vars(&self) -> Result<Map<String, Value>, ChainError>;

    /// Height of the latest block.
    async fn current_height(&self) -> Result<u64, ChainError>;

    /// Submits a signed transaction string and returns the pending
    /// transaction hash assigned by the API.
    async fn submit(&self, signed_txn: &str) -> Result<String, ChainError>;
}

// ---------------------------------------------------------------------------
// HeliumApiClient
// ---------------------------------------------------------------------------

#[derive(Debug, Deserialize)]
struct DataEnvelope<T> {
    data: T,
}

#[derive(Debug, Deserialize)]
struct HeightData {
    height: u64,
}

#[derive(Debug, Deserialize)]
struct PendingTxnData {
    hash: String,
}

/// HTTP client for the public Helium API.
#[derive(Debug, Clone)]
pub struct HeliumApiClient {
    base_url: String,
    client: reqwest::Client,
}

impl HeliumApiClient {
    /// Creates a client for `network`, or for `base_url` when given.
    pub fn new(network: Network, base_url: Option<&str>) -> Result<Self, ChainError> {
        let base_url = base_url
            .unwrap_or_else(|| network.api_base_url())
            .trim_end_matches('/')
            .to_string();
        let client = reqwest::Client::builder()
            .timeout(REQUEST_TIMEOUT)
            .user_agent(concat!("helium-constructor/", env!("CARGO_PKG_VERSION")))
            .build()?;
        Ok(Self { base_url, client })
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    async fn read_data<T: for<'de> Deserialize<'de>>(
        url: &str,
        resp: reqwest::Response,
    ) -> Result<T, ChainError> {
        let status = resp.status();
        if !status.is_success() {
            let body = resp.text().await.unwrap_or_default();
            return Err(ChainError::Status {
                url: url.to_string(),
                status: status.as_u16(),
                body,
            });
        }

        let envelope: DataEnvelope<T> =
            resp.json().await.map_err(|e| ChainError::Decode {
                url: url.to_string(),
                reason: e.to_string(),
            })?;
        Ok(envelope.data)
    }
}

#[async_trait]
impl ChainClient for HeliumApiClient {
    async fn chain_vars(&self) -> Result<Map<String, Value>, ChainError> {
        let url = format!("{}/vars", self.base_url);
        let resp = self.client.get(&url).send().await?;
        let vars: Map<String, Value> = Self::read_data(&url, resp).await?;
        Ok(camelcase_keys(vars))
    }

    async fn current_height(&self) -> Result<u64, ChainError> {
        let url = format!("{}/blocks/height", self.base_url);
        let resp = self.client.get(&url).send().await?;
        let data: HeightData = Self::read_data(&url, resp).await?;
        Ok(data.height)
    }

    async fn submit(&self, signed_txn: &str) -> Result<String, ChainError> {
        let url = format!("{}/pending_transactions", self.base_url);
        let resp = self
            .client
            .post(&url)
            .header(CONTENT_TYPE, "application/json")
            .json(&serde_json::json!({ "txn": signed_txn }))
            .send()
            .await?;
        let data: PendingTxnData = Self::read_data(&url, resp).await?;
        Ok(data.hash)
    }
}

// ---------------------------------------------------------------------------
// Key casing
// ---------------------------------------------------------------------------

/// `txn_fee_multiplier` -> `txnFeeMultiplier`.
fn to_camel_case(key: &str) -> String {
    let mut out = String::with_capacity(key.len());
    let mut upper_next = false;
    for c in key.chars() {
        if c == '_' {
            upper_next = !out.is_empty();
        } else if upper_next {
            out.extend(c.to_uppercase());
            upper_next = false;
        } else {
            out.push(c);
        }
    }
    out
}

fn camelcase_keys(map: Map<String, Value>) -> Map<String, Value> {
    map.into_iter()
        .map(|(k, v)| (to_camel_case(&k), v))
        .collect()
}
