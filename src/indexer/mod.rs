//! Read-only client for the Aleo explorer REST API.
//!
//! Used for the account panel: latest block height and the public credit
//! balance of the connected address. Nothing here gates a submission.

use crate::config::Config;
use serde_json::Value;
use thiserror::Error;
use tracing::{debug, warn};

#[derive(Error, Debug)]
pub enum IndexerError {
    #[error("request failed: {0}")]
    Request(#[from] reqwest::Error),
    #[error("API error {status}: {body}")]
    Status { status: u16, body: String },
    #[error("unexpected response: {0}")]
    Parse(String),
}

/// What the account panel shows. A failed lookup leaves its field empty.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct AccountSnapshot {
    pub public_balance: Option<u64>,
    pub latest_height: Option<u64>,
}

#[derive(Debug, Clone)]
pub struct IndexerClient {
    client: reqwest::Client,
    base_url: String,
    network: String,
}

impl IndexerClient {
    pub fn new(base_url: impl Into<String>, network: impl Into<String>) -> Self {
        Self {
            client: reqwest::Client::new(),
            base_url: base_url.into().trim_end_matches('/').to_string(),
            network: network.into(),
        }
    }

    pub fn from_config(config: &Config) -> Self {
        Self::new(config.indexer.base_url.clone(), config.program.network.clone())
    }

    pub fn url(&self, path: &str) -> String {
        format!("{}/{}/{}", self.base_url, self.network, path.trim_start_matches('/'))
    }

    async fn get(&self, path: &str) -> Result<Value, IndexerError> {
        let url = self.url(path);
        debug!(url = %url, "indexer request");

        let resp = self.client.get(&url).send().await?;
        let status = resp.status().as_u16();
        if status >= 400 {
            let body = resp.text().await.unwrap_or_default();
            return Err(IndexerError::Status { status, body });
        }
        Ok(resp.json().await?)
    }

    pub async fn latest_height(&self) -> Result<u64, IndexerError> {
        let value = self.get("latest/height").await?;
        value
            .as_u64()
            .ok_or_else(|| IndexerError::Parse(format!("height: {value}")))
    }

    /// Public `credits.aleo` balance in microcredits; an unknown account is zero.
    pub async fn public_balance(&self, address: &str) -> Result<u64, IndexerError> {
        let value = self
            .get(&format!("program/credits.aleo/mapping/account/{address}"))
            .await?;
        parse_u64_mapping(&value)
    }

    pub async fn account_snapshot(&self, address: &str) -> AccountSnapshot {
        let public_balance = match self.public_balance(address).await {
            Ok(balance) => Some(balance),
            Err(e) => {
                warn!(error = %e, "public balance lookup failed");
                None
            }
        };
        let latest_height = match self.latest_height().await {
            Ok(height) => Some(height),
            Err(e) => {
                warn!(error = %e, "latest height lookup failed");
                None
            }
        };
        AccountSnapshot {
            public_balance,
            latest_height,
        }
    }
}

/// Parse a mapping value such as `"1500000u64"`; `null` means no entry.
pub fn parse_u64_mapping(value: &Value) -> Result<u64, IndexerError> {
    match value {
        Value::Null => Ok(0),
        Value::String(s) => {
            let digits = s.trim().trim_matches('"').trim_end_matches("u64");
            digits
                .parse()
                .map_err(|_| IndexerError::Parse(format!("u64 literal: {s}")))
        }
        other => Err(IndexerError::Parse(format!("u64 literal: {other}"))),
    }
}
