//! Upstream feed providers
//!
//! Two collaborators supply the raw payloads for each poll cycle: the
//! mapping table and the event (odds) feed. Both are traits so the poll
//! cycle can be driven by fakes in tests; the HTTP implementations fetch a
//! small JSON envelope and return the payload string inside it.

use std::time::Duration;

use async_trait::async_trait;
use serde::Deserialize;
use thiserror::Error;

/// Errors fetching a raw payload. Any of these aborts the poll cycle.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ProviderError {
    #[error("request to {url} failed: {message}")]
    Transport { url: String, message: String },

    #[error("{url} responded with status {status}")]
    Status { url: String, status: u16 },

    #[error("unreadable response body from {url}: {message}")]
    Body { url: String, message: String },

    #[error("failed to build HTTP client: {message}")]
    Client { message: String },
}

/// Supplies the raw `identifier:name;...` mapping payload.
#[async_trait]
pub trait MappingProvider: Send + Sync {
    async fn fetch_mappings(&self) -> Result<String, ProviderError>;
}

/// Supplies the raw newline-delimited event payload.
#[async_trait]
pub trait StateProvider: Send + Sync {
    async fn fetch_state(&self) -> Result<String, ProviderError>;
}

#[derive(Debug, Deserialize)]
struct MappingsEnvelope {
    mappings: String,
}

#[derive(Debug, Deserialize)]
struct StateEnvelope {
    odds: String,
}

/// Build the shared HTTP client used by both providers.
pub fn build_client(timeout: Duration) -> Result<reqwest::Client, ProviderError> {
    reqwest::Client::builder()
        .timeout(timeout)
        .build()
        .map_err(|e| ProviderError::Client {
            message: e.to_string(),
        })
}

/// `GET <url>` → `{ "mappings": "..." }`
#[derive(Debug, Clone)]
pub struct HttpMappingProvider {
    client: reqwest::Client,
    url: String,
}

impl HttpMappingProvider {
    pub fn new(client: reqwest::Client, url: impl Into<String>) -> Self {
        Self {
            client,
            url: url.into(),
        }
    }
}

#[async_trait]
impl MappingProvider for HttpMappingProvider {
    async fn fetch_mappings(&self) -> Result<String, ProviderError> {
        let envelope: MappingsEnvelope = get_json(&self.client, &self.url).await?;
        Ok(envelope.mappings)
    }
}

/// `GET <url>` → `{ "odds": "..." }`
#[derive(Debug, Clone)]
pub struct HttpStateProvider {
    client: reqwest::Client,
    url: String,
}

impl HttpStateProvider {
    pub fn new(client: reqwest::Client, url: impl Into<String>) -> Self {
        Self {
            client,
            url: url.into(),
        }
    }
}

#[async_trait]
impl StateProvider for HttpStateProvider {
    async fn fetch_state(&self) -> Result<String, ProviderError> {
        let envelope: StateEnvelope = get_json(&self.client, &self.url).await?;
        Ok(envelope.odds)
    }
}

async fn get_json<T: serde::de::DeserializeOwned>(
    client: &reqwest::Client,
    url: &str,
) -> Result<T, ProviderError> {
    let res = client
        .get(url)
        .send()
        .await
        .map_err(|e| ProviderError::Transport {
            url: url.to_string(),
            message: e.to_string(),
        })?;

    if !res.status().is_success() {
        return Err(ProviderError::Status {
            url: url.to_string(),
            status: res.status().as_u16(),
        });
    }

    res.json::<T>().await.map_err(|e| ProviderError::Body {
        url: url.to_string(),
        message: e.to_string(),
    })
}
