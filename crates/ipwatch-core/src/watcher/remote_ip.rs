//! Public IP lookup.

use crate::error::Result;
use serde::{Deserialize, Serialize};

/// Answer of the remote IP service.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RemoteIp {
    /// Public address as reported.
    pub ip: String,
    /// Country name.
    #[serde(default)]
    pub country: String,
    /// ISO country code.
    #[serde(default)]
    pub cc: String,
}

impl RemoteIp {
    /// Creates a record with only the address set.
    #[must_use]
    pub fn new(ip: impl Into<String>) -> Self {
        Self {
            ip: ip.into(),
            country: String::new(),
            cc: String::new(),
        }
    }

    /// Parses a JSON body such as `{"ip":"1.2.3.4","country":"Poland","cc":"PL"}`.
    ///
    /// # Errors
    ///
    /// Returns [`Error::RemoteIpParse`](crate::Error::RemoteIpParse) if the
    /// body is not such a document.
    pub fn parse(body: &[u8]) -> Result<Self> {
        Ok(serde_json::from_slice(body)?)
    }
}

/// Source of the current public IP.
pub trait IpFetcher {
    /// Looks up the current public IP.
    fn fetch(&self) -> impl Future<Output = Result<RemoteIp>> + Send;
}

/// Fetches the public IP from an HTTP endpoint returning [`RemoteIp`] JSON.
#[derive(Debug, Clone)]
pub struct HttpIpFetcher {
    http_client: reqwest::Client,
    url: String,
}

impl HttpIpFetcher {
    /// Creates a fetcher for the given URL.
    #[must_use]
    pub fn new(url: impl Into<String>) -> Self {
        Self {
            http_client: reqwest::Client::new(),
            url: url.into(),
        }
    }

    /// Endpoint queried by this fetcher.
    #[must_use]
    pub fn url(&self) -> &str {
        &self.url
    }
}

impl IpFetcher for HttpIpFetcher {
    async fn fetch(&self) -> Result<RemoteIp> {
        let response = self
            .http_client
            .get(&self.url)
            .send()
            .await?
            .error_for_status()?;

        let body = response.bytes().await?;
        RemoteIp::parse(&body)
    }
}
