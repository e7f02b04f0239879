//! Outbound HTTP client for the streaming origin.

use async_trait::async_trait;
use reqwest::{Client, Proxy};
use std::time::Duration;
use thiserror::Error;
use tracing::{debug, warn};

const CONNECT_TIMEOUT: Duration = Duration::from_secs(10);
const REQUEST_TIMEOUT: Duration = Duration::from_secs(30);

#[derive(Debug, Error)]
pub enum FetchError {
    #[error("{0}")]
    Request(String),

    #[error("upstream returned HTTP {0}")]
    Status(u16),

    #[error("invalid proxy URL: {0}")]
    InvalidProxy(String),
}

/// Upstream response body.
#[derive(Debug)]
pub struct FetchResponse {
    pub body: String,
}

/// Seam between the request handlers and the network.
///
/// `use_proxy` selects the proxied client; everything else about the
/// request (timeouts, redirects) is decided here, not by the handlers.
#[async_trait]
pub trait HttpFetcher: Send + Sync {
    async fn get(
        &self,
        url: &str,
        headers: &[(String, String)],
        use_proxy: bool,
    ) -> Result<FetchResponse, FetchError>;
}

/// `reqwest`-backed fetcher with a direct client and an optional proxied one.
#[derive(Debug)]
pub struct ReqwestFetcher {
    direct: Client,
    proxied: Option<Client>,
}

impl ReqwestFetcher {
    pub fn new(proxy_url: Option<&str>) -> Result<Self, FetchError> {
        let direct = Self::builder()
            .build()
            .map_err(|e| FetchError::Request(e.to_string()))?;

        let proxied = match proxy_url {
            Some(url) => {
                let proxy =
                    Proxy::all(url).map_err(|e| FetchError::InvalidProxy(e.to_string()))?;
                Some(
                    Self::builder()
                        .proxy(proxy)
                        .build()
                        .map_err(|e| FetchError::Request(e.to_string()))?,
                )
            }
            None => None,
        };

        Ok(Self { direct, proxied })
    }

    fn builder() -> reqwest::ClientBuilder {
        Client::builder()
            .connect_timeout(CONNECT_TIMEOUT)
            .timeout(REQUEST_TIMEOUT)
    }
}

#[async_trait]
impl HttpFetcher for ReqwestFetcher {
    async fn get(
        &self,
        url: &str,
        headers: &[(String, String)],
        use_proxy: bool,
    ) -> Result<FetchResponse, FetchError> {
        let client = if use_proxy {
            match &self.proxied {
                Some(client) => client,
                None => {
                    warn!(url, "proxied fetch requested but no proxy is configured");
                    &self.direct
                }
            }
        } else {
            &self.direct
        };

        let mut request = client.get(url);
        for (name, value) in headers {
            request = request.header(name, value);
        }

        let response = request
            .send()
            .await
            .map_err(|e| FetchError::Request(e.to_string()))?;

        let status = response.status();
        if !status.is_success() {
            return Err(FetchError::Status(status.as_u16()));
        }

        let body = response
            .text()
            .await
            .map_err(|e| FetchError::Request(e.to_string()))?;

        debug!(url, size = body.len(), "fetched upstream document");

        Ok(FetchResponse { body })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn builds_without_a_proxy() {
        let fetcher = ReqwestFetcher::new(None).unwrap();
        assert!(fetcher.proxied.is_none());
    }

    #[test]
    fn builds_with_a_proxy() {
        let fetcher = ReqwestFetcher::new(Some("http://127.0.0.1:3128")).unwrap();
        assert!(fetcher.proxied.is_some());
    }

    #[test]
    fn rejects_an_unparseable_proxy_url() {
        let err = ReqwestFetcher::new(Some("not a url")).unwrap_err();
        assert!(matches!(err, FetchError::InvalidProxy(_)));
    }
}
