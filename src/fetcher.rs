//! Single-shot HTTP fetching
//!
//! One GET per call, no state between calls, no internal retries — retry
//! policy belongs to the caller layer (see [`crate::retry`]).

use crate::config::FetchConfig;
use crate::error::{Result, TransportError};
use tracing::debug;
use url::Url;

/// Thin wrapper around a configured [`reqwest::Client`]
#[derive(Clone)]
pub struct Fetcher {
    client: reqwest::Client,
}

impl Fetcher {
    /// Build a fetcher with the configured timeout and user agent
    pub fn new(config: &FetchConfig) -> Result<Self> {
        let client = reqwest::Client::builder()
            .timeout(config.timeout)
            .user_agent(config.user_agent.clone())
            .build()?;
        Ok(Self { client })
    }

    /// Perform a single GET and return the response body
    ///
    /// Non-2xx statuses are reported as [`TransportError::Status`] rather
    /// than as body bytes.
    pub async fn fetch(&self, url: &Url) -> std::result::Result<Vec<u8>, TransportError> {
        debug!(%url, "fetching");

        let response = self
            .client
            .get(url.clone())
            .send()
            .await
            .map_err(|e| TransportError::Request {
                url: url.to_string(),
                source: e,
            })?;

        let status = response.status();
        if !status.is_success() {
            return Err(TransportError::Status {
                url: url.to_string(),
                status: status.as_u16(),
            });
        }

        let bytes = response.bytes().await.map_err(|e| TransportError::Request {
            url: url.to_string(),
            source: e,
        })?;

        debug!(%url, len = bytes.len(), "fetched");
        Ok(bytes.to_vec())
    }
}
