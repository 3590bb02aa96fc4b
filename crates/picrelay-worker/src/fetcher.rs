//! Image byte retrieval from the internal render API.

use std::time::Duration;

use bytes::Bytes;
use reqwest::StatusCode;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum FetchError {
    #[error("Request to {url} failed: {source}")]
    Transport {
        url: String,
        #[source]
        source: reqwest::Error,
    },

    #[error("Unexpected status {status} fetching {url}")]
    Status { url: String, status: StatusCode },
}

/// Fetches image bytes for an event payload path.
///
/// The retrieval URL is the configured base URL with the raw payload path
/// appended. Any 2xx is success; everything else aborts the run. One attempt
/// per event, no retry.
#[derive(Debug, Clone)]
pub struct ImageFetcher {
    client: reqwest::Client,
    base_url: String,
}

impl ImageFetcher {
    /// `timeout` of `None` leaves requests unbounded; a hung fetch then
    /// stalls only its own run.
    pub fn new(base_url: String, timeout: Option<Duration>) -> anyhow::Result<Self> {
        let mut builder = reqwest::Client::builder();
        if let Some(timeout) = timeout {
            builder = builder.timeout(timeout);
        }
        let client = builder.build()?;
        Ok(Self { client, base_url })
    }

    pub async fn fetch(&self, path: &str) -> Result<Bytes, FetchError> {
        let url = format!("{}{}", self.base_url, path);
        tracing::debug!(url = %url, "Fetching image");

        let response = self
            .client
            .get(&url)
            .send()
            .await
            .map_err(|source| FetchError::Transport {
                url: url.clone(),
                source,
            })?;

        let status = response.status();
        if !status.is_success() {
            return Err(FetchError::Status { url, status });
        }

        response
            .bytes()
            .await
            .map_err(|source| FetchError::Transport { url, source })
    }
}
