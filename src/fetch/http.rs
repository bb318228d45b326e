// SPDX-License-Identifier: MPL-2.0
//! HTTP fetching with `reqwest`.

use super::Fetcher;
use crate::config::FetchConfig;
use crate::error::FetchError;
use async_trait::async_trait;
use futures_util::StreamExt;
use reqwest::Client;

const USER_AGENT: &str = concat!("ScanLens/", env!("CARGO_PKG_VERSION"));

/// Fetches a URL with a single `GET`, reading the whole body.
#[derive(Debug, Clone)]
pub struct HttpFetcher {
    client: Client,
}

impl HttpFetcher {
    /// Builds a client with the configured request timeout.
    ///
    /// # Errors
    ///
    /// Returns [`FetchError::Network`] if the TLS backend cannot initialise.
    pub fn new(config: &FetchConfig) -> Result<Self, FetchError> {
        let client = Client::builder()
            .redirect(reqwest::redirect::Policy::limited(10))
            .user_agent(USER_AGENT)
            .timeout(config.timeout())
            .build()
            .map_err(|e| FetchError::Network(e.to_string()))?;
        Ok(Self { client })
    }
}

#[async_trait]
impl Fetcher for HttpFetcher {
    async fn fetch_bytes(&self, location: &str) -> Result<Vec<u8>, FetchError> {
        let response = self
            .client
            .get(location)
            .send()
            .await
            .map_err(|e| FetchError::Network(e.to_string()))?;

        let status = response.status();
        if !status.is_success() {
            return Err(FetchError::Http {
                status: status.as_u16(),
            });
        }

        let expected = response.content_length().unwrap_or(0);
        let mut body = Vec::with_capacity(usize::try_from(expected).unwrap_or(0));
        let mut stream = response.bytes_stream();

        while let Some(chunk) = stream.next().await {
            let chunk = chunk.map_err(|e| FetchError::Network(e.to_string()))?;
            body.extend_from_slice(&chunk);
        }

        tracing::debug!(location, bytes = body.len(), "fetched");
        Ok(body)
    }
}
