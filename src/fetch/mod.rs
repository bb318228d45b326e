// SPDX-License-Identifier: MPL-2.0
//! Retrieval of the bytes behind a reference.
//!
//! [`Fetcher`] is the boundary to whatever serves frame data. [`HttpFetcher`]
//! reads `http(s)` URLs, [`FileFetcher`] reads local paths and `file://` URLs,
//! and [`AnyFetcher`] routes between them. [`Retrying`] wraps any fetcher with
//! bounded exponential backoff.

mod file;
mod http;
mod reference;

pub use file::FileFetcher;
pub use http::HttpFetcher;
pub use reference::Reference;

use crate::config::FetchConfig;
use crate::error::FetchError;
use async_trait::async_trait;
use std::time::Duration;

/// Port for fetching raw bytes.
#[async_trait]
pub trait Fetcher: Send + Sync {
    /// Reads every byte behind `location`.
    ///
    /// # Errors
    ///
    /// Returns a [`FetchError`] describing why the bytes are unavailable.
    async fn fetch_bytes(&self, location: &str) -> Result<Vec<u8>, FetchError>;
}

/// Backoff parameters for [`Retrying`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RetryPolicy {
    pub max_attempts: u32,
    pub initial_backoff: Duration,
    pub max_backoff: Duration,
}

impl RetryPolicy {
    #[must_use]
    pub fn from_config(config: &FetchConfig) -> Self {
        Self {
            max_attempts: config.max_attempts(),
            initial_backoff: config.initial_backoff(),
            max_backoff: config.max_backoff(),
        }
    }

    /// Delay before the attempt following `attempt` (1-based).
    #[must_use]
    pub fn backoff(&self, attempt: u32) -> Duration {
        let factor = 2u32.saturating_pow(attempt.saturating_sub(1));
        self.initial_backoff
            .saturating_mul(factor)
            .min(self.max_backoff)
    }
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self::from_config(&FetchConfig::default())
    }
}

/// Fetcher that retries transient failures of an inner fetcher.
///
/// Permanent failures (client errors, missing files) return at once.
pub struct Retrying<F> {
    inner: F,
    policy: RetryPolicy,
}

impl<F: Fetcher> Retrying<F> {
    #[must_use]
    pub fn new(inner: F, policy: RetryPolicy) -> Self {
        Self { inner, policy }
    }
}

#[async_trait]
impl<F: Fetcher> Fetcher for Retrying<F> {
    async fn fetch_bytes(&self, location: &str) -> Result<Vec<u8>, FetchError> {
        let attempts = self.policy.max_attempts.max(1);
        let mut attempt = 1;

        loop {
            match self.inner.fetch_bytes(location).await {
                Ok(bytes) => return Ok(bytes),
                Err(e) if !e.is_retryable() => return Err(e),
                Err(e) if attempt >= attempts => {
                    return Err(FetchError::Exhausted {
                        attempts,
                        last: Box::new(e),
                    })
                }
                Err(e) => {
                    let delay = self.policy.backoff(attempt);
                    tracing::warn!(
                        location,
                        attempt,
                        max_attempts = attempts,
                        delay_ms = u64::try_from(delay.as_millis()).unwrap_or(u64::MAX),
                        error = %e,
                        "fetch failed, retrying"
                    );
                    tokio::time::sleep(delay).await;
                    attempt += 1;
                }
            }
        }
    }
}

/// Routes `http://` and `https://` locations to HTTP, everything else to files.
pub struct AnyFetcher {
    http: HttpFetcher,
    file: FileFetcher,
}

impl AnyFetcher {
    /// # Errors
    ///
    /// Returns [`FetchError::Network`] if the HTTP client cannot be built.
    pub fn new(config: &FetchConfig) -> Result<Self, FetchError> {
        Ok(Self {
            http: HttpFetcher::new(config)?,
            file: FileFetcher,
        })
    }

    /// Builds the fetcher a viewer uses by default: routing plus retries.
    ///
    /// # Errors
    ///
    /// Returns [`FetchError::Network`] if the HTTP client cannot be built.
    pub fn with_retries(config: &FetchConfig) -> Result<Retrying<Self>, FetchError> {
        Ok(Retrying::new(Self::new(config)?, RetryPolicy::from_config(config)))
    }
}

/// Returns whether `location` is fetched over the network.
#[must_use]
pub fn is_remote(location: &str) -> bool {
    let lower = location.trim_start().to_ascii_lowercase();
    lower.starts_with("http://") || lower.starts_with("https://")
}

#[async_trait]
impl Fetcher for AnyFetcher {
    async fn fetch_bytes(&self, location: &str) -> Result<Vec<u8>, FetchError> {
        if is_remote(location) {
            self.http.fetch_bytes(location).await
        } else {
            self.file.fetch_bytes(location).await
        }
    }
}
