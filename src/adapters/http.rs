//! HTTP adapter for fetching upstream playlists and probing streams.
//!
//! Certificate and hostname verification are disabled: many IPTV sources
//! serve broken or self-signed TLS, and the fetched data is only ever
//! compared against, never executed.

use std::time::Duration;

use anyhow::{Context, Result};
use async_trait::async_trait;
use reqwest::header::RANGE;
use reqwest::{Client, StatusCode};
use serde::{Deserialize, Serialize};
use tracing::debug;

use super::{LivenessProbe, SourceFetcher};

/// Default user agent sent with every request
pub const DEFAULT_USER_AGENT: &str = "Mozilla/5.0 (IPTV-Updater/1.0)";

/// Byte range requested when a HEAD probe fails
const PROBE_RANGE: &str = "bytes=0-1024";

/// Timeouts and identity for outgoing requests
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct HttpSettings {
    /// Timeout for fetching an upstream playlist (default: 10)
    #[serde(default = "default_fetch_timeout")]
    pub fetch_timeout_seconds: u64,

    /// Timeout for a single liveness probe request (default: 5)
    #[serde(default = "default_probe_timeout")]
    pub probe_timeout_seconds: u64,

    #[serde(default = "default_user_agent")]
    pub user_agent: String,
}

fn default_fetch_timeout() -> u64 {
    10
}
fn default_probe_timeout() -> u64 {
    5
}
fn default_user_agent() -> String {
    DEFAULT_USER_AGENT.to_string()
}

impl Default for HttpSettings {
    fn default() -> Self {
        Self {
            fetch_timeout_seconds: default_fetch_timeout(),
            probe_timeout_seconds: default_probe_timeout(),
            user_agent: default_user_agent(),
        }
    }
}

/// reqwest-backed fetcher and liveness probe
pub struct HttpClient {
    client: Client,
    fetch_timeout: Duration,
    probe_timeout: Duration,
}

impl HttpClient {
    /// Build a client with relaxed TLS verification
    pub fn new(settings: &HttpSettings) -> Result<Self> {
        let client = Client::builder()
            .user_agent(settings.user_agent.clone())
            .danger_accept_invalid_certs(true)
            .danger_accept_invalid_hostnames(true)
            .build()
            .context("Failed to build HTTP client")?;

        Ok(Self {
            client,
            fetch_timeout: Duration::from_secs(settings.fetch_timeout_seconds),
            probe_timeout: Duration::from_secs(settings.probe_timeout_seconds),
        })
    }

    async fn head_ok(&self, url: &str) -> bool {
        match self.client.head(url).timeout(self.probe_timeout).send().await {
            Ok(response) => is_live_status(response.status()),
            Err(e) => {
                debug!(%url, error = %e, "HEAD probe failed");
                false
            }
        }
    }

    async fn partial_get_ok(&self, url: &str) -> bool {
        match self
            .client
            .get(url)
            .header(RANGE, PROBE_RANGE)
            .timeout(self.probe_timeout)
            .send()
            .await
        {
            Ok(response) => is_live_status(response.status()),
            Err(e) => {
                debug!(%url, error = %e, "Ranged GET probe failed");
                false
            }
        }
    }
}

/// 200 OK or 206 Partial Content
fn is_live_status(status: StatusCode) -> bool {
    status == StatusCode::OK || status == StatusCode::PARTIAL_CONTENT
}

/// URLs that can never be probed: empty or commented out
fn is_probeable(url: &str) -> bool {
    !url.is_empty() && !url.starts_with('#')
}

#[async_trait]
impl SourceFetcher for HttpClient {
    async fn fetch(&self, url: &str) -> Result<String> {
        let response = self
            .client
            .get(url)
            .timeout(self.fetch_timeout)
            .send()
            .await
            .with_context(|| format!("Failed to fetch {}", url))?
            .error_for_status()
            .with_context(|| format!("Upstream {} returned an error status", url))?;

        let bytes = response
            .bytes()
            .await
            .with_context(|| format!("Failed to read body of {}", url))?;

        Ok(String::from_utf8_lossy(&bytes).into_owned())
    }
}

#[async_trait]
impl LivenessProbe for HttpClient {
    async fn is_live(&self, url: &str) -> bool {
        if !is_probeable(url) {
            return false;
        }

        self.head_ok(url).await || self.partial_get_ok(url).await
    }
}
