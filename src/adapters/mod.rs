//! Adapter interfaces for the network.
//!
//! The sync pass only depends on these traits; `HttpClient` is the real
//! implementation and tests substitute in-memory fakes.

pub mod http;

use anyhow::Result;
use async_trait::async_trait;

// Re-export the HTTP adapter
pub use http::{HttpClient, HttpSettings};

/// Retrieves the raw text of an upstream playlist
#[async_trait]
pub trait SourceFetcher: Send + Sync {
    /// Fetch the full body of `url` as text
    async fn fetch(&self, url: &str) -> Result<String>;
}

/// Best-effort reachability check for stream URLs
#[async_trait]
pub trait LivenessProbe: Send + Sync {
    /// True if the stream answered with a success status in time
    async fn is_live(&self, url: &str) -> bool;
}
