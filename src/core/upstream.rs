//! Index of upstream entries keyed by match key.

use std::collections::HashMap;

use tracing::{info, warn};

use crate::adapters::SourceFetcher;
use crate::domain::{Entry, SyncEvent};
use crate::playlist;

/// `match key -> alternatives`, in source order then file order
#[derive(Debug, Clone, Default)]
pub struct UpstreamIndex {
    alternatives: HashMap<String, Vec<Entry>>,
}

impl UpstreamIndex {
    pub fn new() -> Self {
        Self::default()
    }

    /// Build an index from already-parsed source lists
    pub fn from_sources<I>(sources: I) -> Self
    where
        I: IntoIterator<Item = Vec<Entry>>,
    {
        let mut index = Self::new();
        for entries in sources {
            index.extend(entries);
        }
        index
    }

    /// Fetch every source in order and index its entries.
    ///
    /// A source that fails to fetch is logged and skipped; the returned
    /// events record what happened to each one.
    pub async fn load(fetcher: &dyn SourceFetcher, urls: &[String]) -> (Self, Vec<SyncEvent>) {
        let mut index = Self::new();
        let mut events = Vec::with_capacity(urls.len());

        for url in urls {
            match fetcher.fetch(url).await {
                Ok(content) => {
                    let entries = playlist::parse(&content);
                    info!(%url, bytes = content.len(), entries = entries.len(), "Loaded upstream source");
                    events.push(SyncEvent::SourceLoaded {
                        url: url.clone(),
                        entries: entries.len(),
                    });
                    index.extend(entries);
                }
                Err(e) => {
                    warn!(%url, error = %format!("{:#}", e), "Skipping upstream source");
                    events.push(SyncEvent::SourceFailed {
                        url: url.clone(),
                        error: format!("{:#}", e),
                    });
                }
            }
        }

        info!(
            entries = index.total_entries(),
            keys = index.len(),
            "Upstream index built"
        );

        (index, events)
    }

    /// Append entries from one source. Entries without a URL are ignored.
    pub fn extend(&mut self, entries: Vec<Entry>) {
        for entry in entries {
            if !entry.has_url() {
                continue;
            }
            self.alternatives
                .entry(entry.match_key())
                .or_default()
                .push(entry);
        }
    }

    /// Alternatives for a key, if any
    pub fn get(&self, key: &str) -> Option<&[Entry]> {
        self.alternatives.get(key).map(Vec::as_slice)
    }

    pub fn contains_key(&self, key: &str) -> bool {
        self.alternatives.contains_key(key)
    }

    /// Number of distinct keys
    pub fn len(&self) -> usize {
        self.alternatives.len()
    }

    pub fn is_empty(&self) -> bool {
        self.alternatives.is_empty()
    }

    /// Number of indexed entries across all keys
    pub fn total_entries(&self) -> usize {
        self.alternatives.values().map(Vec::len).sum()
    }
}
