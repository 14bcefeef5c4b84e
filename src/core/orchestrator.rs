//! Drives one batch sync run.
//!
//! Load the curated playlist, fetch and index every upstream source,
//! reconcile, and write the result. Only the curated file's I/O can fail
//! the run; everything network-related degrades per source or per URL.

use std::path::PathBuf;

use tracing::{info, instrument};

use crate::adapters::{LivenessProbe, SourceFetcher};
use crate::playlist::{store, PlaylistFileError};

use super::reconcile::{Reconciler, SyncReport};
use super::upstream::UpstreamIndex;

/// What to sync and where to write it
#[derive(Debug, Clone)]
pub struct SyncOptions {
    /// Curated playlist to read
    pub playlist: PathBuf,

    /// Destination (defaults to `playlist`, rewritten in place)
    pub output: Option<PathBuf>,

    /// Upstream playlist URLs, in priority order
    pub upstream: Vec<String>,

    /// Probe stream URLs and fall back or deactivate dead ones
    pub validate_liveness: bool,
}

impl SyncOptions {
    /// Where the reconciled playlist is written
    pub fn output_path(&self) -> &PathBuf {
        self.output.as_ref().unwrap_or(&self.playlist)
    }
}

/// Main sync orchestrator
pub struct Orchestrator<C> {
    /// Network adapter used for both fetching and probing
    client: C,
}

impl<C> Orchestrator<C>
where
    C: SourceFetcher + LivenessProbe,
{
    pub fn new(client: C) -> Self {
        Self { client }
    }

    /// Execute a full sync run.
    ///
    /// The returned report's events start with one record per upstream
    /// source, followed by the per-entry outcomes.
    #[instrument(skip(self, options), fields(playlist = %options.playlist.display()))]
    pub async fn run(&self, options: &SyncOptions) -> Result<SyncReport, PlaylistFileError> {
        let curated = store::load(&options.playlist).await?;
        info!(entries = curated.len(), "Loaded curated playlist");

        let (index, source_events) = UpstreamIndex::load(&self.client, &options.upstream).await;

        let reconciler = Reconciler::new(&self.client, options.validate_liveness);
        let mut report = reconciler.reconcile(curated, &index).await;

        let output = options.output_path();
        store::save(output, &report.entries).await?;
        info!(path = %output.display(), entries = report.entries.len(), "Wrote playlist");

        let mut events = source_events;
        events.append(&mut report.events);
        report.events = events;

        Ok(report)
    }
}
