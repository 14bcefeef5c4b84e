//! iptv-sync - Keep a curated IPTV playlist in step with upstream sources
//!
//! Reads a hand-maintained extended M3U playlist, fetches one or more
//! upstream playlists, and updates stream URLs in place while keeping the
//! curated metadata, comments and manual overrides intact.
//!
//! # Architecture
//!
//! A run is a single batch pass:
//! - the curated playlist is parsed into entries
//! - upstream playlists are fetched and grouped by match key
//! - each curated entry is reconciled against its upstream alternatives
//! - the result is written back atomically
//!
//! Every outcome is recorded as a structured event; the CLI renders them.
//!
//! # Modules
//!
//! - `adapters`: Network integrations (fetching, liveness probes)
//! - `core`: Upstream index, reconciliation, orchestration
//! - `domain`: Data structures (Entry, Attributes, SyncEvent)
//! - `playlist`: M3U parsing, serialization and file storage
//! - `cli`: Command-line interface
//!
//! # Usage
//!
//! ```bash
//! # Update ./my from the built-in sources
//! iptv-sync
//!
//! # Use a specific playlist and source, validating streams
//! iptv-sync --playlist curated.m3u --upstream https://example.test/all.m3u --validate
//! ```

pub mod adapters;
pub mod cli;
pub mod config;
pub mod core;
pub mod domain;
pub mod playlist;

// Re-export main types at crate root for convenience
pub use crate::core::{Orchestrator, Reconciler, SyncOptions, SyncReport, UpstreamIndex};
pub use domain::{Entry, SyncEvent, SyncStats};
pub use playlist::PlaylistFileError;
