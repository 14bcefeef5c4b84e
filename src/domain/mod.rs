//! Domain types for iptv-sync.
//!
//! This module contains the core data structures:
//! - Attributes: `key="value"` pairs parsed from metadata lines
//! - Entry: one playlist item and its match key
//! - Events: outcome records produced by a sync run

pub mod attributes;
pub mod entry;
pub mod events;

// Re-export commonly used types
pub use attributes::Attributes;
pub use entry::{normalize_name, Entry, BACKUP_MARKERS, BACKUP_SUFFIX, METADATA_PREFIX, NO_ID_SENTINEL};
pub use events::{EventRecord, SyncEvent, SyncStats};
