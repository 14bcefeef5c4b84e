//! Structured outcome records emitted during a sync run.
//!
//! The reconciliation pass never prints. It records what happened to each
//! entry as a [`SyncEvent`]; the CLI renders these for humans and can append
//! them to a JSONL report.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// One observable outcome of a sync run
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "event", rename_all = "snake_case")]
pub enum SyncEvent {
    /// An upstream source was fetched and parsed
    SourceLoaded {
        url: String,
        entries: usize,
    },

    /// An upstream source could not be fetched
    SourceFailed {
        url: String,
        error: String,
    },

    /// A curated entry repeated an earlier match key and was dropped
    DuplicateSkipped {
        name: String,
        key: String,
    },

    /// An entry without a URL received one from upstream
    UrlAdded {
        name: String,
        url: String,
        alternatives: usize,
    },

    /// An entry's URL was replaced by the upstream URL
    UrlUpdated {
        name: String,
        old_url: String,
        new_url: String,
        alternatives: usize,
    },

    /// A manually disabled entry was left alone
    KeptDisabled {
        name: String,
    },

    /// An entry without a URL has no upstream match yet
    WaitingForSource {
        name: String,
    },

    /// An active entry has no upstream match
    NoUpstreamMatch {
        name: String,
    },

    /// An entry's URL failed the liveness probe
    Unreachable {
        name: String,
        url: String,
        alternatives: usize,
    },

    /// A working alternative replaced an unreachable URL
    AlternativeAdopted {
        name: String,
        url: String,
        index: usize,
    },

    /// No working URL was found and the entry was commented out
    Deactivated {
        name: String,
        url: String,
    },

    /// A backup entry was synthesized from the second alternative
    BackupCreated {
        name: String,
        url: String,
    },
}

impl SyncEvent {
    /// Short machine-readable label
    pub fn kind(&self) -> &'static str {
        match self {
            Self::SourceLoaded { .. } => "source_loaded",
            Self::SourceFailed { .. } => "source_failed",
            Self::DuplicateSkipped { .. } => "duplicate_skipped",
            Self::UrlAdded { .. } => "url_added",
            Self::UrlUpdated { .. } => "url_updated",
            Self::KeptDisabled { .. } => "kept_disabled",
            Self::WaitingForSource { .. } => "waiting_for_source",
            Self::NoUpstreamMatch { .. } => "no_upstream_match",
            Self::Unreachable { .. } => "unreachable",
            Self::AlternativeAdopted { .. } => "alternative_adopted",
            Self::Deactivated { .. } => "deactivated",
            Self::BackupCreated { .. } => "backup_created",
        }
    }
}

/// A [`SyncEvent`] stamped with the time it was recorded, as written to the
/// JSONL report
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EventRecord {
    /// When this event was recorded (ISO 8601)
    pub timestamp: DateTime<Utc>,

    #[serde(flatten)]
    pub event: SyncEvent,
}

impl EventRecord {
    /// Stamp an event with the current time
    pub fn new(event: SyncEvent) -> Self {
        Self {
            timestamp: Utc::now(),
            event,
        }
    }
}

/// Counts of structural changes made during a run
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SyncStats {
    pub added: usize,
    pub updated: usize,
    pub backups_created: usize,
    pub duplicates_skipped: usize,
}

impl SyncStats {
    /// Structural changes: additions, updates and synthesized backups
    pub fn changes(&self) -> usize {
        self.added + self.updated + self.backups_created
    }
}
