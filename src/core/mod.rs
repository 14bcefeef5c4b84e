//! Core sync logic.
//!
//! This module contains:
//! - UpstreamIndex: upstream entries grouped by match key
//! - Reconciler: the per-entry update/add/disable/backup policies
//! - Orchestrator: one full batch run

pub mod orchestrator;
pub mod reconcile;
pub mod upstream;

// Re-export commonly used types
pub use orchestrator::{Orchestrator, SyncOptions};
pub use reconcile::{Reconciler, SyncReport, UNREACHABLE_SUFFIX};
pub use upstream::UpstreamIndex;
