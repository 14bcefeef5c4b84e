//! Reconciliation of a curated playlist against the upstream index.
//!
//! Policies, applied per curated entry in file order:
//! - duplicates (same match key as an earlier entry) are dropped
//! - entries without a URL adopt the first upstream alternative
//! - active entries follow upstream URL changes; disabled entries are left alone
//! - with liveness validation, dead URLs fall back to other alternatives or
//!   get commented out
//! - entries with two or more alternatives get one synthesized backup entry
//!   unless the playlist already carries a variant of them

use std::collections::HashSet;

use tracing::{debug, info, instrument, warn};

use crate::adapters::LivenessProbe;
use crate::domain::{Entry, SyncEvent, SyncStats};

use super::upstream::UpstreamIndex;

/// Appended to the URL of an entry that was deactivated for being unreachable
pub const UNREACHABLE_SUFFIX: &str = " # disabled: unreachable";

/// Result of a reconciliation pass
#[derive(Debug, Clone, Default)]
pub struct SyncReport {
    /// Output entries in write order
    pub entries: Vec<Entry>,

    pub stats: SyncStats,

    /// Per-entry outcomes, in the order they happened
    pub events: Vec<SyncEvent>,
}

impl SyncReport {
    fn record(&mut self, event: SyncEvent) {
        self.events.push(event);
    }
}

/// Applies upstream state to curated entries
pub struct Reconciler<'a> {
    probe: &'a dyn LivenessProbe,
    validate_liveness: bool,
}

impl<'a> Reconciler<'a> {
    /// Create a reconciler. The probe is only consulted when
    /// `validate_liveness` is set.
    pub fn new(probe: &'a dyn LivenessProbe, validate_liveness: bool) -> Self {
        Self {
            probe,
            validate_liveness,
        }
    }

    /// Run one reconciliation pass over `curated`
    #[instrument(skip_all, fields(entries = curated.len(), validate = self.validate_liveness))]
    pub async fn reconcile(&self, curated: Vec<Entry>, index: &UpstreamIndex) -> SyncReport {
        // Existing-backup detection looks at the playlist as it was read
        let original_names: Vec<String> = curated
            .iter()
            .map(|entry| entry.display_name().to_string())
            .collect();

        let mut seen_keys: HashSet<String> = HashSet::with_capacity(curated.len());
        let mut report = SyncReport {
            entries: Vec::with_capacity(curated.len()),
            ..Default::default()
        };

        for mut entry in curated {
            let key = entry.match_key();
            if !seen_keys.insert(key.clone()) {
                debug!(name = entry.display_name(), %key, "Skipping duplicate");
                report.stats.duplicates_skipped += 1;
                report.record(SyncEvent::DuplicateSkipped {
                    name: entry.display_name().to_string(),
                    key,
                });
                continue;
            }

            let is_backup = entry.is_backup_variant();
            let alternatives = index.get(&key).unwrap_or(&[]);

            if alternatives.is_empty() {
                record_unmatched(&entry, &mut report);
            } else {
                let candidate = self.select_candidate(alternatives).await;
                apply_candidate(&mut entry, candidate, alternatives.len(), &mut report);
            }

            if self.validate_liveness && entry.is_active() {
                self.verify_liveness(&mut entry, alternatives, &mut report)
                    .await;
            }

            let backup = if !is_backup
                && alternatives.len() >= 2
                && !has_existing_variant(entry.display_name(), &original_names)
            {
                Some(entry.backup_for(alternatives[1].stream_url.clone()))
            } else {
                None
            };

            report.entries.push(entry);

            if let Some(backup) = backup {
                info!(name = backup.display_name(), url = %backup.stream_url, "Adding backup");
                report.stats.backups_created += 1;
                report.record(SyncEvent::BackupCreated {
                    name: backup.display_name().to_string(),
                    url: backup.stream_url.clone(),
                });
                report.entries.push(backup);
            }
        }

        info!(
            kept = report.entries.len(),
            added = report.stats.added,
            updated = report.stats.updated,
            backups = report.stats.backups_created,
            "Reconciliation complete"
        );

        report
    }

    /// First alternative, or the first live one when validating
    async fn select_candidate<'e>(&self, alternatives: &'e [Entry]) -> &'e Entry {
        if self.validate_liveness {
            for alternative in alternatives {
                if self.probe.is_live(&alternative.stream_url).await {
                    return alternative;
                }
            }
        }
        &alternatives[0]
    }

    /// Probe the entry's current URL and fall back to other alternatives.
    /// The first alternative and the URL just probed are not retried.
    async fn verify_liveness(
        &self,
        entry: &mut Entry,
        alternatives: &[Entry],
        report: &mut SyncReport,
    ) {
        if self.probe.is_live(&entry.stream_url).await {
            return;
        }

        warn!(name = entry.display_name(), url = %entry.stream_url, "Unreachable");
        report.record(SyncEvent::Unreachable {
            name: entry.display_name().to_string(),
            url: entry.stream_url.clone(),
            alternatives: alternatives.len(),
        });

        let probed = entry.stream_url.clone();
        for (index, alternative) in alternatives.iter().enumerate().skip(1) {
            if alternative.stream_url == probed {
                continue;
            }
            if self.probe.is_live(&alternative.stream_url).await {
                info!(name = entry.display_name(), url = %alternative.stream_url, "Found working alternative");
                entry.set_url(alternative.stream_url.clone());
                report.stats.updated += 1;
                report.record(SyncEvent::AlternativeAdopted {
                    name: entry.display_name().to_string(),
                    url: alternative.stream_url.clone(),
                    index,
                });
                return;
            }
        }

        entry.disabled = true;
        entry.stream_url.push_str(UNREACHABLE_SUFFIX);
        report.record(SyncEvent::Deactivated {
            name: entry.display_name().to_string(),
            url: probed,
        });
    }
}

fn record_unmatched(entry: &Entry, report: &mut SyncReport) {
    let name = entry.display_name().to_string();
    let event = if !entry.has_url() {
        SyncEvent::WaitingForSource { name }
    } else if entry.disabled {
        SyncEvent::KeptDisabled { name }
    } else {
        SyncEvent::NoUpstreamMatch { name }
    };
    debug!(name = entry.display_name(), outcome = event.kind(), "No upstream match");
    report.record(event);
}

fn apply_candidate(
    entry: &mut Entry,
    candidate: &Entry,
    alternatives: usize,
    report: &mut SyncReport,
) {
    if !entry.has_url() {
        info!(name = entry.display_name(), url = %candidate.stream_url, "Adding URL");
        entry.set_url(candidate.stream_url.clone());
        report.stats.added += 1;
        report.record(SyncEvent::UrlAdded {
            name: entry.display_name().to_string(),
            url: candidate.stream_url.clone(),
            alternatives,
        });
    } else if entry.stream_url != candidate.stream_url {
        if entry.disabled {
            debug!(name = entry.display_name(), "Keeping manually disabled entry");
            report.record(SyncEvent::KeptDisabled {
                name: entry.display_name().to_string(),
            });
            return;
        }

        info!(name = entry.display_name(), old = %entry.stream_url, new = %candidate.stream_url, "Updating URL");
        let old_url = std::mem::replace(&mut entry.stream_url, candidate.stream_url.clone());
        entry.disabled = false;
        report.stats.updated += 1;
        report.record(SyncEvent::UrlUpdated {
            name: entry.display_name().to_string(),
            old_url,
            new_url: candidate.stream_url.clone(),
            alternatives,
        });
    }
}

/// True if some other name in the original playlist embeds `name`
fn has_existing_variant(name: &str, original_names: &[String]) -> bool {
    original_names
        .iter()
        .any(|other| other.contains(name) && other != name)
}
