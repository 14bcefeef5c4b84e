//! Console rendering of sync events and the optional JSONL report.

use std::path::Path;

use anyhow::{Context, Result};
use tokio::fs::OpenOptions;
use tokio::io::AsyncWriteExt;
use tracing::warn;

use crate::core::{SyncOptions, SyncReport};
use crate::domain::{EventRecord, SyncEvent};

/// URLs longer than this are shortened on the console
const URL_DISPLAY_WIDTH: usize = 80;

pub fn print_banner(options: &SyncOptions) {
    println!("{}", "=".repeat(60));
    println!("IPTV Playlist Updater");
    println!("{}", "=".repeat(60));
    println!("Playlist: {}", options.playlist.display());
    println!("Sources:  {}", options.upstream.len());
    if options.validate_liveness {
        println!("Validating stream URLs");
    }
    println!();
}

/// Render one event as console lines
pub fn format_event(event: &SyncEvent) -> Vec<String> {
    match event {
        SyncEvent::SourceLoaded { url, entries } => {
            vec![format!("✓ Fetched {} ({} entries)", url, entries)]
        }
        SyncEvent::SourceFailed { url, error } => {
            vec![format!("✗ Failed to fetch {}: {}", url, error)]
        }
        SyncEvent::DuplicateSkipped { name, .. } => {
            vec![format!("⊘ Skipping duplicate: {}", name)]
        }
        SyncEvent::UrlAdded {
            name,
            url,
            alternatives,
        } => {
            let mut lines = vec![
                format!("✓ Adding URL: {}", name),
                format!("  New: {}", shorten(url, URL_DISPLAY_WIDTH)),
            ];
            if *alternatives > 1 {
                lines.push(format!("  ({} alternatives available)", alternatives));
            }
            lines
        }
        SyncEvent::UrlUpdated {
            name,
            old_url,
            new_url,
            alternatives,
        } => {
            let mut lines = vec![
                format!("↻ Updating: {}", name),
                format!("  Old: {}", shorten(old_url, URL_DISPLAY_WIDTH)),
                format!("  New: {}", shorten(new_url, URL_DISPLAY_WIDTH)),
            ];
            if *alternatives > 1 {
                lines.push(format!("  ({} alternatives available)", alternatives));
            }
            lines
        }
        SyncEvent::KeptDisabled { name } => {
            vec![format!("⊘ Keeping (manually disabled): {}", name)]
        }
        SyncEvent::WaitingForSource { name } => {
            vec![format!("⊘ Waiting for source: {}", name)]
        }
        SyncEvent::NoUpstreamMatch { name } => {
            vec![format!("ℹ No upstream match: {}", name)]
        }
        SyncEvent::Unreachable {
            name,
            alternatives,
            ..
        } => {
            let mut lines = vec![format!("⚠ Unreachable: {}", name)];
            if *alternatives > 1 {
                lines.push(format!("  Trying {} alternative(s)...", alternatives - 1));
            }
            lines
        }
        SyncEvent::AlternativeAdopted { url, index, .. } => {
            vec![format!(
                "  ✓ Found working alternative [{}]: {}",
                index,
                shorten(url, URL_DISPLAY_WIDTH)
            )]
        }
        SyncEvent::Deactivated { name, .. } => {
            vec![format!("  ✗ No working URL, disabled: {}", name)]
        }
        SyncEvent::BackupCreated { name, url } => vec![
            format!("  ➕ Adding backup: {}", name),
            format!("     URL: {}", shorten(url, URL_DISPLAY_WIDTH)),
        ],
    }
}

pub fn print_events(events: &[SyncEvent]) {
    for event in events {
        for line in format_event(event) {
            println!("{}", line);
        }
    }
}

pub fn print_summary(report: &SyncReport, output: &Path) {
    let stats = &report.stats;
    println!();
    println!(
        "✓ Kept {} channels ({} URLs added, {} URLs updated, {} backups created, {} duplicates removed)",
        report.entries.len(),
        stats.added,
        stats.updated,
        stats.backups_created,
        stats.duplicates_skipped
    );
    println!("✓ Written to {}", output.display());
    println!("{}", "=".repeat(60));
    println!("✓ Update Complete - {} changes", stats.changes());
    println!("{}", "=".repeat(60));
}

/// Append events to a JSONL file, one timestamped record per line
pub async fn append_jsonl(path: &Path, events: &[SyncEvent]) -> Result<()> {
    let mut file = OpenOptions::new()
        .create(true)
        .append(true)
        .open(path)
        .await
        .with_context(|| format!("Failed to open report file: {}", path.display()))?;

    let mut buf = String::new();
    for event in events {
        let json = serde_json::to_string(&EventRecord::new(event.clone()))
            .context("Failed to serialize event")?;
        buf.push_str(&json);
        buf.push('\n');
    }

    file.write_all(buf.as_bytes())
        .await
        .context("Failed to write report")?;
    file.flush().await.context("Failed to flush report")?;

    Ok(())
}

/// Append events to the report file, logging instead of failing.
/// Returns whether the report was written.
pub async fn try_append_jsonl(path: &Path, events: &[SyncEvent]) -> bool {
    match append_jsonl(path, events).await {
        Ok(()) => true,
        Err(e) => {
            warn!(path = %path.display(), error = %format!("{:#}", e), "Failed to write report");
            false
        }
    }
}

/// Truncate to `width` characters, marking the cut with "..."
fn shorten(text: &str, width: usize) -> String {
    if text.chars().count() <= width {
        text.to_string()
    } else {
        let head: String = text.chars().take(width).collect();
        format!("{}...", head)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_shorten() {
        assert_eq!(shorten("abc", 5), "abc");
        assert_eq!(shorten("abcdef", 3), "abc...");
        assert_eq!(shorten("ääää", 2), "ää...");
    }

    #[test]
    fn test_format_update_with_alternatives() {
        let lines = format_event(&SyncEvent::UrlUpdated {
            name: "Chan A".to_string(),
            old_url: "http://a.test/1".to_string(),
            new_url: "http://a.test/2".to_string(),
            alternatives: 2,
        });

        assert_eq!(
            lines,
            vec![
                "↻ Updating: Chan A",
                "  Old: http://a.test/1",
                "  New: http://a.test/2",
                "  (2 alternatives available)",
            ]
        );
    }

    #[test]
    fn test_format_single_alternative_has_no_hint() {
        let lines = format_event(&SyncEvent::UrlAdded {
            name: "B".to_string(),
            url: "http://b.test".to_string(),
            alternatives: 1,
        });
        assert_eq!(lines.len(), 2);
    }

    #[tokio::test]
    async fn test_append_jsonl() {
        let temp = TempDir::new().unwrap();
        let path = temp.path().join("report.jsonl");
        let events = vec![
            SyncEvent::WaitingForSource {
                name: "A".to_string(),
            },
            SyncEvent::BackupCreated {
                name: "B (Backup)".to_string(),
                url: "http://b.test/2".to_string(),
            },
        ];

        append_jsonl(&path, &events).await.unwrap();
        append_jsonl(&path, &events[..1]).await.unwrap();

        let content = std::fs::read_to_string(&path).unwrap();
        let records: Vec<EventRecord> = content
            .lines()
            .map(|line| serde_json::from_str(line).unwrap())
            .collect();

        assert_eq!(records.len(), 3);
        assert_eq!(records[1].event, events[1]);
        assert_eq!(records[2].event.kind(), "waiting_for_source");
    }

    #[tokio::test]
    async fn test_unwritable_report_is_not_fatal() {
        let temp = TempDir::new().unwrap();
        let events = vec![SyncEvent::KeptDisabled {
            name: "A".to_string(),
        }];

        let missing = temp.path().join("no-such-dir").join("report.jsonl");
        assert!(!try_append_jsonl(&missing, &events).await);

        let path = temp.path().join("report.jsonl");
        assert!(try_append_jsonl(&path, &events).await);
        assert_eq!(std::fs::read_to_string(&path).unwrap().lines().count(), 1);
    }
}
