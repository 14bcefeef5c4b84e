//! Reconciliation Integration Tests
//!
//! Tests for the update/add/skip/disable/backup policies.

use std::collections::{HashMap, HashSet, VecDeque};
use std::sync::Mutex;

use async_trait::async_trait;
use iptv_sync::adapters::LivenessProbe;
use iptv_sync::core::UNREACHABLE_SUFFIX;
use iptv_sync::domain::SyncEvent;
use iptv_sync::{playlist, Entry, Reconciler, UpstreamIndex};

/// Probe that must never be called
struct NoProbe;

#[async_trait]
impl LivenessProbe for NoProbe {
    async fn is_live(&self, url: &str) -> bool {
        panic!("probe called for {} without validation", url);
    }
}

/// Probe answering from a fixed set of live URLs
struct SetProbe {
    live: HashSet<String>,
}

impl SetProbe {
    fn new(live: &[&str]) -> Self {
        Self {
            live: live.iter().map(|s| s.to_string()).collect(),
        }
    }
}

#[async_trait]
impl LivenessProbe for SetProbe {
    async fn is_live(&self, url: &str) -> bool {
        self.live.contains(url)
    }
}

/// Probe replaying a scripted sequence of answers per URL
struct ScriptedProbe {
    answers: Mutex<HashMap<String, VecDeque<bool>>>,
}

impl ScriptedProbe {
    fn new(script: &[(&str, Vec<bool>)]) -> Self {
        let answers = script
            .iter()
            .map(|(url, seq)| (url.to_string(), seq.iter().copied().collect()))
            .collect();
        Self {
            answers: Mutex::new(answers),
        }
    }
}

#[async_trait]
impl LivenessProbe for ScriptedProbe {
    async fn is_live(&self, url: &str) -> bool {
        let mut answers = self.answers.lock().unwrap();
        answers
            .get_mut(url)
            .and_then(VecDeque::pop_front)
            .unwrap_or(false)
    }
}

fn entry(line: &str, url: &str) -> Entry {
    Entry::new(line, url, false)
}

fn chan_a_index() -> UpstreamIndex {
    UpstreamIndex::from_sources(vec![vec![
        entry(r#"#EXTINF:-1 tvg-id="x",Channel A"#, "http://a.test/2"),
        entry(r#"#EXTINF:-1 tvg-id="x",Channel A mirror"#, "http://a.test/3"),
    ]])
}

#[tokio::test]
async fn test_update_and_backup_scenario() {
    let curated = playlist::parse("#EXTM3U\n#EXTINF:-1 tvg-id=\"x\",Chan A\nhttp://a.test/1\n");

    let report = Reconciler::new(&NoProbe, false)
        .reconcile(curated, &chan_a_index())
        .await;

    assert_eq!(report.entries.len(), 2);
    assert_eq!(report.entries[0].display_name(), "Chan A");
    assert_eq!(report.entries[0].stream_url, "http://a.test/2");
    assert!(!report.entries[0].disabled);

    assert_eq!(report.entries[1].display_name(), "Chan A (Backup)");
    assert_eq!(report.entries[1].stream_url, "http://a.test/3");
    assert!(!report.entries[1].disabled);

    assert_eq!(report.stats.updated, 1);
    assert_eq!(report.stats.backups_created, 1);
    assert_eq!(report.stats.added, 0);
    assert_eq!(report.stats.changes(), 2);

    assert_eq!(
        playlist::serialize(&report.entries),
        "#EXTM3U\n#EXTINF:-1 tvg-id=\"x\",Chan A\nhttp://a.test/2\n\n#EXTINF:-1 tvg-id=\"x\",Chan A (Backup)\nhttp://a.test/3\n\n"
    );
}

#[tokio::test]
async fn test_duplicate_suppression_keeps_first() {
    let curated = vec![
        entry(r#"#EXTINF:-1 tvg-id="dup",First"#, "http://first.test"),
        entry(r#"#EXTINF:-1 tvg-id="dup",Second"#, "http://second.test"),
        entry("#EXTINF:-1,Other", "http://other.test"),
    ];

    let report = Reconciler::new(&NoProbe, false)
        .reconcile(curated, &UpstreamIndex::new())
        .await;

    let names: Vec<&str> = report.entries.iter().map(Entry::display_name).collect();
    assert_eq!(names, vec!["First", "Other"]);
    assert_eq!(report.stats.duplicates_skipped, 1);
    assert_eq!(report.stats.changes(), 0);
    assert!(report
        .events
        .iter()
        .any(|e| matches!(e, SyncEvent::DuplicateSkipped { name, .. } if name == "Second")));
}

#[tokio::test]
async fn test_name_key_duplicates() {
    let curated = vec![
        entry("#EXTINF:-1,Sky News", "http://one.test"),
        entry("#EXTINF:-1,  SKY   news! ", "http://two.test"),
    ];

    let report = Reconciler::new(&NoProbe, false)
        .reconcile(curated, &UpstreamIndex::new())
        .await;

    assert_eq!(report.entries.len(), 1);
    assert_eq!(report.entries[0].stream_url, "http://one.test");
}

#[tokio::test]
async fn test_disabled_entry_is_not_overwritten() {
    let curated = vec![Entry::new(r#"#EXTINF:-1 tvg-id="x",Chan A"#, "http://a.test/1", true)];

    let report = Reconciler::new(&NoProbe, false)
        .reconcile(curated, &chan_a_index())
        .await;

    assert_eq!(report.entries[0].stream_url, "http://a.test/1");
    assert!(report.entries[0].disabled);
    assert_eq!(report.stats.updated, 0);
    assert!(report
        .events
        .contains(&SyncEvent::KeptDisabled { name: "Chan A".to_string() }));
}

#[tokio::test]
async fn test_empty_url_adopts_first_alternative() {
    let curated = vec![entry(r#"#EXTINF:-1 tvg-id="x",Chan A"#, "")];

    let report = Reconciler::new(&NoProbe, false)
        .reconcile(curated, &chan_a_index())
        .await;

    assert_eq!(report.entries[0].stream_url, "http://a.test/2");
    assert!(!report.entries[0].disabled);
    assert_eq!(report.stats.added, 1);
    assert_eq!(report.stats.updated, 0);
}

#[tokio::test]
async fn test_unmatched_placeholder_is_unchanged() {
    let curated = vec![entry("#EXTINF:-1,Coming Soon", "")];

    let report = Reconciler::new(&NoProbe, false)
        .reconcile(curated.clone(), &chan_a_index())
        .await;

    assert_eq!(report.entries, curated);
    assert!(report.entries[0].disabled);
    assert_eq!(report.stats.changes(), 0);
    assert_eq!(
        report.events,
        vec![SyncEvent::WaitingForSource {
            name: "Coming Soon".to_string()
        }]
    );
}

#[tokio::test]
async fn test_existing_variant_suppresses_backup() {
    let curated = vec![
        entry(r#"#EXTINF:-1 tvg-id="x",Chan A"#, "http://a.test/1"),
        entry(r#"#EXTINF:-1 tvg-id="x-hd",Chan A HD"#, "http://a.test/hd"),
    ];

    let report = Reconciler::new(&NoProbe, false)
        .reconcile(curated, &chan_a_index())
        .await;

    assert_eq!(report.entries.len(), 2);
    assert_eq!(report.stats.backups_created, 0);
}

#[tokio::test]
async fn test_backup_variant_gets_no_backup() {
    let curated = vec![entry(r#"#EXTINF:-1 tvg-id="x",Chan A Backup"#, "http://a.test/1")];

    let report = Reconciler::new(&NoProbe, false)
        .reconcile(curated, &chan_a_index())
        .await;

    assert_eq!(report.entries.len(), 1);
    assert_eq!(report.stats.updated, 1);
    assert_eq!(report.stats.backups_created, 0);
}

#[tokio::test]
async fn test_single_alternative_gets_no_backup() {
    let index = UpstreamIndex::from_sources(vec![vec![entry("#EXTINF:-1,Solo", "http://solo.test/2")]]);
    let curated = vec![entry("#EXTINF:-1,Solo", "http://solo.test/1")];

    let report = Reconciler::new(&NoProbe, false).reconcile(curated, &index).await;

    assert_eq!(report.entries.len(), 1);
    assert_eq!(report.entries[0].stream_url, "http://solo.test/2");
}

#[tokio::test]
async fn test_equal_url_is_not_a_change() {
    let index = UpstreamIndex::from_sources(vec![vec![entry("#EXTINF:-1,Same", "http://same.test")]]);
    let curated = vec![entry("#EXTINF:-1,Same", "http://same.test")];

    let report = Reconciler::new(&NoProbe, false).reconcile(curated, &index).await;

    assert_eq!(report.stats.changes(), 0);
    assert!(report.events.is_empty());
}

#[tokio::test]
async fn test_validation_picks_first_live_alternative() {
    let curated = vec![entry(r#"#EXTINF:-1 tvg-id="x",Chan A"#, "http://a.test/1")];
    let probe = SetProbe::new(&["http://a.test/3"]);

    let report = Reconciler::new(&probe, true)
        .reconcile(curated, &chan_a_index())
        .await;

    assert_eq!(report.entries[0].stream_url, "http://a.test/3");
    assert!(!report.entries[0].disabled);
    assert_eq!(report.stats.updated, 1);
}

#[tokio::test]
async fn test_failed_probe_adopts_untried_alternative() {
    let curated = vec![entry(r#"#EXTINF:-1 tvg-id="x",Chan A"#, "http://a.test/1")];
    // a.test/2 passes selection, then fails the follow-up probe
    let probe = ScriptedProbe::new(&[
        ("http://a.test/2", vec![true, false]),
        ("http://a.test/3", vec![true]),
    ]);

    let report = Reconciler::new(&probe, true)
        .reconcile(curated, &chan_a_index())
        .await;

    let chan = &report.entries[0];
    assert_eq!(chan.stream_url, "http://a.test/3");
    assert!(!chan.disabled);
    assert_eq!(report.stats.updated, 2);
    assert!(report.events.contains(&SyncEvent::AlternativeAdopted {
        name: "Chan A".to_string(),
        url: "http://a.test/3".to_string(),
        index: 1,
    }));
}

#[tokio::test]
async fn test_nothing_live_deactivates_entry() {
    let curated = vec![entry(r#"#EXTINF:-1 tvg-id="x",Chan A"#, "http://a.test/1")];
    let probe = SetProbe::new(&[]);

    let report = Reconciler::new(&probe, true)
        .reconcile(curated, &chan_a_index())
        .await;

    let chan = &report.entries[0];
    assert!(chan.disabled);
    assert_eq!(chan.stream_url, format!("http://a.test/2{}", UNREACHABLE_SUFFIX));
    assert_eq!(
        chan.to_lines().last().unwrap(),
        "#http://a.test/2 # disabled: unreachable"
    );
    // The fallback to the first alternative still counts as an update
    assert_eq!(report.stats.updated, 1);
}

#[tokio::test]
async fn test_unmatched_dead_url_is_deactivated() {
    let curated = vec![entry("#EXTINF:-1,Lonely", "http://lonely.test")];
    let probe = SetProbe::new(&[]);

    let report = Reconciler::new(&probe, true)
        .reconcile(curated, &UpstreamIndex::new())
        .await;

    assert!(report.entries[0].disabled);
    assert!(report.entries[0].stream_url.ends_with(UNREACHABLE_SUFFIX));
    assert_eq!(report.stats.changes(), 0);
}

#[tokio::test]
async fn test_validation_skips_disabled_entries() {
    let curated = vec![Entry::new("#EXTINF:-1,Off", "http://off.test", true)];
    let probe = SetProbe::new(&[]);

    let report = Reconciler::new(&probe, true)
        .reconcile(curated, &UpstreamIndex::new())
        .await;

    assert_eq!(report.entries[0].stream_url, "http://off.test");
    assert!(report.entries[0].disabled);
}

#[tokio::test]
async fn test_output_order_follows_input() {
    let index = UpstreamIndex::from_sources(vec![
        vec![
            entry("#EXTINF:-1,B", "http://b.test/1"),
            entry("#EXTINF:-1,A", "http://a.test/1"),
        ],
        vec![entry("#EXTINF:-1,B", "http://b.test/2")],
    ]);
    let curated = vec![
        entry("#EXTINF:-1,A", ""),
        entry("#EXTINF:-1,B", ""),
        entry("#EXTINF:-1,C", ""),
    ];

    let report = Reconciler::new(&NoProbe, false).reconcile(curated, &index).await;

    let names: Vec<&str> = report.entries.iter().map(Entry::display_name).collect();
    assert_eq!(names, vec!["A", "B", "B (Backup)", "C"]);
    assert_eq!(report.entries[2].stream_url, "http://b.test/2");
    assert_eq!(report.stats.added, 2);
}
