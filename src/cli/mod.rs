//! Command-line interface for iptv-sync.
//!
//! One invocation performs one sync pass. The exit status tells callers
//! (cron jobs, CI) whether the playlist changed.

use std::path::PathBuf;
use std::process::ExitCode;

use anyhow::Result;
use clap::builder::BoolishValueParser;
use clap::Parser;
use tracing::debug;

use crate::adapters::HttpClient;
use crate::config::{self, ResolvedConfig};
use crate::core::{Orchestrator, SyncOptions};

pub mod report;

/// Exit status when the run made at least one change
pub const EXIT_CHANGED: u8 = 0;

/// Exit status when the run made no change
pub const EXIT_UNCHANGED: u8 = 1;

/// Exit status for fatal errors (unreadable playlist, unwritable output,
/// bad configuration)
pub const EXIT_FATAL: u8 = 2;

/// iptv-sync - Update an IPTV playlist from upstream sources
#[derive(Parser, Debug)]
#[command(name = "iptv-sync")]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    /// Path to the curated playlist file [default: my]
    #[arg(short, long, env = "IPTV_SYNC_PLAYLIST")]
    pub playlist: Option<PathBuf>,

    /// Upstream playlist URLs (defaults to IPTV_SYNC_UPSTREAM, then the
    /// config file, then the built-in sources)
    #[arg(short, long, num_args = 1..)]
    pub upstream: Vec<String>,

    /// Validate stream URLs (slower but recommended)
    #[arg(long, env = "IPTV_SYNC_VALIDATE", value_parser = BoolishValueParser::new())]
    pub validate: bool,

    /// Skip URL validation (overrides --validate)
    #[arg(long)]
    pub no_validate: bool,

    /// Write the result here instead of rewriting the playlist in place
    #[arg(short, long)]
    pub output: Option<PathBuf>,

    /// Append the run's events to this file as JSON lines
    #[arg(long)]
    pub report: Option<PathBuf>,

    /// Config file (default: .iptv-sync/config.yaml, searched upwards)
    #[arg(short, long)]
    pub config: Option<PathBuf>,
}

impl Cli {
    /// Merge flags over the resolved configuration
    pub fn sync_options(&self, config: &ResolvedConfig) -> SyncOptions {
        let validate_liveness = if self.no_validate {
            false
        } else {
            self.validate || config.validate
        };

        SyncOptions {
            playlist: self
                .playlist
                .clone()
                .unwrap_or_else(|| config.playlist.clone()),
            output: self.output.clone(),
            upstream: if self.upstream.is_empty() {
                config.upstream.clone()
            } else {
                self.upstream.clone()
            },
            validate_liveness,
        }
    }

    /// Execute the sync run and map its outcome to an exit status
    pub async fn execute(self) -> Result<ExitCode> {
        let config = config::load_config(self.config.as_deref())?;
        if let Some(ref path) = config.config_file {
            debug!(path = %path.display(), "Using config file");
        }

        let options = self.sync_options(&config);
        let client = HttpClient::new(&config.http)?;
        let orchestrator = Orchestrator::new(client);

        report::print_banner(&options);

        let sync = orchestrator.run(&options).await?;

        report::print_events(&sync.events);
        report::print_summary(&sync, options.output_path());

        // The playlist is already written; a lost report does not change the outcome
        if let Some(ref path) = self.report {
            report::try_append_jsonl(path, &sync.events).await;
        }

        let status = if sync.stats.changes() > 0 {
            EXIT_CHANGED
        } else {
            EXIT_UNCHANGED
        };
        Ok(ExitCode::from(status))
    }
}
